pub const DOMAIN_NAME: &str = "ZigZagZog";
pub const DOMAIN_VERSION: &str = "0.1.0";

/// How many game numbers back the recent-games lookup scans.
pub const RECENT_GAMES_DEFAULT: u64 = 10;

pub const MS_PER_SEC: u64 = 1_000;
