use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use alloy_primitives::{Address, U256};
use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use zigzagzog_core::SnapshotLedger;

pub fn parse_address(value: &str) -> Result<Address> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("empty address"));
    }
    Address::from_str(trimmed).with_context(|| format!("invalid address: {trimmed}"))
}

/// Accepts decimal or `0x`-prefixed hex.
pub fn parse_u256(value: &str) -> Result<U256> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("empty number"));
    }
    U256::from_str(trimmed).with_context(|| format!("invalid uint256: {trimmed}"))
}

pub fn now_ms() -> Result<u64> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock is before the unix epoch")?;
    u64::try_from(elapsed.as_millis()).context("timestamp overflows u64")
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data =
        fs::read_to_string(path).with_context(|| format!("failed reading {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("failed parsing {}", path.display()))
}

pub fn load_snapshot(path: &Path) -> Result<SnapshotLedger> {
    let ledger: SnapshotLedger = read_json(path)?;
    tracing::debug!(
        path = %path.display(),
        current_game = ledger.current_game_number,
        games = ledger.games.len(),
        "loaded ledger snapshot"
    );
    Ok(ledger)
}
