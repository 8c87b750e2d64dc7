use std::{env, path::PathBuf, sync::Arc};

use zigzagzog_core::SnapshotLedger;

use crate::store::CommitmentStore;

pub(crate) const DEFAULT_BIND_ADDR: &str = "0.0.0.0:2397";
pub(crate) const DEFAULT_DATA_DIR: &str = "data";
pub(crate) const DEFAULT_CHAIN_ID: u64 = 13_746;
pub(crate) const DEFAULT_COMMITMENT_TTL_SECS: u64 = 24 * 60 * 60;
pub(crate) const DEFAULT_COMMITMENT_SWEEP_SECS: u64 = 60;
pub(crate) const DEFAULT_MAX_COMMITMENTS: usize = 10_000;
pub(crate) const DEFAULT_JSON_LIMIT_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub(crate) struct ServerConfig {
    pub(crate) bind_addr: String,
    pub(crate) data_dir: PathBuf,
    pub(crate) ledger_snapshot_path: Option<PathBuf>,
    pub(crate) chain_id: u64,
    pub(crate) commitment_ttl_secs: u64,
    pub(crate) commitment_sweep_secs: u64,
    pub(crate) max_commitments: usize,
    pub(crate) json_limit_bytes: usize,
}

impl ServerConfig {
    pub(crate) fn from_env() -> Self {
        Self {
            bind_addr: env::var("API_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            data_dir: read_env_path("ZERVE_DATA_DIR")
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            ledger_snapshot_path: read_env_path("LEDGER_SNAPSHOT_PATH"),
            chain_id: read_env_u64("CHAIN_ID", DEFAULT_CHAIN_ID),
            commitment_ttl_secs: read_env_u64("COMMITMENT_TTL_SECS", DEFAULT_COMMITMENT_TTL_SECS),
            commitment_sweep_secs: read_env_u64(
                "COMMITMENT_SWEEP_SECS",
                DEFAULT_COMMITMENT_SWEEP_SECS,
            ),
            max_commitments: read_env_usize("MAX_COMMITMENTS", DEFAULT_MAX_COMMITMENTS),
            json_limit_bytes: read_env_usize("JSON_LIMIT_BYTES", DEFAULT_JSON_LIMIT_BYTES),
        }
    }
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) commitments: Arc<CommitmentStore>,
    pub(crate) ledger: Option<Arc<SnapshotLedger>>,
    pub(crate) chain_id: u64,
    pub(crate) max_commitments: usize,
    pub(crate) commitment_ttl_secs: u64,
}

pub(crate) fn read_env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

pub(crate) fn read_env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

pub(crate) fn read_env_path(name: &str) -> Option<PathBuf> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
