//! Pending reveals stored between `sig commit` and the reveal transaction.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use alloy_primitives::B256;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use zigzagzog_core::{Commitment, CommitmentKey};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReveal {
    pub chain_id: u64,
    pub commitment: Commitment,
    pub hash: B256,
    pub created_at_ms: u64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PendingCache {
    entries: BTreeMap<String, PendingReveal>,
}

impl PendingCache {
    /// A missing file is an empty cache.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed reading cache {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("failed parsing cache {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed creating {}", parent.display()))?;
        }
        let encoded = serde_json::to_vec_pretty(self).context("failed encoding cache")?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, encoded).with_context(|| format!("failed writing {}", tmp.display()))?;
        fs::rename(&tmp, path).with_context(|| format!("failed replacing {}", path.display()))
    }

    pub fn insert(&mut self, key: &CommitmentKey, reveal: PendingReveal) -> Option<PendingReveal> {
        self.entries.insert(key.to_string(), reveal)
    }

    pub fn get(&self, key: &CommitmentKey) -> Option<&PendingReveal> {
        self.entries.get(&key.to_string())
    }

    pub fn remove(&mut self, key: &CommitmentKey) -> Option<PendingReveal> {
        self.entries.remove(&key.to_string())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
