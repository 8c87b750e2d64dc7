use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use zigzagzog_core::{
    Commitment, CommitmentKey, EliminationResult, GameAndRoundState, GameConstants,
    GameEndReason, GameState, Phase, RoundRevealState, RoundState, Shape, ShapeCounts,
};

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) status: &'static str,
    pub(crate) service: &'static str,
    pub(crate) version: &'static str,
    pub(crate) chain_id: u64,
    pub(crate) stored_commitments: usize,
    pub(crate) max_commitments: usize,
    pub(crate) commitment_ttl_secs: u64,
    pub(crate) ledger_loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) current_game_number: Option<u64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct EliminationResponse {
    pub(crate) success: bool,
    pub(crate) counts: ShapeCounts,
    pub(crate) result: EliminationResult,
    pub(crate) survivors: Option<[Shape; 2]>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GameEndResponse {
    pub(crate) success: bool,
    pub(crate) elimination: EliminationResult,
    pub(crate) will_end: bool,
    pub(crate) reason: Option<GameEndReason>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GameAndRoundStateRequest {
    pub(crate) game_state: GameState,
    pub(crate) constants: GameConstants,
    pub(crate) reveal_state: RoundRevealState,
    #[serde(default)]
    pub(crate) now_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GameAndRoundStateResponse {
    pub(crate) success: bool,
    pub(crate) now_ms: u64,
    pub(crate) phase: Phase,
    pub(crate) state: GameAndRoundState,
    pub(crate) game_end_reason: Option<GameEndReason>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RoundInput {
    pub(crate) round_number: u64,
    #[serde(default)]
    pub(crate) player_committed: bool,
    #[serde(default)]
    pub(crate) player_revealed: bool,
    #[serde(default)]
    pub(crate) player_shapes: ShapeCounts,
    pub(crate) total_shapes: ShapeCounts,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RoundsRequest {
    pub(crate) purchased_plays: u64,
    #[serde(default)]
    pub(crate) rounds: Vec<RoundInput>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RoundsResponse {
    pub(crate) success: bool,
    pub(crate) rounds: Vec<RoundState>,
    pub(crate) entering_plays: Vec<u64>,
    pub(crate) next_round_plays: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CommitmentHashRequest {
    #[serde(default)]
    pub(crate) chain_id: Option<u64>,
    pub(crate) contract: Address,
    pub(crate) nonce: U256,
    pub(crate) game_number: u64,
    pub(crate) round_number: u64,
    pub(crate) shapes: ShapeCounts,
}

#[derive(Debug, Serialize)]
pub(crate) struct CommitmentHashResponse {
    pub(crate) success: bool,
    pub(crate) chain_id: u64,
    pub(crate) hash: B256,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PutCommitmentRequest {
    #[serde(default)]
    pub(crate) chain_id: Option<u64>,
    pub(crate) nonce: U256,
    pub(crate) shapes: ShapeCounts,
}

/// A pending reveal as persisted by the commitment store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct StoredCommitment {
    pub(crate) key: CommitmentKey,
    pub(crate) chain_id: u64,
    pub(crate) commitment: Commitment,
    pub(crate) hash: B256,
    pub(crate) created_at_unix_s: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct CommitmentResponse {
    pub(crate) success: bool,
    pub(crate) cache_key: String,
    pub(crate) commitment: StoredCommitment,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GameViewQuery {
    #[serde(default)]
    pub(crate) now_ms: Option<u64>,
}
