#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod commitment;
pub mod constants;
pub mod elimination;
pub mod error;
pub mod ledger;
pub mod phase;
pub mod reveal;
pub mod rounds;
pub mod shapes;
pub mod snapshot;

pub use commitment::{zigzagzog_domain, ChoicesMessage, Commitment, CommitmentKey};
pub use elimination::{eliminate, EliminationResult};
pub use error::LedgerError;
pub use ledger::{read_game_view, GameView, Ledger};
pub use phase::{resolve_game_and_round_state, GameAndRoundState, GameConstants, GameState, Phase};
pub use reveal::{game_end_reason, will_game_end, GameEndReason, LastRevealers, RoundRevealState};
pub use rounds::{can_claim, can_commit, entering_plays, RoundState};
pub use shapes::{Shape, ShapeCounts};
pub use snapshot::SnapshotLedger;
