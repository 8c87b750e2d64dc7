use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::elimination::{eliminate, EliminationResult};
use crate::phase::{GameAndRoundState, GameState};
use crate::shapes::ShapeCounts;

/// One closed (or in-progress) round from a single player's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    pub round_number: u64,
    pub player_committed: bool,
    pub player_revealed: bool,
    pub player_shapes: ShapeCounts,
    pub total_shapes: ShapeCounts,
    pub elimination_result: EliminationResult,
    /// Provisional until the round closes.
    pub surviving_plays: u64,
}

impl RoundState {
    pub fn from_tallies(
        round_number: u64,
        player_committed: bool,
        player_revealed: bool,
        player_shapes: ShapeCounts,
        total_shapes: ShapeCounts,
    ) -> Self {
        let elimination_result = eliminate(&total_shapes);
        Self {
            round_number,
            player_committed,
            player_revealed,
            player_shapes,
            total_shapes,
            elimination_result,
            surviving_plays: elimination_result.surviving_plays(&player_shapes),
        }
    }
}

/// Plays each round in `rounds` started with. Round 1 starts with the
/// purchased plays, every later round with what survived the round before.
pub fn entering_plays(purchased_plays: u64, rounds: &[RoundState]) -> Vec<u64> {
    let mut entering = Vec::with_capacity(rounds.len());
    let mut carried = purchased_plays;
    for round in rounds {
        entering.push(carried);
        carried = round.surviving_plays;
    }
    entering
}

/// Plays carried into the round after the last one in `rounds`.
pub fn next_round_plays(purchased_plays: u64, rounds: &[RoundState]) -> u64 {
    rounds
        .last()
        .map_or(purchased_plays, |round| round.surviving_plays)
}

pub fn can_commit(entering_plays: u64) -> bool {
    entering_plays > 0
}

/// Whether the player can claim winnings: the game is over, the player has
/// not cashed out yet, and revealed in the last on-chain round with something
/// left standing.
pub fn can_claim(
    rounds: &[RoundState],
    game: &GameState,
    game_and_round: &GameAndRoundState,
) -> bool {
    if !game_and_round.has_game_ended || game.has_player_cashed_out {
        return false;
    }
    let Some(index) = game.round_number.checked_sub(1) else {
        return false;
    };
    usize::try_from(index)
        .ok()
        .and_then(|index| rounds.get(index))
        .is_some_and(|round| round.player_revealed && round.surviving_plays > 0)
}
