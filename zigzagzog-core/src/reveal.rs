use core::fmt;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::elimination::{eliminate, EliminationResult};
use crate::shapes::{Shape, ShapeCounts};

/// Last address to reveal each shape in a round. `None` means nobody has
/// revealed that shape yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastRevealers {
    #[serde(default)]
    pub circle: Option<Address>,
    #[serde(default)]
    pub square: Option<Address>,
    #[serde(default)]
    pub triangle: Option<Address>,
}

impl LastRevealers {
    pub fn get(&self, shape: Shape) -> Option<Address> {
        match shape {
            Shape::Circle => self.circle,
            Shape::Square => self.square,
            Shape::Triangle => self.triangle,
        }
    }

    fn same_revealer(&self, shapes: [Shape; 2]) -> bool {
        match (self.get(shapes[0]), self.get(shapes[1])) {
            (Some(first), Some(second)) => first == second,
            _ => false,
        }
    }
}

/// Reveal counters of one (game, round) as seen by one player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRevealState {
    /// Plays revealed per shape, all players.
    pub revealed: ShapeCounts,
    /// Distinct players that revealed each shape.
    pub player_counts: ShapeCounts,
    #[serde(default)]
    pub last_revealed: LastRevealers,
    /// Plays revealed per shape by the requesting player.
    #[serde(default)]
    pub player_revealed: ShapeCounts,
}

impl RoundRevealState {
    pub fn elimination(&self) -> EliminationResult {
        eliminate(&self.revealed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameEndReason {
    /// Nobody revealed anything in the round.
    NoReveals,
    /// All three shapes tied.
    Stalemate,
    TooFewSurvivingPlays,
    PlayerHoldsAllSurvivingPlays,
    SingleSurvivingPlayer,
    /// Two surviving buckets, both last revealed by the same address.
    SameLastRevealer,
}

impl GameEndReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoReveals => "no_reveals",
            Self::Stalemate => "stalemate",
            Self::TooFewSurvivingPlays => "too_few_surviving_plays",
            Self::PlayerHoldsAllSurvivingPlays => "player_holds_all_surviving_plays",
            Self::SingleSurvivingPlayer => "single_surviving_player",
            Self::SameLastRevealer => "same_last_revealer",
        }
    }
}

impl fmt::Display for GameEndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First rule that ends the game after this round, if any.
///
/// Rules are checked in order and the first match wins. A round with zero
/// reveals is reported as ending the game even though it really means the
/// round never got played.
pub fn game_end_reason(state: &RoundRevealState) -> Option<GameEndReason> {
    if state.revealed.total() == 0 {
        return Some(GameEndReason::NoReveals);
    }

    let Some(survivors) = state.elimination().survivors() else {
        return Some(GameEndReason::Stalemate);
    };

    let player_surviving_plays = state.player_revealed.sum_of(survivors);
    let total_surviving_plays = state.revealed.sum_of(survivors);

    if total_surviving_plays <= 2 {
        return Some(GameEndReason::TooFewSurvivingPlays);
    }
    if player_surviving_plays == total_surviving_plays {
        return Some(GameEndReason::PlayerHoldsAllSurvivingPlays);
    }

    match state.player_counts.sum_of(survivors) {
        1 => Some(GameEndReason::SingleSurvivingPlayer),
        2 if state.last_revealed.same_revealer(survivors) => Some(GameEndReason::SameLastRevealer),
        _ => None,
    }
}

pub fn will_game_end(state: &RoundRevealState) -> bool {
    game_end_reason(state).is_some()
}
