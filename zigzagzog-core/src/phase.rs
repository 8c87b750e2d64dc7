use core::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConstants {
    /// Price of one play, in wei.
    pub play_cost: u128,
    pub commit_duration_ms: u64,
    pub reveal_duration_ms: u64,
}

/// On-chain game metadata with timestamps in unix milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub game_number: u64,
    /// Last round that has been opened on chain.
    pub round_number: u64,
    pub game_timestamp_ms: u64,
    pub round_timestamp_ms: u64,
    /// The contract's own flag. Clients resolve the end themselves, see
    /// [`resolve_game_and_round_state`].
    #[serde(default)]
    pub has_game_ended: bool,
    #[serde(default)]
    pub has_player_cashed_out: bool,
}

/// Commit and reveal windows of the on-chain round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundWindow {
    pub commit_end_ms: u64,
    pub phase_end_ms: u64,
}

impl RoundWindow {
    pub fn new(round_timestamp_ms: u64, constants: &GameConstants) -> Self {
        let commit_end_ms = round_timestamp_ms.saturating_add(constants.commit_duration_ms);
        Self {
            commit_end_ms,
            phase_end_ms: commit_end_ms.saturating_add(constants.reveal_duration_ms),
        }
    }

    /// Commit phase includes its closing instant.
    pub fn in_commit(&self, now_ms: u64) -> bool {
        now_ms <= self.commit_end_ms
    }

    pub fn is_live(&self, now_ms: u64) -> bool {
        now_ms < self.phase_end_ms
    }

    pub fn has_elapsed(&self, now_ms: u64) -> bool {
        now_ms > self.phase_end_ms
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Commit,
    Reveal,
    BetweenRounds,
    Ended,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Commit => "commit",
            Self::Reveal => "reveal",
            Self::BetweenRounds => "between_rounds",
            Self::Ended => "ended",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameAndRoundState {
    pub game_number: u64,
    pub has_game_ended: bool,
    pub can_buy_plays: bool,
    pub active_round: u64,
    pub time_left_ms: u64,
    pub is_commit_phase: bool,
    pub is_reveal_phase: bool,
}

impl GameAndRoundState {
    pub fn phase(&self) -> Phase {
        if self.has_game_ended {
            Phase::Ended
        } else if self.is_commit_phase {
            Phase::Commit
        } else if self.is_reveal_phase {
            Phase::Reveal
        } else {
            Phase::BetweenRounds
        }
    }
}

/// Resolves phase, timing and game end for `now_ms`.
///
/// `will_end` is the game-end verdict for the on-chain round (see
/// [`crate::reveal::will_game_end`]). It is ignored while that round's
/// reveal window is still open. Once the window has fully elapsed the
/// wall clock sits in the next round, which nobody has committed to yet.
pub fn resolve_game_and_round_state(
    game: &GameState,
    constants: &GameConstants,
    will_end: bool,
    now_ms: u64,
) -> GameAndRoundState {
    let window = RoundWindow::new(game.round_timestamp_ms, constants);
    let has_game_ended = will_end && !window.is_live(now_ms);

    let active_round = if window.has_elapsed(now_ms) {
        game.round_number.saturating_add(1)
    } else {
        game.round_number
    };
    let has_active_round_started = active_round == game.round_number;

    let mut state = GameAndRoundState {
        game_number: game.game_number,
        has_game_ended,
        can_buy_plays: has_game_ended,
        active_round,
        time_left_ms: 0,
        is_commit_phase: !has_active_round_started && !has_game_ended,
        is_reveal_phase: false,
    };

    if !has_game_ended && has_active_round_started {
        if window.in_commit(now_ms) {
            state.is_commit_phase = true;
            state.time_left_ms = window.commit_end_ms - now_ms;
        } else if window.is_live(now_ms) {
            state.is_reveal_phase = true;
            state.time_left_ms = window.phase_end_ms - now_ms;
        }
        state.can_buy_plays = game.round_number == 1 && state.is_commit_phase;
    }

    state
}
