//! Read layer over the ZigZagZog contract.
//!
//! [`Ledger`] mirrors the contract's view functions. The `read_*` functions
//! gather complete snapshots from it and hand them to the pure resolvers, so
//! a resolver never sees partial data.

use alloc::vec::Vec;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::constants::MS_PER_SEC;
use crate::elimination::EliminationResult;
use crate::error::LedgerError;
use crate::phase::{resolve_game_and_round_state, GameAndRoundState, GameConstants, GameState};
use crate::reveal::{game_end_reason, GameEndReason, LastRevealers, RoundRevealState};
use crate::rounds::{can_claim, can_commit, entering_plays, next_round_plays, RoundState};
use crate::shapes::ShapeCounts;

/// Contract constants as stored on chain (durations in seconds).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawConstants {
    pub play_cost: u128,
    pub commit_duration_secs: u64,
    pub reveal_duration_secs: u64,
}

/// `GameState(game)` as stored on chain (timestamps in seconds).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawGameState {
    pub game_timestamp: u64,
    pub round_number: u64,
    pub round_timestamp: u64,
}

/// Global reveal counters of one round. The contract reports the zero
/// address as last revealer for a shape nobody revealed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundTally {
    #[serde(default)]
    pub revealed: ShapeCounts,
    #[serde(default)]
    pub player_counts: ShapeCounts,
    #[serde(default)]
    pub last_circle_revealed: Address,
    #[serde(default)]
    pub last_square_revealed: Address,
    #[serde(default)]
    pub last_triangle_revealed: Address,
}

impl RoundTally {
    pub fn last_revealers(&self) -> LastRevealers {
        LastRevealers {
            circle: revealer(self.last_circle_revealed, self.revealed.circles),
            square: revealer(self.last_square_revealed, self.revealed.squares),
            triangle: revealer(self.last_triangle_revealed, self.revealed.triangles),
        }
    }
}

fn revealer(address: Address, revealed: u64) -> Option<Address> {
    (revealed > 0 && !address.is_zero()).then_some(address)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRound {
    #[serde(default)]
    pub committed: bool,
    #[serde(default)]
    pub revealed: bool,
    #[serde(default)]
    pub shapes: ShapeCounts,
}

/// Read-only views of the ZigZagZog contract.
pub trait Ledger {
    fn current_game_number(&self) -> Result<u64, LedgerError>;
    fn game_constants(&self) -> Result<RawConstants, LedgerError>;
    fn game_state(&self, game_number: u64) -> Result<RawGameState, LedgerError>;
    fn has_game_ended(&self, game_number: u64) -> Result<bool, LedgerError>;
    fn player_cashed_out(&self, game_number: u64, player: Address) -> Result<bool, LedgerError>;
    fn purchased_plays(&self, game_number: u64, player: Address) -> Result<u64, LedgerError>;
    fn player_surviving_plays(&self, game_number: u64, player: Address)
        -> Result<u64, LedgerError>;
    fn game_balance(&self, game_number: u64) -> Result<u128, LedgerError>;
    fn round_tally(&self, game_number: u64, round_number: u64) -> Result<RoundTally, LedgerError>;
    fn player_round(
        &self,
        game_number: u64,
        round_number: u64,
        player: Address,
    ) -> Result<PlayerRound, LedgerError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub has_committed: bool,
    pub has_revealed: bool,
    pub surviving_plays: u64,
    pub purchased_plays: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareInfo {
    pub purchased_plays: u64,
    pub game_balance: u128,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentGame {
    pub game_number: u64,
    pub purchased_plays: u64,
    pub surviving_plays: u64,
    pub cashed_out: bool,
    pub round_number: u64,
}

/// Everything a client shows for one player in one game at one instant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    pub player: Address,
    pub game_state: GameState,
    pub constants: GameConstants,
    pub game_and_round_state: GameAndRoundState,
    pub reveal_state: RoundRevealState,
    pub elimination: EliminationResult,
    pub game_end_reason: Option<GameEndReason>,
    pub rounds: Vec<RoundState>,
    pub entering_plays: Vec<u64>,
    pub active_round_plays: u64,
    /// Whether the player committed in the active round.
    pub has_committed: bool,
    /// Whether the player revealed in the active round.
    pub has_revealed: bool,
    pub can_commit: bool,
    pub can_reveal: bool,
    pub can_claim: bool,
}

pub fn read_constants<L: Ledger + ?Sized>(ledger: &L) -> Result<GameConstants, LedgerError> {
    let raw = ledger.game_constants()?;
    Ok(GameConstants {
        play_cost: raw.play_cost,
        commit_duration_ms: raw.commit_duration_secs.saturating_mul(MS_PER_SEC),
        reveal_duration_ms: raw.reveal_duration_secs.saturating_mul(MS_PER_SEC),
    })
}

pub fn read_game_state<L: Ledger + ?Sized>(
    ledger: &L,
    game_number: u64,
    player: Address,
) -> Result<GameState, LedgerError> {
    let raw = ledger.game_state(game_number)?;
    Ok(GameState {
        game_number,
        round_number: raw.round_number,
        game_timestamp_ms: raw.game_timestamp.saturating_mul(MS_PER_SEC),
        round_timestamp_ms: raw.round_timestamp.saturating_mul(MS_PER_SEC),
        has_game_ended: ledger.has_game_ended(game_number)?,
        has_player_cashed_out: ledger.player_cashed_out(game_number, player)?,
    })
}

pub fn read_round_reveal_state<L: Ledger + ?Sized>(
    ledger: &L,
    game_number: u64,
    round_number: u64,
    player: Address,
) -> Result<RoundRevealState, LedgerError> {
    let tally = ledger.round_tally(game_number, round_number)?;
    let mine = ledger.player_round(game_number, round_number, player)?;
    Ok(RoundRevealState {
        revealed: tally.revealed,
        player_counts: tally.player_counts,
        last_revealed: tally.last_revealers(),
        player_revealed: mine.shapes,
    })
}

/// Rounds `1..=last_round` in ascending order.
pub fn read_rounds<L: Ledger + ?Sized>(
    ledger: &L,
    game_number: u64,
    last_round: u64,
    player: Address,
) -> Result<Vec<RoundState>, LedgerError> {
    (1..=last_round)
        .map(|round_number| {
            let tally = ledger.round_tally(game_number, round_number)?;
            let mine = ledger.player_round(game_number, round_number, player)?;
            Ok(RoundState::from_tallies(
                round_number,
                mine.committed,
                mine.revealed,
                mine.shapes,
                tally.revealed,
            ))
        })
        .collect()
}

pub fn read_player_state<L: Ledger + ?Sized>(
    ledger: &L,
    game_number: u64,
    round_number: u64,
    player: Address,
) -> Result<PlayerState, LedgerError> {
    let round = ledger.player_round(game_number, round_number, player)?;
    Ok(PlayerState {
        has_committed: round.committed,
        has_revealed: round.revealed,
        surviving_plays: ledger.player_surviving_plays(game_number, player)?,
        purchased_plays: ledger.purchased_plays(game_number, player)?,
    })
}

pub fn read_share_info<L: Ledger + ?Sized>(
    ledger: &L,
    game_number: u64,
    player: Address,
) -> Result<ShareInfo, LedgerError> {
    Ok(ShareInfo {
        purchased_plays: ledger.purchased_plays(game_number, player)?,
        game_balance: ledger.game_balance(game_number)?,
    })
}

/// Games among the last `limit` game numbers the player bought into,
/// newest first.
pub fn read_recent_games<L: Ledger + ?Sized>(
    ledger: &L,
    player: Address,
    limit: u64,
) -> Result<Vec<RecentGame>, LedgerError> {
    let current = ledger.current_game_number()?;
    let oldest = current.saturating_sub(limit);

    let mut games = Vec::new();
    for game_number in (oldest + 1..=current).rev() {
        let purchased_plays = ledger.purchased_plays(game_number, player)?;
        if purchased_plays == 0 {
            continue;
        }
        let round_number = match ledger.game_state(game_number) {
            Ok(state) => state.round_number,
            Err(LedgerError::GameNotFound { .. }) => 0,
            Err(err) => return Err(err),
        };
        games.push(RecentGame {
            game_number,
            purchased_plays,
            surviving_plays: ledger.player_surviving_plays(game_number, player)?,
            cashed_out: ledger.player_cashed_out(game_number, player)?,
            round_number,
        });
    }
    Ok(games)
}

/// Reads the on-chain round's reveal counters and resolves phase and game
/// end for `now_ms`.
pub fn read_game_and_round_state<L: Ledger + ?Sized>(
    ledger: &L,
    game: &GameState,
    constants: &GameConstants,
    player: Address,
    now_ms: u64,
) -> Result<GameAndRoundState, LedgerError> {
    let reveal = read_round_reveal_state(ledger, game.game_number, game.round_number, player)?;
    let will_end = game_end_reason(&reveal).is_some();
    Ok(resolve_game_and_round_state(game, constants, will_end, now_ms))
}

/// Builds a [`GameView`] for `game_number`, or for the current game when
/// `None`.
pub fn read_game_view<L: Ledger + ?Sized>(
    ledger: &L,
    game_number: Option<u64>,
    player: Address,
    now_ms: u64,
) -> Result<GameView, LedgerError> {
    let game_number = match game_number {
        Some(number) => number,
        None => match ledger.current_game_number()? {
            0 => return Err(LedgerError::NoCurrentGame),
            number => number,
        },
    };

    let constants = read_constants(ledger)?;
    let game_state = read_game_state(ledger, game_number, player)?;
    let reveal_state =
        read_round_reveal_state(ledger, game_number, game_state.round_number, player)?;
    let reason = game_end_reason(&reveal_state);
    let game_and_round_state =
        resolve_game_and_round_state(&game_state, &constants, reason.is_some(), now_ms);

    let rounds = read_rounds(ledger, game_number, game_state.round_number, player)?;
    let purchased = ledger.purchased_plays(game_number, player)?;
    let entering = entering_plays(purchased, &rounds);

    let active_round_plays = if game_and_round_state.active_round == game_state.round_number {
        game_state
            .round_number
            .checked_sub(1)
            .and_then(|index| usize::try_from(index).ok())
            .and_then(|index| entering.get(index).copied())
            .unwrap_or(purchased)
    } else {
        next_round_plays(purchased, &rounds)
    };
    let active = ledger.player_round(game_number, game_and_round_state.active_round, player)?;

    Ok(GameView {
        player,
        can_commit: game_and_round_state.is_commit_phase
            && !active.committed
            && can_commit(active_round_plays),
        can_reveal: game_and_round_state.is_reveal_phase && active.committed && !active.revealed,
        has_committed: active.committed,
        has_revealed: active.revealed,
        can_claim: can_claim(&rounds, &game_state, &game_and_round_state),
        elimination: reveal_state.elimination(),
        game_end_reason: reason,
        game_state,
        constants,
        game_and_round_state,
        reveal_state,
        rounds,
        entering_plays: entering,
        active_round_plays,
    })
}
