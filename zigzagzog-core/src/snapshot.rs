use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::ledger::{Ledger, PlayerRound, RawConstants, RawGameState, RoundTally};

/// In-memory copy of the contract storage, typically loaded from JSON.
///
/// Missing players and rounds read as zero like the contract's mappings do.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotLedger {
    pub current_game_number: u64,
    pub constants: RawConstants,
    #[serde(default)]
    pub games: BTreeMap<u64, GameRecord>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub state: RawGameState,
    #[serde(default)]
    pub has_ended: bool,
    #[serde(default)]
    pub balance: u128,
    #[serde(default)]
    pub players: BTreeMap<Address, PlayerRecord>,
    /// Round 1 first.
    #[serde(default)]
    pub rounds: Vec<RoundRecord>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    #[serde(default)]
    pub purchased_plays: u64,
    #[serde(default)]
    pub surviving_plays: u64,
    #[serde(default)]
    pub cashed_out: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    #[serde(default)]
    pub tally: RoundTally,
    #[serde(default)]
    pub players: BTreeMap<Address, PlayerRound>,
}

impl SnapshotLedger {
    fn game(&self, game_number: u64) -> Option<&GameRecord> {
        self.games.get(&game_number)
    }

    fn player(&self, game_number: u64, player: Address) -> PlayerRecord {
        self.game(game_number)
            .and_then(|game| game.players.get(&player))
            .copied()
            .unwrap_or_default()
    }

    fn round(&self, game_number: u64, round_number: u64) -> Option<&RoundRecord> {
        let index = usize::try_from(round_number.checked_sub(1)?).ok()?;
        self.game(game_number)?.rounds.get(index)
    }
}

impl Ledger for SnapshotLedger {
    fn current_game_number(&self) -> Result<u64, LedgerError> {
        Ok(self.current_game_number)
    }

    fn game_constants(&self) -> Result<RawConstants, LedgerError> {
        Ok(self.constants)
    }

    fn game_state(&self, game_number: u64) -> Result<RawGameState, LedgerError> {
        self.game(game_number)
            .map(|game| game.state)
            .ok_or(LedgerError::GameNotFound { game_number })
    }

    fn has_game_ended(&self, game_number: u64) -> Result<bool, LedgerError> {
        Ok(self.game(game_number).is_some_and(|game| game.has_ended))
    }

    fn player_cashed_out(&self, game_number: u64, player: Address) -> Result<bool, LedgerError> {
        Ok(self.player(game_number, player).cashed_out)
    }

    fn purchased_plays(&self, game_number: u64, player: Address) -> Result<u64, LedgerError> {
        Ok(self.player(game_number, player).purchased_plays)
    }

    fn player_surviving_plays(
        &self,
        game_number: u64,
        player: Address,
    ) -> Result<u64, LedgerError> {
        Ok(self.player(game_number, player).surviving_plays)
    }

    fn game_balance(&self, game_number: u64) -> Result<u128, LedgerError> {
        Ok(self.game(game_number).map_or(0, |game| game.balance))
    }

    fn round_tally(&self, game_number: u64, round_number: u64) -> Result<RoundTally, LedgerError> {
        Ok(self
            .round(game_number, round_number)
            .map(|round| round.tally)
            .unwrap_or_default())
    }

    fn player_round(
        &self,
        game_number: u64,
        round_number: u64,
        player: Address,
    ) -> Result<PlayerRound, LedgerError> {
        Ok(self
            .round(game_number, round_number)
            .and_then(|round| round.players.get(&player))
            .copied()
            .unwrap_or_default())
    }
}
