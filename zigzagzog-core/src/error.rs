use alloc::string::String;
use core::fmt;

/// Failure of the read layer. Resolvers never fail; only reads do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerError {
    GameNotFound { game_number: u64 },
    NoCurrentGame,
    Backend { message: String },
}

impl LedgerError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GameNotFound { game_number } => write!(f, "game not found: {game_number}"),
            Self::NoCurrentGame => write!(f, "no game has been started yet"),
            Self::Backend { message } => write!(f, "ledger read failed: {message}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LedgerError {}
