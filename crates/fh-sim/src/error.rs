//! Simulator errors

use fh_games::ConfigError;
use fh_stage::GameKind;
use fh_state::StoreError;

/// Result type for simulation runs
pub type SimResult<T> = Result<T, SimError>;

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Nothing to simulate: rounds must be positive")]
    NoRounds,

    #[error("Bet {bet} outside {game} limits [{min}, {max}]")]
    InvalidBet {
        game: GameKind,
        bet: u64,
        min: u64,
        max: u64,
    },

    #[error("{game} session stopped accepting rounds after {played}")]
    Stalled { game: GameKind, played: u64 },
}
