//! FortuneHall batch simulator
//!
//! Plays large numbers of rounds with instant timing and reports the
//! measured return to player and hit rate per game, next to the closed-form
//! figure where the game has one.
//!
//! ```text
//! SimConfig ──► plan_chunks ──► rayon pool ──► GameSession / ScratchSession
//!                                   │
//!                                   ▼
//!                          SessionStats::merge ──► SimReport
//! ```

pub mod error;
pub mod report;
pub mod runner;

pub use error::*;
pub use report::*;
pub use runner::*;
