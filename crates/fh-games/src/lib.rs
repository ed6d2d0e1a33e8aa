//! # fh-games: FortuneHall game core
//!
//! Weighted draws, payout resolution, settlement and round sessions for the
//! FortuneHall mini-games: coin flip, dice, roulette, slot machine and
//! scratch tickets.
//!
//! ## Architecture
//!
//! ```text
//! GameSession<G: RoundGame>            ScratchSession
//!     │                                    │
//!     ├── BetSlip (amount + selection)     ├── PrizeBands (prize at purchase)
//!     ├── Randomizer ──> G::draw           ├── CoverageGrid (reveal at 25 %)
//!     ├── G::resolve ──> Outcome           │
//!     └── SettlementEngine <───────────────┘
//!           │   (Cashier → BalanceStore, JackpotPool, RecoveryPolicy)
//!           v
//!     RoundResult + timed Notices → Presenter
//! ```

pub mod bet;
pub mod config;
pub mod games;
pub mod outcome;
pub mod paytable;
pub mod rng;
pub mod scratch;
pub mod session;
pub mod settlement;
pub mod stats;
pub mod symbols;
pub mod timing;

pub use bet::*;
pub use config::*;
pub use games::*;
pub use outcome::*;
pub use paytable::*;
pub use rng::*;
pub use scratch::*;
pub use session::*;
pub use settlement::*;
pub use stats::*;
pub use symbols::*;
pub use timing::*;
