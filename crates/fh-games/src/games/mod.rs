//! Outcome resolvers
//!
//! Each game splits a round into a random `draw` and a pure `resolve`
//! step. Sessions call `draw` for normal play and skip it for forced rounds,
//! so every resolver can be tested with hand-built draws.

mod coin_flip;
mod dice;
mod roulette;
mod slot;

pub use coin_flip::*;
pub use dice::*;
pub use roulette::*;
pub use slot::*;

use std::fmt::Debug;

use fh_stage::{GameKind, Notice};

use crate::bet::BetLimits;
use crate::config::{CasinoConfig, ConfigResult};
use crate::outcome::Outcome;
use crate::rng::Randomizer;
use crate::settlement::{JackpotPool, RecoveryPolicy};
use crate::timing::{Timeline, TimingConfig};

/// Wallet-side rules a session needs for a game
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRules {
    pub limits: BetLimits,
    pub recovery: Option<RecoveryPolicy>,
    pub jackpot: Option<JackpotPool>,
}

/// A bet-draw-payout mini-game
pub trait RoundGame {
    /// What the player bets on
    type Selection: Clone + Debug + PartialEq;
    /// What the randomizer produced
    type Draw: Clone + Debug;

    const KIND: GameKind;

    /// Build from configuration
    fn from_config(config: &CasinoConfig) -> ConfigResult<Self>
    where
        Self: Sized;

    /// Bet limits, recovery and jackpot for this game
    fn session_rules(config: &CasinoConfig) -> SessionRules;

    /// Selection in place before the player picks one (`None` = must pick)
    fn default_selection(&self) -> Option<Self::Selection> {
        None
    }

    fn is_valid_selection(&self, _selection: &Self::Selection) -> bool {
        true
    }

    /// Random part of a round
    fn draw(&mut self, rng: &mut Randomizer, selection: &Self::Selection) -> Self::Draw;

    /// Deterministic classification of a draw
    fn resolve(&self, selection: &Self::Selection, draw: &Self::Draw) -> Outcome;

    /// Called before a forced draw is played so stateful games stay consistent
    fn accept_forced(&mut self, _draw: &Self::Draw) {}

    /// Drawn values as text for presentation
    fn describe(&self, draw: &Self::Draw) -> Vec<String>;

    /// Reveal notices for a draw. Leaves `timeline` at the moment the result
    /// may be shown.
    fn reveal(
        &self,
        draw: &Self::Draw,
        timing: &TimingConfig,
        timeline: &mut Timeline,
        rng: &mut Randomizer,
    ) -> Vec<(f64, Notice)>;
}
