//! Coin flip: call a face, the house wins slightly more than half

use serde::{Deserialize, Serialize};

use fh_stage::{CoinFace, GameKind, Notice, WinTier};

use crate::config::{CasinoConfig, CoinFlipRules, ConfigResult};
use crate::outcome::Outcome;
use crate::rng::Randomizer;
use crate::timing::{Timeline, TimingConfig};

use super::{RoundGame, SessionRules};

/// Face the coin landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinDraw {
    pub face: CoinFace,
}

impl CoinDraw {
    pub fn new(face: CoinFace) -> Self {
        Self { face }
    }
}

#[derive(Debug, Clone)]
pub struct CoinFlip {
    rules: CoinFlipRules,
}

impl CoinFlip {
    pub fn new(rules: CoinFlipRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &CoinFlipRules {
        &self.rules
    }
}

impl Default for CoinFlip {
    fn default() -> Self {
        Self::new(CoinFlipRules::default())
    }
}

impl RoundGame for CoinFlip {
    type Selection = CoinFace;
    type Draw = CoinDraw;

    const KIND: GameKind = GameKind::CoinFlip;

    fn from_config(config: &CasinoConfig) -> ConfigResult<Self> {
        config.coin_flip.validate()?;
        Ok(Self::new(config.coin_flip.clone()))
    }

    fn session_rules(config: &CasinoConfig) -> SessionRules {
        let rules = &config.coin_flip;
        SessionRules {
            limits: rules.limits,
            recovery: rules
                .recovery
                .policy(rules.limits.min, config.starting_balance),
            jackpot: None,
        }
    }

    /// The win decision comes first; the face follows from it
    fn draw(&mut self, rng: &mut Randomizer, selection: &CoinFace) -> CoinDraw {
        let player_wins = rng.chance(self.rules.win_probability);
        let face = if player_wins {
            *selection
        } else {
            selection.opposite()
        };
        CoinDraw::new(face)
    }

    fn resolve(&self, selection: &CoinFace, draw: &CoinDraw) -> Outcome {
        let label = draw.face.display_name();
        if draw.face == *selection {
            Outcome::multiple(self.rules.multiplier, WinTier::Win, label)
        } else {
            Outcome::loss(label)
        }
    }

    fn describe(&self, draw: &CoinDraw) -> Vec<String> {
        vec![draw.face.display_name().to_string()]
    }

    fn reveal(
        &self,
        draw: &CoinDraw,
        timing: &TimingConfig,
        timeline: &mut Timeline,
        _rng: &mut Randomizer,
    ) -> Vec<(f64, Notice)> {
        let landed = timeline.advance(timing.coin_flip_ms);
        timeline.advance(timing.coin_settle_ms);
        vec![(landed, Notice::CoinLanded { face: draw.face })]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        let coin = CoinFlip::default();
        let win = coin.resolve(&CoinFace::Heads, &CoinDraw::new(CoinFace::Heads));
        assert_eq!(win.multiplier(), 2.0);
        let loss = coin.resolve(&CoinFace::Heads, &CoinDraw::new(CoinFace::Tails));
        assert!(!loss.is_win());
        assert_eq!(loss.label, "TAILS");
    }

    #[test]
    fn test_win_rate_converges() {
        let mut coin = CoinFlip::default();
        let mut rng = Randomizer::seeded(2024);
        let rounds = 20_000;
        let wins = (0..rounds)
            .filter(|_| coin.draw(&mut rng, &CoinFace::Tails).face == CoinFace::Tails)
            .count();
        let rate = wins as f64 / rounds as f64;
        assert!((rate - 0.48).abs() < 0.02, "win rate {rate}");
    }

    #[test]
    fn test_reveal_timing() {
        let coin = CoinFlip::default();
        let mut timeline = Timeline::new(0.0);
        let mut rng = Randomizer::seeded(1);
        let notices = coin.reveal(
            &CoinDraw::new(CoinFace::Heads),
            &TimingConfig::normal(),
            &mut timeline,
            &mut rng,
        );
        assert_eq!(notices[0].0, 3000.0);
        assert_eq!(timeline.current(), 3500.0);
    }
}
