//! Dice: pick a face, a match pays the number of faces
//!
//! With six faces paying 6× the game is exactly fair (no house edge).

use serde::{Deserialize, Serialize};

use fh_stage::{GameKind, Notice, WinTier};

use crate::config::{CasinoConfig, ConfigResult, DiceRules};
use crate::outcome::Outcome;
use crate::rng::Randomizer;
use crate::timing::{Timeline, TimingConfig};

use super::{RoundGame, SessionRules};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceDraw {
    pub face: u8,
}

impl DiceDraw {
    pub fn new(face: u8) -> Self {
        Self { face }
    }
}

#[derive(Debug, Clone)]
pub struct Dice {
    rules: DiceRules,
}

impl Dice {
    pub fn new(rules: DiceRules) -> Self {
        Self { rules }
    }

    pub fn faces(&self) -> u8 {
        self.rules.faces
    }
}

impl Default for Dice {
    fn default() -> Self {
        Self::new(DiceRules::default())
    }
}

impl RoundGame for Dice {
    type Selection = u8;
    type Draw = DiceDraw;

    const KIND: GameKind = GameKind::Dice;

    fn from_config(config: &CasinoConfig) -> ConfigResult<Self> {
        config.dice.validate()?;
        Ok(Self::new(config.dice.clone()))
    }

    fn session_rules(config: &CasinoConfig) -> SessionRules {
        let rules = &config.dice;
        SessionRules {
            limits: rules.limits,
            recovery: rules
                .recovery
                .policy(rules.limits.min, config.starting_balance),
            jackpot: None,
        }
    }

    fn is_valid_selection(&self, selection: &u8) -> bool {
        (1..=self.rules.faces).contains(selection)
    }

    fn draw(&mut self, rng: &mut Randomizer, _selection: &u8) -> DiceDraw {
        DiceDraw::new(rng.uniform_u64(1..=self.rules.faces as u64) as u8)
    }

    fn resolve(&self, selection: &u8, draw: &DiceDraw) -> Outcome {
        let label = format!("Rolled {}", draw.face);
        if draw.face == *selection {
            Outcome::multiple(self.rules.multiplier, WinTier::Win, label)
        } else {
            Outcome::loss(label)
        }
    }

    fn describe(&self, draw: &DiceDraw) -> Vec<String> {
        vec![draw.face.to_string()]
    }

    fn reveal(
        &self,
        draw: &DiceDraw,
        timing: &TimingConfig,
        timeline: &mut Timeline,
        _rng: &mut Randomizer,
    ) -> Vec<(f64, Notice)> {
        let landed = timeline.advance(timing.dice_roll_ms);
        timeline.advance(timing.dice_settle_ms);
        vec![(landed, Notice::DieLanded { face: draw.face })]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_bounds() {
        let dice = Dice::default();
        assert!(dice.is_valid_selection(&1));
        assert!(dice.is_valid_selection(&6));
        assert!(!dice.is_valid_selection(&0));
        assert!(!dice.is_valid_selection(&7));
    }

    #[test]
    fn test_from_config_checks_rules() {
        let mut config = CasinoConfig::default();
        assert!(Dice::from_config(&config).is_ok());
        config.dice.faces = 1;
        assert!(Dice::from_config(&config).is_err());
    }

    #[test]
    fn test_faces_uniform() {
        let mut dice = Dice::default();
        let mut rng = Randomizer::seeded(6);
        let mut counts = [0usize; 7];
        for _ in 0..60_000 {
            counts[dice.draw(&mut rng, &1).face as usize] += 1;
        }
        assert_eq!(counts[0], 0);
        for face in 1..=6 {
            let share = counts[face] as f64 / 60_000.0;
            assert!((share - 1.0 / 6.0).abs() < 0.01, "face {face}: {share}");
        }
    }

    #[test]
    fn test_match_pays_six() {
        let dice = Dice::default();
        assert_eq!(dice.resolve(&4, &DiceDraw::new(4)).multiplier(), 6.0);
        assert!(!dice.resolve(&4, &DiceDraw::new(3)).is_win());
    }
}
