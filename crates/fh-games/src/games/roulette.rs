//! European roulette, straight-up bets only
//!
//! The wheel keeps its accumulated rotation between rounds. The number under
//! the pointer is read back from that rotation:
//!
//! ```text
//! norm  = rotation mod 360
//! index = (N - 1 - floor(norm / seg)) mod N      seg = 360 / N
//! ```

use serde::{Deserialize, Serialize};

use fh_stage::{GameKind, Notice, WheelColor, WinTier};

use crate::config::{CasinoConfig, ConfigResult, RouletteRules};
use crate::outcome::Outcome;
use crate::rng::Randomizer;
use crate::timing::{Timeline, TimingConfig};

use super::{RoundGame, SessionRules};

/// Pocket order clockwise from the pointer at rest
pub const EUROPEAN_LAYOUT: [u8; 37] = [
    0, 32, 15, 19, 4, 21, 2, 25, 17, 34, 6, 27, 13, 36, 11, 30, 8, 23, 10, 5, 24, 16, 33, 1, 20,
    14, 31, 9, 22, 18, 29, 7, 28, 12, 35, 3, 26,
];

pub const RED_NUMBERS: [u8; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];

/// Wheel geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wheel;

impl Wheel {
    pub fn pockets(&self) -> usize {
        EUROPEAN_LAYOUT.len()
    }

    /// Angular width of one pocket (degrees)
    pub fn segment(&self) -> f64 {
        360.0 / self.pockets() as f64
    }

    /// Layout index under the pointer
    pub fn index_at(&self, rotation: f64) -> usize {
        let n = self.pockets();
        let norm = rotation.rem_euclid(360.0);
        let passed = ((norm / self.segment()).floor() as usize).min(n - 1);
        (n - 1 - passed) % n
    }

    /// Number under the pointer
    pub fn number_at(&self, rotation: f64) -> u8 {
        EUROPEAN_LAYOUT[self.index_at(rotation)]
    }

    /// Segment-centre angle in [0, 360) that lands on `number`
    pub fn rotation_for(&self, number: u8) -> Option<f64> {
        let n = self.pockets();
        let index = EUROPEAN_LAYOUT.iter().position(|&p| p == number)?;
        let passed = n - 1 - index;
        Some((passed as f64 + 0.5) * self.segment())
    }

    pub fn color_of(&self, number: u8) -> WheelColor {
        if number == 0 {
            WheelColor::Green
        } else if RED_NUMBERS.contains(&number) {
            WheelColor::Red
        } else {
            WheelColor::Black
        }
    }

    pub fn contains(&self, number: u8) -> bool {
        EUROPEAN_LAYOUT.contains(&number)
    }
}

/// One spin of the wheel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouletteDraw {
    /// Degrees added this round
    pub spin: f64,
    /// Accumulated rotation after the spin
    pub rotation: f64,
}

#[derive(Debug, Clone)]
pub struct Roulette {
    rules: RouletteRules,
    wheel: Wheel,
    total_rotation: f64,
}

impl Roulette {
    pub fn new(rules: RouletteRules) -> Self {
        Self {
            rules,
            wheel: Wheel,
            total_rotation: 0.0,
        }
    }

    pub fn wheel(&self) -> &Wheel {
        &self.wheel
    }

    pub fn total_rotation(&self) -> f64 {
        self.total_rotation
    }

    /// A spin from the current wheel position that stops on `number`
    pub fn draw_landing_on(&self, number: u8) -> Option<RouletteDraw> {
        let target = self.wheel.rotation_for(number)?;
        let current = self.total_rotation.rem_euclid(360.0);
        let delta = (target - current).rem_euclid(360.0);
        let spin = self.rules.min_turns.ceil() * 360.0 + delta;
        Some(RouletteDraw {
            spin,
            rotation: self.total_rotation + spin,
        })
    }
}

impl Default for Roulette {
    fn default() -> Self {
        Self::new(RouletteRules::default())
    }
}

impl RoundGame for Roulette {
    type Selection = u8;
    type Draw = RouletteDraw;

    const KIND: GameKind = GameKind::Roulette;

    fn from_config(config: &CasinoConfig) -> ConfigResult<Self> {
        config.roulette.validate()?;
        Ok(Self::new(config.roulette.clone()))
    }

    fn session_rules(config: &CasinoConfig) -> SessionRules {
        let rules = &config.roulette;
        SessionRules {
            limits: rules.limits,
            recovery: rules
                .recovery
                .policy(rules.limits.min, config.starting_balance),
            jackpot: None,
        }
    }

    fn is_valid_selection(&self, selection: &u8) -> bool {
        self.wheel.contains(*selection)
    }

    fn draw(&mut self, rng: &mut Randomizer, _selection: &u8) -> RouletteDraw {
        let turns = self.rules.min_turns + rng.unit() * self.rules.extra_turns;
        let spin = turns * 360.0 + rng.unit() * 360.0;
        self.total_rotation += spin;
        RouletteDraw {
            spin,
            rotation: self.total_rotation,
        }
    }

    fn resolve(&self, selection: &u8, draw: &RouletteDraw) -> Outcome {
        let number = self.wheel.number_at(draw.rotation);
        let label = format!("{} {}", number, self.wheel.color_of(number).display_name());
        if number == *selection {
            Outcome::multiple(self.rules.multiplier, WinTier::Win, label)
        } else {
            Outcome::loss(label)
        }
    }

    fn accept_forced(&mut self, draw: &RouletteDraw) {
        self.total_rotation = draw.rotation;
    }

    fn describe(&self, draw: &RouletteDraw) -> Vec<String> {
        vec![self.wheel.number_at(draw.rotation).to_string()]
    }

    fn reveal(
        &self,
        draw: &RouletteDraw,
        timing: &TimingConfig,
        timeline: &mut Timeline,
        _rng: &mut Randomizer,
    ) -> Vec<(f64, Notice)> {
        let stopped = timeline.advance(timing.wheel_spin_ms);
        let number = self.wheel.number_at(draw.rotation);
        vec![(
            stopped,
            Notice::WheelStopped {
                rotation: draw.rotation,
                number,
                color: self.wheel.color_of(number),
            },
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_rotation_reads_last_pocket() {
        assert_eq!(Wheel.number_at(0.0), EUROPEAN_LAYOUT[36]);
        assert_eq!(Wheel.number_at(0.0), 26);
    }

    #[test]
    fn test_one_segment_reads_second_to_last() {
        let seg = Wheel.segment();
        assert_eq!(Wheel.number_at(seg), EUROPEAN_LAYOUT[35]);
        assert_eq!(Wheel.number_at(seg), 3);
    }

    #[test]
    fn test_periodic_in_full_turns() {
        for step in 0..720 {
            let theta = step as f64 * 0.5 + 0.01;
            for k in [-3.0, 1.0, 7.0] {
                assert_eq!(Wheel.number_at(theta + k * 360.0), Wheel.number_at(theta));
            }
        }
    }

    #[test]
    fn test_rotation_for_every_number() {
        for number in 0..=36u8 {
            let angle = Wheel.rotation_for(number).unwrap();
            assert_eq!(Wheel.number_at(angle), number);
            assert_eq!(Wheel.number_at(angle + 1080.0), number);
        }
        assert!(Wheel.rotation_for(37).is_none());
    }

    #[test]
    fn test_colors() {
        assert_eq!(Wheel.color_of(0), WheelColor::Green);
        assert_eq!(Wheel.color_of(32), WheelColor::Red);
        assert_eq!(Wheel.color_of(15), WheelColor::Black);
    }

    #[test]
    fn test_rotation_accumulates() {
        let mut roulette = Roulette::default();
        let mut rng = Randomizer::seeded(5);
        let first = roulette.draw(&mut rng, &0);
        let second = roulette.draw(&mut rng, &0);
        assert!(first.spin >= 5.0 * 360.0 && first.spin < 9.0 * 360.0);
        assert!((second.rotation - (first.rotation + second.spin)).abs() < 1e-9);
        assert_eq!(roulette.total_rotation(), second.rotation);
    }

    #[test]
    fn test_draw_landing_on() {
        let mut roulette = Roulette::default();
        let mut rng = Randomizer::seeded(8);
        roulette.draw(&mut rng, &0);

        let forced = roulette.draw_landing_on(17).unwrap();
        assert!(forced.rotation > roulette.total_rotation());
        assert_eq!(roulette.resolve(&17, &forced).multiplier(), 36.0);
        assert_eq!(roulette.resolve(&17, &forced).label, "17 Black");
    }
}
