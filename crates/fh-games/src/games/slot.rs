//! Three-reel slot machine with a progressive jackpot
//!
//! Every spin draws a fresh weighted strip per reel and a stop position away
//! from the strip ends; two rows are visible per reel.

use serde::{Deserialize, Serialize};

use fh_stage::{GameKind, Notice};

use crate::config::{CasinoConfig, ConfigError, ConfigResult, SlotRules};
use crate::outcome::Outcome;
use crate::rng::{Randomizer, WeightedTable};
use crate::symbols::{ReelStrip, SlotSymbol, symbol_table};
use crate::timing::{Timeline, TimingConfig};

use super::{RoundGame, SessionRules};

/// Where one reel stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReelStop {
    pub strip: ReelStrip,
    pub position: usize,
    /// Visible symbols, top to bottom
    pub window: Vec<SlotSymbol>,
}

/// All reels of one spin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotDraw {
    pub reels: Vec<ReelStop>,
}

impl SlotDraw {
    /// A draw showing exactly these windows (forced rounds, tests)
    pub fn from_windows(windows: Vec<Vec<SlotSymbol>>) -> Self {
        let reels = windows
            .into_iter()
            .enumerate()
            .map(|(i, window)| ReelStop {
                strip: ReelStrip::new(i as u8, window.clone()),
                position: 0,
                window,
            })
            .collect();
        Self { reels }
    }

    /// Every visible symbol, reel by reel
    pub fn visible(&self) -> Vec<SlotSymbol> {
        self.reels
            .iter()
            .flat_map(|r| r.window.iter().copied())
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct Slot {
    rules: SlotRules,
    table: WeightedTable<SlotSymbol>,
}

impl Slot {
    pub fn new(rules: SlotRules) -> ConfigResult<Self> {
        rules.validate()?;
        let table = symbol_table(&rules.symbol_weights)
            .map_err(|source| ConfigError::Weights { game: "slot", source })?;
        Ok(Self { rules, table })
    }

    pub fn rules(&self) -> &SlotRules {
        &self.rules
    }

    pub fn symbol_table(&self) -> &WeightedTable<SlotSymbol> {
        &self.table
    }

    fn spin_reel(&self, reel_index: u8, rng: &mut Randomizer) -> ReelStop {
        let strip = ReelStrip::generate(reel_index, self.rules.strip_length, &self.table, rng);
        let margin = self.rules.stop_margin;
        let position = rng.uniform_usize(margin..self.rules.strip_length.saturating_sub(margin));
        let window = strip.window(position, self.rules.visible_rows);
        ReelStop {
            strip,
            position,
            window,
        }
    }
}

impl RoundGame for Slot {
    type Selection = ();
    type Draw = SlotDraw;

    const KIND: GameKind = GameKind::Slot;

    fn from_config(config: &CasinoConfig) -> ConfigResult<Self> {
        Self::new(config.slot.clone())
    }

    fn session_rules(config: &CasinoConfig) -> SessionRules {
        let rules = &config.slot;
        SessionRules {
            limits: rules.limits,
            recovery: rules
                .recovery
                .policy(rules.limits.min, config.starting_balance),
            jackpot: Some(rules.jackpot.pool()),
        }
    }

    fn default_selection(&self) -> Option<()> {
        Some(())
    }

    fn draw(&mut self, rng: &mut Randomizer, _selection: &()) -> SlotDraw {
        let reels = (0..self.rules.reels)
            .map(|i| self.spin_reel(i, rng))
            .collect();
        SlotDraw { reels }
    }

    fn resolve(&self, _selection: &(), draw: &SlotDraw) -> Outcome {
        self.rules.paytable.evaluate(&draw.visible())
    }

    fn describe(&self, draw: &SlotDraw) -> Vec<String> {
        draw.visible().iter().map(|s| s.glyph().to_string()).collect()
    }

    fn reveal(
        &self,
        draw: &SlotDraw,
        timing: &TimingConfig,
        timeline: &mut Timeline,
        rng: &mut Randomizer,
    ) -> Vec<(f64, Notice)> {
        let mut last_stop: f64 = 0.0;
        let mut notices: Vec<(f64, Notice)> = draw
            .reels
            .iter()
            .enumerate()
            .map(|(i, reel)| {
                let offset = timing.reel_stop_offset(i, rng.unit());
                last_stop = last_stop.max(offset);
                (
                    timeline.at(offset),
                    Notice::ReelStopped {
                        reel_index: i as u8,
                        position: reel.position,
                        symbols: reel.window.iter().map(|s| s.glyph().to_string()).collect(),
                    },
                )
            })
            .collect();
        notices.sort_by(|a, b| a.0.total_cmp(&b.0));
        timeline.advance_to(last_stop + timing.reel_settle_ms);
        notices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fh_stage::WinTier;
    use SlotSymbol::*;

    #[test]
    fn test_draw_shape() {
        let mut slot = Slot::new(SlotRules::default()).unwrap();
        let mut rng = Randomizer::seeded(77);
        for _ in 0..200 {
            let draw = slot.draw(&mut rng, &());
            assert_eq!(draw.reels.len(), 3);
            assert_eq!(draw.visible().len(), 6);
            for reel in &draw.reels {
                assert_eq!(reel.strip.len(), 50);
                assert!((5..45).contains(&reel.position));
                assert_eq!(reel.window[0], reel.strip.symbol_at(reel.position));
                assert_eq!(reel.window[1], reel.strip.symbol_at(reel.position + 1));
            }
        }
    }

    #[test]
    fn test_forced_windows() {
        let slot = Slot::new(SlotRules::default()).unwrap();
        let draw = SlotDraw::from_windows(vec![
            vec![Seven, Seven],
            vec![Seven, Cherry],
            vec![Cherry, Cherry],
        ]);
        let outcome = slot.resolve(&(), &draw);
        assert_eq!(outcome.tier, WinTier::Progressive);
        assert_eq!(slot.describe(&draw), vec!["7", "7", "7", "🍒", "🍒", "🍒"]);
    }

    #[test]
    fn test_reel_stops_in_order() {
        let slot = Slot::new(SlotRules::default()).unwrap();
        let mut rng = Randomizer::seeded(3);
        let draw = SlotDraw::from_windows(vec![vec![Bell, Bell]; 3]);
        let mut timeline = Timeline::new(0.0);
        let notices = slot.reveal(&draw, &TimingConfig::normal(), &mut timeline, &mut rng);

        assert_eq!(notices.len(), 3);
        assert!(notices[0].0 >= 2000.0 && notices[0].0 < 2500.0);
        assert!(notices[2].0 >= 3900.0 && notices[2].0 < 4400.0);
        assert_eq!(timeline.current(), notices[2].0 + 500.0);
    }

    #[test]
    fn test_reel_geometry_checked() {
        let mut rules = SlotRules::default();
        rules.strip_length = 10;
        assert!(matches!(
            Slot::new(rules),
            Err(ConfigError::Invalid { game: "slot", .. })
        ));
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let mut rules = SlotRules::default();
        for w in &mut rules.symbol_weights {
            w.weight = 0;
        }
        assert!(Slot::new(rules).is_err());
    }
}
