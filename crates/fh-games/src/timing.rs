//! Timing profiles for notice scheduling
//!
//! The core never sleeps. Every delay here becomes an offset on a
//! [`Timeline`], and the session releases notices as its clock advances.

use serde::{Deserialize, Serialize};

/// Timing profile for notice scheduling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingProfile {
    /// Normal gameplay timing
    #[default]
    Normal,
    /// Everything at half length
    Turbo,
    /// Zero delays (simulation, tests)
    Instant,
    /// Scaled from another profile
    Custom,
}

/// Detailed timing configuration (all values in ms)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Profile type
    pub profile: TimingProfile,

    /// Coin spin before it lands
    pub coin_flip_ms: f64,
    /// Pause between landing and the result
    pub coin_settle_ms: f64,

    /// Die tumble before it lands
    pub dice_roll_ms: f64,
    /// Pause between landing and the result
    pub dice_settle_ms: f64,

    /// Wheel spin until the pointer reading
    pub wheel_spin_ms: f64,

    /// Spin time of the first reel
    pub reel_spin_ms: f64,
    /// Extra spin time per following reel
    pub reel_stop_interval_ms: f64,
    /// Delay between reel starts
    pub reel_start_stagger_ms: f64,
    /// Random extra spin per reel, drawn in [0, jitter)
    pub reel_jitter_ms: f64,
    /// Pause after the last reel before the result
    pub reel_settle_ms: f64,

    /// Delay between a ticket reveal and its prize display
    pub scratch_reveal_ms: f64,
}

impl TimingConfig {
    /// Normal gameplay timing
    pub fn normal() -> Self {
        Self {
            profile: TimingProfile::Normal,
            coin_flip_ms: 3000.0,
            coin_settle_ms: 500.0,
            dice_roll_ms: 1550.0,
            dice_settle_ms: 500.0,
            wheel_spin_ms: 4000.0,
            reel_spin_ms: 2000.0,
            reel_stop_interval_ms: 800.0,
            reel_start_stagger_ms: 150.0,
            reel_jitter_ms: 500.0,
            reel_settle_ms: 500.0,
            scratch_reveal_ms: 1500.0,
        }
    }

    /// Turbo mode
    pub fn turbo() -> Self {
        Self {
            profile: TimingProfile::Turbo,
            ..Self::normal().scaled(0.5)
        }
    }

    /// No delays at all
    pub fn instant() -> Self {
        Self {
            profile: TimingProfile::Instant,
            ..Self::normal().scaled(0.0)
        }
    }

    /// Get config for profile
    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Normal | TimingProfile::Custom => Self::normal(),
            TimingProfile::Turbo => Self::turbo(),
            TimingProfile::Instant => Self::instant(),
        }
    }

    /// Scale timing by factor (< 1.0 = faster)
    pub fn scaled(&self, factor: f64) -> Self {
        let factor = factor.max(0.0);
        Self {
            profile: TimingProfile::Custom,
            coin_flip_ms: self.coin_flip_ms * factor,
            coin_settle_ms: self.coin_settle_ms * factor,
            dice_roll_ms: self.dice_roll_ms * factor,
            dice_settle_ms: self.dice_settle_ms * factor,
            wheel_spin_ms: self.wheel_spin_ms * factor,
            reel_spin_ms: self.reel_spin_ms * factor,
            reel_stop_interval_ms: self.reel_stop_interval_ms * factor,
            reel_start_stagger_ms: self.reel_start_stagger_ms * factor,
            reel_jitter_ms: self.reel_jitter_ms * factor,
            reel_settle_ms: self.reel_settle_ms * factor,
            scratch_reveal_ms: self.scratch_reveal_ms * factor,
        }
    }

    /// Offset at which reel `index` stops, given its jitter roll in [0, 1)
    pub fn reel_stop_offset(&self, index: usize, jitter_roll: f64) -> f64 {
        let i = index as f64;
        self.reel_start_stagger_ms * i
            + self.reel_spin_ms
            + self.reel_stop_interval_ms * i
            + self.reel_jitter_ms * jitter_roll
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::normal()
    }
}

/// Offset generator for the notices of one round
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timeline {
    origin_ms: f64,
    current_ms: f64,
}

impl Timeline {
    /// Start at `origin_ms` on the session clock
    pub fn new(origin_ms: f64) -> Self {
        Self {
            origin_ms,
            current_ms: origin_ms,
        }
    }

    pub fn origin(&self) -> f64 {
        self.origin_ms
    }

    /// Get current timestamp
    pub fn current(&self) -> f64 {
        self.current_ms
    }

    /// Advance by duration and return new timestamp
    pub fn advance(&mut self, duration_ms: f64) -> f64 {
        self.current_ms += duration_ms.max(0.0);
        self.current_ms
    }

    /// Absolute time of an offset from the origin (cursor unchanged)
    pub fn at(&self, offset_ms: f64) -> f64 {
        self.origin_ms + offset_ms.max(0.0)
    }

    /// Move the cursor to an offset from the origin, never backwards
    pub fn advance_to(&mut self, offset_ms: f64) -> f64 {
        self.current_ms = self.current_ms.max(self.at(offset_ms));
        self.current_ms
    }

    /// Elapsed since origin
    pub fn elapsed(&self) -> f64 {
        self.current_ms - self.origin_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_profiles() {
        let normal = TimingConfig::normal();
        let turbo = TimingConfig::turbo();
        let instant = TimingConfig::instant();

        assert!(turbo.coin_flip_ms < normal.coin_flip_ms);
        assert_eq!(turbo.profile, TimingProfile::Turbo);
        assert_eq!(instant.wheel_spin_ms, 0.0);
        assert_eq!(instant.profile, TimingProfile::Instant);
    }

    #[test]
    fn test_reel_stop_offsets() {
        let timing = TimingConfig::normal();
        assert_eq!(timing.reel_stop_offset(0, 0.0), 2000.0);
        assert_eq!(timing.reel_stop_offset(1, 0.0), 2950.0);
        assert_eq!(timing.reel_stop_offset(2, 1.0), 2000.0 + 1900.0 + 500.0);
    }

    #[test]
    fn test_timeline() {
        let mut timeline = Timeline::new(1000.0);
        assert_eq!(timeline.advance(3000.0), 4000.0);
        assert_eq!(timeline.at(500.0), 1500.0);
        assert_eq!(timeline.advance_to(200.0), 4000.0);
        assert_eq!(timeline.advance_to(4500.0), 5500.0);
        assert_eq!(timeline.elapsed(), 4500.0);
    }
}
