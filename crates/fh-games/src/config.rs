//! Casino configuration
//!
//! One document holds the shared wallet settings and the rules of every
//! game. Missing fields fall back to the standard machines, so an empty
//! file is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use fh_state::{BALANCE_KEY, DEFAULT_BALANCE};

use crate::bet::BetLimits;
use crate::paytable::SlotPaytable;
use crate::rng::{PrizeBand, PrizeBands, RngError};
use crate::settlement::{JackpotPool, RecoveryPolicy};
use crate::symbols::{SymbolWeight, default_symbol_weights, symbol_table};
use crate::timing::{TimingConfig, TimingProfile};

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid {game} rules: {reason}")]
    Invalid { game: &'static str, reason: String },

    #[error("Invalid {game} rules: {source}")]
    Weights {
        game: &'static str,
        #[source]
        source: RngError,
    },
}

impl ConfigError {
    fn invalid(game: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            game,
            reason: reason.into(),
        }
    }
}

/// Low-balance recovery settings (threshold comes from the game's minimum stake)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryRules {
    pub enabled: bool,
    pub delay_ms: f64,
}

impl RecoveryRules {
    pub fn after(delay_ms: f64) -> Self {
        Self {
            enabled: true,
            delay_ms,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            delay_ms: 0.0,
        }
    }

    /// Policy for a game whose cheapest stake is `threshold`
    pub fn policy(&self, threshold: u64, reset_to: u64) -> Option<RecoveryPolicy> {
        self.enabled.then_some(RecoveryPolicy {
            threshold,
            delay_ms: self.delay_ms,
            reset_to,
        })
    }
}

impl Default for RecoveryRules {
    fn default() -> Self {
        Self::after(3000.0)
    }
}

/// Progressive pool settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JackpotRules {
    pub seed: f64,
    /// Share of every bet added to the pool
    pub contribution_rate: f64,
}

impl JackpotRules {
    pub fn pool(&self) -> JackpotPool {
        JackpotPool::new(self.seed, self.contribution_rate)
    }
}

impl Default for JackpotRules {
    fn default() -> Self {
        Self {
            seed: 5000.0,
            contribution_rate: 0.1,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// PER-GAME RULES
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinFlipRules {
    pub limits: BetLimits,
    /// Chance that the called face comes up
    pub win_probability: f64,
    pub multiplier: f64,
    pub recovery: RecoveryRules,
}

impl Default for CoinFlipRules {
    fn default() -> Self {
        Self {
            limits: BetLimits::coin_flip(),
            win_probability: 0.48,
            multiplier: 2.0,
            recovery: RecoveryRules::after(3000.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiceRules {
    pub limits: BetLimits,
    pub faces: u8,
    pub multiplier: f64,
    pub recovery: RecoveryRules,
}

impl Default for DiceRules {
    fn default() -> Self {
        Self {
            limits: BetLimits::dice(),
            faces: 6,
            multiplier: 6.0,
            recovery: RecoveryRules::after(3000.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouletteRules {
    pub limits: BetLimits,
    pub multiplier: f64,
    /// Full turns per spin are drawn in [min_turns, min_turns + extra_turns)
    pub min_turns: f64,
    pub extra_turns: f64,
    pub recovery: RecoveryRules,
}

impl Default for RouletteRules {
    fn default() -> Self {
        Self {
            limits: BetLimits::roulette(),
            multiplier: 36.0,
            min_turns: 5.0,
            extra_turns: 3.0,
            recovery: RecoveryRules::after(5000.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotRules {
    pub limits: BetLimits,
    pub reels: u8,
    pub symbol_weights: Vec<SymbolWeight>,
    /// Symbols drawn per reel per spin
    pub strip_length: usize,
    /// Stop positions keep this far from either end of the strip
    pub stop_margin: usize,
    pub visible_rows: usize,
    pub paytable: SlotPaytable,
    pub jackpot: JackpotRules,
    pub recovery: RecoveryRules,
}

impl Default for SlotRules {
    fn default() -> Self {
        Self {
            limits: BetLimits::slot(),
            reels: 3,
            symbol_weights: default_symbol_weights(),
            strip_length: 50,
            stop_margin: 5,
            visible_rows: 2,
            paytable: SlotPaytable::standard(),
            jackpot: JackpotRules::default(),
            recovery: RecoveryRules::after(3000.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScratchRules {
    pub ticket_price: u64,
    pub prize_bands: Vec<PrizeBand>,
    /// Prizes at or above this are presented as a jackpot
    pub jackpot_threshold: u64,
    pub surface_width: f64,
    pub surface_height: f64,
    /// Coverage grid resolution (px)
    pub cell_size: f64,
    pub brush_radius: f64,
    /// Interpolation step for strokes (px)
    pub stroke_step: f64,
    /// Coverage (%) that reveals the prize
    pub reveal_percent: f64,
    pub recovery: RecoveryRules,
}

impl Default for ScratchRules {
    fn default() -> Self {
        Self {
            ticket_price: 200,
            prize_bands: vec![
                PrizeBand::new(0, 0, 0.70),
                PrizeBand::new(1, 20, 0.20),
                PrizeBand::new(21, 50, 0.06),
                PrizeBand::new(51, 100, 0.03),
                PrizeBand::new(200, 500, 0.01),
            ],
            jackpot_threshold: 200,
            surface_width: 300.0,
            surface_height: 150.0,
            cell_size: 5.0,
            brush_radius: 20.0,
            stroke_step: 5.0,
            reveal_percent: 25.0,
            recovery: RecoveryRules::after(3000.0),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// CASINO CONFIG
// ═══════════════════════════════════════════════════════════════════════════

/// Complete configuration for every game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CasinoConfig {
    /// Balance for a new player and after a recovery
    pub starting_balance: u64,
    /// Store key shared by all games
    pub balance_key: String,
    pub timing: TimingProfile,
    pub coin_flip: CoinFlipRules,
    pub dice: DiceRules,
    pub roulette: RouletteRules,
    pub slot: SlotRules,
    pub scratch: ScratchRules,
}

impl Default for CasinoConfig {
    fn default() -> Self {
        Self {
            starting_balance: DEFAULT_BALANCE,
            balance_key: BALANCE_KEY.to_string(),
            timing: TimingProfile::Normal,
            coin_flip: CoinFlipRules::default(),
            dice: DiceRules::default(),
            roulette: RouletteRules::default(),
            slot: SlotRules::default(),
            scratch: ScratchRules::default(),
        }
    }
}

impl CasinoConfig {
    /// Defaults with zero delays
    pub fn instant() -> Self {
        Self {
            timing: TimingProfile::Instant,
            ..Self::default()
        }
    }

    pub fn with_timing(mut self, timing: TimingProfile) -> Self {
        self.timing = timing;
        self
    }

    pub fn timing_config(&self) -> TimingConfig {
        TimingConfig::from_profile(self.timing)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let config = match ext.as_str() {
            "json" => Self::from_json(&content)?,
            "yaml" | "yml" => Self::from_yaml(&content)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        log::info!("Loaded casino config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate JSON
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate YAML
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yml::to_string(self)?)
    }

    /// Check bounds, probabilities and tables
    pub fn validate(&self) -> ConfigResult<()> {
        self.coin_flip.validate()?;
        self.dice.validate()?;
        self.roulette.validate()?;
        self.slot.validate()?;
        self.scratch.validate()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// VALIDATION
// ═══════════════════════════════════════════════════════════════════════════

impl CoinFlipRules {
    pub fn validate(&self) -> ConfigResult<()> {
        validate_limits("coin flip", &self.limits)?;
        if !(0.0..=1.0).contains(&self.win_probability) {
            return Err(ConfigError::invalid(
                "coin flip",
                "win probability must be within [0, 1]",
            ));
        }
        Ok(())
    }
}

impl DiceRules {
    pub fn validate(&self) -> ConfigResult<()> {
        validate_limits("dice", &self.limits)?;
        if self.faces < 2 {
            return Err(ConfigError::invalid("dice", "a die needs at least two faces"));
        }
        Ok(())
    }
}

impl RouletteRules {
    pub fn validate(&self) -> ConfigResult<()> {
        validate_limits("roulette", &self.limits)?;
        if self.min_turns < 0.0 || self.extra_turns < 0.0 {
            return Err(ConfigError::invalid("roulette", "turn counts must be positive"));
        }
        Ok(())
    }
}

impl SlotRules {
    /// Limits, reel geometry and symbol weights
    pub fn validate(&self) -> ConfigResult<()> {
        validate_limits("slot", &self.limits)?;
        if self.reels == 0 || self.visible_rows == 0 {
            return Err(ConfigError::invalid("slot", "needs at least one reel and one row"));
        }
        if self.strip_length < 2 * self.stop_margin + self.visible_rows {
            return Err(ConfigError::invalid(
                "slot",
                format!(
                    "strip of {} cannot fit margin {} and {} rows",
                    self.strip_length, self.stop_margin, self.visible_rows
                ),
            ));
        }
        symbol_table(&self.symbol_weights)
            .map_err(|source| ConfigError::Weights { game: "slot", source })?;
        Ok(())
    }
}

impl ScratchRules {
    pub fn bands(&self) -> Result<PrizeBands, RngError> {
        PrizeBands::new(self.prize_bands.clone())
    }

    /// Price, prize bands and surface geometry
    pub fn validate(&self) -> ConfigResult<()> {
        self.bands()
            .map_err(|source| ConfigError::Weights { game: "scratch", source })?;
        if self.ticket_price == 0 {
            return Err(ConfigError::invalid("scratch", "ticket price must be positive"));
        }
        let surface = [self.cell_size, self.surface_width, self.surface_height];
        if surface.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(ConfigError::invalid("scratch", "surface and cells must be positive"));
        }
        if !self.brush_radius.is_finite() || self.brush_radius < 0.0 {
            return Err(ConfigError::invalid("scratch", "brush radius must not be negative"));
        }
        if !(0.0..=100.0).contains(&self.reveal_percent) {
            return Err(ConfigError::invalid("scratch", "reveal percent must be within [0, 100]"));
        }
        Ok(())
    }
}

fn validate_limits(game: &'static str, limits: &BetLimits) -> ConfigResult<()> {
    if limits.min == 0 {
        return Err(ConfigError::invalid(game, "minimum bet must be positive"));
    }
    if limits.min > limits.max {
        return Err(ConfigError::invalid(
            game,
            format!("minimum bet {} above maximum {}", limits.min, limits.max),
        ));
    }
    if limits.increase_step == 0 || limits.decrease_step == 0 {
        return Err(ConfigError::invalid(game, "bet steps must be positive"));
    }
    Ok(())
}
