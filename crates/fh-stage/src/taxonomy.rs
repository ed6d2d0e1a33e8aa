//! Notice Taxonomy: enums for game elements
//!
//! Classifies the games, win tiers and the few outcome values that the
//! presentation layer needs to render (coin faces, wheel colours).

use serde::{Deserialize, Serialize};

/// Which mini-game a notice belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    CoinFlip,
    Dice,
    Roulette,
    Slot,
    Scratch,
}

impl GameKind {
    /// All games, in lobby order
    pub const ALL: [GameKind; 5] = [
        GameKind::CoinFlip,
        GameKind::Dice,
        GameKind::Roulette,
        GameKind::Slot,
        GameKind::Scratch,
    ];

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::CoinFlip => "Coin Flip",
            Self::Dice => "Dice",
            Self::Roulette => "Roulette",
            Self::Slot => "Slot Machine",
            Self::Scratch => "Scratch Ticket",
        }
    }

    /// Short identifier (used by the simulator CLI and trace ids)
    pub fn code(&self) -> &'static str {
        match self {
            Self::CoinFlip => "coin",
            Self::Dice => "dice",
            Self::Roulette => "roulette",
            Self::Slot => "slot",
            Self::Scratch => "scratch",
        }
    }

    /// Parse a short identifier
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|g| g.code().eq_ignore_ascii_case(code))
    }
}

impl std::fmt::Display for GameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Win tier classification
///
/// Decides how loud the celebration is. Tiers are chosen by the resolver,
/// not derived from the payout ratio:
/// - Loss: nothing paid
/// - Win: ordinary payout
/// - Jackpot: premium combination (three 💰/💎, pair of 7s, ticket ≥ 200)
/// - Progressive: progressive pool paid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinTier {
    Loss,
    Win,
    Jackpot,
    Progressive,
}

impl WinTier {
    /// Anything that pays
    pub fn is_win(&self) -> bool {
        !matches!(self, Self::Loss)
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loss => "NO WIN",
            Self::Win => "WIN",
            Self::Jackpot => "JACKPOT",
            Self::Progressive => "PROGRESSIVE JACKPOT",
        }
    }
}

/// Coin face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoinFace {
    Heads,
    Tails,
}

impl CoinFace {
    /// The other side of the coin
    pub fn opposite(self) -> Self {
        match self {
            Self::Heads => Self::Tails,
            Self::Tails => Self::Heads,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Heads => "HEADS",
            Self::Tails => "TAILS",
        }
    }
}

/// Roulette pocket colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WheelColor {
    Red,
    Black,
    Green,
}

impl WheelColor {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Red => "Red",
            Self::Black => "Black",
            Self::Green => "Green",
        }
    }
}
