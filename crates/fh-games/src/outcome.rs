//! Round outcomes and results

use serde::{Deserialize, Serialize};

use fh_stage::{GameKind, OutcomeSummary, WinTier};

/// What a resolved round pays
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Payout {
    /// Loss
    Nothing,
    /// Bet multiplier (2×, 6×, 36×, 1.2×, ...)
    Multiple(f64),
}

/// Classification of a round by its resolver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub payout: Payout,
    pub tier: WinTier,
    /// Human label ("Three Sevens", "Rolled 4", ...)
    pub label: String,
    /// Presentation hint only, never affects settlement
    #[serde(default)]
    pub near_miss: bool,
}

impl Outcome {
    pub fn loss(label: impl Into<String>) -> Self {
        Self {
            payout: Payout::Nothing,
            tier: WinTier::Loss,
            label: label.into(),
            near_miss: false,
        }
    }

    pub fn multiple(multiplier: f64, tier: WinTier, label: impl Into<String>) -> Self {
        Self {
            payout: Payout::Multiple(multiplier),
            tier,
            label: label.into(),
            near_miss: false,
        }
    }

    pub fn with_near_miss(mut self, near_miss: bool) -> Self {
        self.near_miss = near_miss;
        self
    }

    pub fn is_win(&self) -> bool {
        !matches!(self.payout, Payout::Nothing)
    }

    /// Pays the progressive pool on top of the multiplier
    pub fn is_progressive(&self) -> bool {
        self.tier == WinTier::Progressive
    }

    /// Bet multiplier (0 for losses)
    pub fn multiplier(&self) -> f64 {
        match self.payout {
            Payout::Multiple(m) => m,
            _ => 0.0,
        }
    }
}

/// Everything that happened in one round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult<S, D> {
    pub round_id: u64,
    pub game: GameKind,
    pub bet: u64,
    pub selection: S,
    pub draw: D,
    pub outcome: Outcome,
    /// Total credited, including any jackpot pool
    pub payout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jackpot_paid: Option<f64>,
    pub balance_after: u64,
}

impl<S, D> RoundResult<S, D> {
    pub fn is_win(&self) -> bool {
        self.payout > 0
    }

    /// Balance change over the round
    pub fn net(&self) -> i64 {
        self.payout as i64 - self.bet as i64
    }

    /// Presentation summary
    pub fn summary(&self, drawn: Vec<String>) -> OutcomeSummary {
        OutcomeSummary {
            game: self.game,
            label: self.outcome.label.clone(),
            drawn,
            tier: self.outcome.tier,
            multiplier: self.outcome.multiplier(),
            payout: self.payout,
            jackpot_paid: self.jackpot_paid,
            near_miss: self.outcome.near_miss,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiple_and_loss() {
        let outcome = Outcome::multiple(6.0, WinTier::Win, "Rolled 4").with_near_miss(true);
        assert!(outcome.is_win());
        assert_eq!(outcome.multiplier(), 6.0);
        assert!(outcome.near_miss);

        let loss = Outcome::loss("Rolled 2");
        assert!(!loss.is_win());
        assert_eq!(loss.tier, WinTier::Loss);
        assert_eq!(loss.multiplier(), 0.0);
    }

    #[test]
    fn test_net() {
        let result = RoundResult {
            round_id: 1,
            game: GameKind::CoinFlip,
            bet: 100,
            selection: (),
            draw: (),
            outcome: Outcome::loss("TAILS"),
            payout: 0,
            jackpot_paid: None,
            balance_after: 900,
        };
        assert_eq!(result.net(), -100);
        assert!(!result.is_win());
        assert_eq!(result.summary(vec!["TAILS".into()]).multiplier, 0.0);
    }
}
