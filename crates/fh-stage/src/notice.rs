//! Notice: the core enum defining everything presentation is told
//!
//! A Notice is NOT an animation, NOT a DOM event.
//! A Notice is the SEMANTIC MEANING of a moment in a round.

use serde::{Deserialize, Serialize};

use crate::taxonomy::{CoinFace, GameKind, WheelColor, WinTier};

/// Canonical notice: the universal language between core and presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notice {
    // ═══════════════════════════════════════════════════════════════════════
    // ROUND LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════════
    /// Start accepted, bet debited
    RoundStarted {
        game: GameKind,
        round_id: u64,
        bet: u64,
    },

    /// Outcome fully presented, session is idle again
    RoundComplete {
        game: GameKind,
        round_id: u64,
    },

    /// Win/loss classification of the round
    RoundResolved {
        summary: OutcomeSummary,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // OUTCOME REVEALS ("animate to position X")
    // ═══════════════════════════════════════════════════════════════════════
    /// Coin came to rest
    CoinLanded {
        face: CoinFace,
    },

    /// Die came to rest
    DieLanded {
        face: u8,
    },

    /// Wheel stopped under the pointer
    WheelStopped {
        /// Total accumulated wheel rotation (degrees)
        rotation: f64,
        number: u8,
        color: WheelColor,
    },

    /// One reel stopped
    ReelStopped {
        /// Which reel stopped (0-indexed)
        reel_index: u8,
        /// Strip position of the top visible symbol
        position: usize,
        /// Visible symbols (top to bottom)
        #[serde(default)]
        symbols: Vec<String>,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // WALLET
    // ═══════════════════════════════════════════════════════════════════════
    /// Balance changed (debit or credit)
    BalanceChanged {
        balance: u64,
    },

    /// Progressive pool changed
    JackpotChanged {
        pool: f64,
    },

    /// Low balance recovery restored the starting balance
    BalanceRecovered {
        balance: u64,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // SCRATCH TICKETS
    // ═══════════════════════════════════════════════════════════════════════
    /// Ticket bought, price debited
    TicketPurchased {
        ticket_id: u64,
        price: u64,
    },

    /// Coverage moved
    ScratchProgress {
        ticket_id: u64,
        percent: f64,
    },

    /// Coverage threshold crossed, prize shown
    TicketRevealed {
        ticket_id: u64,
        prize: u64,
        tier: WinTier,
    },

    /// Ticket dismissed, prize credited
    TicketCollected {
        ticket_id: u64,
        prize: u64,
    },
}

impl Notice {
    /// Get the category of this notice
    pub fn category(&self) -> NoticeCategory {
        match self {
            Notice::RoundStarted { .. }
            | Notice::RoundComplete { .. }
            | Notice::RoundResolved { .. } => NoticeCategory::Round,

            Notice::CoinLanded { .. }
            | Notice::DieLanded { .. }
            | Notice::WheelStopped { .. }
            | Notice::ReelStopped { .. } => NoticeCategory::Reveal,

            Notice::BalanceChanged { .. }
            | Notice::JackpotChanged { .. }
            | Notice::BalanceRecovered { .. } => NoticeCategory::Wallet,

            Notice::TicketPurchased { .. }
            | Notice::ScratchProgress { .. }
            | Notice::TicketRevealed { .. }
            | Notice::TicketCollected { .. } => NoticeCategory::Ticket,
        }
    }

    /// Get notice type name (matches the serde tag)
    pub fn type_name(&self) -> &'static str {
        match self {
            Notice::RoundStarted { .. } => "round_started",
            Notice::RoundComplete { .. } => "round_complete",
            Notice::RoundResolved { .. } => "round_resolved",
            Notice::CoinLanded { .. } => "coin_landed",
            Notice::DieLanded { .. } => "die_landed",
            Notice::WheelStopped { .. } => "wheel_stopped",
            Notice::ReelStopped { .. } => "reel_stopped",
            Notice::BalanceChanged { .. } => "balance_changed",
            Notice::JackpotChanged { .. } => "jackpot_changed",
            Notice::BalanceRecovered { .. } => "balance_recovered",
            Notice::TicketPurchased { .. } => "ticket_purchased",
            Notice::ScratchProgress { .. } => "scratch_progress",
            Notice::TicketRevealed { .. } => "ticket_revealed",
            Notice::TicketCollected { .. } => "ticket_collected",
        }
    }

    /// Does this notice end a round?
    pub fn is_terminal(&self) -> bool {
        matches!(self, Notice::RoundComplete { .. } | Notice::TicketCollected { .. })
    }

    /// Balance carried by this notice, if any
    pub fn balance(&self) -> Option<u64> {
        match self {
            Notice::BalanceChanged { balance } | Notice::BalanceRecovered { balance } => {
                Some(*balance)
            }
            _ => None,
        }
    }
}

/// Notice category for grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeCategory {
    Round,
    Reveal,
    Wallet,
    Ticket,
}

impl NoticeCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Round => "Round",
            Self::Reveal => "Reveal",
            Self::Wallet => "Wallet",
            Self::Ticket => "Ticket",
        }
    }
}

/// Presentation-ready summary of a resolved round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeSummary {
    pub game: GameKind,
    /// Human label ("Three Sevens", "Rolled 4", "No Match")
    pub label: String,
    /// What was drawn, rendered as text (symbols, numbers, faces)
    #[serde(default)]
    pub drawn: Vec<String>,
    pub tier: WinTier,
    /// Bet multiplier (0 on a loss)
    pub multiplier: f64,
    /// Total credited, including any jackpot pool
    pub payout: u64,
    /// Progressive pool included in payout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jackpot_paid: Option<f64>,
    /// Loss that looked close to a win (presentation flavour only)
    #[serde(default)]
    pub near_miss: bool,
}

impl OutcomeSummary {
    pub fn is_win(&self) -> bool {
        self.payout > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_categories() {
        assert_eq!(
            Notice::BalanceChanged { balance: 10 }.category(),
            NoticeCategory::Wallet
        );
        assert_eq!(Notice::DieLanded { face: 3 }.category(), NoticeCategory::Reveal);
        assert!(Notice::RoundComplete {
            game: GameKind::Dice,
            round_id: 1
        }
        .is_terminal());
    }

    #[test]
    fn test_serde_tag_matches_type_name() {
        let notice = Notice::WheelStopped {
            rotation: 720.0,
            number: 26,
            color: WheelColor::Black,
        };
        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(json["type"], notice.type_name());

        let back: Notice = serde_json::from_value(json).unwrap();
        assert_eq!(back, notice);
    }

    #[test]
    fn test_balance_accessor() {
        assert_eq!(Notice::BalanceRecovered { balance: 1000 }.balance(), Some(1000));
        assert_eq!(Notice::JackpotChanged { pool: 5.0 }.balance(), None);
    }
}
