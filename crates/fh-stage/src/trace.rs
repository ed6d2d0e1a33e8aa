//! NoticeTrace: a complete sequence of notice events for one round/session
//!
//! A trace captures everything a session told its presenter, in order.
//! It is itself a `Presenter`, so it can be plugged in wherever one is expected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::NoticeEvent;
use crate::notice::{Notice, NoticeCategory};
use crate::presenter::Presenter;
use crate::taxonomy::{GameKind, WinTier};

/// A complete trace of notice events for one round or session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoticeTrace {
    /// Unique identifier for this trace
    pub trace_id: String,

    /// Game the notices came from
    pub game: GameKind,

    /// All events in delivery order
    pub events: Vec<NoticeEvent>,

    /// When this trace was recorded
    pub recorded_at: DateTime<Utc>,

    /// Custom metadata
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl NoticeTrace {
    /// Create a new empty trace
    pub fn new(trace_id: impl Into<String>, game: GameKind) -> Self {
        Self {
            trace_id: trace_id.into(),
            game,
            events: Vec::new(),
            recorded_at: Utc::now(),
            metadata: serde_json::Map::new(),
        }
    }

    /// Add an event to the trace
    pub fn push(&mut self, event: NoticeEvent) {
        self.events.push(event);
    }

    /// Add an event and return self (builder pattern)
    pub fn with_event(mut self, event: NoticeEvent) -> Self {
        self.events.push(event);
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get total duration in milliseconds
    pub fn duration_ms(&self) -> f64 {
        let first = self.events.first().map(|e| e.timestamp_ms).unwrap_or(0.0);
        let last = self.events.last().map(|e| e.timestamp_ms).unwrap_or(0.0);
        last - first
    }

    /// Get events by category
    pub fn events_by_category(&self, category: NoticeCategory) -> Vec<&NoticeEvent> {
        self.events
            .iter()
            .filter(|e| e.notice.category() == category)
            .collect()
    }

    /// Get events by notice type name
    pub fn events_by_type(&self, type_name: &str) -> Vec<&NoticeEvent> {
        self.events
            .iter()
            .filter(|e| e.type_name() == type_name)
            .collect()
    }

    /// Check if trace contains a specific notice type
    pub fn has_notice(&self, type_name: &str) -> bool {
        self.events.iter().any(|e| e.type_name() == type_name)
    }

    /// Number of rounds that reached their complete marker
    pub fn completed_rounds(&self) -> usize {
        self.events
            .iter()
            .filter(|e| e.notice.is_terminal())
            .count()
    }

    /// Sum of everything credited (round payouts and collected tickets)
    pub fn total_payout(&self) -> u64 {
        self.events
            .iter()
            .map(|e| match &e.notice {
                Notice::RoundResolved { summary } => summary.payout,
                Notice::TicketCollected { prize, .. } => *prize,
                _ => 0,
            })
            .sum()
    }

    /// Sum of everything staked (bets and ticket prices)
    pub fn total_wagered(&self) -> u64 {
        self.events
            .iter()
            .map(|e| match &e.notice {
                Notice::RoundStarted { bet, .. } => *bet,
                Notice::TicketPurchased { price, .. } => *price,
                _ => 0,
            })
            .sum()
    }

    /// Highest tier resolved in this trace
    pub fn max_tier(&self) -> Option<WinTier> {
        self.events
            .iter()
            .filter_map(|e| match &e.notice {
                Notice::RoundResolved { summary } => Some(summary.tier),
                Notice::TicketRevealed { tier, .. } => Some(*tier),
                _ => None,
            })
            .max()
    }

    /// Last balance reported to presentation
    pub fn final_balance(&self) -> Option<u64> {
        self.events.iter().rev().find_map(|e| e.notice.balance())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Get summary of trace
    pub fn summary(&self) -> TraceSummary {
        TraceSummary {
            trace_id: self.trace_id.clone(),
            game: self.game,
            event_count: self.events.len(),
            duration_ms: self.duration_ms(),
            rounds: self.completed_rounds(),
            total_wagered: self.total_wagered(),
            total_payout: self.total_payout(),
            has_recovery: self.has_notice("balance_recovered"),
            max_tier: self.max_tier(),
            final_balance: self.final_balance(),
        }
    }
}

impl Presenter for NoticeTrace {
    fn present(&mut self, event: &NoticeEvent) {
        self.push(event.clone());
    }
}

/// Summary of a trace for quick overview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceSummary {
    pub trace_id: String,
    pub game: GameKind,
    pub event_count: usize,
    pub duration_ms: f64,
    pub rounds: usize,
    pub total_wagered: u64,
    pub total_payout: u64,
    pub has_recovery: bool,
    pub max_tier: Option<WinTier>,
    pub final_balance: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::OutcomeSummary;

    fn create_dice_trace() -> NoticeTrace {
        let mut trace = NoticeTrace::new("dice-001", GameKind::Dice);

        trace.push(NoticeEvent::new(
            Notice::RoundStarted {
                game: GameKind::Dice,
                round_id: 1,
                bet: 100,
            },
            0.0,
        ));
        trace.push(NoticeEvent::new(Notice::BalanceChanged { balance: 900 }, 0.0));
        trace.push(NoticeEvent::new(Notice::DieLanded { face: 4 }, 1550.0));
        trace.push(NoticeEvent::new(
            Notice::RoundResolved {
                summary: OutcomeSummary {
                    game: GameKind::Dice,
                    label: "Rolled 4".into(),
                    drawn: vec!["4".into()],
                    tier: WinTier::Win,
                    multiplier: 6.0,
                    payout: 600,
                    jackpot_paid: None,
                    near_miss: false,
                },
            },
            2050.0,
        ));
        trace.push(NoticeEvent::new(Notice::BalanceChanged { balance: 1500 }, 2050.0));
        trace.push(NoticeEvent::new(
            Notice::RoundComplete {
                game: GameKind::Dice,
                round_id: 1,
            },
            2050.0,
        ));

        trace
    }

    #[test]
    fn test_trace_creation() {
        let trace = create_dice_trace();
        assert_eq!(trace.game, GameKind::Dice);
        assert_eq!(trace.len(), 6);
        assert_eq!(trace.completed_rounds(), 1);
    }

    #[test]
    fn test_trace_duration() {
        let trace = create_dice_trace();
        assert_eq!(trace.duration_ms(), 2050.0);
        assert_eq!(NoticeTrace::new("empty", GameKind::Slot).duration_ms(), 0.0);
    }

    #[test]
    fn test_trace_totals() {
        let trace = create_dice_trace();
        assert_eq!(trace.total_wagered(), 100);
        assert_eq!(trace.total_payout(), 600);
        assert_eq!(trace.final_balance(), Some(1500));
        assert_eq!(trace.max_tier(), Some(WinTier::Win));
        assert_eq!(trace.events_by_category(NoticeCategory::Wallet).len(), 2);
    }

    #[test]
    fn test_trace_as_presenter() {
        let mut trace = NoticeTrace::new("p-001", GameKind::CoinFlip);
        trace.present(&NoticeEvent::new(Notice::BalanceRecovered { balance: 1000 }, 3000.0));
        assert!(trace.has_notice("balance_recovered"));
        assert!(trace.summary().has_recovery);
    }

    #[test]
    fn test_trace_serialization() {
        let trace = create_dice_trace().with_metadata("seed", serde_json::json!(42));
        let json = trace.to_json().unwrap();

        assert!(json.contains("die_landed"));
        assert!(json.contains("\"dice\""));

        let back = NoticeTrace::from_json(&json).unwrap();
        assert_eq!(back.events.len(), trace.events.len());
        assert_eq!(back.metadata["seed"], 42);
    }
}
