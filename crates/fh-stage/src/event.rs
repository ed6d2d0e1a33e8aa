//! NoticeEvent: a notice occurrence with timing metadata
//!
//! Wraps a Notice with its scheduled offset, the round it belongs to and
//! optional routing tags.

use serde::{Deserialize, Serialize};

use crate::notice::Notice;

/// A notice with full metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoticeEvent {
    /// The canonical notice
    pub notice: Notice,

    /// Session clock time (ms) at which presentation should show it
    pub timestamp_ms: f64,

    /// Round (or ticket) this notice belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_id: Option<u64>,

    /// Custom tags for filtering/routing
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl NoticeEvent {
    /// Create a new notice event
    pub fn new(notice: Notice, timestamp_ms: f64) -> Self {
        Self {
            notice,
            timestamp_ms,
            round_id: None,
            tags: Vec::new(),
        }
    }

    /// Attach the owning round
    pub fn with_round(mut self, round_id: u64) -> Self {
        self.round_id = Some(round_id);
        self
    }

    /// Add a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Get notice type name
    pub fn type_name(&self) -> &'static str {
        self.notice.type_name()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::GameKind;

    #[test]
    fn test_notice_event_creation() {
        let event = NoticeEvent::new(
            Notice::RoundStarted {
                game: GameKind::CoinFlip,
                round_id: 7,
                bet: 100,
            },
            0.0,
        )
        .with_round(7)
        .with_tag("user_initiated");

        assert_eq!(event.type_name(), "round_started");
        assert_eq!(event.round_id, Some(7));
        assert!(event.has_tag("user_initiated"));
        assert!(!event.has_tag("near_miss"));
    }

    #[test]
    fn test_empty_fields_skipped() {
        let event = NoticeEvent::new(Notice::BalanceChanged { balance: 900 }, 0.0);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("balance_changed"));
        assert!(!json.contains("round_id"));
        assert!(!json.contains("tags"));
    }
}
