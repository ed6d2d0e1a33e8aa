//! Session statistics

use serde::{Deserialize, Serialize};

use fh_stage::WinTier;

/// Running totals for a session (or a merged batch of sessions)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub rounds: u64,
    pub total_wagered: u64,
    pub total_returned: u64,
    pub wins: u64,
    pub losses: u64,
    pub jackpots: u64,
    pub progressive_wins: u64,
    pub near_misses: u64,
    pub recoveries: u64,
    pub max_win_ratio: f64,
}

impl SessionStats {
    /// Record one settled round
    pub fn record(&mut self, bet: u64, payout: u64, tier: WinTier, near_miss: bool) {
        self.rounds += 1;
        self.total_wagered += bet;
        self.total_returned += payout;

        if payout > 0 {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
        match tier {
            WinTier::Jackpot => self.jackpots += 1,
            WinTier::Progressive => self.progressive_wins += 1,
            _ => {}
        }
        if near_miss {
            self.near_misses += 1;
        }
        if bet > 0 {
            self.max_win_ratio = self.max_win_ratio.max(payout as f64 / bet as f64);
        }
    }

    pub fn record_recovery(&mut self) {
        self.recoveries += 1;
    }

    /// Calculate RTP (%)
    pub fn rtp(&self) -> f64 {
        if self.total_wagered > 0 {
            (self.total_returned as f64 / self.total_wagered as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Calculate hit rate (%)
    pub fn hit_rate(&self) -> f64 {
        if self.rounds > 0 {
            (self.wins as f64 / self.rounds as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Returned minus wagered
    pub fn net(&self) -> i64 {
        self.total_returned as i64 - self.total_wagered as i64
    }

    /// Fold another batch into this one
    pub fn merge(&mut self, other: &SessionStats) {
        self.rounds += other.rounds;
        self.total_wagered += other.total_wagered;
        self.total_returned += other.total_returned;
        self.wins += other.wins;
        self.losses += other.losses;
        self.jackpots += other.jackpots;
        self.progressive_wins += other.progressive_wins;
        self.near_misses += other.near_misses;
        self.recoveries += other.recoveries;
        self.max_win_ratio = self.max_win_ratio.max(other.max_win_ratio);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rtp_and_hit_rate() {
        let mut stats = SessionStats::default();
        stats.record(100, 600, WinTier::Win, false);
        stats.record(100, 0, WinTier::Loss, true);
        stats.record(100, 0, WinTier::Loss, false);
        stats.record(100, 0, WinTier::Loss, false);

        assert_eq!(stats.rtp(), 150.0);
        assert_eq!(stats.hit_rate(), 25.0);
        assert_eq!(stats.near_misses, 1);
        assert_eq!(stats.max_win_ratio, 6.0);
        assert_eq!(stats.net(), 200);
    }

    #[test]
    fn test_merge() {
        let mut a = SessionStats::default();
        a.record(100, 200, WinTier::Win, false);
        let mut b = SessionStats::default();
        b.record(200, 10_000, WinTier::Progressive, false);
        b.record_recovery();

        a.merge(&b);
        assert_eq!(a.rounds, 2);
        assert_eq!(a.total_wagered, 300);
        assert_eq!(a.progressive_wins, 1);
        assert_eq!(a.recoveries, 1);
        assert_eq!(a.max_win_ratio, 50.0);
    }

    #[test]
    fn test_empty_stats() {
        let stats = SessionStats::default();
        assert_eq!(stats.rtp(), 0.0);
        assert_eq!(stats.hit_rate(), 0.0);
    }
}
