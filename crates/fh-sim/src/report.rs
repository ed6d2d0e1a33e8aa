//! Simulation reports

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use fh_games::SessionStats;
use fh_stage::GameKind;

use crate::runner::{SimConfig, theoretical_rtp};

/// Output format for saved reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
    Markdown,
}

/// Result of one batch simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimReport {
    pub game: GameKind,
    pub rounds: u64,
    /// Seed the run can be repeated with
    pub seed: u64,
    /// Stake per round
    pub bet: u64,
    pub threads: usize,
    pub stats: SessionStats,
    /// Closed-form RTP (%), where one exists
    pub theoretical_rtp: Option<f64>,
    pub duration_ms: u64,
    pub timestamp: String,
}

impl SimReport {
    pub fn new(config: &SimConfig, seed: u64, stats: SessionStats, elapsed: Duration) -> Self {
        Self {
            game: config.game,
            rounds: config.rounds,
            seed,
            bet: config.effective_bet(),
            threads: config.threads,
            stats,
            theoretical_rtp: theoretical_rtp(config.game, &config.casino),
            duration_ms: elapsed.as_millis() as u64,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn rtp(&self) -> f64 {
        self.stats.rtp()
    }

    pub fn hit_rate(&self) -> f64 {
        self.stats.hit_rate()
    }

    /// Measured minus theoretical RTP, in percentage points
    pub fn rtp_deviation(&self) -> Option<f64> {
        self.theoretical_rtp.map(|expected| self.rtp() - expected)
    }

    pub fn rounds_per_second(&self) -> f64 {
        if self.duration_ms == 0 {
            return self.stats.rounds as f64 * 1000.0;
        }
        self.stats.rounds as f64 * 1000.0 / self.duration_ms as f64
    }

    /// Generate text report
    pub fn to_text(&self) -> String {
        let title = format!("{} simulation", self.game);
        let mut output = String::new();

        output.push_str(&format!("{}\n", title));
        output.push_str(&format!("{}\n\n", "=".repeat(title.len())));
        output.push_str(&format!("Timestamp: {}\n", self.timestamp));
        output.push_str(&format!("Seed:      {}\n", self.seed));
        output.push_str(&format!(
            "Rounds:    {} at {} per round\n\n",
            self.stats.rounds, self.bet
        ));

        output.push_str(&format!("  Wagered:   {}\n", self.stats.total_wagered));
        output.push_str(&format!("  Returned:  {}\n", self.stats.total_returned));
        output.push_str(&format!("  Net:       {}\n", self.stats.net()));
        output.push_str(&format!("  RTP:       {:.3}%\n", self.rtp()));
        if let Some(expected) = self.theoretical_rtp {
            output.push_str(&format!(
                "  Expected:  {:.3}% ({:+.3})\n",
                expected,
                self.rtp() - expected
            ));
        }
        output.push_str(&format!(
            "  Hit rate:  {:.3}% ({} wins, {} losses)\n",
            self.hit_rate(),
            self.stats.wins,
            self.stats.losses
        ));
        output.push_str(&format!("  Max win:   {:.1}x\n", self.stats.max_win_ratio));

        if self.game == GameKind::Slot {
            output.push_str(&format!("  Jackpots:  {}\n", self.stats.jackpots));
            output.push_str(&format!("  Progressive: {}\n", self.stats.progressive_wins));
            output.push_str(&format!("  Near misses: {}\n", self.stats.near_misses));
        }

        output.push_str(&format!(
            "\nDuration: {} ms on {} threads ({:.0} rounds/s)\n",
            self.duration_ms,
            self.threads,
            self.rounds_per_second()
        ));
        output
    }

    /// Generate JSON report
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".into())
    }

    /// Generate markdown report
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("# {} simulation\n\n", self.game));
        output.push_str(&format!("**Timestamp:** {}\n\n", self.timestamp));
        output.push_str("| Metric | Value |\n");
        output.push_str("|--------|-------|\n");
        output.push_str(&format!("| Seed | {} |\n", self.seed));
        output.push_str(&format!("| Rounds | {} |\n", self.stats.rounds));
        output.push_str(&format!("| Bet | {} |\n", self.bet));
        output.push_str(&format!("| RTP | {:.3}% |\n", self.rtp()));
        if let Some(expected) = self.theoretical_rtp {
            output.push_str(&format!("| Expected RTP | {:.3}% |\n", expected));
        }
        output.push_str(&format!("| Hit rate | {:.3}% |\n", self.hit_rate()));
        output.push_str(&format!("| Max win | {:.1}x |\n", self.stats.max_win_ratio));
        output.push_str(&format!("| Duration | {} ms |\n", self.duration_ms));
        output
    }

    /// Save report to file
    pub fn save<P: AsRef<Path>>(&self, path: P, format: ReportFormat) -> std::io::Result<()> {
        let content = match format {
            ReportFormat::Text => self.to_text(),
            ReportFormat::Json => self.to_json(),
            ReportFormat::Markdown => self.to_markdown(),
        };
        fs::write(path, content)
    }
}

impl std::fmt::Display for SimReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Side-by-side results for every game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    pub timestamp: String,
    pub reports: Vec<SimReport>,
}

impl Comparison {
    pub fn new(reports: Vec<SimReport>) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            reports,
        }
    }

    /// Report with the highest measured RTP
    pub fn best(&self) -> Option<&SimReport> {
        self.reports.iter().max_by(|a, b| a.rtp().total_cmp(&b.rtp()))
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".into())
    }

    pub fn to_text(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{:<12} {:>10} {:>8} {:>10} {:>10} {:>10}\n",
            "Game", "Rounds", "Bet", "RTP %", "Expected", "Hit %"
        ));
        output.push_str(&"-".repeat(65));
        output.push('\n');

        for report in &self.reports {
            let expected = report
                .theoretical_rtp
                .map(|rtp| format!("{:.3}", rtp))
                .unwrap_or_else(|| "-".into());
            output.push_str(&format!(
                "{:<12} {:>10} {:>8} {:>10.3} {:>10} {:>10.3}\n",
                report.game.display_name(),
                report.stats.rounds,
                report.bet,
                report.rtp(),
                expected,
                report.hit_rate()
            ));
        }
        output
    }
}

impl std::fmt::Display for Comparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fh_stage::WinTier;

    fn sample(game: GameKind) -> SimReport {
        let mut stats = SessionStats::default();
        stats.record(100, 200, WinTier::Win, false);
        stats.record(100, 0, WinTier::Loss, false);
        let config = SimConfig::new(game, 2).with_threads(1);
        SimReport::new(&config, 9, stats, Duration::from_millis(4))
    }

    #[test]
    fn test_report_figures() {
        let report = sample(GameKind::CoinFlip);
        assert_eq!(report.bet, 100);
        assert_eq!(report.rtp(), 100.0);
        assert_eq!(report.hit_rate(), 50.0);
        assert!((report.rtp_deviation().unwrap() - 4.0).abs() < 1e-9);
        assert_eq!(report.rounds_per_second(), 500.0);
    }

    #[test]
    fn test_text_report() {
        let text = sample(GameKind::Dice).to_text();
        assert!(text.starts_with("Dice simulation\n"));
        assert!(text.contains("RTP:       100.000%"));
        assert!(text.contains("Seed:      9"));
        assert!(!text.contains("Jackpots"));

        let slot = sample(GameKind::Slot).to_text();
        assert!(slot.contains("Jackpots:  0"));
        assert!(!slot.contains("Expected"));
    }

    #[test]
    fn test_json_report() {
        let report = sample(GameKind::Roulette);
        let value: serde_json::Value = serde_json::from_str(&report.to_json()).unwrap();
        assert_eq!(value["seed"], 9);
        assert_eq!(value["stats"]["rounds"], 2);

        let back: SimReport = serde_json::from_str(&report.to_json()).unwrap();
        assert_eq!(back.game, GameKind::Roulette);
    }

    #[test]
    fn test_comparison_table() {
        let comparison = Comparison::new(vec![sample(GameKind::CoinFlip), sample(GameKind::Slot)]);
        let text = comparison.to_text();
        assert_eq!(text.lines().count(), 4);
        assert!(text.lines().nth(2).unwrap().starts_with("Coin Flip"));
        assert!(comparison.best().is_some());
    }
}
