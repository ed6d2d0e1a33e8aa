//! Game session controller
//!
//! A round runs in two phases. Starting it debits, draws, resolves and
//! settles on the spot; the store already holds the final balance when
//! `start_round` returns. The notices describing the round are then placed on
//! a queue and released to the presenter as the session clock advances.
//! Delivering the round-complete notice puts the session back to idle.

use std::collections::VecDeque;

use fh_stage::{Notice, NoticeEvent, Presenter, WinTier};
use fh_state::SharedStore;

use crate::bet::{ArmState, BetSlip};
use crate::config::{CasinoConfig, ConfigResult};
use crate::games::RoundGame;
use crate::outcome::RoundResult;
use crate::rng::Randomizer;
use crate::settlement::{Cashier, SettlementEngine, Settlement, Wager};
use crate::stats::SessionStats;
use crate::timing::{Timeline, TimingConfig};

// ═══════════════════════════════════════════════════════════════════════════
// NOTICE QUEUE
// ═══════════════════════════════════════════════════════════════════════════

/// Something due on the session clock
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Action {
    Present(Notice),
    /// Re-check the balance and top it up if still short
    Recover,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Scheduled {
    pub due_ms: f64,
    pub round_id: Option<u64>,
    pub tags: Vec<String>,
    pub action: Action,
}

impl Scheduled {
    fn event(&self, notice: Notice) -> NoticeEvent {
        let mut event = NoticeEvent::new(notice, self.due_ms);
        event.round_id = self.round_id;
        event.tags = self.tags.clone();
        event
    }
}

/// Due-time ordered queue driven by a manual clock.
///
/// Items due at the same time come out in the order they were scheduled.
#[derive(Debug, Clone, Default)]
pub(crate) struct NoticeQueue {
    clock_ms: f64,
    items: VecDeque<Scheduled>,
}

impl NoticeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clock(&self) -> f64 {
        self.clock_ms
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Due time of the last scheduled item
    pub fn last_due(&self) -> Option<f64> {
        self.items.back().map(|s| s.due_ms)
    }

    pub fn schedule(
        &mut self,
        due_ms: f64,
        round_id: Option<u64>,
        tags: Vec<String>,
        action: Action,
    ) {
        let due_ms = due_ms.max(self.clock_ms);
        let at = self.items.partition_point(|s| s.due_ms <= due_ms);
        self.items.insert(
            at,
            Scheduled {
                due_ms,
                round_id,
                tags,
                action,
            },
        );
    }

    pub fn notice(&mut self, due_ms: f64, round_id: u64, notice: Notice) {
        self.schedule(due_ms, Some(round_id), Vec::new(), Action::Present(notice));
    }

    pub fn advance(&mut self, ms: f64) {
        self.clock_ms += ms.max(0.0);
    }

    /// Move the clock to the last due item
    pub fn advance_to_end(&mut self) {
        if let Some(last) = self.last_due() {
            self.clock_ms = self.clock_ms.max(last);
        }
    }

    pub fn pop_due(&mut self) -> Option<Scheduled> {
        if self.items.front()?.due_ms <= self.clock_ms {
            self.items.pop_front()
        } else {
            None
        }
    }
}

/// Queue for a freshly opened session. A stored balance already below the
/// recovery threshold gets its top-up scheduled from the start.
pub(crate) fn opening_queue(settlement: &mut SettlementEngine) -> NoticeQueue {
    let mut queue = NoticeQueue::new();
    if !settlement.needs_recovery() {
        return queue;
    }
    if let Some(policy) = settlement.recovery().copied() {
        log::info!(
            "Balance below {} on open, recovery in {} ms",
            policy.threshold,
            policy.delay_ms
        );
        queue.schedule(policy.delay_ms, None, Vec::new(), Action::Recover);
    }
    queue
}

/// Release every due item. Recoveries are applied here, at their due time.
pub(crate) fn deliver_due(
    queue: &mut NoticeQueue,
    settlement: &mut SettlementEngine,
    stats: &mut SessionStats,
    presenter: &mut dyn Presenter,
    mut on_notice: impl FnMut(&Notice),
) -> usize {
    let mut delivered = 0;
    while let Some(item) = queue.pop_due() {
        let notice = match &item.action {
            Action::Present(notice) => notice.clone(),
            Action::Recover => match settlement.recover() {
                Some(balance) => {
                    stats.record_recovery();
                    Notice::BalanceRecovered { balance }
                }
                None => continue,
            },
        };
        on_notice(&notice);
        presenter.present(&item.event(notice));
        delivered += 1;
    }
    delivered
}

// ═══════════════════════════════════════════════════════════════════════════
// GAME SESSION
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    InProgress { round_id: u64 },
}

/// One player at one game
pub struct GameSession<G: RoundGame> {
    game: G,
    rng: Randomizer,
    slip: BetSlip<G::Selection>,
    settlement: SettlementEngine,
    timing: TimingConfig,
    queue: NoticeQueue,
    phase: SessionPhase,
    round_count: u64,
    stats: SessionStats,
}

impl<G: RoundGame> GameSession<G> {
    pub fn new(game: G, store: SharedStore, config: &CasinoConfig) -> Self {
        let rules = G::session_rules(config);
        let cashier = Cashier::new(store, config.balance_key.clone(), config.starting_balance);
        let mut settlement = SettlementEngine::new(cashier);
        if let Some(pool) = rules.jackpot {
            settlement = settlement.with_jackpot(pool);
        }
        if let Some(policy) = rules.recovery {
            settlement = settlement.with_recovery(policy);
        }

        let mut slip = BetSlip::new(rules.limits);
        if let Some(selection) = game.default_selection() {
            slip.set_selection(selection);
        }
        let queue = opening_queue(&mut settlement);

        Self {
            game,
            rng: Randomizer::from_entropy(),
            slip,
            settlement,
            timing: config.timing_config(),
            queue,
            phase: SessionPhase::Idle,
            round_count: 0,
            stats: SessionStats::default(),
        }
    }

    /// Build the game from `config` as well
    pub fn from_config(store: SharedStore, config: &CasinoConfig) -> ConfigResult<Self> {
        Ok(Self::new(G::from_config(config)?, store, config))
    }

    /// Seed RNG for reproducible rounds
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Randomizer::seeded(seed);
        self
    }

    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    // ═══════════════════════════════════════════════════════════════════════
    // STATE
    // ═══════════════════════════════════════════════════════════════════════

    pub fn balance(&mut self) -> u64 {
        self.settlement.balance()
    }

    pub fn bet(&self) -> u64 {
        self.slip.amount()
    }

    pub fn selection(&self) -> Option<&G::Selection> {
        self.slip.selection()
    }

    pub fn slip(&self) -> &BetSlip<G::Selection> {
        &self.slip
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self.phase, SessionPhase::InProgress { .. })
    }

    pub fn arm_state(&self) -> ArmState {
        if self.is_in_progress() {
            ArmState::Resolved
        } else {
            self.slip.arm_state()
        }
    }

    /// Current progressive pool, if this game has one
    pub fn jackpot(&self) -> Option<f64> {
        self.settlement.jackpot().map(|pool| pool.value())
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Session clock (ms)
    pub fn clock(&self) -> f64 {
        self.queue.clock()
    }

    /// Notices (and recoveries) not yet delivered
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // INTENTS
    // ═══════════════════════════════════════════════════════════════════════

    /// Pick what to bet on. Invalid targets and picks mid-round are ignored.
    pub fn select(&mut self, selection: G::Selection) -> bool {
        if self.is_in_progress() || !self.game.is_valid_selection(&selection) {
            return false;
        }
        self.slip.set_selection(selection);
        true
    }

    pub fn increase_bet(&mut self) -> bool {
        if self.is_in_progress() {
            return false;
        }
        let balance = self.balance();
        self.slip.increase(balance)
    }

    pub fn decrease_bet(&mut self) -> bool {
        if self.is_in_progress() {
            return false;
        }
        let balance = self.balance();
        self.slip.decrease(balance)
    }

    /// Jump to an exact amount if the limits allow it
    pub fn set_bet(&mut self, amount: u64) -> bool {
        if self.is_in_progress() {
            return false;
        }
        let balance = self.balance();
        self.slip.set_amount(amount, balance)
    }

    pub fn can_increase(&mut self) -> bool {
        let balance = self.balance();
        !self.is_in_progress() && self.slip.can_increase(balance)
    }

    pub fn can_decrease(&mut self) -> bool {
        let balance = self.balance();
        !self.is_in_progress() && self.slip.can_decrease(balance)
    }

    /// Idle, a selection made and the bet covered
    pub fn can_start(&mut self) -> bool {
        let balance = self.balance();
        !self.is_in_progress() && self.slip.is_ready(balance)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // ROUNDS
    // ═══════════════════════════════════════════════════════════════════════

    /// Play a random round. `None` if a round cannot start now.
    pub fn start_round(&mut self) -> Option<RoundResult<G::Selection, G::Draw>> {
        let (selection, wager) = self.open_round()?;
        let draw = self.game.draw(&mut self.rng, &selection);
        Some(self.close_round(selection, wager, draw))
    }

    /// Play a round whose draw is fixed in advance
    pub fn start_round_with(
        &mut self,
        draw: G::Draw,
    ) -> Option<RoundResult<G::Selection, G::Draw>> {
        let (selection, wager) = self.open_round()?;
        self.game.accept_forced(&draw);
        Some(self.close_round(selection, wager, draw))
    }

    fn open_round(&mut self) -> Option<(G::Selection, Wager)> {
        if !self.can_start() {
            log::debug!("{} start ignored ({:?})", G::KIND, self.arm_state());
            return None;
        }
        let selection = self.slip.selection()?.clone();
        let wager = self.settlement.place_wager(self.slip.amount())?;
        Some((selection, wager))
    }

    fn close_round(
        &mut self,
        selection: G::Selection,
        wager: Wager,
        draw: G::Draw,
    ) -> RoundResult<G::Selection, G::Draw> {
        self.round_count += 1;
        let round_id = self.round_count;

        let outcome = self.game.resolve(&selection, &draw);
        let settlement = self.settlement.settle(&wager, &outcome);
        self.stats
            .record(wager.bet, settlement.payout, outcome.tier, outcome.near_miss);

        log::debug!(
            "{} round {}: {} (bet {}, paid {}, balance {})",
            G::KIND,
            round_id,
            outcome.label,
            wager.bet,
            settlement.payout,
            settlement.balance
        );

        let result = RoundResult {
            round_id,
            game: G::KIND,
            bet: wager.bet,
            selection,
            draw,
            outcome,
            payout: settlement.payout,
            jackpot_paid: settlement.jackpot_paid,
            balance_after: settlement.balance,
        };

        self.schedule_round(&result, &wager, &settlement);
        self.phase = SessionPhase::InProgress { round_id };
        result
    }

    fn schedule_round(
        &mut self,
        result: &RoundResult<G::Selection, G::Draw>,
        wager: &Wager,
        settlement: &Settlement,
    ) {
        let round_id = result.round_id;
        let mut timeline = Timeline::new(self.queue.clock());
        let started = timeline.current();

        self.queue.notice(
            started,
            round_id,
            Notice::RoundStarted {
                game: G::KIND,
                round_id,
                bet: wager.bet,
            },
        );
        self.queue.notice(
            started,
            round_id,
            Notice::BalanceChanged {
                balance: wager.balance_after_debit,
            },
        );
        if let Some(pool) = wager.jackpot_after_contribution {
            self.queue.notice(started, round_id, Notice::JackpotChanged { pool });
        }

        let reveals = self
            .game
            .reveal(&result.draw, &self.timing, &mut timeline, &mut self.rng);
        for (at, notice) in reveals {
            self.queue.notice(at, round_id, notice);
        }

        let resolved = timeline.current();
        let mut tags = Vec::new();
        if result.outcome.near_miss {
            tags.push("near_miss".to_string());
        }
        if result.outcome.tier >= WinTier::Jackpot {
            tags.push("jackpot".to_string());
        }
        let summary = result.summary(self.game.describe(&result.draw));
        self.queue.schedule(
            resolved,
            Some(round_id),
            tags,
            Action::Present(Notice::RoundResolved { summary }),
        );

        if settlement.payout > 0 {
            self.queue.notice(
                resolved,
                round_id,
                Notice::BalanceChanged {
                    balance: settlement.balance,
                },
            );
        }
        if settlement.jackpot_paid.is_some() {
            if let Some(pool) = settlement.jackpot {
                self.queue.notice(resolved, round_id, Notice::JackpotChanged { pool });
            }
        }
        self.queue.notice(
            resolved,
            round_id,
            Notice::RoundComplete {
                game: G::KIND,
                round_id,
            },
        );

        if settlement.recovery_due {
            if let Some(policy) = self.settlement.recovery() {
                let due = resolved + policy.delay_ms;
                self.queue.schedule(due, Some(round_id), Vec::new(), Action::Recover);
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // DELIVERY
    // ═══════════════════════════════════════════════════════════════════════

    /// Move the clock forward and deliver what became due
    pub fn advance(&mut self, ms: f64, presenter: &mut dyn Presenter) -> usize {
        self.queue.advance(ms);
        self.deliver(presenter)
    }

    /// Deliver everything still queued, moving the clock as far as needed
    pub fn flush(&mut self, presenter: &mut dyn Presenter) -> usize {
        self.queue.advance_to_end();
        self.deliver(presenter)
    }

    fn deliver(&mut self, presenter: &mut dyn Presenter) -> usize {
        let mut completed = false;
        let delivered = deliver_due(
            &mut self.queue,
            &mut self.settlement,
            &mut self.stats,
            presenter,
            |notice| {
                if matches!(notice, Notice::RoundComplete { .. }) {
                    completed = true;
                }
            },
        );
        if completed {
            self.phase = SessionPhase::Idle;
        }
        delivered
    }
}

impl<G: RoundGame + std::fmt::Debug> std::fmt::Debug for GameSession<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("game", &self.game)
            .field("phase", &self.phase)
            .field("bet", &self.slip.amount())
            .field("clock_ms", &self.queue.clock())
            .field("pending", &self.queue.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{Dice, DiceDraw};
    use fh_stage::RecordingPresenter;
    use fh_state::MemoryStore;

    fn dice_session() -> GameSession<Dice> {
        let store = MemoryStore::with_balance(1000).shared();
        GameSession::new(Dice::default(), store, &CasinoConfig::default()).with_seed(11)
    }

    #[test]
    fn test_queue_orders_by_due_then_insertion() {
        let mut queue = NoticeQueue::new();
        queue.notice(500.0, 1, Notice::DieLanded { face: 2 });
        queue.notice(0.0, 1, Notice::BalanceChanged { balance: 900 });
        queue.notice(500.0, 1, Notice::DieLanded { face: 3 });

        queue.advance(499.0);
        assert!(matches!(
            queue.pop_due().map(|s| s.action),
            Some(Action::Present(Notice::BalanceChanged { .. }))
        ));
        assert!(queue.pop_due().is_none());

        queue.advance(1.0);
        let faces: Vec<_> = std::iter::from_fn(|| queue.pop_due())
            .map(|s| match s.action {
                Action::Present(Notice::DieLanded { face }) => face,
                _ => 0,
            })
            .collect();
        assert_eq!(faces, vec![2, 3]);
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_low_stored_balance_recovers_on_open() {
        let store = MemoryStore::with_balance(50).shared();
        let mut session = GameSession::new(Dice::default(), store, &CasinoConfig::default());
        session.select(4);
        assert!(!session.can_start());
        assert_eq!(session.pending(), 1);

        let mut rec = RecordingPresenter::new();
        session.advance(2999.0, &mut rec);
        assert_eq!(session.balance(), 50);

        session.advance(1.0, &mut rec);
        assert_eq!(rec.count("balance_recovered"), 1);
        assert_eq!(session.balance(), 1000);
        assert_eq!(session.stats().recoveries, 1);
        assert!(session.can_start());
    }

    #[test]
    fn test_healthy_balance_opens_with_empty_queue() {
        assert_eq!(dice_session().pending(), 0);
    }

    #[test]
    fn test_no_selection_no_round() {
        let mut session = dice_session();
        assert_eq!(session.arm_state(), ArmState::AwaitingSelection);
        assert!(session.start_round().is_none());
        assert_eq!(session.balance(), 1000);
    }

    #[test]
    fn test_invalid_selection_ignored() {
        let mut session = dice_session();
        assert!(!session.select(0));
        assert!(!session.select(7));
        assert!(session.select(3));
        assert_eq!(session.arm_state(), ArmState::Armed);
    }

    #[test]
    fn test_round_flow() {
        let mut session = dice_session();
        session.select(4);
        let result = session.start_round_with(DiceDraw::new(4)).unwrap();
        assert_eq!(result.payout, 600);
        assert_eq!(session.balance(), 1500);
        assert!(session.is_in_progress());
        assert_eq!(session.arm_state(), ArmState::Resolved);

        // Busy until the last notice is out
        assert!(session.start_round().is_none());
        assert!(!session.increase_bet());

        let mut rec = RecordingPresenter::new();
        assert_eq!(session.advance(2049.0, &mut rec), 3);
        assert_eq!(
            rec.type_names(),
            vec!["round_started", "balance_changed", "die_landed"]
        );
        assert_eq!(rec.last_balance(), Some(900));
        assert!(session.is_in_progress());

        session.advance(1.0, &mut rec);
        assert_eq!(rec.count("round_resolved"), 1);
        assert_eq!(rec.last_balance(), Some(1500));
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.pending(), 0);
    }

    #[test]
    fn test_rounds_start_at_session_clock() {
        let mut session = dice_session();
        session.select(1);
        let mut rec = RecordingPresenter::new();

        session.start_round_with(DiceDraw::new(2)).unwrap();
        session.flush(&mut rec);
        assert_eq!(session.clock(), 2050.0);

        rec.clear();
        session.start_round_with(DiceDraw::new(3)).unwrap();
        session.flush(&mut rec);
        assert_eq!(rec.events[0].timestamp_ms, 2050.0);
        assert_eq!(rec.events.last().map(|e| e.timestamp_ms), Some(4100.0));
        assert!(rec.events.iter().all(|e| e.round_id == Some(2)));
    }

    #[test]
    fn test_stats_follow_rounds() {
        let mut session = dice_session();
        session.select(6);
        let mut rec = RecordingPresenter::new();
        for face in [6, 1, 2] {
            session.start_round_with(DiceDraw::new(face)).unwrap();
            session.flush(&mut rec);
        }
        let stats = session.stats();
        assert_eq!(stats.rounds, 3);
        assert_eq!(stats.total_wagered, 300);
        assert_eq!(stats.total_returned, 600);
        assert_eq!(stats.wins, 1);
    }
}
