//! Scratch tickets
//!
//! The prize is drawn when the ticket is bought; scratching only uncovers
//! it. Coverage is tracked on a coarse grid over the ticket surface and the
//! prize is shown once enough of it is scratched off. Dismissing a revealed
//! ticket credits the prize.

use fh_stage::{Notice, Presenter, WinTier};
use fh_state::SharedStore;

use crate::config::{CasinoConfig, ConfigError, ConfigResult, ScratchRules};
use crate::rng::{PrizeBands, Randomizer};
use crate::session::{Action, NoticeQueue, deliver_due, opening_queue};
use crate::settlement::{Cashier, SettlementEngine};
use crate::stats::SessionStats;
use crate::timing::TimingConfig;

// ═══════════════════════════════════════════════════════════════════════════
// COVERAGE
// ═══════════════════════════════════════════════════════════════════════════

/// Scratched cells of the ticket surface
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageGrid {
    cols: usize,
    rows: usize,
    cell_size: f64,
    cells: Vec<bool>,
    scratched: usize,
}

impl CoverageGrid {
    pub fn new(width: f64, height: f64, cell_size: f64) -> Self {
        let cols = ((width / cell_size).ceil() as usize).max(1);
        let rows = ((height / cell_size).ceil() as usize).max(1);
        Self {
            cols,
            rows,
            cell_size,
            cells: vec![false; cols * rows],
            scratched: 0,
        }
    }

    pub fn from_rules(rules: &ScratchRules) -> Self {
        Self::new(rules.surface_width, rules.surface_height, rules.cell_size)
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn scratched_cells(&self) -> usize {
        self.scratched
    }

    pub fn is_scratched(&self, col: usize, row: usize) -> bool {
        col < self.cols && row < self.rows && self.cells[row * self.cols + col]
    }

    /// Scratch every cell whose centre lies within `radius` of (x, y).
    /// Returns the number of newly scratched cells.
    pub fn dab(&mut self, x: f64, y: f64, radius: f64) -> usize {
        let cell = self.cell_size;
        let span = |centre: f64, limit: usize| {
            let lo = ((centre - radius) / cell).floor().max(0.0) as usize;
            let hi = (((centre + radius) / cell).ceil().max(0.0) as usize).min(limit);
            lo..hi
        };

        let mut fresh = 0;
        for row in span(y, self.rows) {
            let dy = (row as f64 + 0.5) * cell - y;
            for col in span(x, self.cols) {
                let dx = (col as f64 + 0.5) * cell - x;
                if dx * dx + dy * dy > radius * radius {
                    continue;
                }
                let idx = row * self.cols + col;
                if !self.cells[idx] {
                    self.cells[idx] = true;
                    fresh += 1;
                }
            }
        }
        self.scratched += fresh;
        fresh
    }

    /// Dabs along a line, one every `step` px, both ends included.
    /// The line is first clipped to the surface grown by the brush radius.
    pub fn stroke(&mut self, from: (f64, f64), to: (f64, f64), radius: f64, step: f64) -> usize {
        let reach = radius.max(0.0);
        let lo = (-reach, -reach);
        let hi = (
            self.cols as f64 * self.cell_size + reach,
            self.rows as f64 * self.cell_size + reach,
        );
        let Some((from, to)) = clip_segment(from, to, lo, hi) else {
            return 0;
        };

        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let length = dx.hypot(dy);
        let steps = if step > 0.0 {
            ((length / step).ceil() as usize).max(1)
        } else {
            1
        };

        (0..=steps)
            .map(|i| {
                let t = i as f64 / steps as f64;
                self.dab(from.0 + dx * t, from.1 + dy * t, radius)
            })
            .sum()
    }

    /// Scratched share of the surface (%)
    pub fn percent(&self) -> f64 {
        self.scratched as f64 / self.cells.len() as f64 * 100.0
    }
}

/// Liang-Barsky clip of a segment to the box `[lo, hi]`
fn clip_segment(
    from: (f64, f64),
    to: (f64, f64),
    lo: (f64, f64),
    hi: (f64, f64),
) -> Option<((f64, f64), (f64, f64))> {
    if ![from.0, from.1, to.0, to.1].iter().all(|v| v.is_finite()) {
        return None;
    }
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    let edges = [
        (-dx, from.0 - lo.0),
        (dx, hi.0 - from.0),
        (-dy, from.1 - lo.1),
        (dy, hi.1 - from.1),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((
        (from.0 + dx * t0, from.1 + dy * t0),
        (from.0 + dx * t1, from.1 + dy * t1),
    ))
}

// ═══════════════════════════════════════════════════════════════════════════
// TICKET
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct ScratchTicket {
    pub id: u64,
    pub price: u64,
    /// Fixed at purchase
    pub prize: u64,
    pub tier: WinTier,
    grid: CoverageGrid,
    /// Clock time the prize is shown, once coverage crossed the threshold
    revealed_at: Option<f64>,
}

impl ScratchTicket {
    pub fn coverage(&self) -> f64 {
        self.grid.percent()
    }

    pub fn grid(&self) -> &CoverageGrid {
        &self.grid
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed_at.is_some()
    }

    pub fn revealed_at(&self) -> Option<f64> {
        self.revealed_at
    }
}

/// Presentation tier of a prize
pub fn prize_tier(prize: u64, jackpot_threshold: u64) -> WinTier {
    if prize >= jackpot_threshold && prize > 0 {
        WinTier::Jackpot
    } else if prize > 0 {
        WinTier::Win
    } else {
        WinTier::Loss
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SESSION
// ═══════════════════════════════════════════════════════════════════════════

/// Buy, scratch and collect one ticket at a time
pub struct ScratchSession {
    rules: ScratchRules,
    bands: PrizeBands,
    rng: Randomizer,
    settlement: SettlementEngine,
    timing: TimingConfig,
    queue: NoticeQueue,
    ticket: Option<ScratchTicket>,
    tickets_sold: u64,
    stats: SessionStats,
}

impl ScratchSession {
    pub fn new(store: SharedStore, config: &CasinoConfig) -> ConfigResult<Self> {
        let rules = config.scratch.clone();
        rules.validate()?;
        let bands = rules
            .bands()
            .map_err(|source| ConfigError::Weights { game: "scratch", source })?;

        let cashier = Cashier::new(store, config.balance_key.clone(), config.starting_balance);
        let mut settlement = SettlementEngine::new(cashier);
        if let Some(policy) = rules
            .recovery
            .policy(rules.ticket_price, config.starting_balance)
        {
            settlement = settlement.with_recovery(policy);
        }
        let queue = opening_queue(&mut settlement);

        Ok(Self {
            rules,
            bands,
            rng: Randomizer::from_entropy(),
            settlement,
            timing: config.timing_config(),
            queue,
            ticket: None,
            tickets_sold: 0,
            stats: SessionStats::default(),
        })
    }

    /// Seed RNG for reproducible prizes
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Randomizer::seeded(seed);
        self
    }

    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    pub fn balance(&mut self) -> u64 {
        self.settlement.balance()
    }

    pub fn ticket(&self) -> Option<&ScratchTicket> {
        self.ticket.as_ref()
    }

    pub fn rules(&self) -> &ScratchRules {
        &self.rules
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn clock(&self) -> f64 {
        self.queue.clock()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// No ticket in hand and the price covered
    pub fn can_purchase(&mut self) -> bool {
        self.ticket.is_none() && self.balance() >= self.rules.ticket_price
    }

    /// Buy a ticket with a freshly drawn prize
    pub fn purchase_ticket(&mut self) -> Option<u64> {
        if !self.can_purchase() {
            return None;
        }
        let prize = self.bands.draw(&mut self.rng);
        self.issue(prize)
    }

    /// Buy a ticket carrying a known prize
    pub fn purchase_with_prize(&mut self, prize: u64) -> Option<u64> {
        if !self.can_purchase() {
            return None;
        }
        self.issue(prize)
    }

    fn issue(&mut self, prize: u64) -> Option<u64> {
        let price = self.rules.ticket_price;
        let wager = self.settlement.place_wager(price)?;

        self.tickets_sold += 1;
        let id = self.tickets_sold;
        let tier = prize_tier(prize, self.rules.jackpot_threshold);
        self.ticket = Some(ScratchTicket {
            id,
            price,
            prize,
            tier,
            grid: CoverageGrid::from_rules(&self.rules),
            revealed_at: None,
        });

        let now = self.queue.clock();
        self.queue.notice(now, id, Notice::TicketPurchased { ticket_id: id, price });
        self.queue.notice(
            now,
            id,
            Notice::BalanceChanged {
                balance: wager.balance_after_debit,
            },
        );
        log::debug!("Scratch ticket {} sold", id);
        Some(id)
    }

    /// One brush dab. Returns the coverage (%) or `None` without a ticket.
    pub fn scratch_at(&mut self, x: f64, y: f64) -> Option<f64> {
        let radius = self.rules.brush_radius;
        let ticket = self.ticket.as_mut()?;
        let fresh = ticket.grid.dab(x, y, radius);
        Some(self.after_scratch(fresh))
    }

    /// A drag from `from` to `to`, interpolated at the stroke step
    pub fn scratch_stroke(&mut self, from: (f64, f64), to: (f64, f64)) -> Option<f64> {
        let (radius, step) = (self.rules.brush_radius, self.rules.stroke_step);
        let ticket = self.ticket.as_mut()?;
        let fresh = ticket.grid.stroke(from, to, radius, step);
        Some(self.after_scratch(fresh))
    }

    fn after_scratch(&mut self, fresh: usize) -> f64 {
        let now = self.queue.clock();
        let threshold = self.rules.reveal_percent;
        let reveal_delay = self.timing.scratch_reveal_ms;
        let Some(ticket) = self.ticket.as_mut() else {
            return 0.0;
        };
        let percent = ticket.coverage();
        if fresh == 0 {
            return percent;
        }

        self.queue.notice(
            now,
            ticket.id,
            Notice::ScratchProgress {
                ticket_id: ticket.id,
                percent,
            },
        );

        if ticket.revealed_at.is_none() && percent >= threshold {
            let at = now + reveal_delay;
            ticket.revealed_at = Some(at);
            let tags = if ticket.tier == WinTier::Jackpot {
                vec!["jackpot".to_string()]
            } else {
                Vec::new()
            };
            self.queue.schedule(
                at,
                Some(ticket.id),
                tags,
                Action::Present(Notice::TicketRevealed {
                    ticket_id: ticket.id,
                    prize: ticket.prize,
                    tier: ticket.tier,
                }),
            );
        }
        percent
    }

    /// Ready to collect: revealed and the reveal has been shown
    pub fn can_dismiss(&self) -> bool {
        self.ticket
            .as_ref()
            .and_then(|t| t.revealed_at)
            .is_some_and(|at| self.queue.clock() >= at)
    }

    /// Collect the prize and clear the ticket. Returns the prize.
    pub fn dismiss(&mut self) -> Option<u64> {
        if !self.can_dismiss() {
            return None;
        }
        let ticket = self.ticket.take()?;
        let balance = self.settlement.award(ticket.prize);
        self.stats.record(ticket.price, ticket.prize, ticket.tier, false);

        let now = self.queue.clock();
        self.queue.notice(
            now,
            ticket.id,
            Notice::TicketCollected {
                ticket_id: ticket.id,
                prize: ticket.prize,
            },
        );
        if ticket.prize > 0 {
            self.queue.notice(now, ticket.id, Notice::BalanceChanged { balance });
        }
        log::debug!(
            "Scratch ticket {} collected: {} (balance {})",
            ticket.id,
            ticket.prize,
            balance
        );

        if self.settlement.needs_recovery() {
            if let Some(policy) = self.settlement.recovery() {
                let due = now + policy.delay_ms;
                self.queue.schedule(due, Some(ticket.id), Vec::new(), Action::Recover);
            }
        }
        Some(ticket.prize)
    }

    pub fn advance(&mut self, ms: f64, presenter: &mut dyn Presenter) -> usize {
        self.queue.advance(ms);
        self.deliver(presenter)
    }

    pub fn flush(&mut self, presenter: &mut dyn Presenter) -> usize {
        self.queue.advance_to_end();
        self.deliver(presenter)
    }

    fn deliver(&mut self, presenter: &mut dyn Presenter) -> usize {
        deliver_due(
            &mut self.queue,
            &mut self.settlement,
            &mut self.stats,
            presenter,
            |_| {},
        )
    }
}

impl std::fmt::Debug for ScratchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScratchSession")
            .field("ticket", &self.ticket.as_ref().map(|t| t.id))
            .field("tickets_sold", &self.tickets_sold)
            .field("clock_ms", &self.queue.clock())
            .finish()
    }
}
