//! Batch runner
//!
//! A run is cut into fixed-size chunks. Each chunk gets its own seed from a
//! ChaCha stream keyed by the run seed and plays a fresh session with instant
//! timing, so the merged statistics depend only on the seed and the chunk
//! size, never on the thread count.

use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use fh_games::{
    BetLimits, CasinoConfig, CoinFlip, Dice, GameSession, Roulette, RoundGame, ScratchRules,
    ScratchSession, SessionStats, Slot, TimingProfile, Wheel,
};
use fh_stage::{CoinFace, GameKind, NullPresenter};
use fh_state::{BalanceStore, MemoryStore, SharedStore};

use crate::error::{SimError, SimResult};
use crate::report::SimReport;

/// Balance every simulated session starts with; never runs dry
const BANKROLL: u64 = u64::MAX / 4;

/// Rounds per chunk
pub const DEFAULT_CHUNK_SIZE: u64 = 10_000;

/// What to simulate
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub game: GameKind,
    pub rounds: u64,
    /// Random seed if `None`
    pub seed: Option<u64>,
    /// Game minimum if `None`; ignored for scratch tickets
    pub bet: Option<u64>,
    pub threads: usize,
    pub chunk_size: u64,
    pub casino: CasinoConfig,
}

impl SimConfig {
    pub fn new(game: GameKind, rounds: u64) -> Self {
        Self {
            game,
            rounds,
            seed: None,
            bet: None,
            threads: num_cpus::get(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            casino: CasinoConfig::default(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_bet(mut self, bet: u64) -> Self {
        self.bet = Some(bet);
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_casino(mut self, casino: CasinoConfig) -> Self {
        self.casino = casino;
        self
    }

    /// Stake per round
    pub fn effective_bet(&self) -> u64 {
        match bet_limits(self.game, &self.casino) {
            Some(limits) => self.bet.unwrap_or(limits.min),
            None => self.casino.scratch.ticket_price,
        }
    }

    fn validate(&self) -> SimResult<()> {
        if self.rounds == 0 {
            return Err(SimError::NoRounds);
        }
        self.casino.validate()?;

        match (bet_limits(self.game, &self.casino), self.bet) {
            (Some(limits), Some(bet)) if bet < limits.min || bet > limits.max => {
                Err(SimError::InvalidBet {
                    game: self.game,
                    bet,
                    min: limits.min,
                    max: limits.max,
                })
            }
            (None, Some(bet)) => {
                log::warn!(
                    "Bet {} ignored: scratch tickets cost {}",
                    bet,
                    self.casino.scratch.ticket_price
                );
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// Bet limits of a game (`None` for fixed-price scratch tickets)
pub fn bet_limits(game: GameKind, casino: &CasinoConfig) -> Option<BetLimits> {
    match game {
        GameKind::CoinFlip => Some(casino.coin_flip.limits),
        GameKind::Dice => Some(casino.dice.limits),
        GameKind::Roulette => Some(casino.roulette.limits),
        GameKind::Slot => Some(casino.slot.limits),
        GameKind::Scratch => None,
    }
}

/// Closed-form return to player (%), where one exists
pub fn theoretical_rtp(game: GameKind, casino: &CasinoConfig) -> Option<f64> {
    match game {
        GameKind::CoinFlip => {
            let rules = &casino.coin_flip;
            Some(rules.win_probability * rules.multiplier * 100.0)
        }
        GameKind::Dice => {
            let rules = &casino.dice;
            Some(rules.multiplier / rules.faces as f64 * 100.0)
        }
        GameKind::Roulette => Some(casino.roulette.multiplier / Wheel.pockets() as f64 * 100.0),
        GameKind::Scratch => {
            let rules = &casino.scratch;
            let bands = rules.bands().ok()?;
            Some(bands.expected_value() / rules.ticket_price as f64 * 100.0)
        }
        // The progressive pool makes the slot RTP depend on history
        GameKind::Slot => None,
    }
}

/// Run a batch simulation
pub fn simulate(config: &SimConfig) -> SimResult<SimReport> {
    config.validate()?;
    let seed = config.seed.unwrap_or_else(rand::random::<u64>);
    let chunks = plan_chunks(config.rounds, config.chunk_size, seed);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads.max(1))
        .build()?;

    log::info!(
        "Simulating {} rounds of {} in {} chunks on {} threads (seed {})",
        config.rounds,
        config.game,
        chunks.len(),
        config.threads,
        seed
    );

    let started = Instant::now();
    let batches: Vec<SimResult<SessionStats>> =
        pool.install(|| chunks.par_iter().map(|chunk| run_chunk(config, chunk)).collect());

    let mut stats = SessionStats::default();
    for batch in batches {
        stats.merge(&batch?);
    }

    let report = SimReport::new(config, seed, stats, started.elapsed());
    log::info!(
        "{}: RTP {:.2}%, hit rate {:.2}%",
        config.game,
        report.rtp(),
        report.hit_rate()
    );
    Ok(report)
}

/// Same round count and seed for every game
pub fn compare(
    rounds: u64,
    seed: Option<u64>,
    casino: &CasinoConfig,
    threads: usize,
) -> SimResult<Vec<SimReport>> {
    GameKind::ALL
        .iter()
        .map(|&game| {
            let mut config = SimConfig::new(game, rounds)
                .with_casino(casino.clone())
                .with_threads(threads);
            config.seed = seed;
            simulate(&config)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Chunk {
    rounds: u64,
    seed: u64,
}

fn plan_chunks(rounds: u64, chunk_size: u64, seed: u64) -> Vec<Chunk> {
    let mut seeder = ChaCha8Rng::seed_from_u64(seed);
    let size = chunk_size.max(1);
    let mut chunks = Vec::with_capacity(rounds.div_ceil(size) as usize);
    let mut remaining = rounds;
    while remaining > 0 {
        let n = remaining.min(size);
        chunks.push(Chunk {
            rounds: n,
            seed: seeder.random::<u64>(),
        });
        remaining -= n;
    }
    chunks
}

fn bankroll_store(casino: &CasinoConfig) -> SimResult<SharedStore> {
    let store = MemoryStore::new();
    store.set(&casino.balance_key, BANKROLL)?;
    Ok(store.shared())
}

fn run_chunk(config: &SimConfig, chunk: &Chunk) -> SimResult<SessionStats> {
    let casino = config.casino.clone().with_timing(TimingProfile::Instant);
    match config.game {
        GameKind::CoinFlip => play::<CoinFlip>(config, &casino, chunk, Some(CoinFace::Heads)),
        GameKind::Dice => play::<Dice>(config, &casino, chunk, Some(1)),
        GameKind::Roulette => play::<Roulette>(config, &casino, chunk, Some(17)),
        GameKind::Slot => play::<Slot>(config, &casino, chunk, None),
        GameKind::Scratch => play_scratch(&casino, chunk),
    }
}

fn play<G: RoundGame>(
    config: &SimConfig,
    casino: &CasinoConfig,
    chunk: &Chunk,
    selection: Option<G::Selection>,
) -> SimResult<SessionStats> {
    let mut session =
        GameSession::<G>::from_config(bankroll_store(casino)?, casino)?.with_seed(chunk.seed);
    if let Some(selection) = selection {
        session.select(selection);
    }
    if let Some(bet) = config.bet {
        session.set_bet(bet);
    }

    let mut presenter = NullPresenter;
    for played in 0..chunk.rounds {
        if session.start_round().is_none() {
            return Err(SimError::Stalled {
                game: G::KIND,
                played,
            });
        }
        session.flush(&mut presenter);
    }
    Ok(session.stats().clone())
}

fn play_scratch(casino: &CasinoConfig, chunk: &Chunk) -> SimResult<SessionStats> {
    let mut session = ScratchSession::new(bankroll_store(casino)?, casino)?.with_seed(chunk.seed);
    let rules = session.rules().clone();
    let mut presenter = NullPresenter;

    for played in 0..chunk.rounds {
        let stalled = || SimError::Stalled {
            game: GameKind::Scratch,
            played,
        };
        session.purchase_ticket().ok_or_else(stalled)?;
        scratch_until_revealed(&mut session, &rules);
        session.dismiss().ok_or_else(stalled)?;
        session.flush(&mut presenter);
    }
    Ok(session.stats().clone())
}

/// Horizontal strokes, top to bottom, until the prize shows
fn scratch_until_revealed(session: &mut ScratchSession, rules: &ScratchRules) {
    let spacing = rules.brush_radius.max(rules.cell_size);
    let mut y = 0.0;
    while y <= rules.surface_height + spacing {
        session.scratch_stroke((0.0, y), (rules.surface_width, y));
        if session.ticket().is_some_and(|t| t.is_revealed()) {
            return;
        }
        y += spacing;
    }
}
