//! Settlement engine
//!
//! The only code that moves money. Bets are debited when a round starts,
//! payouts are credited once the outcome is known, the progressive pool
//! grows with every slot bet, and a busted balance is topped back up after
//! a delay.

use serde::{Deserialize, Serialize};

use fh_state::SharedStore;

use crate::outcome::{Outcome, Payout};

// ═══════════════════════════════════════════════════════════════════════════
// CASHIER
// ═══════════════════════════════════════════════════════════════════════════

/// Read-modify-write access to the stored balance
pub struct Cashier {
    store: SharedStore,
    key: String,
    cached: u64,
    /// Last write failed; trust `cached` over the store
    unsynced: bool,
}

impl Cashier {
    /// Bind to `key`, starting from `default` if nothing is stored
    pub fn new(store: SharedStore, key: impl Into<String>, default: u64) -> Self {
        let key = key.into();
        let cached = store.get_or(&key, default);
        Self {
            store,
            key,
            cached,
            unsynced: false,
        }
    }

    /// Current balance (re-read so sessions sharing a store agree)
    pub fn balance(&mut self) -> u64 {
        if !self.unsynced {
            if let Some(stored) = self.store.get(&self.key) {
                self.cached = stored;
            }
        }
        self.cached
    }

    fn save(&mut self, balance: u64) -> u64 {
        self.cached = balance;
        match self.store.set(&self.key, balance) {
            Ok(()) => self.unsynced = false,
            Err(e) => {
                log::warn!("Balance write for '{}' failed, continuing in memory: {}", self.key, e);
                self.unsynced = true;
            }
        }
        balance
    }

    /// Take `amount`; `None` if the balance cannot cover it
    pub fn debit(&mut self, amount: u64) -> Option<u64> {
        let balance = self.balance();
        let next = balance.checked_sub(amount)?;
        Some(self.save(next))
    }

    pub fn credit(&mut self, amount: u64) -> u64 {
        let balance = self.balance();
        self.save(balance.saturating_add(amount))
    }

    /// Overwrite the balance
    pub fn reset(&mut self, balance: u64) -> u64 {
        self.save(balance)
    }
}

impl std::fmt::Debug for Cashier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cashier")
            .field("key", &self.key)
            .field("cached", &self.cached)
            .field("unsynced", &self.unsynced)
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// PROGRESSIVE JACKPOT
// ═══════════════════════════════════════════════════════════════════════════

/// Progressive pool grown by a share of every bet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JackpotPool {
    seed: f64,
    contribution_rate: f64,
    value: f64,
    total_contributions: f64,
}

impl JackpotPool {
    pub fn new(seed: f64, contribution_rate: f64) -> Self {
        Self {
            seed,
            contribution_rate,
            value: seed,
            total_contributions: 0.0,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn seed(&self) -> f64 {
        self.seed
    }

    pub fn total_contributions(&self) -> f64 {
        self.total_contributions
    }

    /// Add the bet's share, returns the new pool
    pub fn contribute(&mut self, bet: u64) -> f64 {
        let contribution = bet as f64 * self.contribution_rate;
        self.value += contribution;
        self.total_contributions += contribution;
        self.value
    }

    /// Pay out the pool and reset it to the seed
    pub fn award(&mut self) -> f64 {
        let won = self.value;
        self.value = self.seed;
        won
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// RECOVERY
// ═══════════════════════════════════════════════════════════════════════════

/// Low-balance top-up
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecoveryPolicy {
    /// Balances below this trigger a recovery
    pub threshold: u64,
    /// Delay after the round before the top-up
    pub delay_ms: f64,
    /// Balance restored
    pub reset_to: u64,
}

impl RecoveryPolicy {
    pub fn applies_to(&self, balance: u64) -> bool {
        balance < self.threshold
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SETTLEMENT
// ═══════════════════════════════════════════════════════════════════════════

/// A debited bet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wager {
    pub bet: u64,
    pub balance_after_debit: u64,
    /// Pool after this bet's contribution
    pub jackpot_after_contribution: Option<f64>,
}

/// Money movements of one settled round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub payout: u64,
    pub jackpot_paid: Option<f64>,
    pub balance: u64,
    /// Pool after settlement
    pub jackpot: Option<f64>,
    /// Balance fell below the recovery threshold
    pub recovery_due: bool,
}

/// Debits, credits, jackpot and recovery for one game
#[derive(Debug)]
pub struct SettlementEngine {
    cashier: Cashier,
    jackpot: Option<JackpotPool>,
    recovery: Option<RecoveryPolicy>,
}

impl SettlementEngine {
    pub fn new(cashier: Cashier) -> Self {
        Self {
            cashier,
            jackpot: None,
            recovery: None,
        }
    }

    pub fn with_jackpot(mut self, pool: JackpotPool) -> Self {
        self.jackpot = Some(pool);
        self
    }

    pub fn with_recovery(mut self, policy: RecoveryPolicy) -> Self {
        self.recovery = Some(policy);
        self
    }

    pub fn balance(&mut self) -> u64 {
        self.cashier.balance()
    }

    pub fn jackpot(&self) -> Option<&JackpotPool> {
        self.jackpot.as_ref()
    }

    pub fn recovery(&self) -> Option<&RecoveryPolicy> {
        self.recovery.as_ref()
    }

    /// Debit the bet and feed the pool. `None` if the balance is short.
    pub fn place_wager(&mut self, bet: u64) -> Option<Wager> {
        if bet == 0 {
            return None;
        }
        let balance_after_debit = self.cashier.debit(bet)?;
        let jackpot_after_contribution = self.jackpot.as_mut().map(|pool| pool.contribute(bet));

        Some(Wager {
            bet,
            balance_after_debit,
            jackpot_after_contribution,
        })
    }

    /// Credit whatever the outcome pays
    pub fn settle(&mut self, wager: &Wager, outcome: &Outcome) -> Settlement {
        let (payout, jackpot_paid) = match outcome.payout {
            Payout::Nothing => (0, None),
            Payout::Multiple(multiplier) => {
                let base = wager.bet as f64 * multiplier;
                let pool = if outcome.is_progressive() {
                    self.jackpot.as_mut().map(JackpotPool::award)
                } else {
                    None
                };
                let total = (base + pool.unwrap_or(0.0)).round().max(0.0) as u64;
                (total, pool)
            }
        };

        let balance = if payout > 0 {
            self.cashier.credit(payout)
        } else {
            self.cashier.balance()
        };

        if let Some(won) = jackpot_paid {
            log::info!("Progressive jackpot of {:.1} paid ({} total)", won, payout);
        }

        Settlement {
            payout,
            jackpot_paid,
            balance,
            jackpot: self.jackpot.as_ref().map(JackpotPool::value),
            recovery_due: self.recovery.is_some_and(|r| r.applies_to(balance)),
        }
    }

    /// Credit a fixed amount outside a wager (collected scratch prizes)
    pub fn award(&mut self, amount: u64) -> u64 {
        if amount == 0 {
            return self.cashier.balance();
        }
        self.cashier.credit(amount)
    }

    /// Does the current balance call for a recovery?
    pub fn needs_recovery(&mut self) -> bool {
        let balance = self.cashier.balance();
        self.recovery.is_some_and(|r| r.applies_to(balance))
    }

    /// Apply the recovery if it still applies, returning the new balance
    pub fn recover(&mut self) -> Option<u64> {
        if !self.needs_recovery() {
            return None;
        }
        let policy = self.recovery?;
        let balance = self.cashier.reset(policy.reset_to);
        log::info!("Balance recovered to {}", balance);
        Some(balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fh_stage::WinTier;
    use fh_state::{BALANCE_KEY, BalanceStore, MemoryStore};
    use std::sync::Arc;

    fn engine(balance: u64) -> (SettlementEngine, SharedStore) {
        let store = MemoryStore::with_balance(balance).shared();
        let cashier = Cashier::new(Arc::clone(&store), BALANCE_KEY, 1000);
        (SettlementEngine::new(cashier), store)
    }

    #[test]
    fn test_loss_nets_minus_bet() {
        let (mut engine, store) = engine(1000);
        let wager = engine.place_wager(100).unwrap();
        let settlement = engine.settle(&wager, &Outcome::loss("TAILS"));
        assert_eq!(settlement.payout, 0);
        assert_eq!(settlement.balance, 900);
        assert_eq!(store.get(BALANCE_KEY), Some(900));
    }

    #[test]
    fn test_win_nets_multiplier() {
        let (mut engine, _) = engine(1000);
        let wager = engine.place_wager(100).unwrap();
        let settlement = engine.settle(&wager, &Outcome::multiple(6.0, WinTier::Win, "Rolled 4"));
        assert_eq!(settlement.payout, 600);
        assert_eq!(settlement.balance, 1500);
    }

    #[test]
    fn test_fractional_payout_rounds() {
        let (mut engine, _) = engine(1000);
        let wager = engine.place_wager(150).unwrap();
        let settlement = engine.settle(&wager, &Outcome::multiple(1.5, WinTier::Win, "Pair"));
        assert_eq!(settlement.payout, 225);

        let wager = engine.place_wager(250).unwrap();
        let settlement = engine.settle(&wager, &Outcome::multiple(1.2, WinTier::Win, "Fruit Mix"));
        assert_eq!(settlement.payout, 300);
    }

    #[test]
    fn test_wager_rejected_when_short() {
        let (mut engine, store) = engine(50);
        assert!(engine.place_wager(100).is_none());
        assert!(engine.place_wager(0).is_none());
        assert_eq!(store.get(BALANCE_KEY), Some(50));
    }

    #[test]
    fn test_progressive_pool() {
        let (engine, _) = engine(10_000);
        let mut engine = engine.with_jackpot(JackpotPool::new(5000.0, 0.1));

        let wager = engine.place_wager(100).unwrap();
        assert_eq!(wager.jackpot_after_contribution, Some(5010.0));

        let outcome = Outcome::multiple(50.0, WinTier::Progressive, "Three Sevens");
        let settlement = engine.settle(&wager, &outcome);
        assert_eq!(settlement.jackpot_paid, Some(5010.0));
        assert_eq!(settlement.payout, 5000 + 5010);
        assert_eq!(settlement.jackpot, Some(5000.0));
        assert_eq!(settlement.balance, 10_000 - 100 + 10_010);
    }

    #[test]
    fn test_recovery_waits_for_trigger() {
        let (engine, store) = engine(100);
        let mut engine = engine.with_recovery(RecoveryPolicy {
            threshold: 100,
            delay_ms: 3000.0,
            reset_to: 1000,
        });

        assert_eq!(engine.recover(), None);
        let wager = engine.place_wager(100).unwrap();
        let settlement = engine.settle(&wager, &Outcome::loss("No Match"));
        assert!(settlement.recovery_due);
        assert_eq!(store.get(BALANCE_KEY), Some(0));

        assert_eq!(engine.recover(), Some(1000));
        assert_eq!(store.get(BALANCE_KEY), Some(1000));
    }

    #[test]
    fn test_cashier_reads_shared_store() {
        let (mut engine, store) = engine(1000);
        store.set(BALANCE_KEY, 300).unwrap();
        assert_eq!(engine.balance(), 300);
    }
}
