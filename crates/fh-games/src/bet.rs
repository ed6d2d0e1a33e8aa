//! Bet manager
//!
//! Holds the bet amount and the player's selection for one game. Changes
//! that would leave the bet outside `[min, min(max, balance)]` are ignored.

use serde::{Deserialize, Serialize};

/// Bounds and step sizes for a game's bet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetLimits {
    pub min: u64,
    pub max: u64,
    pub increase_step: u64,
    pub decrease_step: u64,
}

impl BetLimits {
    /// Same step in both directions
    pub fn new(min: u64, max: u64, step: u64) -> Self {
        Self {
            min,
            max,
            increase_step: step,
            decrease_step: step,
        }
    }

    /// Different increase/decrease steps
    pub fn with_steps(mut self, increase_step: u64, decrease_step: u64) -> Self {
        self.increase_step = increase_step;
        self.decrease_step = decrease_step;
        self
    }

    pub fn coin_flip() -> Self {
        Self::new(100, 1000, 50)
    }

    pub fn dice() -> Self {
        Self::new(100, 1000, 100)
    }

    pub fn roulette() -> Self {
        Self::new(100, 1000, 100)
    }

    pub fn slot() -> Self {
        Self::new(100, 1000, 100)
    }

    /// Would `amount` be an acceptable bet against `balance`?
    pub fn allows(&self, amount: u64, balance: u64) -> bool {
        amount >= self.min && amount <= self.max && amount <= balance
    }

    /// Highest bet currently reachable
    pub fn ceiling(&self, balance: u64) -> u64 {
        self.max.min(balance)
    }
}

impl Default for BetLimits {
    fn default() -> Self {
        Self::new(100, 1000, 100)
    }
}

/// Where a round stands from the player's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmState {
    /// No target chosen yet
    AwaitingSelection,
    /// Selection and bet in place, a round can start
    Armed,
    /// Outcome decided, presentation still running
    Resolved,
}

/// Bet amount + selection for one game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetSlip<S> {
    amount: u64,
    selection: Option<S>,
    limits: BetLimits,
}

impl<S> BetSlip<S> {
    /// Start at the minimum bet with no selection
    pub fn new(limits: BetLimits) -> Self {
        Self {
            amount: limits.min,
            selection: None,
            limits,
        }
    }

    /// Start with a selection already in place
    pub fn with_selection(mut self, selection: S) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn selection(&self) -> Option<&S> {
        self.selection.as_ref()
    }

    pub fn limits(&self) -> &BetLimits {
        &self.limits
    }

    /// Replace the selection. Selections persist across rounds.
    pub fn set_selection(&mut self, selection: S) {
        self.selection = Some(selection);
    }

    pub fn has_selection(&self) -> bool {
        self.selection.is_some()
    }

    /// Raise by the configured step
    pub fn increase(&mut self, balance: u64) -> bool {
        self.increase_by(self.limits.increase_step, balance)
    }

    /// Lower by the configured step
    pub fn decrease(&mut self, balance: u64) -> bool {
        self.decrease_by(self.limits.decrease_step, balance)
    }

    pub fn increase_by(&mut self, step: u64, balance: u64) -> bool {
        match self.amount.checked_add(step) {
            Some(next) => self.set_amount(next, balance),
            None => false,
        }
    }

    pub fn decrease_by(&mut self, step: u64, balance: u64) -> bool {
        match self.amount.checked_sub(step) {
            Some(next) => self.set_amount(next, balance),
            None => false,
        }
    }

    /// Jump straight to `amount` if the limits allow it
    pub fn set_amount(&mut self, amount: u64, balance: u64) -> bool {
        if !self.limits.allows(amount, balance) {
            return false;
        }
        self.amount = amount;
        true
    }

    pub fn can_increase(&self, balance: u64) -> bool {
        self.amount
            .checked_add(self.limits.increase_step)
            .is_some_and(|next| self.limits.allows(next, balance))
    }

    pub fn can_decrease(&self, balance: u64) -> bool {
        self.amount
            .checked_sub(self.limits.decrease_step)
            .is_some_and(|next| self.limits.allows(next, balance))
    }

    /// Selection made and bet affordable
    pub fn is_ready(&self, balance: u64) -> bool {
        self.selection.is_some() && self.amount >= self.limits.min && self.amount <= balance
    }

    pub fn arm_state(&self) -> ArmState {
        if self.selection.is_some() {
            ArmState::Armed
        } else {
            ArmState::AwaitingSelection
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_minimum() {
        let slip: BetSlip<u8> = BetSlip::new(BetLimits::dice());
        assert_eq!(slip.amount(), 100);
        assert_eq!(slip.arm_state(), ArmState::AwaitingSelection);
    }

    #[test]
    fn test_increase_capped_by_balance() {
        let mut slip: BetSlip<u8> = BetSlip::new(BetLimits::coin_flip());
        assert!(slip.increase(200));
        assert!(slip.increase(200));
        assert_eq!(slip.amount(), 200);
        assert!(!slip.increase(200));
        assert!(!slip.can_increase(200));
        assert_eq!(slip.amount(), 200);
    }

    #[test]
    fn test_increase_capped_by_max() {
        let mut slip: BetSlip<u8> = BetSlip::new(BetLimits::slot());
        while slip.increase(50_000) {}
        assert_eq!(slip.amount(), 1000);
    }

    #[test]
    fn test_decrease_never_below_min() {
        let mut slip: BetSlip<u8> = BetSlip::new(BetLimits::roulette());
        assert!(!slip.decrease(1000));
        assert!(!slip.can_decrease(1000));
        assert!(slip.increase(1000));
        assert!(slip.decrease(1000));
        assert_eq!(slip.amount(), 100);
    }

    #[test]
    fn test_separate_steps() {
        let limits = BetLimits::new(100, 1000, 100).with_steps(100, 50);
        let mut slip: BetSlip<u8> = BetSlip::new(limits);
        slip.increase(1000);
        slip.decrease(1000);
        assert_eq!(slip.amount(), 150);
    }

    #[test]
    fn test_selection_persists() {
        let mut slip = BetSlip::new(BetLimits::dice()).with_selection(4u8);
        assert!(slip.is_ready(1000));
        slip.set_selection(6);
        assert_eq!(slip.selection(), Some(&6));
        assert!(!slip.is_ready(50));
    }
}
