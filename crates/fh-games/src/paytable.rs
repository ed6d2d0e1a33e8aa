//! Slot paytable and combination resolution
//!
//! Combinations are counted over every visible symbol, not along lines.
//! The first rule that matches wins:
//!
//! ```text
//! 1. three of a kind   (count >= 3, priority 7 💰 💎 🔔 🍇 🍊 🍋 🍒)
//! 2. pair              (count >= 2, priority 7 💰 💎 🔔 🍒)
//! 3. fruit mix         (🍒 + 🍋 + 🍊 + 🍇 >= 3)
//! 4. no match
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use fh_stage::WinTier;

use crate::outcome::Outcome;
use crate::symbols::SlotSymbol;

/// One paying combination
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComboPay {
    pub symbol: SlotSymbol,
    pub multiplier: f64,
}

impl ComboPay {
    pub fn new(symbol: SlotSymbol, multiplier: f64) -> Self {
        Self { symbol, multiplier }
    }
}

/// Which rule matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "symbol", rename_all = "snake_case")]
pub enum SlotCombo {
    ThreeOfAKind(SlotSymbol),
    Pair(SlotSymbol),
    FruitMix,
    NoMatch,
}

impl SlotCombo {
    pub fn label(&self) -> String {
        match self {
            Self::ThreeOfAKind(s) => format!("Three {}", s.plural()),
            Self::Pair(s) => format!("Pair of {}", s.plural()),
            Self::FruitMix => "Fruit Mix".to_string(),
            Self::NoMatch => "No Match".to_string(),
        }
    }
}

/// Slot paytable, entries listed in priority order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotPaytable {
    pub three_of_a_kind: Vec<ComboPay>,
    pub pairs: Vec<ComboPay>,
    pub fruit_mix: f64,
    /// Fruits needed for the mix rule
    pub fruit_mix_count: u8,
    /// Three of these pays the progressive pool
    pub progressive_symbol: SlotSymbol,
    /// Three of any of these is flagged as a jackpot
    pub jackpot_triples: Vec<SlotSymbol>,
    /// A pair of any of these is flagged as a jackpot
    pub jackpot_pairs: Vec<SlotSymbol>,
}

impl SlotPaytable {
    /// The standard machine
    pub fn standard() -> Self {
        use SlotSymbol::*;
        Self {
            three_of_a_kind: vec![
                ComboPay::new(Seven, 50.0),
                ComboPay::new(MoneyBag, 25.0),
                ComboPay::new(Diamond, 15.0),
                ComboPay::new(Bell, 10.0),
                ComboPay::new(Grapes, 7.0),
                ComboPay::new(Orange, 5.0),
                ComboPay::new(Lemon, 3.0),
                ComboPay::new(Cherry, 2.0),
            ],
            pairs: vec![
                ComboPay::new(Seven, 10.0),
                ComboPay::new(MoneyBag, 5.0),
                ComboPay::new(Diamond, 3.0),
                ComboPay::new(Bell, 2.0),
                ComboPay::new(Cherry, 1.5),
            ],
            fruit_mix: 1.2,
            fruit_mix_count: 3,
            progressive_symbol: Seven,
            jackpot_triples: vec![MoneyBag, Diamond],
            jackpot_pairs: vec![Seven],
        }
    }

    /// Find the winning combination for the visible symbols
    pub fn combo(&self, visible: &[SlotSymbol]) -> (SlotCombo, f64) {
        let counts = count_symbols(visible);
        let count = |s: &SlotSymbol| counts.get(s).copied().unwrap_or(0);

        if let Some(pay) = self.three_of_a_kind.iter().find(|p| count(&p.symbol) >= 3) {
            return (SlotCombo::ThreeOfAKind(pay.symbol), pay.multiplier);
        }
        if let Some(pay) = self.pairs.iter().find(|p| count(&p.symbol) >= 2) {
            return (SlotCombo::Pair(pay.symbol), pay.multiplier);
        }
        let fruits: usize = SlotSymbol::FRUITS.iter().map(count).sum();
        if fruits >= self.fruit_mix_count as usize {
            return (SlotCombo::FruitMix, self.fruit_mix);
        }
        (SlotCombo::NoMatch, 0.0)
    }

    /// Presentation tier for a combination
    pub fn tier(&self, combo: SlotCombo) -> WinTier {
        match combo {
            SlotCombo::NoMatch => WinTier::Loss,
            SlotCombo::ThreeOfAKind(s) if s == self.progressive_symbol => WinTier::Progressive,
            SlotCombo::ThreeOfAKind(s) if self.jackpot_triples.contains(&s) => WinTier::Jackpot,
            SlotCombo::Pair(s) if self.jackpot_pairs.contains(&s) => WinTier::Jackpot,
            _ => WinTier::Win,
        }
    }

    /// Losing layouts that look close to a win
    pub fn is_near_miss(&self, visible: &[SlotSymbol]) -> bool {
        let counts = count_symbols(visible);
        let fruits: usize = SlotSymbol::FRUITS
            .iter()
            .map(|s| counts.get(s).copied().unwrap_or(0))
            .sum();
        counts
            .iter()
            .any(|(s, &n)| *s != SlotSymbol::Blank && n == 2)
            || fruits + 1 == self.fruit_mix_count as usize
    }

    /// Full evaluation of the visible symbols
    pub fn evaluate(&self, visible: &[SlotSymbol]) -> Outcome {
        let (combo, multiplier) = self.combo(visible);
        match combo {
            SlotCombo::NoMatch => {
                Outcome::loss(combo.label()).with_near_miss(self.is_near_miss(visible))
            }
            _ => Outcome::multiple(multiplier, self.tier(combo), combo.label()),
        }
    }
}

impl Default for SlotPaytable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Occurrences of each symbol
pub fn count_symbols(visible: &[SlotSymbol]) -> HashMap<SlotSymbol, usize> {
    let mut counts = HashMap::new();
    for symbol in visible {
        *counts.entry(*symbol).or_insert(0) += 1;
    }
    counts
}

/// Parse glyphs ("7", "🍒", "❌", ...) into symbols
pub fn parse_glyphs(glyphs: &[&str]) -> Option<Vec<SlotSymbol>> {
    glyphs.iter().map(|g| SlotSymbol::from_glyph(g)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(glyphs: &[&str]) -> Outcome {
        let visible = parse_glyphs(glyphs).unwrap();
        SlotPaytable::standard().evaluate(&visible)
    }

    #[test]
    fn test_three_sevens_is_progressive() {
        let outcome = eval(&["7", "7", "7", "🍒", "🍒", "🍒"]);
        assert_eq!(outcome.multiplier(), 50.0);
        assert_eq!(outcome.tier, WinTier::Progressive);
        assert!(outcome.is_progressive());
        assert_eq!(outcome.label, "Three Sevens");
    }

    #[test]
    fn test_fruit_mix() {
        let outcome = eval(&["🍒", "🍋", "🍊", "🔔", "❌", "❌"]);
        assert_eq!(outcome.multiplier(), 1.2);
        assert_eq!(outcome.tier, WinTier::Win);
        assert_eq!(outcome.label, "Fruit Mix");
    }

    #[test]
    fn test_triple_beats_pair() {
        let outcome = eval(&["🍋", "🍋", "🍋", "7", "7", "🔔"]);
        assert_eq!(outcome.multiplier(), 3.0);
        assert_eq!(outcome.label, "Three Lemons");
    }

    #[test]
    fn test_pair_priority_order() {
        let outcome = eval(&["💎", "💎", "💰", "💰", "🔔", "🍋"]);
        assert_eq!(outcome.multiplier(), 5.0);
        assert_eq!(outcome.label, "Pair of Money Bags");
        assert_eq!(outcome.tier, WinTier::Win);
    }

    #[test]
    fn test_jackpot_flags() {
        assert_eq!(eval(&["💎", "💎", "💎", "🔔", "🍋", "🍒"]).tier, WinTier::Jackpot);
        assert_eq!(eval(&["7", "🔔", "7", "💎", "🍋", "💰"]).tier, WinTier::Jackpot);
        assert_eq!(eval(&["🔔", "🔔", "🔔", "7", "🍋", "💰"]).tier, WinTier::Win);
    }

    #[test]
    fn test_grape_pair_is_loss_and_near_miss() {
        let outcome = eval(&["🍇", "🍇", "🔔", "💎", "7", "💰"]);
        assert!(!outcome.is_win());
        assert!(outcome.near_miss);
    }

    #[test]
    fn test_two_fruits_near_miss() {
        let outcome = eval(&["🍇", "🍒", "🔔", "💎", "7", "💰"]);
        assert!(!outcome.is_win());
        assert!(outcome.near_miss);

        let clean = eval(&["🔔", "💎", "7", "💰", "❌", "❌"]);
        assert!(!clean.is_win());
        assert!(!clean.near_miss);
    }
}
