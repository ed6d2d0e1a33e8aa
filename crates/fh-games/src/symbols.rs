//! Slot symbols and reel strips

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rng::{Randomizer, RngError, WeightedTable};

/// Slot machine symbol, serialized as its glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SlotSymbol {
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "💰")]
    MoneyBag,
    #[serde(rename = "💎")]
    Diamond,
    #[serde(rename = "🔔")]
    Bell,
    #[serde(rename = "🍇")]
    Grapes,
    #[serde(rename = "🍊")]
    Orange,
    #[serde(rename = "🍋")]
    Lemon,
    #[serde(rename = "🍒")]
    Cherry,
    /// Empty position, never drawn by the default weights
    #[serde(rename = "❌")]
    Blank,
}

impl SlotSymbol {
    /// Drawable symbols, highest value first
    pub const PAYING: [SlotSymbol; 8] = [
        SlotSymbol::Seven,
        SlotSymbol::MoneyBag,
        SlotSymbol::Diamond,
        SlotSymbol::Bell,
        SlotSymbol::Grapes,
        SlotSymbol::Orange,
        SlotSymbol::Lemon,
        SlotSymbol::Cherry,
    ];

    /// Symbols counted by the fruit mix rule
    pub const FRUITS: [SlotSymbol; 4] = [
        SlotSymbol::Cherry,
        SlotSymbol::Lemon,
        SlotSymbol::Orange,
        SlotSymbol::Grapes,
    ];

    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Seven => "7",
            Self::MoneyBag => "💰",
            Self::Diamond => "💎",
            Self::Bell => "🔔",
            Self::Grapes => "🍇",
            Self::Orange => "🍊",
            Self::Lemon => "🍋",
            Self::Cherry => "🍒",
            Self::Blank => "❌",
        }
    }

    pub fn from_glyph(glyph: &str) -> Option<Self> {
        Self::PAYING
            .iter()
            .copied()
            .chain(std::iter::once(Self::Blank))
            .find(|s| s.glyph() == glyph)
    }

    /// Singular name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Seven => "Seven",
            Self::MoneyBag => "Money Bag",
            Self::Diamond => "Diamond",
            Self::Bell => "Bell",
            Self::Grapes => "Grapes",
            Self::Orange => "Orange",
            Self::Lemon => "Lemon",
            Self::Cherry => "Cherry",
            Self::Blank => "Blank",
        }
    }

    /// Plural name for combination labels
    pub fn plural(&self) -> &'static str {
        match self {
            Self::Seven => "Sevens",
            Self::MoneyBag => "Money Bags",
            Self::Diamond => "Diamonds",
            Self::Bell => "Bells",
            Self::Grapes => "Grapes",
            Self::Orange => "Oranges",
            Self::Lemon => "Lemons",
            Self::Cherry => "Cherries",
            Self::Blank => "Blanks",
        }
    }

    /// Reel weight in the standard machine
    pub fn default_weight(&self) -> u32 {
        match self {
            Self::Seven => 2,
            Self::MoneyBag => 3,
            Self::Diamond => 4,
            Self::Bell => 6,
            Self::Grapes => 10,
            Self::Orange => 12,
            Self::Lemon => 15,
            Self::Cherry => 18,
            Self::Blank => 0,
        }
    }

    pub fn is_fruit(&self) -> bool {
        Self::FRUITS.contains(self)
    }
}

impl fmt::Display for SlotSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glyph())
    }
}

/// Weight of one symbol on the reels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolWeight {
    pub symbol: SlotSymbol,
    pub weight: u32,
}

/// Standard weights (2, 3, 4, 6, 10, 12, 15, 18); blank is never drawn
pub fn default_symbol_weights() -> Vec<SymbolWeight> {
    SlotSymbol::PAYING
        .iter()
        .map(|&symbol| SymbolWeight {
            symbol,
            weight: symbol.default_weight(),
        })
        .collect()
}

/// Build the draw table for a set of weights
pub fn symbol_table(weights: &[SymbolWeight]) -> Result<WeightedTable<SlotSymbol>, RngError> {
    WeightedTable::new(weights.iter().map(|w| (w.symbol, w.weight)).collect())
}

/// A reel strip drawn for one spin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReelStrip {
    /// Symbols in order
    pub symbols: Vec<SlotSymbol>,
    /// Reel index
    pub reel_index: u8,
}

impl ReelStrip {
    /// Create a new reel strip
    pub fn new(reel_index: u8, symbols: Vec<SlotSymbol>) -> Self {
        Self {
            symbols,
            reel_index,
        }
    }

    /// Draw `length` independent symbols
    pub fn generate(
        reel_index: u8,
        length: usize,
        table: &WeightedTable<SlotSymbol>,
        rng: &mut Randomizer,
    ) -> Self {
        let symbols = (0..length).map(|_| *rng.pick(table)).collect();
        Self::new(reel_index, symbols)
    }

    /// Get symbol at position (wraps around)
    pub fn symbol_at(&self, position: usize) -> SlotSymbol {
        if self.symbols.is_empty() {
            return SlotSymbol::Blank;
        }
        self.symbols[position % self.symbols.len()]
    }

    /// `rows` consecutive symbols starting at `position`
    pub fn window(&self, position: usize, rows: usize) -> Vec<SlotSymbol> {
        (0..rows).map(|row| self.symbol_at(position + row)).collect()
    }

    /// Get total strip length
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_round_trip() {
        for symbol in SlotSymbol::PAYING {
            assert_eq!(SlotSymbol::from_glyph(symbol.glyph()), Some(symbol));
        }
        assert_eq!(SlotSymbol::from_glyph("❌"), Some(SlotSymbol::Blank));
        assert_eq!(SlotSymbol::from_glyph("🎲"), None);
    }

    #[test]
    fn test_serde_uses_glyphs() {
        let json = serde_json::to_string(&vec![SlotSymbol::Seven, SlotSymbol::Cherry]).unwrap();
        assert_eq!(json, r#"["7","🍒"]"#);
    }

    #[test]
    fn test_default_weights_total() {
        let total: u32 = default_symbol_weights().iter().map(|w| w.weight).sum();
        assert_eq!(total, 70);
    }

    #[test]
    fn test_strip_window_wraps() {
        let strip = ReelStrip::new(
            0,
            vec![SlotSymbol::Seven, SlotSymbol::Bell, SlotSymbol::Cherry],
        );
        assert_eq!(
            strip.window(2, 2),
            vec![SlotSymbol::Cherry, SlotSymbol::Seven]
        );
    }

    #[test]
    fn test_generated_strip_never_blank() {
        let table = symbol_table(&default_symbol_weights()).unwrap();
        let mut rng = Randomizer::seeded(11);
        let strip = ReelStrip::generate(1, 50, &table, &mut rng);
        assert_eq!(strip.len(), 50);
        assert!(strip.symbols.iter().all(|s| *s != SlotSymbol::Blank));
    }
}
