//! RNG and weighting engine
//!
//! Every random decision in the games goes through a [`Randomizer`]:
//! uniform draws (die faces, wheel angles, stop positions), weighted
//! picks (slot symbols) and cumulative prize bands (scratch tickets).

use std::ops::{Range, RangeInclusive};

use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Tolerance when checking that band probabilities do not exceed 1.0
const BAND_TOLERANCE: f64 = 1e-9;

/// Errors raised while building weighted tables or prize bands
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RngError {
    #[error("Weighted table is empty")]
    EmptyTable,

    #[error("Weighted table has zero total weight")]
    ZeroWeight,

    #[error("Invalid weights: {0}")]
    InvalidWeights(String),

    #[error("Prize band {index} has min {min} above max {max}")]
    InvertedBand { index: usize, min: u64, max: u64 },

    #[error("Prize band {0} has a probability outside [0, 1]")]
    BadProbability(usize),

    #[error("Prize band probabilities sum to {0}, above 1.0")]
    BandsOverflow(f64),
}

/// Source of randomness for every game
#[derive(Debug, Clone)]
pub struct Randomizer {
    rng: StdRng,
}

impl Randomizer {
    /// OS-seeded randomizer for real play
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible randomizer (tests, simulations)
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform in [0, 1)
    pub fn unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    /// True with probability `p` (clamped to [0, 1])
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.random_bool(p.clamp(0.0, 1.0))
    }

    /// Uniform index in `range`; an empty range yields its start
    pub fn uniform_usize(&mut self, range: Range<usize>) -> usize {
        if range.is_empty() {
            return range.start;
        }
        self.rng.random_range(range)
    }

    /// Uniform integer in `range` (inclusive); an empty range yields its start
    pub fn uniform_u64(&mut self, range: RangeInclusive<u64>) -> u64 {
        if range.is_empty() {
            return *range.start();
        }
        self.rng.random_range(range)
    }

    /// Uniform float in `range`; an empty range yields its start
    pub fn uniform_f64(&mut self, range: Range<f64>) -> f64 {
        if range.is_empty() {
            return range.start;
        }
        range.start + self.unit() * (range.end - range.start)
    }

    /// Weighted pick from a table
    pub fn pick<'a, T>(&mut self, table: &'a WeightedTable<T>) -> &'a T {
        let idx = table.index.sample(&mut self.rng);
        &table.entries[idx].0
    }
}

/// Labels with integer weights; `P(label) = weight / total`
#[derive(Debug, Clone)]
pub struct WeightedTable<T> {
    entries: Vec<(T, u32)>,
    index: WeightedIndex<u32>,
    total: u32,
}

impl<T> WeightedTable<T> {
    /// Build a table. Individual zero weights are allowed (never drawn),
    /// an all-zero table is not.
    pub fn new(entries: Vec<(T, u32)>) -> Result<Self, RngError> {
        if entries.is_empty() {
            return Err(RngError::EmptyTable);
        }
        let total = entries
            .iter()
            .try_fold(0u32, |acc, (_, w)| acc.checked_add(*w))
            .ok_or_else(|| RngError::InvalidWeights("total weight overflows u32".into()))?;
        if total == 0 {
            return Err(RngError::ZeroWeight);
        }
        let index = WeightedIndex::new(entries.iter().map(|(_, w)| *w))
            .map_err(|e| RngError::InvalidWeights(e.to_string()))?;

        Ok(Self {
            entries,
            index,
            total,
        })
    }

    pub fn total_weight(&self) -> u32 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(T, u32)] {
        &self.entries
    }

    pub fn labels(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(label, _)| label)
    }
}

impl<T: PartialEq> WeightedTable<T> {
    /// Theoretical probability of drawing `label`
    pub fn probability(&self, label: &T) -> f64 {
        let weight: u32 = self
            .entries
            .iter()
            .filter(|(l, _)| l == label)
            .map(|(_, w)| *w)
            .sum();
        weight as f64 / self.total as f64
    }
}

/// One cumulative-probability prize band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrizeBand {
    pub min: u64,
    pub max: u64,
    pub probability: f64,
}

impl PrizeBand {
    pub fn new(min: u64, max: u64, probability: f64) -> Self {
        Self {
            min,
            max,
            probability,
        }
    }

    /// Mean prize inside the band
    pub fn mean(&self) -> f64 {
        (self.min as f64 + self.max as f64) / 2.0
    }
}

/// Ordered prize bands.
///
/// A roll `r` in [0, 1) walks the bands accumulating probability; the first
/// band with `r <= cumulative` wins and pays uniformly in `[min, max]`.
/// Residual mass (probabilities summing below 1.0) pays nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrizeBands {
    bands: Vec<PrizeBand>,
}

impl PrizeBands {
    pub fn new(bands: Vec<PrizeBand>) -> Result<Self, RngError> {
        let bands = Self { bands };
        bands.validate()?;
        Ok(bands)
    }

    /// Check ordering of each band and the probability total
    pub fn validate(&self) -> Result<(), RngError> {
        for (index, band) in self.bands.iter().enumerate() {
            if band.min > band.max {
                return Err(RngError::InvertedBand {
                    index,
                    min: band.min,
                    max: band.max,
                });
            }
            if !(0.0..=1.0).contains(&band.probability) {
                return Err(RngError::BadProbability(index));
            }
        }
        let total = self.total_probability();
        if total > 1.0 + BAND_TOLERANCE {
            return Err(RngError::BandsOverflow(total));
        }
        Ok(())
    }

    pub fn bands(&self) -> &[PrizeBand] {
        &self.bands
    }

    pub fn total_probability(&self) -> f64 {
        self.bands.iter().map(|b| b.probability).sum()
    }

    /// Band selected by a roll in [0, 1)
    pub fn band_for(&self, roll: f64) -> Option<&PrizeBand> {
        let mut cumulative = 0.0;
        for band in &self.bands {
            cumulative += band.probability;
            if roll <= cumulative {
                return Some(band);
            }
        }
        None
    }

    /// Draw a prize
    pub fn draw(&self, rng: &mut Randomizer) -> u64 {
        let roll = rng.unit();
        match self.band_for(roll) {
            Some(band) => rng.uniform_u64(band.min..=band.max),
            None => 0,
        }
    }

    /// Expected prize per draw
    pub fn expected_value(&self) -> f64 {
        self.bands.iter().map(|b| b.probability * b.mean()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = Randomizer::seeded(7);
        let mut b = Randomizer::seeded(7);
        for _ in 0..10 {
            assert_eq!(a.uniform_u64(1..=6), b.uniform_u64(1..=6));
        }
    }

    #[test]
    fn test_uniform_bounds() {
        let mut rng = Randomizer::seeded(1);
        for _ in 0..1000 {
            let face = rng.uniform_u64(1..=6);
            assert!((1..=6).contains(&face));
            let pos = rng.uniform_usize(5..45);
            assert!((5..45).contains(&pos));
            let angle = rng.uniform_f64(0.0..360.0);
            assert!((0.0..360.0).contains(&angle));
        }
        assert_eq!(rng.uniform_usize(3..3), 3);
    }

    #[test]
    fn test_weighted_table_rejects_bad_input() {
        assert_eq!(
            WeightedTable::<u8>::new(Vec::new()).unwrap_err(),
            RngError::EmptyTable
        );
        assert_eq!(
            WeightedTable::new(vec![('a', 0), ('b', 0)]).unwrap_err(),
            RngError::ZeroWeight
        );
    }

    #[test]
    fn test_weighted_table_probability() {
        let table = WeightedTable::new(vec![('a', 1), ('b', 3), ('z', 0)]).unwrap();
        assert_eq!(table.total_weight(), 4);
        assert!((table.probability(&'b') - 0.75).abs() < 1e-12);
        assert_eq!(table.probability(&'z'), 0.0);
    }

    #[test]
    fn test_zero_weight_never_drawn() {
        let table = WeightedTable::new(vec![('a', 5), ('z', 0)]).unwrap();
        let mut rng = Randomizer::seeded(99);
        for _ in 0..2000 {
            assert_eq!(*rng.pick(&table), 'a');
        }
    }

    #[test]
    fn test_prize_bands_cumulative_selection() {
        let bands = PrizeBands::new(vec![
            PrizeBand::new(0, 0, 0.70),
            PrizeBand::new(1, 20, 0.20),
            PrizeBand::new(200, 500, 0.10),
        ])
        .unwrap();

        assert_eq!(bands.band_for(0.0).map(|b| b.max), Some(0));
        assert_eq!(bands.band_for(0.70).map(|b| b.max), Some(0));
        assert_eq!(bands.band_for(0.7001).map(|b| b.max), Some(20));
        assert_eq!(bands.band_for(0.95).map(|b| b.min), Some(200));
    }

    #[test]
    fn test_prize_bands_residual_pays_nothing() {
        let bands = PrizeBands::new(vec![PrizeBand::new(10, 10, 0.5)]).unwrap();
        assert!(bands.band_for(0.75).is_none());

        let mut rng = Randomizer::seeded(3);
        for _ in 0..500 {
            let prize = bands.draw(&mut rng);
            assert!(prize == 0 || prize == 10);
        }
    }

    #[test]
    fn test_prize_bands_validation() {
        assert!(matches!(
            PrizeBands::new(vec![PrizeBand::new(0, 0, 0.6), PrizeBand::new(1, 2, 0.6)]),
            Err(RngError::BandsOverflow(_))
        ));
        assert!(matches!(
            PrizeBands::new(vec![PrizeBand::new(5, 1, 0.1)]),
            Err(RngError::InvertedBand { index: 0, .. })
        ));
        let exact = vec![PrizeBand::new(0, 0, 0.3), PrizeBand::new(1, 1, 0.7)];
        assert!(PrizeBands::new(exact).is_ok());
    }
}
