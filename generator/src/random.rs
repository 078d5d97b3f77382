//! Seeded random draws
//!
//! Every random value a pumpkin uses comes from one [`RandomizationEngine`].
//! Batches give each pumpkin its own PCG stream derived from the batch seed
//! and the pumpkin index, so a pumpkin's parameters do not depend on how many
//! siblings were built before it or on which thread built them.

use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use crate::error::{PumpkinError, Result};

/// Bounded-distribution draws over a PCG stream
#[derive(Clone, Debug)]
pub struct RandomizationEngine {
    rng: Pcg64,
}

impl RandomizationEngine {
    /// Engine for a single seed
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Pcg64::seed_from_u64(seed),
        }
    }

    /// Engine for pumpkin `index` of a batch seeded with `batch_seed`
    pub fn for_pumpkin(batch_seed: u64, index: u32) -> Self {
        Self {
            rng: Pcg64::new(u128::from(batch_seed), u128::from(index)),
        }
    }

    /// Uniform float in `[min, max)`
    pub fn uniform(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.rng.random::<f32>()
    }

    /// Uniformly chosen element of `items`
    pub fn choice<'a, T>(&mut self, items: &'a [T]) -> Result<&'a T> {
        items
            .choose(&mut self.rng)
            .ok_or_else(|| PumpkinError::out_of_range("choice", "cannot choose from an empty set"))
    }

    /// Fair coin
    pub fn boolean(&mut self) -> bool {
        self.rng.random::<bool>()
    }

    /// Uniformly chosen odd integer in `[lo, hi]`
    pub fn odd_in_range(&mut self, lo: u32, hi: u32) -> Result<u32> {
        let first = lo | 1;
        if first > hi {
            return Err(PumpkinError::out_of_range(
                "odd_in_range",
                format!("no odd value in [{lo}, {hi}]"),
            ));
        }
        let count = (hi - first) / 2 + 1;
        Ok(first + 2 * self.rng.random_range(0..count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = RandomizationEngine::from_seed(7);
        let mut b = RandomizationEngine::from_seed(7);
        for _ in 0..32 {
            assert_eq!(a.uniform(0.0, 1.0).to_bits(), b.uniform(0.0, 1.0).to_bits());
        }
    }

    #[test]
    fn test_pumpkin_streams_differ() {
        let mut a = RandomizationEngine::for_pumpkin(7, 1);
        let mut b = RandomizationEngine::for_pumpkin(7, 2);
        let xs: Vec<f32> = (0..8).map(|_| a.uniform(0.0, 1.0)).collect();
        let ys: Vec<f32> = (0..8).map(|_| b.uniform(0.0, 1.0)).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn test_uniform_bounds() {
        let mut engine = RandomizationEngine::from_seed(1);
        for _ in 0..1000 {
            let x = engine.uniform(-0.1, 0.15);
            assert!((-0.1..=0.15).contains(&x));
        }
    }

    #[test]
    fn test_odd_in_range() {
        let mut engine = RandomizationEngine::from_seed(3);
        let mut seen = [false; 2];
        for _ in 0..200 {
            match engine.odd_in_range(5, 7).unwrap() {
                5 => seen[0] = true,
                7 => seen[1] = true,
                other => panic!("unexpected {other}"),
            }
        }
        assert_eq!(seen, [true, true]);
        assert!(engine.odd_in_range(6, 6).is_err());
        assert_eq!(engine.odd_in_range(4, 5).unwrap(), 5);
    }

    #[test]
    fn test_choice_rejects_empty() {
        let mut engine = RandomizationEngine::from_seed(3);
        let empty: [u8; 0] = [];
        assert!(matches!(
            engine.choice(&empty),
            Err(PumpkinError::ParameterOutOfRange { .. })
        ));
        assert_eq!(*engine.choice(&[42]).unwrap(), 42);
    }
}
