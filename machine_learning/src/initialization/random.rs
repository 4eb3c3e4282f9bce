use rand::Rng;
use rand_distr::{Distribution, Normal};

use super::WeightGen;
use crate::{MlErr, Result};

/// A weight generator that follows a certain probabilistic distribution.
pub struct RandWeightGen<R: Rng, D: Distribution<f32>> {
    rng: R,
    distribution: D,
    remaining: usize,
}

impl<R: Rng, D: Distribution<f32>> RandWeightGen<R, D> {
    /// Creates a new `RandWeightGen` weight generator.
    ///
    /// # Arguments
    /// * `rng` - A random number generator.
    /// * `distribution` - The distribution to sample the random numbers from.
    /// * `limit` - The maximum amount of numbers to generate.
    pub fn new(rng: R, distribution: D, limit: usize) -> Self {
        Self {
            rng,
            distribution,
            remaining: limit,
        }
    }
}

impl<R: Rng> RandWeightGen<R, Normal<f32>> {
    /// Creates a new `RandWeightGen` weight generator with a normal distribution.
    ///
    /// # Arguments
    /// * `rng` - A random number generator.
    /// * `limit` - The maximum amount of numbers to generate.
    /// * `mean` - The mean of the distribution.
    /// * `std_dev` - The standard deviation of the distribution.
    ///
    /// # Returns
    /// An error if `std_dev` is not finite (Nan or infinite).
    pub fn normal(rng: R, limit: usize, mean: f32, std_dev: f32) -> Result<Self> {
        let distribution = Normal::new(mean, std_dev)
            .map_err(|e| MlErr::InvalidInitialization(e.to_string()))?;

        Ok(Self::new(rng, distribution, limit))
    }

    /// Creates a new `RandWeightGen` weight generator using Xavier normal initialization.
    ///
    /// # Arguments
    /// * `rng` - A random number generator.
    /// * `fan_in` - The number of input units in the weight tensor.
    /// * `fan_out` - The number of output units in the weight tensor.
    /// * `gain` - Scales the standard deviation to suit the activation that follows.
    ///
    /// # Returns
    /// A generator of exactly `fan_in * fan_out` numbers or an error if the calculated standard
    /// deviation is not finite.
    pub fn xavier(rng: R, fan_in: usize, fan_out: usize, gain: f32) -> Result<Self> {
        let std_dev = gain * (2. / (fan_in + fan_out) as f32).sqrt();
        Self::normal(rng, fan_in * fan_out, 0., std_dev)
    }
}

impl<R: Rng, D: Distribution<f32>> WeightGen for RandWeightGen<R, D> {
    fn sample(&mut self, mut n: usize) -> Option<Vec<f32>> {
        if self.remaining == 0 {
            return None;
        }

        n = n.min(self.remaining);
        self.remaining -= n;

        let sample = (0..n)
            .map(|_| self.distribution.sample(&mut self.rng))
            .collect();

        Some(sample)
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn seeded_rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn partial() {
        let mut weight_gen = RandWeightGen::normal(seeded_rng(), 10, 0., 1.).unwrap();

        let sample = weight_gen.sample(7).unwrap();
        assert_eq!(sample.len(), 7);

        let sample = weight_gen.sample(7).unwrap();
        assert_eq!(sample.len(), 3);

        assert!(weight_gen.sample(1).is_none());
    }

    #[test]
    fn same_seed_same_weights() {
        let mut a = RandWeightGen::xavier(seeded_rng(), 4, 8, 5. / 3.).unwrap();
        let mut b = RandWeightGen::xavier(seeded_rng(), 4, 8, 5. / 3.).unwrap();

        assert_eq!(a.sample(32), b.sample(32));
    }

    #[test]
    fn xavier_spread_follows_the_gain() {
        let (fan_in, fan_out) = (200, 300);
        let gain = 2.;
        let mut weight_gen = RandWeightGen::xavier(seeded_rng(), fan_in, fan_out, gain).unwrap();

        let sample = weight_gen.sample(fan_in * fan_out).unwrap();
        let n = sample.len() as f32;
        let mean = sample.iter().sum::<f32>() / n;
        let var = sample.iter().map(|x| (x - mean).powi(2)).sum::<f32>() / n;

        let expected = gain * (2. / (fan_in + fan_out) as f32).sqrt();
        assert!(mean.abs() < 0.01);
        assert!((var.sqrt() - expected).abs() < 0.01 * expected * 10.);
    }

    #[test]
    fn fill_overwrites_in_place() {
        let mut weight_gen = RandWeightGen::normal(seeded_rng(), 3, 0., 1.).unwrap();
        let mut params = [0.; 5];

        assert_eq!(weight_gen.fill(&mut params), 3);
        assert!(params[..3].iter().all(|&p| p != 0.));
        assert_eq!(params[3..], [0., 0.]);
    }

    #[test]
    fn non_finite_std_dev_fails() {
        assert!(RandWeightGen::normal(seeded_rng(), 1, 0., f32::NAN).is_err());
    }
}
