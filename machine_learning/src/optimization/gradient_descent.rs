use super::{Optimizer, optimizer::check_sizes};
use crate::Result;

/// Gradient descent with (optionally Nesterov) momentum.
#[derive(Debug)]
pub struct GradientDescent {
    learning_rate: f32,
    momentum: f32,
    nesterov: bool,
    velocity: Box<[f32]>,
}

impl GradientDescent {
    /// Creates a new `GradientDescent` optimizer.
    ///
    /// # Arguments
    /// * `len` - The amount of parameters this instance should hold.
    /// * `learning_rate` - The small coefficient that modulates the amount of training per update.
    /// * `momentum` - How much of the previous update is carried over, zero disables it.
    /// * `nesterov` - Whether to look ahead along the velocity before stepping.
    ///
    /// # Returns
    /// A new `GradientDescent` instance.
    pub fn new(len: usize, learning_rate: f32, momentum: f32, nesterov: bool) -> Self {
        Self {
            learning_rate,
            momentum,
            nesterov,
            velocity: vec![0.; len].into_boxed_slice(),
        }
    }
}

impl Optimizer for GradientDescent {
    fn update_params(&mut self, params: &mut [f32], grad: &[f32]) -> Result<()> {
        check_sizes(params, grad, self.velocity.len())?;

        let lr = self.learning_rate;
        let mu = self.momentum;
        let nesterov = self.nesterov;

        params
            .iter_mut()
            .zip(grad)
            .zip(self.velocity.iter_mut())
            .for_each(|((p, g), v)| {
                *v = (mu * *v) + g;
                let step = if nesterov { g + mu * *v } else { *v };
                *p -= lr * step;
            });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_step_follows_the_negative_gradient() {
        let mut sgd = GradientDescent::new(2, 0.5, 0., false);
        let mut params = [1., 1.];

        sgd.update_params(&mut params, &[2., -2.]).unwrap();

        assert_eq!(params, [0., 2.]);
    }

    #[test]
    fn momentum_accumulates_velocity() {
        let mut sgd = GradientDescent::new(1, 1., 0.5, false);
        let mut params = [0.];

        sgd.update_params(&mut params, &[1.]).unwrap();
        assert_eq!(params, [-1.]);

        sgd.update_params(&mut params, &[1.]).unwrap();
        assert_eq!(params, [-2.5]);
    }

    #[test]
    fn mismatched_sizes_fail() {
        let mut sgd = GradientDescent::new(2, 0.1, 0.9, true);
        assert!(sgd.update_params(&mut [0.; 2], &[1.]).is_err());
        assert!(sgd.update_params(&mut [0.; 3], &[1.; 3]).is_err());
    }
}
