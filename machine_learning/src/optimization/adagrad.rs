use super::{Optimizer, optimizer::check_sizes};
use crate::Result;

/// AdaGrad: every parameter's step is scaled down by the root of its summed squared gradients.
#[derive(Debug)]
pub struct AdaGrad {
    learning_rate: f32,
    epsilon: f32,
    s: Box<[f32]>,
}

impl AdaGrad {
    /// Creates a new `AdaGrad` optimizer.
    ///
    /// # Arguments
    /// * `len` - The amount of parameters this instance should hold.
    /// * `learning_rate` - The small coefficient that modulates the amount of training per update.
    /// * `epsilon` - Keeps the denominator away from zero.
    ///
    /// # Returns
    /// A new `AdaGrad` instance.
    pub fn new(len: usize, learning_rate: f32, epsilon: f32) -> Self {
        Self {
            learning_rate,
            epsilon,
            s: vec![0.; len].into_boxed_slice(),
        }
    }
}

impl Optimizer for AdaGrad {
    fn update_params(&mut self, params: &mut [f32], grad: &[f32]) -> Result<()> {
        check_sizes(params, grad, self.s.len())?;

        let lr = self.learning_rate;
        let eps = self.epsilon;

        params
            .iter_mut()
            .zip(grad)
            .zip(self.s.iter_mut())
            .for_each(|((p, g), s)| {
                *s += g.powi(2);
                *p -= lr * g / (s.sqrt() + eps);
            });

        Ok(())
    }
}
