use super::{Optimizer, optimizer::check_sizes};
use crate::Result;

/// RMSProp: like `AdaGrad` but with an exponentially decaying average of squared gradients.
#[derive(Debug)]
pub struct RmsProp {
    learning_rate: f32,
    decay: f32,
    epsilon: f32,
    s: Box<[f32]>,
}

impl RmsProp {
    /// Creates a new `RmsProp` optimizer.
    ///
    /// # Arguments
    /// * `len` - The amount of parameters this instance should hold.
    /// * `learning_rate` - The small coefficient that modulates the amount of training per update.
    /// * `decay`, `epsilon` - Hyperparameters to the optimization algorithm.
    ///
    /// # Returns
    /// A new `RmsProp` instance.
    pub fn new(len: usize, learning_rate: f32, decay: f32, epsilon: f32) -> Self {
        Self {
            learning_rate,
            decay,
            epsilon,
            s: vec![0.; len].into_boxed_slice(),
        }
    }
}

impl Optimizer for RmsProp {
    fn update_params(&mut self, params: &mut [f32], grad: &[f32]) -> Result<()> {
        check_sizes(params, grad, self.s.len())?;

        let Self {
            learning_rate: lr,
            decay,
            epsilon: eps,
            ..
        } = *self;

        params
            .iter_mut()
            .zip(grad)
            .zip(self.s.iter_mut())
            .for_each(|((p, g), s)| {
                *s = decay * *s + (1. - decay) * g.powi(2);
                *p -= lr * g / (s.sqrt() + eps);
            });

        Ok(())
    }
}
