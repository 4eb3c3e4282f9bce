use super::{Optimizer, optimizer::check_sizes};
use crate::Result;

/// Rectified Adam.
///
/// While the variance of the adaptive learning rate is intractable (the first few steps) it falls
/// back to bias corrected momentum, afterwards it behaves like `Adam` scaled by a rectification
/// term.
#[derive(Debug)]
pub struct RAdam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    beta1_t: f32,
    beta2_t: f32,
    t: u32,
    v: Box<[f32]>,
    s: Box<[f32]>,
    epsilon: f32,
}

impl RAdam {
    /// Creates a new `RAdam` optimizer.
    ///
    /// # Arguments
    /// * `len` - The amount of parameters this instance should hold.
    /// * `learning_rate` - The small coefficient that modulates the amount of training per update.
    /// * `beta1`, `beta2`, `epsilon` - Hyperparameters to the optimization algorithm.
    ///
    /// # Returns
    /// A new `RAdam` instance.
    pub fn new(len: usize, learning_rate: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            beta1_t: 1.,
            beta2_t: 1.,
            t: 0,
            v: vec![0.; len].into_boxed_slice(),
            s: vec![0.; len].into_boxed_slice(),
            epsilon,
        }
    }

    /// Returns the rectification term for the current step, if the variance is tractable.
    fn rectification(&self) -> Option<f32> {
        let rho_inf = 2. / (1. - self.beta2) - 1.;
        let t = self.t as f32;
        let rho_t = rho_inf - 2. * t * self.beta2_t / (1. - self.beta2_t);

        if rho_t <= 4. {
            return None;
        }

        let r = ((rho_t - 4.) * (rho_t - 2.) * rho_inf) / ((rho_inf - 4.) * (rho_inf - 2.) * rho_t);
        Some(r.sqrt())
    }
}

impl Optimizer for RAdam {
    fn update_params(&mut self, params: &mut [f32], grad: &[f32]) -> Result<()> {
        check_sizes(params, grad, self.v.len())?;

        let Self {
            learning_rate: lr,
            beta1: b1,
            beta2: b2,
            epsilon: eps,
            ..
        } = *self;

        self.t += 1;
        self.beta1_t *= b1;
        self.beta2_t *= b2;

        let bc1 = 1. - self.beta1_t;
        let bc2 = 1. - self.beta2_t;
        let rect = self.rectification();

        params
            .iter_mut()
            .zip(grad)
            .zip(self.v.iter_mut())
            .zip(self.s.iter_mut())
            .for_each(|(((p, g), v), s)| {
                *v = b1 * *v + (1. - b1) * g;
                *s = b2 * *s + (1. - b2) * g.powi(2);

                let v_hat = *v / bc1;
                match rect {
                    Some(r) => {
                        let s_hat = (*s / bc2).sqrt();
                        *p -= lr * r * v_hat / (s_hat + eps);
                    }
                    None => *p -= lr * v_hat,
                }
            });

        Ok(())
    }
}
