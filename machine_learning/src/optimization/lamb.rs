use super::{Optimizer, optimizer::check_sizes};
use crate::Result;

/// LAMB: an `Adam` update with decoupled weight decay, scaled per parameter group by the ratio
/// between the norm of the parameters and the norm of the update.
#[derive(Debug)]
pub struct Lamb {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    beta1_t: f32,
    beta2_t: f32,
    epsilon: f32,
    weight_decay: f32,
    v: Box<[f32]>,
    s: Box<[f32]>,
    r: Box<[f32]>,
}

impl Lamb {
    /// Creates a new `Lamb` optimizer.
    ///
    /// # Arguments
    /// * `len` - The amount of parameters this instance should hold.
    /// * `learning_rate` - The small coefficient that modulates the amount of training per update.
    /// * `beta1`, `beta2`, `epsilon` - Hyperparameters to the optimization algorithm.
    /// * `weight_decay` - How much of the parameters is added to the update.
    ///
    /// # Returns
    /// A new `Lamb` instance.
    pub fn new(
        len: usize,
        learning_rate: f32,
        beta1: f32,
        beta2: f32,
        epsilon: f32,
        weight_decay: f32,
    ) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            beta1_t: 1.,
            beta2_t: 1.,
            epsilon,
            weight_decay,
            v: vec![0.; len].into_boxed_slice(),
            s: vec![0.; len].into_boxed_slice(),
            r: vec![0.; len].into_boxed_slice(),
        }
    }
}

fn norm(xs: &[f32]) -> f32 {
    xs.iter().map(|x| x * x).sum::<f32>().sqrt()
}

impl Optimizer for Lamb {
    fn update_params(&mut self, params: &mut [f32], grad: &[f32]) -> Result<()> {
        check_sizes(params, grad, self.v.len())?;

        let Self {
            learning_rate: lr,
            beta1: b1,
            beta2: b2,
            epsilon: eps,
            weight_decay: wd,
            ..
        } = *self;

        self.beta1_t *= b1;
        self.beta2_t *= b2;

        let bc1 = 1. - self.beta1_t;
        let bc2 = 1. - self.beta2_t;

        params
            .iter()
            .zip(grad)
            .zip(self.v.iter_mut())
            .zip(self.s.iter_mut())
            .zip(self.r.iter_mut())
            .for_each(|((((p, g), v), s), r)| {
                *v = b1 * *v + (1. - b1) * g;
                *s = b2 * *s + (1. - b2) * g.powi(2);
                *r = (*v / bc1) / ((*s / bc2).sqrt() + eps) + wd * p;
            });

        let p_norm = norm(params);
        let r_norm = norm(&self.r);
        let trust = if p_norm > 0. && r_norm > 0. {
            p_norm / r_norm
        } else {
            1.
        };

        params
            .iter_mut()
            .zip(self.r.iter())
            .for_each(|(p, r)| *p -= lr * trust * r);

        Ok(())
    }
}
