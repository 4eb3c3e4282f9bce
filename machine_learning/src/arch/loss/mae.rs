use ndarray::{Array2, ArrayView2};

use super::LossFn;

/// Mean absolute error loss function.
#[derive(Debug, Default, Clone, Copy)]
pub struct Mae;

impl LossFn for Mae {
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32 {
        (&y_pred - &y).mapv(f32::abs).mean().unwrap_or_default()
    }

    // The kink at zero gets a zero subgradient.
    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Array2<f32> {
        let n = y_pred.len() as f32;
        (&y_pred - &y).mapv(|e| if e == 0. { 0. } else { e.signum() / n })
    }
}
