use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use super::{Activation, Dense};
use crate::{Result, arch::activations::ActFn};

/// A runnable unit of a `Sequential` model.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Dense(Dense),
    Activation(Activation),
}

impl Layer {
    pub fn dense(dim: (usize, usize)) -> Self {
        Self::Dense(Dense::new(dim))
    }

    pub fn activation(act_fn: ActFn) -> Self {
        Self::Activation(Activation::new(act_fn))
    }

    /// Returns the amount of parameters this layer takes from the model's buffer.
    pub fn size(&self) -> usize {
        match self {
            Self::Dense(l) => l.size(),
            Self::Activation(_) => 0,
        }
    }

    pub fn forward(&mut self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        match self {
            Self::Dense(l) => l.forward(params, x),
            Self::Activation(l) => Ok(l.forward(x)),
        }
    }

    pub fn backward(
        &mut self,
        params: &[f32],
        grad: &mut [f32],
        d: ArrayView2<f32>,
    ) -> Result<Array2<f32>> {
        match self {
            Self::Dense(l) => l.backward(params, grad, d),
            Self::Activation(l) => l.backward(d),
        }
    }
}
