use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::{MlErr, Result, arch::activations::ActFn};

/// A parameterless layer that applies an `ActFn` to every element of its input.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Activation {
    act_fn: ActFn,

    // Forward metadata
    #[serde(skip)]
    z: Array2<f32>,
}

impl Activation {
    pub fn new(act_fn: ActFn) -> Self {
        Self {
            act_fn,
            z: Array2::zeros((0, 0)),
        }
    }

    pub fn act_fn(&self) -> ActFn {
        self.act_fn
    }

    pub fn forward(&mut self, z: ArrayView2<f32>) -> Array2<f32> {
        self.z = z.to_owned();
        z.mapv(|z| self.act_fn.f(z))
    }

    /// Scales the incoming delta by the derivative of the activation evaluated at the inputs
    /// seen on the last forward pass.
    pub fn backward(&mut self, d: ArrayView2<f32>) -> Result<Array2<f32>> {
        if d.dim() != self.z.dim() {
            return Err(MlErr::ShapeMismatch {
                what: "activation delta",
                got: d.dim(),
                expected: self.z.dim(),
            });
        }

        let mut d = d.to_owned();
        d.zip_mut_with(&self.z, |d, &z| *d *= self.act_fn.df(z));
        Ok(d)
    }
}
