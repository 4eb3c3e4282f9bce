use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use super::{Model, layers::Layer};
use crate::{MlErr, Result, optimization::Optimizer};

/// A sequential model: information flows forward when computing an output and backward when
/// computing the *deltas* of its layers.
///
/// All the parameters live in a single flat buffer, every layer borrows its own contiguous
/// segment in order. The gradient buffer mirrors that layout.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "SequentialRecord", into = "SequentialRecord")]
pub struct Sequential {
    layers: Vec<Layer>,
    params: Vec<f32>,
    grad: Vec<f32>,
}

/// The persisted form of a `Sequential`, the gradient is never stored.
#[derive(Serialize, Deserialize)]
struct SequentialRecord {
    layers: Vec<Layer>,
    params: Vec<f32>,
}

impl Sequential {
    /// Creates a new `Sequential` with every parameter set to zero.
    ///
    /// # Arguments
    /// * `layers` - The layers the sequential is composed of.
    ///
    /// # Returns
    /// A new `Sequential` instance.
    pub fn new<I>(layers: I) -> Self
    where
        I: IntoIterator<Item = Layer>,
    {
        let layers: Vec<_> = layers.into_iter().collect();
        let size = layers.iter().map(Layer::size).sum();

        Self {
            layers,
            params: vec![0.; size],
            grad: vec![0.; size],
        }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn params(&self) -> &[f32] {
        &self.params
    }

    pub fn grad(&self) -> &[f32] {
        &self.grad
    }

    /// Gives mutable access to the weights of a dense layer, excluding its biases.
    ///
    /// # Arguments
    /// * `idx` - The position of the layer in the model.
    ///
    /// # Returns
    /// The row-major weights and their shape, or `None` if there's no dense layer at `idx`.
    pub fn weights_mut(&mut self, idx: usize) -> Option<(&mut [f32], (usize, usize))> {
        let Layer::Dense(dense) = self.layers.get(idx)? else {
            return None;
        };

        let offset: usize = self.layers[..idx].iter().map(Layer::size).sum();
        let end = offset + dense.weights_size();
        Some((&mut self.params[offset..end], dense.dim()))
    }
}

impl Model for Sequential {
    fn size(&self) -> usize {
        self.params.len()
    }

    fn forward(&mut self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let mut offset = 0;
        let mut y = x.to_owned();

        for layer in self.layers.iter_mut() {
            let size = layer.size();
            y = layer.forward(&self.params[offset..offset + size], y.view())?;
            offset += size;
        }

        Ok(y)
    }

    fn backward(&mut self, d: ArrayView2<f32>) -> Result<()> {
        let mut end = self.params.len();
        let mut d = d.to_owned();

        for layer in self.layers.iter_mut().rev() {
            let start = end - layer.size();
            let params = &self.params[start..end];
            let grad = &mut self.grad[start..end];

            d = layer.backward(params, grad, d.view())?;
            end = start;
        }

        Ok(())
    }

    fn param_groups(&self) -> Vec<usize> {
        self.layers
            .iter()
            .map(Layer::size)
            .filter(|&size| size > 0)
            .collect()
    }

    fn optimize<O: Optimizer>(&mut self, optimizers: &mut [O]) -> Result<()> {
        let groups = self.param_groups();
        if optimizers.len() != groups.len() {
            return Err(MlErr::OptimizerCountMismatch {
                got: optimizers.len(),
                expected: groups.len(),
            });
        }

        let mut offset = 0;
        for (optimizer, size) in optimizers.iter_mut().zip(groups) {
            let range = offset..offset + size;
            optimizer.update_params(&mut self.params[range.clone()], &self.grad[range])?;
            offset += size;
        }

        self.grad.fill(0.);
        Ok(())
    }
}

impl TryFrom<SequentialRecord> for Sequential {
    type Error = MlErr;

    fn try_from(record: SequentialRecord) -> Result<Self> {
        let SequentialRecord { layers, params } = record;
        let expected: usize = layers.iter().map(Layer::size).sum();

        if params.len() != expected {
            return Err(MlErr::SizeMismatch {
                what: "stored parameters",
                got: params.len(),
                expected,
            });
        }

        let grad = vec![0.; params.len()];
        Ok(Self {
            layers,
            params,
            grad,
        })
    }
}

impl From<Sequential> for SequentialRecord {
    fn from(model: Sequential) -> Self {
        Self {
            layers: model.layers,
            params: model.params,
        }
    }
}
