use ndarray::{Array2, ArrayView2};

use crate::{Result, optimization::Optimizer};

/// A trainable model: it maps a batch of inputs to a batch of outputs and learns from the deltas
/// of its outputs.
pub trait Model {
    /// Returns the amount of parameters in the model.
    fn size(&self) -> usize;

    /// Computes the prediction for a batch of inputs, one sample per row.
    ///
    /// # Arguments
    /// * `x` - The input batch.
    ///
    /// # Returns
    /// The output batch or an error if the input doesn't fit the model.
    fn forward(&mut self, x: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// Propagates the delta of the loss with respect to the last output backwards, **adding** the
    /// gradient of every parameter to the model's gradient buffer.
    ///
    /// # Arguments
    /// * `d` - The derivative of the loss with respect to the output of the last forward pass.
    fn backward(&mut self, d: ArrayView2<f32>) -> Result<()>;

    /// Returns the size of every group of parameters that is optimized independently.
    fn param_groups(&self) -> Vec<usize>;

    /// Takes one optimization step with the accumulated gradient and then clears it.
    ///
    /// # Arguments
    /// * `optimizers` - One optimizer per parameter group, in the order of `param_groups`.
    fn optimize<O: Optimizer>(&mut self, optimizers: &mut [O]) -> Result<()>;
}
