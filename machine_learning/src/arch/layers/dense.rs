use ndarray::{linalg, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{MlErr, Result};

/// A fully connected linear transform, `z = x · W + b`.
///
/// The parameters are not owned by the layer, they are borrowed from the model's flat parameter
/// buffer on each pass. The layout is the row-major weight matrix of shape `dim` followed by the
/// `dim.1` biases.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Dense {
    dim: (usize, usize),

    // Forward metadata
    #[serde(skip)]
    x: Array2<f32>,
}

impl Dense {
    /// Creates a new `Dense` layer.
    ///
    /// # Arguments
    /// * `dim` - The amount of inputs and outputs of the layer.
    ///
    /// # Returns
    /// A new `Dense` instance.
    pub fn new(dim: (usize, usize)) -> Self {
        Self {
            dim,
            x: Array2::zeros((0, dim.0)),
        }
    }

    /// Returns the amount of inputs and outputs of this layer.
    pub fn dim(&self) -> (usize, usize) {
        self.dim
    }

    /// Returns the size of this layer.
    ///
    /// # Returns
    /// The amount of parameters this layer has.
    pub fn size(&self) -> usize {
        (self.dim.0 + 1) * self.dim.1
    }

    /// Returns the amount of parameters that are weights, the rest are biases.
    pub fn weights_size(&self) -> usize {
        self.dim.0 * self.dim.1
    }

    /// Computes the output of the layer for a batch of inputs, one per row.
    ///
    /// # Arguments
    /// * `params` - This layer's slice of parameters.
    /// * `x` - The input batch.
    ///
    /// # Returns
    /// The output batch or an error if the input doesn't have `dim.0` columns.
    pub fn forward(&mut self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        if x.ncols() != self.dim.0 {
            return Err(MlErr::SizeMismatch {
                what: "dense layer inputs",
                got: x.ncols(),
                expected: self.dim.0,
            });
        }

        let (w, b) = self.view_params(params)?;
        let z = x.dot(&w) + &b;

        self.x = x.to_owned();
        Ok(z)
    }

    /// Accumulates this layer's gradient and propagates the delta to the previous layer.
    ///
    /// # Arguments
    /// * `params` - This layer's slice of parameters.
    /// * `grad` - This layer's slice of the gradient, it is added to, never overwritten.
    /// * `d` - The delta of the loss with respect to this layer's output.
    ///
    /// # Returns
    /// The delta of the loss with respect to this layer's input.
    pub fn backward(
        &mut self,
        params: &[f32],
        grad: &mut [f32],
        d: ArrayView2<f32>,
    ) -> Result<Array2<f32>> {
        let expected = (self.x.nrows(), self.dim.1);
        if d.dim() != expected {
            return Err(MlErr::ShapeMismatch {
                what: "dense layer delta",
                got: d.dim(),
                expected,
            });
        }

        let (mut dw, mut db) = self.view_grad(grad)?;
        linalg::general_mat_mul(1.0, &self.x.t(), &d, 1.0, &mut dw);
        db += &d.sum_axis(Axis(0));

        let (w, _) = self.view_params(params)?;
        Ok(d.dot(&w.t()))
    }

    /// Gives a view of the raw gradient slice as the delta weights and delta biases of this layer.
    ///
    /// # Arguments
    /// * `grad` - A gradient slice.
    ///
    /// # Returns
    /// A tuple containing the delta weights and delta biases.
    fn view_grad<'a>(
        &self,
        grad: &'a mut [f32],
    ) -> Result<(ArrayViewMut2<'a, f32>, ArrayViewMut1<'a, f32>)> {
        self.check_len("dense layer gradient", grad.len())?;

        let (dw_raw, db_raw) = grad.split_at_mut(self.weights_size());
        let dw = ArrayViewMut2::from_shape(self.dim, dw_raw).map_err(|_| self.weights_err())?;
        let db = ArrayViewMut1::from(db_raw);
        Ok((dw, db))
    }

    /// Gives a view of the raw parameter slice as the weights and biases of this layer.
    ///
    /// # Arguments
    /// * `params` - A slice of parameters.
    ///
    /// # Returns
    /// A tuple containing the weights and biases.
    fn view_params<'a>(
        &self,
        params: &'a [f32],
    ) -> Result<(ArrayView2<'a, f32>, ArrayView1<'a, f32>)> {
        self.check_len("dense layer parameters", params.len())?;

        let (w_raw, b_raw) = params.split_at(self.weights_size());
        let weights = ArrayView2::from_shape(self.dim, w_raw).map_err(|_| self.weights_err())?;
        let biases = ArrayView1::from(b_raw);
        Ok((weights, biases))
    }

    fn check_len(&self, what: &'static str, got: usize) -> Result<()> {
        if got != self.size() {
            return Err(MlErr::SizeMismatch {
                what,
                got,
                expected: self.size(),
            });
        }

        Ok(())
    }

    fn weights_err(&self) -> MlErr {
        MlErr::ShapeMismatch {
            what: "dense layer weights",
            got: (self.weights_size(), 1),
            expected: self.dim,
        }
    }
}
