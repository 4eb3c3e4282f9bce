use ndarray::Array2;

/// A set of samples, one per row. `inputs` and `expected` always have the same amount of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub inputs: Array2<f32>,
    pub expected: Array2<f32>,
}

impl Batch {
    /// Returns the amount of samples in the batch.
    pub fn len(&self) -> usize {
        self.inputs.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
