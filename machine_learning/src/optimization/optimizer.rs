use crate::{MlErr, Result};

/// Defines the strategy for updating model parameters based on calculated gradients.
pub trait Optimizer {
    /// Updates the parameters according to the algorithm's learning rule.
    ///
    /// # Arguments
    /// * `params` - The parameters that are going to be modified.
    /// * `grad` - The accumulated gradient used for taking the step.
    ///
    /// # Returns
    /// An error if there's a mismatch in the sizes of `params` and `grad`.
    fn update_params(&mut self, params: &mut [f32], grad: &[f32]) -> Result<()>;
}

impl<T: Optimizer + ?Sized> Optimizer for Box<T> {
    fn update_params(&mut self, params: &mut [f32], grad: &[f32]) -> Result<()> {
        (**self).update_params(params, grad)
    }
}

/// Checks that the optimizer was handed a gradient for every parameter and that its inner state
/// was sized for them too.
pub(super) fn check_sizes(params: &[f32], grad: &[f32], state: usize) -> Result<()> {
    if grad.len() != params.len() {
        return Err(MlErr::SizeMismatch {
            what: "optimizer gradient",
            got: grad.len(),
            expected: params.len(),
        });
    }

    if state != params.len() {
        return Err(MlErr::SizeMismatch {
            what: "optimizer state",
            got: params.len(),
            expected: state,
        });
    }

    Ok(())
}
