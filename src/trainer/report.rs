use machine_learning::arch::loss::argmax;
use ndarray::ArrayView2;
use serde::Serialize;

/// The diagnostics emitted on a reporting step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub loss: f32,
    pub accuracy: f32,
}

/// Returns the fraction of rows whose greatest output is at the same position as the greatest
/// expected value.
pub fn accuracy(y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32 {
    let nrows = y_pred.nrows();
    if nrows == 0 {
        return 0.;
    }

    let hits = y_pred
        .outer_iter()
        .zip(y.outer_iter())
        .filter(|(p, e)| argmax(p.view()) == argmax(e.view()))
        .count();

    hits as f32 / nrows as f32
}
