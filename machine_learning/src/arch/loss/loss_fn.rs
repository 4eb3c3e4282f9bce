use ndarray::{Array2, ArrayView1, ArrayView2};

/// Measures how far a batch of predictions is from the expected values, one sample per row.
pub trait LossFn {
    /// Returns the mean loss over the batch.
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32;

    /// Returns the derivative of `loss` with respect to every element of `y_pred`.
    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Array2<f32>;
}

impl<T: LossFn + ?Sized> LossFn for Box<T> {
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32 {
        (**self).loss(y_pred, y)
    }

    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Array2<f32> {
        (**self).loss_prime(y_pred, y)
    }
}

/// Returns the position of the greatest element of `row`, the first one on ties.
///
/// # Arguments
/// * `row` - A non empty vector, an empty one yields 0.
pub fn argmax(row: ArrayView1<f32>) -> usize {
    row.iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(best, max), (i, &x)| {
            if x > max { (i, x) } else { (best, max) }
        })
        .0
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn argmax_picks_first_maximum() {
        assert_eq!(argmax(array![0.1, 0.7, 0.2].view()), 1);
        assert_eq!(argmax(array![3., -1., 3.].view()), 0);
        assert_eq!(argmax(array![-5.].view()), 0);
    }
}
