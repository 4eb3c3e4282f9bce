use ndarray::{Array2, ArrayView2, Axis};

use super::{LossFn, argmax};

/// Categorical cross entropy over raw scores.
///
/// Each row of the prediction goes through a softmax, each row of the expected values is reduced
/// to a class index by its arg-max and the loss is the mean negative log-likelihood of those
/// classes.
#[derive(Debug, Default, Clone, Copy)]
pub struct CrossEntropy;

impl CrossEntropy {
    fn softmax(y_pred: ArrayView2<f32>) -> Array2<f32> {
        let mut p = y_pred.to_owned();

        for mut row in p.axis_iter_mut(Axis(0)) {
            let max = row.fold(f32::NEG_INFINITY, |m, &x| m.max(x));
            row.mapv_inplace(|x| (x - max).exp());
            let sum = row.sum();
            row.mapv_inplace(|x| x / sum);
        }

        p
    }

    fn classes(y: ArrayView2<f32>) -> Vec<usize> {
        y.outer_iter().map(argmax).collect()
    }
}

impl LossFn for CrossEntropy {
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32 {
        let nrows = y_pred.nrows();
        if nrows == 0 {
            return 0.;
        }

        let p = Self::softmax(y_pred);
        let nll: f32 = Self::classes(y)
            .into_iter()
            .zip(p.outer_iter())
            .map(|(class, row)| -row[class].max(f32::MIN_POSITIVE).ln())
            .sum();

        nll / nrows as f32
    }

    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Array2<f32> {
        let nrows = y_pred.nrows().max(1) as f32;
        let mut d = Self::softmax(y_pred);

        for (class, mut row) in Self::classes(y).into_iter().zip(d.outer_iter_mut()) {
            row[class] -= 1.;
        }

        d / nrows
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn uniform_scores_cost_log_of_class_count() {
        let y_pred = array![[0., 0., 0.], [5., 5., 5.]];
        let y = array![[0., 1., 0.], [0., 0., 1.]];

        let loss = CrossEntropy.loss(y_pred.view(), y.view());
        assert!((loss - 3f32.ln()).abs() < 1e-6);
    }

    #[test]
    fn expected_values_need_not_be_one_hot() {
        let y_pred = array![[2., 1.]];
        let one_hot = array![[1., 0.]];
        let scores = array![[0.9, 0.3]];

        assert_eq!(
            CrossEntropy.loss(y_pred.view(), one_hot.view()),
            CrossEntropy.loss(y_pred.view(), scores.view())
        );
    }

    #[test]
    fn gradient_is_softmax_minus_target() {
        let y_pred = array![[0., 0.], [0., 0.]];
        let y = array![[1., 0.], [0., 1.]];

        let d = CrossEntropy.loss_prime(y_pred.view(), y.view());
        assert_eq!(d, array![[-0.25, 0.25], [0.25, -0.25]]);
    }

    #[test]
    fn large_scores_stay_finite() {
        let y_pred = array![[1000., -1000.]];
        let y = array![[0., 1.]];

        let loss = CrossEntropy.loss(y_pred.view(), y.view());
        assert!(loss.is_finite());
        assert!(loss > 80.);
    }
}
