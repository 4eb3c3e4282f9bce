use machine_learning::{
    arch::loss::{CrossEntropy, LossFn, Mae, Mse},
    optimization::{AdaGrad, Adam, GradientDescent, Lamb, Optimizer, RAdam, RmsProp},
};

/// The loss functions a training session can minimize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossKind {
    Mse,
    Mae,
    CrossEntropy,
}

/// The optimization algorithms a training session can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizerKind {
    Sgd,
    AdaGrad,
    Adam,
    RAdam,
    RmsProp,
    Lamb,
}

const BETA1: f32 = 0.9;
const BETA2: f32 = 0.999;
const EPSILON: f32 = 1e-8;

impl LossKind {
    /// Creates the loss function for this kind.
    pub fn build(self) -> Box<dyn LossFn> {
        match self {
            LossKind::Mse => Box::new(Mse),
            LossKind::Mae => Box::new(Mae),
            LossKind::CrossEntropy => Box::new(CrossEntropy),
        }
    }
}

impl OptimizerKind {
    /// Returns the learning rate used when the configuration doesn't set one.
    pub fn default_learning_rate(self) -> f32 {
        match self {
            OptimizerKind::AdaGrad => 0.01,
            _ => 0.001,
        }
    }

    /// Creates one optimizer for a group of parameters.
    ///
    /// # Arguments
    /// * `len` - The size of the parameter group.
    /// * `learning_rate` - Overrides the default learning rate of the algorithm.
    ///
    /// # Returns
    /// A new optimizer with this kind's default hyperparameters.
    pub fn build(self, len: usize, learning_rate: Option<f32>) -> Box<dyn Optimizer> {
        let lr = learning_rate.unwrap_or_else(|| self.default_learning_rate());

        match self {
            OptimizerKind::Sgd => Box::new(GradientDescent::new(len, lr, 0.9, true)),
            OptimizerKind::AdaGrad => Box::new(AdaGrad::new(len, lr, EPSILON)),
            OptimizerKind::Adam => Box::new(Adam::new(len, lr, BETA1, BETA2, EPSILON)),
            OptimizerKind::RAdam => Box::new(RAdam::new(len, lr, BETA1, BETA2, EPSILON)),
            OptimizerKind::RmsProp => Box::new(RmsProp::new(len, lr, 0.95, EPSILON)),
            OptimizerKind::Lamb => Box::new(Lamb::new(len, lr, BETA1, BETA2, EPSILON, 0.01)),
        }
    }

    /// Creates one optimizer per parameter group, so every group keeps its own state.
    ///
    /// # Arguments
    /// * `groups` - The sizes of the model's parameter groups, in order.
    /// * `learning_rate` - Overrides the default learning rate of the algorithm.
    pub fn build_all(self, groups: &[usize], learning_rate: Option<f32>) -> Vec<Box<dyn Optimizer>> {
        groups
            .iter()
            .map(|&len| self.build(len, learning_rate))
            .collect()
    }
}
