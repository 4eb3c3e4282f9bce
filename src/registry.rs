use std::collections::HashMap;

use machine_learning::arch::activations::ActFn;

use crate::{
    Result, TrainErr,
    error::NameKind,
    resolver::{LossKind, OptimizerKind},
};

/// The slope `LeakyReLU` uses for negative inputs.
pub const LEAKY_RELU_SLOPE: f32 = 0.001;

/// Maps configured names to the closed set of values they stand for.
#[derive(Debug, Clone)]
pub struct Registry<K> {
    kind: NameKind,
    entries: HashMap<String, K>,
}

impl<K: Copy> Registry<K> {
    /// Creates an empty registry.
    ///
    /// # Arguments
    /// * `kind` - What the names stand for, used when reporting unknown names.
    pub fn new(kind: NameKind) -> Self {
        Self {
            kind,
            entries: HashMap::new(),
        }
    }

    /// Adds or replaces an entry.
    pub fn register<S: Into<String>>(&mut self, name: S, value: K) -> &mut Self {
        self.entries.insert(name.into(), value);
        self
    }

    /// Looks up a name, matching exactly.
    ///
    /// # Errors
    /// `UnknownName` if the name was never registered.
    pub fn resolve(&self, name: &str) -> Result<K> {
        self.entries
            .get(name)
            .copied()
            .ok_or_else(|| TrainErr::UnknownName {
                kind: self.kind,
                name: name.to_string(),
            })
    }

    /// Returns the registered names in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// The registries consulted while building a trainer, one per kind of configured name.
#[derive(Debug, Clone)]
pub struct Registries {
    pub activations: Registry<ActFn>,
    pub losses: Registry<LossKind>,
    pub optimizers: Registry<OptimizerKind>,
}

impl Registries {
    /// Creates the registries with every name the trainer understands out of the box.
    pub fn standard() -> Self {
        let mut activations = Registry::new(NameKind::Activation);
        activations
            .register("Identity", ActFn::Identity)
            .register("ReLU", ActFn::Relu)
            .register("LeakyReLU", ActFn::leaky_relu(LEAKY_RELU_SLOPE))
            .register("ELU", ActFn::elu(1.))
            .register("SELU", ActFn::Selu)
            .register("Sigmoid", ActFn::Sigmoid)
            .register("HardSigmoid", ActFn::HardSigmoid)
            .register("Tanh", ActFn::Tanh)
            .register("HardTanh", ActFn::HardTanh)
            .register("Softsign", ActFn::Softsign)
            .register("SoftPlus", ActFn::Softplus)
            .register("SiLU", ActFn::Silu)
            .register("Swish", ActFn::Silu);

        let mut losses = Registry::new(NameKind::Loss);
        losses
            .register("MSE", LossKind::Mse)
            .register("MAE", LossKind::Mae)
            .register("CrossEntropy", LossKind::CrossEntropy);

        let mut optimizers = Registry::new(NameKind::Optimizer);
        optimizers
            .register("SGD", OptimizerKind::Sgd)
            .register("AdaGrad", OptimizerKind::AdaGrad)
            .register("Adam", OptimizerKind::Adam)
            .register("RAdam", OptimizerKind::RAdam)
            .register("RMSProp", OptimizerKind::RmsProp)
            .register("Lamb", OptimizerKind::Lamb);

        Self {
            activations,
            losses,
            optimizers,
        }
    }
}

impl Default for Registries {
    fn default() -> Self {
        Self::standard()
    }
}
