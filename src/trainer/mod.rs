mod report;
mod state;

use std::path::Path;

use log::{debug, info};
use machine_learning::{
    MlErr,
    arch::{Model, Sequential, loss::LossFn},
    optimization::Optimizer,
};
use serde::Serialize;

pub use report::{StepReport, accuracy};
pub use state::TrainerState;

use crate::{
    Result, TrainErr,
    bundle::ModelBundle,
    config::TrainingConfig,
    ingestor::{self, Ingestor},
    registry::Registries,
    topology::NetBuilder,
};

/// Runs the training loop: every step ingests a batch, computes the loss and its gradient and
/// takes one optimization step. The model is persisted once all steps are done.
pub struct Trainer<I, M> {
    bundle: ModelBundle<M>,
    ingestor: I,
    loss_fn: Box<dyn LossFn>,
    optimizers: Vec<Box<dyn Optimizer>>,
    state: TrainerState,
}

impl Trainer<Box<dyn Ingestor>, Sequential> {
    /// Loads the configuration file and builds a trainer from it with the standard registries.
    pub fn from_config_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = TrainingConfig::load(path)?;
        Self::from_config(config)
    }

    /// Builds a trainer from a configuration with the standard registries.
    pub fn from_config(config: TrainingConfig) -> Result<Self> {
        Self::from_config_with(config, &Registries::standard())
    }

    /// Builds a trainer from a configuration.
    ///
    /// # Arguments
    /// * `config` - The training configuration, it's validated first.
    /// * `registries` - Where activation, loss and optimizer names are looked up.
    ///
    /// # Returns
    /// An idle trainer, or the first configuration, topology or dataset error found.
    pub fn from_config_with(config: TrainingConfig, registries: &Registries) -> Result<Self> {
        config.validate()?;

        let model = NetBuilder::new(&registries.activations).build(&config.layers)?;
        let loss_fn = registries.losses.resolve(&config.loss_function)?.build();
        let optimizers = registries
            .optimizers
            .resolve(&config.optimizer)?
            .build_all(&model.param_groups(), config.learning_rate);
        let ingestor = ingestor::open(&config.ingestor)?;

        debug!(
            "built a model of {} parameters, optimized with {}",
            model.size(),
            config.optimizer
        );
        Ok(Self::new(config, model, ingestor, loss_fn, optimizers))
    }
}

impl<I: Ingestor, M: Model + Serialize> Trainer<I, M> {
    /// Creates a new idle `Trainer` out of already resolved parts.
    ///
    /// # Arguments
    /// * `config` - The configuration, persisted alongside the model.
    /// * `model` - The model to train.
    /// * `ingestor` - The source of batches.
    /// * `loss_fn` - The function being minimized.
    /// * `optimizers` - One optimizer per parameter group of `model`.
    pub fn new(
        config: TrainingConfig,
        model: M,
        ingestor: I,
        loss_fn: Box<dyn LossFn>,
        optimizers: Vec<Box<dyn Optimizer>>,
    ) -> Self {
        Self {
            bundle: ModelBundle::new(config, model),
            ingestor,
            loss_fn,
            optimizers,
            state: TrainerState::Idle,
        }
    }

    pub fn state(&self) -> TrainerState {
        self.state
    }

    pub fn bundle(&self) -> &ModelBundle<M> {
        &self.bundle
    }

    pub fn into_bundle(self) -> ModelBundle<M> {
        self.bundle
    }

    /// Trains for the configured amount of steps and saves the model.
    ///
    /// # Returns
    /// The reports of every reporting step, or the first error found. A trainer can only run
    /// once.
    pub fn run(&mut self) -> Result<Vec<StepReport>> {
        if self.state != TrainerState::Idle {
            return Err(TrainErr::InvalidState(self.state));
        }

        self.state = TrainerState::Running;
        let step_count = self.bundle.config.step_count;
        info!("training for {step_count} steps");

        let reports = self.train(step_count);
        self.ingestor.close();
        let reports = reports?;

        self.bundle.save(&self.bundle.config.model_path)?;
        self.state = TrainerState::Completed;
        info!("training completed");

        Ok(reports)
    }

    fn train(&mut self, step_count: usize) -> Result<Vec<StepReport>> {
        let reporting_mod = self.bundle.config.step_reporting_mod;
        let mut reports = Vec::new();

        for step in 0..step_count {
            if let Some(report) = self.step(step, reporting_mod)? {
                reports.push(report);
            }
        }

        Ok(reports)
    }

    fn step(&mut self, step: usize, reporting_mod: usize) -> Result<Option<StepReport>> {
        let batch = self.ingestor.ingest()?;
        let model = &mut self.bundle.model;

        let y_pred = model.forward(batch.inputs.view())?;
        if y_pred.dim() != batch.expected.dim() {
            return Err(MlErr::ShapeMismatch {
                what: "model output",
                got: y_pred.dim(),
                expected: batch.expected.dim(),
            }
            .into());
        }

        let loss = self.loss_fn.loss(y_pred.view(), batch.expected.view());
        let d = self.loss_fn.loss_prime(y_pred.view(), batch.expected.view());
        model.backward(d.view())?;

        let report = (reporting_mod != 0 && step % reporting_mod == 0).then(|| {
            let accuracy = accuracy(y_pred.view(), batch.expected.view());
            info!("step {step}: loss = {loss:.16}, accuracy = {accuracy:.16}");
            StepReport {
                step,
                loss,
                accuracy,
            }
        });

        model.optimize(&mut self.optimizers)?;
        Ok(report)
    }
}
