pub mod bundle;
pub mod config;
pub mod error;
pub mod ingestor;
pub mod registry;
pub mod resolver;
pub mod topology;
pub mod trainer;

pub use bundle::ModelBundle;
pub use config::TrainingConfig;
pub use error::{Result, TrainErr};
pub use trainer::{StepReport, Trainer, TrainerState};
