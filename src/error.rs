use std::{
    error::Error,
    fmt::{self, Display},
    io,
    path::PathBuf,
};

use machine_learning::MlErr;

use crate::trainer::TrainerState;

/// The result type used across the trainer.
pub type Result<T> = std::result::Result<T, TrainErr>;

/// The registry a name failed to resolve against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Activation,
    Loss,
    Optimizer,
}

impl Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NameKind::Activation => "activation",
            NameKind::Loss => "loss function",
            NameKind::Optimizer => "optimizer",
        };

        f.write_str(s)
    }
}

/// All errors that can occur while setting up or running a training session.
#[derive(Debug)]
pub enum TrainErr {
    /// The configuration file couldn't be read.
    ConfigRead { path: PathBuf, source: io::Error },
    /// The configuration file isn't valid JSON for the expected schema.
    ConfigParse(serde_json::Error),
    /// The configuration parsed but its values are inconsistent.
    InvalidConfig(String),
    /// Two adjacent layers don't fit together, or the layer list is unusable.
    Topology(String),
    /// A configured name is not in its registry.
    UnknownName { kind: NameKind, name: String },
    /// A dataset row doesn't have the configured amount of fields.
    DataFormat {
        line: u64,
        got: usize,
        expected: usize,
    },
    /// The dataset has fewer rows than a single batch.
    InsufficientData { rows: usize, batch_size: usize },
    /// A referenced field is not a number.
    FieldParse {
        line: u64,
        field: usize,
        value: String,
    },
    /// The model bundle couldn't be written or read back.
    Persistence { path: PathBuf, msg: String },
    /// The dataset couldn't be opened or read.
    Dataset(csv::Error),
    /// `ingest` was called after `close`.
    IngestorClosed,
    /// The trainer was asked to run while not idle.
    InvalidState(TrainerState),
    /// The compute engine rejected an operation.
    Ml(MlErr),
}

impl Display for TrainErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigRead { path, source } => {
                write!(f, "cannot read config '{}': {source}", path.display())
            }
            Self::ConfigParse(e) => write!(f, "invalid config: {e}"),
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::Topology(msg) => write!(f, "invalid topology: {msg}"),
            Self::UnknownName { kind, name } => write!(f, "unknown {kind} '{name}'"),
            Self::DataFormat {
                line,
                got,
                expected,
            } => write!(
                f,
                "dataset line {line} has {got} fields, expected {expected}"
            ),
            Self::InsufficientData { rows, batch_size } => write!(
                f,
                "dataset has {rows} rows, fewer than the batch size {batch_size}"
            ),
            Self::FieldParse { line, field, value } => write!(
                f,
                "dataset line {line}, field {field}: '{value}' is not a number"
            ),
            Self::Persistence { path, msg } => {
                write!(f, "model persistence failed for '{}': {msg}", path.display())
            }
            Self::Dataset(e) => write!(f, "dataset error: {e}"),
            Self::IngestorClosed => write!(f, "the ingestor was already closed"),
            Self::InvalidState(state) => write!(f, "the trainer cannot run while {state}"),
            Self::Ml(e) => write!(f, "engine error: {e}"),
        }
    }
}

impl Error for TrainErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ConfigRead { source, .. } => Some(source),
            Self::ConfigParse(e) => Some(e),
            Self::Dataset(e) => Some(e),
            Self::Ml(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MlErr> for TrainErr {
    fn from(e: MlErr) -> Self {
        Self::Ml(e)
    }
}

impl From<csv::Error> for TrainErr {
    fn from(e: csv::Error) -> Self {
        Self::Dataset(e)
    }
}

impl From<serde_json::Error> for TrainErr {
    fn from(e: serde_json::Error) -> Self {
        Self::ConfigParse(e)
    }
}
