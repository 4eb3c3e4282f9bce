use std::{
    error::Error,
    fmt::{self, Display},
};

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The machine learning module's error type.
#[derive(Debug, PartialEq)]
pub enum MlErr {
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    ShapeMismatch {
        what: &'static str,
        got: (usize, usize),
        expected: (usize, usize),
    },
    OptimizerCountMismatch {
        got: usize,
        expected: usize,
    },
    InvalidInitialization(String),
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MlErr::SizeMismatch {
                what,
                got,
                expected,
            } => {
                format!("There's a size mismatch in {what}, got {got} and expected {expected}")
            }
            MlErr::ShapeMismatch {
                what,
                got,
                expected,
            } => format!(
                "There's a shape mismatch in {what}, got {got:?} and expected {expected:?}"
            ),
            MlErr::OptimizerCountMismatch { got, expected } => format!(
                "The model has {expected} parameterized layers but {got} optimizers were given"
            ),
            MlErr::InvalidInitialization(msg) => {
                format!("Failed to initialize the parameters: {msg}")
            }
        };

        write!(f, "{s}")
    }
}

impl Error for MlErr {}
