use std::fmt::{self, Display};

/// The lifecycle of a `Trainer`, it only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerState {
    Idle,
    Running,
    Completed,
}

impl Display for TrainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrainerState::Idle => "idle",
            TrainerState::Running => "running",
            TrainerState::Completed => "completed",
        };

        f.write_str(s)
    }
}
