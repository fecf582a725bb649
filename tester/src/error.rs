use std::{error::Error, fmt, io};

/// The online tester module's result type.
pub type Result<T> = std::result::Result<T, TesterErr>;

/// Online tester runtime failures.
///
/// Everything here is local to one poll tick: the evaluation loop logs
/// and keeps polling, it never crashes on a bad checkpoint.
#[derive(Debug)]
pub enum TesterErr {
    /// Listing the checkpoint directory failed.
    ListDir(io::Error),
    /// Reading a discovered checkpoint failed.
    LoadCheckpoint { step: u64, source: io::Error },
    /// Republishing the best checkpoint failed.
    SaveBest { step: u64, source: io::Error },
}

impl fmt::Display for TesterErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ListDir(e) => write!(f, "failed to list checkpoint dir: {e}"),
            Self::LoadCheckpoint { step, source } => {
                write!(f, "failed to load checkpoint {step}: {source}")
            }
            Self::SaveBest { step, source } => {
                write!(f, "failed to save best checkpoint (step {step}): {source}")
            }
        }
    }
}

impl Error for TesterErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ListDir(e) => Some(e),
            Self::LoadCheckpoint { source, .. } => Some(source),
            Self::SaveBest { source, .. } => Some(source),
        }
    }
}
