use std::{error::Error, fmt, io};

use comms::TrackerErr;
use model_mgr::ModelMgrErr;

/// The orchestrator module's result type.
pub type Result<T> = std::result::Result<T, TrainerErr>;

/// Failures that end a training run.
///
/// Transient conditions (full queue, no new checkpoint) never surface
/// here; anything that does triggers coordinated shutdown rather than
/// automatic recovery.
#[derive(Debug)]
pub enum TrainerErr {
    Tracker(TrackerErr),
    ModelMgr(ModelMgrErr),
    Io(io::Error),
}

impl fmt::Display for TrainerErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tracker(e) => write!(f, "tracker error: {e}"),
            Self::ModelMgr(e) => write!(f, "model manager error: {e}"),
            Self::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl Error for TrainerErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Tracker(e) => Some(e),
            Self::ModelMgr(e) => Some(e),
            Self::Io(e) => Some(e),
        }
    }
}

impl From<TrackerErr> for TrainerErr {
    fn from(value: TrackerErr) -> Self {
        Self::Tracker(value)
    }
}

impl From<ModelMgrErr> for TrainerErr {
    fn from(value: ModelMgrErr) -> Self {
        Self::ModelMgr(value)
    }
}

impl From<io::Error> for TrainerErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}
