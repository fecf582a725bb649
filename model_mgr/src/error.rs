use std::{error::Error, fmt, io};

/// The model manager module's result type.
pub type Result<T> = std::result::Result<T, ModelMgrErr>;

/// Model manager runtime failures.
#[derive(Debug)]
pub enum ModelMgrErr {
    /// Invalid configuration, caught before any role starts.
    InvalidConfig(String),
    /// `get` was called before the first `put`.
    EmptyStore,
    /// A checkpoint write failed. Fatal to the persistence worker.
    PersistWrite { step: u64, source: io::Error },
    /// The persistence worker is gone while a save was still requested.
    PersistenceDown,
    /// A message addressed to another service reached the model manager.
    UnknownMessage { got: &'static str },
    /// The service replied with a kind the caller did not ask for.
    UnexpectedReply { got: &'static str },
    /// The model manager task is gone.
    ServiceClosed,
    /// An underlying I/O error not covered by the above variants.
    Io(io::Error),
}

impl fmt::Display for ModelMgrErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "invalid model manager config: {msg}"),
            Self::EmptyStore => write!(f, "no model params stored yet"),
            Self::PersistWrite { step, source } => {
                write!(f, "failed to persist checkpoint {step}: {source}")
            }
            Self::PersistenceDown => write!(f, "persistence worker is down"),
            Self::UnknownMessage { got } => {
                write!(f, "model manager received an unknown message kind: {got}")
            }
            Self::UnexpectedReply { got } => {
                write!(f, "model manager sent an unexpected reply kind: {got}")
            }
            Self::ServiceClosed => write!(f, "model manager service is closed"),
            Self::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl Error for ModelMgrErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::PersistWrite { source, .. } => Some(source),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ModelMgrErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Boundary conversion for binaries / I/O APIs.
impl From<ModelMgrErr> for io::Error {
    fn from(value: ModelMgrErr) -> Self {
        match value {
            ModelMgrErr::Io(e) => e,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
