pub mod checkpoint;
mod config;
mod error;
mod persist;
mod service;
mod store;

pub use config::ModelMgrConfig;
pub use error::{ModelMgrErr, Result};
pub use persist::{PersistRequest, PersistenceWorker};
pub use service::{ModelMgr, ModelMgrHandle};
pub use store::VersionStore;
