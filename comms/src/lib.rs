pub mod msg;
pub mod specs;
pub mod tracker;

pub use msg::{Msg, ParamsBlob, Reply};
pub use tracker::{Tracker, TrackerConfig, TrackerErr, TrackerHandle};
