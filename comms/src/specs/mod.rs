//! Contracts for the collaborators the orchestration core drives but
//! does not implement: the function approximator, the environment
//! simulator, the experience buffer and the summary recorder.

mod collector;
mod env;
mod policy;
mod recorder;

pub use collector::{Collector, Experience};
pub use env::{Env, Info, Transition};
pub use policy::{ActionMode, CorruptParams, Policy, PolicySummary};
pub use recorder::{EvalSummary, Recorder, Summary};
