use std::{error::Error, fmt};

use serde::Serialize;

use crate::msg::ParamsBlob;

/// How `select_action` should behave: exploring during collection,
/// greedy during evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionMode {
    Sample,
    Predict,
}

/// A parameter blob that failed to deserialize into the policy.
#[derive(Debug)]
pub struct CorruptParams {
    pub reason: String,
}

impl fmt::Display for CorruptParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "corrupt parameter blob: {}", self.reason)
    }
}

impl Error for CorruptParams {}

/// Scalar bundle produced by one policy update, forwarded to the recorder.
#[derive(Debug, Clone, Serialize)]
pub struct PolicySummary {
    pub update_step: u64,
    pub scalars: Vec<(String, f64)>,
}

/// The function approximator contract, consumed opaquely.
///
/// The orchestration core never inspects the parameter blob: it is
/// whatever `compute_update` produced, carried as raw bytes.
pub trait Policy: Send {
    type State;
    type Action;
    type Batch;

    fn select_action(&mut self, state: &Self::State, mode: ActionMode) -> Self::Action;

    /// Replaces the policy's parameters with a previously produced blob.
    ///
    /// # Errors
    /// `CorruptParams` if the blob does not deserialize.
    fn install_parameters(&mut self, blob: &[u8]) -> Result<(), CorruptParams>;

    /// Runs one opaque learning update on `batch`.
    ///
    /// # Returns
    /// The updated parameter blob and a scalar summary of the update.
    fn compute_update(&mut self, batch: Self::Batch) -> (ParamsBlob, PolicySummary);
}
