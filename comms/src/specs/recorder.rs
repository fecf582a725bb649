use serde::Serialize;

use super::policy::PolicySummary;

/// Result of one full online evaluation pass over a checkpoint.
#[derive(Debug, Clone, Serialize)]
pub struct EvalSummary {
    pub step: u64,
    pub mean_reward: f64,
    pub episode_count: u32,
}

/// Everything the orchestration core forwards to the recorder.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Summary {
    Policy(PolicySummary),
    Eval(EvalSummary),
}

/// The metrics backend contract. Summaries are fire-and-forget: the
/// core never reads them back.
pub trait Recorder: Send {
    fn add_summary(&mut self, summary: Summary);
}
