use std::{path::PathBuf, time::Duration};

/// Evaluation knobs for the online tester.
#[derive(Debug, Clone)]
pub struct TesterConfig {
    /// Directory the persistence worker commits checkpoints into.
    pub model_dir: PathBuf,
    /// Full episodes per evaluation pass.
    pub online_eval_episode: u32,
    /// Per-episode step cap; -1 means unbounded.
    pub max_step: i64,
    /// Sleep between checkpoint discovery polls.
    pub poll_interval_eval: Duration,
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            online_eval_episode: 10,
            max_step: -1,
            poll_interval_eval: Duration::from_secs(1),
        }
    }
}
