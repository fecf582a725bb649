use std::time::Duration;

/// Loop sizing for the orchestrator.
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    /// Label for lifecycle logs ("train", "test", ...).
    pub mode: String,
    /// On-policy algorithms learn once per freshly collected sample;
    /// off-policy ones run a fixed count per cycle.
    pub onpolicy_flag: bool,
    /// Learning iterations per cycle when off-policy.
    pub n_steps_per_learn: usize,
    /// Environment interactions per collect cycle.
    pub n_sample_steps: usize,
    /// Sleep between termination polls in the distributed variant.
    pub poll_interval_tracker: Duration,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            mode: "train".into(),
            onpolicy_flag: false,
            n_steps_per_learn: 1,
            n_sample_steps: 64,
            poll_interval_tracker: Duration::from_millis(100),
        }
    }
}
