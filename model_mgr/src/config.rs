use std::{path::PathBuf, time::Duration};

use crate::error::{ModelMgrErr, Result};

/// Durability knobs for the model manager and its persistence worker.
#[derive(Debug, Clone)]
pub struct ModelMgrConfig {
    /// Directory holding `{step}` checkpoint files and the `best` key.
    pub model_dir: PathBuf,
    /// Steps between durable checkpoints: a put is persisted when
    /// `step % save_interval == 0`.
    pub save_interval: u64,
    /// Capacity of the to-be-saved queue. Producers wait, never drop,
    /// when it is full.
    pub queue_capacity: usize,
    /// Sleep between persistence drain passes.
    pub poll_interval_persist: Duration,
}

impl Default for ModelMgrConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            save_interval: 500,
            queue_capacity: 128,
            poll_interval_persist: Duration::from_millis(50),
        }
    }
}

impl ModelMgrConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.save_interval == 0 {
            return Err(ModelMgrErr::InvalidConfig(
                "save_interval must be at least 1".into(),
            ));
        }
        if self.queue_capacity == 0 {
            return Err(ModelMgrErr::InvalidConfig(
                "queue_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
