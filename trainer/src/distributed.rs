use std::{future::Future, time::Instant};

use tokio::{sync::mpsc, task::JoinHandle, time};

use comms::TrackerHandle;
use model_mgr::ModelMgrErr;

use crate::{
    config::TrainerConfig,
    error::{Result, TrainerErr},
    simple::TrainingStats,
};

struct Role {
    name: &'static str,
    handle: JoinHandle<()>,
}

/// Distributed orchestrator: every role (model manager, interactors,
/// learners, online tester, ...) runs as an independently scheduled
/// long-lived task, and the trainer itself only polls the tracker for
/// the global termination condition.
///
/// Shutdown aborts the registered roles: background work is abandoned
/// best-effort, never relied on to flush. Stable storage stays
/// consistent because checkpoint commits are atomic.
pub struct Trainer {
    cfg: TrainerConfig,
    tracker: TrackerHandle,
    failure_rx: mpsc::Receiver<ModelMgrErr>,
    roles: Vec<Role>,
}

impl Trainer {
    /// # Arguments
    /// * `tracker` - Handle to the termination-tracking service.
    /// * `failure_rx` - The model manager's fatal-failure channel.
    pub fn new(
        cfg: TrainerConfig,
        tracker: TrackerHandle,
        failure_rx: mpsc::Receiver<ModelMgrErr>,
    ) -> Self {
        Self {
            cfg,
            tracker,
            failure_rx,
            roles: Vec::new(),
        }
    }

    /// Registers a role as a detached background task.
    pub fn spawn_role<F>(&mut self, name: &'static str, role: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        log::info!("[Trainer] spawning role {name}");
        self.roles.push(Role {
            name,
            handle: tokio::spawn(role),
        });
    }

    /// Polls the tracker until the task-end condition holds or a fatal
    /// failure is reported, then shuts every role down.
    pub async fn run(mut self) -> Result<TrainingStats> {
        log::info!("[Trainer] start {}ing", self.cfg.mode);
        let start = Instant::now();
        let mut failures_open = true;

        let outcome = loop {
            tokio::select! {
                failure = self.failure_rx.recv(), if failures_open => {
                    match failure {
                        Some(err) => break Err(TrainerErr::ModelMgr(err)),
                        // All failure reporters gone; keep polling.
                        None => failures_open = false,
                    }
                }
                _ = time::sleep(self.cfg.poll_interval_tracker) => {
                    match self.tracker.check_task_end().await {
                        Ok(true) => break Ok(()),
                        Ok(false) => {}
                        Err(err) => break Err(err.into()),
                    }
                }
            }
        };

        self.shutdown();
        let elapsed = start.elapsed();

        match outcome {
            Ok(()) => {
                let update_step = self.tracker.update_step().await?;
                log::info!(
                    "[Trainer] finish {}ing, time cost: {:.3} s",
                    self.cfg.mode,
                    elapsed.as_secs_f64()
                );
                Ok(TrainingStats {
                    update_step,
                    elapsed,
                })
            }
            Err(err) => {
                log::error!("[Trainer] shut down after failure: {err}");
                Err(err)
            }
        }
    }

    /// Aborts every registered role. In-flight work is dropped.
    fn shutdown(&mut self) {
        for role in &self.roles {
            log::info!("[Trainer] stopping role {}", role.name);
            role.handle.abort();
        }
    }
}
