use std::{path::PathBuf, time::Duration};

use tokio::{
    fs,
    sync::mpsc::{self, error::TryRecvError},
    time,
};

use comms::ParamsBlob;

use crate::{checkpoint, error::ModelMgrErr};

/// A checkpoint waiting to be written to stable storage.
#[derive(Debug)]
pub struct PersistRequest {
    pub step: u64,
    pub blob: ParamsBlob,
}

/// Background task draining the to-be-saved queue onto disk.
///
/// The loop drains every queued request, then sleeps a fixed short
/// interval before re-checking; a small persistence latency is the
/// price for not carrying a wake-up mechanism. A write failure is not
/// retried: it is reported on the orchestrator's failure channel and
/// the worker exits, since silent checkpoint loss is unacceptable.
pub struct PersistenceWorker {
    rx: mpsc::Receiver<PersistRequest>,
    model_dir: PathBuf,
    poll_interval: Duration,
    failure: mpsc::Sender<ModelMgrErr>,
}

impl PersistenceWorker {
    pub(crate) fn new(
        rx: mpsc::Receiver<PersistRequest>,
        model_dir: PathBuf,
        poll_interval: Duration,
        failure: mpsc::Sender<ModelMgrErr>,
    ) -> Self {
        Self {
            rx,
            model_dir,
            poll_interval,
            failure,
        }
    }

    /// Runs until the request channel closes or a write fails.
    pub async fn run(mut self) {
        loop {
            match self.drain().await {
                Ok(true) => {}
                Ok(false) => {
                    log::debug!("[PersistenceWorker] request queue closed, stopping");
                    return;
                }
                Err(err) => {
                    log::error!("[PersistenceWorker] fatal: {err}");
                    let _ = self.failure.send(err).await;
                    return;
                }
            }
            time::sleep(self.poll_interval).await;
        }
    }

    /// Writes every currently queued request.
    ///
    /// # Returns
    /// `Ok(false)` once the producer side of the queue is gone.
    async fn drain(&mut self) -> Result<bool, ModelMgrErr> {
        loop {
            match self.rx.try_recv() {
                Ok(req) => self.write(req).await?,
                Err(TryRecvError::Empty) => return Ok(true),
                Err(TryRecvError::Disconnected) => return Ok(false),
            }
        }
    }

    /// Commits one checkpoint. Step keys are write-once: an already
    /// committed step is left untouched.
    async fn write(&self, req: PersistRequest) -> Result<(), ModelMgrErr> {
        let path = checkpoint::step_path(&self.model_dir, req.step);

        if fs::try_exists(&path).await.unwrap_or(false) {
            log::debug!(step = req.step; "[PersistenceWorker] checkpoint already exists, skipping");
            return Ok(());
        }

        checkpoint::commit_blob(&path, &req.blob)
            .await
            .map_err(|source| ModelMgrErr::PersistWrite {
                step: req.step,
                source,
            })?;

        log::debug!(step = req.step; "[PersistenceWorker] persisted checkpoint");
        Ok(())
    }
}
