use std::time::Duration;

use tokio::{
    fs,
    sync::{
        mpsc::{self, error::TrySendError},
        oneshot,
    },
    time,
};

use comms::{Msg, ParamsBlob, Reply};

use crate::{
    config::ModelMgrConfig,
    error::{ModelMgrErr, Result},
    persist::{PersistRequest, PersistenceWorker},
    store::VersionStore,
};

/// Sleep between enqueue retries while the persistence queue is full.
const FULL_QUEUE_BACKOFF: Duration = Duration::from_millis(10);

type ModelMgrRequest = (Msg, oneshot::Sender<Result<Reply>>);

/// Single owner of the in-memory version store and the persistence
/// queue's producer side.
///
/// Every execution context — local or distributed — reaches the latest
/// parameters only through `Msg` requests on a `ModelMgrHandle`, never
/// through shared memory.
pub struct ModelMgr {
    cfg: ModelMgrConfig,
    store: VersionStore,
    persist_tx: mpsc::Sender<PersistRequest>,
    rx: mpsc::Receiver<ModelMgrRequest>,
}

/// Cloneable client side of the model manager service.
#[derive(Debug, Clone)]
pub struct ModelMgrHandle {
    tx: mpsc::Sender<ModelMgrRequest>,
}

impl ModelMgr {
    /// Creates the model directory, spawns the persistence worker and
    /// the service task.
    ///
    /// # Returns
    /// The request handle plus the failure channel on which a fatal
    /// persistence error is reported exactly once.
    pub async fn spawn(
        cfg: ModelMgrConfig,
    ) -> Result<(ModelMgrHandle, mpsc::Receiver<ModelMgrErr>)> {
        cfg.validate()?;
        fs::create_dir_all(&cfg.model_dir).await?;

        let (persist_tx, persist_rx) = mpsc::channel(cfg.queue_capacity);
        let (failure_tx, failure_rx) = mpsc::channel(1);
        let worker = PersistenceWorker::new(
            persist_rx,
            cfg.model_dir.clone(),
            cfg.poll_interval_persist,
            failure_tx,
        );
        tokio::spawn(worker.run());

        let (tx, rx) = mpsc::channel(64);
        let mgr = Self {
            cfg,
            store: VersionStore::new(),
            persist_tx,
            rx,
        };
        tokio::spawn(mgr.run());

        log::info!("[ModelMgr] start model manager");
        Ok((ModelMgrHandle { tx }, failure_rx))
    }

    async fn run(mut self) {
        while let Some((msg, reply)) = self.rx.recv().await {
            let res = self.dispatch(msg).await;
            let _ = reply.send(res);
        }
    }

    async fn dispatch(&mut self, msg: Msg) -> Result<Reply> {
        match msg {
            Msg::PutModelParams { step, blob } => {
                self.put(step, blob).await?;
                Ok(Reply::Ack)
            }
            Msg::GetModelParams => {
                let (_, blob) = self.store.latest()?;
                Ok(Reply::ModelParams(blob.clone()))
            }
            msg @ (Msg::IncreaseUpdateStep { .. }
            | Msg::IncreaseSampleCount { .. }
            | Msg::GetUpdateStep
            | Msg::CheckTaskEnd) => Err(ModelMgrErr::UnknownMessage { got: msg.kind() }),
        }
    }

    /// Stores the new version and, when `step` meets the save interval,
    /// hands it to the persistence path.
    async fn put(&mut self, step: u64, blob: ParamsBlob) -> Result<()> {
        let save = step % self.cfg.save_interval == 0;
        let queued = save.then(|| PersistRequest {
            step,
            blob: blob.clone(),
        });

        self.store.put(step, blob);

        if let Some(req) = queued {
            self.enqueue(req).await?;
        }
        Ok(())
    }

    /// Backpressure point: retries with short sleeps while the queue is
    /// full rather than dropping the request.
    async fn enqueue(&self, mut req: PersistRequest) -> Result<()> {
        loop {
            match self.persist_tx.try_send(req) {
                Ok(()) => return Ok(()),
                Err(TrySendError::Full(back)) => {
                    req = back;
                    time::sleep(FULL_QUEUE_BACKOFF).await;
                }
                Err(TrySendError::Closed(_)) => return Err(ModelMgrErr::PersistenceDown),
            }
        }
    }
}

impl ModelMgrHandle {
    /// Publishes a message to the model manager and waits for its reply.
    pub async fn pub_msg(&self, msg: Msg) -> Result<Reply> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send((msg, tx))
            .await
            .map_err(|_| ModelMgrErr::ServiceClosed)?;
        rx.await.map_err(|_| ModelMgrErr::ServiceClosed)?
    }

    /// Stores a new parameter version. Completes once the version is
    /// visible to readers; durability follows asynchronously.
    pub async fn put_model_params(&self, step: u64, blob: ParamsBlob) -> Result<()> {
        match self.pub_msg(Msg::PutModelParams { step, blob }).await? {
            Reply::Ack => Ok(()),
            reply => Err(ModelMgrErr::UnexpectedReply { got: reply.kind() }),
        }
    }

    /// Fetches the latest parameter version, independent of the
    /// persistence path's progress.
    pub async fn get_model_params(&self) -> Result<ParamsBlob> {
        match self.pub_msg(Msg::GetModelParams).await? {
            Reply::ModelParams(blob) => Ok(blob),
            reply => Err(ModelMgrErr::UnexpectedReply { got: reply.kind() }),
        }
    }
}
