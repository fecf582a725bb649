use std::{error::Error, fmt};

use tokio::sync::{mpsc, oneshot};

use crate::msg::{Msg, Reply};

type TrackerRequest = (Msg, oneshot::Sender<Result<Reply, TrackerErr>>);

/// Budgets for the global termination condition. A budget of 0 means
/// that counter is unbounded; at least one budget must be bounded or
/// `CheckTaskEnd` could never fire.
#[derive(Debug, Clone, Copy)]
pub struct TrackerConfig {
    pub max_update_step: u64,
    pub max_sample_count: u64,
}

impl TrackerConfig {
    fn validate(&self) -> Result<(), TrackerErr> {
        if self.max_update_step == 0 && self.max_sample_count == 0 {
            return Err(TrackerErr::InvalidConfig(
                "at least one of max_update_step / max_sample_count must be bounded".into(),
            ));
        }
        Ok(())
    }
}

/// Tracker runtime failures.
#[derive(Debug)]
pub enum TrackerErr {
    InvalidConfig(String),
    /// A message addressed to another service reached the tracker.
    UnknownMessage { got: &'static str },
    /// The service replied with a kind the caller did not ask for.
    UnexpectedReply { got: &'static str },
    /// The tracker task is gone.
    Closed,
}

impl fmt::Display for TrackerErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerErr::InvalidConfig(msg) => write!(f, "invalid tracker config: {msg}"),
            TrackerErr::UnknownMessage { got } => {
                write!(f, "tracker received an unknown message kind: {got}")
            }
            TrackerErr::UnexpectedReply { got } => {
                write!(f, "tracker sent an unexpected reply kind: {got}")
            }
            TrackerErr::Closed => write!(f, "tracker service is closed"),
        }
    }
}

impl Error for TrackerErr {}

/// Single-owner accounting of global training progress.
///
/// The counters are reachable only through request/response messages on
/// a `TrackerHandle`, so the local and distributed orchestrator
/// variants see the exact same surface.
pub struct Tracker {
    cfg: TrackerConfig,
    update_step: u64,
    sample_count: u64,
    rx: mpsc::Receiver<TrackerRequest>,
}

/// Cloneable client side of the tracker service.
#[derive(Debug, Clone)]
pub struct TrackerHandle {
    tx: mpsc::Sender<TrackerRequest>,
}

impl Tracker {
    /// Validates the config and starts the tracker task.
    ///
    /// # Returns
    /// The handle every role uses to publish tracker messages.
    pub fn spawn(cfg: TrackerConfig) -> Result<TrackerHandle, TrackerErr> {
        cfg.validate()?;
        let (tx, rx) = mpsc::channel(64);
        let tracker = Self {
            cfg,
            update_step: 0,
            sample_count: 0,
            rx,
        };
        tokio::spawn(tracker.run());
        log::info!("[Tracker] start tracker");
        Ok(TrackerHandle { tx })
    }

    async fn run(mut self) {
        while let Some((msg, reply)) = self.rx.recv().await {
            let _ = reply.send(self.dispatch(msg));
        }
    }

    fn dispatch(&mut self, msg: Msg) -> Result<Reply, TrackerErr> {
        match msg {
            Msg::IncreaseUpdateStep { n } => {
                self.update_step += n;
                Ok(Reply::Ack)
            }
            Msg::IncreaseSampleCount { n } => {
                self.sample_count += n;
                Ok(Reply::Ack)
            }
            Msg::GetUpdateStep => Ok(Reply::UpdateStep(self.update_step)),
            Msg::CheckTaskEnd => Ok(Reply::TaskEnd(self.task_end())),
            msg @ (Msg::PutModelParams { .. } | Msg::GetModelParams) => {
                Err(TrackerErr::UnknownMessage { got: msg.kind() })
            }
        }
    }

    fn task_end(&self) -> bool {
        let steps_done =
            self.cfg.max_update_step > 0 && self.update_step >= self.cfg.max_update_step;
        let samples_done =
            self.cfg.max_sample_count > 0 && self.sample_count >= self.cfg.max_sample_count;
        steps_done || samples_done
    }
}

impl TrackerHandle {
    /// Publishes a message to the tracker and waits for its reply.
    pub async fn pub_msg(&self, msg: Msg) -> Result<Reply, TrackerErr> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send((msg, tx))
            .await
            .map_err(|_| TrackerErr::Closed)?;
        rx.await.map_err(|_| TrackerErr::Closed)?
    }

    pub async fn increase_update_step(&self, n: u64) -> Result<(), TrackerErr> {
        match self.pub_msg(Msg::IncreaseUpdateStep { n }).await? {
            Reply::Ack => Ok(()),
            reply => Err(TrackerErr::UnexpectedReply { got: reply.kind() }),
        }
    }

    pub async fn increase_sample_count(&self, n: u64) -> Result<(), TrackerErr> {
        match self.pub_msg(Msg::IncreaseSampleCount { n }).await? {
            Reply::Ack => Ok(()),
            reply => Err(TrackerErr::UnexpectedReply { got: reply.kind() }),
        }
    }

    pub async fn update_step(&self) -> Result<u64, TrackerErr> {
        match self.pub_msg(Msg::GetUpdateStep).await? {
            Reply::UpdateStep(step) => Ok(step),
            reply => Err(TrackerErr::UnexpectedReply { got: reply.kind() }),
        }
    }

    pub async fn check_task_end(&self) -> Result<bool, TrackerErr> {
        match self.pub_msg(Msg::CheckTaskEnd).await? {
            Reply::TaskEnd(end) => Ok(end),
            reply => Err(TrackerErr::UnexpectedReply { got: reply.kind() }),
        }
    }
}
