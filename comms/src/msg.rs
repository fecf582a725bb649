/// Opaque serialized parameter set. Produced by a policy update, moved
/// through the model manager and checkpoint files, and eventually fed
/// back into a policy via `install_parameters`.
pub type ParamsBlob = Vec<u8>;

/// The application layer message for the orchestration services.
///
/// Every service dispatches on this enum with an exhaustive `match`, so
/// adding a variant is a compile-time obligation on each of them. A
/// variant addressed to the wrong service is a protocol mismatch and
/// surfaces as that service's `UnknownMessage` error.
#[derive(Debug)]
pub enum Msg {
    /// Store a new parameter version under `step`. Served by the model manager.
    PutModelParams { step: u64, blob: ParamsBlob },
    /// Fetch the latest parameter version. Served by the model manager.
    GetModelParams,
    /// Bump the global learning-update counter. Served by the tracker.
    IncreaseUpdateStep { n: u64 },
    /// Bump the global environment-sample counter. Served by the tracker.
    IncreaseSampleCount { n: u64 },
    /// Read the global learning-update counter. Served by the tracker.
    GetUpdateStep,
    /// Ask whether the configured training budget is exhausted. Served by the tracker.
    CheckTaskEnd,
}

/// The reply half of the envelope.
#[derive(Debug)]
pub enum Reply {
    Ack,
    ModelParams(ParamsBlob),
    UpdateStep(u64),
    TaskEnd(bool),
}

impl Msg {
    /// A short tag for logs and protocol-mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Msg::PutModelParams { .. } => "put_model_params",
            Msg::GetModelParams => "get_model_params",
            Msg::IncreaseUpdateStep { .. } => "increase_update_step",
            Msg::IncreaseSampleCount { .. } => "increase_sample_count",
            Msg::GetUpdateStep => "get_update_step",
            Msg::CheckTaskEnd => "check_task_end",
        }
    }
}

impl Reply {
    /// A short tag for logs and unexpected-reply errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Reply::Ack => "ack",
            Reply::ModelParams(_) => "model_params",
            Reply::UpdateStep(_) => "update_step",
            Reply::TaskEnd(_) => "task_end",
        }
    }
}
