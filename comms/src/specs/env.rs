/// Free-form side information returned by the environment.
pub type Info = serde_json::Value;

/// One interaction result returned by `Env::step`.
#[derive(Debug, Clone)]
pub struct Transition<S> {
    pub next_state: S,
    pub reward: f64,
    /// The episode reached a terminal state.
    pub terminated: bool,
    /// The episode was cut off without reaching a terminal state.
    pub truncated: bool,
    pub info: Info,
}

/// The environment simulator contract, consumed opaquely.
pub trait Env: Send {
    type State;
    type Action;

    fn reset(&mut self) -> (Self::State, Info);

    fn step(&mut self, action: &Self::Action) -> Transition<Self::State>;
}
