/// One environment interaction as stored by the experience buffer.
#[derive(Debug, Clone)]
pub struct Experience<S, A> {
    pub state: S,
    pub action: A,
    pub reward: f64,
    pub next_state: S,
    pub terminated: bool,
    pub truncated: bool,
}

/// The experience buffer contract. Internal storage and sampling policy
/// are the collector's business; the core only feeds it interactions
/// and pulls training batches out.
pub trait Collector: Send {
    type State;
    type Action;
    type Batch;

    fn add_exps(&mut self, exps: Vec<Experience<Self::State, Self::Action>>);

    /// Returns the next training batch, or `None` if the buffer cannot
    /// currently produce one.
    fn get_training_data(&mut self) -> Option<Self::Batch>;

    fn get_buffer_length(&self) -> usize;
}
