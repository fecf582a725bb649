mod config;
mod distributed;
mod error;
mod simple;

pub use config::TrainerConfig;
pub use distributed::Trainer;
pub use error::{Result, TrainerErr};
pub use simple::{SimpleTrainer, TrainingStats};
