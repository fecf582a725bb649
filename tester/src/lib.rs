mod config;
mod error;
mod online_tester;

pub use config::TesterConfig;
pub use error::{Result, TesterErr};
pub use online_tester::OnlineTester;
