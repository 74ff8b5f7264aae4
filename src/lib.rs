pub mod config;
pub mod error;
pub mod fetch;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod skus;

pub use config::FeedConfig;
pub use error::FeedError;
pub use pipeline::{run, RunSummary, Settings};
