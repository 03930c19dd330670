pub mod api;
pub mod config;
pub mod metrics;
pub mod score;
pub mod storage;

pub use score::{ANONYMOUS_USER, ScoreRecord, ScoreSubmission};
