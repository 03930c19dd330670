pub mod health;
pub mod metrics;
pub mod scores;
pub mod session;
