//! Match Scorer: weighted candidate/job compatibility and per-job ranking.

pub mod handlers;
pub mod ranking;
pub mod scorer;
