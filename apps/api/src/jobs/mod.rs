//! Job board: posting, listing and fetching jobs.

pub mod handlers;
pub mod service;
pub mod skills;
