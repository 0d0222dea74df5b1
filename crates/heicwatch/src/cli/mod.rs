//! Command handlers.

pub mod batch;
pub mod config;
pub mod watch;

mod setup;
