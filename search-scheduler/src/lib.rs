//! Background Scheduler (C9, §4.7).
//!
//! Drives `ScheduledTask` rows to their due times and runs the registered
//! `TaskHandler` for each, recording outcomes as `TaskResult` history.

pub mod error;
pub mod handler;
pub mod scheduler;

pub use error::{Result, SchedulerError};
pub use handler::TaskHandler;
pub use scheduler::{Scheduler, SchedulerStatus};
