//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Flush interval: clears every second-level cache at a fixed interval

mod flush_interval;

pub use flush_interval::spawn_flush_interval_task;
