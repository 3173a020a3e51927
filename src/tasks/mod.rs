//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of a cache instance.
//!
//! # Tasks
//! - Eviction sweep: removes expired records from every mount at a fixed interval

mod sweeper;

pub use sweeper::SweepReport;
pub(crate) use sweeper::{spawn_sweeper, sweep_all};
