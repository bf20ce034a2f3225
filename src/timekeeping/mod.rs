//! Attendance status derivation and timekeeping aggregation.
//!
//! Everything in here is synchronous and does no I/O: records arrive already
//! fetched, summaries leave as plain values for the render/export sinks.

pub mod aggregator;
pub mod classifier;
pub mod export;
pub mod period;
pub mod registry;
pub mod scan;
pub mod session;
pub mod ticker;
pub mod time_utils;
