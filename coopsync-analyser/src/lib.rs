//! Chart and log computations for the coop dashboard.
//!
//! Everything here is pure: callers pass in the raw store records, the
//! current instant and the [`Calendar`] describing local time, and get back
//! plain values.

mod aggregate;
mod calendar;
mod conversion;
mod event_log;
mod history;
mod hydration;
mod sample;
mod window;

pub use aggregate::*;
pub use calendar::*;
pub use conversion::*;
pub use event_log::*;
pub use history::*;
pub use hydration::*;
pub use sample::*;
pub use window::*;

#[derive(Debug, thiserror::Error)]
pub enum AnalyserError {
    #[error("Date out of range: {0}")]
    DateOutOfRange(#[from] time::error::ComponentRange),

    #[error("Timestamp out of range: {0}")]
    TimestampOutOfRange(i64),
}
