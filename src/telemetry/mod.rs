//! Turn-level telemetry.
//!
//! # PRIVACY INVARIANT
//! Events carry kinds, tags, counts and durations only. User text, entity
//! values and file paths never enter the buffer.
//!
//! Telemetry is write-only from the pipeline's point of view: nothing in the
//! classifier or planner reads it back.

pub mod event;
pub mod metrics;
pub mod recorder;

pub use event::*;
pub use metrics::*;
pub use recorder::*;
