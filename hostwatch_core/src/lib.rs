//! Shared pieces of hostwatch: the wire schema spoken between agent and
//! clients, unit formatting, and the synthetic telemetry generator used for
//! placeholders and offline fallback.

pub mod cadence;
pub mod format;
pub mod synthetic;
pub mod types;

pub use cadence::Cadence;
pub use types::{
    ProcessRecord, ProcessStatus, ResourceSample, ServerEvent, SystemInfo, TimelineCategory,
    TimelineEvent, TimelineSnapshot,
};

/// Upper bound on process records in one `processUpdate` snapshot.
pub const MAX_PROCESSES: usize = 50;
