//! UI module root: exposes drawing functions for individual panels.

pub mod header;
pub mod processes;
pub mod theme;
pub mod timeline;
pub mod usage;
pub mod util;
