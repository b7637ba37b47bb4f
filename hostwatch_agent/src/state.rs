//! Shared agent state: the session registry and the process enumerator.

use std::sync::Arc;

use crate::processes::ProcessEnumerator;
use crate::session::SessionBroker;
use crate::telemetry::{LiveTelemetry, SyntheticTelemetry, TelemetrySource};

#[derive(Clone)]
pub struct AppState {
    pub broker: Arc<SessionBroker>,
    // Shared across sessions; bounds concurrent subprocesses.
    pub enumerator: Arc<ProcessEnumerator>,
    pub simulate: bool,
}

impl AppState {
    /// Fresh telemetry for one new session. Nothing in it is shared with other
    /// sessions except the enumerator's concurrency limit.
    pub fn telemetry_for_session(&self) -> Box<dyn TelemetrySource> {
        if self.simulate {
            Box::new(SyntheticTelemetry::default())
        } else {
            Box::new(LiveTelemetry::new(Arc::clone(&self.enumerator)))
        }
    }
}
