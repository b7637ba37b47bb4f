//! Per-client delivery: one task per connected client, each with its own
//! telemetry source, ticker and emission counters. The broker only keeps the
//! task handles so a disconnect can cancel exactly that client's task.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use hostwatch_core::{Cadence, ServerEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::telemetry::TelemetrySource;

pub type SessionId = u64;

#[derive(Debug, Clone, Copy)]
pub struct Schedule {
    pub period: Duration,
    pub processes_every: u32,
    pub timeline_every: u32,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(1),
            processes_every: 5,
            timeline_every: 10,
        }
    }
}

/// Drives one client until its receiver goes away or the task is aborted.
pub async fn run_session(
    id: SessionId,
    mut source: Box<dyn TelemetrySource>,
    tx: mpsc::Sender<ServerEvent>,
    schedule: Schedule,
) {
    match source.system_info() {
        Ok(info) => {
            if tx.send(ServerEvent::SystemInfo(info)).await.is_err() {
                return;
            }
        }
        Err(e) => warn!(session = id, "system info unavailable: {e}"),
    }
    if tx.send(ServerEvent::ChromeData(source.timeline())).await.is_err() {
        return;
    }

    let mut ticker = interval_at(Instant::now() + schedule.period, schedule.period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut procs = Cadence::new(schedule.processes_every);
    let mut timeline = Cadence::new(schedule.timeline_every);

    loop {
        ticker.tick().await;

        match source.resource_sample() {
            Ok(sample) => {
                if tx.send(ServerEvent::ResourceUpdate(sample)).await.is_err() {
                    break;
                }
            }
            // A failed tick is skipped; the next one proceeds normally.
            Err(e) => warn!(session = id, "resource sample failed: {e}"),
        }

        if procs.tick() {
            let list = source.processes().await;
            if tx.send(ServerEvent::ProcessUpdate(list)).await.is_err() {
                break;
            }
        }

        if timeline.tick() && tx.send(ServerEvent::ChromeData(source.timeline())).await.is_err() {
            break;
        }
    }
    debug!(session = id, "session receiver gone; emitter stopped");
}

/// Registry of live session tasks.
#[derive(Default)]
pub struct SessionBroker {
    next_id: AtomicU64,
    sessions: Mutex<HashMap<SessionId, JoinHandle<()>>>,
    schedule: Schedule,
}

impl SessionBroker {
    pub fn new(schedule: Schedule) -> Self {
        Self {
            next_id: AtomicU64::new(0),
            sessions: Mutex::new(HashMap::new()),
            schedule,
        }
    }

    /// Spawns an isolated emitter for one client. Events go to `tx`.
    pub fn open(
        &self,
        source: Box<dyn TelemetrySource>,
        tx: mpsc::Sender<ServerEvent>,
    ) -> SessionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let handle = tokio::spawn(run_session(id, source, tx, self.schedule));
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, handle);
        id
    }

    /// Cancels the session's task. Returns false if it was not registered.
    pub fn close(&self, id: SessionId) -> bool {
        let handle = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        match handle {
            Some(h) => {
                h.abort();
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self, id: SessionId) -> bool {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .is_some_and(|h| !h.is_finished())
    }

    pub fn active_count(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Drop for SessionBroker {
    fn drop(&mut self) {
        let sessions = self
            .sessions
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        for (_, h) in sessions.drain() {
            h.abort();
        }
    }
}
