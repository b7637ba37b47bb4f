//! Client-side delivery state: which source feeds the dashboard (the agent's
//! stream or the local simulator) and the buffers both of them write into.
//!
//! Everything here is driven from the single UI loop. The WebSocket task only
//! posts [`ClientEvent`]s into a queue; the loop applies them with
//! [`ClientSession::apply`] and advances timers with [`ClientSession::poll`],
//! so the two producers can never interleave.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use hostwatch_core::synthetic::{
    evolve, generate_processes, generate_resource_sample, generate_timeline,
    simulated_system_info,
};
use hostwatch_core::{
    Cadence, ProcessRecord, ResourceSample, ServerEvent, SystemInfo, TimelineCategory,
    TimelineSnapshot,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::history::{now_label, RollingSeries};
use crate::table::ProcessTableView;

/// Wait after a dropped stream before switching to simulated data.
pub const FALLBACK_GRACE: Duration = Duration::from_secs(2);
pub const SIM_PERIOD: Duration = Duration::from_secs(1);
pub const SIM_TIMELINE_EVERY: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientChannelState {
    Connecting,
    Connected,
    Disconnected,
}

/// What the header shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBadge {
    Connecting,
    Live,
    /// Stream dropped; fallback not active yet.
    Disconnected,
    Simulated,
}

impl StatusBadge {
    pub fn label(self) -> &'static str {
        match self {
            StatusBadge::Connecting => "Connecting",
            StatusBadge::Live => "Live",
            StatusBadge::Disconnected => "Disconnected",
            StatusBadge::Simulated => "Simulated Data",
        }
    }
}

/// Posted by the channel task.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    Connected,
    /// An established stream ended.
    Disconnected,
    /// There is no channel to use at all (first connect failed, or disabled).
    ChannelUnavailable,
    Server(ServerEvent),
}

/// Local stand-in for the agent. Created on the first fallback and kept for
/// the rest of the session; later fallbacks resume it instead of starting a
/// second timer.
#[derive(Debug)]
pub struct Simulator {
    rng: StdRng,
    processes: Vec<ProcessRecord>,
    timeline: Cadence,
    next_tick: Instant,
}

/// What one simulator tick produced.
pub struct SimTick {
    pub sample: ResourceSample,
    pub processes: Vec<ProcessRecord>,
    pub timeline: Option<TimelineSnapshot>,
}

impl Simulator {
    pub fn new(mut rng: StdRng, now: Instant) -> Self {
        let processes = generate_processes(&mut rng);
        Self {
            rng,
            processes,
            timeline: Cadence::new(SIM_TIMELINE_EVERY),
            next_tick: now + SIM_PERIOD,
        }
    }

    pub fn processes(&self) -> &[ProcessRecord] {
        &self.processes
    }

    fn resume(&mut self, now: Instant) {
        self.next_tick = now + SIM_PERIOD;
    }

    /// Consumes the tick if one is due. The caller decides whether to use it.
    fn take_due(&mut self, now: Instant) -> bool {
        if now < self.next_tick {
            return false;
        }
        self.next_tick += SIM_PERIOD;
        // Don't replay a backlog after a long stall.
        if self.next_tick <= now {
            self.next_tick = now + SIM_PERIOD;
        }
        true
    }

    fn tick(&mut self) -> SimTick {
        let t = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let sample = generate_resource_sample(&mut self.rng, t);
        evolve(&mut self.processes, &mut self.rng);
        let timeline = self
            .timeline
            .tick()
            .then(|| generate_timeline(&mut self.rng));
        SimTick {
            sample,
            processes: self.processes.clone(),
            timeline,
        }
    }
}

pub struct ClientSession {
    state: ClientChannelState,
    fallback_at: Option<Instant>,
    fallback_active: bool,
    simulator: Option<Simulator>,
    rng: StdRng,

    pub series: RollingSeries,
    pub table: ProcessTableView,
    pub system_info: Option<SystemInfo>,
    pub timeline: TimelineSnapshot,
    pub category: TimelineCategory,
}

impl Default for ClientSession {
    fn default() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl ClientSession {
    /// Starts in `Connecting` with a placeholder timeline.
    pub fn new(mut rng: StdRng) -> Self {
        let timeline = generate_timeline(&mut rng);
        Self {
            state: ClientChannelState::Connecting,
            fallback_at: None,
            fallback_active: false,
            simulator: None,
            rng,
            series: RollingSeries::new(),
            table: ProcessTableView::default(),
            system_info: None,
            timeline,
            category: TimelineCategory::Performance,
        }
    }

    pub fn fallback_deadline(&self) -> Option<Instant> {
        self.fallback_at
    }

    pub fn status(&self) -> StatusBadge {
        match self.state {
            ClientChannelState::Connected => StatusBadge::Live,
            _ if self.fallback_active => StatusBadge::Simulated,
            ClientChannelState::Connecting => StatusBadge::Connecting,
            ClientChannelState::Disconnected => StatusBadge::Disconnected,
        }
    }

    pub fn apply(&mut self, ev: ClientEvent, now: Instant) {
        match ev {
            ClientEvent::Connected => self.on_connected(),
            ClientEvent::Disconnected => self.on_disconnected(now),
            ClientEvent::ChannelUnavailable => self.on_channel_unavailable(now),
            ClientEvent::Server(ev) => self.on_server_event(ev),
        }
    }

    pub fn on_connected(&mut self) {
        info!("connected to agent");
        self.state = ClientChannelState::Connected;
        self.fallback_at = None;
        self.fallback_active = false;
    }

    pub fn on_disconnected(&mut self, now: Instant) {
        if self.state != ClientChannelState::Connected {
            return;
        }
        info!("disconnected from agent; falling back in {FALLBACK_GRACE:?}");
        self.state = ClientChannelState::Disconnected;
        self.fallback_at = Some(now + FALLBACK_GRACE);
    }

    pub fn on_channel_unavailable(&mut self, now: Instant) {
        if self.state == ClientChannelState::Connected {
            return;
        }
        self.state = ClientChannelState::Disconnected;
        if !self.fallback_active {
            info!("no channel to the agent; using simulated data");
            self.activate_fallback(now);
        }
    }

    /// Live data counts only while connected.
    pub fn on_server_event(&mut self, ev: ServerEvent) {
        if self.state != ClientChannelState::Connected {
            debug!(event = ev.name(), "ignoring server event while not connected");
            return;
        }
        match ev {
            ServerEvent::SystemInfo(info) => self.system_info = Some(info),
            ServerEvent::ResourceUpdate(s) => self.series.push(now_label(), &s),
            ServerEvent::ProcessUpdate(list) => self.table.set_records(list),
            ServerEvent::ChromeData(t) => self.timeline = t,
        }
    }

    /// Runs the pending fallback if its grace period is over, then lets the
    /// simulator tick. Call on every loop iteration.
    pub fn poll(&mut self, now: Instant) {
        if let Some(at) = self.fallback_at {
            if self.state != ClientChannelState::Connected && now >= at {
                self.activate_fallback(now);
            }
        }

        let Some(sim) = self.simulator.as_mut() else {
            return;
        };
        if !sim.take_due(now) || !self.fallback_active {
            // Ticks while live or while a fallback is pending are no-ops.
            return;
        }
        let tick = sim.tick();
        self.series.push(now_label(), &tick.sample);
        self.table.set_records(tick.processes);
        if let Some(t) = tick.timeline {
            self.timeline = t;
        }
    }

    fn activate_fallback(&mut self, now: Instant) {
        self.fallback_at = None;
        self.fallback_active = true;
        match self.simulator.as_mut() {
            Some(sim) => sim.resume(now),
            None => {
                let rng = StdRng::from_rng(&mut self.rng).unwrap_or_else(|_| StdRng::from_entropy());
                self.simulator = Some(Simulator::new(rng, now));
            }
        }
        self.system_info = Some(simulated_system_info());
        if let Some(sim) = &self.simulator {
            self.table.set_records(sim.processes().to_vec());
        }
    }

    pub fn cycle_category(&mut self) {
        self.category = self.category.next();
    }

    /// Local redraw of the timeline; the next pushed snapshot replaces it.
    pub fn regenerate_timeline(&mut self) {
        self.timeline = generate_timeline(&mut self.rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostwatch_core::ProcessStatus;

    fn session() -> ClientSession {
        ClientSession::new(StdRng::seed_from_u64(7))
    }

    fn live_sample(cpu: f64) -> ClientEvent {
        ClientEvent::Server(ServerEvent::ResourceUpdate(ResourceSample::new(cpu, 10.0)))
    }

    fn secs(t0: Instant, s: f64) -> Instant {
        t0 + Duration::from_secs_f64(s)
    }

    #[test]
    fn starts_connecting_with_placeholder_timeline() {
        let s = session();
        assert_eq!(s.state, ClientChannelState::Connecting);
        assert_eq!(s.status(), StatusBadge::Connecting);
        assert!(!s.timeline.performance.is_empty());
        assert!(s.simulator.is_none());
    }

    #[test]
    fn connected_applies_live_events() {
        let t0 = Instant::now();
        let mut s = session();
        s.apply(ClientEvent::Connected, t0);
        assert_eq!(s.status(), StatusBadge::Live);
        s.apply(live_sample(42.0), t0);
        assert_eq!(s.series.latest().map(|p| p.cpu), Some(42.0));

        let rec = ProcessRecord {
            pid: 7,
            name: "agent".into(),
            cpu: 3.0,
            memory: 1.0,
            status: ProcessStatus::Running,
            started: "00:00:01".into(),
        };
        s.apply(ClientEvent::Server(ServerEvent::ProcessUpdate(vec![rec.clone()])), t0);
        assert_eq!(s.table.records(), &[rec]);
    }

    #[test]
    fn events_before_connect_are_ignored() {
        let t0 = Instant::now();
        let mut s = session();
        s.apply(live_sample(42.0), t0);
        assert_eq!(s.series.latest().map(|p| p.cpu), Some(0.0));
    }

    #[test]
    fn drop_waits_two_seconds_before_simulating() {
        let t0 = Instant::now();
        let mut s = session();
        s.apply(ClientEvent::Connected, t0);
        s.apply(ClientEvent::Disconnected, t0);
        assert_eq!(s.status(), StatusBadge::Disconnected);

        for ms in [0u64, 500, 1000, 1500, 1999] {
            s.poll(t0 + Duration::from_millis(ms));
            assert!(!s.fallback_active, "simulating at {ms}ms");
        }
        assert_eq!(s.series.latest().map(|p| p.cpu), Some(0.0));

        s.poll(secs(t0, 2.0));
        assert!(s.fallback_active);
        assert_eq!(s.status(), StatusBadge::Simulated);
        assert_eq!(s.system_info, Some(simulated_system_info()));
        assert!(!s.table.records().is_empty());

        // First synthetic sample one period after activation.
        s.poll(secs(t0, 2.5));
        assert_eq!(s.series.latest().map(|p| p.cpu), Some(0.0));
        s.poll(secs(t0, 3.0));
        assert!(s.series.latest().is_some_and(|p| p.cpu >= 5.0));
    }

    #[test]
    fn reconnect_within_grace_cancels_fallback() {
        let t0 = Instant::now();
        let mut s = session();
        s.apply(ClientEvent::Connected, t0);
        s.apply(ClientEvent::Disconnected, t0);
        s.apply(ClientEvent::Connected, secs(t0, 1.0));
        s.poll(secs(t0, 5.0));
        assert!(!s.fallback_active);
        assert!(s.simulator.is_none());
        assert_eq!(s.status(), StatusBadge::Live);
    }

    #[test]
    fn unavailable_channel_simulates_immediately() {
        let t0 = Instant::now();
        let mut s = session();
        s.apply(ClientEvent::ChannelUnavailable, t0);
        assert_eq!(s.state, ClientChannelState::Disconnected);
        assert_eq!(s.status(), StatusBadge::Simulated);
        assert!(s.simulator.is_some());
    }

    #[test]
    fn simulator_is_a_noop_while_connected_and_reused_later() {
        let t0 = Instant::now();
        let mut s = session();
        s.apply(ClientEvent::ChannelUnavailable, t0);
        s.poll(secs(t0, 1.0));

        s.apply(ClientEvent::Connected, secs(t0, 1.2));
        s.apply(live_sample(77.0), secs(t0, 1.2));
        for i in 2..6 {
            s.poll(secs(t0, i as f64));
        }
        // Live points carry memory 10.0; synthetic memory never drops that low.
        let is_live = |s: &ClientSession| s.series.latest().is_some_and(|p| p.memory == 10.0);
        assert!(is_live(&s));
        assert_eq!(s.status(), StatusBadge::Live);

        s.apply(ClientEvent::Disconnected, secs(t0, 6.0));
        s.poll(secs(t0, 7.0));
        assert!(is_live(&s));
        s.poll(secs(t0, 8.0));
        assert!(s.fallback_active);
        s.poll(secs(t0, 9.0));
        assert!(!is_live(&s));
    }

    #[test]
    fn live_events_ignored_while_simulating() {
        let t0 = Instant::now();
        let mut s = session();
        s.apply(ClientEvent::ChannelUnavailable, t0);
        s.apply(live_sample(99.9), t0);
        assert_ne!(s.series.latest().map(|p| p.cpu), Some(99.9));
    }

    #[test]
    fn simulated_timeline_refreshes_every_tenth_tick() {
        let t0 = Instant::now();
        let mut s = session();
        s.apply(ClientEvent::ChannelUnavailable, t0);
        let before = s.timeline.clone();
        for i in 1..10 {
            s.poll(secs(t0, i as f64));
        }
        assert_eq!(s.timeline, before);
        s.poll(secs(t0, 10.0));
        assert_ne!(s.timeline, before);
    }

    #[test]
    fn category_cycles() {
        let mut s = session();
        s.cycle_category();
        assert_eq!(s.category, TimelineCategory::Memory);
        s.cycle_category();
        s.cycle_category();
        assert_eq!(s.category, TimelineCategory::Performance);
    }
}
