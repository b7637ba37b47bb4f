//! Where a session's data comes from: the live host or the synthetic generator.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use futures::future::BoxFuture;
use hostwatch_core::synthetic::{
    evolve, generate_processes, generate_resource_sample, generate_timeline,
    simulated_system_info,
};
use hostwatch_core::{ProcessRecord, ResourceSample, SystemInfo, TimelineSnapshot};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::SampleError;
use crate::metrics::MetricSampler;
use crate::processes::ProcessEnumerator;

pub trait TelemetrySource: Send {
    fn system_info(&mut self) -> Result<SystemInfo, SampleError>;

    fn resource_sample(&mut self) -> Result<ResourceSample, SampleError>;

    /// Never fails: enumeration errors come back as an empty snapshot.
    fn processes(&mut self) -> BoxFuture<'_, Vec<ProcessRecord>>;

    fn timeline(&mut self) -> TimelineSnapshot;
}

pub struct LiveTelemetry {
    sampler: MetricSampler,
    enumerator: Arc<ProcessEnumerator>,
    rng: StdRng,
}

impl LiveTelemetry {
    pub fn new(enumerator: Arc<ProcessEnumerator>) -> Self {
        Self {
            sampler: MetricSampler::new(),
            enumerator,
            rng: StdRng::from_entropy(),
        }
    }
}

impl TelemetrySource for LiveTelemetry {
    fn system_info(&mut self) -> Result<SystemInfo, SampleError> {
        self.sampler.system_info()
    }

    fn resource_sample(&mut self) -> Result<ResourceSample, SampleError> {
        self.sampler.resource_usage()
    }

    fn processes(&mut self) -> BoxFuture<'_, Vec<ProcessRecord>> {
        let enumerator = Arc::clone(&self.enumerator);
        Box::pin(async move { enumerator.list_or_empty().await })
    }

    // There is no live source for timelines; they are always synthetic.
    fn timeline(&mut self) -> TimelineSnapshot {
        generate_timeline(&mut self.rng)
    }
}

/// Agent-side simulation (`--simulate`): same schedule, fabricated payloads.
pub struct SyntheticTelemetry {
    rng: StdRng,
    processes: Vec<ProcessRecord>,
}

impl SyntheticTelemetry {
    pub fn new(mut rng: StdRng) -> Self {
        let processes = generate_processes(&mut rng);
        Self { rng, processes }
    }
}

impl Default for SyntheticTelemetry {
    fn default() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl TelemetrySource for SyntheticTelemetry {
    fn system_info(&mut self) -> Result<SystemInfo, SampleError> {
        Ok(simulated_system_info())
    }

    fn resource_sample(&mut self) -> Result<ResourceSample, SampleError> {
        let t = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
        Ok(generate_resource_sample(&mut self.rng, t))
    }

    fn processes(&mut self) -> BoxFuture<'_, Vec<ProcessRecord>> {
        evolve(&mut self.processes, &mut self.rng);
        let snapshot = self.processes.clone();
        Box::pin(async move { snapshot })
    }

    fn timeline(&mut self) -> TimelineSnapshot {
        generate_timeline(&mut self.rng)
    }
}
