use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::{ConfigError, RunConfig, Settings};
use crate::counters::Counters;
use crate::gate::ConcurrencyGate;
use crate::probe::{HttpProbe, TargetProbe};
use crate::scheduler::RateScheduler;
use crate::stats::{project, StatsSnapshot};

/// Why a start request was rejected.
#[derive(Debug, thiserror::Error)]
pub enum StartError {
    #[error("load generation already active")]
    AlreadyActive,
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
}

/// Final counter values handed back by `stop`.
///
/// A lower bound rather than a true final value: workers abandoned past
/// the drain ceiling may still land late counter updates afterwards.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopSummary {
    pub total_requests: u64,
    pub success_count: u64,
    pub fail_count: u64,
}

struct ActiveRun {
    config: RunConfig,
    started_at: Instant,
    cancel: CancellationToken,
    scheduler: JoinHandle<()>,
}

#[derive(Default)]
struct RunState {
    active: Option<ActiveRun>,
    // Retained after stop so status keeps reporting the last target rate.
    last_rps: u32,
}

/// Single source of truth for "is a run active". Owns the counters, the
/// shared probe, and the active run's cancellation switch; serializes
/// start/stop under the write lock while snapshots take the read lock.
pub struct RunController {
    settings: Settings,
    probe: Arc<dyn TargetProbe>,
    counters: Arc<Counters>,
    state: RwLock<RunState>,
}

impl RunController {
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let probe = Arc::new(HttpProbe::new(settings.request_timeout())?);
        Ok(Self::with_probe(settings, probe))
    }

    /// Build a controller around an arbitrary probe (mocks in tests).
    pub fn with_probe(settings: Settings, probe: Arc<dyn TargetProbe>) -> Self {
        info!("Using probe: {}", probe.name());
        Self {
            settings,
            probe,
            counters: Arc::new(Counters::new()),
            state: RwLock::new(RunState::default()),
        }
    }

    /// Begin a run. Returns immediately once the scheduler is spawned;
    /// does not wait for the first request to go out.
    pub async fn start(&self, config: RunConfig) -> Result<(), StartError> {
        config.validate()?;

        let mut state = self.state.write().await;
        if state.active.is_some() {
            return Err(StartError::AlreadyActive);
        }

        self.counters.reset();

        let cancel = CancellationToken::new();
        let gate = ConcurrencyGate::new(self.settings.max_in_flight);
        let scheduler = RateScheduler::new(
            config.clone(),
            self.probe.clone(),
            self.counters.clone(),
            gate,
            self.settings.stop_grace(),
        );
        let handle = tokio::spawn(scheduler.run(cancel.clone()));

        info!(rps = config.rps, target = %config.target, "load generation started");

        state.last_rps = config.rps;
        state.active = Some(ActiveRun {
            config,
            started_at: Instant::now(),
            cancel,
            scheduler: handle,
        });
        Ok(())
    }

    /// End the active run, waiting up to the grace ceiling for the drain.
    /// Idempotent: stopping while inactive returns the current counters
    /// untouched.
    pub async fn stop(&self) -> StopSummary {
        let mut state = self.state.write().await;
        if let Some(run) = state.active.take() {
            run.cancel.cancel();
            match timeout(self.settings.stop_grace(), run.scheduler).await {
                Ok(_) => info!("load generation stopped"),
                Err(_) => {
                    // Dropping the join handle detaches the scheduler; it
                    // finishes its drain on its own and is not waited for.
                    warn!("stop grace elapsed before drain completed; abandoning in-flight requests");
                }
            }
        }

        let view = self.counters.view();
        StopSummary {
            total_requests: view.total,
            success_count: view.success,
            fail_count: view.failure,
        }
    }

    /// Read-only statistics projection; safe concurrently with everything.
    pub async fn snapshot(&self) -> StatsSnapshot {
        let state = self.state.read().await;
        let view = self.counters.view();
        match state.active.as_ref() {
            Some(run) => project(true, run.config.rps, run.started_at.elapsed(), view),
            None => project(false, state.last_rps, Duration::ZERO, view),
        }
    }
}
