use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::RunConfig;
use crate::counters::Counters;
use crate::gate::ConcurrencyGate;
use crate::probe::{ProbeOutcome, TargetProbe};

/// Periodic dispatch loop for one run: fires at `1s / rps`, admits one
/// worker per tick through the gate, and sheds ticks the gate rejects.
pub struct RateScheduler {
    config: RunConfig,
    probe: Arc<dyn TargetProbe>,
    counters: Arc<Counters>,
    gate: ConcurrencyGate,
    drain_budget: Duration,
}

impl RateScheduler {
    pub fn new(
        config: RunConfig,
        probe: Arc<dyn TargetProbe>,
        counters: Arc<Counters>,
        gate: ConcurrencyGate,
        drain_budget: Duration,
    ) -> Self {
        Self {
            config,
            probe,
            counters,
            gate,
            drain_budget,
        }
    }

    /// Run until cancelled, then drain in-flight workers.
    pub async fn run(self, cancel: CancellationToken) {
        let period = self.config.tick_interval();
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => self.dispatch(),
            }
        }

        // Re-acquiring every permit is a barrier: each acquisition succeeds
        // only once the corresponding in-flight worker has released it.
        let deadline = Instant::now() + self.drain_budget;
        let abandoned = self.gate.drain(deadline).await;
        if abandoned > 0 {
            info!(
                abandoned,
                "drain ceiling reached with requests still in flight"
            );
        } else {
            debug!("scheduler drained cleanly");
        }
    }

    fn dispatch(&self) {
        match self.gate.try_acquire() {
            Some(permit) => {
                let probe = self.probe.clone();
                let counters = self.counters.clone();
                let target = self.config.target.clone();
                tokio::spawn(async move {
                    counters.record_dispatched();
                    match probe.get(&target).await {
                        ProbeOutcome::Success => counters.record_success(),
                        ProbeOutcome::Failure => counters.record_failure(),
                    }
                    drop(permit);
                });
            }
            // Saturated gate: shed the tick, never queue it.
            None => self.counters.record_shed(),
        }
    }
}
