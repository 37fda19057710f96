use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::sleep;

/// What one GET against the target amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Response with a 2xx status.
    Success,
    /// Transport error, timeout, or non-2xx status.
    Failure,
}

/// Trait for the one capability the engine needs from an HTTP client:
/// perform a single GET with a bounded timeout and classify the result.
pub trait TargetProbe: Send + Sync {
    fn name(&self) -> &'static str;

    fn get<'a>(
        &'a self,
        target: &'a str,
    ) -> Pin<Box<dyn Future<Output = ProbeOutcome> + Send + 'a>>;
}

/// Production probe backed by a shared `reqwest::Client`. The client is
/// stateless per call, so one instance serves all concurrent workers.
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl TargetProbe for HttpProbe {
    fn name(&self) -> &'static str {
        "http"
    }

    fn get<'a>(
        &'a self,
        target: &'a str,
    ) -> Pin<Box<dyn Future<Output = ProbeOutcome> + Send + 'a>> {
        Box::pin(async move {
            // The body is dropped unread; reqwest releases the connection.
            match self.client.get(target).send().await {
                Ok(response) if response.status().is_success() => ProbeOutcome::Success,
                Ok(_) => ProbeOutcome::Failure,
                Err(_) => ProbeOutcome::Failure,
            }
        })
    }
}

/// Mock probe for testing: fixed outcome after a configurable delay.
pub struct MockProbe {
    outcome: ProbeOutcome,
    delay_ms: u64,
}

impl MockProbe {
    pub fn new(outcome: ProbeOutcome, delay_ms: u64) -> Self {
        Self { outcome, delay_ms }
    }
}

impl TargetProbe for MockProbe {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn get<'a>(
        &'a self,
        _target: &'a str,
    ) -> Pin<Box<dyn Future<Output = ProbeOutcome> + Send + 'a>> {
        Box::pin(async move {
            sleep(Duration::from_millis(self.delay_ms)).await;
            self.outcome
        })
    }
}

/// Probe that never completes, for exercising the stop ceiling against an
/// unresponsive target.
pub struct HangingProbe;

impl TargetProbe for HangingProbe {
    fn name(&self) -> &'static str {
        "hanging"
    }

    fn get<'a>(
        &'a self,
        _target: &'a str,
    ) -> Pin<Box<dyn Future<Output = ProbeOutcome> + Send + 'a>> {
        Box::pin(std::future::pending::<ProbeOutcome>())
    }
}
