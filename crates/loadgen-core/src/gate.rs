use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::{timeout_at, Instant};

/// Fixed-capacity admission gate bounding in-flight requests.
///
/// No fairness guarantee: a saturated gate sheds, it does not queue.
#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl ConcurrencyGate {
    pub fn new(capacity: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Non-blocking admission; `None` means the gate is saturated.
    pub fn try_acquire(&self) -> Option<OwnedSemaphorePermit> {
        self.permits.clone().try_acquire_owned().ok()
    }

    /// Blocking admission with a deadline, used only by the shutdown drain.
    pub async fn acquire_until(&self, deadline: Instant) -> Option<OwnedSemaphorePermit> {
        match timeout_at(deadline, self.permits.clone().acquire_owned()).await {
            Ok(Ok(permit)) => Some(permit),
            _ => None,
        }
    }

    /// Reclaim every permit one at a time, acting as a completion barrier
    /// for in-flight work. Returns how many permits were still outstanding
    /// when the deadline passed; zero means a clean drain.
    pub async fn drain(&self, deadline: Instant) -> usize {
        let mut reclaimed = Vec::with_capacity(self.capacity);
        for _ in 0..self.capacity {
            match self.acquire_until(deadline).await {
                Some(permit) => reclaimed.push(permit),
                None => break,
            }
        }
        self.capacity - reclaimed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_gate_exhausts_at_capacity() {
        let gate = ConcurrencyGate::new(2);

        let first = gate.try_acquire();
        let second = gate.try_acquire();
        assert!(first.is_some());
        assert!(second.is_some());
        assert!(gate.try_acquire().is_none());

        drop(first);
        assert!(gate.try_acquire().is_some());
    }

    #[tokio::test]
    async fn test_drain_reports_outstanding_permits() {
        let gate = ConcurrencyGate::new(2);

        // One permit held past the deadline simulates a stuck request.
        let held = gate.try_acquire().unwrap();

        let deadline = Instant::now() + Duration::from_millis(50);
        let outstanding = gate.drain(deadline).await;
        assert_eq!(outstanding, 1);

        drop(held);
    }

    #[tokio::test]
    async fn test_drain_is_clean_when_nothing_in_flight() {
        let gate = ConcurrencyGate::new(4);
        let deadline = Instant::now() + Duration::from_millis(50);
        assert_eq!(gate.drain(deadline).await, 0);
    }
}
