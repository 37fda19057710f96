use std::sync::atomic::{AtomicU64, Ordering};

/// Outcome counters shared by every in-flight request of a run.
///
/// `total` is bumped before the request goes out and exactly one of
/// `success`/`failure` lands when the outcome is known, so a concurrent
/// reader may see `total > success + failure` but never the reverse.
#[derive(Debug, Default)]
pub struct Counters {
    total: AtomicU64,
    success: AtomicU64,
    failure: AtomicU64,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterView {
    pub total: u64,
    pub success: u64,
    pub failure: u64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero all counters at the start of a new run.
    pub fn reset(&self) {
        self.total.store(0, Ordering::SeqCst);
        self.success.store(0, Ordering::SeqCst);
        self.failure.store(0, Ordering::SeqCst);
    }

    pub fn record_dispatched(&self) {
        self.total.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_success(&self) {
        self.success.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_failure(&self) {
        self.failure.fetch_add(1, Ordering::SeqCst);
    }

    /// A shed tick counts as a dispatched request that failed.
    pub fn record_shed(&self) {
        self.record_dispatched();
        self.record_failure();
    }

    pub fn view(&self) -> CounterView {
        // Outcomes first, total last: every outcome increment is preceded
        // by its total increment, so a later total load covers every
        // outcome already observed and the view never reports
        // total < success + failure.
        let success = self.success.load(Ordering::SeqCst);
        let failure = self.failure.load(Ordering::SeqCst);
        let total = self.total.load(Ordering::SeqCst);
        CounterView {
            total,
            success,
            failure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_concurrent_increments_are_not_lost() {
        let counters = Arc::new(Counters::new());
        let mut handles = Vec::new();

        for _ in 0..8 {
            let counters = counters.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..1000 {
                    counters.record_dispatched();
                    counters.record_success();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let view = counters.view();
        assert_eq!(view.total, 8000);
        assert_eq!(view.success, 8000);
        assert_eq!(view.failure, 0);
    }

    #[test]
    fn test_view_never_reports_total_behind_outcomes() {
        let counters = Arc::new(Counters::new());
        let done = Arc::new(std::sync::atomic::AtomicBool::new(false));

        let mut writers = Vec::new();
        for _ in 0..4 {
            let counters = counters.clone();
            let done = done.clone();
            writers.push(std::thread::spawn(move || {
                while !done.load(Ordering::Relaxed) {
                    counters.record_dispatched();
                    counters.record_success();
                }
            }));
        }

        for _ in 0..5_000_000u64 {
            let view = counters.view();
            assert!(
                view.total >= view.success + view.failure,
                "torn view: total={} success={} failure={}",
                view.total,
                view.success,
                view.failure
            );
        }

        done.store(true, Ordering::Relaxed);
        for writer in writers {
            writer.join().unwrap();
        }
    }

    #[test]
    fn test_reset_zeroes_everything() {
        let counters = Counters::new();
        counters.record_shed();
        counters.record_dispatched();
        counters.record_success();

        counters.reset();

        let view = counters.view();
        assert_eq!(view.total, 0);
        assert_eq!(view.success, 0);
        assert_eq!(view.failure, 0);
    }

    #[test]
    fn test_shed_counts_as_failed_dispatch() {
        let counters = Counters::new();
        counters.record_shed();

        let view = counters.view();
        assert_eq!(view.total, 1);
        assert_eq!(view.failure, 1);
        assert_eq!(view.success, 0);
    }
}
