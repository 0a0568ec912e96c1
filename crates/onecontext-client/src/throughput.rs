//! Ad hoc load testing: fire N copies of one call and report the rate.

use std::future::Future;
use std::time::{
    Duration,
    Instant,
};

use futures::future::join_all;

/// Timing summary for one [`run_many`] batch.
#[derive(Debug, Clone)]
pub struct ThroughputReport {
    pub calls: usize,
    pub failures: usize,
    pub elapsed: Duration,
}

impl ThroughputReport {
    pub fn calls_per_second(&self) -> f64 {
        let seconds = self.elapsed.as_secs_f64();
        if seconds == 0.0 {
            return self.calls as f64;
        }
        self.calls as f64 / seconds
    }
}

/// Issues `n` concurrent copies of the same call and reports wall-clock
/// throughput alongside the individual results.
pub async fn run_many<F, Fut, T, E>(n: usize, make_call: F) -> (Vec<Result<T, E>>, ThroughputReport)
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let started = Instant::now();
    let results = join_all((0..n).map(|_| make_call())).await;
    let elapsed = started.elapsed();

    let failures = results.iter().filter(|result| result.is_err()).count();
    let report = ThroughputReport {
        calls: n,
        failures,
        elapsed,
    };

    tracing::info!(
        calls = report.calls,
        failures = report.failures,
        elapsed_ms = report.elapsed.as_millis() as u64,
        rate = format!("{:.2}/s", report.calls_per_second()),
        "throughput run complete"
    );

    (results, report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_many_counts_failures() {
        let counter = std::sync::atomic::AtomicUsize::new(0);

        let (results, report) = run_many(4, || async {
            let i = counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if i % 2 == 0 {
                Ok(i)
            } else {
                Err("odd one out")
            }
        })
        .await;

        assert_eq!(results.len(), 4);
        assert_eq!(report.calls, 4);
        assert_eq!(report.failures, 2);
    }

    #[tokio::test]
    async fn test_rate_is_finite_for_instant_calls() {
        let (_, report) = run_many(10, || async { Ok::<_, ()>(()) }).await;
        assert!(report.calls_per_second().is_finite());
        assert_eq!(report.failures, 0);
    }
}
