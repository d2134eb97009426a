use std::{future::Future, time::Duration};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Suspends the watcher between status checks.
pub trait Pacer {
    fn sleep_interval(&self, interval: Duration) -> impl Future<Output = ()> + Send;
}

/// Pacer backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SleepPacer;

impl Pacer for SleepPacer {
    async fn sleep_interval(&self, interval: Duration) { tokio::time::sleep(interval).await }
}

/// Resolve the pacing interval from a number of seconds.
///
/// The result is never shorter than 1ms. Missing or non-numeric input paces at 1s.
pub fn parse_interval(value: Option<&str>) -> Duration {
    let Some(secs) = value.and_then(|v| v.trim().parse::<f64>().ok()).filter(|v| v.is_finite())
    else {
        return DEFAULT_INTERVAL;
    };
    Duration::from_millis((secs * 1000.0).floor().max(1.0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_interval() {
        let cases: &[(Option<&str>, u64)] = &[
            (None, 1000),
            (Some(""), 1000),
            (Some("abc"), 1000),
            (Some("NaN"), 1000),
            (Some("inf"), 1000),
            (Some("0"), 1),
            (Some("-3"), 1),
            (Some("0.0001"), 1),
            (Some("0.25"), 250),
            (Some("1"), 1000),
            (Some(" 2.5 "), 2500),
            (Some("10"), 10_000),
        ];
        for &(input, expected) in cases {
            assert_eq!(parse_interval(input), Duration::from_millis(expected), "{input:?}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_pacer_waits() {
        let start = tokio::time::Instant::now();
        SleepPacer.sleep_interval(Duration::from_millis(1500)).await;
        assert!(start.elapsed() >= Duration::from_millis(1500));
    }
}
