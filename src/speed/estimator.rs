//! Trailing typing rate

use super::SampleRing;
use crate::config::SpeedConfig;
use chrono::{DateTime, Local, TimeZone};
use std::time::{Duration, Instant};

/// Number of intervals averaged by default
pub const DEFAULT_WINDOW: usize = 100;

/// Gaps at or above this are pauses rather than typing
pub const DEFAULT_SLOW_CUTOFF: Duration = Duration::from_secs(3);

/// Estimates keys per minute from the most recent inter-key intervals
#[derive(Debug, Clone)]
pub struct RateEstimator {
    /// Kept intervals in microseconds
    samples: SampleRing,
    slow_cutoff: Duration,
    /// When the previous key event arrived
    last_event: Instant,
}

impl RateEstimator {
    pub fn new(window: usize, slow_cutoff: Duration) -> Self {
        Self {
            samples: SampleRing::new(window),
            slow_cutoff,
            last_event: Instant::now(),
        }
    }

    pub fn from_config(config: &SpeedConfig) -> Self {
        Self::new(config.window, config.slow_cutoff())
    }

    /// Drop all samples and start timing from now
    pub fn init(&mut self) {
        self.init_at(Instant::now());
    }

    /// Drop all samples and start timing from `now`
    pub fn init_at(&mut self, now: Instant) {
        self.samples.clear();
        self.last_event = now;
    }

    /// Record a key event happening now.
    ///
    /// Returns whether the interval since the previous event was kept.
    pub fn record_event(&mut self) -> bool {
        self.record_event_at(Instant::now())
    }

    /// Record a key event at `now`.
    ///
    /// Intervals at or above the slow cutoff are discarded without a trace.
    /// The next interval is always measured from `now`.
    pub fn record_event_at(&mut self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_event);
        self.last_event = now;

        if elapsed >= self.slow_cutoff {
            return false;
        }
        self.samples.push(elapsed.as_micros() as u64);
        true
    }

    /// Number of intervals currently averaged
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Keys per minute over the kept intervals.
    ///
    /// 0.0 when there is nothing to average.
    pub fn current_rate(&self) -> f64 {
        let n = self.samples.len();
        let sum_us = self.samples.sum();
        if n == 0 || sum_us == 0 {
            return 0.0;
        }
        n as f64 / (sum_us as f64 / 1_000_000.0) * 60.0
    }
}

impl Default for RateEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW, DEFAULT_SLOW_CUTOFF)
    }
}

/// Current local time as `MM-DD HH:MM:SS`
pub fn format_now() -> String {
    format_timestamp(&Local::now())
}

/// Format a timestamp as `MM-DD HH:MM:SS` (24-hour)
pub fn format_timestamp<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format("%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn rate_is_zero_without_samples() {
        let est = RateEstimator::default();
        assert_eq!(est.sample_count(), 0);
        assert_eq!(est.current_rate(), 0.0);
    }

    #[test]
    fn constant_interval_rate() {
        let mut est = RateEstimator::default();
        let t0 = Instant::now();
        est.init_at(t0);
        for i in 1..=40 {
            assert!(est.record_event_at(t0 + ms(250) * i));
        }
        assert_eq!(est.sample_count(), 40);
        // 60 / 0.25s
        assert_close(est.current_rate(), 240.0);
    }

    #[test]
    fn slow_gap_is_discarded() {
        let mut est = RateEstimator::default();
        let t0 = Instant::now();
        est.init_at(t0);

        let mut now = t0;
        let mut kept = Vec::new();
        for gap in [500, 500, 4000, 500] {
            now += ms(gap);
            kept.push(est.record_event_at(now));
        }

        assert_eq!(kept, vec![true, true, false, true]);
        assert_eq!(est.sample_count(), 3);
        assert_close(est.current_rate(), 120.0);
    }

    #[test]
    fn cutoff_is_exclusive() {
        let mut est = RateEstimator::default();
        let t0 = Instant::now();
        est.init_at(t0);
        assert!(!est.record_event_at(t0 + DEFAULT_SLOW_CUTOFF));
        assert!(est.record_event_at(t0 + DEFAULT_SLOW_CUTOFF + ms(2999)));
        assert_eq!(est.sample_count(), 1);
    }

    #[test]
    fn window_keeps_most_recent_samples() {
        let mut est = RateEstimator::new(10, DEFAULT_SLOW_CUTOFF);
        let t0 = Instant::now();
        est.init_at(t0);

        let mut now = t0;
        // 10 slow-ish intervals, then 10 fast ones replace them all
        for _ in 0..10 {
            now += ms(1000);
            est.record_event_at(now);
        }
        assert_close(est.current_rate(), 60.0);
        for _ in 0..10 {
            now += ms(100);
            est.record_event_at(now);
        }
        assert_eq!(est.sample_count(), 10);
        assert_close(est.current_rate(), 600.0);
    }

    #[test]
    fn init_clears_samples() {
        let mut est = RateEstimator::default();
        let t0 = Instant::now();
        est.init_at(t0);
        est.record_event_at(t0 + ms(100));
        est.init_at(t0 + ms(200));
        assert_eq!(est.sample_count(), 0);
        assert_eq!(est.current_rate(), 0.0);
    }

    #[test]
    fn from_config_uses_window_and_cutoff() {
        let config = SpeedConfig {
            window: 2,
            slow_cutoff_ms: 100,
        };
        let mut est = RateEstimator::from_config(&config);
        let t0 = Instant::now();
        est.init_at(t0);
        assert!(!est.record_event_at(t0 + ms(150)));
        for i in 1..=3 {
            est.record_event_at(t0 + ms(150) + ms(50) * i);
        }
        assert_eq!(est.sample_count(), 2);
    }

    #[test]
    fn timestamp_format() {
        let time = Utc.with_ymd_and_hms(2024, 3, 7, 21, 5, 9).unwrap();
        assert_eq!(format_timestamp(&time), "03-07 21:05:09");
        assert_eq!(format_now().len(), "MM-DD HH:MM:SS".len());
    }
}
