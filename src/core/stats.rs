//! Feed statistics: tick rates and discard counters

use std::collections::BTreeMap;

/// Counts ticks and reports a rate once per interval, then resets.
pub struct RateMeter {
    interval: f64,
    count: u64,
    last_report: f64,
    last_rate: f64,
}

impl RateMeter {
    /// `interval` and `now` are in seconds
    pub fn new(interval: f64, now: f64) -> Self {
        Self {
            interval,
            count: 0,
            last_report: now,
            last_rate: 0.0,
        }
    }

    pub fn tick(&mut self) {
        self.count += 1;
    }

    /// Returns the rate when at least one interval has elapsed since the last report
    pub fn poll(&mut self, now: f64) -> Option<f64> {
        let elapsed = now - self.last_report;
        if elapsed < self.interval || elapsed <= 0.0 {
            return None;
        }
        self.last_rate = self.count as f64 / elapsed;
        self.count = 0;
        self.last_report = now;
        Some(self.last_rate)
    }

    /// Most recently reported rate
    pub fn rate(&self) -> f64 {
        self.last_rate
    }
}

/// Fixed-rate tick schedule driven by an irregular repaint loop.
///
/// Repaints triggered by input fall between ticks and are not counted.
pub struct TickSchedule {
    period: f64,
    next: f64,
}

impl TickSchedule {
    /// Timers may fire this early and still count as on time
    const SLACK: f64 = 0.002;

    pub fn new(hz: f64, now: f64) -> Self {
        Self {
            period: 1.0 / hz,
            next: now,
        }
    }

    /// True when a tick is due at `now`; schedules the next one
    pub fn due(&mut self, now: f64) -> bool {
        if now + Self::SLACK < self.next {
            return false;
        }
        self.next = now + self.period;
        true
    }

    /// Time left until the next tick
    pub fn remaining(&self, now: f64) -> f64 {
        (self.next - now).max(0.0)
    }
}

/// Running totals for one consumer
#[derive(Default, Debug, Clone)]
pub struct FeedStats {
    /// Payloads pulled from the socket
    pub received: u64,
    /// Frames that reached the accumulator/scene
    pub applied: u64,
    /// Particle count of the most recent applied frame
    pub last_particles: usize,
    discarded: BTreeMap<&'static str, u64>,
}

impl FeedStats {
    pub fn record_discard(&mut self, reason: &'static str) {
        *self.discarded.entry(reason).or_insert(0) += 1;
    }

    pub fn record_applied(&mut self, particles: usize) {
        self.applied += 1;
        self.last_particles = particles;
    }

    pub fn discarded_total(&self) -> u64 {
        self.discarded.values().sum()
    }

    /// Discard counts keyed by reason, in stable order
    pub fn discards(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        self.discarded.iter().map(|(&k, &v)| (k, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_meter_reports_after_interval() {
        let mut meter = RateMeter::new(1.0, 0.0);
        for _ in 0..30 {
            meter.tick();
        }
        assert_eq!(meter.poll(0.5), None);
        assert_eq!(meter.poll(1.5), Some(20.0));
        // Reset after reporting
        assert_eq!(meter.poll(2.6), Some(0.0));
        assert_eq!(meter.rate(), 0.0);
    }

    #[test]
    fn test_tick_schedule_ignores_extra_repaints() {
        let mut schedule = TickSchedule::new(60.0, 0.0);
        let mut meter = RateMeter::new(1.0, 0.0);
        // Input-driven repaints at 240 Hz for one second
        for i in 0..=240 {
            if schedule.due(i as f64 / 240.0) {
                meter.tick();
            }
        }
        let rate = meter.poll(1.0 + 1e-9).unwrap();
        assert!((55.0..=61.0).contains(&rate), "rate = {}", rate);
    }

    #[test]
    fn test_tick_schedule_tolerates_early_timer() {
        let mut schedule = TickSchedule::new(60.0, 0.0);
        assert!(schedule.due(0.0));
        assert!(!schedule.due(0.005));
        assert!((schedule.remaining(0.005) - (1.0 / 60.0 - 0.005)).abs() < 1e-9);
        // One millisecond early still ticks
        assert!(schedule.due(1.0 / 60.0 - 0.001));
        assert_eq!(schedule.remaining(10.0), 0.0);
    }

    #[test]
    fn test_feed_stats_discards() {
        let mut stats = FeedStats::default();
        stats.record_discard("too_short");
        stats.record_discard("too_short");
        stats.record_discard("ragged");
        stats.record_applied(12);

        assert_eq!(stats.discarded_total(), 3);
        assert_eq!(stats.last_particles, 12);
        let reasons: Vec<_> = stats.discards().collect();
        assert_eq!(reasons, vec![("ragged", 1), ("too_short", 2)]);
    }
}
