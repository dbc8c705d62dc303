use std::time::{Duration, Instant};

/// Fixed-period tick source for timer-driven redraws.
///
/// Deadlines stay on the start grid: a late poll fires once and the next
/// deadline is the first grid point after `now`. Missed ticks are dropped
/// rather than replayed.
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    period: Duration,
    next: Instant,
    fired: u64,
}

impl IntervalTimer {
    /// Creates a timer whose first tick is due at `start`.
    pub fn new(period: Duration, start: Instant) -> Self {
        debug_assert!(!period.is_zero());
        Self {
            period: period.max(Duration::from_millis(1)),
            next: start,
            fired: 0,
        }
    }

    #[inline]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// When the next tick is due.
    #[inline]
    pub fn deadline(&self) -> Instant {
        self.next
    }

    /// Number of ticks fired so far.
    #[inline]
    pub fn fired(&self) -> u64 {
        self.fired
    }

    /// Returns `true` if a tick is due at `now`, advancing the deadline.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }

        let behind = now.saturating_duration_since(self.next);
        let skipped = (behind.as_nanos() / self.period.as_nanos()) as u32;
        self.next += self.period * (skipped + 1);
        self.fired += 1;

        if skipped > 0 {
            log::trace!("interval timer skipped {skipped} tick(s)");
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEC: Duration = Duration::from_secs(1);

    #[test]
    fn first_tick_is_due_at_start() {
        let t0 = Instant::now();
        let mut timer = IntervalTimer::new(SEC, t0);
        assert!(timer.poll(t0));
        assert_eq!(timer.deadline(), t0 + SEC);
    }

    #[test]
    fn does_not_fire_early() {
        let t0 = Instant::now();
        let mut timer = IntervalTimer::new(SEC, t0);
        timer.poll(t0);
        assert!(!timer.poll(t0 + Duration::from_millis(999)));
        assert!(timer.poll(t0 + SEC));
        assert_eq!(timer.fired(), 2);
    }

    #[test]
    fn late_poll_fires_once_and_stays_on_grid() {
        let t0 = Instant::now();
        let mut timer = IntervalTimer::new(SEC, t0);
        timer.poll(t0);

        assert!(timer.poll(t0 + Duration::from_millis(3500)));
        assert_eq!(timer.deadline(), t0 + 4 * SEC);
        assert!(!timer.poll(t0 + Duration::from_millis(3900)));
        assert_eq!(timer.fired(), 2);
    }
}
