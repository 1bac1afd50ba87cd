use core::cell::Cell;
use std::rc::Rc;

use embassy_time::{Duration, Instant};

/// Monotonic time source injected into every time-dependent stage.
pub trait Clock {
    fn now(&self) -> Instant;
}

pub type SharedClock = Rc<dyn Clock>;

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn shared() -> SharedClock {
        Rc::new(SystemClock)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Virtual clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now_us: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(&self) -> SharedClock {
        Rc::new(self.clone())
    }

    pub fn advance(&self, by: Duration) {
        self.now_us
            .set(self.now_us.get().saturating_add(by.as_micros()));
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Never moves backwards.
    pub fn set_us(&self, now_us: u64) {
        self.now_us.set(self.now_us.get().max(now_us));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        Instant::from_micros(self.now_us.get())
    }
}

/// Records the instant of its last tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stopwatch {
    last_tick: Instant,
}

impl Stopwatch {
    pub fn started(now: Instant) -> Self {
        Self { last_tick: now }
    }

    pub fn tick(&mut self, now: Instant) {
        self.last_tick = now;
    }

    pub fn last_tick(&self) -> Instant {
        self.last_tick
    }

    pub fn since_tick(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_tick)
    }

    pub fn ms_since_tick(&self, now: Instant) -> u64 {
        self.since_tick(now).as_millis()
    }

    /// Absolute distance between the last ticks of two stopwatches.
    pub fn between(a: &Stopwatch, b: &Stopwatch) -> Duration {
        if a.last_tick >= b.last_tick {
            a.last_tick.saturating_duration_since(b.last_tick)
        } else {
            b.last_tick.saturating_duration_since(a.last_tick)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_never_runs_backwards() {
        let clock = SystemClock::shared();
        let mut previous = clock.now();
        for _ in 0..100 {
            let next = clock.now();
            assert!(next >= previous);
            previous = next;
        }
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let shared = clock.shared();
        clock.advance_ms(25);
        assert_eq!(shared.now().as_millis(), 25);
    }

    #[test]
    fn manual_clock_never_moves_backwards() {
        let clock = ManualClock::new();
        clock.set_us(5_000);
        clock.set_us(1_000);
        assert_eq!(clock.now().as_micros(), 5_000);
    }

    #[test]
    fn stopwatch_measures_since_tick_and_between() {
        let clock = ManualClock::new();
        let mut first = Stopwatch::started(clock.now());
        clock.advance_ms(40);
        let second = Stopwatch::started(clock.now());
        assert_eq!(first.ms_since_tick(clock.now()), 40);
        assert_eq!(Stopwatch::between(&first, &second).as_millis(), 40);
        assert_eq!(Stopwatch::between(&second, &first).as_millis(), 40);

        first.tick(clock.now());
        assert_eq!(first.ms_since_tick(clock.now()), 0);
    }
}
