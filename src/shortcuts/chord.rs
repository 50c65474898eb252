use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::trace;

/// Default window between the chord prefix and its follow-up key
pub const DEFAULT_CHORD_TIMEOUT: Duration = Duration::from_millis(1000);

/// Source of "now" for chord timing
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_ms(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// A single cancellable one-shot deadline.
///
/// Scheduling replaces whatever was pending, so an older deadline can never
/// fire after a newer one was set.
#[derive(Debug, Default)]
pub struct ChordTimer {
    deadline: Option<Instant>,
    generation: u64,
}

impl ChordTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: Instant, window: Duration) {
        self.generation += 1;
        self.deadline = Some(now + window);
        trace!(
            "ChordTimer: scheduled generation {} in {}ms",
            self.generation,
            window.as_millis()
        );
    }

    pub fn cancel(&mut self) {
        if self.deadline.take().is_some() {
            trace!("ChordTimer: cancelled generation {}", self.generation);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Fire the timer if its deadline has been reached. Fires at most once.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                trace!("ChordTimer: generation {} fired", self.generation);
                true
            }
            _ => false,
        }
    }
}

/// Idle/Armed chord state plus the timer that disarms it
#[derive(Debug)]
pub struct ChordState {
    armed: bool,
    timer: ChordTimer,
    window: Duration,
}

impl ChordState {
    pub fn new(window: Duration) -> Self {
        Self {
            armed: false,
            timer: ChordTimer::new(),
            window,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Idle -> Armed, restarting the timer
    pub fn arm(&mut self, now: Instant) {
        self.armed = true;
        self.timer.cancel();
        self.timer.schedule(now, self.window);
    }

    /// Armed -> Idle after a chord was consumed
    pub fn disarm(&mut self) {
        self.armed = false;
        self.timer.cancel();
    }

    /// Run the timer. Returns true if this call disarmed the prefix.
    pub fn expire_if_due(&mut self, now: Instant) -> bool {
        if self.timer.fire_if_due(now) && self.armed {
            self.armed = false;
            return true;
        }
        false
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.timer.remaining(now)
    }

    pub fn timer(&self) -> &ChordTimer {
        &self.timer
    }
}

impl Default for ChordState {
    fn default() -> Self {
        Self::new(DEFAULT_CHORD_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let other = clock.clone();
        let start = clock.now();
        other.advance_ms(250);
        assert_eq!(clock.now() - start, Duration::from_millis(250));
    }

    #[test]
    fn test_timer_fires_once_at_deadline() {
        let clock = ManualClock::new();
        let mut timer = ChordTimer::new();
        timer.schedule(clock.now(), Duration::from_millis(100));

        clock.advance_ms(99);
        assert!(!timer.fire_if_due(clock.now()));

        clock.advance_ms(1);
        assert!(timer.fire_if_due(clock.now()));
        assert!(!timer.fire_if_due(clock.now()));
        assert!(!timer.is_pending());
    }

    #[test]
    fn test_reschedule_replaces_pending_deadline() {
        let clock = ManualClock::new();
        let mut timer = ChordTimer::new();
        timer.schedule(clock.now(), Duration::from_millis(100));
        clock.advance_ms(80);
        timer.schedule(clock.now(), Duration::from_millis(100));

        // The first deadline would have been reached here
        clock.advance_ms(30);
        assert!(!timer.fire_if_due(clock.now()));
        assert_eq!(timer.generation(), 2);

        clock.advance_ms(70);
        assert!(timer.fire_if_due(clock.now()));
    }

    #[test]
    fn test_cancel_prevents_firing() {
        let clock = ManualClock::new();
        let mut timer = ChordTimer::new();
        timer.schedule(clock.now(), Duration::from_millis(10));
        timer.cancel();
        clock.advance_ms(50);
        assert!(!timer.fire_if_due(clock.now()));
    }

    #[test]
    fn test_chord_state_expires() {
        let clock = ManualClock::new();
        let mut state = ChordState::new(Duration::from_millis(1000));
        state.arm(clock.now());
        assert!(state.is_armed());
        assert_eq!(state.remaining(clock.now()), Some(Duration::from_millis(1000)));

        clock.advance_ms(1001);
        assert!(state.expire_if_due(clock.now()));
        assert!(!state.is_armed());
        assert!(state.deadline().is_none());
    }

    #[test]
    fn test_disarm_cancels_timer() {
        let clock = ManualClock::new();
        let mut state = ChordState::default();
        state.arm(clock.now());
        state.disarm();
        assert!(!state.timer().is_pending());
        clock.advance_ms(5000);
        assert!(!state.expire_if_due(clock.now()));
    }
}
