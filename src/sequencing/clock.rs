//! Time sources for the scheduler.
//!
//! Two clocks are involved in playback:
//!
//! - the **audio clock**, a monotonic count of seconds derived from rendered
//!   frames. Precise, never resets, and the timebase for every start time.
//! - the **execution timer**, the host's coarse wall-clock loop that decides
//!   *when* the scheduler gets to run. It jitters and can stall for long
//!   stretches, so it is only ever used to trigger polls, never to compute
//!   musical time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A monotonic source of audio-clock time in seconds.
///
/// Implementations are assumed monotonic. A clock that jumps backwards is a
/// host bug; the scheduler does not clamp it.
pub trait AudioClock: Send {
    fn now(&self) -> f64;
}

/// Audio clock driven by the audio callback.
///
/// The audio thread calls [`SampleClock::advance`] after every rendered block;
/// any clone reads the same frame counter.
#[derive(Debug, Clone)]
pub struct SampleClock {
    frames: Arc<AtomicU64>,
    sample_rate: f64,
}

impl SampleClock {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            frames: Arc::new(AtomicU64::new(0)),
            sample_rate,
        }
    }

    /// Record that `frames` more frames have been rendered
    #[inline]
    pub fn advance(&self, frames: u64) {
        self.frames.fetch_add(frames, Ordering::Release);
    }

    /// Total frames rendered since the clock was created
    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Convert an audio-clock time to an absolute frame index
    #[inline]
    pub fn frame_at(&self, seconds: f64) -> u64 {
        (seconds * self.sample_rate).round().max(0.0) as u64
    }
}

impl AudioClock for SampleClock {
    fn now(&self) -> f64 {
        self.frames() as f64 / self.sample_rate
    }
}

/// Settable clock for tests and offline rendering.
///
/// Stores the current time as `f64` bits so clones stay in sync.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    bits: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(start.to_bits())),
        }
    }

    pub fn set(&self, seconds: f64) {
        self.bits.store(seconds.to_bits(), Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: f64) {
        self.set(self.now() + seconds);
    }
}

impl AudioClock for ManualClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }
}

/// Coarse recurring timer for the scheduler poll.
///
/// Holds only the next due instant; dropping it cancels the recurrence.
#[derive(Debug, Clone, Copy)]
pub struct PollTimer {
    interval: Duration,
    next_due: Instant,
}

impl PollTimer {
    /// Arm a timer whose first firing is one interval after `now`
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next_due: now + interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next_due
    }

    /// Schedule the next firing relative to `now`.
    ///
    /// Re-arming from the firing time rather than the previous due time means
    /// a stalled host gets one catch-up poll, not a burst of them.
    pub fn rearm(&mut self, now: Instant) {
        self.next_due = now + self.interval;
    }

    /// Time left until the timer fires (zero if already due)
    pub fn remaining(&self, now: Instant) -> Duration {
        self.next_due.saturating_duration_since(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_clock_counts_seconds() {
        let clock = SampleClock::new(48_000.0);
        let reader = clock.clone();

        clock.advance(24_000);
        assert_eq!(reader.now(), 0.5);

        clock.advance(24_000);
        assert_eq!(reader.frames(), 48_000);
        assert_eq!(reader.now(), 1.0);
    }

    #[test]
    fn sample_clock_frame_conversion() {
        let clock = SampleClock::new(44_100.0);
        assert_eq!(clock.frame_at(1.0), 44_100);
        assert_eq!(clock.frame_at(0.5), 22_050);
        assert_eq!(clock.frame_at(-1.0), 0);
    }

    #[test]
    fn manual_clock_is_shared_between_clones() {
        let clock = ManualClock::new(10.0);
        let other = clock.clone();

        clock.advance(0.25);
        assert_eq!(other.now(), 10.25);

        other.set(3.0);
        assert_eq!(clock.now(), 3.0);
    }

    #[test]
    fn poll_timer_cadence() {
        let start = Instant::now();
        let mut timer = PollTimer::new(Duration::from_millis(25), start);

        assert!(!timer.is_due(start));
        assert_eq!(timer.remaining(start), Duration::from_millis(25));
        assert!(timer.is_due(start + Duration::from_millis(25)));

        // A long stall re-arms relative to when the poll actually ran
        let late = start + Duration::from_millis(500);
        timer.rearm(late);
        assert!(!timer.is_due(late + Duration::from_millis(24)));
        assert!(timer.is_due(late + Duration::from_millis(25)));
        assert_eq!(timer.remaining(late + Duration::from_secs(1)), Duration::ZERO);
    }
}
