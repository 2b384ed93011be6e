//! BeatScheduler - lookahead beat scheduling against the audio clock
//!
//! The scheduler is polled by a coarse execution timer but computes every
//! start time from a fixed origin on the audio clock. Each poll schedules all
//! beats that begin before `now + lookahead`, so timer jitter smaller than the
//! lookahead window is inaudible and larger stalls are caught up tick by tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::clock::{AudioClock, PollTimer};
use super::error::{HandlerError, SchedulerError};
use super::tempo::Tempo;

/// One scheduled beat, handed to the tick handler
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Beat {
    /// Audio-clock time (seconds) at which the beat must sound
    pub start_time: f64,
    /// Beat length in seconds
    pub duration: f64,
    /// Beats since the scheduler was started
    pub tick: u64,
}

/// Receives every beat the scheduler emits.
///
/// Called synchronously from [`BeatScheduler::poll`] in ascending tick order.
/// Must not block; `start_time` is the authoritative time the sound begins.
pub trait TickHandler: Send {
    fn on_tick(&mut self, beat: Beat) -> Result<(), HandlerError>;
}

impl<F> TickHandler for F
where
    F: FnMut(Beat) -> Result<(), HandlerError> + Send,
{
    fn on_tick(&mut self, beat: Beat) -> Result<(), HandlerError> {
        self(beat)
    }
}

/// Scheduler timing configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerConfig {
    /// How far ahead of the audio clock beats are scheduled
    pub lookahead: Duration,
    /// Period of the execution timer that drives polling
    pub poll_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            lookahead: Duration::from_millis(100),
            poll_interval: Duration::from_millis(25),
        }
    }
}

impl SchedulerConfig {
    pub fn lookahead(mut self, lookahead: Duration) -> Self {
        self.lookahead = lookahead;
        self
    }

    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    fn validate(&self) -> Result<(), SchedulerError> {
        if self.lookahead.is_zero() {
            return Err(SchedulerError::InvalidConfig("lookahead must be non-zero"));
        }
        if self.poll_interval.is_zero() {
            return Err(SchedulerError::InvalidConfig("poll interval must be non-zero"));
        }
        if self.poll_interval >= self.lookahead {
            log::warn!(
                "poll interval {:?} is not shorter than lookahead {:?}; timer jitter will be audible",
                self.poll_interval,
                self.lookahead
            );
        }
        Ok(())
    }
}

/// Requests a stop from anywhere, including from inside a tick handler.
///
/// The scheduler honours the request after the current emission and before
/// any further poll.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    requested: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    fn take(&self) -> bool {
        self.requested.swap(false, Ordering::SeqCst)
    }
}

/// Lookahead beat scheduler
pub struct BeatScheduler<C: AudioClock> {
    clock: C,
    tempo: Tempo,
    config: SchedulerConfig,
    /// Audio-clock time of tick 0
    origin: f64,
    /// Next unscheduled tick
    tick: u64,
    /// Armed while running; `None` once stopped
    timer: Option<PollTimer>,
    stop_handle: StopHandle,
    handler: Option<Box<dyn TickHandler>>,
}

impl<C: AudioClock> BeatScheduler<C> {
    /// Create a scheduler with the default lookahead and poll interval
    pub fn new(bpm: f64, clock: C) -> Result<Self, SchedulerError> {
        Self::with_config(bpm, SchedulerConfig::default(), clock)
    }

    pub fn with_config(bpm: f64, config: SchedulerConfig, clock: C) -> Result<Self, SchedulerError> {
        let tempo = Tempo::new(bpm)?;
        config.validate()?;

        Ok(Self {
            clock,
            tempo,
            config,
            origin: 0.0,
            tick: 0,
            timer: None,
            stop_handle: StopHandle::default(),
            handler: None,
        })
    }

    /// Register the tick handler, replacing any previous one
    pub fn set_handler<H: TickHandler + 'static>(&mut self, handler: H) {
        self.handler = Some(Box::new(handler));
    }

    pub fn clear_handler(&mut self) {
        self.handler = None;
    }

    /// Handle for requesting a stop from inside a handler
    pub fn stop_handle(&self) -> StopHandle {
        self.stop_handle.clone()
    }

    /// Start playback at the current audio-clock time.
    ///
    /// No-op when already running. Resets the tick counter, samples a new
    /// origin and runs the first poll immediately, so tick 0 is emitted
    /// before this returns. Returns the number of beats emitted.
    pub fn start(&mut self) -> Result<usize, SchedulerError> {
        self.start_at(Instant::now())
    }

    /// Like [`start`](Self::start), with the execution timer armed from `now`
    pub fn start_at(&mut self, now: Instant) -> Result<usize, SchedulerError> {
        if self.timer.is_some() && !self.stop_handle.is_requested() {
            return Ok(0);
        }

        // A stale request from the previous run must not cancel this one
        self.stop_handle.take();
        self.origin = self.clock.now();
        self.tick = 0;
        self.timer = Some(PollTimer::new(self.config.poll_interval, now));

        log::info!(
            "scheduler started at {:.3}s ({} bpm, beat {:.3}s, lookahead {:?})",
            self.origin,
            self.tempo.bpm(),
            self.tempo.beat_length(),
            self.config.lookahead
        );

        self.poll()
    }

    /// Stop playback. Idempotent.
    ///
    /// Leaves `tick` and `origin` untouched for inspection; the next
    /// [`start`](Self::start) resets them.
    pub fn stop(&mut self) {
        if self.timer.take().is_some() {
            log::info!("scheduler stopped at tick {}", self.tick);
        }
    }

    /// Timer entry point: poll if the execution timer has fired.
    ///
    /// Hosts call this from their event loop as often as they like; the
    /// scheduler only does work once per poll interval.
    pub fn run_due(&mut self, now: Instant) -> Result<usize, SchedulerError> {
        if self.apply_stop_request() {
            return Ok(0);
        }

        match self.timer.as_mut() {
            Some(timer) if timer.is_due(now) => timer.rearm(now),
            _ => return Ok(0),
        }

        self.poll()
    }

    /// Schedule every beat starting before `now + lookahead`.
    ///
    /// Emits nothing when stopped. If the poll ran late, all missed beats are
    /// emitted in order with their exact start times; nothing is skipped or
    /// compressed. The tick counter advances before the handler runs, so a
    /// failing handler never causes a beat to be emitted twice.
    pub fn poll(&mut self) -> Result<usize, SchedulerError> {
        if self.apply_stop_request() || self.timer.is_none() {
            return Ok(0);
        }

        let now = self.clock.now();
        let horizon = now + self.config.lookahead.as_secs_f64();
        let beat_length = self.tempo.beat_length();
        let mut emitted = 0;

        loop {
            let start_time = self.next_start_time();
            if start_time >= horizon {
                break;
            }

            let beat = Beat {
                start_time,
                duration: beat_length,
                tick: self.tick,
            };
            self.tick += 1;
            emitted += 1;

            log::trace!("tick {} at {:.4}s (now {:.4}s)", beat.tick, start_time, now);

            if let Some(handler) = self.handler.as_mut() {
                handler
                    .on_tick(beat)
                    .map_err(|source| SchedulerError::Handler {
                        tick: beat.tick,
                        source,
                    })?;
            }

            if self.apply_stop_request() {
                break;
            }
        }

        if emitted > 1 {
            log::debug!("caught up {} beats in one poll at {:.3}s", emitted, now);
        }

        Ok(emitted)
    }

    /// Audio-clock time of the next unscheduled tick
    pub fn next_start_time(&self) -> f64 {
        self.tempo.tick_time(self.origin, self.tick)
    }

    /// Time until the execution timer fires, `None` when stopped
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.timer.as_ref().map(|timer| timer.remaining(now))
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some() && !self.stop_handle.is_requested()
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn origin(&self) -> f64 {
        self.origin
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn beat_length(&self) -> f64 {
        self.tempo.beat_length()
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn apply_stop_request(&mut self) -> bool {
        if self.stop_handle.take() {
            self.stop();
            true
        } else {
            false
        }
    }
}
