//! VisualScheduler - relays "now playing" to the display at the audible moment
//!
//! Beats are scheduled up to a lookahead ahead of the audio clock, so the
//! display must not show a step when it is *scheduled*, only when the audio
//! clock actually reaches its start time. The tick path pushes
//! `(index, fire_time)` pairs; the render loop calls [`VisualScheduler::pump`]
//! once per frame and the handler sees each step once it is due.

use std::collections::VecDeque;

use rtrb::{Consumer, Producer, RingBuffer};

/// A step waiting for the audio clock to reach its start time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingVisual {
    pub index: usize,
    pub fire_time: f64,
}

/// What to do when several steps become due within one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatchUpPolicy {
    /// Fire once, with the latest due step. Earlier ones would only flash
    /// for less than a frame.
    #[default]
    Latest,
    /// Fire every due step in order
    Every,
}

/// Producer side of a visual feed (lock-free, never blocks)
pub struct VisualFeed {
    tx: Producer<PendingVisual>,
}

impl VisualFeed {
    /// Queue a step for display. Returns `false` if the feed was full and the
    /// step was dropped; the audio path is never held up by the display.
    pub fn push(&mut self, index: usize, fire_time: f64) -> bool {
        match self.tx.push(PendingVisual { index, fire_time }) {
            Ok(()) => true,
            Err(_) => {
                log::warn!("visual feed full, dropped step {index} at {fire_time:.3}s");
                false
            }
        }
    }
}

/// Render-rate consumer of scheduled steps
pub struct VisualScheduler {
    feed: Option<Consumer<PendingVisual>>,
    /// Ordered by `fire_time` ascending
    queue: VecDeque<PendingVisual>,
    handler: Option<Box<dyn FnMut(usize) + Send>>,
    policy: CatchUpPolicy,
}

impl VisualScheduler {
    /// Scheduler fed only through [`push`](Self::push)
    pub fn new() -> Self {
        Self {
            feed: None,
            queue: VecDeque::new(),
            handler: None,
            policy: CatchUpPolicy::default(),
        }
    }

    /// Scheduler plus a feed the tick path can own independently
    pub fn with_feed(capacity: usize) -> (VisualFeed, Self) {
        let (tx, rx) = RingBuffer::new(capacity);
        let scheduler = Self {
            feed: Some(rx),
            queue: VecDeque::with_capacity(capacity),
            ..Self::new()
        };
        (VisualFeed { tx }, scheduler)
    }

    pub fn policy(mut self, policy: CatchUpPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Register the display handler, replacing any previous one
    pub fn set_handler<F>(&mut self, handler: F)
    where
        F: FnMut(usize) + Send + 'static,
    {
        self.handler = Some(Box::new(handler));
    }

    /// Queue a step to show once the audio clock reaches `fire_time`
    pub fn push(&mut self, index: usize, fire_time: f64) {
        insert_ordered(&mut self.queue, PendingVisual { index, fire_time });
    }

    /// Fire every step that is due at audio-clock time `now`.
    ///
    /// Call once per display refresh. Returns the latest step fired this
    /// frame, if any.
    pub fn pump(&mut self, now: f64) -> Option<usize> {
        self.drain_feed();

        let mut latest = None;
        while let Some(front) = self.queue.front() {
            if front.fire_time > now {
                break;
            }
            let due = *front;
            self.queue.pop_front();

            if self.policy == CatchUpPolicy::Every {
                if let Some(handler) = self.handler.as_mut() {
                    handler(due.index);
                }
            }
            latest = Some(due.index);
        }

        if self.policy == CatchUpPolicy::Latest {
            if let (Some(index), Some(handler)) = (latest, self.handler.as_mut()) {
                handler(index);
            }
        }

        latest
    }

    /// Drop every pending step (transport stopped)
    pub fn clear(&mut self) {
        self.drain_feed();
        self.queue.clear();
    }

    /// Number of steps not yet fired
    pub fn pending(&self) -> usize {
        self.queue.len() + self.feed.as_ref().map_or(0, |rx| rx.slots())
    }

    /// Fire time of the earliest queued step (feed not yet drained)
    pub fn next_fire_time(&self) -> Option<f64> {
        self.queue.front().map(|e| e.fire_time)
    }

    fn drain_feed(&mut self) {
        if let Some(rx) = self.feed.as_mut() {
            while let Ok(event) = rx.pop() {
                insert_ordered(&mut self.queue, event);
            }
        }
    }
}

impl Default for VisualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Insert after any entries with the same or earlier fire time.
/// Pushes usually arrive in order, so this is almost always an append.
fn insert_ordered(queue: &mut VecDeque<PendingVisual>, event: PendingVisual) {
    let pos = queue.partition_point(|e| e.fire_time <= event.fire_time);
    queue.insert(pos, event);
}
