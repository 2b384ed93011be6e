//! Dual-clock playback scheduling.
//!
//! [`BeatScheduler`] turns a tempo into beats with exact audio-clock start
//! times; [`VisualScheduler`] replays those beats to the display when the
//! audio clock actually gets there.

pub mod clock;
pub mod error;
pub mod scheduler;
pub mod tempo;
pub mod visual;

pub use clock::{AudioClock, ManualClock, PollTimer, SampleClock};
pub use error::{HandlerError, SchedulerError};
pub use scheduler::{Beat, BeatScheduler, SchedulerConfig, StopHandle, TickHandler};
pub use tempo::Tempo;
pub use visual::{CatchUpPolicy, PendingVisual, VisualFeed, VisualScheduler};
