use thiserror::Error;

/// Boxed error returned by tick handlers.
///
/// Handlers are external collaborators (synthesis, UI glue), so the scheduler
/// does not constrain their error type beyond being sendable.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced by the beat scheduler
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Tempo must be a positive, finite number of beats per minute
    #[error("invalid tempo {0} bpm: must be positive and finite")]
    InvalidTempo(f64),

    /// Lookahead or poll interval is unusable
    #[error("invalid scheduler config: {0}")]
    InvalidConfig(&'static str),

    /// The registered tick handler failed.
    ///
    /// `tick` has already been consumed; the next poll continues with `tick + 1`.
    #[error("tick handler failed on tick {tick}")]
    Handler {
        tick: u64,
        #[source]
        source: HandlerError,
    },
}
