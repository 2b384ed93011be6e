//! Glue between the grid, the scheduler and the note engine.
//!
//! # Example
//!
//! ```ignore
//! use stepgrid::{grid::SequenceStore, runtime::Player, sequencing::*, synth::*};
//!
//! let store = SequenceStore::new(16).shared();
//! let (notes_tx, notes_rx) = note_channel(256);
//! let engine = Engine::new(EngineConfig::default(), notes_rx);
//! let (feed, mut visual) = VisualScheduler::with_feed(256);
//!
//! let mut beats = BeatScheduler::new(120.0, engine.clock())?;
//! beats.set_handler(Player::new(store.clone()).notes(notes_tx).visual(feed));
//! beats.start()?;
//! ```

mod player;

pub use player::{Player, PlayerError, ScheduledEvent};
