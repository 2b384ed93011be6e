//! Player - turns scheduler beats into notes and display events
//!
//! Registered as the [`BeatScheduler`](crate::sequencing::BeatScheduler)'s
//! tick handler. For every beat it reads the current grid, maps the tick to a
//! step (against the length *at that moment*, so resizing mid-playback is
//! seamless), sends the step's note to the engine and queues the step for
//! the display at the same audio-clock time.

use rtrb::Producer;
use thiserror::Error;

use crate::grid::SharedStore;
use crate::sequencing::{Beat, HandlerError, TickHandler, VisualFeed};
use crate::synth::{NoteEvent, NoteParams};

/// A beat resolved against the grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledEvent {
    /// Step index, `tick % len`
    pub index: usize,
    pub start_time: f64,
    pub duration: f64,
}

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("sequence store lock poisoned")]
    StorePoisoned,
}

pub struct Player {
    store: SharedStore,
    notes: Option<Producer<NoteEvent>>,
    visual: Option<VisualFeed>,
    last: Option<ScheduledEvent>,
}

impl Player {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            notes: None,
            visual: None,
            last: None,
        }
    }

    /// Send notes to the engine over this ring
    pub fn notes(mut self, notes: Producer<NoteEvent>) -> Self {
        self.notes = Some(notes);
        self
    }

    /// Report scheduled steps to a visual scheduler
    pub fn visual(mut self, visual: VisualFeed) -> Self {
        self.visual = Some(visual);
        self
    }

    /// Most recently scheduled step
    pub fn last_scheduled(&self) -> Option<ScheduledEvent> {
        self.last
    }

    /// Resolve one beat and dispatch it. `Ok(None)` if the grid is empty.
    pub fn schedule(&mut self, beat: Beat) -> Result<Option<ScheduledEvent>, PlayerError> {
        let (index, cell) = {
            let store = self.store.read().map_err(|_| PlayerError::StorePoisoned)?;
            match store.cell_for_tick(beat.tick) {
                Some(found) => found,
                None => return Ok(None),
            }
        };

        let event = ScheduledEvent {
            index,
            start_time: beat.start_time,
            duration: beat.duration,
        };

        if let Some(notes) = self.notes.as_mut() {
            let note = NoteEvent {
                start_time: event.start_time,
                params: NoteParams::from_cell(&cell),
            };
            if notes.push(note).is_err() {
                log::warn!("note queue full, dropped step {index} at {:.3}s", event.start_time);
            }
        }

        if let Some(visual) = self.visual.as_mut() {
            visual.push(event.index, event.start_time);
        }

        self.last = Some(event);
        Ok(Some(event))
    }
}

impl TickHandler for Player {
    fn on_tick(&mut self, beat: Beat) -> Result<(), HandlerError> {
        self.schedule(beat)?;
        Ok(())
    }
}
