//! SequenceStore - the grid and its transitions
//!
//! All edits go through [`SequenceStore::apply`], a deterministic reducer:
//! the same store and the same [`Action`] always produce the same result
//! (randomisation carries its own seed).

use std::sync::{Arc, RwLock};

use rand::{rngs::StdRng, Rng, SeedableRng};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{cell::Cell, column::Column};

/// Upper bound on sequence length
pub const MAX_STEPS: usize = 64;

/// Store shared between the UI (writer) and the tick path (reader)
pub type SharedStore = Arc<RwLock<SequenceStore>>;

/// Grid transitions
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Set one column of one step to a control value (clamped to [0, 1])
    Paint {
        step: usize,
        column: Column,
        value: f32,
    },
    /// Rotate the sequence; positive offsets move steps later
    Shift { offset: isize },
    /// Fill unheld steps with seeded random values, in one column or all
    Randomize { seed: u64, column: Option<Column> },
    /// Lock or unlock a step against randomisation
    ToggleHold { step: usize },
    /// Change the number of steps, clamped to `1..=MAX_STEPS`
    Resize { len: usize },
    /// Reset every step to defaults and release all holds
    Clear,
}

/// Ordered cells plus per-cell held state
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceStore {
    cells: Vec<Cell>,
    held: Vec<bool>,
}

impl SequenceStore {
    /// A sequence of `len` default cells
    pub fn new(len: usize) -> Self {
        let len = len.clamp(1, MAX_STEPS);
        Self {
            cells: vec![Cell::default(); len],
            held: vec![false; len],
        }
    }

    /// Build from explicit cells (truncated to `MAX_STEPS`, at least one)
    pub fn from_cells(mut cells: Vec<Cell>) -> Self {
        cells.truncate(MAX_STEPS);
        if cells.is_empty() {
            cells.push(Cell::default());
        }
        let held = vec![false; cells.len()];
        Self { cells, held }
    }

    /// Wrap for sharing with the scheduler
    pub fn shared(self) -> SharedStore {
        Arc::new(RwLock::new(self))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, step: usize) -> Option<&Cell> {
        self.cells.get(step)
    }

    pub fn is_held(&self, step: usize) -> bool {
        self.held.get(step).copied().unwrap_or(false)
    }

    /// Step index and cell for a scheduler tick, wrapped against the
    /// current length
    pub fn cell_for_tick(&self, tick: u64) -> Option<(usize, Cell)> {
        if self.cells.is_empty() {
            return None;
        }
        let index = (tick % self.cells.len() as u64) as usize;
        Some((index, self.cells[index]))
    }

    /// Apply one transition
    pub fn apply(&mut self, action: &Action) {
        match *action {
            Action::Paint {
                step,
                column,
                value,
            } => match self.cells.get_mut(step) {
                Some(cell) => cell.set(column, value),
                None => log::debug!("paint ignored: step {step} out of range"),
            },

            Action::Shift { offset } => {
                let len = self.cells.len() as isize;
                if len > 0 {
                    let by = offset.rem_euclid(len) as usize;
                    self.cells.rotate_right(by);
                    self.held.rotate_right(by);
                }
            }

            Action::Randomize { seed, column } => {
                let mut rng = StdRng::seed_from_u64(seed);
                // Draw for every cell, held or not, so holding a step never
                // changes what the other steps receive
                for (cell, &held) in self.cells.iter_mut().zip(&self.held) {
                    for target in Column::ALL {
                        if column.is_some_and(|c| c != target) {
                            continue;
                        }
                        let x: f32 = rng.random();
                        if !held {
                            cell.set(target, x);
                        }
                    }
                }
            }

            Action::ToggleHold { step } => {
                if let Some(held) = self.held.get_mut(step) {
                    *held = !*held;
                }
            }

            Action::Resize { len } => {
                let len = len.clamp(1, MAX_STEPS);
                self.cells.resize(len, Cell::default());
                self.held.resize(len, false);
            }

            Action::Clear => {
                self.cells.fill(Cell::default());
                self.held.fill(false);
            }
        }
    }
}

impl Default for SequenceStore {
    fn default() -> Self {
        Self::new(16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pitched(len: usize) -> SequenceStore {
        let cells = (0..len)
            .map(|i| Cell::default().with_value(Column::Pitch, (i % 12) as f32))
            .collect();
        SequenceStore::from_cells(cells)
    }

    fn pitches(store: &SequenceStore) -> Vec<f32> {
        store.cells().iter().map(|c| c.value(Column::Pitch)).collect()
    }

    #[test]
    fn new_clamps_length() {
        assert_eq!(SequenceStore::new(0).len(), 1);
        assert_eq!(SequenceStore::new(8).len(), 8);
        assert_eq!(SequenceStore::new(1_000).len(), MAX_STEPS);
        assert_eq!(SequenceStore::from_cells(Vec::new()).len(), 1);
    }

    #[test]
    fn paint_sets_and_clamps() {
        let mut store = SequenceStore::new(4);
        store.apply(&Action::Paint {
            step: 2,
            column: Column::Gain,
            value: 0.25,
        });
        assert_eq!(store.cell(2).unwrap().get(Column::Gain), 0.25);

        store.apply(&Action::Paint {
            step: 2,
            column: Column::Gain,
            value: 4.0,
        });
        assert_eq!(store.cell(2).unwrap().get(Column::Gain), 1.0);
    }

    #[test]
    fn paint_out_of_range_is_ignored() {
        let mut store = SequenceStore::new(4);
        let before = store.clone();
        store.apply(&Action::Paint {
            step: 9,
            column: Column::Gain,
            value: 0.1,
        });
        assert_eq!(store, before);
    }

    #[test]
    fn shift_rotates_cells_and_holds() {
        let mut store = pitched(4);
        store.apply(&Action::ToggleHold { step: 0 });

        store.apply(&Action::Shift { offset: 1 });
        assert_eq!(pitches(&store), vec![3.0, 0.0, 1.0, 2.0]);
        assert!(store.is_held(1));
        assert!(!store.is_held(0));

        store.apply(&Action::Shift { offset: -2 });
        assert_eq!(pitches(&store), vec![1.0, 2.0, 3.0, 0.0]);
        assert!(store.is_held(3));
    }

    #[test]
    fn randomize_is_deterministic_per_seed() {
        let mut a = SequenceStore::new(8);
        let mut b = SequenceStore::new(8);
        a.apply(&Action::Randomize { seed: 42, column: None });
        b.apply(&Action::Randomize { seed: 42, column: None });
        assert_eq!(a, b);

        let mut c = SequenceStore::new(8);
        c.apply(&Action::Randomize { seed: 43, column: None });
        assert_ne!(a, c);
    }

    #[test]
    fn randomize_skips_held_steps() {
        let mut store = SequenceStore::new(8);
        store.apply(&Action::ToggleHold { step: 3 });
        store.apply(&Action::Randomize { seed: 7, column: None });
        assert_eq!(*store.cell(3).unwrap(), Cell::default());

        // Holding a step does not change the values other steps receive
        let mut unheld = SequenceStore::new(8);
        unheld.apply(&Action::Randomize { seed: 7, column: None });
        assert_eq!(store.cell(4), unheld.cell(4));
    }

    #[test]
    fn randomize_single_column() {
        let mut store = SequenceStore::new(8);
        store.apply(&Action::Randomize {
            seed: 1,
            column: Some(Column::Pitch),
        });
        for cell in store.cells() {
            assert_eq!(cell.get(Column::Gain), Cell::default().get(Column::Gain));
        }
        assert!(store.cells().iter().any(|c| c.get(Column::Pitch) != 0.0));
    }

    #[test]
    fn resize_grows_and_shrinks() {
        let mut store = pitched(8);
        store.apply(&Action::Resize { len: 4 });
        assert_eq!(pitches(&store), vec![0.0, 1.0, 2.0, 3.0]);

        store.apply(&Action::Resize { len: 6 });
        assert_eq!(store.len(), 6);
        assert_eq!(*store.cell(5).unwrap(), Cell::default());
        assert!(!store.is_held(5));

        store.apply(&Action::Resize { len: 0 });
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn clear_resets_everything() {
        let mut store = pitched(4);
        store.apply(&Action::ToggleHold { step: 1 });
        store.apply(&Action::Clear);
        assert_eq!(store, SequenceStore::new(4));
    }

    #[test]
    fn tick_index_uses_current_length() {
        let mut store = pitched(8);
        assert_eq!(store.cell_for_tick(7).map(|(i, _)| i), Some(7));

        store.apply(&Action::Resize { len: 4 });
        let (index, cell) = store.cell_for_tick(8).unwrap();
        assert_eq!(index, 0);
        assert_eq!(cell.value(Column::Pitch), 0.0);
        assert_eq!(store.cell_for_tick(11).map(|(i, _)| i), Some(3));
    }
}
