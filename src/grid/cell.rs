#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::column::Column;

/// One step of the grid: a normalised control value per column
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    values: [f32; Column::COUNT],
}

impl Cell {
    /// Normalised control value [0, 1]
    pub fn get(&self, column: Column) -> f32 {
        self.values[column.index()]
    }

    /// Set a control value, clamped to [0, 1]
    pub fn set(&mut self, column: Column, x: f32) {
        self.values[column.index()] = if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) };
    }

    /// Domain value (semitones, Hz, seconds...)
    pub fn value(&self, column: Column) -> f32 {
        column.denormalise(self.get(column))
    }

    /// Set from a domain value
    pub fn set_value(&mut self, column: Column, value: f32) {
        self.set(column, column.normalise(value));
    }

    /// Builder form of [`set_value`](Self::set_value)
    pub fn with_value(mut self, column: Column, value: f32) -> Self {
        self.set_value(column, value);
        self
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            values: Column::ALL.map(|column| column.normalise(column.default_value())),
        }
    }
}
