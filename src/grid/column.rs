#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Column Model
============

Every cell stores one normalised control value in [0, 1] per column. That is
what the UI paints and what gets randomised. The column's scale turns the
control value into the physical value the synth needs, and back.

| column   | scale        | domain                     |
| -------- | ------------ | -------------------------- |
| pitch    | integer      | 0..=11 semitones above C   |
| octave   | integer      | -2..=2                     |
| gain     | linear       | 0.0..=1.0                  |
| filter   | exponential  | 80 Hz..=12 kHz             |
| lfo      | table        | off, 0.5, 1, 2, 4, 8 Hz    |
| decay    | exponential  | 50 ms..=2 s                |
| waveform | integer      | sine, triangle, saw, square|

Discrete scales (integer, table) quantise: normalise(denormalise(x)) snaps x
to the nearest grid point, but denormalise(normalise(v)) == v exactly for
every v on the grid. Continuous scales round-trip within float precision.

Exponential scales are used where hearing is logarithmic: doubling a cutoff
or a decay sounds like the same step anywhere in the range.
*/

/// LFO rates selectable in the LFO column (Hz, 0 = off)
pub const LFO_RATES: [f32; 6] = [0.0, 0.5, 1.0, 2.0, 4.0, 8.0];

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

const WAVEFORM_NAMES: [&str; 4] = ["sin", "tri", "saw", "sqr"];

/// Mapping between a normalised control value and a domain value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scale {
    /// Every integer in `min..=max`
    Integer { min: i32, max: i32 },
    /// A fixed list of values, evenly spaced in control space
    Table(&'static [f32]),
    Linear { min: f32, max: f32 },
    /// `min * (max / min)^x`, both bounds positive
    Exponential { min: f32, max: f32 },
}

impl Scale {
    /// Control value [0, 1] to domain value. Out-of-range input is clamped.
    pub fn denormalise(&self, x: f32) -> f32 {
        let x = if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) };

        match *self {
            Scale::Integer { min, max } => {
                let span = (max - min) as f32;
                (min + (x * span).round() as i32) as f32
            }
            Scale::Table(values) => values[grid_index(x, values.len())],
            Scale::Linear { min, max } => min + x * (max - min),
            Scale::Exponential { min, max } => min * (max / min).powf(x),
        }
    }

    /// Domain value to control value [0, 1]
    pub fn normalise(&self, value: f32) -> f32 {
        let x = match *self {
            Scale::Integer { min, max } => {
                if max == min {
                    0.0
                } else {
                    (value - min as f32) / (max - min) as f32
                }
            }
            Scale::Table(values) => {
                if values.len() <= 1 {
                    0.0
                } else {
                    nearest_index(values, value) as f32 / (values.len() - 1) as f32
                }
            }
            Scale::Linear { min, max } => (value - min) / (max - min),
            Scale::Exponential { min, max } => {
                if value <= min {
                    0.0
                } else {
                    (value / min).ln() / (max / min).ln()
                }
            }
        };

        if x.is_nan() {
            0.0
        } else {
            x.clamp(0.0, 1.0)
        }
    }

    /// Number of grid points for discrete scales
    pub fn steps(&self) -> Option<usize> {
        match *self {
            Scale::Integer { min, max } => Some((max - min).unsigned_abs() as usize + 1),
            Scale::Table(values) => Some(values.len()),
            Scale::Linear { .. } | Scale::Exponential { .. } => None,
        }
    }
}

fn grid_index(x: f32, len: usize) -> usize {
    if len <= 1 {
        return 0;
    }
    ((x * (len - 1) as f32).round() as usize).min(len - 1)
}

fn nearest_index(values: &[f32], value: f32) -> usize {
    values
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            (*a - value)
                .abs()
                .total_cmp(&(*b - value).abs())
        })
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// One parameter column of the grid
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Pitch,
    Octave,
    Gain,
    Filter,
    Lfo,
    Decay,
    Waveform,
}

impl Column {
    pub const COUNT: usize = 7;

    /// All columns in display order
    pub const ALL: [Column; Column::COUNT] = [
        Column::Pitch,
        Column::Octave,
        Column::Gain,
        Column::Filter,
        Column::Lfo,
        Column::Decay,
        Column::Waveform,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn scale(self) -> Scale {
        match self {
            Column::Pitch => Scale::Integer { min: 0, max: 11 },
            Column::Octave => Scale::Integer { min: -2, max: 2 },
            Column::Gain => Scale::Linear { min: 0.0, max: 1.0 },
            Column::Filter => Scale::Exponential {
                min: 80.0,
                max: 12_000.0,
            },
            Column::Lfo => Scale::Table(&LFO_RATES),
            Column::Decay => Scale::Exponential { min: 0.05, max: 2.0 },
            Column::Waveform => Scale::Integer { min: 0, max: 3 },
        }
    }

    pub fn denormalise(self, x: f32) -> f32 {
        self.scale().denormalise(x)
    }

    pub fn normalise(self, value: f32) -> f32 {
        self.scale().normalise(value)
    }

    /// Domain value of a fresh cell
    pub fn default_value(self) -> f32 {
        match self {
            Column::Pitch => 0.0,
            Column::Octave => 0.0,
            Column::Gain => 0.7,
            Column::Filter => 2_400.0,
            Column::Lfo => 0.0,
            Column::Decay => 0.3,
            Column::Waveform => 2.0, // saw
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Column::Pitch => "pitch",
            Column::Octave => "oct",
            Column::Gain => "gain",
            Column::Filter => "filter",
            Column::Lfo => "lfo",
            Column::Decay => "decay",
            Column::Waveform => "wave",
        }
    }

    /// Control-space distance of one edit step.
    /// One grid point for discrete columns, 1/16 of the range otherwise.
    pub fn increment(self) -> f32 {
        match self.scale().steps() {
            Some(n) if n > 1 => 1.0 / (n - 1) as f32,
            _ => 1.0 / 16.0,
        }
    }

    /// Move a control value `direction` edit steps, snapping discrete
    /// columns to their grid first
    pub fn nudge(self, x: f32, direction: i32) -> f32 {
        let base = match self.scale().steps() {
            Some(_) => self.normalise(self.denormalise(x)),
            None => x,
        };
        (base + direction as f32 * self.increment()).clamp(0.0, 1.0)
    }

    /// Short display text for a domain value
    pub fn format(self, value: f32) -> String {
        match self {
            Column::Pitch => NOTE_NAMES[(value as usize).min(11)].to_string(),
            Column::Octave => format!("{:+}", value as i32),
            Column::Gain => format!("{:.0}%", value * 100.0),
            Column::Filter if value >= 1_000.0 => format!("{:.1}k", value / 1_000.0),
            Column::Filter => format!("{value:.0}"),
            Column::Lfo if value == 0.0 => "off".to_string(),
            Column::Lfo => format!("{value}Hz"),
            Column::Decay if value < 1.0 => format!("{:.0}ms", value * 1_000.0),
            Column::Decay => format!("{value:.2}s"),
            Column::Waveform => WAVEFORM_NAMES[(value as usize).min(3)].to_string(),
        }
    }
}
