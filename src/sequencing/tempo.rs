use super::error::SchedulerError;

/// Tempo in beats per minute.
///
/// Immutable once constructed: a scheduler is built for exactly one tempo and
/// a tempo change means building a new scheduler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tempo {
    bpm: f64,
}

impl Tempo {
    /// Create a tempo, rejecting zero, negative, NaN and infinite values
    pub fn new(bpm: f64) -> Result<Self, SchedulerError> {
        if bpm.is_finite() && bpm > 0.0 {
            Ok(Self { bpm })
        } else {
            Err(SchedulerError::InvalidTempo(bpm))
        }
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Length of one beat in seconds: 60 / bpm
    pub fn beat_length(&self) -> f64 {
        60.0 / self.bpm
    }

    /// Start time of `tick` relative to a fixed origin.
    ///
    /// Always a single multiplication from the origin, never a running sum,
    /// so rounding error does not grow with the tick count.
    #[inline]
    pub fn tick_time(&self, origin: f64, tick: u64) -> f64 {
        origin + tick as f64 * self.beat_length()
    }
}

impl TryFrom<f64> for Tempo {
    type Error = SchedulerError;

    fn try_from(bpm: f64) -> Result<Self, Self::Error> {
        Tempo::new(bpm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beat_length_from_bpm() {
        assert_eq!(Tempo::new(120.0).unwrap().beat_length(), 0.5);
        assert_eq!(Tempo::new(96.0).unwrap().beat_length(), 0.625);
        assert_eq!(Tempo::new(60.0).unwrap().beat_length(), 1.0);
    }

    #[test]
    fn rejects_non_positive_and_non_finite() {
        for bpm in [0.0, -1.0, -120.0, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(Tempo::new(bpm), Err(SchedulerError::InvalidTempo(_))),
                "tempo {bpm} should be rejected"
            );
        }
    }

    #[test]
    fn tick_time_is_origin_plus_multiple() {
        let tempo = Tempo::new(96.0).unwrap();
        assert_eq!(tempo.tick_time(10.0, 0), 10.0);
        assert_eq!(tempo.tick_time(10.0, 1), 10.625);
        assert_eq!(tempo.tick_time(10.0, 8), 15.0);
    }

    #[test]
    fn no_drift_against_accumulation() {
        // 1/3 s beats cannot be represented exactly; a running sum drifts,
        // the multiplication stays within one rounding step of the true value
        let tempo = Tempo::new(180.0).unwrap();
        let ticks = 1_000_000u64;
        let exact = ticks as f64 / 3.0;
        let scheduled = tempo.tick_time(0.0, ticks);
        assert!((scheduled - exact).abs() < 1e-9);
    }
}
