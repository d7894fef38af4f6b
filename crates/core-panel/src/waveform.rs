//! Panel refresh waveform modes and their aggregation precedence.

/// The three waveform modes exposed by the IT8951 controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WaveformMode {
    /// Fast partial binary-ish refresh (A2). Lowest precedence: any other
    /// widget in the same tick wanting a stronger mode wins.
    Fast,
    /// Full 16-shade refresh (GC16). Resets ghosting accumulated by Fast.
    HighQuality,
    /// Clear-to-white drive. Highest precedence.
    Init,
}

impl WaveformMode {
    /// Numeric code accepted by the IT8951 command set.
    pub fn code(self) -> u8 {
        match self {
            WaveformMode::Init => 0,
            WaveformMode::HighQuality => 2,
            WaveformMode::Fast => 6,
        }
    }

    /// Combine two simultaneously-requested modes, keeping the more
    /// conservative one: Init > HighQuality > Fast.
    pub fn combine(self, other: WaveformMode) -> WaveformMode {
        self.max(other)
    }
}

/// Aggregate the waveform preferences of a set of widgets due this tick,
/// defaulting to [`WaveformMode::Fast`] when the set is empty.
pub fn aggregate<I: IntoIterator<Item = WaveformMode>>(modes: I) -> WaveformMode {
    modes
        .into_iter()
        .fold(WaveformMode::Fast, WaveformMode::combine)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_dominates_everything() {
        assert_eq!(
            aggregate([WaveformMode::Fast, WaveformMode::HighQuality, WaveformMode::Init]),
            WaveformMode::Init
        );
    }

    #[test]
    fn high_quality_beats_fast() {
        assert_eq!(
            aggregate([WaveformMode::Fast, WaveformMode::HighQuality]),
            WaveformMode::HighQuality
        );
    }

    #[test]
    fn empty_set_defaults_to_fast() {
        assert_eq!(aggregate([]), WaveformMode::Fast);
    }

    #[test]
    fn codes_match_it8951_constants() {
        assert_eq!(WaveformMode::Init.code(), 0);
        assert_eq!(WaveformMode::HighQuality.code(), 2);
        assert_eq!(WaveformMode::Fast.code(), 6);
    }
}
