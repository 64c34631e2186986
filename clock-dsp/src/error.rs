use core::fmt;

/// Construction-time configuration errors.
///
/// These describe invariants of the build (block size, LED count, tuning
/// constants). They are checked once when a component is created and never
/// arise while the pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub enum ConfigError {
    /// The sample block length is not a power of two.
    NotPowerOfTwo(usize),
    /// The sample block length is a power of two the FFT has no kernel for.
    UnsupportedBlockSize(usize),
    /// The LED count is zero, larger than the bin count, or does not divide it.
    BandsDoNotDivideBins { bins: usize, bands: usize },
    /// The phase scaling constant must be finite and positive.
    InvalidPhaseScale(f32),
    /// Tone volume outside 1..=15.
    VolumeOutOfRange(u8),
    /// No alarm pattern with this index.
    UnknownPattern(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotPowerOfTwo(n) => {
                write!(f, "sample count {} is not a power of two", n)
            }
            ConfigError::UnsupportedBlockSize(n) => {
                write!(f, "sample count {} is outside the supported 2..=4096", n)
            }
            ConfigError::BandsDoNotDivideBins { bins, bands } => {
                write!(f, "{} LEDs cannot evenly split {} bins", bands, bins)
            }
            ConfigError::InvalidPhaseScale(c) => write!(f, "invalid phase scale {}", c),
            ConfigError::VolumeOutOfRange(v) => write!(f, "volume {} outside 1..=15", v),
            ConfigError::UnknownPattern(i) => write!(f, "no alarm pattern {}", i),
        }
    }
}
