use core::fmt;

/// Rejected front-panel settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub enum InputError {
    /// Debounce needs at least one stable read.
    ZeroDebounceThreshold,
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::ZeroDebounceThreshold => f.write_str("debounce threshold must be > 0"),
        }
    }
}
