/// What the light strip shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
#[repr(u8)]
pub enum LedMode {
    Off = 0,
    Constant = 1,
    Spectrum = 2,
}

impl LedMode {
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => LedMode::Constant,
            2 => LedMode::Spectrum,
            _ => LedMode::Off,
        }
    }

    /// Next mode when stepping forward through the selection.
    pub const fn next(self) -> Self {
        match self {
            LedMode::Off => LedMode::Constant,
            LedMode::Constant => LedMode::Spectrum,
            LedMode::Spectrum => LedMode::Off,
        }
    }

    pub const fn previous(self) -> Self {
        match self {
            LedMode::Off => LedMode::Spectrum,
            LedMode::Constant => LedMode::Off,
            LedMode::Spectrum => LedMode::Constant,
        }
    }
}

/// The mode the pipeline acts on for a stored selection.
///
/// A sounding alarm owns the shared output hardware, so the strip is off
/// whatever was selected. The spectrum follows the radio, so a muted radio
/// turns it off as well.
pub fn effective_mode(selected: LedMode, alarm_sounding: bool, radio_muted: bool) -> LedMode {
    match selected {
        _ if alarm_sounding => LedMode::Off,
        LedMode::Spectrum if radio_muted => LedMode::Off,
        mode => mode,
    }
}
