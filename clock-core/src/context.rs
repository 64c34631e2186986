use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

#[cfg(feature = "logging")]
use defmt::info;
use smart_leds::RGB8;

use crate::alarm::AlarmState;
use crate::mode::{self, LedMode};

/// Warm white.
pub const DEFAULT_CONSTANT_COLOR: RGB8 = RGB8::new(255, 160, 60);

/// State shared between interrupt handlers, timer tasks and the light loop.
///
/// Every field is one atomic word and every update is a single store, so a
/// reader never sees a half-written value. Create it once and share it by
/// `&'static` reference.
pub struct ClockContext {
    mode: AtomicU8,
    alarm: AtomicU8,
    constant_color: AtomicU32,
    radio_muted: AtomicBool,
}

impl ClockContext {
    /// Strip off, alarm off, radio muted until the tuner is brought up.
    pub const fn new() -> Self {
        Self {
            mode: AtomicU8::new(LedMode::Off as u8),
            alarm: AtomicU8::new(AlarmState::Off as u8),
            constant_color: AtomicU32::new(pack(DEFAULT_CONSTANT_COLOR)),
            radio_muted: AtomicBool::new(true),
        }
    }

    pub fn set_mode(&self, mode: LedMode) {
        #[cfg(feature = "logging")]
        info!("led mode selected: {}", mode);
        self.mode.store(mode as u8, Ordering::Release);
    }

    /// The stored selection, regardless of what is currently shown.
    pub fn get_mode(&self) -> LedMode {
        LedMode::from_u8(self.mode.load(Ordering::Acquire))
    }

    pub fn effective_mode(&self) -> LedMode {
        mode::effective_mode(self.get_mode(), self.alarm_sounding(), self.radio_muted())
    }

    pub fn set_constant_color(&self, color: RGB8) {
        self.constant_color.store(pack(color), Ordering::Release);
    }

    pub fn constant_color(&self) -> RGB8 {
        unpack(self.constant_color.load(Ordering::Acquire))
    }

    pub fn alarm_state(&self) -> AlarmState {
        AlarmState::from_u8(self.alarm.load(Ordering::Acquire))
    }

    pub fn alarm_sounding(&self) -> bool {
        self.alarm_state().is_sounding()
    }

    /// Published by the alarm only.
    pub(crate) fn set_alarm_state(&self, state: AlarmState) {
        self.alarm.store(state as u8, Ordering::Release);
    }

    pub fn set_radio_muted(&self, muted: bool) {
        self.radio_muted.store(muted, Ordering::Release);
    }

    pub fn radio_muted(&self) -> bool {
        self.radio_muted.load(Ordering::Acquire)
    }
}

impl Default for ClockContext {
    fn default() -> Self {
        Self::new()
    }
}

const fn pack(color: RGB8) -> u32 {
    (color.r as u32) << 16 | (color.g as u32) << 8 | color.b as u32
}

const fn unpack(word: u32) -> RGB8 {
    RGB8::new((word >> 16) as u8, (word >> 8) as u8, word as u8)
}
