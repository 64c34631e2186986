use core::f32::consts::{FRAC_PI_2, PI};

use smart_leds::RGB8;

use crate::types::BandData;

/// Base color at phase 0, one unit float per channel (cyan).
pub const DEFAULT_BASE_COLOR: [f32; 3] = [0.0, 1.0, 1.0];

/// Largest magnitude the mapper lets through. Low bands are dominated by the
/// DC term and would otherwise saturate every channel.
pub const MAX_MAGNITUDE: f32 = 255.0;

/// Which channel a phase adjusts.
///
/// The ranges are `[-π/2, 0)`, `[-π, -π/2)`, `[0, π/2)` and `[π/2, π]`. The
/// last one is closed on the right while its mirror on the negative side is
/// closed on the left, so both ±π land on a red branch but through different
/// rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub enum Quadrant {
    DecreaseBlue,
    IncreaseRedNegative,
    DecreaseGreen,
    IncreaseRedPositive,
}

impl Quadrant {
    pub fn of(phase: f32) -> Self {
        let phase = phase.clamp(-PI, PI);
        if (-FRAC_PI_2..0.0).contains(&phase) {
            Quadrant::DecreaseBlue
        } else if phase < -FRAC_PI_2 {
            Quadrant::IncreaseRedNegative
        } else if phase < FRAC_PI_2 {
            Quadrant::DecreaseGreen
        } else {
            Quadrant::IncreaseRedPositive
        }
    }
}

/// Maps a band's (phase, magnitude) to a strip color by adjusting one channel
/// of a base color per phase quadrant.
#[derive(Debug, Clone, Copy)]
pub struct PhaseColorMapper {
    base: [f32; 3],
}

impl Default for PhaseColorMapper {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_COLOR)
    }
}

impl PhaseColorMapper {
    pub const fn new(base: [f32; 3]) -> Self {
        Self { base }
    }

    pub fn base(&self) -> [f32; 3] {
        self.base
    }

    /// Unscaled channel values for `phase`, before the magnitude is applied.
    pub fn channel_weights(&self, phase: f32) -> [f32; 3] {
        let phase = phase.clamp(-PI, PI);
        let [mut r, mut g, mut b] = self.base;
        match Quadrant::of(phase) {
            Quadrant::DecreaseBlue => b -= -phase / FRAC_PI_2,
            Quadrant::IncreaseRedNegative => r += -phase / PI,
            Quadrant::DecreaseGreen => g -= phase / FRAC_PI_2,
            Quadrant::IncreaseRedPositive => r += phase / PI,
        }
        [r, g, b]
    }

    pub fn map(&self, band: &BandData) -> RGB8 {
        self.map_parts(band.avg_phase, band.avg_magnitude)
    }

    pub fn map_parts(&self, phase: f32, magnitude: f32) -> RGB8 {
        let magnitude = magnitude.clamp(0.0, MAX_MAGNITUDE);
        let [r, g, b] = self.channel_weights(phase);
        RGB8::new(
            to_channel(r * magnitude),
            to_channel(g * magnitude),
            to_channel(b * magnitude),
        )
    }
}

fn to_channel(value: f32) -> u8 {
    libm::ceilf(value).clamp(0.0, 255.0) as u8
}
