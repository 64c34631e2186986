//! Build-time constants and the tunable structs derived from them.

use clock_input::button::{DEFAULT_PERIOD_MS, DEFAULT_THRESHOLD};
use clock_viz::{YieldPolicy, DEFAULT_BASE_COLOR};

pub use clock_input::DebounceConfig;

/// Samples per FFT block.
pub const SAMPLE_COUNT: usize = 128;
pub const LED_COUNT: usize = 16;
/// Busy-wait between ADC reads.
pub const SAMPLING_PERIOD_US: u32 = 48;
/// Divisor applied to summed band phases before color mapping.
pub const PHASE_SCALE: f32 = 50.0;
/// Pause between iterations while the strip is off.
pub const IDLE_POLL_MS: u32 = 10;

pub const DEBOUNCE_PERIOD_MS: u32 = DEFAULT_PERIOD_MS;
pub const DEBOUNCE_THRESHOLD: u8 = DEFAULT_THRESHOLD;

pub const PATTERN_TICK_MS: u32 = 125;
pub const MIN_VOLUME: u8 = 1;
pub const MAX_VOLUME: u8 = 15;
pub const DEFAULT_VOLUME: u8 = 4;
pub const DEFAULT_PATTERN: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    pub sampling_period_us: u32,
    pub phase_scale: f32,
    pub base_color: [f32; 3],
    pub yield_policy: YieldPolicy,
    pub idle_ms: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sampling_period_us: SAMPLING_PERIOD_US,
            phase_scale: PHASE_SCALE,
            base_color: DEFAULT_BASE_COLOR,
            yield_policy: YieldPolicy::default(),
            idle_ms: IDLE_POLL_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub struct ToneConfig {
    pub pattern_tick_ms: u32,
    pub volume: u8,
    pub pattern: usize,
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            pattern_tick_ms: PATTERN_TICK_MS,
            volume: DEFAULT_VOLUME,
            pattern: DEFAULT_PATTERN,
        }
    }
}
