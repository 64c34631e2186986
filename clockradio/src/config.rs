//! Board wiring and hardware timing.

use esp_hal::time::Rate;

// --- Light strip ---
/// SPI clock for ws2812-spi: 3 SPI bits per WS2812 bit.
pub const STRIP_SPI_RATE: Rate = Rate::from_khz(3_800);
// MOSI  -> GPIO11
// OE    -> GPIO12 (level shifter output enable, active low)

// --- Audio in ---
// ADC1 channel 0 -> GPIO1
/// The ESP32-S3 converter is 12 bits wide.
pub const ADC_BITS: u32 = 12;

// --- Speaker ---
// PWM -> GPIO13
// OE  -> GPIO14 (tri-state buffer output enable, active low)
/// LEDC carrier. Tone frequencies are produced by switching its duty.
pub const SPEAKER_CARRIER: Rate = Rate::from_khz(40);

// --- Radio ---
// SDA -> GPIO8, SCL -> GPIO9
pub const RADIO_I2C_RATE: Rate = Rate::from_khz(100);

// --- Front panel ---
// Encoder CLK -> GPIO4, DIR -> GPIO5, push -> GPIO6 (mute)
// Alarm button -> GPIO7
