#![no_std]

//! Sampling and spectral analysis for the light pipeline.
//!
//! A [`Sampler`] busy-waits an ADC into a [`SampleBlock`], and a
//! [`SpectralAnalyzer`] turns the block into per-bin magnitude and phase.
//! Both work on fixed-size arenas created once at startup and overwritten on
//! every iteration.

pub mod analyzer;
pub mod error;
pub mod sampler;

pub use analyzer::{frequency_resolution, SpectralAnalyzer, Spectrum};
pub use error::ConfigError;
pub use sampler::{SampleBlock, SampleSource, Sampler};

/// Returns `Ok(())` when `n` is a power of two (and not zero).
pub fn ensure_power_of_two(n: usize) -> Result<(), ConfigError> {
    if n == 0 || !n.is_power_of_two() {
        return Err(ConfigError::NotPowerOfTwo(n));
    }
    Ok(())
}
