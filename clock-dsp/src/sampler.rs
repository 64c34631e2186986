use embedded_hal::delay::DelayNs;

use crate::{ensure_power_of_two, ConfigError};

/// An ADC channel that returns one unsigned conversion per call.
///
/// Values are bounded by the converter width, so the pipeline never range
/// checks them.
pub trait SampleSource {
    /// Largest value `read_sample` can return (e.g. 4095 for a 12-bit ADC).
    fn max_value(&self) -> u16;

    fn read_sample(&mut self) -> u16;
}

/// Fixed-size block of raw ADC samples, reused across iterations.
#[derive(Debug, Clone)]
pub struct SampleBlock<const N: usize> {
    samples: [u16; N],
}

impl<const N: usize> SampleBlock<N> {
    pub fn new() -> Result<Self, ConfigError> {
        ensure_power_of_two(N)?;
        Ok(Self { samples: [0; N] })
    }

    pub fn samples(&self) -> &[u16; N] {
        &self.samples
    }

    /// Mutable access for sources that fill the block without a [`Sampler`].
    pub fn samples_mut(&mut self) -> &mut [u16; N] {
        &mut self.samples
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }
}

/// Busy-waiting ADC sampler.
///
/// `fill` reads the source N times with `period_us` between reads and does
/// not yield. The whole acquisition (`acquisition_time_us`) is time during
/// which the main loop cannot service anything but interrupts, so the block
/// length and period must stay small.
pub struct Sampler<A> {
    source: A,
    period_us: u32,
}

impl<A: SampleSource> Sampler<A> {
    pub fn new(source: A, period_us: u32) -> Self {
        Self { source, period_us }
    }

    pub fn period_us(&self) -> u32 {
        self.period_us
    }

    /// Total time spent in one `fill` for an N-sample block, excluding the
    /// conversions themselves.
    pub fn acquisition_time_us(&self, n: usize) -> u32 {
        self.period_us.saturating_mul(n as u32)
    }

    pub fn max_value(&self) -> u16 {
        self.source.max_value()
    }

    /// Overwrite `block` with fresh samples.
    pub fn fill<const N: usize, D: DelayNs>(&mut self, block: &mut SampleBlock<N>, delay: &mut D) {
        for sample in block.samples.iter_mut() {
            *sample = self.source.read_sample();
            delay.delay_us(self.period_us);
        }
    }

    pub fn source(&self) -> &A {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut A {
        &mut self.source
    }
}
