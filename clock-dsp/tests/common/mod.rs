#![allow(dead_code)]

use clock_dsp::SampleBlock;
use rand::{rngs::StdRng, Rng, SeedableRng};
use wavegen::{dc_bias, sine, wf};

pub const PERIOD_US: u32 = 48;
pub const SAMPLE_RATE_HZ: f32 = 1_000_000.0 / PERIOD_US as f32;

/// A biased sine sitting exactly on bin `bin` of an N-sample block.
pub fn sine_on_bin<const N: usize>(bin: usize, amplitude: f32) -> SampleBlock<N> {
    let frequency = bin as f32 * SAMPLE_RATE_HZ / N as f32;
    let waveform = wf!(f32, SAMPLE_RATE_HZ, sine!(frequency, amplitude), dc_bias!(2048.0));
    let mut block = SampleBlock::<N>::new().unwrap();
    for (slot, value) in block.samples_mut().iter_mut().zip(waveform.iter()) {
        *slot = value.round().clamp(0.0, 4095.0) as u16;
    }
    block
}

/// Seeded 12-bit noise.
pub fn noise<const N: usize>(seed: u64) -> SampleBlock<N> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut block = SampleBlock::<N>::new().unwrap();
    for slot in block.samples_mut().iter_mut() {
        *slot = rng.random_range(0..4096u16);
    }
    block
}
