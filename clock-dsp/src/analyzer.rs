use core::f32::consts::PI;

use microfft::Complex32;

use crate::{ensure_power_of_two, ConfigError, SampleBlock};

type Kernel = fn(&mut [Complex32]);

macro_rules! fft_kernels {
    ($($n:literal => $kernel:ident),* $(,)?) => {
        /// Picks the fixed-size complex FFT for a block length.
        fn kernel_for(n: usize) -> Option<Kernel> {
            match n {
                $($n => Some((|buffer: &mut [Complex32]| {
                    if let Ok(array) = <&mut [Complex32; $n]>::try_from(buffer) {
                        let _ = microfft::complex::$kernel(array);
                    }
                }) as Kernel),)*
                _ => None,
            }
        }
    };
}

fft_kernels!(
    2 => cfft_2,
    4 => cfft_4,
    8 => cfft_8,
    16 => cfft_16,
    32 => cfft_32,
    64 => cfft_64,
    128 => cfft_128,
    256 => cfft_256,
    512 => cfft_512,
    1024 => cfft_1024,
    2048 => cfft_2048,
    4096 => cfft_4096,
);

/// Width of one bin in Hz for a block of `n` samples taken `period_us` apart.
pub fn frequency_resolution(period_us: u32, n: usize) -> f32 {
    1.0 / (period_us as f32 * 1e-6 * n as f32)
}

/// Per-bin magnitude and phase of the latest analyzed block.
#[derive(Debug, Clone)]
pub struct Spectrum<const N: usize> {
    magnitudes: [f32; N],
    phases: [f32; N],
    resolution_hz: f32,
}

impl<const N: usize> Spectrum<N> {
    /// Build a spectrum from precomputed bins, e.g. a recorded capture.
    pub fn from_parts(magnitudes: [f32; N], phases: [f32; N], resolution_hz: f32) -> Self {
        Self {
            magnitudes,
            phases,
            resolution_hz,
        }
    }

    pub fn magnitudes(&self) -> &[f32; N] {
        &self.magnitudes
    }

    /// Phases in (-π, π].
    pub fn phases(&self) -> &[f32; N] {
        &self.phases
    }

    pub fn resolution_hz(&self) -> f32 {
        self.resolution_hz
    }

    /// Center frequency of bin `k`.
    pub fn bin_frequency(&self, k: usize) -> f32 {
        k as f32 * self.resolution_hz
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }
}

/// Full-length DFT over a [`SampleBlock`] with a rectangular window.
///
/// The color mapper's clamp constants assume the unwindowed magnitude scale,
/// so no window function is applied.
pub struct SpectralAnalyzer<const N: usize> {
    buffer: [Complex32; N],
    spectrum: Spectrum<N>,
    kernel: Kernel,
}

impl<const N: usize> SpectralAnalyzer<N> {
    pub fn new(sampling_period_us: u32) -> Result<Self, ConfigError> {
        ensure_power_of_two(N)?;
        let kernel = kernel_for(N).ok_or(ConfigError::UnsupportedBlockSize(N))?;
        Ok(Self {
            buffer: [Complex32::new(0.0, 0.0); N],
            spectrum: Spectrum {
                magnitudes: [0.0; N],
                phases: [0.0; N],
                resolution_hz: frequency_resolution(sampling_period_us, N),
            },
            kernel,
        })
    }

    /// Transform `block` and return the refreshed spectrum.
    pub fn analyze(&mut self, block: &SampleBlock<N>) -> &Spectrum<N> {
        for (slot, &sample) in self.buffer.iter_mut().zip(block.samples().iter()) {
            *slot = Complex32::new(sample as f32, 0.0);
        }

        (self.kernel)(&mut self.buffer);

        for (k, bin) in self.buffer.iter().enumerate() {
            self.spectrum.magnitudes[k] = libm::sqrtf(bin.re * bin.re + bin.im * bin.im);
            let phase = libm::atan2f(bin.im, bin.re);
            self.spectrum.phases[k] = if phase <= -PI { PI } else { phase };
        }

        &self.spectrum
    }

    pub fn spectrum(&self) -> &Spectrum<N> {
        &self.spectrum
    }
}
