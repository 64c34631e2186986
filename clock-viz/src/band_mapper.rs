use core::f32::consts::PI;
use core::ops::Range;

use clock_dsp::{ConfigError, Spectrum};

use crate::types::BandData;

/// Divisor that brings summed FFT magnitudes into color units.
pub const MAGNITUDE_DIVISOR: f32 = 255.0;

/// Splits N spectrum bins into equal, contiguous bands, one per LED.
pub struct BandMapper<const N: usize> {
    num_bands: usize,
    bins_per_band: usize,
    phase_scale: f32,
}

impl<const N: usize> BandMapper<N> {
    pub fn new(num_bands: usize, phase_scale: f32) -> Result<Self, ConfigError> {
        if num_bands == 0 || num_bands > N || N % num_bands != 0 {
            return Err(ConfigError::BandsDoNotDivideBins {
                bins: N,
                bands: num_bands,
            });
        }
        if !phase_scale.is_finite() || phase_scale <= 0.0 {
            return Err(ConfigError::InvalidPhaseScale(phase_scale));
        }

        Ok(Self {
            num_bands,
            bins_per_band: N / num_bands,
            phase_scale,
        })
    }

    pub fn num_bands(&self) -> usize {
        self.num_bands
    }

    pub fn bins_per_band(&self) -> usize {
        self.bins_per_band
    }

    pub fn phase_scale(&self) -> f32 {
        self.phase_scale
    }

    /// Bins feeding LED `band`, as a half-open range.
    pub fn band_range(&self, band: usize) -> Range<usize> {
        let start = band * self.bins_per_band;
        start..start + self.bins_per_band
    }

    pub fn band_ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        (0..self.num_bands).map(move |band| self.band_range(band))
    }

    /// Average magnitude and scaled phase over one band.
    pub fn reduce(&self, spectrum: &Spectrum<N>, band: usize) -> BandData {
        let range = self.band_range(band);
        let sum_magnitude: f32 = spectrum.magnitudes()[range.clone()].iter().sum();
        let sum_phase: f32 = spectrum.phases()[range].iter().sum();

        let bins = self.bins_per_band as f32;
        let avg_phase = sum_phase / (bins * self.phase_scale);

        BandData {
            index: band,
            avg_magnitude: sum_magnitude / (bins * MAGNITUDE_DIVISOR),
            avg_phase: avg_phase.clamp(-PI, PI),
        }
    }
}
