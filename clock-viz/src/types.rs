/// One LED's share of the spectrum, reduced to a single magnitude and phase.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub struct BandData {
    pub index: usize,         // LED index this band feeds
    pub avg_magnitude: f32,   // Σ magnitude / (bins_per_led × 255), unclamped
    pub avg_phase: f32,       // Σ phase / (bins_per_led × c), clamped to [-π, π]
}
