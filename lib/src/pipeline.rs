//! Per-channel spectral filtering and analysis

use crate::error::FilterError;
use crate::fft2d::SpectralTransformer;
use crate::plane::{Channel, ChannelStats, ComplexSpectrum, MagnitudeSpectrum, Mask};
use crate::Result;

/// Added to magnitudes before `log10` so zeroed bins stay finite
pub const LOG_EPSILON: f64 = 1e-8;

/// Spectral and statistical record of one filtered channel
#[derive(Debug, Clone)]
pub struct ChannelAnalysis {
    /// Log magnitude before masking
    pub original_spectrum: MagnitudeSpectrum,
    /// Log magnitude after masking
    pub filtered_spectrum: MagnitudeSpectrum,
    /// Sum of squared magnitudes before masking
    pub energy_original: f64,
    /// Sum of squared magnitudes after masking
    pub energy_filtered: f64,
    /// `energy_filtered / energy_original * 100`, or 0 for a zero-energy input
    pub energy_retained_percent: f64,
    pub original_stats: ChannelStats,
    pub filtered_stats: ChannelStats,
}

/// Log-scaled magnitude spectrum in decibels
pub fn magnitude_db(spectrum: &ComplexSpectrum) -> MagnitudeSpectrum {
    spectrum.map(|c| 20.0 * (c.norm() + LOG_EPSILON).log10())
}

/// Sum of squared magnitudes
pub fn spectral_energy(spectrum: &ComplexSpectrum) -> f64 {
    spectrum.as_slice().iter().map(|c| c.norm_sqr()).sum()
}

/// Percentage of energy kept, 0 when there was nothing to keep
pub fn energy_retained(original: f64, filtered: f64) -> f64 {
    if original == 0.0 {
        0.0
    } else {
        filtered / original * 100.0
    }
}

/// Applies a mask to one channel's spectrum and reconstructs it
pub struct ChannelFilterPipeline<'a> {
    transformer: &'a SpectralTransformer,
}

impl<'a> ChannelFilterPipeline<'a> {
    pub fn new(transformer: &'a SpectralTransformer) -> Self {
        Self { transformer }
    }

    /// Filter a channel with a mask of the same shape
    pub fn apply(&self, channel: &Channel, mask: &Mask) -> Result<(Channel, ChannelAnalysis)> {
        if mask.shape() != channel.shape() {
            return Err(FilterError::shape_mismatch(
                "mask",
                channel.shape(),
                mask.shape(),
            ));
        }

        let spectrum = self.transformer.forward(channel)?;
        let original_spectrum = magnitude_db(&spectrum);

        let mut masked = spectrum.clone();
        for (value, &m) in masked.as_mut_slice().iter_mut().zip(mask.as_slice()) {
            *value *= m;
        }
        let filtered_spectrum = magnitude_db(&masked);

        let filtered = self.transformer.inverse(&masked)?;

        let energy_original = spectral_energy(&spectrum);
        let energy_filtered = spectral_energy(&masked);

        let analysis = ChannelAnalysis {
            original_spectrum,
            filtered_spectrum,
            energy_original,
            energy_filtered,
            energy_retained_percent: energy_retained(energy_original, energy_filtered),
            original_stats: channel.stats(),
            filtered_stats: filtered.stats(),
        };

        Ok((filtered, analysis))
    }
}
