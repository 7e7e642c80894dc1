//! Multi-channel frequency-domain filtering
//!
//! Splits an image into its channels, filters each one through a shared
//! radial mask, merges the results back in the original channel order and
//! aggregates global quality and frequency-occupancy figures.

use crate::error::FilterError;
use crate::fft2d::SpectralTransformer;
use crate::mask::{self, FilterKind};
use crate::metrics;
use crate::pipeline::{ChannelAnalysis, ChannelFilterPipeline};
use crate::plane::{FrequencyGrid, MagnitudeSpectrum, Mask, Raster};
use crate::Result;

/// Channel counts the filter accepts (gray, colour, colour + alpha)
pub const SUPPORTED_CHANNELS: [usize; 3] = [1, 3, 4];

/// Aggregate result of one filter invocation
#[derive(Debug, Clone)]
pub struct FilterAnalysis {
    /// Mean squared error of the whole merged image against the original
    pub mse: f64,
    /// Peak signal-to-noise ratio in dB, `+inf` when `mse == 0`
    pub psnr: f64,
    /// Structural similarity of the luma planes, 1.0 when unchanged
    pub ssim: f64,
    pub cutoff: f64,
    pub frequencies_passed: usize,
    pub frequencies_blocked: usize,
    pub percent_passed: f64,
    pub kind: FilterKind,
    /// Per-channel records, in channel order
    pub channels: Vec<ChannelAnalysis>,
}

/// Arrays needed to render the filter for a viewer
///
/// Spectra are taken from the first channel only.
#[derive(Debug, Clone)]
pub struct VisualizationBundle {
    pub mask: Mask,
    pub frequency_grid: FrequencyGrid,
    pub original_spectrum: MagnitudeSpectrum,
    pub filtered_spectrum: MagnitudeSpectrum,
}

/// Filtered image together with its analysis and visualization payloads
#[derive(Debug, Clone)]
pub struct FilterOutput {
    pub image: Raster,
    pub analysis: FilterAnalysis,
    pub visualization: VisualizationBundle,
}

/// Check the invariants every filtered image must satisfy
pub fn validate_image(image: &Raster) -> Result<()> {
    let (rows, cols) = image.shape();
    if rows == 0 || cols == 0 {
        return Err(FilterError::EmptyImage { rows, cols });
    }
    if !SUPPORTED_CHANNELS.contains(&image.channels()) {
        return Err(FilterError::UnsupportedChannelCount(image.channels()));
    }
    Ok(())
}

/// Run a radial lowpass filter
pub fn filter_lowpass(image: &Raster, cutoff: f64) -> Result<FilterOutput> {
    filter(image, FilterKind::Lowpass, cutoff)
}

/// Run a radial highpass filter
pub fn filter_highpass(image: &Raster, cutoff: f64) -> Result<FilterOutput> {
    filter(image, FilterKind::Highpass, cutoff)
}

/// Filter every channel of `image` through one shared radial mask
pub fn filter(image: &Raster, kind: FilterKind, cutoff: f64) -> Result<FilterOutput> {
    validate_image(image)?;

    let (rows, cols) = image.shape();
    log::info!(
        "Applying {} filter: {}x{} image, {} channels, cutoff {}",
        kind,
        rows,
        cols,
        image.channels(),
        cutoff
    );

    let (frequency_grid, mask) = mask::build(rows, cols, kind, cutoff);
    let transformer = SpectralTransformer::new(rows, cols)?;
    let pipeline = ChannelFilterPipeline::new(&transformer);

    let channels = image.split();
    let mut filtered_channels = Vec::with_capacity(channels.len());
    let mut channel_analyses = Vec::with_capacity(channels.len());

    for (ch_idx, channel) in channels.iter().enumerate() {
        let (filtered, analysis) = pipeline.apply(channel, &mask)?;
        log::debug!(
            "Channel {}/{}: {:.2}% energy retained",
            ch_idx + 1,
            channels.len(),
            analysis.energy_retained_percent
        );
        filtered_channels.push(filtered);
        channel_analyses.push(analysis);
    }

    let filtered_image = Raster::merge(&filtered_channels)?;

    let mse = metrics::mse(image, &filtered_image)?;
    let psnr = metrics::psnr_from_mse(mse);
    let ssim = metrics::ssim(image, &filtered_image)?;

    let total = mask.len();
    let frequencies_passed = mask::count_passed(&mask);
    let frequencies_blocked = total - frequencies_passed;
    let percent_passed = frequencies_passed as f64 / total as f64 * 100.0;

    log::info!(
        "{} filter complete: MSE {:.4}, PSNR {:.2} dB, SSIM {:.4}, {}/{} frequencies passed",
        kind,
        mse,
        psnr,
        ssim,
        frequencies_passed,
        total
    );

    // Non-empty: validate_image guarantees at least one channel
    let first = &channel_analyses[0];
    let visualization = VisualizationBundle {
        mask,
        frequency_grid,
        original_spectrum: first.original_spectrum.clone(),
        filtered_spectrum: first.filtered_spectrum.clone(),
    };

    let analysis = FilterAnalysis {
        mse,
        psnr,
        ssim,
        cutoff,
        frequencies_passed,
        frequencies_blocked,
        percent_passed,
        kind,
        channels: channel_analyses,
    };

    Ok(FilterOutput {
        image: filtered_image,
        analysis,
        visualization,
    })
}
