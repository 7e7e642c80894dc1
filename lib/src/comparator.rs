//! Side-by-side comparison of lowpass and highpass filtering

use crate::filter::{filter_highpass, filter_lowpass, FilterOutput};
use crate::plane::{ChannelStats, Raster};
use crate::spatial::laplacian;
use crate::Result;

/// Lowpass and highpass outputs at one cutoff, with sharpness figures
#[derive(Debug, Clone)]
pub struct ComparisonResult {
    pub lowpass: FilterOutput,
    pub highpass: FilterOutput,
    pub original_sharpness: f64,
    pub lowpass_sharpness: f64,
    pub highpass_sharpness: f64,
    /// `|lowpass.mse - highpass.mse|`
    pub mse_difference: f64,
    /// Signed: negative when the lowpass removed edge energy
    pub lowpass_sharpness_delta: f64,
    pub highpass_sharpness_delta: f64,
}

/// Variance of the Laplacian response over all channels
pub fn sharpness(image: &Raster) -> f64 {
    let responses = image.split().into_iter().map(|ch| laplacian(&ch));
    let samples: Vec<f64> = responses.flat_map(|r| r.into_vec()).collect();
    let stats = ChannelStats::from_samples(samples);
    stats.std * stats.std
}

/// Run both filters at `cutoff` and compare their effect on sharpness
pub fn compare_filters(image: &Raster, cutoff: f64) -> Result<ComparisonResult> {
    let lowpass = filter_lowpass(image, cutoff)?;
    let highpass = filter_highpass(image, cutoff)?;

    let original_sharpness = sharpness(image);
    let lowpass_sharpness = sharpness(&lowpass.image);
    let highpass_sharpness = sharpness(&highpass.image);

    log::info!(
        "Sharpness at cutoff {}: original {:.2}, lowpass {:.2}, highpass {:.2}",
        cutoff,
        original_sharpness,
        lowpass_sharpness,
        highpass_sharpness
    );

    let mse_difference = (lowpass.analysis.mse - highpass.analysis.mse).abs();

    Ok(ComparisonResult {
        lowpass,
        highpass,
        original_sharpness,
        lowpass_sharpness,
        highpass_sharpness,
        mse_difference,
        lowpass_sharpness_delta: lowpass_sharpness - original_sharpness,
        highpass_sharpness_delta: highpass_sharpness - original_sharpness,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FilterError;

    fn noisy_image(rows: usize, cols: usize) -> Raster {
        // Deterministic high-frequency texture over a mid-gray base
        let data = (0..rows * cols)
            .map(|i| {
                let r = i / cols;
                let c = i % cols;
                (100 + ((r * 7 + c * 13) % 11) * 8) as u8
            })
            .collect();
        Raster::new(rows, cols, 1, data).unwrap()
    }

    #[test]
    fn test_sharpness_of_flat_image_is_zero() {
        assert_eq!(sharpness(&Raster::filled(5, 5, 3, 42)), 0.0);
    }

    #[test]
    fn test_lowpass_reduces_sharpness() {
        let image = noisy_image(32, 32);
        let result = compare_filters(&image, 0.1).unwrap();

        assert!(result.original_sharpness > 0.0);
        assert!(result.lowpass_sharpness < result.original_sharpness);
        assert!(result.lowpass_sharpness_delta < 0.0);
        assert_eq!(
            result.lowpass_sharpness_delta,
            result.lowpass_sharpness - result.original_sharpness
        );
        assert_eq!(
            result.mse_difference,
            (result.lowpass.analysis.mse - result.highpass.analysis.mse).abs()
        );
    }

    #[test]
    fn test_masks_complement_in_comparison() {
        let image = noisy_image(16, 12);
        let result = compare_filters(&image, 0.3).unwrap();

        let low = result.lowpass.analysis.frequencies_passed;
        let high = result.highpass.analysis.frequencies_passed;
        assert_eq!(low + high, 16 * 12);
        assert_eq!(low, result.highpass.analysis.frequencies_blocked);
    }

    #[test]
    fn test_identical_images_compare_equal() {
        let image = noisy_image(16, 16);
        let copy = image.clone();

        let first = compare_filters(&image, 0.2).unwrap();
        let second = compare_filters(&copy, 0.2).unwrap();

        assert_eq!(first.original_sharpness - second.original_sharpness, 0.0);
        assert_eq!(first.lowpass_sharpness - second.lowpass_sharpness, 0.0);
        assert_eq!(first.highpass_sharpness - second.highpass_sharpness, 0.0);
        assert_eq!(first.lowpass.image, second.lowpass.image);
        assert_eq!(first.lowpass.analysis.ssim, second.lowpass.analysis.ssim);
    }

    #[test]
    fn test_errors_propagate() {
        let image = Raster::filled(3, 3, 2, 0);
        assert!(matches!(
            compare_filters(&image, 0.2),
            Err(FilterError::UnsupportedChannelCount(2))
        ));
    }
}
