//! Image comparison metrics
//!
//! MSE/PSNR here are the same definitions the filters report, so a filter's
//! own analysis and an after-the-fact comparison always agree.

use ::image::imageops::FilterType;

use crate::error::FilterError;
use crate::image_io::{from_dynamic, to_dynamic};
use crate::plane::{Channel, Plane, Raster};
use crate::Result;

/// Peak sample value for 8-bit images
pub const MAX_PIXEL_VALUE: f64 = 255.0;

const SSIM_K1: f64 = 0.01;
const SSIM_K2: f64 = 0.03;
const SSIM_WINDOW: usize = 7;

/// Full set of comparison figures between two images
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonMetrics {
    pub mse: f64,
    pub psnr: f64,
    pub mae: f64,
    pub ssim: f64,
    /// Pearson correlation; `None` when either image is constant
    pub correlation: Option<f64>,
    /// Mean absolute difference between per-channel means
    pub color_difference: f64,
    /// Common `(rows, cols)` the metrics were computed at
    pub compared_shape: (usize, usize),
    /// Whether the inputs had to be resized to `compared_shape`
    pub resized: bool,
}

impl std::fmt::Display for ComparisonMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MSE={:.4}, PSNR={}, MAE={:.4}, SSIM={:.4}, correlation={}, color diff={:.2}",
            self.mse,
            crate::utils::format_psnr(self.psnr),
            self.mae,
            self.ssim,
            self.correlation
                .map(|c| format!("{:.4}", c))
                .unwrap_or_else(|| "n/a".to_string()),
            self.color_difference
        )
    }
}

fn check_same_shape(a: &Raster, b: &Raster) -> Result<()> {
    if a.shape() != b.shape() || a.channels() != b.channels() {
        return Err(FilterError::InvalidShape(format!(
            "cannot compare {}x{}x{} with {}x{}x{}",
            a.rows(),
            a.cols(),
            a.channels(),
            b.rows(),
            b.cols(),
            b.channels()
        )));
    }
    Ok(())
}

fn mean_of<I: Iterator<Item = f64>>(values: I, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    values.sum::<f64>() / count as f64
}

/// Mean squared error over every sample of two same-shaped images
pub fn mse(a: &Raster, b: &Raster) -> Result<f64> {
    check_same_shape(a, b)?;
    let diffs = a
        .as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(&x, &y)| (x as f64 - y as f64).powi(2));
    Ok(mean_of(diffs, a.as_slice().len()))
}

/// Mean absolute error over every sample of two same-shaped images
pub fn mae(a: &Raster, b: &Raster) -> Result<f64> {
    check_same_shape(a, b)?;
    let diffs = a
        .as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(&x, &y)| (x as f64 - y as f64).abs());
    Ok(mean_of(diffs, a.as_slice().len()))
}

/// PSNR in dB, `+inf` exactly when `mse == 0`
pub fn psnr_from_mse(mse: f64) -> f64 {
    if mse == 0.0 {
        f64::INFINITY
    } else {
        20.0 * (MAX_PIXEL_VALUE / mse.sqrt()).log10()
    }
}

pub fn psnr(a: &Raster, b: &Raster) -> Result<f64> {
    Ok(psnr_from_mse(mse(a, b)?))
}

/// Luma plane (`0.299 R + 0.587 G + 0.114 B`), alpha ignored
pub fn luma(image: &Raster) -> Channel {
    if image.channels() < 3 {
        return image.channel(0);
    }
    let channels = image.channels();
    let data = image
        .as_slice()
        .chunks_exact(channels)
        .map(|px| {
            (0.299 * px[0] as f64 + 0.587 * px[1] as f64 + 0.114 * px[2] as f64)
                .round()
                .clamp(0.0, 255.0) as u8
        })
        .collect();
    Plane::from_parts(image.rows(), image.cols(), data)
}

/// Largest odd window no bigger than 7 that fits in both dimensions
fn ssim_window(rows: usize, cols: usize) -> usize {
    let min_dim = rows.min(cols);
    let fitting = if min_dim % 2 == 1 { min_dim } else { min_dim.saturating_sub(1) };
    SSIM_WINDOW.min(fitting).max(1)
}

/// Mean structural similarity of two gray planes
///
/// Uniform window with sample covariance and the usual `K1 = 0.01`,
/// `K2 = 0.03` constants over an 8-bit data range. Only windows fully
/// inside the image contribute.
pub fn ssim_channel(a: &Channel, b: &Channel) -> Result<f64> {
    if a.shape() != b.shape() {
        return Err(FilterError::shape_mismatch(
            "second plane",
            a.shape(),
            b.shape(),
        ));
    }
    let (rows, cols) = a.shape();
    if rows == 0 || cols == 0 {
        return Err(FilterError::EmptyImage { rows, cols });
    }
    if a == b {
        return Ok(1.0);
    }

    let win = ssim_window(rows, cols);
    let np = (win * win) as f64;
    let cov_norm = if win > 1 { np / (np - 1.0) } else { 1.0 };
    let c1 = (SSIM_K1 * MAX_PIXEL_VALUE).powi(2);
    let c2 = (SSIM_K2 * MAX_PIXEL_VALUE).powi(2);

    let xa = a.as_slice();
    let xb = b.as_slice();
    let mut total = 0.0;
    let mut count = 0usize;

    for r0 in 0..=rows - win {
        for c0 in 0..=cols - win {
            let (mut sx, mut sy, mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0, 0.0, 0.0);
            for r in r0..r0 + win {
                for c in c0..c0 + win {
                    let x = xa[r * cols + c] as f64;
                    let y = xb[r * cols + c] as f64;
                    sx += x;
                    sy += y;
                    sxx += x * x;
                    syy += y * y;
                    sxy += x * y;
                }
            }
            let (ux, uy) = (sx / np, sy / np);
            let vx = cov_norm * (sxx / np - ux * ux);
            let vy = cov_norm * (syy / np - uy * uy);
            let vxy = cov_norm * (sxy / np - ux * uy);

            let numerator = (2.0 * ux * uy + c1) * (2.0 * vxy + c2);
            let denominator = (ux * ux + uy * uy + c1) * (vx + vy + c2);
            total += numerator / denominator;
            count += 1;
        }
    }

    Ok(total / count as f64)
}

/// SSIM computed on the luma of both images
pub fn ssim(a: &Raster, b: &Raster) -> Result<f64> {
    check_same_shape(a, b)?;
    ssim_channel(&luma(a), &luma(b))
}

/// Pearson correlation over all samples
pub fn correlation(a: &Raster, b: &Raster) -> Result<Option<f64>> {
    check_same_shape(a, b)?;
    let n = a.as_slice().len();
    if n == 0 {
        return Ok(None);
    }

    let ma = mean_of(a.as_slice().iter().map(|&v| v as f64), n);
    let mb = mean_of(b.as_slice().iter().map(|&v| v as f64), n);

    let (mut cov, mut va, mut vb) = (0.0, 0.0, 0.0);
    for (&x, &y) in a.as_slice().iter().zip(b.as_slice()) {
        let dx = x as f64 - ma;
        let dy = y as f64 - mb;
        cov += dx * dy;
        va += dx * dx;
        vb += dy * dy;
    }

    if va == 0.0 || vb == 0.0 {
        return Ok(None);
    }
    Ok(Some(cov / (va * vb).sqrt()))
}

/// Mean absolute difference between the per-channel means
pub fn color_difference(a: &Raster, b: &Raster) -> Result<f64> {
    check_same_shape(a, b)?;
    let channels = a.channels();
    let diffs: Vec<f64> = (0..channels)
        .map(|ch| (a.channel(ch).stats().mean - b.channel(ch).stats().mean).abs())
        .collect();
    Ok(mean_of(diffs.into_iter(), channels))
}

/// 256-bin intensity histogram of every channel
pub fn histograms(image: &Raster) -> Vec<[u32; 256]> {
    let channels = image.channels();
    let mut hist = vec![[0u32; 256]; channels];
    if channels == 0 {
        return hist;
    }
    for px in image.as_slice().chunks_exact(channels) {
        for (ch, &v) in px.iter().enumerate() {
            hist[ch][v as usize] += 1;
        }
    }
    hist
}

/// Fold a 256-bin histogram into `buckets` equal-width bins
pub fn bucket_histogram(hist: &[u32; 256], buckets: usize) -> Vec<u32> {
    let buckets = buckets.clamp(1, 256);
    let mut out = vec![0u32; buckets];
    for (value, &count) in hist.iter().enumerate() {
        out[value * buckets / 256] += count;
    }
    out
}

/// Resize an image with bilinear interpolation
pub fn resize(image: &Raster, rows: usize, cols: usize) -> Result<Raster> {
    let resized =
        to_dynamic(image)?.resize_exact(cols as u32, rows as u32, FilterType::Triangle);
    Ok(from_dynamic(resized))
}

/// Compare two images, resizing both to their common minimum size if needed
pub fn compare_images(a: &Raster, b: &Raster) -> Result<ComparisonMetrics> {
    if a.channels() != b.channels() {
        return Err(FilterError::InvalidShape(format!(
            "cannot compare {} channels with {}",
            a.channels(),
            b.channels()
        )));
    }

    let resized = a.shape() != b.shape();
    let (a, b) = if resized {
        let rows = a.rows().min(b.rows());
        let cols = a.cols().min(b.cols());
        log::info!("Resizing images to {}x{} for comparison", cols, rows);
        (resize(a, rows, cols)?, resize(b, rows, cols)?)
    } else {
        (a.clone(), b.clone())
    };

    let mse = mse(&a, &b)?;
    Ok(ComparisonMetrics {
        mse,
        psnr: psnr_from_mse(mse),
        mae: mae(&a, &b)?,
        ssim: ssim(&a, &b)?,
        correlation: correlation(&a, &b)?,
        color_difference: color_difference(&a, &b)?,
        compared_shape: a.shape(),
        resized,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(rows: usize, cols: usize, channels: usize, seed: usize) -> Raster {
        let data = (0..rows * cols * channels)
            .map(|i| ((i * 31 + seed * 17) % 251) as u8)
            .collect();
        Raster::new(rows, cols, channels, data).unwrap()
    }

    #[test]
    fn test_identical_images() {
        let image = pattern(12, 9, 3, 1);
        let metrics = compare_images(&image, &image).unwrap();

        assert_eq!(metrics.mse, 0.0);
        assert_eq!(metrics.psnr, f64::INFINITY);
        assert_eq!(metrics.mae, 0.0);
        assert_eq!(metrics.ssim, 1.0);
        assert!((metrics.correlation.unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(metrics.color_difference, 0.0);
        assert!(!metrics.resized);
    }

    #[test]
    fn test_mse_symmetric_and_known() {
        let a = Raster::filled(3, 3, 1, 10);
        let b = Raster::filled(3, 3, 1, 13);

        assert_eq!(mse(&a, &b).unwrap(), 9.0);
        assert_eq!(mse(&b, &a).unwrap(), 9.0);
        assert_eq!(mae(&a, &b).unwrap(), 3.0);

        let expected = 20.0 * (255.0f64 / 3.0).log10();
        assert!((psnr(&a, &b).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_mse_nonnegative_for_patterns() {
        for seed in 0..5 {
            let a = pattern(7, 5, 1, seed);
            let b = pattern(7, 5, 1, seed + 3);
            let value = mse(&a, &b).unwrap();
            assert!(value >= 0.0);
            assert_eq!(value, mse(&b, &a).unwrap());
            assert!(psnr_from_mse(value).is_finite());
        }
    }

    #[test]
    fn test_ssim_drops_for_different_images() {
        let a = pattern(16, 16, 1, 0);
        let b = Raster::filled(16, 16, 1, 128);

        let value = ssim(&a, &b).unwrap();
        assert!(value < 0.5);
        assert!(value >= -1.0);
    }

    #[test]
    fn test_ssim_window_shrinks() {
        assert_eq!(ssim_window(100, 100), 7);
        assert_eq!(ssim_window(6, 100), 5);
        assert_eq!(ssim_window(2, 2), 1);
        assert_eq!(ssim_window(1, 9), 1);

        let a = Raster::new(2, 2, 1, vec![0, 50, 100, 150]).unwrap();
        let b = Raster::new(2, 2, 1, vec![0, 50, 100, 151]).unwrap();
        let value = ssim(&a, &b).unwrap();
        assert!(value > 0.99 && value <= 1.0);
    }

    #[test]
    fn test_correlation_constant_is_none() {
        let a = Raster::filled(4, 4, 1, 3);
        let b = pattern(4, 4, 1, 2);
        assert_eq!(correlation(&a, &b).unwrap(), None);

        let inverted = Raster::new(1, 3, 1, vec![0, 100, 200]).unwrap();
        let reversed = Raster::new(1, 3, 1, vec![200, 100, 0]).unwrap();
        let r = correlation(&inverted, &reversed).unwrap().unwrap();
        assert!((r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_histograms() {
        let image = Raster::new(1, 2, 3, vec![0, 10, 255, 0, 20, 255]).unwrap();
        let hist = histograms(&image);

        assert_eq!(hist.len(), 3);
        assert_eq!(hist[0][0], 2);
        assert_eq!(hist[1][10], 1);
        assert_eq!(hist[1][20], 1);
        assert_eq!(hist[2][255], 2);
    }

    #[test]
    fn test_bucket_histogram() {
        let image = Raster::new(1, 4, 1, vec![0, 15, 16, 255]).unwrap();
        let hist = histograms(&image);

        let buckets = bucket_histogram(&hist[0], 16);
        assert_eq!(buckets.len(), 16);
        assert_eq!(buckets[0], 2);
        assert_eq!(buckets[1], 1);
        assert_eq!(buckets[15], 1);
        assert_eq!(buckets.iter().sum::<u32>(), 4);

        assert_eq!(bucket_histogram(&hist[0], 0), vec![4]);
    }

    #[test]
    fn test_luma_weights() {
        let image = Raster::new(1, 1, 4, vec![255, 0, 0, 17]).unwrap();
        assert_eq!(luma(&image).as_slice(), &[76]);
    }

    #[test]
    fn test_compare_resizes_to_common_size() {
        let a = Raster::filled(10, 8, 3, 60);
        let b = Raster::filled(6, 12, 3, 60);
        let metrics = compare_images(&a, &b).unwrap();

        assert!(metrics.resized);
        assert_eq!(metrics.compared_shape, (6, 8));
        assert!(metrics.mse < 1.0);
    }

    #[test]
    fn test_shape_errors() {
        let a = Raster::filled(2, 2, 1, 0);
        let b = Raster::filled(2, 3, 1, 0);
        assert!(mse(&a, &b).is_err());

        let c = Raster::filled(2, 2, 3, 0);
        assert!(compare_images(&a, &c).is_err());
    }
}
