//! Synthetic noise generators
//!
//! Every generator draws from a caller-supplied RNG so results are
//! reproducible with a seeded `StdRng`. Alpha channels are never touched.

use std::f64::consts::PI;

use rand::Rng;

use crate::params::{GaussianNoiseParams, ImpulseNoiseParams, PeriodicNoiseParams};
use crate::plane::Raster;

/// Border kept free of impulses on images big enough to afford it
const IMPULSE_MARGIN: usize = 2;

/// Above this mean the Poisson draw switches to a normal approximation
const POISSON_KNUTH_LIMIT: f64 = 30.0;

fn clamp_u8(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Standard normal sample via Box-Muller
fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // Shift away from zero so ln never sees 0
    let u1: f64 = 1.0 - rng.random::<f64>();
    let u2: f64 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Salt-and-pepper noise
///
/// `percent / 2` of the pixels become white and as many become black,
/// across all colour channels at once.
pub fn impulse_noise<R: Rng + ?Sized>(
    image: &Raster,
    params: ImpulseNoiseParams,
    rng: &mut R,
) -> Raster {
    let mut out = image.clone();
    let (rows, cols) = image.shape();
    if rows == 0 || cols == 0 {
        return out;
    }

    let pixels = (rows * cols) as f64;
    let count = (params.percent * pixels / 200.0) as usize;

    let margin = if rows > 2 * IMPULSE_MARGIN && cols > 2 * IMPULSE_MARGIN {
        IMPULSE_MARGIN
    } else {
        0
    };
    let row_range = margin..rows - margin;
    let col_range = margin..cols - margin;

    log::info!("Impulse noise: {} salt and {} pepper pixels", count, count);

    let channels = image.channels();
    let color = image.color_channels();
    for value in [255u8, 0u8] {
        for _ in 0..count {
            let r = rng.random_range(row_range.clone());
            let c = rng.random_range(col_range.clone());
            let base = (r * cols + c) * channels;
            out.as_mut_slice()[base..base + color].fill(value);
        }
    }
    out
}

/// Additive zero-mean Gaussian noise, clipped to `[0, 255]`
pub fn gaussian_noise<R: Rng + ?Sized>(
    image: &Raster,
    params: GaussianNoiseParams,
    rng: &mut R,
) -> Raster {
    log::info!("Gaussian noise, sigma {}", params.std_dev);
    if params.std_dev == 0.0 {
        return image.clone();
    }
    image.map_color(|_, _, _, v| clamp_u8(v as f64 + params.std_dev * standard_normal(&mut *rng)))
}

/// Diagonal sinusoidal interference pattern
pub fn periodic_noise(image: &Raster, params: PeriodicNoiseParams) -> Raster {
    log::info!(
        "Periodic noise, frequency {}, amplitude {}",
        params.frequency,
        params.amplitude
    );
    let cols = image.cols().max(1) as f64;
    image.map_color(|row, col, _, v| {
        let phase = 2.0 * PI * params.frequency * (col + row) as f64 / cols;
        clamp_u8(v as f64 + params.amplitude * phase.sin())
    })
}

/// One Poisson draw with mean `lambda`
fn poisson_sample<R: Rng + ?Sized>(lambda: f64, rng: &mut R) -> f64 {
    if lambda <= 0.0 {
        return 0.0;
    }
    if lambda > POISSON_KNUTH_LIMIT {
        return (lambda + lambda.sqrt() * standard_normal(rng)).max(0.0);
    }

    // Knuth
    let limit = (-lambda).exp();
    let mut k = 0u32;
    let mut p = 1.0;
    loop {
        p *= rng.random::<f64>();
        if p <= limit {
            return k as f64;
        }
        k += 1;
    }
}

/// Shot noise: each colour sample is replaced by a Poisson draw with its own value as mean
pub fn poisson_noise<R: Rng + ?Sized>(image: &Raster, rng: &mut R) -> Raster {
    log::info!("Poisson noise");
    image.map_color(|_, _, _, v| clamp_u8(poisson_sample(v as f64, &mut *rng)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn count_value(image: &Raster, value: u8) -> usize {
        image.as_slice().iter().filter(|&&v| v == value).count()
    }

    #[test]
    fn test_impulse_noise_counts_and_margin() {
        let image = Raster::filled(20, 20, 1, 128);
        let mut rng = StdRng::seed_from_u64(7);
        let noisy = impulse_noise(&image, ImpulseNoiseParams::new(10.0).unwrap(), &mut rng);

        // 20 salt and 20 pepper draws; collisions can only lower the totals
        let salt = count_value(&noisy, 255);
        let pepper = count_value(&noisy, 0);
        assert!(salt > 0 && salt <= 20);
        assert!(pepper > 0 && pepper <= 20);

        for r in 0..20 {
            for c in 0..20 {
                if r < 2 || r >= 18 || c < 2 || c >= 18 {
                    assert_eq!(noisy.get(r, c, 0), Some(128));
                }
            }
        }
    }

    #[test]
    fn test_impulse_noise_small_image_has_no_margin() {
        let image = Raster::filled(2, 2, 3, 100);
        let mut rng = StdRng::seed_from_u64(1);
        let noisy = impulse_noise(&image, ImpulseNoiseParams::new(100.0).unwrap(), &mut rng);

        // Each pixel is either untouched or fully white/black
        for px in noisy.as_slice().chunks_exact(3) {
            assert!([[100; 3], [255; 3], [0; 3]].iter().any(|expected| px == expected));
        }
    }

    #[test]
    fn test_noise_keeps_alpha() {
        let image = Raster::filled(8, 8, 4, 60);
        let mut rng = StdRng::seed_from_u64(3);

        let outputs = [
            impulse_noise(&image, ImpulseNoiseParams::new(50.0).unwrap(), &mut rng),
            gaussian_noise(&image, GaussianNoiseParams::new(20.0).unwrap(), &mut rng),
            periodic_noise(&image, PeriodicNoiseParams::default()),
            poisson_noise(&image, &mut rng),
        ];
        for out in &outputs {
            assert!(out.channel(3).as_slice().iter().all(|&v| v == 60));
        }
    }

    #[test]
    fn test_gaussian_noise_statistics() {
        let image = Raster::filled(64, 64, 1, 128);
        let mut rng = StdRng::seed_from_u64(42);
        let noisy = gaussian_noise(&image, GaussianNoiseParams::new(10.0).unwrap(), &mut rng);

        let stats = noisy.channel(0).stats();
        assert!((stats.mean - 128.0).abs() < 1.0);
        assert!((stats.std - 10.0).abs() < 1.0);
    }

    #[test]
    fn test_gaussian_noise_zero_sigma_is_identity() {
        let image = Raster::new(1, 3, 1, vec![0, 128, 255]).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let params = GaussianNoiseParams::new(0.0).unwrap();
        assert_eq!(gaussian_noise(&image, params, &mut rng), image);
    }

    #[test]
    fn test_seeded_noise_is_reproducible() {
        let image = Raster::filled(16, 16, 3, 90);
        let params = GaussianNoiseParams::new(5.0).unwrap();
        let a = gaussian_noise(&image, params, &mut StdRng::seed_from_u64(11));
        let b = gaussian_noise(&image, params, &mut StdRng::seed_from_u64(11));
        assert_eq!(a, b);
    }

    #[test]
    fn test_periodic_noise_pattern() {
        let image = Raster::filled(4, 8, 1, 100);
        let params = PeriodicNoiseParams::new(2.0, 50.0).unwrap();
        let noisy = periodic_noise(&image, params);

        // sin(0) at the origin, a quarter period one pixel over
        assert_eq!(noisy.get(0, 0, 0), Some(100));
        assert_eq!(noisy.get(0, 1, 0), Some(150));
        assert_eq!(noisy.get(1, 0, 0), Some(150));
        assert_eq!(noisy.get(0, 3, 0), Some(50));
    }

    #[test]
    fn test_poisson_noise_mean() {
        let image = Raster::filled(64, 64, 1, 20);
        let mut rng = StdRng::seed_from_u64(5);
        let noisy = poisson_noise(&image, &mut rng);
        let stats = noisy.channel(0).stats();

        assert!((stats.mean - 20.0).abs() < 0.5);
        assert!((stats.std - 20f64.sqrt()).abs() < 0.5);

        let black = Raster::filled(3, 3, 1, 0);
        assert_eq!(poisson_noise(&black, &mut rng), black);
    }
}
