//! Typed parameter sets for every image operation
//!
//! Each operation takes a fixed parameter struct with sensible defaults and
//! a validating constructor, instead of discovering parameters at runtime.

use crate::error::FilterError;
use crate::Result;

/// Default cutoff ratio for the Fourier filters
pub const DEFAULT_CUTOFF: f64 = 0.14;

/// Parameters for the frequency-domain filters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FourierParams {
    /// Normalized radial cutoff in `(0, 1]`
    pub cutoff: f64,
}

impl Default for FourierParams {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_CUTOFF,
        }
    }
}

impl FourierParams {
    /// Create Fourier filter parameters with validation
    pub fn new(cutoff: f64) -> Result<Self> {
        if !cutoff.is_finite() || cutoff <= 0.0 || cutoff > 1.0 {
            return Err(FilterError::InvalidParameter(format!(
                "Cutoff must be in (0, 1], got {}",
                cutoff
            )));
        }
        Ok(Self { cutoff })
    }
}

/// Normalize a kernel size to an odd integer >= 1
pub fn odd_kernel_size(ksize: usize) -> usize {
    let ksize = ksize.max(1);
    if ksize % 2 == 0 {
        ksize + 1
    } else {
        ksize
    }
}

/// Parameters for the median filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MedianParams {
    /// Square aperture size, always odd
    pub ksize: usize,
}

impl Default for MedianParams {
    fn default() -> Self {
        Self { ksize: 5 }
    }
}

impl MedianParams {
    pub fn new(ksize: usize) -> Self {
        Self {
            ksize: odd_kernel_size(ksize),
        }
    }
}

/// Parameters for the Gaussian blur
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianBlurParams {
    /// Square kernel size, always odd
    pub ksize: usize,
    /// Standard deviation; `<= 0` derives it from `ksize`
    pub sigma: f64,
}

impl Default for GaussianBlurParams {
    fn default() -> Self {
        Self {
            ksize: 5,
            sigma: 1.0,
        }
    }
}

impl GaussianBlurParams {
    pub fn new(ksize: usize, sigma: f64) -> Result<Self> {
        if !sigma.is_finite() {
            return Err(FilterError::InvalidParameter(format!(
                "Sigma must be finite, got {}",
                sigma
            )));
        }
        Ok(Self {
            ksize: odd_kernel_size(ksize),
            sigma,
        })
    }

    /// Sigma actually used by the kernel
    pub fn effective_sigma(&self) -> f64 {
        if self.sigma > 0.0 {
            self.sigma
        } else {
            0.3 * ((self.ksize as f64 - 1.0) * 0.5 - 1.0) + 0.8
        }
    }
}

/// Parameters for salt-and-pepper noise
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpulseNoiseParams {
    /// Percentage of pixels to corrupt, in `(0, 100]`
    pub percent: f64,
}

impl ImpulseNoiseParams {
    pub fn new(percent: f64) -> Result<Self> {
        if !(percent > 0.0 && percent <= 100.0) {
            return Err(FilterError::InvalidParameter(format!(
                "Noise percentage must be in (0, 100], got {}",
                percent
            )));
        }
        Ok(Self { percent })
    }
}

/// Parameters for additive Gaussian noise
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianNoiseParams {
    pub std_dev: f64,
}

impl Default for GaussianNoiseParams {
    fn default() -> Self {
        Self { std_dev: 1.0 }
    }
}

impl GaussianNoiseParams {
    pub fn new(std_dev: f64) -> Result<Self> {
        if !std_dev.is_finite() || std_dev < 0.0 {
            return Err(FilterError::InvalidParameter(format!(
                "Standard deviation must be non-negative, got {}",
                std_dev
            )));
        }
        Ok(Self { std_dev })
    }
}

/// Parameters for diagonal sinusoidal interference
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodicNoiseParams {
    /// Pattern cycles across the image width
    pub frequency: f64,
    /// Peak amplitude in intensity levels
    pub amplitude: f64,
}

impl Default for PeriodicNoiseParams {
    fn default() -> Self {
        Self {
            frequency: 30.0,
            amplitude: 50.0,
        }
    }
}

impl PeriodicNoiseParams {
    pub fn new(frequency: f64, amplitude: f64) -> Result<Self> {
        if !frequency.is_finite() || !amplitude.is_finite() {
            return Err(FilterError::InvalidParameter(format!(
                "Frequency and amplitude must be finite, got {} and {}",
                frequency, amplitude
            )));
        }
        Ok(Self {
            frequency,
            amplitude,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fourier_params_validation() {
        assert_eq!(FourierParams::default().cutoff, 0.14);
        assert!(FourierParams::new(0.5).is_ok());
        assert!(FourierParams::new(1.0).is_ok());

        assert!(FourierParams::new(0.0).is_err());
        assert!(FourierParams::new(-0.1).is_err());
        assert!(FourierParams::new(1.5).is_err());
        assert!(FourierParams::new(f64::NAN).is_err());
    }

    #[test]
    fn test_kernel_size_normalization() {
        assert_eq!(odd_kernel_size(0), 1);
        assert_eq!(odd_kernel_size(4), 5);
        assert_eq!(odd_kernel_size(7), 7);
        assert_eq!(MedianParams::new(2).ksize, 3);
    }

    #[test]
    fn test_gaussian_sigma_from_ksize() {
        let params = GaussianBlurParams::new(5, 0.0).unwrap();
        // 0.3 * ((5 - 1) * 0.5 - 1) + 0.8
        assert!((params.effective_sigma() - 1.1).abs() < 1e-12);
        assert_eq!(GaussianBlurParams::default().effective_sigma(), 1.0);
    }

    #[test]
    fn test_noise_params_validation() {
        assert!(ImpulseNoiseParams::new(0.0).is_err());
        assert!(ImpulseNoiseParams::new(100.0).is_ok());
        assert!(ImpulseNoiseParams::new(100.5).is_err());
        assert!(GaussianNoiseParams::new(-1.0).is_err());
        assert!(PeriodicNoiseParams::new(f64::INFINITY, 1.0).is_err());
    }
}
