//! FourierLab Library
//!
//! A library for analysing and filtering 8-bit images in the frequency domain.
//! Provides a centered 2D Fourier transform, radial lowpass/highpass masks,
//! per-channel spectral analysis and reconstruction, together with the
//! spatial filters, noise generators and comparison metrics used to grade
//! the filtered output.

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

pub mod comparator;
pub mod error;
pub mod fft2d;
pub mod filter;
pub mod image_io;
pub mod mask;
pub mod metrics;
pub mod noise;
pub mod params;
pub mod pipeline;
pub mod plane;
pub mod spatial;
pub mod utils;
pub mod visualization;

pub use comparator::{compare_filters, ComparisonResult};
pub use error::FilterError;
pub use filter::{
    filter_highpass, filter_lowpass, FilterAnalysis, FilterOutput, VisualizationBundle,
};
pub use mask::FilterKind;
pub use num_complex::Complex64;
pub use plane::{Channel, Plane, Raster};
pub use rustfft; // Re-export rustfft for external use if needed

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library
///
/// Sets up logging and other initialization for the library.
/// For WASM targets, this will set up browser-specific error handling.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn init() {
    #[cfg(feature = "wasm")]
    {
        console_error_panic_hook::set_once();
    }

    // Initialize logging
    #[cfg(all(not(target_arch = "wasm32"), feature = "env_logger"))]
    {
        let _ = env_logger::try_init();
    }
}

/// Result type for image filtering operations
pub type Result<T> = std::result::Result<T, FilterError>;
