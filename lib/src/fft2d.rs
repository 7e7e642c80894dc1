//! Centered 2D Fourier transform of single image channels
//!
//! The forward transform runs 1D FFTs over every row and then every column,
//! and shifts the result so the zero-frequency bin sits at `(rows/2, cols/2)`.
//! The inverse undoes the shift, transforms back, and converts the complex
//! result to 8-bit samples by magnitude, clipping and rounding.

use crate::error::FilterError;
use crate::plane::{Channel, ComplexSpectrum, Plane};
use crate::Result;
use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Forward/inverse 2D transform planned for one `(rows, cols)` shape
pub struct SpectralTransformer {
    rows: usize,
    cols: usize,
    row_forward: Arc<dyn Fft<f64>>,
    col_forward: Arc<dyn Fft<f64>>,
    row_inverse: Arc<dyn Fft<f64>>,
    col_inverse: Arc<dyn Fft<f64>>,
}

impl SpectralTransformer {
    /// Plan transforms for a `rows x cols` channel
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(FilterError::InvalidShape(format!(
                "Cannot transform a {}x{} channel",
                rows, cols
            )));
        }

        let mut planner = FftPlanner::<f64>::new();
        let row_forward = planner.plan_fft_forward(cols);
        let col_forward = planner.plan_fft_forward(rows);
        let row_inverse = planner.plan_fft_inverse(cols);
        let col_inverse = planner.plan_fft_inverse(rows);

        Ok(Self {
            rows,
            cols,
            row_forward,
            col_forward,
            row_inverse,
            col_inverse,
        })
    }

    /// Transform a channel into its centered complex spectrum
    pub fn forward(&self, channel: &Channel) -> Result<ComplexSpectrum> {
        self.check_shape("channel", channel.shape())?;

        let mut buffer: Vec<Complex64> = channel
            .as_slice()
            .iter()
            .map(|&v| Complex64::new(v as f64, 0.0))
            .collect();

        self.transform(&mut buffer, &self.row_forward, &self.col_forward);
        let shifted = fftshift(self.rows, self.cols, &buffer);

        Plane::new(self.rows, self.cols, shifted)
    }

    /// Reconstruct an 8-bit channel from a centered spectrum
    pub fn inverse(&self, spectrum: &ComplexSpectrum) -> Result<Channel> {
        let values = self.inverse_complex(spectrum)?;

        let samples = values
            .iter()
            .map(|c| c.norm().clamp(0.0, 255.0).round() as u8)
            .collect();

        Plane::new(self.rows, self.cols, samples)
    }

    /// Inverse transform without conversion to 8-bit (normalized by `rows * cols`)
    pub fn inverse_complex(&self, spectrum: &ComplexSpectrum) -> Result<Vec<Complex64>> {
        self.check_shape("spectrum", spectrum.shape())?;

        let mut buffer = ifftshift(self.rows, self.cols, spectrum.as_slice());
        self.transform(&mut buffer, &self.row_inverse, &self.col_inverse);

        let scale = 1.0 / (self.rows * self.cols) as f64;
        for value in buffer.iter_mut() {
            *value *= scale;
        }

        Ok(buffer)
    }

    fn check_shape(&self, what: &str, shape: (usize, usize)) -> Result<()> {
        let expected = (self.rows, self.cols);
        if shape != expected {
            return Err(FilterError::shape_mismatch(what, expected, shape));
        }
        Ok(())
    }

    /// Row pass over the contiguous buffer, then a gather/scatter column pass
    fn transform(
        &self,
        buffer: &mut [Complex64],
        row_fft: &Arc<dyn Fft<f64>>,
        col_fft: &Arc<dyn Fft<f64>>,
    ) {
        // rustfft processes every `cols`-sized chunk of the buffer
        row_fft.process(buffer);

        let mut column = vec![Complex64::new(0.0, 0.0); self.rows];
        for c in 0..self.cols {
            for r in 0..self.rows {
                column[r] = buffer[r * self.cols + c];
            }
            col_fft.process(&mut column);
            for r in 0..self.rows {
                buffer[r * self.cols + c] = column[r];
            }
        }
    }
}

/// Move the zero-frequency bin from `(0, 0)` to `(rows/2, cols/2)`
pub fn fftshift<T: Copy>(rows: usize, cols: usize, data: &[T]) -> Vec<T> {
    let mut out = data.to_vec();
    for r in 0..rows {
        let dst_r = (r + rows / 2) % rows;
        for c in 0..cols {
            let dst_c = (c + cols / 2) % cols;
            out[dst_r * cols + dst_c] = data[r * cols + c];
        }
    }
    out
}

/// Exact inverse of [`fftshift`], also for odd sizes
pub fn ifftshift<T: Copy>(rows: usize, cols: usize, data: &[T]) -> Vec<T> {
    let mut out = data.to_vec();
    for r in 0..rows {
        let src_r = (r + rows / 2) % rows;
        for c in 0..cols {
            let src_c = (c + cols / 2) % cols;
            out[r * cols + c] = data[src_r * cols + src_c];
        }
    }
    out
}
