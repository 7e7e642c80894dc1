//! Spatial-domain filters: median, Gaussian blur and Laplacian response
//!
//! Median and Gaussian go through `imageproc`, which replicates edge pixels.
//! The Laplacian keeps reflect-101 borders so sharpness scores match the
//! usual `[[0,1,0],[1,-4,1],[0,1,0]]` definition at the image edges.

use ::image::{GrayImage, ImageBuffer, Luma};

use crate::params::{GaussianBlurParams, MedianParams};
use crate::plane::{Channel, Plane, Raster};

/// Reflect-101 border index (`gfedcb|abcdefgh|gfedcba`)
fn reflect_101(index: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len as isize - 1);
    let mut i = index.rem_euclid(period);
    if i >= len as isize {
        i = period - i;
    }
    i as usize
}

fn to_gray(channel: &Channel) -> Option<GrayImage> {
    let (rows, cols) = channel.shape();
    GrayImage::from_raw(cols as u32, rows as u32, channel.as_slice().to_vec())
}

fn from_gray(image: GrayImage) -> Channel {
    let (cols, rows) = image.dimensions();
    Plane::from_parts(rows as usize, cols as usize, image.into_raw())
}

fn map_channels<F: Fn(&Channel) -> Channel>(image: &Raster, f: F) -> Raster {
    let mut out = image.clone();
    let channels = image.channels();
    for ch in 0..image.color_channels() {
        let filtered = f(&image.channel(ch));
        for (i, &v) in filtered.as_slice().iter().enumerate() {
            out.as_mut_slice()[i * channels + ch] = v;
        }
    }
    out
}

/// Median filter with a square `ksize` aperture and replicated borders
pub fn median_filter(image: &Raster, params: MedianParams) -> Raster {
    log::info!("Median filter, ksize {}", params.ksize);
    let radius = (params.ksize / 2) as u32;
    map_channels(image, |channel| match to_gray(channel) {
        Some(gray) => from_gray(imageproc::filter::median_filter(&gray, radius, radius)),
        None => channel.clone(),
    })
}

/// Normalized 1D Gaussian kernel
pub fn gaussian_kernel(ksize: usize, sigma: f64) -> Vec<f32> {
    let center = (ksize / 2) as f64;
    let weights: Vec<f64> = (0..ksize)
        .map(|i| {
            let x = i as f64 - center;
            (-(x * x) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    weights.iter().map(|w| (w / sum) as f32).collect()
}

/// Separable Gaussian blur with a `ksize` kernel and replicated borders
pub fn gaussian_blur(image: &Raster, params: GaussianBlurParams) -> Raster {
    let sigma = params.effective_sigma();
    log::info!("Gaussian blur, ksize {}, sigma {:.3}", params.ksize, sigma);
    let kernel = gaussian_kernel(params.ksize, sigma);
    map_channels(image, |channel| gaussian_channel(channel, &kernel))
}

/// Blur in f32 so the result is rounded once, not truncated per pass
fn gaussian_channel(channel: &Channel, kernel: &[f32]) -> Channel {
    let (rows, cols) = channel.shape();
    let samples = channel.as_slice().iter().map(|&v| v as f32).collect();
    let plane: ImageBuffer<Luma<f32>, Vec<f32>> =
        match ImageBuffer::from_raw(cols as u32, rows as u32, samples) {
            Some(plane) => plane,
            None => return channel.clone(),
        };

    let blurred = imageproc::filter::separable_filter_equal(&plane, kernel);
    let out = blurred
        .into_raw()
        .into_iter()
        .map(|v| v.round().clamp(0.0, 255.0) as u8)
        .collect();
    Plane::from_parts(rows, cols, out)
}

/// 4-neighbour Laplacian response `[[0,1,0],[1,-4,1],[0,1,0]]`, reflect-101 borders
pub fn laplacian(channel: &Channel) -> Plane<f64> {
    let (rows, cols) = channel.shape();
    let src = channel.as_slice();
    let at = |r: isize, c: isize| src[reflect_101(r, rows) * cols + reflect_101(c, cols)] as f64;

    let mut out = Vec::with_capacity(rows * cols);
    for r in 0..rows as isize {
        for c in 0..cols as isize {
            let value = at(r - 1, c) + at(r + 1, c) + at(r, c - 1) + at(r, c + 1) - 4.0 * at(r, c);
            out.push(value);
        }
    }

    Plane::from_parts(rows, cols, out)
}
