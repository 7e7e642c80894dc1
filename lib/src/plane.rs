//! Image and single-plane array types
//!
//! `Plane<T>` is a row-major 2D array used for channels, spectra, frequency
//! grids and masks. `Raster` is an interleaved multi-channel 8-bit image.

use crate::error::FilterError;
use crate::Result;
use num_complex::Complex64;

/// Row-major 2D array
#[derive(Debug, Clone, PartialEq)]
pub struct Plane<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

/// A single 8-bit colour plane
pub type Channel = Plane<u8>;

/// Centered complex spectrum of a channel
pub type ComplexSpectrum = Plane<Complex64>;

/// Normalized radial frequency distances in `[0, 1]`
pub type FrequencyGrid = Plane<f64>;

/// Pass/block mask of `0.0` and `1.0` values
pub type Mask = Plane<f64>;

/// Log-scaled magnitude spectrum (`20 * log10(|F| + eps)`)
pub type MagnitudeSpectrum = Plane<f64>;

impl<T> Plane<T> {
    /// Create a plane from row-major data
    pub fn new(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(FilterError::InvalidShape(format!(
                "{}x{} plane needs {} samples, got {}",
                rows,
                cols,
                rows * cols,
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Build from data whose length is already known to match
    pub(crate) fn from_parts(rows: usize, cols: usize, data: Vec<T>) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        Self { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Get the sample at `(row, col)`, if in range
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row < self.rows && col < self.cols {
            self.data.get(row * self.cols + col)
        } else {
            None
        }
    }

    /// Element-wise map into a new plane of the same shape
    pub fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> Plane<U> {
        Plane {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl<T: Clone> Plane<T> {
    /// Create a plane with every sample set to `value`
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }
}

impl Plane<u8> {
    /// Mean, standard deviation and range of the samples
    pub fn stats(&self) -> ChannelStats {
        ChannelStats::from_samples(self.data.iter().map(|&v| v as f64))
    }
}

/// Summary statistics of one channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelStats {
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl ChannelStats {
    /// Compute statistics in a single pass (Welford), all in f64
    pub fn from_samples<I: IntoIterator<Item = f64>>(samples: I) -> Self {
        let mut count = 0usize;
        let mut mean = 0.0;
        let mut m2 = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for value in samples {
            count += 1;
            let delta = value - mean;
            mean += delta / count as f64;
            m2 += delta * (value - mean);
            min = min.min(value);
            max = max.max(value);
        }

        if count == 0 {
            return Self {
                mean: 0.0,
                std: 0.0,
                min: 0.0,
                max: 0.0,
            };
        }

        Self {
            mean,
            std: (m2 / count as f64).sqrt(),
            min,
            max,
        }
    }
}

impl std::fmt::Display for ChannelStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "mean={:.2}, std={:.2}, range=[{:.0}, {:.0}]",
            self.mean, self.std, self.min, self.max
        )
    }
}

/// Interleaved 8-bit image (`rows x cols x channels`)
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    rows: usize,
    cols: usize,
    channels: usize,
    data: Vec<u8>,
}

impl Raster {
    /// Create a raster from interleaved samples
    ///
    /// Only the buffer length is checked here; the filters enforce the
    /// non-empty and channel-count invariants so they can report them.
    pub fn new(rows: usize, cols: usize, channels: usize, data: Vec<u8>) -> Result<Self> {
        if data.len() != rows * cols * channels {
            return Err(FilterError::InvalidShape(format!(
                "{}x{}x{} image needs {} samples, got {}",
                rows,
                cols,
                channels,
                rows * cols * channels,
                data.len()
            )));
        }
        Ok(Self {
            rows,
            cols,
            channels,
            data,
        })
    }

    pub(crate) fn from_parts(rows: usize, cols: usize, channels: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), rows * cols * channels);
        Self {
            rows,
            cols,
            channels,
            data,
        }
    }

    /// Create a raster with every sample set to `value`
    pub fn filled(rows: usize, cols: usize, channels: usize, value: u8) -> Self {
        Self {
            rows,
            cols,
            channels,
            data: vec![value; rows * cols * channels],
        }
    }

    /// Create a single-channel raster from a channel
    pub fn from_channel(channel: Channel) -> Self {
        let (rows, cols) = channel.shape();
        Self {
            rows,
            cols,
            channels: 1,
            data: channel.into_vec(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Spatial shape `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Whether the last channel is alpha (4-channel images)
    pub fn has_alpha(&self) -> bool {
        self.channels == 4
    }

    /// Number of colour (non-alpha) channels
    pub fn color_channels(&self) -> usize {
        if self.has_alpha() {
            3
        } else {
            self.channels
        }
    }

    /// Sample at `(row, col, channel)`
    pub fn get(&self, row: usize, col: usize, channel: usize) -> Option<u8> {
        if row < self.rows && col < self.cols && channel < self.channels {
            Some(self.data[(row * self.cols + col) * self.channels + channel])
        } else {
            None
        }
    }

    /// Split into channel planes, order preserved
    pub fn split(&self) -> Vec<Channel> {
        (0..self.channels)
            .map(|ch| self.channel(ch))
            .collect()
    }

    /// Extract a single channel plane
    pub fn channel(&self, index: usize) -> Channel {
        let data: Vec<u8> = self
            .data
            .iter()
            .skip(index)
            .step_by(self.channels.max(1))
            .copied()
            .collect();
        Plane {
            rows: self.rows,
            cols: self.cols,
            data,
        }
    }

    /// Merge channel planes back into an interleaved raster
    pub fn merge(channels: &[Channel]) -> Result<Self> {
        let first = channels
            .first()
            .ok_or_else(|| FilterError::InvalidShape("no channels to merge".to_string()))?;
        let (rows, cols) = first.shape();

        for (i, channel) in channels.iter().enumerate() {
            if channel.shape() != (rows, cols) {
                return Err(FilterError::shape_mismatch(
                    &format!("channel {}", i),
                    (rows, cols),
                    channel.shape(),
                ));
            }
        }

        let num_channels = channels.len();
        let mut data = vec![0u8; rows * cols * num_channels];
        for (ch, channel) in channels.iter().enumerate() {
            for (i, &value) in channel.as_slice().iter().enumerate() {
                data[i * num_channels + ch] = value;
            }
        }

        Ok(Self {
            rows,
            cols,
            channels: num_channels,
            data,
        })
    }

    /// Apply `f` to every colour sample, leaving alpha untouched
    pub fn map_color<F: FnMut(usize, usize, usize, u8) -> u8>(&self, mut f: F) -> Raster {
        let mut out = self.clone();
        let color = self.color_channels();
        for row in 0..self.rows {
            for col in 0..self.cols {
                let base = (row * self.cols + col) * self.channels;
                for ch in 0..color {
                    out.data[base + ch] = f(row, col, ch, self.data[base + ch]);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_length_check() {
        assert!(Plane::new(2, 3, vec![0u8; 6]).is_ok());
        assert!(matches!(
            Plane::new(2, 3, vec![0u8; 5]),
            Err(FilterError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_get_out_of_range_is_none() {
        let plane = Plane::new(2, 3, vec![1u8, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(plane.get(1, 2), Some(&6));
        assert_eq!(plane.get(2, 0), None);
        assert_eq!(plane.get(0, 3), None);
    }

    #[test]
    fn test_split_merge_preserves_order() {
        // 1x2 image, 3 channels: pixel0 = (1,2,3), pixel1 = (4,5,6)
        let raster = Raster::new(1, 2, 3, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let channels = raster.split();

        assert_eq!(channels.len(), 3);
        assert_eq!(channels[0].as_slice(), &[1, 4]);
        assert_eq!(channels[1].as_slice(), &[2, 5]);
        assert_eq!(channels[2].as_slice(), &[3, 6]);

        let merged = Raster::merge(&channels).unwrap();
        assert_eq!(merged, raster);
    }

    #[test]
    fn test_merge_rejects_mismatched_channels() {
        let a = Plane::filled(2, 2, 0u8);
        let b = Plane::filled(2, 3, 0u8);
        assert!(Raster::merge(&[a, b]).is_err());
        assert!(Raster::merge(&[]).is_err());
    }

    #[test]
    fn test_channel_stats() {
        let channel = Plane::new(1, 4, vec![0u8, 0, 255, 255]).unwrap();
        let stats = channel.stats();

        assert!((stats.mean - 127.5).abs() < 1e-12);
        assert!((stats.std - 127.5).abs() < 1e-12);
        assert_eq!(stats.min, 0.0);
        assert_eq!(stats.max, 255.0);
    }

    #[test]
    fn test_map_color_keeps_alpha() {
        let raster = Raster::filled(2, 2, 4, 10);
        let mapped = raster.map_color(|_, _, _, v| v + 1);

        for row in 0..2 {
            for col in 0..2 {
                assert_eq!(mapped.get(row, col, 0), Some(11));
                assert_eq!(mapped.get(row, col, 2), Some(11));
                assert_eq!(mapped.get(row, col, 3), Some(10));
            }
        }
    }
}
