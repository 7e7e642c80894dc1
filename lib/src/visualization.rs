//! Rendering of spectra, masks and image differences
//!
//! Turns the floating-point planes produced by the filters into 8-bit
//! rasters a viewer can show, and exports whole visualization bundles.

#[cfg(not(target_arch = "wasm32"))]
use std::path::{Path, PathBuf};

use crate::error::FilterError;
use crate::filter::VisualizationBundle;
use crate::plane::{Channel, Mask, Plane, Raster};
use crate::Result;

/// Color map types for spectrum visualization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMap {
    Viridis,
    Grayscale,
    Jet,
}

impl ColorMap {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "viridis" => Some(Self::Viridis),
            "gray" | "grayscale" => Some(Self::Grayscale),
            "jet" => Some(Self::Jet),
            _ => None,
        }
    }
}

/// Viridis sampled at 0, 0.25, 0.5, 0.75 and 1
const VIRIDIS_STOPS: [[f64; 3]; 5] = [
    [68.0, 1.0, 84.0],
    [59.0, 82.0, 139.0],
    [33.0, 145.0, 140.0],
    [94.0, 201.0, 98.0],
    [253.0, 231.0, 37.0],
];

fn viridis(v: f64) -> [u8; 3] {
    let pos = v * (VIRIDIS_STOPS.len() - 1) as f64;
    let i = (pos.floor() as usize).min(VIRIDIS_STOPS.len() - 2);
    let t = pos - i as f64;
    let (lo, hi) = (VIRIDIS_STOPS[i], VIRIDIS_STOPS[i + 1]);
    [0, 1, 2].map(|c| (lo[c] + (hi[c] - lo[c]) * t).round() as u8)
}

/// Jet ramps: each channel is a trapezoid centred a quarter apart
fn jet(v: f64) -> [u8; 3] {
    let ramp = |center: f64| (1.5 - (4.0 * v - center).abs()).clamp(0.0, 1.0);
    [ramp(3.0), ramp(2.0), ramp(1.0)].map(|c| (c * 255.0) as u8)
}

/// Map a value in `[0, 1]` to an RGB triple
pub fn value_to_color(value: f64, colormap: ColorMap) -> [u8; 3] {
    let v = value.clamp(0.0, 1.0);

    match colormap {
        ColorMap::Viridis => viridis(v),
        ColorMap::Grayscale => {
            let gray = (v * 255.0).round() as u8;
            [gray, gray, gray]
        }
        ColorMap::Jet => jet(v),
    }
}

/// Finite min and max of a plane, `None` if it has no finite values
fn finite_range(plane: &Plane<f64>) -> Option<(f64, f64)> {
    plane
        .as_slice()
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Scale a plane to `[0, 1]`; constant planes map to all zeros
pub fn normalize_unit(plane: &Plane<f64>) -> Plane<f64> {
    match finite_range(plane) {
        Some((lo, hi)) if hi > lo => {
            let range = hi - lo;
            plane.map(|&v| ((v - lo) / range).clamp(0.0, 1.0))
        }
        _ => plane.map(|_| 0.0),
    }
}

/// Min-max normalize a plane into an 8-bit channel
pub fn normalize_to_u8(plane: &Plane<f64>) -> Channel {
    normalize_unit(plane).map(|&v| (v * 255.0).round() as u8)
}

/// Binary mask as 0/255 channel
pub fn mask_to_u8(mask: &Mask) -> Channel {
    mask.map(|&v| (v * 255.0).round().clamp(0.0, 255.0) as u8)
}

/// Normalize a plane and render it through a colour map
pub fn colorize(plane: &Plane<f64>, colormap: ColorMap) -> Raster {
    let unit = normalize_unit(plane);
    let data = unit
        .as_slice()
        .iter()
        .flat_map(|&v| value_to_color(v, colormap))
        .collect();
    Raster::from_parts(plane.rows(), plane.cols(), 3, data)
}

/// Per-pixel absolute difference averaged over colour channels
pub fn absolute_difference(a: &Raster, b: &Raster) -> Result<Plane<f64>> {
    if a.shape() != b.shape() || a.channels() != b.channels() {
        return Err(FilterError::InvalidShape(format!(
            "cannot diff {}x{}x{} against {}x{}x{}",
            a.rows(),
            a.cols(),
            a.channels(),
            b.rows(),
            b.cols(),
            b.channels()
        )));
    }

    let channels = a.channels();
    let color = a.color_channels().max(1);
    let data = a
        .as_slice()
        .chunks_exact(channels)
        .zip(b.as_slice().chunks_exact(channels))
        .map(|(pa, pb)| {
            let sum: f64 = pa[..color]
                .iter()
                .zip(&pb[..color])
                .map(|(&x, &y)| (x as f64 - y as f64).abs())
                .sum();
            sum / color as f64
        })
        .collect();
    Ok(Plane::from_parts(a.rows(), a.cols(), data))
}

/// Jet heatmap of where two images differ
pub fn difference_heatmap(a: &Raster, b: &Raster) -> Result<Raster> {
    Ok(colorize(&absolute_difference(a, b)?, ColorMap::Jet))
}

/// Rendered 8-bit images for a visualization bundle
#[derive(Debug, Clone)]
pub struct RenderedBundle {
    pub original_spectrum: Raster,
    pub filtered_spectrum: Raster,
    pub mask: Raster,
}

pub fn render_bundle(bundle: &VisualizationBundle, colormap: ColorMap) -> RenderedBundle {
    let spectrum = |plane: &Plane<f64>| match colormap {
        ColorMap::Grayscale => Raster::from_channel(normalize_to_u8(plane)),
        _ => colorize(plane, colormap),
    };
    RenderedBundle {
        original_spectrum: spectrum(&bundle.original_spectrum),
        filtered_spectrum: spectrum(&bundle.filtered_spectrum),
        mask: Raster::from_channel(mask_to_u8(&bundle.mask)),
    }
}

/// Write `<prefix>_original_spectrum.png`, `<prefix>_filtered_spectrum.png` and
/// `<prefix>_mask.png` into `dir`
#[cfg(not(target_arch = "wasm32"))]
pub fn export_bundle<P: AsRef<Path>>(
    bundle: &VisualizationBundle,
    dir: P,
    prefix: &str,
    colormap: ColorMap,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)
        .map_err(|e| FilterError::ImageNotWritable(format!("{}: {}", dir.display(), e)))?;

    let rendered = render_bundle(bundle, colormap);
    let outputs = [
        ("original_spectrum", &rendered.original_spectrum),
        ("filtered_spectrum", &rendered.filtered_spectrum),
        ("mask", &rendered.mask),
    ];

    let mut written = Vec::with_capacity(outputs.len());
    for (name, raster) in outputs {
        let path = dir.join(format!("{}_{}.png", prefix, name));
        crate::image_io::save(raster, &path)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::filter_lowpass;

    #[test]
    fn test_normalize_min_max() {
        let plane = Plane::new(1, 3, vec![-10.0, 0.0, 10.0]).unwrap();
        assert_eq!(normalize_to_u8(&plane).as_slice(), &[0, 128, 255]);
    }

    #[test]
    fn test_normalize_constant_is_zero() {
        let plane = Plane::filled(2, 2, 42.0);
        assert!(normalize_to_u8(&plane).as_slice().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_normalize_ignores_non_finite() {
        let plane = Plane::new(1, 3, vec![f64::NEG_INFINITY, 0.0, 1.0]).unwrap();
        assert_eq!(normalize_to_u8(&plane).as_slice(), &[0, 0, 255]);
    }

    #[test]
    fn test_mask_to_u8() {
        let mask = Plane::new(1, 2, vec![0.0, 1.0]).unwrap();
        assert_eq!(mask_to_u8(&mask).as_slice(), &[0, 255]);
    }

    #[test]
    fn test_colormap_endpoints() {
        assert_eq!(value_to_color(0.0, ColorMap::Grayscale), [0, 0, 0]);
        assert_eq!(value_to_color(1.0, ColorMap::Grayscale), [255, 255, 255]);
        assert_eq!(value_to_color(0.0, ColorMap::Jet), [0, 0, 127]);
        assert_eq!(value_to_color(0.5, ColorMap::Jet)[1], 255);
        assert_eq!(value_to_color(1.0, ColorMap::Jet), [127, 0, 0]);
        let clamped = value_to_color(2.0, ColorMap::Jet);
        assert_eq!(clamped, value_to_color(1.0, ColorMap::Jet));
        assert_eq!(ColorMap::from_name("JET"), Some(ColorMap::Jet));
        assert_eq!(ColorMap::from_name("rainbow"), None);
    }

    #[test]
    fn test_viridis_stops() {
        assert_eq!(value_to_color(0.0, ColorMap::Viridis), [68, 1, 84]);
        assert_eq!(value_to_color(0.5, ColorMap::Viridis), [33, 145, 140]);
        assert_eq!(value_to_color(1.0, ColorMap::Viridis), [253, 231, 37]);

        // Halfway between the first two stops
        assert_eq!(value_to_color(0.125, ColorMap::Viridis), [64, 42, 112]);
        assert_eq!(ColorMap::from_name("plasma"), None);
    }

    #[test]
    fn test_difference_heatmap() {
        let a = Raster::new(1, 2, 4, vec![10, 10, 10, 255, 0, 0, 0, 255]).unwrap();
        let b = Raster::new(1, 2, 4, vec![10, 10, 10, 0, 90, 90, 90, 0]).unwrap();

        // Alpha differences are ignored
        let diff = absolute_difference(&a, &b).unwrap();
        assert_eq!(diff.as_slice(), &[0.0, 90.0]);

        let heatmap = difference_heatmap(&a, &b).unwrap();
        assert_eq!(heatmap.channels(), 3);
        assert_eq!(heatmap.shape(), (1, 2));

        let other = Raster::filled(2, 2, 4, 0);
        assert!(difference_heatmap(&a, &other).is_err());
    }

    #[test]
    fn test_render_bundle_shapes() {
        let image = Raster::filled(6, 8, 3, 100);
        let output = filter_lowpass(&image, 0.3).unwrap();
        let rendered = render_bundle(&output.visualization, ColorMap::Viridis);

        assert_eq!(rendered.original_spectrum.shape(), (6, 8));
        assert_eq!(rendered.original_spectrum.channels(), 3);
        assert_eq!(rendered.mask.channels(), 1);

        let gray = render_bundle(&output.visualization, ColorMap::Grayscale);
        assert_eq!(gray.filtered_spectrum.channels(), 1);
    }

    #[test]
    fn test_export_bundle_writes_files() {
        let image = Raster::filled(4, 4, 1, 50);
        let output = filter_lowpass(&image, 0.5).unwrap();
        let dir = std::env::temp_dir().join(format!("fourierlab_export_{}", std::process::id()));

        let written =
            export_bundle(&output.visualization, &dir, "lowpass", ColorMap::Grayscale).unwrap();
        assert_eq!(written.len(), 3);
        for path in &written {
            assert!(path.exists());
        }

        let _ = std::fs::remove_dir_all(&dir);
    }
}
