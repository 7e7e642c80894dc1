//! Utility functions for image filtering and formatting
//!
//! Provides helper functions for file I/O, summaries, and formatting
//! that are used by client applications.

use crate::comparator::ComparisonResult;
use crate::filter::{filter, FilterOutput};
use crate::mask::FilterKind;
use crate::plane::Raster;
use crate::Result;

/// Load an image from file and run one frequency-domain filter on it
#[cfg(not(target_arch = "wasm32"))]
pub fn load_and_filter<P: AsRef<std::path::Path>>(
    path: P,
    kind: FilterKind,
    cutoff: f64,
) -> Result<(Raster, FilterOutput)> {
    let (info, image) = crate::image_io::load(path.as_ref())?;
    log::info!(
        "Loaded image: {}x{}, {} channels ({})",
        info.width,
        info.height,
        info.channels,
        info.source_color
    );

    let output = filter(&image, kind, cutoff)?;
    Ok((image, output))
}

/// Format a PSNR value in dB
pub fn format_psnr(psnr: f64) -> String {
    if psnr.is_infinite() {
        "inf (identical)".to_string()
    } else {
        format!("{:.2} dB", psnr)
    }
}

/// Format an image size as `WxH`
pub fn format_size(rows: usize, cols: usize) -> String {
    format!("{}x{}", cols, rows)
}

/// Get analysis summary string for one filter run
pub fn filter_summary(output: &FilterOutput) -> String {
    let analysis = &output.analysis;
    let mut summary = String::new();

    summary.push_str(&format!(
        "{} filter, cutoff {}:\n",
        analysis.kind, analysis.cutoff
    ));
    summary.push_str(&format!(
        "  Image: {}, {} channels\n",
        format_size(output.image.rows(), output.image.cols()),
        output.image.channels()
    ));
    summary.push_str(&format!("  MSE: {:.4}\n", analysis.mse));
    summary.push_str(&format!("  PSNR: {}\n", format_psnr(analysis.psnr)));
    summary.push_str(&format!("  SSIM: {:.4}\n", analysis.ssim));
    summary.push_str(&format!(
        "  Frequencies passed: {} ({:.2}%), blocked: {}\n",
        analysis.frequencies_passed, analysis.percent_passed, analysis.frequencies_blocked
    ));

    for (ch_idx, channel) in analysis.channels.iter().enumerate() {
        summary.push_str(&format!(
            "  Channel {}: {:.2}% energy retained, mean {:.2} -> {:.2}, std {:.2} -> {:.2}\n",
            ch_idx,
            channel.energy_retained_percent,
            channel.original_stats.mean,
            channel.filtered_stats.mean,
            channel.original_stats.std,
            channel.filtered_stats.std
        ));
    }

    summary
}

/// Get summary string for a lowpass/highpass comparison
pub fn comparison_summary(result: &ComparisonResult) -> String {
    let mut summary = String::new();

    summary.push_str(&format!(
        "Filter comparison at cutoff {}:\n",
        result.lowpass.analysis.cutoff
    ));
    for (label, output) in [("Lowpass: ", &result.lowpass), ("Highpass:", &result.highpass)] {
        summary.push_str(&format!(
            "  {} MSE {:.4}, PSNR {}, SSIM {:.4}\n",
            label,
            output.analysis.mse,
            format_psnr(output.analysis.psnr),
            output.analysis.ssim
        ));
    }
    summary.push_str(&format!("  MSE difference: {:.4}\n", result.mse_difference));
    summary.push_str(&format!(
        "  Sharpness: original {:.2}, lowpass {:.2} ({:+.2}), highpass {:.2} ({:+.2})\n",
        result.original_sharpness,
        result.lowpass_sharpness,
        result.lowpass_sharpness_delta,
        result.highpass_sharpness,
        result.highpass_sharpness_delta
    ));

    summary
}

/// Per-channel histograms as CSV: one row per intensity, one column per channel
pub fn histogram_csv(image: &Raster) -> String {
    let hist = crate::metrics::histograms(image);
    let mut csv = String::from("value");
    for ch in 0..hist.len() {
        csv.push_str(&format!(",channel_{}", ch));
    }
    csv.push('\n');

    for value in 0..256 {
        csv.push_str(&value.to_string());
        for channel in &hist {
            csv.push_str(&format!(",{}", channel[value]));
        }
        csv.push('\n');
    }
    csv
}

/// Commonly used filter settings
pub mod presets {
    use super::*;
    use crate::params::FourierParams;

    /// Preset information structure
    pub struct PresetInfo {
        pub id: usize,
        pub name: &'static str,
        pub description: &'static str,
        pub kind: FilterKind,
        pub params: FourierParams,
    }

    /// Get all available presets with descriptions
    pub fn list_presets() -> Vec<PresetInfo> {
        vec![
            PresetInfo {
                id: 1,
                name: "Default Smoothing",
                description: "Lowpass, cutoff=0.14",
                kind: FilterKind::Lowpass,
                params: FourierParams::default(),
            },
            PresetInfo {
                id: 2,
                name: "Gentle Smoothing",
                description: "Lowpass, cutoff=0.35",
                kind: FilterKind::Lowpass,
                params: FourierParams { cutoff: 0.35 },
            },
            PresetInfo {
                id: 3,
                name: "Heavy Blur",
                description: "Lowpass, cutoff=0.05",
                kind: FilterKind::Lowpass,
                params: FourierParams { cutoff: 0.05 },
            },
            PresetInfo {
                id: 4,
                name: "Edge Enhancement",
                description: "Highpass, cutoff=0.1",
                kind: FilterKind::Highpass,
                params: FourierParams { cutoff: 0.1 },
            },
            PresetInfo {
                id: 5,
                name: "Fine Detail",
                description: "Highpass, cutoff=0.4",
                kind: FilterKind::Highpass,
                params: FourierParams { cutoff: 0.4 },
            },
        ]
    }

    /// Get a preset by ID
    pub fn get_preset(id: usize) -> Option<PresetInfo> {
        list_presets().into_iter().find(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparator::compare_filters;
    use crate::params::FourierParams;

    #[test]
    fn test_psnr_formatting() {
        assert_eq!(format_psnr(f64::INFINITY), "inf (identical)");
        assert_eq!(format_psnr(32.456), "32.46 dB");
        assert_eq!(format_size(480, 640), "640x480");
    }

    #[test]
    fn test_filter_summary() {
        let image = Raster::filled(4, 4, 3, 128);
        let output = filter(&image, FilterKind::Lowpass, 0.14).unwrap();
        let summary = filter_summary(&output);

        assert!(summary.starts_with("lowpass filter, cutoff 0.14"));
        assert!(summary.contains("inf (identical)"));
        assert!(summary.contains("SSIM: 1.0000"));
        assert!(summary.contains("Channel 2:"));
        assert!(summary.contains("passed: 1 (6.25%), blocked: 15"));
    }

    #[test]
    fn test_comparison_summary() {
        let data = (0..64).map(|i| ((i * 37) % 256) as u8).collect();
        let image = Raster::new(8, 8, 1, data).unwrap();
        let result = compare_filters(&image, 0.2).unwrap();
        let summary = comparison_summary(&result);

        assert!(summary.contains("Filter comparison at cutoff 0.2"));
        assert!(summary.contains("Lowpass:  MSE"));
        assert!(summary.contains("Highpass: MSE"));
        assert!(summary.contains(&format!("SSIM {:.4}", result.highpass.analysis.ssim)));
    }

    #[test]
    fn test_histogram_csv() {
        let image = Raster::new(1, 2, 3, vec![0, 10, 255, 0, 20, 255]).unwrap();
        let csv = histogram_csv(&image);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 257);
        assert_eq!(lines[0], "value,channel_0,channel_1,channel_2");
        assert_eq!(lines[1], "0,2,0,0");
        assert_eq!(lines[11], "10,0,1,0");
        assert_eq!(lines[256], "255,0,0,2");
    }

    #[test]
    fn test_presets() {
        let presets = presets::list_presets();
        assert_eq!(presets.len(), 5);

        for preset in &presets {
            assert!(FourierParams::new(preset.params.cutoff).is_ok());
        }
        assert_eq!(presets::get_preset(4).unwrap().kind, FilterKind::Highpass);
        assert!(presets::get_preset(9).is_none());
    }

    #[test]
    fn test_load_and_filter_missing_file() {
        assert!(load_and_filter("/nonexistent/input.png", FilterKind::Lowpass, 0.1).is_err());
    }
}
