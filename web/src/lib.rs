use fourierlab_lib::{
    compare_filters,
    filter::{filter, FilterAnalysis},
    image_io::{encode_png, load_bytes, ImageInfo},
    metrics::{self, ComparisonMetrics},
    noise,
    params::{FourierParams, GaussianNoiseParams, ImpulseNoiseParams, PeriodicNoiseParams},
    utils,
    visualization::{self, ColorMap},
    FilterKind, FilterOutput, Raster,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use wasm_bindgen::prelude::*;

type JsResult<T> = std::result::Result<T, JsValue>;

// Set up panic hook for better error messages
fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

#[wasm_bindgen(start)]
pub fn start() {
    init_panic_hook();
    fourierlab_lib::init();
}

fn js_error<E: std::fmt::Display>(e: E) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_uint8_array(bytes: &[u8]) -> js_sys::Uint8Array {
    let array = js_sys::Uint8Array::new_with_length(bytes.len() as u32);
    array.copy_from(bytes);
    array
}

// Serde-compatible info structs for passing to JavaScript
#[derive(Serialize)]
struct ImageInfoJs {
    width: usize,
    height: usize,
    channels: usize,
    source_color: String,
}

impl From<&ImageInfo> for ImageInfoJs {
    fn from(info: &ImageInfo) -> Self {
        Self {
            width: info.width,
            height: info.height,
            channels: info.channels,
            source_color: info.source_color.clone(),
        }
    }
}

#[derive(Serialize)]
struct ChannelAnalysisJs {
    energy_original: f64,
    energy_filtered: f64,
    energy_retained_percent: f64,
    original_mean: f64,
    filtered_mean: f64,
    original_std: f64,
    filtered_std: f64,
}

#[derive(Serialize)]
struct FilterAnalysisJs {
    kind: String,
    cutoff: f64,
    mse: f64,
    /// `None` when the output is identical to the input
    psnr: Option<f64>,
    ssim: f64,
    frequencies_passed: usize,
    frequencies_blocked: usize,
    percent_passed: f64,
    channels: Vec<ChannelAnalysisJs>,
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

impl From<&FilterAnalysis> for FilterAnalysisJs {
    fn from(analysis: &FilterAnalysis) -> Self {
        Self {
            kind: analysis.kind.name().to_string(),
            cutoff: analysis.cutoff,
            mse: analysis.mse,
            psnr: finite(analysis.psnr),
            ssim: analysis.ssim,
            frequencies_passed: analysis.frequencies_passed,
            frequencies_blocked: analysis.frequencies_blocked,
            percent_passed: analysis.percent_passed,
            channels: analysis
                .channels
                .iter()
                .map(|ch| ChannelAnalysisJs {
                    energy_original: ch.energy_original,
                    energy_filtered: ch.energy_filtered,
                    energy_retained_percent: ch.energy_retained_percent,
                    original_mean: ch.original_stats.mean,
                    filtered_mean: ch.filtered_stats.mean,
                    original_std: ch.original_stats.std,
                    filtered_std: ch.filtered_stats.std,
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct ComparisonJs {
    lowpass: FilterAnalysisJs,
    highpass: FilterAnalysisJs,
    original_sharpness: f64,
    lowpass_sharpness: f64,
    highpass_sharpness: f64,
    mse_difference: f64,
    lowpass_sharpness_delta: f64,
    highpass_sharpness_delta: f64,
}

#[derive(Serialize)]
struct MetricsJs {
    mse: f64,
    psnr: Option<f64>,
    mae: f64,
    ssim: f64,
    correlation: Option<f64>,
    color_difference: f64,
    resized: bool,
}

impl From<&ComparisonMetrics> for MetricsJs {
    fn from(m: &ComparisonMetrics) -> Self {
        Self {
            mse: m.mse,
            psnr: finite(m.psnr),
            mae: m.mae,
            ssim: m.ssim,
            correlation: m.correlation,
            color_difference: m.color_difference,
            resized: m.resized,
        }
    }
}

#[derive(Serialize)]
struct HistogramsJs {
    original: Vec<Vec<u32>>,
    current: Vec<Vec<u32>>,
}

fn histogram_rows(image: &Raster) -> Vec<Vec<u32>> {
    metrics::histograms(image)
        .iter()
        .map(|hist| hist.to_vec())
        .collect()
}

#[derive(Serialize)]
struct LabInfoJs {
    image_info: Option<ImageInfoJs>,
    cutoff: f64,
    has_image: bool,
    has_filter_output: bool,
}

#[wasm_bindgen]
pub struct WasmFourierLab {
    info: Option<ImageInfo>,
    original: Option<Raster>,
    current: Option<Raster>,
    last_output: Option<FilterOutput>,
    params: FourierParams,
    rng: StdRng,
}

impl WasmFourierLab {
    fn current(&self) -> JsResult<&Raster> {
        self.current
            .as_ref()
            .ok_or_else(|| JsValue::from_str("No image loaded"))
    }

    fn resolve_cutoff(&self, cutoff: Option<f64>) -> JsResult<f64> {
        match cutoff {
            Some(c) => Ok(FourierParams::new(c).map_err(js_error)?.cutoff),
            None => Ok(self.params.cutoff),
        }
    }

    fn run_filter(&mut self, kind: FilterKind, cutoff: Option<f64>) -> JsResult<JsValue> {
        let cutoff = self.resolve_cutoff(cutoff)?;
        let output = filter(self.current()?, kind, cutoff).map_err(js_error)?;

        let analysis = FilterAnalysisJs::from(&output.analysis);
        self.current = Some(output.image.clone());
        self.last_output = Some(output);

        serde_wasm_bindgen::to_value(&analysis).map_err(js_error)
    }

    fn last_bundle(&self) -> JsResult<&FilterOutput> {
        self.last_output
            .as_ref()
            .ok_or_else(|| JsValue::from_str("No filter output available"))
    }
}

#[wasm_bindgen]
impl WasmFourierLab {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        init_panic_hook();

        let seed = (js_sys::Math::random() * u64::MAX as f64) as u64;
        Self {
            info: None,
            original: None,
            current: None,
            last_output: None,
            params: FourierParams::default(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Decode an encoded image (PNG, JPEG, ...) from bytes
    #[wasm_bindgen]
    pub fn load_image_bytes(&mut self, data: js_sys::Uint8Array) -> JsResult<JsValue> {
        let (info, image) = load_bytes(&data.to_vec()).map_err(js_error)?;
        let info_js = ImageInfoJs::from(&info);

        self.info = Some(info);
        self.original = Some(image.clone());
        self.current = Some(image);
        self.last_output = None;

        serde_wasm_bindgen::to_value(&info_js).map_err(js_error)
    }

    /// Get lab information
    #[wasm_bindgen]
    pub fn get_info(&self) -> JsValue {
        let info = LabInfoJs {
            image_info: self.info.as_ref().map(ImageInfoJs::from),
            cutoff: self.params.cutoff,
            has_image: self.current.is_some(),
            has_filter_output: self.last_output.is_some(),
        };

        serde_wasm_bindgen::to_value(&info).unwrap_or(JsValue::null())
    }

    /// Set the default cutoff used when none is passed
    #[wasm_bindgen]
    pub fn set_cutoff(&mut self, cutoff: f64) -> JsResult<()> {
        self.params = FourierParams::new(cutoff).map_err(js_error)?;
        Ok(())
    }

    /// Get available presets
    #[wasm_bindgen]
    pub fn get_presets(&self) -> JsValue {
        let preset_info: Vec<_> = utils::presets::list_presets()
            .iter()
            .map(|preset| {
                serde_json::json!({
                    "id": preset.id,
                    "name": preset.name,
                    "description": preset.description,
                    "kind": preset.kind.name(),
                    "cutoff": preset.params.cutoff
                })
            })
            .collect();

        serde_wasm_bindgen::to_value(&preset_info).unwrap_or(JsValue::null())
    }

    /// Apply a filter preset by ID
    #[wasm_bindgen]
    pub fn apply_preset(&mut self, id: usize) -> JsResult<JsValue> {
        let preset = utils::presets::get_preset(id)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown preset: {}", id)))?;
        self.run_filter(preset.kind, Some(preset.params.cutoff))
    }

    #[wasm_bindgen]
    pub fn lowpass(&mut self, cutoff: Option<f64>) -> JsResult<JsValue> {
        self.run_filter(FilterKind::Lowpass, cutoff)
    }

    #[wasm_bindgen]
    pub fn highpass(&mut self, cutoff: Option<f64>) -> JsResult<JsValue> {
        self.run_filter(FilterKind::Highpass, cutoff)
    }

    /// Compare lowpass and highpass filtering without changing the current image
    #[wasm_bindgen]
    pub fn compare(&self, cutoff: Option<f64>) -> JsResult<JsValue> {
        let cutoff = self.resolve_cutoff(cutoff)?;
        let result = compare_filters(self.current()?, cutoff).map_err(js_error)?;

        let comparison = ComparisonJs {
            lowpass: FilterAnalysisJs::from(&result.lowpass.analysis),
            highpass: FilterAnalysisJs::from(&result.highpass.analysis),
            original_sharpness: result.original_sharpness,
            lowpass_sharpness: result.lowpass_sharpness,
            highpass_sharpness: result.highpass_sharpness,
            mse_difference: result.mse_difference,
            lowpass_sharpness_delta: result.lowpass_sharpness_delta,
            highpass_sharpness_delta: result.highpass_sharpness_delta,
        };
        serde_wasm_bindgen::to_value(&comparison).map_err(js_error)
    }

    /// Add synthetic noise: `impulse` (a = percent), `gaussian` (a = std_dev),
    /// `periodic` (a = frequency, b = amplitude) or `poisson`
    #[wasm_bindgen]
    pub fn add_noise(&mut self, kind: &str, a: Option<f64>, b: Option<f64>) -> JsResult<()> {
        let image = self.current()?.clone();

        let noisy = match kind.to_lowercase().as_str() {
            "impulse" => {
                let params = ImpulseNoiseParams::new(a.unwrap_or(5.0)).map_err(js_error)?;
                noise::impulse_noise(&image, params, &mut self.rng)
            }
            "gaussian" => {
                let default = GaussianNoiseParams::default().std_dev;
                let params = GaussianNoiseParams::new(a.unwrap_or(default)).map_err(js_error)?;
                noise::gaussian_noise(&image, params, &mut self.rng)
            }
            "periodic" => {
                let default = PeriodicNoiseParams::default();
                let params = PeriodicNoiseParams::new(
                    a.unwrap_or(default.frequency),
                    b.unwrap_or(default.amplitude),
                )
                .map_err(js_error)?;
                noise::periodic_noise(&image, params)
            }
            "poisson" => noise::poisson_noise(&image, &mut self.rng),
            _ => return Err(JsValue::from_str(&format!("Unknown noise type: {}", kind))),
        };

        self.current = Some(noisy);
        Ok(())
    }

    /// Quality metrics of the current image against the loaded original
    #[wasm_bindgen]
    pub fn metrics(&self) -> JsResult<JsValue> {
        let original = self
            .original
            .as_ref()
            .ok_or_else(|| JsValue::from_str("No image loaded"))?;
        let result = metrics::compare_images(original, self.current()?).map_err(js_error)?;
        serde_wasm_bindgen::to_value(&MetricsJs::from(&result)).map_err(js_error)
    }

    /// Per-channel 256-bin histograms of the original and current image
    #[wasm_bindgen]
    pub fn histograms(&self) -> JsResult<JsValue> {
        let original = self
            .original
            .as_ref()
            .ok_or_else(|| JsValue::from_str("No image loaded"))?;
        let histograms = HistogramsJs {
            original: histogram_rows(original),
            current: histogram_rows(self.current()?),
        };
        serde_wasm_bindgen::to_value(&histograms).map_err(js_error)
    }

    /// Current image encoded as PNG
    #[wasm_bindgen]
    pub fn current_png(&self) -> JsResult<js_sys::Uint8Array> {
        let bytes = encode_png(self.current()?).map_err(js_error)?;
        Ok(to_uint8_array(&bytes))
    }

    /// Spectrum or mask of the last filter as PNG: `original`, `filtered` or `mask`
    #[wasm_bindgen]
    pub fn visualization_png(&self, which: &str, colormap: &str) -> JsResult<js_sys::Uint8Array> {
        let output = self.last_bundle()?;
        let colormap = ColorMap::from_name(colormap).unwrap_or(ColorMap::Viridis);
        let rendered = visualization::render_bundle(&output.visualization, colormap);

        let raster = match which {
            "original" => &rendered.original_spectrum,
            "filtered" => &rendered.filtered_spectrum,
            "mask" => &rendered.mask,
            _ => return Err(JsValue::from_str(&format!("Unknown visualization: {}", which))),
        };
        let bytes = encode_png(raster).map_err(js_error)?;
        Ok(to_uint8_array(&bytes))
    }

    /// Heatmap of the difference between the original and current image as PNG
    #[wasm_bindgen]
    pub fn difference_png(&self) -> JsResult<js_sys::Uint8Array> {
        let original = self
            .original
            .as_ref()
            .ok_or_else(|| JsValue::from_str("No image loaded"))?;
        let heatmap =
            visualization::difference_heatmap(original, self.current()?).map_err(js_error)?;
        let bytes = encode_png(&heatmap).map_err(js_error)?;
        Ok(to_uint8_array(&bytes))
    }

    /// Reset to the originally loaded image
    #[wasm_bindgen]
    pub fn reset(&mut self) -> JsResult<()> {
        let original = self
            .original
            .clone()
            .ok_or_else(|| JsValue::from_str("No original image available"))?;
        self.current = Some(original);
        self.last_output = None;
        Ok(())
    }

    /// Get the last filter summary as string
    #[wasm_bindgen]
    pub fn get_analysis_summary(&self) -> String {
        self.last_output
            .as_ref()
            .map(utils::filter_summary)
            .unwrap_or_default()
    }
}

impl Default for WasmFourierLab {
    fn default() -> Self {
        Self::new()
    }
}
