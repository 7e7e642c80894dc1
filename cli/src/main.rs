//! FourierLab CLI
//!
//! Command-line interface for the FourierLab library.
//! Provides an interactive shell for frequency-domain image filtering,
//! spatial filters, synthetic noise and image comparison.

use std::path::Path;
use std::process;

use clap::{Arg, Command};
use fourierlab_lib::{
    compare_filters,
    filter::filter,
    image_io::{self, ImageInfo},
    metrics, noise,
    params::{
        FourierParams, GaussianBlurParams, GaussianNoiseParams, ImpulseNoiseParams, MedianParams,
        PeriodicNoiseParams,
    },
    spatial,
    utils::{self, presets},
    visualization::{self, ColorMap},
    FilterKind, FilterOutput, Raster,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Application state
struct AppState {
    original: Option<Raster>,
    current: Option<Raster>,
    info: Option<ImageInfo>,
    current_file: Option<String>,
    params: FourierParams,
    colormap: ColorMap,
    last_output: Option<FilterOutput>,
    rng: StdRng,
}

impl AppState {
    fn new(rng: StdRng) -> Self {
        Self {
            original: None,
            current: None,
            info: None,
            current_file: None,
            params: FourierParams::default(),
            colormap: ColorMap::Viridis,
            last_output: None,
            rng,
        }
    }

    fn load(&mut self, filename: &str) {
        println!("Loading file: {}", filename);
        match image_io::load(filename) {
            Ok((info, image)) => {
                println!(
                    "Loaded {}, {} channels ({})",
                    utils::format_size(image.rows(), image.cols()),
                    info.channels,
                    info.source_color
                );
                self.original = Some(image.clone());
                self.current = Some(image);
                self.info = Some(info);
                self.current_file = Some(filename.to_string());
                self.last_output = None;
            }
            Err(e) => println!("Error loading file: {}", e),
        }
    }

    /// Replace the working image, keeping the original for comparisons
    fn replace_current(&mut self, image: Raster) {
        if let Some(original) = &self.original {
            if original.shape() == image.shape() && original.channels() == image.channels() {
                if let Ok(psnr) = metrics::psnr(original, &image) {
                    println!("PSNR vs original: {}", utils::format_psnr(psnr));
                }
            }
        }
        self.current = Some(image);
    }
}

/// Print the help message showing available commands
fn print_help() {
    println!("Available commands:");
    println!("  load <filename>                    - Load an image file");
    println!("  save <filename>                    - Save the current image (format by extension)");
    println!("  info                               - Show information about the loaded image");
    println!("  reset                              - Revert to the loaded original");
    println!("  set cutoff <value>                 - Set the default cutoff (0.0-1.0]");
    println!("  set colormap <name>                - Set the spectrum colour map");
    println!("  presets                            - List available filter presets");
    println!("  preset <n>                         - Apply a filter preset");
    println!("  lowpass [cutoff]                   - Frequency-domain lowpass filter");
    println!("  highpass [cutoff]                  - Frequency-domain highpass filter");
    println!("  compare [cutoff]                   - Compare lowpass and highpass at one cutoff");
    println!("  median [ksize]                     - Median filter (default 5)");
    println!("  gaussian [ksize] [sigma]           - Gaussian blur (default 5, 1.0)");
    println!("  noise <type> [params...]           - Add synthetic noise");
    println!("  metrics [<a> <b>]                  - Compare original/current, or two files");
    println!("  diff <filename>                    - Save a heatmap of original vs current");
    println!("  histogram [file.csv]               - Show or save per-channel histograms");
    println!("  export <dir>                       - Export spectra, mask and filter output");
    println!("  help                               - Show this help message");
    println!("  quit                               - Exit the program");
    println!();
    println!("Noise types:");
    println!("  impulse <percent>                  - Salt and pepper, percent in (0, 100]");
    println!("  gaussian [std_dev]                 - Additive Gaussian noise (default 1.0)");
    println!("  periodic [frequency] [amplitude]   - Diagonal sinusoid (default 30, 50)");
    println!("  poisson                            - Shot noise");
    println!();
    println!("Colour maps: viridis, grayscale, jet");
    println!();
    println!("Examples:");
    println!("  load photo.png");
    println!("  noise periodic 20 40");
    println!("  lowpass 0.1");
    println!("  export out/");
    println!("  metrics");
    println!("  save filtered.png");
}

fn parse_or_default<T: std::str::FromStr>(parts: &[&str], index: usize, default: T) -> Option<T> {
    match parts.get(index) {
        Some(value) => value.parse::<T>().ok(),
        None => Some(default),
    }
}

fn run_filter(state: &mut AppState, kind: FilterKind, cutoff: f64) {
    let Some(image) = &state.current else {
        println!("No image loaded. Load a file first.");
        return;
    };

    match filter(image, kind, cutoff) {
        Ok(output) => {
            print!("{}", utils::filter_summary(&output));
            state.current = Some(output.image.clone());
            state.last_output = Some(output);
        }
        Err(e) => println!("Error applying {} filter: {}", kind, e),
    }
}

/// Process a user command
fn process_command(command: &str, state: &mut AppState) {
    let parts: Vec<&str> = command.split_whitespace().collect();

    if parts.is_empty() {
        return;
    }

    match parts[0] {
        "load" => {
            if parts.len() != 2 {
                println!("Usage: load <filename>");
                return;
            }
            state.load(parts[1]);
        }

        "save" => {
            if parts.len() != 2 {
                println!("Usage: save <filename>");
                return;
            }

            let Some(image) = &state.current else {
                println!("No image loaded. Load a file first.");
                return;
            };

            let filename = parts[1];
            println!("Saving to file: {}", filename);
            match image_io::save(image, filename) {
                Ok(_) => println!("File saved successfully!"),
                Err(e) => println!("Error saving file: {}", e),
            }
        }

        "info" => {
            let (Some(info), Some(current)) = (&state.info, &state.current) else {
                println!("No image loaded.");
                return;
            };

            if let Some(filename) = &state.current_file {
                println!("File: {}", filename);
            }
            let size = utils::format_size(current.rows(), current.cols());
            println!("  Size: {}", size);
            println!("  Channels: {}", current.channels());
            println!("  Decoded from: {}", info.source_color);
            for (ch_idx, channel) in current.split().iter().enumerate() {
                println!("  Channel {}: {}", ch_idx, channel.stats());
            }
            println!("  Cutoff: {}", state.params.cutoff);
            println!("  Colour map: {:?}", state.colormap);
        }

        "reset" => match &state.original {
            Some(original) => {
                state.current = Some(original.clone());
                state.last_output = None;
                println!("Reverted to the original image");
            }
            None => println!("No image loaded."),
        },

        "set" => {
            if parts.len() < 3 {
                println!("Usage: set <parameter> <value>");
                println!("Parameters: cutoff, colormap");
                return;
            }

            let value = parts[2];
            match parts[1] {
                "cutoff" => match value.parse::<f64>() {
                    Ok(cutoff) => match FourierParams::new(cutoff) {
                        Ok(params) => {
                            state.params = params;
                            println!("Cutoff set to {}", cutoff);
                        }
                        Err(e) => println!("Error setting cutoff: {}", e),
                    },
                    Err(_) => println!("Invalid cutoff: {}", value),
                },

                "colormap" => match ColorMap::from_name(value) {
                    Some(colormap) => {
                        state.colormap = colormap;
                        println!("Colour map set to {:?}", colormap);
                    }
                    None => println!("Invalid colour map: {}", value),
                },

                other => println!("Unknown parameter: {}", other),
            }
        }

        "presets" => {
            println!("Available presets:");
            for preset in presets::list_presets() {
                println!("  {}: {} - {}", preset.id, preset.name, preset.description);
            }
        }

        "preset" => {
            let Some(id) = parts.get(1).and_then(|v| v.parse::<usize>().ok()) else {
                println!("Usage: preset <n>");
                return;
            };

            match presets::get_preset(id) {
                Some(preset) => {
                    println!("Applying preset: {}", preset.name);
                    run_filter(state, preset.kind, preset.params.cutoff);
                }
                None => println!("Unknown preset: {}", id),
            }
        }

        "lowpass" | "highpass" => {
            let kind = if parts[0] == "lowpass" {
                FilterKind::Lowpass
            } else {
                FilterKind::Highpass
            };

            let cutoff = match parts.get(1) {
                Some(value) => match value.parse::<f64>().map(FourierParams::new) {
                    Ok(Ok(params)) => params.cutoff,
                    Ok(Err(e)) => {
                        println!("{}", e);
                        return;
                    }
                    Err(_) => {
                        println!("Invalid cutoff: {}", value);
                        return;
                    }
                },
                None => state.params.cutoff,
            };

            run_filter(state, kind, cutoff);
        }

        "compare" => {
            let Some(cutoff) = parse_or_default(&parts, 1, state.params.cutoff) else {
                println!("Usage: compare [cutoff]");
                return;
            };
            let Some(image) = &state.current else {
                println!("No image loaded. Load a file first.");
                return;
            };

            match compare_filters(image, cutoff) {
                Ok(result) => print!("{}", utils::comparison_summary(&result)),
                Err(e) => println!("Error comparing filters: {}", e),
            }
        }

        "median" => {
            let Some(ksize) = parse_or_default(&parts, 1, MedianParams::default().ksize) else {
                println!("Usage: median [ksize]");
                return;
            };
            let Some(image) = &state.current else {
                println!("No image loaded. Load a file first.");
                return;
            };

            let filtered = spatial::median_filter(image, MedianParams::new(ksize));
            state.replace_current(filtered);
        }

        "gaussian" => {
            let defaults = GaussianBlurParams::default();
            let ksize = parse_or_default(&parts, 1, defaults.ksize);
            let sigma = parse_or_default(&parts, 2, defaults.sigma);
            let (Some(ksize), Some(sigma)) = (ksize, sigma) else {
                println!("Usage: gaussian [ksize] [sigma]");
                return;
            };
            let Some(image) = &state.current else {
                println!("No image loaded. Load a file first.");
                return;
            };

            match GaussianBlurParams::new(ksize, sigma) {
                Ok(params) => {
                    let blurred = spatial::gaussian_blur(image, params);
                    state.replace_current(blurred);
                }
                Err(e) => println!("Error: {}", e),
            }
        }

        "noise" => {
            if parts.len() < 2 {
                println!("Usage: noise <impulse|gaussian|periodic|poisson> [params...]");
                return;
            }
            let Some(image) = state.current.clone() else {
                println!("No image loaded. Load a file first.");
                return;
            };

            let noisy = match parts[1] {
                "impulse" => parts
                    .get(2)
                    .and_then(|v| v.parse::<f64>().ok())
                    .ok_or_else(|| "Usage: noise impulse <percent>".to_string())
                    .and_then(|p| ImpulseNoiseParams::new(p).map_err(|e| e.to_string()))
                    .map(|params| noise::impulse_noise(&image, params, &mut state.rng)),
                "gaussian" => parse_or_default(&parts, 2, GaussianNoiseParams::default().std_dev)
                    .ok_or_else(|| "Usage: noise gaussian [std_dev]".to_string())
                    .and_then(|s| GaussianNoiseParams::new(s).map_err(|e| e.to_string()))
                    .map(|params| noise::gaussian_noise(&image, params, &mut state.rng)),
                "periodic" => {
                    let defaults = PeriodicNoiseParams::default();
                    match (
                        parse_or_default(&parts, 2, defaults.frequency),
                        parse_or_default(&parts, 3, defaults.amplitude),
                    ) {
                        (Some(f), Some(a)) => PeriodicNoiseParams::new(f, a)
                            .map(|params| noise::periodic_noise(&image, params))
                            .map_err(|e| e.to_string()),
                        _ => Err("Usage: noise periodic [frequency] [amplitude]".to_string()),
                    }
                }
                "poisson" => Ok(noise::poisson_noise(&image, &mut state.rng)),
                other => Err(format!("Unknown noise type: {}", other)),
            };

            match noisy {
                Ok(noisy) => state.replace_current(noisy),
                Err(e) => println!("{}", e),
            }
        }

        "metrics" => {
            let pair = match parts.len() {
                1 => match (&state.original, &state.current) {
                    (Some(a), Some(b)) => Ok((a.clone(), b.clone())),
                    _ => Err("No image loaded. Load a file first.".to_string()),
                },
                3 => image_io::load(parts[1])
                    .and_then(|(_, a)| image_io::load(parts[2]).map(|(_, b)| (a, b)))
                    .map_err(|e| format!("Error loading file: {}", e)),
                _ => Err("Usage: metrics [<a> <b>]".to_string()),
            };

            let result = match pair {
                Ok((a, b)) => metrics::compare_images(&a, &b).map_err(|e| e.to_string()),
                Err(e) => Err(e),
            };
            match result {
                Ok(result) => {
                    if result.resized {
                        println!(
                            "Images resized to {} for comparison",
                            utils::format_size(result.compared_shape.0, result.compared_shape.1)
                        );
                    }
                    println!("{}", result);
                }
                Err(e) => println!("{}", e),
            }
        }

        "diff" => {
            if parts.len() != 2 {
                println!("Usage: diff <filename>");
                return;
            }
            let (Some(original), Some(current)) = (&state.original, &state.current) else {
                println!("No image loaded. Load a file first.");
                return;
            };

            match visualization::difference_heatmap(original, current)
                .and_then(|heatmap| image_io::save(&heatmap, parts[1]))
            {
                Ok(_) => println!("Difference heatmap saved to {}", parts[1]),
                Err(e) => println!("Error saving heatmap: {}", e),
            }
        }

        "histogram" => {
            let (Some(original), Some(current)) = (&state.original, &state.current) else {
                println!("No image loaded. Load a file first.");
                return;
            };

            if let Some(filename) = parts.get(1) {
                match std::fs::write(filename, utils::histogram_csv(current)) {
                    Ok(_) => println!("Histogram of the current image saved to {}", filename),
                    Err(e) => println!("Error saving histogram: {}", e),
                }
                return;
            }

            for (label, image) in [("Original", original), ("Current", current)] {
                println!("{} (16 bins of 16 levels):", label);
                for (ch_idx, hist) in metrics::histograms(image).iter().enumerate() {
                    let bins = metrics::bucket_histogram(hist, 16);
                    let counts: Vec<String> = bins.iter().map(|c| c.to_string()).collect();
                    println!("  Channel {}: {}", ch_idx, counts.join(" "));
                }
            }
        }

        "export" => {
            if parts.len() != 2 {
                println!("Usage: export <dir>");
                return;
            }
            let Some(output) = &state.last_output else {
                println!("No filter output yet. Run lowpass or highpass first.");
                return;
            };

            let dir = Path::new(parts[1]);
            let prefix = output.analysis.kind.name();
            let result =
                visualization::export_bundle(&output.visualization, dir, prefix, state.colormap)
                    .and_then(|mut written| {
                        let image_path = dir.join(format!("{}_output.png", prefix));
                        image_io::save(&output.image, &image_path)?;
                        written.push(image_path);
                        Ok(written)
                    });

            match result {
                Ok(written) => {
                    println!("Exported {} files:", written.len());
                    for path in written {
                        println!("  {}", path.display());
                    }
                }
                Err(e) => println!("Error exporting: {}", e),
            }
        }

        "help" => print_help(),

        "quit" | "exit" => {
            println!("Goodbye!");
            process::exit(0);
        }

        _ => {
            println!("Unknown command: '{}'", parts[0]);
            println!("Type 'help' for available commands");
        }
    }
}

fn main() {
    // Parse command line arguments
    let matches = Command::new("FourierLab")
        .version(fourierlab_lib::VERSION)
        .about("Frequency-domain image filtering and analysis tool")
        .arg(
            Arg::new("file")
                .help("Image file to load on startup")
                .value_name("FILE")
                .index(1),
        )
        .arg(
            Arg::new("cutoff")
                .long("cutoff")
                .short('c')
                .help("Set the default cutoff (0.0-1.0]")
                .value_name("CUTOFF"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .short('s')
                .help("Seed the noise generators for reproducible runs")
                .value_name("SEED"),
        )
        .get_matches();

    println!("FourierLab v{}", fourierlab_lib::VERSION);
    println!("Type 'help' for available commands\n");

    // Initialize the library
    fourierlab_lib::init();

    let rng = match matches.get_one::<String>("seed").map(|s| s.parse::<u64>()) {
        Some(Ok(seed)) => {
            println!("Using seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        Some(Err(_)) => {
            eprintln!("Invalid seed, using a random one");
            StdRng::from_rng(&mut rand::rng())
        }
        None => StdRng::from_rng(&mut rand::rng()),
    };

    let mut state = AppState::new(rng);

    if let Some(cutoff_str) = matches.get_one::<String>("cutoff") {
        match cutoff_str.parse::<f64>().map(FourierParams::new) {
            Ok(Ok(params)) => {
                state.params = params;
                println!("Set cutoff to {}", params.cutoff);
            }
            _ => eprintln!("Invalid cutoff: {}", cutoff_str),
        }
    }

    // Load file from command line if provided
    if let Some(filename) = matches.get_one::<String>("file") {
        state.load(filename);
    }

    // Setup readline
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("Failed to create readline: {}", e);
            process::exit(1);
        }
    };

    // Main command loop
    loop {
        let readline = rl.readline("fourier> ");
        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    rl.add_history_entry(trimmed).ok();
                    process_command(trimmed, &mut state);
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    println!("Goodbye!");
}
