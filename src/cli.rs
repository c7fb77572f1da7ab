// ============================================================================
// FilterFE CLI — headless batch grading via command-line arguments
// ============================================================================
//
// Usage examples:
//   filterfe --input photo.png --preset "Juno-ish" --output result.png
//   filterfe -i photo.jpg -o out.jpg --quality 85
//   filterfe -i "shots/*.jpg" --preset Lo-Fi-ish --output-dir graded/ --format png
//   filterfe -i photo.png --params mylook.json --seed 7 -o out.png
//   filterfe --list-presets
//
// No GUI is opened in CLI mode. All grading runs on the CPU executor
// (rayon-parallel rows); the GPU backend is a GUI concern.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::filters::params::FilterParams;
use crate::filters::pipeline;
use crate::filters::presets;
use crate::io::{self, SaveFormat};
use crate::scheduler::draw_seed;

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// FilterFE headless image grader.
///
/// Apply preset or custom color grades to image files — no GUI required.
#[derive(Parser, Debug)]
#[command(
    name = "filterfe",
    about = "FilterFE headless batch color grading",
    long_about = "Apply Instagram-style color-grading presets (or a custom params JSON)\n\
                  to image files without opening the GUI. Supports PNG, JPEG, WEBP and\n\
                  BMP output.\n\n\
                  Example:\n  \
                  filterfe --input photo.png --preset \"Juno-ish\" --output result.png\n  \
                  filterfe -i \"*.jpg\" --preset Lo-Fi-ish --output-dir graded/ --format png"
)]
pub struct CliArgs {
    /// Input file(s). Glob patterns accepted (e.g. "*.png", "shots/*.jpg").
    #[arg(short, long, num_args = 1..)]
    pub input: Vec<String>,

    /// Preset name from the built-in catalog (see --list-presets).
    /// Defaults to "Normal" when neither --preset nor --params is given.
    #[arg(short, long, value_name = "NAME")]
    pub preset: Option<String>,

    /// JSON file with custom FilterParams. Unspecified knobs stay neutral.
    /// Overrides --preset when both are given.
    #[arg(long, value_name = "PARAMS.json")]
    pub params: Option<PathBuf>,

    /// Grain noise seed. Random per run when omitted; fix it for
    /// reproducible grain across runs.
    #[arg(long, value_name = "N")]
    pub seed: Option<u32>,

    /// Output file path. Only valid for single-file input.
    /// For batch input use --output-dir instead.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing.
    /// Files are written here with the original stem and the target format's extension.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format: png, jpeg, webp, bmp.
    /// When omitted, the format is inferred from --output's extension, defaulting to png.
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// JPEG quality (1–100, default 90).
    #[arg(short, long, default_value_t = 90, value_name = "1-100")]
    pub quality: u8,

    /// Print the preset catalog and exit.
    #[arg(long)]
    pub list_presets: bool,

    /// Print per-file timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Returns `true` when any CLI-mode flag is present in the real process
    /// arguments. Used by `main()` to route before creating an eframe window.
    pub fn is_cli_mode() -> bool {
        std::env::args().any(|a| a == "--input" || a == "-i" || a == "--list-presets")
    }
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run all CLI processing and return an OS exit code.
/// `0` = all files succeeded, `1` = one or more files failed.
pub fn run(args: CliArgs) -> ExitCode {
    if args.list_presets {
        for p in presets::PRESETS {
            println!("{}", p.name);
        }
        return ExitCode::SUCCESS;
    }

    let inputs = resolve_inputs(&args.input);
    if inputs.is_empty() {
        eprintln!("error: no input files matched the given pattern(s).");
        return ExitCode::FAILURE;
    }

    // Multiple inputs require --output-dir, not --output
    if inputs.len() > 1 && args.output.is_some() && args.output_dir.is_none() {
        eprintln!(
            "error: {} input files given but --output only accepts a single file path.\n\
             Use --output-dir to specify a destination directory for batch processing.",
            inputs.len()
        );
        return ExitCode::FAILURE;
    }

    let params = match resolve_params(&args) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let format = args
        .format
        .as_deref()
        .and_then(SaveFormat::from_name)
        .or_else(|| args.output.as_deref().and_then(SaveFormat::from_path))
        .unwrap_or(SaveFormat::Png);

    // Grain varies run to run unless pinned
    let seed = args.seed.unwrap_or_else(draw_seed);

    if let Some(dir) = &args.output_dir {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!(
                "error: could not create output directory '{}': {}",
                dir.display(),
                e
            );
            return ExitCode::FAILURE;
        }
    }

    let total = inputs.len();
    let multi = total > 1;
    let mut any_failure = false;

    for (idx, input_path) in inputs.iter().enumerate() {
        if multi || args.verbose {
            println!("[{}/{}] {}", idx + 1, total, input_path.display());
        }

        let file_start = Instant::now();

        let output_path = match build_output_path(
            input_path,
            args.output.as_deref(),
            args.output_dir.as_deref(),
            format,
        ) {
            Some(p) => p,
            None => {
                eprintln!(
                    "  error: cannot determine output path for '{}'.",
                    input_path.display()
                );
                any_failure = true;
                continue;
            }
        };

        match run_one(input_path, &output_path, &params, seed, format, args.quality) {
            Ok(()) => {
                if args.verbose || multi {
                    println!(
                        "  → {} ({:.0}ms)",
                        output_path.display(),
                        file_start.elapsed().as_secs_f64() * 1000.0
                    );
                }
            }
            Err(e) => {
                eprintln!("  error: {}", e);
                any_failure = true;
            }
        }
    }

    if any_failure {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

// ============================================================================
// Per-file processing
// ============================================================================

fn run_one(
    input: &Path,
    output: &Path,
    params: &FilterParams,
    seed: u32,
    format: SaveFormat,
    quality: u8,
) -> Result<(), String> {
    let source = io::load_image(input).map_err(|e| format!("load failed: {}", e))?;
    let graded = pipeline::render(&source, params, seed);
    io::save_image(&graded, output, format, quality).map_err(|e| format!("save failed: {}", e))
}

// ============================================================================
// Helpers
// ============================================================================

/// Resolve the effective FilterParams from --params / --preset.
/// A params file with non-finite numbers is rejected here — the pipeline
/// itself assumes finite inputs.
fn resolve_params(args: &CliArgs) -> Result<FilterParams, String> {
    if let Some(path) = &args.params {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("could not read params file '{}': {}", path.display(), e))?;
        let params: FilterParams = serde_json::from_str(&text)
            .map_err(|e| format!("invalid params file '{}': {}", path.display(), e))?;
        if !params.is_finite() {
            return Err(format!(
                "params file '{}' contains non-finite values",
                path.display()
            ));
        }
        return Ok(params);
    }
    match &args.preset {
        Some(name) => presets::find(name).map(|p| p.params).ok_or_else(|| {
            format!(
                "unknown preset '{}' — run --list-presets for the catalog",
                name
            )
        }),
        None => Ok(FilterParams::default()),
    }
}

/// Expand glob patterns and literal paths into a deduplicated, ordered list.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let as_path = Path::new(pattern);

        if as_path.exists() {
            // Literal path — use directly
            if !result.iter().any(|p| p.as_path() == as_path) {
                result.push(as_path.to_path_buf());
            }
            continue;
        }

        match glob::glob(pattern) {
            Ok(entries) => {
                let mut matched = false;
                for entry in entries.flatten() {
                    if !result.contains(&entry) {
                        result.push(entry);
                    }
                    matched = true;
                }
                if !matched {
                    eprintln!("warning: pattern '{}' matched no files.", pattern);
                }
            }
            Err(e) => {
                eprintln!("warning: bad glob pattern '{}': {}", pattern, e);
            }
        }
    }

    result
}

/// Pick the destination path for one input file.
fn build_output_path(
    input: &Path,
    output: Option<&Path>,
    output_dir: Option<&Path>,
    format: SaveFormat,
) -> Option<PathBuf> {
    if let Some(dir) = output_dir {
        let stem = input.file_stem()?;
        let mut name = PathBuf::from(stem);
        name.set_extension(format.extension());
        return Some(dir.join(name));
    }
    if let Some(out) = output {
        return Some(out.to_path_buf());
    }
    // Neither given: write next to the input with a suffix
    let stem = input.file_stem()?.to_string_lossy();
    Some(input.with_file_name(format!("{}_graded.{}", stem, format.extension())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_with_dir() {
        let p = build_output_path(
            Path::new("shots/photo.jpg"),
            None,
            Some(Path::new("out")),
            SaveFormat::Png,
        )
        .unwrap();
        assert_eq!(p, PathBuf::from("out/photo.png"));
    }

    #[test]
    fn output_path_explicit_file() {
        let p = build_output_path(
            Path::new("photo.jpg"),
            Some(Path::new("result.webp")),
            None,
            SaveFormat::WebP,
        )
        .unwrap();
        assert_eq!(p, PathBuf::from("result.webp"));
    }

    #[test]
    fn output_path_default_suffix() {
        let p = build_output_path(Path::new("dir/photo.jpg"), None, None, SaveFormat::Jpeg)
            .unwrap();
        assert_eq!(p, PathBuf::from("dir/photo_graded.jpg"));
    }

    #[test]
    fn params_resolution_prefers_file_then_preset() {
        let args = CliArgs {
            input: vec![],
            preset: Some("Lo-Fi-ish".into()),
            params: None,
            seed: None,
            output: None,
            output_dir: None,
            format: None,
            quality: 90,
            list_presets: false,
            verbose: false,
        };
        let p = resolve_params(&args).unwrap();
        assert_eq!(p, presets::find("Lo-Fi-ish").unwrap().params);

        let args = CliArgs {
            preset: Some("No Such Look".into()),
            ..args
        };
        assert!(resolve_params(&args).is_err());
    }

    #[test]
    fn params_file_round_trip_and_validation() {
        let dir = std::env::temp_dir().join("filterfe_cli_test");
        std::fs::create_dir_all(&dir).unwrap();

        let good = dir.join("good.json");
        std::fs::write(&good, r#"{ "exposure": 0.1, "vignette": 0.25 }"#).unwrap();
        let args = CliArgs {
            input: vec![],
            preset: None,
            params: Some(good.clone()),
            seed: None,
            output: None,
            output_dir: None,
            format: None,
            quality: 90,
            list_presets: false,
            verbose: false,
        };
        let p = resolve_params(&args).unwrap();
        assert_eq!(p.exposure, 0.1);
        assert_eq!(p.vignette, 0.25);
        assert_eq!(p.strength, 1.0);

        let bad = dir.join("bad.json");
        std::fs::write(&bad, r#"{ "exposure": 1e999 }"#).unwrap();
        let args = CliArgs {
            params: Some(bad.clone()),
            ..args
        };
        assert!(resolve_params(&args).is_err());

        let _ = std::fs::remove_file(&good);
        let _ = std::fs::remove_file(&bad);
    }
}
