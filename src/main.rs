use clap::Parser;
use image::ImageReader;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use subocr::config::Overrides;
use subocr::detection::region;
use subocr::{Config, CorrectionDictionary, OcrsEngine, SubtitleOcr, export};

#[derive(Parser)]
#[command(name = "subocr")]
#[command(about = "Read subtitles from video frames")]
struct Cli {
    /// Frame images (png, jpg or jpeg)
    #[arg(value_name = "IMAGE", required = true)]
    images: Vec<PathBuf>,

    /// TOML config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// JSON correction dictionary (overrides the config file)
    #[arg(long, value_name = "FILE")]
    dict: Option<PathBuf>,

    /// Directory holding the OCR models
    #[arg(long, value_name = "DIR")]
    models: Option<PathBuf>,

    /// Height of the bands scanned when locating subtitles
    #[arg(long)]
    band_height: Option<u32>,

    /// Vertical distance under which boxes share a line
    #[arg(long)]
    snap_tolerance: Option<i32>,

    /// Binarize box crops before recognition
    #[arg(long)]
    binarize: bool,

    /// Save each box crop to this directory
    #[arg(long, value_name = "DIR")]
    export_boxes: Option<PathBuf>,

    /// Save debug outputs to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Print each frame's result as JSON
    #[arg(long)]
    json: bool,

    /// Only locate the subtitle band (no models needed)
    #[arg(long)]
    region_only: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            dictionary: self.dict.clone(),
            models: self.models.clone(),
            band_height: self.band_height,
            snap_tolerance: self.snap_tolerance,
            binarize: self.binarize.then_some(true),
        }
    }

    fn effective_config(&self) -> anyhow::Result<Config> {
        let config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        Ok(config.with_overrides(&self.overrides())?)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = args.effective_config()?;

    export::ensure_supported(&args.images)?;

    if args.region_only {
        for path in &args.images {
            let img = ImageReader::open(path)?
                .decode()
                .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;
            let found = region::locate(&img, &config.region)?;
            let status = if found.is_empty(config.region.band_height) { "none" } else { "found" };
            println!("{}: {}x{} top={} ({})",
                    path.display(), found.width, found.height, found.top, status);
        }
        return Ok(());
    }

    let dictionary = config
        .correction
        .dictionary
        .as_deref()
        .map(CorrectionDictionary::load)
        .transpose()?
        .map(Arc::new);

    if args.verbose {
        println!("Initializing OCR engine...");
    }
    let engine = Arc::new(OcrsEngine::load(&config.models)?);

    let mut ocr = SubtitleOcr::new(config.clone(), engine.clone(), engine).with_verbose(args.verbose);
    if let Some(dictionary) = dictionary {
        ocr = ocr.with_dictionary(dictionary);
    }

    for path in &args.images {
        if args.verbose {
            println!("Loading image: {:?}", path);
        }

        let img = ImageReader::open(path)?
            .decode()
            .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;

        let result = match &args.debug_out {
            Some(debug_root) => {
                // One debug directory per frame, named after it.
                let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(export::temp_filename);
                ocr.process_with_debug(&img, debug_root.join(stem))?
            }
            None => ocr.process(&img)?,
        };

        if let Some(out_dir) = &args.export_boxes {
            let records: Vec<_> = result.boxes.iter().map(|b| b.record).collect();
            let written = export::save_box_images(
                path, &img, &records, out_dir, config.lines.crop_margin,
            )?;
            if args.verbose {
                println!("Saved {} box images to {}", written.len(), out_dir.display());
            }
        }

        if args.json {
            println!("{}", serde_json::to_string(&result)?);
            continue;
        }

        println!("=== {} ===", path.display());
        if result.region.is_empty(config.region.band_height) {
            println!("No subtitle detected.");
            continue;
        }
        println!("Subtitle band starts at row {} ({} boxes)", result.region.top, result.boxes.len());
        println!("{}", result.text);
    }

    Ok(())
}
