//! Command-line interface for training on sprite sheets and generating sprites

use crate::algorithm::model::MarkovModel;
use crate::algorithm::synthesizer::{FallbackPolicy, RandomSelector, Synthesizer};
use crate::analysis::context::ContextEncoder;
use crate::analysis::training::{TrainingSummary, train_on_regions};
use crate::io::configuration::{
    CROPS_SUFFIX, DEFAULT_EXPORT_SCALE, DEFAULT_ORDER, DEFAULT_OUTPUT_HEIGHT, DEFAULT_OUTPUT_WIDTH,
    DEFAULT_PASSES, DEFAULT_POSITION_BUCKETS, DEFAULT_SEED, DEFAULT_SMOOTHING_BIAS,
    DEFAULT_THRESHOLDS, OUTPUT_SUFFIX, OVERLAY_COLOR, OVERLAY_SUFFIX, PROBABILITY_SUFFIX,
    SynthesisConfig,
};
use crate::io::error::{Result, SpriteError, WithPath, invalid_parameter};
use crate::io::image::{export_buffer_as_png, export_regions, load_png, validate_scale};
use crate::io::progress::ProgressManager;
use crate::io::visualization::{probability_map, region_overlay};
use crate::spatial::buffer::{Color, PixelBuffer, Rect};
use crate::spatial::regions::RegionExtractor;
use clap::Parser;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "procsprites")]
#[command(
    author,
    version,
    about = "Learn a Markov texture model from sprite sheets and generate new sprites"
)]
/// Command-line arguments for the sprite generation tool
// CLI tools commonly need multiple boolean flags for various features and user preferences
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Training PNG file or directory of PNG files
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Output PNG path (defaults to <target>_generated.png)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Generated width in pixels
    #[arg(short = 'w', long, default_value_t = DEFAULT_OUTPUT_WIDTH)]
    pub width: usize,

    /// Generated height in pixels
    #[arg(short = 'H', long, default_value_t = DEFAULT_OUTPUT_HEIGHT)]
    pub height: usize,

    /// Random seed for reproducible generation
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Synthesis passes; values above 1 enable blending refinement
    #[arg(short, long, default_value_t = DEFAULT_PASSES)]
    pub passes: usize,

    /// Causal neighbourhood order
    #[arg(long, default_value_t = DEFAULT_ORDER)]
    pub order: usize,

    /// Positional zones per region axis (0 disables bucketing)
    #[arg(short, long, default_value_t = DEFAULT_POSITION_BUCKETS)]
    pub buckets: usize,

    /// Comma-separated ascending quantization thresholds (decimal or 0x hex)
    #[arg(short, long, value_delimiter = ',', value_parser = parse_level)]
    pub thresholds: Vec<u8>,

    /// Quantize each color channel instead of collapsing to greyscale
    #[arg(short, long)]
    pub color: bool,

    /// Additive smoothing bias
    #[arg(long, default_value_t = DEFAULT_SMOOTHING_BIAS)]
    pub bias: f64,

    /// What to write for contexts never seen in training
    #[arg(short, long, value_enum, default_value_t = FallbackPolicy::Transparent)]
    pub fallback: FallbackPolicy,

    /// Integer magnification of every exported image
    #[arg(long, default_value_t = DEFAULT_EXPORT_SCALE)]
    pub scale: usize,

    /// Also export the probability map of the generated image
    #[arg(long)]
    pub probability_map: bool,

    /// Export every extracted region as its own PNG
    #[arg(short, long)]
    pub export_regions: bool,

    /// Export each training image with its regions outlined
    #[arg(long)]
    pub overlay: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Model and synthesis configuration described by the arguments
    pub fn config(&self) -> SynthesisConfig {
        let thresholds = if self.thresholds.is_empty() {
            DEFAULT_THRESHOLDS.to_vec()
        } else {
            self.thresholds.clone()
        };

        SynthesisConfig {
            thresholds,
            greyscale: !self.color,
            order: self.order,
            offsets: None,
            position_buckets: self.buckets,
            smoothing_bias: self.bias,
            passes: self.passes,
            fallback: self.fallback,
            seed: self.seed,
            width: self.width,
            height: self.height,
        }
    }

    /// Destination of the generated image
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| sibling_path(&self.target, OUTPUT_SUFFIX, "png"))
    }
}

/// Parse one threshold given in decimal or `0x` hexadecimal
///
/// # Errors
///
/// Returns a message when the text is not a byte value
pub fn parse_level(text: &str) -> std::result::Result<u8, String> {
    let trimmed = text.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => trimmed.parse::<u8>(),
    };
    parsed.map_err(|e| format!("'{trimmed}' is not a level between 0 and 255: {e}"))
}

/// `<parent>/<stem><suffix>.<extension>` next to `path`
fn sibling_path(path: &Path, suffix: &str, extension: &str) -> PathBuf {
    let stem = path.file_stem().unwrap_or_default();
    let name = format!("{}{suffix}.{extension}", stem.to_string_lossy());

    path.parent()
        .map_or_else(|| PathBuf::from(&name), |parent| parent.join(&name))
}

/// `<parent>/<stem>_crops` next to `path`
fn crops_directory(path: &Path) -> PathBuf {
    let stem = path.file_stem().unwrap_or_default();
    let name = format!("{}{CROPS_SUFFIX}", stem.to_string_lossy());

    path.parent()
        .map_or_else(|| PathBuf::from(&name), |parent| parent.join(&name))
}

/// Orchestrates batch training followed by a single generation
pub struct FileProcessor {
    cli: Cli,
    progress_manager: Option<ProgressManager>,
}

impl FileProcessor {
    /// Create a new file processor with the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress_manager = cli.should_show_progress().then(ProgressManager::new);

        Self {
            cli,
            progress_manager,
        }
    }

    /// Train on every target image, then generate and export
    ///
    /// Images that fail to load are reported and skipped; their partial work
    /// never reaches the accumulated model. A failed region or overlay export
    /// is logged and the image still trains.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration or export scale is invalid
    /// - The target cannot be read
    /// - No image contributed any training data
    /// - Generation or export fails
    pub fn process(&mut self) -> Result<()> {
        let start_time = Instant::now();
        let config = self.cli.config();
        config.validate()?;
        validate_scale(self.cli.scale)?;

        let files = self.collect_files()?;
        let encoder = ContextEncoder::from_config(&config)?;
        let extractor = RegionExtractor::new();
        let mut model = MarkovModel::new();

        if let Some(ref mut pm) = self.progress_manager {
            pm.initialize(files.len());
        }

        for (index, file) in files.iter().enumerate() {
            if let Some(ref mut pm) = self.progress_manager {
                pm.start_file(index, file);
            }

            match self.train_file(file, &encoder, &extractor) {
                Ok((scratch, summary)) => {
                    if summary.is_empty() {
                        warn!("{}: no opaque regions found", file.display());
                    }
                    model.absorb(scratch);
                    if let Some(ref mut pm) = self.progress_manager {
                        pm.complete_file(index, &summary);
                    }
                }
                Err(error) => {
                    warn!("skipping {}: {error}", file.display());
                    if let Some(ref mut pm) = self.progress_manager {
                        pm.fail_file(index);
                    }
                }
            }
        }

        if let Some(ref pm) = self.progress_manager {
            pm.finish();
        }

        if model.is_empty() {
            return Err(SpriteError::NoTrainingData);
        }
        model.finalize(config.smoothing_bias)?;
        info!(
            "trained {} context(s) from {} observation(s) across {} file(s)",
            model.context_count(),
            model.observation_count(),
            files.len()
        );

        let synthesizer = Synthesizer::new(&model, &encoder, config.fallback);
        let mut random = RandomSelector::new(config.seed);
        let synthesis =
            synthesizer.generate_traced(config.width, config.height, config.passes, &mut random)?;

        let output_path = self.cli.output_path();
        export_buffer_as_png(&synthesis.image, &output_path, self.cli.scale)?;
        info!("wrote {}", output_path.display());

        if self.cli.probability_map {
            let map_path = sibling_path(&output_path, PROBABILITY_SUFFIX, "png");
            export_buffer_as_png(&probability_map(&synthesis)?, &map_path, self.cli.scale)?;
            info!("wrote {}", map_path.display());
        }

        info!("finished in {:.2?}", start_time.elapsed());
        Ok(())
    }

    fn collect_files(&self) -> Result<Vec<PathBuf>> {
        let target = &self.cli.target;
        if target.is_file() {
            if is_png(target) {
                Ok(vec![target.clone()])
            } else {
                Err(invalid_parameter(
                    "target",
                    &target.display(),
                    &"target file must be a PNG image",
                ))
            }
        } else if target.is_dir() {
            let mut files = Vec::new();
            for entry in std::fs::read_dir(target).with_path(target)? {
                let path = entry.with_path(target)?.path();
                if is_png(&path) && !is_derived_output(&path) {
                    files.push(path);
                }
            }
            files.sort();
            Ok(files)
        } else {
            Err(invalid_parameter(
                "target",
                &target.display(),
                &"target must be a PNG file or directory",
            ))
        }
    }

    fn train_file(
        &self,
        path: &Path,
        encoder: &ContextEncoder,
        extractor: &RegionExtractor,
    ) -> Result<(MarkovModel, TrainingSummary)> {
        let buffer = load_png(path)?;
        let regions = extractor.extract(&buffer);

        let mut scratch = MarkovModel::new();
        let summary = train_on_regions(&mut scratch, encoder, &buffer, &regions);

        // Diagnostics never cost an image its training data
        if let Err(error) = self.export_diagnostics(path, &buffer, &regions) {
            warn!("export failed for {}: {error}", path.display());
        }
        Ok((scratch, summary))
    }

    fn export_diagnostics(
        &self,
        path: &Path,
        buffer: &PixelBuffer,
        regions: &[Rect],
    ) -> Result<()> {
        if self.cli.export_regions {
            let stem = path.file_stem().unwrap_or_default().to_string_lossy();
            let directory = crops_directory(path);
            export_regions(buffer, regions, &directory, &stem, self.cli.scale)?;
        }

        if self.cli.overlay {
            let overlay = region_overlay(buffer, regions, Color(OVERLAY_COLOR));
            export_buffer_as_png(
                &overlay,
                &sibling_path(path, OVERLAY_SUFFIX, "png"),
                self.cli.scale,
            )?;
        }
        Ok(())
    }
}

fn is_png(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case("png"))
}

// Earlier runs write their outputs next to the training images
fn is_derived_output(path: &Path) -> bool {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    [OUTPUT_SUFFIX, PROBABILITY_SUFFIX, OVERLAY_SUFFIX]
        .iter()
        .any(|suffix| stem.ends_with(suffix))
}
