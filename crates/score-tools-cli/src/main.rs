use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use score_layout::constants::{DEFAULT_CUSTOM_SPACING_PX, DEFAULT_PNG_DPI};
use score_layout::{
    AdjustmentFile, LayoutConfig, OutputFormat, RenderOptions, Selection, SessionState,
    SpacingFraction, SpacingMode,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sct", about = "Score trimming and layout tools", version)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crop score pages and lay them out into a PDF or PNG
    Layout {
        #[command(flatten)]
        job: JobArgs,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Output format (inferred from the output extension when omitted)
        #[arg(long, value_enum)]
        format: Option<FormatArg>,

        /// Resolution of PNG output
        #[arg(long, default_value_t = DEFAULT_PNG_DPI)]
        png_dpi: f32,

        /// Write the effective layout configuration to this file
        #[arg(long)]
        save_config: Option<PathBuf>,
    },

    /// Show layout statistics without writing output
    Stats {
        #[command(flatten)]
        job: JobArgs,
    },
}

#[derive(Args)]
struct JobArgs {
    /// Input images (JPEG or PNG), in order; the first is the reference
    #[arg(short, long, required = true, num_args = 1..)]
    input: Vec<PathBuf>,

    /// Top of the crop window on the reference image (px)
    #[arg(long, default_value = "0")]
    crop_y: f64,

    /// Height of the crop window (px, default: rest of the image)
    #[arg(long)]
    crop_height: Option<f64>,

    /// Left edge of the crop window (px, used with --horizontal-trim)
    #[arg(long, default_value = "0")]
    crop_x: f64,

    /// Width of the crop window (px, default: full width)
    #[arg(long)]
    crop_width: Option<f64>,

    /// Apply the horizontal crop to the reference image
    #[arg(long)]
    horizontal_trim: bool,

    /// Per-image adjustments (JSON)
    #[arg(long)]
    adjustments: Option<PathBuf>,

    /// Base layout configuration (JSON); flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output paper size
    #[arg(long, value_enum)]
    paper: Option<PaperArg>,

    /// Custom page width in mm (with --paper custom)
    #[arg(long)]
    page_width: Option<f32>,

    /// Custom page height in mm (with --paper custom)
    #[arg(long)]
    page_height: Option<f32>,

    /// Usable width of an unbounded page in mm
    #[arg(long)]
    unbounded_width: Option<f32>,

    /// Page orientation
    #[arg(long, value_enum)]
    orientation: Option<OrientationArg>,

    /// Number of columns
    #[arg(long)]
    columns: Option<usize>,

    /// Spacing between items in a column
    #[arg(long, value_enum)]
    spacing: Option<SpacingArg>,

    /// Gap in pixels for custom spacing (default 10)
    #[arg(long)]
    spacing_px: Option<u32>,

    /// Page margin in mm
    #[arg(long)]
    margin: Option<f32>,

    /// Title on the first page
    #[arg(long)]
    title: Option<String>,

    /// Pad items to a common aspect ratio
    #[arg(long)]
    harmonize: bool,

    /// Side receiving the padding when harmonizing
    #[arg(long, value_enum)]
    pad: Option<PadArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    A3,
    A4,
    A5,
    Custom,
    Unbounded,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
}

#[derive(Clone, Copy, ValueEnum)]
enum SpacingArg {
    None,
    Sixteenth,
    Eighth,
    Quarter,
    Custom,
}

#[derive(Clone, Copy, ValueEnum)]
enum PadArg {
    Right,
    Left,
    Center,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Pdf,
    Png,
}

impl From<OrientationArg> for score_layout::Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Self::Portrait,
            OrientationArg::Landscape => Self::Landscape,
        }
    }
}

impl From<PadArg> for score_layout::PadSide {
    fn from(arg: PadArg) -> Self {
        match arg {
            PadArg::Right => Self::Right,
            PadArg::Left => Self::Left,
            PadArg::Center => Self::Center,
        }
    }
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Pdf => Self::Pdf,
            FormatArg::Png => Self::Png,
        }
    }
}

impl SpacingArg {
    fn into_mode(self, custom_px: u32) -> SpacingMode {
        match self {
            SpacingArg::None => SpacingMode::None,
            SpacingArg::Sixteenth => SpacingMode::Fraction(SpacingFraction::Sixteenth),
            SpacingArg::Eighth => SpacingMode::Fraction(SpacingFraction::Eighth),
            SpacingArg::Quarter => SpacingMode::Fraction(SpacingFraction::Quarter),
            SpacingArg::Custom => SpacingMode::CustomPixels(custom_px),
        }
    }
}

impl JobArgs {
    fn page_size(&self, paper: PaperArg) -> Result<score_layout::PageSize> {
        use score_layout::PageSize;

        Ok(match paper {
            PaperArg::A3 => PageSize::A3,
            PaperArg::A4 => PageSize::A4,
            PaperArg::A5 => PageSize::A5,
            PaperArg::Unbounded => PageSize::Unbounded,
            PaperArg::Custom => match (self.page_width, self.page_height) {
                (Some(width_mm), Some(height_mm)) => PageSize::Custom {
                    width_mm,
                    height_mm,
                },
                _ => bail!("--paper custom needs --page-width and --page-height"),
            },
        })
    }

    /// Layout configuration: the config file (or defaults) with flags applied
    async fn layout_config(&self) -> Result<LayoutConfig> {
        let mut config = match &self.config {
            Some(path) => LayoutConfig::load(path)
                .await
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => LayoutConfig::default(),
        };

        if let Some(paper) = self.paper {
            config.page_size = self.page_size(paper)?;
        }
        if let Some(width) = self.unbounded_width {
            config.unbounded_width_mm = width;
        }
        if let Some(orientation) = self.orientation {
            config.orientation = orientation.into();
        }
        if let Some(columns) = self.columns {
            config.columns = columns;
        }
        if let Some(spacing) = self.spacing {
            let current_px = match config.spacing {
                SpacingMode::CustomPixels(px) => px,
                _ => DEFAULT_CUSTOM_SPACING_PX,
            };
            config.spacing = spacing.into_mode(current_px);
        }
        if let (Some(px), SpacingMode::CustomPixels(_)) = (self.spacing_px, config.spacing) {
            config.spacing = SpacingMode::CustomPixels(px);
        }
        if let Some(margin) = self.margin {
            config.margin_mm = margin;
        }
        if self.title.is_some() {
            config.title = self.title.clone();
        }
        if self.harmonize {
            config.harmonize_aspect = true;
        }
        if let Some(pad) = self.pad {
            config.harmonize_pad = pad.into();
        }

        config.validate()?;
        Ok(config)
    }

    /// Load images, apply the reference crop and adjustments
    async fn build_session(&self) -> Result<SessionState> {
        let mut session = SessionState::new();
        session.layout = self.layout_config().await?;

        let images = score_layout::load_images(&self.input).await?;
        session.add_images(images);

        let Some(reference) = session.images().first() else {
            bail!("No input images");
        };
        let selection = Selection::new(
            self.crop_x,
            self.crop_y,
            self.crop_width.unwrap_or(reference.width as f64),
            self.crop_height
                .unwrap_or(reference.height as f64 - self.crop_y),
        );
        let crop = session.apply_reference_crop(selection, self.horizontal_trim)?;
        log::info!(
            "Reference crop: y={} height={} x={} width={}",
            crop.y,
            crop.height,
            crop.x,
            crop.width
        );

        if let Some(path) = &self.adjustments {
            let file = AdjustmentFile::load(path)
                .await
                .with_context(|| format!("Failed to load {}", path.display()))?;
            for entry in file.adjustments {
                session
                    .set_adjustment(entry.index, entry.adjustment)
                    .with_context(|| format!("Adjustment for image {}", entry.index))?;
            }
        }

        Ok(session)
    }
}

/// Output format from the flag, or from the file extension
fn output_format(format: Option<FormatArg>, output: &Path) -> OutputFormat {
    if let Some(format) = format {
        return format.into();
    }
    match output.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("png") => OutputFormat::Png,
        _ => OutputFormat::Pdf,
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Layout {
            job,
            output,
            format,
            png_dpi,
            save_config,
        } => {
            let mut session = job.build_session().await?;
            session.render = RenderOptions {
                format: output_format(format, &output),
                png_dpi,
            };

            if let Some(path) = save_config {
                session.layout.save(&path).await?;
                println!("Saved layout configuration → {}", path.display());
            }

            let prepared = score_layout::prepare_layout(&session).await?;
            let pages = prepared.plan.page_count();
            let bytes = score_layout::render_prepared(prepared, session.render).await?;
            score_layout::save_output(bytes, &output).await?;

            println!(
                "Laid out {} images on {} page(s) → {}",
                session.images().len(),
                pages,
                output.display()
            );
        }

        Commands::Stats { job } => {
            let session = job.build_session().await?;
            let prepared = score_layout::prepare_layout(&session).await?;
            let stats = score_layout::calculate_statistics(&prepared.plan);

            println!("Layout Statistics:");
            println!("  Images: {}", stats.items);
            println!("  Pages: {}", stats.pages);
            println!("  Columns: {}", stats.columns);
            println!("  Column width: {:.1} mm", stats.column_width_mm);
            for (index, count) in stats.items_per_page.iter().enumerate() {
                println!("  Page {}: {} image(s)", index + 1, count);
            }
            if session.layout.page_size.is_unbounded() {
                println!("  Page height: {:.1} mm", stats.max_page_height_mm);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn job(args: &[&str]) -> JobArgs {
        let argv = ["sct", "stats", "-i", "page.png"].iter().chain(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Stats { job } => job,
            Commands::Layout { .. } => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_spacing_px_with_custom_spacing() {
        let config = job(&["--spacing", "custom", "--spacing-px", "24"])
            .layout_config()
            .await
            .unwrap();
        assert_eq!(config.spacing, SpacingMode::CustomPixels(24));

        let config = job(&["--spacing", "custom"]).layout_config().await.unwrap();
        assert_eq!(config.spacing, SpacingMode::CustomPixels(DEFAULT_CUSTOM_SPACING_PX));
    }

    #[tokio::test]
    async fn test_spacing_px_overrides_config_file() {
        let file = NamedTempFile::new().unwrap();
        let base = LayoutConfig {
            spacing: SpacingMode::CustomPixels(24),
            ..Default::default()
        };
        base.save(file.path()).await.unwrap();
        let path = file.path().to_str().unwrap();

        let config = job(&["--config", path, "--spacing-px", "5"])
            .layout_config()
            .await
            .unwrap();
        assert_eq!(config.spacing, SpacingMode::CustomPixels(5));

        let config = job(&["--config", path, "--spacing", "custom"])
            .layout_config()
            .await
            .unwrap();
        assert_eq!(config.spacing, SpacingMode::CustomPixels(24));
    }

    #[tokio::test]
    async fn test_spacing_px_without_custom_mode_keeps_mode() {
        let config = job(&["--spacing", "eighth", "--spacing-px", "5"])
            .layout_config()
            .await
            .unwrap();
        assert_eq!(config.spacing, SpacingMode::Fraction(SpacingFraction::Eighth));
    }
}
