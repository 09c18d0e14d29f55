//! Collager CLI - lay out collage templates from the command line.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use collager::*;
use tracing::*;
use tracing_subscriber::EnvFilter;

/// Collager - grid collage layouts
#[derive(Parser, Debug)]
#[command(name = "collager")]
#[command(about = "Lay out photo collages from grid templates")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the built-in templates with a thumbnail of each
    Templates {
        /// Thumbnail width in characters
        #[arg(long, default_value_t = 24)]
        columns: usize,
        /// Thumbnail height in characters
        #[arg(long, default_value_t = 8)]
        rows: usize,
    },

    /// Build a collage and print the resulting frame geometry
    Layout(LayoutArgs),
}

#[derive(Args, Debug)]
struct LayoutArgs {
    /// Template name, e.g. "Four Grid"
    template: String,

    /// Canvas preset: square, portrait, landscape or story
    #[arg(short, long, conflicts_with_all = ["width", "height"])]
    format: Option<CanvasFormat>,

    /// Canvas width in pixels
    #[arg(long, requires = "height")]
    width: Option<f64>,

    /// Canvas height in pixels
    #[arg(long, requires = "width")]
    height: Option<f64>,

    /// Free space around the collage
    #[arg(long, default_value_t = DEFAULT_MARGIN)]
    margin: f64,

    /// Scale the template uniformly instead of stretching it to the canvas
    #[arg(long)]
    contain: bool,

    #[arg(long)]
    spacing: Option<f64>,

    #[arg(long)]
    roundness: Option<f64>,

    #[arg(long)]
    border_width: Option<f64>,

    /// Border color as #rgb, #rrggbb or #rrggbbaa
    #[arg(long)]
    border_color: Option<Color>,

    /// solid, dashed or dotted
    #[arg(long)]
    border_style: Option<BorderStyle>,

    /// Fill shown through the gaps between cells
    #[arg(long)]
    background: Option<Color>,

    /// Apply the settings to this cell only (0-based)
    #[arg(long)]
    cell: Option<usize>,

    /// Image file to attach
    #[arg(long)]
    image: Option<PathBuf>,

    /// Cell the image is attached to (0-based)
    #[arg(long, default_value_t = 0)]
    image_cell: usize,

    /// Write a PNG preview of the result (requires the `debug` feature)
    #[arg(long)]
    preview: Option<PathBuf>,
}

impl LayoutArgs {
    fn canvas_size(&self) -> Result<Size> {
        match (self.format, self.width, self.height) {
            (Some(format), _, _) => Ok(format.size()),
            (None, Some(width), Some(height)) => Ok(Size::try_new(width, height)?),
            _ => Ok(CanvasFormat::Square.size()),
        }
    }

    fn layout_config(&self) -> LayoutConfig {
        let fit = if self.contain {
            FitPolicy::Contain
        } else {
            FitPolicy::Stretch
        };
        LayoutConfig::new(self.margin, fit)
    }

    fn settings_delta(&self) -> SettingsDelta {
        SettingsDelta {
            spacing: self.spacing,
            roundness: self.roundness,
            border_width: self.border_width,
            border_color: self.border_color,
            border_style: self.border_style,
            background_color: self.background,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Templates { columns, rows } => list_templates(columns, rows),
        Commands::Layout(args) => layout(&args),
    }
}

fn list_templates(columns: usize, rows: usize) -> Result<()> {
    for template in CATALOG {
        println!("{}", template);
        for line in template.ascii_thumbnail(columns, rows).lines() {
            println!("  |{:<width$}|", line, width = columns);
        }
        println!();
    }
    Ok(())
}

fn layout(args: &LayoutArgs) -> Result<()> {
    let template = template_by_name(&args.template)?;
    let canvas = args.canvas_size()?;
    let mut compositor = Compositor::with_layout(Scene::new(canvas), args.layout_config());
    let group = compositor.instantiate(template);
    let cells = compositor
        .collage(group)
        .map(|collage| collage.cells.clone())
        .context("Collage was not registered")?;

    let delta = args.settings_delta();
    match args.cell {
        Some(index) => {
            let frame = cells
                .get(index)
                .with_context(|| format!("{} has no cell {}", template, index))?;
            compositor.apply_settings(frame.handle, &delta);
        }
        None => compositor.apply_settings(group, &delta),
    }

    if let Some(path) = &args.image {
        let frame = cells
            .get(args.image_cell)
            .with_context(|| format!("{} has no cell {}", template, args.image_cell))?;
        let decoded =
            image::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let image = compositor.import_image(&decoded);
        compositor.surface_mut().set_pixels(image, decoded.to_rgba8());
        match compositor.attach_image(image, frame.handle) {
            Some(fit) => info!(
                "Attached {} to cell {} at scale {:.3}",
                path.display(),
                args.image_cell,
                fit.scale
            ),
            None => warn!("Could not attach {}", path.display()),
        }
    }

    println!("{} on {} canvas", template, canvas);
    for (index, frame) in cells.iter().enumerate() {
        let bounds = compositor
            .surface()
            .bounding_box(frame.handle)
            .context("Frame has no bounds")?;
        let config = compositor
            .resolved_config(frame.handle)
            .context("Frame has no config")?;
        println!(
            "  #{} [{}] left={:.2} top={:.2} width={:.2} height={:.2} radius={} border={} {} {:?}",
            index,
            frame.id,
            bounds.left,
            bounds.top,
            bounds.width,
            bounds.height,
            config.roundness,
            config.border_width,
            config.border_color,
            config.border_style,
        );
    }

    if let Some(path) = &args.preview {
        write_preview(compositor.surface(), path)?;
    }
    Ok(())
}

#[cfg(feature = "debug")]
fn write_preview(scene: &Scene, path: &Path) -> Result<()> {
    debug::save_scene_preview(scene, path, &drawing::PreviewConfig::default())
        .with_context(|| format!("Failed to write preview to {}", path.display()))?;
    info!("Preview written to {}", path.display());
    Ok(())
}

#[cfg(not(feature = "debug"))]
fn write_preview(_scene: &Scene, path: &Path) -> Result<()> {
    bail!(
        "Cannot write {}: previews need the `debug` feature",
        path.display()
    )
}
