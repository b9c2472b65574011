use clap::{Parser, Subcommand, ValueEnum};
use qr_swap::document::DocumentWriter;
use qr_swap::pipeline::detection_set;
use qr_swap::tools::{ImageFilePages, load_replacement, load_rgb, save_pages, save_rgb};
use qr_swap::{
    Detector, ImageSequenceWriter, PageRenderer, Placement, ReplaceConfig, Replacer, Result,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "qrswap", version, about = "Find QR codes and swap them for another code")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Paste into the bounding box
    Axis,
    /// Warp onto the exact corners
    Perspective,
}

impl From<Mode> for Placement {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Axis => Placement::AxisAligned,
            Mode::Perspective => Placement::Perspective,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// List detected code regions in an image
    Detect {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        tolerance: Option<f32>,
    },
    /// Replace codes in a single image
    Image {
        #[arg(long)]
        input: PathBuf,
        /// Replacement images, used largest detection first
        #[arg(long = "replacement", required = true)]
        replacements: Vec<PathBuf>,
        #[arg(long)]
        output: PathBuf,
        #[arg(long)]
        replace_all: bool,
        #[arg(long, value_enum, default_value = "axis")]
        mode: Mode,
        #[arg(long)]
        tolerance: Option<f32>,
        #[arg(long)]
        scale: Option<f32>,
    },
    /// Replace the code on every page of a document given as page images
    Pages {
        /// Page images in document order
        #[arg(long = "page", required = true)]
        pages: Vec<PathBuf>,
        #[arg(long)]
        replacement: PathBuf,
        /// Directory for page_NNN.png outputs
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Single-file image sequence output
        #[arg(long)]
        bundle: Option<PathBuf>,
        #[arg(long)]
        zoom: Option<f32>,
        #[arg(long)]
        tolerance: Option<f32>,
        #[arg(long)]
        sequential: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Detect { image, tolerance } => detect_cmd(image, tolerance),
        Command::Image {
            input,
            replacements,
            output,
            replace_all,
            mode,
            tolerance,
            scale,
        } => {
            let mut config = ReplaceConfig::from_env()
                .with_replace_all(replace_all)
                .with_placement(mode.into());
            if let Some(t) = tolerance {
                config = config.with_tolerance(t);
            }
            if let Some(s) = scale {
                config = config.with_scale(s);
            }
            image_cmd(input, replacements, output, config)
        }
        Command::Pages {
            pages,
            replacement,
            out_dir,
            bundle,
            zoom,
            tolerance,
            sequential,
        } => {
            let mut config = ReplaceConfig::from_env().with_parallel_pages(!sequential);
            if let Some(z) = zoom {
                config = config.with_zoom(z);
            }
            if let Some(t) = tolerance {
                config = config.with_tolerance(t);
            }
            pages_cmd(pages, replacement, out_dir, bundle, config)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn detect_cmd(image: PathBuf, tolerance: Option<f32>) -> Result<()> {
    let config = ReplaceConfig::from_env();
    let raster = load_rgb(&image)?;
    let start = Instant::now();
    let quads = detection_set(
        &Detector::new(),
        &raster,
        tolerance.unwrap_or(config.tolerance),
    )?;
    println!(
        "Image: {} ({}x{})",
        image.display(),
        raster.width(),
        raster.height()
    );
    println!("Found {} code regions in {:?}", quads.len(), start.elapsed());
    for (i, q) in quads.iter().enumerate() {
        let c = q.corners();
        println!(
            "  {}: area={:.0} tl=({:.1},{:.1}) tr=({:.1},{:.1}) br=({:.1},{:.1}) bl=({:.1},{:.1})",
            i,
            q.area(),
            c[0].x,
            c[0].y,
            c[1].x,
            c[1].y,
            c[2].x,
            c[2].y,
            c[3].x,
            c[3].y
        );
    }
    Ok(())
}

fn image_cmd(
    input: PathBuf,
    replacements: Vec<PathBuf>,
    output: PathBuf,
    config: ReplaceConfig,
) -> Result<()> {
    let raster = load_rgb(&input)?;
    let replacements = replacements
        .iter()
        .map(load_replacement)
        .collect::<Result<Vec<_>>>()?;

    let report = Replacer::new(config).replace_with_report(&raster, &replacements)?;
    for condition in &report.conditions {
        eprintln!("note: {condition:?}");
    }
    save_rgb(&report.image, &output)?;
    println!(
        "Replaced {} of {} codes, saved {}",
        report.replaced,
        report.detected,
        output.display()
    );
    Ok(())
}

fn pages_cmd(
    pages: Vec<PathBuf>,
    replacement: PathBuf,
    out_dir: Option<PathBuf>,
    bundle: Option<PathBuf>,
    config: ReplaceConfig,
) -> Result<()> {
    let replacement = load_replacement(&replacement)?;
    let renderer = ImageFilePages::new(pages);
    let replacer = Replacer::new(config);

    let start = Instant::now();
    let frames = (0..renderer.page_count())
        .map(|i| renderer.render_page(i, config.zoom))
        .collect::<Result<Vec<_>>>()?;
    let output = replacer.process_document(frames, &replacement)?;
    println!("Processed {} pages in {:?}", output.len(), start.elapsed());

    if let Some(dir) = out_dir {
        for path in save_pages(&output, &dir)? {
            println!("  wrote {}", path.display());
        }
    }
    if let Some(path) = bundle {
        std::fs::write(&path, ImageSequenceWriter.assemble(&output)?)?;
        println!("  wrote {}", path.display());
    }
    Ok(())
}
