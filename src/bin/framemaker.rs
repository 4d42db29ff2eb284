use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, error::ErrorKind};
use tracing_subscriber::EnvFilter;

const EXAMPLES: &str = "\
Examples:
  framemaker screenshot.png
  framemaker \"screenshots/*.png\" ./output
  framemaker iphone-shot.png --frame=iphone
  framemaker ipad-shot.png --frame=ipad

Screenshots are resized to cover the device screen (edges may be cropped).
Output files are named <original>-framed.png.";

/// Add device frames to app screenshots.
#[derive(Parser, Debug)]
#[command(name = "framemaker", version, arg_required_else_help = true, after_help = EXAMPLES)]
struct Cli {
    /// Screenshot file or glob pattern (e.g. "screenshots/*.png").
    input: String,

    /// Output directory.
    #[arg(default_value = "./framed")]
    output_dir: PathBuf,

    /// Frame type (builtin: iphone, ipad).
    #[arg(long, default_value = "iphone")]
    frame: String,

    /// Read `<name>.svg` templates from this directory instead of the builtin ones.
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Frame screenshots in parallel.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Load system fonts so text inside templates is drawn.
    #[arg(long, default_value_t = false)]
    system_fonts: bool,

    /// Print the batch summary as JSON on stdout.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                e.print()?;
                return Ok(());
            }
            _ => e.exit(),
        },
    };

    init_tracing();

    let mut registry = framemaker::FrameRegistry::builtin();
    if let Some(dir) = &cli.templates {
        registry = registry.with_template_dir(dir);
    }
    let rasterizer = if cli.system_fonts {
        framemaker::Rasterizer::with_system_fonts()
    } else {
        framemaker::Rasterizer::new()
    };

    let runner = framemaker::BatchRunner::new(framemaker::FramingPipeline::new(
        &registry,
        &rasterizer,
    ))
    .with_options(framemaker::BatchOptions {
        parallel: cli.parallel,
        threads: cli.threads,
    });

    let report = runner
        .run_all(&cli.input, &cli.output_dir, &cli.frame)
        .with_context(|| format!("frame screenshots from '{}'", cli.input))?;

    if cli.json {
        let summary = serde_json::to_string_pretty(&report.summary())
            .context("serialize batch summary")?;
        println!("{summary}");
    }

    eprintln!(
        "done: {} framed, {} failed",
        report.succeeded,
        report.failed.len()
    );
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
