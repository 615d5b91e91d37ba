use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "flowtrail", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a session headlessly and write the final frame as a PNG.
    Render(RenderArgs),
    /// List the built-in biome palettes.
    Biomes,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Session config JSON. Without it a default 800x600 session is used.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Override the number of ticks to run.
    #[arg(long)]
    frames: Option<u64>,

    /// Override the seed for noise and random draws.
    #[arg(long)]
    seed: Option<u64>,

    /// Advance particles on a rayon pool.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Biomes => cmd_biomes(),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut cfg = match &args.config {
        Some(path) => flowtrail::SessionConfig::from_path(path)
            .with_context(|| format!("load session config '{}'", path.display()))?,
        None => flowtrail::SessionConfig::new(flowtrail::Canvas::new(800, 600), 600),
    };
    if let Some(frames) = args.frames {
        cfg.frames = frames;
    }
    if args.seed.is_some() {
        cfg.seed = args.seed;
    }
    if args.parallel {
        cfg.threading.parallel = true;
    }
    if args.threads.is_some() {
        cfg.threading.threads = args.threads;
    }
    cfg.validate().with_context(|| "validate session config")?;

    let outcome = flowtrail::run_session(&cfg).with_context(|| "run session")?;
    flowtrail::save_png(&outcome.frame, &args.out)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_biomes() -> anyhow::Result<()> {
    for i in 0..flowtrail::biome_count() {
        let palette = flowtrail::Palette::biome(i).with_context(|| format!("load biome {i}"))?;
        let bg = palette.background();
        println!(
            "{i}  {:<11} bg #{:02x}{:02x}{:02x}  swatches {}",
            palette.name(),
            bg.r,
            bg.g,
            bg.b,
            palette.swatches().len()
        );
    }
    Ok(())
}
