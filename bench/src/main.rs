use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::Context as _;
use serde_json::json;
use sha2::Digest as _;

#[derive(Clone, Debug)]
struct BenchArgs {
    width: u32,
    height: u32,
    frames: u64,
    population: Option<f64>,
    biome: i64,
    breathe: bool,
    warmup: u32,
    repeats: u32,
    seed: u64,
    parallel: bool,
    threads: Option<usize>,
    out_json: Option<PathBuf>,
}

#[derive(Clone, Debug, Default)]
struct RunMetrics {
    setup: Duration,
    tick_total: Duration,
    tick_max: Duration,
    readback: Duration,
    wall_total: Duration,
    frame_sha256: String,
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> anyhow::Result<()> {
    let args = parse_args()?;

    if args.width == 0 || args.height == 0 {
        anyhow::bail!("--width/--height must be > 0");
    }
    if args.frames == 0 || args.repeats == 0 {
        anyhow::bail!("--frames and --repeats must be > 0");
    }
    if let Some(n) = args.threads
        && n == 0
    {
        anyhow::bail!("--threads must be >= 1 when set");
    }

    let cfg = session_config(&args);
    cfg.validate().context("validate bench session")?;

    if args.warmup > 0 {
        eprintln!("warmup: {} run(s)", args.warmup);
        for _ in 0..args.warmup {
            let _ = run_once(&cfg)?;
        }
    }

    eprintln!(
        "bench: {repeats} run(s) ({profile} build), {w}x{h}, {frames} frames/run, mode={mode}, threads={threads}",
        repeats = args.repeats,
        profile = if cfg!(debug_assertions) {
            "debug"
        } else {
            "release"
        },
        w = args.width,
        h = args.height,
        frames = args.frames,
        mode = if args.parallel {
            "parallel"
        } else {
            "sequential"
        },
        threads = args
            .threads
            .map(|n| n.to_string())
            .unwrap_or_else(|| "auto".to_string()),
    );

    let mut runs = Vec::<RunMetrics>::with_capacity(args.repeats as usize);
    for _ in 0..args.repeats {
        runs.push(run_once(&cfg)?);
    }

    let digests = runs
        .iter()
        .map(|r| r.frame_sha256.as_str())
        .collect::<std::collections::BTreeSet<_>>();
    if digests.len() != 1 {
        anyhow::bail!(
            "final frame differs across runs with the same seed ({} distinct digests)",
            digests.len()
        );
    }

    report_percentiles(&runs, args.frames);

    if let Some(path) = &args.out_json {
        write_summary(path, &args, &runs)?;
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn session_config(args: &BenchArgs) -> flowtrail::SessionConfig {
    let mut cfg = flowtrail::SessionConfig::new(
        flowtrail::Canvas::new(args.width, args.height),
        args.frames,
    );
    cfg.seed = Some(args.seed);
    cfg.threading = flowtrail::TickThreading {
        parallel: args.parallel,
        threads: args.threads,
    };
    cfg.params = flowtrail::ConfigPatch {
        target_population: args.population,
        palette_index: Some(args.biome),
        auto_animate: Some(args.breathe),
        ..flowtrail::ConfigPatch::default()
    };
    cfg
}

fn run_once(cfg: &flowtrail::SessionConfig) -> anyhow::Result<RunMetrics> {
    let t_wall = Instant::now();
    let mut m = RunMetrics::default();

    let t0 = Instant::now();
    let mut sim = flowtrail::Simulation::new(
        cfg.canvas,
        flowtrail::ParameterState::default(),
        cfg.seed.unwrap_or(flowtrail::DEFAULT_SEED),
    )
    .with_threading(cfg.threading.clone())?;
    sim.apply_config(&cfg.params);
    let mut surface =
        flowtrail::CpuTrailSurface::new(cfg.canvas.width, cfg.canvas.height, sim.background())?;
    m.setup = t0.elapsed();

    for _ in 0..cfg.frames {
        let t = Instant::now();
        sim.tick(cfg.canvas.width, cfg.canvas.height, &mut surface)?;
        let dt = t.elapsed();
        m.tick_total += dt;
        m.tick_max = m.tick_max.max(dt);
    }

    let t1 = Instant::now();
    let frame = surface.readback();
    m.readback = t1.elapsed();

    m.frame_sha256 = sha256_hex(&frame.data);
    m.wall_total = t_wall.elapsed();
    Ok(m)
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = sha2::Sha256::new();
    h.update(bytes);
    let out = h.finalize();
    out.iter().map(|b| format!("{b:02x}")).collect()
}

fn parse_args() -> anyhow::Result<BenchArgs> {
    let mut args = std::env::args().skip(1);

    let mut out = BenchArgs {
        width: 800,
        height: 600,
        frames: 300,
        population: None,
        biome: 0,
        breathe: false,
        warmup: 1,
        repeats: 10,
        seed: flowtrail::DEFAULT_SEED,
        parallel: false,
        threads: None,
        out_json: None,
    };

    while let Some(a) = args.next() {
        match a.as_str() {
            "--width" => out.width = parse_num(args.next(), "--width")?,
            "--height" => out.height = parse_num(args.next(), "--height")?,
            "--frames" => out.frames = parse_num(args.next(), "--frames")?,
            "--population" => out.population = Some(parse_num(args.next(), "--population")?),
            "--biome" => out.biome = parse_num(args.next(), "--biome")?,
            "--breathe" => out.breathe = true,
            "--warmup" => out.warmup = parse_num(args.next(), "--warmup")?,
            "--repeats" => out.repeats = parse_num(args.next(), "--repeats")?,
            "--seed" => out.seed = parse_num(args.next(), "--seed")?,
            "--parallel" => out.parallel = true,
            "--threads" => out.threads = Some(parse_num(args.next(), "--threads")?),
            "--out-json" => {
                out.out_json = Some(PathBuf::from(args.next().ok_or_else(|| {
                    anyhow::anyhow!("missing value for --out-json (expected a path)")
                })?))
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => anyhow::bail!("unknown arg '{a}' (try --help)"),
        }
    }

    Ok(out)
}

fn print_help() {
    eprintln!(
        "\
flowtrail-bench: time headless simulation ticks on the CPU surface

USAGE:
  cargo run --release --manifest-path bench/Cargo.toml -- [OPTIONS]

OPTIONS:
  --width <N>         canvas width (default 800)
  --height <N>        canvas height (default 600)
  --frames <N>        ticks per run (default 300)
  --population <N>    population override (default: derived from canvas area)
  --biome <N>         biome index (default 0)
  --breathe           enable automated parameter oscillation
  --warmup <N>        untimed runs before measuring (default 1)
  --repeats <N>       timed runs (default 10)
  --seed <N>          noise and draw seed
  --parallel          advance particles on a rayon pool
  --threads <N>       rayon worker threads (parallel mode)
  --out-json <PATH>   write a JSON summary
"
    );
}

fn parse_num<T: std::str::FromStr>(v: Option<String>, flag: &str) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    let v = v.ok_or_else(|| anyhow::anyhow!("missing value for {flag}"))?;
    v.parse::<T>()
        .map_err(|e| anyhow::anyhow!("invalid value for {flag} '{v}': {e}"))
}

type Getter = fn(&RunMetrics) -> Duration;

const FIELDS: &[(&str, Getter)] = &[
    ("setup", |m| m.setup),
    ("tick_total", |m| m.tick_total),
    ("tick_max", |m| m.tick_max),
    ("readback", |m| m.readback),
    ("wall_total", |m| m.wall_total),
];

fn collect(runs: &[RunMetrics], f: Getter) -> Vec<Duration> {
    let mut v = runs.iter().map(f).collect::<Vec<_>>();
    v.sort_by_key(|d| d.as_nanos());
    v
}

fn percentile(v: &[Duration], p: f64) -> Duration {
    if v.is_empty() {
        return Duration::ZERO;
    }
    let n = v.len();
    let rank = (p * (n as f64)).ceil().clamp(1.0, n as f64) as usize;
    v[rank - 1]
}

fn fmt_ms(d: Duration) -> String {
    format!("{:.3}ms", d.as_secs_f64() * 1000.0)
}

fn report_percentiles(runs: &[RunMetrics], frames: u64) {
    eprintln!("\npercentiles across runs (p50/p90/p99):");
    for (name, getter) in FIELDS {
        let v = collect(runs, *getter);
        eprintln!(
            "  {name:12} p50={p50:>10}  p90={p90:>10}  p99={p99:>10}",
            p50 = fmt_ms(percentile(&v, 0.50)),
            p90 = fmt_ms(percentile(&v, 0.90)),
            p99 = fmt_ms(percentile(&v, 0.99)),
        );
    }

    let ticks = collect(runs, |m| m.tick_total);
    let p50 = percentile(&ticks, 0.50);
    if !p50.is_zero() {
        eprintln!(
            "  ticks/sec (p50): {:.1}",
            frames as f64 / p50.as_secs_f64()
        );
    }
}

fn write_summary(path: &PathBuf, args: &BenchArgs, runs: &[RunMetrics]) -> anyhow::Result<()> {
    let mut fields = serde_json::Map::new();
    for (name, getter) in FIELDS {
        let v = collect(runs, *getter);
        fields.insert(
            (*name).to_string(),
            json!({
                "p50_ms": percentile(&v, 0.50).as_secs_f64() * 1000.0,
                "p90_ms": percentile(&v, 0.90).as_secs_f64() * 1000.0,
                "p99_ms": percentile(&v, 0.99).as_secs_f64() * 1000.0,
            }),
        );
    }

    let summary = json!({
        "width": args.width,
        "height": args.height,
        "frames": args.frames,
        "repeats": args.repeats,
        "seed": args.seed,
        "parallel": args.parallel,
        "threads": args.threads,
        "frame_sha256": runs.first().map(|r| r.frame_sha256.clone()),
        "metrics": fields,
    });

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create dir '{}'", parent.display()))?;
    }
    let f = std::fs::File::create(path)
        .with_context(|| format!("create '{}'", path.display()))?;
    serde_json::to_writer_pretty(f, &summary).context("write bench summary")?;
    Ok(())
}
