use std::{
    fs::File,
    io::{BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "shapefx", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse and validate a shape layer JSON file.
    Validate(ValidateArgs),
    /// Dry-run the compositor over a frame range and print one JSON report per frame.
    Plan(PlanArgs),
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input shape layer JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Input shape layer JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Background size as `WIDTHxHEIGHT`, centered on the origin.
    #[arg(long, default_value = "1920x1080")]
    background: String,

    /// Half-open frame range `A..B`.
    #[arg(long, default_value = "0..1")]
    frames: String,

    /// Item length in frames. Defaults to the end of `--frames`.
    #[arg(long)]
    length: Option<u64>,

    /// Frames per second.
    #[arg(long, default_value_t = 30)]
    fps: u32,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Plan(args) => cmd_plan(args),
    }
}

fn read_layer_json(path: &Path) -> anyhow::Result<shapefx::ShapeLayerSpec> {
    let f = File::open(path).with_context(|| format!("open shape layer '{}'", path.display()))?;
    let r = BufReader::new(f);
    let spec: shapefx::ShapeLayerSpec =
        serde_json::from_reader(r).with_context(|| "parse shape layer JSON")?;
    Ok(spec)
}

fn parse_size(s: &str) -> anyhow::Result<(f64, f64)> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .with_context(|| format!("background '{s}' must be WIDTHxHEIGHT"))?;
    let w: f64 = w.trim().parse().with_context(|| format!("invalid width '{w}'"))?;
    let h: f64 = h.trim().parse().with_context(|| format!("invalid height '{h}'"))?;
    anyhow::ensure!(
        w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0,
        "background size must be positive"
    );
    Ok((w, h))
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let spec = read_layer_json(&args.in_path)?;
    spec.validate()?;
    println!("ok");
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let spec = read_layer_json(&args.in_path)?;
    let layer = shapefx::ShapeLayer::from_spec(&spec)?;
    let (w, h) = parse_size(&args.background)?;
    let range = shapefx::FrameRange::parse(&args.frames)?;
    let fps = shapefx::Fps::new(args.fps, 1)?;
    let length = args.length.unwrap_or(range.end.0);

    let mut dev = shapefx::BoundsDevice::default();
    let background = dev
        .flood(
            shapefx::centered_rect(w / 2.0, h / 2.0),
            shapefx::Rgba8Premul::from_straight_rgba(0, 0, 0, 255),
        )?
        .output();
    let mut comp = shapefx::ShapeCompositor::new(&mut dev, shapefx::CompositorOpts::default())?;
    comp.set_input(&mut dev, Some(background))?;

    let mut out = BufWriter::new(std::io::stdout().lock());
    let mut result = Ok(());
    for frame in range.frames() {
        let ctx = shapefx::FrameContext::new(frame, length, fps);
        if let Err(err) = comp.update(&mut dev, &layer, &ctx) {
            result = Err(anyhow::Error::new(err).context(format!("update frame {}", frame.0)));
            break;
        }
        if let Some(report) = comp.last_report() {
            serde_json::to_writer(&mut out, report)?;
            writeln!(out)?;
        }
    }

    comp.dispose(&mut dev);
    out.flush()?;
    result
}
