use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use reelkit::{
    Clip, FrameIndex, ImageProcessor, ImageSource, Pipeline, Progress, ReelConfig, RenderJob,
    TransitionKind, TransitionSet, TransitionSpec,
};

#[derive(Parser, Debug)]
#[command(name = "reelkit", version, about = "Turn still images into a portrait video reel")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render an MP4 reel (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render a single frame of one image's clip as a PNG.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct ConfigArgs {
    /// Output resolution preset.
    #[arg(long, value_enum, default_value_t = Preset::Hd)]
    preset: Preset,

    /// JSON render settings; replaces the preset when given.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input images (JPEG or PNG), in presentation order.
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Seconds each image stays on screen.
    #[arg(long, default_value_t = reelkit::DEFAULT_STILL_SECS)]
    duration: f64,

    /// Enabled transitions, comma separated. Defaults to all.
    #[arg(long, value_delimiter = ',')]
    transitions: Vec<String>,

    /// Suppress progress lines.
    #[arg(long)]
    quiet: bool,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input image.
    #[arg(long)]
    image: PathBuf,

    /// Transition applied to the image.
    #[arg(long)]
    transition: String,

    /// Frame index within the clip (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Seconds the image stays on screen.
    #[arg(long, default_value_t = reelkit::DEFAULT_STILL_SECS)]
    duration: f64,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Preset {
    /// 1080x1920.
    Hd,
    /// 608x1080.
    Sd,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reelkit=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn load_config(args: &ConfigArgs) -> anyhow::Result<ReelConfig> {
    let cfg = match &args.config {
        Some(path) => ReelConfig::from_path(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => match args.preset {
            Preset::Hd => ReelConfig::portrait_hd(),
            Preset::Sd => ReelConfig::portrait_sd(),
        },
    };
    cfg.validate()?;
    Ok(cfg)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.config)?;
    let transitions = if args.transitions.is_empty() {
        TransitionSet::all()
    } else {
        TransitionSet::parse(&args.transitions)?
    };
    if !reelkit::is_ffmpeg_on_path() {
        anyhow::bail!("ffmpeg is required for MP4 encoding, but was not found on PATH");
    }

    let job = RenderJob::from_paths(&args.images, &args.out)
        .with_still_duration(args.duration)
        .with_transitions(transitions);

    let quiet = args.quiet;
    let mut report = |p: &Progress| {
        if !quiet {
            eprintln!("[{:>3.0}%] {}: {}", p.fraction * 100.0, p.stage, p.message);
        }
    };
    let summary = Pipeline::new(cfg)?.run_with_summary(&job, &mut report)?;

    eprintln!(
        "wrote {} ({} image(s), {:.2}s, {} frames, {} @ {} fps)",
        args.out.display(),
        summary.images,
        summary.total_duration_secs,
        summary.total_frames,
        summary.canvas,
        summary.fps.as_f64()
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.config)?;
    let kind: TransitionKind = args.transition.parse()?;

    let still = ImageProcessor::new(&cfg).process_source(&ImageSource::path(&args.image))?;
    let spec = TransitionSpec::new(kind, cfg.transition_secs, args.duration, cfg.fps)?;
    let clip = Clip::new(still, spec)?;
    let frame = clip.frame(FrameIndex(args.frame))?;

    ensure_out_dir(&args.out)?;
    frame
        .save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn ensure_out_dir(out: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}
