use clap::{Parser, ValueEnum};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;
use tracing::{info, warn, Level};

use shared_utils::common_utils::{display_name, is_command_available};
use shared_utils::logging::{init_logging, LogConfig};
use shared_utils::{
    create_progress_bar, install_panic_handler, print_simple_summary, print_summary_report,
    progress, report_error, resolve_pattern,
};
use vid_gif::{
    AspectRatio, BatchResult, ConversionOptions, ConvertTo, FrameSize, VideoGifConverter,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Target {
    Gif,
    Video,
}

impl From<Target> for ConvertTo {
    fn from(target: Target) -> Self {
        match target {
            Target::Gif => ConvertTo::Gif,
            Target::Video => ConvertTo::Video,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "vid-gif")]
#[command(
    version,
    about = "Convert videos to animated GIFs, or GIFs to videos, in batch",
    long_about = None
)]
struct Cli {
    /// Input files as a glob pattern; quote it so the shell leaves it alone ("videos/*.mp4")
    #[arg(value_name = "PATTERN")]
    pattern: String,

    /// What to produce
    #[arg(short = 't', long, value_enum, default_value_t = Target::Gif)]
    convert_to: Target,

    /// Output directory (default: next to each input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output container when converting to video (mp4, webm, ...)
    #[arg(short, long)]
    format: Option<String>,

    /// Frame rate
    #[arg(short = 'r', long)]
    fps: Option<u32>,

    /// Frame size: 640x480, 640x?, ?x480 or 50%
    #[arg(short, long)]
    size: Option<FrameSize>,

    /// Aspect ratio (4:3, 1.7777); completes a 640x? or ?x480 size
    #[arg(short, long)]
    aspect: Option<AspectRatio>,

    /// Build the GIF from extracted frames with gifski
    #[arg(short, long)]
    gifski: bool,

    /// gifski quality (1-100)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: Option<u8>,

    /// Keep the extracted PNG frames after gifski is done
    #[arg(long)]
    keep_frames: bool,

    /// Video codec (libx264, libvpx-vp9, ...)
    #[arg(long)]
    video_codec: Option<String>,

    /// Video bitrate in kbps
    #[arg(long)]
    video_bitrate: Option<String>,

    /// Hold the bitrate constant
    #[arg(long)]
    video_bitrate_constant: bool,

    /// Maximum output duration (seconds or [[hh:]mm:]ss[.xxx])
    #[arg(short, long)]
    duration: Option<String>,

    /// Start offset (seconds or [[hh:]mm:]ss[.xxx])
    #[arg(long)]
    start_time: Option<String>,

    /// -1 no loop, 0 loop forever, N loop N times
    #[arg(short, long = "loop", allow_negative_numbers = true)]
    loop_count: Option<i32>,

    /// Generate a palette for better GIF colors (ignored with --gifski)
    #[arg(long)]
    use_palette: bool,

    /// Debug output on stderr
    #[arg(long, conflicts_with = "quiet")]
    verbose: bool,

    /// Errors only, no progress bar
    #[arg(long)]
    quiet: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Directory for the rolling log files (default: system temp dir)
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl Cli {
    fn conversion_options(&self) -> ConversionOptions {
        ConversionOptions {
            convert_to: self.convert_to.into(),
            output_dir: self.output.clone(),
            format: self.format.clone(),
            fps: self.fps,
            size: self.size,
            aspect: self.aspect,
            gifski: self.gifski,
            quality: self.quality,
            delete_frames: !self.keep_frames,
            video_codec: self.video_codec.clone(),
            video_bitrate: self.video_bitrate.clone(),
            video_bitrate_constant: self.video_bitrate_constant,
            start_time: self.start_time.clone(),
            duration: self.duration.clone(),
            loop_count: self.loop_count,
            use_palette: self.use_palette,
        }
    }

    fn log_config(&self) -> LogConfig {
        let mut config = LogConfig::new();
        if let Some(dir) = &self.log_dir {
            config = config.with_log_dir(dir);
        }
        if self.verbose {
            config.with_level(Level::DEBUG).with_stderr_level(Level::DEBUG)
        } else if self.quiet || self.json {
            config.with_stderr_level(Level::ERROR)
        } else {
            config
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    install_panic_handler();
    if let Err(e) = init_logging("vid_gif", cli.log_config()) {
        eprintln!("⚠️  Could not initialize logging: {:#}", e);
    }
    if cli.quiet || cli.json {
        progress::enable_quiet_mode();
    }

    match run(&cli) {
        Ok(result) if result.failed > 0 => std::process::exit(1),
        Ok(_) => Ok(()),
        Err(e) => {
            report_error(&*e);
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<BatchResult> {
    let options = cli.conversion_options();
    let mut converter = VideoGifConverter::new(options)?;
    check_tools(&converter);

    if cli.quality.is_some() && !converter.options().uses_frame_encoder() {
        warn!("--quality only applies together with --gifski");
    }

    let files = resolve_pattern(&cli.pattern)?;
    if !cli.json {
        println!("{} file(s) found!", files.len());
    }
    info!(pattern = %cli.pattern, count = files.len(), "Resolved inputs");

    let label = format!("Convert to .{}", converter.options().target_extension());
    let pb = create_progress_bar(files.len() as u64, &label);
    let failures = Rc::new(RefCell::new(Vec::new()));

    let bar = pb.clone();
    let sink = Rc::clone(&failures);
    converter
        .on_progress(move |p| bar.set_position((p.completed + p.failed) as u64))
        .on_error(move |e| {
            sink.borrow_mut().push(serde_json::json!({
                "input": e.input,
                "stage": e.stage,
                "error": e.error.to_string(),
            }))
        });

    let start = Instant::now();
    let result = converter.run(files)?;
    let elapsed = start.elapsed();
    pb.finish_and_clear();

    let output_dir = converter.options().output_dir.as_deref();
    if cli.json {
        let report = serde_json::json!({
            "completed": result.completed,
            "failed": result.failed,
            "total": result.total,
            "duration_secs": elapsed.as_secs_f64(),
            "output_dir": output_dir,
            "failures": *failures.borrow(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if cli.quiet {
        print_simple_summary(&result);
    } else {
        print_summary_report(&result, elapsed, &label, output_dir);
        for failure in failures.borrow().iter() {
            let input = failure["input"].as_str().map(PathBuf::from).unwrap_or_default();
            eprintln!(
                "   ❌ {} ({}): {}",
                display_name(&input),
                failure["stage"].as_str().unwrap_or_default(),
                failure["error"].as_str().unwrap_or_default()
            );
        }
    }

    Ok(result)
}

/// Warns about tools missing from `PATH`; each file then fails with a spawn error.
fn check_tools<R: shared_utils::ToolRunner>(converter: &VideoGifConverter<R>) {
    let mut needed = vec![("ffmpeg", &converter.tools().ffmpeg)];
    if converter.options().uses_frame_encoder() {
        needed.push(("gifski", &converter.tools().gifski));
    }

    for (name, path) in needed {
        if !is_command_available(&path.to_string_lossy()) {
            warn!(tool = name, path = %path.display(), "Tool not found");
            eprintln!(
                "⚠️  {} not found ({}); install it or point {} at it",
                name,
                path.display(),
                if name == "ffmpeg" {
                    vid_gif::options::FFMPEG_ENV
                } else {
                    vid_gif::options::GIFSKI_ENV
                }
            );
        }
    }
}
