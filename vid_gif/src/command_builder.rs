//! ffmpeg command construction
//!
//! Turns one input file plus `ConversionOptions` into a `ToolInvocation`.
//! Nothing here runs a process, so every argument list can be asserted in tests.
//!
//! Argument order: `[-ss T] -i <input> -y [-filter_complex G] [-r F] [-vcodec C]
//! [-b:v B [-maxrate B -minrate B -bufsize 3M]] [-filter:v scale=..] [-t D]
//! [-loop N] [-f FMT] <output>`

use crate::frames;
use crate::options::{AspectRatio, ConversionOptions, FrameSize};
use shared_utils::{determine_output_path, ToolInvocation};
use std::path::{Path, PathBuf};

/// Single-pass palette generation and application.
pub const PALETTE_GRAPH: &str =
    "split [o1] [o2];[o1] palettegen [p]; [o2] fifo [o3];[o3] [p] paletteuse";

const CONSTANT_RATE_BUFSIZE: &str = "3M";

/// The first-stage ffmpeg run for one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeJob {
    pub input: PathBuf,
    /// What ffmpeg writes: the GIF, the video, or the `%04d` frame pattern
    pub output: PathBuf,
    pub invocation: ToolInvocation,
}

/// Path ffmpeg writes to for `input`.
pub fn transcode_output(input: &Path, token: &str, options: &ConversionOptions) -> PathBuf {
    let output_dir = options.output_dir.as_deref();
    if options.uses_frame_encoder() {
        determine_output_path(input, &frames::frame_suffix(token), output_dir)
    } else {
        determine_output_path(input, options.target_extension(), output_dir)
    }
}

pub fn build_transcode_job(
    input: &Path,
    token: &str,
    options: &ConversionOptions,
    ffmpeg: &Path,
) -> TranscodeJob {
    let output = transcode_output(input, token, options);
    let mut cmd = ToolInvocation::new(ffmpeg);

    if let Some(start) = non_empty(&options.start_time) {
        cmd.push_pair("-ss", start);
    }
    cmd.push_pair("-i", input);
    cmd.push("-y");

    let scale = options.size.map(|size| scale_filter(size, options.aspect));

    if options.uses_palette() {
        let graph = match &scale {
            Some(scale) => format!("{},{}", scale, PALETTE_GRAPH),
            None => PALETTE_GRAPH.to_string(),
        };
        cmd.push_pair("-filter_complex", graph);
    }

    if let Some(fps) = options.fps {
        cmd.push_pair("-r", fps.to_string());
    }
    if let Some(codec) = non_empty(&options.video_codec) {
        cmd.push_pair("-vcodec", codec);
    }
    if let Some(bitrate) = non_empty(&options.video_bitrate) {
        let bitrate = normalize_bitrate(bitrate);
        cmd.push_pair("-b:v", &bitrate);
        if options.video_bitrate_constant {
            cmd.push_pair("-maxrate", &bitrate);
            cmd.push_pair("-minrate", &bitrate);
            cmd.push_pair("-bufsize", CONSTANT_RATE_BUFSIZE);
        }
    }

    if let Some(scale) = scale.filter(|_| !options.uses_palette()) {
        cmd.push_pair("-filter:v", scale);
    }

    if let Some(duration) = non_empty(&options.duration) {
        cmd.push_pair("-t", duration);
    }
    if let Some(n) = options.loop_count.filter(|n| *n != 0) {
        cmd.push_pair("-loop", n.to_string());
    }
    if !options.uses_frame_encoder() {
        cmd.push_pair("-f", options.target_extension());
    }

    cmd.push(&output);

    TranscodeJob {
        input: input.to_path_buf(),
        output,
        invocation: cmd,
    }
}

/// `scale=w=..:h=..`, both sides even.
///
/// A free side (`?`) is computed from the aspect ratio when one is given and
/// left to ffmpeg's expression evaluator otherwise.
pub fn scale_filter(size: FrameSize, aspect: Option<AspectRatio>) -> String {
    let (w, h) = match size {
        FrameSize::Fixed { width, height } => (even(width as f64), even(height as f64)),
        FrameSize::Percent(pct) => {
            let ratio = pct as f64 / 100.0;
            (
                format!("trunc(iw*{}/2)*2", ratio),
                format!("trunc(ih*{}/2)*2", ratio),
            )
        }
        FrameSize::Width(width) => match aspect {
            Some(a) => (
                even(width as f64),
                even((width as f64 / a.value()).round()),
            ),
            None => (even(width as f64), "trunc(ow/a/2)*2".to_string()),
        },
        FrameSize::Height(height) => match aspect {
            Some(a) => (
                even((height as f64 * a.value()).round()),
                even(height as f64),
            ),
            None => ("trunc(oh*a/2)*2".to_string(), even(height as f64)),
        },
    };
    format!("scale=w={}:h={}", w, h)
}

fn even(v: f64) -> String {
    (((v / 2.0).round() * 2.0) as u64).to_string()
}

/// `1000` → `1000k`. Values with a unit are passed through.
pub fn normalize_bitrate(bitrate: &str) -> String {
    let bitrate = bitrate.trim();
    if bitrate.ends_with(|c: char| c.is_ascii_digit()) {
        format!("{}k", bitrate)
    } else {
        bitrate.to_string()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
