//! PNG frame sequences and the gifski encoder step
//!
//! In frame-encoder mode ffmpeg writes `<base>.<token>.frame0001.png`, ...
//! next to the final GIF. The token keeps two inputs with the same stem in the
//! same batch from sharing (and deleting) each other's frames.

use shared_utils::{output_base, Result, ToolInvocation, VidGifError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// gifski downscales to its default width unless told otherwise; this keeps
/// the source resolution for anything a GIF can reasonably hold.
pub const MAX_WIDTH: u32 = 9000;

/// `<token>.frame%04d.png`, the ffmpeg output suffix for a frame sequence.
pub fn frame_suffix(token: &str) -> String {
    format!("{}.frame%04d.png", token)
}

/// The frames written for one input, located by glob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSet {
    base: PathBuf,
    token: String,
}

impl FrameSet {
    pub fn new(input: &Path, token: &str, output_dir: Option<&Path>) -> Self {
        Self {
            base: output_base(input, output_dir),
            token: token.to_string(),
        }
    }

    /// `<escaped base>.<token>.frame*.png`
    pub fn pattern(&self) -> String {
        let base = glob::Pattern::escape(&self.base.to_string_lossy());
        format!("{}.{}.frame*.png", base, self.token)
    }

    /// Every frame on disk, in frame-number order.
    pub fn collect(&self) -> Result<Vec<PathBuf>> {
        let pattern = self.pattern();
        let entries = glob::glob(&pattern).map_err(|e| VidGifError::InvalidPattern {
            pattern: pattern.clone(),
            message: e.msg.to_string(),
        })?;

        let mut frames: Vec<PathBuf> = entries.filter_map(|entry| entry.ok()).collect();
        frames.sort_by_key(|p| (frame_number(p), p.clone()));
        debug!(pattern = %pattern, count = frames.len(), "Collected frames");
        Ok(frames)
    }

    /// Removes every frame; failures are logged and skipped.
    pub fn delete(&self) -> usize {
        let frames = match self.collect() {
            Ok(frames) => frames,
            Err(e) => {
                warn!(error = %e, "Cannot list frames for deletion");
                return 0;
            }
        };

        let mut removed = 0;
        for frame in &frames {
            match fs::remove_file(frame) {
                Ok(()) => removed += 1,
                Err(e) => warn!(path = %frame.display(), error = %e, "Failed to delete frame"),
            }
        }
        debug!(removed, total = frames.len(), "Deleted frames");
        removed
    }
}

fn frame_number(path: &Path) -> u64 {
    path.file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.rsplit_once(".frame"))
        .and_then(|(_, n)| n.parse().ok())
        .unwrap_or(u64::MAX)
}

/// `gifski -o <gif> [--quality Q] --width 9000 [--repeat N] <frames...>`
pub fn build_gifski_invocation(
    gifski: &Path,
    output: &Path,
    quality: Option<u8>,
    loop_count: Option<i32>,
    frames: &[PathBuf],
) -> ToolInvocation {
    let mut cmd = ToolInvocation::new(gifski);
    cmd.push_pair("-o", output);
    if let Some(q) = quality {
        cmd.push_pair("--quality", q.to_string());
    }
    cmd.push_pair("--width", MAX_WIDTH.to_string());
    if let Some(n) = loop_count.filter(|n| *n != 0) {
        cmd.push_pair("--repeat", n.to_string());
    }
    for frame in frames {
        cmd.push(frame);
    }
    cmd
}
