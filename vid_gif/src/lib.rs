//! vid-gif - batch conversion between videos and animated GIFs
//!
//! Drives ffmpeg (and optionally gifski) over every file matched by a glob
//! pattern:
//! - video → GIF, plain or with a generated palette
//! - video → PNG frames → GIF through gifski for higher quality
//! - GIF → video in any container/codec ffmpeg supports
//!
//! ```rust,ignore
//! use vid_gif::{ConversionOptions, VideoGifConverter};
//!
//! let mut converter = VideoGifConverter::new(ConversionOptions {
//!     fps: Some(10),
//!     use_palette: true,
//!     ..ConversionOptions::gif()
//! })?;
//! converter.on_progress(|p| println!("{:.0}%", p.percent));
//! let result = converter.run("videos/*.mp4")?;
//! println!("{} converted, {} failed", result.completed, result.failed);
//! ```

pub mod command_builder;
pub mod converter;
pub mod events;
pub mod frames;
pub mod options;

#[cfg(test)]
mod functional_tests;

pub use command_builder::{build_transcode_job, TranscodeJob};
pub use converter::{Inputs, VideoGifConverter};
pub use events::{FailureEvent, FailureStage};
pub use frames::FrameSet;
pub use options::{AspectRatio, ConversionOptions, ConvertTo, FrameSize, ToolPaths};

pub use shared_utils::{BatchResult, ProgressEvent, Result, VidGifError};
