//! Conversion options and the typed values they carry.

use serde::{Deserialize, Serialize};
use shared_utils::{Result, VidGifError};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Environment variable overriding the ffmpeg binary.
pub const FFMPEG_ENV: &str = "VID_GIF_FFMPEG";
/// Environment variable overriding the gifski binary.
pub const GIFSKI_ENV: &str = "VID_GIF_GIFSKI";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConvertTo {
    #[default]
    Gif,
    Video,
}

impl ConvertTo {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConvertTo::Gif => "gif",
            ConvertTo::Video => "video",
        }
    }
}

impl fmt::Display for ConvertTo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output frame size: `640x480`, `640x?`, `?x480` or `50%`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameSize {
    Fixed { width: u32, height: u32 },
    Width(u32),
    Height(u32),
    Percent(u32),
}

impl FromStr for FrameSize {
    type Err = VidGifError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || VidGifError::InvalidSize(s.to_string());
        let spec = s.trim();

        if let Some(pct) = spec.strip_suffix('%') {
            let pct: u32 = pct.parse().map_err(|_| invalid())?;
            if pct == 0 || pct > 999 {
                return Err(invalid());
            }
            return Ok(FrameSize::Percent(pct));
        }

        let (w, h) = spec.split_once('x').ok_or_else(invalid)?;
        let dim = |v: &str| -> Result<u32> {
            match v.parse::<u32>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(invalid()),
            }
        };

        match (w, h) {
            ("?", "?") => Err(invalid()),
            ("?", h) => Ok(FrameSize::Height(dim(h)?)),
            (w, "?") => Ok(FrameSize::Width(dim(w)?)),
            (w, h) => Ok(FrameSize::Fixed {
                width: dim(w)?,
                height: dim(h)?,
            }),
        }
    }
}

/// Display aspect ratio, from `16:9` or `1.7777`.
///
/// On its own it adds nothing to the command; it resolves the free side of a
/// `Wx?` / `?xH` size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspectRatio(f64);

impl AspectRatio {
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl FromStr for AspectRatio {
    type Err = VidGifError;

    fn from_str(s: &str) -> Result<Self> {
        let spec = s.trim();
        let ratio = match spec.split_once(':') {
            Some((w, h)) => {
                let w: f64 = w.parse().map_err(|_| VidGifError::InvalidAspect(s.to_string()))?;
                let h: f64 = h.parse().map_err(|_| VidGifError::InvalidAspect(s.to_string()))?;
                w / h
            }
            None => spec
                .parse()
                .map_err(|_| VidGifError::InvalidAspect(s.to_string()))?,
        };

        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(VidGifError::InvalidAspect(s.to_string()));
        }
        Ok(AspectRatio(ratio))
    }
}

/// Locations of the external binaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub gifski: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            gifski: PathBuf::from("gifski"),
        }
    }
}

impl ToolPaths {
    /// Defaults, overridden by `VID_GIF_FFMPEG` / `VID_GIF_GIFSKI` when set and non-empty.
    pub fn from_env() -> Self {
        let mut paths = Self::default();
        if let Some(p) = std::env::var_os(FFMPEG_ENV).filter(|p| !p.is_empty()) {
            paths.ffmpeg = PathBuf::from(p);
        }
        if let Some(p) = std::env::var_os(GIFSKI_ENV).filter(|p| !p.is_empty()) {
            paths.gifski = PathBuf::from(p);
        }
        paths
    }
}

/// Everything one batch needs to know about the conversion.
///
/// Unset options leave the matching ffmpeg default in place.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOptions {
    pub convert_to: ConvertTo,
    /// Output folder; outputs land next to their source when unset
    pub output_dir: Option<PathBuf>,
    /// Output container for `ConvertTo::Video` (e.g. `mp4`); required in that mode
    pub format: Option<String>,
    pub fps: Option<u32>,
    pub size: Option<FrameSize>,
    pub aspect: Option<AspectRatio>,
    /// Extract PNG frames with ffmpeg and assemble them with gifski
    pub gifski: bool,
    /// gifski quality, 1-100
    pub quality: Option<u8>,
    /// Delete the PNG frames once gifski is done
    pub delete_frames: bool,
    pub video_codec: Option<String>,
    /// Target bitrate in kbps; a bare number gets a `k` suffix
    pub video_bitrate: Option<String>,
    pub video_bitrate_constant: bool,
    /// Seek offset, seconds or `[[hh:]mm:]ss[.xxx]`
    pub start_time: Option<String>,
    /// Output duration limit, seconds or `[[hh:]mm:]ss[.xxx]`
    pub duration: Option<String>,
    /// -1 no loop, 0 loop forever, N loop N times
    pub loop_count: Option<i32>,
    /// Single-pass palettegen/paletteuse GIF (ignored with `gifski`)
    pub use_palette: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            convert_to: ConvertTo::Gif,
            output_dir: None,
            format: None,
            fps: None,
            size: None,
            aspect: None,
            gifski: false,
            quality: None,
            delete_frames: true,
            video_codec: None,
            video_bitrate: None,
            video_bitrate_constant: false,
            start_time: None,
            duration: None,
            loop_count: None,
            use_palette: false,
        }
    }
}

impl ConversionOptions {
    pub fn gif() -> Self {
        Self::default()
    }

    pub fn video(format: impl Into<String>) -> Self {
        Self {
            convert_to: ConvertTo::Video,
            format: Some(format.into()),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.convert_to == ConvertTo::Video
            && self.format.as_deref().map_or(true, |f| f.trim().is_empty())
        {
            return Err(VidGifError::MissingFormat);
        }
        Ok(())
    }

    /// Two-stage ffmpeg → PNG frames → gifski pipeline.
    pub fn uses_frame_encoder(&self) -> bool {
        self.convert_to == ConvertTo::Gif && self.gifski
    }

    pub fn uses_palette(&self) -> bool {
        self.convert_to == ConvertTo::Gif && !self.gifski && self.use_palette
    }

    /// Extension of the final artifact: `gif`, or the video format.
    pub fn target_extension(&self) -> &str {
        match self.convert_to {
            ConvertTo::Gif => "gif",
            ConvertTo::Video => self.format.as_deref().unwrap_or(""),
        }
    }
}
