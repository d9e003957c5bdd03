use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VidGifError {
    #[error("format is missing: --format is required when converting to video")]
    MissingFormat,

    #[error("Invalid size specified: {0} (expected WxH, Wx?, ?xH or N%)")]
    InvalidSize(String),

    #[error("Invalid aspect ratio specified: {0} (expected W:H or a decimal ratio)")]
    InvalidAspect(String),

    #[error("Invalid glob pattern {pattern}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Failed to create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{tool} failed (exit code: {exit_code:?}): {message}")]
    ToolFailed {
        tool: String,
        exit_code: Option<i32>,
        message: String,
    },

    #[error("Could not start {tool}: {message}")]
    ToolSpawn { tool: String, message: String },

    #[error("No frames matched {0}")]
    NoFrames(String),

    #[error("Output would overwrite its own input: {}", .0.display())]
    OutputIsInput(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VidGifError {
    /// Fatal errors abort `run`; everything else is absorbed into the batch result.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            VidGifError::MissingFormat
                | VidGifError::InvalidSize(_)
                | VidGifError::InvalidAspect(_)
                | VidGifError::InvalidPattern { .. }
                | VidGifError::OutputDir { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, VidGifError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_format_message() {
        let err = VidGifError::MissingFormat;
        assert!(err.to_string().contains("format is missing"));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_tool_failed_is_not_fatal() {
        let err = VidGifError::ToolFailed {
            tool: "ffmpeg".to_string(),
            exit_code: Some(1),
            message: "No such file or directory".to_string(),
        };
        assert!(!err.is_fatal());
        let msg = err.to_string();
        assert!(msg.contains("ffmpeg"));
        assert!(msg.contains("Some(1)"));
    }

    #[test]
    fn test_output_dir_error_mentions_path() {
        let err = VidGifError::OutputDir {
            path: PathBuf::from("/nope/out"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.is_fatal());
        assert!(err.to_string().contains("/nope/out"));
    }

    #[test]
    fn test_per_file_errors_are_not_fatal() {
        assert!(!VidGifError::NoFrames("/v/clip.*.png".to_string()).is_fatal());
        assert!(!VidGifError::OutputIsInput(PathBuf::from("/v/a.gif")).is_fatal());
        assert!(!VidGifError::ToolSpawn {
            tool: "gifski".to_string(),
            message: "not found".to_string(),
        }
        .is_fatal());
    }
}
