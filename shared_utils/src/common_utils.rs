//! Small path and command helpers.

use std::path::{Path, PathBuf};

/// Resolves a program name to a full path via `PATH`, or accepts an explicit path.
pub fn find_command(command_name: &str) -> Option<PathBuf> {
    which::which(command_name).ok()
}

pub fn is_command_available(command_name: &str) -> bool {
    find_command(command_name).is_some()
}

/// ```
/// use shared_utils::common_utils::format_command_string;
///
/// let cmd_str = format_command_string("ffmpeg", &["-i", "input.mp4", "output.gif"]);
/// assert_eq!(cmd_str, "ffmpeg -i input.mp4 output.gif");
/// ```
pub fn format_command_string(command: &str, args: &[&str]) -> String {
    if args.is_empty() {
        command.to_string()
    } else {
        format!("{} {}", command, args.join(" "))
    }
}

/// `file.mp4` → `file.mp4`, `/a/b/file.mp4` → `file.mp4`; used for terse log lines.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_command_string_no_args() {
        assert_eq!(format_command_string("gifski", &[]), "gifski");
    }

    #[test]
    fn test_missing_command_is_unavailable() {
        assert!(!is_command_available("nonexistent_command_xyz_vid_gif"));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("/a/b/clip.mp4")), "clip.mp4");
    }
}
