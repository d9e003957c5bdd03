//! Output path derivation
//!
//! `clip.mp4` + `gif` → `<dir>/clip.gif`, where `<dir>` is the configured output
//! directory or, without one, the directory of the source file. The suffix may
//! be compound (`1700000000000-0.frame%04d.png`); it is appended verbatim.

use std::path::{Path, PathBuf};

/// `<dir>/<stem>` without any extension.
pub fn output_base(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "output".into());

    match output_dir {
        Some(dir) => dir.join(stem),
        None => input.parent().unwrap_or(Path::new("")).join(stem),
    }
}

/// `<base>.<suffix>`. Pure: never touches the filesystem.
pub fn determine_output_path(input: &Path, suffix: &str, output_dir: Option<&Path>) -> PathBuf {
    let mut path = output_base(input, output_dir).into_os_string();
    path.push(".");
    path.push(suffix);
    PathBuf::from(path)
}
