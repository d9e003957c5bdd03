//! End-to-end runs against the real ffmpeg and gifski binaries.
//!
//! A two-second `testsrc` clip is generated per test. Every test returns early
//! when the tools it needs are not installed.

use crate::{ConversionOptions, FrameSize, VideoGifConverter};
use shared_utils::common_utils::is_command_available;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn have(tool: &str) -> bool {
    let found = is_command_available(tool);
    if !found {
        eprintln!("skipping: {} not installed", tool);
    }
    found
}

fn make_clip(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let status = Command::new("ffmpeg")
        .args(["-v", "error", "-y", "-f", "lavfi", "-i"])
        .arg("testsrc=duration=2:size=160x120:rate=10")
        .args(["-pix_fmt", "yuv420p"])
        .arg(&path)
        .status()
        .expect("ffmpeg runs");
    assert!(status.success(), "could not generate test clip");
    path
}

fn is_gif(path: &Path) -> bool {
    fs::read(path)
        .map(|bytes| bytes.starts_with(b"GIF8"))
        .unwrap_or(false)
}

fn png_count(dir: &Path) -> usize {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|x| x == "png"))
        .count()
}

#[test]
fn test_video_to_gif() {
    if !have("ffmpeg") {
        return;
    }
    let temp = TempDir::new().unwrap();
    let clip = make_clip(temp.path(), "clip.mp4");

    let mut converter = VideoGifConverter::new(ConversionOptions {
        fps: Some(5),
        ..ConversionOptions::gif()
    })
    .unwrap();
    let result = converter.run(vec![clip]).unwrap();

    assert_eq!((result.completed, result.failed), (1, 0));
    assert!(is_gif(&temp.path().join("clip.gif")));
}

#[test]
fn test_palette_and_size_into_output_dir() {
    if !have("ffmpeg") {
        return;
    }
    let temp = TempDir::new().unwrap();
    make_clip(temp.path(), "a.mp4");
    make_clip(temp.path(), "b.mp4");
    let out = temp.path().join("gifs");

    let mut converter = VideoGifConverter::new(ConversionOptions {
        output_dir: Some(out.clone()),
        size: Some(FrameSize::Width(80)),
        use_palette: true,
        ..ConversionOptions::gif()
    })
    .unwrap();
    let result = converter
        .run(format!("{}/*.mp4", temp.path().display()))
        .unwrap();

    assert_eq!((result.completed, result.total), (2, 2));
    assert!(is_gif(&out.join("a.gif")));
    assert!(is_gif(&out.join("b.gif")));
}

#[test]
fn test_gif_to_video() {
    if !have("ffmpeg") {
        return;
    }
    let temp = TempDir::new().unwrap();
    let clip = make_clip(temp.path(), "clip.mp4");
    let gifs = temp.path().join("gifs");

    VideoGifConverter::new(ConversionOptions {
        output_dir: Some(gifs.clone()),
        ..ConversionOptions::gif()
    })
    .unwrap()
    .run(vec![clip])
    .unwrap();

    let result = VideoGifConverter::new(ConversionOptions::video("mp4"))
        .unwrap()
        .run(vec![gifs.join("clip.gif")])
        .unwrap();

    assert_eq!(result.completed, 1);
    let mp4 = gifs.join("clip.mp4");
    assert!(fs::metadata(&mp4).map(|m| m.len() > 0).unwrap_or(false));
}

#[test]
fn test_missing_input_does_not_stop_batch() {
    if !have("ffmpeg") {
        return;
    }
    let temp = TempDir::new().unwrap();
    let clip = make_clip(temp.path(), "real.mp4");

    let mut converter = VideoGifConverter::new(ConversionOptions::gif()).unwrap();
    let errors = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let sink = std::rc::Rc::clone(&errors);
    converter.on_error(move |e| sink.borrow_mut().push(e.stderr.clone()));

    let result = converter
        .run(vec![temp.path().join("missing.mp4"), clip])
        .unwrap();

    assert_eq!((result.completed, result.failed, result.total), (1, 1, 2));
    assert!(!errors.borrow()[0].is_empty());
    assert!(is_gif(&temp.path().join("real.gif")));
}

#[test]
fn test_gifski_pipeline_cleans_frames() {
    if !have("ffmpeg") || !have("gifski") {
        return;
    }
    let temp = TempDir::new().unwrap();
    let clip = make_clip(temp.path(), "clip.mp4");

    let mut converter = VideoGifConverter::new(ConversionOptions {
        gifski: true,
        fps: Some(5),
        quality: Some(70),
        ..ConversionOptions::gif()
    })
    .unwrap();
    let result = converter.run(vec![clip]).unwrap();

    assert_eq!(result.completed, 1);
    assert!(is_gif(&temp.path().join("clip.gif")));
    assert_eq!(png_count(temp.path()), 0);
}

#[test]
fn test_gifski_pipeline_keeps_frames() {
    if !have("ffmpeg") || !have("gifski") {
        return;
    }
    let temp = TempDir::new().unwrap();
    let clip = make_clip(temp.path(), "clip.mp4");

    let mut converter = VideoGifConverter::new(ConversionOptions {
        gifski: true,
        fps: Some(5),
        delete_frames: false,
        ..ConversionOptions::gif()
    })
    .unwrap();
    converter.run(vec![clip]).unwrap();

    assert!(is_gif(&temp.path().join("clip.gif")));
    assert!(png_count(temp.path()) > 0);
}
