//! Batch driver
//!
//! One `run` resolves the inputs, makes sure the output directory exists, then
//! converts every file in order. A file that fails is counted and reported
//! through `on_error`; the batch moves on to the next one. Only problems that
//! make the whole batch meaningless (bad glob, uncreatable output directory)
//! abort `run` with an `Err`.
//!
//! ```text
//! Resolving → Preparing → Processing(i) → Completed
//!     └───────────┴── fatal error ──→ Err
//! ```

use crate::command_builder::build_transcode_job;
use crate::events::{EventHub, FailureEvent, FailureStage};
use crate::frames::{build_gifski_invocation, FrameSet};
use crate::options::{ConversionOptions, ToolPaths};
use chrono::Utc;
use shared_utils::common_utils::display_name;
use shared_utils::{
    determine_output_path, format_tool_error, get_error_suggestion, resolve_pattern, BatchResult,
    ProgressEvent, Result, SystemRunner, ToolInvocation, ToolOutput, ToolRunner, VidGifError,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// What a batch runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inputs {
    /// Explicit paths, used as given
    Files(Vec<PathBuf>),
    /// Glob pattern such as `videos/*.mp4`
    Pattern(String),
}

impl From<&str> for Inputs {
    fn from(pattern: &str) -> Self {
        Inputs::Pattern(pattern.to_string())
    }
}

impl From<String> for Inputs {
    fn from(pattern: String) -> Self {
        Inputs::Pattern(pattern)
    }
}

impl From<Vec<PathBuf>> for Inputs {
    fn from(files: Vec<PathBuf>) -> Self {
        Inputs::Files(files)
    }
}

impl From<&[PathBuf]> for Inputs {
    fn from(files: &[PathBuf]) -> Self {
        Inputs::Files(files.to_vec())
    }
}

/// A failed tool step, before the input and stage are attached.
struct StepFailure {
    error: VidGifError,
    stdout: String,
    stderr: String,
}

impl From<VidGifError> for StepFailure {
    fn from(error: VidGifError) -> Self {
        Self {
            error,
            stdout: String::new(),
            stderr: String::new(),
        }
    }
}

/// Converts batches of videos to GIFs or GIFs to videos.
pub struct VideoGifConverter<R: ToolRunner = SystemRunner> {
    options: ConversionOptions,
    tools: ToolPaths,
    runner: R,
    events: EventHub,
}

impl VideoGifConverter {
    /// Real processes, tool locations from the environment.
    pub fn new(options: ConversionOptions) -> Result<Self> {
        Self::with_runner(options, ToolPaths::from_env(), SystemRunner)
    }
}

impl<R: ToolRunner> VideoGifConverter<R> {
    pub fn with_runner(options: ConversionOptions, tools: ToolPaths, runner: R) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            tools,
            runner,
            events: EventHub::default(),
        })
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    pub fn tools(&self) -> &ToolPaths {
        &self.tools
    }

    /// Called after every file, success or failure.
    pub fn on_progress(&mut self, listener: impl FnMut(&ProgressEvent) + 'static) -> &mut Self {
        self.events.on_progress(listener);
        self
    }

    /// Called once per failed file, before the matching progress event.
    pub fn on_error(&mut self, listener: impl FnMut(&FailureEvent) + 'static) -> &mut Self {
        self.events.on_error(listener);
        self
    }

    /// Called once with the final tally.
    pub fn on_end(&mut self, listener: impl FnMut(&BatchResult) + 'static) -> &mut Self {
        self.events.on_end(listener);
        self
    }

    /// Converts every input. `Err` only for batch-fatal problems.
    pub fn run(&mut self, inputs: impl Into<Inputs>) -> Result<BatchResult> {
        let files = match inputs.into() {
            Inputs::Pattern(pattern) => {
                let files = resolve_pattern(&pattern)?;
                debug!(pattern = %pattern, matched = files.len(), "Resolved input pattern");
                files
            }
            Inputs::Files(files) => files,
        };

        if let Some(dir) = &self.options.output_dir {
            fs::create_dir_all(dir).map_err(|source| VidGifError::OutputDir {
                path: dir.clone(),
                source,
            })?;
        }

        let mut result = BatchResult::new(files.len());
        info!(
            total = result.total,
            convert_to = %self.options.convert_to,
            frame_encoder = self.options.uses_frame_encoder(),
            "Starting batch"
        );

        for (index, input) in files.iter().enumerate() {
            let token = file_token(index);
            match self.convert_file(input, &token) {
                Ok(output) => {
                    result.success();
                    info!(input = %input.display(), output = %output.display(), "Converted");
                }
                Err(event) => {
                    result.fail();
                    error!(
                        input = %input.display(),
                        stage = %event.stage,
                        error = %event.error,
                        "Conversion failed"
                    );
                    self.events.emit_error(&event);
                }
            }
            self.events.emit_progress(&result.progress());
        }

        info!(
            completed = result.completed,
            failed = result.failed,
            total = result.total,
            "Batch finished"
        );
        self.events.emit_end(&result);
        Ok(result)
    }

    /// Runs every step for one input and returns the final artifact path.
    fn convert_file(&self, input: &Path, token: &str) -> std::result::Result<PathBuf, FailureEvent> {
        let output_dir = self.options.output_dir.as_deref();
        let target = determine_output_path(input, self.options.target_extension(), output_dir);
        debug!(input = %display_name(input), token, "Processing file");

        let fail = |stage, failure: StepFailure| FailureEvent {
            input: input.to_path_buf(),
            stage,
            error: failure.error,
            stdout: failure.stdout,
            stderr: failure.stderr,
        };

        if same_file(input, &target) {
            return Err(fail(
                FailureStage::Transcode,
                VidGifError::OutputIsInput(target).into(),
            ));
        }

        let job = build_transcode_job(input, token, &self.options, &self.tools.ffmpeg);
        self.run_step(&job.invocation)
            .map_err(|f| fail(FailureStage::Transcode, f))?;

        if !self.options.uses_frame_encoder() {
            return Ok(job.output);
        }

        let frames = FrameSet::new(input, token, output_dir);
        let encoded = self.encode_frames(&frames, &target);
        if self.options.delete_frames {
            frames.delete();
        }
        encoded
            .map(|_| target)
            .map_err(|f| fail(FailureStage::Encode, f))
    }

    fn encode_frames(&self, frames: &FrameSet, target: &Path) -> std::result::Result<(), StepFailure> {
        let files = frames.collect()?;
        if files.is_empty() {
            return Err(VidGifError::NoFrames(frames.pattern()).into());
        }

        let invocation = build_gifski_invocation(
            &self.tools.gifski,
            target,
            self.options.quality,
            self.options.loop_count,
            &files,
        );
        self.run_step(&invocation)?;
        Ok(())
    }

    fn run_step(&self, invocation: &ToolInvocation) -> std::result::Result<ToolOutput, StepFailure> {
        let tool = invocation.tool_name();
        debug!(command = %invocation.command_line(), "Running tool");

        let output = self.runner.run(invocation).map_err(|e| {
            warn!(tool = %tool, error = %e, "Could not start tool");
            StepFailure::from(VidGifError::ToolSpawn {
                tool: tool.clone(),
                message: format!("{:#}", e),
            })
        })?;

        if output.success() {
            return Ok(output);
        }

        if let Some(hint) = get_error_suggestion(&output.stderr) {
            warn!(tool = %tool, "💡 {}", hint);
        }
        Err(StepFailure {
            error: VidGifError::ToolFailed {
                tool,
                exit_code: output.exit_code,
                message: format_tool_error(&output.stderr),
            },
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// `<unix millis>-<index>`, unique per file within and across batches.
fn file_token(index: usize) -> String {
    format!("{}-{}", Utc::now().timestamp_millis(), index)
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
