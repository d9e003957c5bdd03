//! External tool process management (ffmpeg, gifski)
//!
//! ## Pipe deadlocks
//!
//! Piping both stdout and stderr and then blocking on `wait()` deadlocks as
//! soon as the child fills one of the ~64KB pipe buffers: the child blocks on
//! the write, we block on the exit. ffmpeg alone prints enough banner and
//! progress text to stderr to hit this on long clips.
//!
//! `ToolProcess` drains both streams on dedicated threads so the child can
//! always make progress, then joins them after the exit status is known.
//!
//! ## Usage
//!
//! ```ignore
//! use shared_utils::tool_process::{SystemRunner, ToolInvocation, ToolRunner};
//!
//! let invocation = ToolInvocation::new("ffmpeg").arg("-i").arg("in.mp4").arg("out.gif");
//! let output = SystemRunner.run(&invocation)?;
//! if !output.success() {
//!     eprintln!("{}", shared_utils::tool_process::format_tool_error(&output.stderr));
//! }
//! ```

use anyhow::{Context, Result};
use std::ffi::{OsStr, OsString};
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// A fully described external command: program plus ordered arguments.
///
/// Building an invocation never touches the system, so command construction
/// can be inspected and tested without the tool installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl ToolInvocation {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn push(&mut self, arg: impl AsRef<OsStr>) {
        self.args.push(arg.as_ref().to_os_string());
    }

    pub fn push_pair(&mut self, flag: &str, value: impl AsRef<OsStr>) {
        self.push(flag);
        self.push(value);
    }

    /// Program name as displayed in logs and error messages.
    pub fn tool_name(&self) -> String {
        std::path::Path::new(&self.program)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect()
    }

    pub fn command_line(&self) -> String {
        let args = self.args_lossy();
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        crate::common_utils::format_command_string(&self.program.to_string_lossy(), &refs)
    }

    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

/// Captured result of one finished tool run.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Seam between the batch logic and the operating system.
///
/// `Err` means the process could not be run at all (missing binary,
/// permission denied). A process that ran and exited non-zero is `Ok` with a
/// failing `ToolOutput`.
pub trait ToolRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput>;
}

/// Runs invocations as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput> {
        let start = Instant::now();
        let process = ToolProcess::spawn(&mut invocation.to_command())
            .with_context(|| format!("Failed to start {}", invocation.tool_name()))?;
        let (status, stdout, stderr) = process.wait_with_output()?;
        let duration = start.elapsed();

        let args = invocation.args_lossy();
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        crate::logging::log_external_tool(
            &invocation.tool_name(),
            &arg_refs,
            &stderr,
            status.code(),
            duration,
        );

        Ok(ToolOutput {
            exit_code: status.code(),
            stdout,
            stderr,
            duration,
        })
    }
}

/// Child process wrapper that drains stdout and stderr concurrently.
pub struct ToolProcess {
    child: Child,
    stdout_thread: Option<JoinHandle<String>>,
    stderr_thread: Option<JoinHandle<String>>,
}

impl ToolProcess {
    /// Spawns the command with both output streams piped and drained.
    pub fn spawn(cmd: &mut Command) -> Result<Self> {
        let command_str = format!("{:?}", cmd);
        info!(command = %command_str, "Executing external tool");

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().context("Failed to spawn process")?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow::anyhow!("Failed to capture stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow::anyhow!("Failed to capture stderr"))?;

        Ok(Self {
            child,
            stdout_thread: Some(drain(stdout)),
            stderr_thread: Some(drain(stderr)),
        })
    }

    /// Waits for exit and returns `(status, stdout, stderr)`.
    pub fn wait_with_output(mut self) -> Result<(ExitStatus, String, String)> {
        let status = self.child.wait().context("Failed to wait for process")?;
        let stdout = join_drain(self.stdout_thread.take());
        let stderr = join_drain(self.stderr_thread.take());

        debug!(
            exit_code = status.code(),
            stdout_length = stdout.len(),
            stderr_length = stderr.len(),
            "External tool output captured"
        );

        Ok((status, stdout, stderr))
    }
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = reader.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn join_drain(handle: Option<JoinHandle<String>>) -> String {
    handle
        .map(|t| t.join().unwrap_or_default())
        .unwrap_or_default()
}

/// Picks the most meaningful line out of a tool's stderr.
///
/// 1. the last line mentioning "error" (any case)
/// 2. otherwise the last non-empty line that is not an ffmpeg progress line
/// 3. otherwise "Unknown error"
pub fn format_tool_error(stderr: &str) -> String {
    if let Some(error_line) = stderr
        .lines()
        .rev()
        .find(|line| line.to_lowercase().contains("error"))
    {
        return error_line.trim().to_string();
    }

    stderr
        .lines()
        .rev()
        .find(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty()
                && !trimmed.starts_with("frame=")
                && !trimmed.starts_with("fps=")
                && !trimmed.starts_with("size=")
        })
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "Unknown error".to_string())
}

/// Maps well-known failure messages to an actionable hint.
pub fn get_error_suggestion(stderr: &str) -> Option<String> {
    let patterns = [
        ("No such file or directory", "Check that the input path exists"),
        ("Invalid data found", "The input file may be corrupted or not a video"),
        ("Unknown encoder", "Install an ffmpeg build with the requested codec"),
        ("Unrecognized option", "The installed tool version does not support this flag"),
        ("Permission denied", "Check read/write permissions on input and output"),
        ("Requested output format", "Check the --format value"),
        ("Invalid frame size", "Check the --size value"),
        ("Output file is empty", "The clip produced no frames; check --start-time and --duration"),
    ];

    patterns
        .iter()
        .find(|(pattern, _)| stderr.contains(pattern))
        .map(|(_, suggestion)| suggestion.to_string())
}
