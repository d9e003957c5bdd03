//! Shared Utilities for the vid-gif converter
//!
//! - External tool processes (deadlock-free output capture, `ToolRunner` seam)
//! - Batch accounting and glob input resolution
//! - Output path derivation
//! - Logging, progress bar and summary reporting
//! - Error types

pub mod batch;
pub mod common_utils;
pub mod error_handler;
pub mod errors;
pub mod logging;
pub mod output_path;
pub mod progress;
pub mod report;
pub mod tool_process;

pub use batch::{resolve_pattern, BatchResult, ProgressEvent};
pub use error_handler::{install_panic_handler, report_error};
pub use errors::{Result, VidGifError};
pub use output_path::{determine_output_path, output_base};
pub use progress::{create_progress_bar, format_duration};
pub use report::{print_simple_summary, print_summary_report};
pub use tool_process::{
    format_tool_error, get_error_suggestion, SystemRunner, ToolInvocation, ToolOutput,
    ToolProcess, ToolRunner,
};
