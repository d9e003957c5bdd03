//! Loud error reporting for the CLI edge
//!
//! - `report_error()`: prints an error and its cause chain to stderr and the log
//! - `install_panic_handler()`: logs panics before the default hook runs

use std::panic;

pub fn report_error<E: std::error::Error + ?Sized>(error: &E) {
    eprintln!("🔥 ERROR: {}", error);
    tracing::error!("Error occurred: {}", error);

    let mut source = error.source();
    let mut level = 1;
    while let Some(err) = source {
        eprintln!("   {}. Caused by: {}", level, err);
        tracing::error!("  Caused by (level {}): {}", level, err);
        source = err.source();
        level += 1;
    }
}

pub fn install_panic_handler() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        let payload = panic_info.payload();
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic payload".to_string()
        };

        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_else(|| "Unknown location".to_string());

        eprintln!("💥 PANIC occurred!");
        eprintln!("   Message: {}", message);
        eprintln!("   Location: {}", location);
        eprintln!("   This is a bug! Please report it.");

        tracing::error!("PANIC: {} at {}", message, location);

        default_hook(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::VidGifError;
    use std::io;

    #[test]
    fn test_report_error_with_source_chain() {
        let error = VidGifError::OutputDir {
            path: "/nope".into(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        report_error(&error);
    }

    #[test]
    fn test_report_anyhow_chain() {
        let err = anyhow::anyhow!("inner").context("outer");
        report_error(AsRef::<dyn std::error::Error>::as_ref(&err));
    }
}
