//! Logging utilities with colored output.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `debug!` macro for output only shown with `--verbose`
//!
//! Log lines go to stderr so that transformed HTML printed to stdout stays
//! clean.
//!
//! # Example
//!
//! ```ignore
//! log!("sri"; "annotated {} elements", count);
//! log!("warning"; "unable to resolve `{}`", path);
//! debug!("sri"; "{} -> {}", path, integrity);
//! ```

use owo_colors::{OwoColorize, Stream, Style};
use std::{
    io::{Write, stderr},
    sync::atomic::{AtomicBool, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[inline]
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module, &module.to_ascii_lowercase());

    let mut stderr = stderr().lock();
    writeln!(stderr, "{prefix} {message}").ok();
    stderr.flush().ok();
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> String {
    let style = match module_lower {
        "sri" => Style::new().bright_blue().bold(),
        "hash" => Style::new().bright_green().bold(),
        "error" => Style::new().bright_red().bold(),
        _ => Style::new().bright_yellow().bold(),
    };

    format!("[{module}]")
        .if_supports_color(Stream::Stderr, |p| p.style(style))
        .to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// The color override is process-global.
    static OVERRIDE: Mutex<()> = Mutex::new(());

    #[test]
    fn test_prefix_keeps_module_name() {
        let _guard = OVERRIDE.lock().unwrap();
        owo_colors::set_override(false);
        assert_eq!(colorize_prefix("SRI", "sri"), "[SRI]");
        assert_eq!(colorize_prefix("warning", "warning"), "[warning]");
        owo_colors::unset_override();
    }

    #[test]
    fn test_prefix_is_styled_when_forced() {
        let _guard = OVERRIDE.lock().unwrap();
        owo_colors::set_override(true);
        let prefix = colorize_prefix("error", "error");
        owo_colors::unset_override();

        assert!(prefix.contains("[error]"));
        assert!(prefix.starts_with('\x1b'));
    }

    #[test]
    fn test_verbose_toggle() {
        let before = is_verbose();
        set_verbose(true);
        assert!(is_verbose());
        set_verbose(before);
    }
}
