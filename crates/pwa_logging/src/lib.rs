#![deny(missing_docs)]
//! Shared logging utilities for the PWA workspace.
//!
//! This crate provides the `pwa_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Every line is tagged
//! with the agent context of the emitting thread (`page`, `worker`, ...).

use std::cell::Cell;

#[doc(hidden)]
pub use log;

thread_local! {
    /// Thread-local name of the agent context the current thread runs.
    static CONTEXT: Cell<&'static str> = const { Cell::new("-") };
}

/// Names the agent context for the current thread.
/// Worker host threads call this once at startup.
pub fn set_context(name: &'static str) {
    CONTEXT.with(|v| v.set(name));
}

/// Retrieves the agent context name for the current thread.
/// Returns `-` if the context has not been set.
pub fn current_context() -> &'static str {
    CONTEXT.with(|v| v.get())
}

/// Logs a trace-level message tagged with the agent context.
#[macro_export]
macro_rules! pwa_trace {
    ($($arg:tt)*) => {{
        $crate::log::trace!("[{}] {}", $crate::current_context(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message tagged with the agent context.
#[macro_export]
macro_rules! pwa_info {
    ($($arg:tt)*) => {{
        $crate::log::info!("[{}] {}", $crate::current_context(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message tagged with the agent context.
#[macro_export]
macro_rules! pwa_debug {
    ($($arg:tt)*) => {{
        $crate::log::debug!("[{}] {}", $crate::current_context(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message tagged with the agent context.
#[macro_export]
macro_rules! pwa_warn {
    ($($arg:tt)*) => {{
        $crate::log::warn!("[{}] {}", $crate::current_context(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message tagged with the agent context.
#[macro_export]
macro_rules! pwa_error {
    ($($arg:tt)*) => {{
        $crate::log::error!("[{}] {}", $crate::current_context(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_is_per_thread() {
        set_context("page");
        assert_eq!(current_context(), "page");

        let other = std::thread::spawn(current_context).join().unwrap();
        assert_eq!(other, "-");
    }
}
