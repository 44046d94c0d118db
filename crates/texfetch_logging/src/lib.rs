#![deny(missing_docs)]
//! Shared logging utilities for the texfetch workspace.
//!
//! This crate provides the `tf_*` logging macros used by the engine and the
//! binary, the level mapping for the `--verbose` flag, and a minimal test
//! initializer for the global logger.

#[doc(hidden)]
pub use log;

use log::LevelFilter;

/// Returns the log level used for a run.
///
/// Verbose runs print every pipeline decision, which is logged at debug level.
pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! tf_trace {
    ($($arg:tt)*) => {{
        $crate::log::trace!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! tf_debug {
    ($($arg:tt)*) => {{
        $crate::log::debug!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! tf_info {
    ($($arg:tt)*) => {{
        $crate::log::info!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! tf_warn {
    ($($arg:tt)*) => {{
        $crate::log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! tf_error {
    ($($arg:tt)*) => {{
        $crate::log::error!($($arg)*);
    }};
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Debug builds show every decision the pipeline takes.
    let level = level_for(cfg!(debug_assertions));

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
    fn verbose_raises_level_to_debug() {
        assert_eq!(level_for(true), LevelFilter::Debug);
        assert_eq!(level_for(false), LevelFilter::Info);
    }

    #[test]
    fn macros_accept_format_arguments() {
        initialize_for_tests();
        let tag = "2101.00001";
        tf_trace!("trace {}", tag);
        tf_debug!("debug {tag}");
        tf_info!("info {}", 1);
        tf_warn!("warn");
        tf_error!("error {:?}", Some(tag));
    }
}
