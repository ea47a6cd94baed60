// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Logging setup shared by the Sphere crates
//!
//! Usage:
//! - Set SPHERE_LOG=off (default) - no logs
//! - Set SPHERE_LOG=warn - fallbacks and inconsistencies only
//! - Set SPHERE_LOG=info - basic operation logs
//! - Set SPHERE_LOG=debug - every filesystem mutation

use std::sync::Once;

// Re-export emit so the macros resolve in dependent crates
pub use emit;

/// Environment variable selecting the log level
pub const LOG_ENV: &str = "SPHERE_LOG";

static INIT: Once = Once::new();

/// Maps a `SPHERE_LOG` value to a minimum level.
///
/// `Ok(None)` means logging is switched off. Unknown values are returned as
/// the error so the caller can decide how loudly to complain.
pub fn parse_level(value: &str) -> Result<Option<emit::Level>, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "off" => Ok(None),
        "error" => Ok(Some(emit::Level::Error)),
        "warn" => Ok(Some(emit::Level::Warn)),
        "info" => Ok(Some(emit::Level::Info)),
        "debug" => Ok(Some(emit::Level::Debug)),
        other => Err(other.to_string()),
    }
}

/// Initialize diagnostics from the SPHERE_LOG environment variable
///
/// Safe to call more than once; only the first call has an effect.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let value = std::env::var(LOG_ENV).unwrap_or_default();

        let (level, unknown) = match parse_level(&value) {
            Ok(None) => return,
            Ok(Some(level)) => (level, None),
            Err(other) => (emit::Level::Info, Some(other)),
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(level))
            .init();

        if let Some(other) = unknown {
            emit::warn!("Unknown {var} value {value}, using info", var: LOG_ENV, value: other.as_str());
        }

        // The runtime stays installed for the life of the process
        std::mem::forget(rt);
    });
}

/// Log basic operations (state loaded, state saved, shell started)
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Log detailed diagnostics (each mutation, each handle operation)
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Log recoverable conditions (missing state file, orphan blocks)
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Log failures that are surfaced to the caller (save errors)
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

/// Re-export the init function for convenience
pub use init_diagnostics as init;
