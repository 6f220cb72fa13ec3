//! Logging support
//!
//! Forwards debug-level events to the `tracing` crate when the `logging`
//! feature is enabled and compiles to nothing otherwise, so the hot
//! expansion path carries no logging cost by default.

#[cfg(feature = "logging")]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "logging"))]
macro_rules! debug_log {
    ($($arg:tt)*) => {{}};
}

pub(crate) use debug_log;
