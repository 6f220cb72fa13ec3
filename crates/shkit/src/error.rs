//! Error types for Shkit
//!
//! Every fallible operation in the core returns a tagged result; there is no
//! out-of-band control flow for expected failures. The variants map onto the
//! exit-code convention used by the builtins: usage errors exit 2, everything
//! else exits 1.

use crate::arith::ArithError;
use crate::vars::VarError;
use thiserror::Error;

/// Result type alias using Shkit's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Shkit error types.
///
/// Diagnostics are plain messages; the caller (a builtin or the surrounding
/// shell) prefixes them with its own name before printing to stderr.
#[derive(Error, Debug)]
pub enum Error {
    /// A variable name or value failed validation, or a write hit a
    /// read-only variable.
    #[error("{0}")]
    Var(#[from] VarError),

    /// Arithmetic evaluation failed (syntax, overflow, division by zero,
    /// bad shift, read-only assignment target).
    #[error("arithmetic: {0}")]
    Arith(#[from] ArithError),

    /// Word expansion aborted: unknown tilde user, fatal `${name:?word}`,
    /// unset parameter under `nounset`, or a multi-field result where a
    /// single field was required.
    #[error("{0}")]
    Expansion(String),

    /// I/O failure from a host capability (command substitution launch,
    /// directory read).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A builtin was invoked with bad flags or operands.
    #[error("{0}")]
    Usage(String),
}

impl Error {
    /// Exit code a builtin should report for this error: 2 for usage
    /// errors, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Usage(_) => 2,
            _ => 1,
        }
    }
}
