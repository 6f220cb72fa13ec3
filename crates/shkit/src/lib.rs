//! ShKit - POSIX word expansion and arithmetic core
//!
//! The pieces of a POSIX shell that sit between the parser and the
//! executor: the variable store, the seven-step word-expansion pipeline,
//! the arithmetic evaluator, the glob / pattern matcher, and the
//! option-parsing subsystem used by the builtins that reconfigure the
//! shell from within (`set`, `export`, `readonly`, `unset`, `:`, `.`,
//! `jobs`).
//!
//! Everything that touches the operating system is injected through the
//! [`Host`] trait, so the whole pipeline is unit-testable with a mock
//! filesystem and a mock subprocess.
//!
//! # Example
//!
//! ```rust
//! use shkit::{arith, VarStore};
//!
//! fn main() -> shkit::Result<()> {
//!     let mut vars = VarStore::new();
//!     assert_eq!(arith::evaluate("2 + 3 * 4", &mut vars)?, 14);
//!     assert_eq!(arith::evaluate("n = 6, n += 1", &mut vars)?, 7);
//!     assert_eq!(vars.value("n"), Some("7"));
//!     Ok(())
//! }
//! ```

pub mod arith;
pub mod builtins;
mod error;
pub mod expand;
mod glob;
mod host;
mod logging;
pub mod opts;
pub mod pattern;
mod state;
pub mod vars;

pub use arith::ArithError;
pub use builtins::{Builtin, Context as BuiltinContext, ExecResult};
pub use error::{Error, Result};
pub use expand::{Expander, WordToken};
pub use glob::expand_pathnames;
pub use host::{Capture, DirEntry, Host, OsHost};
pub use pattern::MatchFlags;
pub use state::{Frame, ShellOptions};
pub use vars::{VarError, VarStore};

pub use async_trait::async_trait;
