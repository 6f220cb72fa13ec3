//! Built-in shell commands
//!
//! This module provides the [`Builtin`] trait and the [`Context`] struct
//! builtins execute against. The builtins here are the ones that
//! reconfigure the shell from inside an expansion context: `set`, `export`,
//! `readonly`, `unset`, `:`, `.` and `jobs`. Dispatch by name is the
//! executor's job; it hands each builtin its arguments (without the command
//! name) and mutable access to the shell state.

mod export;
mod flow;
mod jobs;
mod set;
mod source;
mod unset;

pub use export::{Export, Readonly};
pub use flow::Colon;
pub use jobs::Jobs;
pub use set::Set;
pub use source::Source;
pub use unset::Unset;

use async_trait::async_trait;

use crate::error::Result;
use crate::host::Host;
use crate::state::{Frame, ShellOptions};
use crate::vars::VarStore;

/// Output of one builtin invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecResult {
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
    /// Exit code
    pub exit_code: i32,
}

impl ExecResult {
    /// Create a successful result with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: 0,
        }
    }

    /// Create a failed result with the given stderr.
    pub fn err(stderr: impl Into<String>, exit_code: i32) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code,
        }
    }

    /// Check if the result indicates success.
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs script text in the current shell on behalf of the `.` builtin.
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    async fn run(&self, source: &str) -> Result<ExecResult>;
}

/// Function definitions, for `unset -f`.
pub trait FunctionStore: Send + Sync {
    /// Remove a function definition; false when it was not defined.
    fn remove(&mut self, name: &str) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Running,
    Stopped,
    Done,
}

impl JobState {
    pub fn label(&self) -> &'static str {
        match self {
            JobState::Running => "Running",
            JobState::Stopped => "Stopped",
            JobState::Done => "Done",
        }
    }
}

/// One entry in the job table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: usize,
    pub pid: u32,
    pub state: JobState,
    pub command: String,
}

/// The executor's job table, for the `jobs` builtin.
pub trait JobStore: Send + Sync {
    fn jobs(&self) -> Vec<Job>;
}

/// Execution context for builtin commands.
pub struct Context<'a> {
    /// Command arguments (not including the command name).
    pub args: &'a [String],
    /// Injected OS capabilities.
    pub host: &'a dyn Host,
    /// Shell variables (mutable).
    pub vars: &'a mut VarStore,
    /// The `set` option flags (mutable).
    pub opts: &'a mut ShellOptions,
    /// Positional parameters and process-level state (mutable).
    pub frame: &'a mut Frame,
    /// Function definitions; absent when the executor has none.
    pub functions: Option<&'a mut dyn FunctionStore>,
    /// Job table; absent when the executor has none.
    pub jobs: Option<&'a dyn JobStore>,
    /// Script runner for the `.` builtin.
    pub runner: Option<&'a dyn ScriptRunner>,
}

/// A built-in command.
#[async_trait]
pub trait Builtin: Send + Sync {
    async fn execute(&self, ctx: Context<'_>) -> Result<ExecResult>;
}

/// Quote a value so it survives re-input to the shell.
pub fn shell_quote(value: &str) -> String {
    let safe = |b: u8| {
        b.is_ascii_alphanumeric()
            || matches!(b, b'_' | b'-' | b'.' | b'/' | b':' | b'=' | b'@' | b'%' | b'+' | b',')
    };
    if !value.is_empty() && value.bytes().all(safe) {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}

/// Prepend the command name so the option parser sees a full argv.
pub(crate) fn parser_args(name: &str, args: &[String]) -> Vec<String> {
    std::iter::once(name.to_string())
        .chain(args.iter().cloned())
        .collect()
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::host::OsHost;

    /// Bundle of owned shell state for builtin tests.
    pub struct Shell {
        pub host: OsHost,
        pub vars: VarStore,
        pub opts: ShellOptions,
        pub frame: Frame,
    }

    impl Shell {
        pub fn new() -> Self {
            Self {
                host: OsHost::new(),
                vars: VarStore::new(),
                opts: ShellOptions::new(),
                frame: Frame::new(),
            }
        }

        pub async fn run(&mut self, builtin: &dyn Builtin, args: &[&str]) -> ExecResult {
            let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
            let ctx = Context {
                args: &args,
                host: &self.host,
                vars: &mut self.vars,
                opts: &mut self.opts,
                frame: &mut self.frame,
                functions: None,
                jobs: None,
                runner: None,
            };
            builtin.execute(ctx).await.expect("builtin failed")
        }
    }
}
