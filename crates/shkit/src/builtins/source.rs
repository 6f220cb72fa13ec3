//! The `.` builtin - run a file in the current shell

use async_trait::async_trait;

use super::{Builtin, Context, ExecResult};
use crate::error::Result;

/// The `.` (dot) builtin. Reads the named file through the host and hands
/// its text to the injected [`ScriptRunner`](super::ScriptRunner); the exit
/// code is that of the last command the runner executed.
pub struct Source;

#[async_trait]
impl Builtin for Source {
    async fn execute(&self, ctx: Context<'_>) -> Result<ExecResult> {
        let Some(path) = ctx.args.iter().find(|a| a.as_str() != "--") else {
            return Ok(ExecResult::err(".: filename argument required\n", 2));
        };
        let Some(runner) = ctx.runner else {
            return Ok(ExecResult::err(".: script execution unavailable\n", 1));
        };
        let text = match ctx.host.read_file(path).await {
            Ok(text) => text,
            Err(e) => {
                return Ok(ExecResult::err(format!(".: {path}: {e}\n"), 1));
            }
        };
        runner.run(&text).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::Shell;
    use super::super::ScriptRunner;
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// Runner double that records the script text it was handed.
    struct Recorder {
        seen: Mutex<Vec<String>>,
        exit_code: i32,
    }

    #[async_trait]
    impl ScriptRunner for Recorder {
        async fn run(&self, source: &str) -> Result<ExecResult> {
            self.seen.lock().unwrap().push(source.to_string());
            Ok(ExecResult {
                stdout: String::new(),
                stderr: String::new(),
                exit_code: self.exit_code,
            })
        }
    }

    #[tokio::test]
    async fn missing_filename_is_usage_error() {
        let mut sh = Shell::new();
        let res = sh.run(&Source, &[]).await;
        assert_eq!(res.exit_code, 2);
    }

    #[tokio::test]
    async fn runs_file_contents_and_propagates_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.sh");
        std::fs::write(&path, "x=1\nfalse\n").unwrap();

        let mut sh = Shell::new();
        let runner = Recorder {
            seen: Mutex::new(Vec::new()),
            exit_code: 1,
        };
        let args = vec![path.to_str().unwrap().to_string()];
        let ctx = Context {
            args: &args,
            host: &sh.host,
            vars: &mut sh.vars,
            opts: &mut sh.opts,
            frame: &mut sh.frame,
            functions: None,
            jobs: None,
            runner: Some(&runner),
        };
        let res = Source.execute(ctx).await.unwrap();
        assert_eq!(res.exit_code, 1);
        assert_eq!(*runner.seen.lock().unwrap(), vec!["x=1\nfalse\n"]);
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let mut sh = Shell::new();
        let runner = Recorder {
            seen: Mutex::new(Vec::new()),
            exit_code: 0,
        };
        let args = vec!["/no/such/file".to_string()];
        let ctx = Context {
            args: &args,
            host: &sh.host,
            vars: &mut sh.vars,
            opts: &mut sh.opts,
            frame: &mut sh.frame,
            functions: None,
            jobs: None,
            runner: Some(&runner),
        };
        let res = Source.execute(ctx).await.unwrap();
        assert_eq!(res.exit_code, 1);
        assert!(res.stderr.contains("/no/such/file"));
        assert!(runner.seen.lock().unwrap().is_empty());
    }
}
