//! unset builtin - remove variables or functions

use async_trait::async_trait;

use super::{parser_args, Builtin, Context, ExecResult};
use crate::error::Result;
use crate::opts::{Opt, OptParser, OptSpec};
use crate::vars::VarError;

/// The unset builtin. `-v` (the default) removes shell variables, `-f`
/// removes function definitions. Removing an unknown name exits 1 with a
/// diagnostic, which is stricter than POSIX requires.
pub struct Unset;

#[async_trait]
impl Builtin for Unset {
    async fn execute(&self, mut ctx: Context<'_>) -> Result<ExecResult> {
        let mut parser = OptParser::new(OptSpec::shorts("+fv"), parser_args("unset", ctx.args));
        let mut functions = false;
        loop {
            match parser.next() {
                Ok(Some(Opt::Short('f'))) => functions = true,
                Ok(Some(Opt::Short('v'))) => functions = false,
                Ok(Some(_)) => {}
                Ok(None) => break,
                Err(e) => return Ok(ExecResult::err(format!("unset: {e}\n"), 2)),
            }
        }

        let names = parser.operands().to_vec();
        let mut stderr = String::new();
        let mut exit_code = 0;
        for name in names {
            if functions {
                let removed = ctx
                    .functions
                    .as_mut()
                    .map(|store| store.remove(&name))
                    .unwrap_or(false);
                if !removed {
                    stderr.push_str(&format!("unset: {name}: not found\n"));
                    exit_code = 1;
                }
            } else {
                match ctx.vars.remove(&name) {
                    Ok(()) => {}
                    Err(e @ VarError::ReadOnly(_)) => {
                        stderr.push_str(&format!("unset: {e}\n"));
                        exit_code = 1;
                    }
                    Err(_) => {
                        stderr.push_str(&format!("unset: {name}: not found\n"));
                        exit_code = 1;
                    }
                }
            }
        }
        Ok(ExecResult {
            stdout: String::new(),
            stderr,
            exit_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::Shell;
    use super::super::FunctionStore;
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn removes_variables() {
        let mut sh = Shell::new();
        sh.vars.add("x", Some("1"), false, false).unwrap();
        sh.vars.add("y", Some("2"), false, false).unwrap();
        let res = sh.run(&Unset, &["x", "y"]).await;
        assert!(res.is_success());
        assert_eq!(sh.vars.value("x"), None);
        assert_eq!(sh.vars.value("y"), None);
    }

    #[tokio::test]
    async fn unknown_name_is_nonzero() {
        let mut sh = Shell::new();
        let res = sh.run(&Unset, &["nope"]).await;
        // stricter than POSIX: depend only on it being non-zero
        assert_ne!(res.exit_code, 0);
        assert!(res.stderr.contains("nope"));
    }

    #[tokio::test]
    async fn readonly_variable_survives() {
        let mut sh = Shell::new();
        sh.vars.add("r", Some("1"), false, true).unwrap();
        let res = sh.run(&Unset, &["r"]).await;
        assert_eq!(res.exit_code, 1);
        assert_eq!(sh.vars.value("r"), Some("1"));
    }

    #[tokio::test]
    async fn dash_f_uses_the_function_store() {
        struct OneFn(bool);
        impl FunctionStore for OneFn {
            fn remove(&mut self, name: &str) -> bool {
                let hit = self.0 && name == "greet";
                if hit {
                    self.0 = false;
                }
                hit
            }
        }

        let mut sh = Shell::new();
        sh.vars.add("greet", Some("var"), false, false).unwrap();
        let mut fns = OneFn(true);
        let args = vec!["-f".to_string(), "greet".to_string()];
        let ctx = Context {
            args: &args,
            host: &sh.host,
            vars: &mut sh.vars,
            opts: &mut sh.opts,
            frame: &mut sh.frame,
            functions: Some(&mut fns),
            jobs: None,
            runner: None,
        };
        let res = Unset.execute(ctx).await.unwrap();
        assert!(res.is_success());
        // the variable of the same name is untouched
        assert_eq!(sh.vars.value("greet"), Some("var"));
    }
}
