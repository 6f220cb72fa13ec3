//! export and readonly builtins - variable attribute flags

use async_trait::async_trait;

use super::{shell_quote, Builtin, Context, ExecResult};
use crate::error::Result;
use crate::vars::VarError;

/// Shared engine: `export` marks exported, `readonly` marks read-only; both
/// print their flagged variables in re-input form when called bare.
async fn set_attribute(ctx: Context<'_>, read_only: bool, cmd: &str) -> Result<ExecResult> {
    let plain: Vec<&String> = ctx.args.iter().filter(|a| a.as_str() != "--").collect();
    if plain.is_empty() {
        let mut out = String::new();
        for name in ctx.vars.sorted_names() {
            let Some(var) = ctx.vars.get(name) else {
                continue;
            };
            let flagged = if read_only {
                var.read_only()
            } else {
                var.exported()
            };
            if flagged {
                out.push_str(&format!("{cmd} {name}={}\n", shell_quote(var.value())));
            }
        }
        return Ok(ExecResult::ok(out));
    }

    for arg in plain {
        let (name, value) = match arg.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (arg.as_str(), None),
        };
        let result = if read_only {
            ctx.vars.add(name, value, false, true)
        } else {
            ctx.vars.add(name, value, true, false)
        };
        match result {
            Ok(()) => {}
            Err(e @ VarError::ReadOnly(_)) => {
                return Ok(ExecResult::err(format!("{cmd}: {e}\n"), 1));
            }
            Err(e) => {
                return Ok(ExecResult::err(
                    format!("{cmd}: `{arg}': {e}\n"),
                    2,
                ));
            }
        }
    }
    Ok(ExecResult::ok(String::new()))
}

/// export builtin - mark variables for export to child processes.
pub struct Export;

#[async_trait]
impl Builtin for Export {
    async fn execute(&self, ctx: Context<'_>) -> Result<ExecResult> {
        set_attribute(ctx, false, "export").await
    }
}

/// readonly builtin - forbid further writes to a variable.
pub struct Readonly;

#[async_trait]
impl Builtin for Readonly {
    async fn execute(&self, ctx: Context<'_>) -> Result<ExecResult> {
        set_attribute(ctx, true, "readonly").await
    }
}
