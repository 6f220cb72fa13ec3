//! set builtin - shell options and positional parameters

use async_trait::async_trait;

use super::{parser_args, shell_quote, Builtin, Context, ExecResult};
use crate::error::Result;
use crate::opts::{Opt, OptError, OptParser, OptSpec};

/// The set builtin.
///
/// With no arguments prints every variable as `name=quoted_value`, sorted
/// by name. `-x`/`+x` toggle short options, `-o NAME`/`+o NAME` toggle long
/// names, bare `-o`/`+o` print the current settings, and `--` replaces the
/// positional parameters with the remaining operands.
pub struct Set;

#[async_trait]
impl Builtin for Set {
    async fn execute(&self, ctx: Context<'_>) -> Result<ExecResult> {
        if ctx.args.is_empty() {
            let mut out = String::new();
            for name in ctx.vars.sorted_names() {
                if let Some(var) = ctx.vars.get(name) {
                    out.push_str(&format!("{name}={}\n", shell_quote(var.value())));
                }
            }
            return Ok(ExecResult::ok(out));
        }

        // "--" with or without operands replaces the positionals; without
        // it, bare flag changes leave them alone.
        let had_terminator = ctx.args.iter().any(|a| a == "--");
        let spec = OptSpec {
            // leading + keeps operand order: everything after the first
            // non-option is a positional parameter
            shorts: "+abCefhmnuvxo:".into(),
            longs: Vec::new(),
            posix_dash: true,
            posixly_correct: false,
        };
        let mut parser = OptParser::new(spec, parser_args("set", ctx.args));
        let mut stdout = String::new();
        loop {
            match parser.next() {
                Ok(Some(Opt::Short('o'))) => {
                    let name = parser.opt_arg().unwrap_or_default().to_string();
                    if !ctx.opts.set_long(&name, !parser.plus()) {
                        return Ok(ExecResult::err(
                            format!("set: {name}: unknown option name\n"),
                            2,
                        ));
                    }
                }
                Ok(Some(Opt::Short(letter))) => {
                    ctx.opts.set_short(letter, !parser.plus());
                }
                Ok(Some(Opt::Long(_))) => {}
                Ok(None) => break,
                Err(OptError::MissingArg(which)) if which.ends_with('o') => {
                    // bare -o / +o: print the option table
                    stdout.push_str(&if which.starts_with('+') {
                        ctx.opts.print_reinput()
                    } else {
                        ctx.opts.print_human()
                    });
                    break;
                }
                Err(e) => return Ok(ExecResult::err(format!("set: {e}\n"), 2)),
            }
        }

        let operands = parser.operands().to_vec();
        if had_terminator || !operands.is_empty() {
            ctx.frame.set_positional(operands);
        }
        Ok(ExecResult::ok(stdout))
    }
}
