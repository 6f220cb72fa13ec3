//! Word expansion pipeline
//!
//! [`Expander`] drives the seven POSIX expansion steps over a
//! [`WordToken`]: tilde, parameter, command substitution and arithmetic are
//! interleaved while walking the parts; field splitting, pathname expansion
//! and quote removal act on the intermediate segments. Segments keep quoting
//! provenance so quoted bytes are exempt from splitting and globbing.
//!
//! The expander borrows its collaborators for one expansion: the variable
//! store (mutably, for `:=` and arithmetic assignment), the shell options,
//! the positional frame, and the injected [`Host`].

pub mod scan;
pub mod token;

pub use token::{ModOp, Modifier, PartKind, WordPart, WordToken};

use futures_util::future::BoxFuture;

use crate::arith;
use crate::error::{Error, Result};
use crate::glob;
use crate::host::Host;
use crate::logging::debug_log;
use crate::pattern;
use crate::state::{Frame, ShellOptions};
use crate::vars::{self, VarStore};

const DEFAULT_IFS: &str = " \t\n";

/// Intermediate expansion output: text with quoting provenance, plus hard
/// field breaks produced by `"$@"`.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Seg {
    Text { text: String, quoted: bool },
    Break,
}

/// One field after splitting. `pattern` is the same bytes with
/// quoted-provenance metacharacters backslash-escaped, ready for the glob
/// step.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Field {
    text: String,
    pattern: String,
}

pub struct Expander<'a> {
    host: &'a dyn Host,
    vars: &'a mut VarStore,
    opts: &'a ShellOptions,
    frame: &'a Frame,
}

impl<'a> Expander<'a> {
    pub fn new(
        host: &'a dyn Host,
        vars: &'a mut VarStore,
        opts: &'a ShellOptions,
        frame: &'a Frame,
    ) -> Self {
        Self {
            host,
            vars,
            opts,
            frame,
        }
    }

    /// Full pipeline: a word becomes zero or more fields.
    pub async fn expand_word(&mut self, token: &WordToken) -> Result<Vec<String>> {
        let segs = self.walk_token(token).await?;
        let ifs = self.ifs();
        let fields = split_fields(&segs, &ifs, token.split);
        if !token.glob || self.opts.noglob {
            return Ok(fields.into_iter().map(|f| f.text).collect());
        }
        let mut out = Vec::new();
        for field in fields {
            if !pattern::has_glob_chars(&field.pattern) {
                out.push(field.text);
                continue;
            }
            let matches = glob::expand_pathnames(self.host, &field.pattern).await?;
            if matches.is_empty() {
                // no match keeps the field verbatim
                out.push(field.text);
            } else {
                out.extend(matches);
            }
        }
        Ok(out)
    }

    /// Pipeline without splitting and globbing, for redirection targets and
    /// assignment right-hand sides. Errors unless exactly one field results.
    pub async fn expand_single(&mut self, token: &WordToken) -> Result<String> {
        let segs = self.walk_token(token).await?;
        let mut fields = split_fields(&segs, DEFAULT_IFS, false);
        if fields.len() != 1 {
            return Err(Error::Expansion(format!(
                "word expands to {} fields where one is required",
                fields.len()
            )));
        }
        Ok(fields.remove(0).text)
    }

    /// Here-document body: parameter, command and arithmetic expansion
    /// only, and only when the delimiter was unquoted.
    pub async fn expand_heredoc(&mut self, body: &str, quoted: bool) -> Result<String> {
        if quoted {
            return Ok(body.to_string());
        }
        self.expand_text(body).await
    }

    /// Standalone arithmetic entry point; the expression undergoes the
    /// expansion pre-pass before evaluation.
    pub async fn arithmetic_evaluate(&mut self, expression: &str) -> Result<i64> {
        let prepared = self.expand_text(expression).await?;
        debug_log!("arithmetic: {:?} -> {:?}", expression, prepared);
        Ok(arith::evaluate(&prepared, self.vars)?)
    }

    /// Expand embedded constructs in raw text and concatenate the result.
    async fn expand_text(&mut self, text: &str) -> Result<String> {
        let parts = scan::scan_parts(text)?;
        let segs = self.walk_parts(&parts).await?;
        let mut out = String::new();
        for seg in segs {
            match seg {
                Seg::Text { text, .. } => out.push_str(&text),
                Seg::Break => out.push(' '),
            }
        }
        Ok(out)
    }

    async fn walk_token(&mut self, token: &WordToken) -> Result<Vec<Seg>> {
        if !token.expand {
            return Ok(token
                .parts
                .iter()
                .filter_map(|part| match &part.kind {
                    PartKind::Literal(text) => Some(Seg::Text {
                        text: text.clone(),
                        quoted: part.quoted,
                    }),
                    _ => None,
                })
                .collect());
        }
        self.walk_parts(&token.parts).await
    }

    /// Steps 1-4 over a part list. Boxed because modifier words re-enter
    /// the walk through [`Self::expand_text`].
    fn walk_parts<'s>(&'s mut self, parts: &'s [WordPart]) -> BoxFuture<'s, Result<Vec<Seg>>> {
        Box::pin(async move {
            let mut segs = Vec::new();
            for part in parts {
                match &part.kind {
                    PartKind::Literal(text) => segs.push(Seg::Text {
                        text: text.clone(),
                        quoted: part.quoted,
                    }),
                    PartKind::Tilde(user) => segs.push(self.tilde(user)),
                    PartKind::Parameter { name, modifier } => {
                        self.parameter(name, modifier.as_ref(), part.quoted, &mut segs)
                            .await?;
                    }
                    PartKind::CommandSubst(command) => {
                        let capture = self.host.run_command_capture(command).await?;
                        let mut stdout = capture.stdout;
                        while stdout.ends_with('\n') {
                            stdout.pop();
                        }
                        segs.push(Seg::Text {
                            text: stdout,
                            quoted: part.quoted,
                        });
                    }
                    PartKind::Arithmetic(expression) => {
                        let value = self.arithmetic_evaluate(expression).await?;
                        segs.push(Seg::Text {
                            text: value.to_string(),
                            quoted: part.quoted,
                        });
                    }
                }
            }
            Ok(segs)
        })
    }

    /// Tilde expansion; a failed lookup preserves the prefix verbatim. The
    /// expanded home directory is never split or globbed.
    fn tilde(&self, user: &str) -> Seg {
        let home = match user {
            "" => self.var_or_env("HOME"),
            "+" => self.var_or_env("PWD"),
            "-" => self.var_or_env("OLDPWD"),
            name => self.host.lookup_user_home(name),
        };
        match home {
            Some(dir) => Seg::Text {
                text: dir,
                quoted: true,
            },
            None => Seg::Text {
                text: format!("~{user}"),
                quoted: false,
            },
        }
    }

    fn var_or_env(&self, name: &str) -> Option<String> {
        self.vars
            .value(name)
            .map(str::to_string)
            .or_else(|| self.host.lookup_env(name))
    }

    async fn parameter(
        &mut self,
        name: &str,
        modifier: Option<&Modifier>,
        quoted: bool,
        segs: &mut Vec<Seg>,
    ) -> Result<()> {
        // Unmodified @ and * expand to one segment per positional. Quoted
        // "$*" instead joins on the first IFS character.
        if (name == "@" || name == "*") && modifier.is_none() {
            if quoted && name == "*" {
                segs.push(Seg::Text {
                    text: self.frame.positional.join(&self.list_separator()),
                    quoted: true,
                });
            } else {
                for (i, positional) in self.frame.positional.iter().enumerate() {
                    if i > 0 {
                        segs.push(Seg::Break);
                    }
                    segs.push(Seg::Text {
                        text: positional.clone(),
                        quoted,
                    });
                }
            }
            return Ok(());
        }

        let value = self.lookup(name);
        let text = match modifier {
            None => {
                self.require_set(name, &value)?;
                value.unwrap_or_default()
            }
            Some(m) => match m.op {
                ModOp::Length => {
                    self.require_set(name, &value)?;
                    value.map(|v| v.len()).unwrap_or(0).to_string()
                }
                ModOp::UseDefault { colon } => {
                    if unset(&value, colon) {
                        self.expand_text(&m.word).await?
                    } else {
                        value.unwrap_or_default()
                    }
                }
                ModOp::AssignDefault { colon } => {
                    if unset(&value, colon) {
                        if vars::validate_name(name).is_err() {
                            return Err(Error::Expansion(format!(
                                "{name}: cannot assign in this way"
                            )));
                        }
                        let word = self.expand_text(&m.word).await?;
                        self.vars.set_value(name, &word)?;
                        word
                    } else {
                        value.unwrap_or_default()
                    }
                }
                ModOp::ErrorIfUnset { colon } => {
                    if unset(&value, colon) {
                        let message = if m.word.is_empty() {
                            let default = if colon {
                                "parameter null or not set"
                            } else {
                                "parameter not set"
                            };
                            default.to_string()
                        } else {
                            self.expand_text(&m.word).await?
                        };
                        return Err(Error::Expansion(format!("{name}: {message}")));
                    }
                    value.unwrap_or_default()
                }
                ModOp::UseAlternate { colon } => {
                    if unset(&value, colon) {
                        String::new()
                    } else {
                        self.expand_text(&m.word).await?
                    }
                }
                ModOp::RemovePrefix { longest } => {
                    self.require_set(name, &value)?;
                    let pat = self.expand_text(&m.word).await?;
                    pattern::remove_prefix(&value.unwrap_or_default(), &pat, longest)
                }
                ModOp::RemoveSuffix { longest } => {
                    self.require_set(name, &value)?;
                    let pat = self.expand_text(&m.word).await?;
                    pattern::remove_suffix(&value.unwrap_or_default(), &pat, longest)
                }
            },
        };
        segs.push(Seg::Text { text, quoted });
        Ok(())
    }

    /// Resolve a parameter: specials and positionals from the frame and
    /// options, everything else from the variable store.
    fn lookup(&self, name: &str) -> Option<String> {
        match name {
            "?" => Some(self.frame.last_status.to_string()),
            "-" => Some(self.opts.short_flags()),
            "$" => Some(self.frame.shell_pid.to_string()),
            "!" => self.frame.last_bg_pid.map(|pid| pid.to_string()),
            "#" => Some(self.frame.count().to_string()),
            "@" | "*" => Some(self.frame.positional.join(&self.list_separator())),
            n if n.bytes().all(|b| b.is_ascii_digit()) => n
                .parse()
                .ok()
                .and_then(|i| self.frame.positional(i))
                .map(str::to_string),
            _ => self.vars.value(name).map(str::to_string),
        }
    }

    fn require_set(&self, name: &str, value: &Option<String>) -> Result<()> {
        if self.opts.nounset && value.is_none() && name != "@" && name != "*" {
            return Err(Error::Expansion(format!("{name}: parameter not set")));
        }
        Ok(())
    }

    fn ifs(&self) -> String {
        self.vars.value("IFS").unwrap_or(DEFAULT_IFS).to_string()
    }

    /// Join character for `$*`: the first IFS character, a space when IFS
    /// is unset, nothing when IFS is empty.
    fn list_separator(&self) -> String {
        match self.vars.value("IFS") {
            None => " ".to_string(),
            Some(ifs) => ifs.chars().next().map(String::from).unwrap_or_default(),
        }
    }
}

fn unset(value: &Option<String>, colon: bool) -> bool {
    match value {
        None => true,
        Some(v) => colon && v.is_empty(),
    }
}

/// Step 5. When `do_split` is false the segments still collapse into
/// break-separated fields (so `"$@"` keeps its field structure) but IFS is
/// ignored and an empty result is one empty field.
fn split_fields(segs: &[Seg], ifs: &str, do_split: bool) -> Vec<Field> {
    let mut fields = Vec::new();
    let mut text = String::new();
    let mut pattern = String::new();
    let mut started = !do_split;
    let mut ws_pending = false;

    fn flush(
        fields: &mut Vec<Field>,
        text: &mut String,
        pattern: &mut String,
        started: &mut bool,
    ) {
        fields.push(Field {
            text: std::mem::take(text),
            pattern: std::mem::take(pattern),
        });
        *started = false;
    }

    for seg in segs {
        match seg {
            Seg::Break => {
                if started {
                    flush(&mut fields, &mut text, &mut pattern, &mut started);
                }
                ws_pending = false;
                if !do_split {
                    started = true;
                }
            }
            Seg::Text { text: t, quoted: true } => {
                started = true;
                ws_pending = false;
                text.push_str(t);
                escape_glob(t, &mut pattern);
            }
            Seg::Text { text: t, quoted: false } => {
                if !do_split || ifs.is_empty() {
                    if !t.is_empty() {
                        started = true;
                        text.push_str(t);
                        pattern.push_str(t);
                    }
                    continue;
                }
                for c in t.chars() {
                    if ifs.contains(c) {
                        if c == ' ' || c == '\t' || c == '\n' {
                            if started {
                                flush(&mut fields, &mut text, &mut pattern, &mut started);
                                ws_pending = true;
                            }
                        } else if ws_pending {
                            // already delimited by the preceding whitespace
                            ws_pending = false;
                        } else {
                            flush(&mut fields, &mut text, &mut pattern, &mut started);
                        }
                    } else {
                        text.push(c);
                        pattern.push(c);
                        started = true;
                        ws_pending = false;
                    }
                }
            }
        }
    }
    if started {
        flush(&mut fields, &mut text, &mut pattern, &mut started);
    }
    fields
}

/// Append `s` to a glob pattern with every metacharacter escaped, so bytes
/// of quoted provenance never trigger pathname expansion.
fn escape_glob(s: &str, out: &mut String) {
    for c in s.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
}
