//! Builtin option parsing
//!
//! A re-entrant getopt-style walker over an argument vector. Besides the
//! usual short-option clusters it understands the shell-specific forms:
//! `+x` turns a flag off where `-x` turns it on, `--name` / `++name` long
//! options with prefix matching, permutation of operands to the end, `--`
//! termination, and the POSIX lone-`-` rule as an opt-in.
//!
//! All state lives in the [`OptParser`] value, so nested parses (the `set`
//! builtin re-parsing while the shell is inside its own parse) need no
//! coordination.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptError {
    #[error("unknown option: {0}")]
    Unknown(String),

    #[error("option requires an argument: {0}")]
    MissingArg(String),

    #[error("ambiguous option: {0}")]
    Ambiguous(String),

    #[error("option does not take an argument: {0}")]
    UnexpectedArg(String),

    #[error("option cannot be negated: {0}")]
    BadPlus(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgSpec {
    None,
    Required,
    Optional,
}

/// One long-option table entry.
#[derive(Debug, Clone)]
pub struct LongOpt {
    pub name: String,
    pub arg: ArgSpec,
    /// Whether the `++name` form is permitted.
    pub allow_plus: bool,
}

impl LongOpt {
    pub fn flag(name: &str, allow_plus: bool) -> Self {
        Self {
            name: name.to_string(),
            arg: ArgSpec::None,
            allow_plus,
        }
    }
}

/// Parser configuration: a compact short-option string (`:` suffix for a
/// required argument, `::` for optional; a leading `+` requests strict
/// POSIX ordering), a long-option table, and the lone-`-` opt-in.
#[derive(Debug, Clone, Default)]
pub struct OptSpec {
    pub shorts: String,
    pub longs: Vec<LongOpt>,
    pub posix_dash: bool,
    pub posixly_correct: bool,
}

impl OptSpec {
    pub fn shorts(shorts: &str) -> Self {
        Self {
            shorts: shorts.to_string(),
            ..Self::default()
        }
    }

    fn strict(&self) -> bool {
        self.posixly_correct || self.shorts.starts_with('+')
    }

    /// Argument spec for a short letter, or `None` when unknown.
    fn short_arg(&self, letter: char) -> Option<ArgSpec> {
        let mut chars = self.shorts.chars().peekable();
        if self.shorts.starts_with('+') {
            chars.next();
        }
        while let Some(c) = chars.next() {
            let mut colons = 0;
            while chars.peek() == Some(&':') {
                chars.next();
                colons += 1;
            }
            if c == letter {
                return Some(match colons {
                    0 => ArgSpec::None,
                    1 => ArgSpec::Required,
                    _ => ArgSpec::Optional,
                });
            }
        }
        None
    }
}

/// A recognised option: the short letter or the full long name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Opt {
    Short(char),
    Long(String),
}

pub struct OptParser {
    spec: OptSpec,
    args: Vec<String>,
    index: usize,
    /// Character position inside the current short cluster; 0 means not in
    /// a cluster.
    short_pos: usize,
    opt_arg: Option<String>,
    opt_char: Option<char>,
    plus: bool,
    done: bool,
}

impl OptParser {
    /// `args[0]` is the command name and is skipped.
    pub fn new(spec: OptSpec, args: Vec<String>) -> Self {
        Self {
            spec,
            args,
            index: 1,
            short_pos: 0,
            opt_arg: None,
            opt_char: None,
            plus: false,
            done: false,
        }
    }

    /// Argument of the most recently returned option.
    pub fn opt_arg(&self) -> Option<&str> {
        self.opt_arg.as_deref()
    }

    /// Option character involved in the most recent short option or error.
    pub fn opt_char(&self) -> Option<char> {
        self.opt_char
    }

    /// Whether the most recent option came via `+`.
    pub fn plus(&self) -> bool {
        self.plus
    }

    /// Index of the first operand; meaningful once [`Self::next`] has
    /// returned `None`.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Remaining operands.
    pub fn operands(&self) -> &[String] {
        &self.args[self.index.min(self.args.len())..]
    }

    /// The next option, `None` when option processing is finished.
    pub fn next(&mut self) -> Result<Option<Opt>, OptError> {
        self.opt_arg = None;
        self.plus = false;
        if self.done {
            return Ok(None);
        }
        if self.short_pos > 0 {
            return self.next_in_cluster().map(Some);
        }
        loop {
            let Some(arg) = self.args.get(self.index) else {
                self.done = true;
                return Ok(None);
            };
            if arg == "--" {
                self.index += 1;
                self.done = true;
                return Ok(None);
            }
            if arg == "-" && self.spec.posix_dash {
                // consumed, not preserved as an operand
                self.index += 1;
                self.done = true;
                return Ok(None);
            }
            let long = (arg.starts_with("--") || arg.starts_with("++")) && arg.len() > 2;
            let short =
                !long && (arg.starts_with('-') || arg.starts_with('+')) && arg.len() > 1;
            if long {
                return self.next_long().map(Some);
            }
            if short {
                self.short_pos = 1;
                return self.next_in_cluster().map(Some);
            }
            // Operand: permute it behind the next option, or stop in
            // strict mode.
            if self.spec.strict() {
                self.done = true;
                return Ok(None);
            }
            match self.find_option_ahead() {
                Some(j) => self.args[self.index..=j].rotate_right(1),
                None => {
                    self.done = true;
                    return Ok(None);
                }
            }
        }
    }

    fn find_option_ahead(&self) -> Option<usize> {
        (self.index + 1..self.args.len()).find(|&j| {
            let a = &self.args[j];
            a == "--"
                || (a == "-" && self.spec.posix_dash)
                || (a.len() > 1 && (a.starts_with('-') || a.starts_with('+')))
        })
    }

    fn next_in_cluster(&mut self) -> Result<Opt, OptError> {
        let cluster = self.args[self.index].clone();
        let chars: Vec<char> = cluster.chars().collect();
        let plus = chars[0] == '+';
        let letter = chars[self.short_pos];
        self.plus = plus;
        self.opt_char = Some(letter);

        let Some(arg_spec) = self.spec.short_arg(letter) else {
            self.advance_in_cluster(chars.len());
            let sign = if plus { '+' } else { '-' };
            return Err(OptError::Unknown(format!("{sign}{letter}")));
        };

        match arg_spec {
            ArgSpec::None => {
                self.advance_in_cluster(chars.len());
                Ok(Opt::Short(letter))
            }
            ArgSpec::Required | ArgSpec::Optional => {
                let rest: String = chars[self.short_pos + 1..].iter().collect();
                self.short_pos = 0;
                self.index += 1;
                if !rest.is_empty() {
                    self.opt_arg = Some(rest);
                } else if arg_spec == ArgSpec::Required {
                    match self.args.get(self.index) {
                        Some(value) => {
                            self.opt_arg = Some(value.clone());
                            self.index += 1;
                        }
                        None => {
                            let sign = if plus { '+' } else { '-' };
                            return Err(OptError::MissingArg(format!("{sign}{letter}")));
                        }
                    }
                }
                Ok(Opt::Short(letter))
            }
        }
    }

    fn advance_in_cluster(&mut self, cluster_len: usize) {
        self.short_pos += 1;
        if self.short_pos >= cluster_len {
            self.short_pos = 0;
            self.index += 1;
        }
    }

    fn next_long(&mut self) -> Result<Opt, OptError> {
        let arg = self.args[self.index].clone();
        let plus = arg.starts_with("++");
        let body = &arg[2..];
        let (given, inline) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value.to_string())),
            None => (body, None),
        };

        let candidates: Vec<&LongOpt> = self
            .spec
            .longs
            .iter()
            .filter(|o| o.name.starts_with(given))
            .collect();
        let chosen = match candidates.iter().find(|o| o.name == given) {
            Some(exact) => exact,
            None => match candidates.len() {
                0 => return Err(OptError::Unknown(arg.clone())),
                1 => &candidates[0],
                _ => return Err(OptError::Ambiguous(arg.clone())),
            },
        };
        let (name, arg_spec, allow_plus) = (chosen.name.clone(), chosen.arg, chosen.allow_plus);

        if plus && !allow_plus {
            return Err(OptError::BadPlus(arg));
        }
        self.index += 1;
        self.plus = plus;
        self.opt_char = None;
        match arg_spec {
            ArgSpec::None => {
                if inline.is_some() {
                    return Err(OptError::UnexpectedArg(arg));
                }
            }
            ArgSpec::Required => match inline {
                Some(value) => self.opt_arg = Some(value),
                None => match self.args.get(self.index) {
                    Some(value) => {
                        self.opt_arg = Some(value.clone());
                        self.index += 1;
                    }
                    None => return Err(OptError::MissingArg(arg)),
                },
            },
            ArgSpec::Optional => self.opt_arg = inline,
        }
        Ok(Opt::Long(name))
    }
}
