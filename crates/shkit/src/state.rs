//! Shell state shared across expansions
//!
//! [`ShellOptions`] holds the `set` flags; [`Frame`] holds the positional
//! parameters and the process-level values behind the special parameters
//! (`$?`, `$$`, `$!`, `$#`, `$@`, `$*`, `$n`). Both are owned by the caller
//! and borrowed by the expander for the duration of one expansion.

/// Short letter and long name for every supported `set` option, in the
/// order they appear in `$-`.
const OPTION_TABLE: &[(char, &str)] = &[
    ('a', "allexport"),
    ('b', "notify"),
    ('C', "noclobber"),
    ('e', "errexit"),
    ('f', "noglob"),
    ('h', "hashall"),
    ('m', "monitor"),
    ('n', "noexec"),
    ('u', "nounset"),
    ('v', "verbose"),
    ('x', "xtrace"),
];

/// The `set` option flags. All default to off.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellOptions {
    pub allexport: bool,
    pub notify: bool,
    pub noclobber: bool,
    pub errexit: bool,
    pub noglob: bool,
    pub hashall: bool,
    pub monitor: bool,
    pub noexec: bool,
    pub nounset: bool,
    pub verbose: bool,
    pub xtrace: bool,
}

impl ShellOptions {
    pub fn new() -> Self {
        Self::default()
    }

    fn flag_mut(&mut self, long: &str) -> Option<&mut bool> {
        Some(match long {
            "allexport" => &mut self.allexport,
            "notify" => &mut self.notify,
            "noclobber" => &mut self.noclobber,
            "errexit" => &mut self.errexit,
            "noglob" => &mut self.noglob,
            "hashall" => &mut self.hashall,
            "monitor" => &mut self.monitor,
            "noexec" => &mut self.noexec,
            "nounset" => &mut self.nounset,
            "verbose" => &mut self.verbose,
            "xtrace" => &mut self.xtrace,
            _ => return None,
        })
    }

    fn flag(&self, long: &str) -> Option<bool> {
        Some(match long {
            "allexport" => self.allexport,
            "notify" => self.notify,
            "noclobber" => self.noclobber,
            "errexit" => self.errexit,
            "noglob" => self.noglob,
            "hashall" => self.hashall,
            "monitor" => self.monitor,
            "noexec" => self.noexec,
            "nounset" => self.nounset,
            "verbose" => self.verbose,
            "xtrace" => self.xtrace,
            _ => return None,
        })
    }

    /// Turn a short option letter on or off. Returns false for an unknown
    /// letter.
    pub fn set_short(&mut self, letter: char, on: bool) -> bool {
        let Some((_, long)) = OPTION_TABLE.iter().find(|(c, _)| *c == letter) else {
            return false;
        };
        self.set_long(long, on)
    }

    /// Turn a long option name on or off. Returns false for an unknown name.
    pub fn set_long(&mut self, long: &str, on: bool) -> bool {
        match self.flag_mut(long) {
            Some(slot) => {
                *slot = on;
                true
            }
            None => false,
        }
    }

    /// The value of `$-`: the letters of every enabled option.
    pub fn short_flags(&self) -> String {
        OPTION_TABLE
            .iter()
            .filter(|(_, long)| self.flag(long) == Some(true))
            .map(|(c, _)| *c)
            .collect()
    }

    /// `set -o` output: one `name on|off` line per option.
    pub fn print_human(&self) -> String {
        let mut out = String::new();
        for (_, long) in OPTION_TABLE {
            let on = self.flag(long) == Some(true);
            out.push_str(&format!(
                "{long:<15} {}\n",
                if on { "on" } else { "off" }
            ));
        }
        out
    }

    /// `set +o` output: re-input form that restores the current settings.
    pub fn print_reinput(&self) -> String {
        let mut out = String::new();
        for (_, long) in OPTION_TABLE {
            let sign = if self.flag(long) == Some(true) { '-' } else { '+' };
            out.push_str(&format!("set {sign}o {long}\n"));
        }
        out
    }
}

/// Positional parameters and process-level special-parameter values.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    /// `$1`..`$n`; `$0` is not stored here, it is the shell name.
    pub positional: Vec<String>,
    /// `$?`
    pub last_status: i32,
    /// `$$`
    pub shell_pid: u32,
    /// `$!`; unset until the first background job.
    pub last_bg_pid: Option<u32>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// `$n` for n >= 1. Out-of-range positions read as unset.
    pub fn positional(&self, n: usize) -> Option<&str> {
        if n == 0 {
            return None;
        }
        self.positional.get(n - 1).map(String::as_str)
    }

    /// `$#`
    pub fn count(&self) -> usize {
        self.positional.len()
    }

    /// Replace the positional parameters, as `set --` does.
    pub fn set_positional(&mut self, args: Vec<String>) {
        self.positional = args;
    }
}
