//! Shell pattern matching
//!
//! Direct (compile-free) interpretation of the glob mini-language: `*`
//! matches any run of characters, `?` exactly one, `[...]` one character
//! from a set with `!`/`^` negation, a literal `]` straight after the
//! opener, and byte-value ranges. `\` escapes the next byte unless the
//! `noescape` flag is set. Backtracking happens only over `*` positions.
//!
//! The same matcher backs pathname expansion (with `pathname` and `period`
//! set) and the `${var#pat}` / `${var%pat}` pattern-removal operators (all
//! flags off).

/// Flags parameterising a single match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchFlags {
    /// `/` is never matched by `*`, `?` or `[...]`.
    pub pathname: bool,
    /// A `.` at the start of the subject (or just after `/` when `pathname`
    /// is also set) matches only an explicit literal `.` in the pattern.
    pub period: bool,
    /// Disable `\` as an escape character.
    pub noescape: bool,
    /// ASCII case-insensitive matching.
    pub casefold: bool,
}

impl MatchFlags {
    /// Flag set used for pathname expansion.
    pub fn for_pathnames() -> Self {
        Self {
            pathname: true,
            period: true,
            ..Self::default()
        }
    }
}

/// Does the string contain an unescaped glob metacharacter?
pub fn has_glob_chars(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'*' | b'?' | b'[' => return true,
            _ => i += 1,
        }
    }
    false
}

/// Strip `\` escapes, keeping the escaped bytes literally.
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next) => out.push(next),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Match `pattern` against the whole of `subject` under `flags`.
pub fn matches(pattern: &str, subject: &str, flags: MatchFlags) -> bool {
    match_at(pattern.as_bytes(), 0, subject.as_bytes(), 0, flags)
}

fn fold(b: u8, flags: MatchFlags) -> u8 {
    if flags.casefold {
        b.to_ascii_lowercase()
    } else {
        b
    }
}

/// Is the subject byte at `si` a dot that only a literal `.` may match?
fn protected_dot(sub: &[u8], si: usize, flags: MatchFlags) -> bool {
    flags.period
        && si < sub.len()
        && sub[si] == b'.'
        && (si == 0 || (flags.pathname && sub[si - 1] == b'/'))
}

fn match_at(pat: &[u8], mut pi: usize, sub: &[u8], mut si: usize, flags: MatchFlags) -> bool {
    while pi < pat.len() {
        match pat[pi] {
            b'*' => {
                while pi < pat.len() && pat[pi] == b'*' {
                    pi += 1;
                }
                // A star that starts on a protected dot fails outright: it
                // cannot record a backtrack anchor before the dot.
                if protected_dot(sub, si, flags) {
                    return false;
                }
                if pi == pat.len() {
                    // Trailing star swallows the rest, except slashes under
                    // `pathname`.
                    if flags.pathname {
                        return !sub[si..].contains(&b'/');
                    }
                    return true;
                }
                // Try every anchor; the star itself may not consume a slash
                // (under `pathname`) or a protected dot.
                for anchor in si..=sub.len() {
                    if match_at(pat, pi, sub, anchor, flags) {
                        return true;
                    }
                    if anchor < sub.len() {
                        if protected_dot(sub, anchor, flags) {
                            return false;
                        }
                        if flags.pathname && sub[anchor] == b'/' {
                            return false;
                        }
                    }
                }
                return false;
            }
            b'?' => {
                if si >= sub.len()
                    || protected_dot(sub, si, flags)
                    || (flags.pathname && sub[si] == b'/')
                {
                    return false;
                }
                pi += 1;
                si += 1;
            }
            b'[' => {
                let Some((matched, next_pi)) = match_class(pat, pi, sub, si, flags) else {
                    // No closing bracket: `[` is an ordinary character.
                    if si >= sub.len() || fold(sub[si], flags) != fold(b'[', flags) {
                        return false;
                    }
                    pi += 1;
                    si += 1;
                    continue;
                };
                if !matched {
                    return false;
                }
                pi = next_pi;
                si += 1;
            }
            b'\\' if !flags.noescape => {
                let lit = if pi + 1 < pat.len() {
                    pat[pi + 1]
                } else {
                    b'\\'
                };
                if si >= sub.len() || fold(sub[si], flags) != fold(lit, flags) {
                    return false;
                }
                pi = (pi + 2).min(pat.len());
                si += 1;
            }
            c => {
                if si >= sub.len() || fold(sub[si], flags) != fold(c, flags) {
                    return false;
                }
                pi += 1;
                si += 1;
            }
        }
    }
    si == sub.len()
}

/// Match a `[...]` class starting at `pi` against the subject byte at `si`.
///
/// Returns `(matched, index past the closing bracket)`, or `None` when the
/// class is unterminated and the caller should treat `[` literally.
fn match_class(
    pat: &[u8],
    pi: usize,
    sub: &[u8],
    si: usize,
    flags: MatchFlags,
) -> Option<(bool, usize)> {
    let mut i = pi + 1;
    let negate = i < pat.len() && (pat[i] == b'!' || pat[i] == b'^');
    if negate {
        i += 1;
    }

    // Scan ahead for the closing bracket; `]` in the first position is
    // literal, and escapes hide the byte that follows them.
    let mut end = i;
    let mut first = true;
    loop {
        if end >= pat.len() {
            return None;
        }
        if pat[end] == b']' && !first {
            break;
        }
        first = false;
        if pat[end] == b'\\' && !flags.noescape && end + 1 < pat.len() {
            end += 2;
        } else {
            end += 1;
        }
    }

    if si >= sub.len() || protected_dot(sub, si, flags) || (flags.pathname && sub[si] == b'/') {
        // Still consume the class from the pattern so the caller can report
        // a definite mismatch rather than a stray `[`.
        return Some((false, end + 1));
    }

    let ch = fold(sub[si], flags);
    let mut matched = false;
    let mut j = i;
    while j < end {
        let lo = if pat[j] == b'\\' && !flags.noescape && j + 1 < end {
            j += 1;
            pat[j]
        } else {
            pat[j]
        };
        // range lo-hi, as long as `-` is not the final byte before `]`
        if j + 2 < end && pat[j + 1] == b'-' {
            let hi = pat[j + 2];
            let (lo, hi) = (fold(lo, flags), fold(hi, flags));
            let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
            if lo <= ch && ch <= hi {
                matched = true;
            }
            j += 3;
        } else {
            if fold(lo, flags) == ch {
                matched = true;
            }
            j += 1;
        }
    }

    Some((matched != negate, end + 1))
}

/// Remove the shortest (or longest) pattern-matching prefix from `value`.
///
/// Returns `value` unchanged when no prefix matches. Uses the bare matcher:
/// `pathname`, `period`, `noescape` and `casefold` all off.
pub fn remove_prefix(value: &str, pattern: &str, longest: bool) -> String {
    let flags = MatchFlags::default();
    let cuts = char_boundaries(value);
    let try_cut = |cut: usize| -> Option<String> {
        if matches(pattern, &value[..cut], flags) {
            Some(value[cut..].to_string())
        } else {
            None
        }
    };
    if longest {
        for &cut in cuts.iter().rev() {
            if let Some(result) = try_cut(cut) {
                return result;
            }
        }
    } else {
        for &cut in &cuts {
            if let Some(result) = try_cut(cut) {
                return result;
            }
        }
    }
    value.to_string()
}

/// Remove the shortest (or longest) pattern-matching suffix from `value`.
pub fn remove_suffix(value: &str, pattern: &str, longest: bool) -> String {
    let flags = MatchFlags::default();
    let cuts = char_boundaries(value);
    let try_cut = |cut: usize| -> Option<String> {
        if matches(pattern, &value[cut..], flags) {
            Some(value[..cut].to_string())
        } else {
            None
        }
    };
    if longest {
        for &cut in &cuts {
            if let Some(result) = try_cut(cut) {
                return result;
            }
        }
    } else {
        for &cut in cuts.iter().rev() {
            if let Some(result) = try_cut(cut) {
                return result;
            }
        }
    }
    value.to_string()
}

fn char_boundaries(s: &str) -> Vec<usize> {
    let mut cuts: Vec<usize> = s.char_indices().map(|(i, _)| i).collect();
    cuts.push(s.len());
    cuts
}
