//! Part scanner
//!
//! Turns raw text into [`WordPart`]s: `$name`, `${...}` with its modifier,
//! `$(...)`, `$((...))`, backticks and backslash escapes. Used for
//! here-document bodies, the arithmetic pre-pass, modifier words, and the
//! convenience word constructor. Structural quote handling is the parser's
//! job; by the time text reaches here only escapes remain.

use crate::error::{Error, Result};
use crate::expand::token::{ModOp, Modifier, PartKind, WordPart};

/// Scan text into parts, without tilde recognition.
pub fn scan_parts(text: &str) -> Result<Vec<WordPart>> {
    scan(text, false)
}

/// Scan a whole word, recognising a leading unquoted tilde prefix.
pub fn scan_word(text: &str) -> Result<Vec<WordPart>> {
    scan(text, true)
}

fn scan(text: &str, tilde: bool) -> Result<Vec<WordPart>> {
    let bytes = text.as_bytes();
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    if tilde && bytes.first() == Some(&b'~') {
        let end = bytes
            .iter()
            .position(|&b| b == b'/')
            .unwrap_or(bytes.len());
        parts.push(WordPart::unquoted(PartKind::Tilde(text[1..end].to_string())));
        i = end;
    }

    while i < bytes.len() {
        match bytes[i] {
            b'\\' if i + 1 < bytes.len() => {
                flush(&mut parts, &mut literal);
                let c = text[i + 1..].chars().next().unwrap_or('\\');
                parts.push(WordPart::quoted(PartKind::Literal(c.to_string())));
                i += 1 + c.len_utf8();
            }
            b'$' if i + 1 < bytes.len() => {
                let (part, next) = scan_dollar(text, i)?;
                match part {
                    Some(part) => {
                        flush(&mut parts, &mut literal);
                        parts.push(WordPart::unquoted(part));
                    }
                    None => literal.push('$'),
                }
                i = next;
            }
            b'`' => {
                flush(&mut parts, &mut literal);
                let (command, next) = scan_backticks(text, i)?;
                parts.push(WordPart::unquoted(PartKind::CommandSubst(command)));
                i = next;
            }
            _ => {
                let c = text[i..].chars().next().unwrap_or('\u{fffd}');
                literal.push(c);
                i += c.len_utf8();
            }
        }
    }
    flush(&mut parts, &mut literal);
    Ok(parts)
}

fn flush(parts: &mut Vec<WordPart>, literal: &mut String) {
    if !literal.is_empty() {
        parts.push(WordPart::unquoted(PartKind::Literal(std::mem::take(
            literal,
        ))));
    }
}

/// Scan the construct starting at the `$` at byte `start`. Returns the part
/// (or `None` for a literal dollar) and the index after the construct.
fn scan_dollar(text: &str, start: usize) -> Result<(Option<PartKind>, usize)> {
    let bytes = text.as_bytes();
    let i = start + 1;
    match bytes[i] {
        b'(' if bytes.get(i + 1) == Some(&b'(') => {
            let (inner, next) = scan_arith(text, i + 2)?;
            Ok((Some(PartKind::Arithmetic(inner)), next))
        }
        b'(' => {
            let (inner, next) = scan_balanced(text, i + 1, b'(', b')')?;
            Ok((Some(PartKind::CommandSubst(inner)), next))
        }
        b'{' => {
            let (inner, next) = scan_balanced(text, i + 1, b'{', b'}')?;
            Ok((Some(parse_braced(&inner)?), next))
        }
        b'?' | b'-' | b'$' | b'!' | b'#' | b'@' | b'*' => Ok((
            Some(PartKind::Parameter {
                name: char::from(bytes[i]).to_string(),
                modifier: None,
            }),
            i + 1,
        )),
        b if b.is_ascii_digit() => Ok((
            Some(PartKind::Parameter {
                name: char::from(b).to_string(),
                modifier: None,
            }),
            i + 1,
        )),
        b if b.is_ascii_alphabetic() || b == b'_' => {
            let mut end = i + 1;
            while bytes
                .get(end)
                .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_')
            {
                end += 1;
            }
            Ok((
                Some(PartKind::Parameter {
                    name: text[i..end].to_string(),
                    modifier: None,
                }),
                end,
            ))
        }
        _ => Ok((None, i)),
    }
}

/// Balanced delimiter scan starting just inside the opener; returns the
/// inner text and the index after the closer.
fn scan_balanced(text: &str, from: usize, open: u8, close: u8) -> Result<(String, usize)> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = from;
    while i < bytes.len() {
        let b = bytes[i];
        if b == open {
            depth += 1;
        } else if b == close {
            if depth == 0 {
                return Ok((text[from..i].to_string(), i + 1));
            }
            depth -= 1;
        }
        i += 1;
    }
    Err(Error::Expansion(format!(
        "unexpected end of input while looking for matching `{}`",
        char::from(close)
    )))
}

/// Scan `$(( ... ))` starting just inside the double opener; the closer is
/// a `))` pair at paren depth zero.
fn scan_arith(text: &str, from: usize) -> Result<(String, usize)> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'(' => depth += 1,
            b')' if depth > 0 => depth -= 1,
            b')' if bytes.get(i + 1) == Some(&b')') => {
                return Ok((text[from..i].to_string(), i + 2));
            }
            _ => {}
        }
        i += 1;
    }
    Err(Error::Expansion(
        "unexpected end of input while looking for matching `))`".into(),
    ))
}

/// Backtick command substitution; `\`, `` \` `` and `\$` lose the backslash.
fn scan_backticks(text: &str, start: usize) -> Result<(String, usize)> {
    let bytes = text.as_bytes();
    let mut command = String::new();
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'`' => return Ok((command, i + 1)),
            b'\\' if matches!(bytes.get(i + 1), Some(b'`' | b'\\' | b'$')) => {
                command.push(char::from(bytes[i + 1]));
                i += 2;
            }
            _ => {
                let c = text[i..].chars().next().unwrap_or('\u{fffd}');
                command.push(c);
                i += c.len_utf8();
            }
        }
    }
    Err(Error::Expansion(
        "unexpected end of input while looking for matching ```".into(),
    ))
}

/// Parse the inside of `${ ... }`.
fn parse_braced(inner: &str) -> Result<PartKind> {
    if inner.is_empty() {
        return Err(bad_substitution(inner));
    }
    if inner == "#" {
        return Ok(PartKind::Parameter {
            name: "#".into(),
            modifier: None,
        });
    }
    if let Some(rest) = inner.strip_prefix('#') {
        // ${#name}: length, with no further modifier.
        if parameter_name_len(rest) == rest.len() {
            return Ok(PartKind::Parameter {
                name: rest.to_string(),
                modifier: Some(Modifier {
                    op: ModOp::Length,
                    word: String::new(),
                }),
            });
        }
        return Err(bad_substitution(inner));
    }

    let name_len = parameter_name_len(inner);
    if name_len == 0 {
        return Err(bad_substitution(inner));
    }
    let name = inner[..name_len].to_string();
    let rest = &inner[name_len..];
    if rest.is_empty() {
        return Ok(PartKind::Parameter {
            name,
            modifier: None,
        });
    }

    let (op, word) = if let Some(word) = rest.strip_prefix(":-") {
        (ModOp::UseDefault { colon: true }, word)
    } else if let Some(word) = rest.strip_prefix(":=") {
        (ModOp::AssignDefault { colon: true }, word)
    } else if let Some(word) = rest.strip_prefix(":?") {
        (ModOp::ErrorIfUnset { colon: true }, word)
    } else if let Some(word) = rest.strip_prefix(":+") {
        (ModOp::UseAlternate { colon: true }, word)
    } else if let Some(word) = rest.strip_prefix('-') {
        (ModOp::UseDefault { colon: false }, word)
    } else if let Some(word) = rest.strip_prefix('=') {
        (ModOp::AssignDefault { colon: false }, word)
    } else if let Some(word) = rest.strip_prefix('?') {
        (ModOp::ErrorIfUnset { colon: false }, word)
    } else if let Some(word) = rest.strip_prefix('+') {
        (ModOp::UseAlternate { colon: false }, word)
    } else if let Some(word) = rest.strip_prefix("##") {
        (ModOp::RemovePrefix { longest: true }, word)
    } else if let Some(word) = rest.strip_prefix('#') {
        (ModOp::RemovePrefix { longest: false }, word)
    } else if let Some(word) = rest.strip_prefix("%%") {
        (ModOp::RemoveSuffix { longest: true }, word)
    } else if let Some(word) = rest.strip_prefix('%') {
        (ModOp::RemoveSuffix { longest: false }, word)
    } else {
        return Err(bad_substitution(inner));
    };
    Ok(PartKind::Parameter {
        name,
        modifier: Some(Modifier {
            op,
            word: word.to_string(),
        }),
    })
}

/// Length of the parameter name at the start of `s`: an identifier, a
/// decimal positional, or a single special character.
fn parameter_name_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    match bytes.first() {
        None => 0,
        Some(b'?' | b'-' | b'$' | b'!' | b'#' | b'@' | b'*') => 1,
        Some(b) if b.is_ascii_digit() => bytes
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count(),
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => bytes
            .iter()
            .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
            .count(),
        Some(_) => 0,
    }
}

fn bad_substitution(inner: &str) -> Error {
    Error::Expansion(format!("${{{inner}}}: bad substitution"))
}
