//! POSIX arithmetic evaluation
//!
//! Recursive-descent evaluator over signed 64-bit integers for the `$(( ))`
//! expansion and the arithmetic assignment operators. Parsing and evaluation
//! are interleaved; the dead branch of `&&`, `||` and `?:` is parsed but not
//! evaluated, so a division by zero there is not an error.
//!
//! The expander performs parameter expansion, command substitution and
//! nested arithmetic expansion on the source text before this module sees
//! it; only numeric content, identifiers and operators arrive here.

use thiserror::Error;

use crate::vars::{VarError, VarStore};

/// Recursion limit for variables whose values are themselves expressions.
const MAX_DEPTH: u32 = 64;

/// Arithmetic evaluation failures. Each carries a human-readable message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArithError {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("unbalanced parenthesis")]
    Unbalanced,

    #[error("division by zero")]
    DivideByZero,

    #[error("shift count out of range: {0}")]
    BadShift(i64),

    #[error("number out of range: {0}")]
    BadNumber(String),

    #[error("attempted assignment to non-identifier")]
    NotAssignable,

    #[error("{0}: readonly variable")]
    ReadOnly(String),

    #[error("expression recursion level exceeded")]
    TooDeep,
}

/// Evaluate an arithmetic expression, reading and writing variables through
/// the store. An empty expression evaluates to zero.
pub fn evaluate(expr: &str, vars: &mut VarStore) -> Result<i64, ArithError> {
    evaluate_at_depth(expr, vars, 0)
}

fn evaluate_at_depth(expr: &str, vars: &mut VarStore, depth: u32) -> Result<i64, ArithError> {
    if expr.trim().is_empty() {
        return Ok(0);
    }
    let mut p = Parser {
        src: expr.as_bytes(),
        pos: 0,
        vars,
        depth,
    };
    let operand = p.comma(true)?;
    let value = p.resolve_operand(operand, true)?;
    p.skip_ws();
    match p.peek() {
        None => Ok(value),
        Some(b')') => Err(ArithError::Unbalanced),
        Some(_) => Err(ArithError::Syntax(format!(
            "unexpected token at `{}`",
            String::from_utf8_lossy(&p.src[p.pos..])
        ))),
    }
}

/// An operand that may still be an unresolved variable reference, so that
/// assignment targets are not read (or errored on) before we know they are
/// targets.
enum Operand {
    Num(i64),
    Var(String),
}

#[derive(Clone, Copy, PartialEq)]
enum AssignOp {
    Set,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    And,
    Xor,
    Or,
}

struct Parser<'a, 'v> {
    src: &'a [u8],
    pos: usize,
    vars: &'v mut VarStore,
    depth: u32,
}

impl Parser<'_, '_> {
    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    fn skip_ws(&mut self) {
        while self
            .peek()
            .is_some_and(|b| b == b' ' || b == b'\t' || b == b'\n')
        {
            self.pos += 1;
        }
    }

    /// Resolve an operand to a number. Inactive contexts resolve to zero
    /// without touching the store.
    fn resolve_operand(&mut self, operand: Operand, active: bool) -> Result<i64, ArithError> {
        match operand {
            Operand::Num(n) => Ok(n),
            Operand::Var(name) => {
                if active {
                    self.resolve_var(&name)
                } else {
                    Ok(0)
                }
            }
        }
    }

    /// Variable lookup with recursive arithmetic expansion of the value.
    /// Unset and empty both read as zero; a value that still fails to
    /// evaluate is an error.
    fn resolve_var(&mut self, name: &str) -> Result<i64, ArithError> {
        if self.depth >= MAX_DEPTH {
            return Err(ArithError::TooDeep);
        }
        let value = match self.vars.value(name) {
            None => return Ok(0),
            Some(v) => v.to_string(),
        };
        if value.trim().is_empty() {
            return Ok(0);
        }
        evaluate_at_depth(&value, self.vars, self.depth + 1)
    }

    fn comma(&mut self, active: bool) -> Result<Operand, ArithError> {
        let mut value = self.assignment(active)?;
        loop {
            self.skip_ws();
            if self.peek() == Some(b',') {
                self.pos += 1;
                // The discarded operand is still evaluated for its effects.
                self.resolve_operand(value, active)?;
                value = self.assignment(active)?;
            } else {
                return Ok(value);
            }
        }
    }

    fn peek_assign_op(&self) -> Option<(AssignOp, usize)> {
        let a = self.peek()?;
        let b = self.peek_at(1);
        let c = self.peek_at(2);
        match (a, b, c) {
            (b'<', Some(b'<'), Some(b'=')) => Some((AssignOp::Shl, 3)),
            (b'>', Some(b'>'), Some(b'=')) => Some((AssignOp::Shr, 3)),
            (b'+', Some(b'='), _) => Some((AssignOp::Add, 2)),
            (b'-', Some(b'='), _) => Some((AssignOp::Sub, 2)),
            (b'*', Some(b'='), _) => Some((AssignOp::Mul, 2)),
            (b'/', Some(b'='), _) => Some((AssignOp::Div, 2)),
            (b'%', Some(b'='), _) => Some((AssignOp::Mod, 2)),
            (b'&', Some(b'='), _) => Some((AssignOp::And, 2)),
            (b'^', Some(b'='), _) => Some((AssignOp::Xor, 2)),
            (b'|', Some(b'='), _) => Some((AssignOp::Or, 2)),
            (b'=', b2, _) if b2 != Some(b'=') => Some((AssignOp::Set, 1)),
            _ => None,
        }
    }

    fn assignment(&mut self, active: bool) -> Result<Operand, ArithError> {
        let lhs = self.ternary(active)?;
        self.skip_ws();
        let Some((op, width)) = self.peek_assign_op() else {
            return Ok(lhs);
        };
        let Operand::Var(name) = lhs else {
            return Err(ArithError::NotAssignable);
        };
        self.pos += width;

        let rhs_operand = self.assignment(active)?;
        let rhs = self.resolve_operand(rhs_operand, active)?;
        if !active {
            return Ok(Operand::Num(0));
        }

        let current = if op == AssignOp::Set {
            0
        } else {
            self.resolve_var(&name)?
        };
        let value = match op {
            AssignOp::Set => rhs,
            AssignOp::Add => current.wrapping_add(rhs),
            AssignOp::Sub => current.wrapping_sub(rhs),
            AssignOp::Mul => current.wrapping_mul(rhs),
            AssignOp::Div => checked_div(current, rhs)?,
            AssignOp::Mod => checked_rem(current, rhs)?,
            AssignOp::Shl => checked_shift(current, rhs, true)?,
            AssignOp::Shr => checked_shift(current, rhs, false)?,
            AssignOp::And => current & rhs,
            AssignOp::Xor => current ^ rhs,
            AssignOp::Or => current | rhs,
        };
        self.vars
            .set_value(&name, &value.to_string())
            .map_err(|e| match e {
                VarError::ReadOnly(n) => ArithError::ReadOnly(n),
                other => ArithError::Syntax(other.to_string()),
            })?;
        Ok(Operand::Num(value))
    }

    fn ternary(&mut self, active: bool) -> Result<Operand, ArithError> {
        let cond_operand = self.logical_or(active)?;
        self.skip_ws();
        if self.peek() != Some(b'?') {
            return Ok(cond_operand);
        }
        self.pos += 1;
        let cond = self.resolve_operand(cond_operand, active)? != 0;

        let then_operand = self.assignment(active && cond)?;
        let then_value = self.resolve_operand(then_operand, active && cond)?;
        self.skip_ws();
        if self.peek() != Some(b':') {
            return Err(ArithError::Syntax("expected `:` in conditional".into()));
        }
        self.pos += 1;
        // Right-associative: the else branch is another conditional.
        let else_operand = self.ternary(active && !cond)?;
        let else_value = self.resolve_operand(else_operand, active && !cond)?;

        Ok(Operand::Num(if !active {
            0
        } else if cond {
            then_value
        } else {
            else_value
        }))
    }

    fn logical_or(&mut self, active: bool) -> Result<Operand, ArithError> {
        let mut acc = self.logical_and(active)?;
        loop {
            self.skip_ws();
            if self.peek() == Some(b'|') && self.peek_at(1) == Some(b'|') {
                self.pos += 2;
                let left = self.resolve_operand(acc, active)?;
                let right_active = active && left == 0;
                let rhs = self.logical_and(right_active)?;
                let right = self.resolve_operand(rhs, right_active)?;
                let value = if !active {
                    0
                } else if left != 0 || right != 0 {
                    1
                } else {
                    0
                };
                acc = Operand::Num(value);
            } else {
                return Ok(acc);
            }
        }
    }

    fn logical_and(&mut self, active: bool) -> Result<Operand, ArithError> {
        let mut acc = self.bit_or(active)?;
        loop {
            self.skip_ws();
            if self.peek() == Some(b'&') && self.peek_at(1) == Some(b'&') {
                self.pos += 2;
                let left = self.resolve_operand(acc, active)?;
                let right_active = active && left != 0;
                let rhs = self.bit_or(right_active)?;
                let right = self.resolve_operand(rhs, right_active)?;
                let value = if !active {
                    0
                } else if left != 0 && right != 0 {
                    1
                } else {
                    0
                };
                acc = Operand::Num(value);
            } else {
                return Ok(acc);
            }
        }
    }

    fn bit_or(&mut self, active: bool) -> Result<Operand, ArithError> {
        let mut acc = self.bit_xor(active)?;
        loop {
            self.skip_ws();
            if self.peek() == Some(b'|')
                && self.peek_at(1) != Some(b'|')
                && self.peek_at(1) != Some(b'=')
            {
                self.pos += 1;
                let left = self.resolve_operand(acc, active)?;
                let rhs = self.bit_xor(active)?;
                let right = self.resolve_operand(rhs, active)?;
                acc = Operand::Num(left | right);
            } else {
                return Ok(acc);
            }
        }
    }

    fn bit_xor(&mut self, active: bool) -> Result<Operand, ArithError> {
        let mut acc = self.bit_and(active)?;
        loop {
            self.skip_ws();
            if self.peek() == Some(b'^') && self.peek_at(1) != Some(b'=') {
                self.pos += 1;
                let left = self.resolve_operand(acc, active)?;
                let rhs = self.bit_and(active)?;
                let right = self.resolve_operand(rhs, active)?;
                acc = Operand::Num(left ^ right);
            } else {
                return Ok(acc);
            }
        }
    }

    fn bit_and(&mut self, active: bool) -> Result<Operand, ArithError> {
        let mut acc = self.equality(active)?;
        loop {
            self.skip_ws();
            if self.peek() == Some(b'&')
                && self.peek_at(1) != Some(b'&')
                && self.peek_at(1) != Some(b'=')
            {
                self.pos += 1;
                let left = self.resolve_operand(acc, active)?;
                let rhs = self.equality(active)?;
                let right = self.resolve_operand(rhs, active)?;
                acc = Operand::Num(left & right);
            } else {
                return Ok(acc);
            }
        }
    }

    fn equality(&mut self, active: bool) -> Result<Operand, ArithError> {
        let mut acc = self.relational(active)?;
        loop {
            self.skip_ws();
            let eq = match (self.peek(), self.peek_at(1)) {
                (Some(b'='), Some(b'=')) => true,
                (Some(b'!'), Some(b'=')) => false,
                _ => return Ok(acc),
            };
            self.pos += 2;
            let left = self.resolve_operand(acc, active)?;
            let rhs = self.relational(active)?;
            let right = self.resolve_operand(rhs, active)?;
            acc = Operand::Num(((left == right) == eq) as i64);
        }
    }

    fn relational(&mut self, active: bool) -> Result<Operand, ArithError> {
        let mut acc = self.shift(active)?;
        loop {
            self.skip_ws();
            let (lt, or_eq, width) = match (self.peek(), self.peek_at(1)) {
                (Some(b'<'), Some(b'=')) => (true, true, 2),
                (Some(b'>'), Some(b'=')) => (false, true, 2),
                (Some(b'<'), next) if next != Some(b'<') => (true, false, 1),
                (Some(b'>'), next) if next != Some(b'>') => (false, false, 1),
                _ => return Ok(acc),
            };
            self.pos += width;
            let left = self.resolve_operand(acc, active)?;
            let rhs = self.shift(active)?;
            let right = self.resolve_operand(rhs, active)?;
            let holds = match (lt, or_eq) {
                (true, false) => left < right,
                (true, true) => left <= right,
                (false, false) => left > right,
                (false, true) => left >= right,
            };
            acc = Operand::Num(holds as i64);
        }
    }

    fn shift(&mut self, active: bool) -> Result<Operand, ArithError> {
        let mut acc = self.additive(active)?;
        loop {
            self.skip_ws();
            let left_shift = match (self.peek(), self.peek_at(1), self.peek_at(2)) {
                (Some(b'<'), Some(b'<'), next) if next != Some(b'=') => true,
                (Some(b'>'), Some(b'>'), next) if next != Some(b'=') => false,
                _ => return Ok(acc),
            };
            self.pos += 2;
            let left = self.resolve_operand(acc, active)?;
            let rhs = self.additive(active)?;
            let right = self.resolve_operand(rhs, active)?;
            let value = if active {
                checked_shift(left, right, left_shift)?
            } else {
                0
            };
            acc = Operand::Num(value);
        }
    }

    fn additive(&mut self, active: bool) -> Result<Operand, ArithError> {
        let mut acc = self.multiplicative(active)?;
        loop {
            self.skip_ws();
            let add = match (self.peek(), self.peek_at(1)) {
                (Some(b'+'), next) if next != Some(b'=') => true,
                (Some(b'-'), next) if next != Some(b'=') => false,
                _ => return Ok(acc),
            };
            self.pos += 1;
            let left = self.resolve_operand(acc, active)?;
            let rhs = self.multiplicative(active)?;
            let right = self.resolve_operand(rhs, active)?;
            acc = Operand::Num(if add {
                left.wrapping_add(right)
            } else {
                left.wrapping_sub(right)
            });
        }
    }

    fn multiplicative(&mut self, active: bool) -> Result<Operand, ArithError> {
        let mut acc = self.unary(active)?;
        loop {
            self.skip_ws();
            let op = match (self.peek(), self.peek_at(1)) {
                (Some(op @ (b'*' | b'/' | b'%')), next) if next != Some(b'=') => op,
                _ => return Ok(acc),
            };
            self.pos += 1;
            let left = self.resolve_operand(acc, active)?;
            let rhs = self.unary(active)?;
            let right = self.resolve_operand(rhs, active)?;
            let value = if !active {
                0
            } else {
                match op {
                    b'*' => left.wrapping_mul(right),
                    b'/' => checked_div(left, right)?,
                    _ => checked_rem(left, right)?,
                }
            };
            acc = Operand::Num(value);
        }
    }

    fn unary(&mut self, active: bool) -> Result<Operand, ArithError> {
        self.skip_ws();
        match self.peek() {
            Some(b'+') => {
                self.pos += 1;
                let operand = self.unary(active)?;
                Ok(Operand::Num(self.resolve_operand(operand, active)?))
            }
            Some(b'-') => {
                self.pos += 1;
                let operand = self.unary(active)?;
                Ok(Operand::Num(
                    self.resolve_operand(operand, active)?.wrapping_neg(),
                ))
            }
            Some(b'!') => {
                self.pos += 1;
                let operand = self.unary(active)?;
                let value = self.resolve_operand(operand, active)?;
                Ok(Operand::Num((value == 0) as i64))
            }
            Some(b'~') => {
                self.pos += 1;
                let operand = self.unary(active)?;
                Ok(Operand::Num(!self.resolve_operand(operand, active)?))
            }
            _ => self.primary(active),
        }
    }

    fn primary(&mut self, active: bool) -> Result<Operand, ArithError> {
        self.skip_ws();
        match self.peek() {
            None => Err(ArithError::Syntax("unexpected end of expression".into())),
            Some(b'(') => {
                self.pos += 1;
                let inner = self.comma(active)?;
                // A parenthesised expression is an rvalue, never an
                // assignment target.
                let value = self.resolve_operand(inner, active)?;
                self.skip_ws();
                if self.peek() != Some(b')') {
                    return Err(ArithError::Unbalanced);
                }
                self.pos += 1;
                Ok(Operand::Num(value))
            }
            Some(b) if b.is_ascii_digit() => self.number(),
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => {
                let start = self.pos;
                while self
                    .peek()
                    .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_')
                {
                    self.pos += 1;
                }
                let name = String::from_utf8_lossy(&self.src[start..self.pos]).into_owned();
                Ok(Operand::Var(name))
            }
            Some(b')') => Err(ArithError::Unbalanced),
            Some(b) => Err(ArithError::Syntax(format!(
                "unexpected `{}`",
                char::from(b)
            ))),
        }
    }

    fn number(&mut self) -> Result<Operand, ArithError> {
        let start = self.pos;
        let (radix, digits_start) = if self.peek() == Some(b'0')
            && matches!(self.peek_at(1), Some(b'x') | Some(b'X'))
        {
            (16, self.pos + 2)
        } else if self.peek() == Some(b'0') && self.peek_at(1).is_some_and(|b| b.is_ascii_digit())
        {
            (8, self.pos + 1)
        } else {
            (10, self.pos)
        };
        self.pos = digits_start;
        while self.peek().is_some_and(|b| b.is_ascii_alphanumeric()) {
            self.pos += 1;
        }
        let literal = std::str::from_utf8(&self.src[start..self.pos]).unwrap_or_default();
        let digits = std::str::from_utf8(&self.src[digits_start..self.pos]).unwrap_or_default();
        if digits.is_empty() {
            return Err(ArithError::BadNumber(literal.to_string()));
        }
        match i64::from_str_radix(digits, radix) {
            Ok(n) => Ok(Operand::Num(n)),
            Err(_) => Err(ArithError::BadNumber(literal.to_string())),
        }
    }
}

fn checked_div(left: i64, right: i64) -> Result<i64, ArithError> {
    if right == 0 {
        Err(ArithError::DivideByZero)
    } else {
        Ok(left.wrapping_div(right))
    }
}

fn checked_rem(left: i64, right: i64) -> Result<i64, ArithError> {
    if right == 0 {
        Err(ArithError::DivideByZero)
    } else {
        Ok(left.wrapping_rem(right))
    }
}

fn checked_shift(left: i64, count: i64, shift_left: bool) -> Result<i64, ArithError> {
    if !(0..64).contains(&count) {
        return Err(ArithError::BadShift(count));
    }
    Ok(if shift_left {
        left.wrapping_shl(count as u32)
    } else {
        left >> count
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn eval(expr: &str) -> Result<i64, ArithError> {
        let mut vars = VarStore::new();
        evaluate(expr, &mut vars)
    }

    #[test]
    fn precedence() {
        assert_eq!(eval("2+3*4"), Ok(14));
        assert_eq!(eval("(2+3)*4"), Ok(20));
        assert_eq!(eval("20-4/2"), Ok(18));
        assert_eq!(eval("1+2 == 3"), Ok(1));
        assert_eq!(eval("1 << 2 + 1"), Ok(8));
        assert_eq!(eval("7 & 3 | 4"), Ok(7));
        assert_eq!(eval("6 ^ 3"), Ok(5));
        assert_eq!(eval("1 < 2 == 2 < 3"), Ok(1));
    }

    #[test]
    fn unary_operators() {
        assert_eq!(eval("-5"), Ok(-5));
        assert_eq!(eval("+5"), Ok(5));
        assert_eq!(eval("!0"), Ok(1));
        assert_eq!(eval("!7"), Ok(0));
        assert_eq!(eval("~0"), Ok(-1));
        assert_eq!(eval("- -3"), Ok(3));
    }

    #[test]
    fn literals() {
        assert_eq!(eval("0"), Ok(0));
        assert_eq!(eval("010"), Ok(8));
        assert_eq!(eval("0x10"), Ok(16));
        assert_eq!(eval("0XfF"), Ok(255));
        assert_eq!(eval("08"), Err(ArithError::BadNumber("08".into())));
        assert_eq!(eval("0xzz"), Err(ArithError::BadNumber("0xzz".into())));
        assert!(matches!(
            eval("9223372036854775808"),
            Err(ArithError::BadNumber(_))
        ));
        assert_eq!(eval("9223372036854775807"), Ok(i64::MAX));
    }

    #[test]
    fn division_and_modulo_by_zero() {
        assert_eq!(eval("1/0"), Err(ArithError::DivideByZero));
        assert_eq!(eval("1%0"), Err(ArithError::DivideByZero));
        assert_eq!(eval("0/0"), Err(ArithError::DivideByZero));
        assert_eq!(eval("0%0"), Err(ArithError::DivideByZero));
    }

    #[test]
    fn shift_bounds() {
        assert_eq!(eval("1 << 0"), Ok(1));
        assert_eq!(eval("1 << 63"), Ok(i64::MIN));
        assert_eq!(eval("1 << 64"), Err(ArithError::BadShift(64)));
        assert_eq!(eval("1 >> -1"), Err(ArithError::BadShift(-1)));
        assert_eq!(eval("-8 >> 1"), Ok(-4));
    }

    #[test]
    fn short_circuit_skips_dead_branch() {
        assert_eq!(eval("1 || 1/0"), Ok(1));
        assert_eq!(eval("0 && 1/0"), Ok(0));
        assert_eq!(eval("1 ? 2 : 1/0"), Ok(2));
        assert_eq!(eval("0 ? 1/0 : 3"), Ok(3));
        // the live branch still fails
        assert_eq!(eval("0 || 1/0"), Err(ArithError::DivideByZero));
    }

    #[test]
    fn ternary_is_right_associative() {
        assert_eq!(eval("1 ? 2 : 0 ? 3 : 4"), Ok(2));
        assert_eq!(eval("0 ? 2 : 0 ? 3 : 4"), Ok(4));
        assert_eq!(eval("0 ? 2 : 1 ? 3 : 4"), Ok(3));
    }

    #[test]
    fn variables_read_and_write() {
        let mut vars = VarStore::new();
        assert_eq!(evaluate("x = 5", &mut vars), Ok(5));
        assert_eq!(vars.value("x"), Some("5"));
        assert_eq!(evaluate("x", &mut vars), Ok(5));
        assert_eq!(evaluate("x += 3", &mut vars), Ok(8));
        assert_eq!(evaluate("x <<= 2", &mut vars), Ok(32));
        assert_eq!(evaluate("x %= 5", &mut vars), Ok(2));
    }

    #[test]
    fn unset_and_empty_read_as_zero() {
        let mut vars = VarStore::new();
        assert_eq!(evaluate("missing + 1", &mut vars), Ok(1));
        vars.add("empty", Some(""), false, false).unwrap();
        assert_eq!(evaluate("empty + 1", &mut vars), Ok(1));
    }

    #[test]
    fn variable_values_expand_recursively() {
        let mut vars = VarStore::new();
        vars.add("a", Some("1+2"), false, false).unwrap();
        vars.add("b", Some("a"), false, false).unwrap();
        assert_eq!(evaluate("b + 3", &mut vars), Ok(6));
    }

    #[test]
    fn non_numeric_variable_is_error() {
        let mut vars = VarStore::new();
        vars.add("junk", Some("hello world"), false, false).unwrap();
        assert!(matches!(
            evaluate("junk + 1", &mut vars),
            Err(ArithError::Syntax(_))
        ));
    }

    #[test]
    fn self_referential_variable_is_error() {
        let mut vars = VarStore::new();
        vars.add("loop", Some("loop"), false, false).unwrap();
        assert_eq!(evaluate("loop", &mut vars), Err(ArithError::TooDeep));
    }

    #[test]
    fn assignment_targets_must_be_identifiers() {
        assert_eq!(eval("3 = 4"), Err(ArithError::NotAssignable));
        assert_eq!(eval("(x) = 4"), Err(ArithError::NotAssignable));
    }

    #[test]
    fn readonly_target_fails() {
        let mut vars = VarStore::new();
        vars.add("frozen", Some("1"), false, true).unwrap();
        assert_eq!(
            evaluate("frozen = 2", &mut vars),
            Err(ArithError::ReadOnly("frozen".into()))
        );
    }

    #[test]
    fn comma_evaluates_left_to_right() {
        let mut vars = VarStore::new();
        assert_eq!(evaluate("y=7, y+=3, y", &mut vars), Ok(10));
        assert_eq!(vars.value("y"), Some("10"));
    }

    #[test]
    fn assignment_is_right_associative() {
        let mut vars = VarStore::new();
        assert_eq!(evaluate("a = b = 4", &mut vars), Ok(4));
        assert_eq!(vars.value("a"), Some("4"));
        assert_eq!(vars.value("b"), Some("4"));
    }

    #[test]
    fn unbalanced_parentheses() {
        assert_eq!(eval("(1 + 2"), Err(ArithError::Unbalanced));
        assert_eq!(eval("1 + 2)"), Err(ArithError::Unbalanced));
        assert_eq!(eval(")"), Err(ArithError::Unbalanced));
    }

    #[test]
    fn syntax_errors() {
        assert!(matches!(eval(""), Ok(0)));
        assert!(matches!(eval("1 2"), Err(ArithError::Syntax(_))));
        assert!(matches!(eval("@"), Err(ArithError::Syntax(_))));
        assert!(matches!(eval("1 +"), Err(ArithError::Syntax(_))));
    }

    #[test]
    fn dead_branch_assignment_has_no_effect() {
        let mut vars = VarStore::new();
        assert_eq!(evaluate("0 ? (z = 9) : 1", &mut vars), Ok(1));
        assert_eq!(vars.value("z"), None);
    }
}
