//! Arithmetic expression evaluation for shell-style `$(( ))` expressions.
//!
//! Supports:
//! - Integer arithmetic: `+`, `-`, `*`, `/`, `%`
//! - Comparisons: `==`, `!=`, `<`, `<=`, `>`, `>=` (yield 1 or 0)
//! - Parentheses for grouping: `(expr)`
//! - Variable references: `$VAR`, `${VAR}`, bare `VAR`, dotted `VAR.SYMBOL`
//! - Enum constants: a bare name that is not a variable is looked up in the
//!   type of the enum variable read most recently, so `c == blue` works
//!
//! Typed variables contribute their numeric reading (an enum's ordinal).

use anyhow::{Context, Result, bail};

use crate::interpreter::{Scope, Variable};

/// Evaluate an arithmetic expression string.
///
/// The expression should be the content between `$((` and `))`.
pub fn eval_arithmetic(expr: &str, scope: &Scope) -> Result<i64> {
    let mut parser = ArithParser::new(expr, scope);
    let result = parser.parse_comparison()?;
    parser.expect_end()?;
    Ok(result)
}

/// Recursive descent parser for arithmetic expressions.
struct ArithParser<'a> {
    input: &'a str,
    pos: usize,
    scope: &'a Scope,
    /// Enum variable read most recently, for resolving constants.
    last_enum: Option<&'a Variable>,
}

impl<'a> ArithParser<'a> {
    fn new(input: &'a str, scope: &'a Scope) -> Self {
        Self {
            input,
            pos: 0,
            scope,
            last_enum: None,
        }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.input.len() {
            let ch = self.input.as_bytes()[self.pos];
            if ch == b' ' || ch == b'\t' || ch == b'\n' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        self.skip_whitespace();
        let ch = self.input[self.pos..].chars().next()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    /// Consume `op` if the input continues with it.
    fn eat(&mut self, op: &str) -> bool {
        self.skip_whitespace();
        if self.input[self.pos..].starts_with(op) {
            self.pos += op.len();
            true
        } else {
            false
        }
    }

    fn expect_end(&mut self) -> Result<()> {
        self.skip_whitespace();
        if self.pos < self.input.len() {
            bail!(
                "unexpected characters at end of arithmetic expression: {:?}",
                &self.input[self.pos..]
            );
        }
        Ok(())
    }

    /// Comparisons bind loosest.
    fn parse_comparison(&mut self) -> Result<i64> {
        let mut left = self.parse_expr()?;
        loop {
            let holds = if self.eat("==") {
                left == self.parse_expr()?
            } else if self.eat("!=") {
                left != self.parse_expr()?
            } else if self.eat("<=") {
                left <= self.parse_expr()?
            } else if self.eat(">=") {
                left >= self.parse_expr()?
            } else if self.eat("<") {
                left < self.parse_expr()?
            } else if self.eat(">") {
                left > self.parse_expr()?
            } else {
                break;
            };
            left = i64::from(holds);
        }
        Ok(left)
    }

    /// Parse an expression: handles + and -
    fn parse_expr(&mut self) -> Result<i64> {
        let mut left = self.parse_term()?;

        loop {
            match self.peek() {
                Some('+') => {
                    self.advance();
                    let right = self.parse_term()?;
                    left = left.checked_add(right).context("arithmetic overflow in addition")?;
                }
                Some('-') => {
                    self.advance();
                    let right = self.parse_term()?;
                    left = left.checked_sub(right).context("arithmetic overflow in subtraction")?;
                }
                _ => break,
            }
        }

        Ok(left)
    }

    /// Parse a term: handles * / %
    fn parse_term(&mut self) -> Result<i64> {
        let mut left = self.parse_unary()?;

        loop {
            match self.peek() {
                Some('*') => {
                    self.advance();
                    let right = self.parse_unary()?;
                    left = left.checked_mul(right).context("arithmetic overflow in multiplication")?;
                }
                Some('/') => {
                    self.advance();
                    let right = self.parse_unary()?;
                    if right == 0 {
                        bail!("division by zero");
                    }
                    left = left.checked_div(right).context("arithmetic overflow in division")?;
                }
                Some('%') => {
                    self.advance();
                    let right = self.parse_unary()?;
                    if right == 0 {
                        bail!("modulo by zero");
                    }
                    left = left.checked_rem(right).context("arithmetic overflow in modulo")?;
                }
                _ => break,
            }
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<i64> {
        match self.peek() {
            Some('+') => {
                self.advance();
                self.parse_unary()
            }
            Some('-') => {
                self.advance();
                let val = self.parse_unary()?;
                val.checked_neg().context("arithmetic overflow in negation")
            }
            Some('!') if !self.input[self.pos..].starts_with("!=") => {
                self.advance();
                let val = self.parse_unary()?;
                Ok(i64::from(val == 0))
            }
            _ => self.parse_primary(),
        }
    }

    /// Numbers, variables, parenthesized expressions.
    fn parse_primary(&mut self) -> Result<i64> {
        match self.peek() {
            Some('(') => {
                self.advance();
                let val = self.parse_comparison()?;
                match self.peek() {
                    Some(')') => {
                        self.advance();
                        Ok(val)
                    }
                    _ => bail!("expected ')' in arithmetic expression"),
                }
            }
            Some('$') => {
                self.advance();
                let name = if self.peek() == Some('{') {
                    self.advance();
                    let name = self.parse_name()?;
                    if self.peek() != Some('}') {
                        bail!("expected '}}' after variable name in arithmetic");
                    }
                    self.advance();
                    name
                } else {
                    self.parse_name()?
                };
                self.name_value(name)
            }
            Some(c) if c.is_ascii_digit() => self.parse_number(),
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                let name = self.parse_name()?;
                self.name_value(name)
            }
            Some(c) => bail!("unexpected character in arithmetic expression: {:?}", c),
            None => bail!("unexpected end of arithmetic expression"),
        }
    }

    fn parse_number(&mut self) -> Result<i64> {
        let start = self.pos;
        while self.pos < self.input.len() && self.input.as_bytes()[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        let num_str = &self.input[start..self.pos];
        num_str.parse().context("invalid number in arithmetic expression")
    }

    /// Identifier with optional `.child` parts.
    fn parse_name(&mut self) -> Result<&'a str> {
        self.skip_whitespace();
        let input = self.input;
        let start = self.pos;
        while self.pos < input.len() {
            let ch = input.as_bytes()[self.pos];
            if ch.is_ascii_alphanumeric() || ch == b'_' || (ch == b'.' && self.pos > start) {
                self.pos += 1;
            } else {
                break;
            }
        }
        if start == self.pos {
            bail!("expected identifier in arithmetic expression");
        }
        Ok(&input[start..self.pos])
    }

    fn name_value(&mut self, name: &'a str) -> Result<i64> {
        let scope = self.scope;
        if let Some((root, symbol)) = name.split_once('.') {
            let Some(var) = scope.get(root) else {
                bail!("{root}: no such variable");
            };
            let child = var.child(symbol)?;
            return numeric(&child, name);
        }
        if let Some(var) = scope.get(name) {
            if var.discipline().is_some() {
                self.last_enum = Some(var);
            }
            return numeric(var, name);
        }
        if let Some(owner) = self.last_enum {
            let constant = owner.child(name)?;
            return numeric(&constant, name);
        }
        // unset variables are 0
        Ok(0)
    }
}

fn numeric(var: &Variable, name: &str) -> Result<i64> {
    match var.numeric() {
        Some(n) => Ok(n as i64),
        None => bail!("variable '{}' has non-numeric value: {:?}", name, var.get()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EnumDescriptor, EnumDiscipline};
    use kornel_types::Value;

    fn eval(expr: &str) -> i64 {
        let scope = Scope::new();
        eval_arithmetic(expr, &scope).expect("eval should succeed")
    }

    fn color_scope() -> Scope {
        let mut scope = Scope::new();
        let colors = ["red", "green", "blue"].map(String::from).to_vec();
        let discipline = EnumDiscipline::new(EnumDescriptor::new("Color", colors, false).unwrap());
        let var = discipline.instance("c", Some("green")).unwrap();
        scope.declare(var);
        scope
    }

    #[test]
    fn precedence_and_grouping() {
        assert_eq!(eval("2 + 3 * 4"), 14);
        assert_eq!(eval("10 - 6 / 2"), 7);
        assert_eq!(eval("(2 + 3) * 4"), 20);
        assert_eq!(eval("(1 + 2) * (3 + 4) - 5"), 16);
        assert_eq!(eval("17 % 5"), 2);
    }

    #[test]
    fn unary() {
        assert_eq!(eval("-5"), -5);
        assert_eq!(eval("10 + -3"), 7);
        assert_eq!(eval("--5"), 5);
        assert_eq!(eval("!0"), 1);
        assert_eq!(eval("!7"), 0);
    }

    #[test]
    fn comparisons() {
        assert_eq!(eval("1 < 2"), 1);
        assert_eq!(eval("2 <= 1"), 0);
        assert_eq!(eval("3 == 1 + 2"), 1);
        assert_eq!(eval("3 != 3"), 0);
        assert_eq!(eval("(2 > 1) + (2 >= 2)"), 2);
    }

    #[test]
    fn variables() {
        let mut scope = Scope::new();
        scope.set("X", Value::Int(10));
        scope.set("S", Value::from(" 7 "));
        assert_eq!(eval_arithmetic("$X + ${X} + X", &scope).unwrap(), 30);
        assert_eq!(eval_arithmetic("S * 2", &scope).unwrap(), 14);
        assert_eq!(eval_arithmetic("UNDEFINED + 1", &scope).unwrap(), 1);
    }

    #[test]
    fn non_numeric_variable_is_an_error() {
        let mut scope = Scope::new();
        scope.set("W", Value::from("word"));
        assert!(eval_arithmetic("W + 1", &scope).is_err());
    }

    #[test]
    fn division_by_zero() {
        let scope = Scope::new();
        assert!(eval_arithmetic("10 / 0", &scope).is_err());
        assert!(eval_arithmetic("10 % 0", &scope).is_err());
    }

    #[test]
    fn enum_ordinals_and_constants() {
        let scope = color_scope();
        assert_eq!(eval_arithmetic("c", &scope).unwrap(), 1);
        assert_eq!(eval_arithmetic("c.blue", &scope).unwrap(), 2);
        assert_eq!(eval_arithmetic("c == green", &scope).unwrap(), 1);
        assert_eq!(eval_arithmetic("c < blue", &scope).unwrap(), 1);
        assert!(eval_arithmetic("c == purple", &scope).is_err());
        assert!(eval_arithmetic("c.purple", &scope).is_err());
    }
}
