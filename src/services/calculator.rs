//! Calculator module for evaluating math expressions
//!
//! Input is first reduced to the characters `[0-9+-*/().%]` and then parsed by
//! a small recursive-descent parser. Nothing else is ever evaluated.

use thiserror::Error;

use super::format::{self, NumberLocale};

/// A successfully evaluated expression
#[derive(Debug, Clone, PartialEq)]
pub struct Calculation {
    /// The sanitized expression that was evaluated
    pub expression: String,
    pub value: f64,
    /// Plain value, copied to the clipboard on commit
    pub raw: String,
    /// Locale-grouped value for display
    pub display: String,
}

#[derive(Debug, Error, PartialEq)]
enum ParseError {
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unexpected character '{0}' at {1}")]
    Unexpected(char, usize),
    #[error("malformed number at {0}")]
    BadNumber(usize),
    #[error("expression nested too deeply")]
    TooDeep,
}

/// Deepest run of parentheses and unary signs the parser will follow.
const MAX_DEPTH: usize = 64;

/// Normalize an input string into a bare arithmetic expression.
///
/// `×`, `x` and `X` become `*`, `÷` becomes `/`, the locale decimal comma becomes
/// `.`, and every character outside `[0-9+-*/().%]` (whitespace included) is dropped.
pub fn sanitize(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '×' | 'x' | 'X' => '*',
            '÷' => '/',
            ',' => '.',
            other => other,
        })
        .filter(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '*' | '/' | '(' | ')' | '.' | '%'))
        .collect()
}

/// Evaluate a math expression and return the result
/// Returns None if the expression is invalid or not a math expression
pub fn evaluate(expr: &str) -> Option<f64> {
    let sanitized = sanitize(expr);

    // Must contain at least one digit
    if !sanitized.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    match Parser::new(&sanitized).parse() {
        // Filter out NaN and infinity
        Ok(result) if result.is_finite() => Some(result),
        _ => None,
    }
}

/// Sanitize, evaluate and format an expression in one step
pub fn calculate(input: &str, locale: NumberLocale) -> Option<Calculation> {
    let value = evaluate(input)?;
    Some(Calculation {
        expression: sanitize(input),
        value,
        raw: format_result(value),
        display: format::format_grouped(value, locale),
    })
}

/// Format a result for display
/// Removes unnecessary decimal places (e.g., 4.0 -> "4")
pub fn format_result(value: f64) -> String {
    format::format_number(value)
}

/// expr   := term (('+' | '-') term)*
/// term   := unary (('*' | '/' | '%') unary)*
/// unary  := ('+' | '-') unary | atom
/// atom   := number | '(' expr ')'
struct Parser<'a> {
    src: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src: src.as_bytes(),
            pos: 0,
            depth: 0,
        }
    }

    fn parse(mut self) -> Result<f64, ParseError> {
        let value = self.expr()?;
        match self.peek() {
            None => Ok(value),
            Some(c) => Err(ParseError::Unexpected(c as char, self.pos)),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn expr(&mut self) -> Result<f64, ParseError> {
        let mut value = self.term()?;
        while let Some(op @ (b'+' | b'-')) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == b'+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, ParseError> {
        let mut value = self.unary()?;
        while let Some(op @ (b'*' | b'/' | b'%')) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            value = match op {
                b'*' => value * rhs,
                b'/' => value / rhs,
                _ => value % rhs,
            };
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<f64, ParseError> {
        match self.peek() {
            Some(b'-') => {
                self.pos += 1;
                Ok(-self.nested(Self::unary)?)
            }
            Some(b'+') => {
                self.pos += 1;
                self.nested(Self::unary)
            }
            _ => self.atom(),
        }
    }

    /// Recurse one level down, bounded by `MAX_DEPTH` so pasted input cannot
    /// exhaust the stack
    fn nested(&mut self, rule: fn(&mut Self) -> Result<f64, ParseError>) -> Result<f64, ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::TooDeep);
        }
        self.depth += 1;
        let value = rule(self);
        self.depth -= 1;
        value
    }

    fn atom(&mut self) -> Result<f64, ParseError> {
        match self.peek() {
            None => Err(ParseError::UnexpectedEnd),
            Some(b'(') => {
                self.pos += 1;
                let value = self.nested(Self::expr)?;
                match self.peek() {
                    Some(b')') => {
                        self.pos += 1;
                        Ok(value)
                    }
                    Some(c) => Err(ParseError::Unexpected(c as char, self.pos)),
                    None => Err(ParseError::UnexpectedEnd),
                }
            }
            Some(c) if c.is_ascii_digit() || c == b'.' => self.number(),
            Some(c) => Err(ParseError::Unexpected(c as char, self.pos)),
        }
    }

    fn number(&mut self) -> Result<f64, ParseError> {
        let start = self.pos;
        let mut seen_dot = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.pos += 1;
            } else if c == b'.' && !seen_dot {
                seen_dot = true;
                self.pos += 1;
            } else {
                break;
            }
        }

        // Only ASCII digits and '.' were consumed
        let literal = std::str::from_utf8(&self.src[start..self.pos])
            .map_err(|_| ParseError::BadNumber(start))?;
        if literal == "." {
            return Err(ParseError::BadNumber(start));
        }
        literal.parse().map_err(|_| ParseError::BadNumber(start))
    }
}
