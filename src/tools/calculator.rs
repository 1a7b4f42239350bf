//! `calculate`: a restricted arithmetic evaluator.
//!
//! The grammar is deliberately tiny:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | primary
//! primary := NUMBER | '(' expr ')'
//! NUMBER  := DIGIT* ('.' DIGIT*)?   (at least one digit)
//! ```
//!
//! Input is screened character by character before tokenising; anything
//! outside digits, `.`, the four operators, parentheses and whitespace is
//! rejected without being interpreted.

use std::fmt;

use thiserror::Error;

use crate::registry::{Arguments, InputSchema, ParamSpec, ToolDescriptor, ToolEntry};
use crate::tools::{format_number, str_arg, ToolFault};

/// Longest accepted expression, in bytes.
pub const MAX_EXPRESSION_LEN: usize = 1024;

/// Deepest accepted nesting of parentheses and unary signs.
pub const MAX_DEPTH: usize = 64;

/// Why an expression could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    /// Nothing but whitespace.
    #[error("expression is empty")]
    Empty,

    /// Input exceeds [`MAX_EXPRESSION_LEN`].
    #[error("expression is longer than {} bytes", MAX_EXPRESSION_LEN)]
    TooLong,

    /// A character outside the grammar.
    #[error("invalid character '{ch}' at position {pos}")]
    InvalidCharacter {
        /// The offending character.
        ch: char,
        /// Byte offset.
        pos: usize,
    },

    /// A numeric literal that does not parse.
    #[error("malformed number '{text}' at position {pos}")]
    BadNumber {
        /// Literal text.
        text: String,
        /// Byte offset.
        pos: usize,
    },

    /// A token where it is not allowed.
    #[error("unexpected {found} at position {pos}")]
    Unexpected {
        /// Description of what was found.
        found: String,
        /// Byte offset.
        pos: usize,
    },

    /// An opening parenthesis is never closed.
    #[error("unclosed parenthesis opened at position {pos}")]
    Unclosed {
        /// Byte offset of the `(`.
        pos: usize,
    },

    /// Nesting exceeds [`MAX_DEPTH`].
    #[error("expression nested deeper than {} levels", MAX_DEPTH)]
    TooDeep,

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// A literal or intermediate result overflowed to infinity or NaN.
    #[error("result is not a finite number")]
    NonFinite,
}

/// Registers the `calculate` tool.
#[must_use]
pub fn calculate() -> ToolEntry {
    ToolEntry {
        descriptor: ToolDescriptor {
            name: "calculate".to_string(),
            description: "Evaluates an arithmetic expression using numbers, + - * / and parentheses"
                .to_string(),
            input_schema: InputSchema::new().param(
                ParamSpec::string("expression")
                    .required()
                    .describe("Expression to evaluate, e.g. 2 + 2 or 10 * (5 - 3)"),
            ),
        },
        handler: run_calculate,
    }
}

fn run_calculate(args: &Arguments) -> Result<String, ToolFault> {
    let expression = str_arg(args, "expression")?;
    let value = evaluate(expression)?;
    Ok(format_number(value))
}

/// Evaluates an arithmetic expression.
///
/// # Errors
///
/// Returns a [`CalcError`] for input outside the grammar, division by zero,
/// or a non-finite result.
pub fn evaluate(expression: &str) -> Result<f64, CalcError> {
    if expression.len() > MAX_EXPRESSION_LEN {
        return Err(CalcError::TooLong);
    }

    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(CalcError::Empty);
    }

    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        depth: 0,
        end: expression.len(),
    };
    let value = parser.expr()?;

    if let Some(&(token, pos)) = parser.peek() {
        return Err(CalcError::Unexpected {
            found: token.to_string(),
            pos,
        });
    }

    finite(value)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Open,
    Close,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "number {n}"),
            Self::Plus => f.write_str("'+'"),
            Self::Minus => f.write_str("'-'"),
            Self::Star => f.write_str("'*'"),
            Self::Slash => f.write_str("'/'"),
            Self::Open => f.write_str("'('"),
            Self::Close => f.write_str("')'"),
        }
    }
}

fn allowed(ch: char) -> bool {
    matches!(ch, '0'..='9' | '.' | '+' | '-' | '*' | '/' | '(' | ')') || ch.is_whitespace()
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, CalcError> {
    if let Some((pos, ch)) = input.char_indices().find(|&(_, ch)| !allowed(ch)) {
        return Err(CalcError::InvalidCharacter { ch, pos });
    }

    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        let token = match b {
            b'+' => Token::Plus,
            b'-' => Token::Minus,
            b'*' => Token::Star,
            b'/' => Token::Slash,
            b'(' => Token::Open,
            b')' => Token::Close,
            b'0'..=b'9' | b'.' => {
                let start = i;
                while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                    i += 1;
                }
                let text = &input[start..i];
                tokens.push((Token::Num(parse_number(text, start)?), start));
                continue;
            }
            // Screened above: only whitespace remains
            _ => {
                i += input[i..].chars().next().map_or(1, char::len_utf8);
                continue;
            }
        };
        tokens.push((token, i));
        i += 1;
    }

    Ok(tokens)
}

fn parse_number(text: &str, pos: usize) -> Result<f64, CalcError> {
    let bad = || CalcError::BadNumber {
        text: text.to_string(),
        pos,
    };

    if text.matches('.').count() > 1 || !text.bytes().any(|b| b.is_ascii_digit()) {
        return Err(bad());
    }
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(bad()),
    }
}

fn finite(value: f64) -> Result<f64, CalcError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::NonFinite)
    }
}

struct Parser<'a> {
    tokens: &'a [(Token, usize)],
    pos: usize,
    depth: usize,
    end: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&(Token, usize)> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<(Token, usize)> {
        let token = self.tokens.get(self.pos).copied();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn descend(&mut self) -> Result<(), CalcError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(CalcError::TooDeep);
        }
        Ok(())
    }

    fn expr(&mut self) -> Result<f64, CalcError> {
        let mut value = self.term()?;
        while let Some(&(op @ (Token::Plus | Token::Minus), _)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = finite(if op == Token::Plus {
                value + rhs
            } else {
                value - rhs
            })?;
        }
        Ok(value)
    }

    #[allow(clippy::float_cmp)] // only exact zero is a division error
    fn term(&mut self) -> Result<f64, CalcError> {
        let mut value = self.unary()?;
        while let Some(&(op @ (Token::Star | Token::Slash), _)) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            if op == Token::Slash && rhs == 0.0 {
                return Err(CalcError::DivisionByZero);
            }
            value = finite(if op == Token::Star {
                value * rhs
            } else {
                value / rhs
            })?;
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<f64, CalcError> {
        match self.peek() {
            Some(&(Token::Minus, _)) => {
                self.pos += 1;
                self.descend()?;
                let value = self.unary()?;
                self.depth -= 1;
                Ok(-value)
            }
            Some(&(Token::Plus, _)) => {
                self.pos += 1;
                self.descend()?;
                let value = self.unary()?;
                self.depth -= 1;
                Ok(value)
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<f64, CalcError> {
        match self.bump() {
            Some((Token::Num(n), _)) => Ok(n),
            Some((Token::Open, open_pos)) => {
                self.descend()?;
                let value = self.expr()?;
                match self.bump() {
                    Some((Token::Close, _)) => {
                        self.depth -= 1;
                        Ok(value)
                    }
                    Some((token, pos)) => Err(CalcError::Unexpected {
                        found: token.to_string(),
                        pos,
                    }),
                    None => Err(CalcError::Unclosed { pos: open_pos }),
                }
            }
            Some((token, pos)) => Err(CalcError::Unexpected {
                found: token.to_string(),
                pos,
            }),
            None => Err(CalcError::Unexpected {
                found: "end of expression".to_string(),
                pos: self.end,
            }),
        }
    }
}
