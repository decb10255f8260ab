//! Safe calculator tool.
//!
//! Input is normalized (percent phrases rewritten), checked against a
//! character allow-list, then evaluated by a small recursive-descent parser
//! supporting `+ - * /`, parentheses, unary signs, and a postfix percent
//! literal (`x%` is `x / 100`). Nothing is ever handed to a host evaluator.

use std::fmt;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use super::traits::{str_arg, Tool, ToolError};

/// Maximum nesting of parentheses and unary signs.
pub const MAX_DEPTH: usize = 64;

/// `<int> % * <int>` as a whole expression.
static STRICT_PERCENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s*%\s*\*\s*(\d+)$").expect("strict percent pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("expression is empty")]
    Empty,

    #[error("unsupported character '{0}' in expression")]
    UnsupportedCharacter(char),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("missing closing parenthesis")]
    UnclosedParen,

    #[error("division by zero")]
    DivisionByZero,

    #[error("arithmetic overflow")]
    Overflow,

    #[error("expression nested deeper than {0} levels")]
    TooDeep(usize),
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Lower-case, trim, and rewrite the percent phrases into plain arithmetic.
pub fn normalize(expression: &str) -> String {
    let expr = expression.trim().to_lowercase().replace("% of", "/100 *");

    match STRICT_PERCENT.captures(&expr) {
        Some(caps) => format!("({}/100)*{}", &caps[1], &caps[2]),
        None => expr,
    }
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_digit() || c.is_whitespace() || "+-*/().%".contains(c)
}

/// Reject the expression if it contains anything outside the allow-list.
pub fn check_allowed(expr: &str) -> Result<(), CalcError> {
    match expr.chars().find(|c| !is_allowed(*c)) {
        Some(c) => Err(CalcError::UnsupportedCharacter(c)),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
        }
    }
}

fn lex(input: &str) -> Result<Vec<Token>, CalcError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&ch) = chars.peek() {
        let token = match ch {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        literal.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| CalcError::InvalidNumber(literal.clone()))?;
                tokens.push(Token::Number(value));
                continue;
            }
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '%' => Token::Percent,
            '(' => Token::LParen,
            ')' => Token::RParen,
            other => return Err(CalcError::UnsupportedCharacter(other)),
        };
        tokens.push(token);
        chars.next();
    }

    Ok(tokens)
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn descend(&mut self) -> Result<(), CalcError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(CalcError::TooDeep(MAX_DEPTH));
        }
        Ok(())
    }

    /// expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<f64, CalcError> {
        let mut left = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    left = finite(left + self.term()?)?;
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    left = finite(left - self.term()?)?;
                }
                _ => return Ok(left),
            }
        }
    }

    /// term := unary (('*' | '/') unary)*
    fn term(&mut self) -> Result<f64, CalcError> {
        let mut left = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    left = finite(left * self.unary()?)?;
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    let right = self.unary()?;
                    if right == 0.0 {
                        return Err(CalcError::DivisionByZero);
                    }
                    left = finite(left / right)?;
                }
                _ => return Ok(left),
            }
        }
    }

    /// unary := ('-' | '+') unary | postfix
    fn unary(&mut self) -> Result<f64, CalcError> {
        match self.peek() {
            Some(Token::Minus) | Some(Token::Plus) => {
                let negate = self.peek() == Some(&Token::Minus);
                self.pos += 1;
                self.descend()?;
                let value = self.unary()?;
                self.depth -= 1;
                Ok(if negate { -value } else { value })
            }
            _ => self.postfix(),
        }
    }

    /// postfix := primary '%'*
    fn postfix(&mut self) -> Result<f64, CalcError> {
        let mut value = self.primary()?;
        while self.peek() == Some(&Token::Percent) {
            self.pos += 1;
            value /= 100.0;
        }
        Ok(value)
    }

    /// primary := number | '(' expr ')'
    fn primary(&mut self) -> Result<f64, CalcError> {
        let token = self.peek().cloned().ok_or(CalcError::UnexpectedEnd)?;
        match token {
            Token::Number(n) => {
                self.pos += 1;
                Ok(n)
            }
            Token::LParen => {
                self.pos += 1;
                self.descend()?;
                let value = self.expr()?;
                if self.peek() != Some(&Token::RParen) {
                    return Err(CalcError::UnclosedParen);
                }
                self.pos += 1;
                self.depth -= 1;
                Ok(value)
            }
            other => Err(CalcError::UnexpectedToken(other.to_string())),
        }
    }
}

fn finite(value: f64) -> Result<f64, CalcError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::Overflow)
    }
}

/// Normalize, validate, and evaluate an arithmetic expression.
pub fn evaluate(expression: &str) -> Result<f64, CalcError> {
    let normalized = normalize(expression);
    debug!("Normalized expression: {}", normalized);
    check_allowed(&normalized)?;

    let tokens = lex(&normalized)?;
    if tokens.is_empty() {
        return Err(CalcError::Empty);
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if let Some(extra) = parser.peek() {
        return Err(CalcError::UnexpectedToken(extra.to_string()));
    }
    finite(value)
}

/// Render a result without float noise: integers print bare, everything else
/// is rounded to 10 decimals with trailing zeros removed.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    let fixed = format!("{:.10}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculate"
    }

    fn description(&self) -> &str {
        "Evaluate an arithmetic expression. Supports + - * /, parentheses, \
         percentages like '15% of 2500', and '69% * 69'."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "The arithmetic expression to evaluate."
                }
            },
            "required": ["expression"]
        })
    }

    async fn execute(&self, args: &serde_json::Value) -> Result<String, ToolError> {
        let expression = str_arg(args, "expression");
        let value = evaluate(expression)?;
        Ok(format!(
            "The result of {} is {}.",
            expression.trim(),
            format_number(value)
        ))
    }
}
