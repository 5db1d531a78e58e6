//! Boolean expression evaluator for code controls.
//!
//! Deliberately minimal. Supported: dotted field access resolved against
//! the exposure-namespace snapshot (`form1.disabled`, `loading`),
//! comparisons (`==`, `!=`, `>`, `<`, `>=`, `<=`), logical `&&`/`||`/`!`,
//! and string / number / bool / null literals. Missing fields resolve to
//! null and compare false rather than erroring, so a half-built
//! application stays editable.
//!
//! Explicitly out of scope: array indexing, arithmetic, string methods,
//! function calls, ternary.

use serde_json::Value;
use thiserror::Error;

/// Errors from expression evaluation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExprError {
    #[error("parse error: {message}")]
    Parse { message: String },
}

/// Evaluate `code` against `ctx` (the exposure-namespace snapshot),
/// coercing the result to a boolean.
pub fn evaluate(code: &str, ctx: &Value) -> Result<bool, ExprError> {
    let tokens = lex(code)?;
    if tokens.is_empty() {
        return Err(ExprError::Parse {
            message: "empty expression".into(),
        });
    }
    let mut parser = Parser { tokens, pos: 0 };
    let result = parser.or_expr(ctx)?;
    if parser.pos != parser.tokens.len() {
        return Err(ExprError::Parse {
            message: format!("unexpected trailing token: {:?}", parser.tokens[parser.pos]),
        });
    }
    Ok(result.truthy())
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Path(String),
    Str(String),
    Num(f64),
    Bool(bool),
    Null,
    Op(Op),
    And,
    Or,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

fn lex(input: &str) -> Result<Vec<Token>, ExprError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            ' ' | '\t' | '\r' | '\n' => i += 1,
            '=' if next == Some('=') => {
                tokens.push(Token::Op(Op::Eq));
                i += 2;
            }
            '!' if next == Some('=') => {
                tokens.push(Token::Op(Op::Ne));
                i += 2;
            }
            '!' => {
                tokens.push(Token::Not);
                i += 1;
            }
            '>' | '<' => {
                let op = match (c, next) {
                    ('>', Some('=')) => Op::Ge,
                    ('<', Some('=')) => Op::Le,
                    ('>', _) => Op::Gt,
                    _ => Op::Lt,
                };
                i += if next == Some('=') { 2 } else { 1 };
                tokens.push(Token::Op(op));
            }
            '&' if next == Some('&') => {
                tokens.push(Token::And);
                i += 2;
            }
            '|' if next == Some('|') => {
                tokens.push(Token::Or);
                i += 2;
            }
            '"' | '\'' => {
                let quote = c;
                i += 1;
                let start = i;
                while i < chars.len() && chars[i] != quote {
                    i += 1;
                }
                if i >= chars.len() {
                    return Err(ExprError::Parse {
                        message: "unterminated string literal".into(),
                    });
                }
                tokens.push(Token::Str(chars[start..i].iter().collect()));
                i += 1;
            }
            _ if c.is_ascii_digit()
                || (c == '-' && next.is_some_and(|n| n.is_ascii_digit())) =>
            {
                let start = i;
                i += 1;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let num = text.parse().map_err(|_| ExprError::Parse {
                    message: format!("invalid number: {text}"),
                })?;
                tokens.push(Token::Num(num));
            }
            _ if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == '.')
                {
                    i += 1;
                }
                let ident: String = chars[start..i].iter().collect();
                tokens.push(match ident.as_str() {
                    "true" => Token::Bool(true),
                    "false" => Token::Bool(false),
                    "null" => Token::Null,
                    _ => Token::Path(ident),
                });
            }
            other => {
                return Err(ExprError::Parse {
                    message: format!("unexpected character: {other}"),
                });
            }
        }
    }
    Ok(tokens)
}

// ---------------------------------------------------------------------------
// Parser — precedence: ! > comparison > && > ||
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Operand {
    Bool(bool),
    Num(f64),
    Str(String),
    Null,
    Composite(Value),
}

impl Operand {
    fn truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Num(n) => *n != 0.0,
            Self::Str(s) => !s.is_empty(),
            Self::Null => false,
            Self::Composite(Value::Null) => false,
            Self::Composite(Value::Bool(b)) => *b,
            Self::Composite(_) => true,
        }
    }

    fn number(&self) -> Option<f64> {
        match self {
            Self::Num(n) => Some(*n),
            Self::Composite(Value::Number(n)) => n.as_f64(),
            _ => None,
        }
    }

    fn text(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::Composite(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    fn is_null(&self) -> bool {
        matches!(self, Self::Null | Self::Composite(Value::Null))
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn or_expr(&mut self, ctx: &Value) -> Result<Operand, ExprError> {
        let mut left = self.and_expr(ctx)?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            let right = self.and_expr(ctx)?;
            left = Operand::Bool(left.truthy() || right.truthy());
        }
        Ok(left)
    }

    fn and_expr(&mut self, ctx: &Value) -> Result<Operand, ExprError> {
        let mut left = self.not_expr(ctx)?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            let right = self.not_expr(ctx)?;
            left = Operand::Bool(left.truthy() && right.truthy());
        }
        Ok(left)
    }

    fn not_expr(&mut self, ctx: &Value) -> Result<Operand, ExprError> {
        if self.peek() == Some(&Token::Not) {
            self.pos += 1;
            let inner = self.not_expr(ctx)?;
            return Ok(Operand::Bool(!inner.truthy()));
        }
        self.comparison(ctx)
    }

    fn comparison(&mut self, ctx: &Value) -> Result<Operand, ExprError> {
        let left = self.operand(ctx)?;
        let op = match self.peek() {
            Some(Token::Op(op)) => *op,
            _ => return Ok(left),
        };
        self.pos += 1;
        let right = self.operand(ctx)?;
        Ok(Operand::Bool(compare(&left, &right, op)))
    }

    fn operand(&mut self, ctx: &Value) -> Result<Operand, ExprError> {
        let token = self.peek().cloned().ok_or_else(|| ExprError::Parse {
            message: "unexpected end of expression".into(),
        })?;
        self.pos += 1;
        match token {
            Token::Str(s) => Ok(Operand::Str(s)),
            Token::Num(n) => Ok(Operand::Num(n)),
            Token::Bool(b) => Ok(Operand::Bool(b)),
            Token::Null => Ok(Operand::Null),
            Token::Path(path) => Ok(resolve(ctx, &path)),
            other => Err(ExprError::Parse {
                message: format!("expected value, got {other:?}"),
            }),
        }
    }
}

fn compare(left: &Operand, right: &Operand, op: Op) -> bool {
    if left.is_null() || right.is_null() {
        let both = left.is_null() && right.is_null();
        return match op {
            Op::Eq => both,
            Op::Ne => !both,
            _ => false,
        };
    }
    if let (Some(l), Some(r)) = (left.number(), right.number()) {
        return match op {
            Op::Eq => (l - r).abs() < f64::EPSILON,
            Op::Ne => (l - r).abs() >= f64::EPSILON,
            Op::Gt => l > r,
            Op::Lt => l < r,
            Op::Ge => l >= r,
            Op::Le => l <= r,
        };
    }
    if let (Some(l), Some(r)) = (left.text(), right.text()) {
        return match op {
            Op::Eq => l == r,
            Op::Ne => l != r,
            Op::Gt => l > r,
            Op::Lt => l < r,
            Op::Ge => l >= r,
            Op::Le => l <= r,
        };
    }
    if let (Operand::Bool(l), Operand::Bool(r)) = (left, right) {
        return match op {
            Op::Eq => l == r,
            Op::Ne => l != r,
            _ => false,
        };
    }
    // Type mismatch compares false for every operator.
    false
}

/// Resolve a dotted path against the namespace snapshot. Missing segments
/// yield null.
fn resolve(ctx: &Value, path: &str) -> Operand {
    let mut current = ctx;
    for segment in path.split('.') {
        match current.get(segment) {
            Some(v) => current = v,
            None => return Operand::Null,
        }
    }
    match current {
        Value::Null => Operand::Null,
        Value::Bool(b) => Operand::Bool(*b),
        Value::Number(n) => Operand::Num(n.as_f64().unwrap_or(0.0)),
        Value::String(s) => Operand::Str(s.clone()),
        other => Operand::Composite(other.clone()),
    }
}
