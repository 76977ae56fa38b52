//! A tiny arithmetic-expression compiler for severity metrics.
//!
//! The source evaluates the metric with Python's `eval`, restricted to a
//! character whitelist (`' cl0123456789%^*()-+/'`). Shelling out to `eval`
//! isn't available (or desirable) here, so this is a small recursive
//! descent parser over the same grammar: two free variables `c` and `l`,
//! integer literals, and the operators `+ - * / % ^ ( )`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetricError {
    #[error("metric expression contains disallowed character {0:?}")]
    DisallowedChar(char),
    #[error("metric expression is empty")]
    Empty,
    #[error("unexpected end of metric expression")]
    UnexpectedEnd,
    #[error("unexpected token at position {0}")]
    UnexpectedToken(usize),
    #[error("unbalanced parentheses")]
    UnbalancedParens,
    #[error("trailing input after expression: {0:?}")]
    TrailingInput(String),
    #[error("division by zero while evaluating metric")]
    DivisionByZero,
    #[error("exponent must be non-negative")]
    NegativeExponent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Var {
    Count,
    Length,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Expr {
    Num(i64),
    Var(Var),
    Neg(Box<Expr>),
    BinOp(Op, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Num(i64),
    Var(Var),
    Op(char),
    LParen,
    RParen,
}

fn lex(input: &str) -> Result<Vec<Token>, MetricError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' | '\r' | '\n' => {
                chars.next();
            }
            '0'..='9' => {
                let mut digits = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() {
                        digits.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let n: i64 = digits
                    .parse()
                    .map_err(|_| MetricError::UnexpectedToken(tokens.len()))?;
                tokens.push(Token::Num(n));
            }
            'c' => {
                tokens.push(Token::Var(Var::Count));
                chars.next();
            }
            'l' => {
                tokens.push(Token::Var(Var::Length));
                chars.next();
            }
            '(' => {
                tokens.push(Token::LParen);
                chars.next();
            }
            ')' => {
                tokens.push(Token::RParen);
                chars.next();
            }
            '+' | '-' | '*' | '/' | '%' | '^' => {
                tokens.push(Token::Op(c));
                chars.next();
            }
            other => return Err(MetricError::DisallowedChar(other)),
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let t = self.peek();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    // expr := term (('+' | '-') term)*
    fn parse_expr(&mut self) -> Result<Expr, MetricError> {
        let mut lhs = self.parse_term()?;
        loop {
            match self.peek() {
                Some(Token::Op('+')) => {
                    self.advance();
                    let rhs = self.parse_term()?;
                    lhs = Expr::BinOp(Op::Add, Box::new(lhs), Box::new(rhs));
                }
                Some(Token::Op('-')) => {
                    self.advance();
                    let rhs = self.parse_term()?;
                    lhs = Expr::BinOp(Op::Sub, Box::new(lhs), Box::new(rhs));
                }
                _ => break,
            }
        }
        Ok(lhs)
    }

    // term := power (('*' | '/' | '%') power)*
    fn parse_term(&mut self) -> Result<Expr, MetricError> {
        let mut lhs = self.parse_power()?;
        loop {
            match self.peek() {
                Some(Token::Op('*')) => {
                    self.advance();
                    let rhs = self.parse_power()?;
                    lhs = Expr::BinOp(Op::Mul, Box::new(lhs), Box::new(rhs));
                }
                Some(Token::Op('/')) => {
                    self.advance();
                    let rhs = self.parse_power()?;
                    lhs = Expr::BinOp(Op::Div, Box::new(lhs), Box::new(rhs));
                }
                Some(Token::Op('%')) => {
                    self.advance();
                    let rhs = self.parse_power()?;
                    lhs = Expr::BinOp(Op::Mod, Box::new(lhs), Box::new(rhs));
                }
                _ => break,
            }
        }
        Ok(lhs)
    }

    // power := unary ('^' power)?   (right-associative)
    fn parse_power(&mut self) -> Result<Expr, MetricError> {
        let base = self.parse_unary()?;
        if let Some(Token::Op('^')) = self.peek() {
            self.advance();
            let exp = self.parse_power()?;
            Ok(Expr::BinOp(Op::Pow, Box::new(base), Box::new(exp)))
        } else {
            Ok(base)
        }
    }

    // unary := '-' unary | primary
    fn parse_unary(&mut self) -> Result<Expr, MetricError> {
        if let Some(Token::Op('-')) = self.peek() {
            self.advance();
            let inner = self.parse_unary()?;
            Ok(Expr::Neg(Box::new(inner)))
        } else {
            self.parse_primary()
        }
    }

    // primary := NUMBER | 'c' | 'l' | '(' expr ')'
    fn parse_primary(&mut self) -> Result<Expr, MetricError> {
        match self.advance() {
            Some(Token::Num(n)) => Ok(Expr::Num(n)),
            Some(Token::Var(v)) => Ok(Expr::Var(v)),
            Some(Token::LParen) => {
                let inner = self.parse_expr()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(MetricError::UnbalancedParens),
                }
            }
            Some(Token::RParen) => Err(MetricError::UnexpectedToken(self.pos - 1)),
            Some(Token::Op(_)) => Err(MetricError::UnexpectedToken(self.pos - 1)),
            None => Err(MetricError::UnexpectedEnd),
        }
    }
}

fn eval(expr: &Expr, c: i64, l: i64) -> Result<i64, MetricError> {
    match expr {
        Expr::Num(n) => Ok(*n),
        Expr::Var(Var::Count) => Ok(c),
        Expr::Var(Var::Length) => Ok(l),
        Expr::Neg(inner) => Ok(-eval(inner, c, l)?),
        Expr::BinOp(op, lhs, rhs) => {
            let a = eval(lhs, c, l)?;
            let b = eval(rhs, c, l)?;
            match op {
                Op::Add => Ok(a + b),
                Op::Sub => Ok(a - b),
                Op::Mul => Ok(a * b),
                Op::Div => {
                    if b == 0 {
                        Err(MetricError::DivisionByZero)
                    } else {
                        Ok(a / b)
                    }
                }
                Op::Mod => {
                    if b == 0 {
                        Err(MetricError::DivisionByZero)
                    } else {
                        Ok(a % b)
                    }
                }
                Op::Pow => {
                    if b < 0 {
                        Err(MetricError::NegativeExponent)
                    } else {
                        Ok(a.pow(b as u32))
                    }
                }
            }
        }
    }
}

/// A compiled severity metric: `(count, length) -> severity`. Positive
/// means "worth reporting"; used both as the extractor's cutoff and as
/// the CLI's sort key.
#[derive(Debug, Clone)]
pub struct CompiledMetric {
    expr: Expr,
}

impl CompiledMetric {
    pub fn compile(source: &str) -> Result<Self, MetricError> {
        if source.trim().is_empty() {
            return Err(MetricError::Empty);
        }
        let tokens = lex(source)?;
        let mut parser = Parser { tokens: &tokens, pos: 0 };
        let expr = parser.parse_expr()?;
        if parser.pos != tokens.len() {
            let rest: String = tokens[parser.pos..]
                .iter()
                .map(|t| format!("{:?}", t))
                .collect::<Vec<_>>()
                .join(" ");
            return Err(MetricError::TrailingInput(rest));
        }
        Ok(CompiledMetric { expr })
    }

    pub fn eval(&self, count: i64, length: i64) -> Result<i64, MetricError> {
        eval(&self.expr, count, length)
    }
}

impl crate::extractor::Metric for CompiledMetric {
    type Error = MetricError;

    fn eval(&self, count: i64, length: i64) -> Result<i64, MetricError> {
        CompiledMetric::eval(self, count, length)
    }
}

/// The severity metric used when none is given on the command line.
pub const DEFAULT_METRIC_EXPR: &str = "(c-1)*(l-1)-2";

#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;
