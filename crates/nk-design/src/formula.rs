//! Formula mini-language.
//!
//! A small subset of Wilkinson-style model formulas, enough to describe spline
//! design matrices:
//!
//! ```text
//! formula := ['~'] ['+' | '-'] term (('+' | '-') term)*
//! term    := '0' | '1' | IDENT | IDENT '(' [arg (',' arg)*] ')'
//! arg     := [IDENT '='] expr
//! expr    := ['-'] NUMBER | IDENT
//! ```
//!
//! The intercept is present unless removed with `- 1` or `+ 0`.

use core::fmt;

use nk_core::error::{FormulaError, FormulaResult};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Number(f64),
    LParen,
    RParen,
    Comma,
    Equals,
    Plus,
    Minus,
    Tilde,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(name) => write!(f, "'{name}'"),
            Token::Number(value) => write!(f, "'{value}'"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
            Token::Comma => f.write_str("','"),
            Token::Equals => f.write_str("'='"),
            Token::Plus => f.write_str("'+'"),
            Token::Minus => f.write_str("'-'"),
            Token::Tilde => f.write_str("'~'"),
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

/// Split formula text into `(offset, token)` pairs.
fn tokenize(src: &str) -> FormulaResult<Vec<(usize, Token)>> {
    let mut tokens = Vec::new();
    let mut chars = src.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let single = match c {
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            ',' => Some(Token::Comma),
            '=' => Some(Token::Equals),
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '~' => Some(Token::Tilde),
            _ => None,
        };
        if let Some(token) = single {
            chars.next();
            tokens.push((start, token));
            continue;
        }

        if is_ident_start(c) {
            let mut end = start;
            while let Some(&(i, c)) = chars.peek() {
                if !is_ident_continue(c) {
                    break;
                }
                end = i + c.len_utf8();
                chars.next();
            }
            tokens.push((start, Token::Ident(src[start..end].to_string())));
            continue;
        }

        if c.is_ascii_digit() || c == '.' {
            let mut end = start;
            let mut prev = ' ';
            while let Some(&(i, c)) = chars.peek() {
                let exponent_sign = (c == '+' || c == '-') && (prev == 'e' || prev == 'E');
                if !(c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E' || exponent_sign) {
                    break;
                }
                prev = c;
                end = i + c.len_utf8();
                chars.next();
            }
            let text = &src[start..end];
            let value = text
                .parse::<f64>()
                .map_err(|_| FormulaError::parse(start, format!("invalid number '{text}'")))?;
            tokens.push((start, Token::Number(value)));
            continue;
        }

        return Err(FormulaError::parse(start, format!("unexpected character '{c}'")));
    }

    Ok(tokens)
}

/// An argument value inside a function call.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal.
    Number(f64),
    /// A bound name, or one of `True`, `False`, `None`.
    Name(String),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(value) => write!(f, "{value}"),
            Expr::Name(name) => f.write_str(name),
        }
    }
}

/// A positional or keyword argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    /// Keyword, or `None` for a positional argument.
    pub name: Option<String>,
    /// Argument value.
    pub value: Expr,
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name}={}", self.value),
            None => write!(f, "{}", self.value),
        }
    }
}

/// A basis-function call such as `bs(x, df=5)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    /// Function name.
    pub function: String,
    /// Arguments in source order.
    pub args: Vec<Arg>,
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.function)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(")")
    }
}

/// A model term contributing one or more design-matrix columns.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// A bound data vector used as a single column.
    Variable(String),
    /// A basis-function expansion.
    Call(Call),
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable(name) => f.write_str(name),
            Term::Call(call) => write!(f, "{call}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sign {
    Add,
    Remove,
}

enum RawTerm {
    Literal(bool),
    Term(Term),
}

/// A parsed formula: intercept flag plus ordered, de-duplicated terms.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    intercept: bool,
    terms: Vec<Term>,
}

impl Formula {
    /// Parse formula text.
    ///
    /// # Errors
    ///
    /// Returns [`FormulaError::Parse`] with the byte offset of the problem.
    ///
    /// # Example
    ///
    /// ```rust
    /// use nk_design::formula::Formula;
    ///
    /// let formula = Formula::parse("bs(x, df=4) - 1").unwrap();
    /// assert!(!formula.has_intercept());
    /// assert_eq!(formula.terms().len(), 1);
    /// ```
    pub fn parse(src: &str) -> FormulaResult<Self> {
        let tokens = tokenize(src)?;
        Parser {
            tokens,
            pos: 0,
            end: src.len(),
        }
        .parse_formula()
    }

    /// Whether the design matrix starts with an intercept column.
    pub fn has_intercept(&self) -> bool {
        self.intercept
    }

    /// Terms in column order.
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |(offset, _)| *offset)
    }

    fn advance(&mut self) -> Option<(usize, Token)> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn error(&self, message: impl Into<String>) -> FormulaError {
        FormulaError::parse(self.offset(), message)
    }

    fn expect(&mut self, expected: &Token) -> FormulaResult<()> {
        match self.advance() {
            Some((_, ref token)) if token == expected => Ok(()),
            Some((offset, token)) => Err(FormulaError::parse(
                offset,
                format!("expected {expected}, found {token}"),
            )),
            None => Err(self.error(format!("expected {expected}, found end of formula"))),
        }
    }

    fn parse_formula(mut self) -> FormulaResult<Formula> {
        if self.peek() == Some(&Token::Tilde) {
            self.advance();
        }

        let mut intercept = true;
        let mut terms: Vec<Term> = Vec::new();

        let mut sign = match self.peek() {
            Some(Token::Minus) => {
                self.advance();
                Sign::Remove
            }
            Some(Token::Plus) => {
                self.advance();
                Sign::Add
            }
            _ => Sign::Add,
        };

        loop {
            match (sign, self.parse_term()?) {
                (Sign::Add, RawTerm::Literal(one)) => intercept = one,
                (Sign::Remove, RawTerm::Literal(one)) => intercept = !one,
                (Sign::Add, RawTerm::Term(term)) => {
                    if !terms.contains(&term) {
                        terms.push(term);
                    }
                }
                (Sign::Remove, RawTerm::Term(term)) => terms.retain(|t| t != &term),
            }

            sign = match self.advance() {
                None => break,
                Some((_, Token::Plus)) => Sign::Add,
                Some((_, Token::Minus)) => Sign::Remove,
                Some((offset, token)) => {
                    return Err(FormulaError::parse(
                        offset,
                        format!("expected '+' or '-', found {token}"),
                    ))
                }
            };
        }

        Ok(Formula { intercept, terms })
    }

    fn parse_term(&mut self) -> FormulaResult<RawTerm> {
        match self.advance() {
            Some((_, Token::Number(value))) if value == 0.0 => Ok(RawTerm::Literal(false)),
            Some((_, Token::Number(value))) if value == 1.0 => Ok(RawTerm::Literal(true)),
            Some((offset, Token::Number(_))) => Err(FormulaError::parse(
                offset,
                "numeric terms must be 0 or 1",
            )),
            Some((_, Token::Ident(name))) => {
                if self.peek() == Some(&Token::LParen) {
                    self.advance();
                    let args = self.parse_args()?;
                    Ok(RawTerm::Term(Term::Call(Call {
                        function: name,
                        args,
                    })))
                } else {
                    Ok(RawTerm::Term(Term::Variable(name)))
                }
            }
            Some((offset, token)) => Err(FormulaError::parse(
                offset,
                format!("expected a term, found {token}"),
            )),
            None => Err(self.error("expected a term, found end of formula")),
        }
    }

    fn parse_args(&mut self) -> FormulaResult<Vec<Arg>> {
        let mut args = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            self.advance();
            return Ok(args);
        }

        let mut seen_keyword = false;
        loop {
            let arg_offset = self.offset();
            let is_keyword = matches!(
                (self.tokens.get(self.pos), self.tokens.get(self.pos + 1)),
                (Some((_, Token::Ident(_))), Some((_, Token::Equals)))
            );

            let arg = if is_keyword {
                let name = match self.advance() {
                    Some((_, Token::Ident(name))) => name,
                    _ => return Err(FormulaError::parse(arg_offset, "expected argument name")),
                };
                self.expect(&Token::Equals)?;
                seen_keyword = true;
                Arg {
                    name: Some(name),
                    value: self.parse_expr()?,
                }
            } else {
                if seen_keyword {
                    return Err(FormulaError::parse(
                        arg_offset,
                        "positional argument follows keyword argument",
                    ));
                }
                Arg {
                    name: None,
                    value: self.parse_expr()?,
                }
            };
            args.push(arg);

            match self.advance() {
                Some((_, Token::Comma)) => continue,
                Some((_, Token::RParen)) => break,
                Some((offset, token)) => {
                    return Err(FormulaError::parse(
                        offset,
                        format!("expected ',' or ')', found {token}"),
                    ))
                }
                None => return Err(self.error("expected ')', found end of formula")),
            }
        }

        Ok(args)
    }

    fn parse_expr(&mut self) -> FormulaResult<Expr> {
        match self.advance() {
            Some((_, Token::Number(value))) => Ok(Expr::Number(value)),
            Some((_, Token::Ident(name))) => Ok(Expr::Name(name)),
            Some((offset, Token::Minus)) => match self.advance() {
                Some((_, Token::Number(value))) => Ok(Expr::Number(-value)),
                _ => Err(FormulaError::parse(offset, "'-' must be followed by a number")),
            },
            Some((offset, token)) => Err(FormulaError::parse(
                offset,
                format!("expected a value, found {token}"),
            )),
            None => Err(self.error("expected a value, found end of formula")),
        }
    }
}
