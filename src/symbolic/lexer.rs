//! Tokenizer for complex expressions.
//!
//! Splits raw text into numbers, Python-style imaginary literals (`1j`, `2.5j`),
//! identifiers (dotted names like `np.sin` stay one identifier), operators and
//! brackets. Every token remembers the byte span it came from so parser
//! errors can point at the offending place.
use crate::symbolic::symbolic_errors::ParseError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{char, digit0, digit1, one_of, satisfy},
    combinator::{map, not, opt, recognize, value},
    sequence::{pair, terminated},
};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    /// imaginary literal, the value is the coefficient of the imaginary unit
    Imaginary(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    /// `^` or `**`
    Power,
    LParen,
    RParen,
    Comma,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenKind::Number(v) => write!(f, "{}", v),
            TokenKind::Imaginary(v) => write!(f, "{}j", v),
            TokenKind::Ident(name) => write!(f, "{}", name),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::Power => write!(f, "**"),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::Comma => write!(f, ","),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Token {
            kind,
            span: Span { start, end },
        }
    }
    /// token that did not come from user text (inserted by the preprocessor)
    pub fn synthetic(kind: TokenKind, at: usize) -> Self {
        Token::new(kind, at, at)
    }
    pub fn is_ident(&self, name: &str) -> bool {
        matches!(&self.kind, TokenKind::Ident(n) if n == name)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn exponent(input: &str) -> IResult<&str, &str> {
    recognize((one_of("eE"), opt(one_of("+-")), digit1)).parse(input)
}

/// Digits with optional fraction and exponent. The literal text is taken
/// from the consumed length so a trailing fraction at the end of input is kept.
fn number_literal(input: &str) -> IResult<&str, &str> {
    let (rest, ()) = alt((
        value((), (digit1, opt((char('.'), digit0)), opt(exponent))),
        value((), (char('.'), digit1, opt(exponent))),
    ))
    .parse(input)?;
    Ok((rest, &input[..input.len() - rest.len()]))
}

fn numeric(input: &str) -> IResult<&str, TokenKind> {
    let (rest, text) = number_literal(input)?;
    let value = text.parse::<f64>().map_err(|_| {
        nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Float))
    })?;
    // `2j` is imaginary, `2jx` is the number 2 followed by the identifier `jx`
    let (rest, imaginary) = opt(terminated(char('j'), not(satisfy(is_ident_char)))).parse(rest)?;
    let kind = if imaginary.is_some() {
        TokenKind::Imaginary(value)
    } else {
        TokenKind::Number(value)
    };
    Ok((rest, kind))
}

fn identifier(input: &str) -> IResult<&str, TokenKind> {
    map(
        recognize(pair(
            satisfy(is_ident_start),
            take_while(|c: char| is_ident_char(c) || c == '.'),
        )),
        |name: &str| TokenKind::Ident(name.to_string()),
    )
    .parse(input)
}

fn operator(input: &str) -> IResult<&str, TokenKind> {
    alt((
        map(tag("**"), |_| TokenKind::Power),
        map(char('^'), |_| TokenKind::Power),
        map(char('+'), |_| TokenKind::Plus),
        map(char('-'), |_| TokenKind::Minus),
        map(char('*'), |_| TokenKind::Star),
        map(char('/'), |_| TokenKind::Slash),
        map(char('('), |_| TokenKind::LParen),
        map(char(')'), |_| TokenKind::RParen),
        map(char(','), |_| TokenKind::Comma),
    ))
    .parse(input)
}

fn token_kind(input: &str) -> IResult<&str, TokenKind> {
    alt((numeric, identifier, operator)).parse(input)
}

/// Split `input` into tokens.
pub fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut rest = input.trim_start();
    while !rest.is_empty() {
        let start = input.len() - rest.len();
        match token_kind(rest) {
            Ok((remaining, kind)) => {
                let end = input.len() - remaining.len();
                tokens.push(Token::new(kind, start, end));
                rest = remaining.trim_start();
            }
            Err(_) => {
                // the loop condition guarantees at least one char
                let ch = rest.chars().next().unwrap_or(' ');
                return Err(ParseError::UnexpectedChar {
                    ch,
                    position: start,
                });
            }
        }
    }
    Ok(tokens)
}
