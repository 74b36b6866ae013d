//! Expression preprocessor: turns user-typed text into an evaluable token stream.
//!
//! Renaming works on whole identifier tokens only:
//! - `i` and `j` become the imaginary unit,
//! - `x` and `y` become the grid coordinates `X` and `Y`.
//!
//! Identifiers that merely contain those letters (`sin`, `exp`, `xy`) are left
//! alone. A function row that mentions neither `z` nor the imaginary unit is
//! wrapped as `(expr) + 0*z`, so it is evaluated over the whole grid like every
//! other row.
//!
//! ```
//! use RustedComplexPlot::symbolic::preprocess::preprocess_function;
//! let p = preprocess_function("sin(x) + y").unwrap();
//! assert!(p.wrapped);
//! assert_eq!(p.normalized(), "(sin(X) + Y) + 0 * z");
//! ```
use crate::symbolic::complex_engine::Expr;
use crate::symbolic::lexer::{Token, TokenKind, tokenize};
use crate::symbolic::parse_expr::parse_tokens;
use crate::symbolic::symbolic_errors::{ParseError, PreprocessError};
use log::debug;

/// mapping used when the z-mapping field is left blank
pub const DEFAULT_Z_MAPPING: &str = "X + i*Y";

/// Preprocessed expression: the original text plus the rewritten tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct Preprocessed {
    pub source: String,
    pub tokens: Vec<Token>,
    /// true if `(expr) + 0*z` was inserted
    pub wrapped: bool,
}

impl Preprocessed {
    pub fn parse(&self) -> Result<Expr, ParseError> {
        parse_tokens(&self.tokens)
    }

    /// Render the rewritten token stream back to text.
    pub fn normalized(&self) -> String {
        let mut out = String::new();
        let mut prev: Option<&TokenKind> = None;
        for token in &self.tokens {
            let kind = &token.kind;
            let glue = match (prev, kind) {
                (None, _) => false,
                (Some(TokenKind::LParen), _) => false,
                (_, TokenKind::RParen) | (_, TokenKind::Comma) => false,
                // function call: name directly followed by '('
                (Some(TokenKind::Ident(_)), TokenKind::LParen) => false,
                _ => true,
            };
            if glue {
                out.push(' ');
            }
            out.push_str(&kind.to_string());
            prev = Some(kind);
        }
        out
    }
}

/// Apply identifier renaming to a token stream.
pub fn rename_tokens(tokens: Vec<Token>) -> Vec<Token> {
    tokens
        .into_iter()
        .map(|token| {
            let kind = match &token.kind {
                TokenKind::Ident(name) => match name.as_str() {
                    "i" | "j" => TokenKind::Imaginary(1.0),
                    "x" => TokenKind::Ident("X".to_string()),
                    "y" => TokenKind::Ident("Y".to_string()),
                    _ => token.kind.clone(),
                },
                other => other.clone(),
            };
            Token { kind, ..token }
        })
        .collect()
}

fn mentions_z_or_imaginary(tokens: &[Token]) -> bool {
    tokens
        .iter()
        .any(|t| t.is_ident("z") || matches!(t.kind, TokenKind::Imaginary(_)))
}

/// `( <tokens> ) + 0*z`
fn wrap_as_complex(tokens: Vec<Token>, at: usize) -> Vec<Token> {
    let mut wrapped = Vec::with_capacity(tokens.len() + 6);
    wrapped.push(Token::synthetic(TokenKind::LParen, 0));
    wrapped.extend(tokens);
    wrapped.extend([
        Token::synthetic(TokenKind::RParen, at),
        Token::synthetic(TokenKind::Plus, at),
        Token::synthetic(TokenKind::Number(0.0), at),
        Token::synthetic(TokenKind::Star, at),
        Token::synthetic(TokenKind::Ident("z".to_string()), at),
    ]);
    wrapped
}

/// Preprocess one function row.
pub fn preprocess_function(text: &str) -> Result<Preprocessed, PreprocessError> {
    let source = text.trim();
    if source.is_empty() {
        return Err(PreprocessError::EmptyExpression);
    }
    let tokens = rename_tokens(tokenize(source)?);
    let wrapped = !mentions_z_or_imaginary(&tokens);
    let tokens = if wrapped {
        wrap_as_complex(tokens, source.len())
    } else {
        tokens
    };
    let pre = Preprocessed {
        source: source.to_string(),
        tokens,
        wrapped,
    };
    debug!("function '{}' preprocessed to '{}'", pre.source, pre.normalized());
    Ok(pre)
}

/// Preprocess the z-mapping; blank text means `X + i*Y`.
pub fn preprocess_z_mapping(text: &str) -> Result<Preprocessed, PreprocessError> {
    let trimmed = text.trim();
    let source = if trimmed.is_empty() {
        DEFAULT_Z_MAPPING
    } else {
        trimmed
    };
    let tokens = rename_tokens(tokenize(source)?);
    let pre = Preprocessed {
        source: source.to_string(),
        tokens,
        wrapped: false,
    };
    debug!("z-mapping '{}' preprocessed to '{}'", pre.source, pre.normalized());
    Ok(pre)
}
