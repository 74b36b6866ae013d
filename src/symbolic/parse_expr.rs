//! a module turns a token stream into a symbolic expression
//!# Example
//! ```
//! use RustedComplexPlot::symbolic::parse_expr::parse_expression_func;
//! let parsed = parse_expression_func("z**2 + sin(X)").unwrap();
//! assert_eq!(parsed.to_string(), "((z ^ 2) + sin(X))");
//! ```
use crate::symbolic::complex_engine::{Expr, MAX_DEPTH};
use crate::symbolic::complex_functions::{NUMPY_PREFIX, NamedFunction};
use crate::symbolic::lexer::{Token, TokenKind, tokenize};
use crate::symbolic::symbolic_errors::ParseError;
use num_complex::Complex64;
use std::f64::consts::{E, PI};

//                  precedence ladder, lowest first
//   expr    := term (('+' | '-') term)*
//   term    := unary (('*' | '/') unary | <implicit> unary)*
//   unary   := ('+' | '-') unary | power
//   power   := primary (('^' | '**') unary)?       right associative
//   primary := NUMBER | IMAGINARY | IDENT | IDENT '(' args ')' | '(' expr ')'

/// named constants; the `np.` prefix is accepted as well
fn named_constant(name: &str) -> Option<Complex64> {
    let bare = name.strip_prefix(NUMPY_PREFIX).unwrap_or(name);
    match bare {
        "pi" => Some(Complex64::new(PI, 0.0)),
        "e" => Some(Complex64::new(E, 0.0)),
        _ => None,
    }
}

struct TokenParser<'a> {
    tokens: &'a [Token],
    pos: usize,
    /// open `unary` frames; every recursive cycle of the grammar passes through it
    depth: usize,
}

impl<'a> TokenParser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        TokenParser {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    /// start of the next token, or the end of the last one
    fn position(&self) -> usize {
        match self.peek() {
            Some(t) => t.span.start,
            None => self.tokens.last().map_or(0, |t| t.span.end),
        }
    }

    fn too_deep(&self) -> ParseError {
        ParseError::TooDeep {
            limit: MAX_DEPTH,
            position: self.position(),
        }
    }

    /// Reject a freshly built node whose tree is deeper than `MAX_DEPTH`.
    fn checked(&self, expr: Expr) -> Result<Expr, ParseError> {
        if expr.depth_exceeds(MAX_DEPTH) {
            return Err(self.too_deep());
        }
        Ok(expr)
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&'a TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn unexpected(token: &Token) -> ParseError {
        ParseError::UnexpectedToken {
            found: token.kind.to_string(),
            position: token.span.start,
        }
    }

    fn expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.term()?;
        while let Some(kind) = self.peek_kind() {
            match kind {
                TokenKind::Plus => {
                    self.advance();
                    let rhs = self.term()?;
                    left = self.checked(left + rhs)?;
                }
                TokenKind::Minus => {
                    self.advance();
                    let rhs = self.term()?;
                    left = self.checked(left - rhs)?;
                }
                _ => break,
            }
        }
        Ok(left)
    }

    /// `2z`, `3i`, `2(z+1)`: a number literal directly followed by a factor,
    /// with nothing between them
    fn implicit_product_follows(&self) -> bool {
        let Some(previous) = self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) else {
            return false;
        };
        let Some(next) = self.peek() else {
            return false;
        };
        matches!(previous.kind, TokenKind::Number(_))
            && previous.span.end == next.span.start
            && matches!(
                next.kind,
                TokenKind::Ident(_) | TokenKind::Imaginary(_) | TokenKind::LParen
            )
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.unary()?;
        loop {
            match self.peek_kind() {
                Some(TokenKind::Star) => {
                    self.advance();
                    let rhs = self.unary()?;
                    left = self.checked(left * rhs)?;
                }
                Some(TokenKind::Slash) => {
                    self.advance();
                    let rhs = self.unary()?;
                    left = self.checked(left / rhs)?;
                }
                _ if self.implicit_product_follows() => {
                    let rhs = self.unary()?;
                    left = self.checked(left * rhs)?;
                }
                _ => break,
            }
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.too_deep());
        }
        self.depth += 1;
        let result = match self.peek_kind() {
            Some(TokenKind::Plus) => {
                self.advance();
                self.unary()
            }
            Some(TokenKind::Minus) => {
                self.advance();
                self.unary().and_then(|e| self.checked(-e))
            }
            _ => self.power(),
        };
        self.depth -= 1;
        result
    }

    fn power(&mut self) -> Result<Expr, ParseError> {
        let base = self.primary()?;
        if let Some(TokenKind::Power) = self.peek_kind() {
            self.advance();
            // unary -> power recursion makes `^` right associative
            let exponent = self.unary()?;
            return self.checked(base.pow(exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.advance().ok_or(ParseError::UnexpectedEnd)?;
        match &token.kind {
            TokenKind::Number(v) => Ok(Expr::real(*v)),
            TokenKind::Imaginary(v) => Ok(Expr::imag(*v)),
            TokenKind::Ident(name) => {
                if let Some(TokenKind::LParen) = self.peek_kind() {
                    self.call(name, token)
                } else if let Some(c) = named_constant(name) {
                    Ok(Expr::Const(c))
                } else {
                    Ok(Expr::Var(name.clone()))
                }
            }
            TokenKind::LParen => {
                let inner = self.expr()?;
                self.expect_closing(token)?;
                Ok(inner)
            }
            _ => Err(Self::unexpected(token)),
        }
    }

    fn expect_closing(&mut self, opening: &Token) -> Result<(), ParseError> {
        match self.peek() {
            Some(t) if t.kind == TokenKind::RParen => {
                self.advance();
                Ok(())
            }
            Some(t) => Err(Self::unexpected(t)),
            None => Err(ParseError::UnbalancedParenthesis {
                position: opening.span.start,
            }),
        }
    }

    fn call(&mut self, name: &str, name_token: &Token) -> Result<Expr, ParseError> {
        let func = NamedFunction::lookup(name).ok_or_else(|| ParseError::UnknownFunction {
            name: name.to_string(),
            position: name_token.span.start,
        })?;
        // the caller saw '(' at the current position
        let opening = self.advance().ok_or(ParseError::UnexpectedEnd)?;
        let mut args = Vec::new();
        if let Some(TokenKind::RParen) = self.peek_kind() {
            self.advance();
        } else {
            loop {
                args.push(self.expr()?);
                match self.peek() {
                    Some(t) if t.kind == TokenKind::Comma => {
                        self.advance();
                    }
                    Some(t) if t.kind == TokenKind::RParen => {
                        self.advance();
                        break;
                    }
                    Some(t) => return Err(Self::unexpected(t)),
                    None => {
                        return Err(ParseError::UnbalancedParenthesis {
                            position: opening.span.start,
                        });
                    }
                }
            }
        }
        let arity = func.arity();
        if !arity.accepts(args.len()) {
            return Err(ParseError::WrongArity {
                name: func.to_string(),
                expected: arity.to_string(),
                found: args.len(),
            });
        }
        self.checked(Expr::Call(func, args))
    }
}

/// Parse a token stream produced by the lexer (and usually the preprocessor).
pub fn parse_tokens(tokens: &[Token]) -> Result<Expr, ParseError> {
    if tokens.is_empty() {
        return Err(ParseError::UnexpectedEnd);
    }
    let mut parser = TokenParser::new(tokens);
    let expr = parser.expr()?;
    match parser.peek() {
        None => Ok(expr),
        Some(t) if t.kind == TokenKind::RParen => Err(ParseError::UnbalancedParenthesis {
            position: t.span.start,
        }),
        Some(t) => Err(TokenParser::unexpected(t)),
    }
}

pub fn parse_expression_func(input: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(input)?;
    parse_tokens(&tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn z() -> Expr {
        Expr::var("z")
    }

    #[test]
    fn test_parse_constant() {
        let expr = parse_expression_func("42").unwrap();
        assert_eq!(expr, Expr::real(42.0));
    }

    #[test]
    fn test_parse_variable() {
        let expr = parse_expression_func("z").unwrap();
        assert_eq!(expr, z());
    }

    #[test]
    fn test_parse_addition_is_left_associative() {
        let expr = parse_expression_func("z - 2 - 1").unwrap();
        assert_eq!(expr, (z() - Expr::real(2.0)) - Expr::real(1.0));
    }

    #[test]
    fn test_mul_binds_tighter_than_add() {
        let expr = parse_expression_func("1 + z * 2").unwrap();
        assert_eq!(expr, Expr::real(1.0) + z() * Expr::real(2.0));
    }

    #[test]
    fn test_power_is_right_associative() {
        let expr = parse_expression_func("z ^ 2 ** 3").unwrap();
        assert_eq!(expr, z().pow(Expr::real(2.0).pow(Expr::real(3.0))));
    }

    #[test]
    fn test_negation_binds_looser_than_power() {
        let expr = parse_expression_func("-z**2").unwrap();
        assert_eq!(expr, -(z().pow(Expr::real(2.0))));
        let expr = parse_expression_func("2**-1").unwrap();
        assert_eq!(expr, Expr::real(2.0).pow(-Expr::real(1.0)));
    }

    #[test]
    fn test_parse_with_brackets() {
        let expr = parse_expression_func("(z + 1) * (z - 1)").unwrap();
        assert_eq!(
            expr,
            (z() + Expr::real(1.0)) * (z() - Expr::real(1.0))
        );
    }

    #[test]
    fn test_parse_imaginary_literal() {
        let expr = parse_expression_func("X + 1j*Y").unwrap();
        assert_eq!(expr, Expr::var("X") + Expr::imag(1.0) * Expr::var("Y"));
    }

    #[test]
    fn test_implicit_multiplication_after_number() {
        assert_eq!(parse_expression_func("2z").unwrap(), Expr::real(2.0) * z());
        assert_eq!(
            parse_expression_func("2(z+1)").unwrap(),
            Expr::real(2.0) * (z() + Expr::real(1.0))
        );
        assert_eq!(
            parse_expression_func("2z**2").unwrap(),
            Expr::real(2.0) * z().pow(Expr::real(2.0))
        );
    }

    #[test]
    fn test_implicit_multiplication_needs_adjacent_tokens() {
        assert_eq!(
            parse_expression_func("2 z").unwrap_err(),
            ParseError::UnexpectedToken {
                found: "z".to_string(),
                position: 2
            }
        );
        assert!(matches!(
            parse_expression_func("z**2 (z+1)").unwrap_err(),
            ParseError::UnexpectedToken { position: 5, .. }
        ));
        assert_eq!(
            parse_expression_func("z**2(z+1)").unwrap(),
            z().pow(Expr::real(2.0)) * (z() + Expr::real(1.0))
        );
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |n: usize| format!("{}z{}", "(".repeat(n), ")".repeat(n));
        assert_eq!(parse_expression_func(&nested(100)).unwrap(), z());
        assert!(matches!(
            parse_expression_func(&nested(2000)).unwrap_err(),
            ParseError::TooDeep { limit: MAX_DEPTH, .. }
        ));
        let negations = format!("{}z", "-".repeat(300));
        assert!(matches!(
            parse_expression_func(&negations).unwrap_err(),
            ParseError::TooDeep { .. }
        ));
        let tower = vec!["z"; 300].join("^");
        assert!(matches!(
            parse_expression_func(&tower).unwrap_err(),
            ParseError::TooDeep { .. }
        ));
        let calls = format!("{}z{}", "sin(".repeat(300), ")".repeat(300));
        assert!(matches!(
            parse_expression_func(&calls).unwrap_err(),
            ParseError::TooDeep { .. }
        ));
    }

    #[test]
    fn test_long_sums_are_bounded_by_tree_depth() {
        let sum = |n: usize| vec!["z"; n].join(" + ");
        let expr = parse_expression_func(&sum(200)).unwrap();
        assert!(!expr.depth_exceeds(MAX_DEPTH));
        assert!(matches!(
            parse_expression_func(&sum(300)).unwrap_err(),
            ParseError::TooDeep { .. }
        ));
        let product = vec!["z"; 300].join("*");
        assert!(matches!(
            parse_expression_func(&product).unwrap_err(),
            ParseError::TooDeep { .. }
        ));
    }

    #[test]
    fn test_parse_function_calls_and_aliases() {
        let expr = parse_expression_func("sin(cos(z))").unwrap();
        assert_eq!(
            expr,
            Expr::call(NamedFunction::Sin, Expr::call(NamedFunction::Cos, z()))
        );
        let expr = parse_expression_func("np.log(z)").unwrap();
        assert_eq!(expr, Expr::call(NamedFunction::Log, z()));
        let expr = parse_expression_func("tg(z)").unwrap();
        assert_eq!(expr, Expr::call(NamedFunction::Tan, z()));
    }

    #[test]
    fn test_parse_variadic_call() {
        let expr = parse_expression_func("vstack(z, z, z)").unwrap();
        assert_eq!(expr, Expr::Call(NamedFunction::Vstack, vec![z(), z(), z()]));
    }

    #[test]
    fn test_parse_named_constants() {
        assert_eq!(
            parse_expression_func("pi").unwrap(),
            Expr::Const(Complex64::new(PI, 0.0))
        );
        assert_eq!(
            parse_expression_func("np.e").unwrap(),
            Expr::Const(Complex64::new(E, 0.0))
        );
    }

    #[test]
    fn test_unknown_function() {
        let err = parse_expression_func("1 + sinh(z)").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnknownFunction {
                name: "sinh".to_string(),
                position: 4
            }
        );
    }

    #[test]
    fn test_wrong_arity() {
        let err = parse_expression_func("sin(z, z)").unwrap_err();
        assert!(matches!(err, ParseError::WrongArity { found: 2, .. }));
        let err = parse_expression_func("vstack()").unwrap_err();
        assert!(matches!(err, ParseError::WrongArity { found: 0, .. }));
    }

    #[test]
    fn test_unbalanced_parenthesis() {
        assert_eq!(
            parse_expression_func("(z + 1").unwrap_err(),
            ParseError::UnbalancedParenthesis { position: 0 }
        );
        assert_eq!(
            parse_expression_func("z + 1)").unwrap_err(),
            ParseError::UnbalancedParenthesis { position: 5 }
        );
        assert!(matches!(
            parse_expression_func("sin(z").unwrap_err(),
            ParseError::UnbalancedParenthesis { position: 3 }
        ));
    }

    #[test]
    fn test_invalid_expression() {
        assert_eq!(
            parse_expression_func("z +").unwrap_err(),
            ParseError::UnexpectedEnd
        );
        assert!(matches!(
            parse_expression_func("z * * 2").unwrap_err(),
            ParseError::UnexpectedToken { .. }
        ));
        assert!(matches!(
            parse_expression_func("z z").unwrap_err(),
            ParseError::UnexpectedToken { position: 2, .. }
        ));
        assert_eq!(parse_expression_func("").unwrap_err(), ParseError::UnexpectedEnd);
    }
}
