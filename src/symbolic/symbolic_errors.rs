//! Error types of the expression pipeline: tokenizing, preprocessing,
//! parsing and evaluation.
use thiserror::Error;

/// Errors raised while turning text into tokens or tokens into an AST.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedChar { ch: char, position: usize },
    #[error("unexpected token '{found}' at position {position}")]
    UnexpectedToken { found: String, position: usize },
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unbalanced parenthesis at position {position}")]
    UnbalancedParenthesis { position: usize },
    #[error("unknown function '{name}' at position {position}")]
    UnknownFunction { name: String, position: usize },
    #[error("function '{name}' expects {expected} argument(s), got {found}")]
    WrongArity {
        name: String,
        expected: String,
        found: usize,
    },
    #[error("expression nests deeper than {limit} levels at position {position}")]
    TooDeep { limit: usize, position: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PreprocessError {
    #[error("expression is empty")]
    EmptyExpression,
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Errors raised by the interpreter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),
    #[error("domain error in {function}: {detail}")]
    Domain { function: String, detail: String },
    #[error("shape mismatch in {operation}: {left:?} vs {right:?}")]
    ShapeMismatch {
        operation: String,
        left: Vec<usize>,
        right: Vec<usize>,
    },
    #[error("function '{function}' expects {expected} argument(s), got {found}")]
    WrongArity {
        function: String,
        expected: String,
        found: usize,
    },
    #[error("expression nests deeper than {limit} levels")]
    TooDeep { limit: usize },
}

impl EvalError {
    pub fn domain(function: &str, detail: impl Into<String>) -> Self {
        EvalError::Domain {
            function: function.to_string(),
            detail: detail.into(),
        }
    }
}
