//! Error types for graph construction, evaluation and code generation.

use core::fmt;

/// What went wrong while parsing an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A character that starts no token.
    UnexpectedChar(char),
    /// The input ended in the middle of an expression.
    UnexpectedEnd,
    /// A token that is valid in general but not at this position.
    UnexpectedToken(String),
    /// `name(...)` where `name` is not a known function.
    UnknownFunction(String),
    /// A numeric literal that does not convert to `f64`.
    BadNumber(String),
    /// Parentheses, calls, unary minus or `^` nested past the parser's limit.
    TooDeep,
}

/// Expression parse error, positioned at a byte offset in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub offset: usize,
    pub kind: ParseErrorKind,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ParseErrorKind::UnexpectedChar(c) => {
                write!(f, "unexpected character '{}' at offset {}", c, self.offset)
            }
            ParseErrorKind::UnexpectedEnd => {
                write!(f, "unexpected end of expression at offset {}", self.offset)
            }
            ParseErrorKind::UnexpectedToken(t) => {
                write!(f, "unexpected '{}' at offset {}", t, self.offset)
            }
            ParseErrorKind::UnknownFunction(name) => {
                write!(f, "unknown function '{}' at offset {}", name, self.offset)
            }
            ParseErrorKind::BadNumber(text) => {
                write!(f, "invalid number '{}' at offset {}", text, self.offset)
            }
            ParseErrorKind::TooDeep => {
                write!(f, "expression nested too deeply at offset {}", self.offset)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Errors returned by [`Dag`](crate::graph::Dag) operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// `eval` was given a different number of values than there are free variables.
    ArityMismatch { expected: usize, got: usize },
    /// A variable has no value in the evaluation environment.
    UnboundVariable(String),
    /// No local derivative exists for this node (variables, gradient holders).
    NotDifferentiable(String),
    /// A gradient holder appears below the root; only the root may be one.
    NestedGrad,
    /// The expression source did not parse.
    Parse(ParseError),
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::ArityMismatch { expected, got } => write!(
                f,
                "number of provided values ({}) does not match number of free variables ({})",
                got, expected
            ),
            GraphError::UnboundVariable(name) => write!(f, "no value for variable '{}'", name),
            GraphError::NotDifferentiable(label) => {
                write!(f, "cannot differentiate through '{}'", label)
            }
            GraphError::NestedGrad => write!(f, "gradient holder is only allowed at the root"),
            GraphError::Parse(e) => write!(f, "parse error: {}", e),
        }
    }
}

impl std::error::Error for GraphError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GraphError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParseError> for GraphError {
    fn from(e: ParseError) -> Self {
        GraphError::Parse(e)
    }
}
