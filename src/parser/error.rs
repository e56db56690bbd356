use crate::lexer::{LexicalError, Span, TokenKind};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParserErrorKind {
    #[error("{0}")]
    UnexpectedToken(&'static str),
    #[error("Expect expression.")]
    NonExpression,
    #[error("Invalid assignment target.")]
    InvalidAssignmentTarget,
    #[error("Can't have more than 255 parameters.")]
    TooManyParameters,
    #[error("Can't have more than 255 arguments.")]
    TooManyArguments,
    #[error("Invalid match pattern.")]
    InvalidPattern,
    #[error("{0}")]
    LexicalError(#[from] LexicalError),
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}")]
pub struct ParserError {
    #[source]
    pub kind: ParserErrorKind,
    pub span: Span,
    /// The kind of the offending token.
    pub token: TokenKind,
}

impl ParserError {
    pub fn code(&self) -> &'static str {
        match self.kind {
            ParserErrorKind::UnexpectedToken(_) => "PA001",
            ParserErrorKind::NonExpression => "PA002",
            ParserErrorKind::InvalidAssignmentTarget => "PA003",
            ParserErrorKind::TooManyParameters => "PA004",
            ParserErrorKind::TooManyArguments => "PA005",
            ParserErrorKind::InvalidPattern => "PA006",
            ParserErrorKind::LexicalError(ref e) => e.code(),
        }
    }
}

impl From<LexicalError> for ParserError {
    fn from(value: LexicalError) -> Self {
        Self {
            span: value.span,
            kind: ParserErrorKind::LexicalError(value),
            token: TokenKind::Eof,
        }
    }
}
