use super::ValueKind;
use crate::lexer::Span;
use crate::string::IdentName;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeErrorKind {
    #[error("Operand must be a number.")]
    NonNumeric,
    #[error("Operands must be numbers.")]
    NonNumerics,
    #[error("Operands must be two numbers or two strings.")]
    NonAddable,
    #[error("Division by zero.")]
    DivisionByZero,
    #[error("Undefined variable '{0}'.")]
    UndefinedVariable(IdentName),
    #[error("Can only call functions and classes.")]
    InvalidCallee,
    #[error("Expected {expected} arguments but got {actual}.")]
    InvalidArgumentCount { expected: usize, actual: usize },
    #[error("Only instances and modules have properties.")]
    InvalidInstance,
    #[error("Undefined property '{0}'.")]
    UndefinedProperty(IdentName),
    #[error("Only instances have fields.")]
    InvalidFieldTarget,
    #[error("Superclass must be a class.")]
    InvalidSuperClass,
    #[error("Can't use 'super' outside of a subclass method.")]
    SuperOutsideSubclass,
    #[error("Can't use 'this' outside of a method.")]
    ThisOutsideMethod,
    #[error("Can't index a value of type {0}.")]
    InvalidIndexTarget(ValueKind),
    #[error("Can't assign into an index of a value of type {0}.")]
    InvalidIndexAssignment(ValueKind),
    #[error("Index must be a non-negative integer.")]
    InvalidIndex,
    #[error("Index {index} out of bounds for length {length}.")]
    IndexOutOfBounds { index: usize, length: usize },
    #[error("'{name}' expects {expected}.")]
    InvalidArgument {
        name: &'static str,
        expected: &'static str,
    },
    #[error("Failed to import '{module}': {message}")]
    ModuleLoad { module: String, message: String },
    #[error("Can't return from top-level code.")]
    ReturnOutsideFunction,
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}")]
pub struct RuntimeError {
    #[source]
    pub kind: RuntimeErrorKind,
    pub span: Span,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn code(&self) -> &'static str {
        match self.kind {
            RuntimeErrorKind::NonNumeric => "RT001",
            RuntimeErrorKind::NonNumerics => "RT002",
            RuntimeErrorKind::NonAddable => "RT003",
            RuntimeErrorKind::DivisionByZero => "RT004",
            RuntimeErrorKind::UndefinedVariable(_) => "RT005",
            RuntimeErrorKind::InvalidCallee => "RT006",
            RuntimeErrorKind::InvalidArgumentCount { .. } => "RT007",
            RuntimeErrorKind::InvalidInstance => "RT008",
            RuntimeErrorKind::UndefinedProperty(_) => "RT009",
            RuntimeErrorKind::InvalidFieldTarget => "RT010",
            RuntimeErrorKind::InvalidSuperClass => "RT011",
            RuntimeErrorKind::SuperOutsideSubclass => "RT012",
            RuntimeErrorKind::ThisOutsideMethod => "RT013",
            RuntimeErrorKind::InvalidIndexTarget(_) => "RT014",
            RuntimeErrorKind::InvalidIndexAssignment(_) => "RT015",
            RuntimeErrorKind::InvalidIndex => "RT016",
            RuntimeErrorKind::IndexOutOfBounds { .. } => "RT017",
            RuntimeErrorKind::InvalidArgument { .. } => "RT018",
            RuntimeErrorKind::ModuleLoad { .. } => "RT019",
            RuntimeErrorKind::ReturnOutsideFunction => "RT020",
        }
    }
}
