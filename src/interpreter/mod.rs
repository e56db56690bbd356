pub mod config;
pub mod context;
pub mod native;
mod tree;

use crate::{lexer::Span, value::Value};
pub use config::InterpreterConfig;
pub use tree::TreeWalkInterpreter;

/// Where program output goes.
pub trait SystemContext {
    fn writeln(&mut self, text: &str);
}

/// Outcome of running a statement. `Return` travels up until the innermost call frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgramState {
    Run,
    Return(Value, Span),
}
