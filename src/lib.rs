pub mod heap;
pub mod interpreter;
pub mod lexer;
pub mod loader;
pub mod object;
pub mod parser;
pub mod string;
pub mod value;
