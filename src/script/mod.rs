//! The C-- scripting language: lexer, parser and interpreter

pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod value;

pub use error::ScriptError;
pub use interpreter::{compile, Interpreter, Program, Resume, Step, Suspend};
pub use lexer::{Token, TokenClass, TokenStream};
