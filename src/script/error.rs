//! Errors raised while compiling or running a script

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptError {
    #[error("line {line}: syntax error: {message}")]
    Syntax { line: usize, message: String },

    #[error("line {line}: {message}")]
    Runtime { line: usize, message: String },
}

impl ScriptError {
    pub fn line(&self) -> usize {
        match self {
            ScriptError::Syntax { line, .. } | ScriptError::Runtime { line, .. } => *line,
        }
    }
}
