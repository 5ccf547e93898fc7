use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LintError {
    #[error("line {line}: `set` has no `=`, the statement is dropped")]
    MissingAssignment { line: usize },

    #[error("line {line}: '{name}' is not a valid variable name")]
    InvalidName { line: usize, name: String },

    #[error("line {line}: '{name}' is a reserved word and cannot be a variable name")]
    ReservedName { line: usize, name: String },

    #[error("line {line}: unknown statement '{text}' is kept only as a comment")]
    UnknownStatement { line: usize, text: String },

    #[error("line {line}: `end` has no matching `repeat` or `check`")]
    StrayEnd { line: usize },

    #[error("line {line}: `{keyword}` block is never closed with `end`")]
    UnclosedBlock { line: usize, keyword: String },
}

impl LintError {
    pub fn line(&self) -> usize {
        match self {
            LintError::MissingAssignment { line }
            | LintError::InvalidName { line, .. }
            | LintError::ReservedName { line, .. }
            | LintError::UnknownStatement { line, .. }
            | LintError::StrayEnd { line }
            | LintError::UnclosedBlock { line, .. } => *line,
        }
    }
}
