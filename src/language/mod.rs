pub mod ast;
pub mod examples;
pub mod format;

pub use ast::{Program, SourceLine, Statement};
