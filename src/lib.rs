pub mod cli;
pub mod config;
pub mod language;
pub mod runtime;
pub mod transpiler;

// Re-export commonly used types
pub use language::ast::{Program, SourceLine, Statement};
pub use runtime::{RunReport, RunStatus, Sandbox, execute};
pub use transpiler::{compile, transpile};

/// Transpile NanoLang source and run the result with default limits.
pub fn run_source(source: &str) -> Vec<String> {
    execute(&transpile(source))
}
