pub mod codegen;
pub mod parser;
pub mod validation;

pub use codegen::{Compilation, JsCodeGenerator};
pub use parser::parse_source;

use thiserror::Error;

/// Whole output returned when generation fails internally.
pub const FALLBACK_OUTPUT: &str = "// Error parsing code";

#[derive(Error, Debug)]
pub enum TranspileError {
    #[error("failed to write generated code: {0}")]
    Format(#[from] std::fmt::Error),
}

/// Compile NanoLang source into JavaScript, keeping the source map and block
/// balance information.
pub fn compile(source: &str) -> Result<Compilation, TranspileError> {
    let program = parse_source(source);
    JsCodeGenerator::new().generate(&program)
}

/// Transpile NanoLang source into JavaScript.
///
/// Never fails: malformed lines are recovered locally and an internal fault
/// degrades to [`FALLBACK_OUTPUT`].
pub fn transpile(source: &str) -> String {
    match compile(source) {
        Ok(compilation) => compilation.code,
        Err(err) => {
            log::error!("transpilation failed: {}", err);
            FALLBACK_OUTPUT.to_string()
        }
    }
}
