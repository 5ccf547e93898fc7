use thiserror::Error;

/// Faults detected before any code runs. Reported as `System Error: ...`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("{0}")]
    Parse(String),

    #[error("Identifier '{name}' has already been declared")]
    Redeclared { name: String },

    #[error("Missing initializer in const declaration")]
    MissingInitializer { name: String },

    #[error("nesting deeper than {limit} levels is not supported")]
    TooDeep { limit: usize },
}

/// Faults raised while executing. Reported as `Runtime Error: ...`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("{name} is not defined")]
    NotDefined { name: String },

    #[error("Cannot access '{name}' before initialization")]
    Uninitialized { name: String },

    #[error("Assignment to constant variable.")]
    ConstAssignment { name: String },

    #[error("{callee} is not a function")]
    NotAFunction { callee: String },

    #[error("step limit of {limit} exceeded")]
    StepLimit { limit: u64 },

    #[error("time limit of {limit_ms} ms exceeded")]
    TimeLimit { limit_ms: u128 },
}
