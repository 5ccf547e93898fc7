//! Capability-limited runner for generated JavaScript.
//!
//! Code is parsed into a small statement tree and evaluated by an
//! interpreter whose only outward capability is [`OutputSink`]. Faults never
//! escape: they become one captured line, `System Error: ...` when the text
//! cannot be compiled and `Runtime Error: ...` when execution fails.

pub mod errors;
pub mod grammar;
pub mod interpreter;
pub mod sink;
pub mod syntax;
pub mod value;

pub use errors::{CompileError, RuntimeError};
pub use interpreter::Interpreter;
pub use sink::{OutputSink, StreamingSink};
pub use syntax::Script;
pub use value::Value;

use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_MAX_STEPS: u64 = 1_000_000;
pub const RUNTIME_ERROR_PREFIX: &str = "Runtime Error: ";
pub const SYSTEM_ERROR_PREFIX: &str = "System Error: ";

/// Execution budget for one run. `None` disables a limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_steps: Option<u64>,
    pub timeout: Option<Duration>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_steps: Some(DEFAULT_MAX_STEPS),
            timeout: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    RuntimeError { message: String },
    SystemError { message: String },
}

/// Everything one run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub log: Vec<String>,
    #[serde(flatten)]
    pub status: RunStatus,
    pub steps: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Sandbox {
    limits: Limits,
}

impl Sandbox {
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Run `code`, sending captured lines (including a trailing diagnostic
    /// line on failure) to `sink`. Returns the status and steps taken.
    pub fn run_with_sink(&self, code: &str, sink: &mut dyn OutputSink) -> (RunStatus, u64) {
        let script = match Script::compile(code) {
            Ok(script) => script,
            Err(err) => {
                log::debug!("script rejected before execution: {}", err);
                let message = err.to_string();
                sink.capture(format!("{}{}", SYSTEM_ERROR_PREFIX, message));
                return (RunStatus::SystemError { message }, 0);
            }
        };

        let (result, steps) = {
            let mut interpreter = Interpreter::new(&mut *sink, &self.limits);
            let result = interpreter.run(&script);
            (result, interpreter.steps())
        };

        match result {
            Ok(()) => {
                log::debug!("script completed in {} step(s)", steps);
                (RunStatus::Completed, steps)
            }
            Err(err) => {
                log::debug!("script faulted after {} step(s): {}", steps, err);
                let message = err.to_string();
                sink.capture(format!("{}{}", RUNTIME_ERROR_PREFIX, message));
                (RunStatus::RuntimeError { message }, steps)
            }
        }
    }

    pub fn run(&self, code: &str) -> RunReport {
        let mut log = Vec::new();
        let (status, steps) = self.run_with_sink(code, &mut log);
        RunReport { log, status, steps }
    }

    /// Run `code` and return the Captured Log.
    pub fn execute(&self, code: &str) -> Vec<String> {
        self.run(code).log
    }
}

/// Run `code` in a fresh sandbox with default limits and return the
/// Captured Log. Never fails.
pub fn execute(code: &str) -> Vec<String> {
    Sandbox::default().execute(code)
}
