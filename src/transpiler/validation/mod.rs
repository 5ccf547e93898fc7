use crate::language::ast::{Program, Statement};
use crate::transpiler::parser::parse_source;
use anyhow::{Result, anyhow};
use once_cell::sync::Lazy;
use regex::Regex;

pub mod errors;

pub use errors::LintError;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier pattern is valid"));

/// Words the generated JavaScript cannot bind with `let`.
const RESERVED: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
    "do", "else", "enum", "export", "extends", "false", "finally", "for", "function", "if",
    "import", "in", "instanceof", "let", "new", "null", "return", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield", "undefined",
    "NaN", "Infinity",
];

pub fn is_valid_name(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

pub fn is_reserved_name(name: &str) -> bool {
    RESERVED.contains(&name)
}

/// Report every line the transpiler would recover from silently, in source
/// order; unclosed blocks are appended after the pass completes.
pub fn check_program(program: &Program) -> Vec<LintError> {
    let mut findings = Vec::new();
    let mut open_blocks: Vec<(usize, &'static str)> = Vec::new();

    for source_line in &program.lines {
        let line = source_line.line;
        match &source_line.statement {
            Statement::Assign { name, .. } => {
                if !is_valid_name(name) {
                    findings.push(LintError::InvalidName {
                        line,
                        name: name.clone(),
                    });
                } else if is_reserved_name(name) {
                    findings.push(LintError::ReservedName {
                        line,
                        name: name.clone(),
                    });
                }
            }
            Statement::DanglingSet { .. } => {
                findings.push(LintError::MissingAssignment { line });
            }
            Statement::Unrecognized { raw } => {
                findings.push(LintError::UnknownStatement {
                    line,
                    text: raw.clone(),
                });
            }
            opener @ (Statement::RepeatBegin { .. } | Statement::CheckBegin { .. }) => {
                if let Some(keyword) = opener.keyword() {
                    open_blocks.push((line, keyword));
                }
            }
            Statement::BlockEnd => {
                if open_blocks.pop().is_none() {
                    findings.push(LintError::StrayEnd { line });
                }
            }
            Statement::Comment { .. } | Statement::Print { .. } => {}
        }
    }

    findings.extend(
        open_blocks
            .into_iter()
            .map(|(line, keyword)| LintError::UnclosedBlock {
                line,
                keyword: keyword.to_string(),
            }),
    );

    findings
}

pub fn check_source(source: &str) -> Vec<LintError> {
    check_program(&parse_source(source))
}

/// Fails with the first finding, if any.
pub fn validate_program(program: &Program) -> Result<()> {
    match check_program(program).into_iter().next() {
        Some(finding) => Err(anyhow!(finding)),
        None => Ok(()),
    }
}
