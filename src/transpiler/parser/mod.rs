pub mod tests;

use crate::language::ast::{Program, SourceLine, Statement};

const NOTE: &str = "note ";
const SAY: &str = "say ";
const SET: &str = "set ";
const REPEAT: &str = "repeat ";
const CHECK: &str = "check ";
const END: &str = "end";

/// Classify one raw source line. Returns `None` for blank lines.
///
/// Prefixes are checked in a fixed order and the first match wins. The line
/// is trimmed before matching, so source indentation carries no meaning.
pub fn classify_line(line: &str) -> Option<Statement> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let statement = if let Some(text) = trimmed.strip_prefix(NOTE) {
        Statement::Comment {
            text: text.to_string(),
        }
    } else if let Some(expr) = trimmed.strip_prefix(SAY) {
        Statement::Print {
            expr: expr.to_string(),
        }
    } else if let Some(rest) = trimmed.strip_prefix(SET) {
        classify_assignment(trimmed, rest)
    } else if let Some(count) = trimmed.strip_prefix(REPEAT) {
        Statement::RepeatBegin {
            count: count.trim().to_string(),
        }
    } else if let Some(condition) = trimmed.strip_prefix(CHECK) {
        Statement::CheckBegin {
            condition: condition.trim().to_string(),
        }
    } else if trimmed == END {
        Statement::BlockEnd
    } else {
        Statement::Unrecognized {
            raw: trimmed.to_string(),
        }
    };

    Some(statement)
}

// Everything after the first `=` is the value, so `set ok = a == b` keeps its
// comparison intact.
fn classify_assignment(trimmed: &str, rest: &str) -> Statement {
    match rest.split_once('=') {
        Some((name, expr)) => Statement::Assign {
            name: name.trim().to_string(),
            expr: expr.trim().to_string(),
        },
        None => Statement::DanglingSet {
            raw: trimmed.to_string(),
        },
    }
}

/// Split source on `\n` and classify each non-blank line.
pub fn parse_source(source: &str) -> Program {
    let lines = source
        .split('\n')
        .enumerate()
        .filter_map(|(index, line)| {
            classify_line(line).map(|statement| SourceLine::new(index + 1, statement))
        })
        .collect();

    Program::new(lines)
}
