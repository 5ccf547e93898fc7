use crate::transpiler::parser::classify_line;

const INDENT: &str = "  ";

/// Rewrite NanoLang source with canonical keywords and two-space block
/// indentation. Depth follows the transpiler: openers indent what follows,
/// `end` dedents itself, and a stray `end` stays at column 0.
///
/// Runs of blank lines collapse to one; leading and trailing blanks are
/// dropped. Unrecognized lines are kept as written.
pub fn format_source(source: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut depth = 0usize;
    let mut pending_blank = false;

    for raw in source.split('\n') {
        let Some(statement) = classify_line(raw) else {
            pending_blank = !lines.is_empty();
            continue;
        };

        if statement.closes_block() {
            depth = depth.saturating_sub(1);
        }

        if pending_blank {
            lines.push(String::new());
            pending_blank = false;
        }
        lines.push(format!("{}{}", INDENT.repeat(depth), statement));

        if statement.opens_block() {
            depth += 1;
        }
    }

    let mut formatted = lines.join("\n");
    if !formatted.is_empty() {
        formatted.push('\n');
    }
    formatted
}
