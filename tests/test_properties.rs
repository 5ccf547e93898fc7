use nanolang::language::format::format_source;
use nanolang::transpiler::{compile, parse_source, transpile};
use nanolang::Statement;

/// Small corpus of well-formed and malformed programs.
fn programs() -> Vec<String> {
    let fragments = [
        "say 1",
        "say   1",
        "note hi",
        "set x = 1",
        "set y",
        "repeat 2",
        "check x > 0",
        "end",
        "bogus line",
        "",
    ];

    let mut programs = Vec::new();
    for a in fragments {
        for b in fragments {
            for c in fragments {
                for d in ["end", "say 2", "repeat 3", "end\nend\nend"] {
                    programs.push(format!("{a}\n{b}\n{c}\n{d}"));
                }
            }
        }
    }
    programs
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

#[test]
fn test_transpile_is_deterministic() {
    for source in programs() {
        assert_eq!(transpile(&source), transpile(&source));
    }
}

#[test]
fn test_indentation_is_never_negative_and_always_even() {
    for source in programs() {
        for line in transpile(&source).lines() {
            assert!(!line.starts_with('-'));
            assert_eq!(indent_of(line) % 2, 0, "odd indent in {:?}", line);
        }
    }
}

#[test]
fn test_closer_matches_opener_depth() {
    for source in programs() {
        let output = transpile(&source);
        let mut open: Vec<usize> = Vec::new();

        for line in output.lines() {
            let trimmed = line.trim_start();
            if trimmed.ends_with('{') {
                open.push(indent_of(line));
            } else if trimmed == "}" {
                match open.pop() {
                    Some(opener_indent) => assert_eq!(
                        indent_of(line),
                        opener_indent,
                        "closer misaligned in:\n{}",
                        output
                    ),
                    // A stray `end` is clamped to depth 0.
                    None => assert_eq!(indent_of(line), 0),
                }
            }
        }
    }
}

#[test]
fn test_one_output_line_per_emitting_statement() {
    for source in programs() {
        let program = parse_source(&source);
        let emitting = program
            .statements()
            .filter(|s| !matches!(s, Statement::DanglingSet { .. }))
            .count();
        let compilation = compile(&source).unwrap();

        assert_eq!(compilation.line_count(), emitting);
        let output = transpile(&source);
        let output_lines = if output.is_empty() { 0 } else { output.lines().count() };
        assert_eq!(output_lines, emitting);
    }
}

#[test]
fn test_unrecognized_output_reclassifies_as_unrecognized() {
    for line in ["bogus line", "print 5", "say", "// already a comment"] {
        let once = transpile(line);
        assert!(once.starts_with("// Unknown syntax: "));

        let twice = transpile(&once);
        assert!(twice.starts_with("// Unknown syntax: "));
        assert!(twice.ends_with(line));
    }
}

#[test]
fn test_formatting_preserves_transpiled_output() {
    for source in programs() {
        let formatted = format_source(&source);
        assert_eq!(transpile(&formatted), transpile(&source), "source:\n{}", source);
    }
}
