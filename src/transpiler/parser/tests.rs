#[cfg(test)]
mod tests {
    use crate::language::ast::Statement;
    use crate::transpiler::parser::{classify_line, parse_source};

    #[test]
    fn test_blank_lines_are_skipped() {
        assert_eq!(classify_line(""), None);
        assert_eq!(classify_line("   \t  "), None);
        assert_eq!(classify_line("\r"), None);
    }

    #[test]
    fn test_note_keeps_remainder_verbatim() {
        assert_eq!(
            classify_line("  note  two spaces"),
            Some(Statement::Comment {
                text: " two spaces".to_string()
            })
        );
    }

    #[test]
    fn test_say_keeps_expression_verbatim() {
        assert_eq!(
            classify_line("say \"X is \" + x"),
            Some(Statement::Print {
                expr: "\"X is \" + x".to_string()
            })
        );
    }

    #[test]
    fn test_set_splits_on_first_equals_only() {
        assert_eq!(
            classify_line("set same = a == b"),
            Some(Statement::Assign {
                name: "same".to_string(),
                expr: "a == b".to_string()
            })
        );
        assert_eq!(
            classify_line("set x=10"),
            Some(Statement::Assign {
                name: "x".to_string(),
                expr: "10".to_string()
            })
        );
    }

    #[test]
    fn test_set_without_equals_is_dangling() {
        assert_eq!(
            classify_line("set x 10"),
            Some(Statement::DanglingSet {
                raw: "set x 10".to_string()
            })
        );
    }

    #[test]
    fn test_block_openers_trim_their_expression() {
        assert_eq!(
            classify_line("repeat   5  "),
            Some(Statement::RepeatBegin {
                count: "5".to_string()
            })
        );
        assert_eq!(
            classify_line("check power > 9000"),
            Some(Statement::CheckBegin {
                condition: "power > 9000".to_string()
            })
        );
    }

    #[test]
    fn test_end_must_match_exactly() {
        assert_eq!(classify_line("   end  "), Some(Statement::BlockEnd));
        assert_eq!(
            classify_line("end now"),
            Some(Statement::Unrecognized {
                raw: "end now".to_string()
            })
        );
    }

    #[test]
    fn test_keyword_without_argument_is_unrecognized() {
        // Trimming removes the separating space, so the prefix no longer matches.
        for line in ["say", "note", "repeat   ", "check"] {
            assert!(
                matches!(classify_line(line), Some(Statement::Unrecognized { .. })),
                "{line:?} should be unrecognized"
            );
        }
    }

    #[test]
    fn test_prefix_precedence_is_first_match() {
        assert_eq!(
            classify_line("note say hi"),
            Some(Statement::Comment {
                text: "say hi".to_string()
            })
        );
        assert!(matches!(
            classify_line("sayhello"),
            Some(Statement::Unrecognized { .. })
        ));
    }

    #[test]
    fn test_parse_source_records_line_numbers() {
        let program = parse_source("say 1\n\n  repeat 2\r\n    say 3\nend\n");

        let numbers: Vec<usize> = program.lines.iter().map(|l| l.line).collect();
        assert_eq!(numbers, vec![1, 3, 4, 5]);
        assert_eq!(
            program.lines[1].statement,
            Statement::RepeatBegin {
                count: "2".to_string()
            }
        );
    }

    #[test]
    fn test_parse_empty_source() {
        assert!(parse_source("").is_empty());
        assert!(parse_source("\n\n   \n").is_empty());
    }
}
