use crate::language::ast::{Program, SourceLine, Statement};
use std::fmt::{self, Write};

use super::TranspileError;

const INDENT: &str = "  ";

/// Result of a successful code generation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compilation {
    /// Generated JavaScript, lines joined by `\n`.
    pub code: String,
    /// Source line of each generated line, in output order.
    pub source_map: Vec<usize>,
    /// Source lines of `repeat`/`check` openers never closed.
    pub unclosed_blocks: Vec<usize>,
    /// Source lines of `end` tokens seen at depth 0.
    pub stray_ends: Vec<usize>,
}

impl Compilation {
    pub fn is_balanced(&self) -> bool {
        self.unclosed_blocks.is_empty() && self.stray_ends.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.source_map.len()
    }
}

/// Generates JavaScript from classified NanoLang statements.
pub struct JsCodeGenerator;

impl JsCodeGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, program: &Program) -> Result<Compilation, TranspileError> {
        let mut emitter = Emitter::default();

        for source_line in &program.lines {
            emitter.statement(source_line)?;
        }

        let compilation = emitter.finish();
        log::debug!(
            "generated {} line(s) from {} statement(s)",
            compilation.line_count(),
            program.len()
        );
        if !compilation.unclosed_blocks.is_empty() {
            log::warn!(
                "{} block(s) left open, opened on line(s) {:?}",
                compilation.unclosed_blocks.len(),
                compilation.unclosed_blocks
            );
        }
        Ok(compilation)
    }
}

impl Default for JsCodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-call translation state. The depth lives here and nowhere else.
#[derive(Default)]
struct Emitter {
    depth: usize,
    out: String,
    source_map: Vec<usize>,
    open_blocks: Vec<usize>,
    stray_ends: Vec<usize>,
}

impl Emitter {
    fn statement(&mut self, source_line: &SourceLine) -> fmt::Result {
        let line = source_line.line;

        match &source_line.statement {
            Statement::Comment { text } => self.emit(line, format_args!("// {}", text)),
            Statement::Print { expr } => self.emit(line, format_args!("console.log({});", expr)),
            Statement::Assign { name, expr } => {
                self.emit(line, format_args!("let {} = {};", name, expr))
            }
            Statement::RepeatBegin { count } => {
                let counter = loop_counter(self.depth);
                self.emit(
                    line,
                    format_args!(
                        "for (let {c} = 0; {c} < {count}; {c}++) {{",
                        c = counter,
                        count = count
                    ),
                )?;
                self.open(line);
                Ok(())
            }
            Statement::CheckBegin { condition } => {
                self.emit(line, format_args!("if ({}) {{", condition))?;
                self.open(line);
                Ok(())
            }
            Statement::BlockEnd => {
                if self.depth > 0 {
                    self.depth -= 1;
                    self.open_blocks.pop();
                } else {
                    self.stray_ends.push(line);
                }
                self.emit(line, format_args!("}}"))
            }
            Statement::DanglingSet { .. } => Ok(()),
            Statement::Unrecognized { raw } => {
                self.emit(line, format_args!("// Unknown syntax: {}", raw))
            }
        }
    }

    fn open(&mut self, line: usize) {
        self.depth += 1;
        self.open_blocks.push(line);
    }

    fn emit(&mut self, line: usize, text: fmt::Arguments<'_>) -> fmt::Result {
        if !self.source_map.is_empty() {
            self.out.push('\n');
        }
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.write_fmt(text)?;
        self.source_map.push(line);
        Ok(())
    }

    fn finish(self) -> Compilation {
        Compilation {
            code: self.out,
            source_map: self.source_map,
            unclosed_blocks: self.open_blocks,
            stray_ends: self.stray_ends,
        }
    }
}

/// Loop counter for a `repeat` opened at `depth`. Siblings at one depth reuse
/// the name; nested loops never collide.
pub fn loop_counter(depth: usize) -> String {
    format!("i_{}", depth)
}
