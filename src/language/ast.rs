use serde::Serialize;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// One classified line of NanoLang source.
///
/// Expressions (`expr`, `count`, `condition`) are opaque: they are carried
/// verbatim into the generated code and never inspected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Statement {
    Comment { text: String },
    Print { expr: String },
    Assign { name: String, expr: String },
    RepeatBegin { count: String },
    CheckBegin { condition: String },
    BlockEnd,
    /// `set` without an `=`; produces no output.
    DanglingSet { raw: String },
    Unrecognized { raw: String },
}

impl Statement {
    /// Keyword that introduced the statement, if any.
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            Statement::Comment { .. } => Some("note"),
            Statement::Print { .. } => Some("say"),
            Statement::Assign { .. } | Statement::DanglingSet { .. } => Some("set"),
            Statement::RepeatBegin { .. } => Some("repeat"),
            Statement::CheckBegin { .. } => Some("check"),
            Statement::BlockEnd => Some("end"),
            Statement::Unrecognized { .. } => None,
        }
    }

    pub fn opens_block(&self) -> bool {
        matches!(
            self,
            Statement::RepeatBegin { .. } | Statement::CheckBegin { .. }
        )
    }

    pub fn closes_block(&self) -> bool {
        matches!(self, Statement::BlockEnd)
    }
}

/// Canonical NanoLang spelling of the statement.
impl Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Statement::Comment { text } => write!(f, "note {}", text),
            Statement::Print { expr } => write!(f, "say {}", expr),
            Statement::Assign { name, expr } => write!(f, "set {} = {}", name, expr),
            Statement::RepeatBegin { count } => write!(f, "repeat {}", count),
            Statement::CheckBegin { condition } => write!(f, "check {}", condition),
            Statement::BlockEnd => write!(f, "end"),
            Statement::DanglingSet { raw } | Statement::Unrecognized { raw } => {
                write!(f, "{}", raw)
            }
        }
    }
}

/// A statement together with the 1-based line it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLine {
    pub line: usize,
    #[serde(flatten)]
    pub statement: Statement,
}

impl SourceLine {
    pub fn new(line: usize, statement: Statement) -> Self {
        Self { line, statement }
    }
}

/// Classified program, in source order. Blank lines are not represented.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Program {
    pub lines: Vec<SourceLine>,
}

impl Program {
    pub fn new(lines: Vec<SourceLine>) -> Self {
        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.lines.iter().map(|l| &l.statement)
    }

    pub fn count_where(&self, predicate: impl Fn(&Statement) -> bool) -> usize {
        self.statements().filter(|s| predicate(*s)).count()
    }

    pub fn to_tree_string(&self) -> String {
        self.to_string()
    }

    /// Nest statements under their block openers. A stray `end` stays at the
    /// top level; unclosed openers keep their children.
    fn build_tree(&self) -> Vec<TreeNode<'_>> {
        let mut stack: Vec<TreeNode<'_>> = vec![TreeNode::root()];

        for source_line in &self.lines {
            let node = TreeNode::leaf(source_line);
            if source_line.statement.opens_block() {
                stack.push(node);
                continue;
            }

            if source_line.statement.closes_block() && stack.len() > 1 {
                let mut finished = stack.pop().unwrap_or_else(TreeNode::root);
                finished.children.push(node);
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(finished);
                }
                continue;
            }

            if let Some(parent) = stack.last_mut() {
                parent.children.push(node);
            }
        }

        while stack.len() > 1 {
            if let Some(unclosed) = stack.pop() {
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(unclosed);
                }
            }
        }

        stack.pop().map(|root| root.children).unwrap_or_default()
    }
}

struct TreeNode<'a> {
    line: Option<&'a SourceLine>,
    children: Vec<TreeNode<'a>>,
}

impl<'a> TreeNode<'a> {
    fn root() -> Self {
        Self {
            line: None,
            children: Vec::new(),
        }
    }

    fn leaf(line: &'a SourceLine) -> Self {
        Self {
            line: Some(line),
            children: Vec::new(),
        }
    }

    fn label(&self) -> String {
        match self.line {
            Some(source_line) => format!("{:>3}: {}", source_line.line, source_line.statement),
            None => "Program".to_string(),
        }
    }

    fn display_tree(&self, f: &mut Formatter<'_>, prefix: &str, is_last: bool) -> FmtResult {
        let connector = if is_last { "└── " } else { "├── " };
        writeln!(f, "{}{}{}", prefix, connector, self.label())?;

        let extension = if is_last { "    " } else { "│   " };
        let child_prefix = format!("{}{}", prefix, extension);

        let child_count = self.children.len();
        for (index, child) in self.children.iter().enumerate() {
            child.display_tree(f, &child_prefix, index == child_count - 1)?;
        }

        Ok(())
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "Program")?;
        let tree = self.build_tree();
        let count = tree.len();
        for (index, node) in tree.iter().enumerate() {
            node.display_tree(f, "", index == count - 1)?;
        }
        Ok(())
    }
}
