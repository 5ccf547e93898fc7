use std::collections::HashMap;

use super::errors::CompileError;
use super::grammar::script;

/// Deepest bracket nesting (`{`, `(`, `[`) a script may use. Parsing and
/// evaluation recurse once per level.
pub const MAX_NESTING_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Let,
    Const,
    Var,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negate,
    Plus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

/// Compound assignment operator; `None` in [`Stmt::Assign`] is plain `=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl AssignOp {
    pub fn binary(self) -> BinaryOp {
        match self {
            AssignOp::Add => BinaryOp::Add,
            AssignOp::Sub => BinaryOp::Sub,
            AssignOp::Mul => BinaryOp::Mul,
            AssignOp::Div => BinaryOp::Div,
            AssignOp::Rem => BinaryOp::Rem,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Str(String),
    Bool(bool),
    Null,
    Undefined,
    Ident(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Logical(LogicalOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary(op, Box::new(operand))
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn logical(op: LogicalOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Logical(op, Box::new(lhs), Box::new(rhs))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Declare {
        kind: DeclKind,
        name: String,
        init: Option<Expr>,
    },
    Assign {
        name: String,
        op: Option<AssignOp>,
        value: Expr,
    },
    /// `x++` / `++x` (delta 1) and `x--` / `--x` (delta -1).
    Update { name: String, delta: f64 },
    Console { method: String, args: Vec<Expr> },
    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
    },
    For {
        init: Option<Box<Stmt>>,
        condition: Option<Expr>,
        update: Option<Box<Stmt>>,
        body: Vec<Stmt>,
    },
    While { condition: Expr, body: Vec<Stmt> },
    Block(Vec<Stmt>),
    Expr(Expr),
    Empty,
}

/// A parsed and statically checked program, ready to run.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub body: Vec<Stmt>,
}

impl Script {
    pub fn compile(code: &str) -> Result<Self, CompileError> {
        check_nesting(code)?;
        let body = script::program(code).map_err(|e| CompileError::Parse(e.to_string()))?;
        check_block(&body)?;
        Ok(Self { body })
    }

    /// Every `var` name in the script, at any depth, in source order.
    pub fn var_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        collect_var_names(&self.body, &mut names);
        names
    }
}

/// Reject scripts nested deeper than [`MAX_NESTING_DEPTH`] before the
/// recursive parser sees them. Brackets inside strings and comments do not
/// count.
fn check_nesting(code: &str) -> Result<(), CompileError> {
    let mut depth = 0usize;
    let mut chars = code.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' | '\'' => {
                while let Some(next) = chars.next() {
                    match next {
                        '\\' => {
                            chars.next();
                        }
                        '\n' => break,
                        _ if next == c => break,
                        _ => {}
                    }
                }
            }
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut previous = '\0';
                for next in chars.by_ref() {
                    if previous == '*' && next == '/' {
                        break;
                    }
                    previous = next;
                }
            }
            '{' | '(' | '[' => {
                depth += 1;
                if depth > MAX_NESTING_DEPTH {
                    return Err(CompileError::TooDeep {
                        limit: MAX_NESTING_DEPTH,
                    });
                }
            }
            '}' | ')' | ']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    Ok(())
}

/// Lexical declaration rules checked before execution: no duplicate
/// `let`/`const` in one block, every `const` is initialised, and no `var`
/// anywhere inside the block reuses one of its `let`/`const` names.
fn check_block(stmts: &[Stmt]) -> Result<(), CompileError> {
    let mut declared: HashMap<&str, DeclKind> = HashMap::new();

    for stmt in stmts {
        if let Stmt::Declare { kind, name, init } = stmt {
            declare(&mut declared, *kind, name, init.is_some())?;
        }
        check_nested(stmt)?;
    }

    let mut vars = Vec::new();
    collect_var_names(stmts, &mut vars);
    for name in vars {
        if matches!(
            declared.get(name),
            Some(DeclKind::Let | DeclKind::Const)
        ) {
            return Err(CompileError::Redeclared {
                name: name.to_string(),
            });
        }
    }

    Ok(())
}

fn collect_var_names<'a>(stmts: &'a [Stmt], names: &mut Vec<&'a str>) {
    for stmt in stmts {
        match stmt {
            Stmt::Declare {
                kind: DeclKind::Var,
                name,
                ..
            } => names.push(name),
            Stmt::If {
                then_branch,
                else_branch,
                ..
            } => {
                collect_var_names(then_branch, names);
                if let Some(otherwise) = else_branch {
                    collect_var_names(otherwise, names);
                }
            }
            Stmt::For { init, body, .. } => {
                if let Some(init) = init {
                    collect_var_names(std::slice::from_ref(init.as_ref()), names);
                }
                collect_var_names(body, names);
            }
            Stmt::While { body, .. } | Stmt::Block(body) => collect_var_names(body, names),
            _ => {}
        }
    }
}

fn declare<'a>(
    declared: &mut HashMap<&'a str, DeclKind>,
    kind: DeclKind,
    name: &'a str,
    initialised: bool,
) -> Result<(), CompileError> {
    if kind == DeclKind::Const && !initialised {
        return Err(CompileError::MissingInitializer {
            name: name.to_string(),
        });
    }

    match declared.insert(name, kind) {
        Some(DeclKind::Var) if kind == DeclKind::Var => Ok(()),
        Some(_) => Err(CompileError::Redeclared {
            name: name.to_string(),
        }),
        None => Ok(()),
    }
}

fn check_nested(stmt: &Stmt) -> Result<(), CompileError> {
    match stmt {
        Stmt::If {
            then_branch,
            else_branch,
            ..
        } => {
            check_block(then_branch)?;
            if let Some(otherwise) = else_branch {
                check_block(otherwise)?;
            }
            Ok(())
        }
        Stmt::For { init, body, .. } => {
            if let Some(init) = init {
                check_block(std::slice::from_ref(init.as_ref()))?;
            }
            check_block(body)
        }
        Stmt::While { body, .. } | Stmt::Block(body) => check_block(body),
        _ => Ok(()),
    }
}
