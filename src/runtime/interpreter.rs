use std::cmp::Ordering;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::Limits;
use super::errors::RuntimeError;
use super::sink::OutputSink;
use super::syntax::{BinaryOp, DeclKind, Expr, LogicalOp, Script, Stmt, UnaryOp};
use super::value::Value;

// Reading the clock on every step would dominate tight loops.
const CLOCK_CHECK_INTERVAL: u64 = 256;

#[derive(Debug, Clone)]
struct Binding {
    /// `None` until the `let`/`const` declaration runs.
    value: Option<Value>,
    constant: bool,
}

type Scope = HashMap<String, Binding>;

/// Scope for a block about to run, holding its `let`/`const` names as
/// uninitialised bindings.
fn lexical_scope(stmts: &[Stmt]) -> Scope {
    stmts
        .iter()
        .filter_map(|stmt| match stmt {
            Stmt::Declare {
                kind: DeclKind::Let | DeclKind::Const,
                name,
                ..
            } => Some((
                name.clone(),
                Binding {
                    value: None,
                    constant: false,
                },
            )),
            _ => None,
        })
        .collect()
}

struct Budget {
    max_steps: Option<u64>,
    timeout: Option<Duration>,
    started: Instant,
    steps: u64,
}

impl Budget {
    fn new(limits: &Limits) -> Self {
        Self {
            max_steps: limits.max_steps,
            timeout: limits.timeout,
            started: Instant::now(),
            steps: 0,
        }
    }

    fn tick(&mut self) -> Result<(), RuntimeError> {
        self.steps += 1;

        if let Some(limit) = self.max_steps {
            if self.steps > limit {
                return Err(RuntimeError::StepLimit { limit });
            }
        }

        if let Some(timeout) = self.timeout {
            if self.steps % CLOCK_CHECK_INTERVAL == 0 && self.started.elapsed() > timeout {
                return Err(RuntimeError::TimeLimit {
                    limit_ms: timeout.as_millis(),
                });
            }
        }

        Ok(())
    }
}

/// Tree-walking evaluator for a compiled [`Script`].
///
/// Every statement execution and loop iteration costs one step against the
/// budget. The output sink is the only way a script can affect the outside.
pub struct Interpreter<'s> {
    scopes: Vec<Scope>,
    sink: &'s mut dyn OutputSink,
    budget: Budget,
}

impl<'s> Interpreter<'s> {
    pub fn new(sink: &'s mut dyn OutputSink, limits: &Limits) -> Self {
        Self {
            scopes: vec![Scope::new()],
            sink,
            budget: Budget::new(limits),
        }
    }

    pub fn steps(&self) -> u64 {
        self.budget.steps
    }

    pub fn run(&mut self, script: &Script) -> Result<(), RuntimeError> {
        let mut root = lexical_scope(&script.body);
        for name in script.var_names() {
            root.entry(name.to_string()).or_insert(Binding {
                value: Some(Value::Undefined),
                constant: false,
            });
        }
        self.scopes = vec![root];
        self.exec_all(&script.body)
    }

    fn exec_all(&mut self, stmts: &[Stmt]) -> Result<(), RuntimeError> {
        for stmt in stmts {
            self.exec(stmt)?;
        }
        Ok(())
    }

    fn exec_block(&mut self, stmts: &[Stmt]) -> Result<(), RuntimeError> {
        self.scopes.push(lexical_scope(stmts));
        let result = self.exec_all(stmts);
        self.scopes.pop();
        result
    }

    fn exec(&mut self, stmt: &Stmt) -> Result<(), RuntimeError> {
        self.budget.tick()?;

        match stmt {
            Stmt::Declare { kind, name, init } => {
                let value = match init {
                    Some(expr) => Some(self.eval(expr)?),
                    None => None,
                };
                self.declare(*kind, name, value);
                Ok(())
            }
            Stmt::Assign { name, op, value } => {
                let rhs = self.eval(value)?;
                let updated = match op {
                    Some(op) => apply_binary(op.binary(), self.lookup(name)?, rhs),
                    None => rhs,
                };
                self.assign(name, updated)
            }
            Stmt::Update { name, delta } => {
                let current = self.lookup(name)?.to_number();
                self.assign(name, Value::Number(current + delta))
            }
            Stmt::Console { method, args } => {
                let mut parts = Vec::with_capacity(args.len());
                for arg in args {
                    parts.push(self.eval(arg)?.to_string());
                }
                if method != "log" {
                    return Err(RuntimeError::NotAFunction {
                        callee: format!("console.{}", method),
                    });
                }
                self.sink.capture(parts.join(" "));
                Ok(())
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.eval(condition)?.is_truthy() {
                    self.exec_block(then_branch)
                } else if let Some(otherwise) = else_branch {
                    self.exec_block(otherwise)
                } else {
                    Ok(())
                }
            }
            Stmt::For {
                init,
                condition,
                update,
                body,
            } => {
                let init_scope = match init {
                    Some(init) => lexical_scope(std::slice::from_ref(init.as_ref())),
                    None => Scope::new(),
                };
                self.scopes.push(init_scope);
                let result = self.exec_for(init.as_deref(), condition.as_ref(), update.as_deref(), body);
                self.scopes.pop();
                result
            }
            Stmt::While { condition, body } => {
                loop {
                    if !self.eval(condition)?.is_truthy() {
                        return Ok(());
                    }
                    self.exec_block(body)?;
                    self.budget.tick()?;
                }
            }
            Stmt::Block(body) => self.exec_block(body),
            Stmt::Expr(expr) => self.eval(expr).map(|_| ()),
            Stmt::Empty => Ok(()),
        }
    }

    fn exec_for(
        &mut self,
        init: Option<&Stmt>,
        condition: Option<&Expr>,
        update: Option<&Stmt>,
        body: &[Stmt],
    ) -> Result<(), RuntimeError> {
        if let Some(init) = init {
            self.exec(init)?;
        }

        loop {
            if let Some(condition) = condition {
                if !self.eval(condition)?.is_truthy() {
                    return Ok(());
                }
            }
            self.exec_block(body)?;
            match update {
                Some(update) => self.exec(update)?,
                None => self.budget.tick()?,
            }
        }
    }

    /// `var` bindings already exist in the root scope, so a `var` without an
    /// initializer leaves the current value alone.
    fn declare(&mut self, kind: DeclKind, name: &str, value: Option<Value>) {
        let (scope, value) = match kind {
            DeclKind::Var => match value {
                Some(value) => (self.scopes.first_mut(), value),
                None => return,
            },
            DeclKind::Let | DeclKind::Const => {
                (self.scopes.last_mut(), value.unwrap_or(Value::Undefined))
            }
        };
        if let Some(scope) = scope {
            scope.insert(
                name.to_string(),
                Binding {
                    value: Some(value),
                    constant: kind == DeclKind::Const,
                },
            );
        }
    }

    fn lookup(&self, name: &str) -> Result<Value, RuntimeError> {
        let binding = self
            .scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .ok_or_else(|| RuntimeError::NotDefined {
                name: name.to_string(),
            })?;

        binding
            .value
            .clone()
            .ok_or_else(|| RuntimeError::Uninitialized {
                name: name.to_string(),
            })
    }

    fn assign(&mut self, name: &str, value: Value) -> Result<(), RuntimeError> {
        let binding = self
            .scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(name))
            .ok_or_else(|| RuntimeError::NotDefined {
                name: name.to_string(),
            })?;

        if binding.value.is_none() {
            return Err(RuntimeError::Uninitialized {
                name: name.to_string(),
            });
        }
        if binding.constant {
            return Err(RuntimeError::ConstAssignment {
                name: name.to_string(),
            });
        }
        binding.value = Some(value);
        Ok(())
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Null => Ok(Value::Null),
            Expr::Undefined => Ok(Value::Undefined),
            Expr::Ident(name) => self.lookup(name),
            Expr::Unary(op, operand) => {
                let value = self.eval(operand)?;
                Ok(match op {
                    UnaryOp::Not => Value::Bool(!value.is_truthy()),
                    UnaryOp::Negate => Value::Number(-value.to_number()),
                    UnaryOp::Plus => Value::Number(value.to_number()),
                })
            }
            Expr::Binary(op, lhs, rhs) => {
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                Ok(apply_binary(*op, lhs, rhs))
            }
            Expr::Logical(op, lhs, rhs) => {
                let lhs = self.eval(lhs)?;
                let short_circuits = match op {
                    LogicalOp::And => !lhs.is_truthy(),
                    LogicalOp::Or => lhs.is_truthy(),
                };
                if short_circuits {
                    Ok(lhs)
                } else {
                    self.eval(rhs)
                }
            }
        }
    }
}

pub fn apply_binary(op: BinaryOp, lhs: Value, rhs: Value) -> Value {
    match op {
        BinaryOp::Add => match (&lhs, &rhs) {
            (Value::Str(_), _) | (_, Value::Str(_)) => Value::Str(format!("{}{}", lhs, rhs)),
            _ => Value::Number(lhs.to_number() + rhs.to_number()),
        },
        BinaryOp::Sub => Value::Number(lhs.to_number() - rhs.to_number()),
        BinaryOp::Mul => Value::Number(lhs.to_number() * rhs.to_number()),
        BinaryOp::Div => Value::Number(lhs.to_number() / rhs.to_number()),
        BinaryOp::Rem => Value::Number(lhs.to_number() % rhs.to_number()),
        BinaryOp::Lt => Value::Bool(compare(&lhs, &rhs) == Some(Ordering::Less)),
        BinaryOp::Le => Value::Bool(matches!(
            compare(&lhs, &rhs),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::Gt => Value::Bool(compare(&lhs, &rhs) == Some(Ordering::Greater)),
        BinaryOp::Ge => Value::Bool(matches!(
            compare(&lhs, &rhs),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        BinaryOp::Eq => Value::Bool(lhs.loose_equals(&rhs)),
        BinaryOp::NotEq => Value::Bool(!lhs.loose_equals(&rhs)),
        BinaryOp::StrictEq => Value::Bool(lhs.strict_equals(&rhs)),
        BinaryOp::StrictNotEq => Value::Bool(!lhs.strict_equals(&rhs)),
    }
}

/// Relational comparison; `None` when either side is NaN. Strings compare by
/// UTF-16 code units.
fn compare(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    match (lhs, rhs) {
        (Value::Str(a), Value::Str(b)) => Some(a.encode_utf16().cmp(b.encode_utf16())),
        _ => lhs.to_number().partial_cmp(&rhs.to_number()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::sink::MockOutputSink;
    use mockall::Sequence;
    use mockall::predicate::eq;

    fn run(code: &str, limits: &Limits) -> (Result<(), RuntimeError>, Vec<String>) {
        let script = Script::compile(code).expect("script should compile");
        let mut log: Vec<String> = Vec::new();
        let result = Interpreter::new(&mut log, limits).run(&script);
        (result, log)
    }

    #[test]
    fn test_prints_reach_the_sink_in_order() {
        let script = Script::compile(
            "let x = 10;\nlet y = 5;\nconsole.log(\"X is \" + x);\nconsole.log(x * y, 'done');",
        )
        .unwrap();

        let mut sink = MockOutputSink::new();
        let mut seq = Sequence::new();
        sink.expect_capture()
            .with(eq("X is 10".to_string()))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        sink.expect_capture()
            .with(eq("50 done".to_string()))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());

        let result = Interpreter::new(&mut sink, &Limits::default()).run(&script);
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_nothing_is_captured_after_a_fault() {
        let script = Script::compile("console.log(1);\nconsole.log(missing);\nconsole.log(2);").unwrap();

        let mut sink = MockOutputSink::new();
        sink.expect_capture()
            .with(eq("1".to_string()))
            .times(1)
            .return_const(());

        let result = Interpreter::new(&mut sink, &Limits::default()).run(&script);
        assert_eq!(
            result,
            Err(RuntimeError::NotDefined {
                name: "missing".to_string()
            })
        );
    }

    #[test]
    fn test_for_loop_counts() {
        let (result, log) = run(
            "for (let i_0 = 0; i_0 < 3; i_0++) {\n  console.log(\"row \" + i_0);\n}",
            &Limits::default(),
        );

        assert_eq!(result, Ok(()));
        assert_eq!(log, vec!["row 0", "row 1", "row 2"]);
    }

    #[test]
    fn test_loop_counter_is_scoped_to_the_loop() {
        let (result, log) = run(
            "for (let i = 0; i < 1; i++) { }\nconsole.log(i);",
            &Limits::default(),
        );

        assert_eq!(log, Vec::<String>::new());
        assert_eq!(
            result,
            Err(RuntimeError::NotDefined {
                name: "i".to_string()
            })
        );
    }

    #[test]
    fn test_block_scoping_and_shadowing() {
        let (result, log) = run(
            "let x = 1;\nif (true) {\n  let x = 2;\n  console.log(x);\n}\nconsole.log(x);",
            &Limits::default(),
        );

        assert_eq!(result, Ok(()));
        assert_eq!(log, vec!["2", "1"]);
    }

    #[test]
    fn test_assignment_updates_enclosing_binding() {
        let (_, log) = run(
            "let total = 0;\nfor (let i = 1; i <= 4; i++) {\n  total += i;\n}\nconsole.log(total);",
            &Limits::default(),
        );

        assert_eq!(log, vec!["10"]);
    }

    #[test]
    fn test_const_cannot_be_reassigned() {
        let (result, _) = run("const c = 1;\nc = 2;", &Limits::default());

        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "Assignment to constant variable.");
    }

    #[test]
    fn test_assignment_to_undeclared_name_fails() {
        let (result, _) = run("ghost = 1;", &Limits::default());

        assert_eq!(result.unwrap_err().to_string(), "ghost is not defined");
    }

    #[test]
    fn test_unknown_console_method_fails_after_evaluating_arguments() {
        let (result, _) = run("console.warn(1);", &Limits::default());
        assert_eq!(
            result.unwrap_err().to_string(),
            "console.warn is not a function"
        );

        let (result, _) = run("console.warn(nope);", &Limits::default());
        assert_eq!(result.unwrap_err().to_string(), "nope is not defined");
    }

    #[test]
    fn test_step_budget_stops_runaway_loops() {
        let limits = Limits {
            max_steps: Some(50),
            timeout: None,
        };
        let (result, log) = run("while (true) { console.log(\"tick\"); }", &limits);

        assert_eq!(result, Err(RuntimeError::StepLimit { limit: 50 }));
        assert!(!log.is_empty());
        assert!(log.len() < 50);
    }

    #[test]
    fn test_time_budget_stops_runaway_loops() {
        let limits = Limits {
            max_steps: None,
            timeout: Some(Duration::from_millis(20)),
        };
        let (result, _) = run("let n = 0;\nwhile (true) { n++; }", &limits);

        assert_eq!(result, Err(RuntimeError::TimeLimit { limit_ms: 20 }));
    }

    #[test]
    fn test_logical_operators_short_circuit() {
        let (result, log) = run(
            "console.log(false && missing, 0 || \"fallback\", 1 && 2);",
            &Limits::default(),
        );

        assert_eq!(result, Ok(()));
        assert_eq!(log, vec!["false fallback 2"]);
    }

    #[test]
    fn test_var_is_visible_after_its_block() {
        let (result, log) = run("if (true) { var v = 3; }\nconsole.log(v);", &Limits::default());

        assert_eq!(result, Ok(()));
        assert_eq!(log, vec!["3"]);
    }

    #[test]
    fn test_reading_a_let_before_its_declaration_fails() {
        let (result, log) = run(
            "let total = 0;\nfor (let i_0 = 0; i_0 < 3; i_0++) {\n  let total = total + 1;\n}\nconsole.log(total);",
            &Limits::default(),
        );

        assert_eq!(log, Vec::<String>::new());
        assert_eq!(
            result,
            Err(RuntimeError::Uninitialized {
                name: "total".to_string()
            })
        );
        assert_eq!(
            result.unwrap_err().to_string(),
            "Cannot access 'total' before initialization"
        );
    }

    #[test]
    fn test_top_level_let_is_uninitialised_until_declared() {
        let (result, log) = run("console.log(x);\nlet x = 1;", &Limits::default());
        assert!(log.is_empty());
        assert_eq!(
            result,
            Err(RuntimeError::Uninitialized {
                name: "x".to_string()
            })
        );

        let (result, _) = run("x = 2;\nlet x = 1;", &Limits::default());
        assert_eq!(
            result,
            Err(RuntimeError::Uninitialized {
                name: "x".to_string()
            })
        );
    }

    #[test]
    fn test_let_without_initializer_is_undefined() {
        let (result, log) = run("let x;\nconsole.log(x);\nx = 4;\nconsole.log(x);", &Limits::default());

        assert_eq!(result, Ok(()));
        assert_eq!(log, vec!["undefined", "4"]);
    }

    #[test]
    fn test_var_is_hoisted_as_undefined() {
        let (result, log) = run(
            "console.log(v);\nvar v = 1;\nconsole.log(v);\nvar v;\nconsole.log(v);",
            &Limits::default(),
        );

        assert_eq!(result, Ok(()));
        assert_eq!(log, vec!["undefined", "1", "1"]);
    }

    #[test]
    fn test_var_inside_a_block_is_hoisted_to_the_top() {
        let (result, log) = run(
            "console.log(w);\nif (true) {\n  var w = \"set\";\n}\nconsole.log(w);",
            &Limits::default(),
        );

        assert_eq!(result, Ok(()));
        assert_eq!(log, vec!["undefined", "set"]);
    }

    #[test]
    fn test_strings_compare_by_utf16_code_units() {
        let s = |v: &str| Value::Str(v.to_string());

        // U+1F600 encodes as a surrogate pair starting at 0xD83D, below U+FF61.
        assert_eq!(apply_binary(BinaryOp::Lt, s("\u{1F600}"), s("\u{FF61}")), Value::Bool(true));
        assert_eq!(apply_binary(BinaryOp::Gt, s("\u{1F600}"), s("\u{FF61}")), Value::Bool(false));
    }

    #[test]
    fn test_binary_coercions() {
        let n = |v: f64| Value::Number(v);
        let s = |v: &str| Value::Str(v.to_string());

        assert_eq!(apply_binary(BinaryOp::Add, s("X is "), n(10.0)), s("X is 10"));
        assert_eq!(apply_binary(BinaryOp::Add, n(1.0), Value::Bool(true)), n(2.0));
        assert_eq!(apply_binary(BinaryOp::Sub, s("10"), n(4.0)), n(6.0));
        assert_eq!(apply_binary(BinaryOp::Rem, n(-7.0), n(3.0)), n(-1.0));
        assert_eq!(apply_binary(BinaryOp::Div, n(1.0), n(0.0)), n(f64::INFINITY));
        assert_eq!(apply_binary(BinaryOp::Gt, n(9001.0), n(9000.0)), Value::Bool(true));
        assert_eq!(apply_binary(BinaryOp::Lt, s("apple"), s("banana")), Value::Bool(true));
        assert_eq!(apply_binary(BinaryOp::Lt, s("10"), s("9")), Value::Bool(true));
        assert_eq!(apply_binary(BinaryOp::Lt, n(f64::NAN), n(1.0)), Value::Bool(false));
        assert_eq!(apply_binary(BinaryOp::Ge, n(2.0), s("2")), Value::Bool(true));
    }
}
