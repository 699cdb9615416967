//! C-- interpreter with generator-based execution for clean yield/resume semantics
//!
//! A running script is a `genawaiter` coroutine. It suspends whenever it needs
//! the host: to emit a line of output, to read a line of input, or to let the
//! UI redraw during a long loop. The host resumes it with the input reply (or
//! `None` for every other suspension).

use crate::script::error::ScriptError;
use crate::script::lexer::{Builtin, Lexer};
use crate::script::parser::{BinOp, Callee, Expr, Parser, Stmt, StmtKind};
use crate::script::value::{binary, unary, Value};
use async_recursion::async_recursion;
use genawaiter::rc::{Co, Gen};
use genawaiter::GeneratorState;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

/// Default time between UI ticks in long-running loops
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(16);

/// Why the interpreter yielded control
#[derive(Debug, Clone, PartialEq)]
pub enum Suspend {
    /// One console entry of program output
    Output(String),
    /// Waiting for a line of input; the payload is the prompt (may be empty)
    Input(String),
    /// Time slice used up, host may redraw
    Tick,
}

/// Value handed to the coroutine when it is resumed. Only an `Input`
/// suspension looks at it.
pub type Resume = Option<String>;

/// Outcome of one resume
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Suspended(Suspend),
    Finished(Result<(), ScriptError>),
}

/// A parsed program ready to run
#[derive(Debug, Clone)]
pub struct Program {
    statements: Vec<Stmt>,
}

impl Program {
    pub fn statements(&self) -> &[Stmt] {
        &self.statements
    }
}

/// Lex and parse source text
pub fn compile(source: &str) -> Result<Program, ScriptError> {
    let tokens = Lexer::new(source).tokenize();
    let statements = Parser::new(tokens).parse()?;
    Ok(Program { statements })
}

/// Variables and bookkeeping owned by the running coroutine
struct Env {
    variables: HashMap<String, Value>,
    /// Line of the statement being executed, for error reports
    line: usize,
    tick_interval: Duration,
    last_tick: Instant,
}

impl Env {
    fn new(tick_interval: Duration) -> Self {
        Self {
            variables: HashMap::new(),
            line: 0,
            tick_interval,
            last_tick: Instant::now(),
        }
    }

    fn error(&self, message: impl Into<String>) -> ScriptError {
        ScriptError::Runtime {
            line: self.line,
            message: message.into(),
        }
    }

    fn get(&self, name: &str) -> Result<Value, ScriptError> {
        self.variables
            .get(name)
            .cloned()
            .ok_or_else(|| self.error(format!("name '{}' is not defined", name)))
    }
}

/// Trait for resumable generators
trait Resumable {
    fn resume_gen(&mut self, reply: Resume) -> Step;
}

/// Wrapper to make Gen implement our Resumable trait
struct GenWrapper<F: Future<Output = Result<(), ScriptError>>> {
    gen: Gen<Suspend, Resume, F>,
}

impl<F: Future<Output = Result<(), ScriptError>>> Resumable for GenWrapper<F> {
    fn resume_gen(&mut self, reply: Resume) -> Step {
        match self.gen.resume_with(reply) {
            GeneratorState::Yielded(reason) => Step::Suspended(reason),
            GeneratorState::Complete(result) => Step::Finished(result),
        }
    }
}

type BoxedGenerator = Box<dyn Resumable>;

/// One execution of a program
pub struct Interpreter {
    generator: Option<BoxedGenerator>,
}

impl Interpreter {
    pub fn new(program: Program) -> Self {
        Self::with_tick_interval(program, DEFAULT_TICK_INTERVAL)
    }

    pub fn with_tick_interval(program: Program, tick_interval: Duration) -> Self {
        let gen = create_generator(program, tick_interval);
        Self {
            generator: Some(Box::new(GenWrapper { gen })),
        }
    }

    /// Run until the next suspension point or the end of the program.
    ///
    /// `reply` answers the previous `Suspend::Input`; it is ignored on the
    /// first resume and after any other suspension. Resuming a finished
    /// interpreter reports `Finished(Ok(()))` again.
    pub fn resume(&mut self, reply: Resume) -> Step {
        let Some(generator) = self.generator.as_mut() else {
            return Step::Finished(Ok(()));
        };
        let step = generator.resume_gen(reply);
        if let Step::Finished(_) = step {
            self.generator = None;
        }
        step
    }
}

/// Create a generator for program execution (standalone to avoid borrow issues)
fn create_generator(
    program: Program,
    tick_interval: Duration,
) -> Gen<Suspend, Resume, impl Future<Output = Result<(), ScriptError>>> {
    Gen::new(move |co: Co<Suspend, Resume>| async move {
        let mut env = Env::new(tick_interval);
        exec_block(&co, &mut env, &program.statements).await.map(|_| ())
    })
}

/// Result of executing a statement
#[derive(Debug, Clone, Copy, PartialEq)]
enum Flow {
    Next,
    Break,
    Continue,
}

/// Yield to the host if the current time slice is used up
async fn tick(co: &Co<Suspend, Resume>, env: &mut Env) {
    if env.last_tick.elapsed() >= env.tick_interval {
        co.yield_(Suspend::Tick).await;
        env.last_tick = Instant::now();
    }
}

#[async_recursion(?Send)]
async fn exec_block(co: &Co<Suspend, Resume>, env: &mut Env, statements: &[Stmt]) -> Result<Flow, ScriptError> {
    for stmt in statements {
        match exec_stmt(co, env, stmt).await? {
            Flow::Next => {}
            flow => return Ok(flow),
        }
    }
    Ok(Flow::Next)
}

#[async_recursion(?Send)]
async fn exec_stmt(co: &Co<Suspend, Resume>, env: &mut Env, stmt: &Stmt) -> Result<Flow, ScriptError> {
    env.line = stmt.line;

    match &stmt.kind {
        StmtKind::Expression(expr) => {
            eval(co, env, expr).await?;
        }

        StmtKind::Assign { name, op, value } => {
            let rhs = eval(co, env, value).await?;
            let new_value = match op {
                None => rhs,
                Some(op) => {
                    let current = env.get(name)?;
                    binary(*op, current, rhs).map_err(|m| env.error(m))?
                }
            };
            env.variables.insert(name.clone(), new_value);
        }

        StmtKind::Increment { name, delta } => {
            let current = env.get(name)?;
            let new_value = binary(BinOp::Add, current, Value::Int(*delta)).map_err(|m| env.error(m))?;
            env.variables.insert(name.clone(), new_value);
        }

        StmtKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            if eval(co, env, condition).await?.is_truthy() {
                return exec_block(co, env, then_branch).await;
            } else if let Some(else_branch) = else_branch {
                return exec_block(co, env, else_branch).await;
            }
        }

        StmtKind::While { condition, body } => loop {
            env.line = stmt.line;
            if !eval(co, env, condition).await?.is_truthy() {
                break;
            }
            if exec_block(co, env, body).await? == Flow::Break {
                break;
            }
            tick(co, env).await;
        },

        StmtKind::For {
            init,
            condition,
            update,
            body,
        } => {
            if let Some(init) = init {
                exec_stmt(co, env, init).await?;
            }
            loop {
                if let Some(condition) = condition {
                    env.line = stmt.line;
                    if !eval(co, env, condition).await?.is_truthy() {
                        break;
                    }
                }
                if exec_block(co, env, body).await? == Flow::Break {
                    break;
                }
                if let Some(update) = update {
                    exec_stmt(co, env, update).await?;
                }
                tick(co, env).await;
            }
        }

        StmtKind::Block(statements) => return exec_block(co, env, statements).await,

        StmtKind::Break => return Ok(Flow::Break),
        StmtKind::Continue => return Ok(Flow::Continue),
    }

    Ok(Flow::Next)
}

#[async_recursion(?Send)]
async fn eval(co: &Co<Suspend, Resume>, env: &mut Env, expr: &Expr) -> Result<Value, ScriptError> {
    match expr {
        Expr::Integer(n) => Ok(Value::Int(*n)),
        Expr::Float(f) => Ok(Value::Float(*f)),
        Expr::String(s) => Ok(Value::Str(s.clone())),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Variable(name) => env.get(name),

        Expr::UnaryOp(op, operand) => {
            let value = eval(co, env, operand).await?;
            unary(*op, value).map_err(|m| env.error(m))
        }

        Expr::BinaryOp(left, BinOp::And, right) => {
            if !eval(co, env, left).await?.is_truthy() {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(eval(co, env, right).await?.is_truthy()))
        }

        Expr::BinaryOp(left, BinOp::Or, right) => {
            if eval(co, env, left).await?.is_truthy() {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(eval(co, env, right).await?.is_truthy()))
        }

        Expr::BinaryOp(left, op, right) => {
            let l = eval(co, env, left).await?;
            let r = eval(co, env, right).await?;
            binary(*op, l, r).map_err(|m| env.error(m))
        }

        Expr::Call(callee, args) => {
            let builtin = match callee {
                Callee::Builtin(b) => *b,
                Callee::Named(name) => return Err(env.error(format!("name '{}' is not defined", name))),
            };
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval(co, env, arg).await?);
            }
            call_builtin(co, env, builtin, values).await
        }
    }
}

fn join_display(values: &[Value]) -> String {
    values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ")
}

fn single_arg(env: &Env, builtin: Builtin, mut args: Vec<Value>) -> Result<Value, ScriptError> {
    if args.len() != 1 {
        return Err(env.error(format!(
            "{}() takes exactly one argument ({} given)",
            builtin.name(),
            args.len()
        )));
    }
    Ok(args.remove(0))
}

/// Call a built-in function
async fn call_builtin(
    co: &Co<Suspend, Resume>,
    env: &mut Env,
    builtin: Builtin,
    args: Vec<Value>,
) -> Result<Value, ScriptError> {
    match builtin {
        Builtin::Print | Builtin::Output => {
            co.yield_(Suspend::Output(join_display(&args))).await;
            Ok(Value::Str(String::new()))
        }

        Builtin::Input => {
            if args.len() > 1 {
                return Err(env.error(format!(
                    "input() takes at most 1 argument ({} given)",
                    args.len()
                )));
            }
            let prompt = args.first().map(|v| v.to_string()).unwrap_or_default();
            let reply = co.yield_(Suspend::Input(prompt)).await;
            // Reading input can take arbitrarily long; restart the time slice
            env.last_tick = Instant::now();
            Ok(Value::Str(reply.unwrap_or_default()))
        }

        Builtin::Str => Ok(Value::Str(single_arg(env, builtin, args)?.to_string())),

        Builtin::Int => match single_arg(env, builtin, args)? {
            Value::Int(i) => Ok(Value::Int(i)),
            Value::Bool(b) => Ok(Value::Int(b as i64)),
            Value::Float(f) => float_to_int(env, f.trunc()),
            Value::Str(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| env.error(format!("invalid literal for int(): '{}'", s))),
        },

        Builtin::Float => match single_arg(env, builtin, args)? {
            Value::Int(i) => Ok(Value::Float(i as f64)),
            Value::Bool(b) => Ok(Value::Float(if b { 1.0 } else { 0.0 })),
            Value::Float(f) => Ok(Value::Float(f)),
            Value::Str(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| env.error(format!("could not convert string to float: '{}'", s))),
        },

        Builtin::Len => match single_arg(env, builtin, args)? {
            Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
            other => Err(env.error(format!("object of type '{}' has no len()", other.type_name()))),
        },

        Builtin::Abs => match single_arg(env, builtin, args)? {
            Value::Int(i) => Ok(i.checked_abs().map_or(Value::Float((i as f64).abs()), Value::Int)),
            Value::Bool(b) => Ok(Value::Int(b as i64)),
            Value::Float(f) => Ok(Value::Float(f.abs())),
            other => Err(env.error(format!("bad operand type for abs(): '{}'", other.type_name()))),
        },

        Builtin::Round => match single_arg(env, builtin, args)? {
            Value::Int(i) => Ok(Value::Int(i)),
            Value::Bool(b) => Ok(Value::Int(b as i64)),
            Value::Float(f) => float_to_int(env, f.round_ties_even()),
            other => Err(env.error(format!("type {} doesn't define round()", other.type_name()))),
        },

        Builtin::Min | Builtin::Max => {
            let wanted = if builtin == Builtin::Min {
                Ordering::Less
            } else {
                Ordering::Greater
            };
            let mut values = args.into_iter();
            let Some(mut best) = values.next() else {
                return Err(env.error(format!("{}() expected at least 1 argument, got 0", builtin.name())));
            };
            for value in values {
                let ordering = value.compare(&best).map_err(|()| {
                    env.error(format!(
                        "{}() cannot compare '{}' and '{}'",
                        builtin.name(),
                        value.type_name(),
                        best.type_name()
                    ))
                })?;
                if ordering == Some(wanted) {
                    best = value;
                }
            }
            Ok(best)
        }
    }
}

fn float_to_int(env: &Env, f: f64) -> Result<Value, ScriptError> {
    if !f.is_finite() {
        return Err(env.error(format!("cannot convert float {} to integer", f)));
    }
    if f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Ok(Value::Int(f as i64))
    } else {
        Ok(Value::Float(f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Run a program to completion, answering input requests from `inputs`.
    /// Returns the output lines (prompts prefixed with `?`) and the result.
    fn run(source: &str, inputs: &[&str]) -> (Vec<String>, Result<(), ScriptError>) {
        let program = compile(source).expect("Should parse");
        let mut interp = Interpreter::with_tick_interval(program, Duration::from_secs(3600));
        let mut inputs = inputs.iter();
        let mut output = Vec::new();
        let mut reply = None;
        loop {
            match interp.resume(reply.take()) {
                Step::Suspended(Suspend::Output(text)) => output.push(text),
                Step::Suspended(Suspend::Input(prompt)) => {
                    output.push(format!("?{}", prompt));
                    reply = inputs.next().map(|s| s.to_string());
                }
                Step::Suspended(Suspend::Tick) => {}
                Step::Finished(result) => return (output, result),
            }
        }
    }

    fn run_ok(source: &str) -> Vec<String> {
        let (output, result) = run(source, &[]);
        result.expect("Should run");
        output
    }

    #[test]
    fn test_print_joins_arguments() {
        assert_eq!(run_ok("print(\"a\", 1, 2.0, true);"), vec!["a 1 2 true"]);
        assert_eq!(run_ok("print();"), vec![""]);
    }

    #[test]
    fn test_input_round_trip() {
        let (output, result) = run("name = input(\"Who?\")\nprint(\"hi \" + name)", &["Ann"]);
        result.expect("Should run");
        assert_eq!(output, vec!["?Who?", "hi Ann"]);
    }

    #[test]
    fn test_for_loop_with_type_prefix() {
        let output = run_ok("for (int i = 0; i < 3; i++) {\n    print(i);\n}");
        assert_eq!(output, vec!["0", "1", "2"]);
    }

    #[test]
    fn test_while_break_continue() {
        let src = "i = 0\nwhile (true) {\n i += 1\n if (i % 2 == 0) { continue; }\n if (i > 5) { break; }\n print(i)\n}";
        assert_eq!(run_ok(src), vec!["1", "3", "5"]);
    }

    #[test]
    fn test_else_if_chain() {
        let src = "for (x = -1; x <= 1; x++) {\n if (x == 0) { print(\"zero\") } else if (x > 0) { print(\"pos\") } else { print(\"neg\") }\n}";
        assert_eq!(run_ok(src), vec!["neg", "zero", "pos"]);
    }

    #[test]
    fn test_short_circuit() {
        // The right operand would fail if evaluated
        assert_eq!(run_ok("print(false && missing, true || missing)"), vec!["false true"]);
    }

    #[test]
    fn test_undefined_variable_reports_line() {
        let (output, result) = run("print(1)\nprint(y)", &[]);
        assert_eq!(output, vec!["1"]);
        let err = result.expect_err("Should fail");
        assert_eq!(err.line(), 2);
        assert_eq!(err.to_string(), "line 2: name 'y' is not defined");
    }

    #[test]
    fn test_unknown_function() {
        let (_, result) = run("foo(1)", &[]);
        assert!(result.expect_err("Should fail").to_string().contains("name 'foo' is not defined"));
    }

    #[test]
    fn test_conversions() {
        let src = "print(int(\"42\") + 1, float(\"2.5\"), str(3) + \"!\", len(\"héllo\"), int(3.9), round(2.5), round(3.5))";
        assert_eq!(run_ok(src), vec!["43 2.5 3! 5 3 2 4"]);
        let (_, result) = run("int(\"abc\")", &[]);
        assert!(result.is_err());
    }

    #[test]
    fn test_min_max_abs() {
        assert_eq!(run_ok("print(min(3, 1, 2), max(3, 1.5), abs(-4))"), vec!["1 3 4"]);
    }

    #[test]
    fn test_division_by_zero_inside_loop() {
        let src = "total = 0\nfor (i = 3; i >= 0; i--) {\n total += 6 / i\n}";
        let (_, result) = run(src, &[]);
        assert_eq!(result.expect_err("Should fail").line(), 3);
    }

    #[test]
    fn test_compound_assignment() {
        assert_eq!(run_ok("x = 10\nx -= 3\nx *= 2\nx /= 7\nprint(x)"), vec!["2"]);
    }

    #[test]
    fn test_empty_reply_when_none() {
        let (output, result) = run("x = input()\nprint(len(x))", &[]);
        result.expect("Should run");
        assert_eq!(output, vec!["?", "0"]);
    }

    #[test]
    fn test_tick_yields_in_loops() {
        let program = compile("i = 0\nwhile (i < 3) { i++ }").expect("Should parse");
        let mut interp = Interpreter::with_tick_interval(program, Duration::ZERO);
        let mut ticks = 0;
        loop {
            match interp.resume(None) {
                Step::Suspended(Suspend::Tick) => ticks += 1,
                Step::Suspended(other) => panic!("unexpected {:?}", other),
                Step::Finished(result) => {
                    result.expect("Should run");
                    break;
                }
            }
        }
        assert_eq!(ticks, 3);
        assert_eq!(interp.resume(None), Step::Finished(Ok(())));
    }
}
