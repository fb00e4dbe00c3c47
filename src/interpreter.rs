use crate::coerce::try_coerce;
use crate::command::{Args, Target};
use crate::dispatch::dispatch;
use crate::env::Environment;
use crate::error::{ConsoleError, Result};
use crate::logger::{Logger, TracingLogger};
use crate::parser::{self, Arg, Expr};
use crate::registry::Registry;
use crate::value::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// Construction-time options for an [`Interpreter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleSettings {
    /// Only expose operations declared with [`crate::CommandTable::command`].
    pub require_marking: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            require_marking: true,
        }
    }
}

/// Evaluates console lines against the operations of registered targets.
///
/// A line is one of:
/// - `Name`, `Name()`, `Name arg` or `Name(a, Other(b), c)` — a call
/// - `var = <call>` — a call whose non-empty result is stored as `var`
/// - `var` — the value previously stored as `var`
///
/// Example
/// ```
/// use command_console::{Args, CommandTable, Interpreter, ParamType, Target, Value};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// struct Math;
///
/// impl Target for Math {
///     fn declare(table: &mut CommandTable<Self>) {
///         table
///             .command("Add", |_: &mut Math, args: &Args| {
///                 Ok(Some((args.int(0)? + args.int(1)?).into()))
///             })
///             .param("a", ParamType::Int)
///             .param("b", ParamType::Int);
///     }
/// }
///
/// let mut console = Interpreter::default();
/// console.register(Rc::new(RefCell::new(Math))).unwrap();
/// assert_eq!(console.evaluate("sum = Add(1, Add(2, 3))"), Some(Value::Int(6)));
/// assert_eq!(console.evaluate("sum"), Some(Value::Int(6)));
/// ```
pub struct Interpreter {
    registry: Registry,
    env: Environment,
    logger: Rc<dyn Logger>,
}

impl Interpreter {
    pub fn new(settings: ConsoleSettings, logger: Rc<dyn Logger>) -> Self {
        Self {
            registry: Registry::new(settings.require_marking),
            env: Environment::new(),
            logger,
        }
    }

    /// Register the operations of `target`. See [`Registry::register`].
    pub fn register<T: Target>(&mut self, target: Rc<RefCell<T>>) -> Result<usize> {
        self.registry.register(target)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Variables assigned so far in this session.
    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn target_names(&self) -> Vec<&'static str> {
        self.registry.target_names().collect()
    }

    /// Log every available command with its parameters.
    pub fn help(&self) {
        self.logger.info("List of commands:");
        for signature in self.registry.list_signatures("") {
            self.logger.info(&signature);
        }
    }

    /// Evaluate one line, reporting the outcome through the logger.
    ///
    /// Errors are logged and turned into `None`; a produced value is logged
    /// as a result and returned.
    pub fn evaluate(&mut self, line: &str) -> Option<Value> {
        match self.try_evaluate(line) {
            Ok(Some(value)) => {
                self.logger.result(&value.to_string());
                Some(value)
            }
            Ok(None) => None,
            Err(err) => {
                tracing::debug!(line, error = %err, "evaluation failed");
                self.logger.error(&err.to_string());
                None
            }
        }
    }

    /// Evaluate one line and return the typed error instead of logging it.
    pub fn try_evaluate(&mut self, line: &str) -> Result<Option<Value>> {
        let Some((name, expression)) = split_assignment(line) else {
            return self.evaluate_expression(line);
        };

        let name = name.trim();
        if name.is_empty() {
            return Err(ConsoleError::InvalidAssignment);
        }

        let value = self.evaluate_expression(expression)?;
        if let Some(value) = &value {
            tracing::debug!(name, %value, "binding variable");
            self.env.set_var(name, value.clone());
        }
        Ok(value)
    }

    fn evaluate_expression(&self, line: &str) -> Result<Option<Value>> {
        let line = line.trim();
        if let Some(value) = self.env.get_var(line) {
            self.logger.info(&format!("{line}: {value}"));
            return Ok(Some(value.clone()));
        }

        let expr = parser::parse_line(line).map_err(|source| ConsoleError::Malformed {
            input: line.to_string(),
            source,
        })?;
        tracing::trace!(?expr, "parsed");
        self.call(&expr)
    }

    /// Resolve the arguments of `expr` (innermost calls first), then look up,
    /// check, coerce and invoke.
    fn call(&self, expr: &Expr) -> Result<Option<Value>> {
        let args = expr
            .args
            .iter()
            .map(|arg| self.resolve(arg))
            .collect::<Result<Vec<_>>>()?;

        let op = self
            .registry
            .find_by_name_and_arity(&expr.name, args.len())
            .ok_or_else(|| ConsoleError::UnknownCommand {
                name: expr.name.clone(),
            })?;

        let leading_empty =
            matches!(expr.args.first(), Some(Arg::Literal(text)) if text.is_empty());
        if args.len() != op.arity() || leading_empty {
            return Err(ConsoleError::ArityMismatch {
                signature: op.signature(),
                name: expr.name.clone(),
                args: render_args(&args),
            });
        }

        let args = Args::new(try_coerce(args, op.params())?);
        let result = dispatch(&self.registry, op, &args)?;
        self.logger.info(&format!("Method invoked: {}({args})", op.name()));
        Ok(result)
    }

    fn resolve(&self, arg: &Arg) -> Result<Option<Value>> {
        match arg {
            Arg::Literal(text) => {
                let value = match self.env.get_var(text) {
                    Some(value) => value.clone(),
                    None => Value::Str(text.clone()),
                };
                Ok(Some(value))
            }
            Arg::Call(expr) => self.call(expr),
        }
    }
}

impl Default for Interpreter {
    /// Marking required, output forwarded to `tracing`.
    fn default() -> Self {
        Self::new(ConsoleSettings::default(), Rc::new(TracingLogger))
    }
}

/// Split `name = expression` when the `=` comes before any `(`.
fn split_assignment(line: &str) -> Option<(&str, &str)> {
    let eq = line.find('=')?;
    match line.find('(') {
        Some(open) if open < eq => None,
        _ => Some((&line[..eq], &line[eq + 1..])),
    }
}

fn render_args(args: &[Option<Value>]) -> String {
    args.iter()
        .map(|arg| match arg {
            Some(value) => value.to_string(),
            None => "null".to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
