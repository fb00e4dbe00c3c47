//! A small command console for calling host operations from typed text.
//!
//! Host types implement [`Target`] to publish a table of operations. An
//! [`Interpreter`] registers shared target instances and evaluates lines such
//! as `SetSpeed(2.5)`, `pos = Locate(Player(1), 10)` or `Spawn wolf`:
//! it parses the line into a call tree, evaluates nested calls first,
//! substitutes variables, coerces text arguments to the declared parameter
//! types and invokes the matching operation. Outcomes are reported through a
//! [`Logger`].
//!
//! The public modules [`command`] and [`env`] expose the declaration API and
//! the session variable store; [`repl`] provides an interactive loop built on
//! `rustyline`.

mod coerce;
pub mod command;
mod dispatch;
pub mod env;
mod error;
mod interpreter;
mod logger;
mod parser;
mod registry;
pub mod repl;
mod value;

pub use command::{Args, CommandTable, Declaration, Param, Target};
pub use error::{ConsoleError, Result};
pub use interpreter::{ConsoleSettings, Interpreter};
pub use logger::{LogEntry, LogLevel, Logger, MemoryLogger, TracingLogger};
pub use parser::{Arg, Expr, ParsingError, parse_line};
pub use registry::{Operation, Registry};
pub use value::{AsAny, EnumType, Object, ParamType, Value};
