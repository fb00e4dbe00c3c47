use crate::value::{Object, ParamType, Value};
use anyhow::{Result, anyhow};
use std::fmt;

/// Type-specific body of an operation. Receives the owning target and the
/// already coerced arguments.
pub type Handler<T> = Box<dyn Fn(&mut T, &Args) -> Result<Option<Value>>>;

/// A host type whose operations can be called from the console.
///
/// Instead of discovering methods at runtime, each target type fills a
/// [`CommandTable`] describing its operations once, at registration time.
///
/// ```
/// use command_console::{Args, CommandTable, ParamType, Target};
///
/// struct Ship {
///     speed: f32,
/// }
///
/// impl Target for Ship {
///     fn declare(table: &mut CommandTable<Self>) {
///         table
///             .command("SetSpeed", |ship: &mut Ship, args: &Args| {
///                 ship.speed = args.float(0)?;
///                 Ok(None)
///             })
///             .param("value", ParamType::Float);
///         table.command("GetSpeed", |ship: &mut Ship, _: &Args| Ok(Some(ship.speed.into())));
///     }
/// }
/// ```
pub trait Target: Sized + 'static {
    /// Add every operation of this type to `table`.
    fn declare(table: &mut CommandTable<Self>);

    /// Name used in logs and warnings. Defaults to the unqualified Rust type name.
    fn type_name() -> &'static str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }
}

/// A declared parameter: name plus type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub ty: ParamType,
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.name, self.ty)
    }
}

/// One entry of a [`CommandTable`].
pub struct Declaration<T> {
    pub(crate) name: &'static str,
    pub(crate) params: Vec<Param>,
    pub(crate) marked: bool,
    pub(crate) handler: Handler<T>,
}

impl<T> Declaration<T> {
    /// Append a parameter. Order of calls is the positional order.
    pub fn param(&mut self, name: &'static str, ty: ParamType) -> &mut Self {
        self.params.push(Param { name, ty });
        self
    }
}

/// Declaration table for a [`Target`] type.
pub struct CommandTable<T> {
    entries: Vec<Declaration<T>>,
}

impl<T> CommandTable<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Declare an operation explicitly marked as a console command.
    pub fn command<F>(&mut self, name: &'static str, handler: F) -> &mut Declaration<T>
    where
        F: Fn(&mut T, &Args) -> Result<Option<Value>> + 'static,
    {
        self.push(name, true, Box::new(handler))
    }

    /// Declare a plain method. It is only reachable when the console is
    /// configured not to require marking.
    pub fn method<F>(&mut self, name: &'static str, handler: F) -> &mut Declaration<T>
    where
        F: Fn(&mut T, &Args) -> Result<Option<Value>> + 'static,
    {
        self.push(name, false, Box::new(handler))
    }

    fn push(
        &mut self,
        name: &'static str,
        marked: bool,
        handler: Handler<T>,
    ) -> &mut Declaration<T> {
        let index = self.entries.len();
        self.entries.push(Declaration {
            name,
            params: Vec::new(),
            marked,
            handler,
        });
        &mut self.entries[index]
    }

    pub(crate) fn into_entries(self) -> Vec<Declaration<T>> {
        self.entries
    }
}

/// Fully coerced arguments handed to a [`Handler`].
///
/// By the time a handler runs, every value matches its declared parameter
/// type, so the typed accessors only fail on a declaration/handler mismatch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    values: Vec<Value>,
}

impl Args {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }

    pub fn value(&self, index: usize) -> Result<&Value> {
        self.values
            .get(index)
            .ok_or_else(|| anyhow!("missing argument {index}"))
    }

    pub fn int(&self, index: usize) -> Result<i32> {
        match self.value(index)? {
            Value::Int(v) => Ok(*v),
            other => Err(mismatch(index, other, "int")),
        }
    }

    pub fn float(&self, index: usize) -> Result<f32> {
        match self.value(index)? {
            Value::Float(v) => Ok(*v),
            other => Err(mismatch(index, other, "float")),
        }
    }

    pub fn double(&self, index: usize) -> Result<f64> {
        match self.value(index)? {
            Value::Double(v) => Ok(*v),
            other => Err(mismatch(index, other, "double")),
        }
    }

    pub fn bool(&self, index: usize) -> Result<bool> {
        match self.value(index)? {
            Value::Bool(v) => Ok(*v),
            other => Err(mismatch(index, other, "bool")),
        }
    }

    pub fn str(&self, index: usize) -> Result<&str> {
        match self.value(index)? {
            Value::Str(s) => Ok(s.as_str()),
            other => Err(mismatch(index, other, "string")),
        }
    }

    /// Member name of an enum argument.
    pub fn member(&self, index: usize) -> Result<&'static str> {
        match self.value(index)? {
            Value::Enum { member, .. } => Ok(*member),
            other => Err(mismatch(index, other, "enum")),
        }
    }

    /// Borrow an object argument as its concrete type.
    pub fn object<O: Object>(&self, index: usize) -> Result<&O> {
        match self.value(index)? {
            Value::Object(rc) => {
                let object: &dyn Object = &**rc;
                object
                    .as_any()
                    .downcast_ref::<O>()
                    .ok_or_else(|| anyhow!("argument {index} is a {}", object.type_name()))
            }
            other => Err(mismatch(index, other, "object")),
        }
    }
}

fn mismatch(index: usize, value: &Value, expected: &str) -> anyhow::Error {
    anyhow!(
        "argument {index} is {} '{value}', expected {expected}",
        value.type_name()
    )
}

impl fmt::Display for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        count: i32,
    }

    impl Target for Counter {
        fn declare(table: &mut CommandTable<Self>) {
            table
                .command("Add", |c: &mut Counter, args: &Args| {
                    c.count += args.int(0)?;
                    Ok(Some(c.count.into()))
                })
                .param("amount", ParamType::Int);
            table.method("Reset", |c: &mut Counter, _: &Args| {
                c.count = 0;
                Ok(None)
            });
        }
    }

    #[test]
    fn test_declaration_table_records_params_and_marking() {
        let mut table = CommandTable::new();
        Counter::declare(&mut table);
        let entries = table.into_entries();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "Add");
        assert!(entries[0].marked);
        assert_eq!(
            entries[0].params,
            vec![Param {
                name: "amount",
                ty: ParamType::Int
            }]
        );
        assert_eq!(entries[1].name, "Reset");
        assert!(!entries[1].marked);
    }

    #[test]
    fn test_handler_runs_against_target() {
        let mut table = CommandTable::new();
        Counter::declare(&mut table);
        let entries = table.into_entries();

        let mut counter = Counter { count: 1 };
        let result = (entries[0].handler)(&mut counter, &Args::new(vec![Value::Int(4)])).unwrap();
        assert_eq!(result, Some(Value::Int(5)));
        assert_eq!(counter.count, 5);
    }

    #[test]
    fn test_default_type_name_is_unqualified() {
        assert_eq!(Counter::type_name(), "Counter");
    }

    #[test]
    fn test_typed_accessors_reject_wrong_shape() {
        let args = Args::new(vec![Value::from("abc"), Value::Int(3)]);
        assert_eq!(args.str(0).unwrap(), "abc");
        assert!(args.int(0).is_err());
        assert!(args.float(1).is_err());
        assert!(args.value(2).is_err());
        assert_eq!(args.to_string(), "abc, 3");
    }
}
