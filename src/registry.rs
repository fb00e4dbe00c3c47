use crate::command::{Args, CommandTable, Param, Target};
use crate::error::{ConsoleError, Result};
use crate::value::{Value, eq_ignore_case, starts_with_ignore_case};
use anyhow::anyhow;
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

type ErasedHandler = Box<dyn Fn(&mut dyn Any, &Args) -> anyhow::Result<Option<Value>>>;

/// A registered, invocable operation.
///
/// Created from a [`Target`]'s declaration table and immutable afterwards.
pub struct Operation {
    name: &'static str,
    params: Vec<Param>,
    marked: bool,
    owner: TypeId,
    owner_name: &'static str,
    handler: ErasedHandler,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn is_marked(&self) -> bool {
        self.marked
    }

    /// Type name of the target that owns this operation.
    pub fn owner_name(&self) -> &'static str {
        self.owner_name
    }

    pub(crate) fn owner(&self) -> TypeId {
        self.owner
    }

    /// Full signature, always with parentheses: `Name(a : int, b : float)`.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self.params.iter().map(Param::to_string).collect();
        format!("{}({})", self.name, params.join(", "))
    }

    /// Listing form used for autocomplete and help: the bare name when the
    /// operation takes no parameters, the full signature otherwise.
    pub fn listing(&self) -> String {
        if self.params.is_empty() {
            self.name.to_string()
        } else {
            self.signature()
        }
    }

    pub(crate) fn call(&self, target: &mut dyn Any, args: &Args) -> anyhow::Result<Option<Value>> {
        (self.handler)(target, args)
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("marked", &self.marked)
            .field("owner", &self.owner_name)
            .finish_non_exhaustive()
    }
}

struct TrackedTarget {
    type_id: TypeId,
    type_name: &'static str,
    instance: Rc<RefCell<dyn Any>>,
}

/// The set of operations reachable from the console, in registration order,
/// plus the targets that own them.
///
/// At most one target per concrete type is tracked.
pub struct Registry {
    require_marking: bool,
    operations: Vec<Operation>,
    targets: Vec<TrackedTarget>,
}

impl Registry {
    /// With `require_marking` set, only operations declared through
    /// [`CommandTable::command`] are registered.
    pub fn new(require_marking: bool) -> Self {
        Self {
            require_marking,
            operations: Vec::new(),
            targets: Vec::new(),
        }
    }

    /// Register every eligible operation of `target`.
    ///
    /// Returns the number of operations added. A second target of an already
    /// registered type is skipped with a warning and reported as
    /// [`ConsoleError::DuplicateTargetType`]; the registry is left unchanged.
    pub fn register<T: Target>(&mut self, target: Rc<RefCell<T>>) -> Result<usize> {
        let type_id = TypeId::of::<T>();
        if self.targets.iter().any(|t| t.type_id == type_id) {
            tracing::warn!(
                target_type = T::type_name(),
                "multiple objects of same type are not allowed, skipping"
            );
            return Err(ConsoleError::DuplicateTargetType {
                type_name: T::type_name().to_string(),
            });
        }

        let mut table = CommandTable::new();
        T::declare(&mut table);

        let before = self.operations.len();
        for declaration in table.into_entries() {
            if self.require_marking && !declaration.marked {
                tracing::trace!(operation = declaration.name, "skipping unmarked method");
                continue;
            }
            let handler = declaration.handler;
            let erased: ErasedHandler = Box::new(move |target: &mut dyn Any, args: &Args| {
                let target = target
                    .downcast_mut::<T>()
                    .ok_or_else(|| anyhow!("target is not a {}", T::type_name()))?;
                handler(target, args)
            });
            self.operations.push(Operation {
                name: declaration.name,
                params: declaration.params,
                marked: declaration.marked,
                owner: type_id,
                owner_name: T::type_name(),
                handler: erased,
            });
        }

        let instance: Rc<RefCell<dyn Any>> = target;
        self.targets.push(TrackedTarget {
            type_id,
            type_name: T::type_name(),
            instance,
        });

        let added = self.operations.len() - before;
        tracing::debug!(target_type = T::type_name(), added, "registered target");
        Ok(added)
    }

    /// Look up an operation by case-insensitive name.
    ///
    /// The first registered operation with that name is returned whatever its
    /// arity; there is no overloading. `arity` is the number of arguments the
    /// caller has, and a mismatch is only traced here so the caller can report
    /// it against the returned signature.
    pub fn find_by_name_and_arity(&self, name: &str, arity: usize) -> Option<&Operation> {
        let op = self
            .operations
            .iter()
            .find(|op| eq_ignore_case(op.name, name))?;
        if op.arity() != arity {
            tracing::trace!(operation = op.name, expected = op.arity(), arity, "arity differs");
        }
        Some(op)
    }

    /// Names of operations starting with `prefix` (ignoring case), in
    /// registration order. The iterator is lazy and can be cloned to restart.
    pub fn list_names<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = &'static str> + Clone + 'a {
        self.matching(prefix).map(Operation::name)
    }

    /// Like [`Registry::list_names`], with rendered parameter lists.
    pub fn list_signatures<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = String> + Clone + 'a {
        self.matching(prefix).map(Operation::listing)
    }

    fn matching<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a Operation> + Clone + 'a {
        self.operations
            .iter()
            .filter(move |op| starts_with_ignore_case(op.name, prefix))
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Type names of the tracked targets, in registration order.
    pub fn target_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.targets.iter().map(|t| t.type_name)
    }

    /// The tracked instance of the given target type.
    pub(crate) fn target(&self, type_id: TypeId) -> Option<&Rc<RefCell<dyn Any>>> {
        self.targets
            .iter()
            .find(|t| t.type_id == type_id)
            .map(|t| &t.instance)
    }
}
