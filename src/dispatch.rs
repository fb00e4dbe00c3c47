use crate::command::Args;
use crate::error::{ConsoleError, Result};
use crate::registry::{Operation, Registry};
use crate::value::Value;
use anyhow::anyhow;

/// Invoke `op` on the registry's tracked target of the owning type.
///
/// Failures raised by the handler, or a target that cannot be borrowed, come
/// back as [`ConsoleError::InvocationFailed`].
pub(crate) fn dispatch(registry: &Registry, op: &Operation, args: &Args) -> Result<Option<Value>> {
    let failed = |source: anyhow::Error| ConsoleError::InvocationFailed {
        name: op.name().to_string(),
        source,
    };

    let instance = registry
        .target(op.owner())
        .ok_or_else(|| failed(anyhow!("no {} target is registered", op.owner_name())))?;
    let mut target = instance
        .try_borrow_mut()
        .map_err(|_| failed(anyhow!("{} target is already in use", op.owner_name())))?;

    tracing::trace!(operation = op.name(), target_type = op.owner_name(), "dispatching");
    op.call(&mut *target, args).map_err(failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandTable, Target};
    use crate::value::ParamType;
    use anyhow::bail;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Vault {
        opened: u32,
    }

    impl Target for Vault {
        fn declare(table: &mut CommandTable<Self>) {
            table.command("Open", |vault: &mut Vault, _: &Args| {
                vault.opened += 1;
                Ok(Some(Value::Int(vault.opened as i32)))
            });
            table
                .command("Unlock", |_: &mut Vault, args: &Args| {
                    if args.str(0)? != "secret" {
                        bail!("wrong code");
                    }
                    Ok(None)
                })
                .param("code", ParamType::Str);
        }
    }

    fn registry_with(vault: &Rc<RefCell<Vault>>) -> Registry {
        let mut registry = Registry::new(true);
        registry.register(vault.clone()).unwrap();
        registry
    }

    #[test]
    fn test_dispatch_invokes_owning_target() {
        let vault = Rc::new(RefCell::new(Vault::default()));
        let registry = registry_with(&vault);
        let op = registry.find_by_name_and_arity("Open", 0).unwrap();

        let result = dispatch(&registry, op, &Args::default()).unwrap();
        assert_eq!(result, Some(Value::Int(1)));
        assert_eq!(vault.borrow().opened, 1);
    }

    #[test]
    fn test_handler_error_becomes_invocation_failure() {
        let vault = Rc::new(RefCell::new(Vault::default()));
        let registry = registry_with(&vault);
        let op = registry.find_by_name_and_arity("Unlock", 1).unwrap();

        let err = dispatch(&registry, op, &Args::new(vec![Value::from("guess")])).unwrap_err();
        assert!(matches!(err, ConsoleError::InvocationFailed { ref name, .. } if name == "Unlock"));
        assert!(err.to_string().contains("wrong code"));
    }

    #[test]
    fn test_busy_target_is_reported_not_panicked() {
        let vault = Rc::new(RefCell::new(Vault::default()));
        let registry = registry_with(&vault);
        let op = registry.find_by_name_and_arity("Open", 0).unwrap();

        let _held = vault.borrow_mut();
        let err = dispatch(&registry, op, &Args::default()).unwrap_err();
        assert!(err.to_string().contains("already in use"));
    }
}
