use crate::object::Object;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

/// Shared reference to an environment
pub type EnvRef = Rc<RefCell<Environment>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Mutable,
    Constant,
}

#[derive(Debug, Clone)]
struct Binding {
    value: Object,
    kind: BindingKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    #[error("cannot reassign constant: {0}")]
    ConstantReassignment(String),
}

/// One lexical scope. Lookups walk outward; writes land in the innermost scope
/// that already owns the name, or the current scope when none does.
#[derive(Debug, Default)]
pub struct Environment {
    bindings: HashMap<String, Binding>,
    outer: Option<EnvRef>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a child scope of `outer`
    pub fn new_enclosed(outer: &EnvRef) -> EnvRef {
        Environment {
            bindings: HashMap::new(),
            outer: Some(Rc::clone(outer)),
        }
        .into_ref()
    }

    /// Wrap in Rc<RefCell<>>
    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    /// The outermost scope of the chain `env` belongs to.
    pub fn root(env: &EnvRef) -> EnvRef {
        let mut current = Rc::clone(env);
        loop {
            let outer = current.borrow().outer.clone();
            match outer {
                Some(outer) => current = outer,
                None => return current,
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Object> {
        match self.bindings.get(name) {
            Some(binding) => Some(binding.value.clone()),
            None => self.outer.as_ref().and_then(|outer| outer.borrow().get(name)),
        }
    }

    /// Declare `name` in this scope, shadowing any outer binding.
    pub fn define(&mut self, name: &str, value: Object) -> Result<(), EnvError> {
        self.bind_local(name, value, BindingKind::Mutable)
    }

    pub fn set_const(&mut self, name: &str, value: Object) -> Result<(), EnvError> {
        self.bind_local(name, value, BindingKind::Constant)
    }

    fn bind_local(&mut self, name: &str, value: Object, kind: BindingKind) -> Result<(), EnvError> {
        if let Some(Binding {
            kind: BindingKind::Constant,
            ..
        }) = self.bindings.get(name)
        {
            return Err(EnvError::ConstantReassignment(name.to_string()));
        }
        self.bindings.insert(name.to_string(), Binding { value, kind });
        Ok(())
    }

    pub fn set(&mut self, name: &str, value: Object) -> Result<(), EnvError> {
        if let Some(value) = self.update_owner(name, value)? {
            self.bindings.insert(
                name.to_string(),
                Binding {
                    value,
                    kind: BindingKind::Mutable,
                },
            );
        }
        Ok(())
    }

    /// Writes into the owning scope; hands `value` back when no scope owns `name`.
    fn update_owner(&mut self, name: &str, value: Object) -> Result<Option<Object>, EnvError> {
        if let Some(binding) = self.bindings.get_mut(name) {
            if binding.kind == BindingKind::Constant {
                return Err(EnvError::ConstantReassignment(name.to_string()));
            }
            binding.value = value;
            return Ok(None);
        }
        match &self.outer {
            Some(outer) => outer.borrow_mut().update_owner(name, value),
            None => Ok(Some(value)),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
            || self
                .outer
                .as_ref()
                .is_some_and(|outer| outer.borrow().contains(name))
    }
}
