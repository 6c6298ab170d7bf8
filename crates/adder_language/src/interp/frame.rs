//! Function activation records.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::FunctionDef;
use crate::value::Value;

/// The local variables of one function call.
///
/// Frames are reference counted: a function defined inside another keeps its
/// defining frame alive so it can read the enclosing variables later.
pub struct Frame {
    def: Rc<FunctionDef>,
    locals: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Frame>>,
}

impl Frame {
    /// Creates a frame for a call of `def`.
    #[must_use]
    pub fn new(
        def: Rc<FunctionDef>,
        locals: HashMap<String, Value>,
        parent: Option<Rc<Self>>,
    ) -> Self {
        Self {
            def,
            locals: RefCell::new(locals),
            parent,
        }
    }

    /// Returns true if `name` is bound in this function's scope.
    #[must_use]
    pub fn is_local(&self, name: &str) -> bool {
        self.def.scope.is_local(name)
    }

    /// Returns true if the function declared `name` global.
    #[must_use]
    pub fn is_global(&self, name: &str) -> bool {
        self.def.scope.globals.contains(name)
    }

    /// Reads a local.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.locals.borrow().get(name).cloned()
    }

    /// Writes a local.
    pub fn set(&self, name: &str, value: Value) {
        self.locals.borrow_mut().insert(name.to_string(), value);
    }

    /// Removes a local, returning whether it was bound.
    pub fn remove(&self, name: &str) -> bool {
        self.locals.borrow_mut().remove(name).is_some()
    }

    /// Returns the bound local names.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.locals.borrow().keys().cloned().collect()
    }

    /// Returns the frame this function was defined in.
    #[must_use]
    pub const fn parent(&self) -> Option<&Rc<Self>> {
        self.parent.as_ref()
    }
}
