//! Scoped symbol tables shared by the optimizer, type checker, and code generator.
//!
//! Grounded on `original_source/src/compiler/SymbolTableStack.hpp`: a stack of scopes,
//! innermost on top, with lookup walking top-down and returning the first hit.

use rustc_hash::FxHashMap;

/// One lexical scope: a name-to-value mapping with no ordering guarantees.
pub type Scope<T> = FxHashMap<String, T>;

/// A stack of scopes. `enter_scope`/`exit_scope` bracket a lexical region;
/// `insert`/`lookup` operate relative to the top of the stack.
#[derive(Debug, Clone)]
pub struct ScopeStack<T> {
    scopes: Vec<Scope<T>>,
}

impl<T> Default for ScopeStack<T> {
    fn default() -> Self {
        Self { scopes: Vec::new() }
    }
}

impl<T: Clone> ScopeStack<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    pub fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Inserts into the innermost scope. Returns `false` (without inserting) if the name
    /// is already bound in that same scope — callers use this to detect illegal
    /// reassignment.
    pub fn insert(&mut self, name: impl Into<String>, value: T) -> bool {
        let name = name.into();
        let Some(top) = self.scopes.last_mut() else {
            return false;
        };
        if top.contains_key(&name) {
            return false;
        }
        top.insert(name, value);
        true
    }

    /// Looks up a name starting from the innermost scope outward, returning the first
    /// hit.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<T> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).cloned())
    }

    #[must_use]
    pub fn contains_in_top(&self, name: &str) -> bool {
        self.scopes.last().is_some_and(|scope| scope.contains_key(name))
    }

    /// Binds a name in the innermost scope unconditionally, overwriting any existing
    /// entry. Used where a caller needs to refine a placeholder binding (e.g. the type
    /// checker's pre-declared recursive function types) rather than detect collisions.
    pub fn set(&mut self, name: impl Into<String>, value: T) {
        let name = name.into();
        if let Some(top) = self.scopes.last_mut() {
            top.insert(name, value);
        }
    }
}
