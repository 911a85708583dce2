//! Lexical scopes for ordinary identifiers.

use std::collections::HashMap;

/// What a symbol names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Function,
    Parameter,
    Typedef,
    EnumConstant,
}

/// A defined symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// 1-based line of the defining declarator
    pub line: usize,
}

/// Stack of scopes, innermost last.
///
/// The file scope is created up front and is never popped.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: Vec<HashMap<String, Symbol>>,
}

impl SymbolTable {
    /// Create a table holding only the file scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    /// Open a nested scope.
    pub fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Close the innermost scope. The file scope stays.
    pub fn exit_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
        debug_assert!(!self.scopes.is_empty());
    }

    /// Number of open scopes, file scope included.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Define a symbol in the current scope.
    ///
    /// Returns false if the name already exists in the current scope; the
    /// first definition is kept.
    pub fn define(&mut self, name: &str, kind: SymbolKind, line: usize) -> bool {
        debug_assert!(!name.is_empty(), "Symbol name must not be empty");

        let Some(current) = self.scopes.last_mut() else {
            return false;
        };
        if current.contains_key(name) {
            return false;
        }
        current.insert(
            name.to_string(),
            Symbol {
                name: name.to_string(),
                kind,
                line,
            },
        );
        true
    }

    /// Look up a symbol, innermost scope first.
    pub fn lookup(&self, name: &str, current_scope_only: bool) -> Option<&Symbol> {
        if current_scope_only {
            return self.scopes.last().and_then(|scope| scope.get(name));
        }
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Nearest symbol with this name in an enclosing scope.
    ///
    /// The current scope is not searched.
    pub fn check_shadowing(&self, name: &str) -> Option<&Symbol> {
        let enclosing = &self.scopes[..self.scopes.len() - 1];
        enclosing.iter().rev().find_map(|scope| scope.get(name))
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
