use std::collections::HashMap;

use tracing::trace;

use crate::types::{builtins, DataType};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Parameter,
    Function,
}

impl SymbolKind {
    /// Variables and parameters both hold values.
    pub fn is_value(self) -> bool {
        matches!(self, SymbolKind::Variable | SymbolKind::Parameter)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Symbol {
    pub name: Box<str>,
    pub kind: SymbolKind,
    /// `None` until the first assignment is seen.
    pub data_type: Option<DataType>,
    /// Element count for lists, character count for strings.
    pub length: Option<usize>,
}

impl Symbol {
    pub fn new(name: &str, kind: SymbolKind) -> Symbol {
        Symbol {
            name: name.into(),
            kind,
            data_type: None,
            length: None,
        }
    }

    pub fn with_type(mut self, data_type: DataType, length: Option<usize>) -> Symbol {
        self.data_type = Some(data_type);
        self.length = length;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DuplicateSymbol(pub Box<str>);

/// Lexically nested scopes, innermost last.
///
/// Each scope is a name-to-symbol map whose parent is the scope below it on
/// the stack. Lookups walk outwards; definitions only ever touch the
/// innermost scope, so shadowing an outer name is legal while redefining a
/// name within one scope is not.
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<HashMap<Box<str>, Symbol>>,
}

impl SymbolTable {
    /// Creates a table holding a single global scope, pre-populated with the
    /// builtin functions.
    pub fn with_builtins() -> SymbolTable {
        let mut table = SymbolTable {
            scopes: vec![HashMap::with_capacity(32)],
        };
        for name in builtins::ALL {
            table
                .define(Symbol::new(name, SymbolKind::Function))
                .expect("builtins are unique");
        }
        table
    }

    /// Attempts to define the provided symbol in the innermost scope.
    ///
    /// Fails if the name is already defined in that same scope.
    pub fn define(&mut self, symbol: Symbol) -> Result<&mut Symbol, DuplicateSymbol> {
        let depth = self.scopes.len();
        let scope = self.scopes.last_mut().expect("global scope is never popped");
        if scope.contains_key(&symbol.name) {
            return Err(DuplicateSymbol(symbol.name));
        }
        trace!(name = &*symbol.name, kind = ?symbol.kind, depth, "define");
        let name = symbol.name.clone();
        Ok(scope.entry(name).or_insert(symbol))
    }

    /// Returns the symbol from the nearest enclosing scope, if any.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Returns the symbol from the nearest enclosing scope at or above the
    /// scope index `frame`. Scopes below it belong to enclosing functions.
    pub fn lookup_in_frame_mut(&mut self, name: &str, frame: usize) -> Option<&mut Symbol> {
        self.scopes
            .get_mut(frame..)?
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(name))
    }

    /// Number of live scopes, the global one included.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub(crate) fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
        trace!(depth = self.scopes.len(), "push scope");
    }

    pub(crate) fn pop_scope(&mut self) {
        assert!(self.scopes.len() > 1, "can't pop the global scope");
        self.scopes.pop();
        trace!(depth = self.scopes.len(), "pop scope");
    }
}
