//! The Narratr symbol table: a flat, scope-qualified map from names to
//! declarations. Grounded on `original_source/symtab.py`'s `SymTab`, and
//! structurally on the teacher's own `src/symbols.rs::SymbolTable` (minus the
//! `Rc`/`RefCell` sharing that crate needs for its own precedence
//! bookkeeping, which this table has no equivalent of).

mod entry;
mod error;
mod scope;

use std::collections::HashMap;

pub use entry::{Entry, SymbolType, SymbolValue};
pub use error::Error;
use narratr_ast::SymbolKey;
pub use scope::Scope;

#[derive(Debug, Default)]
pub struct SymbolTable {
    table: HashMap<SymbolKey, Entry>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Adds a new entry. Fails if `scope.key(symbol)` is already occupied,
    /// mirroring `SymTab.insert`'s duplicate-definition check.
    pub fn insert(
        &mut self,
        symbol: &str,
        value: SymbolValue,
        symbol_type: SymbolType,
        scope: Scope,
        god: bool,
    ) -> Result<(), Error> {
        let key = scope.key(symbol);
        if self.table.contains_key(&key) {
            return Err(Error::AlreadyDefined(key));
        }
        self.table
            .insert(key, Entry::new(symbol, value, symbol_type, scope, god));
        Ok(())
    }

    /// Unconditionally sets an entry, overwriting whatever was there.
    pub fn overwrite(&mut self, entry: Entry) {
        let key = entry.scope.key(&entry.symbol);
        self.table.insert(key, entry);
    }

    /// Updates an existing entry. Fails if there is nothing to update,
    /// mirroring `SymTab.update`.
    pub fn update(
        &mut self,
        symbol: &str,
        value: SymbolValue,
        symbol_type: SymbolType,
        scope: Scope,
        god: bool,
    ) -> Result<(), Error> {
        let key = scope.key(symbol);
        if !self.table.contains_key(&key) {
            return Err(Error::Missing(key));
        }
        self.table
            .insert(key, Entry::new(symbol, value, symbol_type, scope, god));
        Ok(())
    }

    pub fn get(&self, symbol: &str, scope: Scope) -> Option<&Entry> {
        self.table.get(&scope.key(symbol))
    }

    pub fn get_with_key(&self, key: &SymbolKey) -> Option<&Entry> {
        self.table.get(key)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get_round_trips() {
        let mut symtab = SymbolTable::new();
        symtab
            .insert("x", SymbolValue::Unit, SymbolType::Integer, Scope::Scene(1), false)
            .unwrap();
        let entry = symtab.get("x", Scope::Scene(1)).unwrap();
        assert_eq!(entry.symbol, "x");
        assert!(!entry.god);
    }

    #[test]
    fn duplicate_insert_in_same_scope_fails() {
        let mut symtab = SymbolTable::new();
        symtab
            .insert("x", SymbolValue::Unit, SymbolType::Integer, Scope::Global, false)
            .unwrap();
        let err = symtab
            .insert("x", SymbolValue::Unit, SymbolType::Integer, Scope::Global, false)
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyDefined(_)));
    }

    #[test]
    fn same_name_different_scopes_do_not_collide() {
        let mut symtab = SymbolTable::new();
        symtab
            .insert("x", SymbolValue::Unit, SymbolType::Integer, Scope::Scene(1), false)
            .unwrap();
        symtab
            .insert("x", SymbolValue::Unit, SymbolType::Integer, Scope::Scene(2), false)
            .unwrap();
        assert!(symtab.get("x", Scope::Scene(1)).is_some());
        assert!(symtab.get("x", Scope::Scene(2)).is_some());
    }

    #[test]
    fn update_missing_entry_fails() {
        let mut symtab = SymbolTable::new();
        let err = symtab
            .update("x", SymbolValue::Unit, SymbolType::Integer, Scope::Pocket, false)
            .unwrap_err();
        assert!(matches!(err, Error::Missing(_)));
    }

    #[test]
    fn god_variables_live_in_global_scope() {
        let mut symtab = SymbolTable::new();
        symtab
            .insert("health", SymbolValue::Unit, SymbolType::Integer, Scope::Global, true)
            .unwrap();
        let entry = symtab.get("health", Scope::Global).unwrap();
        assert!(entry.god);
    }

    #[test]
    fn get_with_key_matches_get() {
        let mut symtab = SymbolTable::new();
        symtab
            .insert("torch", SymbolValue::Item("torch".into()), SymbolType::Item, Scope::Global, false)
            .unwrap();
        let key = Scope::Global.key("torch");
        assert_eq!(symtab.get_with_key(&key), symtab.get("torch", Scope::Global));
    }
}
