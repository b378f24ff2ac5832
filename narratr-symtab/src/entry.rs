use crate::scope::Scope;

/// Descriptive only -- `original_source/codegen.py` never branches on
/// `entry.symboltype` once an entry exists, so this carries no lowering
/// behavior. `Dynamic` covers a variable assigned from anything other than a
/// single literal, since Narratr has no static type inference (`spec.md` §1
/// Non-goals).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolType {
    Scene,
    Item,
    Integer,
    StringT,
    Float,
    Boolean,
    List,
    Dynamic,
}

/// The payload carried by a symbol table entry. Scene and item declarations
/// carry the scene id / item name they were registered under so codegen can
/// cross-check a `moveto`/`start` target without re-walking the AST; plain
/// variables carry nothing extra (their value lives in the generated
/// program's own namespace dict or object attribute, never in the compiler).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolValue {
    Scene(u32),
    Item(String),
    Unit,
}

/// An entry in the Narratr symbol table, grounded on
/// `original_source/symtab.py`'s `SymTabEntry`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub symbol: String,
    pub value: SymbolValue,
    pub symbol_type: SymbolType,
    pub scope: Scope,
    pub god: bool,
}

impl Entry {
    pub fn new(
        symbol: impl Into<String>,
        value: SymbolValue,
        symbol_type: SymbolType,
        scope: Scope,
        god: bool,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            value,
            symbol_type,
            scope,
            god,
        }
    }
}
