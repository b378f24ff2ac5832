use std::fmt;

/// The resolved key under which an identifier's declaration lives in the
/// symbol table, e.g. `"GLOBAL.key"`, `"POCKET.gold"`, `"$3.torch"`.
///
/// Parked here (rather than in `narratr-symtab`) so the AST can carry a
/// fully-resolved key on every `Expr::Ident` without the AST crate depending
/// on the symbol table crate; `narratr-symtab` constructs and consumes the
/// same type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolKey(String);

impl SymbolKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SymbolKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
