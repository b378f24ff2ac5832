use std::fmt;

use narratr_ast::SymbolKey;

/// Where a symbol lives. Replaces the source's `"GLOBAL."`/`"POCKET."`
/// string-sentinel idiom (`spec.md` §4.3) with a first-class sum type, per
/// Design Note §9: scope is still flattened into a string key under the
/// hood (the symbol table stays a flat map, not a stack of nested scopes),
/// but callers never construct or compare against magic scope strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Scene-local: a variable assigned inside scene `$N`'s setup/action/
    /// cleanup suites, not declared `god`.
    Scene(u32),
    /// An item's formal parameters and any names it binds in its own body,
    /// keyed by item name. The source text (`original_source/symtab.py`)
    /// never gives item bodies their own scope sentinel -- it threads a
    /// separate "blocktype" flag through codegen instead, which only works
    /// because the original never checks the symbol table for item-scope
    /// names at all. Since `spec.md` §3 requires every identifier to resolve
    /// via the symbol table, item scope is promoted to a real `Scope`
    /// variant here; see `DESIGN.md`.
    Item(String),
    /// The process-wide inventory namespace.
    Pocket,
    /// Scene and item declarations themselves, plus `god` variables (which
    /// are visible across scenes, hence global).
    Global,
}

impl Scope {
    fn prefix(&self) -> String {
        match self {
            Scope::Scene(n) => format!("${}", n),
            Scope::Item(name) => format!("ITEM.{}", name),
            Scope::Pocket => "POCKET".to_string(),
            Scope::Global => "GLOBAL".to_string(),
        }
    }

    pub fn key(&self, symbol: &str) -> SymbolKey {
        SymbolKey::new(format!("{}.{}", self.prefix(), symbol))
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.prefix())
    }
}
