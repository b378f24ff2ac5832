use std::fmt;

use narratr_ast::SymbolKey;

#[derive(Debug, Clone)]
pub enum Error {
    /// `insert` was called for a key that already has an entry.
    AlreadyDefined(SymbolKey),
    /// `update` was called for a key with no existing entry.
    Missing(SymbolKey),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::AlreadyDefined(key) => write!(f, "\"{}\" already defined", key),
            Error::Missing(key) => {
                write!(f, "\"{}\" not in the symbol table, nothing to update", key)
            }
        }
    }
}

impl std::error::Error for Error {}
