//! The Narratr abstract syntax tree.
//!
//! `spec.md` describes the original tree as a single uniform node record
//! tagged by a string `type`/`value` pair. Per Design Note in `spec.md` §9,
//! this is encoded here as one Rust enum per grammatical category instead:
//! `Block`/`Stmt`/`Expr`, each a tagged variant (sum type) rather than a
//! string discriminant, so invariants like "a scene block has exactly three
//! children -- setup, action, cleanup" are field positions checked by the
//! compiler rather than runtime assertions.

mod expr;
mod node;
mod symbol_key;

pub use expr::{ArithOp, CompareOp, Direction, Expr, UnaryOp};
pub use node::{Block, ItemBlock, Program, SceneBlock, Stmt, StartState, Suite};
pub use symbol_key::SymbolKey;
