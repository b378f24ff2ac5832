use crate::symbol_key::SymbolKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Less,
    Greater,
    LessEq,
    GreaterEq,
    Eq,
    NotEq,
}

impl CompareOp {
    /// The operator text as it should appear in emitted target code; every
    /// one of these maps 1:1 onto the host language's own operator.
    pub fn as_target_str(&self) -> &'static str {
        match self {
            CompareOp::Less => "<",
            CompareOp::Greater => ">",
            CompareOp::LessEq => "<=",
            CompareOp::GreaterEq => ">=",
            CompareOp::Eq => "==",
            CompareOp::NotEq => "!=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
}

impl ArithOp {
    pub fn as_target_str(&self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::FloorDiv => "//",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Plus,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// The direction keyword exactly as the player types it, used as the key
    /// of the generated `direction` dict (e.g. `direction["left"]`).
    pub fn as_keyword(&self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

/// One node of Narratr's expression grammar (the `testlist` / `test` /
/// `or_test` / ... / `atom` production chain in the grammar outline).
/// Collapsed into a single recursive enum rather than one struct per grammar
/// rule: most of those rules exist only to encode precedence, which this
/// representation captures structurally (nesting) instead of naming a
/// distinct node type per precedence level.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Or(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Compare(Box<Expr>, CompareOp, Box<Expr>),
    BinOp(Box<Expr>, ArithOp, Box<Expr>),
    UnaryOp(UnaryOp, Box<Expr>),
    /// A call expression, e.g. `pocket.add(k, v)` or `str(x)`.
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        line: u32,
    },
    /// Attribute access, e.g. `pocket.add` before the call trailer is
    /// applied, or `key.id` on an item instance.
    Attr {
        base: Box<Expr>,
        attr: String,
        line: u32,
    },
    List(Vec<Expr>, u32),
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    /// A bare name. `key` is filled in by the parser as soon as the
    /// identifier is resolved against the symbol table; it is `None` only
    /// for the four built-in names (`str`, `int`, `float`, `pocket`), which
    /// never have a symbol table entry of their own.
    Ident {
        name: String,
        key: Option<SymbolKey>,
        line: u32,
    },
}

impl Expr {
    pub fn line(&self) -> u32 {
        match self {
            Expr::Or(l, _) | Expr::And(l, _) => l.line(),
            Expr::Not(e) => e.line(),
            Expr::Compare(l, _, _) => l.line(),
            Expr::BinOp(l, _, _) => l.line(),
            Expr::UnaryOp(_, e) => e.line(),
            Expr::Call { line, .. }
            | Expr::Attr { line, .. }
            | Expr::List(_, line)
            | Expr::Ident { line, .. } => *line,
            Expr::Int(_) | Expr::Float(_) | Expr::Str(_) | Expr::Bool(_) => 0,
        }
    }
}
