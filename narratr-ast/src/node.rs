use crate::expr::{Direction, Expr};

/// A suite is just an ordered list of statements; `spec.md`'s grammar
/// distinguishes `simple_statement` from the `INDENT statement+ DEDENT` form
/// only to drive the parser, not the tree shape -- both collapse to a `Vec`.
pub type Suite = Vec<Stmt>;

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Say(Vec<Expr>, u32),
    Exposition(Vec<Expr>, u32),
    Win(Option<Vec<Expr>>, u32),
    Lose(Option<Vec<Expr>>, u32),
    Break(u32),
    Continue(u32),
    /// `moves left($A), right($B), ...` -- one `(direction, target scene)`
    /// pair per arm, in source order.
    Moves(Vec<(Direction, u32)>, u32),
    /// `moveto $N`.
    MoveTo(u32, u32),
    /// `[god] testlist is testlist`. `target` is restricted to a single
    /// assignable name or attribute path by the parser (see `DESIGN.md`'s
    /// Open Question on list-valued assignment targets).
    Assign {
        god: bool,
        target: Expr,
        value: Vec<Expr>,
        line: u32,
    },
    /// A bare expression statement (`testlist` with no `is`).
    ExprStmt(Vec<Expr>, u32),
    If {
        branches: Vec<(Expr, Suite)>,
        else_branch: Option<Suite>,
        line: u32,
    },
    While {
        cond: Expr,
        body: Suite,
        line: u32,
    },
}

impl Stmt {
    pub fn line(&self) -> u32 {
        match self {
            Stmt::Say(_, l)
            | Stmt::Exposition(_, l)
            | Stmt::Win(_, l)
            | Stmt::Lose(_, l)
            | Stmt::Break(l)
            | Stmt::Continue(l)
            | Stmt::Moves(_, l)
            | Stmt::MoveTo(_, l)
            | Stmt::Assign { line: l, .. }
            | Stmt::ExprStmt(_, l)
            | Stmt::If { line: l, .. }
            | Stmt::While { line: l, .. } => *l,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneBlock {
    pub scene_id: u32,
    pub setup: Suite,
    pub action: Suite,
    pub cleanup: Suite,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemBlock {
    pub name: String,
    pub formals: Vec<String>,
    pub body: Option<Suite>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StartState {
    pub scene_id: u32,
    pub line: u32,
}

/// One top-level declaration. `spec.md`'s `blocks := (scene_block |
/// item_block | start_state)*` becomes a flat `Vec<Block>` on `Program`.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Scene(SceneBlock),
    Item(ItemBlock),
    Start(StartState),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub blocks: Vec<Block>,
}

impl Program {
    pub fn scenes(&self) -> impl Iterator<Item = &SceneBlock> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Scene(s) => Some(s),
            _ => None,
        })
    }

    pub fn items(&self) -> impl Iterator<Item = &ItemBlock> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Item(i) => Some(i),
            _ => None,
        })
    }

    pub fn start_states(&self) -> impl Iterator<Item = &StartState> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Start(s) => Some(s),
            _ => None,
        })
    }
}
