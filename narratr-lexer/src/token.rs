use std::fmt;

use crate::location::Location;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Keywords
    Scene,
    Item,
    Start,
    Setup,
    Action,
    Cleanup,
    Say,
    Exposition,
    Win,
    Lose,
    Moves,
    Moveto,
    God,
    If,
    Elif,
    Else,
    While,
    Break,
    Continue,
    And,
    Or,
    Not,
    Is,
    True,
    False,
    Left,
    Right,
    Up,
    Down,

    // Literals / names
    Ident(String),
    SceneId(u32),
    StringLit(String),
    IntLit(i64),
    FloatLit(f64),

    // Punctuation
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Colon,
    Comma,
    Dot,
    Plus,
    Minus,
    Star,
    Slash,
    SlashSlash,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    EqEq,
    NotEq,

    // Layout
    Newline,
    Indent,
    Dedent,
    EndMarker,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use TokenKind::*;
        match self {
            Scene => write!(f, "\"scene\""),
            Item => write!(f, "\"item\""),
            Start => write!(f, "\"start\""),
            Setup => write!(f, "\"setup\""),
            Action => write!(f, "\"action\""),
            Cleanup => write!(f, "\"cleanup\""),
            Say => write!(f, "\"say\""),
            Exposition => write!(f, "\"exposition\""),
            Win => write!(f, "\"win\""),
            Lose => write!(f, "\"lose\""),
            Moves => write!(f, "\"moves\""),
            Moveto => write!(f, "\"moveto\""),
            God => write!(f, "\"god\""),
            If => write!(f, "\"if\""),
            Elif => write!(f, "\"elif\""),
            Else => write!(f, "\"else\""),
            While => write!(f, "\"while\""),
            Break => write!(f, "\"break\""),
            Continue => write!(f, "\"continue\""),
            And => write!(f, "\"and\""),
            Or => write!(f, "\"or\""),
            Not => write!(f, "\"not\""),
            Is => write!(f, "\"is\""),
            True => write!(f, "\"true\""),
            False => write!(f, "\"false\""),
            Left => write!(f, "\"left\""),
            Right => write!(f, "\"right\""),
            Up => write!(f, "\"up\""),
            Down => write!(f, "\"down\""),
            Ident(s) => write!(f, "identifier '{}'", s),
            SceneId(n) => write!(f, "scene id '${}'", n),
            StringLit(_) => write!(f, "string literal"),
            IntLit(n) => write!(f, "integer literal '{}'", n),
            FloatLit(n) => write!(f, "float literal '{}'", n),
            LBrace => write!(f, "'{{'"),
            RBrace => write!(f, "'}}'"),
            LParen => write!(f, "'('"),
            RParen => write!(f, "')'"),
            LBracket => write!(f, "'['"),
            RBracket => write!(f, "']'"),
            Colon => write!(f, "':'"),
            Comma => write!(f, "','"),
            Dot => write!(f, "'.'"),
            Plus => write!(f, "'+'"),
            Minus => write!(f, "'-'"),
            Star => write!(f, "'*'"),
            Slash => write!(f, "'/'"),
            SlashSlash => write!(f, "'//'"),
            Less => write!(f, "'<'"),
            Greater => write!(f, "'>'"),
            LessEq => write!(f, "'<='"),
            GreaterEq => write!(f, "'>='"),
            EqEq => write!(f, "'=='"),
            NotEq => write!(f, "'!='"),
            Newline => write!(f, "NEWLINE"),
            Indent => write!(f, "INDENT"),
            Dedent => write!(f, "DEDENT"),
            EndMarker => write!(f, "end of file"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    kind: TokenKind,
    lexeme: String,
    location: Location,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, location: Location) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            location,
        }
    }

    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    pub fn location(&self) -> Location {
        self.location
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}
