use std::fmt;
use std::io;

/// Code generation failure, grounded on `original_source/codegen.py`'s
/// `_process_error` (`"ERROR: Line N: ..."` to stderr, `exit(1)`) and
/// `_add_main`'s nonexistent-start-scene check.
#[derive(Debug)]
pub enum Error {
    /// A scene referenced by `start`/`moveto`/`moves` was never declared.
    UnknownScene { scene_id: u32, line: u32 },
    /// `pocket.<trailer>(...)` called with the wrong argument count.
    PocketArity {
        trailer: &'static str,
        expected: usize,
        found: usize,
        line: u32,
    },
    /// An unrecognized `pocket` trailer (only `add`/`get`/`remove`/`has`/
    /// `update` are defined).
    UnknownPocketTrailer { trailer: String, line: u32 },
    /// An identifier used in a position that requires a resolved
    /// `SymbolKey` had none (only the four built-ins are key-less, and
    /// the parser never emits them where a key is required).
    UnresolvedIdent { name: String, line: u32 },
    /// `pocket.add`/`update`/`remove` lower to Python statements (an
    /// `if`/`else`, an assignment, a `del`), not expressions, so they
    /// cannot appear nested inside a larger expression the way
    /// `pocket.get`/`has` can.
    PocketNotAnExpression { trailer: &'static str, line: u32 },
    Io(io::Error),
    /// `construct` targeted a path that already exists and `--force` was
    /// not given; the driver surfaces this before compilation in the
    /// common case, but `construct` itself also refuses as a last line
    /// of defense.
    OutputExists(std::path::PathBuf),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::UnknownScene { scene_id, line } => {
                if *line == 0 {
                    write!(f, "start scene ${} does not exist", scene_id)
                } else {
                    write!(f, "Line {}: start scene ${} does not exist", line, scene_id)
                }
            }
            Error::PocketArity {
                trailer,
                expected,
                found,
                line,
            } => write!(
                f,
                "Line {}: pocket.{} requires exactly {} argument(s), {} given",
                line, trailer, expected, found
            ),
            Error::UnknownPocketTrailer { trailer, line } => {
                write!(f, "Line {}: cannot '{}' the pocket", line, trailer)
            }
            Error::UnresolvedIdent { name, line } => {
                write!(f, "Line {}: '{}' has no resolved symbol", line, name)
            }
            Error::PocketNotAnExpression { trailer, line } => write!(
                f,
                "Line {}: pocket.{} is a statement, it cannot be used as a value",
                line, trailer
            ),
            Error::Io(e) => write!(f, "{}", e),
            Error::OutputExists(path) => {
                write!(f, "output file {} already exists (use --force)", path.display())
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

/// A non-fatal condition, grounded on `original_source/codegen.py`'s
/// `_process_warning` (`"WARNING: Line N: ..."` to stderr, no `exit`).
/// Collected during `process`/`construct` and surfaced by the driver
/// after a successful compile.
#[derive(Debug, Clone)]
pub struct Warning {
    pub message: String,
    pub line: Option<u32>,
}

impl Warning {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
        }
    }

    pub fn at(message: impl Into<String>, line: u32) -> Self {
        Self {
            message: message.into(),
            line: Some(line),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "Line {}: {}", line, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}
