//! Driver surface for the Narratr compiler: read a `.ntr` source file, run
//! the lex/parse/codegen pipeline, and write the resulting target-host
//! program to a `.ntrc` file (or standard output). Kept as a library so the
//! CLI binary (`src/main.rs`) stays a thin `StructOpt::from_args` + exit-code
//! shim, matching the split `alap_gen_ng/src/main.rs` draws between CLI
//! parsing and the actual specification/grammar pipeline it drives.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;

use narratr_codegen::{CodeGen, Warning};

/// Where `construct`'s output goes. `"-"`/`"stdout"` on the CLI map to
/// `Stdout`; anything else is a path, matching `spec.md` §6's driver surface.
#[derive(Debug, Clone)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    pub fn from_cli_arg(arg: &str) -> Self {
        if arg == "-" || arg == "stdout" {
            OutputTarget::Stdout
        } else {
            OutputTarget::File(PathBuf::from(arg))
        }
    }
}

/// The default output path: the input path with its extension changed to
/// `ntrc`, mirroring `alap_gen_ng/src/main.rs::with_changed_extension`.
pub fn default_output_path(input: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    if let Some(dir) = input.parent() {
        out.push(dir);
    }
    let stem = input.file_stem().unwrap_or_default();
    out.push(stem);
    out.set_extension("ntrc");
    out
}

/// One failure out of the compile pipeline, with the severity-specific
/// `Display` rendering `spec.md` §7 requires (`"ERROR: Line N: ..."`).
#[derive(Debug)]
pub enum CompileError {
    Parse(narratr_parser::Error),
    Codegen(narratr_codegen::Error),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CompileError::Parse(e) => write!(f, "ERROR: {}", e),
            CompileError::Codegen(e) => write!(f, "ERROR: {}", e),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<narratr_parser::Error> for CompileError {
    fn from(e: narratr_parser::Error) -> Self {
        CompileError::Parse(e)
    }
}

impl From<narratr_codegen::Error> for CompileError {
    fn from(e: narratr_codegen::Error) -> Self {
        CompileError::Codegen(e)
    }
}

/// Runs the full pipeline on already-read source text, returning the
/// generated program text and any warnings collected along the way.
/// Exactly the call sequence `spec.md` §6 names: `parse` → `process` →
/// `construct`, with `construct` writing into an in-memory buffer so the
/// caller decides where the bytes land.
pub fn compile(source: &str) -> Result<(String, Vec<Warning>), CompileError> {
    log::debug!("tokenizing and parsing {} bytes of source", source.len());
    let (program, symtab) = narratr_parser::parse(source)?;
    log::debug!(
        "parsed {} top-level blocks, {} symbol table entries",
        program.blocks.len(),
        symtab.len()
    );

    let mut codegen = CodeGen::new();
    codegen.process(&program, &symtab)?;

    let mut buf = Vec::new();
    codegen.construct(&symtab, &mut buf)?;
    let text = String::from_utf8(buf).expect("codegen only ever writes UTF-8 text");
    log::debug!("generated {} bytes of target source", text.len());

    Ok((text, codegen.warnings().to_vec()))
}

/// Options accepted by the `narratr` binary, independent of the `StructOpt`
/// derive in `main.rs` so library consumers (and tests) can build one
/// without going through `clap`'s argv parsing.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub source_path: PathBuf,
    pub output: Option<String>,
    pub force: bool,
}

/// Exit codes, matching `spec.md` §6 (`0`/`1`) plus the ambient driver-level
/// I/O failure code documented in `SPEC_FULL.md` §6.4, mirroring how
/// `alap_gen/src/main.rs` gives distinct phases distinct `exit` codes.
pub const EXIT_OK: i32 = 0;
pub const EXIT_COMPILE_ERROR: i32 = 1;
pub const EXIT_IO_ERROR: i32 = 2;

/// Reads the source file, compiles it, and writes the result, printing
/// `ERROR:`/`WARNING:` diagnostics to stderr along the way (per `spec.md`
/// §7). Returns the process exit code rather than calling
/// `std::process::exit` itself, so `main` stays the only place that
/// actually terminates the process. Compile errors are driver-level
/// failures with their own `spec.md` §6/§7 formatting and exit code, so
/// only the surrounding I/O (reading the source, writing the output) goes
/// through `anyhow`, matching `betterletters`'s pattern of keeping
/// `anyhow::Context` at the binary's I/O boundary rather than inside its
/// domain logic.
pub fn run(opts: &RunOptions) -> i32 {
    let source = match read_source(&opts.source_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{:#}", e);
            return EXIT_IO_ERROR;
        }
    };

    let target = match &opts.output {
        Some(arg) => OutputTarget::from_cli_arg(arg),
        None => OutputTarget::File(default_output_path(&opts.source_path)),
    };

    if let OutputTarget::File(path) = &target {
        if path.exists() && !opts.force {
            eprintln!(
                "error: output file {} already exists (use --force)",
                path.display()
            );
            return EXIT_IO_ERROR;
        }
    }

    let (text, warnings) = match compile(&source) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("{}", e);
            return EXIT_COMPILE_ERROR;
        }
    };

    for warning in &warnings {
        eprintln!("WARNING: {}", warning);
    }

    match write_output(&target, &text) {
        Ok(()) => EXIT_OK,
        Err(e) => {
            eprintln!("{:#}", e);
            EXIT_IO_ERROR
        }
    }
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("error reading {}", path.display()))
}

fn write_output(target: &OutputTarget, text: &str) -> anyhow::Result<()> {
    match target {
        OutputTarget::Stdout => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(text.as_bytes())
                .context("error writing output to stdout")
        }
        OutputTarget::File(path) => fs::write(path, text)
            .with_context(|| format!("error writing output to {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_path_swaps_extension_to_ntrc() {
        let input = Path::new("game.ntr");
        assert_eq!(default_output_path(input), PathBuf::from("game.ntrc"));
    }

    #[test]
    fn default_output_path_preserves_directory() {
        let input = Path::new("games/castle.ntr");
        assert_eq!(
            default_output_path(input),
            PathBuf::from("games/castle.ntrc")
        );
    }

    #[test]
    fn output_target_recognizes_stdout_aliases() {
        assert!(matches!(
            OutputTarget::from_cli_arg("-"),
            OutputTarget::Stdout
        ));
        assert!(matches!(
            OutputTarget::from_cli_arg("stdout"),
            OutputTarget::Stdout
        ));
        assert!(matches!(
            OutputTarget::from_cli_arg("game.ntrc"),
            OutputTarget::File(_)
        ));
    }

    #[test]
    fn compile_hello_world_succeeds_with_no_warnings() {
        let src = "scene $1 {\n    setup:\n    action:\n        say \"Hello, World!\"\n    cleanup:\n}\nstart: $1\n";
        let (text, warnings) = compile(src).unwrap();
        assert!(text.contains("Hello, World!"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn compile_reports_nonexistent_start_scene_as_an_error() {
        let src = "scene $1 {\n    setup:\n    action:\n    cleanup:\n}\nstart: $42\n";
        let err = compile(src).unwrap_err();
        assert!(format!("{}", err).starts_with("ERROR:"));
    }

    #[test]
    fn run_rejects_an_existing_output_without_force() {
        let dir = std::env::temp_dir().join(format!(
            "narratr-test-{}-{}",
            std::process::id(),
            "existing_output_without_force"
        ));
        fs::create_dir_all(&dir).unwrap();
        let source_path = dir.join("game.ntr");
        fs::write(
            &source_path,
            "scene $1 {\n    setup:\n    action:\n    cleanup:\n}\nstart: $1\n",
        )
        .unwrap();
        let output_path = dir.join("game.ntrc");
        fs::write(&output_path, "already here").unwrap();

        let opts = RunOptions {
            source_path,
            output: Some(output_path.to_string_lossy().to_string()),
            force: false,
        };
        assert_eq!(run(&opts), EXIT_IO_ERROR);
        assert_eq!(fs::read_to_string(&output_path).unwrap(), "already here");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn run_writes_generated_source_on_success() {
        let dir = std::env::temp_dir().join(format!(
            "narratr-test-{}-{}",
            std::process::id(),
            "writes_generated_source"
        ));
        fs::create_dir_all(&dir).unwrap();
        let source_path = dir.join("game.ntr");
        fs::write(
            &source_path,
            "scene $1 {\n    setup:\n    action:\n        say \"hi\"\n    cleanup:\n}\nstart: $1\n",
        )
        .unwrap();

        let opts = RunOptions {
            source_path: source_path.clone(),
            output: None,
            force: false,
        };
        assert_eq!(run(&opts), EXIT_OK);
        let generated = fs::read_to_string(dir.join("game.ntrc")).unwrap();
        assert!(generated.contains("print \"hi\""));

        let _ = fs::remove_dir_all(&dir);
    }
}
