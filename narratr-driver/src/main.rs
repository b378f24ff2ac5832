use std::path::PathBuf;

use clap::crate_authors;
use structopt::StructOpt;

use narratr::RunOptions;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "narratr",
    about = "Compiles a Narratr source file into a self-contained target-host script",
    author = crate_authors!(),
)]
struct CLOptions {
    /// Overwrite the output file if it already exists.
    #[structopt(short, long)]
    force: bool,
    /// Output path. Defaults to the input path with its extension changed
    /// to `.ntrc`. Pass `-` or `stdout` to print the generated program to
    /// standard output instead (debug-only; layout is approximate).
    #[structopt(short, long)]
    output: Option<String>,
    /// Raise the `log` crate's verbosity (stackable: `-v`, `-vv`, `-vvv`).
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,
    /// The Narratr source file to compile.
    #[structopt(parse(from_os_str))]
    source: PathBuf,
}

fn main() {
    let cl_options = CLOptions::from_args();

    let level = match cl_options.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(level)
        .init();

    let opts = RunOptions {
        source_path: cl_options.source,
        output: cl_options.output,
        force: cl_options.force,
    };

    std::process::exit(narratr::run(&opts));
}
