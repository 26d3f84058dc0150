//! glintc - the driver binary for the glint scripting language.
//!
//! Parses CLI flags, loads an optional `glint.toml`, initializes logging,
//! then hands everything to [`glint_drv::Session`] to lex/parse/evaluate
//! (or compile/execute) the requested file. Grounded on `faxt::main`'s
//! overall shape (parse CLI -> init logging -> load config -> dispatch)
//! but flattened to the single flag set `spec.md` §6 names, since this
//! tool has one job rather than `faxt`'s init/build/convert subcommands.

mod config;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::Config;

/// glintc - lexer/parser/compiler/VM driver for the glint scripting language.
#[derive(Parser, Debug)]
#[command(name = "glintc")]
#[command(author = "Glint Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compiles and runs glint scripts", long_about = None)]
struct Cli {
    /// Source file or compiled bytecode file to run
    filename: Option<PathBuf>,

    /// Source file (alternative to the positional FILENAME)
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,

    /// Print the parsed AST before evaluation
    #[arg(short, long)]
    debug: bool,

    /// Compile to bytecode instead of evaluating
    #[arg(short, long)]
    compile: bool,

    /// Add a `load` search directory (repeatable). "." is always searched
    /// first regardless of this flag.
    #[arg(short = 'S', action = clap::ArgAction::Append)]
    search_dir: Vec<PathBuf>,

    /// Path to a glint.toml configuration file (default: ./glint.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug-level logging of the pipeline's own progress
    #[arg(short, long)]
    verbose: bool,

    /// Arguments forwarded to the running program, after `--`
    #[arg(last = true)]
    program_args: Vec<String>,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // `spec.md` §6: "-h/--help: print usage and exit 1" and "exit
            // code 1 on any argument error" - clap's own exit codes (0 for
            // --help/--version, 2 for usage errors) don't match either, so
            // every parse outcome other than Ok is normalized to 1 here.
            let _ = e.print();
            return ExitCode::from(1);
        }
    };

    match run(cli) {
        Ok(code) => exit_code_from(code),
        Err(e) => {
            eprintln!("glintc: {e}");
            ExitCode::from(1)
        }
    }
}

fn exit_code_from(code: i32) -> ExitCode {
    ExitCode::from(code.clamp(0, 255) as u8)
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    let Some(path) = cli.file.or(cli.filename) else {
        anyhow::bail!("no input file given; pass a FILENAME or -f/--file");
    };

    let search_dirs = if cli.search_dir.is_empty() {
        config.search_dirs.clone()
    } else {
        cli.search_dir
    };

    glint_native::set_program_args(cli.program_args);

    let driver_config = glint_drv::Config {
        search_dirs,
        source_ext: config.source_ext,
        compiled_ext: config.compiled_ext,
        debug: cli.debug,
        compile: cli.compile,
    };

    let mut session = glint_drv::Session::new(driver_config);
    let outcome = session.run_file(&path)?;
    debug!(exit_code = outcome.exit_code, "run complete");
    Ok(outcome.exit_code)
}

/// Initializes the `tracing` subscriber the pipeline crates emit through;
/// `-v`/`--verbose` raises the filter to `debug`, matching `faxt::main`'s
/// `init_logging`.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let subscriber = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    let _ = tracing_subscriber::registry().with(filter).with(subscriber).try_init();
}

fn load_config(config_path: Option<&std::path::Path>) -> error::Result<Config> {
    match config_path {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positional_filename() {
        let cli = Cli::parse_from(["glintc", "main.gln"]);
        assert_eq!(cli.filename, Some(PathBuf::from("main.gln")));
        assert!(!cli.debug);
        assert!(!cli.compile);
    }

    #[test]
    fn parses_file_flag_as_alternative_to_positional() {
        let cli = Cli::parse_from(["glintc", "-f", "main.gln"]);
        assert_eq!(cli.file, Some(PathBuf::from("main.gln")));
        assert_eq!(cli.filename, None);
    }

    #[test]
    fn parses_debug_and_compile_flags() {
        let cli = Cli::parse_from(["glintc", "-d", "-c", "main.gln"]);
        assert!(cli.debug);
        assert!(cli.compile);
    }

    #[test]
    fn parses_repeated_search_dirs() {
        let cli = Cli::parse_from(["glintc", "-S", "libs", "-S", "vendor", "main.gln"]);
        assert_eq!(cli.search_dir, vec![PathBuf::from("libs"), PathBuf::from("vendor")]);
    }

    #[test]
    fn parses_trailing_program_args() {
        let cli = Cli::parse_from(["glintc", "main.gln", "--", "a", "b"]);
        assert_eq!(cli.program_args, vec!["a".to_string(), "b".to_string()]);
    }
}
