//! glint-drv - pipeline orchestration.
//!
//! Grounded on `faxc-drv`'s `Config`/`Session` shape (a config struct the
//! CLI builds, a session that owns the one run of the pipeline and
//! reports a structured result) but driving this language's actual
//! pipeline: source text -> [`glint_lex::Lexer`] -> [`glint_par::parse`]
//! -> either [`glint_eval::Evaluator`] directly, or [`glint_compile`] to a
//! bytecode file followed by [`glint_vm::Vm`]. A `.glnc` input skips
//! straight to the VM stage.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use glint_lex::Lexer;
use glint_native::{register_builtins, NativeRegistry};
use glint_par::Node;
use glint_util::Diagnostics;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("{0} error(s) found while compiling/parsing; see diagnostics above")]
    Diagnostics(usize),
    #[error(transparent)]
    Compile(#[from] glint_compile::CompileError),
    #[error(transparent)]
    Eval(#[from] glint_eval::EvalError),
    #[error(transparent)]
    Vm(#[from] glint_vm::VmError),
    #[error(transparent)]
    Bytecode(#[from] glint_compile::BytecodeError),
}

/// Where the driver looks for `load`ed source/native files, and which file
/// extensions mark a source vs. a compiled-bytecode input. Built from CLI
/// flags layered over an optional `glint.toml` (see the `glintc` crate).
#[derive(Debug, Clone)]
pub struct Config {
    pub search_dirs: Vec<PathBuf>,
    pub source_ext: String,
    pub compiled_ext: String,
    pub debug: bool,
    pub compile: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_dirs: Vec::new(),
            source_ext: glint_util::SOURCE_EXT.to_string(),
            compiled_ext: glint_util::COMPILED_EXT.to_string(),
            debug: false,
            compile: false,
        }
    }
}

/// The outcome of running one file through the pipeline: the value the
/// program produced (if it ran to completion or called `exit`) and the
/// process exit code it implies.
pub struct RunOutcome {
    pub value: glint_value::Value,
    pub exit_code: i32,
}

pub struct Session {
    config: Config,
    registry: NativeRegistry,
}

impl Session {
    pub fn new(config: Config) -> Self {
        let mut registry = NativeRegistry::new();
        register_builtins(&mut registry);
        Self { config, registry }
    }

    fn search_dirs(&self) -> Vec<PathBuf> {
        glint_native::search_dirs(self.config.search_dirs.iter())
    }

    /// Runs `path`, dispatching on its extension: a compiled-bytecode file
    /// (`config.compiled_ext`) goes straight to the VM, everything else is
    /// lexed/parsed as source and either evaluated or (with `-c`) compiled.
    pub fn run_file(&mut self, path: &Path) -> Result<RunOutcome, DriverError> {
        if has_extension(path, &self.config.compiled_ext) {
            return self.run_bytecode_file(path);
        }
        self.run_source_file(path)
    }

    fn run_source_file(&mut self, path: &Path) -> Result<RunOutcome, DriverError> {
        let source = std::fs::read_to_string(path)?;
        let filename = path.display().to_string();

        let mut diags = Diagnostics::new();
        let tokens = Lexer::new(&source, &filename).tokenize(&mut diags);
        debug!(count = tokens.len(), "lex complete");
        if diags.has_errors() {
            diags.print_errors();
            return Err(DriverError::Diagnostics(diags.errors.len()));
        }

        let ast = glint_par::parse(
            tokens,
            filename.clone(),
            self.search_dirs(),
            &mut self.registry,
            &mut diags,
        );
        if diags.has_errors() {
            diags.print_errors();
            return Err(DriverError::Diagnostics(diags.errors.len()));
        }
        info!("parse complete");
        let Node::Program(program) = ast else {
            unreachable!("glint_par::parse always returns Node::Program")
        };

        if self.config.debug {
            print!("{}", Node::Program(program.clone()).print_tree(0));
        }

        if self.config.compile {
            let instrs = glint_compile::compile_program(&program)?;
            info!(count = instrs.len(), "compiled to bytecode");
            let out_path = path.with_extension(&self.config.compiled_ext);
            let mut writer = BufWriter::new(File::create(&out_path)?);
            glint_compile::write_program(&mut writer, &instrs)?;
            writer.flush()?;
            info!(path = %out_path.display(), "wrote bytecode file");
            return Ok(RunOutcome { value: glint_value::Value::NullOp, exit_code: 0 });
        }

        let mut evaluator = glint_eval::Evaluator::new(&self.registry);
        let result = evaluator.eval_program(&program)?;
        info!("evaluation complete");
        let exit_code = if result.is_exit { as_exit_code(&result.value) } else { 0 };
        Ok(RunOutcome { value: result.value, exit_code })
    }

    fn run_bytecode_file(&mut self, path: &Path) -> Result<RunOutcome, DriverError> {
        let mut reader = std::io::BufReader::new(File::open(path)?);
        let instrs = glint_vm::load_program(&mut reader)?;
        info!(count = instrs.len(), "loaded bytecode file");
        let mut vm = glint_vm::Vm::new();
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        vm.run(&instrs, &mut handle)?;
        info!("VM halted");
        Ok(RunOutcome { value: glint_value::Value::NullOp, exit_code: 0 })
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(ext)
}

fn as_exit_code(value: &glint_value::Value) -> i32 {
    match value {
        glint_value::Value::Int(i) => *i as i32,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn write_source(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn evaluates_a_source_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(&dir, "main.gln", "println(1 + 2);");
        let mut session = Session::new(Config::default());
        let outcome = session.run_file(&path).unwrap();
        assert_eq!(outcome.exit_code, 0);
    }

    #[test]
    fn compiling_then_running_bytecode_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(&dir, "main.gln", "println(2 * 21);");

        let mut config = Config::default();
        config.compile = true;
        let mut session = Session::new(config);
        session.run_file(&path).unwrap();

        let bytecode_path = path.with_extension("glnc");
        assert!(bytecode_path.exists());

        let mut run_session = Session::new(Config::default());
        let outcome = run_session.run_file(&bytecode_path).unwrap();
        assert_eq!(outcome.exit_code, 0);
    }

    #[test]
    fn syntax_errors_are_reported_as_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(&dir, "main.gln", "println(;");
        let mut session = Session::new(Config::default());
        let err = session.run_file(&path).unwrap_err();
        assert!(matches!(err, DriverError::Diagnostics(_)));
    }

    #[test]
    fn exit_call_propagates_its_code() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(&dir, "main.gln", "exit(7);");
        let mut session = Session::new(Config::default());
        let outcome = session.run_file(&path).unwrap();
        assert_eq!(outcome.exit_code, 7);
    }
}
