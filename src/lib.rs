//! Krait: a lazy, closure-capturing, tree-walking interpreter for a small
//! dynamically-typed expression-oriented language.
//!
//! This crate is organized the way the specification's own component
//! breakdown is: [`frontend`] turns source text into an AST, [`runtime`]
//! evaluates it against a persistent lexical-scope value model, and
//! [`backend`] resolves the two kinds of external reference a program can
//! make (other `.krait` modules, native libraries). [`diagnostics`] is the
//! closed set of language-level errors both ends can raise.

pub mod backend;
pub mod config;
pub mod diagnostics;
pub mod frontend;
pub mod io;
pub mod runtime;
pub mod utils;

use anyhow::{Context, Result};
use backend::library_loader::LibraryLoader;
use backend::module_loader::ModuleLoader;
use config::RunConfig;
use diagnostics::KraitError;
use io::PrintSink;
use runtime::environment::Environment;
use runtime::interpreter::{bind_global_builtins, Interpreter};
use std::path::Path;

/// The outcome of a single interpreter run, distinguishing the two error
/// layers the specification separates: a closed language-level
/// diagnostic (exit code 1) versus an unrecoverable host failure (exit
/// code 2).
pub enum RunOutcome {
    Success,
    /// A closed language-level diagnostic, together with the source text
    /// of whichever file (the entry file or `KRAIT_STARTUP`) raised it —
    /// needed so the caller renders the snippet against the right line
    /// numbers.
    LanguageError(KraitError, String),
}

/// Runs `entry_file` to completion, writing `println`/`print` output to
/// `sink`.
///
/// # Errors
/// An `anyhow::Error` for host-level failures: the entry file or a
/// `KRAIT_STARTUP` file couldn't be read, or couldn't be parsed as a
/// program at all in a way that makes evaluating it meaningless (parse
/// errors from the *entry* file are still a [`RunOutcome::LanguageError`]
/// returned via `Ok`, since they are a language-level diagnostic, not a
/// host failure).
pub fn run(entry_file: &Path, config: &RunConfig, sink: &mut dyn PrintSink) -> Result<RunOutcome> {
    let source = utils::read_file_with_context(entry_file).with_context(|| {
        format!("couldn't read entry file {}", entry_file.display())
    })?;

    let modules = ModuleLoader::new(config.search_paths.clone());
    let libraries = LibraryLoader::new(config.search_paths.clone());
    let mut interpreter = Interpreter::new(modules, libraries, sink);

    if let Some(startup_path) = &config.startup {
        let startup_source = utils::read_file_with_context(startup_path)
            .with_context(|| format!("couldn't read KRAIT_STARTUP file {}", startup_path.display()))?;
        let startup_env = Environment::root();
        bind_global_builtins(&startup_env);
        let bindings = match run_program_collecting_bindings(&mut interpreter, &startup_source, &startup_env) {
            Ok(bindings) => bindings,
            Err(err) => return Ok(RunOutcome::LanguageError(err, startup_source)),
        };
        interpreter.set_startup(bindings, config.startup_exclude.clone());
    }

    // The entry file counts as "currently loading" for import-cycle
    // detection the same way a nested `import` target does — otherwise
    // `import("main")` from within `main.krait` itself would never be
    // recognized as a cycle on its first, self-referential call.
    let entry_path = entry_file.canonicalize().unwrap_or_else(|_| entry_file.to_path_buf());
    interpreter.modules.push_loading(entry_path);

    let root_env = Environment::root();
    bind_global_builtins(&root_env);
    let outcome = match run_program(&mut interpreter, &source, &root_env) {
        Ok(()) => Ok(RunOutcome::Success),
        Err(err) => Ok(RunOutcome::LanguageError(err, source)),
    };
    interpreter.modules.pop_loading();
    outcome
}

fn run_program(interpreter: &mut Interpreter<'_>, source: &str, env: &Environment) -> Result<(), KraitError> {
    let mut parser = frontend::parser::Parser::new(source)?;
    let stmts = parser.parse_program()?;
    interpreter.eval_program(&stmts, env)?;
    Ok(())
}

fn run_program_collecting_bindings(
    interpreter: &mut Interpreter<'_>,
    source: &str,
    env: &Environment,
) -> Result<Vec<(String, runtime::value::Value)>, KraitError> {
    let mut parser = frontend::parser::Parser::new(source)?;
    let stmts = parser.parse_program()?;
    interpreter.eval_program(&stmts, env)?;
    let bindings = env
        .own_names()
        .into_iter()
        .filter_map(|name| {
            let cell = env.lookup(&name)?;
            runtime::environment::force(&cell, |expr, env| interpreter.eval_expr(expr, env))
                .ok()
                .map(|v| (name, v))
        })
        .collect();
    Ok(bindings)
}
