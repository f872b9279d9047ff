//! `InterpreterBuilder` for creating Interpreter instances with various configurations.

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use goose_ir::{ast, ParseError, SourceFile, SourceParser, Span};
use parking_lot::Mutex;

use super::Interpreter;
use crate::environment::{ScopeArena, ScopeOwner};
use crate::errors::EvalError;
use crate::modules::{ModuleCache, ModuleData, Origin, Scheme};
use crate::natives::NativeRegistry;
use crate::print_handler::{stderr_handler, stdout_handler, SharedPrintHandler};
use crate::{globals, SharedMutableRegistry, SharedRegistry};

/// Line source for `readline`, shared with generator workers.
pub type SharedInput = Arc<Mutex<Box<dyn BufRead + Send>>>;

/// Builder for creating Interpreter instances with various configurations.
///
/// Everything has a default: stdout for `print`, stderr for `debug`
/// output, the process stdin, the standard native registry and a goose
/// root taken from the environment. Only the parser has no useful
/// default, since this crate does not depend on one; without it every
/// `import` of a source file fails.
#[derive(Default)]
pub struct InterpreterBuilder {
    print_handler: Option<SharedPrintHandler>,
    error_handler: Option<SharedPrintHandler>,
    stdin: Option<SharedInput>,
    trace: bool,
    goose_root: Option<PathBuf>,
    parser: Option<Arc<dyn SourceParser>>,
    natives: Option<NativeRegistry>,
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the handler `print`, `println` and `printf` write to.
    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = Some(handler);
        self
    }

    /// Set the handler for debug expressions and statement traces.
    #[must_use]
    pub fn error_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.error_handler = Some(handler);
        self
    }

    /// Set where `readline` reads from.
    #[must_use]
    pub fn stdin(mut self, input: impl BufRead + Send + 'static) -> Self {
        self.stdin = Some(Arc::new(Mutex::new(Box::new(input))));
        self
    }

    /// Echo every executed statement to the error handler.
    #[must_use]
    pub fn trace(mut self, enabled: bool) -> Self {
        self.trace = enabled;
        self
    }

    /// Directory `pkg:` specifiers resolve under (`<root>/pkg/...`).
    ///
    /// When unset, `GOOSEROOT`, then `$XDG_DATA_HOME/goose`, then
    /// `$HOME/.goose` are tried.
    #[must_use]
    pub fn goose_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.goose_root = Some(root.into());
        self
    }

    /// Set the parser the module loader uses for imported files.
    #[must_use]
    pub fn parser(mut self, parser: Arc<dyn SourceParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Replace the standard native registry.
    ///
    /// The registry is frozen from here on; it is shared read-only by the
    /// interpreter and its generator workers.
    #[must_use]
    pub fn natives(mut self, registry: NativeRegistry) -> Self {
        self.natives = Some(registry);
        self
    }

    /// Build an interpreter for the parsed main module `module` whose
    /// text is `source`.
    ///
    /// Installs the builtin and global bindings and registers the main
    /// module in the module cache, so a cyclic import of the main file
    /// sees its exports rather than loading it twice.
    pub fn build(self, module: ast::Module, source: SourceFile) -> Result<Interpreter, EvalError> {
        let source = Arc::new(source);

        let mut arena = ScopeArena::new();
        globals::install(&mut arena)?;
        let main_scope = arena.fork(arena.global(), ScopeOwner::Module)?;
        arena.pin(main_scope);

        let path = Path::new(source.name());
        let dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let resolved = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let key = format!("file:{}", resolved.display());
        let main_module = Arc::new(ModuleData::new(
            key.clone(),
            main_scope,
            Arc::clone(&source),
            Origin::Dir {
                scheme: Scheme::File,
                dir,
            },
        ));
        arena.set_module(main_scope, Arc::clone(&main_module))?;

        let mut cache = ModuleCache::default();
        cache.insert(key, main_module);

        let goose_root = self.goose_root.or_else(default_goose_root);
        tracing::debug!(
            main = source.name(),
            root = ?goose_root,
            "interpreter built"
        );

        Ok(Interpreter {
            scopes: SharedMutableRegistry::new(arena),
            modules: SharedMutableRegistry::new(cache),
            natives: SharedRegistry::new(self.natives.unwrap_or_else(NativeRegistry::with_std)),
            parser: self.parser.unwrap_or_else(|| Arc::new(NoParser)),
            print_handler: self.print_handler.unwrap_or_else(stdout_handler),
            error_handler: self.error_handler.unwrap_or_else(stderr_handler),
            stdin: self
                .stdin
                .unwrap_or_else(|| Arc::new(Mutex::new(Box::new(BufReader::new(std::io::stdin()))))),
            trace: self.trace,
            goose_root,
            source: Some(source),
            yielder: None,
            main: Arc::new(module),
            main_scope,
        })
    }
}

fn default_goose_root() -> Option<PathBuf> {
    let var = |name: &str| std::env::var_os(name).filter(|value| !value.is_empty());
    if let Some(root) = var("GOOSEROOT") {
        return Some(PathBuf::from(root));
    }
    if let Some(data) = var("XDG_DATA_HOME") {
        return Some(PathBuf::from(data).join("goose"));
    }
    var("HOME").map(|home| PathBuf::from(home).join(".goose"))
}

/// Stand-in when no parser was configured.
struct NoParser;

impl SourceParser for NoParser {
    fn parse_module(&self, name: &str, _source: &str) -> Result<ast::Module, Vec<ParseError>> {
        Err(vec![ParseError::new(
            format!("cannot load {name}: no parser configured"),
            Span::DUMMY,
        )])
    }
}
