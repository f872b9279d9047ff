//! Resolving, loading and binding modules.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use goose_ir::ast::{ExportName, Ident, ImportDecl, ShowClause, ShowField, Stmt};
use goose_ir::{ParseError, SourceFile};
use tracing::debug;

use super::specifier::{derive_module_name, Scheme, Specifier, SpecifierError};
use super::{assets, frozen_object, Export, ModuleData, Origin};
use crate::environment::{Binding, ScopeId, ScopeOwner};
use crate::errors::{
    import_error, internal, name_already_defined, not_exported, type_mismatch, undefined_export,
    undefined_variable, EvalError, EvalNote,
};
use crate::interpreter::{Completion, Interpreter};

/// Where a specifier led.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum Resolved {
    File {
        scheme: Scheme,
        path: PathBuf,
    },
    Asset {
        path: &'static str,
        text: &'static str,
    },
}

type Bindings = Vec<(Ident, Export)>;

impl Interpreter {
    /// Load (or fetch from the cache) the module `specifier` names, as
    /// seen from a module whose frame encloses `scope`.
    #[tracing::instrument(level = "trace", skip(self, scope))]
    pub(crate) fn load_module(
        &mut self,
        specifier: &str,
        scope: ScopeId,
    ) -> Result<Arc<ModuleData>, EvalError> {
        let spec = Specifier::parse(specifier)?;
        let (key, resolved) = self.resolve(&spec, &self.importer_origin(scope))?;

        if let Some(module) = self.modules.read().get(&key) {
            debug!(key, "module cache hit");
            return Ok(module);
        }
        debug!(key, "loading module");

        let (name, text, origin) = match resolved {
            Resolved::File { scheme, path } => {
                let text = std::fs::read_to_string(&path).map_err(|err| {
                    import_error(format!("cannot read {}: {err}", path.display()))
                })?;
                let dir = path.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf);
                (path.display().to_string(), text, Origin::Dir { scheme, dir })
            }
            Resolved::Asset { path, text } => {
                let dir = assets::dir_of(path).to_string();
                (format!("std:{path}"), text.to_string(), Origin::Asset { dir })
            }
        };
        let source = Arc::new(SourceFile::new(name.clone(), text));
        let module_ast = self
            .parser
            .parse_module(&name, source.text())
            .map_err(|errors| parse_failure(&source, &errors))?;

        let global = self.global_scope();
        let module_scope = self.fork_scope(global, ScopeOwner::Module)?;
        self.pin_scope(module_scope);
        let module = Arc::new(ModuleData::new(
            key.clone(),
            module_scope,
            Arc::clone(&source),
            origin,
        ));
        self.scopes
            .write()
            .set_module(module_scope, Arc::clone(&module))?;

        // Cached before running so a cyclic import sees the partial module.
        self.modules.write().insert(key.clone(), Arc::clone(&module));
        let result = self.with_source(Some(source), |interp| {
            interp.exec_module_body(&module_ast.stmts, module_scope)
        });
        if let Err(err) = result {
            self.modules.write().remove(&key);
            return Err(err);
        }
        debug!(key, "module loaded");
        Ok(module)
    }

    /// Origin of the module `scope` belongs to; the working directory
    /// when it has none.
    fn importer_origin(&self, scope: ScopeId) -> Origin {
        self.scopes
            .read()
            .module(scope)
            .map_or_else(Origin::working_dir, |module| module.origin().clone())
    }

    /// Cache key and location for `spec` imported from `origin`. A bare
    /// relative path stays in the importer's scheme, so `./x` inside a
    /// `std` module names another asset.
    pub(super) fn resolve(
        &self,
        spec: &Specifier,
        origin: &Origin,
    ) -> Result<(String, Resolved), SpecifierError> {
        if spec.relative {
            return match origin {
                Origin::Dir { scheme, dir } => file_in(*scheme, &dir.join(&spec.path)),
                Origin::Asset { dir } => {
                    let joined = assets::join_relative(dir, &spec.path)
                        .ok_or_else(|| SpecifierError::NotFound(format!("std:{}", spec.path)))?;
                    asset(&joined)
                }
            };
        }
        match spec.scheme {
            Scheme::File => {
                let base = match origin {
                    Origin::Dir { dir, .. } => dir.clone(),
                    Origin::Asset { .. } => PathBuf::from("."),
                };
                file_in(Scheme::File, &base.join(&spec.path))
            }
            Scheme::Pkg => {
                let root = self
                    .goose_root
                    .as_ref()
                    .ok_or_else(|| SpecifierError::NoRoot(format!("pkg:{}", spec.path)))?;
                file_in(Scheme::Pkg, &root.join("pkg").join(&spec.path))
            }
            Scheme::Std => asset(&spec.path),
        }
    }

    // Imports

    /// `import "spec" ...` at the top level of a module.
    #[tracing::instrument(level = "trace", skip_all, fields(spec = %decl.specifier))]
    pub(crate) fn exec_import(&mut self, decl: &ImportDecl, scope: ScopeId) -> Result<(), EvalError> {
        self.require_top_level(scope, "import", decl.specifier_span)?;
        for (name, export) in self.import_bindings(decl, scope)? {
            self.bind_import(scope, &name, export)?;
        }
        Ok(())
    }

    /// Names and values an import declaration introduces.
    fn import_bindings(&mut self, decl: &ImportDecl, scope: ScopeId) -> Result<Bindings, EvalError> {
        let span = decl.specifier_span;
        let module = self
            .load_module(&decl.specifier, scope)
            .map_err(|err| err.or_span(span))?;

        let Some(show) = &decl.show else {
            let name = match &decl.alias {
                Some(alias) => alias.clone(),
                None => Ident::new(
                    derive_module_name(&decl.specifier).map_err(|err| EvalError::from(err).with_span(span))?,
                    span,
                ),
            };
            let snapshot = self.scopes.with_read(|arena| module.snapshot(arena));
            return Ok(vec![(name, Export::Fixed(snapshot))]);
        };

        let fields = match show {
            ShowClause::All => {
                return Ok(module
                    .exports()
                    .into_iter()
                    .map(|(name, export)| (Ident::new(name, span), export))
                    .collect());
            }
            ShowClause::Fields(fields) => fields,
        };

        let mut named: Vec<Arc<str>> = Vec::new();
        let mut bindings = Bindings::new();
        for field in fields {
            match field {
                ShowField::Name { name, alias } => {
                    let export = self.export_of(&module, name, &decl.specifier)?;
                    named.push(name.name.clone());
                    bindings.push((alias.clone().unwrap_or_else(|| name.clone()), export));
                }
                ShowField::Rest(name) => {
                    let rest = self.scopes.with_read(|arena| {
                        module
                            .exports()
                            .into_iter()
                            .filter(|(exported, _)| !named.contains(exported))
                            .map(|(exported, export)| (exported, export.value(arena)))
                            .collect()
                    });
                    bindings.push((name.clone(), Export::Fixed(frozen_object(rest))));
                }
                ShowField::Spec(sub) => {
                    let nested = ImportDecl {
                        specifier: format!("{}/{}", decl.specifier, sub.specifier).into(),
                        ..sub.clone()
                    };
                    bindings.extend(self.import_bindings(&nested, scope)?);
                }
            }
        }
        Ok(bindings)
    }

    /// Export `name` of `module`, telling apart names the module never
    /// defined from ones it keeps private.
    fn export_of(
        &self,
        module: &ModuleData,
        name: &Ident,
        specifier: &str,
    ) -> Result<Export, EvalError> {
        if let Some(export) = module.export(&name.name) {
            return Ok(export);
        }
        let local = self
            .scopes
            .read()
            .is_defined_in_current_scope(module.scope(), &name.name);
        let err = if local {
            not_exported(&name.name, specifier)
        } else {
            undefined_export(&name.name, specifier)
        };
        Err(err.with_span(name.span))
    }

    fn bind_import(&mut self, scope: ScopeId, name: &Ident, export: Export) -> Result<(), EvalError> {
        if self
            .scopes
            .read()
            .is_defined_in_current_scope(scope, &name.name)
        {
            return Err(name_already_defined(&name.name).with_span(name.span));
        }
        self.define(scope, name.name.clone(), export.into_variable())
            .map_err(|err| err.with_span(name.span))
    }

    fn require_top_level(
        &self,
        scope: ScopeId,
        what: &str,
        span: goose_ir::Span,
    ) -> Result<(), EvalError> {
        if self.owner_of(scope) == Some(ScopeOwner::Module) {
            return Ok(());
        }
        Err(type_mismatch(format!("{what} declarations must be at the top level")).with_span(span))
    }

    // Exports

    /// `export <declaration>`
    pub(crate) fn exec_export_decl(&mut self, inner: &Stmt, scope: ScopeId) -> Result<(), EvalError> {
        self.require_top_level(scope, "export", inner.span)?;
        match self.exec_stmt(inner, scope)? {
            Completion::Decl(name, _) => {
                let binding = Binding {
                    scope,
                    name: name.clone(),
                };
                self.add_export(scope, name, Export::Live(binding), inner.span)
            }
            _ => Err(type_mismatch("declaration expected").with_span(inner.span)),
        }
    }

    /// `export { a, b as c }`
    pub(crate) fn exec_export_list(
        &mut self,
        names: &[ExportName],
        scope: ScopeId,
    ) -> Result<(), EvalError> {
        let span = names.first().map_or(goose_ir::Span::DUMMY, |n| n.name.span);
        self.require_top_level(scope, "export", span)?;
        for export in names {
            let local = &export.name.name;
            if self.scopes.read().get_local(scope, local).is_none() {
                return Err(undefined_variable(local).with_span(export.name.span));
            }
            let binding = Binding {
                scope,
                name: local.clone(),
            };
            let exported = export.alias.as_ref().unwrap_or(&export.name);
            self.add_export(scope, exported.name.clone(), Export::Live(binding), exported.span)?;
        }
        Ok(())
    }

    /// `export "spec" ...`: import into a scratch frame, then export
    /// everything that was bound.
    pub(crate) fn exec_export_spec(
        &mut self,
        decl: &ImportDecl,
        scope: ScopeId,
    ) -> Result<(), EvalError> {
        self.require_top_level(scope, "export", decl.specifier_span)?;
        let bindings = self.import_bindings(decl, scope)?;
        self.with_scope(scope, ScopeOwner::Import, |frame, import_scope| {
            for (name, export) in bindings {
                frame.bind_import(import_scope, &name, export.clone())?;
                frame.add_export(scope, name.name.clone(), export, name.span)?;
            }
            Ok(())
        })
    }

    fn add_export(
        &mut self,
        scope: ScopeId,
        name: Arc<str>,
        export: Export,
        span: goose_ir::Span,
    ) -> Result<(), EvalError> {
        let Some(module) = self.scopes.read().module(scope) else {
            return Err(internal("export outside of a module"));
        };
        module.add_export(name, export).map_err(|err| err.with_span(span))
    }
}

/// Key and location of a file reached through `scheme`.
fn file_in(scheme: Scheme, path: &Path) -> Result<(String, Resolved), SpecifierError> {
    let path = resolve_file(path)?;
    Ok((format!("{scheme}:{}", path.display()), Resolved::File { scheme, path }))
}

/// Key and text of a compiled-in `std` module.
fn asset(path: &str) -> Result<(String, Resolved), SpecifierError> {
    let (path, text) =
        assets::lookup(path).ok_or_else(|| SpecifierError::NotFound(format!("std:{path}")))?;
    Ok((format!("std:{path}"), Resolved::Asset { path, text }))
}

/// A directory import means its `_module.goose`; an extensionless path
/// that does not exist gets `.goose` appended.
fn resolve_file(path: &Path) -> Result<PathBuf, SpecifierError> {
    let path = if path.is_dir() {
        let module_file = path.join("_module.goose");
        if !module_file.is_file() {
            return Err(SpecifierError::MissingModuleFile(path.display().to_string()));
        }
        module_file
    } else if !path.exists() && path.extension().is_none() {
        path.with_extension("goose")
    } else {
        path.to_path_buf()
    };
    Ok(std::fs::canonicalize(&path).unwrap_or(path))
}

/// Import failure for a module with syntax errors: the first error is the
/// message, the rest become notes.
fn parse_failure(source: &SourceFile, errors: &[ParseError]) -> EvalError {
    let located = |err: &ParseError| {
        let at = source.line_col(err.span.start);
        format!("{}:{}:{}: {}", source.name(), at.line, at.col, err.message)
    };
    let Some((first, rest)) = errors.split_first() else {
        return import_error(format!("cannot parse {}", source.name()));
    };
    rest.iter().fold(import_error(located(first)), |err, next| {
        err.with_note(EvalNote::new(located(next)))
    })
}
