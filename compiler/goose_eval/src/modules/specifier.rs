//! Module specifiers: `scheme:path`, or a bare path whose shape picks the
//! scheme.

use std::fmt;

use goose_ir::is_identifier;

use crate::errors::{import_error, EvalError};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Scheme {
    /// A path on disk, relative to the importing module.
    File,
    /// A package under `<goose root>/pkg`.
    Pkg,
    /// The compiled-in standard library.
    Std,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::File => "file",
            Scheme::Pkg => "pkg",
            Scheme::Std => "std",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed import specifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Specifier {
    pub scheme: Scheme,
    pub path: String,
    /// A bare `./` or `../` path, which takes the importer's scheme.
    pub relative: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SpecifierError {
    #[error("empty module specifier")]
    Empty,
    #[error("invalid scheme {0}")]
    InvalidScheme(String),
    #[error("cannot derive module name from {0}")]
    NoModuleName(String),
    #[error("_module.goose not found in directory {0}")]
    MissingModuleFile(String),
    #[error("module {0} not found")]
    NotFound(String),
    #[error("cannot resolve {0}: no goose root")]
    NoRoot(String),
}

impl From<SpecifierError> for EvalError {
    fn from(err: SpecifierError) -> Self {
        import_error(err.to_string())
    }
}

impl Specifier {
    pub fn parse(spec: &str) -> Result<Self, SpecifierError> {
        if spec.is_empty() {
            return Err(SpecifierError::Empty);
        }
        if let Some((scheme, path)) = spec.split_once(':') {
            let scheme = match scheme {
                "file" => Scheme::File,
                "pkg" => Scheme::Pkg,
                "std" => Scheme::Std,
                other => return Err(SpecifierError::InvalidScheme(other.to_string())),
            };
            return Ok(Specifier {
                scheme,
                path: path.to_string(),
                relative: false,
            });
        }
        let relative =
            spec == "." || spec == ".." || spec.starts_with("./") || spec.starts_with("../");
        let (scheme, path) = if relative || spec.starts_with('/') {
            (Scheme::File, spec)
        } else if let Some(rest) = spec.strip_prefix("std/") {
            (Scheme::Std, rest)
        } else {
            (Scheme::Pkg, spec)
        };
        Ok(Specifier {
            scheme,
            path: path.to_string(),
            relative,
        })
    }
}

/// Binding name of a plain `import "spec"`: the last path part without
/// `.goose`, or the directory name for `_module.goose` and `index.goose`.
pub fn derive_module_name(spec: &str) -> Result<String, SpecifierError> {
    let path = spec.split_once(':').map_or(spec, |(_, path)| path);
    let parts: Vec<&str> = path
        .split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect();
    let no_name = || SpecifierError::NoModuleName(spec.to_string());

    let mut parts = parts.iter().rev().map(|part| part.trim_end_matches(".goose"));
    let mut name = parts.next().ok_or_else(no_name)?;
    if name == "_module" || name == "index" {
        name = parts.next().ok_or_else(no_name)?;
    }
    if !is_identifier(name) {
        return Err(no_name());
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn spec(scheme: Scheme, path: &str) -> Result<Specifier, SpecifierError> {
        Ok(Specifier {
            scheme,
            path: path.to_string(),
            relative: false,
        })
    }

    fn relative(path: &str) -> Result<Specifier, SpecifierError> {
        Ok(Specifier {
            scheme: Scheme::File,
            path: path.to_string(),
            relative: true,
        })
    }

    #[test]
    fn bare_paths_pick_their_scheme() {
        assert_eq!(Specifier::parse("./util.goose"), relative("./util.goose"));
        assert_eq!(Specifier::parse("../lib"), relative("../lib"));
        assert_eq!(Specifier::parse("/abs/x"), spec(Scheme::File, "/abs/x"));
        assert_eq!(Specifier::parse(".."), relative(".."));
        assert_eq!(Specifier::parse("colors/rgb"), spec(Scheme::Pkg, "colors/rgb"));
        assert_eq!(Specifier::parse("std/math"), spec(Scheme::Std, "math"));
    }

    #[test]
    fn explicit_schemes() {
        assert_eq!(Specifier::parse("std:json"), spec(Scheme::Std, "json"));
        assert_eq!(Specifier::parse("file:a/b"), spec(Scheme::File, "a/b"));
        assert_eq!(
            Specifier::parse("http:x"),
            Err(SpecifierError::InvalidScheme("http".to_string()))
        );
        assert_eq!(Specifier::parse(""), Err(SpecifierError::Empty));
    }

    #[test]
    fn module_names() {
        assert_eq!(derive_module_name("./lib/util.goose"), Ok("util".to_string()));
        assert_eq!(derive_module_name("std:math"), Ok("math".to_string()));
        assert_eq!(derive_module_name("./shapes/_module.goose"), Ok("shapes".to_string()));
        assert_eq!(derive_module_name("pkg:colors/index"), Ok("colors".to_string()));
        assert_eq!(
            derive_module_name("./my-lib.goose"),
            Err(SpecifierError::NoModuleName("./my-lib.goose".to_string()))
        );
        assert_eq!(
            derive_module_name(".."),
            Err(SpecifierError::NoModuleName("..".to_string()))
        );
    }
}
