//! Runtime error types.
//!
//! Every failure the evaluator can produce travels as an [`EvalError`].
//! Non-local control flow (`return`, `break`, `continue`, `exit`, generator
//! cancellation) rides the same channel in `control_flow`, so `?` unwinds
//! both faults and signals to the boundary that handles them.
//!
//! Factory functions (`division_by_zero()`, `undefined_variable(name)`, ...)
//! are the public way to build errors; they fill `kind` and `message`
//! together.

use std::fmt;
use std::sync::Arc;

use goose_ir::{SourceFile, Span};

use crate::value::Value;

/// Result of evaluating an expression or calling a function.
pub type EvalResult = Result<Value, EvalError>;

/// Exit code reported when an uncaught fault escapes `run()`.
pub const PANIC_EXIT_CODE: i32 = 128;

/// Non-local exits.
#[derive(Clone, Debug)]
pub enum ControlFlow {
    Return(Value),
    Break,
    Continue,
    /// `exit(code)` unwinding to the top level.
    Exit(i32),
    /// The consumer of a generator went away; unwinds the generator body.
    Cancel,
}

impl ControlFlow {
    fn describe(&self) -> &'static str {
        match self {
            ControlFlow::Return(_) => "return",
            ControlFlow::Break => "break",
            ControlFlow::Continue => "continue",
            ControlFlow::Exit(_) => "exit",
            ControlFlow::Cancel => "cancel",
        }
    }
}

/// Typed error category.
///
/// `Display` produces the user-facing message; factory functions copy it
/// into [`EvalError::message`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Scope
    UndefinedVariable { name: String },
    ConstantAssignment { name: String },
    BuiltinRedefinition { name: String },
    VariableRedefinition { name: String },
    InvalidVariableName,

    // Values and operators
    TypeMismatch { message: String },
    OperatorNotDefined { op: String, left: String, right: String },
    NotCallable { type_name: String },
    DivisionByZero,
    FrozenValue,

    // Access
    InvalidIndex { type_name: String },
    InvalidPropertyKey { type_name: String },
    IndexOutOfRange { index: String },
    PropertyOfNull { name: String },

    // Modules
    DuplicateExport { name: String },
    UndefinedExport { name: String, module: String },
    NotExported { name: String, module: String },
    NameAlreadyDefined { name: String },
    Import { message: String },
    NativeMissing { key: String, module: String },

    /// `throw expr`; the thrown value rides on [`EvalError::thrown`].
    Thrown { message: String },

    /// A broken runtime invariant rather than a fault in the program.
    /// Never routed to `catch`.
    Internal { message: String },

    /// A non-local exit; see [`EvalError::control_flow`].
    Control,

    /// Catch-all for messages without a dedicated variant.
    Custom { message: String },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndefinedVariable { name } => write!(f, "{name} is not defined"),
            Self::ConstantAssignment { name } => write!(f, "cannot assign to constant {name}"),
            Self::BuiltinRedefinition { name } => write!(f, "cannot redefine builtin {name}"),
            Self::VariableRedefinition { name } => write!(f, "cannot redefine variable {name}"),
            Self::InvalidVariableName => write!(f, "cannot use _ as a variable name"),

            Self::TypeMismatch { message }
            | Self::Import { message }
            | Self::Thrown { message }
            | Self::Internal { message }
            | Self::Custom { message } => f.write_str(message),
            Self::OperatorNotDefined { op, left, right } => {
                write!(f, "operator {op} not defined for types {left} and {right}")
            }
            Self::NotCallable { type_name } => {
                write!(f, "expression of type {type_name} is not callable")
            }
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::FrozenValue => write!(f, "cannot modify frozen value"),

            Self::InvalidIndex { type_name } => write!(f, "cannot use {type_name} as an index"),
            Self::InvalidPropertyKey { type_name } => {
                write!(f, "cannot use {type_name} as a property key")
            }
            Self::IndexOutOfRange { index } => write!(f, "index {index} out of range"),
            Self::PropertyOfNull { name } => write!(f, "cannot access property {name} of null"),

            Self::DuplicateExport { name } => write!(f, "duplicate export {name}"),
            Self::UndefinedExport { name, module } => {
                write!(f, "undefined export {name} in module {module}")
            }
            Self::NotExported { name, module } => write!(
                f,
                "value {name} is defined locally in module {module} but is not exported"
            ),
            Self::NameAlreadyDefined { name } => write!(f, "name {name} is already defined"),
            Self::NativeMissing { key, module } => {
                write!(f, "native symbol {key} not found in module {module}")
            }

            Self::Control => write!(f, "unhandled control flow"),
        }
    }
}

/// Secondary information attached to an error.
#[derive(Clone, Debug)]
pub struct EvalNote {
    pub message: String,
    pub span: Option<Span>,
}

impl EvalNote {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span: None,
        }
    }

    pub fn with_span(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span: Some(span),
        }
    }
}

/// Evaluation error.
#[derive(Clone, Debug)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Human-readable message; equals `kind.to_string()` for factory-built
    /// errors.
    pub message: String,
    /// Source location of the innermost node being evaluated.
    pub span: Option<Span>,
    /// File the span points into. Filled at the first function or module
    /// boundary the error crosses.
    pub source: Option<Arc<SourceFile>>,
    pub notes: Vec<EvalNote>,
    /// Set when this "error" is a non-local exit.
    pub control_flow: Option<ControlFlow>,
    /// The operand of `throw`.
    pub thrown: Option<Value>,
}

impl EvalError {
    /// Error with a plain message and the `Custom` kind.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::from_kind(EvalErrorKind::Custom { message })
    }

    pub(crate) fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            message,
            span: None,
            source: None,
            notes: Vec::new(),
            control_flow: None,
            thrown: None,
        }
    }

    /// Wrap a control-flow signal so it can unwind through `?`.
    pub fn control(flow: ControlFlow) -> Self {
        let mut err = Self::from_kind(EvalErrorKind::Control);
        err.message = flow.describe().to_string();
        err.control_flow = Some(flow);
        err
    }

    /// User `throw`. `message` is the thrown value's string form.
    pub fn thrown(value: Value, message: impl Into<String>) -> Self {
        let mut err = Self::from_kind(EvalErrorKind::Thrown {
            message: message.into(),
        });
        err.thrown = Some(value);
        err
    }

    /// Attach a source span, replacing any existing one.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Attach `span` only if no inner node already claimed the error.
    #[must_use]
    pub fn or_span(mut self, span: Span) -> Self {
        if self.span.is_none() && self.control_flow.is_none() {
            self.span = Some(span);
        }
        self
    }

    /// Attach the file the span refers to, unless one is already set.
    #[must_use]
    pub fn or_source(mut self, source: Option<&Arc<SourceFile>>) -> Self {
        if self.source.is_none() && self.span.is_some() {
            self.source = source.cloned();
        }
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: EvalNote) -> Self {
        self.notes.push(note);
        self
    }

    #[inline]
    pub fn is_control_flow(&self) -> bool {
        self.control_flow.is_some()
    }

    /// Whether `try`/`catch` may intercept this error. Control flow and
    /// internal invariant violations always pass through.
    pub fn is_catchable(&self) -> bool {
        self.control_flow.is_none() && !matches!(self.kind, EvalErrorKind::Internal { .. })
    }

    /// `file:line:col` of the error, when both a span and a file are known.
    pub fn location(&self) -> Option<String> {
        let (span, source) = (self.span?, self.source.as_ref()?);
        let pos = source.line_col(span.start);
        Some(format!("{}:{}:{}", source.name(), pos.line, pos.col))
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location() {
            Some(location) => write!(f, "{location}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for EvalError {}

/// How an interpreter run ended.
#[derive(Debug)]
pub struct RunOutcome {
    pub exit_code: i32,
    pub error: Option<EvalError>,
}

impl RunOutcome {
    pub fn success() -> Self {
        RunOutcome {
            exit_code: 0,
            error: None,
        }
    }
}

// Scope

#[cold]
pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedVariable {
        name: name.to_string(),
    })
}

#[cold]
pub fn constant_assignment(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ConstantAssignment {
        name: name.to_string(),
    })
}

#[cold]
pub fn builtin_redefinition(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::BuiltinRedefinition {
        name: name.to_string(),
    })
}

#[cold]
pub fn variable_redefinition(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::VariableRedefinition {
        name: name.to_string(),
    })
}

#[cold]
pub fn invalid_variable_name() -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidVariableName)
}

// Values and operators

#[cold]
pub fn type_mismatch(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        message: message.into(),
    })
}

/// `right` is `"nothing"` for unary operators.
#[cold]
pub fn operator_not_defined(op: &str, left: &str, right: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::OperatorNotDefined {
        op: op.to_string(),
        left: left.to_string(),
        right: right.to_string(),
    })
}

#[cold]
pub fn not_callable(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable {
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero)
}

#[cold]
pub fn frozen_value() -> EvalError {
    EvalError::from_kind(EvalErrorKind::FrozenValue)
}

// Access

#[cold]
pub fn invalid_index(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidIndex {
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn invalid_property_key(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidPropertyKey {
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn index_out_of_range(index: impl fmt::Display) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IndexOutOfRange {
        index: index.to_string(),
    })
}

#[cold]
pub fn property_of_null(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::PropertyOfNull {
        name: name.to_string(),
    })
}

// Modules

#[cold]
pub fn duplicate_export(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DuplicateExport {
        name: name.to_string(),
    })
}

#[cold]
pub fn undefined_export(name: &str, module: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedExport {
        name: name.to_string(),
        module: module.to_string(),
    })
}

#[cold]
pub fn not_exported(name: &str, module: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotExported {
        name: name.to_string(),
        module: module.to_string(),
    })
}

#[cold]
pub fn name_already_defined(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NameAlreadyDefined {
        name: name.to_string(),
    })
}

#[cold]
pub fn import_error(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Import {
        message: message.into(),
    })
}

#[cold]
pub fn native_missing(key: &str, module: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NativeMissing {
        key: key.to_string(),
        module: module.to_string(),
    })
}

// Internal

#[cold]
pub fn internal(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Internal {
        message: message.into(),
    })
}

/// A `return`, `break` or `continue` reached a boundary that cannot
/// consume it.
#[cold]
pub fn stray_control_flow(flow: &ControlFlow, boundary: &str) -> EvalError {
    internal(format!("cannot {} from {boundary}", flow.describe()))
}

#[cfg(test)]
mod tests;
