//! Goose Eval - tree-walking runtime for the goose language.
//!
//! Takes an `ast::Module` from any [`goose_ir::SourceParser`] and runs it.
//!
//! # Architecture
//!
//! - [`Value`]: closed enum of runtime values; containers are shared
//!   handles with interior locks
//! - `proto`: one frozen prototype per builtin type, holding its methods
//!   and operator table; property and operator lookup walk prototype links
//! - `environment`: scopes stored in an arena and addressed by `ScopeId`
//! - [`Interpreter`]: statement execution and expression evaluation
//! - [`modules`]: specifier resolution, the module cache, import/export
//! - [`natives`]: host implementations behind `native` declarations
//! - `generator`: generator functions and iteration over every iterable,
//!   each producer on its own thread behind a rendezvous channel
//!
//! # Errors
//!
//! Every fallible operation returns [`EvalResult`]. Non-local exits
//! (`exit`, generator cancellation) travel in the same `EvalError` with
//! `control_flow` set, so `?` carries them to the construct that consumes
//! them.

mod environment;
pub mod errors;
mod generator;
mod globals;
pub mod interpreter;
pub mod modules;
pub mod natives;
mod operators;
mod print_handler;
mod property;
mod proto;
mod shared;
pub mod value;

pub use environment::{
    AssignError, Binding, CapturedScope, Released, ScopeArena, ScopeId, ScopeOwner, Variable,
    VariableSource,
};
pub use errors::{ControlFlow, EvalError, EvalErrorKind, EvalNote, EvalResult, RunOutcome, PANIC_EXIT_CODE};
pub use generator::{GeneratorHandle, GeneratorRef};
pub use interpreter::{Interpreter, InterpreterBuilder, ScopedFrame, SharedInput};
pub use natives::{NativeModule, NativeRegistry};
pub use print_handler::{
    buffer_handler, silent_handler, stderr_handler, stdout_handler, PrintHandlerImpl,
    SharedPrintHandler, Stream,
};
pub use property::{get_property, set_property};
pub use proto::{prototypes, Prototypes};
pub use shared::{SharedMutableRegistry, SharedRegistry};
pub use value::{FuncContext, Function, NativeFn, PropertyKey, Value};
