//! Syntax tree for goose modules.
//!
//! Nodes own their children through `Box`/`Vec`. Function, struct and
//! operator bodies sit behind `Arc` because runtime values (closures,
//! constructors, operator entries) keep them alive after the module that
//! declared them has finished running.

use std::sync::Arc;

use num_bigint::BigInt;

use crate::{Op, Span};

/// A parsed source file.
#[derive(Debug, Clone)]
pub struct Module {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// An identifier together with where it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: Arc<str>,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<Arc<str>>, span: Span) -> Self {
        Ident {
            name: name.into(),
            span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    /// Expression statement. Named `fn`/`generator` declarations also land
    /// here, the way they are evaluated as expressions that bind a name.
    Expr(Expr),
    Let {
        name: Ident,
        value: Option<Expr>,
    },
    Const {
        name: Ident,
        value: Expr,
    },
    Symbol {
        name: Ident,
    },
    Assign {
        target: Expr,
        op: Op,
        op_span: Span,
        value: Expr,
    },
    IncDec {
        target: Expr,
        op: Op,
    },
    Return(Option<Expr>),
    Break,
    Continue,
    Yield(Expr),
    If {
        cond: Expr,
        body: Vec<Stmt>,
        else_body: Option<Vec<Stmt>>,
    },
    For {
        binding: Ident,
        iterable: Expr,
        body: Vec<Stmt>,
        is_await: bool,
    },
    RepeatWhile {
        cond: Expr,
        body: Vec<Stmt>,
    },
    RepeatForever {
        body: Vec<Stmt>,
    },
    RepeatCount {
        count: Expr,
        body: Vec<Stmt>,
    },
    Struct(Arc<StructDecl>),
    Operator(Arc<OperatorDecl>),
    Try {
        body: Vec<Stmt>,
        catch: Option<CatchClause>,
        finally: Option<Vec<Stmt>>,
    },
    Import(ImportDecl),
    /// `export <declaration>`
    ExportDecl(Box<Stmt>),
    /// `export { a, b as c }`
    ExportList(Vec<ExportName>),
    /// `export "spec" ...` re-export
    ExportSpec(ImportDecl),
    Native(NativeDecl),
}

#[derive(Debug, Clone)]
pub struct CatchClause {
    pub binding: Option<Ident>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Null,
    Bool(bool),
    Int(BigInt),
    Float(f64),
    Str(Vec<StringPart>),
    Ident(Ident),
    /// `#name`: property `name` of `this`.
    ThisProp(Ident),
    /// `#[key]`: computed property of `this`.
    ThisIndex(Box<Expr>),
    Array(Vec<Expr>),
    /// `[value; count]`
    ArrayInit {
        value: Box<Expr>,
        count: Box<Expr>,
    },
    Composite(Vec<CompositeField>),
    Func(Arc<FuncLit>),
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Selector {
        object: Box<Expr>,
        name: Ident,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Slice {
        object: Box<Expr>,
        low: Option<Box<Expr>>,
        high: Option<Box<Expr>>,
    },
    /// `object::func`
    Bind {
        object: Box<Expr>,
        func: Box<Expr>,
    },
    Unary {
        op: Op,
        operand: Box<Expr>,
    },
    /// `...expr` inside call arguments and array literals.
    Spread(Box<Expr>),
    Binary {
        op: Op,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `left -> right`, with `_` bound to `left` while evaluating `right`.
    Pipeline {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `start to stop [step step]`
    Range {
        start: Box<Expr>,
        stop: Box<Expr>,
        step: Option<Box<Expr>>,
    },
    /// Postfix `expr?`: print the expression and its value, then yield it.
    Debug(Box<Expr>),
    Paren(Box<Expr>),
    Frozen(Box<Expr>),
    If {
        cond: Box<Expr>,
        then: Box<Expr>,
        else_: Option<Box<Expr>>,
    },
    Do(Vec<Stmt>),
    Match {
        subject: Box<Expr>,
        arms: Vec<MatchArm>,
    },
    Throw(Box<Expr>),
    Await(Box<Expr>),
}

/// A piece of a string literal.
#[derive(Debug, Clone)]
pub enum StringPart {
    /// Literal text with escapes already decoded.
    Text(Arc<str>),
    /// `$name`
    Ident(Ident),
    /// `$#name`
    ThisProp(Ident),
    /// `${expr}`
    Expr(Expr),
}

#[derive(Debug, Clone)]
pub struct CompositeField {
    pub key: CompositeKey,
    pub value: Expr,
}

#[derive(Debug, Clone)]
pub enum CompositeKey {
    /// Bare identifier key; stored as a string property.
    Ident(Ident),
    Str(Arc<str>, Span),
    Int(BigInt, Span),
    /// `[expr]`
    Computed(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuncKind {
    Function,
    Generator,
}

/// A function or generator literal, named or anonymous.
#[derive(Debug)]
pub struct FuncLit {
    pub kind: FuncKind,
    pub name: Option<Ident>,
    /// `fn Point.len() ...`: the struct whose prototype receives the method.
    pub receiver: Option<Ident>,
    pub params: Vec<Param>,
    pub body: FuncBody,
    pub memo: bool,
    pub is_async: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: Ident,
    pub default: Option<Expr>,
    /// `...name`
    pub rest: bool,
}

#[derive(Debug)]
pub enum FuncBody {
    /// `-> expr`
    Arrow(Expr),
    Block(Vec<Stmt>),
}

#[derive(Debug)]
pub struct StructDecl {
    pub name: Ident,
    pub fields: Vec<StructField>,
    pub init: Option<Vec<Stmt>>,
    pub span: Span,
}

#[derive(Debug)]
pub struct StructField {
    pub name: Ident,
    pub default: Option<Expr>,
}

/// `operator Recv OP(params) ...`
#[derive(Debug)]
pub struct OperatorDecl {
    pub receiver: Ident,
    pub op: Op,
    pub func: Arc<FuncLit>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct MatchArm {
    /// `None` for the `else ->` arm.
    pub pattern: Option<Pattern>,
    pub body: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Pattern {
    /// `$name`: always matches, binding the subject.
    Binding(Ident),
    /// A plain expression compared with `==` (or range containment).
    Value(Expr),
    Paren(Box<Pattern>),
    /// `[p1, p2, ...]`
    Tuple(Vec<Pattern>, Span),
    /// `{ key: p, ... }`
    Composite(Vec<(CompositeKey, Pattern)>, Span),
}

/// `import "spec" [as name | show ...]`, also the body of `export "spec"`.
#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub specifier: Arc<str>,
    pub specifier_span: Span,
    pub alias: Option<Ident>,
    pub show: Option<ShowClause>,
}

#[derive(Debug, Clone)]
pub enum ShowClause {
    /// `show ...`
    All,
    Fields(Vec<ShowField>),
}

#[derive(Debug, Clone)]
pub enum ShowField {
    /// `name` or `name as alias`
    Name { name: Ident, alias: Option<Ident> },
    /// `...rest`
    Rest(Ident),
    /// `"sub" [as alias | show ...]`, forwarded to `spec/sub`.
    Spec(ImportDecl),
}

#[derive(Debug, Clone)]
pub struct ExportName {
    pub name: Ident,
    pub alias: Option<Ident>,
}

#[derive(Debug, Clone)]
pub enum NativeDecl {
    Const(Ident),
    Struct {
        name: Ident,
        fields: Vec<Ident>,
    },
    Func {
        name: Ident,
        receiver: Option<Ident>,
        params: Vec<Param>,
        memo: bool,
        is_async: bool,
    },
    Operator {
        receiver: Ident,
        op: Op,
        params: Vec<Param>,
        is_async: bool,
    },
}

impl NativeDecl {
    /// Name bound in the declaring scope, if any. Receiver functions and
    /// operators attach to a prototype instead.
    pub fn bound_name(&self) -> Option<&Ident> {
        match self {
            NativeDecl::Const(name)
            | NativeDecl::Struct { name, .. }
            | NativeDecl::Func {
                name,
                receiver: None,
                ..
            } => Some(name),
            NativeDecl::Func { .. } | NativeDecl::Operator { .. } => None,
        }
    }
}
