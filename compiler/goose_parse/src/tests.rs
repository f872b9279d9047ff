#![expect(clippy::unwrap_used, reason = "tests unwrap known-good parses")]

use super::*;
use goose_ir::ast::{
    CompositeKey, ExprKind, FuncBody, FuncKind, NativeDecl, Pattern, ShowClause, ShowField,
    StmtKind, StringPart,
};
use pretty_assertions::assert_eq;

fn parse_ok(source: &str) -> ast::Module {
    match parse_module(source) {
        Ok(module) => module,
        Err(errors) => panic!("unexpected errors for {source:?}: {errors:?}"),
    }
}

fn single_stmt(source: &str) -> StmtKind {
    let mut module = parse_ok(source);
    assert_eq!(module.stmts.len(), 1, "expected one statement in {source:?}");
    module.stmts.remove(0).kind
}

fn expr(source: &str) -> ast::Expr {
    match parse_expression(source) {
        Ok(expr) => expr,
        Err(errors) => panic!("unexpected errors for {source:?}: {errors:?}"),
    }
}

/// Compact rendering of an expression tree for shape assertions.
fn sexpr(e: &ast::Expr) -> String {
    match &e.kind {
        ExprKind::Int(n) => n.to_string(),
        ExprKind::Ident(id) => id.name.to_string(),
        ExprKind::Binary { op, left, right } => {
            format!("({op} {} {})", sexpr(left), sexpr(right))
        }
        ExprKind::Unary { op, operand } => format!("({op} {})", sexpr(operand)),
        ExprKind::Pipeline { left, right } => format!("(-> {} {})", sexpr(left), sexpr(right)),
        ExprKind::Range { start, stop, step } => match step {
            Some(step) => format!("(to {} {} {})", sexpr(start), sexpr(stop), sexpr(step)),
            None => format!("(to {} {})", sexpr(start), sexpr(stop)),
        },
        ExprKind::Call { callee, args } => {
            let args: Vec<_> = args.iter().map(sexpr).collect();
            format!("(call {} {})", sexpr(callee), args.join(" "))
        }
        ExprKind::Selector { object, name } => format!("(. {} {})", sexpr(object), name.name),
        ExprKind::Index { object, index } => format!("([] {} {})", sexpr(object), sexpr(index)),
        ExprKind::Paren(inner) => sexpr(inner),
        other => format!("{other:?}"),
    }
}

#[test]
fn test_precedence_and_associativity() {
    assert_eq!(sexpr(&expr("1 + 2 * 3")), "(+ 1 (* 2 3))");
    assert_eq!(sexpr(&expr("1 - 2 - 3")), "(- (- 1 2) 3)");
    assert_eq!(sexpr(&expr("2 ** 3 ** 2")), "(** 2 (** 3 2))");
    assert_eq!(sexpr(&expr("a || b && c")), "(|| a (&& b c))");
    assert_eq!(sexpr(&expr("a ?? b || c")), "(?? a (|| b c))");
    assert_eq!(sexpr(&expr("a == b | c")), "(== a (| b c))");
    assert_eq!(sexpr(&expr("-a * b")), "(* (- a) b)");
}

#[test]
fn test_is_and_is_not() {
    assert_eq!(sexpr(&expr("p is Point")), "(is p Point)");
    assert_eq!(sexpr(&expr("p is not Point")), "(is not p Point)");
}

#[test]
fn test_pipeline_binds_loosest() {
    assert_eq!(sexpr(&expr("x + 1 -> f(_)")), "(-> (+ x 1) (call f _))");
}

#[test]
fn test_range_with_step() {
    assert_eq!(sexpr(&expr("1 to n + 1 step 2")), "(to 1 (+ n 1) 2)");
    assert_eq!(sexpr(&expr("0 to 10")), "(to 0 10)");
}

#[test]
fn test_postfix_chain() {
    assert_eq!(
        sexpr(&expr("a.b(1, 2)[0].end")),
        "(. ([] (call (. a b) 1 2) 0) end)"
    );
}

#[test]
fn test_slice_forms() {
    assert!(matches!(
        expr("s[1:]").kind,
        ExprKind::Slice {
            low: Some(_),
            high: None,
            ..
        }
    ));
    assert!(matches!(
        expr("s[:2]").kind,
        ExprKind::Slice {
            low: None,
            high: Some(_),
            ..
        }
    ));
    let errors = parse_expression("s[:]").unwrap_err();
    assert_eq!(errors[0].message, "slice needs a start or an end");
}

#[test]
fn test_bind_operator() {
    let ExprKind::Bind { object, func } = expr("obj::helpers.run").kind else {
        panic!("expected bind");
    };
    assert_eq!(sexpr(&object), "obj");
    assert_eq!(sexpr(&func), "(. helpers run)");
}

#[test]
fn test_debug_suffix() {
    assert!(matches!(expr("x?").kind, ExprKind::Debug(_)));
}

#[test]
fn test_array_literals() {
    assert!(matches!(expr("[]").kind, ExprKind::Array(ref items) if items.is_empty()));
    assert!(matches!(expr("[1, 2, 3,]").kind, ExprKind::Array(ref items) if items.len() == 3));
    assert!(matches!(expr("[0; 10]").kind, ExprKind::ArrayInit { .. }));
    assert!(matches!(expr("[...xs, 1]").kind, ExprKind::Array(ref items)
        if matches!(items[0].kind, ExprKind::Spread(_))));
}

#[test]
fn test_composite_keys() {
    let ExprKind::Composite(fields) = expr(r#"{ a: 1, "b c": 2, 3: 4, [k]: 5, end: 6 }"#).kind
    else {
        panic!("expected composite");
    };
    assert_eq!(fields.len(), 5);
    assert!(matches!(&fields[0].key, CompositeKey::Ident(id) if &*id.name == "a"));
    assert!(matches!(&fields[1].key, CompositeKey::Str(s, _) if &**s == "b c"));
    assert!(matches!(&fields[2].key, CompositeKey::Int(..)));
    assert!(matches!(&fields[3].key, CompositeKey::Computed(_)));
    assert!(matches!(&fields[4].key, CompositeKey::Ident(id) if &*id.name == "end"));
}

#[test]
fn test_string_interpolation_expression_spans() {
    let source = r#""sum: ${a + b}""#;
    let ExprKind::Str(parts) = expr(source).kind else {
        panic!("expected string");
    };
    assert_eq!(parts.len(), 2);
    let StringPart::Expr(inner) = &parts[1] else {
        panic!("expected interpolated expression");
    };
    assert_eq!(sexpr(inner), "(+ a b)");
    assert_eq!(&source[inner.span.to_range()], "a + b");
}

#[test]
fn test_let_const_and_assignments() {
    assert!(matches!(single_stmt("let x = 1"), StmtKind::Let { value: Some(_), .. }));
    assert!(matches!(single_stmt("let x"), StmtKind::Let { value: None, .. }));
    assert!(matches!(single_stmt("const y = 2"), StmtKind::Const { .. }));
    assert!(matches!(
        single_stmt("x.y += 3"),
        StmtKind::Assign {
            op: Op::AddAssign,
            ..
        }
    ));
    assert!(matches!(
        single_stmt("#count++"),
        StmtKind::IncDec { op: Op::Inc, .. }
    ));
}

#[test]
fn test_semicolons_separate_statements() {
    let module = parse_ok("let x = 1; x += 2; print(x)");
    assert_eq!(module.stmts.len(), 3);
}

#[test]
fn test_const_requires_value() {
    let errors = parse_module("const y").unwrap_err();
    assert_eq!(
        errors[0].message,
        "const declaration must be followed by an assignment"
    );
}

#[test]
fn test_invalid_assignment_target() {
    let errors = parse_module("1 + 2 = 3").unwrap_err();
    assert_eq!(errors[0].message, "cannot assign to this expression");
}

#[test]
fn test_if_else_chain() {
    let stmt = single_stmt("if a\n  print(1)\nelse if b\n  print(2)\nelse\n  print(3)\nend");
    let StmtKind::If {
        body, else_body, ..
    } = stmt
    else {
        panic!("expected if");
    };
    assert_eq!(body.len(), 1);
    let else_body = else_body.unwrap();
    let StmtKind::If { else_body, .. } = &else_body[0].kind else {
        panic!("expected nested if");
    };
    assert_eq!(else_body.as_ref().unwrap().len(), 1);
}

#[test]
fn test_braced_bodies() {
    assert!(matches!(
        single_stmt(r#"for c in "ab" { print(c) }"#),
        StmtKind::For { ref body, .. } if body.len() == 1
    ));
    assert!(matches!(
        single_stmt("if x { y() } else { z() }"),
        StmtKind::If {
            else_body: Some(_),
            ..
        }
    ));
}

#[test]
fn test_if_then_expression_statement() {
    assert!(matches!(
        single_stmt("if a then b else c"),
        StmtKind::Expr(ast::Expr {
            kind: ExprKind::If { .. },
            ..
        })
    ));
}

#[test]
fn test_repeat_forms() {
    assert!(matches!(
        single_stmt("repeat while x < 3\n x++\nend"),
        StmtKind::RepeatWhile { .. }
    ));
    assert!(matches!(
        single_stmt("repeat forever\n break\nend"),
        StmtKind::RepeatForever { .. }
    ));
    assert!(matches!(
        single_stmt("repeat 3 times\n print(1)\nend"),
        StmtKind::RepeatCount { .. }
    ));
}

#[test]
fn test_return_without_value() {
    let stmt = single_stmt("fn f()\n  return\nend");
    let StmtKind::Expr(ast::Expr {
        kind: ExprKind::Func(lit),
        ..
    }) = stmt
    else {
        panic!("expected function");
    };
    let FuncBody::Block(body) = &lit.body else {
        panic!("expected block body");
    };
    assert!(matches!(body[0].kind, StmtKind::Return(None)));
}

#[test]
fn test_named_function_is_not_called_by_next_line() {
    let module = parse_ok("fn f()\n  1\nend\n(2)");
    assert_eq!(module.stmts.len(), 2);
}

#[test]
fn test_function_forms() {
    let ExprKind::Func(lit) = expr("memo fn fib(n, ...rest) -> n").kind else {
        panic!("expected function");
    };
    assert!(lit.memo);
    assert_eq!(lit.name.as_ref().map(|n| &*n.name), Some("fib"));
    assert!(lit.params[1].rest);

    let module = parse_ok("fn Point.len() -> 0");
    let StmtKind::Expr(ast::Expr {
        kind: ExprKind::Func(lit),
        ..
    }) = &module.stmts[0].kind
    else {
        panic!("expected function");
    };
    assert_eq!(lit.receiver.as_ref().map(|n| &*n.name), Some("Point"));

    let ExprKind::Func(lit) = expr("generator(n)\n yield n\nend").kind else {
        panic!("expected generator");
    };
    assert_eq!(lit.kind, FuncKind::Generator);
}

#[test]
fn test_struct_declarations() {
    let module = parse_ok("struct Point(x, y) end\nlet p = Point(1, 2)");
    assert_eq!(module.stmts.len(), 2);

    let StmtKind::Struct(decl) = single_stmt("struct V(x = 0)\ninit\n  #x = 1\nend") else {
        panic!("expected struct");
    };
    assert!(decl.fields[0].default.is_some());
    assert_eq!(decl.init.as_ref().map(Vec::len), Some(1));
}

#[test]
fn test_struct_inside_block_leaves_end_to_block() {
    let stmt = single_stmt("fn f()\n  struct P(a)\nend");
    assert!(matches!(stmt, StmtKind::Expr(_)));
}

#[test]
fn test_operator_declaration() {
    let StmtKind::Operator(decl) = single_stmt("operator Vec +(other) -> other") else {
        panic!("expected operator");
    };
    assert_eq!(decl.op, Op::Add);
    assert_eq!(&*decl.receiver.name, "Vec");

    let errors = parse_module("operator Vec &&(other) -> other").unwrap_err();
    assert!(errors[0].message.starts_with("expected overloadable operator"));
}

#[test]
fn test_try_catch_finally() {
    let StmtKind::Try { catch, finally, .. } =
        single_stmt("try\n  risky()\ncatch as e\n  print(e)\nfinally\n  done()\nend")
    else {
        panic!("expected try");
    };
    assert_eq!(catch.unwrap().binding.map(|b| b.name.to_string()), Some("e".to_string()));
    assert!(finally.is_some());

    let errors = parse_module("try\n  x()\nend").unwrap_err();
    assert_eq!(errors[0].message, "expected catch or finally");
}

#[test]
fn test_import_forms() {
    let StmtKind::Import(decl) = single_stmt(r#"import "std:math" as m"#) else {
        panic!("expected import");
    };
    assert_eq!(&*decl.specifier, "std:math");
    assert_eq!(decl.alias.map(|a| a.name.to_string()), Some("m".to_string()));

    let StmtKind::Import(decl) = single_stmt(r#"import "./lib" show ..."#) else {
        panic!("expected import");
    };
    assert!(matches!(decl.show, Some(ShowClause::All)));

    let StmtKind::Import(decl) =
        single_stmt(r#"import "./lib" show { a, b as c, ...rest, "sub" as s }"#)
    else {
        panic!("expected import");
    };
    let Some(ShowClause::Fields(fields)) = decl.show else {
        panic!("expected field list");
    };
    assert_eq!(fields.len(), 4);
    assert!(matches!(&fields[1], ShowField::Name { alias: Some(_), .. }));
    assert!(matches!(&fields[2], ShowField::Rest(_)));
    assert!(matches!(&fields[3], ShowField::Spec(_)));
}

#[test]
fn test_name_after_rest_is_rejected() {
    let errors = parse_module(r#"import "./lib" show { ...rest, a }"#).unwrap_err();
    assert!(errors[0]
        .message
        .starts_with("expected submodule import or end of import list"));
}

#[test]
fn test_interpolated_specifier_is_rejected() {
    let errors = parse_module(r#"import "./$name""#).unwrap_err();
    assert_eq!(
        errors[0].message,
        "module specifier cannot contain interpolation"
    );
}

#[test]
fn test_export_forms() {
    assert!(matches!(single_stmt("export let x = 1"), StmtKind::ExportDecl(_)));
    assert!(matches!(
        single_stmt("export { a, b as c }"),
        StmtKind::ExportList(ref names) if names.len() == 2
    ));
    assert!(matches!(
        single_stmt(r#"export "./other" show ..."#),
        StmtKind::ExportSpec(_)
    ));
    let errors = parse_module("export 1").unwrap_err();
    assert!(errors[0]
        .message
        .starts_with("expected module specifier, export list, or declaration"));
}

#[test]
fn test_native_declarations() {
    assert!(matches!(
        single_stmt("native const pi"),
        StmtKind::Native(NativeDecl::Const(_))
    ));
    assert!(matches!(
        single_stmt("native struct File(path)"),
        StmtKind::Native(NativeDecl::Struct { ref fields, .. }) if fields.len() == 1
    ));
    assert!(matches!(
        single_stmt("native fn String.trim()"),
        StmtKind::Native(NativeDecl::Func {
            receiver: Some(_),
            ..
        })
    ));
    assert!(matches!(
        single_stmt("native operator Integer +(other)"),
        StmtKind::Native(NativeDecl::Operator { op: Op::Add, .. })
    ));
}

#[test]
fn test_match_patterns() {
    let ExprKind::Match { arms, .. } = expr(
        "match v\n  [$a, 2] -> a\n  0 -> \"zero\"\n  { kind: \"x\", n: $n } -> n\n  $other -> other\n  else -> null\nend",
    )
    .kind
    else {
        panic!("expected match");
    };
    assert_eq!(arms.len(), 5);
    assert!(matches!(&arms[0].pattern, Some(Pattern::Tuple(items, _)) if items.len() == 2));
    assert!(matches!(arms[1].pattern, Some(Pattern::Value(_))));
    assert!(matches!(&arms[2].pattern, Some(Pattern::Composite(fields, _)) if fields.len() == 2));
    assert!(matches!(arms[3].pattern, Some(Pattern::Binding(_))));
    assert!(arms[4].pattern.is_none());
}

#[test]
fn test_do_and_frozen_expressions() {
    assert!(matches!(expr("do\n  1\nend").kind, ExprKind::Do(ref s) if s.len() == 1));
    assert!(matches!(expr("frozen [1, 2]").kind, ExprKind::Frozen(_)));
    assert!(matches!(expr("throw \"bad\"").kind, ExprKind::Throw(_)));
}

#[test]
fn test_error_recovery_reports_each_statement() {
    let errors = parse_module("let = 1\nlet y = 2\nlet = 3").unwrap_err();
    assert_eq!(errors.len(), 2);
    assert!(errors[0].message.starts_with("expected variable name"));
}

#[test]
fn test_trailing_tokens_in_expression() {
    let errors = parse_expression("1 2").unwrap_err();
    assert!(errors[0].message.starts_with("expected end of expression"));
}

#[test]
fn test_goose_parser_seam() {
    let module = GooseParser.parse_module("main", "let a = 1").unwrap();
    assert_eq!(module.stmts.len(), 1);
}
