mod common;

use rox::ast::{ExprKind, Stmt};
use rox::interpreter::Interpreter;
use rox::parser::Parser;
use rox::resolver::Resolver;
use rox::scanner::Scanner;

fn static_errors(source: &str) -> Vec<String> {
    let (_, report) = common::run(source);
    assert!(!report.had_runtime_error());

    report.static_errors.iter().map(|e| e.to_string()).collect()
}

#[test]
fn reading_local_in_its_own_initializer() {
    assert_eq!(
        static_errors("{ var a = a; }"),
        vec!["[line 1] Error at 'a': Can't read local variable in its own initializer."]
    );
}

#[test]
fn global_self_initializer_is_resolved_dynamically() {
    let (_, report) = common::run("var a = a;");

    assert!(!report.had_error());
    // no static error, but the global lookup fails when it runs
    assert_eq!(
        report.runtime_error.map(|e| e.to_string()),
        Some("Undefined variable 'a'.\n[line 1]".to_string())
    );
}

#[test]
fn return_at_top_level() {
    assert_eq!(
        static_errors("return 1;"),
        vec!["[line 1] Error at 'return': Can't return from top-level code."]
    );
}

#[test]
fn this_outside_class() {
    assert_eq!(
        static_errors("print this;\nfun f() { return this; }"),
        vec![
            "[line 1] Error at 'this': Can't use 'this' outside of a class.",
            "[line 2] Error at 'this': Can't use 'this' outside of a class.",
        ]
    );
}

#[test]
fn duplicate_local_declaration() {
    assert_eq!(
        static_errors("fun f(a) { var a; }\n{ var b; var b; }"),
        vec![
            "[line 1] Error at 'a': Already a variable with this name in this scope.",
            "[line 2] Error at 'b': Already a variable with this name in this scope.",
        ]
    );
    // globals may be redeclared
    assert!(static_errors("var g = 1; var g = 2;").is_empty());
}

#[test]
fn resolution_continues_after_an_error() {
    let errors = static_errors("{ var a = a; }\nreturn;");

    assert_eq!(errors.len(), 2);
}

#[test]
fn static_errors_prevent_execution() {
    let (output, report) = common::run("print \"before\";\n{ var x = x; }");

    assert!(report.had_error());
    assert!(!report.had_runtime_error());
    assert_eq!(output, "");
}

#[test]
fn records_hop_counts_by_node_identity() {
    let source = "var a = 0; { var a = 1; { a; } a; } a;";
    let tokens = Scanner::new(source).filter_map(Result::ok).collect();
    let parsed = Parser::new(tokens).parse();
    let mut interpreter = Interpreter::new();

    let errors = Resolver::new(&mut interpreter).resolve(&parsed.statements);
    assert!(errors.is_empty());

    // var a = 0; | { var a = 1; { a; } a; } | a;
    let Stmt::Block(outer) = &parsed.statements[1] else {
        panic!("expected block");
    };
    let Stmt::Block(inner) = &outer[1] else {
        panic!("expected inner block");
    };
    let id_of = |stmt: &Stmt| match stmt {
        Stmt::Expression(expr) => {
            assert!(matches!(expr.kind, ExprKind::Variable(_)));
            expr.id
        }
        other => panic!("unexpected statement {:?}", other),
    };

    assert_eq!(interpreter.local_depth(id_of(&inner[0])), Some(1));
    assert_eq!(interpreter.local_depth(id_of(&outer[2])), Some(0));
    assert_eq!(interpreter.local_depth(id_of(&parsed.statements[2])), None);
}

#[test]
fn returns_inside_methods_and_initializers_are_allowed() {
    let source = r#"
        class C {
            init() { return; }
            value() { return 1; }
            reset() { return this.init(); }
        }
        class D { init() { return 2; } }
    "#;

    assert!(static_errors(source).is_empty());
}
