mod common;

use common::{run, run_ok, OutputCapture};
use rox::Lox;

fn runtime_error(source: &str) -> String {
    let (_, report) = run(source);
    assert!(!report.had_error(), "unexpected static errors: {:?}", report.static_errors);

    report
        .runtime_error
        .map(|e| e.to_string())
        .unwrap_or_else(|| panic!("expected a runtime error from {:?}", source))
}

#[test]
fn arithmetic_follows_precedence() {
    assert_eq!(run_ok("print 1 + 2 * 3;"), vec!["7"]);
    assert_eq!(run_ok("print (1 + 2) * 3;"), vec!["9"]);
    assert_eq!(run_ok("print 10 / 4;"), vec!["2.5"]);
    assert_eq!(run_ok("print 0.1 + 0.2;"), vec!["0.30000000000000004"]);
    assert_eq!(run_ok("print -3 - -3;"), vec!["0"]);
    assert_eq!(run_ok("print 1 / 0;"), vec!["Infinity"]);
}

#[test]
fn string_concatenation() {
    assert_eq!(run_ok("print \"a\" + \"b\";"), vec!["ab"]);
    assert_eq!(
        runtime_error("print \"a\" + 1;"),
        "Operands must be two numbers or two strings.\n[line 1]"
    );
}

#[test]
fn truthiness() {
    assert_eq!(
        run_ok("print !nil; print !0; print !false; print !\"\";"),
        vec!["true", "false", "true", "false"]
    );
}

#[test]
fn comparison_and_equality() {
    assert_eq!(
        run_ok("print 1 < 2; print 2 <= 1; print nil == nil; print nil == false; print \"a\" == \"a\"; print 1 != 1;"),
        vec!["true", "false", "true", "false", "true", "false"]
    );
    assert_eq!(runtime_error("print 1 < \"2\";"), "Operands must be numbers.\n[line 1]");
    assert_eq!(runtime_error("print -\"x\";"), "Operand must be a number.\n[line 1]");
}

#[test]
fn logical_operators_short_circuit_and_return_operands() {
    assert_eq!(
        run_ok("print nil or \"yes\"; print 0 and 2; print false and undefined_name; print 1 or undefined_name;"),
        vec!["yes", "2", "false", "1"]
    );
}

#[test]
fn variables_and_scopes() {
    assert_eq!(
        run_ok("var a = \"global\"; { var a = \"outer\"; { var a = \"inner\"; print a; } print a; } print a;"),
        vec!["inner", "outer", "global"]
    );
    assert_eq!(run_ok("var a; print a; a = 3; print a;"), vec!["nil", "3"]);
    assert_eq!(runtime_error("print nope;"), "Undefined variable 'nope'.\n[line 1]");
    assert_eq!(runtime_error("nope = 1;"), "Undefined variable 'nope'.\n[line 1]");
}

#[test]
fn control_flow() {
    assert_eq!(
        run_ok("var i = 0; while (i < 3) { print i; i = i + 1; } if (i == 3) print \"done\"; else print \"no\";"),
        vec!["0", "1", "2", "done"]
    );
    assert_eq!(
        run_ok("for (var i = 0; i < 2; i = i + 1) print i;"),
        vec!["0", "1"]
    );
}

#[test]
fn functions_and_return() {
    assert_eq!(
        run_ok("fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); } print fib(10);"),
        vec!["55"]
    );
    assert_eq!(run_ok("fun f() {} print f();"), vec!["nil"]);
    assert_eq!(
        run_ok("fun f() { while (true) { { return \"out\"; } } } print f();"),
        vec!["out"]
    );
    assert_eq!(run_ok("fun f() {} print f; print clock;"), vec!["<fn f>", "<native fn>"]);
}

#[test]
fn closures_capture_definition_site() {
    let source = r#"
        var a = "global";
        {
            fun show() { print a; }
            show();
            var a = "block";
            show();
        }
    "#;
    assert_eq!(run_ok(source), vec!["global", "global"]);

    let counter = r#"
        fun makeCounter() {
            var i = 0;
            fun count() { i = i + 1; return i; }
            return count;
        }
        var c = makeCounter();
        c(); c();
        print c();
    "#;
    assert_eq!(run_ok(counter), vec!["3"]);
}

#[test]
fn closures_over_loop_variables_are_distinct() {
    let source = r#"
        var fns0; var fns1; var fns2;
        for (var i = 0; i < 3; i = i + 1) {
            var j = i;
            fun capture() { return j; }
            if (j == 0) fns0 = capture;
            if (j == 1) fns1 = capture;
            if (j == 2) fns2 = capture;
        }
        print fns0(); print fns1(); print fns2();
    "#;
    assert_eq!(run_ok(source), vec!["0", "1", "2"]);
}

#[test]
fn calling_non_callables_and_arity() {
    assert_eq!(
        runtime_error("\"text\"();"),
        "Can only call functions and classes.\n[line 1]"
    );
    assert_eq!(
        runtime_error("fun f(a, b) {}\nf(1);"),
        "Expected 2 arguments but got 1.\n[line 2]"
    );
    assert_eq!(runtime_error("clock(1);"), "Expected 0 arguments but got 1.\n[line 1]");
}

#[test]
fn clock_returns_seconds() {
    assert_eq!(run_ok("print clock() > 0;"), vec!["true"]);
}

#[test]
fn classes_and_instances() {
    let source = r#"
        class Point {
            init(x) { this.x = x; }
            getX() { return this.x; }
        }
        var p = Point(5);
        print p.x;
        print p.getX();
        print p;
        print Point;
    "#;
    assert_eq!(run_ok(source), vec!["5", "5", "<Point instance>", "Point"]);

    assert_eq!(
        runtime_error("class Point { init(x) { this.x = x; } }\nPoint();"),
        "Expected 1 arguments but got 0.\n[line 2]"
    );
}

#[test]
fn fields_shadow_methods_and_are_created_on_write() {
    let source = r#"
        class C { m() { return "method"; } }
        var c = C();
        print c.m();
        c.m = "field";
        print c.m;
        c.other = 1;
        print c.other;
    "#;
    assert_eq!(run_ok(source), vec!["method", "field", "1"]);
    assert_eq!(
        runtime_error("class C {}\nprint C().missing;"),
        "Undefined property 'missing'.\n[line 2]"
    );
    assert_eq!(runtime_error("var x = 1; print x.y;"), "Only instances have properties.\n[line 1]");
    assert_eq!(runtime_error("var x = 1; x.y = 2;"), "Only instances have fields.\n[line 1]");
}

#[test]
fn bound_methods_remember_their_instance() {
    let source = r#"
        class Person {
            init(name) { this.name = name; }
            greet() { print "hi " + this.name; }
        }
        var greet = Person("ann").greet;
        greet();
        var bob = Person("bob");
        bob.greet = greet;
        bob.greet();
    "#;
    assert_eq!(run_ok(source), vec!["hi ann", "hi ann"]);
}

#[test]
fn initializer_always_yields_instance() {
    let source = r#"
        class Foo {
            init() { this.ok = true; return; }
        }
        var foo = Foo();
        print foo.ok;
        print foo.init();
    "#;
    assert_eq!(run_ok(source), vec!["true", "<Foo instance>"]);

    let returns_value = r#"
        class Bar { init() { return 42; } }
        print Bar();
    "#;
    assert_eq!(run_ok(returns_value), vec!["<Bar instance>"]);
}

#[test]
fn class_can_refer_to_itself() {
    let source = r#"
        class Node {
            init(next) { this.next = next; }
            prepend() { return Node(this); }
        }
        var list = Node(nil).prepend().prepend();
        print list.next.next.next;
    "#;
    assert_eq!(run_ok(source), vec!["nil"]);

    let local = r#"
        {
            class Local { make() { return Local(); } }
            print Local().make();
        }
    "#;
    assert_eq!(run_ok(local), vec!["<Local instance>"]);
}

#[test]
fn runtime_error_halts_the_program() {
    let (output, report) = run("print 1;\nprint -nil;\nprint 2;");

    assert_eq!(output, "1\n");
    assert!(report.had_runtime_error());
    assert!(!report.had_error());
}

#[test]
fn runtime_error_inside_call_restores_globals() {
    let output = OutputCapture::new();
    let mut lox = Lox::with_output(Box::new(output.clone()));

    let report = lox.run("var x = \"global\";\nfun f() { var x = \"local\"; return -x; }\nf();");
    assert!(report.had_runtime_error());

    let report = lox.run("print x;");
    assert!(!report.had_runtime_error());
    assert_eq!(output.contents(), "global\n");
}

#[test]
fn session_keeps_globals_between_runs() {
    let output = OutputCapture::new();
    let mut lox = Lox::with_output(Box::new(output.clone()));

    assert!(!lox.run("fun add(a, b) { return a + b; } var total = 1;").had_error());
    assert!(!lox.run("{ var local = 2; total = add(total, local); }").had_error());
    lox.run("print total;");

    assert_eq!(output.contents(), "3\n");
}

#[test]
fn reruns_are_deterministic() {
    let source = "var a = 1; fun f(x) { return x * 2; } print f(a); print nope;";

    let (first_out, first) = run(source);
    let (second_out, second) = run(source);

    assert_eq!(first_out, second_out);
    let errs = |r: &rox::Report| r.errors().map(|e| e.to_string()).collect::<Vec<_>>();
    assert_eq!(errs(&first), errs(&second));
}

#[test]
fn nested_bodies_recurse_up_to_the_call_limit() {
    let source = r#"
        fun f(n) {
            if (n > 0) {
                {
                    while (true) {
                        { if (true) { return f(n - 1) + 1; } }
                    }
                }
            }
            return 0;
        }
        print f(250);
    "#;

    assert_eq!(run_ok(source), vec!["250"]);
}

#[test]
fn unbounded_recursion_is_a_runtime_error() {
    let message = runtime_error("fun f(n) { { { return f(n + 1) + 1; } } }\nf(0);");

    // the call that overflows is the recursive one inside the body
    assert_eq!(message, "Stack overflow.\n[line 1]");
}

#[test]
fn overflow_leaves_the_session_usable() {
    let output = OutputCapture::new();
    let mut lox = Lox::with_output(Box::new(output.clone()));

    let report = lox.run("fun f() { while (true) { { return f(); } } }\nf();");
    assert!(report.had_runtime_error());

    assert!(!lox.run("print \"after\";").had_runtime_error());
    assert_eq!(output.contents(), "after\n");
}

#[test]
fn deeply_nested_expressions() {
    let depth = 2_000;
    let source = format!("print {}1{};", "(".repeat(depth), ")".repeat(depth));

    assert_eq!(run_ok(&source), vec!["1"]);
}
