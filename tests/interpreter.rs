use tinj::session::{RunOutcome, Session};

fn run(source: &str) -> (String, RunOutcome) {
    let mut session = Session::with_output(Vec::new());
    let outcome = session.run(source);
    let output = String::from_utf8(session.output().clone()).expect("print output is UTF-8");

    (output, outcome)
}

fn run_ok(source: &str) -> String {
    let (output, outcome) = run(source);
    assert!(!outcome.had_syntax_error, "unexpected syntax error");
    assert!(!outcome.had_runtime_error, "unexpected runtime error");

    output
}

fn assert_runtime_error(source: &str) {
    let (_, outcome) = run(source);
    assert!(!outcome.had_syntax_error, "expected a clean parse");
    assert!(outcome.had_runtime_error, "expected a runtime error");
}

fn assert_static_error(source: &str) {
    let (output, outcome) = run(source);
    assert!(outcome.had_syntax_error, "expected a static error");
    assert_eq!(output, "", "nothing may execute after a static error");
}

// ─────────────────────────────────────────────────────────────────────────
// Expressions and printing
// ─────────────────────────────────────────────────────────────────────────

#[test]
fn arithmetic() {
    assert_eq!(run_ok("print 1 + 2;"), "3\n");
    assert_eq!(run_ok("print (1 + 2) * 3 - 4 / 2;"), "7\n");
}

#[test]
fn string_concatenation() {
    assert_eq!(run_ok("var a = \"he\"; var b = \"llo\"; print a + b;"), "hello\n");
}

#[test]
fn whole_numbers_print_without_fraction() {
    assert_eq!(run_ok("print 6 / 2;"), "3\n");
    assert_eq!(run_ok("print 5 / 2;"), "2.5\n");
}

#[test]
fn division_by_zero_is_ieee() {
    assert_eq!(run_ok("print 1 / 0;"), "inf\n");
}

#[test]
fn unary_minus_reverses_strings() {
    assert_eq!(run_ok("print -\"abc\";"), "cba\n");
}

#[test]
fn unary_minus_negates_numbers_and_bools() {
    assert_eq!(run_ok("print -3;"), "-3\n");
    assert_eq!(run_ok("print -true;"), "false\n");
}

#[test]
fn bang_uses_truthiness() {
    assert_eq!(run_ok("print !nil;"), "true\n");
    assert_eq!(run_ok("print !0;"), "false\n");
    assert_eq!(run_ok("print !\"\";"), "false\n");
}

#[test]
fn nil_equals_only_nil() {
    assert_eq!(run_ok("print nil == false;"), "false\n");
    assert_eq!(run_ok("print nil == nil;"), "true\n");
    assert_eq!(run_ok("print 1 == \"1\";"), "false\n");
}

#[test]
fn logical_operators_return_the_operand() {
    assert_eq!(run_ok("print \"a\" or \"b\";"), "a\n");
    assert_eq!(run_ok("print nil or \"b\";"), "b\n");
    assert_eq!(run_ok("print nil and 2;"), "nil\n");
    assert_eq!(run_ok("print 1 and 2;"), "2\n");
}

#[test]
fn logical_operators_short_circuit_side_effects() {
    let source = r#"
        var called = false;
        fun touch() { called = true; return true; }
        false and touch();
        print called;
        true or touch();
        print called;
    "#;
    assert_eq!(run_ok(source), "false\nfalse\n");
}

#[test]
fn multi_line_strings_print_verbatim() {
    assert_eq!(run_ok("print \"a\nb\";"), "a\nb\n");
}

// ─────────────────────────────────────────────────────────────────────────
// Variables, scopes, control flow
// ─────────────────────────────────────────────────────────────────────────

#[test]
fn uninitialized_variables_are_nil() {
    assert_eq!(run_ok("var a; print a;"), "nil\n");
}

#[test]
fn block_shadowing() {
    assert_eq!(run_ok("var x = 1; { var x = 2; print x; } print x;"), "2\n1\n");
}

#[test]
fn assignment_reaches_the_declaring_scope() {
    assert_eq!(run_ok("var x = 1; { x = 2; } print x;"), "2\n");
}

#[test]
fn assignment_is_an_expression() {
    assert_eq!(run_ok("var a = 1; var b = 2; a = b = 3; print a; print b;"), "3\n3\n");
}

#[test]
fn if_else_branches() {
    assert_eq!(
        run_ok("if (1 < 2) print \"yes\"; else print \"no\";"),
        "yes\n"
    );
    assert_eq!(
        run_ok("if (1 > 2) print \"yes\"; else print \"no\";"),
        "no\n"
    );
}

#[test]
fn zero_is_truthy() {
    assert_eq!(run_ok("if (0) print \"t\";"), "t\n");
}

#[test]
fn while_loop() {
    assert_eq!(
        run_ok("var i = 0; while (i < 3) { print i; i = i + 1; }"),
        "0\n1\n2\n"
    );
}

#[test]
fn for_loop() {
    assert_eq!(
        run_ok("for (var i = 0; i < 3; i = i + 1) print i;"),
        "0\n1\n2\n"
    );
}

#[test]
fn for_loop_matches_handwritten_while() {
    let desugared = run_ok("for (var i = 0; i < 5; i = i + 1) print i;");
    let handwritten = run_ok("{ var i = 0; while (i < 5) { print i; i = i + 1; } }");
    assert_eq!(desugared, handwritten);
}

// ─────────────────────────────────────────────────────────────────────────
// Functions and closures
// ─────────────────────────────────────────────────────────────────────────

#[test]
fn closures_capture_their_defining_environment() {
    let source = r#"
        fun make(n) {
            fun add(x) { return x + n; }
            return add;
        }
        var f = make(10);
        print f(5);
        print f(7);
    "#;
    assert_eq!(run_ok(source), "15\n17\n");
}

#[test]
fn closures_share_mutable_state() {
    let source = r#"
        fun make() {
            var n = 0;
            fun inc() { n = n + 1; return n; }
            return inc;
        }
        var counter = make();
        counter();
        print counter();
    "#;
    assert_eq!(run_ok(source), "2\n");
}

#[test]
fn implicit_return_is_nil() {
    assert_eq!(run_ok("fun f() {} print f();"), "nil\n");
}

#[test]
fn return_exits_the_function_early() {
    let source = r#"
        fun f() {
            return 1;
            print "unreachable";
        }
        print f();
    "#;
    assert_eq!(run_ok(source), "1\n");
}

#[test]
fn recursion() {
    let source = r#"
        fun fib(n) {
            if (n <= 1) return n;
            return fib(n - 2) + fib(n - 1);
        }
        print fib(10);
    "#;
    assert_eq!(run_ok(source), "55\n");
}

#[test]
fn functions_print_by_name() {
    assert_eq!(run_ok("fun f() {} print f;"), "<fn f>\n");
    assert_eq!(run_ok("print clock;"), "<native fn>\n");
}

#[test]
fn clock_and_now_are_numbers() {
    assert_eq!(run_ok("print clock() >= 0;"), "true\n");
    assert_eq!(run_ok("print now >= 0;"), "true\n");
}

// ─────────────────────────────────────────────────────────────────────────
// Classes and instances
// ─────────────────────────────────────────────────────────────────────────

#[test]
fn methods_are_callable() {
    assert_eq!(
        run_ok("class Greeter { greet() { print \"hi\"; } } var g = Greeter(); g.greet();"),
        "hi\n"
    );
}

#[test]
fn fields_can_be_set_and_read() {
    assert_eq!(
        run_ok("class Box {} var b = Box(); b.value = 41; print b.value + 1;"),
        "42\n"
    );
}

#[test]
fn fields_shadow_methods() {
    let source = r#"
        class C {
            m() { return "method"; }
        }
        var c = C();
        c.m = "field";
        print c.m;
    "#;
    assert_eq!(run_ok(source), "field\n");
}

#[test]
fn this_binds_to_the_receiver() {
    let source = r#"
        class Counter {
            bump() {
                this.n = this.n + 1;
                return this.n;
            }
        }
        var c = Counter();
        c.n = 0;
        c.bump();
        print c.bump();
    "#;
    assert_eq!(run_ok(source), "2\n");
}

#[test]
fn bound_methods_remember_their_receiver() {
    let source = r#"
        class Cell {
            read() { return this.value; }
        }
        var cell = Cell();
        cell.value = 7;
        var read = cell.read;
        print read();
    "#;
    assert_eq!(run_ok(source), "7\n");
}

#[test]
fn classes_and_instances_stringify() {
    assert_eq!(run_ok("class C {} print C;"), "C\n");
    assert_eq!(run_ok("class C {} print C();"), "C instance\n");
}

#[test]
fn classes_take_no_constructor_arguments() {
    // No constructor protocol: even a method named like the class or `init`
    // is not invoked on instantiation.
    assert_eq!(
        run_ok("class C { init(n) { this.n = n; } } var c = C(); print c;"),
        "C instance\n"
    );
    assert_runtime_error("class C { init(n) {} } var c = C(1);");
}

// ─────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────

#[test]
fn adding_number_and_string_is_a_runtime_error() {
    assert_runtime_error("print 1 + \"a\";");
}

#[test]
fn comparing_non_numbers_is_a_runtime_error() {
    assert_runtime_error("print \"a\" < \"b\";");
}

#[test]
fn undefined_variable_is_a_runtime_error() {
    assert_runtime_error("print missing;");
}

#[test]
fn calling_a_non_callable_is_a_runtime_error() {
    assert_runtime_error("\"not a function\"();");
}

#[test]
fn arity_mismatch_is_a_runtime_error() {
    assert_runtime_error("fun f(a) { return a; } f();");
    assert_runtime_error("fun f() {} f(1);");
}

#[test]
fn property_access_on_non_instances_is_a_runtime_error() {
    assert_runtime_error("var x = 1; print x.field;");
    assert_runtime_error("var x = 1; x.field = 2;");
}

#[test]
fn undefined_property_is_a_runtime_error() {
    assert_runtime_error("class C {} var c = C(); print c.missing;");
}

#[test]
fn runtime_error_aborts_the_remaining_statements() {
    let (output, outcome) = run("print 1; print missing; print 2;");
    assert!(outcome.had_runtime_error);
    assert_eq!(output, "1\n");
}

#[test]
fn reading_a_local_in_its_own_initializer_is_a_static_error() {
    assert_static_error("{ var a = a; }");
}

#[test]
fn top_level_return_is_a_static_error() {
    assert_static_error("return 1;");
}

#[test]
fn this_outside_a_class_is_a_static_error() {
    assert_static_error("print this;");
}

#[test]
fn syntax_errors_stop_the_pipeline() {
    assert_static_error("print 1; var = 2;");
}

#[test]
fn unknown_characters_are_static_errors() {
    assert_static_error("print 1 @ 2;");
}

// ─────────────────────────────────────────────────────────────────────────
// Session behavior across runs
// ─────────────────────────────────────────────────────────────────────────

#[test]
fn definitions_persist_across_runs() {
    let mut session = Session::with_output(Vec::new());

    let first = session.run("fun add(a, b) { return a + b; }");
    assert!(!first.had_syntax_error && !first.had_runtime_error);

    let second = session.run("print add(1, 2);");
    assert!(!second.had_syntax_error && !second.had_runtime_error);

    assert_eq!(String::from_utf8(session.output().clone()).unwrap(), "3\n");
}

#[test]
fn closures_keep_working_in_later_runs() {
    let mut session = Session::with_output(Vec::new());

    session.run("fun make() { var n = 0; fun inc() { n = n + 1; return n; } return inc; }");
    session.run("var c = make();");
    session.run("c();");
    session.run("print c();");

    assert_eq!(String::from_utf8(session.output().clone()).unwrap(), "2\n");
}

#[test]
fn error_flags_are_fresh_per_run() {
    let mut session = Session::with_output(Vec::new());

    let bad = session.run("var = 1;");
    assert!(bad.had_syntax_error);

    let good = session.run("print 1;");
    assert!(!good.had_syntax_error);
    assert!(!good.had_runtime_error);
}

#[test]
fn globals_survive_a_runtime_error() {
    let mut session = Session::with_output(Vec::new());

    session.run("var g = 1;");
    let failed = session.run("{ var x = 2; print g + \"a\"; }");
    assert!(failed.had_runtime_error);

    let after = session.run("print g;");
    assert!(!after.had_runtime_error);
    assert_eq!(String::from_utf8(session.output().clone()).unwrap(), "1\n");
}
