#[macro_use]
mod common;

lox_test!(
    init_runs_on_construction,
    r#"class Foo { init() { print "constructing"; } } Foo();"#,
    lines = ["constructing"]
);

lox_test!(
    init_always_returns_this_regardless_of_body,
    "class Foo { init() { return; } } var f = Foo(); print f;",
    lines = ["<Foo> instance"]
);

lox_test!(
    returning_a_value_from_init_is_a_compile_error,
    "class Foo { init() { return 1; } }",
    compile_error = "Can't return a value from an initializer."
);

lox_test!(
    init_arity_matches_its_declared_parameters,
    "class Pair { init(a, b) { this.a = a; this.b = b; } } var p = Pair(1, 2); print p.a; print p.b;",
    lines = ["1", "2"]
);
