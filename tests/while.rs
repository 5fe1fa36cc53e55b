#[macro_use]
mod common;

lox_test!(
    while_loop_runs_while_the_condition_is_truthy,
    "var i = 0; while (i < 3) { print i; i = i + 1; }",
    lines = ["0", "1", "2"]
);

lox_test!(while_loop_with_a_falsy_condition_never_runs, "while (false) { print \"never\"; }", lines = []);

lox_test!(
    a_while_loop_body_can_return_out_of_an_enclosing_function,
    "fun f() { var i = 0; while (true) { if (i == 2) return i; i = i + 1; } } print f();",
    lines = ["2"]
);
