#[macro_use]
mod common;

lox_test!(calling_a_function_with_the_right_arity_works, "fun add(a, b) { return a + b; } print add(1, 2);", lines = ["3"]);

lox_test!(
    calling_a_non_callable_value_is_a_runtime_error,
    "var a = 1; a();",
    runtime_error = "Can only call functions and classes."
);

lox_test!(native_clock_is_callable_and_returns_a_number, "print clock() >= 0;", lines = ["true"]);
