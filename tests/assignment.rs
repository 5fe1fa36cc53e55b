#[macro_use]
mod common;

lox_test!(global_assignment_persists, "var a = 1; a = 2; print a;", lines = ["2"]);

lox_test!(
    assignment_is_right_associative,
    "var a = 1; var b = 2; var c = 3; a = b = c; print a; print b; print c;",
    lines = ["3", "3", "3"]
);

lox_test!(assignment_returns_the_assigned_value, "var a = 1; print a = 2;", lines = ["2"]);

lox_test!(
    assigning_to_an_undefined_variable_is_a_runtime_error,
    "unknown = 1;",
    runtime_error = "Undefined variable 'unknown'."
);

lox_test!(invalid_assignment_target_is_a_compile_error, "1 = 2;", compile_error = "Invalid assignment target.");

lox_test!(
    assigning_to_a_call_expression_is_a_compile_error,
    "fun f() {} f() = 1;",
    compile_error = "Invalid assignment target."
);
