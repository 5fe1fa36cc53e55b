#[macro_use]
mod common;

lox_test!(
    functions_without_a_return_implicitly_return_nil,
    "fun f() { } print f();",
    lines = ["nil"]
);

lox_test!(
    functions_print_as_fun_name,
    "fun f() {} print f;",
    lines = ["<fn f>"]
);

lox_test!(
    anonymous_function_expressions_are_callable,
    "var f = fun (a) { return a + 1; }; print f(2);",
    lines = ["3"]
);

lox_test!(
    getters_are_invoked_without_a_call,
    r#"class Circle { area { return 4; } } print Circle().area;"#,
    lines = ["4"]
);

lox_test!(
    recursive_functions_see_themselves,
    "fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); } print fib(6);",
    lines = ["8"]
);
