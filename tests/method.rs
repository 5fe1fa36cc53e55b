#[macro_use]
mod common;

lox_test!(
    method_receives_arguments_like_a_function,
    r#"class Scale { apply(n) { return n * 2; } } print Scale().apply(21);"#,
    lines = ["42"]
);

lox_test!(
    bound_methods_can_be_stored_and_called_later,
    r#"class Foo { bar() { return "bar"; } } var f = Foo(); var m = f.bar; print m();"#,
    lines = ["bar"]
);

lox_test!(
    calling_an_undefined_method_is_a_runtime_error,
    "class Foo {} Foo().bar();",
    runtime_error = "Undefined property 'bar'."
);

lox_test!(
    this_inside_a_method_refers_to_the_receiver,
    r#"class Foo { identify() { return this; } } var f = Foo(); print f.identify() == f;"#,
    lines = ["true"]
);
