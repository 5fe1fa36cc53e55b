#[macro_use]
mod common;

lox_test!(
    super_calls_the_immediate_superclass_method,
    r#"class A { m() { print "A"; } } class B < A { m() { super.m(); print "B"; } } B().m();"#,
    lines = ["A", "B"]
);

lox_test!(
    super_is_resolved_relative_to_the_defining_class_not_the_receiver,
    r#"
    class A { m() { print "A"; } }
    class B < A { m() { super.m(); } }
    class C < B { m() { super.m(); print "C"; } }
    C().m();
    "#,
    lines = ["A", "C"]
);

lox_test!(
    super_outside_a_subclass_is_a_compile_error,
    "class A { m() { super.m(); } }",
    compile_error = "Can't use 'super' in a class with no superclass."
);

lox_test!(
    super_outside_any_class_is_a_compile_error,
    "fun f() { super.m(); }",
    compile_error = "Can't use 'super' outside of a class."
);
