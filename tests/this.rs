#[macro_use]
mod common;

lox_test!(
    this_binds_to_the_receiving_instance,
    r#"class Foo { setX(x) { this.x = x; } getX() { return this.x; } } var f = Foo(); f.setX(42); print f.getX();"#,
    lines = ["42"]
);

lox_test!(
    a_method_closes_over_this_when_stored,
    r#"class Foo { getCallback() { fun callback() { return this.x; } return callback; } } var f = Foo(); f.x = 9; var cb = f.getCallback(); print cb();"#,
    lines = ["9"]
);

lox_test!(
    this_outside_a_class_is_a_compile_error,
    "print this;",
    compile_error = "Can't use 'this' outside of a class."
);
