#[macro_use]
mod common;

lox_test!(
    setting_a_field_creates_it_on_the_instance,
    "class Foo {} var f = Foo(); f.bar = 1; print f.bar;",
    lines = ["1"]
);

lox_test!(
    field_access_shadows_a_method_of_the_same_name,
    r#"class Foo { bar() { return "method"; } } var f = Foo(); f.bar = "field"; print f.bar;"#,
    lines = ["field"]
);

lox_test!(
    reading_an_undefined_property_is_a_runtime_error,
    "class Foo {} Foo().bar;",
    runtime_error = "Undefined property 'bar'."
);

lox_test!(
    setting_a_field_on_a_non_instance_is_a_runtime_error,
    "var a = 1; a.bar = 1;",
    runtime_error = "Only instances have fields."
);
