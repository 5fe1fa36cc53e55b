#[macro_use]
mod common;

lox_test!(
    subclass_inherits_superclass_methods,
    r#"class A { m() { print "from A"; } } class B < A {} B().m();"#,
    lines = ["from A"]
);

lox_test!(
    subclass_method_overrides_superclass_method,
    r#"class A { m() { print "A"; } } class B < A { m() { print "B"; } } B().m();"#,
    lines = ["B"]
);

lox_test!(
    inherited_init_constructs_the_subclass,
    r#"class A { init(x) { this.x = x; } } class B < A {} print B(5).x;"#,
    lines = ["5"]
);

lox_test!(
    method_lookup_walks_a_multi_level_superclass_chain,
    r#"class A { m() { print "A"; } } class B < A {} class C < B {} C().m();"#,
    lines = ["A"]
);
