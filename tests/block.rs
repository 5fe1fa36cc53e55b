#[macro_use]
mod common;

lox_test!(
    block_scoping_shadows_outer,
    "var a = \"outer\"; { var a = \"inner\"; print a; } print a;",
    lines = ["inner", "outer"]
);

lox_test!(
    nested_blocks_scope_to_their_own_level,
    "var a = 1; { var a = 2; { var a = 3; print a; } print a; } print a;",
    lines = ["3", "2", "1"]
);

lox_test!(empty_block_is_a_no_op, "{ } print \"ok\";", lines = ["ok"]);
