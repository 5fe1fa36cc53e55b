#[macro_use]
mod common;

lox_test!(equality_is_strict_same_tag_same_payload, "print true == true; print true == false;", lines = ["true", "false"]);

lox_test!(nil_only_equals_nil, "print nil == nil; print nil == false;", lines = ["true", "false"]);

lox_test!(bools_do_not_coerce_to_numbers, "print !true; print !false;", lines = ["false", "true"]);
