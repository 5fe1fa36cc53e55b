#[macro_use]
mod common;

lox_test!(
    break_exits_the_innermost_while_loop,
    "var i = 0; while (true) { if (i >= 3) break; print i; i = i + 1; }",
    lines = ["0", "1", "2"]
);

lox_test!(
    break_inside_nested_loop_does_not_escape_the_outer_one,
    "for (var i = 0; i < 2; i = i + 1) { for (var j = 0; j < 5; j = j + 1) { if (j == 1) break; print j; } print i; }",
    lines = ["0", "0", "0", "1"]
);
