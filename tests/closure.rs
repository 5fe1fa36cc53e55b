#[macro_use]
mod common;

lox_test!(
    closures_capture_variables_by_reference_not_value,
    "fun make() { var i = 0; fun inc() { i = i + 1; return i; } return inc; } var c = make(); print c(); print c(); print c();",
    lines = ["1", "2", "3"]
);

lox_test!(
    two_closures_over_the_same_function_share_no_state,
    "fun make() { var i = 0; fun inc() { i = i + 1; return i; } return inc; } var a = make(); var b = make(); print a(); print a(); print b();",
    lines = ["1", "2", "1"]
);

lox_test!(
    closures_see_later_assignments_to_the_captured_variable,
    "var a = \"global\"; fun showA() { print a; } showA(); a = \"block\"; showA();",
    lines = ["global", "block"]
);
