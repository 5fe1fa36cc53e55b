#[macro_use]
mod common;

lox_test!(if_true_branch_runs, "if (true) print \"yes\"; else print \"no\";", lines = ["yes"]);

lox_test!(if_false_branch_runs_the_else, "if (false) print \"yes\"; else print \"no\";", lines = ["no"]);

lox_test!(if_with_no_else_is_fine_when_false, "if (false) print \"yes\";", lines = []);

lox_test!(
    dangling_else_binds_to_the_nearest_if,
    "if (true) if (false) print \"a\"; else print \"b\";",
    lines = ["b"]
);
