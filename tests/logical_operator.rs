#[macro_use]
mod common;

lox_test!(or_short_circuits_on_a_truthy_left, "fun sideEffect() { print \"evaluated\"; return true; } print true or sideEffect();", lines = ["true"]);

lox_test!(or_evaluates_the_right_when_left_is_falsy, "print false or \"right\";", lines = ["right"]);

lox_test!(and_short_circuits_on_a_falsy_left, "fun sideEffect() { print \"evaluated\"; return true; } print false and sideEffect();", lines = ["false"]);

lox_test!(and_evaluates_the_right_when_left_is_truthy, "print true and \"right\";", lines = ["right"]);

lox_test!(logical_operators_return_an_operand_not_a_boolean, "print 1 or 2; print nil and 2;", lines = ["1", "nil"]);
