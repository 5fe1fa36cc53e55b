use std::cell::RefCell;
use std::rc::Rc;

use rlox_tree::error::{CapturingPrintSink, CapturingSink, SharedPrintSink, SharedSink};
use rlox_tree::Lox;

#[test]
fn bare_expression_is_echoed_and_bound_to_underscore() {
    let sink = Rc::new(RefCell::new(CapturingSink::default()));
    let print = Rc::new(RefCell::new(CapturingPrintSink::default()));
    let shared_sink: SharedSink = sink.clone();
    let shared_print: SharedPrintSink = print.clone();
    let mut lox = Lox::new(shared_sink, shared_print);

    lox.run_line("1 + 2");
    lox.run_line("_ + 10");

    assert_eq!(print.borrow().lines, vec!["3", "13"]);
}

#[test]
fn statement_lines_are_not_echoed() {
    let sink = Rc::new(RefCell::new(CapturingSink::default()));
    let print = Rc::new(RefCell::new(CapturingPrintSink::default()));
    let shared_sink: SharedSink = sink.clone();
    let shared_print: SharedPrintSink = print.clone();
    let mut lox = Lox::new(shared_sink, shared_print);

    lox.run_line("var x = 5;");
    lox.run_line("x");

    assert_eq!(print.borrow().lines, vec!["5"]);
}
