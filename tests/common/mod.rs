use std::cell::RefCell;
use std::rc::Rc;

use rlox_tree::error::{CapturingPrintSink, CapturingSink, SharedPrintSink, SharedSink};
use rlox_tree::Lox;

/// The outcome of running a source string end to end: what was printed,
/// what was reported on each error channel, and the exit code the CLI
/// would have used.
pub struct Run {
    pub lines: Vec<String>,
    pub compile_errors: Vec<String>,
    pub runtime_errors: Vec<String>,
    pub exit: i32,
}

pub fn run(source: &str) -> Run {
    let sink = Rc::new(RefCell::new(CapturingSink::default()));
    let print = Rc::new(RefCell::new(CapturingPrintSink::default()));

    let shared_sink: SharedSink = sink.clone();
    let shared_print: SharedPrintSink = print.clone();

    let exit = Lox::new(shared_sink, shared_print).run_source(source);

    Run {
        lines: print.borrow().lines.clone(),
        compile_errors: sink.borrow().compile_errors.clone(),
        runtime_errors: sink.borrow().runtime_errors.clone(),
        exit,
    }
}

#[macro_export]
macro_rules! lox_test {
    ($name:ident, $source:expr, lines = [$($line:expr),* $(,)?]) => {
        #[test]
        fn $name() {
            let run = $crate::common::run($source);
            let expected: Vec<&str> = vec![$($line),*];
            assert_eq!(run.lines, expected);
            assert_eq!(run.exit, 0);
        }
    };

    ($name:ident, $source:expr, compile_error = $error:expr) => {
        #[test]
        fn $name() {
            let run = $crate::common::run($source);
            assert!(
                run.compile_errors.iter().any(|e| e.contains($error)),
                "expected a compile error containing {:?}, got {:?}",
                $error,
                run.compile_errors
            );
            assert_eq!(run.exit, 65);
        }
    };

    ($name:ident, $source:expr, runtime_error = $error:expr) => {
        #[test]
        fn $name() {
            let run = $crate::common::run($source);
            assert!(
                run.runtime_errors.iter().any(|e| e.contains($error)),
                "expected a runtime error containing {:?}, got {:?}",
                $error,
                run.runtime_errors
            );
            assert_eq!(run.exit, 70);
        }
    };
}
