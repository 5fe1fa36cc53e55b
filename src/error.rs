use std::cell::RefCell;
use std::rc::Rc;

/// The two sinks the core pipeline is allowed to talk to. Everything from
/// the scanner through the interpreter reports through a `SharedSink`
/// instead of touching `stdout`/`stderr` directly, so the whole pipeline can
/// be driven and asserted on in tests without spawning a process.
pub trait ErrorSink {
    /// A scanner, parser, or resolver error: reported immediately, does not
    /// halt the current pass.
    fn compile_error(&mut self, line: usize, r#where: &str, message: &str);

    /// A runtime error: reported once, execution halts immediately after.
    fn runtime_error(&mut self, line: usize, message: &str);

    fn had_error(&self) -> bool;
    fn had_runtime_error(&self) -> bool;

    /// Clears both flags. Used between REPL prompts.
    fn reset(&mut self);
}

pub type SharedSink = Rc<RefCell<dyn ErrorSink>>;

pub fn new_shared_sink<S: ErrorSink + 'static>(sink: S) -> SharedSink {
    Rc::new(RefCell::new(sink))
}

/// Reports compile errors to stderr as `[line N] Error<where>: <message>`
/// and runtime errors as `<message>\n[line N]`.
#[derive(Default)]
pub struct StderrSink {
    had_error: bool,
    had_runtime_error: bool,
}

impl ErrorSink for StderrSink {
    fn compile_error(&mut self, line: usize, r#where: &str, message: &str) {
        eprintln!("[line {line}] Error{where}: {message}");
        self.had_error = true;
    }

    fn runtime_error(&mut self, line: usize, message: &str) {
        eprintln!("{message}\n[line {line}]");
        self.had_runtime_error = true;
    }

    fn had_error(&self) -> bool {
        self.had_error
    }

    fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    fn reset(&mut self) {
        self.had_error = false;
        self.had_runtime_error = false;
    }
}

/// Captures reported output instead of printing it, for tests.
#[derive(Default)]
pub struct CapturingSink {
    pub compile_errors: Vec<String>,
    pub runtime_errors: Vec<String>,
    had_error: bool,
    had_runtime_error: bool,
}

impl ErrorSink for CapturingSink {
    fn compile_error(&mut self, line: usize, r#where: &str, message: &str) {
        self.compile_errors.push(format!("[line {line}] Error{where}: {message}"));
        self.had_error = true;
    }

    fn runtime_error(&mut self, line: usize, message: &str) {
        self.runtime_errors.push(format!("{message}\n[line {line}]"));
        self.had_runtime_error = true;
    }

    fn had_error(&self) -> bool {
        self.had_error
    }

    fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    fn reset(&mut self) {
        self.had_error = false;
        self.had_runtime_error = false;
    }
}

/// A runtime error: raised while evaluating a well-formed, resolved AST.
/// Distinct from the control-flow signals `return`/`break`; see `Flow` in
/// `interpreter.rs`.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub line: usize,
    pub message: String,
}

impl RuntimeError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        RuntimeError { line, message: message.into() }
    }

    pub fn report(&self, sink: &SharedSink) {
        sink.borrow_mut().runtime_error(self.line, &self.message);
    }
}

/// The sink the interpreter's `print` statement writes through, kept
/// separate from `ErrorSink` so the core never touches `stdout` directly.
pub trait PrintSink {
    fn print_line(&mut self, line: &str);
}

pub type SharedPrintSink = Rc<RefCell<dyn PrintSink>>;

pub fn new_shared_print_sink<S: PrintSink + 'static>(sink: S) -> SharedPrintSink {
    Rc::new(RefCell::new(sink))
}

#[derive(Default)]
pub struct StdoutSink;

impl PrintSink for StdoutSink {
    fn print_line(&mut self, line: &str) {
        println!("{line}");
    }
}

/// Collects printed lines instead of writing them, for tests.
#[derive(Default)]
pub struct CapturingPrintSink {
    pub lines: Vec<String>,
}

impl PrintSink for CapturingPrintSink {
    fn print_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

/// Formats the `<where>` fragment of a compile-error location per the
/// scanner/parser convention: empty for scanner errors, `" at end"` at EOF,
/// `" at 'lexeme'"` otherwise.
pub fn token_where(r#type: crate::token::Type, lexeme: &str) -> String {
    if r#type == crate::token::Type::EOF {
        " at end".to_string()
    } else {
        format!(" at '{lexeme}'")
    }
}
