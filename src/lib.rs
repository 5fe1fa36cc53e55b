#![allow(clippy::needless_return)]

//! Rocks is a programming language written in Rust. It is a dynamically typed language with
//! lexical scoping and first-class functions. Rocks is a tree-walk interpreter with a hand-written
//! recursive descent parser. Rocks is a hobby project and is not intended for production use.
//!
//! Rocks is a dynamically typed language. This means that the type of a variable is determined at
//! runtime. This is in contrast to statically typed languages, where the type of a variable is
//! determined at compile time. Dynamically typed languages are often easier to use, but are
//! generally slower than statically typed languages.
//!
//! Rocks is a tree-walk interpreter. This means that the interpreter walks the abstract syntax tree
//! (AST) and evaluates each node. This is in contrast to a compiler, which would convert the AST
//! into bytecode or machine code. Tree-walk interpreters are generally easier to implement than
//! compilers, but are generally slower than compilers.
//!
//! Rocks is a hobby project and is not intended for production use. The goal of this project is to
//! learn more about programming languages and interpreters. This project is inspired by the
//! [Crafting Interpreters](https://craftinginterpreters.com/) book by Bob Nystrom.
//!
//! ## Scanning
//! The first step in the interpreter is scanning. Scanning is the process of converting a string of
//! characters into a list of tokens. A token is a single unit of a programming language. For
//! example, the string `1 + 2` would be converted into the following tokens:
//! ```text
//! [Number(1), Plus, Number(2)]
//! ```
//! The scanner is implemented in the [`scanner`](scanner) module. It consumes the source one
//! character at a time and reports lexical errors (an unterminated string, an unexpected
//! character) to the [`ErrorSink`](error::ErrorSink) as soon as they are found, then keeps
//! scanning so the rest of the file's lexical errors surface in the same pass.
//!
//! ## Parsing
//! The second step in the interpreter is parsing. Parsing is the process of converting a list of
//! tokens into an abstract syntax tree (AST). The parser is implemented in the [`parser`](parser)
//! module as a recursive descent parser. The parser transforms the list of tokens into expressions
//! and statements. [`Expressions`](expr::Expr) are pieces of code that produce a value, specifically an
//! [`Object`](object::Object). Objects are an umbrella term for all types of values in Rocks
//! including literals, functions, classes and instances. [`Statements`](stmt::Stmt) are pieces of code
//! that do not produce a value but instead perform some action. These actions modify the state of the
//! program and thus, are called side-effects. For example, a variable decleration or an if clause
//! would be classified as statements.
//!
//! For example, the string `print 1 + 2;` would be converted into the following AST:
//! ```text
//! Print(Binary(Literal(1), Plus, Literal(2)))
//! ```
//! Unlike the scanner, the parser catches errors that span multiple tokens. For example, the
//! following expression is invalid because it is missing the right-hand operand:
//! ```text
//! 1 !=
//! ```
//! The parser recovers from such errors by synchronizing at the next statement boundary, so a
//! single mistake doesn't hide every other syntax error in the file.
//!
//! ## Resolving
//! The third step in the interpreter is resolving. Resolving is the process of statically analyzing
//! the AST to determine the scope of each variable. While this requires a pre-pass of the AST, it
//! is necessary to construct robust lexical scoping. The resolver is implemented in the
//! [`resolver`](resolver) module as a tree-walk visitor that produces a map from each variable
//! reference to how many scopes out it resolves, consumed by the interpreter instead of being
//! looked up dynamically. The resolver reports errors that are syntactically valid but
//! semantically invalid and therefore cannot be caught by the scanner or the parser. For example,
//! the following expression is valid Rocks syntax but it is semantically invalid because the
//! variable `a` is read in its own initializer:
//! ```text
//! {
//!    var a = a;
//! }
//! ```
//!
//! ## Interpreting
//! The final step in the interpreter is _interpreting_. Interpreting is the process of evaluating the
//! AST. The interpreter is implemented in the [`interpreter`](interpreter) module as a tree-walk
//! interpreter. Thanks to all the previous steps, the interpreter is able to evaluate the AST and produce
//! a result. While the scanner, the parser and the resolver try to catch as many errors as possible before
//! running the code, most errors can only be caught at runtime. For example, the following expression is
//! valid Rocks syntax but it is semantically invalid because it tries to add a string and a number:
//! ```text
//! var a = "123";
//! var b = a + 123;
//! ```
//! The interpreter is also responsible for managing the environment. The environment is a chain of
//! scopes implemented in the [`environment`](environment) module. Each scope holds a map of
//! variable names to their values; a child scope keeps a reference to its parent so that lookups
//! walk outward until a binding is found.

use std::fs;

pub mod ast;
pub mod class;
pub mod environment;
pub mod error;
pub mod expr;
pub mod function;
pub mod interpreter;
pub mod literal;
pub mod object;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod stmt;
pub mod token;

use error::{SharedPrintSink, SharedSink};
use expr::{Expr, NodeIdGenerator};
use interpreter::Interpreter;
use parser::Parser;
use resolver::Resolver;
use scanner::Scanner;
use stmt::Stmt;
use token::{Token, Type};

/// Drives a full scan-parse-resolve-interpret pass over a single source
/// string and owns the interpreter state that persists across calls (global
/// environment, REPL history of defined variables). Reports everything
/// through the two sinks it was built with, so it never touches `stdin`,
/// `stdout` or `stderr` itself -- `main.rs` is the only place those are
/// wired to the real terminal.
pub struct Lox {
    interpreter: Interpreter,
    sink: SharedSink,
    node_ids: NodeIdGenerator,
}

impl Lox {
    pub fn new(sink: SharedSink, print: SharedPrintSink) -> Self {
        Lox { interpreter: Interpreter::new(sink.clone(), print), sink, node_ids: NodeIdGenerator::new() }
    }

    /// Runs a whole file. Returns the process exit code the caller should
    /// use: 0 on success, 65 on a compile-time error (scan/parse/resolve),
    /// 70 on an unhandled runtime error.
    pub fn run_file(&mut self, path: &str) -> i32 {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                eprintln!("Could not read file '{path}': {err}");
                return 74;
            }
        };

        self.run_source(&contents)
    }

    /// Runs a whole source string as a batch (not REPL-mode) and returns
    /// the exit code the caller should use. Exposed so callers that
    /// already have source in memory -- tests, embedders -- don't need to
    /// round-trip it through a temp file.
    pub fn run_source(&mut self, source: &str) -> i32 {
        self.run(source);

        if self.sink.borrow().had_error() {
            65
        } else if self.sink.borrow().had_runtime_error() {
            70
        } else {
            0
        }
    }

    /// Runs one REPL line. A bare trailing semicolon is appended if the
    /// line doesn't already end in one. If the last statement parses as a
    /// bare expression, it's rewritten into `var _ = <expr>; print _;`
    /// before the other statements, binding the echoed value to a real
    /// global `_` so later REPL lines can read it back, the way the
    /// auto-echoed value in a typical REPL session stays available. The
    /// error flags are reset before returning so a mistake on one line
    /// doesn't poison the ones after it.
    pub fn run_line(&mut self, line: &str) {
        let trimmed = line.trim_end();
        let source = if trimmed.ends_with(';') || trimmed.ends_with('}') {
            trimmed.to_string()
        } else {
            format!("{trimmed};")
        };

        if let Some(mut statements) = self.parse_and_resolve(&source) {
            if let Some(Stmt::Expression { .. }) = statements.last() {
                if let Some(Stmt::Expression { expr }) = statements.pop() {
                    let underscore = Token::new(Type::Identifier, "_".to_string(), None, 0);
                    statements.push(Stmt::Var { name: underscore.clone(), initializer: Some(expr) });
                    statements.push(Stmt::Print {
                        expr: Expr::Variable { id: self.node_ids.next(), name: underscore },
                    });
                }
            }
            self.interpreter.interpret(&statements);
        }

        self.sink.borrow_mut().reset();
    }

    /// Runs a whole source string through scan, parse, and resolve,
    /// returning the resolved statements, or `None` if a compile error
    /// occurred (already reported to the sink by that point).
    fn parse_and_resolve(&mut self, source: &str) -> Option<Vec<Stmt>> {
        let tokens = Scanner::new(source, self.sink.clone()).scan_tokens();
        if self.sink.borrow().had_error() {
            return None;
        }

        let statements = Parser::new(tokens, self.sink.clone()).parse();
        if self.sink.borrow().had_error() {
            return None;
        }

        let locals = Resolver::new(self.sink.clone()).resolve(&statements);
        if self.sink.borrow().had_error() {
            return None;
        }

        self.interpreter.load_locals(locals);
        Some(statements)
    }

    fn run(&mut self, source: &str) {
        if let Some(statements) = self.parse_and_resolve(source) {
            self.interpreter.interpret(&statements);
        }
    }
}
