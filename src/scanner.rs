use std::str::Chars;

use peekmore::{PeekMore, PeekMoreIterator};

use crate::error::SharedSink;
use crate::literal::Literal;
use crate::token::{Token, Type};

/// Turns a source string into a terminated token stream. One character of
/// lookahead (`peek`) plus a second (`peek_next`) covers comment detection
/// and number fractional parts.
pub struct Scanner<'a> {
    source: PeekMoreIterator<Chars<'a>>,
    tokens: Vec<Token>,
    lexeme: String,
    line: usize,
    sink: SharedSink,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str, sink: SharedSink) -> Scanner<'a> {
        Scanner {
            source: source.chars().peekmore(),
            tokens: Vec::new(),
            lexeme: String::new(),
            line: 1,
            sink,
        }
    }

    pub fn scan_tokens(mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.lexeme.clear();
            self.scan_token();
        }

        self.tokens.push(Token::new(Type::EOF, String::new(), None, self.line));
        self.tokens
    }

    fn advance(&mut self) -> char {
        let c = self.source.next().expect("advance past end of source");
        self.lexeme.push(c);
        c
    }

    fn peek(&mut self) -> char {
        self.source.peek().copied().unwrap_or('\0')
    }

    fn peek_next(&mut self) -> char {
        self.source.peek_next().copied().unwrap_or('\0')
    }

    fn is_at_end(&mut self) -> bool {
        self.source.peek().is_none()
    }

    /// Consumes the next character if it matches `expected`.
    fn matches(&mut self, expected: char) -> bool {
        if self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    fn add_token(&mut self, r#type: Type) {
        self.add_token_literal(r#type, None);
    }

    fn add_token_literal(&mut self, r#type: Type, literal: Option<Literal>) {
        self.tokens.push(Token::new(r#type, self.lexeme.clone(), literal, self.line));
    }

    fn error(&mut self, message: &str) {
        self.sink.borrow_mut().compile_error(self.line, "", message);
    }

    fn string(&mut self) {
        let start_line = self.line;

        while self.peek() != '"' && !self.is_at_end() {
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            self.line = start_line;
            self.error("Unterminated string.");
            return;
        }

        self.advance(); // closing quote

        // Lexeme includes both quotes; the literal payload does not.
        let value = self.lexeme[1..self.lexeme.len() - 1].to_string();
        self.add_token_literal(Type::String, Some(Literal::String(value)));
    }

    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance(); // consume the dot
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let value: f64 = self.lexeme.parse().expect("scanned number lexeme must parse");
        self.add_token_literal(Type::Number, Some(Literal::Number(value)));
    }

    fn identifier(&mut self) {
        while self.peek().is_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        let r#type = match self.lexeme.as_str() {
            "and" => Type::And,
            "break" => Type::Break,
            "class" => Type::Class,
            "else" => Type::Else,
            "false" => Type::False,
            "for" => Type::For,
            "fun" => Type::Fun,
            "if" => Type::If,
            "nil" => Type::Nil,
            "or" => Type::Or,
            "print" => Type::Print,
            "return" => Type::Return,
            "super" => Type::Super,
            "this" => Type::This,
            "true" => Type::True,
            "var" => Type::Var,
            "while" => Type::While,
            _ => Type::Identifier,
        };

        self.add_token(r#type);
    }

    /// Consumes a `/* ... */` block comment. Per the unterminated-string-escape-free
    /// convention of this scanner, an unterminated block comment silently runs
    /// to EOF instead of reporting an error.
    fn block_comment(&mut self) {
        let mut depth = 1;
        while depth > 0 && !self.is_at_end() {
            if self.peek() == '\n' {
                self.line += 1;
            }
            if self.peek() == '*' && self.peek_next() == '/' {
                self.advance();
                self.advance();
                depth -= 1;
            } else {
                self.advance();
            }
        }
    }

    fn scan_token(&mut self) {
        let c = self.advance();
        match c {
            '(' => self.add_token(Type::LeftParen),
            ')' => self.add_token(Type::RightParen),
            '{' => self.add_token(Type::LeftBrace),
            '}' => self.add_token(Type::RightBrace),
            ':' => self.add_token(Type::Colon),
            ',' => self.add_token(Type::Comma),
            '.' => self.add_token(Type::Dot),
            '-' => self.add_token(Type::Minus),
            '+' => self.add_token(Type::Plus),
            ';' => self.add_token(Type::Semicolon),
            '*' => self.add_token(Type::Star),
            '?' => self.add_token(Type::QuestionMark),

            '!' => {
                let matched = self.matches('=');
                self.add_token(if matched { Type::BangEqual } else { Type::Bang });
            }
            '=' => {
                let matched = self.matches('=');
                self.add_token(if matched { Type::EqualEqual } else { Type::Equal });
            }
            '<' => {
                let matched = self.matches('=');
                self.add_token(if matched { Type::LessEqual } else { Type::Less });
            }
            '>' => {
                let matched = self.matches('=');
                self.add_token(if matched { Type::GreaterEqual } else { Type::Greater });
            }

            '/' => {
                if self.matches('/') {
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else if self.matches('*') {
                    self.block_comment();
                } else {
                    self.add_token(Type::Slash);
                }
            }

            ' ' | '\r' | '\t' => {}

            '\n' => {
                self.line += 1;
            }

            '"' => self.string(),

            c if c.is_ascii_digit() => self.number(),
            c if c.is_alphabetic() || c == '_' => self.identifier(),

            _ => self.error("Unexpected character."),
        }
    }
}
