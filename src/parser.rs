use std::rc::Rc;

use crate::error::{token_where, SharedSink};
use crate::expr::{Expr, NodeIdGenerator};
use crate::literal::Literal;
use crate::stmt::{ClassData, FunctionData, Stmt};
use crate::token::{Token, Type};

const MAX_PARAMS: usize = 255;
const MAX_ARGS: usize = 255;

/// Unwinds the current declaration back to `declaration()`, which reports
/// the error (already sent to the sink by the time this is constructed) and
/// calls `synchronize`. Carries no data of its own.
struct ParseError;

type ParseResult<T> = Result<T, ParseError>;

/// Recursive-descent parser over a pre-scanned token vector.
///
/// ```text
/// program        -> declaration* EOF
/// declaration    -> classDecl | funDecl | varDecl | statement
/// classDecl      -> "class" IDENT ( "<" IDENT )? "{" classMember* "}"
/// classMember    -> "class"? function("method")
/// funDecl        -> "fun" function("function")
/// varDecl        -> "var" IDENT ( "=" expression )? ";"
/// statement      -> exprStmt | forStmt | ifStmt | printStmt | returnStmt
///                 | whileStmt | breakStmt | block
/// block          -> "{" declaration* "}"
/// expression     -> comma
/// assignment     -> ( call "." )? IDENT "=" assignment | ternary
/// ternary        -> logic_or ( "?" ternary ":" ternary )?
/// logic_or       -> logic_and ( "or" logic_and )*
/// logic_and      -> equality ( "and" equality )*
/// equality       -> comparison ( ( "!=" | "==" ) comparison )*
/// comparison     -> term ( ( ">" | ">=" | "<" | "<=" ) term )*
/// term           -> factor ( ( "-" | "+" ) factor )*
/// factor         -> unary  ( ( "/" | "*" ) unary )*
/// unary          -> ( "!" | "-" ) unary | call
/// call           -> primary ( "(" args? ")" | "." IDENT )*
/// primary        -> "true" | "false" | "nil" | NUMBER | STRING | "this"
///                 | "super" "." IDENT | IDENT
///                 | "(" expression ")" | "fun" function("expression")
/// ```
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    sink: SharedSink,
    ids: NodeIdGenerator,
}

impl Parser {
    pub fn new(tokens: Vec<Token>, sink: SharedSink) -> Self {
        Parser { tokens, current: 0, sink, ids: NodeIdGenerator::new() }
    }

    pub fn parse(mut self) -> Vec<Stmt> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        statements
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn is_at_end(&self) -> bool {
        self.peek().r#type == Type::EOF
    }

    fn check(&self, r#type: Type) -> bool {
        !self.is_at_end() && self.peek().r#type == r#type
    }

    fn check_any(&self, types: &[Type]) -> bool {
        types.iter().any(|t| self.check(*t))
    }

    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous().clone()
    }

    fn matches(&mut self, types: &[Type]) -> bool {
        if self.check_any(types) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, r#type: Type, message: &str) -> ParseResult<Token> {
        if self.check(r#type) {
            return Ok(self.advance());
        }
        let peek = self.peek().clone();
        Err(self.error(&peek, message))
    }

    /// Reports a compile error at `token` and returns the unwinding marker
    /// used to abort the current declaration.
    fn error(&mut self, token: &Token, message: &str) -> ParseError {
        self.report(token, message);
        ParseError
    }

    /// Reports a compile error without aborting parsing: used by the
    /// non-fatal productions (invalid assignment target, too many
    /// parameters/arguments, missing left-hand operand).
    fn report(&mut self, token: &Token, message: &str) {
        let location = token_where(token.r#type, &token.lexeme);
        self.sink.borrow_mut().compile_error(token.line, &location, message);
    }

    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().r#type == Type::Semicolon {
                return;
            }

            match self.peek().r#type {
                Type::Class | Type::Fun | Type::Var | Type::For | Type::If | Type::While
                | Type::Print | Type::Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    // --- declarations ---------------------------------------------------

    fn declaration(&mut self) -> Option<Stmt> {
        let result = if self.matches(&[Type::Class]) {
            self.class_declaration()
        } else if self.matches(&[Type::Fun]) {
            self.fun_declaration()
        } else if self.matches(&[Type::Var]) {
            self.var_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(ParseError) => {
                self.synchronize();
                None
            }
        }
    }

    fn class_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(Type::Identifier, "Expect class name.")?;

        let superclass = if self.matches(&[Type::Less]) {
            let superclass_name = self.consume(Type::Identifier, "Expect superclass name.")?;
            Some(Expr::Variable { id: self.ids.next(), name: superclass_name })
        } else {
            None
        };

        self.consume(Type::LeftBrace, "Expect '{' before class body.")?;

        let mut methods = Vec::new();
        let mut class_methods = Vec::new();
        while !self.check(Type::RightBrace) && !self.is_at_end() {
            let is_static = self.matches(&[Type::Class]);
            let name = self.consume(Type::Identifier, "Expect method name.")?;
            let data = self.function(Some(name), "method", true)?;
            if is_static {
                class_methods.push(data);
            } else {
                methods.push(data);
            }
        }

        self.consume(Type::RightBrace, "Expect '}' after class body.")?;

        Ok(Stmt::Class { data: ClassData { name, superclass, methods, class_methods } })
    }

    fn fun_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(Type::Identifier, "Expect function name.")?;
        let data = self.function(Some(name), "function", false)?;
        Ok(Stmt::Function { data })
    }

    /// Parses the shared `IDENT? ( "(" params? ")" )? "{" block "}"` tail.
    /// When `parens_optional` is true and no `(` follows, the declaration is
    /// a getter (no parameter list).
    fn function(
        &mut self,
        name: Option<Token>,
        kind: &str,
        parens_optional: bool,
    ) -> ParseResult<Rc<FunctionData>> {
        let params = if parens_optional && !self.check(Type::LeftParen) {
            None
        } else {
            self.consume(Type::LeftParen, &format!("Expect '(' after {kind} name."))?;
            let mut params = Vec::new();
            if !self.check(Type::RightParen) {
                loop {
                    if params.len() >= MAX_PARAMS {
                        let peek = self.peek().clone();
                        self.report(&peek, "Can't have more than 255 parameters.");
                    }
                    params.push(self.consume(Type::Identifier, "Expect parameter name.")?);
                    if !self.matches(&[Type::Comma]) {
                        break;
                    }
                }
            }
            self.consume(Type::RightParen, "Expect ')' after parameters.")?;
            Some(params)
        };

        self.consume(Type::LeftBrace, &format!("Expect '{{' before {kind} body."))?;
        let body = self.block()?;

        Ok(Rc::new(FunctionData { name, params, body: Rc::new(body) }))
    }

    fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(Type::Identifier, "Expect variable name.")?;

        let initializer = if self.matches(&[Type::Equal]) { Some(self.expression()?) } else { None };

        self.consume(Type::Semicolon, "Expect ';' after variable declaration.")?;
        Ok(Stmt::Var { name, initializer })
    }

    // --- statements ------------------------------------------------------

    fn statement(&mut self) -> ParseResult<Stmt> {
        if self.matches(&[Type::For]) {
            return self.for_statement();
        }
        if self.matches(&[Type::If]) {
            return self.if_statement();
        }
        if self.matches(&[Type::Print]) {
            return self.print_statement();
        }
        if self.matches(&[Type::Return]) {
            return self.return_statement();
        }
        if self.matches(&[Type::While]) {
            return self.while_statement();
        }
        if self.matches(&[Type::Break]) {
            return self.break_statement();
        }
        if self.matches(&[Type::LeftBrace]) {
            return Ok(Stmt::Block { statements: self.block()? });
        }

        self.expression_statement()
    }

    fn for_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(Type::LeftParen, "Expect '(' after 'for'.")?;

        let initializer = if self.matches(&[Type::Semicolon]) {
            None
        } else if self.matches(&[Type::Var]) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if !self.check(Type::Semicolon) { Some(self.expression()?) } else { None };
        self.consume(Type::Semicolon, "Expect ';' after loop condition.")?;

        let increment = if !self.check(Type::RightParen) { Some(self.expression()?) } else { None };
        self.consume(Type::RightParen, "Expect ')' after for clauses.")?;

        let mut body = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block { statements: vec![body, Stmt::Expression { expr: increment }] };
        }

        body = Stmt::While {
            condition: condition.unwrap_or(Expr::Literal { value: Literal::Bool(true) }),
            body: Box::new(body),
        };

        if let Some(initializer) = initializer {
            body = Stmt::Block { statements: vec![initializer, body] };
        }

        Ok(body)
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(Type::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(Type::RightParen, "Expect ')' after if condition.")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch =
            if self.matches(&[Type::Else]) { Some(Box::new(self.statement()?)) } else { None };

        Ok(Stmt::If { condition, then_branch, else_branch })
    }

    fn print_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(Type::Semicolon, "Expect ';' after value.")?;
        Ok(Stmt::Print { expr })
    }

    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();
        let value = if !self.check(Type::Semicolon) { Some(self.expression()?) } else { None };
        self.consume(Type::Semicolon, "Expect ';' after return value.")?;
        Ok(Stmt::Return { keyword, value })
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(Type::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(Type::RightParen, "Expect ')' after condition.")?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While { condition, body })
    }

    fn break_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();
        self.consume(Type::Semicolon, "Expect ';' after 'break'.")?;
        Ok(Stmt::Break { keyword })
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(Type::Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::Expression { expr })
    }

    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();
        while !self.check(Type::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        self.consume(Type::RightBrace, "Expect '}' after block.")?;
        Ok(statements)
    }

    // --- expressions -----------------------------------------------------

    fn expression(&mut self) -> ParseResult<Expr> {
        self.comma()
    }

    fn comma(&mut self) -> ParseResult<Expr> {
        let first = self.assignment()?;

        if !self.check(Type::Comma) {
            return Ok(first);
        }

        let mut expressions = vec![first];
        while self.matches(&[Type::Comma]) {
            expressions.push(self.assignment()?);
        }

        Ok(Expr::Comma { expressions })
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.ternary()?;

        if self.matches(&[Type::Equal]) {
            let equals = self.previous().clone();
            let value = self.assignment()?;

            return Ok(match expr {
                Expr::Variable { name, .. } => {
                    Expr::Assign { id: self.ids.next(), name, value: Box::new(value) }
                }
                Expr::Get { object, name } => Expr::Set { object, name, value: Box::new(value) },
                other => {
                    self.report(&equals, "Invalid assignment target.");
                    other
                }
            });
        }

        Ok(expr)
    }

    fn ternary(&mut self) -> ParseResult<Expr> {
        let condition = self.logic_or()?;

        if self.matches(&[Type::QuestionMark]) {
            let then_branch = self.ternary()?;
            self.consume(Type::Colon, "Expect ':' after then branch of ternary expression.")?;
            let else_branch = self.ternary()?;
            return Ok(Expr::Ternary {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            });
        }

        Ok(condition)
    }

    fn logic_or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.logic_and()?;
        while self.matches(&[Type::Or]) {
            let operator = self.previous().clone();
            let right = self.logic_and()?;
            expr = Expr::Logical { left: Box::new(expr), operator, right: Box::new(right) };
        }
        Ok(expr)
    }

    fn logic_and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;
        while self.matches(&[Type::And]) {
            let operator = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::Logical { left: Box::new(expr), operator, right: Box::new(right) };
        }
        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        const OPS: [Type; 2] = [Type::BangEqual, Type::EqualEqual];
        let mut expr = if self.check_any(&OPS) {
            let operator = self.advance();
            let right = self.comparison()?;
            self.report(&operator, &format!("Expect left hand operand for '{}'", operator.lexeme));
            right
        } else {
            self.comparison()?
        };

        while self.check_any(&OPS) {
            let operator = self.advance();
            let right = self.comparison()?;
            expr = Expr::Binary { left: Box::new(expr), operator, right: Box::new(right) };
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        const OPS: [Type; 4] = [Type::Greater, Type::GreaterEqual, Type::Less, Type::LessEqual];
        let mut expr = if self.check_any(&OPS) {
            let operator = self.advance();
            let right = self.term()?;
            self.report(&operator, &format!("Expect left hand operand for '{}'", operator.lexeme));
            right
        } else {
            self.term()?
        };

        while self.check_any(&OPS) {
            let operator = self.advance();
            let right = self.term()?;
            expr = Expr::Binary { left: Box::new(expr), operator, right: Box::new(right) };
        }
        Ok(expr)
    }

    fn term(&mut self) -> ParseResult<Expr> {
        const OPS: [Type; 2] = [Type::Minus, Type::Plus];
        let mut expr = if self.check_any(&OPS) {
            let operator = self.advance();
            let right = self.factor()?;
            self.report(&operator, &format!("Expect left hand operand for '{}'", operator.lexeme));
            right
        } else {
            self.factor()?
        };

        while self.check_any(&OPS) {
            let operator = self.advance();
            let right = self.factor()?;
            expr = Expr::Binary { left: Box::new(expr), operator, right: Box::new(right) };
        }
        Ok(expr)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        const OPS: [Type; 2] = [Type::Slash, Type::Star];
        let mut expr = if self.check_any(&OPS) {
            let operator = self.advance();
            let right = self.unary()?;
            self.report(&operator, &format!("Expect left hand operand for '{}'", operator.lexeme));
            right
        } else {
            self.unary()?
        };

        while self.check_any(&OPS) {
            let operator = self.advance();
            let right = self.unary()?;
            expr = Expr::Binary { left: Box::new(expr), operator, right: Box::new(right) };
        }
        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.matches(&[Type::Bang, Type::Minus]) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            return Ok(Expr::Unary { operator, right: Box::new(right) });
        }

        self.call()
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;

        loop {
            if self.matches(&[Type::LeftParen]) {
                expr = self.finish_call(expr)?;
            } else if self.matches(&[Type::Dot]) {
                let name = self.consume(Type::Identifier, "Expect property name after '.'.")?;
                expr = Expr::Get { object: Box::new(expr), name };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut arguments = Vec::new();

        if !self.check(Type::RightParen) {
            loop {
                if arguments.len() >= MAX_ARGS {
                    let peek = self.peek().clone();
                    self.report(&peek, "Can't have more than 255 arguments.");
                }
                arguments.push(self.assignment()?);
                if !self.matches(&[Type::Comma]) {
                    break;
                }
            }
        }

        let paren = self.consume(Type::RightParen, "Expect ')' after arguments.")?;
        Ok(Expr::Call { callee: Box::new(callee), paren, arguments })
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        if self.matches(&[Type::False]) {
            return Ok(Expr::Literal { value: Literal::Bool(false) });
        }
        if self.matches(&[Type::True]) {
            return Ok(Expr::Literal { value: Literal::Bool(true) });
        }
        if self.matches(&[Type::Nil]) {
            return Ok(Expr::Literal { value: Literal::Nil });
        }
        if self.matches(&[Type::Number, Type::String]) {
            let literal =
                self.previous().literal.clone().expect("number/string token to carry a literal");
            return Ok(Expr::Literal { value: literal });
        }
        if self.matches(&[Type::Super]) {
            let keyword = self.previous().clone();
            self.consume(Type::Dot, "Expect '.' after 'super'.")?;
            let method = self.consume(Type::Identifier, "Expect superclass method name.")?;
            return Ok(Expr::Super { id: self.ids.next(), keyword, method });
        }
        if self.matches(&[Type::This]) {
            let keyword = self.previous().clone();
            return Ok(Expr::This { id: self.ids.next(), keyword });
        }
        if self.matches(&[Type::Identifier]) {
            let name = self.previous().clone();
            return Ok(Expr::Variable { id: self.ids.next(), name });
        }
        if self.matches(&[Type::Fun]) {
            let data = self.function(None, "expression", false)?;
            return Ok(Expr::FunctionExpr { data });
        }
        if self.matches(&[Type::LeftParen]) {
            let inner = self.expression()?;
            self.consume(Type::RightParen, "Expect ')' after expression.")?;
            return Ok(match inner {
                comma @ Expr::Comma { .. } => comma,
                other => Expr::Grouping { expression: Box::new(other) },
            });
        }

        let peek = self.peek().clone();
        Err(self.error(&peek, "Expect expression."))
    }
}
