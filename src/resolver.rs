use std::collections::HashMap;
use std::mem;
use std::rc::Rc;

use crate::error::{token_where, SharedSink};
use crate::expr::{Expr, ExprVisitor, NodeId};
use crate::stmt::{ClassData, FunctionData, Stmt, StmtVisitor};
use crate::token::Token;

#[derive(Clone, Copy, PartialEq)]
enum FunctionType {
    None,
    Function,
    Initializer,
    Method,
}

#[derive(Clone, Copy, PartialEq)]
enum ClassType {
    None,
    Class,
    Subclass,
}

#[derive(Clone, Copy, PartialEq)]
enum VarState {
    Declared,
    Defined,
    Read,
}

struct Local {
    token: Token,
    state: VarState,
}

/// A single static pass over the AST that assigns every variable reference
/// its scope-hop distance, ahead of interpretation. Reports through the same
/// compile-error sink the scanner and parser use, and keeps going after an
/// error so one run can surface as many as possible.
pub struct Resolver {
    sink: SharedSink,
    scopes: Vec<HashMap<String, Local>>,
    locals: HashMap<NodeId, usize>,
    current_function: FunctionType,
    current_class: ClassType,
    loop_depth: usize,
}

impl Resolver {
    pub fn new(sink: SharedSink) -> Self {
        Resolver {
            sink,
            scopes: Vec::new(),
            locals: HashMap::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
            loop_depth: 0,
        }
    }

    pub fn resolve(mut self, statements: &[Stmt]) -> HashMap<NodeId, usize> {
        for statement in statements {
            self.resolve_stmt(statement);
        }
        self.locals
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        stmt.accept(self);
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        expr.accept(self);
    }

    fn error(&mut self, token: &Token, message: &str) {
        let location = token_where(token.r#type, &token.lexeme);
        self.sink.borrow_mut().compile_error(token.line, &location, message);
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        if let Some(scope) = self.scopes.pop() {
            for local in scope.into_values() {
                if local.state == VarState::Defined {
                    self.error(&local.token, "Unused local variable.");
                }
            }
        }
    }

    fn declare(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else { return };

        if scope.contains_key(&name.lexeme) {
            self.error(name, "Already variable with this name in this scope.");
        }

        scope.insert(name.lexeme.clone(), Local { token: name.clone(), state: VarState::Declared });
    }

    fn define(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else { return };
        scope.insert(name.lexeme.clone(), Local { token: name.clone(), state: VarState::Defined });
    }

    /// Used for parameters and class/function names: defined through a
    /// different code path than a local `var`, and exempt from the
    /// unused-variable diagnostic by convention.
    fn define_exempt(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else { return };
        scope.insert(name.lexeme.clone(), Local { token: name.clone(), state: VarState::Read });
    }

    fn resolve_local(&mut self, id: NodeId, name: &Token, mark_read: bool) {
        for (depth, scope) in self.scopes.iter_mut().rev().enumerate() {
            if let Some(local) = scope.get_mut(&name.lexeme) {
                if mark_read {
                    local.state = VarState::Read;
                }
                self.locals.insert(id, depth);
                return;
            }
        }
        // Not found in any local scope: treated as global.
    }

    fn resolve_function(&mut self, data: &Rc<FunctionData>, r#type: FunctionType) {
        let enclosing_function = mem::replace(&mut self.current_function, r#type);

        self.begin_scope();
        if let Some(params) = &data.params {
            for param in params {
                self.declare(param);
                self.define_exempt(param);
            }
        }
        for stmt in data.body.iter() {
            self.resolve_stmt(stmt);
        }
        self.end_scope();

        self.current_function = enclosing_function;
    }
}

impl ExprVisitor<()> for Resolver {
    fn visit_assign(&mut self, id: NodeId, name: &Token, value: &Expr) {
        self.resolve_expr(value);
        self.resolve_local(id, name, false);
    }

    fn visit_binary(&mut self, left: &Expr, _operator: &Token, right: &Expr) {
        self.resolve_expr(left);
        self.resolve_expr(right);
    }

    fn visit_logical(&mut self, left: &Expr, _operator: &Token, right: &Expr) {
        self.resolve_expr(left);
        self.resolve_expr(right);
    }

    fn visit_unary(&mut self, _operator: &Token, right: &Expr) {
        self.resolve_expr(right);
    }

    fn visit_literal(&mut self, _value: &crate::literal::Literal) {}

    fn visit_grouping(&mut self, expression: &Expr) {
        self.resolve_expr(expression);
    }

    fn visit_comma(&mut self, expressions: &[Expr]) {
        for expr in expressions {
            self.resolve_expr(expr);
        }
    }

    fn visit_ternary(&mut self, condition: &Expr, then_branch: &Expr, else_branch: &Expr) {
        self.resolve_expr(condition);
        self.resolve_expr(then_branch);
        self.resolve_expr(else_branch);
    }

    fn visit_variable(&mut self, id: NodeId, name: &Token) {
        if let Some(scope) = self.scopes.last() {
            if let Some(local) = scope.get(&name.lexeme) {
                if local.state == VarState::Declared {
                    self.error(name, "Can't read local variable in its own initializer.");
                }
            }
        }

        self.resolve_local(id, name, true);
    }

    fn visit_call(&mut self, callee: &Expr, _paren: &Token, arguments: &[Expr]) {
        self.resolve_expr(callee);
        for arg in arguments {
            self.resolve_expr(arg);
        }
    }

    fn visit_get(&mut self, object: &Expr, _name: &Token) {
        self.resolve_expr(object);
    }

    fn visit_set(&mut self, object: &Expr, _name: &Token, value: &Expr) {
        self.resolve_expr(value);
        self.resolve_expr(object);
    }

    fn visit_this(&mut self, id: NodeId, keyword: &Token) {
        if self.current_class == ClassType::None {
            self.error(keyword, "Can't use 'this' outside of a class.");
            return;
        }
        self.resolve_local(id, keyword, true);
    }

    fn visit_super(&mut self, id: NodeId, keyword: &Token, _method: &Token) {
        match self.current_class {
            ClassType::Subclass => {}
            ClassType::None => self.error(keyword, "Can't use 'super' outside of a class."),
            ClassType::Class => self.error(keyword, "Can't use 'super' in a class with no superclass."),
        }
        self.resolve_local(id, keyword, true);
    }

    fn visit_function_expr(&mut self, data: &Rc<FunctionData>) {
        self.resolve_function(data, FunctionType::Function);
    }
}

impl StmtVisitor<()> for Resolver {
    fn visit_block_stmt(&mut self, statements: &[Stmt]) {
        self.begin_scope();
        for stmt in statements {
            self.resolve_stmt(stmt);
        }
        self.end_scope();
    }

    fn visit_class_stmt(&mut self, data: &ClassData) {
        let enclosing_class = mem::replace(&mut self.current_class, ClassType::Class);

        self.declare(&data.name);
        self.define_exempt(&data.name);

        if let Some(superclass) = &data.superclass {
            if let Expr::Variable { name, .. } = superclass {
                if name.lexeme == data.name.lexeme {
                    self.error(name, "A class can't inherit from itself.");
                }
            }

            self.current_class = ClassType::Subclass;
            self.resolve_expr(superclass);

            self.begin_scope();
            self.scopes.last_mut().expect("scope just pushed").insert(
                "super".to_string(),
                Local { token: data.name.clone(), state: VarState::Read },
            );
        }

        self.begin_scope();
        self.scopes.last_mut().expect("scope just pushed").insert(
            "this".to_string(),
            Local { token: data.name.clone(), state: VarState::Read },
        );

        for method in &data.methods {
            let kind = if method.name.as_ref().is_some_and(|n| n.lexeme == "init") {
                FunctionType::Initializer
            } else {
                FunctionType::Method
            };
            self.resolve_function(method, kind);
        }

        for method in &data.class_methods {
            self.resolve_function(method, FunctionType::Method);
        }

        self.end_scope();

        if data.superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
    }

    fn visit_expression_stmt(&mut self, expr: &Expr) {
        self.resolve_expr(expr);
    }

    fn visit_function_stmt(&mut self, data: &Rc<FunctionData>) {
        if let Some(name) = &data.name {
            self.declare(name);
            self.define_exempt(name);
        }
        self.resolve_function(data, FunctionType::Function);
    }

    fn visit_if_stmt(&mut self, condition: &Expr, then_branch: &Stmt, else_branch: Option<&Stmt>) {
        self.resolve_expr(condition);
        self.resolve_stmt(then_branch);
        if let Some(else_branch) = else_branch {
            self.resolve_stmt(else_branch);
        }
    }

    fn visit_print_stmt(&mut self, expr: &Expr) {
        self.resolve_expr(expr);
    }

    fn visit_return_stmt(&mut self, keyword: &Token, value: Option<&Expr>) {
        if self.current_function == FunctionType::None {
            self.error(keyword, "Can't return from top-level code.");
        }

        if let Some(value) = value {
            if self.current_function == FunctionType::Initializer {
                self.error(keyword, "Can't return a value from an initializer.");
                return;
            }
            self.resolve_expr(value);
        }
    }

    fn visit_var_stmt(&mut self, name: &Token, initializer: Option<&Expr>) {
        self.declare(name);
        if let Some(initializer) = initializer {
            self.resolve_expr(initializer);
        }
        self.define(name);
    }

    fn visit_while_stmt(&mut self, condition: &Expr, body: &Stmt) {
        self.resolve_expr(condition);
        self.loop_depth += 1;
        self.resolve_stmt(body);
        self.loop_depth -= 1;
    }

    fn visit_break_stmt(&mut self, keyword: &Token) {
        if self.loop_depth == 0 {
            self.error(keyword, "Must be inside a loop to use 'break'.");
        }
    }
}
