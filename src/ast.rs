use std::rc::Rc;

use crate::expr::{Expr, ExprVisitor, NodeId};
use crate::literal::Literal;
use crate::stmt::{ClassData, FunctionData, Stmt, StmtVisitor};
use crate::token::Token;

/// Wraps a sub-expression/statement list in a parenthesized, Lisp-like
/// string: `(name sub1 sub2 ...)`. Used by `ASTPrinter` to serialize the
/// tree for the round-trip property test.
macro_rules! parenthesize {
    ( $self:ident, $name:expr, $( $x:expr ),+ ) => {
        {
            let mut string = String::new();
            string += "(";
            string += $name;
            $(
                string += " ";
                string += &$x.accept($self);
            )*
            string += ")";
            string
        }
    };
}

pub struct ASTPrinter;

impl ASTPrinter {
    pub fn print_expr(&mut self, expr: &Expr) -> String {
        expr.accept(self)
    }

    pub fn print_stmt(&mut self, stmt: &Stmt) -> String {
        stmt.accept(self)
    }

    fn params_str(params: &Option<Vec<Token>>) -> String {
        params.as_ref().map_or(String::new(), |params| {
            params.iter().map(|p| p.lexeme.as_str()).collect::<Vec<_>>().join(" ")
        })
    }

    fn print_function(&mut self, data: &Rc<FunctionData>) -> String {
        let mut string = String::new();
        string += "(fun ";
        string += data.name.as_ref().map_or("anonymous", |n| n.lexeme.as_str());
        string += "(";
        string += &Self::params_str(&data.params);
        string += ") { ";
        string += &data.body.iter().map(|stmt| stmt.accept(self)).collect::<Vec<_>>().join(" ");
        string += " })";
        string
    }
}

impl ExprVisitor<String> for ASTPrinter {
    fn visit_assign(&mut self, _id: NodeId, name: &Token, value: &Expr) -> String {
        parenthesize!(self, &format!("= {}", name.lexeme), value)
    }

    fn visit_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> String {
        parenthesize!(self, &operator.lexeme, left, right)
    }

    fn visit_logical(&mut self, left: &Expr, operator: &Token, right: &Expr) -> String {
        parenthesize!(self, &operator.lexeme, left, right)
    }

    fn visit_unary(&mut self, operator: &Token, right: &Expr) -> String {
        parenthesize!(self, &operator.lexeme, right)
    }

    fn visit_literal(&mut self, value: &Literal) -> String {
        value.to_string()
    }

    fn visit_grouping(&mut self, expression: &Expr) -> String {
        parenthesize!(self, "group", expression)
    }

    fn visit_comma(&mut self, expressions: &[Expr]) -> String {
        let mut string = String::from("(, ");
        string += &expressions.iter().map(|e| e.accept(self)).collect::<Vec<_>>().join(" ");
        string += ")";
        string
    }

    fn visit_ternary(&mut self, condition: &Expr, then_branch: &Expr, else_branch: &Expr) -> String {
        parenthesize!(self, "?:", condition, then_branch, else_branch)
    }

    fn visit_variable(&mut self, _id: NodeId, name: &Token) -> String {
        name.lexeme.clone()
    }

    fn visit_call(&mut self, callee: &Expr, _paren: &Token, arguments: &[Expr]) -> String {
        let mut string = callee.accept(self);
        string += "(";
        string += &arguments.iter().map(|a| a.accept(self)).collect::<Vec<_>>().join(" ");
        string += ")";
        string
    }

    fn visit_get(&mut self, object: &Expr, name: &Token) -> String {
        parenthesize!(self, &format!(". {}", name.lexeme), object)
    }

    fn visit_set(&mut self, object: &Expr, name: &Token, value: &Expr) -> String {
        parenthesize!(self, &format!("=. {}", name.lexeme), object, value)
    }

    fn visit_this(&mut self, _id: NodeId, _keyword: &Token) -> String {
        "this".to_string()
    }

    fn visit_super(&mut self, _id: NodeId, _keyword: &Token, method: &Token) -> String {
        format!("(super {})", method.lexeme)
    }

    fn visit_function_expr(&mut self, data: &Rc<FunctionData>) -> String {
        self.print_function(data)
    }
}

impl StmtVisitor<String> for ASTPrinter {
    fn visit_block_stmt(&mut self, statements: &[Stmt]) -> String {
        let mut string = String::from("{");
        for stmt in statements {
            string += " ";
            string += &stmt.accept(self);
        }
        string += " }";
        string
    }

    fn visit_class_stmt(&mut self, data: &ClassData) -> String {
        let mut string = String::new();
        string += "(class ";
        string += &data.name.lexeme;
        if let Some(superclass) = &data.superclass {
            string += " < ";
            string += &superclass.accept(self);
        }
        for method in &data.methods {
            string += " ";
            string += &self.print_function(method);
        }
        for method in &data.class_methods {
            string += " class ";
            string += &self.print_function(method);
        }
        string += ")";
        string
    }

    fn visit_expression_stmt(&mut self, expr: &Expr) -> String {
        parenthesize!(self, "expr", expr)
    }

    fn visit_function_stmt(&mut self, data: &Rc<FunctionData>) -> String {
        self.print_function(data)
    }

    fn visit_if_stmt(&mut self, condition: &Expr, then_branch: &Stmt, else_branch: Option<&Stmt>) -> String {
        let mut string = String::new();
        string += "(if ";
        string += &condition.accept(self);
        string += " ";
        string += &then_branch.accept(self);
        if let Some(else_branch) = else_branch {
            string += " else ";
            string += &else_branch.accept(self);
        }
        string += ")";
        string
    }

    fn visit_print_stmt(&mut self, expr: &Expr) -> String {
        parenthesize!(self, "print", expr)
    }

    fn visit_return_stmt(&mut self, _keyword: &Token, value: Option<&Expr>) -> String {
        match value {
            Some(value) => parenthesize!(self, "return", value),
            None => "(return)".to_string(),
        }
    }

    fn visit_var_stmt(&mut self, name: &Token, initializer: Option<&Expr>) -> String {
        let mut string = String::new();
        string += "(var ";
        string += &name.lexeme;
        if let Some(initializer) = initializer {
            string += " = ";
            string += &initializer.accept(self);
        }
        string += ")";
        string
    }

    fn visit_while_stmt(&mut self, condition: &Expr, body: &Stmt) -> String {
        parenthesize!(self, "while", condition, body)
    }

    fn visit_break_stmt(&mut self, _keyword: &Token) -> String {
        "(break)".to_string()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::{new_shared_sink, CapturingSink};
    use crate::parser::Parser;
    use crate::scanner::Scanner;

    fn print_source(source: &str) -> Vec<String> {
        let sink = new_shared_sink(CapturingSink::default());
        let tokens = Scanner::new(source, Rc::clone(&sink)).scan_tokens();
        let statements = Parser::new(tokens, sink).parse();
        let mut printer = ASTPrinter;
        statements.iter().map(|stmt| printer.print_stmt(stmt)).collect()
    }

    #[test]
    fn binary_expression_statement() {
        assert_eq!(print_source("1 + 2 * 3;"), vec!["(expr (+ 1 (* 2 3)))"]);
    }

    #[test]
    fn grouping_preserves_precedence() {
        assert_eq!(print_source("(1 + 2) * 3;"), vec!["(expr (* (group (+ 1 2)) 3))"]);
    }

    #[test]
    fn print_round_trips_same_structure_twice() {
        let source = "print a.b.c(1, 2) or d and e;";
        let first = print_source(source);
        let second = print_source(source);
        assert_eq!(first, second);
    }
}
