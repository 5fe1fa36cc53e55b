use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::class::Class;
use crate::environment::{EnvRef, Environment};
use crate::error::{RuntimeError, SharedPrintSink, SharedSink};
use crate::expr::{Expr, ExprVisitor, NodeId};
use crate::function::{Function, NativeFunction};
use crate::literal::Literal;
use crate::object::{Callable, Object};
use crate::stmt::{ClassData, FunctionData, Stmt, StmtVisitor};
use crate::token::{Token, Type};

/// Non-local control flow unified into one propagation channel so the tree
/// walk can use `?` throughout. `Return` is caught only at `Function::call`,
/// `Break` only at the nearest enclosing `While`; either escaping further is
/// an implementation error.
#[derive(Debug)]
pub enum Flow {
    Error(RuntimeError),
    Return(Object),
    Break,
}

impl From<RuntimeError> for Flow {
    fn from(error: RuntimeError) -> Self {
        Flow::Error(error)
    }
}

fn check_number_operand(operator: &Token, value: &Object) -> Result<f64, Flow> {
    value.as_number().ok_or_else(|| Flow::Error(RuntimeError::new(operator.line, "Operand must be a number")))
}

fn check_number_operands(operator: &Token, left: &Object, right: &Object) -> Result<(f64, f64), Flow> {
    match (left.as_number(), right.as_number()) {
        (Some(l), Some(r)) => Ok((l, r)),
        _ => Err(Flow::Error(RuntimeError::new(operator.line, "Operands must be numbers"))),
    }
}

/// Tree-walking evaluator. Holds the `globals` environment (seeded with the
/// native functions) for the lifetime of a run, plus the "current"
/// environment, which is saved and restored around blocks, class bodies, and
/// calls so restoration is guaranteed on every exit path, signal unwinds
/// included.
pub struct Interpreter {
    pub globals: EnvRef,
    environment: EnvRef,
    locals: HashMap<NodeId, usize>,
    sink: SharedSink,
    print: SharedPrintSink,
}

impl Interpreter {
    pub fn new(sink: SharedSink, print: SharedPrintSink) -> Self {
        let globals = Environment::new_ref(None);
        for native in NativeFunction::globals() {
            let name = native.name.clone();
            globals.borrow_mut().define(&name, Object::NativeFunction(native));
        }

        Interpreter { environment: Rc::clone(&globals), globals, locals: HashMap::new(), sink, print }
    }

    /// Merges in a fresh depth map from the resolver. Called once per batch
    /// run, and once per REPL line, since node ids are never reused.
    pub fn load_locals(&mut self, locals: HashMap<NodeId, usize>) {
        self.locals.extend(locals);
    }

    pub fn interpret(&mut self, statements: &[Stmt]) {
        for statement in statements {
            match self.execute(statement) {
                Ok(()) => {}
                Err(Flow::Error(error)) => {
                    error.report(&self.sink);
                    return;
                }
                Err(Flow::Return(_) | Flow::Break) => {
                    unreachable!("return/break cannot escape top-level statement execution")
                }
            }
        }
    }

    pub fn execute_block(&mut self, statements: &[Stmt], environment: EnvRef) -> Result<(), Flow> {
        let previous = std::mem::replace(&mut self.environment, environment);

        let mut result = Ok(());
        for statement in statements {
            if let Err(flow) = self.execute(statement) {
                result = Err(flow);
                break;
            }
        }

        self.environment = previous;
        result
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Object, Flow> {
        expr.accept(self)
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<(), Flow> {
        stmt.accept(self)
    }

    fn lookup_variable(&self, id: NodeId, name: &Token) -> Result<Object, Flow> {
        match self.locals.get(&id) {
            Some(&distance) => Ok(Environment::get_at(&self.environment, distance, name)?),
            None => Ok(self.globals.borrow().get(name)?),
        }
    }

    /// Getters (methods declared with no parameter list) run as soon as
    /// they're resolved off a `Get`, rather than waiting for a `Call`.
    fn maybe_invoke_getter(&mut self, value: Object) -> Result<Object, Flow> {
        if let Object::Function(function) = &value {
            if function.is_getter {
                return function.call(self, Vec::new()).map_err(Flow::Error);
            }
        }
        Ok(value)
    }

    fn add(&self, left: Object, right: Object, operator: &Token) -> Result<Object, Flow> {
        match (&left, &right) {
            (Object::Literal(Literal::Number(l)), Object::Literal(Literal::Number(r))) => Ok(Object::from(l + r)),
            (Object::Literal(Literal::String(_)), _) | (_, Object::Literal(Literal::String(_))) => {
                Ok(Object::from(format!("{left}{right}")))
            }
            _ => Err(Flow::Error(RuntimeError::new(operator.line, "Operands must be numbers"))),
        }
    }
}

impl ExprVisitor<Result<Object, Flow>> for Interpreter {
    fn visit_assign(&mut self, id: NodeId, name: &Token, value: &Expr) -> Result<Object, Flow> {
        let value = self.evaluate(value)?;
        match self.locals.get(&id) {
            Some(&distance) => Environment::assign_at(&self.environment, distance, name, value.clone())?,
            None => self.globals.borrow_mut().assign(name, value.clone())?,
        }
        Ok(value)
    }

    fn visit_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Object, Flow> {
        let left_val = self.evaluate(left)?;
        let right_val = self.evaluate(right)?;

        match operator.r#type {
            Type::Minus => {
                let (l, r) = check_number_operands(operator, &left_val, &right_val)?;
                Ok(Object::from(l - r))
            }
            Type::Slash => {
                let (l, r) = check_number_operands(operator, &left_val, &right_val)?;
                if r == 0.0 {
                    return Err(Flow::Error(RuntimeError::new(operator.line, "Cannot divide by zero.")));
                }
                Ok(Object::from(l / r))
            }
            Type::Star => {
                let (l, r) = check_number_operands(operator, &left_val, &right_val)?;
                Ok(Object::from(l * r))
            }
            Type::Plus => self.add(left_val, right_val, operator),
            Type::Greater => {
                let (l, r) = check_number_operands(operator, &left_val, &right_val)?;
                Ok(Object::from(l > r))
            }
            Type::GreaterEqual => {
                let (l, r) = check_number_operands(operator, &left_val, &right_val)?;
                Ok(Object::from(l >= r))
            }
            Type::Less => {
                let (l, r) = check_number_operands(operator, &left_val, &right_val)?;
                Ok(Object::from(l < r))
            }
            Type::LessEqual => {
                let (l, r) = check_number_operands(operator, &left_val, &right_val)?;
                Ok(Object::from(l <= r))
            }
            Type::BangEqual => Ok(Object::from(left_val != right_val)),
            Type::EqualEqual => Ok(Object::from(left_val == right_val)),
            _ => unreachable!("parser only emits arithmetic/comparison/equality operators in Binary"),
        }
    }

    fn visit_logical(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Object, Flow> {
        let left_val = self.evaluate(left)?;
        match operator.r#type {
            Type::Or => {
                if left_val.is_truthy() {
                    Ok(left_val)
                } else {
                    self.evaluate(right)
                }
            }
            Type::And => {
                if !left_val.is_truthy() {
                    Ok(left_val)
                } else {
                    self.evaluate(right)
                }
            }
            _ => unreachable!("parser only emits 'or'/'and' in Logical"),
        }
    }

    fn visit_unary(&mut self, operator: &Token, right: &Expr) -> Result<Object, Flow> {
        let value = self.evaluate(right)?;
        match operator.r#type {
            Type::Minus => Ok(Object::from(-check_number_operand(operator, &value)?)),
            Type::Bang => Ok(Object::from(!value.is_truthy())),
            _ => unreachable!("parser only emits '-' or '!' in Unary"),
        }
    }

    fn visit_literal(&mut self, value: &Literal) -> Result<Object, Flow> {
        Ok(Object::from(value.clone()))
    }

    fn visit_grouping(&mut self, expression: &Expr) -> Result<Object, Flow> {
        self.evaluate(expression)
    }

    fn visit_comma(&mut self, expressions: &[Expr]) -> Result<Object, Flow> {
        let mut result = Object::from(Literal::Nil);
        for expr in expressions {
            result = self.evaluate(expr)?;
        }
        Ok(result)
    }

    fn visit_ternary(&mut self, condition: &Expr, then_branch: &Expr, else_branch: &Expr) -> Result<Object, Flow> {
        if self.evaluate(condition)?.is_truthy() {
            self.evaluate(then_branch)
        } else {
            self.evaluate(else_branch)
        }
    }

    fn visit_variable(&mut self, id: NodeId, name: &Token) -> Result<Object, Flow> {
        self.lookup_variable(id, name)
    }

    fn visit_call(&mut self, callee: &Expr, paren: &Token, arguments: &[Expr]) -> Result<Object, Flow> {
        let callee_value = self.evaluate(callee)?;

        let mut args = Vec::with_capacity(arguments.len());
        for arg in arguments {
            args.push(self.evaluate(arg)?);
        }

        let Some(callable) = callee_value.as_callable() else {
            return Err(Flow::Error(RuntimeError::new(paren.line, "Can only call functions and classes.")));
        };

        if args.len() != callable.arity() {
            return Err(Flow::Error(RuntimeError::new(
                paren.line,
                format!("Expected {} args but got {}.", callable.arity(), args.len()),
            )));
        }

        callable.call(self, args).map_err(Flow::Error)
    }

    fn visit_get(&mut self, object: &Expr, name: &Token) -> Result<Object, Flow> {
        let object = self.evaluate(object)?;

        match object {
            Object::Instance(instance) => {
                let this = Object::Instance(Rc::clone(&instance));
                let value = instance.borrow().get(name, &this)?;
                self.maybe_invoke_getter(value)
            }
            Object::Class(class) => {
                let metaclass = class.borrow().metaclass.clone();
                if let Some(metaclass) = metaclass {
                    if let Some(method) = metaclass.borrow().find_method(&name.lexeme) {
                        let bound = method.bind(Object::Class(Rc::clone(&class)));
                        return self.maybe_invoke_getter(Object::Function(bound));
                    }
                }
                Err(Flow::Error(RuntimeError::new(name.line, format!("Undefined property '{}'.", name.lexeme))))
            }
            _ => Err(Flow::Error(RuntimeError::new(name.line, "Only instances have properties."))),
        }
    }

    fn visit_set(&mut self, object: &Expr, name: &Token, value: &Expr) -> Result<Object, Flow> {
        let object = self.evaluate(object)?;
        let Object::Instance(instance) = object else {
            return Err(Flow::Error(RuntimeError::new(name.line, "Only instances have fields.")));
        };

        let value = self.evaluate(value)?;
        instance.borrow_mut().set(name, value.clone());
        Ok(value)
    }

    fn visit_this(&mut self, id: NodeId, keyword: &Token) -> Result<Object, Flow> {
        self.lookup_variable(id, keyword)
    }

    fn visit_super(&mut self, id: NodeId, keyword: &Token, method: &Token) -> Result<Object, Flow> {
        let distance = *self.locals.get(&id).expect("'super' always resolved by the resolver");
        let superclass = Environment::get_at(&self.environment, distance, keyword)?;

        let this_token = Token::new(Type::This, "this".to_string(), None, keyword.line);
        let this = Environment::get_at(&self.environment, distance - 1, &this_token)?;

        let Object::Class(superclass) = superclass else {
            unreachable!("'super' always resolves to a class value")
        };

        let found = superclass.borrow().find_method(&method.lexeme).ok_or_else(|| {
            Flow::Error(RuntimeError::new(method.line, format!("Undefined property '{}'.", method.lexeme)))
        })?;

        Ok(Object::Function(found.bind(this)))
    }

    fn visit_function_expr(&mut self, data: &Rc<FunctionData>) -> Result<Object, Flow> {
        Ok(Object::Function(Function::new(Rc::clone(data), Rc::clone(&self.environment), false)))
    }
}

impl StmtVisitor<Result<(), Flow>> for Interpreter {
    fn visit_block_stmt(&mut self, statements: &[Stmt]) -> Result<(), Flow> {
        let environment = Environment::new_ref(Some(Rc::clone(&self.environment)));
        self.execute_block(statements, environment)
    }

    fn visit_class_stmt(&mut self, data: &ClassData) -> Result<(), Flow> {
        let superclass = match &data.superclass {
            Some(expr) => match self.evaluate(expr)? {
                Object::Class(class) => Some(class),
                _ => {
                    return Err(Flow::Error(RuntimeError::new(data.name.line, "Superclass must be a class.")));
                }
            },
            None => None,
        };

        self.environment.borrow_mut().define(&data.name.lexeme, Object::from(Literal::Nil));

        let previous_environment = superclass.as_ref().map(|superclass| {
            let environment = Environment::new_ref(Some(Rc::clone(&self.environment)));
            environment.borrow_mut().define("super", Object::Class(Rc::clone(superclass)));
            std::mem::replace(&mut self.environment, environment)
        });

        let mut methods = HashMap::new();
        for method_data in &data.methods {
            let name = method_data.name.as_ref().expect("method declarations are always named").lexeme.clone();
            let is_initializer = name == "init";
            let function = Function::new(Rc::clone(method_data), Rc::clone(&self.environment), is_initializer);
            methods.insert(name, function);
        }

        let mut class_methods = HashMap::new();
        for method_data in &data.class_methods {
            let name = method_data.name.as_ref().expect("method declarations are always named").lexeme.clone();
            let function = Function::new(Rc::clone(method_data), Rc::clone(&self.environment), false);
            class_methods.insert(name, function);
        }

        let metaclass = Rc::new(RefCell::new(Class::new(
            format!("{} metaclass", data.name.lexeme),
            None,
            class_methods,
            None,
        )));

        let class = Class::new(data.name.lexeme.clone(), superclass, methods, Some(metaclass));

        if let Some(previous) = previous_environment {
            self.environment = previous;
        }

        self.environment.borrow_mut().assign(&data.name, Object::Class(Rc::new(RefCell::new(class))))?;
        Ok(())
    }

    fn visit_expression_stmt(&mut self, expr: &Expr) -> Result<(), Flow> {
        self.evaluate(expr)?;
        Ok(())
    }

    fn visit_function_stmt(&mut self, data: &Rc<FunctionData>) -> Result<(), Flow> {
        let name = data.name.as_ref().expect("function declarations are always named");
        let function = Function::new(Rc::clone(data), Rc::clone(&self.environment), false);
        self.environment.borrow_mut().define(&name.lexeme, Object::Function(function));
        Ok(())
    }

    fn visit_if_stmt(&mut self, condition: &Expr, then_branch: &Stmt, else_branch: Option<&Stmt>) -> Result<(), Flow> {
        if self.evaluate(condition)?.is_truthy() {
            self.execute(then_branch)
        } else if let Some(else_branch) = else_branch {
            self.execute(else_branch)
        } else {
            Ok(())
        }
    }

    fn visit_print_stmt(&mut self, expr: &Expr) -> Result<(), Flow> {
        let value = self.evaluate(expr)?;
        self.print.borrow_mut().print_line(&value.to_string());
        Ok(())
    }

    fn visit_return_stmt(&mut self, _keyword: &Token, value: Option<&Expr>) -> Result<(), Flow> {
        let value = match value {
            Some(expr) => self.evaluate(expr)?,
            None => Object::from(Literal::Nil),
        };
        Err(Flow::Return(value))
    }

    fn visit_var_stmt(&mut self, name: &Token, initializer: Option<&Expr>) -> Result<(), Flow> {
        match initializer {
            Some(expr) => {
                let value = self.evaluate(expr)?;
                self.environment.borrow_mut().define(&name.lexeme, value);
            }
            None => self.environment.borrow_mut().define_uninitialized(&name.lexeme),
        }
        Ok(())
    }

    fn visit_while_stmt(&mut self, condition: &Expr, body: &Stmt) -> Result<(), Flow> {
        while self.evaluate(condition)?.is_truthy() {
            match self.execute(body) {
                Ok(()) => {}
                Err(Flow::Break) => break,
                Err(other) => return Err(other),
            }
        }
        Ok(())
    }

    fn visit_break_stmt(&mut self, _keyword: &Token) -> Result<(), Flow> {
        Err(Flow::Break)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::{CapturingPrintSink, CapturingSink, SharedPrintSink, SharedSink};
    use crate::parser::Parser;
    use crate::resolver::Resolver;
    use crate::scanner::Scanner;

    fn run(source: &str) -> (Vec<String>, Vec<String>, Vec<String>) {
        let sink_handle = Rc::new(RefCell::new(CapturingSink::default()));
        let print_handle = Rc::new(RefCell::new(CapturingPrintSink::default()));
        let sink: SharedSink = sink_handle.clone();
        let print: SharedPrintSink = print_handle.clone();

        let tokens = Scanner::new(source, Rc::clone(&sink)).scan_tokens();
        let statements = Parser::new(tokens, Rc::clone(&sink)).parse();
        let locals = Resolver::new(Rc::clone(&sink)).resolve(&statements);

        let mut interpreter = Interpreter::new(Rc::clone(&sink), Rc::clone(&print));
        interpreter.load_locals(locals);
        interpreter.interpret(&statements);

        let lines = print_handle.borrow().lines.clone();
        let compile_errors = sink_handle.borrow().compile_errors.clone();
        let runtime_errors = sink_handle.borrow().runtime_errors.clone();
        (lines, compile_errors, runtime_errors)
    }

    #[test]
    fn arithmetic() {
        let (lines, compile_errors, runtime_errors) = run("print 1 + 2;");
        assert_eq!(lines, vec!["3"]);
        assert!(compile_errors.is_empty());
        assert!(runtime_errors.is_empty());
    }

    #[test]
    fn block_scoping_shadows_outer() {
        let (lines, ..) = run("var a = 1; { var a = 2; print a; } print a;");
        assert_eq!(lines, vec!["2", "1"]);
    }

    #[test]
    fn closures_capture_by_reference() {
        let (lines, ..) = run(
            "fun make() { var i = 0; fun inc() { i = i + 1; return i; } return inc; } \
             var c = make(); print c(); print c();",
        );
        assert_eq!(lines, vec!["1", "2"]);
    }

    #[test]
    fn methods_and_inheritance() {
        let (lines, ..) = run(
            "class A { m() { print \"A\"; } } \
             class B < A { m() { super.m(); print \"B\"; } } \
             B().m();",
        );
        assert_eq!(lines, vec!["A", "B"]);
    }

    #[test]
    fn string_number_plus_coercion() {
        let (lines, ..) = run("print \"a\" + 1;");
        assert_eq!(lines, vec!["a1"]);
    }

    #[test]
    fn reading_uninitialized_variable_is_a_runtime_error() {
        let (lines, _compile, runtime_errors) = run("var a; print a;");
        assert!(lines.is_empty());
        assert_eq!(runtime_errors, vec!["Uninitialized variable 'a'.\n[line 1]"]);
    }

    #[test]
    fn division_by_zero_is_a_runtime_error() {
        let (_lines, _compile, runtime_errors) = run("1 / 0;");
        assert_eq!(runtime_errors, vec!["Cannot divide by zero.\n[line 1]"]);
    }

    #[test]
    fn initializer_always_returns_this() {
        let (lines, ..) = run(
            "class Box { init(v) { this.v = v; return; } } \
             var b = Box(1); print b.v;",
        );
        assert_eq!(lines, vec!["1"]);
    }

    #[test]
    fn short_circuit_or_skips_right_side() {
        let (lines, ..) = run("fun boom() { print \"boom\"; return true; } print true or boom();");
        assert_eq!(lines, vec!["true"]);
    }
}
