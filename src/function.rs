use std::cell::RefCell;
use std::fmt::{Debug, Display};
use std::rc::Rc;

use crate::environment::{EnvRef, Environment};
use crate::error::RuntimeError;
use crate::interpreter::{Flow, Interpreter};
use crate::object::{Callable, Object};
use crate::stmt::FunctionData;

/// A user-defined function or method: a declaration plus the environment it
/// closed over at creation time.
#[derive(Debug, Clone)]
pub struct Function {
    pub declaration: Rc<FunctionData>,
    pub closure: EnvRef,
    pub is_initializer: bool,
    pub is_getter: bool,
}

impl Function {
    pub fn new(declaration: Rc<FunctionData>, closure: EnvRef, is_initializer: bool) -> Self {
        let is_getter = declaration.params.is_none();
        Function { declaration, closure, is_initializer, is_getter }
    }

    /// Produces a copy of this function whose closure additionally defines
    /// `this` as `instance`, so method bodies can refer to it.
    pub fn bind(&self, instance: Object) -> Function {
        let environment = Environment::new_ref(Some(Rc::clone(&self.closure)));
        environment.borrow_mut().define("this", instance);
        Function {
            declaration: Rc::clone(&self.declaration),
            closure: environment,
            is_initializer: self.is_initializer,
            is_getter: self.is_getter,
        }
    }

    fn name(&self) -> &str {
        self.declaration.name.as_ref().map_or("anonymous", |t| t.lexeme.as_str())
    }
}

impl Callable for Function {
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        let environment = Environment::new_ref(Some(Rc::clone(&self.closure)));

        if let Some(params) = &self.declaration.params {
            for (param, arg) in params.iter().zip(arguments.into_iter()) {
                environment.borrow_mut().define(&param.lexeme, arg);
            }
        }

        match interpreter.execute_block(&self.declaration.body, environment) {
            Ok(()) => {
                if self.is_initializer {
                    Environment::get_at(&self.closure, 0, &this_token())
                } else {
                    Ok(Object::from(crate::literal::Literal::Nil))
                }
            }
            Err(Flow::Return(value)) => {
                if self.is_initializer {
                    Environment::get_at(&self.closure, 0, &this_token())
                } else {
                    Ok(value)
                }
            }
            Err(Flow::Error(err)) => Err(err),
            Err(Flow::Break) => unreachable!("break cannot escape a function body"),
        }
    }

    fn arity(&self) -> usize {
        self.declaration.params.as_ref().map_or(0, Vec::len)
    }
}

/// `this` always lives at depth 0 of a bound method's closure.
fn this_token() -> crate::token::Token {
    crate::token::Token::new(crate::token::Type::This, "this".to_string(), None, 0)
}

impl Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.declaration.name {
            Some(name) => write!(f, "<fn {}>", name.lexeme),
            None => write!(f, "<fn (anonymous)>"),
        }
    }
}

#[derive(Clone)]
pub struct NativeFunction {
    pub name: String,
    pub arity: usize,
    pub function: fn(&mut Interpreter, Vec<Object>) -> Result<Object, RuntimeError>,
}

impl Callable for NativeFunction {
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        (self.function)(interpreter, arguments)
    }

    fn arity(&self) -> usize {
        self.arity
    }
}

impl NativeFunction {
    /// Native functions seeded into the global environment.
    pub fn globals() -> Vec<NativeFunction> {
        vec![NativeFunction {
            name: "clock".to_string(),
            arity: 0,
            function: |_, _| {
                let now = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .expect("system clock before the epoch")
                    .as_secs_f64();
                Ok(Object::from(now))
            },
        }]
    }
}

impl Display for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<native fn>")
    }
}

impl Debug for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}
