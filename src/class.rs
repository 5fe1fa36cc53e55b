use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::function::Function;
use crate::interpreter::Interpreter;
use crate::object::{Callable, Object};
use crate::token::Token;

/// A class is itself a value (its metaclass holds the static/"class"
/// methods reachable on the class value), and also a callable that
/// constructs instances.
#[derive(Clone)]
pub struct Class {
    pub name: String,
    pub superclass: Option<Rc<RefCell<Class>>>,
    pub methods: HashMap<String, Function>,
    pub metaclass: Option<Rc<RefCell<Class>>>,
}

impl Class {
    pub fn new(
        name: String,
        superclass: Option<Rc<RefCell<Class>>>,
        methods: HashMap<String, Function>,
        metaclass: Option<Rc<RefCell<Class>>>,
    ) -> Self {
        Class { name, superclass, methods, metaclass }
    }

    /// Walks the superclass chain looking for an instance method.
    pub fn find_method(&self, name: &str) -> Option<Function> {
        if let Some(method) = self.methods.get(name) {
            return Some(method.clone());
        }

        self.superclass.as_ref().and_then(|s| s.borrow().find_method(name))
    }
}

impl Debug for Class {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<class {}>", self.name)
    }
}

impl Display for Class {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Callable for Rc<RefCell<Class>> {
    fn arity(&self) -> usize {
        self.borrow().find_method("init").map_or(0, |init| init.declaration.params.as_ref().map_or(0, Vec::len))
    }

    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        let instance = Rc::new(RefCell::new(Instance::new(Rc::clone(self))));

        if let Some(initializer) = self.borrow().find_method("init") {
            let bound = initializer.bind(Object::Instance(Rc::clone(&instance)));
            bound.call(interpreter, arguments)?;
        }

        Ok(Object::Instance(instance))
    }
}

#[derive(Clone)]
pub struct Instance {
    pub class: Rc<RefCell<Class>>,
    pub fields: HashMap<String, Object>,
}

impl Instance {
    pub fn new(class: Rc<RefCell<Class>>) -> Self {
        Instance { class, fields: HashMap::new() }
    }

    /// Field lookup first, then method lookup bound to this instance; if the
    /// resolved method is a getter, the caller is responsible for invoking
    /// it immediately with no arguments.
    pub fn get(&self, name: &Token, this: &Object) -> Result<Object, RuntimeError> {
        if let Some(field) = self.fields.get(&name.lexeme) {
            return Ok(field.clone());
        }

        if let Some(method) = self.class.borrow().find_method(&name.lexeme) {
            return Ok(Object::Function(method.bind(this.clone())));
        }

        Err(RuntimeError::new(name.line, format!("Undefined property '{}'.", name.lexeme)))
    }

    pub fn set(&mut self, name: &Token, value: Object) {
        self.fields.insert(name.lexeme.clone(), value);
    }
}

impl Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<instance {}>", self.class.borrow().name)
    }
}

impl Display for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}> instance", self.class.borrow().name)
    }
}
