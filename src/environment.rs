use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::object::Object;
use crate::token::Token;

/// A variable slot. `Var` without an initializer defines `Uninitialized`
/// rather than `Nil`, so that reading it before assignment is a distinct
/// runtime error.
#[derive(Debug, Clone)]
enum Slot {
    Value(Object),
    Uninitialized,
}

pub type EnvRef = Rc<RefCell<Environment>>;

#[derive(Debug, Clone)]
pub struct Environment {
    pub enclosing: Option<EnvRef>,
    slots: HashMap<String, Slot>,
}

impl Environment {
    pub fn new(enclosing: Option<EnvRef>) -> Self {
        Environment { enclosing, slots: HashMap::new() }
    }

    pub fn new_ref(enclosing: Option<EnvRef>) -> EnvRef {
        Rc::new(RefCell::new(Self::new(enclosing)))
    }

    pub fn define(&mut self, name: &str, value: Object) {
        self.slots.insert(name.to_string(), Slot::Value(value));
    }

    pub fn define_uninitialized(&mut self, name: &str) {
        self.slots.insert(name.to_string(), Slot::Uninitialized);
    }

    fn ancestor(this: &EnvRef, distance: usize) -> EnvRef {
        let mut environment = Rc::clone(this);
        for _ in 0..distance {
            let parent = environment
                .borrow()
                .enclosing
                .clone()
                .unwrap_or_else(|| panic!("enclosing environment to exist at depth {distance}"));
            environment = parent;
        }
        environment
    }

    pub fn get(&self, name: &Token) -> Result<Object, RuntimeError> {
        match self.slots.get(&name.lexeme) {
            Some(Slot::Value(value)) => Ok(value.clone()),
            Some(Slot::Uninitialized) => Err(RuntimeError::new(
                name.line,
                format!("Uninitialized variable '{}'.", name.lexeme),
            )),
            None => match &self.enclosing {
                Some(enclosing) => enclosing.borrow().get(name),
                None => Err(RuntimeError::new(
                    name.line,
                    format!("Undefined variable '{}'.", name.lexeme),
                )),
            },
        }
    }

    pub fn get_at(this: &EnvRef, distance: usize, name: &Token) -> Result<Object, RuntimeError> {
        let target = Self::ancestor(this, distance);
        let borrowed = target.borrow();
        match borrowed.slots.get(&name.lexeme) {
            Some(Slot::Value(value)) => Ok(value.clone()),
            Some(Slot::Uninitialized) => Err(RuntimeError::new(
                name.line,
                format!("Uninitialized variable '{}'.", name.lexeme),
            )),
            None => Err(RuntimeError::new(
                name.line,
                format!("Undefined variable '{}'.", name.lexeme),
            )),
        }
    }

    pub fn assign(&mut self, name: &Token, value: Object) -> Result<(), RuntimeError> {
        if self.slots.contains_key(&name.lexeme) {
            self.slots.insert(name.lexeme.clone(), Slot::Value(value));
            return Ok(());
        }

        match &self.enclosing {
            Some(enclosing) => enclosing.borrow_mut().assign(name, value),
            None => Err(RuntimeError::new(
                name.line,
                format!("Undefined variable '{}'.", name.lexeme),
            )),
        }
    }

    pub fn assign_at(
        this: &EnvRef,
        distance: usize,
        name: &Token,
        value: Object,
    ) -> Result<(), RuntimeError> {
        let target = Self::ancestor(this, distance);
        target.borrow_mut().slots.insert(name.lexeme.clone(), Slot::Value(value));
        Ok(())
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::literal::Literal;
    use crate::token::Type;

    fn tok(name: &str) -> Token {
        Token::new(Type::Identifier, name.to_string(), None, 1)
    }

    #[test]
    fn define_then_get() {
        let mut env = Environment::new(None);
        env.define("a", Object::Literal(Literal::Number(1.0)));
        assert_eq!(env.get(&tok("a")).unwrap(), Object::Literal(Literal::Number(1.0)));
    }

    #[test]
    fn reading_uninitialized_slot_errors() {
        let mut env = Environment::new(None);
        env.define_uninitialized("a");
        let err = env.get(&tok("a")).unwrap_err();
        assert_eq!(err.message, "Uninitialized variable 'a'.");
    }

    #[test]
    fn get_walks_enclosing_chain() {
        let outer = Environment::new_ref(None);
        outer.borrow_mut().define("a", Object::Literal(Literal::Number(1.0)));
        let inner = Environment::new_ref(Some(Rc::clone(&outer)));
        assert_eq!(inner.borrow().get(&tok("a")).unwrap(), Object::Literal(Literal::Number(1.0)));
    }

    #[test]
    fn assign_to_undefined_name_errors() {
        let mut env = Environment::new(None);
        let err = env.assign(&tok("a"), Object::Literal(Literal::Nil)).unwrap_err();
        assert_eq!(err.message, "Undefined variable 'a'.");
    }
}
