use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::{Result, TinjError};
use crate::functions::TinjFunction;
use crate::token::Token;
use crate::value::Value;

/// A class value: a name and a table of unbound methods. Calling a class
/// allocates a bare instance; there is no constructor protocol, so class
/// arity is always zero.
#[derive(Debug)]
pub struct TinjClass {
    name: String,
    methods: HashMap<String, Rc<TinjFunction>>,
}

impl TinjClass {
    pub fn new(name: String, methods: HashMap<String, Rc<TinjFunction>>) -> Self {
        Self { name, methods }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        0
    }

    pub fn find_method(&self, name: &str) -> Option<Rc<TinjFunction>> {
        self.methods.get(name).map(Rc::clone)
    }
}

impl fmt::Display for TinjClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// An instance: a mutable field map plus a reference to its class.
#[derive(Debug)]
pub struct TinjInstance {
    class: Rc<TinjClass>,
    fields: HashMap<String, Value>,
}

impl TinjInstance {
    pub fn new(class: Rc<TinjClass>) -> Self {
        Self {
            class,
            fields: HashMap::new(),
        }
    }

    /// Property access: fields shadow methods. A method hit is bound to the
    /// instance, giving it a `this` frame of its own.
    pub fn get(this: &Rc<RefCell<TinjInstance>>, name: &Token) -> Result<Value> {
        if let Some(value) = this.borrow().fields.get(&name.lexeme) {
            return Ok(value.clone());
        }

        let method = this.borrow().class.find_method(&name.lexeme);
        if let Some(method) = method {
            return Ok(Value::Function(Rc::new(method.bind(Rc::clone(this)))));
        }

        Err(TinjError::runtime(
            name.line,
            format!("Undefined property '{}'.", name.lexeme),
        ))
    }

    pub fn set(&mut self, name: &Token, value: Value) {
        self.fields.insert(name.lexeme.clone(), value);
    }
}

impl fmt::Display for TinjInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} instance", self.class.name)
    }
}
