use std::cell::RefCell;
use std::fmt;
use std::io::Write;
use std::rc::Rc;

use crate::classes::TinjInstance;
use crate::environment::Environment;
use crate::error::{Result, TinjError};
use crate::interpreter::Interpreter;
use crate::stmt::FunctionDecl;
use crate::value::Value;

/// A user-defined function: the declaration it was parsed from plus the
/// environment captured at its definition site.
pub struct TinjFunction {
    declaration: Rc<FunctionDecl>,
    closure: Rc<RefCell<Environment>>,
}

impl TinjFunction {
    pub fn new(declaration: Rc<FunctionDecl>, closure: Rc<RefCell<Environment>>) -> Self {
        TinjFunction {
            declaration,
            closure,
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    /// Produce a copy of this function whose closure is a fresh frame with
    /// `this` bound to the given instance. Used for method access.
    pub fn bind(&self, instance: Rc<RefCell<TinjInstance>>) -> TinjFunction {
        let mut environment = Environment::with_enclosing(self.closure.clone());
        environment.define("this", Value::Instance(instance));

        TinjFunction {
            declaration: self.declaration.clone(),
            closure: Rc::new(RefCell::new(environment)),
        }
    }

    /// Execute the body under a fresh frame enclosing the closure, with each
    /// parameter bound to its argument. A `return` signal raised inside the
    /// body is caught here; falling off the end yields `nil`.
    pub fn call<W: Write>(
        &self,
        interpreter: &mut Interpreter<W>,
        arguments: Vec<Value>,
    ) -> Result<Value> {
        let mut environment = Environment::with_enclosing(self.closure.clone());

        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            environment.define(&param.lexeme, argument);
        }

        let environment = Rc::new(RefCell::new(environment));

        match interpreter.execute_in(&self.declaration.body, environment) {
            Ok(()) => Ok(Value::Nil),
            Err(TinjError::Return(value)) => Ok(value),
            Err(err) => Err(err),
        }
    }
}

impl fmt::Debug for TinjFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name())
    }
}
