use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{Result, TinjError};
use crate::token::Token;
use crate::value::Value;

/// A lexical scope frame: a name-to-value map plus an optional link to the
/// enclosing frame. Frames are shared via `Rc<RefCell<_>>` because closures
/// retain their defining frame for as long as they live; cycles through
/// captured functions are accepted and reclaimed at process exit.
#[derive(Debug)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str, line: usize) -> Result<Value> {
        if let Some(value) = self.values.get(name) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name, line)
        } else {
            Err(TinjError::runtime(
                line,
                format!("Undefined variable '{}'.", name),
            ))
        }
    }

    pub fn assign(&mut self, name: &Token, value: Value) -> Result<()> {
        if self.values.contains_key(&name.lexeme) {
            self.values.insert(name.lexeme.clone(), value);
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(TinjError::runtime(
                name.line,
                format!("Undefined variable '{}'.", name.lexeme),
            ))
        }
    }

    /// Read `name` from the frame exactly `distance` hops up the chain. The
    /// resolver guarantees the frame and binding exist for every distance it
    /// records; a miss is surfaced as a runtime error rather than a panic.
    pub fn get_at(
        this: &Rc<RefCell<Environment>>,
        distance: usize,
        name: &str,
        line: usize,
    ) -> Result<Value> {
        let frame = Environment::ancestor(this, distance, name, line)?;
        let borrowed = frame.borrow();

        match borrowed.values.get(name) {
            Some(value) => Ok(value.clone()),
            None => Err(TinjError::runtime(
                line,
                format!("Undefined variable '{}'.", name),
            )),
        }
    }

    /// Write `name` in the frame exactly `distance` hops up the chain.
    pub fn assign_at(
        this: &Rc<RefCell<Environment>>,
        distance: usize,
        name: &Token,
        value: Value,
    ) -> Result<()> {
        let frame = Environment::ancestor(this, distance, &name.lexeme, name.line)?;
        frame.borrow_mut().values.insert(name.lexeme.clone(), value);

        Ok(())
    }

    fn ancestor(
        this: &Rc<RefCell<Environment>>,
        distance: usize,
        name: &str,
        line: usize,
    ) -> Result<Rc<RefCell<Environment>>> {
        let mut frame = Rc::clone(this);

        for _ in 0..distance {
            let enclosing = frame.borrow().enclosing.clone();
            match enclosing {
                Some(parent) => frame = parent,
                None => {
                    return Err(TinjError::runtime(
                        line,
                        format!("Undefined variable '{}'.", name),
                    ));
                }
            }
        }

        Ok(frame)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new()
    }
}
