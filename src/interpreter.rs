use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::classes::{TinjClass, TinjInstance};
use crate::environment::Environment;
use crate::error::{Result, TinjError};
use crate::expr::{Expr, ExprId, LiteralValue};
use crate::functions::TinjFunction;
use crate::stmt::Stmt;
use crate::token::{Token, TokenType};
use crate::value::Value;

/// Tree-walking evaluator. Holds the global frame, the current frame, and the
/// locals map populated by the resolver. `print` output goes to the injected
/// writer so embedders and tests can capture it.
pub struct Interpreter<W: Write> {
    globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<ExprId, usize>,
    output: W,
}

impl<W: Write> Interpreter<W> {
    pub fn new(output: W) -> Self {
        let globals = Rc::new(RefCell::new(Environment::new()));

        globals.borrow_mut().define(
            "clock",
            Value::NativeFunction {
                name: "clock".to_string(),
                arity: 0,
                func: clock_native,
            },
        );

        // Wall-clock seconds frozen at construction, next to the live `clock`.
        globals
            .borrow_mut()
            .define("now", Value::Number(unix_time_seconds()));

        Interpreter {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            output,
        }
    }

    /// Merge binding distances from a resolver pass. Expression ids are
    /// unique across a session, so entries accumulate without collisions.
    pub fn add_locals(&mut self, locals: HashMap<ExprId, usize>) {
        self.locals.extend(locals);
    }

    /// Execute top-level statements. The first runtime error aborts the
    /// remaining statements and is returned to the caller.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        for statement in statements {
            self.execute(statement)?;
        }

        Ok(())
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;

                Ok(())
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;

                writeln!(self.output, "{}", value)?;

                Ok(())
            }

            Stmt::Var { name, initializer } => {
                let value: Value = if let Some(expr) = initializer {
                    self.evaluate(expr)?
                } else {
                    Value::Nil
                };

                self.environment.borrow_mut().define(&name.lexeme, value);

                Ok(())
            }

            Stmt::Block(statements) => {
                let child = Environment::with_enclosing(Rc::clone(&self.environment));

                self.execute_block(statements, Rc::new(RefCell::new(child)))
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if is_truthy(&self.evaluate(condition)?) {
                    self.execute(then_branch)?;
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)?;
                }

                Ok(())
            }

            Stmt::While { condition, body } => {
                while is_truthy(&self.evaluate(condition)?) {
                    self.execute(body)?;
                }

                Ok(())
            }

            Stmt::Function(decl) => {
                let function = TinjFunction::new(Rc::clone(decl), Rc::clone(&self.environment));

                self.environment
                    .borrow_mut()
                    .define(&decl.name.lexeme, Value::Function(Rc::new(function)));

                Ok(())
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                Err(TinjError::Return(value))
            }

            Stmt::Class { name, methods } => {
                // Two-step definition so methods may refer to the class name.
                self.environment
                    .borrow_mut()
                    .define(&name.lexeme, Value::Nil);

                let mut table = HashMap::new();
                for method in methods {
                    let function =
                        TinjFunction::new(Rc::clone(method), Rc::clone(&self.environment));
                    table.insert(method.name.lexeme.clone(), Rc::new(function));
                }

                let class = TinjClass::new(name.lexeme.clone(), table);

                self.environment
                    .borrow_mut()
                    .assign(name, Value::Class(Rc::new(class)))?;

                Ok(())
            }
        }
    }

    /// Run a statement list under `environment`, restoring the previous
    /// frame on every exit path, including errors and return signals.
    fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Rc<RefCell<Environment>>,
    ) -> Result<()> {
        let previous = std::mem::replace(&mut self.environment, environment);

        let mut result = Ok(());
        for statement in statements {
            result = self.execute(statement);
            if result.is_err() {
                break;
            }
        }

        self.environment = previous;

        result
    }

    /// Run a single statement under `environment`. Used by function calls,
    /// whose bodies are single statements executed under the call frame.
    pub(crate) fn execute_in(
        &mut self,
        stmt: &Stmt,
        environment: Rc<RefCell<Environment>>,
    ) -> Result<()> {
        let previous = std::mem::replace(&mut self.environment, environment);

        let result = self.execute(stmt);

        self.environment = previous;

        result
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Nil => Value::Nil,
                LiteralValue::Bool(b) => Value::Bool(*b),
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::String(s) => Value::String(s.clone()),
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => self.evaluate_logical(left, operator, right),

            Expr::Variable { id, name } => self.look_up_variable(name, *id),

            Expr::This { id, keyword } => self.look_up_variable(keyword, *id),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(distance) => Environment::assign_at(
                        &self.environment,
                        *distance,
                        name,
                        value.clone(),
                    )?,
                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee_val = self.evaluate(callee)?;

                // Non-callables are rejected before any argument runs.
                let arity = match &callee_val {
                    Value::NativeFunction { arity, .. } => *arity,
                    Value::Function(function) => function.arity(),
                    Value::Class(class) => class.arity(),

                    _ => {
                        return Err(TinjError::runtime(
                            paren.line,
                            "Can only call functions and classes.",
                        ));
                    }
                };

                let mut args = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    args.push(self.evaluate(argument)?);
                }

                if args.len() != arity {
                    return Err(TinjError::runtime(
                        paren.line,
                        format!("Expected {} arguments but got {}.", arity, args.len()),
                    ));
                }

                match callee_val {
                    Value::NativeFunction { func, .. } => func(&args),

                    Value::Function(function) => function.call(self, args),

                    Value::Class(class) => Ok(Value::Instance(Rc::new(RefCell::new(
                        TinjInstance::new(class),
                    )))),

                    _ => unreachable!("non-callable rejected above"),
                }
            }

            Expr::Get { object, name } => {
                let object = self.evaluate(object)?;

                match object {
                    Value::Instance(instance) => TinjInstance::get(&instance, name),

                    _ => Err(TinjError::runtime(
                        name.line,
                        "Only instances have properties.",
                    )),
                }
            }

            Expr::Set {
                object,
                name,
                value,
            } => {
                let object = self.evaluate(object)?;

                match object {
                    Value::Instance(instance) => {
                        let value = self.evaluate(value)?;
                        instance.borrow_mut().set(name, value.clone());
                        Ok(value)
                    }

                    _ => Err(TinjError::runtime(name.line, "Only instances have fields.")),
                }
            }
        }
    }

    fn look_up_variable(&self, name: &Token, id: ExprId) -> Result<Value> {
        match self.locals.get(&id) {
            Some(distance) => {
                Environment::get_at(&self.environment, *distance, &name.lexeme, name.line)
            }
            None => self.globals.borrow().get(&name.lexeme, name.line),
        }
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> Result<Value> {
        let value: Value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::MINUS => match value {
                Value::Number(n) => Ok(Value::Number(-n)),

                // Negating a string reverses it, negating a bool flips it.
                Value::String(s) => Ok(Value::String(s.chars().rev().collect())),

                Value::Bool(b) => Ok(Value::Bool(!b)),

                _ => Err(TinjError::runtime(
                    operator.line,
                    "Invalid operand type for unary -",
                )),
            },

            TokenType::BANG => Ok(Value::Bool(!is_truthy(&value))),

            _ => Err(TinjError::runtime(operator.line, "Invalid unary operator.")),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value> {
        let left_val: Value = self.evaluate(left)?;
        let right_val: Value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::PLUS => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),

                (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),

                _ => Err(TinjError::runtime(
                    operator.line,
                    "Operands must be two numbers or two strings.",
                )),
            },

            TokenType::MINUS => {
                let (a, b) = number_operands(operator, left_val, right_val)?;
                Ok(Value::Number(a - b))
            }

            TokenType::STAR => {
                let (a, b) = number_operands(operator, left_val, right_val)?;
                Ok(Value::Number(a * b))
            }

            TokenType::SLASH => {
                // IEEE float division: x/0 yields an infinity or NaN.
                let (a, b) = number_operands(operator, left_val, right_val)?;
                Ok(Value::Number(a / b))
            }

            TokenType::GREATER => {
                let (a, b) = number_operands(operator, left_val, right_val)?;
                Ok(Value::Bool(a > b))
            }

            TokenType::GREATER_EQUAL => {
                let (a, b) = number_operands(operator, left_val, right_val)?;
                Ok(Value::Bool(a >= b))
            }

            TokenType::LESS => {
                let (a, b) = number_operands(operator, left_val, right_val)?;
                Ok(Value::Bool(a < b))
            }

            TokenType::LESS_EQUAL => {
                let (a, b) = number_operands(operator, left_val, right_val)?;
                Ok(Value::Bool(a <= b))
            }

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(left_val == right_val)),

            TokenType::BANG_EQUAL => Ok(Value::Bool(left_val != right_val)),

            _ => Err(TinjError::runtime(
                operator.line,
                "Invalid binary operator.",
            )),
        }
    }

    fn evaluate_logical(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value> {
        let left_val: Value = self.evaluate(left)?;

        // Short-circuit returns the operand itself, not a coerced bool.
        if operator.token_type == TokenType::OR {
            if is_truthy(&left_val) {
                return Ok(left_val);
            }
        } else if !is_truthy(&left_val) {
            return Ok(left_val);
        }

        self.evaluate(right)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Nil => false,

        Value::Bool(b) => *b,

        _ => true,
    }
}

fn number_operands(operator: &Token, left: Value, right: Value) -> Result<(f64, f64)> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok((a, b)),

        _ => Err(TinjError::runtime(
            operator.line,
            "Operands must be numbers.",
        )),
    }
}

fn unix_time_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs_f64())
        .unwrap_or(0.0)
}

fn clock_native(_args: &[Value]) -> Result<Value> {
    Ok(Value::Number(unix_time_seconds()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nil_and_false_are_falsy() {
        assert!(!is_truthy(&Value::Nil));
        assert!(!is_truthy(&Value::Bool(false)));
    }

    #[test]
    fn everything_else_is_truthy() {
        assert!(is_truthy(&Value::Bool(true)));
        assert!(is_truthy(&Value::Number(0.0)));
        assert!(is_truthy(&Value::String(String::new())));
    }

    #[test]
    fn globals_hold_clock_and_now() {
        let interpreter = Interpreter::new(Vec::new());

        let clock = interpreter.globals.borrow().get("clock", 1).unwrap();
        assert!(matches!(clock, Value::NativeFunction { .. }));

        let now = interpreter.globals.borrow().get("now", 1).unwrap();
        assert!(matches!(now, Value::Number(_)));
    }
}
