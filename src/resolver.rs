//! Static resolution pass for the Tinj interpreter.
//!
//! This module performs a single AST walk to:
//! 1. **Build lexical scopes**: maintains a stack of `HashMap<&str,bool>`
//!    tracking declared (false) and fully defined (true) names in each nested
//!    block, function, or class body.
//! 2. **Enforce static rules**: reports errors such as redeclaration in the
//!    same scope, reading a variable in its own initializer, `return` outside
//!    a function, and `this` outside a class.
//! 3. **Record binding distances**: for every variable occurrence
//!    (`Expr::Variable`, `Expr::Assign`, `Expr::This`), records the number of
//!    environment hops from the innermost scope. The evaluator then walks
//!    exactly that many frames instead of searching the whole chain.
//!
//! Errors are reported through the [`Reporter`] and resolution continues, so
//! one pass can surface several problems. The globals are never entered into
//! the scope stack: a name found in no scope resolves at runtime against the
//! global frame.
//!
//! Class bodies open a scope in which `this` is pre-defined, and every method
//! body is resolved as a function inside that scope. References inside
//! methods therefore bind to `this` and to enclosing locals like any other
//! closure would.

use std::collections::HashMap;

use log::{debug, info};

use crate::error::TinjError;
use crate::expr::{Expr, ExprId};
use crate::session::Reporter;
use crate::stmt::Stmt;
use crate::token::Token;

/// Are we inside a user function?  Used to validate `return`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
}

/// Are we inside a class body?  Used to validate `this`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ClassType {
    None,
    Class,
}

pub struct Resolver<'r, 'a> {
    reporter: &'r mut Reporter,
    scopes: Vec<HashMap<&'a str, bool>>, // false=declared, true=defined
    locals: HashMap<ExprId, usize>,
    current_function: FunctionType,
    current_class: ClassType,
}

impl<'r, 'a> Resolver<'r, 'a> {
    pub fn new(reporter: &'r mut Reporter) -> Self {
        info!("Resolver instantiated");
        Resolver {
            reporter,
            scopes: Vec::new(),
            locals: HashMap::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
        }
    }

    /// Walk all top-level statements and return the binding distances found.
    pub fn resolve(mut self, statements: &'a [Stmt]) -> HashMap<ExprId, usize> {
        info!(
            "Beginning resolve pass over {} statement(s)",
            statements.len()
        );

        for stmt in statements {
            self.resolve_stmt(stmt);
        }

        self.locals
    }

    // ─────────────────────────────────────────────────────────────────────
    // Statement resolution
    // ─────────────────────────────────────────────────────────────────────

    fn resolve_stmt(&mut self, stmt: &'a Stmt) {
        match stmt {
            Stmt::Block(statements) => {
                self.begin_scope();

                for s in statements {
                    self.resolve_stmt(s);
                }

                self.end_scope();
            }

            Stmt::Var { name, initializer } => {
                // Declared but not defined while its initializer resolves,
                // so `var a = a;` is caught below.
                self.declare(name);

                if let Some(expr) = initializer {
                    self.resolve_expr(expr);
                }

                self.define(name);
            }

            Stmt::Function(decl) => {
                // Visible inside its own body to allow recursion.
                self.declare(&decl.name);
                self.define(&decl.name);

                self.resolve_function(&decl.params, &decl.body);
            }

            Stmt::Class { name, methods } => {
                self.declare(name);
                self.define(name);

                let enclosing_class = self.current_class;
                self.current_class = ClassType::Class;

                // Implicit `this` scope shared by every method body.
                self.begin_scope();
                if let Some(scope) = self.scopes.last_mut() {
                    scope.insert("this", true);
                }

                for method in methods {
                    self.resolve_function(&method.params, &method.body);
                }

                self.end_scope();

                self.current_class = enclosing_class;
            }

            Stmt::Expression(expr) | Stmt::Print(expr) => {
                self.resolve_expr(expr);
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);

                if let Some(eb) = else_branch.as_deref() {
                    self.resolve_stmt(eb);
                }
            }

            Stmt::While { condition, body } => {
                self.resolve_expr(condition);
                self.resolve_stmt(body);
            }

            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    self.reporter.report(&TinjError::resolve(
                        keyword,
                        "Can't return from top-level code.",
                    ));
                }

                if let Some(expr) = value {
                    self.resolve_expr(expr);
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Expression resolution
    // ─────────────────────────────────────────────────────────────────────

    fn resolve_expr(&mut self, expr: &'a Expr) {
        match expr {
            Expr::Literal(_) => {}

            Expr::Grouping(inner) => {
                self.resolve_expr(inner);
            }

            Expr::Unary { right, .. } => {
                self.resolve_expr(right);
            }

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }

            Expr::Variable { id, name } => {
                if let Some(scope) = self.scopes.last() {
                    if scope.get(name.lexeme.as_str()) == Some(&false) {
                        self.reporter.report(&TinjError::resolve(
                            name,
                            "Can't read local variable in its own initializer.",
                        ));
                    }
                }

                self.resolve_local(*id, name);
            }

            Expr::Assign { id, name, value } => {
                self.resolve_expr(value);
                self.resolve_local(*id, name);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee);

                for arg in arguments {
                    self.resolve_expr(arg);
                }
            }

            Expr::Get { object, .. } => {
                self.resolve_expr(object);
            }

            Expr::Set { object, value, .. } => {
                self.resolve_expr(object);
                self.resolve_expr(value);
            }

            Expr::This { id, keyword } => {
                if self.current_class == ClassType::None {
                    self.reporter.report(&TinjError::resolve(
                        keyword,
                        "Can't use 'this' outside of a class.",
                    ));
                    return;
                }

                self.resolve_local(*id, keyword);
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Function helper
    // ─────────────────────────────────────────────────────────────────────

    /// Enter a fresh scope for a function's parameters and body.
    fn resolve_function(&mut self, params: &'a [Token], body: &'a Stmt) {
        let enclosing = self.current_function;
        self.current_function = FunctionType::Function;

        self.begin_scope();

        for param in params {
            self.declare(param);
            self.define(param);
        }

        self.resolve_stmt(body);

        self.end_scope();

        self.current_function = enclosing;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Scope management
    // ─────────────────────────────────────────────────────────────────────

    #[inline]
    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    #[inline]
    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &'a Token) {
        if let Some(scope) = self.scopes.last_mut() {
            if scope.contains_key(name.lexeme.as_str()) {
                self.reporter.report(&TinjError::resolve(
                    name,
                    "Already a variable with this name in this scope.",
                ));
                return;
            }

            scope.insert(&name.lexeme, false);
        }
    }

    fn define(&mut self, name: &'a Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(&name.lexeme, true);
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Binding-distance helper
    // ─────────────────────────────────────────────────────────────────────

    /// Record this occurrence as a local at the depth of the innermost scope
    /// containing it. Not found in any scope means it is a global and no
    /// entry is recorded.
    fn resolve_local(&mut self, id: ExprId, name: &Token) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(name.lexeme.as_str()) {
                debug!("Resolved '{}' at depth {}", name.lexeme, depth);
                self.locals.insert(id, depth);
                return;
            }
        }

        debug!("Resolved '{}' as global", name.lexeme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::scanner::Scanner;
    use crate::token::Token;

    fn resolve_source(source: &str) -> (HashMap<ExprId, usize>, bool) {
        let tokens: Vec<Token> = Scanner::new(source.as_bytes())
            .filter_map(|result| result.ok())
            .collect();

        let mut reporter = Reporter::new();
        let statements = Parser::new(tokens, 0, &mut reporter).parse();
        assert!(!reporter.had_error(), "test source must parse cleanly");

        let locals = Resolver::new(&mut reporter).resolve(&statements);

        (locals, reporter.had_error())
    }

    #[test]
    fn top_level_return_is_an_error() {
        let (_, had_error) = resolve_source("return 1;");
        assert!(had_error);
    }

    #[test]
    fn return_inside_function_is_fine() {
        let (_, had_error) = resolve_source("fun f() { return 1; }");
        assert!(!had_error);
    }

    #[test]
    fn this_outside_class_is_an_error() {
        let (_, had_error) = resolve_source("print this;");
        assert!(had_error);
    }

    #[test]
    fn this_inside_method_resolves() {
        let (locals, had_error) = resolve_source("class C { m() { return this; } }");
        assert!(!had_error);
        // Two hops out of the method body: block scope, then param scope,
        // then the class-body scope holding `this`.
        assert_eq!(locals.values().collect::<Vec<_>>(), vec![&2]);
    }

    #[test]
    fn reading_local_in_its_own_initializer_is_an_error() {
        let (_, had_error) = resolve_source("{ var a = a; }");
        assert!(had_error);
    }

    #[test]
    fn global_self_reference_is_allowed() {
        let (_, had_error) = resolve_source("var a = 1; var a = a;");
        assert!(!had_error);
    }

    #[test]
    fn duplicate_declaration_in_scope_is_an_error() {
        let (_, had_error) = resolve_source("{ var a = 1; var a = 2; }");
        assert!(had_error);
    }

    #[test]
    fn globals_are_not_recorded() {
        let (locals, had_error) = resolve_source("var a = 1; print a;");
        assert!(!had_error);
        assert!(locals.is_empty());
    }

    #[test]
    fn closure_capture_distance() {
        let source = r#"
            fun make(n) {
                fun add(x) {
                    return x + n;
                }
                return add;
            }
        "#;
        let (locals, had_error) = resolve_source(source);
        assert!(!had_error);

        // `add` is read in the block that declared it (depth 0); `x` sits one
        // hop out of add's body block in the param scope; `n` is three hops
        // out, in make's param scope.
        let mut depths: Vec<usize> = locals.values().copied().collect();
        depths.sort_unstable();
        assert_eq!(depths, vec![0, 1, 3]);
    }
}
