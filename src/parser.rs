use std::rc::Rc;

use log::{debug, info};

use crate::error::{Result, TinjError};
use crate::expr::{Expr, ExprId, LiteralValue};
use crate::session::Reporter;
use crate::stmt::{FunctionDecl, Stmt};
use crate::token::{Token, TokenType};

/// Recursive-descent parser over a scanned token list.
///
/// Grammar notes:
/// - `if` and `while` take a *primary* expression as condition, followed
///   directly by the body statement. Parenthesized conditions still work
///   because `(` opens a grouping primary.
/// - A function body is a single statement, typically a block.
///
/// Syntax errors are reported through the [`Reporter`] as they are found;
/// the top-level declaration loop then resynchronizes at the next statement
/// boundary so several errors can be reported in one pass.
pub struct Parser<'r> {
    tokens: Vec<Token>,
    current: usize,
    next_id: ExprId,
    reporter: &'r mut Reporter,
}

impl<'r> Parser<'r> {
    /// `first_id` seeds the expression-id counter; a session that parses
    /// repeatedly (the REPL) threads it through so ids never collide.
    pub fn new(tokens: Vec<Token>, first_id: ExprId, reporter: &'r mut Reporter) -> Self {
        Parser {
            tokens,
            current: 0,
            next_id: first_id,
            reporter,
        }
    }

    /// The id the next parsed expression would receive.
    pub fn next_id(&self) -> ExprId {
        self.next_id
    }

    pub fn parse(&mut self) -> Vec<Stmt> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        info!("Parsed {} top-level statement(s)", statements.len());

        statements
    }

    // ─────────────────────────────────────────────────────────────────────
    // Statements
    // ─────────────────────────────────────────────────────────────────────

    fn declaration(&mut self) -> Option<Stmt> {
        let result = if self.match_tokens(&[TokenType::VAR]) {
            self.var_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(_) => {
                // Already reported; skip to the next statement boundary.
                self.synchronize();
                None
            }
        }
    }

    fn statement(&mut self) -> Result<Stmt> {
        if self.match_tokens(&[TokenType::CLASS]) {
            return self.class_declaration();
        }
        if self.match_tokens(&[TokenType::FUN]) {
            return Ok(Stmt::Function(self.function("function")?));
        }
        if self.match_tokens(&[TokenType::FOR]) {
            return self.for_statement();
        }
        if self.match_tokens(&[TokenType::IF]) {
            return self.if_statement();
        }
        if self.match_tokens(&[TokenType::PRINT]) {
            return self.print_statement();
        }
        if self.match_tokens(&[TokenType::RETURN]) {
            return self.return_statement();
        }
        if self.match_tokens(&[TokenType::WHILE]) {
            return self.while_statement();
        }
        if self.match_tokens(&[TokenType::LEFT_BRACE]) {
            return Ok(Stmt::Block(self.block()?));
        }

        self.expression_statement()
    }

    fn class_declaration(&mut self) -> Result<Stmt> {
        let name = self.consume(TokenType::IDENTIFIER, "Expect class name.")?;
        self.consume(TokenType::LEFT_BRACE, "Expect '{' before class body.")?;

        let mut methods = Vec::new();
        while !self.check(&TokenType::RIGHT_BRACE) && !self.is_at_end() {
            methods.push(self.function("method")?);
        }

        self.consume(TokenType::RIGHT_BRACE, "Expect '}' after class body.")?;

        Ok(Stmt::Class { name, methods })
    }

    /// Desugars `for` into an initializer block wrapping a `while` whose body
    /// runs the original body then the increment.
    fn for_statement(&mut self) -> Result<Stmt> {
        self.consume(TokenType::LEFT_PAREN, "Expect '(' after 'for'.")?;

        let initializer = if self.match_tokens(&[TokenType::SEMICOLON]) {
            None
        } else if self.match_tokens(&[TokenType::VAR]) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if !self.check(&TokenType::SEMICOLON) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenType::SEMICOLON, "Expect ';' after loop condition.")?;

        let increment = if !self.check(&TokenType::RIGHT_PAREN) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenType::RIGHT_PAREN, "Expect ')' after for clauses.")?;

        let mut body = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::Expression(increment)]);
        }

        let condition = condition.unwrap_or(Expr::Literal(LiteralValue::Bool(true)));
        body = Stmt::While {
            condition,
            body: Box::new(body),
        };

        if let Some(initializer) = initializer {
            body = Stmt::Block(vec![initializer, body]);
        }

        Ok(body)
    }

    fn if_statement(&mut self) -> Result<Stmt> {
        // A primary condition cannot swallow the branch statement.
        let condition = self.primary()?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.match_tokens(&[TokenType::ELSE]) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn print_statement(&mut self) -> Result<Stmt> {
        let value = self.expression()?;
        self.consume(TokenType::SEMICOLON, "Expect ';' after value.")?;
        Ok(Stmt::Print(value))
    }

    fn return_statement(&mut self) -> Result<Stmt> {
        let keyword = self.previous().clone();

        let value = if !self.check(&TokenType::SEMICOLON) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(TokenType::SEMICOLON, "Expect ';' after return value.")?;

        Ok(Stmt::Return { keyword, value })
    }

    fn var_declaration(&mut self) -> Result<Stmt> {
        let name = self.consume(TokenType::IDENTIFIER, "Expect variable name.")?;

        let initializer = if self.match_tokens(&[TokenType::EQUAL]) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(
            TokenType::SEMICOLON,
            "Expect ';' after variable declaration.",
        )?;

        Ok(Stmt::Var { name, initializer })
    }

    fn while_statement(&mut self) -> Result<Stmt> {
        let condition = self.primary()?;
        let body = Box::new(self.statement()?);

        Ok(Stmt::While { condition, body })
    }

    fn expression_statement(&mut self) -> Result<Stmt> {
        let expr = self.expression()?;
        self.consume(TokenType::SEMICOLON, "Expect ';' after expression.")?;
        Ok(Stmt::Expression(expr))
    }

    fn function(&mut self, kind: &str) -> Result<Rc<FunctionDecl>> {
        let name = self.consume(TokenType::IDENTIFIER, &format!("Expect {} name.", kind))?;
        self.consume(
            TokenType::LEFT_PAREN,
            &format!("Expect '(' after {} name.", kind),
        )?;

        let mut params = Vec::new();
        if !self.check(&TokenType::RIGHT_PAREN) {
            loop {
                if params.len() >= 255 {
                    let token = self.peek().clone();
                    self.error(&token, "Can't have more than 255 parameters.");
                }

                params.push(self.consume(TokenType::IDENTIFIER, "Expect parameter name.")?);

                if !self.match_tokens(&[TokenType::COMMA]) {
                    break;
                }
            }
        }
        self.consume(TokenType::RIGHT_PAREN, "Expect ')' after parameters.")?;

        let body = self.statement()?;

        Ok(Rc::new(FunctionDecl { name, params, body }))
    }

    fn block(&mut self) -> Result<Vec<Stmt>> {
        let mut statements = Vec::new();

        while !self.check(&TokenType::RIGHT_BRACE) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        self.consume(TokenType::RIGHT_BRACE, "Expect '}' after block.")?;

        Ok(statements)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Expressions, lowest to highest precedence
    // ─────────────────────────────────────────────────────────────────────

    fn expression(&mut self) -> Result<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr> {
        let expr = self.or()?;

        if self.match_tokens(&[TokenType::EQUAL]) {
            let equals = self.previous().clone();
            let value = self.assignment()?;

            return Ok(match expr {
                Expr::Variable { name, .. } => Expr::Assign {
                    id: self.fresh_id(),
                    name,
                    value: Box::new(value),
                },

                Expr::Get { object, name } => Expr::Set {
                    object,
                    name,
                    value: Box::new(value),
                },

                other => {
                    // Reported but not raised: the l-value is kept as parsed.
                    self.error(&equals, "Invalid assignment target.");
                    other
                }
            });
        }

        Ok(expr)
    }

    fn or(&mut self) -> Result<Expr> {
        let mut expr = self.and()?;

        while self.match_tokens(&[TokenType::OR]) {
            let operator = self.previous().clone();
            let right = self.and()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn and(&mut self) -> Result<Expr> {
        let mut expr = self.equality()?;

        while self.match_tokens(&[TokenType::AND]) {
            let operator = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr> {
        let mut expr = self.comparison()?;

        while self.match_tokens(&[TokenType::BANG_EQUAL, TokenType::EQUAL_EQUAL]) {
            let operator = self.previous().clone();
            let right = self.comparison()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr> {
        let mut expr = self.term()?;

        while self.match_tokens(&[
            TokenType::GREATER,
            TokenType::GREATER_EQUAL,
            TokenType::LESS,
            TokenType::LESS_EQUAL,
        ]) {
            let operator = self.previous().clone();
            let right = self.term()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr> {
        let mut expr = self.factor()?;

        while self.match_tokens(&[TokenType::MINUS, TokenType::PLUS]) {
            let operator = self.previous().clone();
            let right = self.factor()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr> {
        let mut expr = self.unary()?;

        while self.match_tokens(&[TokenType::SLASH, TokenType::STAR]) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr> {
        if self.match_tokens(&[TokenType::BANG, TokenType::MINUS]) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            return Ok(Expr::Unary {
                operator,
                right: Box::new(right),
            });
        }

        self.call()
    }

    fn call(&mut self) -> Result<Expr> {
        let mut expr = self.primary()?;

        loop {
            if self.match_tokens(&[TokenType::LEFT_PAREN]) {
                expr = self.finish_call(expr)?;
            } else if self.match_tokens(&[TokenType::DOT]) {
                let name =
                    self.consume(TokenType::IDENTIFIER, "Expect property name after '.'.")?;
                expr = Expr::Get {
                    object: Box::new(expr),
                    name,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> Result<Expr> {
        let mut arguments = Vec::new();

        if !self.check(&TokenType::RIGHT_PAREN) {
            loop {
                if arguments.len() >= 255 {
                    let token = self.peek().clone();
                    self.error(&token, "Can't have more than 255 arguments.");
                }

                arguments.push(self.expression()?);

                if !self.match_tokens(&[TokenType::COMMA]) {
                    break;
                }
            }
        }

        let paren = self.consume(TokenType::RIGHT_PAREN, "Expect ')' after arguments.")?;

        Ok(Expr::Call {
            callee: Box::new(callee),
            paren,
            arguments,
        })
    }

    fn primary(&mut self) -> Result<Expr> {
        if self.match_tokens(&[TokenType::FALSE]) {
            return Ok(Expr::Literal(LiteralValue::Bool(false)));
        }
        if self.match_tokens(&[TokenType::TRUE]) {
            return Ok(Expr::Literal(LiteralValue::Bool(true)));
        }
        if self.match_tokens(&[TokenType::NIL]) {
            return Ok(Expr::Literal(LiteralValue::Nil));
        }

        if self.match_tokens(&[TokenType::THIS]) {
            return Ok(Expr::This {
                id: self.fresh_id(),
                keyword: self.previous().clone(),
            });
        }

        if self.match_tokens(&[TokenType::IDENTIFIER]) {
            return Ok(Expr::Variable {
                id: self.fresh_id(),
                name: self.previous().clone(),
            });
        }

        if self.match_tokens(&[TokenType::NUMBER(0.0), TokenType::STRING(String::new())]) {
            let literal = match &self.previous().token_type {
                TokenType::NUMBER(n) => LiteralValue::Number(*n),
                TokenType::STRING(s) => LiteralValue::String(s.clone()),
                _ => unreachable!("matched a literal token"),
            };
            return Ok(Expr::Literal(literal));
        }

        if self.match_tokens(&[TokenType::LEFT_PAREN]) {
            let expr = self.expression()?;
            self.consume(TokenType::RIGHT_PAREN, "Expect ')' after expression.")?;
            return Ok(Expr::Grouping(Box::new(expr)));
        }

        let token = self.peek().clone();
        Err(self.error(&token, "Expect expression."))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Cursor helpers
    // ─────────────────────────────────────────────────────────────────────

    fn match_tokens(&mut self, types: &[TokenType]) -> bool {
        for token_type in types {
            if self.check(token_type) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn consume(&mut self, token_type: TokenType, message: &str) -> Result<Token> {
        if self.check(&token_type) {
            return Ok(self.advance().clone());
        }

        let token = self.peek().clone();
        Err(self.error(&token, message))
    }

    fn check(&self, token_type: &TokenType) -> bool {
        if self.is_at_end() {
            return false;
        }
        &self.peek().token_type == token_type
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::EOF
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn fresh_id(&mut self) -> ExprId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Report a syntax error at `token` and hand back the signal for the
    /// caller to raise (or drop, for non-fatal errors).
    fn error(&mut self, token: &Token, message: &str) -> TinjError {
        let err = TinjError::parse(token, message);
        self.reporter.report(&err);
        err
    }

    /// Panic-mode recovery: skip tokens until just past a `;` or at a token
    /// that can begin a statement.
    fn synchronize(&mut self) {
        debug!("Synchronizing parser at line {}", self.peek().line);

        self.advance();

        while !self.is_at_end() {
            if self.previous().token_type == TokenType::SEMICOLON {
                return;
            }

            match self.peek().token_type {
                TokenType::CLASS
                | TokenType::FUN
                | TokenType::VAR
                | TokenType::FOR
                | TokenType::IF
                | TokenType::WHILE
                | TokenType::PRINT
                | TokenType::RETURN => return,

                _ => {}
            }

            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Scanner;

    fn parse_source(source: &str) -> (Vec<Stmt>, bool) {
        let tokens: Vec<Token> = Scanner::new(source.as_bytes())
            .filter_map(|result| result.ok())
            .collect();

        let mut reporter = Reporter::new();
        let mut parser = Parser::new(tokens, 0, &mut reporter);
        let statements = parser.parse();

        (statements, reporter.had_error())
    }

    #[test]
    fn for_desugars_to_while_in_blocks() {
        let (statements, had_error) = parse_source("for (var i = 0; i < 3; i = i + 1) print i;");
        assert!(!had_error);
        assert_eq!(statements.len(), 1);

        // Outer block: initializer then while.
        let outer = match &statements[0] {
            Stmt::Block(stmts) => stmts,
            other => panic!("expected block, got {:?}", other),
        };
        assert!(matches!(outer[0], Stmt::Var { .. }));

        let (condition, body) = match &outer[1] {
            Stmt::While { condition, body } => (condition, body),
            other => panic!("expected while, got {:?}", other),
        };
        assert!(matches!(condition, Expr::Binary { .. }));

        // Inner block: original body then the increment.
        let inner = match body.as_ref() {
            Stmt::Block(stmts) => stmts,
            other => panic!("expected block body, got {:?}", other),
        };
        assert!(matches!(inner[0], Stmt::Print(_)));
        assert!(matches!(inner[1], Stmt::Expression(Expr::Assign { .. })));
    }

    #[test]
    fn for_without_condition_loops_on_true() {
        let (statements, had_error) = parse_source("for (;;) print 1;");
        assert!(!had_error);

        assert!(matches!(
            &statements[0],
            Stmt::While {
                condition: Expr::Literal(LiteralValue::Bool(true)),
                ..
            }
        ));
    }

    #[test]
    fn if_condition_is_a_primary() {
        let (statements, had_error) = parse_source("if (1 < 2) print \"yes\"; else print \"no\";");
        assert!(!had_error);

        match &statements[0] {
            Stmt::If {
                condition,
                else_branch,
                ..
            } => {
                assert!(matches!(condition, Expr::Grouping(_)));
                assert!(else_branch.is_some());
            }
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn invalid_assignment_target_reports_without_bailing() {
        let (statements, had_error) = parse_source("1 = 2; print 3;");
        assert!(had_error);
        // Both statements still come back; the bad one keeps its l-value.
        assert_eq!(statements.len(), 2);
    }

    #[test]
    fn get_becomes_set_on_assignment() {
        let (statements, had_error) = parse_source("obj.field = 1;");
        assert!(!had_error);
        assert!(matches!(
            &statements[0],
            Stmt::Expression(Expr::Set { .. })
        ));
    }

    #[test]
    fn parser_recovers_at_statement_boundaries() {
        let (statements, had_error) = parse_source("var = 1; print 2;");
        assert!(had_error);
        assert_eq!(statements.len(), 1);
        assert!(matches!(statements[0], Stmt::Print(_)));
    }

    #[test]
    fn class_with_methods() {
        let (statements, had_error) = parse_source("class Greeter { greet() { print \"hi\"; } }");
        assert!(!had_error);

        match &statements[0] {
            Stmt::Class { name, methods } => {
                assert_eq!(name.lexeme, "Greeter");
                assert_eq!(methods.len(), 1);
                assert_eq!(methods[0].name.lexeme, "greet");
            }
            other => panic!("expected class, got {:?}", other),
        }
    }

    #[test]
    fn call_and_property_chains() {
        let (statements, had_error) = parse_source("a.b(1, 2).c;");
        assert!(!had_error);

        match &statements[0] {
            Stmt::Expression(Expr::Get { object, name }) => {
                assert_eq!(name.lexeme, "c");
                assert!(matches!(object.as_ref(), Expr::Call { .. }));
            }
            other => panic!("expected get, got {:?}", other),
        }
    }

    #[test]
    fn expression_ids_are_unique() {
        let (statements, _) = parse_source("a; a; a = b;");

        let mut ids = Vec::new();
        for stmt in &statements {
            if let Stmt::Expression(expr) = stmt {
                match expr {
                    Expr::Variable { id, .. } | Expr::Assign { id, .. } => ids.push(*id),
                    _ => {}
                }
            }
        }

        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }
}
