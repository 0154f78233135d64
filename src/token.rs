use std::fmt;
use std::mem;

/// Kinds of lexical token, with literal payloads attached to the two
/// literal-carrying kinds.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone)]
pub enum TokenType {
    // Single-character tokens.
    LEFT_PAREN,
    RIGHT_PAREN,
    LEFT_BRACE,
    RIGHT_BRACE,
    COMMA,
    DOT,
    MINUS,
    PLUS,
    SEMICOLON,
    SLASH,
    STAR,

    // One or two character tokens.
    BANG,
    BANG_EQUAL,
    EQUAL,
    EQUAL_EQUAL,
    GREATER,
    GREATER_EQUAL,
    LESS,
    LESS_EQUAL,

    // Literals.
    IDENTIFIER,
    STRING(String),
    NUMBER(f64),

    // Keywords.
    AND,
    CLASS,
    ELSE,
    FALSE,
    FUN,
    FOR,
    IF,
    NIL,
    OR,
    PRINT,
    RETURN,
    SUPER,
    THIS,
    TRUE,
    VAR,
    WHILE,

    EOF,
}

impl PartialEq for TokenType {
    /// Kind-only equality: payloads are ignored so the parser can match on
    /// the token kind without caring which number or string was scanned.
    fn eq(&self, other: &Self) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }
}

impl Eq for TokenType {}

#[derive(Debug, Clone)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    pub line: usize,
}

impl Token {
    pub fn new(token_type: TokenType, lexeme: String, line: usize) -> Self {
        Self {
            token_type,
            lexeme,
            line,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' [line {}]", self.lexeme, self.line)
    }
}

#[cfg(test)]
mod tests {
    use super::TokenType;

    #[test]
    fn equality_ignores_payloads() {
        assert_eq!(TokenType::NUMBER(1.0), TokenType::NUMBER(2.5));
        assert_eq!(
            TokenType::STRING("a".to_string()),
            TokenType::STRING("b".to_string())
        );
        assert_ne!(TokenType::NUMBER(0.0), TokenType::STRING(String::new()));
        assert_eq!(TokenType::EOF, TokenType::EOF);
    }
}
