mod span;

pub use span::Span;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::LazyLock;

/// The hashmap for keywords
pub static KEYWORD_HASHMAP: LazyLock<HashMap<&'static str, TokenKind>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    map.insert("and", TokenKind::KeywordAnd);
    map.insert("as", TokenKind::KeywordAs);
    map.insert("case", TokenKind::KeywordCase);
    map.insert("class", TokenKind::KeywordClass);
    map.insert("default", TokenKind::KeywordDefault);
    map.insert("else", TokenKind::KeywordElse);
    map.insert("false", TokenKind::KeywordFalse);
    map.insert("fun", TokenKind::KeywordFun);
    map.insert("if", TokenKind::KeywordIf);
    map.insert("import", TokenKind::KeywordImport);
    map.insert("match", TokenKind::KeywordMatch);
    map.insert("none", TokenKind::KeywordNone);
    map.insert("or", TokenKind::KeywordOr);
    map.insert("return", TokenKind::KeywordReturn);
    map.insert("super", TokenKind::KeywordSuper);
    map.insert("this", TokenKind::KeywordThis);
    map.insert("true", TokenKind::KeywordTrue);
    map.insert("var", TokenKind::KeywordVar);
    map.insert("while", TokenKind::KeywordWhile);
    map
});

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Parentheses
    LeftParenthesis,
    RightParenthesis,
    // Braces
    LeftBrace,
    RightBrace,
    // Brackets
    LeftBracket,
    RightBracket,
    // Miscellaneous
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Colon,
    Star,
    // Operators
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    Slash,

    // Literals
    NumericLiteral,
    StringLiteral,
    Ident,

    // Keywords
    KeywordAnd,
    KeywordAs,
    KeywordCase,
    KeywordClass,
    KeywordDefault,
    KeywordElse,
    KeywordFalse,
    KeywordFun,
    KeywordIf,
    KeywordImport,
    KeywordMatch,
    KeywordNone,
    KeywordOr,
    KeywordReturn,
    KeywordSuper,
    KeywordThis,
    KeywordTrue,
    KeywordVar,
    KeywordWhile,

    // End of file.
    Eof,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TokenKind::LeftParenthesis => "LEFT_PAREN",
            TokenKind::RightParenthesis => "RIGHT_PAREN",
            TokenKind::LeftBrace => "LEFT_BRACE",
            TokenKind::RightBrace => "RIGHT_BRACE",
            TokenKind::LeftBracket => "LEFT_BRACKET",
            TokenKind::RightBracket => "RIGHT_BRACKET",
            TokenKind::Comma => "COMMA",
            TokenKind::Dot => "DOT",
            TokenKind::Minus => "MINUS",
            TokenKind::Plus => "PLUS",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Colon => "COLON",
            TokenKind::Star => "STAR",
            TokenKind::Bang => "BANG",
            TokenKind::BangEqual => "BANG_EQUAL",
            TokenKind::Equal => "EQUAL",
            TokenKind::EqualEqual => "EQUAL_EQUAL",
            TokenKind::LessThan => "LESS",
            TokenKind::LessThanEqual => "LESS_EQUAL",
            TokenKind::GreaterThan => "GREATER",
            TokenKind::GreaterThanEqual => "GREATER_EQUAL",
            TokenKind::Slash => "SLASH",
            TokenKind::NumericLiteral => "NUMBER",
            TokenKind::StringLiteral => "STRING",
            TokenKind::Ident => "IDENTIFIER",
            TokenKind::KeywordAnd => "AND",
            TokenKind::KeywordAs => "AS",
            TokenKind::KeywordCase => "CASE",
            TokenKind::KeywordClass => "CLASS",
            TokenKind::KeywordDefault => "DEFAULT",
            TokenKind::KeywordElse => "ELSE",
            TokenKind::KeywordFalse => "FALSE",
            TokenKind::KeywordFun => "FUN",
            TokenKind::KeywordIf => "IF",
            TokenKind::KeywordImport => "IMPORT",
            TokenKind::KeywordMatch => "MATCH",
            TokenKind::KeywordNone => "NONE",
            TokenKind::KeywordOr => "OR",
            TokenKind::KeywordReturn => "RETURN",
            TokenKind::KeywordSuper => "SUPER",
            TokenKind::KeywordThis => "THIS",
            TokenKind::KeywordTrue => "TRUE",
            TokenKind::KeywordVar => "VAR",
            TokenKind::KeywordWhile => "WHILE",
            TokenKind::Eof => "EOF",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}
