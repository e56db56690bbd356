mod cursor;
mod error;
pub mod formatter;
mod token;

use cursor::Cursor;
pub use error::{LexicalError, LexicalErrorKind};
use std::{ops::Range, rc::Rc};
pub use token::{Span, Token, TokenKind, KEYWORD_HASHMAP};

/// Byte ranges of every line in a source text, used to turn spans into line numbers.
#[derive(Debug, Clone)]
pub struct LineBreaks {
    line_breaks: Rc<[Range<usize>]>,
}

impl LineBreaks {
    pub fn new(text: &str) -> Self {
        let line_breaks = if !text.is_empty() {
            let mut line_breaks = Vec::new();
            let mut cursor = 0;
            for (offset, byte) in text.bytes().enumerate() {
                let offset = offset + 1;
                if byte == b'\n' {
                    line_breaks.push(cursor..offset);
                    cursor = offset;
                }
            }
            if !text.ends_with('\n') {
                line_breaks.push(cursor..text.len() + 1);
            }
            line_breaks
        } else {
            vec![0..1]
        };
        Self {
            line_breaks: line_breaks.into(),
        }
    }

    pub fn get_max_line(&self) -> u32 {
        self.line_breaks.len() as u32
    }

    pub fn get_line(&self, offset: usize) -> u32 {
        self.line_breaks
            .binary_search_by(|r| {
                if offset < r.start {
                    std::cmp::Ordering::Greater
                } else if offset >= r.end {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .map(|v| (v + 1) as u32)
            .unwrap_or(self.get_max_line())
    }

    pub fn get_line_from_span(&self, span: Span) -> u32 {
        self.get_line(span.start as usize)
    }
}

#[derive(Debug)]
pub struct Lexer<'src> {
    source: &'src str,
    cursor: Cursor<'src>,
    line_breaks: LineBreaks,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            cursor: Cursor::new(source),
            line_breaks: LineBreaks::new(source),
        }
    }

    pub fn get_source(&self) -> &'src str {
        self.source
    }

    pub fn get_line_breaks(&self) -> LineBreaks {
        self.line_breaks.clone()
    }

    pub fn get_lexeme(&self, span: &Span) -> Option<&'src str> {
        self.source.get(span.range())
    }
}

impl<'src> Lexer<'src> {
    pub fn next_token(&mut self) -> Result<Token, LexicalError> {
        self.skip_trivia();

        let start = self.cursor.offset();
        let Some(c) = self.cursor.advance() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                span: Span::new(start, start),
            });
        };

        let kind = match c {
            // Single character tokens
            '(' => TokenKind::LeftParenthesis,
            ')' => TokenKind::RightParenthesis,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            '-' => TokenKind::Minus,
            '+' => TokenKind::Plus,
            ';' => TokenKind::Semicolon,
            ':' => TokenKind::Colon,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            // One or two character tokens
            '!' => self.either('=', TokenKind::BangEqual, TokenKind::Bang),
            '=' => self.either('=', TokenKind::EqualEqual, TokenKind::Equal),
            '<' => self.either('=', TokenKind::LessThanEqual, TokenKind::LessThan),
            '>' => self.either('=', TokenKind::GreaterThanEqual, TokenKind::GreaterThan),
            // Literals
            '"' => return self.lex_string(start),
            '0'..='9' => self.lex_number(),
            // Identifier/keyword token
            'a'..='z' | 'A'..='Z' | '_' => self.lex_ident_or_keyword(start),
            c => {
                return Err(LexicalError {
                    kind: LexicalErrorKind::Unrecognized(c),
                    span: Span::new(start, self.cursor.offset()),
                })
            }
        };

        Ok(Token {
            kind,
            span: Span::new(start, self.cursor.offset()),
        })
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.cursor.peek() {
                Some(c) if c.is_whitespace() => {
                    self.cursor.advance();
                }
                Some('/') if self.cursor.peek_next() == Some('/') => {
                    self.cursor.eat_while(|c| c != '\n');
                }
                _ => break,
            }
        }
    }

    fn either(&mut self, next: char, matched: TokenKind, unmatched: TokenKind) -> TokenKind {
        if self.cursor.eat_if(next) {
            matched
        } else {
            unmatched
        }
    }

    fn lex_string(&mut self, start: usize) -> Result<Token, LexicalError> {
        self.cursor.eat_while(|c| c != '"');
        if self.cursor.eat_if('"') {
            Ok(Token {
                kind: TokenKind::StringLiteral,
                span: Span::new(start, self.cursor.offset()),
            })
        } else {
            Err(LexicalError {
                kind: LexicalErrorKind::UnclosedString,
                span: Span::new(start, self.cursor.offset()),
            })
        }
    }

    fn lex_number(&mut self) -> TokenKind {
        self.cursor.eat_while(|c| c.is_ascii_digit());
        let has_fraction = self.cursor.peek() == Some('.')
            && self
                .cursor
                .peek_next()
                .is_some_and(|c| c.is_ascii_digit());
        if has_fraction {
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_digit());
        }
        TokenKind::NumericLiteral
    }

    fn lex_ident_or_keyword(&mut self, start: usize) -> TokenKind {
        self.cursor
            .eat_while(|c| c.is_ascii_alphanumeric() || c == '_');
        let lexeme = &self.source[start..self.cursor.offset()];
        KEYWORD_HASHMAP
            .get(lexeme)
            .cloned()
            .unwrap_or(TokenKind::Ident)
    }
}
