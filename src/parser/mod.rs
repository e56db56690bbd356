mod error;
pub mod expression;
pub mod formatter;
mod program;
pub mod statement;

pub use error::{ParserError, ParserErrorKind};
pub use program::Program;

use crate::{
    lexer::{LexicalError, LineBreaks, Lexer, Span, Token, TokenKind},
    string::Ident,
};
use expression::{
    Expression, ExpressionAtom, ExpressionAtomKind, ExpressionNode, ExpressionNodeRef,
    IncompleteExpression, InfixAssignmentOperator, InfixOperator, InfixShortCircuitOperator,
    PostfixOperator, PrefixOperator,
};
use statement::{
    BlockStatement, ClassDecl, ExpressionStatement, FunctionDecl, IfStatement, ImportStatement,
    MatchCase, MatchPattern, MatchStatement, PatternLiteral, ReturnStatement, Statement,
    VariableDecl, WhileStatement,
};
use std::rc::Rc;

const MAX_PARAMETERS: usize = 255;
const LEXEME_MSG: &str = "Lexed tokens have valid spans.";
const ROOT_MSG: &str = "The root was pushed into the same tree.";

pub struct Parser<'src> {
    lexer: Lexer<'src>,
    lookahead: Option<Token>,
    errors: Vec<ParserError>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            lexer: Lexer::new(source),
            lookahead: None,
            errors: Vec::new(),
        }
    }

    pub fn get_source(&self) -> &'src str {
        self.lexer.get_source()
    }

    pub fn get_line_breaks(&self) -> LineBreaks {
        self.lexer.get_line_breaks()
    }

    /// Pulls the next valid token out of the lexer, recording lexical errors on the way.
    fn advance_lexer(&mut self) -> Token {
        loop {
            match self.lexer.next_token() {
                Ok(token) => return token,
                Err(error) => self.record_lexical_error(error),
            }
        }
    }

    fn record_lexical_error(&mut self, error: LexicalError) {
        self.errors.push(error.into());
    }

    fn peek(&mut self) -> Token {
        match self.lookahead {
            Some(token) => token,
            None => {
                let token = self.advance_lexer();
                self.lookahead = Some(token);
                token
            }
        }
    }

    fn next_token(&mut self) -> Token {
        match self.lookahead.take() {
            Some(token) => token,
            None => self.advance_lexer(),
        }
    }

    fn check(&mut self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn eat_if(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.next_token())
        } else {
            None
        }
    }

    fn expect(&mut self, kind: TokenKind, message: &'static str) -> Result<Token, ParserError> {
        let token = self.peek();
        if token.kind == kind {
            Ok(self.next_token())
        } else {
            Err(Self::error_at(token, ParserErrorKind::UnexpectedToken(message)))
        }
    }

    fn expect_ident(&mut self, message: &'static str) -> Result<Ident, ParserError> {
        let token = self.expect(TokenKind::Ident, message)?;
        Ok(self.make_ident(&token))
    }

    fn make_ident(&self, token: &Token) -> Ident {
        let lexeme = self.lexer.get_lexeme(&token.span).expect(LEXEME_MSG);
        Ident::new(lexeme, token.span)
    }

    fn error_at(token: Token, kind: ParserErrorKind) -> ParserError {
        ParserError {
            kind,
            span: token.span,
            token: token.kind,
        }
    }

    /// Skips tokens until a likely statement boundary.
    fn synchronize(&mut self) {
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::Eof => return,
                TokenKind::Semicolon => {
                    self.next_token();
                    return;
                }
                TokenKind::KeywordClass
                | TokenKind::KeywordFun
                | TokenKind::KeywordVar
                | TokenKind::KeywordIf
                | TokenKind::KeywordWhile
                | TokenKind::KeywordReturn
                | TokenKind::KeywordImport
                | TokenKind::KeywordMatch => return,
                _ => {
                    self.next_token();
                }
            }
        }
    }
}

// Pratt parser for expressions
impl<'src> Parser<'src> {
    pub fn parse_expression(&mut self) -> Result<Expression, ParserError> {
        let mut tree = IncompleteExpression::new();
        let root = self.parse_expression_pratt(0, &mut tree)?;
        Ok(tree.finish(root).expect(ROOT_MSG))
    }

    fn peek_infix_operator(&mut self) -> Option<InfixOperator> {
        match self.peek().kind {
            TokenKind::Plus => Some(InfixOperator::Add),
            TokenKind::Minus => Some(InfixOperator::Subtract),
            TokenKind::Star => Some(InfixOperator::Multiply),
            TokenKind::Slash => Some(InfixOperator::Divide),
            TokenKind::LessThan => Some(InfixOperator::LessThan),
            TokenKind::LessThanEqual => Some(InfixOperator::LessThanEqual),
            TokenKind::GreaterThan => Some(InfixOperator::GreaterThan),
            TokenKind::GreaterThanEqual => Some(InfixOperator::GreaterThanEqual),
            TokenKind::EqualEqual => Some(InfixOperator::EqualEqual),
            TokenKind::BangEqual => Some(InfixOperator::BangEqual),
            _ => None,
        }
    }

    fn peek_short_circuit_operator(&mut self) -> Option<InfixShortCircuitOperator> {
        match self.peek().kind {
            TokenKind::KeywordAnd => Some(InfixShortCircuitOperator::And),
            TokenKind::KeywordOr => Some(InfixShortCircuitOperator::Or),
            _ => None,
        }
    }

    fn peek_postfix_operator(&mut self) -> Option<PostfixOperator> {
        match self.peek().kind {
            TokenKind::LeftParenthesis => Some(PostfixOperator::Call),
            TokenKind::Dot => Some(PostfixOperator::Access),
            TokenKind::LeftBracket => Some(PostfixOperator::Index),
            _ => None,
        }
    }

    fn push_atom(tree: &mut IncompleteExpression, kind: ExpressionAtomKind, span: Span) -> ExpressionNodeRef {
        tree.push(ExpressionNode::Atom(ExpressionAtom { kind, span }), span)
    }

    fn expect_left_expression(
        &mut self,
        tree: &mut IncompleteExpression,
    ) -> Result<ExpressionNodeRef, ParserError> {
        let token = self.peek();
        let lexeme = self.lexer.get_lexeme(&token.span).expect(LEXEME_MSG);

        let node = match token.kind {
            TokenKind::NumericLiteral => {
                self.next_token();
                let value = lexeme
                    .parse()
                    .expect("Numeric literal tokens are valid `f64`.");
                Self::push_atom(tree, ExpressionAtomKind::Number(value), token.span)
            }
            TokenKind::StringLiteral => {
                self.next_token();
                let value = &lexeme[1..lexeme.len() - 1];
                Self::push_atom(tree, ExpressionAtomKind::StringLiteral(value.into()), token.span)
            }
            TokenKind::Ident => {
                self.next_token();
                let ident = Ident::new(lexeme, token.span);
                Self::push_atom(tree, ExpressionAtomKind::Identifier(ident), token.span)
            }
            TokenKind::KeywordNone => {
                self.next_token();
                Self::push_atom(tree, ExpressionAtomKind::None, token.span)
            }
            TokenKind::KeywordTrue => {
                self.next_token();
                Self::push_atom(tree, ExpressionAtomKind::Bool(true), token.span)
            }
            TokenKind::KeywordFalse => {
                self.next_token();
                Self::push_atom(tree, ExpressionAtomKind::Bool(false), token.span)
            }
            TokenKind::KeywordThis => {
                self.next_token();
                Self::push_atom(tree, ExpressionAtomKind::This, token.span)
            }
            TokenKind::KeywordSuper => {
                self.next_token();
                self.expect(TokenKind::Dot, "Expect '.' after 'super'.")?;
                let method = self.expect_ident("Expect superclass method name.")?;
                let span = token.span.merge(&method.span);
                Self::push_atom(tree, ExpressionAtomKind::Super(method), span)
            }
            // Unary operators
            TokenKind::Minus | TokenKind::Bang => {
                self.next_token();
                let operator = if token.kind == TokenKind::Minus {
                    PrefixOperator::Minus
                } else {
                    PrefixOperator::Bang
                };
                let rhs = self.parse_expression_pratt(operator.get_binding_power(), tree)?;
                tree.push(ExpressionNode::Prefix { operator, rhs }, token.span)
            }
            // Bracketed expression
            TokenKind::LeftParenthesis => {
                self.next_token();
                let inner = self.parse_expression_pratt(0, tree)?;
                self.expect(TokenKind::RightParenthesis, "Expect ')' after expression.")?;
                tree.push(ExpressionNode::Group { inner }, token.span)
            }
            // List literal
            TokenKind::LeftBracket => {
                self.next_token();
                let mut elements = Vec::new();
                if !self.check(TokenKind::RightBracket) {
                    loop {
                        elements.push(self.parse_expression_pratt(0, tree)?);
                        if self.eat_if(TokenKind::Comma).is_none() {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RightBracket, "Expect ']' after list elements.")?;
                tree.push(ExpressionNode::List { elements }, token.span)
            }
            // Anonymous function
            TokenKind::KeywordFun => {
                self.next_token();
                let decl = self.parse_function_rest(None, token.span)?;
                tree.push(ExpressionNode::Function(Rc::new(decl)), token.span)
            }
            _ => return Err(Self::error_at(token, ParserErrorKind::NonExpression)),
        };
        Ok(node)
    }

    fn parse_expression_pratt(
        &mut self,
        min_bp: u8,
        tree: &mut IncompleteExpression,
    ) -> Result<ExpressionNodeRef, ParserError> {
        let lhs = self.expect_left_expression(tree)?;
        self.parse_expression_rest(lhs, min_bp, tree)
    }

    /// Continues an expression whose leftmost operand has already been parsed.
    fn parse_expression_rest(
        &mut self,
        mut lhs: ExpressionNodeRef,
        min_bp: u8,
        tree: &mut IncompleteExpression,
    ) -> Result<ExpressionNodeRef, ParserError> {
        loop {
            if let Some(operator) = self.peek_postfix_operator() {
                if operator.get_binding_power() < min_bp {
                    break;
                }
                lhs = self.parse_postfix(operator, lhs, tree)?;
                continue;
            }

            if let Some(operator) = self.peek_infix_operator() {
                let (lbp, rbp) = operator.get_binding_power();
                if lbp < min_bp {
                    break;
                }
                let token = self.next_token();
                let rhs = self.parse_expression_pratt(rbp, tree)?;
                lhs = tree.push(ExpressionNode::Infix { operator, lhs, rhs }, token.span);
                continue;
            }

            if let Some(operator) = self.peek_short_circuit_operator() {
                let (lbp, rbp) = operator.get_binding_power();
                if lbp < min_bp {
                    break;
                }
                let token = self.next_token();
                let rhs = self.parse_expression_pratt(rbp, tree)?;
                lhs = tree.push(
                    ExpressionNode::InfixShortCircuit { operator, lhs, rhs },
                    token.span,
                );
                continue;
            }

            if self.check(TokenKind::Equal) {
                let (lbp, rbp) = InfixAssignmentOperator::Assign.get_binding_power();
                if lbp < min_bp {
                    break;
                }
                let equals = self.next_token();
                let value = self.parse_expression_pratt(rbp, tree)?;
                lhs = self.make_assignment(equals, lhs, value, tree)?;
                continue;
            }

            break;
        }
        Ok(lhs)
    }

    fn parse_postfix(
        &mut self,
        operator: PostfixOperator,
        lhs: ExpressionNodeRef,
        tree: &mut IncompleteExpression,
    ) -> Result<ExpressionNodeRef, ParserError> {
        let opening = self.next_token();
        match operator {
            PostfixOperator::Call => {
                let mut arguments = Vec::new();
                if !self.check(TokenKind::RightParenthesis) {
                    loop {
                        if arguments.len() >= MAX_PARAMETERS {
                            let token = self.peek();
                            return Err(Self::error_at(token, ParserErrorKind::TooManyArguments));
                        }
                        arguments.push(self.parse_expression_pratt(0, tree)?);
                        if self.eat_if(TokenKind::Comma).is_none() {
                            break;
                        }
                    }
                }
                let closing =
                    self.expect(TokenKind::RightParenthesis, "Expect ')' after arguments.")?;
                Ok(tree.push(
                    ExpressionNode::Call {
                        callee: lhs,
                        arguments,
                    },
                    closing.span,
                ))
            }
            PostfixOperator::Access => {
                let name = self.expect_ident("Expect property name after '.'.")?;
                let span = name.span;
                Ok(tree.push(ExpressionNode::Get { object: lhs, name }, span))
            }
            PostfixOperator::Index => {
                let index = self.parse_expression_pratt(0, tree)?;
                self.expect(TokenKind::RightBracket, "Expect ']' after index.")?;
                Ok(tree.push(ExpressionNode::Index { object: lhs, index }, opening.span))
            }
        }
    }

    fn make_assignment(
        &mut self,
        equals: Token,
        target: ExpressionNodeRef,
        value: ExpressionNodeRef,
        tree: &mut IncompleteExpression,
    ) -> Result<ExpressionNodeRef, ParserError> {
        let target_span = tree.get_span(target).unwrap_or(equals.span);
        let node = match tree.get_node(target) {
            Some(ExpressionNode::Atom(ExpressionAtom {
                kind: ExpressionAtomKind::Identifier(name),
                ..
            })) => ExpressionNode::InfixAssignment {
                lhs: name.clone(),
                rhs: value,
            },
            Some(ExpressionNode::Get { object, name }) => ExpressionNode::Set {
                object: *object,
                name: name.clone(),
                value,
            },
            Some(ExpressionNode::Index { object, index }) => ExpressionNode::SetIndex {
                object: *object,
                index: *index,
                value,
            },
            _ => {
                return Err(Self::error_at(
                    equals,
                    ParserErrorKind::InvalidAssignmentTarget,
                ))
            }
        };
        Ok(tree.push(node, target_span))
    }
}

// Parse program/statements
impl<'src> Parser<'src> {
    /// Parses a whole source text, collecting every error encountered along the way.
    pub fn parse(&mut self) -> Result<Program, Vec<ParserError>> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::Eof) {
            if let Some(statement) = self.parse_declaration() {
                statements.push(statement);
            }
        }

        if self.errors.is_empty() {
            Ok(Program::new(statements))
        } else {
            Err(std::mem::take(&mut self.errors))
        }
    }

    fn parse_declaration(&mut self) -> Option<Statement> {
        match self.parse_declaration_inner() {
            Ok(statement) => Some(statement),
            Err(error) => {
                self.errors.push(error);
                self.synchronize();
                None
            }
        }
    }

    fn parse_declaration_inner(&mut self) -> Result<Statement, ParserError> {
        let token = self.peek();
        match token.kind {
            TokenKind::KeywordVar => self.parse_variable_decl(),
            TokenKind::KeywordClass => self.parse_class_decl(),
            TokenKind::KeywordImport => self.parse_import(),
            TokenKind::KeywordFun => {
                self.next_token();
                if self.check(TokenKind::Ident) {
                    let name = self.expect_ident("Expect function name.")?;
                    let decl = self.parse_function_rest(Some(name), token.span)?;
                    Ok(Statement::FunctionDecl(Rc::new(decl)))
                } else {
                    // A function literal in statement position, e.g. `fun () {}();`
                    let decl = self.parse_function_rest(None, token.span)?;
                    let mut tree = IncompleteExpression::new();
                    let lhs = tree.push(ExpressionNode::Function(Rc::new(decl)), token.span);
                    let root = self.parse_expression_rest(lhs, 0, &mut tree)?;
                    self.expect(TokenKind::Semicolon, "Expect ';' after expression.")?;
                    Ok(Statement::Expression(ExpressionStatement {
                        expr: tree.finish(root).expect(ROOT_MSG),
                        span: token.span,
                    }))
                }
            }
            _ => self.parse_statement(),
        }
    }

    fn parse_variable_decl(&mut self) -> Result<Statement, ParserError> {
        let keyword = self.next_token();
        let name = self.expect_ident("Expect variable name.")?;
        let initial = match self.eat_if(TokenKind::Equal) {
            Some(_) => Some(self.parse_expression()?),
            None => None,
        };
        self.expect(TokenKind::Semicolon, "Expect ';' after variable declaration.")?;
        Ok(Statement::VariableDecl(VariableDecl {
            span: keyword.span.merge(&name.span),
            name,
            initial,
        }))
    }

    fn parse_class_decl(&mut self) -> Result<Statement, ParserError> {
        let keyword = self.next_token();
        let name = self.expect_ident("Expect class name.")?;
        let superclass = match self.eat_if(TokenKind::LessThan) {
            Some(_) => Some(self.expect_ident("Expect superclass name.")?),
            None => None,
        };
        self.expect(TokenKind::LeftBrace, "Expect '{' before class body.")?;

        let mut methods = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            let method = self.expect_ident("Expect method name.")?;
            let span = method.span;
            methods.push(Rc::new(self.parse_function_rest(Some(method), span)?));
        }
        self.expect(TokenKind::RightBrace, "Expect '}' after class body.")?;

        Ok(Statement::ClassDecl(ClassDecl {
            span: keyword.span.merge(&name.span),
            name,
            superclass,
            methods,
        }))
    }

    fn parse_import(&mut self) -> Result<Statement, ParserError> {
        let keyword = self.next_token();
        let mut path = vec![self.expect_ident("Expect module name after 'import'.")?];
        while self.eat_if(TokenKind::Dot).is_some() {
            path.push(self.expect_ident("Expect module name after '.'.")?);
        }
        let alias = match self.eat_if(TokenKind::KeywordAs) {
            Some(_) => Some(self.expect_ident("Expect alias name after 'as'.")?),
            None => None,
        };
        self.expect(TokenKind::Semicolon, "Expect ';' after import.")?;
        let last = alias.as_ref().or(path.last()).map_or(keyword.span, |n| n.span);
        Ok(Statement::Import(ImportStatement {
            span: keyword.span.merge(&last),
            path,
            alias,
        }))
    }

    /// Parses the parameter list and body of a function after its name.
    fn parse_function_rest(
        &mut self,
        name: Option<Ident>,
        span: Span,
    ) -> Result<FunctionDecl, ParserError> {
        self.expect(TokenKind::LeftParenthesis, "Expect '(' after function name.")?;
        let mut parameters = Vec::new();
        if !self.check(TokenKind::RightParenthesis) {
            loop {
                if parameters.len() >= MAX_PARAMETERS {
                    let token = self.peek();
                    return Err(Self::error_at(token, ParserErrorKind::TooManyParameters));
                }
                parameters.push(self.expect_ident("Expect parameter name.")?);
                if self.eat_if(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParenthesis, "Expect ')' after parameters.")?;
        self.expect(TokenKind::LeftBrace, "Expect '{' before function body.")?;
        let body = self.parse_block_body()?;
        Ok(FunctionDecl {
            name,
            parameters,
            body,
            span,
        })
    }

    fn parse_statement(&mut self) -> Result<Statement, ParserError> {
        let token = self.peek();
        match token.kind {
            TokenKind::KeywordIf => self.parse_if(),
            TokenKind::KeywordWhile => self.parse_while(),
            TokenKind::KeywordReturn => self.parse_return(),
            TokenKind::KeywordMatch => self.parse_match(),
            TokenKind::LeftBrace => {
                self.next_token();
                let body = self.parse_block_body()?;
                Ok(Statement::Block(BlockStatement {
                    body,
                    span: token.span,
                }))
            }
            _ => {
                let expr = self.parse_expression()?;
                self.expect(TokenKind::Semicolon, "Expect ';' after expression.")?;
                Ok(Statement::Expression(ExpressionStatement {
                    span: expr.get_root_span(),
                    expr,
                }))
            }
        }
    }

    /// Parses declarations up to and including the closing brace.
    fn parse_block_body(&mut self) -> Result<Vec<Statement>, ParserError> {
        let mut body = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            if let Some(statement) = self.parse_declaration() {
                body.push(statement);
            }
        }
        self.expect(TokenKind::RightBrace, "Expect '}' after block.")?;
        Ok(body)
    }

    fn parse_if(&mut self) -> Result<Statement, ParserError> {
        let keyword = self.next_token();
        self.expect(TokenKind::LeftParenthesis, "Expect '(' after 'if'.")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RightParenthesis, "Expect ')' after if condition.")?;
        let success = Box::new(self.parse_statement()?);
        let failure = match self.eat_if(TokenKind::KeywordElse) {
            Some(_) => Some(Box::new(self.parse_statement()?)),
            None => None,
        };
        Ok(Statement::If(IfStatement {
            condition,
            success,
            failure,
            span: keyword.span,
        }))
    }

    fn parse_while(&mut self) -> Result<Statement, ParserError> {
        let keyword = self.next_token();
        self.expect(TokenKind::LeftParenthesis, "Expect '(' after 'while'.")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RightParenthesis, "Expect ')' after condition.")?;
        let body = Box::new(self.parse_statement()?);
        Ok(Statement::While(WhileStatement {
            condition,
            body,
            span: keyword.span,
        }))
    }

    fn parse_return(&mut self) -> Result<Statement, ParserError> {
        let keyword = self.next_token();
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::Semicolon, "Expect ';' after return value.")?;
        Ok(Statement::Return(ReturnStatement {
            value,
            span: keyword.span,
        }))
    }

    fn parse_match(&mut self) -> Result<Statement, ParserError> {
        let keyword = self.next_token();
        self.expect(TokenKind::LeftParenthesis, "Expect '(' after 'match'.")?;
        let subject = self.parse_expression()?;
        self.expect(TokenKind::RightParenthesis, "Expect ')' after match subject.")?;
        self.expect(TokenKind::LeftBrace, "Expect '{' before match cases.")?;

        let mut cases = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            let token = self.next_token();
            let pattern = match token.kind {
                TokenKind::KeywordCase => self.parse_pattern()?,
                TokenKind::KeywordDefault => MatchPattern::Default,
                _ => {
                    return Err(Self::error_at(
                        token,
                        ParserErrorKind::UnexpectedToken("Expect 'case' or 'default'."),
                    ))
                }
            };
            self.expect(TokenKind::Colon, "Expect ':' after match pattern.")?;
            let body = self.parse_statement()?;
            cases.push(MatchCase {
                pattern,
                body,
                span: token.span,
            });
        }
        self.expect(TokenKind::RightBrace, "Expect '}' after match cases.")?;

        Ok(Statement::Match(MatchStatement {
            subject,
            cases,
            span: keyword.span,
        }))
    }

    fn parse_pattern(&mut self) -> Result<MatchPattern, ParserError> {
        let token = self.next_token();
        let lexeme = self.lexer.get_lexeme(&token.span).expect(LEXEME_MSG);
        let pattern = match token.kind {
            TokenKind::NumericLiteral => MatchPattern::Literal(PatternLiteral::Number(
                lexeme.parse().expect("Numeric literal tokens are valid `f64`."),
            )),
            TokenKind::Minus => {
                let number = self.peek();
                if number.kind != TokenKind::NumericLiteral {
                    return Err(Self::error_at(number, ParserErrorKind::InvalidPattern));
                }
                self.next_token();
                let lexeme = self.lexer.get_lexeme(&number.span).expect(LEXEME_MSG);
                let value: f64 = lexeme.parse().expect("Numeric literal tokens are valid `f64`.");
                MatchPattern::Literal(PatternLiteral::Number(-value))
            }
            TokenKind::StringLiteral => {
                MatchPattern::Literal(PatternLiteral::String(lexeme[1..lexeme.len() - 1].into()))
            }
            TokenKind::KeywordTrue => MatchPattern::Literal(PatternLiteral::Bool(true)),
            TokenKind::KeywordFalse => MatchPattern::Literal(PatternLiteral::Bool(false)),
            TokenKind::KeywordNone => MatchPattern::Literal(PatternLiteral::None),
            TokenKind::Ident => MatchPattern::Binding(Ident::new(lexeme, token.span)),
            _ => return Err(Self::error_at(token, ParserErrorKind::InvalidPattern)),
        };
        Ok(pattern)
    }
}
