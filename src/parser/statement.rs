use super::expression::Expression;
use crate::{lexer::Span, string::Ident};
use compact_str::CompactString;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub enum Statement {
    // Declarations
    VariableDecl(VariableDecl),
    FunctionDecl(Rc<FunctionDecl>),
    ClassDecl(ClassDecl),
    Import(ImportStatement),
    // Non-declarations
    Expression(ExpressionStatement),
    Block(BlockStatement),
    If(IfStatement),
    While(WhileStatement),
    Return(ReturnStatement),
    Match(MatchStatement),
}

#[derive(Debug, Clone)]
pub struct VariableDecl {
    pub name: Ident,
    pub initial: Option<Expression>,
    pub span: Span,
}

/// A named function, a method or an anonymous function literal.
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: Option<Ident>,
    pub parameters: Vec<Ident>,
    pub body: Vec<Statement>,
    pub span: Span,
}

impl FunctionDecl {
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    pub fn get_name(&self) -> Option<&str> {
        self.name.as_ref().map(|name| name.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: Ident,
    pub superclass: Option<Ident>,
    pub methods: Vec<Rc<FunctionDecl>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ImportStatement {
    /// The dotted path as written, e.g. `game.utils`.
    pub path: Vec<Ident>,
    pub alias: Option<Ident>,
    pub span: Span,
}

impl ImportStatement {
    /// The symbolic module path used for resolution and caching.
    pub fn module_path(&self) -> String {
        self.path
            .iter()
            .map(|segment| segment.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }
}

#[derive(Debug, Clone)]
pub struct ExpressionStatement {
    pub expr: Expression,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct BlockStatement {
    pub body: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IfStatement {
    pub condition: Expression,
    pub success: Box<Statement>,
    pub failure: Option<Box<Statement>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct WhileStatement {
    pub condition: Expression,
    pub body: Box<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ReturnStatement {
    pub value: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct MatchStatement {
    pub subject: Expression,
    pub cases: Vec<MatchCase>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct MatchCase {
    pub pattern: MatchPattern,
    pub body: Statement,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchPattern {
    Literal(PatternLiteral),
    Binding(Ident),
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PatternLiteral {
    Number(f64),
    String(CompactString),
    Bool(bool),
    None,
}
