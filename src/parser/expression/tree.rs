use super::{InfixOperator, InfixShortCircuitOperator, PrefixOperator};
use crate::{lexer::Span, parser::statement::FunctionDecl, string::Ident};
use compact_str::CompactString;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionAtomKind {
    Number(f64),
    Bool(bool),
    None,
    Identifier(Ident),
    StringLiteral(CompactString),
    This,
    Super(Ident),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionAtom {
    pub kind: ExpressionAtomKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpressionNodeRef(pub u32);

#[derive(Debug, Clone)]
pub enum ExpressionNode {
    Atom(ExpressionAtom),
    Group {
        inner: ExpressionNodeRef,
    },
    Prefix {
        operator: PrefixOperator,
        rhs: ExpressionNodeRef,
    },
    Infix {
        operator: InfixOperator,
        lhs: ExpressionNodeRef,
        rhs: ExpressionNodeRef,
    },
    InfixAssignment {
        lhs: Ident,
        rhs: ExpressionNodeRef,
    },
    InfixShortCircuit {
        operator: InfixShortCircuitOperator,
        lhs: ExpressionNodeRef,
        rhs: ExpressionNodeRef,
    },
    Call {
        callee: ExpressionNodeRef,
        arguments: Vec<ExpressionNodeRef>,
    },
    Get {
        object: ExpressionNodeRef,
        name: Ident,
    },
    Set {
        object: ExpressionNodeRef,
        name: Ident,
        value: ExpressionNodeRef,
    },
    Index {
        object: ExpressionNodeRef,
        index: ExpressionNodeRef,
    },
    SetIndex {
        object: ExpressionNodeRef,
        index: ExpressionNodeRef,
        value: ExpressionNodeRef,
    },
    List {
        elements: Vec<ExpressionNodeRef>,
    },
    Function(Rc<FunctionDecl>),
}

/// Expression arena that is still being built by the parser.
#[derive(Debug, Clone, Default)]
pub struct IncompleteExpression {
    nodes: Vec<ExpressionNode>,
    spans: Vec<Span>,
}

impl IncompleteExpression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a node along with the span that runtime errors on it should point to.
    pub fn push(&mut self, node: ExpressionNode, span: Span) -> ExpressionNodeRef {
        self.nodes.push(node);
        self.spans.push(span);
        ExpressionNodeRef(self.nodes.len() as u32 - 1)
    }

    pub fn get_node(&self, node: ExpressionNodeRef) -> Option<&ExpressionNode> {
        self.nodes.get(node.0 as usize)
    }

    pub fn get_span(&self, node: ExpressionNodeRef) -> Option<Span> {
        self.spans.get(node.0 as usize).copied()
    }

    /// Finishes the arena, returning `None` if the root does not belong to it.
    pub fn finish(self, root: ExpressionNodeRef) -> Option<Expression> {
        if (root.0 as usize) < self.nodes.len() {
            Some(Expression {
                nodes: self.nodes.into(),
                spans: self.spans.into(),
                root,
            })
        } else {
            None
        }
    }
}

/// A flattened expression tree. Children always precede their parents.
#[derive(Debug, Clone)]
pub struct Expression {
    nodes: Rc<[ExpressionNode]>,
    spans: Rc<[Span]>,
    root: ExpressionNodeRef,
}

impl Expression {
    pub fn get_root_ref(&self) -> ExpressionNodeRef {
        self.root
    }

    pub fn get_node(&self, node: ExpressionNodeRef) -> Option<&ExpressionNode> {
        self.nodes.get(node.0 as usize)
    }

    pub fn get_span(&self, node: ExpressionNodeRef) -> Option<Span> {
        self.spans.get(node.0 as usize).copied()
    }

    pub fn get_root_span(&self) -> Span {
        self.spans[self.root.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
