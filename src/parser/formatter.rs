use super::{
    expression::{
        Expression, ExpressionAtom, ExpressionAtomKind, ExpressionNode, ExpressionNodeRef,
        InfixOperator, InfixShortCircuitOperator, PrefixOperator,
    },
    ParserError, ParserErrorKind,
};
use crate::lexer::{LineBreaks, TokenKind};
use ariadne::{Color, Label, Report, ReportKind, Source};
use std::path::Path;

const ARIADNE_MSG: &str = "Ariadne produces valid utf-8 strings";
const ARIADNE_WRITE_MSG: &str = "Write into buffer should not fail.";
const NODE_MSG: &str = "Child refs always point into the same tree.";

pub trait ExpressionFormatter {
    fn format(&self, tree: &Expression) -> String;
}

pub struct DebugExpressionFormatter;

impl ExpressionFormatter for DebugExpressionFormatter {
    fn format(&self, tree: &Expression) -> String {
        format!("{tree:?}")
    }
}

/// Renders expressions as parenthesized prefix forms, e.g. `(+ 1.0 (group 2.0))`.
pub struct SExpressionFormatter;

impl SExpressionFormatter {
    fn format_atom(atom: &ExpressionAtom) -> String {
        match atom.kind {
            ExpressionAtomKind::Number(v) => format!("{v:?}"),
            ExpressionAtomKind::Bool(v) => format!("{v}"),
            ExpressionAtomKind::None => "none".into(),
            ExpressionAtomKind::Identifier(ref name) => format!("{name}"),
            ExpressionAtomKind::StringLiteral(ref v) => format!("\"{v}\""),
            ExpressionAtomKind::This => "this".into(),
            ExpressionAtomKind::Super(ref method) => format!("(super {method})"),
        }
    }

    fn format_list(tree: &Expression, head: String, nodes: &[ExpressionNodeRef]) -> String {
        let mut buffer = format!("({head}");
        for node in nodes {
            buffer.push(' ');
            buffer.push_str(&Self::format_node(tree, *node));
        }
        buffer.push(')');
        buffer
    }

    fn format_node(tree: &Expression, node: ExpressionNodeRef) -> String {
        let current_node = tree.get_node(node).expect(NODE_MSG);

        match current_node {
            ExpressionNode::Atom(atom) => Self::format_atom(atom),
            ExpressionNode::Prefix { operator, rhs } => Self::format_list(
                tree,
                Self::format_prefix_operator(operator).into(),
                &[*rhs],
            ),
            ExpressionNode::Infix { operator, lhs, rhs } => Self::format_list(
                tree,
                Self::format_infix_operator(operator).into(),
                &[*lhs, *rhs],
            ),
            ExpressionNode::InfixShortCircuit { operator, lhs, rhs } => Self::format_list(
                tree,
                Self::format_short_circuit_operator(operator).into(),
                &[*lhs, *rhs],
            ),
            ExpressionNode::InfixAssignment { lhs, rhs } => {
                Self::format_list(tree, format!("= {lhs}"), &[*rhs])
            }
            ExpressionNode::Group { inner } => Self::format_list(tree, "group".into(), &[*inner]),
            ExpressionNode::Call { callee, arguments } => {
                let mut nodes = vec![*callee];
                nodes.extend(arguments.iter().copied());
                Self::format_list(tree, "call".into(), &nodes)
            }
            ExpressionNode::Get { object, name } => {
                format!("(. {} {name})", Self::format_node(tree, *object))
            }
            ExpressionNode::Set {
                object,
                name,
                value,
            } => format!(
                "(= (. {} {name}) {})",
                Self::format_node(tree, *object),
                Self::format_node(tree, *value)
            ),
            ExpressionNode::Index { object, index } => {
                Self::format_list(tree, "index".into(), &[*object, *index])
            }
            ExpressionNode::SetIndex {
                object,
                index,
                value,
            } => format!(
                "(= (index {} {}) {})",
                Self::format_node(tree, *object),
                Self::format_node(tree, *index),
                Self::format_node(tree, *value)
            ),
            ExpressionNode::List { elements } => Self::format_list(tree, "list".into(), elements),
            ExpressionNode::Function(decl) => {
                let parameters: Vec<&str> = decl.parameters.iter().map(|p| p.as_str()).collect();
                format!("(fun ({}))", parameters.join(" "))
            }
        }
    }

    fn format_prefix_operator(operator: &PrefixOperator) -> &'static str {
        match operator {
            PrefixOperator::Bang => "!",
            PrefixOperator::Minus => "-",
        }
    }

    fn format_infix_operator(operator: &InfixOperator) -> &'static str {
        match operator {
            InfixOperator::Add => "+",
            InfixOperator::Subtract => "-",
            InfixOperator::Multiply => "*",
            InfixOperator::Divide => "/",
            InfixOperator::LessThan => "<",
            InfixOperator::LessThanEqual => "<=",
            InfixOperator::GreaterThan => ">",
            InfixOperator::GreaterThanEqual => ">=",
            InfixOperator::EqualEqual => "==",
            InfixOperator::BangEqual => "!=",
        }
    }

    fn format_short_circuit_operator(operator: &InfixShortCircuitOperator) -> &'static str {
        match operator {
            InfixShortCircuitOperator::And => "and",
            InfixShortCircuitOperator::Or => "or",
        }
    }
}

impl ExpressionFormatter for SExpressionFormatter {
    fn format(&self, tree: &Expression) -> String {
        SExpressionFormatter::format_node(tree, tree.get_root_ref())
    }
}

pub trait ParserFormatter {
    fn format_error(&self, error: &ParserError) -> String;
}

pub struct DebugParserFormatter;

impl ParserFormatter for DebugParserFormatter {
    fn format_error(&self, error: &ParserError) -> String {
        format!("{error:?}")
    }
}

/// Single line diagnostics: `[line N] Error at 'lexeme': message`.
pub struct BasicParserFormatter<'src> {
    text: &'src str,
    line_breaks: LineBreaks,
}

impl<'src> BasicParserFormatter<'src> {
    pub fn new(text: &'src str) -> Self {
        Self {
            text,
            line_breaks: LineBreaks::new(text),
        }
    }
}

impl<'src> ParserFormatter for BasicParserFormatter<'src> {
    fn format_error(&self, error: &ParserError) -> String {
        let line = self.line_breaks.get_line_from_span(error.span);
        match error.kind {
            ParserErrorKind::LexicalError(ref inner) => format!("[line {line}] Error: {inner}"),
            _ if error.token == TokenKind::Eof => format!("[line {line}] Error at end: {error}"),
            _ => {
                let lexeme = self.text.get(error.span.range()).unwrap_or_default();
                format!("[line {line}] Error at '{lexeme}': {error}")
            }
        }
    }
}

pub struct PrettyParserFormatter<'src> {
    text: &'src str,
    path: &'src Path,
}

impl<'src> PrettyParserFormatter<'src> {
    pub fn new(text: &'src str, path: &'src Path) -> Self {
        Self { text, path }
    }
}

impl<'src> ParserFormatter for PrettyParserFormatter<'src> {
    fn format_error(&self, error: &ParserError) -> String {
        let path = self.path.to_string_lossy();
        let path: &str = &path;
        let span = error.span;
        let label = match error.kind {
            ParserErrorKind::LexicalError(_) => "Not a valid token".to_string(),
            _ if error.token == TokenKind::Eof => "File ends here".to_string(),
            _ => format!("Unexpected {}", error.token),
        };
        let mut output = std::io::Cursor::new(Vec::new());
        Report::build(ReportKind::Error, (path, span.range()))
            .with_code(error.code())
            .with_message(error.to_string())
            .with_label(
                Label::new((path, span.range()))
                    .with_message(label)
                    .with_color(Color::BrightRed),
            )
            .finish()
            .write((path, Source::from(self.text)), &mut output)
            .expect(ARIADNE_WRITE_MSG);
        String::from_utf8(output.into_inner()).expect(ARIADNE_MSG)
    }
}
