use super::error::{RuntimeError, RuntimeErrorKind};
use super::Value;
use crate::heap::{Heap, ObjectRef};
use crate::lexer::LineBreaks;
use crate::object::HeapObject;
use ariadne::{Color, Label, Report, ReportKind, Source};
use std::path::Path;

const ARIADNE_MSG: &str = "Ariadne produces valid utf-8 strings";
const ARIADNE_WRITE_MSG: &str = "Write into buffer should not fail.";

/// The user visible form of a value, as written by `print`.
pub fn display(heap: &Heap, value: &Value) -> String {
    let mut buffer = String::new();
    let mut visiting = Vec::new();
    write_value(heap, value, &mut buffer, &mut visiting);
    buffer
}

fn write_value(heap: &Heap, value: &Value, buffer: &mut String, visiting: &mut Vec<ObjectRef>) {
    match value {
        Value::None => buffer.push_str("none"),
        Value::Bool(v) => buffer.push_str(if *v { "true" } else { "false" }),
        Value::Number(v) => buffer.push_str(&format!("{v}")),
        Value::String(v) => buffer.push_str(v),
        Value::Object(handle) => write_object(heap, *handle, buffer, visiting),
    }
}

fn write_object(heap: &Heap, handle: ObjectRef, buffer: &mut String, visiting: &mut Vec<ObjectRef>) {
    let Some(object) = heap.get(handle) else {
        buffer.push_str("<freed>");
        return;
    };
    match object {
        HeapObject::Function(function) => match function.get_name() {
            Some(name) => buffer.push_str(&format!("<fn {name}>")),
            None => buffer.push_str("<fn>"),
        },
        HeapObject::Native(native) => {
            buffer.push_str(&format!("<native fn {}>", native.function.get_name()))
        }
        HeapObject::Class(class) => buffer.push_str(&class.name),
        HeapObject::Instance(instance) => {
            let name = heap
                .get_class(instance.class)
                .map_or("<freed>", |class| class.name.as_str());
            buffer.push_str(&format!("{name} instance"));
        }
        HeapObject::BoundMethod(bound) => match heap.get_function(bound.method) {
            Some(function) => match function.get_name() {
                Some(name) => buffer.push_str(&format!("<fn {name}>")),
                None => buffer.push_str("<fn>"),
            },
            None => buffer.push_str("<fn>"),
        },
        HeapObject::List(list) => {
            if visiting.contains(&handle) {
                buffer.push_str("[...]");
                return;
            }
            visiting.push(handle);
            buffer.push('[');
            for (index, element) in list.elements.iter().enumerate() {
                if index > 0 {
                    buffer.push_str(", ");
                }
                write_value(heap, element, buffer, visiting);
            }
            buffer.push(']');
            visiting.pop();
        }
        HeapObject::Module(module) => buffer.push_str(&format!("<module {}>", module.name)),
        HeapObject::Environment(_) => buffer.push_str("<environment>"),
    }
}

pub trait ValueFormatter {
    fn format(&self, heap: &Heap, value: &Value) -> String;
    fn format_error(&self, error: &RuntimeError) -> String;
}

pub struct DebugFormatter;

impl ValueFormatter for DebugFormatter {
    fn format(&self, _heap: &Heap, value: &Value) -> String {
        format!("{value:?}")
    }

    fn format_error(&self, error: &RuntimeError) -> String {
        format!("{error:?}")
    }
}

/// Single line runtime diagnostics: `[line N] message`.
pub struct BasicFormatter {
    line_breaks: LineBreaks,
}

impl BasicFormatter {
    pub fn new(text: &str) -> Self {
        let line_breaks = LineBreaks::new(text);
        Self { line_breaks }
    }
}

impl ValueFormatter for BasicFormatter {
    fn format(&self, heap: &Heap, value: &Value) -> String {
        display(heap, value)
    }

    fn format_error(&self, error: &RuntimeError) -> String {
        let line = self.line_breaks.get_line_from_span(error.span);
        format!("[line {line}] {error}")
    }
}

pub struct PrettyFormatter<'src> {
    text: &'src str,
    path: &'src Path,
}

impl<'src> PrettyFormatter<'src> {
    pub fn new(text: &'src str, path: &'src Path) -> Self {
        Self { text, path }
    }

    fn label(kind: &RuntimeErrorKind) -> String {
        match kind {
            RuntimeErrorKind::NonNumeric => "This operand is not a number".into(),
            RuntimeErrorKind::NonNumerics | RuntimeErrorKind::NonAddable => {
                "Operand types do not match this operator".into()
            }
            RuntimeErrorKind::DivisionByZero => "The divisor evaluates to zero".into(),
            RuntimeErrorKind::UndefinedVariable(name) => format!("`{name}` is not defined"),
            RuntimeErrorKind::InvalidCallee => "This value is not callable".into(),
            RuntimeErrorKind::InvalidArgumentCount { expected, .. } => {
                format!("Takes {expected} arguments")
            }
            RuntimeErrorKind::UndefinedProperty(name) => format!("No property named `{name}`"),
            RuntimeErrorKind::IndexOutOfBounds { length, .. } => {
                format!("Valid indices are below {length}")
            }
            RuntimeErrorKind::ModuleLoad { module, .. } => format!("While importing `{module}`"),
            _ => "Raised here".into(),
        }
    }
}

impl<'src> ValueFormatter for PrettyFormatter<'src> {
    fn format(&self, heap: &Heap, value: &Value) -> String {
        display(heap, value)
    }

    fn format_error(&self, error: &RuntimeError) -> String {
        let path = self.path.to_string_lossy();
        let path: &str = &path;
        let span = error.span;
        let mut output = std::io::Cursor::new(Vec::new());
        Report::build(ReportKind::Error, (path, span.range()))
            .with_code(error.code())
            .with_message(error.to_string())
            .with_label(
                Label::new((path, span.range()))
                    .with_message(Self::label(&error.kind))
                    .with_color(Color::BrightRed),
            )
            .finish()
            .write((path, Source::from(self.text)), &mut output)
            .expect(ARIADNE_WRITE_MSG);
        String::from_utf8(output.into_inner()).expect(ARIADNE_MSG)
    }
}
