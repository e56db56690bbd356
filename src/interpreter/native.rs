use super::SystemContext;
use crate::{
    heap::Heap,
    value::{error::RuntimeErrorKind, formatter::display, Value},
};
use std::time::{SystemTime, UNIX_EPOCH};

/// A builtin function implemented in Rust.
pub trait NativeFunction: std::fmt::Debug {
    fn get_name(&self) -> &'static str;
    fn get_arity(&self) -> usize;
    fn call(
        &self,
        heap: &mut Heap,
        context: &mut dyn SystemContext,
        arguments: &[Value],
    ) -> Result<Value, RuntimeErrorKind>;
}

/// `print(value)`: writes the display form of a value followed by a newline.
#[derive(Debug)]
pub struct Print;

impl NativeFunction for Print {
    fn get_name(&self) -> &'static str {
        "print"
    }

    fn get_arity(&self) -> usize {
        1
    }

    fn call(
        &self,
        heap: &mut Heap,
        context: &mut dyn SystemContext,
        arguments: &[Value],
    ) -> Result<Value, RuntimeErrorKind> {
        let text = arguments
            .first()
            .map(|value| display(heap, value))
            .unwrap_or_default();
        context.writeln(&text);
        Ok(Value::None)
    }
}

/// `clock()`: seconds since the Unix epoch.
#[derive(Debug)]
pub struct Clock;

impl NativeFunction for Clock {
    fn get_name(&self) -> &'static str {
        "clock"
    }

    fn get_arity(&self) -> usize {
        0
    }

    fn call(
        &self,
        _heap: &mut Heap,
        _context: &mut dyn SystemContext,
        _arguments: &[Value],
    ) -> Result<Value, RuntimeErrorKind> {
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_secs_f64())
            .unwrap_or_default();
        Ok(Value::Number(seconds))
    }
}

/// `len(value)`: number of elements in a list or characters in a string.
#[derive(Debug)]
pub struct Len;

impl NativeFunction for Len {
    fn get_name(&self) -> &'static str {
        "len"
    }

    fn get_arity(&self) -> usize {
        1
    }

    fn call(
        &self,
        heap: &mut Heap,
        _context: &mut dyn SystemContext,
        arguments: &[Value],
    ) -> Result<Value, RuntimeErrorKind> {
        let length = match arguments.first() {
            Some(Value::String(text)) => Some(text.chars().count()),
            Some(Value::Object(handle)) => heap.get_list(*handle).map(|list| list.elements.len()),
            _ => None,
        };
        length
            .map(|length| Value::Number(length as f64))
            .ok_or(RuntimeErrorKind::InvalidArgument {
                name: self.get_name(),
                expected: "a list or a string",
            })
    }
}

/// `push(list, value)`: appends a value to a list.
#[derive(Debug)]
pub struct Push;

impl NativeFunction for Push {
    fn get_name(&self) -> &'static str {
        "push"
    }

    fn get_arity(&self) -> usize {
        2
    }

    fn call(
        &self,
        heap: &mut Heap,
        _context: &mut dyn SystemContext,
        arguments: &[Value],
    ) -> Result<Value, RuntimeErrorKind> {
        let error = RuntimeErrorKind::InvalidArgument {
            name: self.get_name(),
            expected: "a list as its first argument",
        };
        let [Value::Object(list), value] = arguments else {
            return Err(error);
        };
        if heap.push_element(*list, value.clone()) {
            Ok(Value::None)
        } else {
            Err(error)
        }
    }
}
