use crate::{
    heap::{ObjectRef, Trace, Tracer},
    interpreter::native::NativeFunction,
    parser::statement::FunctionDecl,
    string::IdentName,
    value::Value,
};
use std::{collections::HashMap, fmt, mem::size_of, path::PathBuf, rc::Rc};

/// Everything that lives on the garbage collected heap.
#[derive(Debug)]
pub enum HeapObject {
    Function(Function),
    Native(Native),
    Class(Class),
    Instance(Instance),
    BoundMethod(BoundMethod),
    List(List),
    Module(Module),
    Environment(Environment),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Function,
    Native,
    Class,
    Instance,
    BoundMethod,
    List,
    Module,
    Environment,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectKind::Function => "function",
            ObjectKind::Native => "native function",
            ObjectKind::Class => "class",
            ObjectKind::Instance => "instance",
            ObjectKind::BoundMethod => "bound method",
            ObjectKind::List => "list",
            ObjectKind::Module => "module",
            ObjectKind::Environment => "environment",
        };
        write!(f, "{name}")
    }
}

impl HeapObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            HeapObject::Function(_) => ObjectKind::Function,
            HeapObject::Native(_) => ObjectKind::Native,
            HeapObject::Class(_) => ObjectKind::Class,
            HeapObject::Instance(_) => ObjectKind::Instance,
            HeapObject::BoundMethod(_) => ObjectKind::BoundMethod,
            HeapObject::List(_) => ObjectKind::List,
            HeapObject::Module(_) => ObjectKind::Module,
            HeapObject::Environment(_) => ObjectKind::Environment,
        }
    }

    /// A rough estimate of the bytes owned by this object, used for heap accounting.
    pub fn approximate_size(&self) -> usize {
        let entry = size_of::<IdentName>() + size_of::<Value>();
        let base = size_of::<HeapObject>();
        match self {
            HeapObject::Function(_) | HeapObject::Native(_) | HeapObject::BoundMethod(_) => base,
            HeapObject::Class(class) => base + class.methods.len() * entry,
            HeapObject::Instance(instance) => base + instance.fields.len() * entry,
            HeapObject::List(list) => base + list.elements.len() * size_of::<Value>(),
            HeapObject::Module(module) => base + module.name.len(),
            HeapObject::Environment(environment) => base + environment.values.len() * entry,
        }
    }
}

impl Trace for HeapObject {
    fn trace(&self, tracer: &mut Tracer) {
        match self {
            HeapObject::Function(function) => tracer.mark(function.closure),
            HeapObject::Native(_) => {}
            HeapObject::Class(class) => {
                if let Some(superclass) = class.superclass {
                    tracer.mark(superclass);
                }
                class.methods.values().for_each(|&method| tracer.mark(method));
            }
            HeapObject::Instance(instance) => {
                tracer.mark(instance.class);
                instance.fields.values().for_each(|v| tracer.mark_value(v));
            }
            HeapObject::BoundMethod(bound) => {
                tracer.mark(bound.receiver);
                tracer.mark(bound.method);
            }
            HeapObject::List(list) => list.elements.iter().for_each(|v| tracer.mark_value(v)),
            HeapObject::Module(module) => tracer.mark(module.environment),
            HeapObject::Environment(environment) => {
                if let Some(parent) = environment.parent {
                    tracer.mark(parent);
                }
                environment.values.values().for_each(|v| tracer.mark_value(v));
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Function {
    pub declaration: Rc<FunctionDecl>,
    pub closure: ObjectRef,
    pub is_initializer: bool,
}

impl Function {
    pub fn get_name(&self) -> Option<&str> {
        self.declaration.get_name()
    }

    pub fn arity(&self) -> usize {
        self.declaration.arity()
    }
}

#[derive(Clone)]
pub struct Native {
    pub function: Rc<dyn NativeFunction>,
}

impl fmt::Debug for Native {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Native({})", self.function.get_name())
    }
}

#[derive(Debug, Clone)]
pub struct Class {
    pub name: IdentName,
    pub superclass: Option<ObjectRef>,
    pub methods: HashMap<IdentName, ObjectRef>,
}

#[derive(Debug, Clone)]
pub struct Instance {
    pub class: ObjectRef,
    pub fields: HashMap<IdentName, Value>,
}

impl Instance {
    pub fn new(class: ObjectRef) -> Self {
        Self {
            class,
            fields: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BoundMethod {
    pub receiver: ObjectRef,
    pub method: ObjectRef,
}

#[derive(Debug, Clone, Default)]
pub struct List {
    pub elements: Vec<Value>,
}

#[derive(Debug, Clone)]
pub struct Module {
    pub name: IdentName,
    pub path: PathBuf,
    pub environment: ObjectRef,
}

/// A single lexical scope. Scopes are heap objects so closures can keep them alive.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub values: HashMap<IdentName, Value>,
    pub parent: Option<ObjectRef>,
}

impl Environment {
    pub fn new(parent: Option<ObjectRef>) -> Self {
        Self {
            values: HashMap::new(),
            parent,
        }
    }
}
