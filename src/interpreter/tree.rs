use super::{
    config::InterpreterConfig,
    native::{Clock, Len, NativeFunction, Print, Push},
    ProgramState, SystemContext,
};
use crate::{
    heap::{CollectionKind, Heap, HeapStats, ObjectRef},
    lexer::{LineBreaks, Span},
    loader::{binding_name, ModuleError, ModuleHost, ModuleLoader, ModuleRequest},
    object::{BoundMethod, Class, Environment, Function, HeapObject, Instance, List, Module, Native},
    parser::{
        expression::{
            Expression, ExpressionAtom, ExpressionAtomKind, ExpressionNode, ExpressionNodeRef,
            InfixOperator, InfixShortCircuitOperator, PrefixOperator,
        },
        statement::{
            BlockStatement, ClassDecl, FunctionDecl, IfStatement, ImportStatement, MatchPattern,
            MatchStatement, PatternLiteral, ReturnStatement, Statement, VariableDecl,
            WhileStatement,
        },
        Parser, Program,
    },
    string::Ident,
    value::{
        error::{RuntimeError, RuntimeErrorKind},
        Value,
    },
};
use std::{collections::HashMap, path::Path, rc::Rc};
use tracing::debug;

const NODE_MSG: &str = "Node refs come from the same tree.";
const SCOPE_MSG: &str = "The current scope is always a live environment.";

/// Evaluates programs by walking their syntax trees.
///
/// Every scope and every object lives on the [`Heap`]. Values held only by Rust locals are
/// invisible to the collector, so while an expression is being evaluated its intermediate
/// results are pinned. The roots of a collection are the globals, the current scope, the
/// scopes of every suspended frame, the pinned values and the loaded modules.
pub struct TreeWalkInterpreter<C: SystemContext> {
    heap: Heap,
    globals: ObjectRef,
    environment: ObjectRef,
    frames: Vec<ObjectRef>,
    pinned: Vec<ObjectRef>,
    loader: ModuleLoader,
    context: C,
}

impl<C> TreeWalkInterpreter<C>
where
    C: SystemContext,
{
    pub fn new(context: C, config: InterpreterConfig) -> Self {
        let mut heap = Heap::new(config.gc);
        let globals = heap.allocate(HeapObject::Environment(Environment::new(None)));
        let mut interpreter = Self {
            heap,
            globals,
            environment: globals,
            frames: Vec::new(),
            pinned: Vec::new(),
            loader: ModuleLoader::new(config.search_paths),
            context,
        };

        let natives: [Rc<dyn NativeFunction>; 4] =
            [Rc::new(Print), Rc::new(Clock), Rc::new(Len), Rc::new(Push)];
        for function in natives {
            let name = function.get_name();
            let native = interpreter.allocate(HeapObject::Native(Native { function }));
            interpreter.heap.define(globals, name, Value::Object(native));
        }
        interpreter
    }

    /// Runs a program in the global scope. Globals persist between runs.
    pub fn run(&mut self, program: &Program) -> Result<(), RuntimeError> {
        self.environment = self.globals;
        self.frames.clear();
        self.pinned.clear();
        match self.interpret_statements(program)? {
            ProgramState::Run => Ok(()),
            ProgramState::Return(_, span) => Err(RuntimeError::new(
                RuntimeErrorKind::ReturnOutsideFunction,
                span,
            )),
        }
    }

    pub fn get_context(&self) -> &C {
        &self.context
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn heap_stats(&self) -> HeapStats {
        self.heap.stats()
    }

    pub fn get_loader(&self) -> &ModuleLoader {
        &self.loader
    }

    pub fn get_loader_mut(&mut self) -> &mut ModuleLoader {
        &mut self.loader
    }

    /// Reads a global binding.
    pub fn get_global(&self, name: &str) -> Option<Value> {
        self.heap.lookup(self.globals, name)
    }

    /// Runs the collection the heap would pick next, with the interpreter's roots.
    pub fn collect_garbage(&mut self) -> CollectionKind {
        let roots = self.roots();
        self.heap.collect(&roots)
    }

    /// Runs a full collection with the interpreter's roots.
    pub fn collect_all(&mut self) {
        let roots = self.roots();
        self.heap.collect_major(&roots);
    }

    /// Final full collection with an empty root set. Nothing survives it, so the interpreter
    /// must not run anything afterwards.
    pub fn shutdown(mut self) -> (C, HeapStats) {
        self.heap.collect_major(&[]);
        let stats = self.heap.stats();
        (self.context, stats)
    }
}

// Rooting
impl<C> TreeWalkInterpreter<C>
where
    C: SystemContext,
{
    fn roots(&self) -> Vec<ObjectRef> {
        let mut roots = vec![self.globals, self.environment];
        roots.extend(self.frames.iter().copied());
        roots.extend(self.pinned.iter().copied());
        roots.extend(self.loader.cached_modules());
        roots
    }

    /// Allocates an object, collecting first if the young generation is full. Everything the
    /// new object refers to must already be reachable from the roots.
    fn allocate(&mut self, object: HeapObject) -> ObjectRef {
        if self.heap.should_collect() {
            let roots = self.roots();
            self.heap.collect(&roots);
        }
        self.heap.allocate(object)
    }

    fn pin(&mut self, value: &Value) {
        if let Value::Object(handle) = value {
            self.pinned.push(*handle);
        }
    }

    /// Runs `f`, releasing every value it pinned once it returns.
    fn with_pins<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, RuntimeError>,
    ) -> Result<T, RuntimeError> {
        let mark = self.pinned.len();
        let result = f(self);
        self.pinned.truncate(mark);
        result
    }

    /// Runs `f` with `environment` as the current scope, restoring the previous scope on
    /// every exit.
    fn with_environment<T>(&mut self, environment: ObjectRef, f: impl FnOnce(&mut Self) -> T) -> T {
        let previous = std::mem::replace(&mut self.environment, environment);
        self.frames.push(previous);
        let result = f(self);
        self.frames.pop();
        self.environment = previous;
        result
    }

    fn new_scope(&mut self, parent: ObjectRef) -> ObjectRef {
        self.allocate(HeapObject::Environment(Environment::new(Some(parent))))
    }

    fn declare(&mut self, name: &str, value: Value) {
        let defined = self.heap.define(self.environment, name, value);
        debug_assert!(defined, "{}", SCOPE_MSG);
    }
}

// Statement interpreter
impl<C> TreeWalkInterpreter<C>
where
    C: SystemContext,
{
    fn interpret_statements<'stmt>(
        &mut self,
        statements: impl IntoIterator<Item = &'stmt Statement>,
    ) -> Result<ProgramState, RuntimeError> {
        for statement in statements {
            match self.interpret_statement(statement)? {
                ProgramState::Run => {}
                state => return Ok(state),
            }
        }
        Ok(ProgramState::Run)
    }

    fn interpret_statement(&mut self, statement: &Statement) -> Result<ProgramState, RuntimeError> {
        match statement {
            Statement::VariableDecl(decl) => self.interpret_variable_declaration(decl),
            Statement::FunctionDecl(decl) => self.interpret_function_declaration(decl),
            Statement::ClassDecl(decl) => self.interpret_class_declaration(decl),
            Statement::Import(stmt) => self.interpret_import_statement(stmt),
            Statement::Expression(stmt) => {
                self.evaluate(&stmt.expr)?;
                Ok(ProgramState::Run)
            }
            Statement::Block(stmt) => self.interpret_block_statement(stmt),
            Statement::If(stmt) => self.interpret_if_statement(stmt),
            Statement::While(stmt) => self.interpret_while_statement(stmt),
            Statement::Return(stmt) => self.interpret_return_statement(stmt),
            Statement::Match(stmt) => self.interpret_match_statement(stmt),
        }
    }

    fn interpret_variable_declaration(
        &mut self,
        decl: &VariableDecl,
    ) -> Result<ProgramState, RuntimeError> {
        let initial = match &decl.initial {
            Some(expr) => self.evaluate(expr)?,
            None => Value::None,
        };
        self.declare(decl.name.as_str(), initial);
        Ok(ProgramState::Run)
    }

    fn interpret_function_declaration(
        &mut self,
        decl: &Rc<FunctionDecl>,
    ) -> Result<ProgramState, RuntimeError> {
        let function = self.make_function(decl, self.environment, false);
        if let Some(name) = decl.get_name() {
            self.declare(name, Value::Object(function));
        }
        Ok(ProgramState::Run)
    }

    fn interpret_class_declaration(&mut self, decl: &ClassDecl) -> Result<ProgramState, RuntimeError> {
        self.with_pins(|this| {
            let superclass = match &decl.superclass {
                Some(ident) => {
                    let value = this.read_variable(ident)?;
                    let class = value
                        .as_object()
                        .filter(|&handle| this.heap.get_class(handle).is_some())
                        .ok_or(RuntimeError::new(
                            RuntimeErrorKind::InvalidSuperClass,
                            ident.span,
                        ))?;
                    this.pin(&value);
                    Some(class)
                }
                None => None,
            };

            let name = decl.name.as_str();
            this.declare(name, Value::None);

            // Methods close over a scope binding `super`, which is `none` without a superclass
            let closure = this.new_scope(this.environment);
            this.pin(&Value::Object(closure));
            let super_value = superclass.map_or(Value::None, Value::Object);
            this.heap.define(closure, "super", super_value);

            let mut methods = HashMap::with_capacity(decl.methods.len());
            for method in decl.methods.iter() {
                let is_initializer = method.get_name() == Some("init");
                let function = this.make_function(method, closure, is_initializer);
                this.pin(&Value::Object(function));
                if let Some(method_name) = &method.name {
                    methods.insert(method_name.name.clone(), function);
                }
            }

            let class = this.allocate(HeapObject::Class(Class {
                name: decl.name.name.clone(),
                superclass,
                methods,
            }));
            this.heap.assign(this.environment, name, Value::Object(class));
            Ok(ProgramState::Run)
        })
    }

    fn interpret_import_statement(
        &mut self,
        stmt: &ImportStatement,
    ) -> Result<ProgramState, RuntimeError> {
        let module_path = stmt.module_path();
        let module = self.import_module(&module_path).map_err(|error| {
            RuntimeError::new(
                RuntimeErrorKind::ModuleLoad {
                    module: module_path.clone(),
                    message: error.to_string(),
                },
                stmt.span,
            )
        })?;

        let binding = match &stmt.alias {
            Some(alias) => alias.as_str().to_string(),
            None => self
                .heap
                .get_module(module)
                .map_or(module_path.as_str(), |module| binding_name(&module.name))
                .to_string(),
        };
        self.declare(&binding, Value::Object(module));
        Ok(ProgramState::Run)
    }

    fn interpret_block_statement(
        &mut self,
        block: &BlockStatement,
    ) -> Result<ProgramState, RuntimeError> {
        let scope = self.new_scope(self.environment);
        self.with_environment(scope, |this| this.interpret_statements(&block.body))
    }

    fn interpret_if_statement(&mut self, stmt: &IfStatement) -> Result<ProgramState, RuntimeError> {
        if self.evaluate(&stmt.condition)?.is_truthy() {
            self.interpret_statement(&stmt.success)
        } else if let Some(failure) = &stmt.failure {
            self.interpret_statement(failure)
        } else {
            Ok(ProgramState::Run)
        }
    }

    fn interpret_while_statement(
        &mut self,
        stmt: &WhileStatement,
    ) -> Result<ProgramState, RuntimeError> {
        while self.evaluate(&stmt.condition)?.is_truthy() {
            match self.interpret_statement(&stmt.body)? {
                ProgramState::Run => {}
                state => return Ok(state),
            }
        }
        Ok(ProgramState::Run)
    }

    fn interpret_return_statement(
        &mut self,
        stmt: &ReturnStatement,
    ) -> Result<ProgramState, RuntimeError> {
        let value = match &stmt.value {
            Some(expr) => self.evaluate(expr)?,
            None => Value::None,
        };
        Ok(ProgramState::Return(value, stmt.span))
    }

    fn interpret_match_statement(
        &mut self,
        stmt: &MatchStatement,
    ) -> Result<ProgramState, RuntimeError> {
        let subject = self.evaluate(&stmt.subject)?;
        self.with_pins(|this| {
            this.pin(&subject);
            for case in stmt.cases.iter() {
                match &case.pattern {
                    MatchPattern::Literal(literal) => {
                        if pattern_value(literal).is_equal(&subject) {
                            return this.interpret_statement(&case.body);
                        }
                    }
                    MatchPattern::Binding(name) => {
                        let scope = this.new_scope(this.environment);
                        this.heap.define(scope, name.as_str(), subject.clone());
                        return this.with_environment(scope, |this| {
                            this.interpret_statement(&case.body)
                        });
                    }
                    MatchPattern::Default => return this.interpret_statement(&case.body),
                }
            }
            Ok(ProgramState::Run)
        })
    }

    fn make_function(
        &mut self,
        decl: &Rc<FunctionDecl>,
        closure: ObjectRef,
        is_initializer: bool,
    ) -> ObjectRef {
        self.allocate(HeapObject::Function(Function {
            declaration: Rc::clone(decl),
            closure,
            is_initializer,
        }))
    }
}

fn pattern_value(literal: &PatternLiteral) -> Value {
    match literal {
        PatternLiteral::Number(v) => Value::Number(*v),
        PatternLiteral::String(v) => Value::String(v.clone()),
        PatternLiteral::Bool(v) => Value::Bool(*v),
        PatternLiteral::None => Value::None,
    }
}

// Expression evaluator
impl<C> TreeWalkInterpreter<C>
where
    C: SystemContext,
{
    pub fn evaluate(&mut self, expr: &Expression) -> Result<Value, RuntimeError> {
        self.evaluate_expression_node(expr, expr.get_root_ref())
    }

    fn evaluate_expression_node(
        &mut self,
        expr: &Expression,
        node: ExpressionNodeRef,
    ) -> Result<Value, RuntimeError> {
        let current_node = expr.get_node(node).expect(NODE_MSG);
        let span = expr.get_span(node).expect(NODE_MSG);

        let result = match current_node {
            ExpressionNode::Atom(atom) => self.evaluate_atom(atom)?,
            ExpressionNode::Group { inner } => self.evaluate_expression_node(expr, *inner)?,
            ExpressionNode::Prefix { operator, rhs } => {
                let rhs = self.evaluate_expression_node(expr, *rhs)?;
                Self::evaluate_prefix(*operator, &rhs).map_err(|kind| RuntimeError::new(kind, span))?
            }
            ExpressionNode::Infix { operator, lhs, rhs } => {
                let lhs = self.evaluate_expression_node(expr, *lhs)?;
                let rhs = self.with_pins(|this| {
                    this.pin(&lhs);
                    this.evaluate_expression_node(expr, *rhs)
                })?;
                Self::evaluate_infix(*operator, &lhs, &rhs)
                    .map_err(|kind| RuntimeError::new(kind, span))?
            }
            ExpressionNode::InfixAssignment { lhs, rhs } => {
                let value = self.evaluate_expression_node(expr, *rhs)?;
                if !self.heap.assign(self.environment, lhs.as_str(), value.clone()) {
                    return Err(RuntimeError::new(
                        RuntimeErrorKind::UndefinedVariable(lhs.name.clone()),
                        lhs.span,
                    ));
                }
                value
            }
            ExpressionNode::InfixShortCircuit { operator, lhs, rhs } => {
                self.evaluate_infix_short_circuit(expr, *operator, *lhs, *rhs)?
            }
            ExpressionNode::Call { callee, arguments } => {
                self.evaluate_call(expr, *callee, arguments, span)?
            }
            ExpressionNode::Get { object, name } => {
                let object = self.evaluate_expression_node(expr, *object)?;
                self.with_pins(|this| {
                    this.pin(&object);
                    this.get_property(&object, name)
                })?
            }
            ExpressionNode::Set {
                object,
                name,
                value,
            } => {
                let object = self.evaluate_expression_node(expr, *object)?;
                let instance = object
                    .as_object()
                    .filter(|&handle| self.heap.get_instance(handle).is_some())
                    .ok_or(RuntimeError::new(RuntimeErrorKind::InvalidFieldTarget, span))?;
                let value = self.with_pins(|this| {
                    this.pin(&object);
                    this.evaluate_expression_node(expr, *value)
                })?;
                self.heap.set_field(instance, name.as_str(), value.clone());
                value
            }
            ExpressionNode::Index { object, index } => {
                let object = self.evaluate_expression_node(expr, *object)?;
                let index = self.with_pins(|this| {
                    this.pin(&object);
                    this.evaluate_expression_node(expr, *index)
                })?;
                self.index_value(&object, &index)
                    .map_err(|kind| RuntimeError::new(kind, span))?
            }
            ExpressionNode::SetIndex {
                object,
                index,
                value,
            } => {
                let object = self.evaluate_expression_node(expr, *object)?;
                let (index, value) = self.with_pins(|this| {
                    this.pin(&object);
                    let index = this.evaluate_expression_node(expr, *index)?;
                    let value = this.evaluate_expression_node(expr, *value)?;
                    Ok((index, value))
                })?;
                self.set_index(&object, &index, value.clone())
                    .map_err(|kind| RuntimeError::new(kind, span))?;
                value
            }
            ExpressionNode::List { elements } => self.with_pins(|this| {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements.iter() {
                    let value = this.evaluate_expression_node(expr, *element)?;
                    this.pin(&value);
                    values.push(value);
                }
                let list = this.allocate(HeapObject::List(List { elements: values }));
                Ok(Value::Object(list))
            })?,
            ExpressionNode::Function(decl) => {
                Value::Object(self.make_function(decl, self.environment, false))
            }
        };
        Ok(result)
    }

    fn evaluate_atom(&mut self, atom: &ExpressionAtom) -> Result<Value, RuntimeError> {
        let span = atom.span;
        let result = match &atom.kind {
            ExpressionAtomKind::Number(v) => Value::Number(*v),
            ExpressionAtomKind::Bool(v) => Value::Bool(*v),
            ExpressionAtomKind::None => Value::None,
            ExpressionAtomKind::StringLiteral(v) => Value::String(v.clone()),
            ExpressionAtomKind::Identifier(ident) => self.read_variable(ident)?,
            ExpressionAtomKind::This => self
                .heap
                .lookup(self.environment, "this")
                .ok_or(RuntimeError::new(RuntimeErrorKind::ThisOutsideMethod, span))?,
            ExpressionAtomKind::Super(method) => {
                let outside = RuntimeError::new(RuntimeErrorKind::SuperOutsideSubclass, span);
                let superclass = self
                    .heap
                    .lookup(self.environment, "super")
                    .and_then(|value| value.as_object())
                    .filter(|&handle| self.heap.get_class(handle).is_some())
                    .ok_or(outside.clone())?;
                let receiver = self
                    .heap
                    .lookup(self.environment, "this")
                    .and_then(|value| value.as_object())
                    .ok_or(outside)?;
                let method = self
                    .heap
                    .find_method(superclass, method.as_str())
                    .ok_or(RuntimeError::new(
                        RuntimeErrorKind::UndefinedProperty(method.name.clone()),
                        method.span,
                    ))?;
                let bound = self.allocate(HeapObject::BoundMethod(BoundMethod { receiver, method }));
                Value::Object(bound)
            }
        };
        Ok(result)
    }

    fn evaluate_prefix(operator: PrefixOperator, rhs: &Value) -> Result<Value, RuntimeErrorKind> {
        type Operator = PrefixOperator;
        match operator {
            Operator::Bang => Ok(rhs.logical_not()),
            Operator::Minus => rhs.numeric_negate(),
        }
    }

    fn evaluate_infix(
        operator: InfixOperator,
        lhs: &Value,
        rhs: &Value,
    ) -> Result<Value, RuntimeErrorKind> {
        type Operator = InfixOperator;
        match operator {
            Operator::Add => lhs.add(rhs),
            Operator::Subtract => lhs.subtract(rhs),
            Operator::Multiply => lhs.multiply(rhs),
            Operator::Divide => lhs.divide(rhs),
            Operator::LessThan => lhs.less_than(rhs),
            Operator::LessThanEqual => lhs.less_than_or_equal(rhs),
            Operator::GreaterThan => lhs.greater_than(rhs),
            Operator::GreaterThanEqual => lhs.greater_than_or_equal(rhs),
            Operator::EqualEqual => Ok(Value::Bool(lhs.is_equal(rhs))),
            Operator::BangEqual => Ok(Value::Bool(lhs.is_not_equal(rhs))),
        }
    }

    fn evaluate_infix_short_circuit(
        &mut self,
        expr: &Expression,
        operator: InfixShortCircuitOperator,
        lhs: ExpressionNodeRef,
        rhs: ExpressionNodeRef,
    ) -> Result<Value, RuntimeError> {
        type Operator = InfixShortCircuitOperator;
        let lhs = self.evaluate_expression_node(expr, lhs)?;
        let decided = match operator {
            Operator::And => !lhs.is_truthy(),
            Operator::Or => lhs.is_truthy(),
        };
        if decided {
            Ok(lhs)
        } else {
            self.evaluate_expression_node(expr, rhs)
        }
    }

    fn evaluate_call(
        &mut self,
        expr: &Expression,
        callee: ExpressionNodeRef,
        arguments: &[ExpressionNodeRef],
        span: Span,
    ) -> Result<Value, RuntimeError> {
        let callee = self.evaluate_expression_node(expr, callee)?;
        self.with_pins(|this| {
            this.pin(&callee);
            let mut values = Vec::with_capacity(arguments.len());
            for argument in arguments.iter() {
                let value = this.evaluate_expression_node(expr, *argument)?;
                this.pin(&value);
                values.push(value);
            }
            this.call_value(&callee, values, span)
        })
    }

    /// Calls a value that is already rooted, with arguments that are already rooted.
    fn call_value(
        &mut self,
        callee: &Value,
        arguments: Vec<Value>,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        let invalid = RuntimeError::new(RuntimeErrorKind::InvalidCallee, span);
        let Value::Object(handle) = callee else {
            return Err(invalid);
        };

        match self.heap.get(*handle) {
            Some(HeapObject::Function(function)) => {
                let function = function.clone();
                self.call_function(&function, None, arguments, span)
            }
            Some(HeapObject::BoundMethod(bound)) => {
                let bound = *bound;
                let function = self
                    .heap
                    .get_function(bound.method)
                    .cloned()
                    .ok_or(invalid)?;
                self.call_function(&function, Some(bound.receiver), arguments, span)
            }
            Some(HeapObject::Native(native)) => {
                let function = Rc::clone(&native.function);
                check_arity(function.get_arity(), arguments.len(), span)?;
                function
                    .call(&mut self.heap, &mut self.context, &arguments)
                    .map_err(|kind| RuntimeError::new(kind, span))
            }
            Some(HeapObject::Class(_)) => self.instantiate(*handle, arguments, span),
            _ => Err(invalid),
        }
    }

    fn call_function(
        &mut self,
        function: &Function,
        receiver: Option<ObjectRef>,
        arguments: Vec<Value>,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        check_arity(function.arity(), arguments.len(), span)?;

        let scope = self.new_scope(function.closure);
        if let Some(receiver) = receiver {
            self.heap.define(scope, "this", Value::Object(receiver));
        }
        for (parameter, argument) in function.declaration.parameters.iter().zip(arguments) {
            self.heap.define(scope, parameter.as_str(), argument);
        }

        let state = self.with_environment(scope, |this| {
            this.interpret_statements(&function.declaration.body)
        })?;

        match (function.is_initializer, receiver) {
            (true, Some(receiver)) => Ok(Value::Object(receiver)),
            _ => match state {
                ProgramState::Return(value, _) => Ok(value),
                ProgramState::Run => Ok(Value::None),
            },
        }
    }

    fn instantiate(
        &mut self,
        class: ObjectRef,
        arguments: Vec<Value>,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        let instance = self.allocate(HeapObject::Instance(Instance::new(class)));
        self.with_pins(|this| {
            this.pin(&Value::Object(instance));
            match this.heap.find_method(class, "init") {
                Some(initializer) => {
                    let function = this
                        .heap
                        .get_function(initializer)
                        .cloned()
                        .ok_or(RuntimeError::new(RuntimeErrorKind::InvalidCallee, span))?;
                    this.call_function(&function, Some(instance), arguments, span)?;
                }
                None => check_arity(0, arguments.len(), span)?,
            }
            Ok(Value::Object(instance))
        })
    }

    /// Reads a property. The object must be rooted by the caller.
    fn get_property(&mut self, object: &Value, name: &Ident) -> Result<Value, RuntimeError> {
        let undefined = RuntimeError::new(
            RuntimeErrorKind::UndefinedProperty(name.name.clone()),
            name.span,
        );
        let Some(handle) = object.as_object() else {
            return Err(RuntimeError::new(RuntimeErrorKind::InvalidInstance, name.span));
        };

        if let Some(instance) = self.heap.get_instance(handle) {
            if let Some(value) = instance.fields.get(name.as_str()) {
                return Ok(value.clone());
            }
            let class = instance.class;
            let method = self
                .heap
                .find_method(class, name.as_str())
                .ok_or(undefined)?;
            let bound = self.allocate(HeapObject::BoundMethod(BoundMethod {
                receiver: handle,
                method,
            }));
            return Ok(Value::Object(bound));
        }

        if let Some(module) = self.heap.get_module(handle) {
            return self
                .heap
                .get_environment(module.environment)
                .and_then(|scope| scope.values.get(name.as_str()))
                .cloned()
                .ok_or(RuntimeError::new(
                    RuntimeErrorKind::UndefinedVariable(name.name.clone()),
                    name.span,
                ));
        }

        Err(RuntimeError::new(RuntimeErrorKind::InvalidInstance, name.span))
    }

    fn index_value(&self, object: &Value, index: &Value) -> Result<Value, RuntimeErrorKind> {
        match object {
            Value::Object(handle) => {
                let list = self
                    .heap
                    .get_list(*handle)
                    .ok_or(RuntimeErrorKind::InvalidIndexTarget(object.kind(&self.heap)))?;
                let position = to_index(index)?;
                list.elements
                    .get(position)
                    .cloned()
                    .ok_or(RuntimeErrorKind::IndexOutOfBounds {
                        index: position,
                        length: list.elements.len(),
                    })
            }
            Value::String(text) => {
                let position = to_index(index)?;
                text.chars()
                    .nth(position)
                    .map(|c| Value::String(c.to_string().into()))
                    .ok_or(RuntimeErrorKind::IndexOutOfBounds {
                        index: position,
                        length: text.chars().count(),
                    })
            }
            _ => Err(RuntimeErrorKind::InvalidIndexTarget(object.kind(&self.heap))),
        }
    }

    fn set_index(
        &mut self,
        object: &Value,
        index: &Value,
        value: Value,
    ) -> Result<(), RuntimeErrorKind> {
        let not_a_list = RuntimeErrorKind::InvalidIndexAssignment(object.kind(&self.heap));
        let handle = object.as_object().ok_or(not_a_list.clone())?;
        let length = self
            .heap
            .get_list(handle)
            .map(|list| list.elements.len())
            .ok_or(not_a_list)?;
        let position = to_index(index)?;
        if self.heap.set_element(handle, position, value) {
            Ok(())
        } else {
            Err(RuntimeErrorKind::IndexOutOfBounds {
                index: position,
                length,
            })
        }
    }

    fn read_variable(&self, ident: &Ident) -> Result<Value, RuntimeError> {
        self.heap
            .lookup(self.environment, ident.as_str())
            .ok_or(RuntimeError::new(
                RuntimeErrorKind::UndefinedVariable(ident.name.clone()),
                ident.span,
            ))
    }
}

fn check_arity(expected: usize, actual: usize, span: Span) -> Result<(), RuntimeError> {
    if expected == actual {
        Ok(())
    } else {
        Err(RuntimeError::new(
            RuntimeErrorKind::InvalidArgumentCount { expected, actual },
            span,
        ))
    }
}

fn to_index(index: &Value) -> Result<usize, RuntimeErrorKind> {
    match index {
        Value::Number(v) if *v >= 0.0 && v.fract() == 0.0 => Ok(*v as usize),
        _ => Err(RuntimeErrorKind::InvalidIndex),
    }
}

// Modules
impl<C> TreeWalkInterpreter<C>
where
    C: SystemContext,
{
    /// Returns the module object for a dotted path, loading it on first use. The module is
    /// cached before its top level runs, so an import cycle sees the module under construction.
    pub fn import_module(&mut self, module_path: &str) -> Result<ObjectRef, ModuleError> {
        if let Some(module) = self.loader.get_cached(module_path) {
            return Ok(module);
        }

        let resolved = self.loader.resolve(module_path)?;
        let environment = self.new_scope(self.globals);
        self.pinned.push(environment);
        let module = self.allocate(HeapObject::Module(Module {
            name: resolved.name.as_str().into(),
            path: resolved.file.clone(),
            environment,
        }));
        self.pinned.pop();
        self.loader.cache_module(module_path, module);

        let request = ModuleRequest {
            path: resolved.file.clone(),
            name: resolved.name.clone(),
            environment,
        };
        if let Err(error) = resolved.reader.load(&request, self) {
            self.loader.evict(module_path);
            return Err(error);
        }
        debug!(
            module = module_path,
            path = %resolved.file.display(),
            extension = resolved.extension,
            "module loaded"
        );
        Ok(module)
    }
}

impl<C> ModuleHost for TreeWalkInterpreter<C>
where
    C: SystemContext,
{
    fn run_source(
        &mut self,
        source: &str,
        path: &Path,
        environment: ObjectRef,
    ) -> Result<(), ModuleError> {
        let line_breaks = LineBreaks::new(source);
        let locate = |span: Span| format!("{}:{}", path.display(), line_breaks.get_line_from_span(span));

        let mut parser = Parser::new(source);
        let program = parser.parse().map_err(|errors| ModuleError::Parse {
            messages: errors
                .iter()
                .map(|error| format!("{}: {error}", locate(error.span)))
                .collect(),
        })?;

        let state = self
            .with_environment(environment, |this| this.interpret_statements(&program))
            .map_err(|error| ModuleError::Runtime {
                message: format!("{}: {error}", locate(error.span)),
            })?;
        match state {
            ProgramState::Run => Ok(()),
            ProgramState::Return(_, span) => Err(ModuleError::Runtime {
                message: format!("{}: {}", locate(span), RuntimeErrorKind::ReturnOutsideFunction),
            }),
        }
    }

    fn define(&mut self, environment: ObjectRef, name: &str, value: Value) {
        self.heap.define(environment, name, value);
    }
}
