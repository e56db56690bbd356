use cube::{
    interpreter::{context::BufferedContext, InterpreterConfig, TreeWalkInterpreter},
    loader::{ModuleError, SourceReader},
    parser::Parser,
    value::{error::RuntimeErrorKind, Value},
};
use std::rc::Rc;

const MODULE_DIR: &str = "./test_data/interpreter/module";

fn interpreter() -> TreeWalkInterpreter<BufferedContext> {
    let config = InterpreterConfig::default().with_search_path(MODULE_DIR);
    TreeWalkInterpreter::new(BufferedContext::new(), config)
}

fn module_value(interpreter: &TreeWalkInterpreter<BufferedContext>, module_path: &str, name: &str) -> Option<Value> {
    let module = interpreter.get_loader().get_cached(module_path)?;
    let environment = interpreter.heap().get_module(module)?.environment;
    interpreter.heap().lookup(environment, name)
}

#[test]
fn modules_run_once_and_are_shared() {
    let mut interpreter = interpreter();
    let first = interpreter.import_module("lib.counter").expect("counter exists");
    let second = interpreter.import_module("lib.counter").expect("counter is cached");
    assert_eq!(first, second);
    assert_eq!(interpreter.get_context().get_data(), "loading counter\n");

    let module = interpreter.heap().get_module(first).expect("a module object");
    assert_eq!(module.name.as_str(), "lib.counter");
    assert!(module.path.ends_with("lib/counter.cube"));
    assert_eq!(
        module_value(&interpreter, "lib.counter", "count"),
        Some(Value::Number(0.0))
    );
}

#[test]
fn missing_modules_report_every_probed_file() {
    let mut interpreter = interpreter();
    let error = interpreter
        .import_module("nothing.here")
        .expect_err("module does not exist");
    let ModuleError::NotFound { probed } = &error else {
        panic!("expected a missing module, got {error:?}");
    };
    assert_eq!(probed.len(), interpreter.get_loader().extensions().count());
    assert!(probed[0].ends_with("nothing/here.cube"));
    assert_eq!(error.code(), "MD001");
    assert!(interpreter.get_loader().get_cached("nothing.here").is_none());
}

#[test]
fn runtime_errors_in_modules_are_load_failures() {
    let mut interpreter = interpreter();
    let error = interpreter
        .import_module("lib.broken")
        .expect_err("module calls an undefined function");
    let ModuleError::Runtime { message } = &error else {
        panic!("expected a runtime failure, got {error:?}");
    };
    assert!(message.contains("broken.cube:2"), "{message}");
    assert!(message.ends_with("Undefined variable 'undefined_function'."), "{message}");
    assert!(interpreter.get_loader().get_cached("lib.broken").is_none());
}

#[test]
fn cyclic_imports_see_members_as_unbound_until_defined() {
    let mut interpreter = interpreter();
    let error = interpreter
        .import_module("lib.partial_a")
        .expect_err("partial_b reads a member partial_a has not defined yet");
    let ModuleError::Runtime { message } = &error else {
        panic!("expected a runtime failure, got {error:?}");
    };
    assert!(message.contains("partial_b.cube:2"), "{message}");
    assert!(message.ends_with("Undefined variable 'late'."), "{message}");
    assert!(interpreter.get_loader().get_cached("lib.partial_a").is_none());
    assert!(interpreter.get_loader().get_cached("lib.partial_b").is_none());
}

#[test]
fn parse_errors_in_modules_are_load_failures() {
    let mut interpreter = interpreter();
    let error = interpreter
        .import_module("lib.bad_syntax")
        .expect_err("module does not parse");
    let ModuleError::Parse { messages } = &error else {
        panic!("expected a parse failure, got {error:?}");
    };
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("bad_syntax.cube:1"), "{}", messages[0]);
    assert!(messages[0].ends_with("Expect variable name."), "{}", messages[0]);
}

#[test]
fn unregistered_extensions_have_no_reader() {
    let mut interpreter = interpreter();
    let error = interpreter
        .import_module("lib.notes.txt")
        .expect_err("nothing reads .txt files");
    assert_eq!(
        error,
        ModuleError::NoReader {
            extension: "txt".into()
        }
    );
}

#[test]
fn registered_readers_handle_new_extensions() {
    let mut interpreter = interpreter();
    interpreter
        .get_loader_mut()
        .register_reader("txt", Rc::new(SourceReader));
    interpreter
        .import_module("lib.notes.txt")
        .expect("txt files are now read as source");
    assert_eq!(
        module_value(&interpreter, "lib.notes.txt", "note"),
        Some(Value::from("plain text module"))
    );
}

#[test]
fn placeholder_modules_expose_metadata() {
    let mut interpreter = interpreter();
    interpreter.import_module("lib.blur.glsl").expect("shader exists");
    assert_eq!(
        module_value(&interpreter, "lib.blur.glsl", "kind"),
        Some(Value::from("shader"))
    );
    let Some(Value::String(path)) = module_value(&interpreter, "lib.blur.glsl", "path") else {
        panic!("placeholder modules define their path");
    };
    assert!(path.ends_with("blur.glsl"));
}

#[test]
fn failed_imports_are_runtime_errors_in_scripts() {
    let mut interpreter = interpreter();
    let source = "var before = 1;\nimport nothing.here;";
    let program = Parser::new(source).parse().expect("valid program");
    let error = interpreter.run(&program).expect_err("import fails");
    let RuntimeErrorKind::ModuleLoad { module, message } = &error.kind else {
        panic!("expected a module load error, got {error:?}");
    };
    assert_eq!(module, "nothing.here");
    assert!(message.starts_with("module not found"));
    assert_eq!(interpreter.get_global("before"), Some(Value::Number(1.0)));
}

#[test]
fn search_paths_can_be_added_after_construction() {
    let mut interpreter =
        TreeWalkInterpreter::new(BufferedContext::new(), InterpreterConfig::default());
    assert!(interpreter.get_loader().get_search_paths().is_empty());
    assert!(matches!(
        interpreter.import_module("lib.counter"),
        Err(ModuleError::NotFound { .. })
    ));

    interpreter.get_loader_mut().add_search_path(MODULE_DIR);
    assert_eq!(interpreter.get_loader().get_search_paths().len(), 1);
    assert!(interpreter.import_module("lib.counter").is_ok());
}
