use std::{
    fs::{read_dir, read_to_string},
    path::{Path, PathBuf},
};

use color_eyre::{
    eyre::{eyre, Context},
    Result,
};
use cube::{
    heap::GcConfig,
    interpreter::{context::BufferedContext, InterpreterConfig, TreeWalkInterpreter},
    parser::{
        formatter::{BasicParserFormatter, ParserFormatter},
        Parser,
    },
    value::formatter::{BasicFormatter, ValueFormatter},
};

#[test]
fn test_operator() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/operator");
    test_engine(input_dir)
}

#[test]
fn test_scope() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/scope");
    test_engine(input_dir)
}

#[test]
fn test_string() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/string");
    test_engine(input_dir)
}

#[test]
fn test_function() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/function");
    test_engine(input_dir)
}

#[test]
fn test_closure() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/closure");
    test_engine(input_dir)
}

#[test]
fn test_return() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/return");
    test_engine(input_dir)
}

#[test]
fn test_class() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/class");
    test_engine(input_dir)
}

#[test]
fn test_initializer() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/initializer");
    test_engine(input_dir)
}

#[test]
fn test_inheritance() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/inheritance");
    test_engine(input_dir)
}

#[test]
fn test_list() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/list");
    test_engine(input_dir)
}

#[test]
fn test_match() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/match");
    test_engine(input_dir)
}

#[test]
fn test_module() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/module");
    test_engine(input_dir)
}

#[test]
fn test_gc() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/gc");
    test_engine(input_dir)
}

#[test]
fn test_parse_error() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/parse_error");
    test_engine(input_dir)
}

struct TestCase {
    name: String,
    directory: PathBuf,
    source: String,
    output: String,
    compiler_errors: String,
    runtime_errors: String,
}

impl TestCase {
    /// Runs the case with the default collector and again with one that collects constantly.
    pub fn check(&self) {
        let stress = GcConfig::default()
            .with_young_threshold(8)
            .with_old_threshold(64)
            .with_promotion_age(2)
            .with_major_every(3);
        self.check_with(GcConfig::default());
        self.check_with(stress);
    }

    fn check_with(&self, gc: GcConfig) {
        let mut parser = Parser::new(&self.source);
        let parser_formatter = BasicParserFormatter::new(&self.source);
        let value_formatter = BasicFormatter::new(&self.source);

        let program = match parser.parse() {
            Ok(program) => program,
            Err(errors) => {
                let actual: Vec<String> = errors
                    .iter()
                    .map(|e| parser_formatter.format_error(e))
                    .collect();
                assert_eq!(
                    self.compiler_errors,
                    actual.join("\n"),
                    "Failed test {} at compilation stage.",
                    self.name,
                );
                return;
            }
        };
        assert!(
            self.compiler_errors.is_empty(),
            "Test {} was expected to fail to compile.",
            self.name,
        );

        let config = InterpreterConfig::default()
            .with_gc(gc)
            .with_search_path(self.directory.clone());
        let mut interpreter = TreeWalkInterpreter::new(BufferedContext::new(), config);
        let result = interpreter.run(&program);
        let (context, stats) = interpreter.shutdown();
        assert_eq!(
            stats.young_objects + stats.old_objects,
            0,
            "Test {} left objects behind after shutdown.",
            self.name,
        );

        match result {
            Ok(()) => assert!(
                self.runtime_errors.is_empty(),
                "Test {} was expected to fail at runtime.",
                self.name,
            ),
            Err(e) => {
                let msg = value_formatter.format_error(&e);
                assert_eq!(
                    self.runtime_errors, msg,
                    "Failed test {} at runtime.",
                    self.name,
                );
            }
        }
        let msg = context.into_data();
        assert_eq!(self.output, msg, "Failed test {} at print.", self.name);
    }
}

fn test_engine(input_dir: &Path) -> Result<()> {
    let mut succeeded = true;
    for entry in read_dir(input_dir).context("Failed to open input test data folder")? {
        let entry = entry?;
        let path = entry.path();

        let Some(extension) = path.extension() else {
            continue;
        };

        if extension != "cube" {
            continue;
        }

        println!("Parsing {path:?}");
        let test_case = parse_test_case(input_dir, &path)?;
        println!("Checking {}", test_case.name);

        let res = std::panic::catch_unwind(|| {
            test_case.check();
        });
        if res.is_err() {
            println!("\tFails test case {}", test_case.name);
            succeeded = false;
        }
    }

    assert!(succeeded, "Some test cases in {input_dir:?} failed.");

    Ok(())
}

fn parse_test_case(input_dir: &Path, input_path: &Path) -> Result<TestCase> {
    let test_name = input_path
        .file_name()
        .ok_or_else(|| eyre!("{input_path:?} has no file name"))?
        .to_string_lossy();

    let input = read_to_string(input_path).context("Failed to open input test data file")?;

    let mut source_lines = Vec::new();
    let mut expected_outputs = Vec::new();
    let mut expected_compiler_errors = Vec::new();
    let mut expected_runtime_errors = Vec::new();

    for (line_index, line) in input.lines().enumerate() {
        if let Some(expected) = comment_body(line, "// expect:") {
            expected_outputs.push(expected.to_string());
        } else if let Some(expected) = comment_body(line, "// expect runtime error:") {
            expected_runtime_errors.push(format!("[line {}] {expected}", line_index + 1));
        } else if let Some(comment_index) = line.find("// Error") {
            let expected = line[comment_index + 3..].trim();
            expected_compiler_errors.push(format!("[line {}] {expected}", line_index + 1));
        } else if let Some(comment_index) = line.find("// [line ") {
            expected_compiler_errors.push(line[comment_index + 3..].trim().to_string());
        }
        source_lines.push(line.to_string());
    }

    let output: String = expected_outputs
        .iter()
        .map(|line| format!("{line}\n"))
        .collect();
    Ok(TestCase {
        name: test_name.into_owned(),
        directory: input_dir.to_path_buf(),
        source: source_lines.join("\n"),
        output,
        compiler_errors: expected_compiler_errors.join("\n"),
        runtime_errors: expected_runtime_errors.join("\n"),
    })
}

fn comment_body<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let index = line.find(marker)?;
    Some(line[index + marker.len()..].trim())
}
