use cube::{
    lexer::Span,
    parser::{
        formatter::{BasicParserFormatter, ExpressionFormatter, ParserFormatter, SExpressionFormatter},
        statement::{MatchPattern, PatternLiteral, Statement},
        Parser, ParserErrorKind,
    },
};
use proptest::prelude::*;

fn check_expression(input: &str, expected: &str) {
    let mut parser = Parser::new(input);
    let tree = parser
        .parse_expression()
        .unwrap_or_else(|error| panic!("Failed to parse {input:?}: {error}"));
    assert_eq!(SExpressionFormatter.format(&tree), expected, "Input: {input}");
}

fn check_errors(input: &str, expected: &[&str]) {
    let mut parser = Parser::new(input);
    let Err(errors) = parser.parse() else {
        panic!("Expected {input:?} to fail to parse.");
    };
    let formatter = BasicParserFormatter::new(input);
    let actual: Vec<String> = errors.iter().map(|e| formatter.format_error(e)).collect();
    assert_eq!(actual, expected, "Input: {input}");
}

#[test]
fn test_precedence() {
    check_expression("1 + 2 * 3", "(+ 1.0 (* 2.0 3.0))");
    check_expression("(1 + 2) * 3", "(* (group (+ 1.0 2.0)) 3.0)");
    check_expression("1 - 2 - 3", "(- (- 1.0 2.0) 3.0)");
    check_expression("1 < 2 == true", "(== (< 1.0 2.0) true)");
    check_expression("a or b and c", "(or a (and b c))");
    check_expression("!-x", "(! (- x))");
    check_expression("-a.b", "(- (. a b))");
}

#[test]
fn test_postfix() {
    check_expression("f(1)(2)", "(call (call f 1.0) 2.0)");
    check_expression("a.b.c()", "(call (. (. a b) c))");
    check_expression("xs[0][1]", "(index (index xs 0.0) 1.0)");
    check_expression("super.greet()", "(call (super greet))");
}

#[test]
fn test_assignment() {
    check_expression("a = b = c", "(= a (= b c))");
    check_expression("a.b = 1", "(= (. a b) 1.0)");
    check_expression("xs[0] = 9", "(= (index xs 0.0) 9.0)");
    check_expression("a = none", "(= a none)");
}

#[test]
fn test_literals() {
    check_expression("[1, \"a\", [none]]", "(list 1.0 \"a\" (list none))");
    check_expression("[]", "(list)");
    check_expression("fun (a, b) { return a; }", "(fun (a b))");
    check_expression("this.x", "(. this x)");
}

#[test]
fn test_spans() {
    let source = "counter.add(1, 2)";
    let mut parser = Parser::new(source);
    let tree = parser.parse_expression().expect("valid call");
    // A call is located at its closing parenthesis
    assert_eq!(tree.get_root_span(), Span::new(16, 17));

    let source = "super.greet";
    let mut parser = Parser::new(source);
    let tree = parser.parse_expression().expect("valid super access");
    assert_eq!(tree.get_root_span(), Span::new(0, source.len()));
}

#[test]
fn test_invalid_assignment_target() {
    let mut parser = Parser::new("1 + 2 = 3");
    let error = parser.parse_expression().expect_err("sum is not assignable");
    assert_eq!(error.kind, ParserErrorKind::InvalidAssignmentTarget);
    assert_eq!(error.code(), "PA003");
}

#[test]
fn test_statements() {
    let source = "import game.utils as u;\n\
                  class B < A { init(x) { this.x = x; } get() { return this.x; } }\n\
                  fun () { print(1); }();\n\
                  match (x) { case -1: print(1); case \"a\": {} case y: print(y); default: print(0); }";
    let mut parser = Parser::new(source);
    let program = parser.parse().expect("valid program");
    assert_eq!(program.len(), 4);

    let Some(Statement::Import(import)) = program.get_statement(0) else {
        panic!("Expected an import.");
    };
    assert_eq!(import.module_path(), "game.utils");
    assert_eq!(import.alias.as_ref().map(|a| a.as_str()), Some("u"));

    let Some(Statement::ClassDecl(class)) = program.get_statement(1) else {
        panic!("Expected a class.");
    };
    assert_eq!(class.name.as_str(), "B");
    assert_eq!(class.superclass.as_ref().map(|s| s.as_str()), Some("A"));
    assert_eq!(class.methods.len(), 2);
    assert_eq!(class.methods[0].arity(), 1);

    assert!(matches!(program.get_statement(2), Some(Statement::Expression(_))));

    let Some(Statement::Match(stmt)) = program.get_statement(3) else {
        panic!("Expected a match.");
    };
    assert_eq!(stmt.cases.len(), 4);
    assert_eq!(
        stmt.cases[0].pattern,
        MatchPattern::Literal(PatternLiteral::Number(-1.0))
    );
    assert_eq!(
        stmt.cases[1].pattern,
        MatchPattern::Literal(PatternLiteral::String("a".into()))
    );
    assert!(matches!(stmt.cases[2].pattern, MatchPattern::Binding(ref name) if name.as_str() == "y"));
    assert_eq!(stmt.cases[3].pattern, MatchPattern::Default);
}

#[test]
fn test_error_recovery() {
    check_errors(
        "var = 1;\nprint(1)\nvar ok = 2;\nclass {}",
        &[
            "[line 1] Error at '=': Expect variable name.",
            "[line 3] Error at 'var': Expect ';' after expression.",
            "[line 4] Error at '{': Expect class name.",
        ],
    );
}

#[test]
fn test_error_at_end() {
    check_errors("print(1", &["[line 1] Error at end: Expect ')' after arguments."]);
}

#[test]
fn test_lexical_errors_are_collected() {
    check_errors(
        "var a = 1 @ 2;",
        &[
            "[line 1] Error: Unexpected character '@'.",
            "[line 1] Error at '2': Expect ';' after variable declaration.",
        ],
    );
}

#[test]
fn test_invalid_pattern() {
    check_errors(
        "match (x) { case [1]: print(1); }",
        &[
            "[line 1] Error at '[': Invalid match pattern.",
            "[line 1] Error at '}': Expect expression.",
        ],
    );
}

proptest! {
    #[test]
    fn sums_are_left_associative(numbers in prop::collection::vec(0u32..1000, 2..20)) {
        let source = numbers
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(" + ");
        let mut expected = format!("{:?}", numbers[0] as f64);
        for n in numbers.iter().skip(1) {
            expected = format!("(+ {expected} {:?})", *n as f64);
        }
        let mut parser = Parser::new(&source);
        let tree = parser.parse_expression().expect("sums are valid expressions");
        prop_assert_eq!(SExpressionFormatter.format(&tree), expected);
    }
}
