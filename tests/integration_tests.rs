// Parser robustness suites plus canonical-text checks for operator
// precedence and statement structure.

use std::panic::{self, AssertUnwindSafe};
use uwsc::ast::Program;
use uwsc::error::ScriptError;
use uwsc::lexer::Lexer;
use uwsc::parser::{parse, Parser};

#[derive(Debug, Clone, Copy)]
enum Expectation {
    Parses,
    Fails,
    /// At least one recorded error contains the text.
    FailsWith(&'static str),
}

#[derive(Debug, Clone, Copy)]
struct Case {
    name: &'static str,
    input: &'static str,
    expect: Expectation,
}

const fn ok(name: &'static str, input: &'static str) -> Case {
    Case { name, input, expect: Expectation::Parses }
}

const fn fails(name: &'static str, input: &'static str) -> Case {
    Case { name, input, expect: Expectation::Fails }
}

const fn fails_with(name: &'static str, input: &'static str, message: &'static str) -> Case {
    Case { name, input, expect: Expectation::FailsWith(message) }
}

#[derive(Debug)]
enum Outcome {
    Pass,
    Fail(String),
    Crash(String),
}

/// Parse input and return the program or every recorded error
fn parse_input(input: &str) -> Result<Program, Vec<ScriptError>> {
    let mut parser = Parser::new(Lexer::new(input));
    let program = parser.parse_program();
    if parser.errors().is_empty() {
        Ok(program)
    } else {
        Err(parser.into_errors())
    }
}

fn messages(errors: &[ScriptError]) -> Vec<&str> {
    errors.iter().map(|error| error.message.as_str()).collect()
}

fn check(input: &str, expect: Expectation) -> Outcome {
    // A panic inside the parser counts as a crash, not a failure.
    let parsed = match panic::catch_unwind(AssertUnwindSafe(|| parse_input(input))) {
        Ok(parsed) => parsed,
        Err(payload) => {
            let message = payload
                .downcast_ref::<String>()
                .cloned()
                .or_else(|| payload.downcast_ref::<&str>().map(|s| s.to_string()))
                .unwrap_or_else(|| "unknown panic".to_string());
            return Outcome::Crash(message);
        }
    };

    match (parsed, expect) {
        (Ok(_), Expectation::Parses) => Outcome::Pass,
        (Ok(_), _) => Outcome::Fail("parsed, but an error was expected".to_string()),
        (Err(errors), Expectation::Parses) => {
            Outcome::Fail(format!("unexpected errors: {:?}", messages(&errors)))
        }
        (Err(_), Expectation::Fails) => Outcome::Pass,
        (Err(errors), Expectation::FailsWith(expected)) => {
            if errors.iter().any(|error| error.message.contains(expected)) {
                Outcome::Pass
            } else {
                Outcome::Fail(format!("{:?} do not mention '{}'", messages(&errors), expected))
            }
        }
    }
}

/// Runs every case of one suite, printing a line per case; returns the number
/// of cases that failed or crashed.
fn run_suite(title: &str, cases: &[Case]) -> usize {
    println!("{}", title);
    println!("{}", "-".repeat(title.len()));

    let mut unexpected = 0;
    for case in cases {
        match check(case.input, case.expect) {
            Outcome::Pass => println!("  ok    {}", case.name),
            Outcome::Fail(reason) => {
                unexpected += 1;
                println!("  FAIL  {}: {}", case.name, reason);
            }
            Outcome::Crash(reason) => {
                unexpected += 1;
                println!("  CRASH {}: {}", case.name, reason);
            }
        }
    }
    println!("  {} of {} as expected\n", cases.len() - unexpected, cases.len());
    unexpected
}

const MALFORMED_EXPRESSIONS: &[Case] = &[
    fails_with("unmatched_opening_paren", "(1 + 2", "expected next token to be ), got EOF instead"),
    fails_with("unmatched_opening_paren_nested", "((1 + 2)", "expected next token to be ), got EOF instead"),
    fails_with("unmatched_closing_paren", "1 + 2)", "expected end of line, got ) instead"),
    fails_with("empty_parentheses", "()", "no prefix parse function for ) found"),
    fails_with("empty_parentheses_in_expression", "1 + ()", "no prefix parse function for ) found"),
    fails_with("unmatched_opening_bracket", "arr[1", "expected next token to be ], got EOF instead"),
    fails_with("array_elements_without_comma", "DIM a[] = 1, 2 3", "expected next token to be EOL, got INT instead"),
    fails_with("two_expressions_on_one_line", "a b", "expected end of line, got IDENT instead"),
];

const EDGE_CASES: &[Case] = &[
    ok("empty_input", ""),
    ok("only_whitespace", "   \n\t  "),
    ok("only_comment", "// nothing to see\n"),
    fails_with("unexpected_eof_after_operator", "1 +", "no prefix parse function for EOF found"),
    fails("unexpected_eof_in_expression", "1 + ("),
    ok("windows_line_endings", "DIM a = 1\r\nDIM b = 2\r\n"),
];

const OPERATORS: &[Case] = &[
    fails("missing_left_operand", "+ 1"),
    fails("missing_right_operand", "1 +"),
    fails("missing_both_operands", "+"),
    fails("double_plus", "1 ++ 2"),
    fails_with("double_equals", "1 == 2", "no prefix parse function for = found"),
    // 1 - (-2) and 1 + (-2)
    ok("double_minus", "1 -- 2"),
    ok("mixed_operators", "1 +- 2"),
    ok("comparison_not_equal", "1 <> 2"),
    ok("comparison_less_equal", "1 <= 2"),
    ok("comparison_greater_equal", "1 >= 2"),
    ok("modulo_keyword", "5 mod 2"),
    ok("logical_not", "!TRUE"),
];

const CONTROL_FLOW: &[Case] = &[
    ok("valid_if", "IF a THEN b = 1"),
    ok("valid_if_else", "IF a THEN b = 1 ELSE b = 2"),
    fails_with("if_missing_then", "IF a b = 1", "expected next token to be THEN, got IDENT instead"),
    fails_with("if_missing_body", "IF a THEN", "expected a statement after THEN"),
    ok("valid_ifb", "IFB a THEN\nb = 1\nENDIF"),
    ok("ifb_without_then", "IFB a\nb = 1\nELSE\nb = 2\nENDIF"),
    ok(
        "ifb_elseif_chain",
        "IFB a = 1 THEN\nb = 1\nELSEIF a = 2 THEN\nb = 2\nELSEIF a = 3\nb = 3\nELSE\nb = 4\nENDIF",
    ),
    fails_with("ifb_missing_endif", "IFB a THEN\nb = 1", "expected ENDIF, got EOF instead"),
    fails_with("stray_endif", "ENDIF", "unexpected ENDIF"),
    ok("valid_for", "FOR i = 0 TO 10\nx = i\nNEXT"),
    ok("for_with_negative_step", "FOR i = 10 TO 0 STEP -2\nNEXT"),
    ok("valid_for_in", "FOR v IN arr\nCONTINUE\nBREAK\nNEXT"),
    fails_with("for_missing_next", "FOR i = 0 TO 10\nx = i", "expected NEXT, got EOF instead"),
    fails_with("for_missing_assign", "FOR i 0 TO 10\nNEXT", "expected next token to be = or IN"),
    fails_with("for_missing_to", "FOR i = 0 10\nNEXT", "expected next token to be TO, got INT instead"),
];

const LITERALS: &[Case] = &[
    ok("integer_literal", "42"),
    ok("string_literal", "\"hello\""),
    ok("boolean_true", "TRUE"),
    ok("boolean_false_lowercase", "false"),
    fails_with("integer_too_large", "99999999999999999999", "could not parse 99999999999999999999 as integer"),
    fails_with("illegal_character", "@", "illegal character '@'"),
    fails_with("brace_is_illegal", "{1}", "illegal character '{'"),
    fails_with("unterminated_string", "\"hello", "unterminated string literal"),
];

const FUNCTIONS: &[Case] = &[
    ok("simple_function_call", "foo()"),
    ok("function_call_with_args", "foo(1, 2, 3)"),
    ok("omitted_middle_argument", "foo(1, , 3)"),
    ok("omitted_first_argument", "foo(, 2)"),
    fails_with("missing_closing_paren", "foo(1, 2", "expected next token to be ), got EOF instead"),
    ok("function_declaration", "FUNCTION add(a, b)\nRESULT = a + b\nFEND"),
    ok("procedure_without_parens", "PROCEDURE p\nFEND"),
    fails_with("parameters_without_comma", "FUNCTION f(a b)\nFEND", "expected next token to be ), got IDENT instead"),
    fails_with("function_without_name", "FUNCTION (a)\nFEND", "expected next token to be IDENT, got ( instead"),
    fails_with("function_missing_fend", "FUNCTION f()\nRESULT = 1\n", "expected FEND, got EOF instead"),
];

const DECLARATIONS: &[Case] = &[
    ok("simple_assignment", "x = 1"),
    ok("assignment_with_expression", "x = 1 + 2"),
    ok("index_assignment", "arr[0] = 5"),
    ok("hash_assignment", "h[\"a\"] = 1"),
    // `=` after a non-assignable expression is a comparison
    ok("literal_comparison", "1 = x"),
    fails("missing_value", "x ="),
    ok("dim_without_value", "DIM a"),
    ok("public_declaration", "PUBLIC g = 10"),
    ok("sized_array", "DIM a[2] = 1, 2, 3"),
    ok("empty_array", "DIM a[]"),
    ok("hash_table_with_flags", "HASHTBL h = HASH_CASECARE + HASH_SORT"),
    fails_with("dim_without_name", "DIM = 5", "expected next token to be IDENT, got = instead"),
    fails_with("const_without_value", "CONST x", "expected next token to be =, got EOF instead"),
];

const WHOLE_SCRIPTS: &[Case] = &[
    ok("simple_arithmetic", "1 + 2 * 3"),
    ok("parentheses", "(1 + 2) * 3"),
    ok("string_concatenation", "\"hello\" + \" world\""),
    ok(
        "full_script",
        "DIM arr[] = 1, 2, 3\nFUNCTION total(a)\nRESULT = CALCARRAY(a, CALC_ADD)\nFEND\nDIM t = total(arr)\nIF t > 5 THEN t = 0\n",
    ),
];

#[test]
fn parser_robustness_suites() {
    let suites: [(&str, &[Case]); 8] = [
        ("Malformed Expressions", MALFORMED_EXPRESSIONS),
        ("Edge Cases", EDGE_CASES),
        ("Operators", OPERATORS),
        ("Control Flow", CONTROL_FLOW),
        ("Literals", LITERALS),
        ("Functions", FUNCTIONS),
        ("Declarations and Assignment", DECLARATIONS),
        ("Whole Scripts", WHOLE_SCRIPTS),
    ];

    let unexpected: usize = suites
        .iter()
        .map(|(title, cases)| run_suite(title, cases))
        .sum();
    assert_eq!(unexpected, 0, "some parser cases misbehaved, see output above");
}

#[test]
fn deeply_nested_parentheses() {
    let input = "(".repeat(100) + "1" + &")".repeat(100);
    assert!(matches!(check(&input, Expectation::Parses), Outcome::Pass));
}

fn canonical(input: &str) -> String {
    match parse(input) {
        Ok(program) => program.to_string(),
        Err(errors) => panic!("failed to parse {:?}: {:?}", input, messages(&errors)),
    }
}

#[test]
fn operator_precedence_canonical_text() {
    let cases = [
        ("-a * b", "((-a) * b)"),
        ("!-a", "(!(-a))"),
        ("a + b + c", "((a + b) + c)"),
        ("a + b - c", "((a + b) - c)"),
        ("a * b * c", "((a * b) * c)"),
        ("a * b / c", "((a * b) / c)"),
        ("a + b / c", "(a + (b / c))"),
        ("a + b * c + d / e - f", "(((a + (b * c)) + (d / e)) - f)"),
        ("a MOD b * c", "((a MOD b) * c)"),
        ("3 + 4\n-5 * 5", "(3 + 4)((-5) * 5)"),
        ("5 > 4 = 3 < 4", "((5 > 4) = (3 < 4))"),
        ("5 < 4 <> 3 > 4", "((5 < 4) <> (3 > 4))"),
        ("3 + 4 * 5 = 3 * 1 + 4 * 5", "((3 + (4 * 5)) = ((3 * 1) + (4 * 5)))"),
        ("3 > 5 = FALSE", "((3 > 5) = FALSE)"),
        ("1 + (2 + 3) + 4", "((1 + (2 + 3)) + 4)"),
        ("(5 + 5) * 2", "((5 + 5) * 2)"),
        ("-(5 + 5)", "(-(5 + 5))"),
        ("a + add(b * c) + d", "((a + add((b * c))) + d)"),
        (
            "fn(a, b, 1, 2 * 3, 4 + 5, fnc(6, 7 * 8))",
            "fn(a, b, 1, (2 * 3), (4 + 5), fnc(6, (7 * 8)))",
        ),
        ("a * b[2]", "(a * (b[2]))"),
        ("add(a * b[2], b[1], 2 * c[1])", "add((a * (b[2])), (b[1]), (2 * (c[1])))"),
        ("f(a, , c)", "f(a, , c)"),
    ];

    for (input, expected) in cases {
        assert_eq!(canonical(input), expected, "input: {:?}", input);
    }
}

#[test]
fn assignment_canonical_text() {
    let cases = [
        ("x = 5 MOD 3", "x = (5 MOD 3)"),
        ("arr[1] = 2 + 3", "(arr[1]) = (2 + 3)"),
        ("a = b = c", "a = (b = c)"),
        ("h[\"a\", HASH_EXISTS]", "(h[\"a\", HASH_EXISTS])"),
        ("RESULT = RESULT + 1", "RESULT = (RESULT + 1)"),
    ];

    for (input, expected) in cases {
        assert_eq!(canonical(input), expected, "input: {:?}", input);
    }
}

#[test]
fn statement_canonical_text() {
    assert_eq!(canonical("dim  a   =  1"), "DIM a = 1");
    assert_eq!(canonical("DIM a[2] = 1, 2 * 2, 3 + 3"), "DIM a = [1, (2 * 2), (3 + 3)]");
    assert_eq!(canonical("HASHTBL h = HASH_SORT"), "HASHTBL h = HASH_SORT");
    assert_eq!(
        canonical("FUNCTION f(a, b)\nRESULT = a + b\nFEND"),
        "FUNCTION f(a, b)\nRESULT = (a + b)\nFEND"
    );
    assert_eq!(
        canonical("IFB a THEN\nb = 1\nELSEIF c\nb = 2\nELSE\nb = 3\nENDIF"),
        "IFB a THEN\nb = 1\nELSEIF c THEN\nb = 2\nELSE\nb = 3\nENDIF"
    );
    assert_eq!(
        canonical("FOR i = 0 TO 10 STEP 2\nCONTINUE\nNEXT"),
        "FOR i = 0 TO 10 STEP 2\nCONTINUE\nNEXT"
    );
    assert_eq!(canonical("IF x THEN y = 1 ELSE y = 2"), "IF x THEN y = 1 ELSE y = 2");
}

#[test]
fn errors_are_reported_in_source_order() {
    let errors = parse("DIM = 1\nx = (1\nFOR i = 0 TO 3\nNEXT\nCONST").unwrap_err();
    assert_eq!(
        messages(&errors),
        vec![
            "expected next token to be IDENT, got = instead",
            "expected next token to be ), got EOL instead",
            "expected next token to be IDENT, got EOF instead",
        ]
    );
    assert!(errors.iter().all(|e| e.kind == uwsc::ErrorKind::ParseError));
    // `=` after `DIM ` on the first line
    assert_eq!(errors[0].span.start, 4);
}

#[test]
fn bad_line_inside_block_keeps_the_block() {
    let mut parser = Parser::new(Lexer::new("FUNCTION f()\nDIM = 1\nRESULT = 2\nFEND\nf()"));
    let program = parser.parse_program();
    assert_eq!(parser.errors().len(), 1);
    assert_eq!(program.statements.len(), 2);
    assert_eq!(program.statements[0].to_string(), "FUNCTION f()\nRESULT = 2\nFEND");
}
