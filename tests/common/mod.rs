#![allow(dead_code)]

use baml_syntax::{Declaration, ParseResult, format, parse, parse_str};

/// Parse `input`, failing the test on any error.
pub fn parse_ok(input: &str) -> Vec<Declaration> {
    parse_str(input).unwrap_or_else(|e| panic!("parse failed: {e}\n--- input ---\n{input}"))
}

/// Parse `input` and return the full result, errors included.
pub fn parse_all(input: &str) -> ParseResult {
    parse(input, "test.baml")
}

/// Parse then format should reproduce the input exactly.
pub fn roundtrip(input: &str) {
    let ast = parse_ok(input);
    let output = format(&ast);
    assert_eq!(
        output, input,
        "round-trip mismatch:\n--- expected ---\n{input}\n--- got ---\n{output}"
    );
}

/// Helper: format an AST, parse it back, and assert the second format
/// matches the first.
pub fn assert_ast_roundtrip(original: &[Declaration]) {
    let formatted = format(original);
    let parsed = parse_str(&formatted).unwrap_or_else(|e| {
        panic!(
            "failed to re-parse formatted output: {e}\n\
             --- formatted ---\n{formatted}"
        )
    });

    assert_eq!(
        original.len(),
        parsed.len(),
        "declaration count mismatch\n--- formatted ---\n{formatted}"
    );
    let reformatted = format(&parsed);
    assert_eq!(
        formatted, reformatted,
        "format is not idempotent\n--- first ---\n{formatted}\n--- second ---\n{reformatted}"
    );
}
