//! Demonstrate error handling for invalid BAML input.

fn main() {
    // Unterminated string
    match baml_syntax::parse_str("class A {\n  name string @alias(\"unclosed\n}\n") {
        Ok(_) => println!("Parsed OK (unexpected)"),
        Err(baml_syntax::Error::Lex(e)) => {
            println!("Lex error: {e}");
            println!("  Kind: {:?}", e.kind);
            println!("  Location: line {}, column {}", e.span.line, e.span.column);
        }
        Err(baml_syntax::Error::Parse(e)) => {
            println!("Parse error: {e}");
        }
    }

    println!();

    // Unclosed brace
    match baml_syntax::parse_str("enum Color {\n  RED\n") {
        Ok(_) => println!("Parsed OK (unexpected)"),
        Err(baml_syntax::Error::Lex(e)) => {
            println!("Lex error: {e}");
        }
        Err(baml_syntax::Error::Parse(e)) => {
            println!("Parse error: {e}");
            println!("  Kind: {:?}", e.kind);
            println!("  Location: line {}, column {}", e.span.line, e.span.column);
        }
    }

    println!();

    // Recovery: every problem is reported and the valid declarations are kept
    let result = baml_syntax::parse("enum {}\nclass Ok {\n  x int\n}\ntype = int\n", "broken.baml");
    println!("Recovered {} declaration(s)", result.ast.len());
    for diagnostic in &result.diagnostics {
        println!("  {}: {diagnostic}", result.source_id);
    }
}
