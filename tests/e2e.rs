//! End-to-end tests over realistic BAML sources: parse, inspect,
//! re-format, and check what gets reported for broken files.

mod common;

use baml_syntax::ast::{ConfigItem, ConfigKind, ConfigValue};
use baml_syntax::{
    Declaration, DiagnosticKind, LexErrorKind, ParseErrorKind, Severity, Statement, format, parse,
};
use common::{assert_ast_roundtrip, parse_all, parse_ok};

const RESUME: &str = r##"// Data model
class Education {
  school string
  degree string?
  year int
}

/// A parsed resume.
class Resume {
  name string
  email string @alias("contact_email")
  skills string[]
  education Education[]
  seniority "junior" | "senior"
  @@description("Everything we extract")
}

enum Seniority {
  JUNIOR @alias("jr")
  SENIOR
  @@dynamic()
}

client<llm> GPT4o {
  provider openai
  options {
    model "gpt-4o"
    api_key env.OPENAI_API_KEY
  }
}

function ExtractResume(resume: string) -> Resume {
  client GPT4o
  prompt #"
    Extract the following information from the resume:

    ---
    {{ resume }}
    ---

    {{ ctx.output_format }}
  "#
}

test VaibhavResume {
  functions [ExtractResume]
  args {
    resume #"
      Vaibhav Gupta
      vbv@boundaryml.com
    "#
  }
}
"##;

// -----------------------------------------------------------
// Realistic files.
// -----------------------------------------------------------

#[test]
fn e2e_resume_file() {
    let result = parse(RESUME, "resume.baml");
    // `"junior" | "senior"` is not a type
    assert_eq!(result.errors().count(), 1, "{:?}", result.diagnostics);
    assert_eq!(result.source_id, "resume.baml");

    let names: Vec<_> = result.ast.iter().filter_map(Declaration::name).collect();
    assert_eq!(
        names,
        vec![
            "Education",
            "Resume",
            "Seniority",
            "GPT4o",
            "ExtractResume",
            "VaibhavResume"
        ]
    );

    let Declaration::Class(resume) = &result.ast[1] else {
        panic!("expected class");
    };
    assert_eq!(resume.properties.len(), 4);
    assert!(resume.attributes.is_empty());
}

#[test]
fn e2e_resume_file_without_literal_union() {
    let source = RESUME.replace("  seniority \"junior\" | \"senior\"\n", "  seniority Seniority\n");
    let decls = parse_ok(&source);
    assert_eq!(decls.len(), 6);

    let Declaration::Class(resume) = &decls[1] else {
        panic!("expected class");
    };
    assert_eq!(resume.properties.len(), 5);
    assert_eq!(resume.attributes.len(), 1);

    let Declaration::Function(function) = &decls[4] else {
        panic!("expected function");
    };
    let Statement::PromptProperty(prompt) = &function.body.statements[1] else {
        panic!("expected prompt");
    };
    assert!(prompt.content.content.contains("{{ resume }}"));
    assert!(prompt.content.content.starts_with('\n'));

    let Declaration::ConfigBlock(test) = &decls[5] else {
        panic!("expected test block");
    };
    assert_eq!(test.kind, ConfigKind::Test);
    let ConfigItem::Property(args) = &test.items[1] else {
        panic!("expected args");
    };
    let ConfigValue::Object(args) = &args.value else {
        panic!("expected object");
    };
    assert!(matches!(
        &args.properties[0].value,
        ConfigValue::RawString(raw) if raw.content.contains("Vaibhav Gupta")
    ));

    assert_ast_roundtrip(&decls);
}

#[test]
fn e2e_spans_point_into_source() {
    let source = RESUME.replace("  seniority \"junior\" | \"senior\"\n", "");
    let decls = parse_ok(&source);
    for decl in &decls {
        let span = decl.span();
        let text = &source[span.start..span.end];
        let name = decl.name().unwrap_or_default();
        assert!(text.contains(name), "{name} not in {text:?}");
        assert!(text.ends_with('}'), "{text:?}");
    }
}

#[test]
fn e2e_format_is_idempotent() {
    let source = "class A{x int @alias(\"y\") z:string[]}\nfunction F(a:A)->int{let b=a\nif(b){b}else{1}}";
    let first = format(&parse_ok(source));
    let second = format(&parse_ok(&first));
    assert_eq!(first, second);
    assert_eq!(
        first,
        "class A {\n  x int @alias(\"y\")\n  z string[]\n}\n\nfunction F(a: A) -> int {\n  let b = a;\n  if (b) {\n    b;\n  } else {\n    1;\n  }\n}\n"
    );
}

#[test]
fn e2e_imperative_file() {
    let source = r#"
function Score(items: Item[]) -> int {
  let total = 0
  for (item in items) {
    if (item.weight() > 10 || item.pinned()) {
      total += item.weight() * 2
    } else {
      total += 1
    }
  }
  let summary = Summary { total: total, count: items.length() }
  summary
}
"#;
    let decls = parse_ok(source);
    let Declaration::Function(function) = &decls[0] else {
        panic!("expected function");
    };
    assert_eq!(function.body.statements.len(), 4);
    assert!(matches!(function.body.statements[1], Statement::ForIn(_)));
    assert_ast_roundtrip(&decls);
}

// -----------------------------------------------------------
// Diagnostics and recovery.
// -----------------------------------------------------------

#[test]
fn e2e_multiple_errors_reported() {
    let source = "class A {\n  x\n}\n\nenum {\n}\n\nclass B {\n  y int\n}\n";
    let result = parse_all(source);
    let errors: Vec<_> = result.errors().collect();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].span.line, 3);
    assert_eq!(errors[1].span.line, 5);
    assert!(
        errors
            .iter()
            .all(|e| matches!(e.kind, DiagnosticKind::Parse(_)))
    );

    let names: Vec<_> = result.ast.iter().filter_map(Declaration::name).collect();
    assert_eq!(names, vec!["A", "B"]);
}

#[test]
fn e2e_missing_type_message() {
    let result = parse_all("class A {\n  x\n}\n");
    let errors: Vec<_> = result.errors().collect();
    assert_eq!(errors[0].message, "expected a type, found '}'");
    assert!(matches!(
        &errors[0].kind,
        DiagnosticKind::Parse(ParseErrorKind::TypeExpected { .. })
    ));
}

#[test]
fn e2e_unterminated_string_suppresses_follow_up_errors() {
    let result = parse_all("class A {\n  x string @alias(\"oops\n}\n");
    assert_eq!(result.diagnostics.len(), 1);
    assert!(matches!(
        result.diagnostics[0].kind,
        DiagnosticKind::Lex(LexErrorKind::UnterminatedString)
    ));
    assert_eq!(result.diagnostics[0].span.line, 2);
}

#[test]
fn e2e_error_before_unterminated_string_is_kept() {
    let result = parse_all("function F(a int, b: \"oops\n");
    assert_eq!(result.diagnostics.len(), 2);
    assert!(matches!(
        &result.diagnostics[0].kind,
        DiagnosticKind::Parse(ParseErrorKind::UnexpectedToken { expected, .. })
        if expected == &vec!["':'"]
    ));
    assert_eq!(result.diagnostics[0].span.column, 14);
    assert!(matches!(
        result.diagnostics[1].kind,
        DiagnosticKind::Lex(LexErrorKind::UnterminatedString)
    ));
}

#[test]
fn e2e_unterminated_raw_string_keeps_partial_tree() {
    let source = "enum A {\n  X\n}\n\nfunction F() -> string {\n  prompt #\"never closed\n}\n";
    let result = parse_all(source);
    assert_eq!(result.diagnostics.len(), 1);
    assert!(matches!(
        &result.diagnostics[0].kind,
        DiagnosticKind::Lex(LexErrorKind::UnterminatedRawString { start_marker })
        if start_marker == "#\""
    ));

    assert_eq!(result.ast.len(), 2);
    let Declaration::Function(function) = &result.ast[1] else {
        panic!("expected function");
    };
    assert!(function.body.statements.is_empty());
}

#[test]
fn e2e_unexpected_character_is_not_fatal() {
    let result = parse_all("enum A {\n  X ^\n  Y\n}\n");
    assert_eq!(result.diagnostics.len(), 1);
    assert!(matches!(
        result.diagnostics[0].kind,
        DiagnosticKind::Lex(LexErrorKind::UnexpectedCharacter('^'))
    ));
    let Declaration::Enum(decl) = &result.ast[0] else {
        panic!("expected enum");
    };
    assert_eq!(decl.values.len(), 2);
}

#[test]
fn e2e_warning_does_not_fail() {
    let result = parse_all("function F() -> string {\n  prompt #\"\"hello\"#\n}\n");
    assert!(!result.has_errors());
    let warnings: Vec<_> = result.warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].severity, Severity::Warning);
    assert_eq!(
        warnings[0].message,
        "raw string opened with #\"\" but closed with \"#"
    );
}

#[test]
fn e2e_into_result_returns_first_error() {
    let err = parse_all("enum {}\nclass {}\n").into_result().unwrap_err();
    assert_eq!(
        err.to_string(),
        "expected enum name, found '{' at line 1, column 6"
    );
}

// -----------------------------------------------------------
// Serialization.
// -----------------------------------------------------------

#[test]
fn e2e_result_serializes_to_json() {
    let result = parse_all("enum A {\n  X\n}\nclass {}\n");
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["source_id"], "test.baml");
    assert_eq!(json["ast"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["diagnostics"][0]["severity"], "error");
    assert_eq!(json["ast"][0]["Enum"]["name"]["name"], "A");
}
