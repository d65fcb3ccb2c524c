//! Parse a BAML source string and re-format it.

use baml_syntax::Declaration;

fn main() {
    let input = r##"
class Resume {
  name string
  skills string[] @description("Technical skills only")
}

function ExtractResume(resume: string) -> Resume {
  client "openai/gpt-4o"
  prompt #"
    Extract the resume below.
    {{ resume }}
    {{ ctx.output_format }}
  "#
}
"##;

    let declarations = baml_syntax::parse_str(input).expect("parse failed");

    println!("Declarations: {}", declarations.len());
    for declaration in &declarations {
        match declaration {
            Declaration::Class(class) => {
                println!("  Class: {}", class.name.name);
                for property in &class.properties {
                    println!("    Property: {}", property.name.name);
                }
            }
            Declaration::Function(function) => {
                println!(
                    "  Function: {} ({} statements)",
                    function.name.name,
                    function.body.statements.len()
                );
            }
            other => println!("  Other: {:?}", other.name()),
        }
    }

    let output = baml_syntax::format(&declarations);
    println!("\nFormatted output:\n{output}");
}
