use exception_advisor::analysis::context::{argument_list_text, extract, ContextRecord};
use exception_advisor::analysis::matcher;
use exception_advisor::Document;

fn record_for(source: &str) -> ContextRecord {
    let doc = Document::parse(source).expect("parse");
    doc.with_read(|view| {
        let site = matcher::candidates(view).next().expect("candidate site");
        extract(view, site)
    })
}

const NULL_HINT: &str =
    "Code contains null checks - consider ArgumentNullException or NullReferenceException";
const PARAM_HINT: &str =
    "Thrown during parameter validation - likely ArgumentException or ArgumentNullException";
const STATE_HINT: &str = "Code contains state checks - consider InvalidOperationException";
const NOT_SUPPORTED_HINT: &str =
    "Contains 'not supported' message - consider NotSupportedException or NotImplementedException";

#[test]
fn divide_scenario_extracts_method_and_message() {
    let source = r#"
class Calculator {
    public int Divide(int a, int b) {
        throw new Exception("Denominator was zero");
    }
}
"#;
    let record = record_for(source);
    let method = record.method.expect("method info");
    assert_eq!(method.name, "Divide");
    assert_eq!(method.modifiers, vec!["public".to_string()]);
    assert_eq!(
        method.parameters,
        vec![
            ("int".to_string(), "a".to_string()),
            ("int".to_string(), "b".to_string())
        ]
    );
    assert_eq!(method.return_type, "int");
    assert_eq!(record.class_name.as_deref(), Some("Calculator"));
    assert_eq!(record.arguments, vec!["Denominator was zero".to_string()]);

    // The throw is the first body statement, so only the positional hint
    // fires; no keyword-based hints.
    assert_eq!(record.hints, vec![PARAM_HINT.to_string()]);
}

#[test]
fn set_name_scenario_yields_null_and_validation_hints() {
    let source = r#"
class Person {
    public void SetName(string name) {
        if (name == null) throw new Exception("name is null");
        _name = name;
    }
}
"#;
    let record = record_for(source);
    assert!(record.hints.contains(&NULL_HINT.to_string()));
    assert!(record.hints.contains(&PARAM_HINT.to_string()));
    assert_eq!(record.enclosing_label, Some("if statement"));
}

#[test]
fn validation_hint_boundary_at_three_statements() {
    let early = r#"
class C {
    void M(int x) {
        var a = 1;
        var b = 2;
        if (x < 0) throw new Exception("negative");
    }
}
"#;
    assert!(
        record_for(early).hints.contains(&PARAM_HINT.to_string()),
        "statement index 2 is still validation"
    );

    let late = r#"
class C {
    void M(int x) {
        var a = 1;
        var b = 2;
        var c = 3;
        if (x < 0) throw new Exception("negative");
    }
}
"#;
    assert!(
        !record_for(late).hints.contains(&PARAM_HINT.to_string()),
        "statement index 3 is past the validation window"
    );
}

#[test]
fn state_and_not_supported_hints() {
    let source = r#"
class C {
    void M() {
        var ready = true;
        var ok = true;
        var done = false;
        if (!IsInitialized) throw new Exception("operation is not supported here");
    }
}
"#;
    let record = record_for(source);
    assert!(record.hints.contains(&STATE_HINT.to_string()));
    assert!(record.hints.contains(&NOT_SUPPORTED_HINT.to_string()));
}

#[test]
fn record_without_enclosing_method_degrades_gracefully() {
    let source = r#"
class C {
    C() {
        throw new Exception("no method here");
    }
}
"#;
    let record = record_for(source);
    assert!(record.method.is_none());
    assert_eq!(record.class_name.as_deref(), Some("C"));
    assert!(record.hints.is_empty(), "hints need a method body");

    let rendered = record.to_string();
    assert!(!rendered.contains("=== Method Information ==="));
    assert!(rendered.contains("=== Exception Details ==="));
}

#[test]
fn subsequent_arguments_labeled_by_position() {
    let source = r#"
class C {
    void M() {
        throw new Exception("first", inner);
    }
}
"#;
    let record = record_for(source);
    assert_eq!(
        record.arguments,
        vec!["first".to_string(), "inner".to_string()]
    );
    let rendered = record.to_string();
    assert!(rendered.contains("Message: \"first\""));
    assert!(rendered.contains("Argument 2: inner"));
}

#[test]
fn no_arguments_renders_none_provided() {
    let source = r#"
class C {
    void M() {
        throw new Exception();
    }
}
"#;
    let record = record_for(source);
    assert!(record.arguments.is_empty());
    assert!(record.to_string().contains("Message: (none provided)"));
}

#[test]
fn parameterless_method_renders_none() {
    let source = r#"
class C {
    private static void Run() {
        throw new Exception("x");
    }
}
"#;
    let record = record_for(source);
    let method = record.method.clone().expect("method info");
    assert_eq!(method.modifiers, vec!["private".to_string(), "static".to_string()]);
    assert!(method.parameters.is_empty());
    assert!(record.to_string().contains("Parameters: none"));
}

#[test]
fn enclosing_label_only_for_immediate_parent() {
    // Braced if: the throw's immediate parent is the block, not the if, so
    // the label is omitted.
    let source = r#"
class C {
    void M(int x) {
        if (x < 0) {
            throw new Exception("negative");
        }
    }
}
"#;
    assert_eq!(record_for(source).enclosing_label, None);
}

#[test]
fn extraction_is_idempotent_for_unchanged_tree() {
    let source = r#"
class C {
    void M(string s) {
        if (s == null) throw new Exception("s");
    }
}
"#;
    let doc = Document::parse(source).expect("parse");
    let (first, second) = doc.with_read(|view| {
        let site = matcher::candidates(view).next().expect("site");
        (extract(view, site), extract(view, site))
    });
    assert_eq!(first, second);
}

#[test]
fn argument_list_text_keeps_source_form() {
    let source = r#"
class C {
    void M() {
        throw new Exception("boom", inner);
    }
}
"#;
    let doc = Document::parse(source).expect("parse");
    let args = doc.with_read(|view| {
        let site = matcher::candidates(view).next().expect("site");
        argument_list_text(view, site)
    });
    assert_eq!(args, "(\"boom\", inner)");
}
