use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use exception_advisor::analysis::matcher;
use exception_advisor::analysis::tree::ReplaceError;
use exception_advisor::pipeline::{FixOutcome, FixPipeline, Notifier};
use exception_advisor::{CandidateSite, Document, SettingsStore};

const SOURCE: &str = r#"
class Person {
    public void SetName(string name) {
        if (name == null) throw new Exception("name is null");
        _name = name;
    }
}
"#;

fn first_site(doc: &Document) -> CandidateSite {
    doc.with_read(|view| matcher::candidates(view).next().expect("candidate site"))
}

#[test]
fn replace_rewrites_construction_in_place() {
    let doc = Document::parse(SOURCE).expect("parse");
    let site = first_site(&doc);

    doc.replace_node(site.node, "new ArgumentNullException(\"name is null\")")
        .expect("replacement");

    let out = doc.source();
    assert!(out.contains("throw new ArgumentNullException(\"name is null\");"));
    assert!(!out.contains("new Exception("));
}

#[test]
fn stale_site_is_rejected_after_any_edit() {
    let doc = Document::parse(SOURCE).expect("parse");
    let site = first_site(&doc);

    doc.replace_node(site.node, "new ArgumentNullException(\"name is null\")")
        .expect("first replacement");

    // Same reference again: the document moved on, so this must be a no-op.
    let err = doc
        .replace_node(site.node, "new InvalidOperationException()")
        .expect_err("stale reference");
    assert!(matches!(err, ReplaceError::Stale));
    assert!(doc.source().contains("ArgumentNullException"));
}

#[test]
fn at_most_one_mutation_per_site() {
    let doc = Document::parse(SOURCE).expect("parse");
    let site = first_site(&doc);

    let results = [
        doc.replace_node(site.node, "new ArgumentNullException(\"a\")"),
        doc.replace_node(site.node, "new InvalidOperationException(\"b\")"),
    ];
    let applied = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(applied, 1, "exactly one racing fix may mutate");
    assert!(doc.source().contains("ArgumentNullException"));
    assert!(!doc.source().contains("InvalidOperationException"));
}

#[test]
fn invalid_replacement_is_a_transaction_failure() {
    let doc = Document::parse(SOURCE).expect("parse");
    let site = first_site(&doc);

    let err = doc
        .replace_node(site.node, "new ???(")
        .expect_err("garbage replacement");
    assert!(matches!(err, ReplaceError::Transaction(_)));
    // Failed transaction leaves the document untouched and the site valid.
    assert!(doc.source().contains("new Exception("));
    doc.replace_node(site.node, "new ArgumentNullException()")
        .expect("site still valid after failed transaction");
}

#[test]
fn parameterless_throw_gets_empty_argument_list() {
    let source = r#"
class C {
    void M() {
        throw new Exception();
    }
}
"#;
    let doc = Document::parse(source).expect("parse");
    let site = first_site(&doc);
    let args = doc.with_read(|view| {
        exception_advisor::analysis::context::argument_list_text(view, site)
    });
    assert_eq!(args, "()");

    doc.replace_node(site.node, &format!("new NotImplementedException{args}"))
        .expect("replacement");
    assert!(doc.source().contains("throw new NotImplementedException();"));
}

#[derive(Default)]
struct RecordingNotifier {
    infos: AtomicUsize,
    errors: AtomicUsize,
}

impl Notifier for RecordingNotifier {
    fn info(&self, _message: &str) {
        self.infos.fetch_add(1, Ordering::SeqCst);
    }

    fn error(&self, _message: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }
}

fn store_with(json: &str) -> (SettingsStore, tempfile::NamedTempFile) {
    let mut file = tempfile::NamedTempFile::new().expect("tmp config");
    writeln!(file, "{json}").expect("write config");
    (SettingsStore::with_path(file.path()), file)
}

#[tokio::test]
async fn disabled_flag_short_circuits_with_notification() {
    let (store, _guard) = store_with(r#"{"enable_ai_suggestions": false}"#);
    let notifier = Arc::new(RecordingNotifier::default());
    let pipeline = FixPipeline::with_notifier(store, notifier.clone()).expect("pipeline");

    let doc = Document::parse(SOURCE).expect("parse");
    let site = first_site(&doc);

    let outcome = pipeline.run(&doc, site).await.expect("pipeline run");
    assert_eq!(outcome, FixOutcome::Disabled);
    assert_eq!(notifier.infos.load(Ordering::SeqCst), 1);
    assert_eq!(notifier.errors.load(Ordering::SeqCst), 0);
    assert!(doc.source().contains("new Exception("), "no mutation when disabled");
}

#[tokio::test]
async fn unreachable_endpoint_yields_no_suggestion_and_no_mutation() {
    // Port 1 refuses immediately; the transport failure must be swallowed.
    let (store, _guard) = store_with(r#"{"ollama_url": "http://127.0.0.1:1"}"#);
    let notifier = Arc::new(RecordingNotifier::default());
    let pipeline = FixPipeline::with_notifier(store, notifier.clone()).expect("pipeline");

    let doc = Document::parse(SOURCE).expect("parse");
    let site = first_site(&doc);

    let outcome = pipeline.run(&doc, site).await.expect("no error crosses the boundary");
    assert_eq!(outcome, FixOutcome::NoSuggestion);
    assert_eq!(notifier.infos.load(Ordering::SeqCst), 1, "no-response notice");
    assert!(doc.source().contains("new Exception("));
}

#[tokio::test]
async fn stale_site_discards_silently_in_pipeline() {
    let (store, _guard) = store_with(r#"{"ollama_url": "http://127.0.0.1:1"}"#);
    let notifier = Arc::new(RecordingNotifier::default());
    let pipeline = FixPipeline::with_notifier(store, notifier.clone()).expect("pipeline");

    let doc = Document::parse(SOURCE).expect("parse");
    let site = first_site(&doc);
    // Invalidate the site before the fix runs.
    doc.replace_node(site.node, "new ArgumentNullException()")
        .expect("edit");

    let outcome = pipeline.run(&doc, site).await.expect("pipeline run");
    assert_eq!(outcome, FixOutcome::StaleSite);
    assert_eq!(notifier.infos.load(Ordering::SeqCst), 0, "silent discard");
    assert_eq!(notifier.errors.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn availability_probe_swallows_connection_errors() {
    let (store, _guard) = store_with(r#"{"ollama_url": "http://127.0.0.1:1"}"#);
    let pipeline = FixPipeline::new(store).expect("pipeline");
    assert!(!pipeline.check_available().await);
}
