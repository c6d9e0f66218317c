/// Detection of `throw new Exception(...)` construction sites.
use crate::analysis::tree::{DocView, NodeId, NodeRef};

/// Fully-qualified name of the generic base exception type.
pub const GENERIC_EXCEPTION: &str = "System.Exception";

/// A construction expression eligible for the AI rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateSite {
    /// The `object_creation_expression` node.
    pub node: NodeRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    GenericExceptionUsage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Hint,
    Suggestion,
    Warning,
    Error,
}

/// Static severity/category metadata, replacing runtime registration.
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticDescriptor {
    pub severity: Severity,
    pub category: &'static str,
    pub message: &'static str,
}

impl DiagnosticKind {
    pub const fn descriptor(self) -> DiagnosticDescriptor {
        match self {
            DiagnosticKind::GenericExceptionUsage => DiagnosticDescriptor {
                severity: Severity::Suggestion,
                category: "best-practice",
                message: "Consider using a more specific exception type",
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub site: CandidateSite,
    /// Zero-based position of the construction expression.
    pub line: usize,
    pub column: usize,
}

/// Lazily yield every candidate site in the file. Read-only; an empty result
/// is a valid outcome.
pub fn candidates<'v>(view: &'v DocView<'v>) -> impl Iterator<Item = CandidateSite> + 'v {
    view.tree
        .descendants()
        .filter(|&id| view.tree.kind(id) == "throw_statement")
        .filter_map(|throw| creation_of_generic_exception(view, throw))
        .map(|creation| CandidateSite {
            node: view.node_ref(creation),
        })
}

/// Run the matcher over the whole file and produce diagnostics for the host.
pub fn analyze(view: &DocView<'_>) -> Vec<Diagnostic> {
    candidates(view)
        .map(|site| {
            let (line, column) = view.tree.position(site.node.id);
            Diagnostic {
                kind: DiagnosticKind::GenericExceptionUsage,
                site,
                line,
                column,
            }
        })
        .collect()
}

fn creation_of_generic_exception(view: &DocView<'_>, throw: NodeId) -> Option<NodeId> {
    // Operand of the throw; rethrows (`throw;`) have no named child and
    // `throw ex;` carries an identifier, not a creation expression.
    let operand = view.tree.named_children(throw).next()?;
    if view.tree.kind(operand) != "object_creation_expression" {
        return None;
    }
    let type_node = view.tree.child_by_field(operand, "type")?;
    if is_generic_exception_type(view.text(type_node)) {
        Some(operand)
    } else {
        None
    }
}

/// Textual resolution of the declared type. Exactly the generic base type
/// qualifies; any subtype already carries specific semantics and is excluded.
pub fn is_generic_exception_type(type_text: &str) -> bool {
    let name = type_text.trim().trim_start_matches("global::");
    name == "Exception" || name == GENERIC_EXCEPTION
}
