/// Bounded structured context around a candidate site, rendered for the model.
use std::fmt;

use crate::analysis::matcher::CandidateSite;
use crate::analysis::tree::{DocView, NodeId};

/// Full block text is included verbatim up to this many lines; longer blocks
/// are truncated to a window around the throw.
const MAX_BLOCK_LINES: usize = 15;
const WINDOW_BEFORE: usize = 7;
const WINDOW_AFTER: usize = 8;

/// Throws within this many leading statements of the method body are treated
/// as parameter validation.
const VALIDATION_STATEMENT_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    pub modifiers: Vec<String>,
    pub name: String,
    /// (type, name) pairs in declaration order.
    pub parameters: Vec<(String, String)>,
    pub return_type: String,
}

/// Immutable value object built fresh per fix attempt; never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextRecord {
    /// `None` when no enclosing method declaration is reachable; the record
    /// degrades gracefully instead of aborting.
    pub method: Option<MethodInfo>,
    pub class_name: Option<String>,
    /// Constructor argument texts in order, quote characters stripped.
    pub arguments: Vec<String>,
    pub enclosing_label: Option<&'static str>,
    pub code_window: Option<String>,
    pub hints: Vec<String>,
}

/// Extract the context record for a candidate site. Read-only and idempotent
/// for an unchanged tree.
pub fn extract(view: &DocView<'_>, site: CandidateSite) -> ContextRecord {
    let creation = site.node.id;
    let tree = view.tree;

    let throw = tree.find_ancestor(creation, "throw_statement");
    let method = throw.and_then(|t| tree.find_ancestor(t, "method_declaration"));
    let class = throw.and_then(|t| tree.find_ancestor(t, "class_declaration"));

    ContextRecord {
        method: method.map(|m| method_info(view, m)),
        class_name: class
            .and_then(|c| tree.child_by_field(c, "name"))
            .map(|n| view.text(n).to_string()),
        arguments: argument_texts(view, creation),
        enclosing_label: throw
            .and_then(|t| tree.parent(t))
            .and_then(|p| statement_label(tree.kind(p))),
        code_window: throw
            .and_then(|t| tree.find_ancestor(t, "block"))
            .map(|b| code_window(view.text(b))),
        hints: analysis_hints(view, throw, method),
    }
}

/// Full text of the creation expression's argument list including parens, or
/// `()` when the source carries none.
pub fn argument_list_text(view: &DocView<'_>, site: CandidateSite) -> String {
    view.tree
        .child_by_field(site.node.id, "arguments")
        .map(|a| view.text(a).to_string())
        .unwrap_or_else(|| "()".to_string())
}

fn method_info(view: &DocView<'_>, method: NodeId) -> MethodInfo {
    let tree = view.tree;
    let modifiers = tree
        .children(method)
        .iter()
        .copied()
        .filter(|&c| tree.kind(c) == "modifier")
        .map(|c| view.text(c).to_string())
        .filter(|m| !m.trim().is_empty())
        .collect();

    let parameters = tree
        .child_by_field(method, "parameters")
        .map(|list| {
            tree.named_children(list)
                .filter(|&p| tree.kind(p) == "parameter")
                .filter_map(|p| {
                    let ty = tree.child_by_field(p, "type")?;
                    let name = tree.child_by_field(p, "name")?;
                    Some((view.text(ty).to_string(), view.text(name).to_string()))
                })
                .collect()
        })
        .unwrap_or_default();

    // Grammar revisions have used both field names for the return type.
    let return_type = tree
        .child_by_field(method, "returns")
        .or_else(|| tree.child_by_field(method, "type"))
        .map(|t| view.text(t).to_string())
        .unwrap_or_default();

    MethodInfo {
        modifiers,
        name: tree
            .child_by_field(method, "name")
            .map(|n| view.text(n).to_string())
            .unwrap_or_default(),
        parameters,
        return_type,
    }
}

fn argument_texts(view: &DocView<'_>, creation: NodeId) -> Vec<String> {
    let tree = view.tree;
    tree.child_by_field(creation, "arguments")
        .map(|list| {
            tree.named_children(list)
                .filter(|&a| tree.kind(a) == "argument")
                .map(|a| view.text(a).trim_matches('"').to_string())
                .collect()
        })
        .unwrap_or_default()
}

fn statement_label(kind: &str) -> Option<&'static str> {
    match kind {
        "if_statement" => Some("if statement"),
        "try_statement" => Some("try block"),
        "catch_clause" => Some("catch block"),
        "for_statement" => Some("for loop"),
        "for_each_statement" => Some("foreach loop"),
        "while_statement" => Some("while loop"),
        "switch_statement" => Some("switch statement"),
        _ => None,
    }
}

/// Truncate a block to a window around the throw line. The throw is located
/// by a best-effort text search; a line holding both "throw" and "Exception"
/// counts, with the block midpoint as fallback. Tolerant of imprecision by
/// design.
pub fn code_window(block_text: &str) -> String {
    let lines: Vec<&str> = block_text.split('\n').collect();
    if lines.len() <= MAX_BLOCK_LINES {
        return block_text.to_string();
    }

    let idx = lines
        .iter()
        .position(|l| l.contains("throw") && l.contains("Exception"))
        .unwrap_or(lines.len() / 2);
    let start = idx.saturating_sub(WINDOW_BEFORE);
    let end = (idx + WINDOW_AFTER).min(lines.len());

    let mut out = String::new();
    if start > 0 {
        out.push_str("... (code above omitted)\n");
    }
    for (i, line) in lines.iter().enumerate().take(end).skip(start) {
        out.push_str(line);
        if i == idx {
            out.push_str(" <-- HERE");
        }
        out.push('\n');
    }
    if end < lines.len() {
        out.push_str("... (code below omitted)\n");
    }
    out.truncate(out.trim_end_matches('\n').len());
    out
}

/// Heuristic hints mined from the method body's raw text. Advisory only;
/// false positives are expected.
fn analysis_hints(
    view: &DocView<'_>,
    throw: Option<NodeId>,
    method: Option<NodeId>,
) -> Vec<String> {
    let mut hints = Vec::new();
    let Some(method) = method else {
        return hints;
    };
    let Some(body) = view.tree.child_by_field(method, "body") else {
        return hints;
    };
    let body_text = view.text(body);

    if body_text.contains("== null") || body_text.contains("is null") {
        hints.push(
            "Code contains null checks - consider ArgumentNullException or NullReferenceException"
                .to_string(),
        );
    }

    if let Some(throw) = throw {
        if is_in_parameter_validation(view, body, throw) {
            hints.push(
                "Thrown during parameter validation - likely ArgumentException or ArgumentNullException"
                    .to_string(),
            );
        }
    }

    if body_text.contains("State")
        || body_text.contains("IsInitialized")
        || body_text.contains("IsValid")
    {
        hints.push("Code contains state checks - consider InvalidOperationException".to_string());
    }

    if body_text.contains("not supported") || body_text.contains("not implemented") {
        hints.push(
            "Contains 'not supported' message - consider NotSupportedException or NotImplementedException"
                .to_string(),
        );
    }

    hints
}

fn is_in_parameter_validation(view: &DocView<'_>, body: NodeId, throw: NodeId) -> bool {
    view.tree
        .named_children(body)
        .filter(|&c| view.tree.kind(c) != "comment")
        .take(VALIDATION_STATEMENT_COUNT)
        .any(|stmt| view.tree.contains(stmt, throw))
}

impl fmt::Display for ContextRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(method) = &self.method {
            writeln!(f, "=== Method Information ===")?;
            if !method.modifiers.is_empty() {
                writeln!(f, "Modifiers: {}", method.modifiers.join(" "))?;
            }
            writeln!(f, "Method: {}", method.name)?;
            if method.parameters.is_empty() {
                writeln!(f, "Parameters: none")?;
            } else {
                writeln!(f, "Parameters:")?;
                for (ty, name) in &method.parameters {
                    writeln!(f, "  - {ty} {name}")?;
                }
            }
            writeln!(f, "Returns: {}", method.return_type)?;
            writeln!(f)?;
        }

        if let Some(class_name) = &self.class_name {
            writeln!(f, "Class: {class_name}")?;
            writeln!(f)?;
        }

        writeln!(f, "=== Exception Details ===")?;
        if self.arguments.is_empty() {
            writeln!(f, "Message: (none provided)")?;
        } else {
            for (i, arg) in self.arguments.iter().enumerate() {
                if i == 0 {
                    writeln!(f, "Message: \"{arg}\"")?;
                } else {
                    writeln!(f, "Argument {}: {arg}", i + 1)?;
                }
            }
        }
        writeln!(f)?;

        writeln!(f, "=== Code Context ===")?;
        if let Some(label) = self.enclosing_label {
            writeln!(f, "Inside: {label}")?;
        }
        if let Some(window) = &self.code_window {
            writeln!(f, "{window}")?;
        }
        writeln!(f)?;

        writeln!(f, "=== Analysis Hints ===")?;
        if self.hints.is_empty() {
            writeln!(f, "- No specific patterns detected")?;
        } else {
            for hint in &self.hints {
                writeln!(f, "- {hint}")?;
            }
        }
        Ok(())
    }
}
