/// Arena-backed C# syntax tree and the mutable document that owns it.
///
/// Tree-sitter nodes borrow from their tree, which makes them awkward to hand
/// across an await point. We flatten each parse into an arena of plain node
/// records addressed by stable indices; everything downstream holds a
/// `NodeRef` (index + document generation) and re-checks it before acting.
use std::sync::RwLock;

use once_cell::sync::Lazy;
use thiserror::Error;
use tree_sitter::{Language, Parser};

static CSHARP: Lazy<Language> = Lazy::new(|| tree_sitter_c_sharp::LANGUAGE.into());

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("source code cannot be empty")]
    EmptySource,

    #[error("failed to initialize C# grammar: {0}")]
    Language(String),

    #[error("parser rejected the source buffer")]
    ParseFailed,
}

/// Stable index of a node within one parsed tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
struct NodeData {
    kind: &'static str,
    field: Option<&'static str>,
    named: bool,
    start: usize,
    end: usize,
    line: usize,
    column: usize,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Immutable snapshot of one parse. Does not own the source text; callers pass
/// the matching source slice to `text`.
#[derive(Debug)]
pub struct SyntaxTree {
    nodes: Vec<NodeData>,
    has_error: bool,
}

impl SyntaxTree {
    pub fn parse(source: &str) -> Result<Self, TreeError> {
        if source.trim().is_empty() {
            return Err(TreeError::EmptySource);
        }

        let mut parser = Parser::new();
        parser
            .set_language(&CSHARP)
            .map_err(|e| TreeError::Language(e.to_string()))?;
        let tree = parser.parse(source, None).ok_or(TreeError::ParseFailed)?;

        // Iterative pre-order flatten; explicit stack avoids blowing the call
        // stack on deeply nested sources.
        let mut nodes: Vec<NodeData> = Vec::new();
        let mut has_error = false;
        let mut stack = vec![(tree.root_node(), None::<&'static str>, None::<NodeId>)];
        while let Some((ts_node, field, parent)) = stack.pop() {
            let id = NodeId(nodes.len() as u32);
            let pos = ts_node.start_position();
            has_error |= ts_node.is_error() || ts_node.is_missing();
            nodes.push(NodeData {
                kind: ts_node.kind(),
                field,
                named: ts_node.is_named(),
                start: ts_node.start_byte(),
                end: ts_node.end_byte(),
                line: pos.row,
                column: pos.column,
                parent,
                children: Vec::new(),
            });
            if let Some(p) = parent {
                nodes[p.index()].children.push(id);
            }

            let mut cursor = ts_node.walk();
            let mut kids = Vec::new();
            if cursor.goto_first_child() {
                loop {
                    kids.push((cursor.node(), cursor.field_name(), Some(id)));
                    if !cursor.goto_next_sibling() {
                        break;
                    }
                }
            }
            for kid in kids.into_iter().rev() {
                stack.push(kid);
            }
        }

        Ok(Self { nodes, has_error })
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn has_error(&self) -> bool {
        self.has_error
    }

    pub fn kind(&self, id: NodeId) -> &'static str {
        self.nodes[id.index()].kind
    }

    pub fn is_named(&self, id: NodeId) -> bool {
        self.nodes[id.index()].named
    }

    pub fn span(&self, id: NodeId) -> (usize, usize) {
        let n = &self.nodes[id.index()];
        (n.start, n.end)
    }

    /// Zero-based (line, column) of the node start.
    pub fn position(&self, id: NodeId) -> (usize, usize) {
        let n = &self.nodes[id.index()];
        (n.line, n.column)
    }

    pub fn text<'s>(&self, id: NodeId, source: &'s str) -> &'s str {
        let n = &self.nodes[id.index()];
        &source[n.start..n.end]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    pub fn named_children<'t>(&'t self, id: NodeId) -> impl Iterator<Item = NodeId> + 't {
        self.children(id).iter().copied().filter(|&c| self.is_named(c))
    }

    pub fn child_by_field(&self, id: NodeId, field: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&c| self.nodes[c.index()].field == Some(field))
    }

    /// All nodes in pre-order (arena indices are assigned in traversal order).
    pub fn descendants(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Ancestors of `id`, nearest first, excluding `id` itself.
    pub fn ancestors<'t>(&'t self, id: NodeId) -> impl Iterator<Item = NodeId> + 't {
        std::iter::successors(self.parent(id), move |&n| self.parent(n))
    }

    pub fn find_ancestor(&self, id: NodeId, kind: &str) -> Option<NodeId> {
        self.ancestors(id).find(|&a| self.kind(a) == kind)
    }

    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }
}

/// Reference to a node in a specific document generation. Becomes stale (and
/// is rejected everywhere) as soon as the document is edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRef {
    pub id: NodeId,
    pub generation: u64,
}

/// Read view over the current document state, handed out under the read lock.
pub struct DocView<'a> {
    pub source: &'a str,
    pub tree: &'a SyntaxTree,
    generation: u64,
}

impl<'a> DocView<'a> {
    pub fn is_valid(&self, node: NodeRef) -> bool {
        node.generation == self.generation
    }

    pub fn node_ref(&self, id: NodeId) -> NodeRef {
        NodeRef {
            id,
            generation: self.generation,
        }
    }

    pub fn text(&self, id: NodeId) -> &'a str {
        self.tree.text(id, self.source)
    }
}

#[derive(Debug, Error)]
pub enum ReplaceError {
    /// The document changed after the reference was taken. Silent no-op for
    /// callers: the fix simply no longer applies.
    #[error("candidate site is no longer valid")]
    Stale,

    #[error("replacement transaction failed: {0}")]
    Transaction(String),
}

struct DocState {
    source: String,
    tree: SyntaxTree,
    generation: u64,
}

/// A parsed source document. The write lock is the single exclusive mutation
/// lock for the tree; every structural edit goes through `replace_node` and
/// bumps the generation, invalidating all outstanding `NodeRef`s.
pub struct Document {
    state: RwLock<DocState>,
}

impl Document {
    pub fn parse(source: impl Into<String>) -> Result<Self, TreeError> {
        let source = source.into();
        let tree = SyntaxTree::parse(&source)?;
        Ok(Self {
            state: RwLock::new(DocState {
                source,
                tree,
                generation: 0,
            }),
        })
    }

    pub fn with_read<R>(&self, f: impl FnOnce(&DocView<'_>) -> R) -> R {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        f(&DocView {
            source: &state.source,
            tree: &state.tree,
            generation: state.generation,
        })
    }

    pub fn source(&self) -> String {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state.source.clone()
    }

    /// Replace `site`'s text with `replacement` as one atomic transaction:
    /// generation re-check, replacement parse validation, splice, full reparse,
    /// generation bump. Readers never observe a half-edited tree.
    pub fn replace_node(&self, site: NodeRef, replacement: &str) -> Result<(), ReplaceError> {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        if site.generation != state.generation {
            return Err(ReplaceError::Stale);
        }

        // Validate the replacement in the same language context before
        // touching the document, mirroring an element-factory parse.
        if !parses_as_throw_operand(replacement) {
            return Err(ReplaceError::Transaction(format!(
                "replacement is not a valid C# expression: {replacement}"
            )));
        }

        let (start, end) = state.tree.span(site.id);
        let mut next = String::with_capacity(state.source.len() + replacement.len());
        next.push_str(&state.source[..start]);
        next.push_str(replacement);
        next.push_str(&state.source[end..]);

        let tree = SyntaxTree::parse(&next).map_err(|e| ReplaceError::Transaction(e.to_string()))?;
        state.source = next;
        state.tree = tree;
        state.generation += 1;
        Ok(())
    }
}

fn parses_as_throw_operand(expression: &str) -> bool {
    let snippet = format!("throw {expression};");
    match SyntaxTree::parse(&snippet) {
        Ok(tree) => !tree.has_error(),
        Err(_) => false,
    }
}
