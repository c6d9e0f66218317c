//! AI-assisted rewriting of generic exception throws in C# source.
//!
//! The crate runs a four-stage pipeline over a parsed file: detect
//! `throw new Exception(...)` construction sites (exactly the base type,
//! never subtypes), extract a bounded context record around each site,
//! ask a local Ollama endpoint for a more specific exception type, and
//! apply the accepted rewrite in place under an exclusive document lock
//! with stale-site protection.

/// Syntax analysis: arena tree, matcher, context extraction.
pub mod analysis;

/// Connection settings and the fresh-snapshot settings store.
pub mod config;

/// Fix orchestration and notification seams.
pub mod pipeline;

/// Prompt template rendering.
pub mod prompt;

/// External service providers for AI integrations.
pub mod providers;

// Re-export commonly used types for convenience
pub use analysis::context::{extract, ContextRecord};
pub use analysis::matcher::{analyze, candidates, CandidateSite, Diagnostic, DiagnosticKind};
pub use analysis::tree::{Document, NodeRef, SyntaxTree};
pub use config::{ConnectionSettings, SettingsStore};
pub use pipeline::{FixOutcome, FixPipeline, Notifier};
pub use providers::OllamaClient;
