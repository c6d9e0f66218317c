/// External service providers for AI integrations.
pub mod ollama;

pub use ollama::{normalize_exception_name, OllamaClient};
