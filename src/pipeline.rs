/// The fix pipeline: settings gate, context extraction, inference round-trip,
/// and concurrency-safe application of the rewrite.
use std::sync::Arc;

use anyhow::Result;
use thiserror::Error;

use crate::analysis::context::{argument_list_text, extract};
use crate::analysis::matcher::CandidateSite;
use crate::analysis::tree::{Document, ReplaceError};
use crate::config::SettingsStore;
use crate::prompt::build_prompt;
use crate::providers::OllamaClient;

/// User-notification sink. The host decides how to surface messages; the
/// default routes them into the log.
pub trait Notifier: Send + Sync {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }
}

#[derive(Debug, Error)]
pub enum FixError {
    /// The replacement transaction could not complete. Surfaced to the user
    /// and fatal to this fix attempt only; never retried.
    #[error("replacement transaction failed: {0}")]
    Transaction(String),
}

/// Terminal state of one fix invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixOutcome {
    Applied { suggestion: String },
    /// Feature flag off; no extraction, no network call.
    Disabled,
    /// The site was invalidated between trigger and apply. Silent.
    StaleSite,
    /// Transport failure or empty model response; no mutation.
    NoSuggestion,
}

pub struct FixPipeline {
    client: OllamaClient,
    store: SettingsStore,
    notifier: Arc<dyn Notifier>,
}

impl FixPipeline {
    pub fn new(store: SettingsStore) -> Result<Self> {
        Ok(Self {
            client: OllamaClient::new()?,
            store,
            notifier: Arc::new(LogNotifier),
        })
    }

    pub fn with_notifier(store: SettingsStore, notifier: Arc<dyn Notifier>) -> Result<Self> {
        Ok(Self {
            client: OllamaClient::new()?,
            store,
            notifier,
        })
    }

    /// Probe endpoint availability with a fresh settings snapshot.
    pub async fn check_available(&self) -> bool {
        let settings = self.store.snapshot();
        self.client.is_available(&settings).await
    }

    /// Run one fix attempt for `site`.
    ///
    /// The network call is the only suspension point; no lock is held across
    /// it. Validity is checked once under the read lock before extraction and
    /// again inside the write lock when applying, so two attempts racing on
    /// the same site produce at most one mutation.
    pub async fn run(&self, doc: &Document, site: CandidateSite) -> Result<FixOutcome, FixError> {
        let settings = self.store.snapshot();
        if !settings.enable_ai_suggestions {
            self.notifier.info(
                "AI suggestions are disabled. Enable them in the Exception Advisor settings.",
            );
            return Ok(FixOutcome::Disabled);
        }

        let extraction = doc.with_read(|view| {
            if !view.is_valid(site.node) {
                return None;
            }
            let record = extract(view, site);
            let arguments = argument_list_text(view, site);
            Some((build_prompt(&record), arguments))
        });
        let Some((prompt, arguments)) = extraction else {
            return Ok(FixOutcome::StaleSite);
        };

        let Some(suggestion) = self.client.generate(&prompt, &settings).await else {
            self.notifier.info("AI provided no response.");
            return Ok(FixOutcome::NoSuggestion);
        };

        let replacement = format!("new {suggestion}{arguments}");
        match doc.replace_node(site.node, &replacement) {
            Ok(()) => {
                tracing::info!(%suggestion, "Replacement successful");
                Ok(FixOutcome::Applied { suggestion })
            }
            Err(ReplaceError::Stale) => Ok(FixOutcome::StaleSite),
            Err(ReplaceError::Transaction(detail)) => {
                self.notifier
                    .error(&format!("Error getting AI suggestion: {detail}"));
                Err(FixError::Transaction(detail))
            }
        }
    }
}
