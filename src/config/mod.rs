/// Connection settings for the inference endpoint.
///
/// Settings are externally mutable configuration: every pipeline invocation
/// takes a fresh snapshot via `SettingsStore::snapshot`, never a cached copy,
/// so mid-flight requests are unaffected by later changes.
use std::path::PathBuf;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "qwen2.5-coder:7b";
pub const DEFAULT_TEMPERATURE: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub endpoint: String,
    pub model: String,
    /// Sampling temperature on a 1-100 scale; divided by 100 before
    /// transmission. Out-of-range values fall back to the default.
    pub temperature: i64,
    pub enable_ai_suggestions: bool,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            enable_ai_suggestions: true,
        }
    }
}

impl ConnectionSettings {
    /// Endpoint base without a trailing slash, ready for path concatenation.
    pub fn normalized_endpoint(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }
}

pub fn clamp_temperature(value: i64) -> i64 {
    if value <= 0 || value > 100 {
        DEFAULT_TEMPERATURE
    } else {
        value
    }
}

/// Apply overrides from a JSON document onto `settings`. Unknown keys are
/// ignored; blank strings do not override.
pub fn apply_json(settings: &mut ConnectionSettings, json: &serde_json::Value) {
    if let Some(url) = json.get("ollama_url").and_then(|v| v.as_str()) {
        if !url.trim().is_empty() {
            settings.endpoint = url.to_string();
        }
    }
    if let Some(model) = json.get("ollama_model").and_then(|v| v.as_str()) {
        if !model.trim().is_empty() {
            settings.model = model.to_string();
        }
    }
    if let Some(temp) = json.get("temperature").and_then(|v| v.as_i64()) {
        settings.temperature = temp;
    }
    if let Some(enabled) = json.get("enable_ai_suggestions").and_then(|v| v.as_bool()) {
        settings.enable_ai_suggestions = enabled;
    }
}

/// Loads settings from an optional JSON config file plus environment
/// overrides. Reads everything from scratch on each `snapshot` call.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    config_path: PathBuf,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore {
    pub fn new() -> Self {
        let config_path = std::env::var("EXCEPTION_ADVISOR_CONFIG")
            .ok()
            .unwrap_or_else(|| ".exception-advisor.json".to_string());
        Self {
            config_path: PathBuf::from(config_path),
        }
    }

    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    pub fn snapshot(&self) -> ConnectionSettings {
        let mut settings = ConnectionSettings::default();

        if let Ok(text) = std::fs::read_to_string(&self.config_path) {
            match serde_json::from_str::<serde_json::Value>(&text) {
                Ok(json) => apply_json(&mut settings, &json),
                Err(err) => {
                    tracing::warn!(path = %self.config_path.display(), error = %err,
                        "Cannot parse config file, using defaults");
                }
            }
        }

        if let Ok(url) = std::env::var("OLLAMA_URL") {
            if !url.trim().is_empty() {
                settings.endpoint = url;
            }
        }
        if let Ok(model) = std::env::var("OLLAMA_MODEL") {
            if !model.trim().is_empty() {
                settings.model = model;
            }
        }
        if let Ok(temp) = std::env::var("AI_TEMPERATURE") {
            if let Ok(parsed) = temp.parse::<i64>() {
                settings.temperature = parsed;
            }
        }
        if let Ok(enabled) = std::env::var("ENABLE_AI_SUGGESTIONS") {
            settings.enable_ai_suggestions =
                !matches!(enabled.to_ascii_lowercase().as_str(), "false" | "0" | "off");
        }

        settings.temperature = clamp_temperature(settings.temperature);
        settings
    }
}
