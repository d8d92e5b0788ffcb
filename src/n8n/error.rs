//! n8n error model

/// Failures raised by the n8n client and provisioning flows.
///
/// Lookups that find nothing are not errors; they come back as `None`.
#[derive(Debug, thiserror::Error)]
pub enum N8nError {
    /// No usable credentials or an unusable base URL. Never retried.
    #[error("n8n configuration error: {0}")]
    Configuration(String),

    /// Non-2xx response from n8n.
    #[error("N8N API error {status}: {body}")]
    Api { status: u16, body: String },

    /// Connection failure or timeout.
    #[error("n8n request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// 2xx response whose body did not decode.
    #[error("failed to decode n8n response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Template lookup came back empty where a template is required.
    #[error("workflow template '{name}' not found; create it in n8n first")]
    TemplateNotFound { name: String },
}

impl N8nError {
    /// HTTP status for API errors
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, N8nError>;
