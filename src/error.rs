use thiserror::Error;

const UNKNOWN_DETAIL: &str = "An unknown error occurred.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("base URL cannot carry a path")]
    BaseUrl,
}

impl ApiError {
    /// Message shown to the operator: the backend's `detail` when it sent one.
    pub fn detail(&self) -> String {
        match self {
            ApiError::Status { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }

    /// Builds a status error from a non-success response body.
    pub fn from_body(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|json| json.get("detail").cloned())
            .map(|detail| match detail {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| UNKNOWN_DETAIL.to_string());
        ApiError::Status { status, detail }
    }
}

/// Presence checks. The display text is what the operator sees in the alert.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter at least a name and phone number.")]
    MissingNameOrPhone,
    #[error("Please select a Campaign Structure.")]
    NoCampaignSelected,
    #[error("Please enter a Meta Template Name.")]
    MissingTemplateName,
    #[error("Please load or add customers.")]
    NoCustomers,
    #[error("Template name and body are required.")]
    MissingTemplateFields,
    #[error("Please select a preset to delete.")]
    NoPresetSelected,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("stored presets are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no data directory available")]
    NoDataDir,
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
