use serde::{Deserialize, Serialize};

/// A status frame pushed by the backend over `/ws/log`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub message: String,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    "info".to_string()
}

/// Styling tag of a log line. Unknown backend statuses render as info.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStatus {
    Info,
    Success,
    Warning,
    Error,
}

impl LogStatus {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "success" => LogStatus::Success,
            "warning" => LogStatus::Warning,
            "error" => LogStatus::Error,
            _ => LogStatus::Info,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            LogStatus::Info => "log-info",
            LogStatus::Success => "log-success",
            LogStatus::Warning => "log-warning",
            LogStatus::Error => "log-error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub time: String,
    pub message: String,
    pub status: LogStatus,
}

impl LogLine {
    pub fn now(message: impl Into<String>, status: LogStatus) -> Self {
        Self {
            time: chrono::Local::now().format("%H:%M:%S").to_string(),
            message: message.into(),
            status,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::now(message, LogStatus::Info)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::now(message, LogStatus::Success)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::now(message, LogStatus::Warning)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::now(message, LogStatus::Error)
    }

    pub fn render(&self) -> String {
        format!("[{}] {}", self.time, self.message)
    }
}

impl From<LogEvent> for LogLine {
    fn from(event: LogEvent) -> Self {
        LogLine::now(event.message, LogStatus::from_tag(&event.status))
    }
}
