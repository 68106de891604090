use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

/// One extracted record from the preview endpoint, keyed by field id.
pub type PreviewRow = Map<String, Value>;

/// Field descriptor exactly as the server sends it; every part is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct WireField {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReply {
    pub session_id: String,
    pub fields: Vec<WireField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessReply {
    pub download_url: String,
}

/// Results of engine commands, delivered in completion order.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    UploadCompleted {
        request: u64,
        result: Result<UploadReply, ApiError>,
    },
    PreviewCompleted {
        request: u64,
        result: Result<Vec<PreviewRow>, ApiError>,
    },
    ProcessCompleted(Result<ProcessReply, ApiError>),
    DownloadCompleted(Result<PathBuf, ApiError>),
    TimerFired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn rejected(server_message: Option<String>) -> Self {
        let message = server_message
            .clone()
            .unwrap_or_else(|| "request rejected".to_string());
        Self::new(ApiErrorKind::Rejected { server_message }, message)
    }

    /// The server's own explanation, when it answered with `{error}`.
    pub fn server_message(&self) -> Option<&str> {
        match &self.kind {
            ApiErrorKind::Rejected { server_message } => server_message.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ApiError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorKind {
    InvalidUrl,
    /// Answer parsed, but without `success: true`.
    Rejected { server_message: Option<String> },
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
    Io,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::InvalidUrl => write!(f, "invalid url"),
            ApiErrorKind::Rejected { .. } => write!(f, "rejected by server"),
            ApiErrorKind::HttpStatus(code) => write!(f, "http status {code}"),
            ApiErrorKind::Timeout => write!(f, "timeout"),
            ApiErrorKind::Network => write!(f, "network error"),
            ApiErrorKind::Decode => write!(f, "malformed response"),
            ApiErrorKind::Io => write!(f, "io error"),
        }
    }
}

/// Common `{success, error}` wrapper around every endpoint's payload.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub(crate) success: bool,
    #[serde(default)]
    pub(crate) error: Option<String>,
    #[serde(flatten)]
    pub(crate) body: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadBody {
    #[serde(default)]
    pub(crate) session_id: Option<String>,
    #[serde(default)]
    pub(crate) default_fields: Option<Vec<WireField>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PreviewBody {
    #[serde(default)]
    pub(crate) preview: Option<PreviewPayload>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct PreviewPayload {
    #[serde(default)]
    pub(crate) preview_data: Option<Vec<PreviewRow>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProcessBody {
    #[serde(default)]
    pub(crate) download_url: Option<String>,
}

/// Body of non-JSON-envelope error answers, such as a failed download.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub(crate) error: Option<String>,
}
