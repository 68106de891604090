use std::path::PathBuf;
use std::time::Duration;

/// Pause between the server finishing and the download link appearing.
pub const REVEAL_DOWNLOAD_DELAY: Duration = Duration::from_millis(500);

/// Tags an upload or preview request. Only the answer to the most recent one
/// is applied; answers to superseded requests are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send the document to the upload endpoint as multipart `file`.
    Upload {
        request: RequestId,
        path: PathBuf,
        file_name: String,
    },
    RequestPreview {
        request: RequestId,
        fields: Vec<String>,
    },
    RequestProcess { fields: Vec<String> },
    /// Deliver `Msg::DownloadRevealed` after `delay`.
    RevealDownloadAfter { delay: Duration },
    Download { url: String },
    WritePreviewHtml { html: String },
    /// Blocking, user-facing error message.
    ShowError(String),
    ShowNotice(String),
    ScrollToTop,
}
