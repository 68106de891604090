use std::path::PathBuf;

use crate::{FieldDescriptor, PreviewRow, RequestId};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User picked or dropped a file.
    FileChosen {
        path: PathBuf,
        name: String,
        size_bytes: u64,
    },
    /// User clicked the remove button on the file panel.
    FileRemoved,
    /// User asked to start over with a new file.
    ResetClicked,
    UploadSucceeded {
        request: RequestId,
        session_id: String,
        fields: Vec<FieldDescriptor>,
    },
    UploadFailed {
        request: RequestId,
        failure: RemoteFailure,
    },
    /// User flipped one field checkbox.
    FieldToggled { field_id: String },
    SelectAll,
    DeselectAll,
    PreviewClicked,
    PreviewLoaded {
        request: RequestId,
        rows: Vec<PreviewRow>,
    },
    PreviewFailed {
        request: RequestId,
        failure: RemoteFailure,
    },
    ProcessClicked,
    ProcessSucceeded { download_url: String },
    ProcessFailed(RemoteFailure),
    /// The cosmetic delay after processing elapsed.
    DownloadRevealed,
    DownloadClicked,
    DownloadSaved { path: PathBuf },
    DownloadFailed(RemoteFailure),
    /// User asked to save the preview table as HTML.
    ExportPreviewClicked,
    PreviewExported { path: PathBuf },
    PreviewExportFailed(String),
    /// Input that maps to nothing, such as an empty line.
    NoOp,
}

/// Why a server call did not produce a usable answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteFailure {
    /// The server answered without `success: true`, with its message if any.
    Rejected(Option<String>),
    /// The request never completed or the body was not the expected JSON.
    Transport(String),
}

impl RemoteFailure {
    /// Message to show the user; `fallback` names the failed action.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            RemoteFailure::Rejected(Some(message)) if !message.trim().is_empty() => {
                message.clone()
            }
            RemoteFailure::Rejected(_) => fallback.to_string(),
            RemoteFailure::Transport(cause) => format!("{fallback}: {cause}"),
        }
    }
}
