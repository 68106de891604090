use std::path::PathBuf;

use crate::{FileInfo, PreviewTable, WizardStep};

/// Everything the screen needs, derived from `AppState` on each render.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub step: WizardStep,
    /// File shown in the upload panel; `None` shows the upload prompt.
    pub file: Option<FileInfo>,
    pub uploading: bool,
    pub session_id: Option<String>,
    pub fields_visible: bool,
    pub fields: Vec<FieldRowView>,
    pub selected_count: usize,
    pub preview_visible: bool,
    pub preview_loading: bool,
    pub preview: Option<PreviewTable>,
    pub exported_preview: Option<PathBuf>,
    pub process_visible: bool,
    pub process_enabled: bool,
    pub process_busy: bool,
    pub progress: Option<ProgressView>,
    pub result_visible: bool,
    pub download_url: Option<String>,
    pub download_in_flight: bool,
    pub saved_download: Option<PathBuf>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRowView {
    pub id: String,
    pub name: String,
    pub kind: Option<String>,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressView {
    pub percent: u8,
    pub label: String,
}
