use std::path::PathBuf;

use crate::{format_file_size, RequestId};
use crate::preview::{PreviewRow, PreviewTable};
use crate::view_model::{AppViewModel, FieldRowView, ProgressView};

/// A document the user picked, as shown in the upload panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub path: PathBuf,
    pub name: String,
    pub size_bytes: u64,
    pub size_label: String,
}

impl FileInfo {
    pub fn new(path: PathBuf, name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            path,
            name: name.into(),
            size_bytes,
            size_label: format_file_size(size_bytes),
        }
    }
}

/// An extractable attribute the server found in the uploaded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub id: String,
    pub name: String,
    /// Optional type hint (`text`, `date`, ...), display only.
    pub kind: Option<String>,
}

impl FieldDescriptor {
    /// Fills whichever of `id`/`name` is missing from the other.
    ///
    /// Returns `None` when both are absent or blank.
    pub fn from_parts(id: Option<String>, name: Option<String>, kind: Option<String>) -> Option<Self> {
        let id = id.filter(|s| !s.is_empty());
        let name = name.filter(|s| !s.is_empty());
        let id = id.or_else(|| name.clone())?;
        let name = name.unwrap_or_else(|| id.clone());
        Some(Self { id, name, kind })
    }
}

/// Where the wizard currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WizardStep {
    #[default]
    Empty,
    FileValidated,
    Uploaded,
    Selected,
    Previewed,
    Processing,
    Processed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Session {
    pub(crate) id: String,
    pub(crate) file: FileInfo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingUpload {
    request: RequestId,
    file: FileInfo,
}

/// Preview in flight, with the field ids it asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingPreview {
    request: RequestId,
    fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldEntry {
    descriptor: FieldDescriptor,
    checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) enum ProcessPhase {
    #[default]
    Idle,
    Running,
    /// Server finished; the link is revealed after a short cosmetic delay.
    Finishing { download_url: String },
    Done { download_url: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) enum DownloadPhase {
    #[default]
    Idle,
    InFlight,
    Saved(PathBuf),
}

const PROGRESS_RUNNING: u8 = 30;
const PROGRESS_COMPLETE: u8 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    /// Last issued request id; survives `clear` so answers to requests made
    /// before a reset never match a new one.
    last_request: u64,
    /// Latest upload; its file is shown in place of the session's file until
    /// the server answers.
    pending_upload: Option<PendingUpload>,
    session: Option<Session>,
    fields: Vec<FieldEntry>,
    pending_preview: Option<PendingPreview>,
    preview: Option<PreviewTable>,
    process: ProcessPhase,
    download: DownloadPhase,
    exported_preview: Option<PathBuf>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let selected_count = self.fields.iter().filter(|entry| entry.checked).count();
        let fields_visible = self.session.is_some();
        let process_visible = fields_visible && selected_count > 0;

        let progress = match &self.process {
            ProcessPhase::Running => Some(ProgressView {
                percent: PROGRESS_RUNNING,
                label: "Обработка файла...".to_string(),
            }),
            ProcessPhase::Finishing { .. } => Some(ProgressView {
                percent: PROGRESS_COMPLETE,
                label: "Обработка завершена!".to_string(),
            }),
            ProcessPhase::Idle | ProcessPhase::Done { .. } => None,
        };

        let download_url = match &self.process {
            ProcessPhase::Done { download_url } => Some(download_url.clone()),
            _ => None,
        };

        AppViewModel {
            step: self.step(),
            file: self.displayed_file().cloned(),
            uploading: self.pending_upload.is_some(),
            session_id: self.session.as_ref().map(|session| session.id.clone()),
            fields_visible,
            fields: self
                .fields
                .iter()
                .map(|entry| FieldRowView {
                    id: entry.descriptor.id.clone(),
                    name: entry.descriptor.name.clone(),
                    kind: entry.descriptor.kind.clone(),
                    checked: entry.checked,
                })
                .collect(),
            selected_count,
            preview_visible: self.pending_preview.is_some() || self.preview.is_some(),
            preview_loading: self.pending_preview.is_some(),
            preview: self.preview.clone(),
            exported_preview: self.exported_preview.clone(),
            process_visible,
            process_enabled: matches!(self.process, ProcessPhase::Idle),
            process_busy: matches!(
                self.process,
                ProcessPhase::Running | ProcessPhase::Finishing { .. }
            ),
            progress,
            result_visible: download_url.is_some(),
            download_url,
            download_in_flight: matches!(self.download, DownloadPhase::InFlight),
            saved_download: match &self.download {
                DownloadPhase::Saved(path) => Some(path.clone()),
                _ => None,
            },
            dirty: self.dirty,
        }
    }

    /// Highest wizard step reached so far.
    pub fn step(&self) -> WizardStep {
        match &self.process {
            ProcessPhase::Done { .. } => return WizardStep::Processed,
            ProcessPhase::Running | ProcessPhase::Finishing { .. } => {
                return WizardStep::Processing
            }
            ProcessPhase::Idle => {}
        }
        if self.session.is_some() {
            if self.preview.is_some() {
                WizardStep::Previewed
            } else if self.selected_fields().is_empty() {
                WizardStep::Uploaded
            } else {
                WizardStep::Selected
            }
        } else if self.pending_upload.is_some() {
            WizardStep::FileValidated
        } else {
            WizardStep::Empty
        }
    }

    /// Checked field ids in field order.
    pub fn selected_fields(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|entry| entry.checked)
            .map(|entry| entry.descriptor.id.clone())
            .collect()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session.as_ref().map(|session| session.id.as_str())
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn displayed_file(&self) -> Option<&FileInfo> {
        self.pending_upload
            .as_ref()
            .map(|pending| &pending.file)
            .or_else(|| self.session.as_ref().map(|session| &session.file))
    }

    /// Drops everything the wizard collected. The dirty flag is raised so the
    /// cleared screen gets rendered.
    pub(crate) fn clear(&mut self) {
        *self = Self {
            last_request: self.last_request,
            dirty: true,
            ..Self::default()
        };
    }

    fn next_request(&mut self) -> RequestId {
        self.last_request += 1;
        RequestId::new(self.last_request)
    }

    /// Starts an upload, superseding any upload still in flight.
    pub(crate) fn begin_upload(&mut self, file: FileInfo) -> RequestId {
        let request = self.next_request();
        self.pending_upload = Some(PendingUpload { request, file });
        self.mark_dirty();
        request
    }

    pub(crate) fn is_current_upload(&self, request: RequestId) -> bool {
        self.pending_upload
            .as_ref()
            .is_some_and(|pending| pending.request == request)
    }

    pub(crate) fn pending_file_name(&self) -> Option<&str> {
        self.pending_upload
            .as_ref()
            .map(|pending| pending.file.name.as_str())
    }

    /// Promotes the pending file to a fresh session with every field checked.
    pub(crate) fn complete_upload(&mut self, session_id: String, fields: Vec<FieldDescriptor>) {
        let Some(PendingUpload { file, .. }) = self.pending_upload.take() else {
            return;
        };
        self.session = Some(Session {
            id: session_id,
            file,
        });
        self.fields = fields
            .into_iter()
            .map(|descriptor| FieldEntry {
                descriptor,
                checked: true,
            })
            .collect();
        self.pending_preview = None;
        self.preview = None;
        self.exported_preview = None;
        self.process = ProcessPhase::Idle;
        self.download = DownloadPhase::Idle;
        self.mark_dirty();
    }

    pub(crate) fn abandon_upload(&mut self) {
        if self.pending_upload.take().is_some() {
            self.mark_dirty();
        }
    }

    pub(crate) fn toggle_field(&mut self, field_id: &str) -> bool {
        match self
            .fields
            .iter_mut()
            .find(|entry| entry.descriptor.id == field_id)
        {
            Some(entry) => {
                entry.checked = !entry.checked;
                self.mark_dirty();
                true
            }
            None => false,
        }
    }

    pub(crate) fn set_all_fields(&mut self, checked: bool) {
        if self.fields.is_empty() {
            return;
        }
        for entry in &mut self.fields {
            entry.checked = checked;
        }
        self.mark_dirty();
    }

    /// Starts a preview of `fields`, superseding any preview still in flight.
    pub(crate) fn begin_preview(&mut self, fields: Vec<String>) -> RequestId {
        let request = self.next_request();
        self.pending_preview = Some(PendingPreview { request, fields });
        self.mark_dirty();
        request
    }

    pub(crate) fn is_current_preview(&self, request: RequestId) -> bool {
        self.pending_preview
            .as_ref()
            .is_some_and(|pending| pending.request == request)
    }

    /// Lays out `rows` under the fields the pending preview asked for, even if
    /// the selection changed while it was in flight.
    pub(crate) fn apply_preview(&mut self, rows: &[PreviewRow]) {
        let Some(PendingPreview { fields, .. }) = self.pending_preview.take() else {
            return;
        };
        let descriptors: Vec<FieldDescriptor> = self
            .fields
            .iter()
            .map(|entry| entry.descriptor.clone())
            .collect();
        self.preview = Some(PreviewTable::build(&descriptors, &fields, rows));
        self.exported_preview = None;
        self.mark_dirty();
    }

    pub(crate) fn stop_preview_loading(&mut self) {
        if self.pending_preview.take().is_some() {
            self.mark_dirty();
        }
    }

    pub(crate) fn preview(&self) -> Option<&PreviewTable> {
        self.preview.as_ref()
    }

    pub(crate) fn set_exported_preview(&mut self, path: PathBuf) {
        self.exported_preview = Some(path);
        self.mark_dirty();
    }

    pub(crate) fn process_phase(&self) -> &ProcessPhase {
        &self.process
    }

    pub(crate) fn set_process_phase(&mut self, phase: ProcessPhase) {
        self.process = phase;
        self.mark_dirty();
    }

    pub(crate) fn download_phase(&self) -> &DownloadPhase {
        &self.download
    }

    pub(crate) fn set_download_phase(&mut self, phase: DownloadPhase) {
        self.download = phase;
        self.mark_dirty();
    }
}
