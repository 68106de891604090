use extractor_logging::{extractor_debug, extractor_info, extractor_warn};

use crate::state::{DownloadPhase, ProcessPhase};
use crate::{
    validate_file, AppState, Effect, FileInfo, Msg, ValidationError, REVEAL_DOWNLOAD_DELAY,
};

const UPLOAD_FALLBACK: &str = "Ошибка при загрузке файла";
const PREVIEW_FALLBACK: &str = "Ошибка при генерации превью";
const PROCESS_FALLBACK: &str = "Ошибка при обработке файла";
const DOWNLOAD_FALLBACK: &str = "Ошибка при скачивании файла";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FileChosen {
            path,
            name,
            size_bytes,
        } => {
            if let Err(err) = validate_file(&name, size_bytes) {
                extractor_info!("Rejected file {:?} ({} bytes): {:?}", name, size_bytes, err);
                return (state, vec![Effect::ShowError(err.to_string())]);
            }
            let request = state.begin_upload(FileInfo::new(path.clone(), name.clone(), size_bytes));
            extractor_info!("Uploading {:?} ({} bytes) as {:?}", name, size_bytes, request);
            vec![Effect::Upload {
                request,
                path,
                file_name: name,
            }]
        }
        Msg::UploadSucceeded {
            request,
            session_id,
            fields,
        } => {
            if !state.is_current_upload(request) {
                extractor_debug!("Dropping upload response {:?}: superseded or reset", request);
                return (state, Vec::new());
            }
            extractor_info!(
                "Upload of {:?} accepted: session={} fields={}",
                state.pending_file_name().unwrap_or_default(),
                session_id,
                fields.len()
            );
            state.complete_upload(session_id, fields);
            Vec::new()
        }
        Msg::UploadFailed { request, failure } => {
            if !state.is_current_upload(request) {
                extractor_debug!("Dropping upload failure {:?}: superseded or reset", request);
                return (state, Vec::new());
            }
            extractor_warn!("Upload failed: {:?}", failure);
            state.abandon_upload();
            vec![Effect::ShowError(failure.user_message(UPLOAD_FALLBACK))]
        }
        Msg::FileRemoved => {
            extractor_info!("File removed; clearing wizard");
            state.clear();
            Vec::new()
        }
        Msg::ResetClicked => {
            extractor_info!("Reset; clearing wizard");
            state.clear();
            vec![Effect::ScrollToTop]
        }
        Msg::FieldToggled { field_id } => {
            if !state.toggle_field(&field_id) {
                extractor_debug!("Toggle for unknown field {:?} ignored", field_id);
            }
            Vec::new()
        }
        Msg::SelectAll => {
            state.set_all_fields(true);
            Vec::new()
        }
        Msg::DeselectAll => {
            state.set_all_fields(false);
            Vec::new()
        }
        Msg::PreviewClicked => {
            let fields = state.selected_fields();
            if fields.is_empty() {
                return (
                    state,
                    vec![Effect::ShowError(ValidationError::EmptySelection.to_string())],
                );
            }
            let request = state.begin_preview(fields.clone());
            vec![Effect::RequestPreview { request, fields }]
        }
        Msg::PreviewLoaded { request, rows } => {
            if !state.is_current_preview(request) {
                extractor_debug!("Dropping preview response {:?}: superseded or reset", request);
                return (state, Vec::new());
            }
            extractor_info!("Preview loaded: {} rows", rows.len());
            state.apply_preview(&rows);
            Vec::new()
        }
        Msg::PreviewFailed { request, failure } => {
            if !state.is_current_preview(request) {
                extractor_debug!("Dropping preview failure {:?}: superseded or reset", request);
                return (state, Vec::new());
            }
            extractor_warn!("Preview failed: {:?}", failure);
            state.stop_preview_loading();
            vec![Effect::ShowError(failure.user_message(PREVIEW_FALLBACK))]
        }
        Msg::ProcessClicked => {
            if !matches!(state.process_phase(), ProcessPhase::Idle) {
                return (state, Vec::new());
            }
            let fields = state.selected_fields();
            if fields.is_empty() {
                return (
                    state,
                    vec![Effect::ShowError(ValidationError::EmptySelection.to_string())],
                );
            }
            extractor_info!("Processing {} fields", fields.len());
            state.set_process_phase(ProcessPhase::Running);
            vec![Effect::RequestProcess { fields }]
        }
        Msg::ProcessSucceeded { download_url } => {
            if !matches!(state.process_phase(), ProcessPhase::Running) {
                extractor_debug!("Dropping process response outside a running request");
                return (state, Vec::new());
            }
            extractor_info!("Processing finished: {}", download_url);
            state.set_process_phase(ProcessPhase::Finishing { download_url });
            vec![Effect::RevealDownloadAfter {
                delay: REVEAL_DOWNLOAD_DELAY,
            }]
        }
        Msg::ProcessFailed(failure) => {
            if !matches!(state.process_phase(), ProcessPhase::Running) {
                extractor_debug!("Dropping process failure outside a running request");
                return (state, Vec::new());
            }
            extractor_warn!("Processing failed: {:?}", failure);
            state.set_process_phase(ProcessPhase::Idle);
            vec![Effect::ShowError(failure.user_message(PROCESS_FALLBACK))]
        }
        Msg::DownloadRevealed => {
            let revealed = match state.process_phase() {
                ProcessPhase::Finishing { download_url } => Some(download_url.clone()),
                _ => None,
            };
            if let Some(download_url) = revealed {
                state.set_process_phase(ProcessPhase::Done { download_url });
            }
            Vec::new()
        }
        Msg::DownloadClicked => {
            let ready_url = match state.process_phase() {
                ProcessPhase::Done { download_url } => Some(download_url.clone()),
                _ => None,
            };
            match ready_url {
                Some(url) if !matches!(state.download_phase(), DownloadPhase::InFlight) => {
                    state.set_download_phase(DownloadPhase::InFlight);
                    vec![Effect::Download { url }]
                }
                _ => Vec::new(),
            }
        }
        Msg::DownloadSaved { path } => {
            if !matches!(state.download_phase(), DownloadPhase::InFlight) {
                extractor_debug!("Dropping download result after reset");
                return (state, Vec::new());
            }
            let notice = format!("Файл сохранён: {}", path.display());
            state.set_download_phase(DownloadPhase::Saved(path));
            vec![Effect::ShowNotice(notice)]
        }
        Msg::DownloadFailed(failure) => {
            if !matches!(state.download_phase(), DownloadPhase::InFlight) {
                return (state, Vec::new());
            }
            extractor_warn!("Download failed: {:?}", failure);
            state.set_download_phase(DownloadPhase::Idle);
            vec![Effect::ShowError(failure.user_message(DOWNLOAD_FALLBACK))]
        }
        Msg::ExportPreviewClicked => match state.preview() {
            Some(table) => vec![Effect::WritePreviewHtml {
                html: table.to_html(),
            }],
            None => vec![Effect::ShowError(
                crate::PreviewTable::empty_message().to_string(),
            )],
        },
        Msg::PreviewExported { path } => {
            let notice = format!("Превью сохранено: {}", path.display());
            state.set_exported_preview(path);
            vec![Effect::ShowNotice(notice)]
        }
        Msg::PreviewExportFailed(message) => {
            extractor_warn!("Preview export failed: {}", message);
            vec![Effect::ShowError(format!(
                "Не удалось сохранить превью: {message}"
            ))]
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
