use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use extractor_client::{
    ApiError, ApiErrorKind, AtomicFileWriter, EngineEvent, EngineHandle, UploadReply, WireField,
};
use extractor_core::{Effect, FieldDescriptor, Msg, RemoteFailure, RequestId};
use extractor_logging::{extractor_debug, extractor_info, extractor_warn};

use super::ui::constants::PREVIEW_HTML_FILENAME;

/// Side effects the front end performs itself rather than hand to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    Alert(String),
    Notice(String),
    ScrollToTop,
}

/// Turns core effects into engine commands and engine events back into
/// messages on `msg_tx`.
pub struct EffectRunner {
    engine: EngineHandle,
    download_dir: PathBuf,
    msg_tx: mpsc::Sender<Msg>,
}

impl EffectRunner {
    pub fn new(
        engine: EngineHandle,
        events: mpsc::Receiver<EngineEvent>,
        download_dir: PathBuf,
        msg_tx: mpsc::Sender<Msg>,
    ) -> std::io::Result<Self> {
        spawn_event_forwarder(events, msg_tx.clone())?;
        Ok(Self {
            engine,
            download_dir,
            msg_tx,
        })
    }

    /// Runs engine-bound effects and returns the ones the screen handles.
    pub fn enqueue(&self, effects: Vec<Effect>) -> Vec<UiEffect> {
        let mut ui_effects = Vec::new();
        for effect in effects {
            match effect {
                Effect::Upload {
                    request,
                    path,
                    file_name,
                } => {
                    extractor_info!("Upload {:?} from {:?}", file_name, path);
                    self.engine.upload(request.get(), path, file_name);
                }
                Effect::RequestPreview { request, fields } => {
                    self.engine.preview(request.get(), fields)
                }
                Effect::RequestProcess { fields } => self.engine.process(fields),
                Effect::RevealDownloadAfter { delay } => self.engine.timer(delay),
                Effect::Download { url } => self.engine.download(url),
                Effect::WritePreviewHtml { html } => self.write_preview(&html),
                Effect::ShowError(message) => ui_effects.push(UiEffect::Alert(message)),
                Effect::ShowNotice(message) => ui_effects.push(UiEffect::Notice(message)),
                Effect::ScrollToTop => ui_effects.push(UiEffect::ScrollToTop),
            }
        }
        ui_effects
    }

    fn write_preview(&self, html: &str) {
        let writer = AtomicFileWriter::new(self.download_dir.clone());
        let msg = match writer.write(PREVIEW_HTML_FILENAME, html) {
            Ok(path) => Msg::PreviewExported { path },
            Err(err) => Msg::PreviewExportFailed(err.to_string()),
        };
        let _ = self.msg_tx.send(msg);
    }
}

fn spawn_event_forwarder(
    events: mpsc::Receiver<EngineEvent>,
    msg_tx: mpsc::Sender<Msg>,
) -> std::io::Result<()> {
    thread::Builder::new()
        .name("extractor-events".to_string())
        .spawn(move || {
            while let Ok(event) = events.recv() {
                if msg_tx.send(map_event(event)).is_err() {
                    break;
                }
            }
            extractor_debug!("Engine event channel closed");
        })?;
    Ok(())
}

pub(crate) fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::UploadCompleted {
            request,
            result: Ok(UploadReply { session_id, fields }),
        } => Msg::UploadSucceeded {
            request: RequestId::new(request),
            session_id,
            fields: map_fields(fields),
        },
        EngineEvent::UploadCompleted {
            request,
            result: Err(err),
        } => Msg::UploadFailed {
            request: RequestId::new(request),
            failure: map_failure(err),
        },
        EngineEvent::PreviewCompleted {
            request,
            result: Ok(rows),
        } => Msg::PreviewLoaded {
            request: RequestId::new(request),
            rows,
        },
        EngineEvent::PreviewCompleted {
            request,
            result: Err(err),
        } => Msg::PreviewFailed {
            request: RequestId::new(request),
            failure: map_failure(err),
        },
        EngineEvent::ProcessCompleted(Ok(reply)) => Msg::ProcessSucceeded {
            download_url: reply.download_url,
        },
        EngineEvent::ProcessCompleted(Err(err)) => Msg::ProcessFailed(map_failure(err)),
        EngineEvent::DownloadCompleted(Ok(path)) => Msg::DownloadSaved { path },
        EngineEvent::DownloadCompleted(Err(err)) => Msg::DownloadFailed(map_failure(err)),
        EngineEvent::TimerFired => Msg::DownloadRevealed,
    }
}

fn map_fields(fields: Vec<WireField>) -> Vec<FieldDescriptor> {
    fields
        .into_iter()
        .filter_map(|field| {
            let shown = format!("{field:?}");
            let descriptor = FieldDescriptor::from_parts(field.id, field.name, field.kind);
            if descriptor.is_none() {
                extractor_warn!("Skipping field without id or name: {}", shown);
            }
            descriptor
        })
        .collect()
}

fn map_failure(err: ApiError) -> RemoteFailure {
    match err.kind {
        ApiErrorKind::Rejected { server_message } => RemoteFailure::Rejected(server_message),
        _ => RemoteFailure::Transport(err.message),
    }
}
