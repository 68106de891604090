use std::io;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use extractor_logging::extractor_debug;

use crate::{EngineEvent, ExtractionApi};

enum EngineCommand {
    Upload {
        request: u64,
        path: PathBuf,
        file_name: String,
    },
    Preview {
        request: u64,
        fields: Vec<String>,
    },
    Process { fields: Vec<String> },
    Download { url: String },
    Timer { after: Duration },
}

/// Runs API calls on a background tokio runtime. Commands never block the
/// caller; every command produces exactly one `EngineEvent`.
///
/// Requests are not de-duplicated or cancelled: two previews in a row run
/// concurrently and report in completion order. Uploads and previews carry the
/// caller's `request` tag back in their event so late answers can be told
/// apart.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    /// Starts the worker thread. Downloads are stored under `download_dir`.
    pub fn spawn(
        api: Arc<dyn ExtractionApi>,
        download_dir: PathBuf,
    ) -> io::Result<(Self, mpsc::Receiver<EngineEvent>)> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .thread_name("extractor-engine")
            .build()?;

        thread::Builder::new()
            .name("extractor-engine-dispatch".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let api = api.clone();
                    let event_tx = event_tx.clone();
                    let download_dir = download_dir.clone();
                    runtime.spawn(async move {
                        let event = handle_command(api.as_ref(), &download_dir, command).await;
                        let _ = event_tx.send(event);
                    });
                }
                extractor_debug!("Engine command channel closed; shutting down");
            })?;

        Ok((Self { cmd_tx }, event_rx))
    }

    pub fn upload(&self, request: u64, path: PathBuf, file_name: impl Into<String>) {
        self.send(EngineCommand::Upload {
            request,
            path,
            file_name: file_name.into(),
        });
    }

    pub fn preview(&self, request: u64, fields: Vec<String>) {
        self.send(EngineCommand::Preview { request, fields });
    }

    pub fn process(&self, fields: Vec<String>) {
        self.send(EngineCommand::Process { fields });
    }

    pub fn download(&self, url: impl Into<String>) {
        self.send(EngineCommand::Download { url: url.into() });
    }

    /// Emits `EngineEvent::TimerFired` once `after` has elapsed.
    pub fn timer(&self, after: Duration) {
        self.send(EngineCommand::Timer { after });
    }

    fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }
}

async fn handle_command(
    api: &dyn ExtractionApi,
    download_dir: &std::path::Path,
    command: EngineCommand,
) -> EngineEvent {
    match command {
        EngineCommand::Upload {
            request,
            path,
            file_name,
        } => EngineEvent::UploadCompleted {
            request,
            result: api.upload(&path, &file_name).await,
        },
        EngineCommand::Preview { request, fields } => EngineEvent::PreviewCompleted {
            request,
            result: api.preview(&fields).await,
        },
        EngineCommand::Process { fields } => {
            EngineEvent::ProcessCompleted(api.process(&fields).await)
        }
        EngineCommand::Download { url } => {
            EngineEvent::DownloadCompleted(api.download(&url, download_dir).await)
        }
        EngineCommand::Timer { after } => {
            tokio::time::sleep(after).await;
            EngineEvent::TimerFired
        }
    }
}
