//! Extractor core: pure wizard state machine and view-model helpers.
mod effect;
mod format;
mod msg;
mod preview;
mod state;
mod update;
mod validate;
mod view_model;

pub use effect::{Effect, RequestId, REVEAL_DOWNLOAD_DELAY};
pub use format::format_file_size;
pub use msg::{Msg, RemoteFailure};
pub use preview::{escape_html, PreviewRow, PreviewTable, MAX_PREVIEW_ROWS};
pub use state::{AppState, FieldDescriptor, FileInfo, WizardStep};
pub use update::update;
pub use validate::{file_extension, validate_file, ValidationError, ALLOWED_EXTENSIONS, MAX_FILE_SIZE};
pub use view_model::{AppViewModel, FieldRowView, ProgressView};
