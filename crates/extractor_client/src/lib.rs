//! Extractor client: HTTP calls to the extraction server and effect execution.
mod api;
mod engine;
mod filename;
mod persist;
mod types;

pub use api::{ClientSettings, ExtractionApi, ReqwestApi};
pub use engine::EngineHandle;
pub use filename::download_filename;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use types::{
    ApiError, ApiErrorKind, EngineEvent, PreviewRow, ProcessReply, UploadReply, WireField,
};
