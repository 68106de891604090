use std::path::{Path, PathBuf};
use std::time::Duration;

use extractor_logging::{extractor_debug, extractor_info};
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::filename::download_filename;
use crate::persist::AtomicFileWriter;
use crate::types::{Envelope, ErrorBody, PreviewBody, ProcessBody, UploadBody};
use crate::{ApiError, ApiErrorKind, PreviewRow, ProcessReply, UploadReply};

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Server root; endpoint paths are resolved against it.
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Whole-request limit. `None` leaves long processing calls unbounded.
    pub request_timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5001/".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            user_agent: concat!("field-extractor/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// The remote operations the wizard relies on.
#[async_trait::async_trait]
pub trait ExtractionApi: Send + Sync {
    async fn upload(&self, path: &Path, file_name: &str) -> Result<UploadReply, ApiError>;

    async fn preview(&self, fields: &[String]) -> Result<Vec<PreviewRow>, ApiError>;

    async fn process(&self, fields: &[String]) -> Result<ProcessReply, ApiError>;

    /// Fetches a generated file and stores it in `dest_dir`, returning its path.
    async fn download(&self, url: &str, dest_dir: &Path) -> Result<PathBuf, ApiError>;
}

/// `ExtractionApi` over HTTP. The server ties calls to the uploaded file with
/// a session cookie, so one client (and its cookie store) serves all calls.
#[derive(Debug, Clone)]
pub struct ReqwestApi {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ReqwestApi {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder()
            .cookie_store(true)
            .connect_timeout(settings.connect_timeout)
            .user_agent(settings.user_agent.clone());
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| ApiError::new(ApiErrorKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    /// Resolves `reference` against the base URL. Absolute paths such as
    /// `/api/download/x.xlsx` replace the base path, like a browser link would.
    fn resolve(&self, reference: &str) -> Result<Url, ApiError> {
        let mut base = self.settings.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        Url::parse(&base)
            .and_then(|base| base.join(reference))
            .map_err(|err| ApiError::new(ApiErrorKind::InvalidUrl, err.to_string()))
    }

    async fn post_fields<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        fields: &[String],
    ) -> Result<Envelope<T>, ApiError> {
        let url = self.resolve(endpoint)?;
        extractor_debug!("POST {} fields={:?}", url, fields);
        let response = self
            .client
            .post(url)
            .json(&json!({ "fields": fields }))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_envelope(response).await
    }
}

#[async_trait::async_trait]
impl ExtractionApi for ReqwestApi {
    async fn upload(&self, path: &Path, file_name: &str) -> Result<UploadReply, ApiError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|err| ApiError::new(ApiErrorKind::Io, format!("{}: {err}", path.display())))?;
        let byte_len = bytes.len();
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime_for(file_name))
            .map_err(|err| ApiError::new(ApiErrorKind::Decode, err.to_string()))?;
        let form = Form::new().part("file", part);

        let url = self.resolve("api/upload")?;
        extractor_info!("POST {} file={:?} bytes={}", url, file_name, byte_len);
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let envelope: Envelope<UploadBody> = read_envelope(response).await?;
        let body = envelope.body;
        let session_id = body
            .session_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::new(ApiErrorKind::Decode, "upload reply without session_id"))?;
        Ok(UploadReply {
            session_id,
            fields: body.default_fields.unwrap_or_default(),
        })
    }

    async fn preview(&self, fields: &[String]) -> Result<Vec<PreviewRow>, ApiError> {
        let envelope: Envelope<PreviewBody> = self.post_fields("api/preview", fields).await?;
        Ok(envelope
            .body
            .preview
            .and_then(|payload| payload.preview_data)
            .unwrap_or_default())
    }

    async fn process(&self, fields: &[String]) -> Result<ProcessReply, ApiError> {
        let envelope: Envelope<ProcessBody> = self.post_fields("api/process", fields).await?;
        let body = envelope.body;
        let download_url = body
            .download_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ApiError::new(ApiErrorKind::Decode, "process reply without download_url"))?;
        Ok(ProcessReply { download_url })
    }

    async fn download(&self, url: &str, dest_dir: &Path) -> Result<PathBuf, ApiError> {
        let resolved = self.resolve(url)?;
        extractor_info!("GET {}", resolved);
        let response = self
            .client
            .get(resolved.clone())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.map_err(map_reqwest_error)?;
            return Err(match serde_json::from_slice::<ErrorBody>(&body) {
                Ok(ErrorBody { error: Some(message) }) => ApiError::rejected(Some(message)),
                _ => ApiError::new(ApiErrorKind::HttpStatus(status.as_u16()), status.to_string()),
            });
        }

        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        let byte_len = bytes.len();

        let filename = download_filename(&resolved);
        let writer = AtomicFileWriter::new(dest_dir.to_path_buf());
        let path = tokio::task::spawn_blocking(move || writer.write(&filename, &bytes))
            .await
            .map_err(|err| ApiError::new(ApiErrorKind::Io, err.to_string()))?
            .map_err(|err| ApiError::new(ApiErrorKind::Io, err.to_string()))?;
        extractor_info!("Saved {} bytes to {:?}", byte_len, path);
        Ok(path)
    }
}

/// Parses the JSON body regardless of status: the server reports problems as
/// `{error}` with a 4xx code.
async fn read_envelope<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<Envelope<T>, ApiError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_reqwest_error)?;

    let envelope: Envelope<T> = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(err) if status.is_success() => {
            return Err(ApiError::new(ApiErrorKind::Decode, err.to_string()));
        }
        Err(_) => {
            return Err(ApiError::new(
                ApiErrorKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
    };

    if envelope.success {
        Ok(envelope)
    } else {
        Err(ApiError::rejected(envelope.error))
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("docx") => DOCX_MIME,
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(ApiErrorKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(ApiErrorKind::Decode, err.to_string());
    }
    ApiError::new(ApiErrorKind::Network, err.to_string())
}
