use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use extractor_client::ClientSettings;
use extractor_logging::LogDestination;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILENAME: &str = "extractor.ron";

/// Upload a .docx or .pdf document and extract selected fields into a table.
#[derive(Debug, Parser)]
#[command(name = "field-extractor", version)]
pub struct Cli {
    /// Configuration file (RON). Defaults to ./extractor.ron when present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Server root URL, overriding the configuration file.
    #[arg(long)]
    pub server: Option<String>,

    /// Where downloaded results and preview exports are written.
    #[arg(long)]
    pub download_dir: Option<PathBuf>,

    /// Log destination.
    #[arg(long, value_enum)]
    pub log: Option<LogSetting>,

    /// Document to upload right after start.
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
pub enum LogSetting {
    #[default]
    File,
    Terminal,
    Both,
    Off,
}

impl From<LogSetting> for LogDestination {
    fn from(setting: LogSetting) -> Self {
        match setting {
            LogSetting::File => LogDestination::File,
            LogSetting::Terminal => LogDestination::Terminal,
            LogSetting::Both => LogDestination::Both,
            LogSetting::Off => LogDestination::Off,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server_url: String,
    pub download_dir: PathBuf,
    pub connect_timeout_secs: u64,
    /// `None` leaves processing requests without a deadline.
    pub request_timeout_secs: Option<u64>,
    pub log: LogSetting,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5001".to_string(),
            download_dir: PathBuf::from("downloads"),
            connect_timeout_secs: 10,
            request_timeout_secs: None,
            log: LogSetting::File,
            log_file: PathBuf::from("extractor.log"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

impl AppConfig {
    /// Loads the file named by `--config`, or `./extractor.ron` if it exists,
    /// then applies command-line overrides.
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::load_optional(Path::new(DEFAULT_CONFIG_FILENAME))?,
        };
        config.apply_overrides(cli);
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &content)
    }

    fn load_optional(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(path, &content),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
        ron::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(server) = &cli.server {
            self.server_url = server.clone();
        }
        if let Some(dir) = &cli.download_dir {
            self.download_dir = dir.clone();
        }
        if let Some(log) = cli.log {
            self.log = log;
        }
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.server_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
            ..ClientSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["field-extractor"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extractor.ron");
        fs::write(&path, r#"(server_url: "http://10.0.0.5:8080", log: Off)"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(
            config,
            AppConfig {
                server_url: "http://10.0.0.5:8080".to_string(),
                log: LogSetting::Off,
                ..AppConfig::default()
            }
        );
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(&dir.path().join("nope.ron")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn optional_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_optional(&dir.path().join("extractor.ron")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extractor.ron");
        fs::write(&path, "(server_url: 42").unwrap();
        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn command_line_overrides_file_values() {
        let mut config = AppConfig::default();
        config.apply_overrides(&cli(&[
            "--server",
            "http://example.test",
            "--download-dir",
            "out",
            "--log",
            "both",
            "report.pdf",
        ]));
        assert_eq!(config.server_url, "http://example.test");
        assert_eq!(config.download_dir, PathBuf::from("out"));
        assert_eq!(config.log, LogSetting::Both);
    }

    #[test]
    fn positional_file_is_optional() {
        assert_eq!(cli(&[]).file, None);
        assert_eq!(cli(&["a.docx"]).file, Some(PathBuf::from("a.docx")));
    }

    #[test]
    fn client_settings_carry_timeouts() {
        let config = AppConfig {
            request_timeout_secs: Some(90),
            ..AppConfig::default()
        };
        let settings = config.client_settings();
        assert_eq!(settings.base_url, "http://127.0.0.1:5001");
        assert_eq!(settings.connect_timeout, Duration::from_secs(10));
        assert_eq!(settings.request_timeout, Some(Duration::from_secs(90)));
    }
}
