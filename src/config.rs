//! Configuration loading from files and environment variables
//!
//! Sources, later ones winning: built-in defaults, an optional `config`
//! file (any format the `config` crate understands) in the working
//! directory, then `PDF_REDACT__SECTION__KEY` environment variables.

use crate::error::{Error, Result};
use crate::pdf::TextStyle;
use crate::pipeline::ClassifierThresholds;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub redaction: RedactionConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum accepted request body (default: 100MB)
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::Config {
                message: format!("Invalid bind address {}:{}: {}", self.host, self.port, e),
            })
    }
}

/// Where uploads, outputs and thumbnails are written
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Write every thumbnail directly into `root`, shared by all uploads
    #[serde(default)]
    pub shared_thumbnails: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            shared_thumbnails: false,
        }
    }
}

/// Text replacement settings for the redaction pass
#[derive(Debug, Clone, Deserialize)]
pub struct RedactionConfig {
    /// Word erased wherever it appears
    #[serde(default = "default_removal_word")]
    pub removal_word: String,

    /// Size of re-inserted text in points
    #[serde(default = "default_font_size")]
    pub font_size: f32,

    /// Text written where the removal word was
    #[serde(default = "default_replacement")]
    pub replacement_for_removed: String,

    /// Profile photos must be larger than this on both sides (points)
    #[serde(default = "default_photo_min_side")]
    pub photo_min_side: f32,

    /// Profile photo width and height must differ by less than this (points)
    #[serde(default = "default_photo_max_aspect_delta")]
    pub photo_max_aspect_delta: f32,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            removal_word: default_removal_word(),
            font_size: default_font_size(),
            replacement_for_removed: default_replacement(),
            photo_min_side: default_photo_min_side(),
            photo_max_aspect_delta: default_photo_max_aspect_delta(),
        }
    }
}

impl RedactionConfig {
    pub fn text_style(&self) -> TextStyle {
        TextStyle {
            size: self.font_size,
            ..TextStyle::default()
        }
    }

    pub fn thresholds(&self) -> ClassifierThresholds {
        ClassifierThresholds {
            min_side: self.photo_min_side,
            max_aspect_delta: self.photo_max_aspect_delta,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5001
}

fn default_max_upload_bytes() -> usize {
    100 * 1024 * 1024 // 100MB
}

fn default_root() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_removal_word() -> String {
    "Individual".to_string()
}

fn default_font_size() -> f32 {
    11.0
}

fn default_replacement() -> String {
    " ".to_string()
}

fn default_photo_min_side() -> f32 {
    30.0
}

fn default_photo_max_aspect_delta() -> f32 {
    5.0
}

impl AppConfig {
    /// Load configuration from the optional `config` file and `PDF_REDACT__*` env vars
    pub fn load() -> Result<Self> {
        Self::load_from(Config::builder().add_source(File::with_name("config").required(false)))
    }

    fn load_from(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        builder
            .add_source(
                Environment::with_prefix("PDF_REDACT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| Error::Config {
                message: format!("Failed to build config: {}", e),
            })?
            .try_deserialize()
            .map_err(|e| Error::Config {
                message: format!("Failed to deserialize config: {}", e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 5001);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.max_upload_bytes, 100 * 1024 * 1024);
        assert_eq!(config.storage.root, PathBuf::from("uploads"));
        assert!(!config.storage.shared_thumbnails);
        assert_eq!(config.redaction.removal_word, "Individual");
        assert_eq!(config.redaction.replacement_for_removed, " ");
        assert_eq!(config.redaction.text_style(), TextStyle::default());
        assert_eq!(config.redaction.thresholds(), ClassifierThresholds::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let toml = r#"
            [server]
            port = 8080

            [storage]
            shared_thumbnails = true
        "#;
        let config = AppConfig::load_from(
            Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(config.storage.shared_thumbnails);
        assert_eq!(config.redaction.font_size, 11.0);
    }

    #[test]
    fn test_photo_thresholds_from_file() {
        let toml = r#"
            [redaction]
            photo_min_side = 12.5
            photo_max_aspect_delta = 8
        "#;
        let config = AppConfig::load_from(
            Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
        )
        .unwrap();
        assert_eq!(
            config.redaction.thresholds(),
            ClassifierThresholds {
                min_side: 12.5,
                max_aspect_delta: 8.0,
            }
        );
        assert_eq!(config.redaction.removal_word, "Individual");
    }

    #[test]
    fn test_bind_addr() {
        let server = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 5001,
            ..ServerConfig::default()
        };
        assert_eq!(server.bind_addr().unwrap().to_string(), "127.0.0.1:5001");

        let bad = ServerConfig {
            host: "not a host".to_string(),
            ..ServerConfig::default()
        };
        assert!(matches!(bad.bind_addr(), Err(Error::Config { .. })));
    }
}
