//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - `AppConfig`: valori di default (cartelle, qualità, log) caricabili da file JSON
//! - `ConversionRequest`: la richiesta immutabile di una singola esecuzione
//! - Validazione completa della richiesta PRIMA di toccare il filesystem
//!
//! ## Parametri di configurazione (`AppConfig`):
//! - `default_source_folder`: Cartella sorgente (default: "images")
//! - `default_copy_folder`: Cartella di destinazione per `--copy` (default: "result")
//! - `recursive` / `overwrite` / `copy`: Flag di default (default: false)
//! - `quality_jpg` / `quality_png` / `quality_webp` / `quality_avif`: 1-100 (default: 90)
//! - `log_file_path`: File di log (default: "log.txt")
//! - `success_log_methods` / `error_log_methods` / `info_log_methods`: Routing dei log
//! - `workers`: File elaborati in parallelo (default: 1 = sequenziale)
//!
//! ## Validazione (`ConversionRequest::validate`):
//! - Ogni qualità deve essere 1-100
//! - `from` deve essere `all` o un'estensione sorgente valida
//! - `width` / `height` devono essere specifiche di risoluzione valide
//! - `workers` deve essere > 0
//!
//! ## Esempio:
//! ```ignore
//! let config = AppConfig::from_file(&path).await?;
//! let request = ConversionRequest::from_config(&config);
//! let validated = request.validate()?;
//! ```

use crate::error::{ConvertError, Result as ConvertResult};
use crate::formats::{FormatSelector, SourceFilter};
use crate::resolution::{ResizePlan, NO_RESIZE};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application defaults, optionally loaded from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Folder processed when no source is given
    pub default_source_folder: PathBuf,
    /// Folder receiving the copy when `copy` is set
    pub default_copy_folder: PathBuf,
    pub recursive: bool,
    pub overwrite: bool,
    pub copy: bool,
    pub quality_jpg: u8,
    pub quality_png: u8,
    pub quality_webp: u8,
    pub quality_avif: u8,
    pub log_file_path: PathBuf,
    pub success_log_methods: Vec<String>,
    pub error_log_methods: Vec<String>,
    pub info_log_methods: Vec<String>,
    /// Number of files converted concurrently
    pub workers: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_source_folder: PathBuf::from("images"),
            default_copy_folder: PathBuf::from("result"),
            recursive: false,
            overwrite: false,
            copy: false,
            quality_jpg: 90,
            quality_png: 90,
            quality_webp: 90,
            quality_avif: 90,
            log_file_path: PathBuf::from("log.txt"),
            success_log_methods: vec!["console".to_string()],
            error_log_methods: vec!["console".to_string(), "file".to_string()],
            info_log_methods: vec!["console".to_string()],
            workers: 1,
        }
    }
}

impl AppConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        self.qualities().validate()?;

        if self.workers == 0 {
            return Err(anyhow::anyhow!("Number of workers must be greater than 0"));
        }

        Ok(())
    }

    pub fn qualities(&self) -> QualitySettings {
        QualitySettings {
            jpg: self.quality_jpg,
            png: self.quality_png,
            webp: self.quality_webp,
            avif: self.quality_avif,
        }
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    /// `<config dir>/image-convert/config.json`
    pub fn default_location() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("image-convert").join("config.json"))
    }
}

/// Per-format encode quality (1-100 each)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualitySettings {
    pub jpg: u8,
    pub png: u8,
    pub webp: u8,
    pub avif: u8,
}

impl QualitySettings {
    pub fn validate(&self) -> ConvertResult<()> {
        for (name, value) in [
            ("jpg", self.jpg),
            ("png", self.png),
            ("webp", self.webp),
            ("avif", self.avif),
        ] {
            if !(1..=100).contains(&value) {
                return Err(ConvertError::Validation(format!(
                    "Quality for {} must be a number between 1 and 100 (got {})",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

impl Default for QualitySettings {
    fn default() -> Self {
        AppConfig::default().qualities()
    }
}

/// Everything one invocation was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub source: PathBuf,
    pub recursive: bool,
    pub copy: bool,
    pub destination: PathBuf,
    pub overwrite: bool,
    /// `all` or a source extension
    pub from: String,
    /// `all` or a target extension
    pub target: String,
    pub quality: QualitySettings,
    pub width: String,
    pub height: String,
    pub workers: usize,
}

impl ConversionRequest {
    /// Request using only configured defaults
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            source: config.default_source_folder.clone(),
            recursive: config.recursive,
            copy: config.copy,
            destination: config.default_copy_folder.clone(),
            overwrite: config.overwrite,
            from: "all".to_string(),
            target: "all".to_string(),
            quality: config.qualities(),
            width: NO_RESIZE.to_string(),
            height: NO_RESIZE.to_string(),
            workers: config.workers,
        }
    }

    /// Check every field and resolve the textual ones.
    pub fn validate(&self) -> ConvertResult<ValidatedRequest> {
        self.quality.validate()?;

        let filter = SourceFilter::parse(&self.from).ok_or_else(|| {
            ConvertError::Validation(format!(
                "Unsupported source format '{}', expected all or one of {}",
                self.from,
                crate::formats::VALID_SOURCE_FORMATS.join(", ")
            ))
        })?;

        if self.workers == 0 {
            return Err(ConvertError::Validation(
                "Number of workers must be greater than 0".to_string(),
            ));
        }

        let resize = ResizePlan::from_specs(&self.width, &self.height)?;

        Ok(ValidatedRequest {
            request: self.clone(),
            filter,
            selector: FormatSelector::parse(&self.target),
            resize,
        })
    }
}

/// A request whose textual fields have been parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub request: ConversionRequest,
    pub filter: SourceFilter,
    pub selector: FormatSelector,
    pub resize: ResizePlan,
}
