//! # Handler Registry
//!
//! Mappa il tipo di conversione richiesto (`--type`) sul gestore che lo esegue.
//!
//! | Tipo     | Gestore        |
//! |----------|----------------|
//! | `images` | `ImageHandler` |
//! | altro    | `UnsupportedInput` |

use crate::codec::Codec;
use crate::config::ConversionRequest;
use crate::error::{ConvertError, Result};
use crate::file_manager::FileManager;
use crate::logger::Logger;
use crate::progress::ConversionStats;
use crate::walker::DirectoryWalker;
use std::sync::Arc;
use tracing::debug;

/// Convert type handled by [`ImageHandler`]
pub const IMAGES: &str = "images";

/// Every supported convert type
#[derive(Clone)]
pub enum Handler {
    Images(ImageHandler),
}

impl Handler {
    /// Handler for `convert_type`
    pub fn for_type(
        convert_type: &str,
        request: ConversionRequest,
        codec: Arc<dyn Codec>,
        logger: Logger,
    ) -> Result<Self> {
        match convert_type.trim() {
            IMAGES => Ok(Handler::Images(ImageHandler::new(request, codec, logger))),
            other => Err(ConvertError::UnsupportedInput(format!(
                "Unsupported convert type '{}'",
                other
            ))),
        }
    }

    pub async fn process(&self) -> Result<ConversionStats> {
        match self {
            Handler::Images(handler) => handler.process().await,
        }
    }
}

/// Converts the images of one folder
#[derive(Clone)]
pub struct ImageHandler {
    request: ConversionRequest,
    codec: Arc<dyn Codec>,
    logger: Logger,
}

impl ImageHandler {
    pub fn new(request: ConversionRequest, codec: Arc<dyn Codec>, logger: Logger) -> Self {
        Self {
            request,
            codec,
            logger,
        }
    }

    /// Validate, prepare the working folder, convert everything in it
    pub async fn process(&self) -> Result<ConversionStats> {
        let validated = self.request.validate()?;
        debug!("Validated request: {:?}", validated);

        let process_dir = FileManager::prepare_dir(
            &self.request.source,
            &self.request.destination,
            self.request.copy,
            self.request.recursive,
            &self.logger,
        )
        .await?;

        self.logger
            .title(format!("Converting images in {}", process_dir.display()));

        let walker = DirectoryWalker::new(&validated, self.codec.clone(), self.logger.clone());
        let stats = walker.walk(&process_dir).await;

        self.logger.info(stats.format_summary());
        self.logger.animate("FINISH!").await;

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::logger::LogKind;
    use crate::testing::FakeCodec;
    use tempfile::TempDir;

    fn request_for(source: &std::path::Path) -> ConversionRequest {
        let mut request = ConversionRequest::from_config(&AppConfig::default());
        request.source = source.to_path_buf();
        request.target = ".webp".into();
        request
    }

    #[test]
    fn test_unknown_type_is_unsupported() {
        let (logger, _) = Logger::memory();
        let request = ConversionRequest::from_config(&AppConfig::default());
        let result = Handler::for_type("videos", request, Arc::new(FakeCodec::new()), logger);

        match result {
            Err(e @ ConvertError::UnsupportedInput(_)) => assert_eq!(e.exit_code(), 3),
            _ => panic!("expected unsupported input"),
        }
    }

    #[tokio::test]
    async fn test_images_handler_converts_and_finishes() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("a.png"), b"a").unwrap();
        let (logger, sink) = Logger::memory();

        let handler = Handler::for_type(
            "images",
            request_for(temp_dir.path()),
            Arc::new(FakeCodec::new()),
            logger,
        )
        .unwrap();
        let stats = handler.process().await.unwrap();

        assert_eq!(stats.outputs_written, 1);
        assert!(temp_dir.path().join("a.webp").exists());
        assert_eq!(sink.messages(LogKind::Animate), vec!["FINISH!".to_string()]);
    }

    #[tokio::test]
    async fn test_validation_happens_before_any_mutation() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("a.png"), b"a").unwrap();
        let (logger, _) = Logger::memory();

        let mut request = request_for(temp_dir.path());
        request.overwrite = true;
        request.width = "1".into();

        let handler = Handler::for_type("images", request, Arc::new(FakeCodec::new()), logger).unwrap();
        let result = handler.process().await;

        assert!(matches!(result, Err(ConvertError::Validation(_))));
        assert!(temp_dir.path().join("a.png").exists());
        assert!(!temp_dir.path().join("WORK-a.png").exists());
    }

    #[tokio::test]
    async fn test_copy_mode_leaves_source_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("photos");
        std::fs::create_dir(&source).unwrap();
        std::fs::write(source.join("a.png"), b"a").unwrap();
        let (logger, _) = Logger::memory();

        let mut request = request_for(&source);
        request.copy = true;
        request.overwrite = true;
        request.destination = temp_dir.path().join("result");

        let handler = Handler::for_type("images", request, Arc::new(FakeCodec::new()), logger).unwrap();
        handler.process().await.unwrap();

        let process_dir = FileManager::process_folder(&source, &temp_dir.path().join("result"));
        assert!(source.join("a.png").exists());
        assert!(!source.join("a.webp").exists());
        assert!(process_dir.join("a.webp").exists());
        assert!(!process_dir.join("a.png").exists());
    }

    #[tokio::test]
    async fn test_missing_source_folder() {
        let temp_dir = TempDir::new().unwrap();
        let (logger, _) = Logger::memory();
        let request = request_for(&temp_dir.path().join("absent"));

        let handler = Handler::for_type("images", request, Arc::new(FakeCodec::new()), logger).unwrap();
        let err = handler.process().await.unwrap_err();
        assert!(err.to_string().contains("incorrectly specified"));
    }
}
