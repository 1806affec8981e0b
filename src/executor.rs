//! # Conversion Executor
//!
//! Questo modulo esegue un singolo `ConversionTask`.
//!
//! ## Pipeline per task:
//! 1. **Resize** (solo se `10 < risoluzione < 2000`): file temporaneo
//!    `<nome>_<dimensione>_<valore><ext>` accanto al sorgente
//! 2. **Encode** per formato:
//!    - `jpg`: qualità diretta, output che non sovrascrive mai l'input
//!    - `png`: banda di qualità `[q/100, ceil(q/10)*10/100]`
//!    - `webp` / `avif`: qualità diretta
//! 3. **Ottimizzazione lossless** se l'input di lavoro è JPEG e il target no
//! 4. **Scrittura** nel percorso calcolato da `FileNamer`
//! 5. **Cleanup** del file temporaneo, sempre
//!
//! ## Gestione errori:
//! - `execute()` propaga l'errore del task
//! - `run()` lo logga e prosegue: un task fallito non ferma gli altri

use crate::codec::{Codec, QualityRange};
use crate::config::QualitySettings;
use crate::error::Result;
use crate::file_manager::FileManager;
use crate::formats::{dotted_extension, is_jpeg_path, ImageFormat};
use crate::logger::Logger;
use crate::namer::FileNamer;
use crate::planner::ConversionTask;
use crate::resolution::Dimension;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::debug;

/// PNG quality band for a 1-100 quality value
pub fn png_quality_range(quality: u8) -> QualityRange {
    let quality = u32::from(quality);
    let upper = (quality + 9) / 10 * 10;
    QualityRange {
        min: f64::from(quality) / 100.0,
        max: (f64::from(upper) / 100.0).min(1.0),
    }
}

/// Temporary resize target for `source`
pub fn resized_path(source: &Path, dimension: Dimension, value: u32) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = dotted_extension(source).unwrap_or_default();
    source.with_file_name(format!("{}_{}_{}{}", stem, dimension, value, ext))
}

/// Outcome of a successful task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedFile {
    pub path: PathBuf,
    pub size: u64,
}

/// Runs conversion tasks against a codec
#[derive(Clone)]
pub struct ConversionExecutor {
    codec: Arc<dyn Codec>,
    quality: QualitySettings,
    namer: FileNamer,
    logger: Logger,
}

impl ConversionExecutor {
    pub fn new(codec: Arc<dyn Codec>, quality: QualitySettings, namer: FileNamer, logger: Logger) -> Self {
        Self {
            codec,
            quality,
            namer,
            logger,
        }
    }

    /// Execute `task`, logging the outcome. Failures never propagate.
    pub async fn run(&self, task: &ConversionTask) -> Option<ConvertedFile> {
        match self.execute(task).await {
            Ok(converted) => {
                self.logger
                    .success(format!("Success converted: {}", converted.path.display()));
                Some(converted)
            }
            Err(e) => {
                self.logger
                    .error(format!("Error during '{}' conversion: {}", task.format, e));
                None
            }
        }
    }

    /// Execute `task` and return the written file
    pub async fn execute(&self, task: &ConversionTask) -> Result<ConvertedFile> {
        let resized = match task.dimension {
            Some(dimension) if task.needs_resize() => {
                let temp = resized_path(&task.source, dimension, task.resolution);
                debug!("Resizing {} -> {}", task.source.display(), temp.display());

                if let Err(e) = self
                    .codec
                    .resize(&task.source, &temp, dimension, task.resolution)
                    .await
                {
                    let _ = fs::remove_file(&temp).await;
                    return Err(e);
                }
                Some(temp)
            }
            _ => None,
        };

        let working = resized.as_deref().unwrap_or(&task.source);
        let result = self.encode_and_write(task, working).await;

        if let Some(temp) = &resized {
            FileManager::delete_file_if_exists(temp, &self.logger).await;
        }

        result
    }

    async fn encode_and_write(&self, task: &ConversionTask, working: &Path) -> Result<ConvertedFile> {
        let extension = task.output_extension();

        let (output, data) = match task.format {
            ImageFormat::Jpg => {
                let output = self.namer.output_path_avoiding(&task.source, &extension, working);
                let data = self.codec.encode_jpeg(working, self.quality.jpg).await?;
                (output, data)
            }
            ImageFormat::Png => {
                let range = png_quality_range(self.quality.png);
                let data = self
                    .codec
                    .encode_with_quality_range(working, ImageFormat::Png, range)
                    .await?;
                (self.namer.output_path(&task.source, &extension), data)
            }
            ImageFormat::Webp => {
                let data = self
                    .codec
                    .encode_with_quality(working, ImageFormat::Webp, self.quality.webp)
                    .await?;
                (self.namer.output_path(&task.source, &extension), data)
            }
            ImageFormat::Avif => {
                let data = self
                    .codec
                    .encode_with_quality(working, ImageFormat::Avif, self.quality.avif)
                    .await?;
                (self.namer.output_path(&task.source, &extension), data)
            }
        };

        let data = if task.format != ImageFormat::Jpg && is_jpeg_path(working) {
            self.codec.optimize_jpeg(data).await?
        } else {
            data
        };

        fs::write(&output, &data).await?;
        debug!("Wrote {} ({} bytes)", output.display(), data.len());

        Ok(ConvertedFile {
            path: output,
            size: data.len() as u64,
        })
    }
}
