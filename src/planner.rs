//! # Conversion Planning
//!
//! Espande (risoluzioni × formati) in una lista ordinata di task per un file.
//!
//! ## Ordine:
//! - Risoluzioni nel loop esterno, nell'ordine dato dall'utente
//! - Formati nel loop interno: `webp`, `avif`, `jpg`, `png` per `all`
//!
//! ## Suffissi:
//! - Una sola risoluzione: nessun suffisso, qualunque sia il numero di formati
//! - Più risoluzioni: l'etichetta se presente, altrimenti `-<valore>`
//!
//! ## Esempio:
//! ```text
//! width "800,400:-s", in "all" on cat.png
//!   -> cat-800.webp cat-800.avif cat-800.jpg cat-800.png
//!      cat-s.webp   cat-s.avif   cat-s.jpg   cat-s.png
//! ```

use crate::formats::{FormatSelector, ImageFormat};
use crate::resolution::{Dimension, ResizePlan};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Resizing happens only strictly inside this band
const RESIZE_LOWER_EXCLUSIVE: u32 = 10;
const RESIZE_UPPER_EXCLUSIVE: u32 = 2000;

/// One (file, format, resolution) unit of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionTask {
    pub source: PathBuf,
    pub format: ImageFormat,
    /// `None` for the single unsized pass
    pub dimension: Option<Dimension>,
    /// 0 when no resolution was requested
    pub resolution: u32,
    /// Name suffix, empty when the batch has a single resolution
    pub suffix: String,
    /// Number of resolutions requested for this file
    pub batch_size: usize,
}

impl ConversionTask {
    /// True when the task resizes before encoding
    pub fn needs_resize(&self) -> bool {
        self.dimension.is_some()
            && self.resolution > RESIZE_LOWER_EXCLUSIVE
            && self.resolution < RESIZE_UPPER_EXCLUSIVE
    }

    /// Extension appended to the output base name, suffix included
    pub fn output_extension(&self) -> String {
        if self.needs_resize() && self.batch_size > 1 {
            format!("{}{}", self.suffix, self.format.extension())
        } else {
            self.format.extension().to_string()
        }
    }
}

/// Builds conversion tasks from a validated request
#[derive(Debug, Clone)]
pub struct ConversionPlanner {
    resize: ResizePlan,
    selector: FormatSelector,
}

impl ConversionPlanner {
    pub fn new(resize: ResizePlan, selector: FormatSelector) -> Self {
        if let FormatSelector::Unrecognized(value) = &selector {
            warn!("Target format '{}' is not convertible, no output will be produced", value);
        }
        Self { resize, selector }
    }

    /// Ordered tasks for `source`
    pub fn plan(&self, source: &Path) -> Vec<ConversionTask> {
        let formats = self.selector.formats();

        match &self.resize {
            ResizePlan::Original => formats
                .into_iter()
                .map(|format| ConversionTask {
                    source: source.to_path_buf(),
                    format,
                    dimension: None,
                    resolution: 0,
                    suffix: String::new(),
                    batch_size: 0,
                })
                .collect(),
            ResizePlan::Resize { dimension, specs } => {
                let batch_size = specs.len();
                let mut tasks = Vec::with_capacity(batch_size * formats.len());

                for spec in specs {
                    let suffix = if batch_size > 1 {
                        match &spec.label {
                            Some(label) => label.trim().to_string(),
                            None => format!("-{}", spec.value),
                        }
                    } else {
                        String::new()
                    };

                    for format in &formats {
                        tasks.push(ConversionTask {
                            source: source.to_path_buf(),
                            format: *format,
                            dimension: Some(*dimension),
                            resolution: spec.value,
                            suffix: suffix.clone(),
                            batch_size,
                        });
                    }
                }

                tasks
            }
        }
    }
}
