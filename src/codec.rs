//! # Codec Module
//!
//! Questo modulo isola tutto il lavoro sui pixel dietro il trait `Codec`.
//!
//! ## Responsabilità:
//! - Resize lungo larghezza o altezza mantenendo le proporzioni
//! - Encode JPEG con qualità 1-100
//! - Encode PNG con una banda di qualità `[min, max]`
//! - Encode WebP / AVIF con qualità 1-100
//! - Ottimizzazione lossless dei buffer JPEG
//!
//! ## Implementazione `ToolCodec`:
//!
//! | Operazione | Strumento |
//! |------------|-----------|
//! | resize     | crate `image` (Lanczos3, in `spawn_blocking`) |
//! | JPEG       | crate `image` (`JpegEncoder`) |
//! | PNG        | `pngquant --quality=min-max --speed 1` via stdin/stdout |
//! | WebP       | `cwebp -q <q>` |
//! | AVIF       | `avifenc -q <q>` in una directory temporanea |
//! | JPEG lossless | `jpegtran -optimize -copy all` |
//!
//! Gli strumenti esterni vengono cercati da `ToolPathResolver`. Uno strumento
//! mancante fa fallire solo il task che lo richiede.

use crate::error::{ConvertError, Result};
use crate::formats::ImageFormat;
use crate::resolution::Dimension;
use crate::tool_resolver::{install_instructions, ToolPathResolver, CONVERSION_TOOLS};
use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageOutputFormat};
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// pngquant exit status when the result would fall below the minimum quality
const PNGQUANT_QUALITY_TOO_LOW: i32 = 99;

/// Accepted quality band for PNG quantization, both ends in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityRange {
    pub min: f64,
    pub max: f64,
}

impl QualityRange {
    /// Band as pngquant percentages, e.g. `87-90`
    pub fn as_percent_arg(&self) -> String {
        let min = (self.min * 100.0).round() as u32;
        let max = (self.max * 100.0).round() as u32;
        format!("{}-{}", min, max)
    }
}

/// Pixel-level operations needed by the conversion executor
#[async_trait]
pub trait Codec: Send + Sync {
    /// Resize `input` along `dimension` to `value` pixels and write it to `output`
    async fn resize(&self, input: &Path, output: &Path, dimension: Dimension, value: u32) -> Result<()>;

    async fn encode_jpeg(&self, input: &Path, quality: u8) -> Result<Vec<u8>>;

    async fn encode_with_quality_range(
        &self,
        input: &Path,
        format: ImageFormat,
        range: QualityRange,
    ) -> Result<Vec<u8>>;

    async fn encode_with_quality(&self, input: &Path, format: ImageFormat, quality: u8) -> Result<Vec<u8>>;

    /// Lossless pass over JPEG data; other data is returned unchanged
    async fn optimize_jpeg(&self, data: Vec<u8>) -> Result<Vec<u8>>;
}

/// True when `image` sniffs `data` as JPEG
pub fn is_jpeg_data(data: &[u8]) -> bool {
    matches!(image::guess_format(data), Ok(image::ImageFormat::Jpeg))
}

/// `Codec` backed by the `image` crate and external encoders
#[derive(Debug, Clone, Default)]
pub struct ToolCodec {
    resolver: ToolPathResolver,
}

impl ToolCodec {
    pub fn new(resolver: ToolPathResolver) -> Self {
        Self { resolver }
    }

    /// Log which external tools are available. Returns the missing ones.
    pub fn check_dependencies(&self) -> Vec<String> {
        info!("🔧 Checking conversion tools...");
        let mut missing = Vec::new();

        for tool in CONVERSION_TOOLS {
            match self.resolver.resolve_tool(tool) {
                Some(path) => info!("  ✅ {} -> {}", tool, path.display()),
                None => {
                    warn!("  ❌ {} (install with: {})", tool, install_instructions(tool));
                    missing.push(tool.to_string());
                }
            }
        }

        if !missing.is_empty() {
            warn!("Conversions needing {} will fail", missing.join(", "));
        }
        missing
    }

    async fn decode(input: &Path) -> Result<DynamicImage> {
        let input = input.to_path_buf();
        blocking(move || {
            let image = image::io::Reader::open(&input)?
                .with_guessed_format()?
                .decode()?;
            Ok(image)
        })
        .await
    }

    /// Lossless PNG bytes of `input`, whatever its source format
    async fn encode_png(input: &Path) -> Result<Vec<u8>> {
        let image = Self::decode(input).await?;
        blocking(move || {
            let mut buffer = Cursor::new(Vec::new());
            image.write_to(&mut buffer, ImageOutputFormat::Png)?;
            Ok(buffer.into_inner())
        })
        .await
    }

    async fn run_piped(&self, tool: &str, args: &[String], input: Vec<u8>) -> Result<Output> {
        let tool_path = self.resolver.require(tool)?;
        debug!("Running {:?} {:?}", tool_path, args);

        let mut child = Command::new(&tool_path)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ConvertError::Codec(format!("{} stdin unavailable", tool)))?;
        let writer = tokio::spawn(async move {
            stdin.write_all(&input).await?;
            stdin.shutdown().await
        });

        let output = child.wait_with_output().await?;

        match writer.await {
            Ok(Err(e)) if e.kind() != io::ErrorKind::BrokenPipe => return Err(e.into()),
            Err(e) => return Err(ConvertError::Codec(format!("{} input writer failed: {}", tool, e))),
            _ => {}
        }

        Ok(output)
    }

    async fn run_to_stdout(&self, tool: &str, args: &[String]) -> Result<Vec<u8>> {
        let tool_path = self.resolver.require(tool)?;
        debug!("Running {:?} {:?}", tool_path, args);

        let output = Command::new(&tool_path).args(args).output().await?;
        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(tool_failure(tool, &output))
        }
    }

    async fn encode_webp(&self, input: &Path, quality: u8) -> Result<Vec<u8>> {
        let args = vec![
            "-quiet".to_string(),
            "-q".to_string(),
            quality.to_string(),
            path_arg(input),
            "-o".to_string(),
            "-".to_string(),
        ];
        self.run_to_stdout("cwebp", &args).await
    }

    async fn encode_avif(&self, input: &Path, quality: u8) -> Result<Vec<u8>> {
        let temp_dir = tempfile::tempdir()?;
        let output: PathBuf = temp_dir.path().join("output.avif");

        let args = vec![
            "-q".to_string(),
            quality.to_string(),
            path_arg(input),
            path_arg(&output),
        ];
        let tool_path = self.resolver.require("avifenc")?;
        debug!("Running {:?} {:?}", tool_path, args);

        let result = Command::new(&tool_path).args(&args).output().await?;
        if !result.status.success() {
            return Err(tool_failure("avifenc", &result));
        }

        Ok(tokio::fs::read(&output).await?)
    }
}

#[async_trait]
impl Codec for ToolCodec {
    async fn resize(&self, input: &Path, output: &Path, dimension: Dimension, value: u32) -> Result<()> {
        let image = Self::decode(input).await?;
        let output = output.to_path_buf();

        blocking(move || {
            let resized = match dimension {
                Dimension::Width => image.resize(value, u32::MAX, FilterType::Lanczos3),
                Dimension::Height => image.resize(u32::MAX, value, FilterType::Lanczos3),
            };
            debug!(
                "Resized to {}x{} -> {}",
                resized.width(),
                resized.height(),
                output.display()
            );

            if crate::formats::is_jpeg_path(&output) {
                DynamicImage::ImageRgb8(resized.to_rgb8()).save(&output)?;
            } else {
                resized.save(&output)?;
            }
            Ok(())
        })
        .await
    }

    async fn encode_jpeg(&self, input: &Path, quality: u8) -> Result<Vec<u8>> {
        let image = Self::decode(input).await?;

        blocking(move || {
            let rgb = image.to_rgb8();
            let mut buffer = Vec::new();
            JpegEncoder::new_with_quality(&mut buffer, quality).encode_image(&rgb)?;
            Ok(buffer)
        })
        .await
    }

    async fn encode_with_quality_range(
        &self,
        input: &Path,
        format: ImageFormat,
        range: QualityRange,
    ) -> Result<Vec<u8>> {
        if format != ImageFormat::Png {
            return Err(ConvertError::Codec(format!(
                "Quality ranges are only supported for .png, not {}",
                format
            )));
        }

        let lossless = Self::encode_png(input).await?;
        let args = vec![
            format!("--quality={}", range.as_percent_arg()),
            "--speed".to_string(),
            "1".to_string(),
            "-".to_string(),
        ];

        let output = self.run_piped("pngquant", &args, lossless.clone()).await?;
        match output.status.code() {
            Some(0) => Ok(output.stdout),
            Some(PNGQUANT_QUALITY_TOO_LOW) => {
                debug!("pngquant could not reach quality {}, keeping lossless PNG", range.as_percent_arg());
                Ok(lossless)
            }
            _ => Err(tool_failure("pngquant", &output)),
        }
    }

    async fn encode_with_quality(&self, input: &Path, format: ImageFormat, quality: u8) -> Result<Vec<u8>> {
        match format {
            ImageFormat::Webp => self.encode_webp(input, quality).await,
            ImageFormat::Avif => self.encode_avif(input, quality).await,
            ImageFormat::Jpg => self.encode_jpeg(input, quality).await,
            ImageFormat::Png => Self::encode_png(input).await,
        }
    }

    async fn optimize_jpeg(&self, data: Vec<u8>) -> Result<Vec<u8>> {
        if !is_jpeg_data(&data) {
            return Ok(data);
        }

        let args = vec![
            "-optimize".to_string(),
            "-copy".to_string(),
            "all".to_string(),
        ];
        let output = self.run_piped("jpegtran", &args, data).await?;
        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(tool_failure("jpegtran", &output))
        }
    }
}

/// Run CPU-bound image work off the async runtime
async fn blocking<T, F>(work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ConvertError::Codec(format!("Image task failed: {}", e)))?
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn tool_failure(tool: &str, output: &Output) -> ConvertError {
    let stderr = String::from_utf8_lossy(&output.stderr);
    ConvertError::Codec(format!(
        "{} failed ({}): {}",
        tool,
        output.status,
        stderr.trim()
    ))
}
