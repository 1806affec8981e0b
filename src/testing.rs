//! Recording `Codec` double for pipeline tests.

use crate::codec::{Codec, QualityRange};
use crate::error::{ConvertError, Result};
use crate::formats::ImageFormat;
use crate::resolution::Dimension;
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One call received by [`FakeCodec`]
#[derive(Debug, Clone, PartialEq)]
pub enum CodecCall {
    Resize {
        input: PathBuf,
        output: PathBuf,
        dimension: Dimension,
        value: u32,
    },
    EncodeJpeg {
        input: PathBuf,
        quality: u8,
    },
    EncodeRange {
        input: PathBuf,
        format: ImageFormat,
        range: QualityRange,
    },
    Encode {
        input: PathBuf,
        format: ImageFormat,
        quality: u8,
    },
    OptimizeJpeg,
}

/// Copies bytes around instead of touching pixels
#[derive(Debug, Default)]
pub struct FakeCodec {
    calls: Mutex<Vec<CodecCall>>,
    failing: HashSet<ImageFormat>,
    fail_resize: bool,
}

impl FakeCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every encode to `format` fails
    pub fn failing_on(mut self, format: ImageFormat) -> Self {
        self.failing.insert(format);
        self
    }

    /// Every resize leaves a partial output behind and fails
    pub fn failing_resize(mut self) -> Self {
        self.fail_resize = true;
        self
    }

    pub fn calls(&self) -> Vec<CodecCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: CodecCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn encoded(&self, input: &Path, format: ImageFormat) -> Result<Vec<u8>> {
        if self.failing.contains(&format) {
            return Err(ConvertError::Codec(format!("fake failure for {}", format)));
        }
        let mut data = format.extension().as_bytes().to_vec();
        data.extend(std::fs::read(input)?);
        Ok(data)
    }
}

#[async_trait]
impl Codec for FakeCodec {
    async fn resize(&self, input: &Path, output: &Path, dimension: Dimension, value: u32) -> Result<()> {
        self.record(CodecCall::Resize {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            dimension,
            value,
        });
        if self.fail_resize {
            std::fs::write(output, b"partial")?;
            return Err(ConvertError::Codec("fake resize failure".to_string()));
        }
        std::fs::copy(input, output)?;
        Ok(())
    }

    async fn encode_jpeg(&self, input: &Path, quality: u8) -> Result<Vec<u8>> {
        self.record(CodecCall::EncodeJpeg {
            input: input.to_path_buf(),
            quality,
        });
        self.encoded(input, ImageFormat::Jpg)
    }

    async fn encode_with_quality_range(
        &self,
        input: &Path,
        format: ImageFormat,
        range: QualityRange,
    ) -> Result<Vec<u8>> {
        self.record(CodecCall::EncodeRange {
            input: input.to_path_buf(),
            format,
            range,
        });
        self.encoded(input, format)
    }

    async fn encode_with_quality(&self, input: &Path, format: ImageFormat, quality: u8) -> Result<Vec<u8>> {
        self.record(CodecCall::Encode {
            input: input.to_path_buf(),
            format,
            quality,
        });
        self.encoded(input, format)
    }

    async fn optimize_jpeg(&self, data: Vec<u8>) -> Result<Vec<u8>> {
        self.record(CodecCall::OptimizeJpeg);
        Ok(data)
    }
}
