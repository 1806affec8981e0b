//! # Resolution Parsing
//!
//! Turns a `--width` / `--height` value into an ordered list of targets.
//!
//! ```text
//! "800"                     -> [800]
//! "1200,800,400"            -> [1200, 800, 400]
//! "1200:-b,800:-m,400:-s"   -> [1200 "-b", 800 "-m", 400 "-s"]
//! "no" / ""                 -> no resizing
//! ```

use crate::error::{ConvertError, Result};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Smallest accepted resolution value
pub const MIN_RESOLUTION: u32 = 5;
/// Largest accepted resolution value
pub const MAX_RESOLUTION: u32 = 2000;

/// Sentinel meaning "do not resize"
pub const NO_RESIZE: &str = "no";

/// One resize target with its optional file name suffix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionSpec {
    pub value: u32,
    pub label: Option<String>,
}

impl ResolutionSpec {
    pub fn new(value: u32) -> Self {
        Self { value, label: None }
    }

    pub fn with_label(value: u32, label: impl Into<String>) -> Self {
        Self {
            value,
            label: Some(label.into()),
        }
    }
}

/// Which side of the image a resolution applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Width,
    Height,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Width => "width",
            Dimension::Height => "height",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resize work requested for every file of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResizePlan {
    /// Single unsized pass per format
    Original,
    Resize {
        dimension: Dimension,
        specs: Vec<ResolutionSpec>,
    },
}

impl ResizePlan {
    /// Build the plan from the raw width/height values. Width wins when both are set.
    pub fn from_specs(width: &str, height: &str) -> Result<Self> {
        if !is_no_resize(width) {
            return Ok(ResizePlan::Resize {
                dimension: Dimension::Width,
                specs: parse_resolutions(width)?,
            });
        }
        if !is_no_resize(height) {
            return Ok(ResizePlan::Resize {
                dimension: Dimension::Height,
                specs: parse_resolutions(height)?,
            });
        }
        Ok(ResizePlan::Original)
    }
}

/// True for the `"no"` sentinel and for blank values
pub fn is_no_resize(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case(NO_RESIZE)
}

/// Parse a resolution list. Fails on the first invalid entry.
pub fn parse_resolutions(input: &str) -> Result<Vec<ResolutionSpec>> {
    if !input.contains(',') {
        return Ok(vec![ResolutionSpec::new(parse_value(input)?)]);
    }

    let mut result = Vec::new();
    for item in input.split(',') {
        let mut parts = item.split(':').map(str::trim);
        let value = parse_value(parts.next().unwrap_or_default())?;

        match parts.next().filter(|label| !label.is_empty()) {
            Some(label) => {
                if !label_pattern().is_match(label) {
                    return Err(ConvertError::Validation(
                        "Suffix should contain only letters and hyphen".to_string(),
                    ));
                }
                result.push(ResolutionSpec::with_label(value, label));
            }
            None => result.push(ResolutionSpec::new(value)),
        }
    }

    Ok(result)
}

fn parse_value(raw: &str) -> Result<u32> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|value| (MIN_RESOLUTION..=MAX_RESOLUTION).contains(value))
        .ok_or_else(|| {
            ConvertError::Validation(format!(
                "Resolution value should be a number between {} and {} (got '{}')",
                MIN_RESOLUTION,
                MAX_RESOLUTION,
                raw.trim()
            ))
        })
}

fn label_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z-]+$").expect("static regex"))
}
