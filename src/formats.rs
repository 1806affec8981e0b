//! Image formats known to the converter and the request-side selectors
//! (`from` source filter and `in` target selector).

use std::fmt;
use std::path::Path;

/// Extensions a file may have to be picked up as a conversion source.
pub const VALID_SOURCE_FORMATS: &[&str] = &[".jpg", ".jpeg", ".png"];

/// Target formats, in the order `all` expands to.
pub const CONVERT_FORMATS: &[ImageFormat] = &[
    ImageFormat::Webp,
    ImageFormat::Avif,
    ImageFormat::Jpg,
    ImageFormat::Png,
];

/// A convertible target format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Webp,
    Avif,
    Jpg,
    Png,
}

impl ImageFormat {
    /// Extension including the leading dot, as written into output names
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Webp => ".webp",
            ImageFormat::Avif => ".avif",
            ImageFormat::Jpg => ".jpg",
            ImageFormat::Png => ".png",
        }
    }

    /// Parse `.webp`, `webp`, `WEBP`... into a format
    pub fn from_extension(ext: &str) -> Option<Self> {
        match normalize_extension(ext).as_str() {
            ".webp" => Some(ImageFormat::Webp),
            ".avif" => Some(ImageFormat::Avif),
            ".jpg" => Some(ImageFormat::Jpg),
            ".png" => Some(ImageFormat::Png),
            _ => None,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// The `in` selector of a request.
///
/// Values that are neither `all` nor a convertible format are kept as
/// `Unrecognized` and produce no conversion work at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatSelector {
    All,
    One(ImageFormat),
    Unrecognized(String),
}

impl FormatSelector {
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case("all") {
            return FormatSelector::All;
        }
        match ImageFormat::from_extension(value) {
            Some(format) => FormatSelector::One(format),
            None => FormatSelector::Unrecognized(value.to_string()),
        }
    }

    /// Formats this selector expands to, in conversion order
    pub fn formats(&self) -> Vec<ImageFormat> {
        match self {
            FormatSelector::All => CONVERT_FORMATS.to_vec(),
            FormatSelector::One(format) => vec![*format],
            FormatSelector::Unrecognized(_) => Vec::new(),
        }
    }
}

impl Default for FormatSelector {
    fn default() -> Self {
        FormatSelector::All
    }
}

/// The `from` filter of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceFilter {
    All,
    Extension(String),
}

impl SourceFilter {
    /// Parse a filter value; `None` when it names no valid source extension
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("all") {
            return Some(SourceFilter::All);
        }
        let ext = normalize_extension(value);
        if VALID_SOURCE_FORMATS.contains(&ext.as_str()) {
            Some(SourceFilter::Extension(ext))
        } else {
            None
        }
    }

    /// A file is eligible when its extension is a valid source format
    /// and matches this filter.
    pub fn is_eligible(&self, path: &Path) -> bool {
        let Some(ext) = dotted_extension(path) else {
            return false;
        };
        if !VALID_SOURCE_FORMATS.contains(&ext.as_str()) {
            return false;
        }
        match self {
            SourceFilter::All => true,
            SourceFilter::Extension(wanted) => *wanted == ext,
        }
    }
}

impl Default for SourceFilter {
    fn default() -> Self {
        SourceFilter::All
    }
}

/// Lowercased extension of `path` with its leading dot (`.jpg`)
pub fn dotted_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
}

/// True for `.jpg` / `.jpeg` paths, whatever the case
pub fn is_jpeg_path(path: &Path) -> bool {
    matches!(dotted_extension(path).as_deref(), Some(".jpg") | Some(".jpeg"))
}

fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_selector_all_expands_in_fixed_order() {
        let formats = FormatSelector::parse("all").formats();
        assert_eq!(
            formats,
            vec![ImageFormat::Webp, ImageFormat::Avif, ImageFormat::Jpg, ImageFormat::Png]
        );
    }

    #[test]
    fn test_selector_single_and_unrecognized() {
        assert_eq!(FormatSelector::parse(".webp").formats(), vec![ImageFormat::Webp]);
        assert_eq!(FormatSelector::parse("png").formats(), vec![ImageFormat::Png]);

        let unknown = FormatSelector::parse(".gif");
        assert_eq!(unknown, FormatSelector::Unrecognized(".gif".to_string()));
        assert!(unknown.formats().is_empty());
    }

    #[test]
    fn test_source_filter_parse() {
        assert_eq!(SourceFilter::parse("all"), Some(SourceFilter::All));
        assert_eq!(SourceFilter::parse(".PNG"), Some(SourceFilter::Extension(".png".into())));
        assert_eq!(SourceFilter::parse("jpeg"), Some(SourceFilter::Extension(".jpeg".into())));
        // webp is a target format, never a source
        assert_eq!(SourceFilter::parse(".webp"), None);
    }

    #[test]
    fn test_eligibility_requires_valid_source_and_filter_match() {
        let all = SourceFilter::All;
        assert!(all.is_eligible(&PathBuf::from("a/photo.JPG")));
        assert!(all.is_eligible(&PathBuf::from("a/photo.png")));
        assert!(!all.is_eligible(&PathBuf::from("a/photo.webp")));
        assert!(!all.is_eligible(&PathBuf::from("a/README")));

        let png_only = SourceFilter::parse(".png").unwrap();
        assert!(png_only.is_eligible(&PathBuf::from("photo.png")));
        assert!(!png_only.is_eligible(&PathBuf::from("photo.jpg")));
    }

    #[test]
    fn test_is_jpeg_path() {
        assert!(is_jpeg_path(&PathBuf::from("x.jpeg")));
        assert!(is_jpeg_path(&PathBuf::from("x.JPG")));
        assert!(!is_jpeg_path(&PathBuf::from("x.png")));
    }
}
