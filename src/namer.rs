//! # Output Naming
//!
//! Derives output file names from the file being converted.
//!
//! ```text
//! photos/cat.png      + ".webp"    -> photos/cat.webp
//! photos/cat.png      + "-s.webp"  -> photos/cat-s.webp
//! photos/WORK-cat.png + ".webp"    -> photos/cat.webp      (overwrite mode)
//! photos/cat.jpg      + ".jpg"     -> photos/cat-k3f9a.jpg (would overwrite its own input)
//! ```

use rand::Rng;
use std::path::{Path, PathBuf};

/// Prefix of staged copies in overwrite mode
pub const WORK_PREFIX: &str = "WORK-";

const TOKEN_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const TOKEN_LEN: usize = 5;

/// Computes output paths for converted files
#[derive(Debug, Clone, Copy)]
pub struct FileNamer {
    overwrite: bool,
}

impl FileNamer {
    pub fn new(overwrite: bool) -> Self {
        Self { overwrite }
    }

    /// Output path for `destination` with `extension` (suffix included, e.g. `-800.webp`)
    pub fn output_path(&self, destination: &Path, extension: &str) -> PathBuf {
        let stem = destination
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let base = if self.overwrite {
            stem.strip_prefix(WORK_PREFIX).unwrap_or(&stem).to_string()
        } else {
            stem
        };

        destination.with_file_name(format!("{}{}", base, extension))
    }

    /// Like [`output_path`](Self::output_path), but never returns `input` itself.
    pub fn output_path_avoiding(&self, destination: &Path, extension: &str, input: &Path) -> PathBuf {
        let output = self.output_path(destination, extension);
        if output == input {
            disambiguate(&output)
        } else {
            output
        }
    }
}

/// `dir/name.ext` -> `dir/name-<token>.ext`
pub fn disambiguate(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match path.extension() {
        Some(ext) => format!("{}-{}.{}", stem, unique_token(), ext.to_string_lossy()),
        None => format!("{}-{}", stem, unique_token()),
    };
    path.with_file_name(file_name)
}

/// Short random base36 token
pub fn unique_token() -> String {
    let mut rng = rand::thread_rng();
    (0..TOKEN_LEN)
        .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}
