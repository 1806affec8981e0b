//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `ConvertError` enum per categorizzare tutti gli errori possibili
//! - Distingue errori globali (validazione richiesta) da errori locali (file/task)
//! - Mappa ogni categoria su un exit code del processo
//!
//! ## Categorie di errori:
//! - `Validation`: Risoluzione, suffisso, qualità o cartella non validi (fatale)
//! - `UnsupportedInput`: Tipo di conversione sconosciuto (fatale)
//! - `Io`: Errori di I/O (stat, read, write, copy, delete) - solo il file/subtree
//! - `Image`: Errori di decodifica/resize in-process - solo il task
//! - `Codec`: Tool esterno fallito - solo il task
//! - `MissingDependency`: Tool esterno mancante (pngquant, cwebp, avifenc, jpegtran)
//!
//! ## Esempio:
//! ```ignore
//! if !(1..=100).contains(&quality) {
//!     return Err(ConvertError::Validation("Quality must be a number between 1 and 100".into()));
//! }
//! ```

/// Custom error types for image conversion
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("Dependency missing: {0}")]
    MissingDependency(String),
}

impl ConvertError {
    /// Process exit code used by the binary when this error ends the run
    pub fn exit_code(&self) -> u8 {
        match self {
            ConvertError::Validation(_) => 2,
            ConvertError::UnsupportedInput(_) => 3,
            ConvertError::MissingDependency(_) => 4,
            _ => 1,
        }
    }

    /// Whether the error must abort the whole run instead of a single file or task
    pub fn is_fatal(&self) -> bool {
        matches!(self, ConvertError::Validation(_) | ConvertError::UnsupportedInput(_))
    }
}

pub type Result<T, E = ConvertError> = std::result::Result<T, E>;
