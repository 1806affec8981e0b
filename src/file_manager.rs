//! # File Management Module
//!
//! Questo modulo gestisce le operazioni sul filesystem usate dalla pipeline.
//!
//! ## Responsabilità:
//! - Verifica esistenza di file e cartelle
//! - Preparazione della cartella di lavoro (modalità `copy`)
//! - Copia di cartelle, ricorsiva o solo primo livello
//! - Cancellazione "best effort" di file con log degli errori
//! - Formattazione human-readable delle dimensioni
//!
//! ## Modalità copy:
//! ```text
//! source = photos, destination = result
//!   -> crea result/photos
//!   -> copia photos/* in result/photos/*
//!   -> la conversione lavora su result/photos, photos resta intatta
//! ```
//!
//! ## Gestione errori:
//! - Gli errori di copia e cancellazione vengono loggati, mai propagati
//! - Solo una cartella sorgente inesistente è un errore di validazione

use crate::error::{ConvertError, Result};
use crate::logger::Logger;
use futures::future::BoxFuture;
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Manages file operations
pub struct FileManager;

impl FileManager {
    /// True when `path` exists and is a directory
    pub async fn does_directory_exist(path: &Path) -> bool {
        fs::metadata(path)
            .await
            .map(|metadata| metadata.is_dir())
            .unwrap_or(false)
    }

    /// True when `path` exists (file or directory)
    pub async fn is_exist(path: &Path) -> bool {
        fs::metadata(path).await.is_ok()
    }

    /// Create a directory and its parents, logging failures
    pub async fn create_process_dir(path: &Path, logger: &Logger) {
        if let Err(e) = fs::create_dir_all(path).await {
            logger.error(format!("Error creating directory: {}", e));
        }
    }

    /// Directory the conversion runs in.
    ///
    /// Without `copy` this is `source` itself. With `copy` the source folder is
    /// copied to `destination/<source>` first and the copy is processed.
    pub async fn prepare_dir(
        source: &Path,
        destination: &Path,
        copy: bool,
        recursive: bool,
        logger: &Logger,
    ) -> Result<PathBuf> {
        if !Self::does_directory_exist(source).await {
            return Err(ConvertError::Validation(
                "The folder for processing is incorrectly specified.".to_string(),
            ));
        }

        if !copy {
            return Ok(source.to_path_buf());
        }

        let process_folder = Self::process_folder(source, destination);
        debug!("Processing copy in {}", process_folder.display());

        Self::create_process_dir(&process_folder, logger).await;
        match Self::copy_folder(source.to_path_buf(), process_folder.clone(), recursive).await {
            Ok(()) => logger.info("Copying completed successfully."),
            Err(e) => logger.error(format!("Error during copying: {}", e)),
        }

        Ok(process_folder)
    }

    /// `destination` joined with the relative components of `source`
    pub fn process_folder(source: &Path, destination: &Path) -> PathBuf {
        source
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part),
                _ => None,
            })
            .fold(destination.to_path_buf(), |acc, part| acc.join(part))
    }

    /// Copy the content of `source` into `destination`.
    ///
    /// Sub-directories are copied with their content only when `recursive` is
    /// set; otherwise they are created empty.
    pub fn copy_folder(
        source: PathBuf,
        destination: PathBuf,
        recursive: bool,
    ) -> BoxFuture<'static, io::Result<()>> {
        Box::pin(async move {
            fs::create_dir_all(&destination).await?;

            let mut entries = fs::read_dir(&source).await?;
            while let Some(entry) = entries.next_entry().await? {
                let source_path = entry.path();
                let destination_path = destination.join(entry.file_name());

                if fs::metadata(&source_path).await?.is_dir() {
                    if recursive {
                        Self::copy_folder(source_path, destination_path, recursive).await?;
                    } else {
                        fs::create_dir_all(&destination_path).await?;
                    }
                } else {
                    fs::copy(&source_path, &destination_path).await?;
                }
            }

            Ok(())
        })
    }

    /// Delete `path`, logging a missing file or a failed removal
    pub async fn delete_file_if_exists(path: &Path, logger: &Logger) -> bool {
        if !Self::is_exist(path).await {
            logger.error(format!("File {} does not exist.", path.display()));
            return false;
        }

        match fs::remove_file(path).await {
            Ok(()) => true,
            Err(e) => {
                logger.error(format!("Error deleting {}: {}", path.display(), e));
                false
            }
        }
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::LogKind;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("photos");
        std::fs::create_dir_all(root.join("nested").join("deeper")).unwrap();
        std::fs::write(root.join("a.png"), b"a").unwrap();
        std::fs::write(root.join("nested").join("b.jpg"), b"b").unwrap();
        std::fs::write(root.join("nested").join("deeper").join("c.jpg"), b"c").unwrap();
        temp_dir
    }

    #[test]
    fn test_format_size() {
        assert_eq!(FileManager::format_size(512), "512 B");
        assert_eq!(FileManager::format_size(2048), "2.00 KB");
        assert_eq!(FileManager::format_size(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_process_folder_keeps_relative_source() {
        assert_eq!(
            FileManager::process_folder(Path::new("photos/2024"), Path::new("result")),
            PathBuf::from("result/photos/2024")
        );
        assert_eq!(
            FileManager::process_folder(Path::new("./photos"), Path::new("out")),
            PathBuf::from("out/photos")
        );
    }

    #[tokio::test]
    async fn test_copy_folder_recursive() {
        let temp_dir = fixture();
        let source = temp_dir.path().join("photos");
        let target = temp_dir.path().join("copy");

        FileManager::copy_folder(source, target.clone(), true).await.unwrap();

        assert!(target.join("a.png").is_file());
        assert!(target.join("nested").join("b.jpg").is_file());
        assert!(target.join("nested").join("deeper").join("c.jpg").is_file());
    }

    #[tokio::test]
    async fn test_copy_folder_flat_creates_empty_subdirs() {
        let temp_dir = fixture();
        let source = temp_dir.path().join("photos");
        let target = temp_dir.path().join("copy");

        FileManager::copy_folder(source, target.clone(), false).await.unwrap();

        assert!(target.join("a.png").is_file());
        assert!(target.join("nested").is_dir());
        assert!(!target.join("nested").join("b.jpg").exists());
    }

    #[tokio::test]
    async fn test_prepare_dir_without_copy_returns_source() {
        let temp_dir = fixture();
        let (logger, sink) = Logger::memory();
        let source = temp_dir.path().join("photos");

        let dir = FileManager::prepare_dir(&source, temp_dir.path(), false, false, &logger)
            .await
            .unwrap();

        assert_eq!(dir, source);
        assert!(sink.lines().is_empty());
    }

    #[tokio::test]
    async fn test_prepare_dir_copy_mode() {
        let temp_dir = fixture();
        let (logger, sink) = Logger::memory();
        let source = temp_dir.path().join("photos");
        let destination = temp_dir.path().join("result");

        let dir = FileManager::prepare_dir(&source, &destination, true, true, &logger)
            .await
            .unwrap();

        assert_eq!(dir, FileManager::process_folder(&source, &destination));
        assert!(dir.join("nested").join("deeper").join("c.jpg").is_file());
        assert!(source.join("a.png").is_file());
        assert_eq!(
            sink.messages(LogKind::Info),
            vec!["Copying completed successfully.".to_string()]
        );
    }

    #[tokio::test]
    async fn test_prepare_dir_rejects_missing_source() {
        let temp_dir = TempDir::new().unwrap();
        let (logger, _) = Logger::memory();
        let missing = temp_dir.path().join("nope");

        let result = FileManager::prepare_dir(&missing, temp_dir.path(), false, false, &logger).await;
        assert!(matches!(result, Err(ConvertError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_file_if_exists() {
        let temp_dir = TempDir::new().unwrap();
        let (logger, sink) = Logger::memory();
        let path = temp_dir.path().join("x.png");
        std::fs::write(&path, b"x").unwrap();

        assert!(FileManager::delete_file_if_exists(&path, &logger).await);
        assert!(!path.exists());

        assert!(!FileManager::delete_file_if_exists(&path, &logger).await);
        let errors = sink.messages(LogKind::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].ends_with("does not exist."));
    }
}
