//! # Work File Staging
//!
//! Protocollo usato in modalità `overwrite` per ogni file:
//!
//! ```text
//! 1. photos/cat.png  --copy-->  photos/WORK-cat.png
//! 2. photos/cat.png  deleted
//! 3. conversion tasks read photos/WORK-cat.png, outputs are named photos/cat.*
//! 4. photos/WORK-cat.png deleted (success or failure)
//! ```
//!
//! L'originale viene cancellato subito dopo la copia, prima che esista un
//! output: un crash tra il passo 2 e il passo 4 lascia solo la copia `WORK-`.

use crate::file_manager::FileManager;
use crate::logger::Logger;
use crate::namer::WORK_PREFIX;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Staged copy of one source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub original: PathBuf,
    pub staged: PathBuf,
}

impl StagedFile {
    /// Path conversion tasks read from
    pub fn path(&self) -> &Path {
        &self.staged
    }
}

/// Creates and removes `WORK-` copies
#[derive(Clone)]
pub struct WorkFileStager {
    logger: Logger,
}

impl WorkFileStager {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }

    /// Sibling path holding the staged copy of `path`
    pub fn staged_path(path: &Path) -> PathBuf {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        path.with_file_name(format!("{}{}", WORK_PREFIX, file_name))
    }

    /// Copy `path` to its staged sibling, then delete `path`.
    ///
    /// Returns `None` when the copy failed; the original is left in place and
    /// the file must be skipped.
    pub async fn stage(&self, path: &Path) -> Option<StagedFile> {
        let staged = Self::staged_path(path);

        if let Err(e) = fs::copy(path, &staged).await {
            self.logger
                .error(format!("Error creating workfile {}: {}", path.display(), e));
            return None;
        }
        debug!("Staged {} as {}", path.display(), staged.display());

        FileManager::delete_file_if_exists(path, &self.logger).await;

        Some(StagedFile {
            original: path.to_path_buf(),
            staged,
        })
    }

    /// Remove the staged copy
    pub async fn unstage(&self, file: StagedFile) {
        FileManager::delete_file_if_exists(&file.staged, &self.logger).await;
        debug!("Unstaged {}", file.staged.display());
    }
}
