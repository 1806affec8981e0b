//! # Directory Walker
//!
//! Questo modulo percorre la cartella di lavoro e guida la conversione di ogni file.
//!
//! ## Flusso per file:
//! ```text
//! file idoneo
//!   -> (overwrite) WorkFileStager::stage    copia WORK-, cancella originale
//!   -> ConversionPlanner::plan              task ordinati
//!   -> ConversionExecutor::run              un task alla volta
//!   -> (overwrite) WorkFileStager::unstage  cancella WORK-
//! ```
//!
//! ## Traversal:
//! - Voci visitate in ordine di nome, sottocartelle solo con `recursive`
//! - Link simbolici seguiti
//! - Una cartella illeggibile viene loggata e saltata, il resto prosegue
//! - File non idonei ignorati in silenzio
//!
//! ## Concorrenza:
//! - `workers = 1`: file elaborati in sequenza
//! - `workers > 1`: un task tokio per file, limitati da un `Semaphore`;
//!   i task dello stesso file restano sequenziali

use crate::codec::Codec;
use crate::config::ValidatedRequest;
use crate::executor::ConversionExecutor;
use crate::formats::SourceFilter;
use crate::logger::Logger;
use crate::namer::FileNamer;
use crate::planner::ConversionPlanner;
use crate::progress::ConversionStats;
use crate::staging::WorkFileStager;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::debug;
use walkdir::WalkDir;

/// Stage, plan, convert and unstage a single file
#[derive(Clone)]
pub struct FilePipeline {
    planner: ConversionPlanner,
    executor: ConversionExecutor,
    stager: Option<WorkFileStager>,
}

impl FilePipeline {
    pub fn new(planner: ConversionPlanner, executor: ConversionExecutor, stager: Option<WorkFileStager>) -> Self {
        Self {
            planner,
            executor,
            stager,
        }
    }

    /// Run every task for `path`. Never fails; problems are logged and counted.
    pub async fn process(&self, path: &Path) -> ConversionStats {
        let mut stats = ConversionStats::new();

        let staged = match &self.stager {
            Some(stager) => match stager.stage(path).await {
                Some(staged) => Some(staged),
                None => {
                    stats.add_skipped();
                    return stats;
                }
            },
            None => None,
        };

        let input = staged
            .as_ref()
            .map(|file| file.path().to_path_buf())
            .unwrap_or_else(|| path.to_path_buf());
        stats.add_file();

        for task in self.planner.plan(&input) {
            match self.executor.run(&task).await {
                Some(converted) => stats.add_output(converted.size),
                None => stats.add_failure(),
            }
        }

        if let (Some(stager), Some(staged)) = (&self.stager, staged) {
            stager.unstage(staged).await;
        }

        stats
    }
}

/// Walks a directory tree and converts every eligible file
pub struct DirectoryWalker {
    pipeline: Arc<FilePipeline>,
    filter: SourceFilter,
    recursive: bool,
    workers: usize,
    logger: Logger,
}

impl DirectoryWalker {
    pub fn new(request: &ValidatedRequest, codec: Arc<dyn Codec>, logger: Logger) -> Self {
        let options = &request.request;
        let executor = ConversionExecutor::new(
            codec,
            options.quality,
            FileNamer::new(options.overwrite),
            logger.clone(),
        );
        let planner = ConversionPlanner::new(request.resize.clone(), request.selector.clone());
        let stager = options.overwrite.then(|| WorkFileStager::new(logger.clone()));

        Self {
            pipeline: Arc::new(FilePipeline::new(planner, executor, stager)),
            filter: request.filter.clone(),
            recursive: options.recursive,
            workers: options.workers.max(1),
            logger,
        }
    }

    /// Eligible files under `root`, in visiting order
    pub fn eligible_files(&self, root: &Path) -> Vec<PathBuf> {
        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let mut files = Vec::new();

        for entry in WalkDir::new(root)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(true)
            .sort_by_file_name()
        {
            match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    if self.filter.is_eligible(entry.path()) {
                        files.push(entry.into_path());
                    }
                }
                Ok(_) => {}
                Err(e) => self.logger.error(format!("Error reading folder: {}", e)),
            }
        }

        debug!("{} eligible files under {}", files.len(), root.display());
        files
    }

    /// Convert every eligible file under `root`
    pub async fn walk(&self, root: &Path) -> ConversionStats {
        let files = self.eligible_files(root);

        if self.workers <= 1 {
            let mut stats = ConversionStats::new();
            for file in files {
                stats.merge(&self.pipeline.process(&file).await);
            }
            return stats;
        }

        self.walk_concurrently(files).await
    }

    async fn walk_concurrently(&self, files: Vec<PathBuf>) -> ConversionStats {
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks = Vec::with_capacity(files.len());
        let mut stats = ConversionStats::new();

        for file in files {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    self.logger.error(format!("Worker pool closed: {}", e));
                    break;
                }
            };
            let pipeline = self.pipeline.clone();

            tasks.push(tokio::spawn(async move {
                let _permit = permit;
                pipeline.process(&file).await
            }));
        }

        for task in tasks {
            match task.await {
                Ok(file_stats) => stats.merge(&file_stats),
                Err(e) => self.logger.error(format!("File worker failed: {}", e)),
            }
        }

        stats
    }
}
