//! # Progress and Statistics Module
//!
//! Questo modulo gestisce lo spinner di feedback e le statistiche di conversione.
//!
//! ## Statistiche tracciate:
//! - **files_processed**: File sorgente elaborati (idonei)
//! - **files_skipped**: File saltati (errore di staging)
//! - **outputs_written**: File convertiti scritti su disco
//! - **tasks_failed**: Task di conversione falliti (formato × risoluzione)
//! - **bytes_written**: Byte totali dei file prodotti
//!
//! ## Esempio:
//! ```ignore
//! let mut stats = ConversionStats::new();
//! stats.add_output(12_345);
//! stats.add_failure();
//! info!("{}", stats.format_summary());
//! ```

use crate::file_manager::FileManager;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a spinner for indeterminate progress
pub fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();

    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }

    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));

    spinner
}

/// Statistics for one conversion run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConversionStats {
    pub files_processed: usize,
    pub files_skipped: usize,
    pub outputs_written: usize,
    pub tasks_failed: usize,
    pub bytes_written: u64,
}

impl ConversionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self) {
        self.files_processed += 1;
    }

    pub fn add_skipped(&mut self) {
        self.files_skipped += 1;
    }

    pub fn add_output(&mut self, size: u64) {
        self.outputs_written += 1;
        self.bytes_written += size;
    }

    pub fn add_failure(&mut self) {
        self.tasks_failed += 1;
    }

    /// Fold the numbers of another run (or worker) into this one
    pub fn merge(&mut self, other: &ConversionStats) {
        self.files_processed += other.files_processed;
        self.files_skipped += other.files_skipped;
        self.outputs_written += other.outputs_written;
        self.tasks_failed += other.tasks_failed;
        self.bytes_written += other.bytes_written;
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Processed: {} files | Skipped: {} | Outputs: {} | Failed tasks: {} | Written: {}",
            self.files_processed,
            self.files_skipped,
            self.outputs_written,
            self.tasks_failed,
            FileManager::format_size(self.bytes_written),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_accumulate() {
        let mut stats = ConversionStats::new();
        stats.add_file();
        stats.add_output(1024);
        stats.add_output(1024);
        stats.add_failure();

        assert_eq!(stats.files_processed, 1);
        assert_eq!(stats.outputs_written, 2);
        assert_eq!(stats.bytes_written, 2048);
        assert_eq!(stats.tasks_failed, 1);
        assert_eq!(
            stats.format_summary(),
            "Processed: 1 files | Skipped: 0 | Outputs: 2 | Failed tasks: 1 | Written: 2.00 KB"
        );
    }

    #[test]
    fn test_merge() {
        let mut total = ConversionStats::new();
        let mut worker = ConversionStats::new();
        worker.add_file();
        worker.add_skipped();
        worker.add_output(10);

        total.merge(&worker);
        total.merge(&worker);

        assert_eq!(total.files_processed, 2);
        assert_eq!(total.files_skipped, 2);
        assert_eq!(total.bytes_written, 20);
    }
}
