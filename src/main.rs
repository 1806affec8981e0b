//! # Image Convert - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Caricamento della configurazione (`--config` o cartella di config utente)
//! - Unico punto di gestione errori: ogni errore diventa un exit code
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose, `RUST_LOG` ha priorità)
//! 3. Carica `AppConfig` e costruisce il `Logger`
//! 4. Costruisce la `ConversionRequest` (argomenti CLI, poi default di configurazione)
//! 5. Sceglie l'handler per `--type` e lo esegue
//!
//! ## Exit code:
//! - `0`: successo (anche con task falliti, già loggati)
//! - `1`: errore generico
//! - `2`: richiesta non valida
//! - `3`: tipo di conversione non supportato
//! - `4`: dipendenza mancante
//!
//! ## Esempio di utilizzo:
//! ```bash
//! image-convert -s photos -r -i .webp -w 1200:-b,800:-m,400:-s --qualitywebp 75
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use image_convert::handler::IMAGES;
use image_convert::tool_resolver::ToolPathResolver;
use image_convert::{AppConfig, ConversionRequest, Handler, Logger, QualitySettings, ToolCodec};

#[derive(Parser)]
#[command(name = "image-convert")]
#[command(about = "Convert folders of images to WebP, AVIF, JPEG and PNG at one or more sizes")]
struct Args {
    /// Kind of conversion
    #[arg(short = 't', long = "type", default_value = IMAGES)]
    convert_type: String,

    /// Folder to process
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Process sub-folders too
    #[arg(short, long)]
    recursive: bool,

    /// Copy the folder to the destination and convert the copy
    #[arg(short, long)]
    copy: bool,

    /// Destination of the copy (with --copy)
    #[arg(short, long)]
    destination: Option<PathBuf>,

    /// Replace the originals with the converted files
    #[arg(short, long)]
    overwrite: bool,

    /// Source format to convert: all, .jpg, .jpeg or .png
    #[arg(short, long, default_value = "all")]
    from: String,

    /// Target format: all, .webp, .avif, .jpg or .png
    #[arg(short = 'i', long = "in", default_value = "all")]
    target: String,

    /// JPEG quality (1-100)
    #[arg(long = "qualityjpg", visible_alias = "qjpg")]
    quality_jpg: Option<u8>,

    /// PNG quality (1-100)
    #[arg(long = "qualitypng", visible_alias = "qpng")]
    quality_png: Option<u8>,

    /// WebP quality (1-100)
    #[arg(long = "qualitywebp", visible_alias = "qwebp")]
    quality_webp: Option<u8>,

    /// AVIF quality (1-100)
    #[arg(long = "qualityavif", visible_alias = "qavif")]
    quality_avif: Option<u8>,

    /// Target widths in whole pixels, e.g. 800 or 1200:-b,800:-m,400:-s ("no" keeps the size).
    /// Labels are only allowed in lists; "800:-s" or "800px" alone is rejected
    #[arg(short, long, default_value = "no")]
    width: String,

    /// Target heights in whole pixels, same syntax as --width; ignored when a width is given
    #[arg(long, visible_alias = "he", default_value = "no")]
    height: String,

    /// Number of files converted in parallel
    #[arg(long)]
    workers: Option<usize>,

    /// Configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Request from the arguments, falling back to configured defaults
    fn into_request(self, config: &AppConfig) -> ConversionRequest {
        let defaults = config.qualities();

        ConversionRequest {
            source: self.source.unwrap_or_else(|| config.default_source_folder.clone()),
            recursive: self.recursive || config.recursive,
            copy: self.copy || config.copy,
            destination: self
                .destination
                .unwrap_or_else(|| config.default_copy_folder.clone()),
            overwrite: self.overwrite || config.overwrite,
            from: self.from,
            target: self.target,
            quality: QualitySettings {
                jpg: self.quality_jpg.unwrap_or(defaults.jpg),
                png: self.quality_png.unwrap_or(defaults.png),
                webp: self.quality_webp.unwrap_or(defaults.webp),
                avif: self.quality_avif.unwrap_or(defaults.avif),
            },
            width: self.width,
            height: self.height,
            workers: self.workers.unwrap_or(config.workers),
        }
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

async fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    match explicit {
        Some(path) if !path.exists() => Err(anyhow::anyhow!(
            "Configuration file does not exist: {}",
            path.display()
        )),
        Some(path) => AppConfig::from_file(path).await,
        None => match AppConfig::default_location() {
            Some(path) => AppConfig::from_file(&path).await,
            None => Ok(AppConfig::default()),
        },
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_tracing(args.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    let config = match load_config(args.config.as_deref()).await {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            return ExitCode::from(2);
        }
    };

    let logger = Logger::from_config(&config);
    let codec = ToolCodec::new(ToolPathResolver::new());
    codec.check_dependencies();

    let convert_type = args.convert_type.clone();
    let request = args.into_request(&config);

    let outcome = match Handler::for_type(&convert_type, request, Arc::new(codec), logger.clone()) {
        Ok(handler) => handler.process().await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(stats) => {
            info!("✅ Conversion completed: {} outputs written", stats.outputs_written);
            ExitCode::SUCCESS
        }
        Err(e) if e.is_fatal() => {
            logger.error(format!("Conversion aborted: {}", e));
            ExitCode::from(e.exit_code())
        }
        Err(e) => {
            logger.error(format!("Error during image conversion process: {}", e));
            ExitCode::from(e.exit_code())
        }
    }
}
