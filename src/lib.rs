//! # Image Convert Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Configurazione di default e richiesta di conversione
//! - `error`: Tassonomia degli errori ed exit code
//! - `resolution`: Parsing delle liste di risoluzioni (`1200:-b,800:-m`)
//! - `formats`: Formati sorgente/destinazione e filtri
//! - `namer`: Nomi dei file convertiti e collisioni
//! - `staging`: Copie `WORK-` in modalità overwrite
//! - `planner`: Espansione risoluzioni × formati in task
//! - `executor`: Esecuzione di un task (resize, encode, scrittura)
//! - `walker`: Traversal della cartella e pipeline per file
//! - `codec` / `tool_resolver`: Encoder (`image` + tool esterni)
//! - `handler`: Registry dei tipi di conversione
//! - `logger`: Messaggi per l'utente con sink configurabili
//! - `file_manager`: Operazioni su file e modalità copy
//! - `progress`: Spinner e statistiche
//!
//! ## Utilizzo:
//! ```ignore
//! use image_convert::{AppConfig, ConversionRequest, Handler, Logger, ToolCodec};
//!
//! let config = AppConfig::default();
//! let logger = Logger::from_config(&config);
//! let request = ConversionRequest::from_config(&config);
//! let handler = Handler::for_type("images", request, Arc::new(ToolCodec::default()), logger)?;
//! let stats = handler.process().await?;
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod executor;
pub mod file_manager;
pub mod formats;
pub mod handler;
pub mod logger;
pub mod namer;
pub mod planner;
pub mod progress;
pub mod resolution;
pub mod staging;
pub mod tool_resolver;
pub mod walker;

#[cfg(test)]
pub(crate) mod testing;

pub use codec::{Codec, ToolCodec};
pub use config::{AppConfig, ConversionRequest, QualitySettings};
pub use error::ConvertError;
pub use handler::Handler;
pub use logger::Logger;
pub use progress::ConversionStats;
