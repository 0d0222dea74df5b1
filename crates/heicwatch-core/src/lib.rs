//! heicwatch core - HEIC to PNG/JPEG conversion pipeline.
//!
//! Decoding is delegated to libheif's command line decoder and encoding to
//! the `image` crate; this crate owns the orchestration around them.
//!
//! # Architecture
//!
//! ```text
//! watch mode:  notify → WatchSource → [event channel] → WorkerPool (N threads)
//!                                                         └→ EventFilter → Converter
//! batch mode:  FileDiscovery → Vec<ConversionJob> → TaskGroup (ceiling N) → Converter
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use heicwatch_core::{Config, ConversionJob, Converter, Convert, HeifCliDecoder, ImageEncoder};
//!
//! let config = Config::load()?;
//! let decoder = HeifCliDecoder::locate(config.decoder_program())?;
//! let converter = Converter::new(Box::new(decoder), Box::new(ImageEncoder));
//!
//! let output = converter.convert(&ConversionJob::new("IMG_0001.HEIC", "./out", "png"))?;
//! println!("wrote {}", output.display());
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;
pub mod watch;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, HeicwatchError, PipelineError, PipelineResult, Result, WatchError};
pub use pipeline::{
    shutdown_channel, BatchReport, Convert, Converter, EventFilter, FileDiscovery, HeicDecoder,
    HeifCliDecoder, ImageEncoder, JobFailure, PoolStats, RasterEncoder, ShutdownSignal,
    ShutdownTrigger, TaskGroup, WorkerPool,
};
pub use types::{
    ConversionJob, ConversionResult, TargetFormat, WatchEvent, WatchEventKind, WorkerPoolConfig,
};
pub use watch::WatchSource;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
