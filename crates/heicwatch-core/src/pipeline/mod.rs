//! Conversion pipeline components.
//!
//! - **filter**: Decide which watch events trigger a conversion
//! - **decode**: External HEIC decoder
//! - **encode**: Raster encoding to PNG/JPEG
//! - **convert**: Single-file conversion with staged output
//! - **discovery**: Find source files in directories (batch mode)
//! - **pool**: Watch-mode worker pool over a shared event channel
//! - **batch**: Bounded-concurrency task group (batch mode)

pub mod batch;
pub mod convert;
pub mod decode;
pub mod discovery;
pub mod encode;
pub mod filter;
pub mod pool;

// Re-exports for convenient access
pub use batch::{BatchReport, JobFailure, TaskGroup};
pub use convert::{Convert, Converter};
pub use decode::{HeicDecoder, HeifCliDecoder};
pub use discovery::FileDiscovery;
pub use encode::{ImageEncoder, RasterEncoder};
pub use filter::EventFilter;
pub use pool::{shutdown_channel, PoolStats, ShutdownSignal, ShutdownTrigger, WorkerPool};
