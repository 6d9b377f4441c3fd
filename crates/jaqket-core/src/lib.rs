//! JAQKET Core - Common infrastructure for the JAQKET dataset adapter
//!
//! HTTP download with gzip decoding, the on-disk download cache, Arrow batch
//! accumulation, logging and progress reporting.

pub mod accumulator;
pub mod cache;
pub mod logging;
pub mod progress;
pub mod stream;

// Re-exports for convenience
pub use accumulator::{Accumulator, BatchStats, DEFAULT_BATCH_SIZE, accumulate};
pub use cache::{cache_file_name, cleanup_tmp_files, fetch_cached, is_gzip_url};
pub use logging::{IndicatifLogger, init_logging};
pub use progress::{ProgressContext, SharedProgress, fmt_num, rows_message};
pub use stream::{
    ByteCounter, Download, HttpConfig, SHARED_RUNTIME, StreamError, http_config,
    set_http_config,
};
