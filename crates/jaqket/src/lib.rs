//! JAQKET - Japanese quiz QA dataset adapter
//!
//! Downloads the JAQKET resources, filters and reshapes the quiz records into
//! one uniform schema per dataset version, and hands them out lazily as
//! `(qid, record)` pairs or collected into Arrow record batches.
//!
//! - `v1.0`: multiple choice over candidate entities; each candidate is
//!   resolved to its entity text.
//! - `v2.0`: open-domain QA over retrieved passages; questions whose kept
//!   passages never contain the answer are dropped.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use jaqket::{Config, HttpFetcher, split_generators, generate_examples};
//! use jaqket_core::ProgressContext;
//!
//! let config = Config::new("v2.0").with_num_contexts(Some(10));
//! let fetcher = HttpFetcher::new("cache", Arc::new(ProgressContext::new()));
//! for generator in split_generators(&config, &fetcher)? {
//!     for example in generate_examples(&config, &generator.inputs)? {
//!         let (qid, _record) = example?;
//!         println!("{}: {qid}", generator.split);
//!     }
//! }
//! # Ok::<(), jaqket::DatasetError>(())
//! ```

pub mod builder;
pub mod config;
pub mod entities;
pub mod error;
pub mod fetcher;
pub mod info;
pub mod runner;
pub mod v1;
pub mod v2;
pub mod version;

// Re-exports
pub use builder::{
    Example, Examples, SplitGenerator, SplitInputs, generate_examples, info, split_generators,
};
pub use config::{BuilderConfig, Config, builtin_config, builtin_configs};
pub use entities::EntityTable;
pub use error::DatasetError;
pub use fetcher::{HttpFetcher, LocalFetcher, ResourceFetcher};
pub use info::DatasetInfo;
pub use runner::{LoadedSplit, SplitStats, Summary, load, load_split};
pub use v1::V1Record;
pub use v2::{Answer, Context, V2Record};
pub use version::{Resource, ResourceKey, Split, Version};
