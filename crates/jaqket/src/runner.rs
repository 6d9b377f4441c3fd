//! Load every split of a config into in-memory Arrow batches

use std::sync::Arc;
use std::time::{Duration, Instant};

use arrow::array::RecordBatch;
use arrow::datatypes::Schema;
use indicatif::ProgressBar;
use jaqket_core::{ProgressContext, accumulate, fmt_num};

use crate::builder::{Examples, SplitGenerator, generate_examples, split_generators};
use crate::config::Config;
use crate::error::DatasetError;
use crate::fetcher::ResourceFetcher;
use crate::info;
use crate::v1::V1Accumulator;
use crate::v2::V2Accumulator;
use crate::version::Split;

/// Statistics from loading one split
#[derive(Debug, Clone, Copy)]
pub struct SplitStats {
    pub split: Split,
    pub rows: usize,
    pub batches: usize,
    pub elapsed: Duration,
}

impl SplitStats {
    /// Log stats for non-TTY output
    pub fn log(&self) {
        log::info!(
            "{}: {} rows in {} batches in {:.1}s",
            self.split,
            fmt_num(self.rows),
            self.batches,
            self.elapsed.as_secs_f64()
        );
    }
}

/// One split materialized as Arrow record batches
#[derive(Debug, Clone)]
pub struct LoadedSplit {
    pub split: Split,
    pub schema: Arc<Schema>,
    pub batches: Vec<RecordBatch>,
    pub stats: SplitStats,
}

impl LoadedSplit {
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }
}

/// Result of [`load`]
#[derive(Debug)]
pub struct Summary {
    pub config: String,
    pub num_contexts: usize,
    pub splits: Vec<LoadedSplit>,
    pub elapsed: Duration,
}

impl Summary {
    pub fn total_rows(&self) -> usize {
        self.splits.iter().map(|s| s.stats.rows).sum()
    }

    pub fn split(&self, split: Split) -> Option<&LoadedSplit> {
        self.splits.iter().find(|s| s.split == split)
    }
}

/// Generate one split and collect its records into batches
pub fn load_split(
    config: &Config,
    generator: &SplitGenerator,
    pb: &ProgressBar,
) -> Result<LoadedSplit, DatasetError> {
    let start = Instant::now();
    let version = config.version()?;
    let mut batches = Vec::new();
    let push = |batch: RecordBatch| -> Result<(), DatasetError> {
        batches.push(batch);
        Ok(())
    };

    let stats = match generate_examples(config, &generator.inputs)? {
        Examples::V1(examples) => accumulate(
            examples.map(|r| r.map(|(_, record)| record)),
            &mut V1Accumulator::new(),
            push,
            pb,
        )?,
        Examples::V2(examples) => accumulate(
            examples.map(|r| r.map(|(_, record)| record)),
            &mut V2Accumulator::new(),
            push,
            pb,
        )?,
    };

    let stats = SplitStats {
        split: generator.split,
        rows: stats.rows,
        batches: stats.batches,
        elapsed: start.elapsed(),
    };
    stats.log();

    Ok(LoadedSplit {
        split: generator.split,
        schema: info::schema(version).clone(),
        batches,
        stats,
    })
}

/// Resolve resources, then load train and validation in order
pub fn load(
    config: &Config,
    fetcher: &dyn ResourceFetcher,
    progress: &ProgressContext,
) -> Result<Summary, DatasetError> {
    let start = Instant::now();
    let version = config.version()?;
    let num_contexts = config.effective_num_contexts(version);
    log::info!("Loading JAQKET {version} (num_contexts={num_contexts})");

    let generators = split_generators(config, fetcher)?;
    let mut splits = Vec::with_capacity(generators.len());
    for generator in &generators {
        let pb = progress.stage_line(generator.split.name());
        let loaded = load_split(config, generator, &pb);
        pb.finish_and_clear();
        splits.push(loaded?);
    }

    let summary = Summary {
        config: version.name().to_string(),
        num_contexts,
        splits,
        elapsed: start.elapsed(),
    };
    log::info!(
        "{}: {} rows total in {:.1}s",
        summary.config,
        fmt_num(summary.total_rows()),
        summary.elapsed.as_secs_f64()
    );
    Ok(summary)
}
