//! Preview subcommand - print the first records of one split

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use jaqket::{HttpFetcher, Split};
use jaqket_core::SharedProgress;

use super::load::dataset_config;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Config name (v1.0 or v2.0)
    pub name: String,

    /// Split to read (train or validation)
    #[arg(short, long, default_value = "train", value_parser = parse_split)]
    pub split: Split,

    /// Number of records to print
    #[arg(short = 'n', long, default_value_t = 3)]
    pub count: usize,

    /// Candidates (v1.0) or passages (v2.0) kept per question
    #[arg(long)]
    pub num_contexts: Option<usize>,
}

fn parse_split(s: &str) -> Result<Split, String> {
    Split::from_name(s).ok_or_else(|| format!("unknown split '{s}' (train, validation)"))
}

pub fn run(args: PreviewArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let dataset = dataset_config(&args.name, args.num_contexts, config);
    let fetcher = HttpFetcher::new(&config.cache.dir, progress.clone());

    let generator = jaqket::split_generators(&dataset, &fetcher)?
        .into_iter()
        .find(|g| g.split == args.split)
        .with_context(|| format!("{} has no {} split", dataset.name, args.split))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for example in jaqket::generate_examples(&dataset, &generator.inputs)?.take(args.count) {
        let (_, record) = example?;
        serde_json::to_writer_pretty(&mut out, &record)?;
        writeln!(out)?;
    }
    Ok(())
}
