//! Load subcommand - download and generate every split of a config

use anyhow::{Context, Result};
use clap::Args;
use jaqket::HttpFetcher;
use jaqket_core::{SharedProgress, fmt_num};

use super::print_grid;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Config name (v1.0 or v2.0)
    pub name: String,

    /// Candidates (v1.0) or passages (v2.0) kept per question
    #[arg(short, long)]
    pub num_contexts: Option<usize>,
}

/// Dataset config from the CLI name, flag, then config file
pub fn dataset_config(name: &str, num_contexts: Option<usize>, config: &Config) -> jaqket::Config {
    jaqket::Config::new(name).with_num_contexts(num_contexts.or(config.dataset.num_contexts))
}

pub fn run(args: LoadArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let dataset = dataset_config(&args.name, args.num_contexts, config);
    let fetcher = HttpFetcher::new(&config.cache.dir, progress.clone());

    log::info!("Loading JAQKET {}", dataset.name);
    log::info!("  Cache: {}", config.cache.dir.display());

    jaqket_core::cleanup_tmp_files(&config.cache.dir)
        .with_context(|| format!("Failed to clean {}", config.cache.dir.display()))?;
    let summary = jaqket::load(&dataset, &fetcher, progress)
        .with_context(|| format!("Failed to load {}", dataset.name))?;

    let mut rows: Vec<Vec<String>> = summary
        .splits
        .iter()
        .map(|s| {
            vec![
                s.split.to_string(),
                fmt_num(s.stats.rows),
                s.stats.batches.to_string(),
                format!("{:.1}s", s.stats.elapsed.as_secs_f64()),
            ]
        })
        .collect();
    rows.push(vec![
        "total".to_string(),
        fmt_num(summary.total_rows()),
        summary
            .splits
            .iter()
            .map(|s| s.stats.batches)
            .sum::<usize>()
            .to_string(),
        format!("{:.1}s", summary.elapsed.as_secs_f64()),
    ]);

    let title = format!("{} (num_contexts={})", summary.config, summary.num_contexts);
    print_grid(&[title.as_str(), "Rows", "Batches", "Time"], rows);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_wins_over_config_file() {
        let mut config = Config::default();
        config.dataset.num_contexts = Some(5);
        assert_eq!(
            dataset_config("v1.0", Some(10), &config).num_contexts,
            Some(10)
        );
        assert_eq!(dataset_config("v1.0", None, &config).num_contexts, Some(5));
    }

    #[test]
    fn no_override_keeps_version_fallback() {
        let dataset = dataset_config("v2.0", None, &Config::default());
        assert!(dataset.num_contexts.is_none());
        let version = dataset.version().unwrap();
        assert_eq!(dataset.effective_num_contexts(version), 100);
    }
}
