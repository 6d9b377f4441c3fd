//! Version dispatch: dataset info, split resolution and example generation

use std::iter::FusedIterator;
use std::path::PathBuf;

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::config::Config;
use crate::entities::EntityTable;
use crate::error::DatasetError;
use crate::fetcher::ResourceFetcher;
use crate::info::{DatasetInfo, dataset_info};
use crate::v1::{V1Examples, V1Record};
use crate::v2::{V2Examples, V2Record};
use crate::version::{ResourceKey, Split, Version};

/// Local inputs of one split. Paths are optional so a caller can hand over
/// whatever it resolved; generation checks what the version requires.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitInputs {
    /// Quiz records (`train` / `valid` resource)
    pub records: Option<PathBuf>,
    /// Entity table, v1.0 only
    pub entities: Option<PathBuf>,
}

/// A split and the inputs to generate it from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitGenerator {
    pub split: Split,
    pub inputs: SplitInputs,
}

/// One generated record of either version
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Example {
    V1(V1Record),
    V2(V2Record),
}

impl Example {
    pub fn qid(&self) -> &str {
        match self {
            Self::V1(r) => &r.qid,
            Self::V2(r) => &r.qid,
        }
    }
}

/// Lazy `(qid, example)` producer returned by [`generate_examples`]
#[derive(Debug)]
pub enum Examples {
    V1(V1Examples),
    V2(V2Examples),
}

impl Iterator for Examples {
    type Item = Result<(String, Example), DatasetError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::V1(it) => it.next().map(|r| r.map(|(k, v)| (k, Example::V1(v)))),
            Self::V2(it) => it.next().map(|r| r.map(|(k, v)| (k, Example::V2(v)))),
        }
    }
}

impl FusedIterator for Examples {}

/// Metadata and schema of the configured version
pub fn info(config: &Config) -> Result<DatasetInfo, DatasetError> {
    Ok(dataset_info(config.version()?))
}

/// Fetch the configured version's resources and lay out train/validation
pub fn split_generators(
    config: &Config,
    fetcher: &dyn ResourceFetcher,
) -> Result<Vec<SplitGenerator>, DatasetError> {
    let version = config.version()?;

    let mut paths = FxHashMap::default();
    for resource in version.resources() {
        let path = fetcher.fetch(resource.key, resource.url)?;
        paths.insert(resource.key, path);
    }

    let entities = match version {
        Version::V1 => paths.get(&ResourceKey::CandidateEntities).cloned(),
        Version::V2 => None,
    };
    Ok(Split::all()
        .iter()
        .map(|&split| SplitGenerator {
            split,
            inputs: SplitInputs {
                records: paths.get(&split.records_key()).cloned(),
                entities: entities.clone(),
            },
        })
        .collect())
}

/// Open the record producer for one split.
///
/// v1.0 reads the whole entity table before returning; v2.0 parses the whole
/// records document. Records themselves are transformed on demand.
pub fn generate_examples(config: &Config, inputs: &SplitInputs) -> Result<Examples, DatasetError> {
    let version = config.version()?;
    let num_contexts = config.effective_num_contexts(version);

    let records = inputs
        .records
        .as_deref()
        .ok_or(DatasetError::MissingArgument {
            config: version.name(),
            argument: "file_path",
        })?;

    match version {
        Version::V1 => {
            let entities = inputs
                .entities
                .as_deref()
                .ok_or(DatasetError::MissingArgument {
                    config: version.name(),
                    argument: "entities_file_path",
                })?;
            let table = EntityTable::load(entities)?;
            Ok(Examples::V1(V1Examples::open(records, table, num_contexts)?))
        }
        Version::V2 => Ok(Examples::V2(V2Examples::open(records, num_contexts)?)),
    }
}
