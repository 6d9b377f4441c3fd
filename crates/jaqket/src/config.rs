//! Generation configuration and the built-in configs

use crate::error::DatasetError;
use crate::info::DATASET_VERSION;
use crate::version::Version;

/// Per-run parameters: which version to build and how many contexts to keep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Config name, `"v1.0"` or `"v2.0"`; validated lazily by [`Config::version`]
    pub name: String,
    /// Candidates (v1) / passages (v2) kept per question.
    /// `None` = the version's fallback (20 / 100).
    pub num_contexts: Option<usize>,
}

impl Config {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            num_contexts: None,
        }
    }

    pub fn with_num_contexts(mut self, num_contexts: Option<usize>) -> Self {
        self.num_contexts = num_contexts;
        self
    }

    /// Resolve the config name to a version
    pub fn version(&self) -> Result<Version, DatasetError> {
        Version::from_name(&self.name)
    }

    /// `num_contexts` to generate with
    pub fn effective_num_contexts(&self, version: Version) -> usize {
        self.num_contexts
            .unwrap_or_else(|| version.fallback_num_contexts())
    }
}

/// A config declared by the dataset itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuilderConfig {
    pub version: Version,
    pub description: &'static str,
    pub num_contexts: usize,
}

impl BuilderConfig {
    pub fn name(&self) -> &'static str {
        self.version.name()
    }

    pub fn dataset_version(&self) -> &'static str {
        DATASET_VERSION
    }

    pub fn to_config(&self) -> Config {
        Config::new(self.name()).with_num_contexts(Some(self.num_contexts))
    }
}

static BUILDER_CONFIGS: [BuilderConfig; 2] = [
    BuilderConfig {
        version: Version::V1,
        description: "v1.0",
        num_contexts: Version::V1.nominal_num_contexts(),
    },
    BuilderConfig {
        version: Version::V2,
        description: "v2.0",
        num_contexts: Version::V2.nominal_num_contexts(),
    },
];

/// The configs the dataset declares, in declaration order
pub fn builtin_configs() -> &'static [BuilderConfig] {
    &BUILDER_CONFIGS
}

/// Look up a built-in config by name
pub fn builtin_config(name: &str) -> Result<&'static BuilderConfig, DatasetError> {
    let version = Version::from_name(name)?;
    BUILDER_CONFIGS
        .iter()
        .find(|c| c.version == version)
        .ok_or_else(|| DatasetError::InvalidConfig(name.to_string()))
}
