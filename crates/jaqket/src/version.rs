//! Dataset versions, splits and the remote resources behind them

use std::fmt;

use crate::error::DatasetError;

/// JAQKET dataset versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    /// AIO 1st competition: multiple choice over candidate entities
    V1,
    /// AIO 2nd competition: open-domain QA over retrieved passages
    V2,
}

/// Named input resource of a version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    Train,
    Valid,
    /// v1.0 only: entity title → text table (gzip at rest)
    CandidateEntities,
}

/// Remote resource: key plus download URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resource {
    pub key: ResourceKey,
    pub url: &'static str,
}

const V1_RESOURCES: &[Resource] = &[
    Resource {
        key: ResourceKey::Train,
        url: "https://jaqket.s3.ap-northeast-1.amazonaws.com/data/aio_01/train_questions.json",
    },
    Resource {
        key: ResourceKey::Valid,
        url: "https://jaqket.s3.ap-northeast-1.amazonaws.com/data/aio_01/dev1_questions.json",
    },
    Resource {
        key: ResourceKey::CandidateEntities,
        url: "https://jaqket.s3.ap-northeast-1.amazonaws.com/data/aio_01/candidate_entities.json.gz",
    },
];

const V2_RESOURCES: &[Resource] = &[
    Resource {
        key: ResourceKey::Train,
        url: "https://huggingface.co/datasets/kumapo/JAQKET/resolve/main/train_jaqket_59.350.json",
    },
    Resource {
        key: ResourceKey::Valid,
        url: "https://huggingface.co/datasets/kumapo/JAQKET/resolve/main/dev_jaqket_59.350.json",
    },
];

impl Version {
    /// Parse a config name (`"v1.0"` / `"v2.0"`, exact match)
    pub fn from_name(name: &str) -> Result<Self, DatasetError> {
        match name {
            "v1.0" => Ok(Self::V1),
            "v2.0" => Ok(Self::V2),
            _ => Err(DatasetError::InvalidConfig(name.to_string())),
        }
    }

    /// Config name
    pub fn name(&self) -> &'static str {
        match self {
            Self::V1 => "v1.0",
            Self::V2 => "v2.0",
        }
    }

    /// Remote resources this version is built from
    pub fn resources(&self) -> &'static [Resource] {
        match self {
            Self::V1 => V1_RESOURCES,
            Self::V2 => V2_RESOURCES,
        }
    }

    /// `num_contexts` declared by the built-in config of this version
    pub const fn nominal_num_contexts(&self) -> usize {
        5
    }

    /// `num_contexts` used when the config leaves it unset.
    ///
    /// v1: every question carries 20 candidates. v2: 100 is the largest k
    /// reported for acc@k by the AIO2 DPR baseline.
    pub const fn fallback_num_contexts(&self) -> usize {
        match self {
            Self::V1 => 20,
            Self::V2 => 100,
        }
    }

    /// List all versions
    pub fn all() -> &'static [Version] {
        &[Self::V1, Self::V2]
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl ResourceKey {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Valid => "valid",
            Self::CandidateEntities => "candidate_entities",
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Dataset partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
    Validation,
}

impl Split {
    /// Parse split name (`train`, `validation`; `valid`/`dev` accepted)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "train" => Some(Self::Train),
            "validation" | "valid" | "dev" => Some(Self::Validation),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Validation => "validation",
        }
    }

    /// Resource holding this split's quiz records
    pub fn records_key(&self) -> ResourceKey {
        match self {
            Self::Train => ResourceKey::Train,
            Self::Validation => ResourceKey::Valid,
        }
    }

    pub fn all() -> &'static [Split] {
        &[Self::Train, Self::Validation]
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
