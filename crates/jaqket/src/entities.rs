//! Candidate entity table (v1.0): entity title → descriptive text

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::error::DatasetError;

/// Initial capacity for the per-line read buffer
const LINE_BUF_CAPACITY: usize = 16 * 1024;

/// One line of `candidate_entities.json`
#[derive(Debug, Deserialize)]
struct EntityLine {
    title: String,
    text: String,
}

/// In-memory title → text lookup. Duplicate titles: last line wins.
#[derive(Debug, Default, Clone)]
pub struct EntityTable {
    entries: FxHashMap<String, String>,
}

impl EntityTable {
    /// Read a line-delimited `{"title", "text"}` file fully into memory.
    ///
    /// Any line that is not valid JSON or lacks either key aborts the load.
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let file = File::open(path).map_err(|e| DatasetError::io(path, e))?;
        let table = Self::from_reader(BufReader::new(file), path)?;
        log::debug!("Loaded {} entities from {}", table.len(), path.display());
        Ok(table)
    }

    /// Same as [`EntityTable::load`] over any buffered reader; `path` is only
    /// used in error messages.
    pub fn from_reader(mut reader: impl BufRead, path: &Path) -> Result<Self, DatasetError> {
        let mut entries = FxHashMap::default();
        let mut buf = String::with_capacity(LINE_BUF_CAPACITY);
        let mut line_no = 0usize;

        loop {
            buf.clear();
            if reader
                .read_line(&mut buf)
                .map_err(|e| DatasetError::io(path, e))?
                == 0
            {
                break;
            }
            line_no += 1;
            if buf.trim().is_empty() {
                continue;
            }
            let entity: EntityLine = sonic_rs::from_str(&buf)
                .map_err(|e| DatasetError::malformed(path, Some(line_no), e))?;
            entries.insert(entity.title, entity.text);
        }

        Ok(Self { entries })
    }

    /// Text of the entity titled `title`
    pub fn get(&self, title: &str) -> Option<&str> {
        self.entries.get(title).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Into<String>, U: Into<String>> FromIterator<(T, U)> for EntityTable {
    fn from_iter<I: IntoIterator<Item = (T, U)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(title, text)| (title.into(), text.into()))
                .collect(),
        }
    }
}
