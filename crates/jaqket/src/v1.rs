//! v1.0 records: multiple-choice quizzes over candidate entities
//!
//! Input is line-delimited JSON; each question lists its answer candidates by
//! entity title, and the candidate texts come from the [`EntityTable`].

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::*;
use arrow::datatypes::Schema;
use arrow::error::ArrowError;
use jaqket_core::{Accumulator, DEFAULT_BATCH_SIZE};
use serde::{Deserialize, Serialize};

use crate::entities::EntityTable;
use crate::error::DatasetError;
use crate::info;

/// Masks the answer span inside the quiz text
pub const ANSWER_PLACEHOLDER: char = '_';

/// Initial capacity for the per-line read buffer
const LINE_BUF_CAPACITY: usize = 4096;

/// One line of `train_questions.json` / `dev1_questions.json`
#[derive(Debug, Deserialize)]
pub struct V1Line {
    pub qid: String,
    pub question: String,
    pub answer_entity: String,
    pub answer_candidates: Vec<String>,
}

/// Output record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct V1Record {
    pub qid: String,
    pub question: String,
    pub answer_entity: String,
    /// Index of `answer_entity` in `answer_candidates`, as a string
    pub label: String,
    pub answer_candidates: Vec<String>,
    /// `contexts[i]` is the entity text of `answer_candidates[i]`
    pub contexts: Vec<String>,
}

/// Filter and reshape one parsed line.
///
/// `Ok(None)` when the record is skipped: fewer than `num_contexts`
/// candidates, or the answer is not among the first `num_contexts`.
pub fn transform(
    line: V1Line,
    entities: &EntityTable,
    num_contexts: usize,
) -> Result<Option<V1Record>, DatasetError> {
    let mut candidates = line.answer_candidates;
    candidates.truncate(num_contexts);

    let Some(label) = candidates.iter().position(|c| *c == line.answer_entity) else {
        return Ok(None);
    };
    if candidates.len() != num_contexts {
        return Ok(None);
    }

    let contexts = candidates
        .iter()
        .map(|title| {
            entities
                .get(title)
                .map(str::to_string)
                .ok_or_else(|| DatasetError::UnknownEntity {
                    qid: line.qid.clone(),
                    title: title.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(V1Record {
        question: line.question.replace(ANSWER_PLACEHOLDER, ""),
        qid: line.qid,
        answer_entity: line.answer_entity,
        label: label.to_string(),
        answer_candidates: candidates,
        contexts,
    }))
}

/// Lazy `(qid, record)` producer over one records file.
///
/// Owns the file handle and the entity table; both are released when the
/// iterator is dropped. After the first error it yields nothing more.
pub struct V1Examples {
    path: PathBuf,
    reader: BufReader<File>,
    entities: EntityTable,
    num_contexts: usize,
    buf: String,
    line_no: usize,
    done: bool,
}

impl std::fmt::Debug for V1Examples {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("V1Examples")
            .field("path", &self.path)
            .field("entities", &self.entities.len())
            .field("num_contexts", &self.num_contexts)
            .field("line_no", &self.line_no)
            .finish_non_exhaustive()
    }
}

impl V1Examples {
    pub fn open(
        path: &Path,
        entities: EntityTable,
        num_contexts: usize,
    ) -> Result<Self, DatasetError> {
        let file = File::open(path).map_err(|e| DatasetError::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
            entities,
            num_contexts,
            buf: String::with_capacity(LINE_BUF_CAPACITY),
            line_no: 0,
            done: false,
        })
    }

    fn fail(&mut self, err: DatasetError) -> Option<<Self as Iterator>::Item> {
        self.done = true;
        Some(Err(err))
    }
}

impl Iterator for V1Examples {
    type Item = Result<(String, V1Record), DatasetError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(_) => self.line_no += 1,
                Err(e) => {
                    let err = DatasetError::io(&self.path, e);
                    return self.fail(err);
                }
            }
            if self.buf.trim().is_empty() {
                continue;
            }

            let line = match sonic_rs::from_str::<V1Line>(&self.buf) {
                Ok(line) => line,
                Err(e) => {
                    let err = DatasetError::malformed(&self.path, Some(self.line_no), e);
                    return self.fail(err);
                }
            };
            match transform(line, &self.entities, self.num_contexts) {
                Ok(Some(record)) => return Some(Ok((record.qid.clone(), record))),
                Ok(None) => continue,
                Err(e) => return self.fail(e),
            }
        }
        None
    }
}

impl FusedIterator for V1Examples {}

// === Accumulator ===

/// Collects [`V1Record`]s into Arrow batches of the v1.0 schema
pub struct V1Accumulator {
    schema: Arc<Schema>,
    qid: Vec<String>,
    question: Vec<String>,
    answer_entity: Vec<String>,
    label: Vec<String>,
    answer_candidates: Vec<Vec<String>>,
    contexts: Vec<Vec<String>>,
}

impl V1Accumulator {
    pub fn new() -> Self {
        Self {
            schema: info::V1.clone(),
            qid: Vec::with_capacity(DEFAULT_BATCH_SIZE),
            question: Vec::with_capacity(DEFAULT_BATCH_SIZE),
            answer_entity: Vec::with_capacity(DEFAULT_BATCH_SIZE),
            label: Vec::with_capacity(DEFAULT_BATCH_SIZE),
            answer_candidates: Vec::with_capacity(DEFAULT_BATCH_SIZE),
            contexts: Vec::with_capacity(DEFAULT_BATCH_SIZE),
        }
    }
}

impl Default for V1Accumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Accumulator for V1Accumulator {
    type Row = V1Record;

    fn push(&mut self, row: V1Record) {
        self.qid.push(row.qid);
        self.question.push(row.question);
        self.answer_entity.push(row.answer_entity);
        self.label.push(row.label);
        self.answer_candidates.push(row.answer_candidates);
        self.contexts.push(row.contexts);
    }

    fn len(&self) -> usize {
        self.qid.len()
    }

    fn take_batch(&mut self) -> Result<RecordBatch, ArrowError> {
        let arrays: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(std::mem::take(&mut self.qid))),
            Arc::new(StringArray::from(std::mem::take(&mut self.question))),
            Arc::new(StringArray::from(std::mem::take(&mut self.answer_entity))),
            Arc::new(StringArray::from(std::mem::take(&mut self.label))),
            build_list_string_array(std::mem::take(&mut self.answer_candidates)),
            build_list_string_array(std::mem::take(&mut self.contexts)),
        ];
        RecordBatch::try_new(self.schema.clone(), arrays)
    }
}

/// Build List<Utf8> array from Vec<Vec<String>>
fn build_list_string_array(data: Vec<Vec<String>>) -> ArrayRef {
    let mut builder = ListBuilder::new(StringBuilder::new());
    for items in &data {
        for item in items {
            builder.values().append_value(item);
        }
        builder.append(true);
    }
    Arc::new(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> EntityTable {
        [("Tokyo", "Capital of Japan."), ("Osaka", "A city.")]
            .into_iter()
            .collect()
    }

    fn line(json: &str) -> V1Line {
        sonic_rs::from_str(json).unwrap()
    }

    #[test]
    fn transform_keeps_matching_record() {
        let input = line(
            r#"{"qid": "q1", "question": "What is _ ?", "answer_entity": "Tokyo",
                "answer_candidates": ["Osaka", "Tokyo"]}"#,
        );
        let record = transform(input, &table(), 2).unwrap().unwrap();
        assert_eq!(
            record,
            V1Record {
                qid: "q1".into(),
                question: "What is  ?".into(),
                answer_entity: "Tokyo".into(),
                label: "1".into(),
                answer_candidates: vec!["Osaka".into(), "Tokyo".into()],
                contexts: vec!["A city.".into(), "Capital of Japan.".into()],
            }
        );
    }

    #[test]
    fn transform_removes_every_placeholder() {
        let input = line(
            r#"{"qid": "q", "question": "__は_です", "answer_entity": "Tokyo",
                "answer_candidates": ["Tokyo"]}"#,
        );
        let record = transform(input, &table(), 1).unwrap().unwrap();
        assert_eq!(record.question, "はです");
    }

    #[test]
    fn transform_drops_short_candidate_list() {
        let input = line(
            r#"{"qid": "q1", "question": "Q", "answer_entity": "Osaka",
                "answer_candidates": ["Osaka"]}"#,
        );
        assert!(transform(input, &table(), 2).unwrap().is_none());
    }

    #[test]
    fn transform_drops_answer_outside_truncation() {
        let input = line(
            r#"{"qid": "q1", "question": "Q", "answer_entity": "Tokyo",
                "answer_candidates": ["Osaka", "Kyoto", "Tokyo"]}"#,
        );
        assert!(transform(input, &table(), 2).unwrap().is_none());
    }

    #[test]
    fn transform_truncates_before_lookup() {
        // "Nagoya" is past the cut, so its absence from the table is harmless
        let input = line(
            r#"{"qid": "q1", "question": "Q", "answer_entity": "Osaka",
                "answer_candidates": ["Osaka", "Tokyo", "Nagoya"]}"#,
        );
        let record = transform(input, &table(), 2).unwrap().unwrap();
        assert_eq!(record.label, "0");
        assert_eq!(record.answer_candidates, ["Osaka", "Tokyo"]);
    }

    #[test]
    fn transform_label_uses_first_occurrence() {
        let input = line(
            r#"{"qid": "q1", "question": "Q", "answer_entity": "Tokyo",
                "answer_candidates": ["Osaka", "Tokyo", "Tokyo"]}"#,
        );
        let record = transform(input, &table(), 3).unwrap().unwrap();
        assert_eq!(record.label, "1");
    }

    #[test]
    fn transform_unknown_entity_is_fatal() {
        let input = line(
            r#"{"qid": "q9", "question": "Q", "answer_entity": "Tokyo",
                "answer_candidates": ["Tokyo", "Kyoto"]}"#,
        );
        let err = transform(input, &table(), 2).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::UnknownEntity { ref qid, ref title } if qid == "q9" && title == "Kyoto"
        ));
    }

    #[test]
    fn line_requires_fields() {
        let res: Result<V1Line, _> =
            sonic_rs::from_str(r#"{"qid": "q1", "question": "Q", "answer_entity": "A"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn accumulator_batch() {
        let mut acc = V1Accumulator::new();
        let input = line(
            r#"{"qid": "q1", "question": "Q", "answer_entity": "Tokyo",
                "answer_candidates": ["Osaka", "Tokyo"]}"#,
        );
        acc.push(transform(input, &table(), 2).unwrap().unwrap());
        assert_eq!(acc.len(), 1);

        let batch = acc.take_batch().unwrap();
        assert_eq!(batch.num_rows(), 1);
        assert_eq!(batch.schema(), *info::V1);
        assert_eq!(acc.len(), 0);

        let contexts = batch
            .column_by_name("contexts")
            .unwrap()
            .as_any()
            .downcast_ref::<ListArray>()
            .unwrap();
        let first = contexts.value(0);
        let texts = first.as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(texts.value(1), "Capital of Japan.");
    }
}
