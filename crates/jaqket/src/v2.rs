//! v2.0 records: open-domain questions with retrieved passages
//!
//! Input is one JSON array; each element carries the gold answer strings and
//! the retriever's ranked passages, each flagged with `has_answer`.

use std::iter::FusedIterator;
use std::path::Path;
use std::sync::Arc;

use arrow::array::*;
use arrow::buffer::OffsetBuffer;
use arrow::datatypes::Schema;
use arrow::error::ArrowError;
use jaqket_core::{Accumulator, DEFAULT_BATCH_SIZE};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DatasetError;
use crate::info;

/// `answer_start` of every answer: offsets are not located
pub const ANSWER_START_UNKNOWN: i32 = -1;

// === Input ===

/// One element of `train_jaqket_59.350.json` / `dev_jaqket_59.350.json`
#[derive(Debug, Deserialize)]
pub struct V2Entry {
    pub qid: String,
    pub question: String,
    pub answers: Vec<String>,
    pub ctxs: Vec<RawContext>,
}

/// Retrieved passage as found in the input
#[derive(Debug, Deserialize)]
pub struct RawContext {
    #[serde(deserialize_with = "string_or_integer")]
    pub id: String,
    pub title: String,
    pub text: String,
    pub score: Score,
    pub has_answer: bool,
}

/// Retriever score, accepted as a JSON number or a numeric string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score(pub f64);

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScoreVisitor;

        impl serde::de::Visitor<'_> for ScoreVisitor {
            type Value = Score;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "a number or numeric string")
            }

            fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Score, E> {
                Ok(Score(v))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Score, E> {
                Ok(Score(v as f64))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Score, E> {
                Ok(Score(v as f64))
            }

            fn visit_str<E: serde::de::Error>(self, s: &str) -> Result<Score, E> {
                s.trim()
                    .parse::<f64>()
                    .map(Score)
                    .map_err(|_| E::invalid_value(serde::de::Unexpected::Str(s), &self))
            }
        }

        deserializer.deserialize_any(ScoreVisitor)
    }
}

/// Passage ids are strings in the released files; integer ids are normalized.
fn string_or_integer<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct IdVisitor;

    impl serde::de::Visitor<'_> for IdVisitor {
        type Value = String;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a string or integer id")
        }

        fn visit_str<E: serde::de::Error>(self, s: &str) -> Result<String, E> {
            Ok(s.to_string())
        }

        fn visit_string<E: serde::de::Error>(self, s: String) -> Result<String, E> {
            Ok(s)
        }

        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

// === Output ===

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub text: String,
    pub answer_start: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Context {
    pub id: String,
    pub title: String,
    pub text: String,
    pub score: f32,
    pub has_answer: bool,
}

/// Output record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct V2Record {
    pub qid: String,
    pub question: String,
    pub answers: Vec<Answer>,
    /// First `num_contexts` passages, at least one with `has_answer`
    pub ctxs: Vec<Context>,
}

/// Filter and reshape one entry; `None` when no kept passage has the answer.
pub fn transform(entry: V2Entry, num_contexts: usize) -> Option<V2Record> {
    let mut ctxs = entry.ctxs;
    ctxs.truncate(num_contexts);
    if !ctxs.iter().any(|c| c.has_answer) {
        return None;
    }

    let answers = entry
        .answers
        .into_iter()
        .map(|text| Answer {
            text,
            answer_start: ANSWER_START_UNKNOWN,
        })
        .collect();

    let ctxs = ctxs
        .into_iter()
        .map(|c| Context {
            id: c.id,
            title: c.title,
            text: c.text,
            score: c.score.0 as f32,
            has_answer: c.has_answer,
        })
        .collect();

    Some(V2Record {
        qid: entry.qid,
        question: entry.question,
        answers,
        ctxs,
    })
}

/// Parse a whole v2 document (a JSON array of entries)
pub fn parse_document(content: &str, path: &Path) -> Result<Vec<V2Entry>, DatasetError> {
    sonic_rs::from_str(content).map_err(|e| DatasetError::malformed(path, None, e))
}

/// Lazy `(qid, record)` producer over one parsed records file.
///
/// The document is read and parsed when the iterator is opened; the file is
/// closed before the first record is yielded.
#[derive(Debug)]
pub struct V2Examples {
    entries: std::vec::IntoIter<V2Entry>,
    num_contexts: usize,
}

impl V2Examples {
    pub fn open(path: &Path, num_contexts: usize) -> Result<Self, DatasetError> {
        let content = std::fs::read_to_string(path).map_err(|e| DatasetError::io(path, e))?;
        let entries = parse_document(&content, path)?;
        log::debug!("Parsed {} entries from {}", entries.len(), path.display());
        Ok(Self::from_entries(entries, num_contexts))
    }

    pub fn from_entries(entries: Vec<V2Entry>, num_contexts: usize) -> Self {
        Self {
            entries: entries.into_iter(),
            num_contexts,
        }
    }
}

impl Iterator for V2Examples {
    type Item = Result<(String, V2Record), DatasetError>;

    fn next(&mut self) -> Option<Self::Item> {
        let num_contexts = self.num_contexts;
        self.entries
            .by_ref()
            .find_map(|entry| transform(entry, num_contexts))
            .map(|record| Ok((record.qid.clone(), record)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.entries.size_hint().1)
    }
}

impl FusedIterator for V2Examples {}

// === Accumulator ===

/// Collects [`V2Record`]s into Arrow batches of the v2.0 schema
pub struct V2Accumulator {
    schema: Arc<Schema>,
    qid: Vec<String>,
    question: Vec<String>,
    answers: Vec<Vec<Answer>>,
    ctxs: Vec<Vec<Context>>,
}

impl V2Accumulator {
    pub fn new() -> Self {
        Self {
            schema: info::V2.clone(),
            qid: Vec::with_capacity(DEFAULT_BATCH_SIZE),
            question: Vec::with_capacity(DEFAULT_BATCH_SIZE),
            answers: Vec::with_capacity(DEFAULT_BATCH_SIZE),
            ctxs: Vec::with_capacity(DEFAULT_BATCH_SIZE),
        }
    }
}

impl Default for V2Accumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Accumulator for V2Accumulator {
    type Row = V2Record;

    fn push(&mut self, row: V2Record) {
        self.qid.push(row.qid);
        self.question.push(row.question);
        self.answers.push(row.answers);
        self.ctxs.push(row.ctxs);
    }

    fn len(&self) -> usize {
        self.qid.len()
    }

    fn take_batch(&mut self) -> Result<RecordBatch, ArrowError> {
        let arrays: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(std::mem::take(&mut self.qid))),
            Arc::new(StringArray::from(std::mem::take(&mut self.question))),
            build_answers_array(std::mem::take(&mut self.answers))?,
            build_ctxs_array(std::mem::take(&mut self.ctxs))?,
        ];
        RecordBatch::try_new(self.schema.clone(), arrays)
    }
}

/// Build List<Struct{text, answer_start}> from per-row answer lists
fn build_answers_array(rows: Vec<Vec<Answer>>) -> Result<ArrayRef, ArrowError> {
    let offsets = OffsetBuffer::<i32>::from_lengths(rows.iter().map(Vec::len));
    let mut text = Vec::new();
    let mut answer_start = Vec::new();
    for answer in rows.into_iter().flatten() {
        text.push(answer.text);
        answer_start.push(answer.answer_start);
    }

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(text)),
        Arc::new(Int32Array::from(answer_start)),
    ];
    let values = StructArray::try_new(info::answer_fields(), columns, None)?;
    let list = ListArray::try_new(info::answers_item(), offsets, Arc::new(values), None)?;
    Ok(Arc::new(list))
}

/// Build List<Struct{id, title, text, score, has_answer}> from per-row passages
fn build_ctxs_array(rows: Vec<Vec<Context>>) -> Result<ArrayRef, ArrowError> {
    let offsets = OffsetBuffer::<i32>::from_lengths(rows.iter().map(Vec::len));
    let total: usize = rows.iter().map(Vec::len).sum();
    let mut id = Vec::with_capacity(total);
    let mut title = Vec::with_capacity(total);
    let mut text = Vec::with_capacity(total);
    let mut score = Vec::with_capacity(total);
    let mut has_answer = Vec::with_capacity(total);
    for ctx in rows.into_iter().flatten() {
        id.push(ctx.id);
        title.push(ctx.title);
        text.push(ctx.text);
        score.push(ctx.score);
        has_answer.push(ctx.has_answer);
    }

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(id)),
        Arc::new(StringArray::from(title)),
        Arc::new(StringArray::from(text)),
        Arc::new(Float32Array::from(score)),
        Arc::new(BooleanArray::from(has_answer)),
    ];
    let values = StructArray::try_new(info::context_fields(), columns, None)?;
    let list = ListArray::try_new(info::ctxs_item(), offsets, Arc::new(values), None)?;
    Ok(Arc::new(list))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_ENTRY: &str = r#"{
        "qid": "q2",
        "question": "Q?",
        "answers": ["A"],
        "ctxs": [
            {"id": "c1", "title": "T", "text": "X", "score": 0.5, "has_answer": true}
        ]
    }"#;

    fn entry(json: &str) -> V2Entry {
        sonic_rs::from_str(json).unwrap()
    }

    fn ctx(id: &str, has_answer: bool) -> String {
        format!(
            r#"{{"id": "{id}", "title": "t{id}", "text": "x{id}", "score": 1.0, "has_answer": {has_answer}}}"#
        )
    }

    fn entry_with(flags: &[bool]) -> V2Entry {
        let ctxs: Vec<String> = flags
            .iter()
            .enumerate()
            .map(|(i, f)| ctx(&i.to_string(), *f))
            .collect();
        entry(&format!(
            r#"{{"qid": "q", "question": "Q", "answers": ["a", "b"], "ctxs": [{}]}}"#,
            ctxs.join(",")
        ))
    }

    #[test]
    fn transform_keeps_record_with_answer() {
        let record = transform(entry(SAMPLE_ENTRY), 1).unwrap();
        assert_eq!(
            record,
            V2Record {
                qid: "q2".into(),
                question: "Q?".into(),
                answers: vec![Answer {
                    text: "A".into(),
                    answer_start: -1
                }],
                ctxs: vec![Context {
                    id: "c1".into(),
                    title: "T".into(),
                    text: "X".into(),
                    score: 0.5,
                    has_answer: true
                }],
            }
        );
    }

    #[test]
    fn transform_drops_record_without_answer() {
        let json = SAMPLE_ENTRY.replace("\"has_answer\": true", "\"has_answer\": false");
        assert!(transform(entry(&json), 1).is_none());
    }

    #[test]
    fn transform_only_looks_at_kept_contexts() {
        assert!(transform(entry_with(&[false, false, true]), 2).is_none());
        let record = transform(entry_with(&[false, false, true]), 3).unwrap();
        assert_eq!(record.ctxs.len(), 3);
    }

    #[test]
    fn transform_truncates_contexts() {
        let record = transform(entry_with(&[true, false, false, true]), 2).unwrap();
        let ids: Vec<_> = record.ctxs.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["0", "1"]);
    }

    #[test]
    fn transform_every_answer_start_is_unknown() {
        let record = transform(entry_with(&[true]), 5).unwrap();
        assert_eq!(record.answers.len(), 2);
        assert!(record.answers.iter().all(|a| a.answer_start == -1));
    }

    #[test]
    fn parse_document_coerces_ids_and_scores() {
        let json = r#"[{"qid": "q", "question": "Q", "answers": [], "ctxs": [
            {"id": 12, "title": "t", "text": "x", "score": 81, "has_answer": true},
            {"id": "8", "title": "t", "text": "x", "score": "80.25", "has_answer": false},
            {"id": "9", "title": "t", "text": "x", "score": -3, "has_answer": false}
        ]}]"#;
        let mut entries = parse_document(json, Path::new("dev.json")).unwrap();
        let record = transform(entries.remove(0), 10).unwrap();
        assert_eq!(record.ctxs[0].id, "12");
        assert_eq!(record.ctxs[0].score, 81.0);
        assert_eq!(record.ctxs[1].score, 80.25);
        assert_eq!(record.ctxs[2].score, -3.0);
    }

    #[test]
    fn parse_document_rejects_non_numeric_score() {
        let json = format!("[{}]", SAMPLE_ENTRY.replace("0.5", "\"high\""));
        let err = parse_document(&json, Path::new("dev.json")).unwrap_err();
        assert!(matches!(err, DatasetError::Malformed { line: None, .. }));
    }

    #[test]
    fn parse_document_rejects_missing_field() {
        let json = r#"[{"qid": "q", "question": "Q", "answers": []}]"#;
        assert!(parse_document(json, Path::new("dev.json")).is_err());
    }

    #[test]
    fn parse_document_requires_array() {
        let path = Path::new("dev.json");
        assert!(parse_document("[]", path).unwrap().is_empty());
        let err = parse_document(SAMPLE_ENTRY, path).unwrap_err();
        assert!(matches!(err, DatasetError::Malformed { line: None, .. }));
    }

    #[test]
    fn examples_preserve_order_and_skip() {
        let entries = vec![entry_with(&[true]), entry_with(&[false]), entry(SAMPLE_ENTRY)];
        let keys: Vec<String> = V2Examples::from_entries(entries, 1)
            .map(|r| r.unwrap().0)
            .collect();
        assert_eq!(keys, ["q", "q2"]);
    }

    #[test]
    fn accumulator_batch() {
        let mut acc = V2Accumulator::new();
        acc.push(transform(entry(SAMPLE_ENTRY), 1).unwrap());
        acc.push(transform(entry_with(&[true, false]), 5).unwrap());
        assert_eq!(acc.len(), 2);

        let batch = acc.take_batch().unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.schema(), *info::V2);
        assert!(acc.is_empty());

        let ctxs = batch
            .column_by_name("ctxs")
            .unwrap()
            .as_any()
            .downcast_ref::<ListArray>()
            .unwrap();
        assert_eq!(ctxs.value_length(0), 1);
        assert_eq!(ctxs.value_length(1), 2);
        let second = ctxs.value(1);
        let second = second.as_any().downcast_ref::<StructArray>().unwrap();
        let flags = second
            .column_by_name("has_answer")
            .unwrap()
            .as_any()
            .downcast_ref::<BooleanArray>()
            .unwrap();
        assert!(flags.value(0));
        assert!(!flags.value(1));
    }

    #[test]
    fn accumulator_empty_answers() {
        let json = SAMPLE_ENTRY.replace("[\"A\"]", "[]");
        let mut acc = V2Accumulator::new();
        acc.push(transform(entry(&json), 1).unwrap());
        let batch = acc.take_batch().unwrap();
        let answers = batch
            .column_by_name("answers")
            .unwrap()
            .as_any()
            .downcast_ref::<ListArray>()
            .unwrap();
        assert_eq!(answers.value_length(0), 0);
    }
}
