//! Dataset metadata and Arrow schemas per version

use std::sync::{Arc, LazyLock};

use arrow::datatypes::{DataType, Field, FieldRef, Fields, Schema};

use crate::version::Version;

/// Version of the dataset builder
pub const DATASET_VERSION: &str = "0.3.0";

pub const DESCRIPTION: &str = "JAQKET: JApanese Questions on Knowledge of EnTitie\n";

pub const CITATION: &str = r#"
@InProceedings{Kurihara_nlp2020,
  author =  "鈴木正敏 and 鈴木潤 and 松田耕史 and ⻄田京介 and 井之上直也",
  title =   "JAQKET: クイズを題材にした日本語 QA データセットの構築",
  booktitle =   "言語処理学会第26回年次大会",
  year =    "2020",
  url = "https://www.anlp.jp/proceedings/annual_meeting/2020/pdf_dir/P2-24.pdf",
  note= "in Japanese"
}
"#;

pub const HOMEPAGE: &str = "https://sites.google.com/view/project-aio/dataset";

pub const LICENSE: &str = "This work is licensed under a Creative Commons Attribution-ShareAlike 4.0 International License.\n";

/// Static description of one dataset version
#[derive(Debug, Clone)]
pub struct DatasetInfo {
    pub version: Version,
    pub description: &'static str,
    pub citation: &'static str,
    pub homepage: &'static str,
    pub license: &'static str,
    pub dataset_version: &'static str,
    pub schema: Arc<Schema>,
}

/// Metadata and schema for `version`
pub fn dataset_info(version: Version) -> DatasetInfo {
    DatasetInfo {
        version,
        description: DESCRIPTION,
        citation: CITATION,
        homepage: HOMEPAGE,
        license: LICENSE,
        dataset_version: DATASET_VERSION,
        schema: schema(version).clone(),
    }
}

/// Arrow schema of the records `version` produces
pub fn schema(version: Version) -> &'static Arc<Schema> {
    match version {
        Version::V1 => &V1,
        Version::V2 => &V2,
    }
}

/// v1.0: multiple-choice records with resolved entity texts
pub static V1: LazyLock<Arc<Schema>> = LazyLock::new(|| {
    Arc::new(Schema::new(vec![
        Field::new("qid", DataType::Utf8, false),
        Field::new("question", DataType::Utf8, false),
        Field::new("answer_entity", DataType::Utf8, false),
        Field::new("label", DataType::Utf8, false),
        Field::new("answer_candidates", list_utf8(), false),
        Field::new("contexts", list_utf8(), false),
    ]))
});

/// v2.0: open-domain records with retrieved passages
pub static V2: LazyLock<Arc<Schema>> = LazyLock::new(|| {
    Arc::new(Schema::new(vec![
        Field::new("qid", DataType::Utf8, false),
        Field::new("question", DataType::Utf8, false),
        Field::new("answers", DataType::List(answers_item()), false),
        Field::new("ctxs", DataType::List(ctxs_item()), false),
    ]))
});

/// Helper: create List<Utf8> type (matches `ListBuilder<StringBuilder>`)
fn list_utf8() -> DataType {
    DataType::List(Arc::new(Field::new("item", DataType::Utf8, true)))
}

/// Struct fields of one `answers` entry
pub fn answer_fields() -> Fields {
    Fields::from(vec![
        Field::new("text", DataType::Utf8, false),
        Field::new("answer_start", DataType::Int32, false),
    ])
}

/// Struct fields of one `ctxs` entry
pub fn context_fields() -> Fields {
    Fields::from(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("title", DataType::Utf8, false),
        Field::new("text", DataType::Utf8, false),
        Field::new("score", DataType::Float32, false),
        Field::new("has_answer", DataType::Boolean, false),
    ])
}

/// List item field of the `answers` column
pub fn answers_item() -> FieldRef {
    Arc::new(Field::new("item", DataType::Struct(answer_fields()), true))
}

/// List item field of the `ctxs` column
pub fn ctxs_item() -> FieldRef {
    Arc::new(Field::new("item", DataType::Struct(context_fields()), true))
}
