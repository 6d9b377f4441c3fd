use jaqket::EntityTable;
use jaqket::v1::{self, V1Accumulator, V1Line};
use jaqket::v2::{self, V2Accumulator};
use jaqket_core::Accumulator;

const QUESTIONS: usize = 2_000;
const CANDIDATES: usize = 20;

fn entities() -> EntityTable {
    (0..QUESTIONS + CANDIDATES)
        .map(|i| (format!("エンティティ{i}"), format!("エンティティ{i}の説明文。").repeat(20)))
        .collect()
}

fn v1_lines() -> Vec<String> {
    (0..QUESTIONS)
        .map(|i| {
            let candidates: Vec<_> = (i..i + CANDIDATES)
                .map(|c| format!("\"エンティティ{c}\""))
                .collect();
            format!(
                r#"{{"qid": "QA{i:05}", "question": "これは__の問題{i}です", "answer_entity": "エンティティ{}", "answer_candidates": [{}]}}"#,
                i + i % CANDIDATES,
                candidates.join(", ")
            )
        })
        .collect()
}

fn v2_document() -> String {
    let entries: Vec<_> = (0..QUESTIONS)
        .map(|i| {
            let ctxs: Vec<_> = (0..100)
                .map(|c| {
                    format!(
                        r#"{{"id": "{c}", "title": "タイトル{c}", "text": "本文{i}-{c}", "score": "{c}.25", "has_answer": {}}}"#,
                        c == i % 100
                    )
                })
                .collect();
            format!(
                r#"{{"qid": "QB{i:05}", "question": "質問{i}", "answers": ["答え{i}"], "ctxs": [{}]}}"#,
                ctxs.join(", ")
            )
        })
        .collect();
    format!("[{}]", entries.join(","))
}

#[divan::bench]
fn parse_v1_line(bencher: divan::Bencher) {
    let lines = v1_lines();
    bencher.bench(|| {
        for line in &lines {
            let _: V1Line = sonic_rs::from_str(line).unwrap();
        }
    });
}

#[divan::bench(args = [5, 20])]
fn accumulator_v1(bencher: divan::Bencher, num_contexts: usize) {
    let lines = v1_lines();
    let table = entities();
    bencher.bench(|| {
        let mut acc = V1Accumulator::new();
        for line in &lines {
            let line: V1Line = sonic_rs::from_str(line).unwrap();
            if let Some(record) = v1::transform(line, &table, num_contexts).unwrap() {
                acc.push(record);
            }
        }
        acc.take_batch().unwrap()
    });
}

#[divan::bench]
fn parse_v2_document(bencher: divan::Bencher) {
    let doc = v2_document();
    let path = std::path::Path::new("bench.json");
    bencher.bench(|| v2::parse_document(&doc, path).unwrap());
}

#[divan::bench(args = [5, 100])]
fn accumulator_v2(bencher: divan::Bencher, num_contexts: usize) {
    let doc = v2_document();
    let path = std::path::Path::new("bench.json");
    bencher.bench(|| {
        let mut acc = V2Accumulator::new();
        for entry in v2::parse_document(&doc, path).unwrap() {
            if let Some(record) = v2::transform(entry, num_contexts) {
                acc.push(record);
            }
        }
        acc.take_batch().unwrap()
    });
}

fn main() {
    divan::main();
}
