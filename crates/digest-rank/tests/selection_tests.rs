use std::collections::HashMap;

use digest_core::types::{RankedIndex, Section};
use digest_rank::{PerDocumentCap, SelectionPolicy};

fn corpus(docs: &[&str]) -> Vec<Section> {
    docs.iter()
        .enumerate()
        .map(|(i, d)| Section { title: format!("S{i}"), text: String::new(), start_page: i + 1, source_document: d.to_string() })
        .collect()
}

fn ranked(order: &[usize]) -> Vec<RankedIndex> {
    let n = order.len() as f32;
    order.iter().enumerate().map(|(pos, &index)| RankedIndex { index, score: 1.0 - pos as f32 / n }).collect()
}

#[test]
fn default_caps_two_per_document_and_five_total() {
    let sections = corpus(&["a", "a", "a", "b", "b", "b", "c", "c", "d"]);
    let order = ranked(&[0, 1, 2, 3, 4, 5, 6, 7, 8]);

    let picked = PerDocumentCap::default().select(&order, &sections);

    let idx: Vec<usize> = picked.iter().map(|r| r.index).collect();
    assert_eq!(idx, vec![0, 1, 3, 4, 6]);
    let mut per_doc: HashMap<&str, usize> = HashMap::new();
    for r in &picked { *per_doc.entry(sections[r.index].source_document.as_str()).or_default() += 1; }
    assert!(per_doc.values().all(|&c| c <= 2));
    for pair in picked.windows(2) { assert!(pair[0].score >= pair[1].score); }
}

#[test]
fn small_corpus_returns_everything_it_can() {
    let sections = corpus(&["a", "a", "a"]);
    let picked = PerDocumentCap::default().select(&ranked(&[2, 0, 1]), &sections);
    let idx: Vec<usize> = picked.iter().map(|r| r.index).collect();
    assert_eq!(idx, vec![2, 0]);
}

#[test]
fn limits_are_parameters() {
    let sections = corpus(&["a", "b", "c", "a"]);
    let picked = PerDocumentCap::new(2, 1).select(&ranked(&[3, 0, 1, 2]), &sections);
    let idx: Vec<usize> = picked.iter().map(|r| r.index).collect();
    assert_eq!(idx, vec![3, 1]);
}
