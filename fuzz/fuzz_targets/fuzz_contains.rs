#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use std::collections::BTreeSet;
use sxi::index::SuffixArray;
use sxi::query::{BaselineIndex, StringQuery};

#[derive(Arbitrary, Debug)]
struct Input {
    records: Vec<Vec<String>>,
    pattern: String,
}

fuzz_target!(|input: Input| {
    // Suffix array answers must equal a brute-force scan, value for value
    let records: Vec<(usize, Vec<String>)> = input.records.into_iter().enumerate().collect();
    let Ok(index) = SuffixArray::build(records.iter().map(|(id, s)| (*id, s.iter().map(String::as_str)))) else {
        return;
    };
    // Empty strings contribute no suffixes, so the empty pattern cannot reach them
    let baseline = BaselineIndex::new(records.iter().map(|(id, strings)| {
        (*id, strings.iter().filter(|s| !s.is_empty()).cloned().collect::<Vec<_>>())
    }));

    let query = StringQuery::contains(input.pattern.as_str());
    let actual: BTreeSet<usize> = index.contains(&input.pattern).copied().collect();
    let expected: BTreeSet<usize> = baseline.matching(&query).copied().collect();
    assert_eq!(actual, expected);
});
