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
    let records: Vec<(usize, Vec<String>)> = input.records.into_iter().enumerate().collect();
    let Ok(index) = SuffixArray::build(records.iter().map(|(id, s)| (*id, s.iter().map(String::as_str)))) else {
        return;
    };
    let baseline = BaselineIndex::new(records.iter().cloned());

    // The empty pattern is answered with nothing, unlike str::ends_with
    if input.pattern.is_empty() {
        assert_eq!(index.ends_with("").count(), 0);
        return;
    }

    let query = StringQuery::ends_with(input.pattern.as_str());
    let actual: BTreeSet<usize> = index.ends_with(&input.pattern).copied().collect();
    let expected: BTreeSet<usize> = baseline.matching(&query).copied().collect();
    assert_eq!(actual, expected);
});
