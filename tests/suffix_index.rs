//! Integration tests for the suffix array index against a brute-force scan.
//!
//! Record sets are either small and hand-written or generated from a fixed
//! seed, so every failure reproduces.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;
use std::sync::{Arc, OnceLock};
use sxi::index::suffix_array::SuffixValues;
use sxi::index::{IndexConfig, ShardedIndex, SnapshotIndex, SuffixArray, build_worker_pool};
use sxi::query::{BaselineIndex, StringQuery, SubstringIndex};
use sxi::utils::records::{self, Record};
use sxi::IndexError;

static FIXTURE: OnceLock<(Vec<Record>, SuffixArray<u64>)> = OnceLock::new();

/// Random records and their index, built once for all tests
fn fixture() -> &'static (Vec<Record>, SuffixArray<u64>) {
    FIXTURE.get_or_init(|| {
        let records = records::generate_records(3_000, 42);
        let index = SuffixArray::build(borrowed(&records)).expect("Failed to build fixture index");
        (records, index)
    })
}

fn borrowed(records: &[Record]) -> impl Iterator<Item = (u64, impl Iterator<Item = &str> + Send)> {
    records.iter().map(|(id, strings)| (*id, strings.iter().map(String::as_str)))
}

fn set<'a>(values: impl Iterator<Item = &'a u64>) -> BTreeSet<u64> {
    values.copied().collect()
}

fn small(records: Vec<(u64, Vec<&'static str>)>) -> SuffixArray<u64> {
    SuffixArray::build(records).unwrap()
}

#[test]
fn test_round_trip_small_set() {
    let index = small(vec![(1, vec!["ASDK", "EEF"]), (2, vec!["DKI"]), (3, vec!["QQQ"])]);

    assert_eq!(set(index.contains("DK")), BTreeSet::from([1, 2]));
    assert_eq!(set(index.contains("QQ")), BTreeSet::from([3]));
    assert!(set(index.contains("ZZZ")).is_empty());
}

#[test]
fn test_unicode_records() {
    let index = small(vec![(1, vec!["BSDK", "EEF"]), (2, vec!["Сам Рашн Текст"]), (3, vec!["QQQ"])]);

    assert_eq!(set(index.contains("Рашн")), BTreeSet::from([2]));
    assert_eq!(set(index.contains("ашн Т")), BTreeSet::from([2]));
    assert_eq!(set(index.ends_with("кст")), BTreeSet::from([2]));
    assert!(set(index.contains("Раш н")).is_empty());
}

#[test]
fn test_queries_outside_suffix_range() {
    let index = small(vec![(1, vec!["mmm"]), (2, vec!["nnn"])]);

    // before the first suffix and after the last one
    assert!(index.find_left_bound("a").is_none());
    assert_eq!(index.contains("a").count(), 0);
    assert_eq!(index.find_left_bound("zzz"), Some(index.len() - 1));
    assert_eq!(index.contains("zzz").count(), 0);
    assert_eq!(index.ends_with("zzz").count(), 0);
    assert_eq!(index.contains("\u{10FFFF}").count(), 0);
}

#[test]
fn test_shared_suffixes_return_all_owners() {
    let pair = small(vec![(1, vec!["SHARED"]), (2, vec!["SHARED"]), (3, vec!["OTHER"])]);
    let many = small(vec![(1, vec!["SHARED"]), (2, vec!["SHARED"]), (3, vec!["XSHARED"]), (4, vec!["SHARED"])]);
    let single = small(vec![(1, vec!["SHARED"]), (3, vec!["OTHER"])]);

    let node = |index: &SuffixArray<u64>, suffix: &str| {
        (0..index.len())
            .find(|&i| index.suffix(i) == Some(suffix))
            .and_then(|i| index.values(i).cloned())
    };
    assert!(matches!(node(&single, "HARED"), Some(SuffixValues::One(1))));
    assert!(matches!(node(&pair, "HARED"), Some(SuffixValues::Two(_))));
    assert!(matches!(node(&many, "HARED"), Some(SuffixValues::Many(_))));

    assert_eq!(set(single.contains("HARE")), BTreeSet::from([1]));
    assert_eq!(set(pair.contains("HARE")), BTreeSet::from([1, 2]));
    assert_eq!(set(many.contains("HARE")), BTreeSet::from([1, 2, 3, 4]));
    assert_eq!(set(many.ends_with("SHARED")), BTreeSet::from([1, 2, 3, 4]));
}

#[test]
fn test_lcp_matches_adjacent_suffixes() {
    let (_, index) = fixture();
    let lcp = index.lcp();
    assert_eq!(lcp.len(), index.len());
    assert_eq!(lcp.first().copied(), Some(0));

    for i in 1..index.len() {
        let prev = index.suffix(i - 1).unwrap();
        let next = index.suffix(i).unwrap();
        assert!(prev < next, "suffixes {} and {} out of order", i - 1, i);
        let common = prev.bytes().zip(next.bytes()).take_while(|(a, b)| a == b).count();
        assert_eq!(lcp[i] as usize, common);
    }
}

#[test]
fn test_matches_baseline_on_random_records() {
    let (records, index) = fixture();
    let baseline = BaselineIndex::new(records.iter().cloned());

    for probe in records::present_probes(records, 500, 7) {
        let query = StringQuery::contains(probe.as_str());
        let expected = set(baseline.matching(&query));
        assert!(!expected.is_empty());
        assert_eq!(set(index.contains(&probe)), expected, "contains {:?}", probe);
    }

    for probe in records::absent_probes(records, 500) {
        let query = StringQuery::contains(probe.as_str());
        assert!(set(baseline.matching(&query)).is_empty());
        assert_eq!(index.contains(&probe).count(), 0, "contains {:?}", probe);
    }
}

#[test]
fn test_ends_with_matches_baseline() {
    let (records, index) = fixture();
    let baseline = BaselineIndex::new(records.iter().cloned());
    let mut rng = StdRng::seed_from_u64(11);

    for (_, strings) in records.iter().take(300) {
        let text = &strings[rng.gen_range(0..strings.len())];
        let tail: String = text.chars().skip(rng.gen_range(0..text.len())).collect();
        let query = StringQuery::ends_with(tail.as_str());
        assert_eq!(set(index.ends_with(&tail)), set(baseline.matching(&query)), "ends_with {:?}", tail);
    }
}

#[test]
fn test_sharded_matches_single_array() {
    let (records, index) = fixture();
    let pool = build_worker_pool(4).unwrap();
    let probes = records::present_probes(records, 200, 3);

    for shards in [1, 2, 3, 7] {
        let sharded = ShardedIndex::build(borrowed(records), shards, &pool).unwrap();
        assert_eq!(sharded.stats().record_count, records.len());
        assert_eq!(sharded.stats().suffix_count, index.stats().suffix_count);
        for probe in &probes {
            assert_eq!(set(sharded.contains(probe)), set(index.contains(probe)), "{} shards, {:?}", shards, probe);
        }
    }
}

#[test]
fn test_mutation_leaves_array_unchanged() {
    let index = small(vec![(1, vec!["ASDK", "EEF"]), (2, vec!["DKI"])]);
    let before = set(index.contains("DK"));

    assert_eq!(index.add_all(&[3]), Err(IndexError::ImmutabilityViolation { operation: "add_all" }));
    assert_eq!(
        index.remove_all(&[1]),
        Err(IndexError::ImmutabilityViolation { operation: "remove_all" })
    );
    assert_eq!(index.clear(), Err(IndexError::ImmutabilityViolation { operation: "clear" }));
    assert!(!index.is_mutable());

    assert_eq!(set(index.contains("DK")), before);
}

enum Text {
    Plain(&'static str),
    Broken,
}

impl From<Text> for Arc<str> {
    fn from(text: Text) -> Self {
        match text {
            Text::Plain(s) => Arc::from(s),
            Text::Broken => panic!("attribute extraction failed"),
        }
    }
}

#[test]
fn test_failed_shard_keeps_published_snapshot() {
    let config = IndexConfig {
        shard_count: 3,
        worker_threads: 2,
        ..IndexConfig::default()
    };
    let index: SnapshotIndex<u64> = SnapshotIndex::new(config).unwrap();
    index
        .init(vec![(1, vec![Text::Plain("ASDK")]), (2, vec![Text::Plain("DKI")])])
        .unwrap();
    assert_eq!(index.generation(), 1);

    let err = index
        .init(vec![(1, vec![Text::Plain("ZZZ")]), (2, vec![Text::Broken])])
        .unwrap_err();
    assert!(matches!(err, IndexError::BuildFailure { shard: 1, .. }));
    assert_eq!(index.generation(), 1);

    let found = index.retrieve(StringQuery::contains("DK")).unwrap();
    assert_eq!(set(found.iter()), BTreeSet::from([1, 2]));
    assert!(index.retrieve(StringQuery::contains("ZZZ")).unwrap().is_empty());
}

#[test]
fn test_old_snapshot_survives_publish() {
    let index: SnapshotIndex<u64> = SnapshotIndex::new(IndexConfig::default()).unwrap();
    index.init([(1, ["alpha"])]).unwrap();
    let old = index.retrieve(StringQuery::contains("alp")).unwrap();

    index.init([(2, ["alpine"])]).unwrap();
    let new = index.retrieve(StringQuery::contains("alp")).unwrap();

    assert_eq!(set(old.iter()), BTreeSet::from([1]));
    assert_eq!(set(new.iter()), BTreeSet::from([2]));
    assert_eq!(index.generation(), 2);
}
