//! Seeded random records for benchmarks and the verification pack
//!
//! Every record carries two strings over the 15-letter alphabet `A..=O`,
//! of lengths 20 and 30.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Lengths of the two strings every generated record carries
pub const STRING_LENGTHS: [usize; 2] = [20, 30];

/// Appended to probes that must never match
pub const SENTINEL: char = '$';

pub type Record = (u64, Vec<String>);

pub fn random_string<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len).map(|_| char::from(rng.gen_range(b'A'..=b'O'))).collect()
}

/// `count` records with ids `0..count`, identical for the same seed
pub fn generate_records(count: usize, seed: u64) -> Vec<Record> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count as u64)
        .map(|id| {
            let strings = STRING_LENGTHS.iter().map(|&len| random_string(&mut rng, len)).collect();
            (id, strings)
        })
        .collect()
}

/// A substring of `text` starting in `0..6` and 3 to 9 chars long
pub fn probe_substring<R: Rng>(rng: &mut R, text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let len = rng.gen_range(3..10).min(chars.len());
    let start = rng.gen_range(0..6).min(chars.len() - len);
    chars[start..start + len].iter().collect()
}

/// Probes drawn from every string of `sample` shuffled records
pub fn present_probes(records: &[Record], sample: usize, seed: u64) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut picked: Vec<&Record> = records.iter().collect();
    picked.shuffle(&mut rng);
    picked
        .into_iter()
        .take(sample)
        .flat_map(|(_, strings)| strings.iter())
        .map(|s| probe_substring(&mut rng, s))
        .collect()
}

/// Sentinel-terminated probes; since no indexed string holds the sentinel
/// none of them may match
pub fn absent_probes(records: &[Record], sample: usize) -> Vec<String> {
    records
        .iter()
        .take(sample)
        .filter_map(|(_, strings)| strings.first())
        .map(|s| {
            let mut probe: String = s.chars().skip(5).take(4).collect();
            probe.push(SENTINEL);
            probe
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_seeded() {
        let a = generate_records(50, 7);
        let b = generate_records(50, 7);
        assert_eq!(a, b);
        assert_ne!(a, generate_records(50, 8));
        assert_eq!(a[49].0, 49);
    }

    #[test]
    fn test_alphabet_and_lengths() {
        for (_, strings) in generate_records(20, 0) {
            assert_eq!(strings.len(), 2);
            assert_eq!(strings[0].len(), 20);
            assert_eq!(strings[1].len(), 30);
            assert!(strings.iter().flat_map(|s| s.chars()).all(|c| ('A'..='O').contains(&c)));
        }
    }

    #[test]
    fn test_probes_are_substrings() {
        let records = generate_records(30, 1);
        let probes = present_probes(&records, 10, 2);
        assert_eq!(probes.len(), 20);
        for probe in &probes {
            assert!((3..10).contains(&probe.len()));
            assert!(records.iter().any(|(_, s)| s.iter().any(|s| s.contains(probe.as_str()))));
        }
    }

    #[test]
    fn test_probe_short_text() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(probe_substring(&mut rng, "AB"), "AB");
    }

    #[test]
    fn test_absent_probes_end_with_sentinel() {
        let records = generate_records(5, 3);
        let probes = absent_probes(&records, 5);
        assert_eq!(probes.len(), 5);
        assert!(probes.iter().all(|p| p.len() == 5 && p.ends_with(SENTINEL)));
    }
}
