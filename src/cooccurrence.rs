//! Window-weighted co-occurrence extraction and per-document features.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::Serialize;

/// Sliding window sizes; a pair seen in window `w` gains `1 / w`.
pub const WINDOW_SIZES: [usize; 3] = [3, 5, 10];

/// Unordered term pair, stored with `first <= second`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TermPair {
    first: String,
    second: String,
}

impl TermPair {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self {
                first: a,
                second: b,
            }
        } else {
            Self {
                first: b,
                second: a,
            }
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }

    pub fn is_self_pair(&self) -> bool {
        self.first == self.second
    }
}

/// Weighted pairs for one token sequence.
///
/// For every window size `w`, each `(i, j)` with `i < j < i + w` adds `1 / w`
/// to the canonical pair, so close neighbours collect weight from every
/// window they fall into.
pub fn extract_pairs(tokens: &[String]) -> HashMap<TermPair, f64> {
    let mut pairs: HashMap<TermPair, f64> = HashMap::new();
    let n = tokens.len();
    for window in WINDOW_SIZES {
        let weight = 1.0 / window as f64;
        for i in 0..n {
            for j in (i + 1)..std::cmp::min(i + window, n) {
                *pairs
                    .entry(TermPair::new(tokens[i].as_str(), tokens[j].as_str()))
                    .or_insert(0.0) += weight;
            }
        }
    }
    pairs
}

/// Counts each token.
pub fn count_words(words: &[String]) -> HashMap<String, usize> {
    let mut frequency: HashMap<String, usize> = HashMap::new();
    for word in words {
        *frequency.entry(word.to_owned()).or_insert(0) += 1;
    }
    frequency
}

#[derive(Debug, Clone)]
pub struct DocumentFeatures {
    pub tokens: Vec<String>,
    pub weighted_pairs: HashMap<TermPair, f64>,
    pub word_frequency: HashMap<String, usize>,
    /// Characters in the raw text.
    pub char_count: usize,
    pub word_count: usize,
    pub unique_word_count: usize,
    /// Type-token ratio, 0 for an empty sequence.
    pub ttr: f64,
    pub avg_word_length: f64,
}

impl DocumentFeatures {
    pub fn extract(text: &str, tokens: Vec<String>) -> Self {
        let word_count = tokens.len();
        let unique_word_count = tokens.iter().collect::<HashSet<_>>().len();
        let ttr = if word_count > 0 {
            unique_word_count as f64 / word_count as f64
        } else {
            0.0
        };
        let avg_word_length = if word_count > 0 {
            tokens.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / word_count as f64
        } else {
            0.0
        };
        Self {
            weighted_pairs: extract_pairs(&tokens),
            word_frequency: count_words(&tokens),
            char_count: text.chars().count(),
            word_count,
            unique_word_count,
            ttr,
            avg_word_length,
            tokens,
        }
    }
}

/// Highest weight first, ties by pair order.
fn by_weight_desc(a: &(&TermPair, &f64), b: &(&TermPair, &f64)) -> Ordering {
    b.1.partial_cmp(a.1)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.0.cmp(b.0))
}

/// Corpus-wide pair weights, summed document by document.
#[derive(Debug, Clone, Default)]
pub struct CorpusPairCounter {
    weights: HashMap<TermPair, f64>,
}

impl CorpusPairCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, pairs: &HashMap<TermPair, f64>) {
        for (pair, weight) in pairs {
            *self.weights.entry(pair.clone()).or_insert(0.0) += weight;
        }
    }

    pub fn insert(&mut self, pair: TermPair, weight: f64) {
        *self.weights.entry(pair).or_insert(0.0) += weight;
    }

    pub fn get(&self, pair: &TermPair) -> Option<f64> {
        self.weights.get(pair).copied()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// The `n` heaviest pairs, deterministic on ties.
    pub fn most_common(&self, n: usize) -> Vec<(TermPair, f64)> {
        let mut sorted: Vec<(&TermPair, &f64)> = self.weights.iter().collect();
        sorted.sort_by(by_weight_desc);
        sorted
            .into_iter()
            .take(n)
            .map(|(pair, weight)| (pair.clone(), *weight))
            .collect()
    }
}

impl FromIterator<(TermPair, f64)> for CorpusPairCounter {
    fn from_iter<I: IntoIterator<Item = (TermPair, f64)>>(iter: I) -> Self {
        let mut counter = Self::new();
        for (pair, weight) in iter {
            counter.insert(pair, weight);
        }
        counter
    }
}

/// Sort word counts by frequency, ties alphabetically.
pub fn sort_map_to_vec(frequency: &HashMap<String, usize>) -> Vec<(String, usize)> {
    let mut vec_sorted: Vec<(String, usize)> = frequency
        .iter()
        .map(|(word, count)| (word.clone(), *count))
        .collect();
    vec_sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    vec_sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(ws: &[&str]) -> Vec<String> {
        ws.iter().map(|w| w.to_string()).collect()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn adjacent_pair_collects_all_windows() {
        let pairs = extract_pairs(&words(&["x", "y"]));
        assert_eq!(pairs.len(), 1);
        let w = pairs[&TermPair::new("x", "y")];
        assert!(close(w, 1.0 / 3.0 + 1.0 / 5.0 + 1.0 / 10.0));
    }

    #[test]
    fn pairs_are_canonical() {
        let pairs = extract_pairs(&words(&["b", "a", "b", "a"]));
        assert!(pairs.contains_key(&TermPair::new("a", "b")));
        for pair in pairs.keys() {
            assert!(pair.first() <= pair.second());
        }
        assert_eq!(TermPair::new("b", "a"), TermPair::new("a", "b"));
    }

    #[test]
    fn distance_limits_windows() {
        // Distance 3 is outside window 3 but inside 5 and 10.
        let pairs = extract_pairs(&words(&["a", "x", "y", "b"]));
        let w = pairs[&TermPair::new("a", "b")];
        assert!(close(w, 1.0 / 5.0 + 1.0 / 10.0));
        // Distance 9 only fits window 10.
        let mut long = vec!["p".to_string()];
        long.extend((0..8).map(|i| format!("f{i}")));
        long.push("q".to_string());
        let pairs = extract_pairs(&long);
        assert!(close(pairs[&TermPair::new("p", "q")], 0.1));
    }

    #[test]
    fn repeated_terms_form_self_pairs() {
        let pairs = extract_pairs(&words(&["テスト", "テスト"]));
        assert!(pairs[&TermPair::new("テスト", "テスト")] > 0.0);
        assert!(TermPair::new("テスト", "テスト").is_self_pair());
    }

    #[test]
    fn features_of_empty_document() {
        let f = DocumentFeatures::extract("。", Vec::new());
        assert_eq!(f.word_count, 0);
        assert_eq!(f.ttr, 0.0);
        assert_eq!(f.avg_word_length, 0.0);
        assert!(f.weighted_pairs.is_empty());
        assert_eq!(f.char_count, 1);
    }

    #[test]
    fn features_counts_and_ttr() {
        let f = DocumentFeatures::extract("テストです。これはテストです。", words(&["テスト", "テスト"]));
        assert_eq!(f.word_frequency["テスト"], 2);
        assert_eq!(f.word_count, 2);
        assert_eq!(f.unique_word_count, 1);
        assert!(close(f.ttr, 0.5));
        assert!(close(f.avg_word_length, 3.0));
        assert_eq!(f.char_count, 15);
    }

    #[test]
    fn corpus_counter_sums_and_ranks() {
        let mut corpus = CorpusPairCounter::new();
        corpus.add(&extract_pairs(&words(&["a", "b"])));
        corpus.add(&extract_pairs(&words(&["b", "a"])));
        corpus.insert(TermPair::new("c", "d"), 0.1);
        corpus.insert(TermPair::new("e", "f"), 0.1);
        let adjacent = 1.0 / 3.0 + 1.0 / 5.0 + 1.0 / 10.0;
        assert!(close(corpus.get(&TermPair::new("a", "b")).unwrap(), 2.0 * adjacent));

        let top = corpus.most_common(2);
        assert_eq!(top[0].0, TermPair::new("a", "b"));
        assert_eq!(top[1].0, TermPair::new("c", "d"));
        assert_eq!(corpus.most_common(10).len(), 3);
    }

    #[test]
    fn sorted_frequencies() {
        let counts = count_words(&words(&["b", "a", "b", "c", "a", "b"]));
        let sorted = sort_map_to_vec(&counts);
        assert_eq!(
            sorted,
            vec![("b".to_string(), 3), ("a".to_string(), 2), ("c".to_string(), 1)]
        );
    }
}
