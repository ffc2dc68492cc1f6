//! Plain-text summaries printed to stdout and saved next to the exports.

use std::fmt::Write as _;

use crate::CorpusAnalysis;
use crate::config::FilterOptions;
use crate::cooccurrence::sort_map_to_vec;
use crate::dictionary::{ExclusionCategory, ExclusionDictionary};

const TOP_WORDS: usize = 15;
const TOP_PAIRS: usize = 15;
const TOP_NODES: usize = 10;
const CATEGORY_EXAMPLES: usize = 10;

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

/// Active filter settings and dictionary sizes.
pub fn filtering_report(dictionary: &ExclusionDictionary, filter: &FilterOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== Filtering ==");
    let _ = writeln!(
        out,
        "exclude inference/emotion words: {}",
        on_off(filter.exclude_inference_emotion)
    );
    let _ = writeln!(
        out,
        "exclude structural words: {}",
        on_off(filter.exclude_structural_words)
    );
    let _ = writeln!(
        out,
        "strict part-of-speech filtering: {}",
        on_off(filter.strict_pos_filtering)
    );
    let _ = writeln!(
        out,
        "verb normalization: {}",
        on_off(filter.enable_verb_normalization)
    );
    let _ = writeln!(out, "minimum word length: {}", filter.min_word_length);
    let _ = writeln!(out, "dictionary version: {}", dictionary.version());
    for category in ExclusionCategory::ALL {
        let _ = writeln!(
            out,
            "{}: {} words (e.g. {})",
            category.label(),
            dictionary.category_len(category),
            dictionary.sample(category, CATEGORY_EXAMPLES).join(", ")
        );
    }
    let _ = writeln!(out, "total excluded: {} words", dictionary.union_len());
    out
}

/// Corpus statistics, top terms, top pairs and the most central nodes.
pub fn corpus_report(analysis: &CorpusAnalysis) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== Documents ==");
    let _ = writeln!(
        out,
        "analyzed: {}, skipped: {}, failed: {}",
        analysis.succeeded(),
        analysis.skipped(),
        analysis.failed()
    );
    let _ = writeln!(out, "total words (after filtering): {}", analysis.total_words());
    let _ = writeln!(out, "total characters: {}", analysis.total_chars());
    let _ = writeln!(out, "unique words: {}", analysis.word_frequency.len());
    let _ = writeln!(out, "average TTR: {:.3}", analysis.average_ttr());
    let _ = writeln!(
        out,
        "average word length: {:.2}",
        analysis.average_word_length()
    );

    let _ = writeln!(out, "\n== Top words ==");
    for (word, count) in sort_map_to_vec(&analysis.word_frequency)
        .into_iter()
        .take(TOP_WORDS)
    {
        let _ = writeln!(out, "{word}: {count}");
    }

    let _ = writeln!(out, "\n== Top co-occurrences ==");
    for (pair, weight) in analysis.corpus_pairs.most_common(TOP_PAIRS) {
        let _ = writeln!(out, "{} - {}: {:.3}", pair.first(), pair.second(), weight);
    }

    let _ = writeln!(out, "\n== Network ==");
    match &analysis.graph {
        Some(graph) => {
            let _ = writeln!(
                out,
                "{} nodes, {} edges",
                graph.node_count(),
                graph.edge_count()
            );
            for node in graph.ranked_nodes().into_iter().take(TOP_NODES) {
                let _ = writeln!(
                    out,
                    "{}: pagerank {:.3}, degree {:.3}, betweenness {:.3}",
                    node.term, node.pagerank, node.degree_centrality, node.betweenness_centrality
                );
            }
        }
        None => {
            let _ = writeln!(out, "not enough co-occurrence data for a network");
        }
    }

    let problems: Vec<_> = analysis
        .outcomes
        .iter()
        .filter(|o| !o.status.is_analyzed())
        .collect();
    if !problems.is_empty() {
        let _ = writeln!(out, "\n== Skipped / failed ==");
        for outcome in problems {
            let _ = writeln!(out, "{}: {}", outcome.name, outcome.status);
        }
    }
    out
}
