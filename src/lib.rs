//! # cooccurrence_miner
//!
//! Surfaces the content-bearing vocabulary of Japanese documents and measures
//! how strongly those terms co-occur.
//!
//! Pipeline: text -> external morphological analyzer -> token classifier
//! (exclusion dictionary + part-of-speech rules) -> window-weighted pair
//! counts -> top-N co-occurrence network with degree, betweenness and
//! PageRank centrality -> CSV/TSV/JSON/TXT exports for a renderer.
//!
//! ```no_run
//! use std::path::Path;
//! use cooccurrence_miner::{ExportFormat, MinerConfig, analyze_path};
//!
//! let config = MinerConfig::default();
//! let run = analyze_path(Path::new("texts"), &config, ExportFormat::Csv).unwrap();
//! println!("{}", run.report);
//! ```

pub mod analyzer;
pub mod classifier;
pub mod config;
pub mod cooccurrence;
pub mod corpus;
pub mod dictionary;
pub mod error;
pub mod export;
pub mod layout;
pub mod network;
pub mod report;
pub mod tokenizer;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use log::{error, info, warn};
use whatlang::Lang;

pub use analyzer::{
    JanomeAnalyzer, MecabAnalyzer, MorphAnalyzer, configured_backends, parse_ipadic_output,
    select_analyzer,
};
pub use classifier::{AnalyzedToken, PosMajor, RejectReason, TokenClassifier, TokenDecision, classify};
pub use config::{FilterOptions, MinerConfig};
pub use cooccurrence::{CorpusPairCounter, DocumentFeatures, TermPair, extract_pairs};
pub use corpus::{Document, collect_files};
pub use dictionary::{ExclusionCategory, ExclusionDictionary, PatternSet, SuffixGroup};
pub use error::{MinerError, MinerResult};
pub use export::{ExportFormat, csv_safe_cell};
pub use network::{WordEdge, WordGraph, WordNode, build_graph};
pub use tokenizer::DocumentTokenizer;

/// What happened to one document of the batch.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentStatus {
    Analyzed,
    /// Not an error: blank text or a language mismatch.
    Skipped(String),
    Failed(String),
}

impl DocumentStatus {
    pub fn is_analyzed(&self) -> bool {
        matches!(self, DocumentStatus::Analyzed)
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentStatus::Analyzed => f.write_str("analyzed"),
            DocumentStatus::Skipped(reason) => write!(f, "skipped ({reason})"),
            DocumentStatus::Failed(reason) => write!(f, "failed ({reason})"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DocumentOutcome {
    pub name: String,
    pub path: Option<PathBuf>,
    pub status: DocumentStatus,
    /// Present for analyzed documents.
    pub features: Option<DocumentFeatures>,
}

/// Everything the batch produced, handed to reporting and rendering.
#[derive(Debug, Clone, Default)]
pub struct CorpusAnalysis {
    pub outcomes: Vec<DocumentOutcome>,
    pub corpus_pairs: CorpusPairCounter,
    pub word_frequency: HashMap<String, usize>,
    /// `None` when the strongest pairs gave no edge.
    pub graph: Option<WordGraph>,
}

impl CorpusAnalysis {
    fn count(&self, keep: impl Fn(&DocumentStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| keep(&o.status)).count()
    }

    pub fn succeeded(&self) -> usize {
        self.count(|s| matches!(s, DocumentStatus::Analyzed))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, DocumentStatus::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, DocumentStatus::Failed(_)))
    }

    pub fn features(&self) -> impl Iterator<Item = &DocumentFeatures> {
        self.outcomes.iter().filter_map(|o| o.features.as_ref())
    }

    pub fn total_words(&self) -> usize {
        self.features().map(|f| f.word_count).sum()
    }

    pub fn total_chars(&self) -> usize {
        self.features().map(|f| f.char_count).sum()
    }

    pub fn average_ttr(&self) -> f64 {
        mean(self.features().map(|f| f.ttr))
    }

    pub fn average_word_length(&self) -> f64 {
        mean(self.features().map(|f| f.avg_word_length))
    }

    /// Terms reaching `min_frequency`, most frequent first.
    pub fn frequent_words(&self, min_frequency: usize) -> Vec<(String, usize)> {
        cooccurrence::sort_map_to_vec(&self.word_frequency)
            .into_iter()
            .filter(|(_, count)| *count >= min_frequency)
            .collect()
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}

/// True when whatlang detects Japanese.
pub fn is_japanese(text: &str) -> bool {
    whatlang::detect(text)
        .map(|info| info.lang() == Lang::Jpn)
        .unwrap_or(false)
}

/// Run the batch over already loaded (or failed-to-load) documents.
///
/// Documents are processed in order; a failing document is recorded and the
/// rest of the batch continues.
pub fn analyze_documents<I>(
    documents: I,
    tokenizer: &DocumentTokenizer<'_>,
    config: &MinerConfig,
) -> CorpusAnalysis
where
    I: IntoIterator<Item = MinerResult<Document>>,
{
    let mut analysis = CorpusAnalysis::default();

    for document in documents {
        let document = match document {
            Ok(d) => d,
            Err(e) => {
                error!("{e}");
                let name = match &e {
                    MinerError::Document { name, .. } => name.clone(),
                    _ => "<unknown>".to_string(),
                };
                analysis.outcomes.push(DocumentOutcome {
                    name,
                    path: None,
                    status: DocumentStatus::Failed(e.to_string()),
                    features: None,
                });
                continue;
            }
        };

        let mut outcome = DocumentOutcome {
            name: document.name.clone(),
            path: document.path.clone(),
            status: DocumentStatus::Analyzed,
            features: None,
        };

        if document.text.trim().is_empty() {
            info!("{}: {}, skipped", document.name, MinerError::EmptyInput);
            outcome.status = DocumentStatus::Skipped(MinerError::EmptyInput.to_string());
        } else if config.require_japanese && !is_japanese(&document.text) {
            warn!("{}: not detected as Japanese, skipped", document.name);
            outcome.status = DocumentStatus::Skipped("not detected as Japanese".to_string());
        } else {
            match tokenizer.tokenize(&document.text) {
                Ok(tokens) => {
                    let features = DocumentFeatures::extract(&document.text, tokens);
                    info!(
                        "{}: {} words after filtering",
                        document.name, features.word_count
                    );
                    analysis.corpus_pairs.add(&features.weighted_pairs);
                    for (word, count) in &features.word_frequency {
                        *analysis.word_frequency.entry(word.clone()).or_insert(0) += count;
                    }
                    outcome.features = Some(features);
                }
                Err(e) => {
                    error!("{}: {e}", document.name);
                    outcome.status = DocumentStatus::Failed(e.to_string());
                }
            }
        }
        analysis.outcomes.push(outcome);
    }

    if analysis.succeeded() > 0 {
        match build_graph(&analysis.corpus_pairs, config.network_top_n) {
            Ok(graph) => analysis.graph = Some(graph),
            Err(e) => warn!("{e}; network skipped"),
        }
    }
    analysis
}

/// Result of a full run over a path.
#[derive(Debug)]
pub struct RunReport {
    pub analysis: CorpusAnalysis,
    pub analyzer: String,
    pub report: String,
    pub written: Vec<PathBuf>,
}

impl RunReport {
    pub fn failed_files(&self) -> Vec<(String, String)> {
        self.analysis
            .outcomes
            .iter()
            .filter_map(|o| match &o.status {
                DocumentStatus::Failed(reason) => Some((o.name.clone(), reason.clone())),
                _ => None,
            })
            .collect()
    }
}

/// Analyze a file or directory with the configured analyzer backends.
pub fn analyze_path(
    path: &Path,
    config: &MinerConfig,
    format: ExportFormat,
) -> MinerResult<RunReport> {
    analyze_path_with(path, config, format, configured_backends(config))
}

/// Same as [`analyze_path`] with explicit backend candidates, probed in order.
pub fn analyze_path_with(
    path: &Path,
    config: &MinerConfig,
    format: ExportFormat,
    backends: Vec<Box<dyn MorphAnalyzer>>,
) -> MinerResult<RunReport> {
    let loaded;
    let dictionary = match &config.dictionary_path {
        Some(p) => {
            loaded = ExclusionDictionary::from_file(p)?;
            &loaded
        }
        None => ExclusionDictionary::builtin(),
    };

    let files = collect_files(path)?;
    let tokenizer = DocumentTokenizer::new(
        select_analyzer(backends)?,
        TokenClassifier::new(dictionary, config.filter()),
    );

    info!("processing {} file(s)", files.len());
    let documents = files.iter().map(|p| corpus::read_document(p));
    let analysis = analyze_documents(documents, &tokenizer, config);

    if let Some(archive_dir) = &config.archive_dir {
        for outcome in &analysis.outcomes {
            if matches!(outcome.status, DocumentStatus::Failed(_)) {
                continue;
            }
            if let Some(source) = &outcome.path {
                if let Err(e) = corpus::archive(source, archive_dir) {
                    error!("could not archive {}: {e}", source.display());
                }
            }
        }
    }

    let mut report = report::filtering_report(dictionary, &config.filter());
    report.push('\n');
    report.push_str(&report::corpus_report(&analysis));

    let target = export::ExportTarget::new(&config.output_dir, "corpus");
    let mut written = Vec::new();
    if analysis.succeeded() > 0 {
        written = write_exports(&analysis, config, format, &target)?;
    } else {
        warn!("no document could be analyzed; nothing exported");
    }
    written.push(export::write_text(&target, "report", &report)?);

    Ok(RunReport {
        analysis,
        analyzer: tokenizer.analyzer_name().to_string(),
        report,
        written,
    })
}

/// Write the frequency, pair, network and document tables.
pub fn write_exports(
    analysis: &CorpusAnalysis,
    config: &MinerConfig,
    format: ExportFormat,
    target: &export::ExportTarget,
) -> MinerResult<Vec<PathBuf>> {
    use export::{DocumentRow, EdgeRow, NodeRow, PairRow, WordFreqRow, export_cell, write_table};

    let cell = |s: &str| export_cell(format, s);
    let mut written = Vec::new();

    let freq_rows = |min: usize| -> Vec<WordFreqRow> {
        analysis
            .frequent_words(min)
            .into_iter()
            .map(|(item, count)| WordFreqRow {
                item: cell(&item),
                count,
            })
            .collect()
    };
    written.push(write_table(target, "wordfreq", &freq_rows(0), format)?);
    written.push(write_table(
        target,
        "frequent",
        &freq_rows(config.min_frequency),
        format,
    )?);

    let pair_rows: Vec<PairRow> = analysis
        .corpus_pairs
        .most_common(analysis.corpus_pairs.len())
        .into_iter()
        .map(|(pair, weight)| PairRow {
            term1: cell(pair.first()),
            term2: cell(pair.second()),
            weight,
        })
        .collect();
    written.push(write_table(target, "cooccurrence", &pair_rows, format)?);

    if let Some(graph) = &analysis.graph {
        let chosen = layout::select_layout(graph);
        let node_rows: Vec<NodeRow> = graph
            .nodes
            .iter()
            .zip(chosen.positions.iter())
            .map(|(node, pos)| NodeRow {
                term: cell(&node.term),
                degree_centrality: node.degree_centrality,
                betweenness_centrality: node.betweenness_centrality,
                pagerank: node.pagerank,
                x: pos[0],
                y: pos[1],
                layout: chosen.kind.label().to_string(),
            })
            .collect();
        written.push(write_table(target, "nodes", &node_rows, format)?);

        let edge_rows: Vec<EdgeRow> = graph
            .edges
            .iter()
            .map(|e| EdgeRow {
                source: cell(&e.source),
                target: cell(&e.target),
                weight: e.weight,
            })
            .collect();
        written.push(write_table(target, "edges", &edge_rows, format)?);
    }

    let doc_rows: Vec<DocumentRow> = analysis
        .outcomes
        .iter()
        .map(|o| {
            let f = o.features.as_ref();
            DocumentRow {
                name: cell(&o.name),
                status: o.status.to_string(),
                char_count: f.map(|f| f.char_count).unwrap_or(0),
                word_count: f.map(|f| f.word_count).unwrap_or(0),
                unique_word_count: f.map(|f| f.unique_word_count).unwrap_or(0),
                ttr: f.map(|f| f.ttr).unwrap_or(0.0),
                avg_word_length: f.map(|f| f.avg_word_length).unwrap_or(0.0),
            }
        })
        .collect();
    written.push(write_table(target, "documents", &doc_rows, format)?);

    Ok(written)
}

/// Print the list of documents that failed, one per line, to stderr.
pub fn print_failed_files(failed: &[(String, String)]) {
    eprintln!("\n{} document(s) failed:", failed.len());
    for (name, reason) in failed {
        eprintln!("  {name}: {reason}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Transcript(&'static str);

    impl MorphAnalyzer for Transcript {
        fn name(&self) -> &str {
            "transcript"
        }
        fn is_available(&self) -> bool {
            true
        }
        fn analyze(&self, _text: &str) -> MinerResult<Vec<AnalyzedToken>> {
            Ok(parse_ipadic_output(self.0))
        }
    }

    struct Broken;

    impl MorphAnalyzer for Broken {
        fn name(&self) -> &str {
            "broken"
        }
        fn is_available(&self) -> bool {
            true
        }
        fn analyze(&self, _text: &str) -> MinerResult<Vec<AnalyzedToken>> {
            Err(MinerError::Analyzer("crashed".into()))
        }
    }

    const ECONOMY: &str = "経済\t名詞,一般,*,*,*,*,経済,ケイザイ,ケイザイ
の\t助詞,連体化,*,*,*,*,の,ノ,ノ
市場\t名詞,一般,*,*,*,*,市場,シジョウ,シジョー
が\t助詞,格助詞,一般,*,*,*,が,ガ,ガ
拡大\t名詞,サ変接続,*,*,*,*,拡大,カクダイ,カクダイ
し\t動詞,自立,*,*,サ変・スル,連用形,する,シ,シ
た\t助動詞,*,*,*,特殊・タ,基本形,た,タ,タ
EOS
";

    fn tokenizer(analyzer: Box<dyn MorphAnalyzer>) -> DocumentTokenizer<'static> {
        DocumentTokenizer::new(
            analyzer,
            TokenClassifier::new(ExclusionDictionary::builtin(), FilterOptions::default()),
        )
    }

    #[test]
    fn batch_counts_and_aggregates() {
        let t = tokenizer(Box::new(Transcript(ECONOMY)));
        let docs = vec![
            Ok(Document::from_text("a.txt", "経済の市場が拡大した")),
            Ok(Document::from_text("blank.txt", "   \n")),
            Err(MinerError::Document {
                name: "bad.txt".into(),
                reason: "invalid UTF-8".into(),
            }),
            Ok(Document::from_text("b.txt", "経済の市場が拡大した")),
        ];
        let analysis = analyze_documents(docs, &t, &MinerConfig::default());
        assert_eq!(analysis.succeeded(), 2);
        assert_eq!(analysis.skipped(), 1);
        assert_eq!(analysis.failed(), 1);
        assert_eq!(analysis.outcomes.len(), 4);
        assert_eq!(analysis.word_frequency["経済"], 2);
        assert_eq!(analysis.total_words(), 6);

        let single = 1.0 / 3.0 + 1.0 / 5.0 + 1.0 / 10.0;
        let w = analysis.corpus_pairs.get(&TermPair::new("経済", "市場")).unwrap();
        assert!((w - 2.0 * single).abs() < 1e-9);

        let graph = analysis.graph.as_ref().unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn analyzer_failure_is_isolated() {
        let t = tokenizer(Box::new(Broken));
        let docs = vec![Ok(Document::from_text("a.txt", "本文"))];
        let analysis = analyze_documents(docs, &t, &MinerConfig::default());
        assert_eq!(analysis.failed(), 1);
        assert!(analysis.graph.is_none());
    }

    #[test]
    fn single_repeated_term_gives_self_loop_network() {
        const REPEAT: &str = "テスト\t名詞,サ変接続,*,*,*,*,テスト,テスト,テスト
です\t助動詞,*,*,*,特殊・デス,基本形,です,デス,デス
テスト\t名詞,サ変接続,*,*,*,*,テスト,テスト,テスト
";
        let t = tokenizer(Box::new(Transcript(REPEAT)));
        let docs = vec![Ok(Document::from_text("a.txt", "テストですテスト"))];
        let analysis = analyze_documents(docs, &t, &MinerConfig::default());
        assert_eq!(analysis.succeeded(), 1);
        assert_eq!(analysis.word_frequency["テスト"], 2);
        let graph = analysis.graph.as_ref().unwrap();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges[0].source, "テスト");
        assert_eq!(graph.edges[0].target, "テスト");
    }

    #[test]
    fn language_requirement_skips_other_languages() {
        let t = tokenizer(Box::new(Transcript(ECONOMY)));
        let config = MinerConfig {
            require_japanese: true,
            ..MinerConfig::default()
        };
        let docs = vec![Ok(Document::from_text(
            "en.txt",
            "This document is written entirely in English and should be skipped.",
        ))];
        let analysis = analyze_documents(docs, &t, &config);
        assert_eq!(analysis.skipped(), 1);
    }

    #[test]
    fn averages_over_analyzed_documents() {
        let t = tokenizer(Box::new(Transcript(ECONOMY)));
        let docs = vec![Ok(Document::from_text("a.txt", "経済の市場が拡大した"))];
        let analysis = analyze_documents(docs, &t, &MinerConfig::default());
        assert!((analysis.average_ttr() - 1.0).abs() < 1e-9);
        assert!((analysis.average_word_length() - 2.0).abs() < 1e-9);
        assert_eq!(analysis.frequent_words(3), Vec::<(String, usize)>::new());
        assert_eq!(analysis.frequent_words(1).len(), 3);
    }
}
