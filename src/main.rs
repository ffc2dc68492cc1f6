#![forbid(unsafe_code)]
//! # cooccurrence_miner CLI
//!
//! Command-line front end for the `cooccurrence_miner` crate: filters the
//! content words of Japanese `.txt` documents, builds the weighted
//! co-occurrence network of the corpus and exports frequency, pair, node and
//! edge tables for rendering.
//!
//! ## Example
//! ```bash
//! cargo run --release -- path/to/texts --top-n 40 --export-format csv
//! ```
//!
//! A JSON config file (`--config`) sets the same options; flags win over the file.
//! See `--help` for all available options.

use clap::Parser;
use log::error;
use std::path::PathBuf;
use std::process;

use cooccurrence_miner::{ExportFormat, MinerConfig, analyze_path, print_failed_files};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// File or directory to analyze (defaults to `source_dir` from the config)
    path: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format for export (txt, csv, tsv, json)
    #[arg(long, default_value = "csv")]
    export_format: ExportFormat,

    /// Directory for exported tables and the report
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Move processed sources into this directory
    #[arg(long)]
    archive_dir: Option<PathBuf>,

    /// Minimum token length in characters
    #[arg(long)]
    min_word_length: Option<usize>,

    /// Minimum count for the `frequent` table
    #[arg(long)]
    min_frequency: Option<usize>,

    /// Number of strongest pairs used for the network
    #[arg(long)]
    top_n: Option<usize>,

    /// Emit verb surface forms instead of base forms
    #[arg(long, default_value_t = false)]
    no_verb_normalization: bool,

    /// Keep adverbs that are not in the common-adverb list
    #[arg(long, default_value_t = false)]
    lenient_pos: bool,

    /// Do not drop inference/emotion vocabulary
    #[arg(long, default_value_t = false)]
    keep_inference_emotion: bool,

    /// Do not drop structural words (connectives, degree adverbs, ...)
    #[arg(long, default_value_t = false)]
    keep_structural_words: bool,

    /// Skip documents not detected as Japanese
    #[arg(long, default_value_t = false)]
    require_japanese: bool,

    /// Alternative exclusion dictionary (JSON)
    #[arg(long)]
    dictionary: Option<PathBuf>,

    /// MeCab executable
    #[arg(long)]
    mecab: Option<String>,

    /// Janome executable
    #[arg(long)]
    janome: Option<String>,
}

impl Cli {
    fn apply(&self, config: &mut MinerConfig) {
        if let Some(v) = &self.output_dir {
            config.output_dir = v.clone();
        }
        if let Some(v) = &self.archive_dir {
            config.archive_dir = Some(v.clone());
        }
        if let Some(v) = self.min_word_length {
            config.min_word_length = v;
        }
        if let Some(v) = self.min_frequency {
            config.min_frequency = v;
        }
        if let Some(v) = self.top_n {
            config.network_top_n = v;
        }
        if self.no_verb_normalization {
            config.enable_verb_normalization = false;
        }
        if self.lenient_pos {
            config.strict_pos_filtering = false;
        }
        if self.keep_inference_emotion {
            config.exclude_inference_emotion = false;
        }
        if self.keep_structural_words {
            config.exclude_structural_words = false;
        }
        if self.require_japanese {
            config.require_japanese = true;
        }
        if let Some(v) = &self.dictionary {
            config.dictionary_path = Some(v.clone());
        }
        if let Some(v) = &self.mecab {
            config.mecab_command = v.clone();
        }
        if let Some(v) = &self.janome {
            config.janome_command = v.clone();
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match MinerConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                error!("Error: {}", e);
                process::exit(1);
            }
        },
        None => MinerConfig::default(),
    };
    cli.apply(&mut config);

    let Some(path) = cli.path.clone().or_else(|| config.source_dir.clone()) else {
        error!("Error: no input path given and no source_dir configured");
        process::exit(1);
    };

    match analyze_path(&path, &config, cli.export_format) {
        Ok(run) => {
            println!("analyzer: {}", run.analyzer);
            println!("{}", run.report);
            for written in &run.written {
                println!("wrote {}", written.display());
            }
            let failed = run.failed_files();
            let mut any_errors = run.analysis.succeeded() == 0;
            if !failed.is_empty() {
                print_failed_files(&failed);
                any_errors = true;
            }
            if any_errors {
                process::exit(1);
            }
        }
        Err(e) => {
            error!("Error: {}", e);
            process::exit(1);
        }
    }
}
