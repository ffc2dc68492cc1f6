//! Configuration surface.
//!
//! A flat JSON object; unknown keys are ignored and missing keys take the
//! defaults below. CLI flags are applied on top by the binary.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MinerError, MinerResult};

pub const DEFAULT_MECAB_DICDIR: &str = "/usr/lib/x86_64-linux-gnu/mecab/dic/ipadic-utf8";

/// Options the token classifier reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub min_word_length: usize,
    pub enable_verb_normalization: bool,
    pub strict_pos_filtering: bool,
    pub exclude_inference_emotion: bool,
    pub exclude_structural_words: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            min_word_length: 2,
            enable_verb_normalization: true,
            strict_pos_filtering: true,
            exclude_inference_emotion: true,
            exclude_structural_words: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinerConfig {
    pub min_word_length: usize,
    /// Frequency floor for the `frequent` table handed to renderers.
    pub min_frequency: usize,
    pub network_top_n: usize,
    pub enable_verb_normalization: bool,
    pub strict_pos_filtering: bool,
    pub exclude_inference_emotion: bool,
    pub exclude_structural_words: bool,
    /// Skip documents that are not detected as Japanese.
    pub require_japanese: bool,
    pub source_dir: Option<PathBuf>,
    pub archive_dir: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub dictionary_path: Option<PathBuf>,
    pub mecab_command: String,
    pub mecab_dicdir: Option<PathBuf>,
    pub janome_command: String,
}

impl Default for MinerConfig {
    fn default() -> Self {
        let filter = FilterOptions::default();
        Self {
            min_word_length: filter.min_word_length,
            min_frequency: 3,
            network_top_n: 40,
            enable_verb_normalization: filter.enable_verb_normalization,
            strict_pos_filtering: filter.strict_pos_filtering,
            exclude_inference_emotion: filter.exclude_inference_emotion,
            exclude_structural_words: filter.exclude_structural_words,
            require_japanese: false,
            source_dir: None,
            archive_dir: None,
            output_dir: PathBuf::from("."),
            dictionary_path: None,
            mecab_command: "mecab".to_string(),
            mecab_dicdir: Some(PathBuf::from(DEFAULT_MECAB_DICDIR)),
            janome_command: "janome".to_string(),
        }
    }
}

impl MinerConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load(path: &Path) -> MinerResult<Self> {
        let json = fs::read_to_string(path).map_err(|e| MinerError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_json(&json).map_err(|e| MinerError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn filter(&self) -> FilterOptions {
        FilterOptions {
            min_word_length: self.min_word_length,
            enable_verb_normalization: self.enable_verb_normalization,
            strict_pos_filtering: self.strict_pos_filtering,
            exclude_inference_emotion: self.exclude_inference_emotion,
            exclude_structural_words: self.exclude_structural_words,
        }
    }
}
