//! Document tokenizer: analyzer output filtered through the classifier.

use log::debug;

use crate::analyzer::MorphAnalyzer;
use crate::classifier::TokenClassifier;
use crate::error::MinerResult;

pub struct DocumentTokenizer<'d> {
    analyzer: Box<dyn MorphAnalyzer>,
    classifier: TokenClassifier<'d>,
}

impl<'d> DocumentTokenizer<'d> {
    pub fn new(analyzer: Box<dyn MorphAnalyzer>, classifier: TokenClassifier<'d>) -> Self {
        Self {
            analyzer,
            classifier,
        }
    }

    pub fn analyzer_name(&self) -> &str {
        self.analyzer.name()
    }

    /// Kept tokens in document order. Empty or fully filtered input gives an
    /// empty vector.
    pub fn tokenize(&self, text: &str) -> MinerResult<Vec<String>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let analyzed = self.analyzer.analyze(text)?;
        let total = analyzed.len();
        let words: Vec<String> = analyzed
            .iter()
            .map(|token| self.classifier.classify(token))
            .filter(|decision| decision.keep)
            .map(|decision| decision.emitted_form)
            .collect();
        debug!("kept {} of {} analyzed tokens", words.len(), total);
        Ok(words)
    }
}
