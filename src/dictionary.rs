//! Exclusion dictionary.
//!
//! Categorized sets of surface/base forms that never carry content on their
//! own (inference and emotion vocabulary, discourse connectives, function
//! words, honorifics), plus auxiliary pattern sets and suffix groups.
//!
//! The taxonomy is data: the bundled asset lives in `data/exclusions.json`
//! and a revised copy can be loaded from disk without touching the
//! classification logic.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use log::info;
use serde::Deserialize;

use crate::error::{MinerError, MinerResult};

const BUNDLED_DICTIONARY: &str = include_str!("../data/exclusions.json");

static BUILTIN: LazyLock<ExclusionDictionary> = LazyLock::new(|| {
    ExclusionDictionary::from_json(BUNDLED_DICTIONARY)
        .expect("bundled exclusion dictionary must parse")
});

/// The four exact-match exclusion categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExclusionCategory {
    InferenceEmotion,
    Structural,
    Functional,
    Honorific,
}

impl ExclusionCategory {
    pub const ALL: [ExclusionCategory; 4] = [
        ExclusionCategory::InferenceEmotion,
        ExclusionCategory::Structural,
        ExclusionCategory::Functional,
        ExclusionCategory::Honorific,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ExclusionCategory::InferenceEmotion => "inference/emotion",
            ExclusionCategory::Structural => "structural",
            ExclusionCategory::Functional => "functional",
            ExclusionCategory::Honorific => "honorific",
        }
    }
}

/// Auxiliary literal sets checked after the categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternSet {
    HonorificsStrict,
    ModalExpressions,
    PersonNames,
    Symbols,
    Units,
    CommonAdverbs,
}

impl PatternSet {
    pub const ALL: [PatternSet; 6] = [
        PatternSet::HonorificsStrict,
        PatternSet::ModalExpressions,
        PatternSet::PersonNames,
        PatternSet::Symbols,
        PatternSet::Units,
        PatternSet::CommonAdverbs,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuffixGroup {
    /// `さん`, `ちゃん`, `様`, ...
    HonorificSuffixes,
    /// `よう`, `みたい`, `らしい`, ...
    ModalSuffixes,
}

// On-disk layout of the asset.
#[derive(Debug, Deserialize)]
struct DictionaryAsset {
    version: u32,
    categories: CategoryAsset,
    patterns: PatternAsset,
    suffixes: SuffixAsset,
    organization_suffixes: Vec<String>,
    generic_adjectives: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CategoryAsset {
    inference_emotion: Vec<String>,
    structural: Vec<String>,
    functional: Vec<String>,
    honorific: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PatternAsset {
    honorifics_strict: Vec<String>,
    modal_expressions: Vec<String>,
    person_names: Vec<String>,
    symbols: Vec<String>,
    units: Vec<String>,
    common_adverbs: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SuffixAsset {
    honorific: Vec<String>,
    modal: Vec<String>,
}

/// Read-only exclusion data, built once and shared for the whole run.
#[derive(Debug, Clone)]
pub struct ExclusionDictionary {
    version: u32,
    inference_emotion: HashSet<String>,
    structural: HashSet<String>,
    functional: HashSet<String>,
    honorific: HashSet<String>,
    union: HashSet<String>,
    honorifics_strict: HashSet<String>,
    modal_expressions: HashSet<String>,
    person_names: HashSet<String>,
    symbols: HashSet<String>,
    units: HashSet<String>,
    common_adverbs: HashSet<String>,
    honorific_suffixes: Vec<String>,
    modal_suffixes: Vec<String>,
    organization_suffixes: Vec<String>,
    generic_adjectives: HashSet<String>,
}

fn to_set(words: Vec<String>) -> HashSet<String> {
    words.into_iter().collect()
}

impl ExclusionDictionary {
    /// The dictionary compiled into the binary.
    pub fn builtin() -> &'static ExclusionDictionary {
        &BUILTIN
    }

    /// Parse a dictionary asset and log the category sizes.
    pub fn from_json(json: &str) -> MinerResult<Self> {
        let asset: DictionaryAsset =
            serde_json::from_str(json).map_err(|e| MinerError::Dictionary(e.to_string()))?;

        let inference_emotion = to_set(asset.categories.inference_emotion);
        let structural = to_set(asset.categories.structural);
        let functional = to_set(asset.categories.functional);
        let honorific = to_set(asset.categories.honorific);

        let union: HashSet<String> = inference_emotion
            .iter()
            .chain(&structural)
            .chain(&functional)
            .chain(&honorific)
            .cloned()
            .collect();

        let dictionary = Self {
            version: asset.version,
            inference_emotion,
            structural,
            functional,
            honorific,
            union,
            honorifics_strict: to_set(asset.patterns.honorifics_strict),
            modal_expressions: to_set(asset.patterns.modal_expressions),
            person_names: to_set(asset.patterns.person_names),
            symbols: to_set(asset.patterns.symbols),
            units: to_set(asset.patterns.units),
            common_adverbs: to_set(asset.patterns.common_adverbs),
            honorific_suffixes: asset.suffixes.honorific,
            modal_suffixes: asset.suffixes.modal,
            organization_suffixes: asset.organization_suffixes,
            generic_adjectives: to_set(asset.generic_adjectives),
        };
        dictionary.log_sizes();
        Ok(dictionary)
    }

    /// Load a revised taxonomy from a JSON file.
    pub fn from_file(path: &Path) -> MinerResult<Self> {
        let json = fs::read_to_string(path).map_err(|e| {
            MinerError::Dictionary(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    fn log_sizes(&self) {
        info!("exclusion dictionary v{} initialized", self.version);
        for category in ExclusionCategory::ALL {
            info!(
                "  {}: {} words",
                category.label(),
                self.category_len(category)
            );
        }
        info!("  total excluded: {} words", self.union.len());
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    fn category(&self, category: ExclusionCategory) -> &HashSet<String> {
        match category {
            ExclusionCategory::InferenceEmotion => &self.inference_emotion,
            ExclusionCategory::Structural => &self.structural,
            ExclusionCategory::Functional => &self.functional,
            ExclusionCategory::Honorific => &self.honorific,
        }
    }

    fn pattern(&self, set: PatternSet) -> &HashSet<String> {
        match set {
            PatternSet::HonorificsStrict => &self.honorifics_strict,
            PatternSet::ModalExpressions => &self.modal_expressions,
            PatternSet::PersonNames => &self.person_names,
            PatternSet::Symbols => &self.symbols,
            PatternSet::Units => &self.units,
            PatternSet::CommonAdverbs => &self.common_adverbs,
        }
    }

    pub fn contains(&self, term: &str, category: ExclusionCategory) -> bool {
        self.category(category).contains(term)
    }

    pub fn union_contains(&self, term: &str) -> bool {
        self.union.contains(term)
    }

    pub fn pattern_contains(&self, term: &str, set: PatternSet) -> bool {
        self.pattern(set).contains(term)
    }

    /// True if `term` ends with any suffix of the group.
    pub fn matches_suffix(&self, term: &str, group: SuffixGroup) -> bool {
        let suffixes = match group {
            SuffixGroup::HonorificSuffixes => &self.honorific_suffixes,
            SuffixGroup::ModalSuffixes => &self.modal_suffixes,
        };
        suffixes.iter().any(|suffix| term.ends_with(suffix.as_str()))
    }

    pub fn has_organization_suffix(&self, term: &str) -> bool {
        self.organization_suffixes
            .iter()
            .any(|suffix| term.ends_with(suffix.as_str()))
    }

    pub fn is_generic_adjective(&self, term: &str) -> bool {
        self.generic_adjectives.contains(term)
    }

    pub fn category_len(&self, category: ExclusionCategory) -> usize {
        self.category(category).len()
    }

    pub fn union_len(&self) -> usize {
        self.union.len()
    }

    /// A few members of a category in sorted order, for reports.
    pub fn sample(&self, category: ExclusionCategory, n: usize) -> Vec<&str> {
        let mut words: Vec<&str> = self.category(category).iter().map(String::as_str).collect();
        words.sort_unstable();
        words.truncate(n);
        words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict() -> &'static ExclusionDictionary {
        ExclusionDictionary::builtin()
    }

    #[test]
    fn inference_emotion_members() {
        for w in ["思う", "推測", "かもしれない", "嬉しい", "評価", "みたい"] {
            assert!(dict().contains(w, ExclusionCategory::InferenceEmotion), "{w}");
        }
        assert!(!dict().contains("経済", ExclusionCategory::InferenceEmotion));
    }

    #[test]
    fn structural_members() {
        for w in ["しかし", "例えば", "結論", "けつろん", "とても", "今日", "です"] {
            assert!(dict().contains(w, ExclusionCategory::Structural), "{w}");
        }
        assert!(!dict().contains("テスト", ExclusionCategory::Structural));
    }

    #[test]
    fn functional_members() {
        for w in ["する", "こと", "これ", "できる", "仕事", "時間"] {
            assert!(dict().contains(w, ExclusionCategory::Functional), "{w}");
        }
    }

    #[test]
    fn honorific_members() {
        for w in ["さん", "様", "いたします", "申し上げる", "お伺い"] {
            assert!(dict().contains(w, ExclusionCategory::Honorific), "{w}");
        }
    }

    #[test]
    fn union_covers_every_category() {
        for category in ExclusionCategory::ALL {
            for w in dict().sample(category, 50) {
                assert!(dict().union_contains(w));
            }
        }
        assert!(!dict().union_contains("ネットワーク"));
        // Overlapping members are counted once.
        let sum: usize = ExclusionCategory::ALL
            .iter()
            .map(|c| dict().category_len(*c))
            .sum();
        assert!(dict().union_len() < sum);
    }

    #[test]
    fn suffix_groups() {
        assert!(dict().matches_suffix("田中さん", SuffixGroup::HonorificSuffixes));
        assert!(dict().matches_suffix("お客様", SuffixGroup::HonorificSuffixes));
        assert!(!dict().matches_suffix("さんま定食", SuffixGroup::HonorificSuffixes));
        assert!(dict().matches_suffix("子供みたい", SuffixGroup::ModalSuffixes));
        assert!(dict().matches_suffix("男らしい", SuffixGroup::ModalSuffixes));
        assert!(!dict().matches_suffix("らしさ", SuffixGroup::ModalSuffixes));
    }

    #[test]
    fn pattern_sets_and_extras() {
        assert!(dict().pattern_contains("。", PatternSet::Symbols));
        assert!(dict().pattern_contains("円", PatternSet::Units));
        assert!(dict().pattern_contains("モモ", PatternSet::PersonNames));
        assert!(dict().pattern_contains("っぽさ", PatternSet::ModalExpressions));
        assert!(dict().has_organization_suffix("東京大学"));
        assert!(dict().is_generic_adjective("大きい"));
        assert!(!dict().is_generic_adjective("美しい"));
        assert_eq!(dict().version(), 1);
    }

    #[test]
    fn malformed_asset_is_rejected() {
        let err = ExclusionDictionary::from_json("{\"version\": 1}").unwrap_err();
        assert!(matches!(err, MinerError::Dictionary(_)));
    }
}
