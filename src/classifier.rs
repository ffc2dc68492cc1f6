//! Token classifier.
//!
//! Decides for every analyzed token whether it is content-bearing and which
//! form (surface or base) is emitted. The rules are applied in a fixed order
//! and the first rejecting rule wins.

use std::fmt;

use crate::config::FilterOptions;
use crate::dictionary::{ExclusionCategory, ExclusionDictionary, PatternSet, SuffixGroup};

/// Major part-of-speech category as reported by an IPAdic analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PosMajor {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Particle,
    AuxiliaryVerb,
    Conjunction,
    Adnominal,
    Interjection,
    Prefix,
    Symbol,
    Filler,
    Other(String),
}

impl PosMajor {
    /// Map an IPAdic major label (`名詞`, `動詞`, ...) to the enum.
    pub fn from_label(label: &str) -> Self {
        match label {
            "名詞" => PosMajor::Noun,
            "動詞" => PosMajor::Verb,
            "形容詞" => PosMajor::Adjective,
            "副詞" => PosMajor::Adverb,
            "助詞" => PosMajor::Particle,
            "助動詞" => PosMajor::AuxiliaryVerb,
            "接続詞" => PosMajor::Conjunction,
            "連体詞" => PosMajor::Adnominal,
            "感動詞" => PosMajor::Interjection,
            "接頭詞" => PosMajor::Prefix,
            "記号" => PosMajor::Symbol,
            "フィラー" => PosMajor::Filler,
            other => PosMajor::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            PosMajor::Noun => "名詞",
            PosMajor::Verb => "動詞",
            PosMajor::Adjective => "形容詞",
            PosMajor::Adverb => "副詞",
            PosMajor::Particle => "助詞",
            PosMajor::AuxiliaryVerb => "助動詞",
            PosMajor::Conjunction => "接続詞",
            PosMajor::Adnominal => "連体詞",
            PosMajor::Interjection => "感動詞",
            PosMajor::Prefix => "接頭詞",
            PosMajor::Symbol => "記号",
            PosMajor::Filler => "フィラー",
            PosMajor::Other(label) => label,
        }
    }
}

impl fmt::Display for PosMajor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One unit produced by the morphological analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzedToken {
    pub surface: String,
    pub base_form: String,
    pub pos_major: PosMajor,
    pub pos_minor1: String,
    pub pos_minor2: String,
}

impl AnalyzedToken {
    pub fn new(
        surface: impl Into<String>,
        base_form: impl Into<String>,
        pos_major: PosMajor,
        pos_minor1: impl Into<String>,
        pos_minor2: impl Into<String>,
    ) -> Self {
        Self {
            surface: surface.into(),
            base_form: base_form.into(),
            pos_major,
            pos_minor1: pos_minor1.into(),
            pos_minor2: pos_minor2.into(),
        }
    }
}

/// Which rule rejected a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Too short, ASCII-only or purely numeric.
    Shape,
    Category(ExclusionCategory),
    Pattern(PatternSet),
    Suffix(SuffixGroup),
    LikelyPersonName,
    Organization,
    PartOfSpeech,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDecision {
    pub keep: bool,
    /// Empty when the token is rejected.
    pub emitted_form: String,
    pub reason: Option<RejectReason>,
}

impl TokenDecision {
    fn keep(form: &str) -> Self {
        Self {
            keep: true,
            emitted_form: form.to_string(),
            reason: None,
        }
    }

    fn reject(reason: RejectReason) -> Self {
        Self {
            keep: false,
            emitted_form: String::new(),
            reason: Some(reason),
        }
    }
}

// Noun sub-categories.
const NOUN_CONTENT: [&str; 3] = ["一般", "固有名詞", "サ変接続"];
const NOUN_PROPER: &str = "固有名詞";
const NOUN_EXCLUDED: [&str; 2] = ["代名詞", "数"];
const NOUN_DEPENDENT: [&str; 3] = ["助数詞", "接尾", "非自立"];
const INDEPENDENT: &str = "自立";

const PERSON_NAME_MAX_CHARS: usize = 4;

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.chars().all(char::is_numeric)
}

fn is_katakana_block(c: char) -> bool {
    ('\u{30A0}'..='\u{30FF}').contains(&c)
}

/// Binds a dictionary and filter options for repeated classification.
#[derive(Debug, Clone)]
pub struct TokenClassifier<'d> {
    dictionary: &'d ExclusionDictionary,
    options: FilterOptions,
}

impl<'d> TokenClassifier<'d> {
    pub fn new(dictionary: &'d ExclusionDictionary, options: FilterOptions) -> Self {
        Self {
            dictionary,
            options,
        }
    }

    fn either_in(&self, token: &AnalyzedToken, category: ExclusionCategory) -> bool {
        self.dictionary.contains(&token.surface, category)
            || self.dictionary.contains(&token.base_form, category)
    }

    pub fn classify(&self, token: &AnalyzedToken) -> TokenDecision {
        let dict = self.dictionary;
        let opts = &self.options;
        let surface = token.surface.as_str();
        let base = token.base_form.as_str();

        if char_len(surface) < opts.min_word_length || surface.is_ascii() || is_numeric(surface) {
            return TokenDecision::reject(RejectReason::Shape);
        }

        if opts.exclude_inference_emotion
            && self.either_in(token, ExclusionCategory::InferenceEmotion)
        {
            return TokenDecision::reject(RejectReason::Category(
                ExclusionCategory::InferenceEmotion,
            ));
        }
        if opts.exclude_structural_words && self.either_in(token, ExclusionCategory::Structural) {
            return TokenDecision::reject(RejectReason::Category(ExclusionCategory::Structural));
        }
        for category in [ExclusionCategory::Functional, ExclusionCategory::Honorific] {
            if self.either_in(token, category) {
                return TokenDecision::reject(RejectReason::Category(category));
            }
        }

        for set in PatternSet::ALL {
            if dict.pattern_contains(surface, set) || dict.pattern_contains(base, set) {
                return TokenDecision::reject(RejectReason::Pattern(set));
            }
        }

        // Overlaps the exact-match sets on purpose: variant forms missed above
        // still go.
        for group in [SuffixGroup::HonorificSuffixes, SuffixGroup::ModalSuffixes] {
            if dict.matches_suffix(surface, group) || dict.matches_suffix(base, group) {
                return TokenDecision::reject(RejectReason::Suffix(group));
            }
        }

        if let Some(reason) = self.reject_by_pos(token) {
            return TokenDecision::reject(reason);
        }

        if token.pos_major == PosMajor::Verb && opts.enable_verb_normalization {
            TokenDecision::keep(base)
        } else {
            TokenDecision::keep(surface)
        }
    }

    fn reject_by_pos(&self, token: &AnalyzedToken) -> Option<RejectReason> {
        let dict = self.dictionary;
        let surface = token.surface.as_str();
        let minor1 = token.pos_minor1.as_str();
        let minor2 = token.pos_minor2.as_str();

        let keep = match token.pos_major {
            PosMajor::Noun => {
                if NOUN_CONTENT.contains(&minor1) {
                    if minor1 == NOUN_PROPER {
                        if char_len(surface) <= PERSON_NAME_MAX_CHARS
                            && surface.chars().all(is_katakana_block)
                        {
                            return Some(RejectReason::LikelyPersonName);
                        }
                        if dict.has_organization_suffix(surface) {
                            return Some(RejectReason::Organization);
                        }
                    }
                    true
                } else if NOUN_EXCLUDED.contains(&minor1) {
                    false
                } else if NOUN_DEPENDENT.contains(&minor1) || NOUN_DEPENDENT.contains(&minor2) {
                    false
                } else {
                    char_len(surface) >= 2
                }
            }
            PosMajor::Verb => {
                minor1 == INDEPENDENT
                    && !dict.contains(&token.base_form, ExclusionCategory::Functional)
            }
            PosMajor::Adjective => {
                minor1 == INDEPENDENT && !dict.is_generic_adjective(&token.base_form)
            }
            PosMajor::Adverb => {
                !self.options.strict_pos_filtering
                    && !dict.pattern_contains(surface, PatternSet::CommonAdverbs)
            }
            _ => false,
        };

        if keep {
            None
        } else {
            Some(RejectReason::PartOfSpeech)
        }
    }
}

/// Classify one token against the bundled dictionary.
pub fn classify(token: &AnalyzedToken, options: &FilterOptions) -> TokenDecision {
    TokenClassifier::new(ExclusionDictionary::builtin(), options.clone()).classify(token)
}
