//! Dominant-language detection for post text.
//!
//! Detection is script-first: kana, Hangul, Han, Cyrillic and the other
//! non-Latin scripts identify a language on their own. Latin text is scored
//! against short stopword lists plus a few diacritic hints. Text with too few
//! letters, or Latin text that matches nothing, gets the configured default tag.

use std::collections::HashMap;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::semantic::extract::is_placeholder;

/// Default minimum number of letters needed before detection is attempted.
pub const DEFAULT_MIN_DETECT_CHARS: usize = 8;

/// Lowercase language code such as `en` or `ja`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageTag(String);

impl LanguageTag {
    pub fn new(code: &str) -> Self {
        LanguageTag(code.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for LanguageTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LanguageTag {
    fn from(code: &str) -> Self {
        LanguageTag::new(code)
    }
}

impl From<String> for LanguageTag {
    fn from(code: String) -> Self {
        LanguageTag::new(&code)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Script {
    Latin,
    Kana,
    Han,
    Hangul,
    Cyrillic,
    Greek,
    Arabic,
    Hebrew,
    Thai,
    Devanagari,
}

impl Script {
    fn of(c: char) -> Option<Script> {
        match c as u32 {
            0x3040..=0x30FF | 0x31F0..=0x31FF | 0xFF66..=0xFF9F => Some(Script::Kana),
            0x4E00..=0x9FFF | 0x3400..=0x4DBF | 0xF900..=0xFAFF => Some(Script::Han),
            0xAC00..=0xD7AF | 0x1100..=0x11FF | 0x3130..=0x318F => Some(Script::Hangul),
            0x0400..=0x04FF | 0x0500..=0x052F => Some(Script::Cyrillic),
            0x0370..=0x03FF | 0x1F00..=0x1FFF => Some(Script::Greek),
            0x0600..=0x06FF | 0x0750..=0x077F => Some(Script::Arabic),
            0x0590..=0x05FF => Some(Script::Hebrew),
            0x0E00..=0x0E7F => Some(Script::Thai),
            0x0900..=0x097F => Some(Script::Devanagari),
            _ if c.is_alphabetic() && (c.is_ascii() || ('\u{00C0}'..='\u{024F}').contains(&c)) => {
                Some(Script::Latin)
            }
            _ => None,
        }
    }

    fn language(self) -> Option<&'static str> {
        match self {
            Script::Latin => None,
            Script::Kana => Some("ja"),
            Script::Han => Some("zh"),
            Script::Hangul => Some("ko"),
            Script::Cyrillic => Some("ru"),
            Script::Greek => Some("el"),
            Script::Arabic => Some("ar"),
            Script::Hebrew => Some("he"),
            Script::Thai => Some("th"),
            Script::Devanagari => Some("hi"),
        }
    }
}

/// Latin-script languages in tie-break order.
const LATIN_PROFILES: &[(&str, &[&str])] = &[
    (
        "en",
        &[
            "the", "and", "is", "are", "i", "you", "of", "to", "in", "it", "this", "that", "with",
            "for", "was", "my", "have", "be", "not", "what", "just", "love", "they", "we",
        ],
    ),
    (
        "fr",
        &[
            "le", "les", "des", "est", "et", "je", "j", "une", "du", "pas", "pour", "dans", "ce",
            "qui", "sur", "avec", "nous", "vous", "mais", "aime", "c", "d", "l", "qu",
        ],
    ),
    (
        "es",
        &[
            "el", "los", "las", "es", "y", "que", "una", "por", "para", "con", "del", "pero",
            "muy", "yo", "como", "esta", "este", "gusta", "son", "hay",
        ],
    ),
    (
        "de",
        &[
            "der", "die", "das", "und", "ist", "ich", "nicht", "mit", "ein", "eine", "auf", "sie",
            "wir", "auch", "sind", "zu", "den", "dem", "aber", "liebe",
        ],
    ),
    (
        "pt",
        &[
            "os", "não", "nao", "um", "uma", "eu", "com", "para", "muito", "mas", "são", "sao",
            "isso", "ele", "ela", "você", "voce", "gosto", "também", "tambem",
        ],
    ),
    (
        "it",
        &[
            "il", "gli", "di", "che", "non", "sono", "è", "per", "con", "una", "ma", "anche",
            "questo", "molto", "io", "della", "amo", "ci", "mi",
        ],
    ),
    (
        "nl",
        &[
            "de", "het", "een", "en", "ik", "niet", "van", "dat", "op", "zijn", "met", "voor",
            "maar", "ook", "wij", "jij", "hou",
        ],
    ),
];

/// Characters that strongly hint one Latin language.
const DIACRITIC_HINTS: &[(char, &str)] = &[
    ('ç', "fr"),
    ('œ', "fr"),
    ('ê', "fr"),
    ('è', "fr"),
    ('ñ', "es"),
    ('ß', "de"),
    ('ä', "de"),
    ('ö', "de"),
    ('ü', "de"),
    ('ã', "pt"),
    ('õ', "pt"),
];

/// Determines the dominant language of a text span.
#[derive(Clone, Debug)]
pub struct LanguageDetector {
    default: LanguageTag,
    min_chars: usize,
}

impl LanguageDetector {
    pub fn new(default: LanguageTag, min_chars: usize) -> Self {
        Self { default, min_chars }
    }

    pub fn default_language(&self) -> &LanguageTag {
        &self.default
    }

    /// Detect the dominant language, falling back to the default tag for short
    /// or ambiguous input. Never fails.
    pub fn detect(&self, text: &str) -> LanguageTag {
        let words: Vec<&str> = text
            .split_whitespace()
            .filter(|w| !is_placeholder(w))
            .collect();

        let mut scripts: HashMap<Script, usize> = HashMap::new();
        let mut letters = 0usize;
        for c in words.iter().flat_map(|w| w.chars()) {
            if let Some(script) = Script::of(c) {
                *scripts.entry(script).or_default() += 1;
                letters += 1;
            }
        }

        if letters < self.min_chars {
            return self.default.clone();
        }

        let dominant = scripts
            .iter()
            .max_by_key(|(script, count)| (**count, **script == Script::Latin))
            .map(|(script, _)| *script);

        match dominant {
            // Japanese mixes Han with kana; any kana decides it.
            Some(Script::Han) if scripts.contains_key(&Script::Kana) => LanguageTag::new("ja"),
            Some(Script::Latin) | None => self.detect_latin(&words),
            Some(script) => script
                .language()
                .map(LanguageTag::new)
                .unwrap_or_else(|| self.default.clone()),
        }
    }

    fn detect_latin(&self, words: &[&str]) -> LanguageTag {
        let tokens: Vec<String> = words
            .iter()
            .flat_map(|w| w.split(|c: char| !c.is_alphanumeric()))
            .filter(|t| !t.is_empty())
            .map(|t| t.to_lowercase())
            .collect();

        let mut scores: Vec<(&str, usize)> = LATIN_PROFILES
            .iter()
            .map(|(code, stopwords)| {
                let hits = tokens
                    .iter()
                    .filter(|t| stopwords.contains(&t.as_str()))
                    .count();
                (*code, hits * 2)
            })
            .collect();

        for c in tokens.iter().flat_map(|t| t.chars()) {
            if let Some((_, code)) = DIACRITIC_HINTS.iter().find(|(hint, _)| *hint == c) {
                if let Some(entry) = scores.iter_mut().find(|(lang, _)| lang == code) {
                    entry.1 += 1;
                }
            }
        }

        let best = scores.iter().map(|(_, s)| *s).max().unwrap_or(0);
        if best == 0 {
            return self.default.clone();
        }

        let leaders: Vec<&str> = scores
            .iter()
            .filter(|(_, s)| *s == best)
            .map(|(code, _)| *code)
            .collect();

        if leaders.contains(&self.default.as_str()) {
            return self.default.clone();
        }
        LanguageTag::new(leaders[0])
    }
}

impl Default for LanguageDetector {
    fn default() -> Self {
        Self::new(LanguageTag::new("en"), DEFAULT_MIN_DETECT_CHARS)
    }
}
