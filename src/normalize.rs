// src/normalize.rs
//! Text normalizer: lowercase, punctuation stripping, whitespace tokenization,
//! stop-word and short-token filtering.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

static SPANISH: Lazy<HashSet<String>> = Lazy::new(|| load_list(include_str!("../stopwords/spanish.txt")));
static ENGLISH: Lazy<HashSet<String>> = Lazy::new(|| load_list(include_str!("../stopwords/english.txt")));

/// Tokens with this many characters or fewer are dropped.
pub const MAX_SHORT_TOKEN_CHARS: usize = 2;

/// Characters removed before tokenization. ASCII punctuation plus the
/// Spanish inverted marks, guillemets, typographic quotes and the ellipsis.
pub const PUNCTUATION: &[char] = &[
    '!', '"', '#', '$', '%', '&', '\'', '(', ')', '*', '+', ',', '-', '.', '/', ':', ';', '<',
    '=', '>', '?', '@', '[', '\\', ']', '^', '_', '`', '{', '|', '}', '~', '¡', '¿', '«', '»',
    '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}', '\u{2026}',
];

/// Language used for stop-word filtering. Fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Spanish,
    English,
}

impl Language {
    fn stop_words(self) -> &'static HashSet<String> {
        match self {
            Language::Spanish => &SPANISH,
            Language::English => &ENGLISH,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Spanish => f.write_str("spanish"),
            Language::English => f.write_str("english"),
        }
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spanish" | "es" | "español" => Ok(Language::Spanish),
            "english" | "en" => Ok(Language::English),
            other => anyhow::bail!("unsupported stop-word language: {other}"),
        }
    }
}

fn load_list(raw: &str) -> HashSet<String> {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

#[inline]
fn is_punctuation(c: char) -> bool {
    PUNCTUATION.contains(&c)
}

/// Lowercase a raw whitespace-delimited chunk and drop its punctuation.
fn clean_token(raw: &str) -> String {
    raw.chars()
        .filter(|c| !is_punctuation(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone)]
pub struct TextNormalizer {
    language: Language,
    stop_words: &'static HashSet<String>,
}

impl TextNormalizer {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            stop_words: language.stop_words(),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    /// Returns a lazy token sequence. The iterator is `Clone`, so it can be
    /// restarted; calling `normalize` again yields the same tokens.
    ///
    /// Empty or all-stop-word text yields an empty sequence, which callers
    /// treat as "no data".
    pub fn normalize<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + Clone + 'a {
        text.split_whitespace()
            .map(clean_token)
            .filter(move |t| self.keep(t))
    }

    fn keep(&self, token: &str) -> bool {
        token.chars().count() > MAX_SHORT_TOKEN_CHARS && !self.is_stop_word(token)
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new(Language::default())
    }
}
