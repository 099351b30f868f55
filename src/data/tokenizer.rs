// ============================================================
// Layer 4 — Message Tokenizer
// ============================================================
// Turns a raw message into the token sequence the vectorizer
// counts.
//
// Steps (applied in order):
//   1. Lowercase
//   2. Replace every character outside [a-z0-9] with a space
//   3. Split on runs of whitespace
//   4. Lemmatize each token as a noun, trim it, then lemmatize
//      that result as a verb; keep the verb form
//
// Duplicates are kept, and nothing produced by step 4 is
// filtered out. Input with no [a-z0-9] at all gives an empty
// list, never empty-string tokens. The tokenizer has no learned state, so it is
// Copy and can be rebuilt freely after deserialisation.
//
// Reference: Rust Book §8 (Strings in Rust)
//            regex crate documentation

use once_cell::sync::Lazy;
use regex::Regex;

use crate::data::lemmatizer::{self, Lemmatizer, PartOfSpeech};

static NON_ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]").expect("static pattern compiles"));

#[derive(Debug, Clone, Copy)]
pub struct Tokenizer {
    lemmatizer: &'static Lemmatizer,
}

impl Tokenizer {
    /// Tokenizer backed by the process-wide lexical resources.
    pub fn new() -> Self {
        Self { lemmatizer: lemmatizer::global() }
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let cleaned = NON_ALPHANUMERIC.replace_all(&lowered, " ");

        cleaned
            .split_whitespace()
            .map(|token| {
                let noun = self.lemmatizer.lemmatize(token, PartOfSpeech::Noun);
                self.lemmatizer.lemmatize(noun.trim(), PartOfSpeech::Verb)
            })
            .collect()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_punctuation_and_case_are_removed() {
        let t = Tokenizer::new();
        let l = lemmatizer::global();
        let expected: Vec<String> = ["hello", "world", "123"]
            .iter()
            .map(|w| l.lemmatize(&l.lemmatize(w, PartOfSpeech::Noun), PartOfSpeech::Verb))
            .collect();
        assert_eq!(t.tokenize("Hello, World! 123"), expected);
        assert_eq!(t.tokenize("Hello, World! 123"), vec!["hello", "world", "123"]);
    }

    #[test]
    fn test_is_deterministic() {
        let t = Tokenizer::new();
        let text = "We need tents and water; the houses were flooded!!";
        assert_eq!(t.tokenize(text), t.tokenize(text));
    }

    #[test]
    fn test_lemmatizes_nouns_then_verbs() {
        let t = Tokenizer::new();
        assert_eq!(
            t.tokenize("Houses were FLOODED"),
            vec!["house", "be", "flood"]
        );
    }

    #[test]
    fn test_keeps_duplicates() {
        let t = Tokenizer::new();
        assert_eq!(t.tokenize("help help help"), vec!["help", "help", "help"]);
    }

    #[test]
    fn test_only_punctuation_gives_no_tokens() {
        let t = Tokenizer::new();
        assert!(t.tokenize("?!...,;").is_empty());
        assert!(t.tokenize("!!! ... ???").is_empty());
        assert!(t.tokenize("").is_empty());
    }

    #[test]
    fn test_punctuation_runs_never_yield_empty_tokens() {
        let t = Tokenizer::new();
        let tokens = t.tokenize("flood !!! -- water ...");
        assert_eq!(tokens, vec!["flood", "water"]);
        assert!(tokens.iter().all(|tok| !tok.is_empty()));
    }

    #[test]
    fn test_non_ascii_letters_become_separators() {
        let t = Tokenizer::new();
        assert_eq!(t.tokenize("café-au-lait"), vec!["caf", "au", "lait"]);
    }
}
