use aho_corasick::{AhoCorasick, BuildError, MatchKind};
use regex::Regex;
use std::sync::LazyLock;

/// Phrases that show up as page chrome on music/event/news sites and carry no content.
pub const DEFAULT_BOILERPLATE_PHRASES: &[&str] = &["Home Store Tour Dates", "Newsletter", "Sign up for"];

static RE_CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\d+\]").expect("citation pattern"));
// Map widgets leak "40.7128; -74.0060" style coordinate pairs into the text.
static RE_COORDINATES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,3}\.\d+;\s*-?\d{1,3}\.\d+").expect("coordinate pattern"));
static RE_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

/// Normalizes scraped text: citation markers, coordinate pairs and boilerplate
/// phrases are removed; whitespace is collapsed and trimmed.
#[derive(Debug, Clone)]
pub struct TextCleaner {
    boilerplate: AhoCorasick,
    blanks: Vec<&'static str>,
}

impl TextCleaner {
    /// Cleaner with the built-in phrase list plus `extra_phrases`.
    pub fn new<I, S>(extra_phrases: I) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut phrases: Vec<String> = DEFAULT_BOILERPLATE_PHRASES
            .iter()
            .map(|p| p.to_string())
            .collect();
        phrases.extend(
            extra_phrases
                .into_iter()
                .map(|p| p.as_ref().to_string())
                .filter(|p| !p.trim().is_empty()),
        );

        let boilerplate = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(&phrases)?;
        let blanks = vec![""; phrases.len()];
        Ok(Self { boilerplate, blanks })
    }

    /// Clean `text`. Never fails; the result may be empty.
    ///
    /// Passes repeat until nothing changes, so `clean(clean(x)) == clean(x)`
    /// holds even when a removal splices together a new match.
    pub fn clean(&self, text: &str) -> String {
        let mut current = self.clean_pass(text);
        loop {
            let next = self.clean_pass(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    fn clean_pass(&self, text: &str) -> String {
        let text = RE_CITATION.replace_all(text, "");
        let text = RE_COORDINATES.replace_all(&text, "");
        let text = self.boilerplate.replace_all(&text, &self.blanks);
        let text = RE_WHITESPACE.replace_all(&text, " ");
        text.trim().to_string()
    }
}
