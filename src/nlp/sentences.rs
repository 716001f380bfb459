//! English plain-text tokenization for the summarizer.
//!
//! A document is split into paragraphs on blank lines. Lines written entirely in
//! upper case are headings and never become summary candidates. Each paragraph is
//! then split into sentences with a rule-based boundary detector that knows the
//! common English abbreviations.

use regex::Regex;

/// Lowercased abbreviations (without the final period) that do not end a sentence.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "mt", "ft", "vs", "inc", "ltd", "co",
    "corp", "dept", "est", "approx", "al", "gen", "gov", "sen", "rep", "rev", "lt", "col", "sgt",
    "capt", "cf", "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov",
    "dec",
];
/// Abbreviations only when a number follows ("No. 5", "Fig. 3", "pp. 10").
const NUMERIC_ABBREVIATIONS: &[&str] = &["no", "nos", "vol", "fig", "figs", "p", "pp", "ch", "sec"];

const TERMINATORS: &[char] = &['.', '!', '?'];
const CLOSERS: &[char] = &['"', '\'', '\u{201d}', '\u{2019}', ')', ']'];
const OPENERS: &[char] = &['"', '\'', '\u{201c}', '\u{2018}', '(', '['];

/// Sentence and word tokenizer for English text.
#[derive(Debug, Clone)]
pub struct EnglishTokenizer {
    word_pattern: Regex,
}

impl EnglishTokenizer {
    pub fn new() -> Result<Self, regex::Error> {
        // A word starts with a letter and continues with letters, apostrophes or hyphens.
        let word_pattern = Regex::new(r"[^\W\d_](?:[^\W\d_]|['-])*")?;
        Ok(Self { word_pattern })
    }

    /// Summary candidate sentences of `text`, in document order.
    pub fn document_sentences(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut paragraph = String::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                sentences.extend(self.sentences(&paragraph));
                paragraph.clear();
            } else if is_heading(line) {
                continue;
            } else {
                if !paragraph.is_empty() {
                    paragraph.push(' ');
                }
                paragraph.push_str(line);
            }
        }
        sentences.extend(self.sentences(&paragraph));
        sentences
    }

    /// Split one paragraph into sentences.
    pub fn sentences(&self, paragraph: &str) -> Vec<String> {
        let chars: Vec<(usize, char)> = paragraph.char_indices().collect();
        let mut sentences = Vec::new();
        let mut start = 0usize;
        let mut i = 0usize;

        while i < chars.len() {
            let (_, c) = chars[i];
            if !TERMINATORS.contains(&c) {
                i += 1;
                continue;
            }

            let mut end = i;
            while end + 1 < chars.len() && TERMINATORS.contains(&chars[end + 1].1) {
                end += 1;
            }
            while end + 1 < chars.len() && CLOSERS.contains(&chars[end + 1].1) {
                end += 1;
            }

            let after = end + 1;
            if after < chars.len() && !chars[after].1.is_whitespace() {
                i = after;
                continue;
            }

            let mut next = after;
            while next < chars.len() && chars[next].1.is_whitespace() {
                next += 1;
            }

            let single_period = c == '.' && (i == end || !TERMINATORS.contains(&chars[i + 1].1));
            let next_char = chars.get(next).map(|(_, ch)| *ch);

            let is_break = match next_char {
                None => true,
                Some(nc) => {
                    starts_sentence(nc)
                        && !(single_period && ends_with_abbreviation(&chars[..i], nc))
                }
            };

            if is_break {
                let byte_end = chars
                    .get(after)
                    .map(|(idx, _)| *idx)
                    .unwrap_or(paragraph.len());
                push_sentence(&mut sentences, &paragraph[start..byte_end]);
                start = chars.get(next).map(|(idx, _)| *idx).unwrap_or(paragraph.len());
            }
            i = next.max(i + 1);
        }

        if start < paragraph.len() {
            push_sentence(&mut sentences, &paragraph[start..]);
        }
        sentences
    }

    /// Lowercased word tokens of `sentence`; punctuation and numbers are dropped.
    pub fn words(&self, sentence: &str) -> Vec<String> {
        self.word_pattern
            .find_iter(sentence)
            .map(|m| m.as_str().to_lowercase())
            .collect()
    }
}

fn push_sentence(sentences: &mut Vec<String>, raw: &str) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}

/// A line is a heading when it has cased letters and none of them are lowercase.
fn is_heading(line: &str) -> bool {
    line.chars().any(char::is_uppercase) && !line.chars().any(char::is_lowercase)
}

fn starts_sentence(c: char) -> bool {
    c.is_uppercase() || c.is_ascii_digit() || OPENERS.contains(&c)
}

/// Whether the token just before a period is an abbreviation or an initial.
fn ends_with_abbreviation(before: &[(usize, char)], next_char: char) -> bool {
    let token: String = before
        .iter()
        .rev()
        .take_while(|(_, ch)| !ch.is_whitespace())
        .map(|(_, ch)| *ch)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .skip_while(|ch| OPENERS.contains(ch))
        .collect();
    if token.is_empty() {
        return false;
    }

    let mut letters = token.chars();
    if let (Some(only), None) = (letters.next(), letters.next()) {
        return only.is_alphabetic() && only.is_uppercase();
    }

    let lower = token.to_lowercase();
    if ABBREVIATIONS.contains(&lower.as_str()) {
        return true;
    }
    if NUMERIC_ABBREVIATIONS.contains(&lower.as_str()) && next_char.is_ascii_digit() {
        return true;
    }
    is_dotted_acronym(&lower)
}

/// `u.s`, `e.g`, `i.e`, `a.m`: single letters separated by periods.
fn is_dotted_acronym(token: &str) -> bool {
    let parts: Vec<&str> = token.split('.').collect();
    parts.len() >= 2
        && parts
            .iter()
            .all(|p| p.chars().count() == 1 && p.chars().all(char::is_alphabetic))
}
