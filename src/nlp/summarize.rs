use super::sentences::EnglishTokenizer;
use super::svd::{truncated_svd, MatrixOperator};
use crate::core::config::SummaryConfig;
use ndarray::{Array1, ArrayView1};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// Fewest latent dimensions used for ranking, however few singular values there are.
const MIN_DIMENSIONS: usize = 3;
/// Floor every term weight in a non-empty sentence is lifted to.
const TERM_SMOOTHING: f64 = 0.4;

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself",
    "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just",
    "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once",
    "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours", "yourself",
    "yourselves",
];

/// Extractive summarizer based on latent semantic analysis.
///
/// Sentences are columns of a smoothed term-frequency matrix; each sentence is
/// ranked by the length of its row of `V` weighted by the squared singular
/// values of the leading dimensions. The best `sentence_count` sentences are
/// returned in the order they appear in the text.
///
/// When every dimension is kept the rank is the sentence vector's length, so
/// no decomposition runs. CPU bound; call it off the async runtime.
#[derive(Debug, Clone)]
pub struct Summarizer {
    tokenizer: EnglishTokenizer,
    sentence_count: usize,
    min_chars: usize,
    reduction_ratio: f64,
    stop_words: HashSet<&'static str>,
}

impl Summarizer {
    /// English summarizer with default settings. Fails only if the tokenizer cannot be built.
    pub fn english() -> Result<Self, regex::Error> {
        Self::from_config(&SummaryConfig::default())
    }

    pub fn from_config(config: &SummaryConfig) -> Result<Self, regex::Error> {
        let stop_words = if config.resolve_use_stop_words() {
            STOP_WORDS.iter().copied().collect()
        } else {
            HashSet::new()
        };
        Ok(Self {
            tokenizer: EnglishTokenizer::new()?,
            sentence_count: config.resolve_sentences(),
            min_chars: config.resolve_min_chars(),
            reduction_ratio: 1.0,
            stop_words,
        })
    }

    /// Keep only the leading `ratio` share of latent dimensions when ranking.
    pub fn with_reduction_ratio(mut self, ratio: f64) -> Self {
        self.reduction_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    pub fn sentence_count(&self) -> usize {
        self.sentence_count
    }

    /// Up to `sentence_count` sentences of `text`, in document order.
    ///
    /// Text shorter than the minimum length yields an empty summary.
    pub fn summarize(&self, text: &str) -> Vec<String> {
        if text.chars().count() < self.min_chars {
            return Vec::new();
        }

        let sentences = self.tokenizer.document_sentences(text);
        if sentences.is_empty() || self.sentence_count == 0 {
            return Vec::new();
        }

        let words: Vec<Vec<String>> = sentences.iter().map(|s| self.tokenizer.words(s)).collect();
        let dictionary = self.build_dictionary(&words);
        if dictionary.is_empty() {
            return Vec::new();
        }
        if dictionary.len() < sentences.len() {
            warn!(
                "Number of words ({}) is lower than number of sentences ({}); LSA ranking may be weak",
                dictionary.len(),
                sentences.len()
            );
        }

        let matrix = term_frequency_matrix(&dictionary, &words);
        let ranks = self.rank_sentences(&matrix);
        debug!(
            "LSA ranked {} sentences over {} terms",
            sentences.len(),
            dictionary.len()
        );

        select_best(sentences, &ranks, self.sentence_count)
    }

    fn build_dictionary(&self, words: &[Vec<String>]) -> BTreeMap<String, usize> {
        let mut unique: Vec<&str> = words
            .iter()
            .flatten()
            .map(String::as_str)
            .filter(|w| !self.stop_words.contains(*w))
            .collect();
        unique.sort_unstable();
        unique.dedup();
        unique
            .into_iter()
            .enumerate()
            .map(|(row, word)| (word.to_string(), row))
            .collect()
    }

    fn rank_sentences(&self, matrix: &TermMatrix) -> Vec<f64> {
        let k = matrix.nrows().min(matrix.ncols());
        let dimensions = MIN_DIMENSIONS.max((k as f64 * self.reduction_ratio) as usize);
        if dimensions >= k {
            return (0..matrix.ncols())
                .map(|sentence| matrix.column_norm_squared(sentence).sqrt())
                .collect();
        }

        let svd = truncated_svd(matrix, dimensions);
        let powered: Vec<f64> = svd.singular_values.iter().map(|s| s * s).collect();
        (0..matrix.ncols())
            .map(|sentence| {
                powered
                    .iter()
                    .enumerate()
                    .map(|(i, weight)| weight * svd.v[[sentence, i]].powi(2))
                    .sum::<f64>()
                    .sqrt()
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
struct TermColumn {
    /// `(term row, weight)` for the terms the sentence contains.
    weights: Vec<(usize, f64)>,
    /// Weight of every other term row.
    floor: f64,
}

/// Terms × sentences matrix stored by sentence. Rows a sentence does not
/// contain all share the column floor, so only contained terms are stored.
#[derive(Debug, Clone)]
struct TermMatrix {
    terms: usize,
    columns: Vec<TermColumn>,
}

impl TermMatrix {
    fn column_norm_squared(&self, col: usize) -> f64 {
        let column = &self.columns[col];
        let stored: f64 = column.weights.iter().map(|(_, w)| w * w).sum();
        let implicit = (self.terms - column.weights.len()) as f64;
        stored + column.floor * column.floor * implicit
    }

    #[cfg(test)]
    fn get(&self, row: usize, col: usize) -> f64 {
        let column = &self.columns[col];
        column
            .weights
            .iter()
            .find(|(r, _)| *r == row)
            .map(|(_, w)| *w)
            .unwrap_or(column.floor)
    }

    #[cfg(test)]
    fn to_dense(&self) -> ndarray::Array2<f64> {
        ndarray::Array2::from_shape_fn((self.terms, self.columns.len()), |(r, c)| self.get(r, c))
    }
}

impl MatrixOperator for TermMatrix {
    fn nrows(&self) -> usize {
        self.terms
    }

    fn ncols(&self) -> usize {
        self.columns.len()
    }

    fn mul_vec(&self, x: ArrayView1<'_, f64>) -> Array1<f64> {
        let base: f64 = self.columns.iter().zip(x.iter()).map(|(c, xj)| c.floor * xj).sum();
        let mut y = Array1::from_elem(self.terms, base);
        for (column, xj) in self.columns.iter().zip(x.iter()) {
            for &(row, w) in &column.weights {
                y[row] += (w - column.floor) * xj;
            }
        }
        y
    }

    fn mul_transpose_vec(&self, y: ArrayView1<'_, f64>) -> Array1<f64> {
        let total = y.sum();
        self.columns
            .iter()
            .map(|column| {
                column.floor * total
                    + column
                        .weights
                        .iter()
                        .map(|&(row, w)| (w - column.floor) * y[row])
                        .sum::<f64>()
            })
            .collect()
    }
}

/// Smoothed term frequencies: every weight in a non-empty sentence lies in
/// `[0.4, 1.0]`, and empty sentences are all zero.
fn term_frequency_matrix(dictionary: &BTreeMap<String, usize>, words: &[Vec<String>]) -> TermMatrix {
    let columns = words
        .iter()
        .map(|sentence_words| {
            let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
            for word in sentence_words {
                if let Some(&row) = dictionary.get(word) {
                    *counts.entry(row).or_default() += 1.0;
                }
            }
            let max = counts.values().copied().fold(0.0_f64, f64::max);
            if max == 0.0 {
                return TermColumn::default();
            }
            TermColumn {
                weights: counts
                    .into_iter()
                    .map(|(row, count)| (row, TERM_SMOOTHING + (1.0 - TERM_SMOOTHING) * count / max))
                    .collect(),
                floor: TERM_SMOOTHING,
            }
        })
        .collect();

    TermMatrix {
        terms: dictionary.len(),
        columns,
    }
}

/// Top `count` sentences by rank (ties keep document order), returned in document order.
fn select_best(sentences: Vec<String>, ranks: &[f64], count: usize) -> Vec<String> {
    let mut order: Vec<usize> = (0..sentences.len()).collect();
    order.sort_by(|&a, &b| ranks[b].total_cmp(&ranks[a]));
    order.truncate(count);
    order.sort_unstable();

    let mut sentences: Vec<Option<String>> = sentences.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|i| sentences[i].take())
        .collect()
}
