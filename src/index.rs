use crate::config::Number;
use crate::vector_ops::normalize_vector;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("cannot fit a vector space over an empty corpus")]
    EmptyCorpus,
}

/// The fitted term-vocabulary and weighting state: term → column mapping,
/// per-term idf weights, and one weighted row per corpus sentence (row i
/// belongs to sentence i). Read-only once `fit` returns.
pub struct VectorSpaceModel {
    vocabulary: HashMap<String, usize>,
    idf: Vec<Number>,
    matrix: Vec<Vec<Number>>,
}

impl VectorSpaceModel {
    /// Fit a tf-idf space over the corpus. Vocabulary columns are assigned
    /// in first-seen order; idf(term) = ln(N / df(term)). Rows are
    /// L2-normalized once here so similarity scans work on unit vectors.
    ///
    /// A single-sentence corpus is valid: every idf collapses to ln(1) = 0
    /// and the model is under-informative but well-formed.
    pub fn fit(corpus: &[String]) -> Result<Self, IndexError> {
        if corpus.is_empty() {
            return Err(IndexError::EmptyCorpus);
        }

        let tokenized: Vec<Vec<String>> = corpus.iter().map(|s| tokenize(s)).collect();

        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        for tokens in &tokenized {
            for token in tokens {
                if !vocabulary.contains_key(token) {
                    vocabulary.insert(token.clone(), vocabulary.len());
                }
            }
        }

        let mut doc_freq = vec![0usize; vocabulary.len()];
        for tokens in &tokenized {
            let mut seen = HashSet::new();
            for token in tokens {
                if seen.insert(token.as_str()) {
                    doc_freq[vocabulary[token]] += 1;
                }
            }
        }

        let n = corpus.len() as Number;
        let idf: Vec<Number> = doc_freq.iter().map(|&df| (n / df as Number).ln()).collect();

        let matrix = tokenized
            .iter()
            .map(|tokens| {
                let mut row = vec![0.0; vocabulary.len()];
                for token in tokens {
                    row[vocabulary[token]] += 1.0;
                }
                for (column, weight) in row.iter_mut().enumerate() {
                    *weight *= idf[column];
                }
                normalize_vector(&mut row);
                row
            })
            .collect();

        Ok(Self {
            vocabulary,
            idf,
            matrix,
        })
    }

    /// Project arbitrary text into the fitted space. Tokens outside the
    /// fitted vocabulary contribute nothing; an all-unknown (or empty) query
    /// maps to the zero vector.
    pub fn transform(&self, text: &str) -> Vec<Number> {
        let mut row = vec![0.0; self.vocabulary.len()];
        for token in tokenize(text) {
            if let Some(&column) = self.vocabulary.get(&token) {
                row[column] += 1.0;
            }
        }
        for (column, weight) in row.iter_mut().enumerate() {
            *weight *= self.idf[column];
        }
        normalize_vector(&mut row);
        row
    }

    pub fn rows(&self) -> &[Vec<Number>] {
        &self.matrix
    }

    pub fn row_count(&self) -> usize {
        self.matrix.len()
    }

    pub fn dimensions(&self) -> usize {
        self.vocabulary.len()
    }
}

/// Case-insensitive word tokenization: lowercase, split on anything that is
/// not alphanumeric, drop empties. Fit and transform share this exact path.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
