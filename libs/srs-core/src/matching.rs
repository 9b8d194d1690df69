//! Similarity scoring of free-text recall against a reference answer.

use tracing::warn;

use crate::error::OracleError;

/// Scores how closely a recalled answer matches the reference answer.
pub trait SimilarityOracle {
    /// Similarity between 0.0 (unrelated) and 1.0 (identical).
    fn similarity(&self, reference: &str, recall: &str) -> Result<f64, OracleError>;
}

/// Character-level edit-distance oracle.
///
/// Both texts are lowercased and their whitespace collapsed before comparison.
#[derive(Debug, Clone, Copy, Default)]
pub struct LevenshteinOracle;

impl SimilarityOracle for LevenshteinOracle {
    fn similarity(&self, reference: &str, recall: &str) -> Result<f64, OracleError> {
        let recall = normalize(recall);
        if recall.is_empty() {
            return Err(OracleError::EmptyAnswer);
        }
        Ok(normalized_similarity(&normalize(reference), &recall))
    }
}

impl<F> SimilarityOracle for F
where
    F: Fn(&str, &str) -> Result<f64, OracleError>,
{
    fn similarity(&self, reference: &str, recall: &str) -> Result<f64, OracleError> {
        self(reference, recall)
    }
}

/// Turn an oracle result into a score the scheduler accepts.
///
/// Errors and scores that are not finite or fall outside [0, 1] are replaced
/// by `fallback`.
pub fn sanitize_similarity(result: Result<f64, OracleError>, fallback: f64) -> f64 {
    match result {
        Ok(score) if score.is_finite() && (0.0..=1.0).contains(&score) => score,
        Ok(score) => {
            warn!(score, fallback, "similarity out of range, using fallback");
            fallback
        }
        Err(e) => {
            warn!(error = %e, fallback, "similarity oracle failed, using fallback");
            fallback
        }
    }
}

/// Lowercase and collapse runs of whitespace.
fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Calculate Levenshtein distance between two strings.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Similarity in [0, 1] derived from Levenshtein distance over characters.
pub fn normalized_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein_distance(a, b) as f64 / max_len as f64
}
