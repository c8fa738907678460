use crate::config::Number;
use crate::index::VectorSpaceModel;
use crate::vector_ops::compute_cosine_similarity_simd;
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;

/// One ranked retrieval result. `index` is the sentence's corpus position,
/// which stays stable for the session.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievalHit {
    pub index: usize,
    pub sentence: String,
    pub score: Number,
}

/// Rank every corpus sentence against `query` and return the best `top_k`.
///
/// Ordering is descending similarity; exactly equal scores fall back to
/// ascending corpus index, so rankings are deterministic and an empty query
/// (all scores 0) comes back in corpus order. `top_k` beyond the corpus size
/// clamps to the corpus size.
pub fn retrieve(
    query: &str,
    model: &VectorSpaceModel,
    corpus: &[String],
    top_k: usize,
) -> Vec<RetrievalHit> {
    let query_vector = model.transform(query);

    let mut hits: Vec<RetrievalHit> = model
        .rows()
        .par_iter()
        .enumerate()
        .map(|(index, row)| {
            let score = compute_cosine_similarity_simd(&query_vector, row).unwrap_or(0.0);
            RetrievalHit {
                index,
                sentence: corpus[index].clone(),
                score,
            }
        })
        .collect();

    hits.sort_unstable_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then(a.index.cmp(&b.index))
    });
    hits.truncate(top_k);
    hits
}
