use crate::{DocumentId, TermDocMatrix};

/// A document and its similarity to the query, in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedDocument {
    pub doc_id: DocumentId,
    pub score: f64,
}

/// Cosine of the angle between `a` and `b`; 0 when either has zero norm.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    (dot / (na * nb)).clamp(-1.0, 1.0)
}

/// Binary vector over the matrix vocabulary: 1.0 at each matched term's column.
pub fn query_vector(matrix: &TermDocMatrix, terms: &[String]) -> Vec<f64> {
    let mut q = vec![0.0; matrix.num_terms()];
    for term in terms {
        if let Some(col) = matrix.vocabulary().column(term) {
            q[col] = 1.0;
        }
    }
    q
}

/// Score every document against the query terms and sort by descending score.
///
/// The query side is unweighted presence/absence. Ties keep matrix row order.
pub fn rank(matrix: &TermDocMatrix, terms: &[String]) -> Vec<RankedDocument> {
    let q = query_vector(matrix, terms);
    let mut ranked: Vec<RankedDocument> = matrix
        .rows()
        .map(|(id, row)| RankedDocument { doc_id: id.clone(), score: cosine_similarity(&q, row) })
        .collect();
    // sort_by is stable.
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}
