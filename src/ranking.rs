use crate::error::{BinciError, Result};
use serde::{Deserialize, Serialize};

/// Gain applied to each relevance before discounting
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[allow(non_camel_case_types)]
pub enum DcgMethod {
    /// rel / log2(i + 2)
    standard,
    /// (2^rel - 1) / log2(i + 2)
    industry,
}

fn gain(relevance: f64, method: DcgMethod) -> f64 {
    match method {
        DcgMethod::standard => relevance,
        DcgMethod::industry => relevance.exp2() - 1.0,
    }
}

/// Discounted cumulative gain of the first `k` relevances, in ranked order.
pub fn dcg(relevance: &[f64], k: usize, method: DcgMethod) -> f64 {
    relevance
        .iter()
        .take(k)
        .enumerate()
        .map(|(i, &rel)| gain(rel, method) / ((i + 2) as f64).log2())
        .sum()
}

/// DCG normalised by the DCG of the ideal (descending) ranking; 0 when the
/// ideal DCG is 0.
pub fn ndcg(relevance: &[f64], k: usize, method: DcgMethod) -> f64 {
    let mut ideal = relevance.to_vec();
    ideal.sort_by(|a, b| b.total_cmp(a));
    let idcg = dcg(&ideal, k, method);
    if idcg == 0.0 {
        0.0
    } else {
        dcg(relevance, k, method) / idcg
    }
}

/// Mean nDCG over queries. Queries whose ideal DCG is 0 still count in the
/// denominator.
pub fn avg_ndcg(queries: &[Vec<f64>], k: usize, method: DcgMethod) -> Result<f64> {
    if queries.is_empty() {
        return Err(BinciError::EmptyInput);
    }
    let total: f64 = queries.iter().map(|q| ndcg(q, k, method)).sum();
    Ok(total / queries.len() as f64)
}
