//! Reciprocal rank fusion (SPEC_FULL.md §4.3 "Fusion (hybrid mode)").
//!
//! `score(c) = Σ weight/(k0 + rank_i(c))`, summed across the ranked lists
//! that mention `c`. Ties are broken by lexicographically-lower chunk id
//! so identical inputs always produce identical outputs (invariant 8).

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::types::RankedChunk;

pub struct RrfSource<'a> {
    pub ranked: &'a [RankedChunk],
    pub weight: f64,
}

pub fn fuse(sources: &[RrfSource<'_>], k0: f64, limit: i64) -> Vec<RankedChunk> {
    let mut scores: HashMap<String, f64> = HashMap::new();

    for source in sources {
        for (rank, entry) in source.ranked.iter().enumerate() {
            let contribution = source.weight / (k0 + rank as f64 + 1.0);
            *scores.entry(entry.chunk_id.clone()).or_insert(0.0) += contribution;
        }
    }

    let mut fused: Vec<RankedChunk> = scores
        .into_iter()
        .map(|(chunk_id, score)| RankedChunk { chunk_id, score })
        .collect();

    fused.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.chunk_id.cmp(&b.chunk_id))
    });

    if limit >= 0 {
        fused.truncate(limit as usize);
    }
    fused
}

#[cfg(test)]
#[path = "fusion.test.rs"]
mod tests;
