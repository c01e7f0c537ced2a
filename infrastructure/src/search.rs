use domain::errors::RagError;
use domain::models::{DocumentRecord, RankedResult};
use rayon::prelude::*;
use std::cmp::Ordering;

pub struct SearchEngine;

impl SearchEngine {
    pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm_a > 0.0 && norm_b > 0.0 {
            let similarity = dot_product / (norm_a * norm_b);
            if similarity.is_finite() {
                return similarity.clamp(-1.0, 1.0);
            }
        }
        0.0
    }

    /// A zero vector stands for a document whose embedding failed.
    pub fn rank<V>(query: &[f32], documents: &[V], k: usize) -> Result<Vec<(usize, f32)>, RagError>
    where
        V: AsRef<[f32]> + Sync,
    {
        Self::rank_with(query, documents, k, |vector| Some(vector.as_ref()))
    }

    /// `Embedding::Unavailable` takes no part in the dimension check.
    pub fn rank_documents<'a>(
        query: &[f32],
        documents: &'a [DocumentRecord],
        k: usize,
    ) -> Result<Vec<RankedResult<'a>>, RagError> {
        let ranked = Self::rank_with(query, documents, k, |doc| doc.embedding.vector())?;
        Ok(ranked
            .into_iter()
            .map(|(index, score)| RankedResult {
                document: &documents[index],
                score,
            })
            .collect())
    }

    fn rank_with<T, F>(
        query: &[f32],
        items: &[T],
        k: usize,
        vector_of: F,
    ) -> Result<Vec<(usize, f32)>, RagError>
    where
        T: Sync,
        F: Fn(&T) -> Option<&[f32]> + Sync,
    {
        if items.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        if let Some(expected) = items
            .iter()
            .filter_map(&vector_of)
            .map(<[f32]>::len)
            .find(|&len| len != query.len())
        {
            return Err(RagError::DimensionMismatch {
                expected,
                actual: query.len(),
            });
        }

        // Vectors with no direction score 0.0 but always trail real matches.
        // A zero query leaves nothing rankable, so corpus order decides.
        let query_has_direction = has_direction(query);
        let mut similarities: Vec<(usize, f32, bool)> = items
            .par_iter()
            .enumerate()
            .map(|(index, item)| match vector_of(item) {
                Some(vector) if query_has_direction && has_direction(vector) => {
                    (index, Self::cosine_similarity(query, vector), true)
                }
                _ => (index, 0.0, false),
            })
            .collect();

        // Stable: ties keep corpus order.
        similarities.sort_by(|a, b| {
            b.2.cmp(&a.2)
                .then_with(|| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal))
        });
        similarities.truncate(k);
        Ok(similarities
            .into_iter()
            .map(|(index, score, _)| (index, score))
            .collect())
    }
}

fn has_direction(vector: &[f32]) -> bool {
    vector.iter().map(|x| x * x).sum::<f32>() > 0.0
}
