//! Similarity ranking over caller-supplied candidates.
//!
//! Pure functions: the engine hydrates candidate records, these score them.
//! Only candidates with the query's language and dimensionality are compared.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::semantic::language::LanguageTag;
use crate::semantic::types::{InterestCentroid, Scored, VectorRecord};
use crate::semantic::vector::{self, VectorError};

/// Ranking parameters.
#[derive(Debug, Clone, Copy)]
pub struct RankOptions<'a> {
    pub top_k: usize,
    /// Candidates scoring below this are dropped before `top_k` applies.
    pub min_score: Option<f32>,
    /// Post id never returned (the subject of a related-posts query).
    pub exclude: Option<&'a str>,
}

impl<'a> RankOptions<'a> {
    pub fn top(top_k: usize) -> Self {
        Self {
            top_k,
            min_score: None,
            exclude: None,
        }
    }
}

/// Score `candidates` against a unit-length `query` in `language`.
///
/// Results are sorted by descending score, ties broken by newer
/// `computed_at` first, then by post id.
pub fn rank(
    query: &[f32],
    language: &LanguageTag,
    candidates: &[Arc<VectorRecord>],
    options: RankOptions<'_>,
) -> Vec<Scored> {
    if options.top_k == 0 {
        return Vec::new();
    }

    let mut scored: Vec<(f32, &VectorRecord)> = candidates
        .iter()
        .map(|record| record.as_ref())
        .filter(|record| &record.language == language)
        .filter(|record| options.exclude != Some(record.post_id.as_str()))
        .filter_map(|record| match vector::dot(query, &record.vector) {
            Ok(score) => Some((score, record)),
            Err(VectorError::DimensionMismatch { expected, got }) => {
                log::trace!(
                    "skipping {}: {got} dims vs query {expected}",
                    record.post_id
                );
                None
            }
            Err(_) => None,
        })
        .filter(|(score, _)| !score.is_nan())
        .filter(|(score, _)| options.min_score.map(|min| *score >= min).unwrap_or(true))
        .collect();

    scored.sort_by(|(score_a, a), (score_b, b)| {
        score_b
            .partial_cmp(score_a)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.computed_at.cmp(&a.computed_at))
            .then_with(|| a.post_id.cmp(&b.post_id))
    });

    scored
        .into_iter()
        .take(options.top_k)
        .map(|(score, record)| Scored {
            post_id: record.post_id.clone(),
            score,
        })
        .collect()
}

/// Average the vectors of `liked` records in `language` and re-normalize.
///
/// Returns `None` when no liked record matches the language, or when the
/// matching vectors cancel out.
pub fn centroid(liked: &[Arc<VectorRecord>], language: &LanguageTag) -> Option<InterestCentroid> {
    let matching: Vec<&VectorRecord> = liked
        .iter()
        .map(|record| record.as_ref())
        .filter(|record| &record.language == language)
        .collect();

    let first = matching.first()?;
    let dimensions = first.dimensions();

    // Records of another dimensionality come from another model.
    let same_dims: Vec<&[f32]> = matching
        .iter()
        .filter(|record| record.dimensions() == dimensions)
        .map(|record| record.vector.as_slice())
        .collect();
    let sample_count = same_dims.len();

    let mut mean = match vector::mean(same_dims) {
        Ok(Some(mean)) => mean,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("cannot average liked vectors: {e}");
            return None;
        }
    };

    if vector::normalize(&mut mean).is_err() {
        log::debug!("liked vectors for '{language}' cancel out, no centroid");
        return None;
    }

    Some(InterestCentroid {
        language: language.clone(),
        vector: mean,
        sample_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(id: &str, lang: &str, vector: Vec<f32>, secs: i64) -> Arc<VectorRecord> {
        let mut vector = vector;
        vector::normalize(&mut vector).unwrap();
        Arc::new(VectorRecord {
            post_id: id.to_string(),
            language: LanguageTag::new(lang),
            vector,
            computed_at: Utc.timestamp_opt(secs, 0).unwrap(),
        })
    }

    fn en() -> LanguageTag {
        LanguageTag::new("en")
    }

    #[test]
    fn test_rank_descending() {
        let candidates = vec![
            record("far", "en", vec![0.0, 1.0, 0.0], 0),
            record("near", "en", vec![1.0, 0.1, 0.0], 0),
            record("mid", "en", vec![1.0, 1.0, 0.0], 0),
        ];

        let results = rank(&[1.0, 0.0, 0.0], &en(), &candidates, RankOptions::top(10));
        let ids: Vec<&str> = results.iter().map(|r| r.post_id.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid", "far"]);
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_rank_language_isolation() {
        let candidates = vec![
            record("en1", "en", vec![1.0, 0.0], 0),
            record("fr1", "fr", vec![1.0, 0.0], 0),
        ];

        let results = rank(&[1.0, 0.0], &en(), &candidates, RankOptions::top(10));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].post_id, "en1");
    }

    #[test]
    fn test_rank_ties_prefer_recent() {
        let candidates = vec![
            record("older", "en", vec![1.0, 0.0], 100),
            record("newer", "en", vec![1.0, 0.0], 200),
            record("b-same", "en", vec![1.0, 0.0], 150),
            record("a-same", "en", vec![1.0, 0.0], 150),
        ];

        let results = rank(&[1.0, 0.0], &en(), &candidates, RankOptions::top(10));
        let ids: Vec<&str> = results.iter().map(|r| r.post_id.as_str()).collect();
        assert_eq!(ids, vec!["newer", "a-same", "b-same", "older"]);
    }

    #[test]
    fn test_rank_min_score_excludes_entirely() {
        let candidates = vec![
            record("a", "en", vec![1.0, 1.0], 0),
            record("b", "en", vec![0.0, 1.0], 0),
        ];

        let options = RankOptions {
            top_k: 5,
            min_score: Some(0.9),
            exclude: None,
        };
        assert!(rank(&[1.0, 0.0], &en(), &candidates, options).is_empty());
    }

    #[test]
    fn test_rank_excludes_subject_and_other_dims() {
        let candidates = vec![
            record("self", "en", vec![1.0, 0.0], 0),
            record("wide", "en", vec![1.0, 0.0, 0.0], 0),
            record("other", "en", vec![0.5, 0.5], 0),
        ];

        let options = RankOptions {
            top_k: 5,
            min_score: None,
            exclude: Some("self"),
        };
        let results = rank(&[1.0, 0.0], &en(), &candidates, options);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].post_id, "other");
    }

    #[test]
    fn test_rank_top_k() {
        let candidates: Vec<_> = (0..10)
            .map(|i| record(&format!("p{i}"), "en", vec![1.0, i as f32 * 0.1], 0))
            .collect();
        assert_eq!(rank(&[1.0, 0.0], &en(), &candidates, RankOptions::top(3)).len(), 3);
        assert!(rank(&[1.0, 0.0], &en(), &candidates, RankOptions::top(0)).is_empty());
    }

    #[test]
    fn test_centroid_normalized_average() {
        let liked = vec![
            record("a", "en", vec![1.0, 0.0], 0),
            record("b", "en", vec![0.0, 1.0], 0),
            record("c", "fr", vec![-1.0, 0.0], 0),
        ];

        let centroid = centroid(&liked, &en()).unwrap();
        assert_eq!(centroid.sample_count, 2);
        assert!((vector::l2_norm(&centroid.vector) - 1.0).abs() < 1e-5);
        assert!((centroid.vector[0] - centroid.vector[1]).abs() < 1e-6);
    }

    #[test]
    fn test_centroid_none_without_matches() {
        assert!(centroid(&[], &en()).is_none());

        let liked = vec![record("c", "fr", vec![1.0, 0.0], 0)];
        assert!(centroid(&liked, &en()).is_none());
    }

    #[test]
    fn test_centroid_cancelling_vectors() {
        let liked = vec![
            record("a", "en", vec![1.0, 0.0], 0),
            record("b", "en", vec![-1.0, 0.0], 0),
        ];
        assert!(centroid(&liked, &en()).is_none());
    }
}
