use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::semantic::language::LanguageTag;

/// A post as handed over by the feed pipeline. The engine never fetches
/// content itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PostRef {
    pub post_id: String,
    /// Body text of the post.
    pub text: String,
    /// Text of an embedded/quoted post, if any.
    #[serde(default)]
    pub quoted_text: Option<String>,
}

impl PostRef {
    pub fn new(post_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            post_id: post_id.into(),
            text: text.into(),
            quoted_text: None,
        }
    }

    pub fn with_quote(mut self, quoted: impl Into<String>) -> Self {
        self.quoted_text = Some(quoted.into());
        self
    }
}

/// A post's embedding at rest. `vector` is always unit length.
#[derive(Clone, Debug, PartialEq)]
pub struct VectorRecord {
    pub post_id: String,
    pub language: LanguageTag,
    pub vector: Vec<f32>,
    pub computed_at: DateTime<Utc>,
}

impl VectorRecord {
    pub fn dimensions(&self) -> usize {
        self.vector.len()
    }

    /// True when the record is older than `ttl` at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        now - self.computed_at > ttl
    }
}

/// A ranked retrieval hit.
#[derive(Clone, Debug, PartialEq)]
pub struct Scored {
    pub post_id: String,
    /// Cosine similarity to the query vector.
    pub score: f32,
}

/// Re-normalized mean of liked posts' vectors in one language.
#[derive(Clone, Debug, PartialEq)]
pub struct InterestCentroid {
    pub language: LanguageTag,
    pub vector: Vec<f32>,
    pub sample_count: usize,
}

/// Unit-length embedding of a search string. Never cached.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryVector {
    pub language: LanguageTag,
    pub vector: Vec<f32>,
}

impl From<&InterestCentroid> for QueryVector {
    fn from(centroid: &InterestCentroid) -> Self {
        Self {
            language: centroid.language.clone(),
            vector: centroid.vector.clone(),
        }
    }
}
