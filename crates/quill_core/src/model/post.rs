//! Post domain model.
//!
//! # Responsibility
//! - Define the full post record plus its create/update/summary projections.
//! - Derive the excerpt used by listing and search results.
//!
//! # Invariants
//! - `id` is stable and never reused for another post.
//! - `created_at` is store-assigned at insert time and never mutated.
//! - An update patch only overwrites fields that are present.

use super::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a post.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type PostId = Uuid;

/// Excerpts keep at most this many characters of content.
pub const EXCERPT_MAX_CHARS: usize = 150;

/// Full post record returned by single-post lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Stable global ID.
    pub id: PostId,
    pub title: String,
    pub content: String,
    /// Creation time in epoch milliseconds, assigned by the store.
    pub created_at: i64,
    /// Associated tag names in association insertion order.
    pub tags: Vec<String>,
}

/// Reduced post representation for listing and search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: PostId,
    pub title: String,
    /// Content truncated to [`EXCERPT_MAX_CHARS`] characters.
    pub excerpt: String,
    pub created_at: i64,
    pub tags: Vec<String>,
}

/// Input for creating a post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    /// Tag names to associate; blank entries are silently discarded and
    /// duplicates collapse to one association.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewPost {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
        }
    }

    /// Adds tag names to associate on create.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Checks create input before any store write.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.content.is_empty() {
            return Err(ValidationError::EmptyContent);
        }
        Ok(())
    }
}

/// Partial update for a post.
///
/// Merge rule: a present field overwrites, an absent field preserves the
/// stored value. `tags: Some(..)` replaces the entire association set, even
/// when the new list is empty; `tags: None` leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl PostPatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Checks patch input before any store write.
    ///
    /// A present-but-empty `title`/`content` is rejected so stored posts
    /// never lose the non-empty invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.as_deref() == Some("") {
            return Err(ValidationError::EmptyTitle);
        }
        if self.content.as_deref() == Some("") {
            return Err(ValidationError::EmptyContent);
        }
        Ok(())
    }
}

/// Derives the summary excerpt from full post content.
///
/// Content up to [`EXCERPT_MAX_CHARS`] characters is returned unchanged;
/// longer content is cut to the first [`EXCERPT_MAX_CHARS`] characters with
/// an `...` marker appended.
pub fn derive_excerpt(content: &str) -> String {
    let mut chars = content.chars();
    let mut excerpt: String = chars.by_ref().take(EXCERPT_MAX_CHARS).collect();
    if chars.next().is_some() {
        excerpt.push_str("...");
    }
    excerpt
}

#[cfg(test)]
mod tests {
    use super::{derive_excerpt, NewPost, PostPatch, EXCERPT_MAX_CHARS};
    use crate::model::ValidationError;

    #[test]
    fn excerpt_keeps_content_at_exactly_150_chars() {
        let content = "x".repeat(EXCERPT_MAX_CHARS);
        assert_eq!(derive_excerpt(&content), content);
    }

    #[test]
    fn excerpt_truncates_151_chars_and_appends_marker() {
        let content = "x".repeat(EXCERPT_MAX_CHARS + 1);
        let excerpt = derive_excerpt(&content);
        assert_eq!(excerpt.chars().count(), EXCERPT_MAX_CHARS + 3);
        assert!(excerpt.ends_with("..."));
    }

    #[test]
    fn excerpt_counts_characters_not_bytes() {
        let content = "é".repeat(EXCERPT_MAX_CHARS + 10);
        let excerpt = derive_excerpt(&content);
        assert_eq!(excerpt.chars().count(), EXCERPT_MAX_CHARS + 3);
    }

    #[test]
    fn new_post_validation_rejects_empty_fields() {
        let no_title = NewPost::new("", "body");
        assert_eq!(no_title.validate(), Err(ValidationError::EmptyTitle));

        let no_content = NewPost::new("title", "");
        assert_eq!(no_content.validate(), Err(ValidationError::EmptyContent));

        let valid = NewPost::new("title", "body");
        assert_eq!(valid.validate(), Ok(()));
    }

    #[test]
    fn patch_validation_rejects_present_but_empty_fields() {
        let empty_title = PostPatch::default().title("");
        assert_eq!(empty_title.validate(), Err(ValidationError::EmptyTitle));

        let absent_fields = PostPatch::default();
        assert_eq!(absent_fields.validate(), Ok(()));
    }

    #[test]
    fn summary_serializes_created_at_in_camel_case() {
        let summary = super::PostSummary {
            id: uuid::Uuid::nil(),
            title: "t".to_string(),
            excerpt: "e".to_string(),
            created_at: 1000,
            tags: vec!["rust".to_string()],
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["createdAt"], 1000);
    }
}
