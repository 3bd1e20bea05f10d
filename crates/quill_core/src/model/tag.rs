//! Tag domain model.
//!
//! # Responsibility
//! - Define the tag record with its usage count projection.
//! - Normalize raw tag name input for write paths.
//!
//! # Invariants
//! - Tag identity is the trimmed name: one id per distinct trimmed name.
//! - Blank names never reach storage.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a tag.
pub type TagId = Uuid;

/// Tag record with the number of posts currently labeled by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    /// Posts currently associated; zero when unused.
    pub count: i64,
}

/// Normalizes one raw tag name: trims surrounding whitespace and drops
/// blank results.
pub fn normalize_tag_name(name: &str) -> Option<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_tag_name;

    #[test]
    fn normalize_trims_surrounding_whitespace() {
        assert_eq!(normalize_tag_name("  rust  "), Some("rust"));
    }

    #[test]
    fn normalize_drops_blank_names() {
        assert_eq!(normalize_tag_name(""), None);
        assert_eq!(normalize_tag_name("   "), None);
    }

    #[test]
    fn normalize_preserves_case_and_inner_whitespace() {
        assert_eq!(normalize_tag_name(" Systems Rust "), Some("Systems Rust"));
    }
}
