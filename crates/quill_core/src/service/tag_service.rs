//! Tag use-case service.
//!
//! # Responsibility
//! - Provide tag create/list/rename/delete APIs for host layers.
//! - Expose the tag cloud projection (usage counts, popularity order).
//!
//! # Invariants
//! - Tag creation converges on one id per trimmed name.
//! - Deleting a tag never deletes posts, only associations.

use crate::model::post::PostId;
use crate::model::tag::{Tag, TagId};
use crate::model::ValidationError;
use crate::repo::tag_repo::TagRepository;
use crate::repo::{RepoError, RepoResult};
use log::error;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for tag use-cases.
#[derive(Debug)]
pub enum TagServiceError {
    /// Rejected input; nothing was written.
    Validation(ValidationError),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for TagServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent tag state: {details}")
            }
        }
    }
}

impl Error for TagServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::InconsistentState(_) => None,
        }
    }
}

impl From<RepoError> for TagServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Tag service facade over repository implementations.
pub struct TagService<R: TagRepository> {
    repo: R,
}

impl<R: TagRepository> TagService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Resolves a name to its tag, creating it on first use, and returns
    /// the read-back record.
    pub fn create_tag(&mut self, name: &str) -> Result<Tag, TagServiceError> {
        let tag_id = run("create_tag", self.repo.resolve_or_create(name))?;
        run("create_tag", self.repo.get_tag(tag_id))?.ok_or(TagServiceError::InconsistentState(
            "created tag not found in read-back",
        ))
    }

    /// Lists every tag with usage count, most-used first, ties by name.
    pub fn list_tags(&self) -> Result<Vec<Tag>, TagServiceError> {
        run("list_tags", self.repo.list_tags())
    }

    /// Gets one tag with its usage count.
    pub fn get_tag(&self, id: TagId) -> Result<Option<Tag>, TagServiceError> {
        run("get_tag", self.repo.get_tag(id))
    }

    /// Renames one tag. Returns `false` when no tag has `id`.
    pub fn rename_tag(&mut self, id: TagId, new_name: &str) -> Result<bool, TagServiceError> {
        run("rename_tag", self.repo.rename_tag(id, new_name))
    }

    /// Deletes one tag and its associations. Returns `false` when no tag
    /// has `id`.
    pub fn delete_tag(&mut self, id: TagId) -> Result<bool, TagServiceError> {
        run("delete_tag", self.repo.delete_tag(id))
    }

    /// Returns the ids of every post labeled with the named tag.
    pub fn post_ids_by_tag_name(&self, name: &str) -> Result<Vec<PostId>, TagServiceError> {
        run("post_ids_by_tag_name", self.repo.post_ids_by_tag_name(name))
    }
}

fn run<T>(op: &'static str, result: RepoResult<T>) -> Result<T, TagServiceError> {
    result.map_err(|err| {
        if matches!(err, RepoError::Db(_)) {
            error!("event=store_failure module=tags op={op} error={err}");
        }
        TagServiceError::from(err)
    })
}
