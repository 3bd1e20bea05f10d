//! Post use-case service.
//!
//! # Responsibility
//! - Provide post create/read/update/delete/search APIs for host layers.
//! - Return the read-back entity after writes so callers can respond with
//!   current state.
//!
//! # Invariants
//! - Validation failures surface before any store write.
//! - Post listings are always newest-first.

use crate::model::post::{NewPost, Post, PostId, PostPatch, PostSummary};
use crate::model::ValidationError;
use crate::repo::post_repo::PostRepository;
use crate::repo::{RepoError, RepoResult};
use log::error;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for post use-cases.
#[derive(Debug)]
pub enum PostServiceError {
    /// Rejected input; nothing was written.
    Validation(ValidationError),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for PostServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent post state: {details}")
            }
        }
    }
}

impl Error for PostServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::InconsistentState(_) => None,
        }
    }
}

impl From<RepoError> for PostServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Post service facade over repository implementations.
pub struct PostService<R: PostRepository> {
    repo: R,
}

impl<R: PostRepository> PostService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one post and returns its read-back record.
    pub fn create_post(&mut self, input: &NewPost) -> Result<Post, PostServiceError> {
        let post_id = run("create_post", self.repo.create_post(input))?;
        run("create_post", self.repo.get_post(post_id))?.ok_or(
            PostServiceError::InconsistentState("created post not found in read-back"),
        )
    }

    /// Gets one post by stable id.
    pub fn get_post(&self, id: PostId) -> Result<Option<Post>, PostServiceError> {
        run("get_post", self.repo.get_post(id))
    }

    /// Lists every post newest-first in summary form.
    pub fn list_posts(&self) -> Result<Vec<PostSummary>, PostServiceError> {
        run("list_posts", self.repo.list_summaries())
    }

    /// Applies a partial update and returns the read-back record.
    ///
    /// Returns `Ok(None)` when no post has `id`.
    pub fn update_post(
        &mut self,
        id: PostId,
        patch: &PostPatch,
    ) -> Result<Option<Post>, PostServiceError> {
        if !run("update_post", self.repo.update_post(id, patch))? {
            return Ok(None);
        }
        let updated = run("update_post", self.repo.get_post(id))?.ok_or(
            PostServiceError::InconsistentState("updated post not found in read-back"),
        )?;
        Ok(Some(updated))
    }

    /// Deletes one post. Returns `false` when no post has `id`.
    pub fn delete_post(&mut self, id: PostId) -> Result<bool, PostServiceError> {
        run("delete_post", self.repo.delete_post(id))
    }

    /// Searches titles and contents for a literal substring, newest-first.
    pub fn search_posts(&self, keyword: &str) -> Result<Vec<PostSummary>, PostServiceError> {
        run("search_posts", self.repo.search_posts(keyword))
    }

    /// Lists posts labeled with the exactly-named tag, newest-first.
    pub fn posts_by_tag(&self, tag_name: &str) -> Result<Vec<PostSummary>, PostServiceError> {
        run("posts_by_tag", self.repo.posts_by_tag(tag_name))
    }

    /// Returns the total number of stored posts.
    pub fn count_posts(&self) -> Result<i64, PostServiceError> {
        run("count_posts", self.repo.count_posts())
    }
}

fn run<T>(op: &'static str, result: RepoResult<T>) -> Result<T, PostServiceError> {
    result.map_err(|err| {
        if matches!(err, RepoError::Db(_)) {
            error!("event=store_failure module=posts op={op} error={err}");
        }
        PostServiceError::from(err)
    })
}
