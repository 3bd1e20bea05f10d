//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for posts and tags.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes validate input before any SQL mutation.
//! - Multi-row write sequences run inside one immediate transaction, so a
//!   concurrent reader never observes partial state.
//! - "Not found" is signaled through return values (`Option`/`bool`), never
//!   through errors.

use crate::db::DbError;
use crate::model::ValidationError;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod post_repo;
pub mod tag_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for content persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted content data: {message}")
            }
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing; store not provisioned")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(
                    f,
                    "required column `{table}.{column}` is missing; store not provisioned"
                )
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_)
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Verifies that the connection carries the provisioned content schema.
///
/// Both repositories touch all three relations, so they share one readiness
/// contract.
pub(crate) fn ensure_content_schema_ready(conn: &Connection) -> RepoResult<()> {
    for table in ["posts", "tags", "post_tags"] {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    for column in ["id", "title", "content", "created_at"] {
        if !table_has_column(conn, "posts", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "posts",
                column,
            });
        }
    }

    for column in ["id", "name"] {
        if !table_has_column(conn, "tags", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "tags",
                column,
            });
        }
    }

    for column in ["post_id", "tag_id"] {
        if !table_has_column(conn, "post_tags", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "post_tags",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
