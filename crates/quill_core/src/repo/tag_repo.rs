//! Tag repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Own tag identity: lookup-or-create by trimmed name.
//! - Report usage counts aggregated over the association relation.
//! - Keep the association relation clean when a tag is removed.
//!
//! # Invariants
//! - One tag id per distinct trimmed name; resolution is idempotent.
//! - `delete_tag` removes every association row before the tag row, inside
//!   one transaction.
//! - Renaming onto a name held by a different tag is rejected before any
//!   write, keeping `tags.name` unique.

use crate::model::post::PostId;
use crate::model::tag::{normalize_tag_name, Tag, TagId};
use crate::model::ValidationError;
use crate::repo::{ensure_content_schema_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const TAG_WITH_COUNT_SELECT_SQL: &str = "SELECT
    t.id AS id,
    t.name AS name,
    COUNT(pt.post_id) AS count
FROM tags t
LEFT JOIN post_tags pt ON pt.tag_id = t.id";

/// Repository interface for tag identity and usage operations.
pub trait TagRepository {
    /// Maps a tag name to its stable id, creating the tag on first use.
    fn resolve_or_create(&mut self, name: &str) -> RepoResult<TagId>;
    /// Returns every tag with usage count, ordered by count descending then
    /// name ascending.
    fn list_tags(&self) -> RepoResult<Vec<Tag>>;
    /// Gets one tag with its usage count.
    fn get_tag(&self, id: TagId) -> RepoResult<Option<Tag>>;
    /// Renames a tag. Returns `false` when no tag has `id`.
    fn rename_tag(&mut self, id: TagId, new_name: &str) -> RepoResult<bool>;
    /// Deletes a tag and all of its associations. Returns `false` when no
    /// tag has `id`.
    fn delete_tag(&mut self, id: TagId) -> RepoResult<bool>;
    /// Returns the ids of every post labeled with the named tag.
    fn post_ids_by_tag_name(&self, name: &str) -> RepoResult<Vec<PostId>>;
}

/// SQLite-backed tag repository.
pub struct SqliteTagRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteTagRepository<'conn> {
    /// Constructs a repository from a provisioned connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_content_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TagRepository for SqliteTagRepository<'_> {
    fn resolve_or_create(&mut self, name: &str) -> RepoResult<TagId> {
        let Some(trimmed) = normalize_tag_name(name) else {
            return Err(RepoError::Validation(ValidationError::EmptyTagName));
        };

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let tag_id = resolve_or_create_in_tx(&tx, trimmed)?;
        tx.commit()?;
        Ok(tag_id)
    }

    fn list_tags(&self) -> RepoResult<Vec<Tag>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TAG_WITH_COUNT_SELECT_SQL}
             GROUP BY t.id, t.name
             ORDER BY count DESC, t.name ASC;"
        ))?;

        let mut rows = stmt.query([])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(parse_tag_row(row)?);
        }
        Ok(tags)
    }

    fn get_tag(&self, id: TagId) -> RepoResult<Option<Tag>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TAG_WITH_COUNT_SELECT_SQL}
             WHERE t.id = ?1
             GROUP BY t.id, t.name;"
        ))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_tag_row(row)?));
        }
        Ok(None)
    }

    fn rename_tag(&mut self, id: TagId, new_name: &str) -> RepoResult<bool> {
        let Some(trimmed) = normalize_tag_name(new_name) else {
            return Err(RepoError::Validation(ValidationError::EmptyTagName));
        };

        let id_text = id.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !tag_exists_in_tx(&tx, id_text.as_str())? {
            return Ok(false);
        }

        let taken_by_other = tx
            .query_row(
                "SELECT id FROM tags WHERE name = ?1 AND id <> ?2;",
                params![trimmed, id_text.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        if taken_by_other.is_some() {
            return Err(RepoError::Validation(ValidationError::DuplicateTagName(
                trimmed.to_string(),
            )));
        }

        tx.execute(
            "UPDATE tags SET name = ?1 WHERE id = ?2;",
            params![trimmed, id_text.as_str()],
        )?;
        tx.commit()?;
        Ok(true)
    }

    fn delete_tag(&mut self, id: TagId) -> RepoResult<bool> {
        let id_text = id.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !tag_exists_in_tx(&tx, id_text.as_str())? {
            return Ok(false);
        }

        tx.execute(
            "DELETE FROM post_tags WHERE tag_id = ?1;",
            [id_text.as_str()],
        )?;
        tx.execute("DELETE FROM tags WHERE id = ?1;", [id_text.as_str()])?;
        tx.commit()?;
        Ok(true)
    }

    fn post_ids_by_tag_name(&self, name: &str) -> RepoResult<Vec<PostId>> {
        let Some(trimmed) = normalize_tag_name(name) else {
            return Ok(Vec::new());
        };

        let mut stmt = self.conn.prepare(
            "SELECT pt.post_id AS post_id
             FROM post_tags pt
             INNER JOIN tags t ON t.id = pt.tag_id
             WHERE t.name = ?1
             ORDER BY pt.rowid ASC;",
        )?;

        let mut rows = stmt.query([trimmed])?;
        let mut post_ids = Vec::new();
        while let Some(row) = rows.next()? {
            let id_text: String = row.get("post_id")?;
            post_ids.push(parse_post_id(&id_text)?);
        }
        Ok(post_ids)
    }
}

/// Resolves a trimmed tag name to its stable id inside a caller-owned
/// transaction, inserting the tag on first use.
///
/// The post repository shares this for tag resolution during its own write
/// transactions.
pub(crate) fn resolve_or_create_in_tx(
    tx: &Transaction<'_>,
    trimmed_name: &str,
) -> RepoResult<TagId> {
    let existing = tx
        .query_row(
            "SELECT id FROM tags WHERE name = ?1;",
            [trimmed_name],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    if let Some(id_text) = existing {
        return parse_tag_id(&id_text);
    }

    let tag_id = Uuid::new_v4();
    tx.execute(
        "INSERT INTO tags (id, name) VALUES (?1, ?2);",
        params![tag_id.to_string(), trimmed_name],
    )?;
    Ok(tag_id)
}

fn parse_tag_row(row: &Row<'_>) -> RepoResult<Tag> {
    let id_text: String = row.get("id")?;
    Ok(Tag {
        id: parse_tag_id(&id_text)?,
        name: row.get("name")?,
        count: row.get("count")?,
    })
}

fn parse_tag_id(value: &str) -> RepoResult<TagId> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in tags.id")))
}

fn parse_post_id(value: &str) -> RepoResult<PostId> {
    Uuid::parse_str(value).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{value}` in post_tags.post_id"))
    })
}

fn tag_exists_in_tx(tx: &Transaction<'_>, tag_id_text: &str) -> RepoResult<bool> {
    let exists: i64 = tx.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM tags
            WHERE id = ?1
        );",
        [tag_id_text],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
