//! Post repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide post lifecycle persistence: create, read, update, delete.
//! - Shape summary projections for listing, search and tag filtering.
//! - Delegate tag resolution to the tag repository during writes.
//!
//! # Invariants
//! - Create, tag-replacing update and delete each run inside one immediate
//!   transaction; readers never observe a post with a partial tag set.
//! - `update_post` merges with the fixed rule: present field overwrites,
//!   absent field preserves; a present `tags` list replaces the whole
//!   association set.
//! - Newest-first orderings break `created_at` ties by descending insertion
//!   order.

use crate::model::post::{derive_excerpt, NewPost, Post, PostId, PostPatch, PostSummary};
use crate::model::tag::normalize_tag_name;
use crate::repo::tag_repo::resolve_or_create_in_tx;
use crate::repo::{ensure_content_schema_ready, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const POST_SELECT_SQL: &str = "SELECT
    id,
    title,
    content,
    created_at
FROM posts";

const SUMMARY_ORDER_SQL: &str = "ORDER BY created_at DESC, rowid DESC";

/// Repository interface for post lifecycle operations.
pub trait PostRepository {
    /// Creates one post with its tag associations and returns the new id.
    fn create_post(&mut self, new_post: &NewPost) -> RepoResult<PostId>;
    /// Gets one post by id, joined with its tag names.
    fn get_post(&self, id: PostId) -> RepoResult<Option<Post>>;
    /// Lists every post newest-first in summary form.
    fn list_summaries(&self) -> RepoResult<Vec<PostSummary>>;
    /// Applies a partial update. Returns `false` when no post has `id`.
    fn update_post(&mut self, id: PostId, patch: &PostPatch) -> RepoResult<bool>;
    /// Deletes a post and its associations. Returns `false` when no post
    /// has `id`.
    fn delete_post(&mut self, id: PostId) -> RepoResult<bool>;
    /// Lists posts whose title or content contains `keyword`, matched as a
    /// literal case-insensitive substring, newest-first.
    fn search_posts(&self, keyword: &str) -> RepoResult<Vec<PostSummary>>;
    /// Lists posts labeled with the tag whose stored name exactly equals
    /// `tag_name` (no trimming), newest-first.
    fn posts_by_tag(&self, tag_name: &str) -> RepoResult<Vec<PostSummary>>;
    /// Returns the total number of stored posts.
    fn count_posts(&self) -> RepoResult<i64>;
}

/// SQLite-backed post repository.
pub struct SqlitePostRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqlitePostRepository<'conn> {
    /// Constructs a repository from a provisioned connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_content_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl PostRepository for SqlitePostRepository<'_> {
    fn create_post(&mut self, new_post: &NewPost) -> RepoResult<PostId> {
        new_post.validate()?;

        let post_id = Uuid::new_v4();
        let id_text = post_id.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO posts (id, title, content) VALUES (?1, ?2, ?3);",
            params![
                id_text.as_str(),
                new_post.title.as_str(),
                new_post.content.as_str()
            ],
        )?;
        link_tags_in_tx(&tx, id_text.as_str(), &new_post.tags)?;
        tx.commit()?;

        Ok(post_id)
    }

    fn get_post(&self, id: PostId) -> RepoResult<Option<Post>> {
        let id_text = id.to_string();
        let mut stmt = self
            .conn
            .prepare(&format!("{POST_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id_text.as_str()])?;
        if let Some(row) = rows.next()? {
            let tags = load_tag_names_for_post(self.conn, id_text.as_str())?;
            return Ok(Some(Post {
                id: parse_post_id(&row.get::<_, String>("id")?)?,
                title: row.get("title")?,
                content: row.get("content")?,
                created_at: row.get("created_at")?,
                tags,
            }));
        }

        Ok(None)
    }

    fn list_summaries(&self) -> RepoResult<Vec<PostSummary>> {
        collect_summaries(
            self.conn,
            &format!("{POST_SELECT_SQL} {SUMMARY_ORDER_SQL};"),
            Vec::new(),
        )
    }

    fn update_post(&mut self, id: PostId, patch: &PostPatch) -> RepoResult<bool> {
        patch.validate()?;

        let id_text = id.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !post_exists_in_tx(&tx, id_text.as_str())? {
            return Ok(false);
        }

        if patch.title.is_some() || patch.content.is_some() {
            tx.execute(
                "UPDATE posts
                 SET
                    title = COALESCE(?2, title),
                    content = COALESCE(?3, content)
                 WHERE id = ?1;",
                params![id_text.as_str(), patch.title.as_deref(), patch.content.as_deref()],
            )?;
        }

        if let Some(tags) = patch.tags.as_deref() {
            tx.execute(
                "DELETE FROM post_tags WHERE post_id = ?1;",
                [id_text.as_str()],
            )?;
            link_tags_in_tx(&tx, id_text.as_str(), tags)?;
        }

        tx.commit()?;
        Ok(true)
    }

    fn delete_post(&mut self, id: PostId) -> RepoResult<bool> {
        let id_text = id.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !post_exists_in_tx(&tx, id_text.as_str())? {
            return Ok(false);
        }

        tx.execute(
            "DELETE FROM post_tags WHERE post_id = ?1;",
            [id_text.as_str()],
        )?;
        tx.execute("DELETE FROM posts WHERE id = ?1;", [id_text.as_str()])?;
        tx.commit()?;
        Ok(true)
    }

    fn search_posts(&self, keyword: &str) -> RepoResult<Vec<PostSummary>> {
        let sql = format!(
            "{POST_SELECT_SQL}
             WHERE title LIKE ?1 ESCAPE '\\' OR content LIKE ?1 ESCAPE '\\'
             {SUMMARY_ORDER_SQL};"
        );
        collect_summaries(
            self.conn,
            &sql,
            vec![Value::Text(contains_pattern(keyword))],
        )
    }

    fn posts_by_tag(&self, tag_name: &str) -> RepoResult<Vec<PostSummary>> {
        let sql = "SELECT
                p.id AS id,
                p.title AS title,
                p.content AS content,
                p.created_at AS created_at
             FROM posts p
             INNER JOIN post_tags pt ON pt.post_id = p.id
             INNER JOIN tags t ON t.id = pt.tag_id
             WHERE t.name = ?1
             ORDER BY p.created_at DESC, p.rowid DESC;";
        collect_summaries(self.conn, sql, vec![Value::Text(tag_name.to_string())])
    }

    fn count_posts(&self) -> RepoResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM posts;", [], |row| row.get(0))?;
        Ok(count)
    }
}

/// Builds a LIKE pattern matching `keyword` as a literal substring.
///
/// `%`, `_` and the escape character itself are escaped so the keyword
/// carries no wildcard semantics.
fn contains_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for ch in keyword.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn collect_summaries(
    conn: &Connection,
    sql: &str,
    bind_values: Vec<Value>,
) -> RepoResult<Vec<PostSummary>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut summaries = Vec::new();
    while let Some(row) = rows.next()? {
        summaries.push(parse_summary_row(conn, row)?);
    }
    Ok(summaries)
}

fn parse_summary_row(conn: &Connection, row: &Row<'_>) -> RepoResult<PostSummary> {
    let id_text: String = row.get("id")?;
    let content: String = row.get("content")?;
    let tags = load_tag_names_for_post(conn, id_text.as_str())?;
    Ok(PostSummary {
        id: parse_post_id(&id_text)?,
        title: row.get("title")?,
        excerpt: derive_excerpt(&content),
        created_at: row.get("created_at")?,
        tags,
    })
}

/// Resolves each non-blank tag name and links it to the post.
///
/// Blank names are discarded; duplicate names in the input collapse onto
/// the same association row.
fn link_tags_in_tx(tx: &Transaction<'_>, post_id_text: &str, tags: &[String]) -> RepoResult<()> {
    for raw_name in tags {
        let Some(trimmed) = normalize_tag_name(raw_name) else {
            continue;
        };
        let tag_id = resolve_or_create_in_tx(tx, trimmed)?;
        tx.execute(
            "INSERT OR IGNORE INTO post_tags (post_id, tag_id) VALUES (?1, ?2);",
            params![post_id_text, tag_id.to_string()],
        )?;
    }
    Ok(())
}

fn load_tag_names_for_post(conn: &Connection, post_id_text: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT t.name
         FROM post_tags pt
         INNER JOIN tags t ON t.id = pt.tag_id
         WHERE pt.post_id = ?1
         ORDER BY pt.rowid ASC;",
    )?;
    let mut rows = stmt.query([post_id_text])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(row.get(0)?);
    }
    Ok(tags)
}

fn parse_post_id(value: &str) -> RepoResult<PostId> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in posts.id")))
}

fn post_exists_in_tx(tx: &Transaction<'_>, post_id_text: &str) -> RepoResult<bool> {
    let exists: i64 = tx.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM posts
            WHERE id = ?1
        );",
        [post_id_text],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
