//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `quill_core` linkage and
//!   schema provisioning.
//! - Keep output deterministic for quick local sanity checks.

use quill_core::db::open_db_in_memory;
use quill_core::{PostRepository, SqlitePostRepository};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let mut conn = open_db_in_memory()?;
    let repo = SqlitePostRepository::try_new(&mut conn)?;

    println!("quill_core version={}", quill_core::core_version());
    println!("quill_core posts={}", repo.count_posts()?);
    Ok(())
}
