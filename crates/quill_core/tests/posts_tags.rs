use quill_core::db::open_db_in_memory;
use quill_core::{
    NewPost, PostPatch, PostRepository, SqlitePostRepository, SqliteTagRepository, TagRepository,
};
use rusqlite::{params, Connection};

#[test]
fn update_with_tags_replaces_entire_set() {
    let mut conn = open_db_in_memory().unwrap();
    let id = {
        let mut repo = SqlitePostRepository::try_new(&mut conn).unwrap();
        let id = repo
            .create_post(&NewPost::new("Post", "Body").with_tags(["old-a", "old-b"]))
            .unwrap();
        assert!(repo
            .update_post(id, &PostPatch::default().tags(["new-a", "new-b"]))
            .unwrap());

        let loaded = repo.get_post(id).unwrap().unwrap();
        assert_eq!(loaded.tags, vec!["new-a".to_string(), "new-b".to_string()]);
        id
    };

    // No remnants of the old set: the old tags survive as rows but carry no
    // associations to this post.
    let tag_repo = SqliteTagRepository::try_new(&mut conn).unwrap();
    for old_name in ["old-a", "old-b"] {
        let post_ids = tag_repo.post_ids_by_tag_name(old_name).unwrap();
        assert!(!post_ids.contains(&id), "stale association for {old_name}");
    }
}

#[test]
fn update_with_empty_tag_list_clears_all_associations() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqlitePostRepository::try_new(&mut conn).unwrap();

    let id = repo
        .create_post(&NewPost::new("Post", "Body").with_tags(["a", "b"]))
        .unwrap();
    assert!(repo
        .update_post(id, &PostPatch::default().tags(Vec::<String>::new()))
        .unwrap());

    let loaded = repo.get_post(id).unwrap().unwrap();
    assert!(loaded.tags.is_empty());
}

#[test]
fn update_without_tags_field_leaves_associations_untouched() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqlitePostRepository::try_new(&mut conn).unwrap();

    let id = repo
        .create_post(&NewPost::new("Post", "Body").with_tags(["stay"]))
        .unwrap();
    assert!(repo
        .update_post(id, &PostPatch::default().title("Renamed"))
        .unwrap());

    let loaded = repo.get_post(id).unwrap().unwrap();
    assert_eq!(loaded.tags, vec!["stay".to_string()]);
}

#[test]
fn blank_tag_names_are_silently_discarded() {
    let mut conn = open_db_in_memory().unwrap();
    let id = {
        let mut repo = SqlitePostRepository::try_new(&mut conn).unwrap();
        repo.create_post(&NewPost::new("Post", "Body").with_tags(["", "   ", "real"]))
            .unwrap()
    };

    let mut repo = SqlitePostRepository::try_new(&mut conn).unwrap();
    let loaded = repo.get_post(id).unwrap().unwrap();
    assert_eq!(loaded.tags, vec!["real".to_string()]);

    repo.update_post(id, &PostPatch::default().tags(["\t", "kept"]))
        .unwrap();
    let reloaded = repo.get_post(id).unwrap().unwrap();
    assert_eq!(reloaded.tags, vec!["kept".to_string()]);
}

#[test]
fn duplicate_tags_in_input_collapse_to_one_association() {
    let mut conn = open_db_in_memory().unwrap();
    let id = {
        let mut repo = SqlitePostRepository::try_new(&mut conn).unwrap();
        repo.create_post(&NewPost::new("Post", "Body").with_tags(["rust", "rust", " rust "]))
            .unwrap()
    };

    {
        let repo = SqlitePostRepository::try_new(&mut conn).unwrap();
        let loaded = repo.get_post(id).unwrap().unwrap();
        assert_eq!(loaded.tags, vec!["rust".to_string()]);
    }

    let tag_repo = SqliteTagRepository::try_new(&mut conn).unwrap();
    let tags = tag_repo.list_tags().unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].count, 1);
}

#[test]
fn tags_are_trimmed_before_resolution_and_shared_across_posts() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut repo = SqlitePostRepository::try_new(&mut conn).unwrap();
        repo.create_post(&NewPost::new("First", "Body").with_tags([" rust "]))
            .unwrap();
        repo.create_post(&NewPost::new("Second", "Body").with_tags(["rust"]))
            .unwrap();
    }

    let tag_repo = SqliteTagRepository::try_new(&mut conn).unwrap();
    let tags = tag_repo.list_tags().unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].name, "rust");
    assert_eq!(tags[0].count, 2);
}

#[test]
fn get_post_reports_tags_in_association_insertion_order() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqlitePostRepository::try_new(&mut conn).unwrap();

    let id = repo
        .create_post(&NewPost::new("Post", "Body").with_tags(["zebra", "apple", "mango"]))
        .unwrap();

    let loaded = repo.get_post(id).unwrap().unwrap();
    assert_eq!(
        loaded.tags,
        vec![
            "zebra".to_string(),
            "apple".to_string(),
            "mango".to_string()
        ]
    );
}

#[test]
fn posts_by_tag_matches_stored_name_exactly_without_trimming() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqlitePostRepository::try_new(&mut conn).unwrap();

    repo.create_post(&NewPost::new("Tagged", "Body").with_tags(["rust"]))
        .unwrap();

    assert_eq!(repo.posts_by_tag("rust").unwrap().len(), 1);
    assert!(repo.posts_by_tag(" rust ").unwrap().is_empty());
    assert!(repo.posts_by_tag("Rust").unwrap().is_empty());
}

#[test]
fn posts_by_tag_unknown_name_returns_empty() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqlitePostRepository::try_new(&mut conn).unwrap();

    assert!(repo.posts_by_tag("never-used").unwrap().is_empty());
}

#[test]
fn posts_by_tag_orders_newest_first() {
    let mut conn = open_db_in_memory().unwrap();
    let (old_id, new_id) = {
        let mut repo = SqlitePostRepository::try_new(&mut conn).unwrap();
        (
            repo.create_post(&NewPost::new("old", "Body").with_tags(["shared"]))
                .unwrap(),
            repo.create_post(&NewPost::new("new", "Body").with_tags(["shared"]))
                .unwrap(),
        )
    };
    set_created_at(&conn, old_id, 1_000);
    set_created_at(&conn, new_id, 2_000);

    let repo = SqlitePostRepository::try_new(&mut conn).unwrap();
    let summaries = repo.posts_by_tag("shared").unwrap();
    let ids: Vec<_> = summaries.iter().map(|summary| summary.id).collect();
    assert_eq!(ids, vec![new_id, old_id]);
}

fn set_created_at(conn: &Connection, id: uuid::Uuid, created_at: i64) {
    conn.execute(
        "UPDATE posts SET created_at = ?1 WHERE id = ?2;",
        params![created_at, id.to_string()],
    )
    .unwrap();
}
