use rusqlite::{Connection, Row};

use snapfeed_types::{format_timestamp, Entity, NewPost, Post, PostUpdate};

use crate::clock::SharedClock;
use crate::db::rows::{
    expect_affected, query_count, query_list, query_optional, timestamp_column, write_error,
};
use crate::db::DbPool;
use crate::error::{StoreError, StoreResult};

const POST_COLUMNS: &str = "id, user_id, image_url, caption, location, created_at";

fn map_post(row: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        user_id: row.get(1)?,
        image_url: row.get(2)?,
        caption: row.get(3)?,
        location: row.get(4)?,
        created_at: timestamp_column(row, 5)?,
    })
}

fn fetch_by_id(conn: &Connection, post_id: i64) -> StoreResult<Option<Post>> {
    query_optional(
        conn,
        &format!("SELECT {} FROM posts WHERE id = ?", POST_COLUMNS),
        [post_id],
        map_post,
    )
}

pub struct PostRepository {
    pool: DbPool,
    clock: SharedClock,
}

impl PostRepository {
    pub fn new(pool: DbPool, clock: SharedClock) -> Self {
        Self { pool, clock }
    }

    /// Create a new post owned by an existing user
    pub fn create(&self, new_post: &NewPost) -> StoreResult<Post> {
        let conn = self.pool.get()?;
        let created_at = self.clock.now();

        conn.execute(
            "INSERT INTO posts (user_id, image_url, caption, location, created_at)
             VALUES (?, ?, ?, ?, ?)",
            (
                new_post.user_id,
                &new_post.image_url,
                &new_post.caption,
                &new_post.location,
                format_timestamp(&created_at),
            ),
        )
        .map_err(|e| write_error(Post::NAME, e))?;

        let id = conn.last_insert_rowid();
        tracing::debug!(post_id = id, user_id = new_post.user_id, "Created post");

        Ok(Post {
            id,
            user_id: new_post.user_id,
            image_url: new_post.image_url.clone(),
            caption: new_post.caption.clone(),
            location: new_post.location.clone(),
            created_at: Some(created_at),
        })
    }

    /// Get a single post by ID
    pub fn get_by_id(&self, post_id: i64) -> StoreResult<Option<Post>> {
        let conn = self.pool.get()?;
        fetch_by_id(&conn, post_id)
    }

    /// Posts by a specific user, oldest first
    pub fn list_by_user(&self, user_id: i64) -> StoreResult<Vec<Post>> {
        let conn = self.pool.get()?;
        query_list(
            &conn,
            &format!("SELECT {} FROM posts WHERE user_id = ? ORDER BY id", POST_COLUMNS),
            [user_id],
            map_post,
        )
    }

    /// Get post count for a user
    pub fn count_by_user(&self, user_id: i64) -> StoreResult<i64> {
        let conn = self.pool.get()?;
        query_count(&conn, "SELECT COUNT(*) FROM posts WHERE user_id = ?", [user_id])
    }

    /// Replace caption and location; owner, image and timestamp are fixed
    pub fn update_details(&self, post_id: i64, update: &PostUpdate) -> StoreResult<Post> {
        let conn = self.pool.get()?;
        let affected = conn
            .execute(
                "UPDATE posts SET caption = ?, location = ? WHERE id = ?",
                (&update.caption, &update.location, post_id),
            )
            .map_err(|e| write_error(Post::NAME, e))?;
        expect_affected(affected, Post::NAME, post_id)?;

        fetch_by_id(&conn, post_id)?.ok_or_else(|| StoreError::not_found(Post::NAME, post_id))
    }

    /// Delete a post. Rejected while comments or likes still reference it.
    pub fn delete(&self, post_id: i64) -> StoreResult<()> {
        let conn = self.pool.get()?;
        let affected = conn
            .execute("DELETE FROM posts WHERE id = ?", [post_id])
            .map_err(|e| write_error(Post::NAME, e))?;
        expect_affected(affected, Post::NAME, post_id)?;
        tracing::debug!(post_id, "Deleted post");
        Ok(())
    }
}
