use rusqlite::Row;

use snapfeed_types::{format_timestamp, Entity, Like, NewLike};

use crate::clock::SharedClock;
use crate::db::rows::{
    expect_affected, query_count, query_list, query_optional, timestamp_column, write_error,
};
use crate::db::DbPool;
use crate::error::StoreResult;

const LIKE_COLUMNS: &str = "id, user_id, post_id, created_at";

fn map_like(row: &Row<'_>) -> rusqlite::Result<Like> {
    Ok(Like {
        id: row.get(0)?,
        user_id: row.get(1)?,
        post_id: row.get(2)?,
        created_at: timestamp_column(row, 3)?,
    })
}

pub struct LikeRepository {
    pool: DbPool,
    clock: SharedClock,
}

impl LikeRepository {
    pub fn new(pool: DbPool, clock: SharedClock) -> Self {
        Self { pool, clock }
    }

    /// Record that a user likes a post. A second like of the same post by the
    /// same user is a uniqueness violation.
    pub fn create(&self, new_like: &NewLike) -> StoreResult<Like> {
        let conn = self.pool.get()?;
        let created_at = self.clock.now();

        conn.execute(
            "INSERT INTO likes (user_id, post_id, created_at) VALUES (?, ?, ?)",
            (new_like.user_id, new_like.post_id, format_timestamp(&created_at)),
        )
        .map_err(|e| write_error(Like::NAME, e))?;

        let id = conn.last_insert_rowid();
        tracing::debug!(like_id = id, user_id = new_like.user_id, post_id = new_like.post_id, "Created like");

        Ok(Like {
            id,
            user_id: new_like.user_id,
            post_id: new_like.post_id,
            created_at: Some(created_at),
        })
    }

    pub fn get_by_id(&self, like_id: i64) -> StoreResult<Option<Like>> {
        let conn = self.pool.get()?;
        query_optional(
            &conn,
            &format!("SELECT {} FROM likes WHERE id = ?", LIKE_COLUMNS),
            [like_id],
            map_like,
        )
    }

    /// A user's like on a post, if any
    pub fn find(&self, user_id: i64, post_id: i64) -> StoreResult<Option<Like>> {
        let conn = self.pool.get()?;
        query_optional(
            &conn,
            &format!("SELECT {} FROM likes WHERE user_id = ? AND post_id = ?", LIKE_COLUMNS),
            (user_id, post_id),
            map_like,
        )
    }

    pub fn list_by_post(&self, post_id: i64) -> StoreResult<Vec<Like>> {
        let conn = self.pool.get()?;
        query_list(
            &conn,
            &format!("SELECT {} FROM likes WHERE post_id = ? ORDER BY id", LIKE_COLUMNS),
            [post_id],
            map_like,
        )
    }

    pub fn list_by_user(&self, user_id: i64) -> StoreResult<Vec<Like>> {
        let conn = self.pool.get()?;
        query_list(
            &conn,
            &format!("SELECT {} FROM likes WHERE user_id = ? ORDER BY id", LIKE_COLUMNS),
            [user_id],
            map_like,
        )
    }

    pub fn count_for_post(&self, post_id: i64) -> StoreResult<i64> {
        let conn = self.pool.get()?;
        query_count(&conn, "SELECT COUNT(*) FROM likes WHERE post_id = ?", [post_id])
    }

    /// Remove a user's like from a post
    pub fn unlike(&self, user_id: i64, post_id: i64) -> StoreResult<()> {
        let conn = self.pool.get()?;
        let affected = conn
            .execute(
                "DELETE FROM likes WHERE user_id = ? AND post_id = ?",
                (user_id, post_id),
            )
            .map_err(|e| write_error(Like::NAME, e))?;
        expect_affected(affected, Like::NAME, format!("user {} on post {}", user_id, post_id))
    }

    pub fn delete(&self, like_id: i64) -> StoreResult<()> {
        let conn = self.pool.get()?;
        let affected = conn
            .execute("DELETE FROM likes WHERE id = ?", [like_id])
            .map_err(|e| write_error(Like::NAME, e))?;
        expect_affected(affected, Like::NAME, like_id)
    }
}
