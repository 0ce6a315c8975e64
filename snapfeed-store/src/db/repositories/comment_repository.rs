use rusqlite::Row;

use snapfeed_types::{format_timestamp, Comment, Entity, NewComment};

use crate::clock::SharedClock;
use crate::db::rows::{
    expect_affected, query_count, query_list, query_optional, timestamp_column, write_error,
};
use crate::db::DbPool;
use crate::error::StoreResult;

const COMMENT_COLUMNS: &str = "id, post_id, user_id, content, created_at";

fn map_comment(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        post_id: row.get(1)?,
        user_id: row.get(2)?,
        content: row.get(3)?,
        created_at: timestamp_column(row, 4)?,
    })
}

pub struct CommentRepository {
    pool: DbPool,
    clock: SharedClock,
}

impl CommentRepository {
    pub fn new(pool: DbPool, clock: SharedClock) -> Self {
        Self { pool, clock }
    }

    /// Add a comment by an existing user to an existing post
    pub fn create(&self, new_comment: &NewComment) -> StoreResult<Comment> {
        let conn = self.pool.get()?;
        let created_at = self.clock.now();

        conn.execute(
            "INSERT INTO comments (post_id, user_id, content, created_at) VALUES (?, ?, ?, ?)",
            (
                new_comment.post_id,
                new_comment.user_id,
                &new_comment.content,
                format_timestamp(&created_at),
            ),
        )
        .map_err(|e| write_error(Comment::NAME, e))?;

        let id = conn.last_insert_rowid();
        tracing::debug!(
            comment_id = id,
            post_id = new_comment.post_id,
            user_id = new_comment.user_id,
            "Created comment"
        );

        Ok(Comment {
            id,
            post_id: new_comment.post_id,
            user_id: new_comment.user_id,
            content: new_comment.content.clone(),
            created_at: Some(created_at),
        })
    }

    pub fn get_by_id(&self, comment_id: i64) -> StoreResult<Option<Comment>> {
        let conn = self.pool.get()?;
        query_optional(
            &conn,
            &format!("SELECT {} FROM comments WHERE id = ?", COMMENT_COLUMNS),
            [comment_id],
            map_comment,
        )
    }

    /// Comments on a post, oldest first
    pub fn list_by_post(&self, post_id: i64) -> StoreResult<Vec<Comment>> {
        let conn = self.pool.get()?;
        query_list(
            &conn,
            &format!("SELECT {} FROM comments WHERE post_id = ? ORDER BY id", COMMENT_COLUMNS),
            [post_id],
            map_comment,
        )
    }

    /// Comments written by a user, oldest first
    pub fn list_by_user(&self, user_id: i64) -> StoreResult<Vec<Comment>> {
        let conn = self.pool.get()?;
        query_list(
            &conn,
            &format!("SELECT {} FROM comments WHERE user_id = ? ORDER BY id", COMMENT_COLUMNS),
            [user_id],
            map_comment,
        )
    }

    pub fn count_for_post(&self, post_id: i64) -> StoreResult<i64> {
        let conn = self.pool.get()?;
        query_count(&conn, "SELECT COUNT(*) FROM comments WHERE post_id = ?", [post_id])
    }

    pub fn delete(&self, comment_id: i64) -> StoreResult<()> {
        let conn = self.pool.get()?;
        let affected = conn
            .execute("DELETE FROM comments WHERE id = ?", [comment_id])
            .map_err(|e| write_error(Comment::NAME, e))?;
        expect_affected(affected, Comment::NAME, comment_id)
    }
}
