use rusqlite::Row;

use snapfeed_types::{format_timestamp, Entity, Follow, NewFollow};

use crate::clock::SharedClock;
use crate::db::rows::{
    expect_affected, query_count, query_list, query_optional, timestamp_column, write_error,
};
use crate::db::DbPool;
use crate::error::StoreResult;

const FOLLOW_COLUMNS: &str = "id, follower_id, followed_id, created_at";

fn map_follow(row: &Row<'_>) -> rusqlite::Result<Follow> {
    Ok(Follow {
        id: row.get(0)?,
        follower_id: row.get(1)?,
        followed_id: row.get(2)?,
        created_at: timestamp_column(row, 3)?,
    })
}

pub struct FollowRepository {
    pool: DbPool,
    clock: SharedClock,
}

impl FollowRepository {
    pub fn new(pool: DbPool, clock: SharedClock) -> Self {
        Self { pool, clock }
    }

    /// Follow a user. Self-follows and repeated follows are rejected by the schema.
    pub fn create(&self, new_follow: &NewFollow) -> StoreResult<Follow> {
        let conn = self.pool.get()?;
        let created_at = self.clock.now();

        conn.execute(
            "INSERT INTO follows (follower_id, followed_id, created_at) VALUES (?, ?, ?)",
            (
                new_follow.follower_id,
                new_follow.followed_id,
                format_timestamp(&created_at),
            ),
        )
        .map_err(|e| write_error(Follow::NAME, e))?;

        let id = conn.last_insert_rowid();
        tracing::debug!(
            follow_id = id,
            follower_id = new_follow.follower_id,
            followed_id = new_follow.followed_id,
            "Created follow"
        );

        Ok(Follow {
            id,
            follower_id: new_follow.follower_id,
            followed_id: new_follow.followed_id,
            created_at: Some(created_at),
        })
    }

    pub fn get_by_id(&self, follow_id: i64) -> StoreResult<Option<Follow>> {
        let conn = self.pool.get()?;
        query_optional(
            &conn,
            &format!("SELECT {} FROM follows WHERE id = ?", FOLLOW_COLUMNS),
            [follow_id],
            map_follow,
        )
    }

    /// The edge from `follower_id` to `followed_id`, if present
    pub fn find(&self, follower_id: i64, followed_id: i64) -> StoreResult<Option<Follow>> {
        let conn = self.pool.get()?;
        query_optional(
            &conn,
            &format!(
                "SELECT {} FROM follows WHERE follower_id = ? AND followed_id = ?",
                FOLLOW_COLUMNS
            ),
            (follower_id, followed_id),
            map_follow,
        )
    }

    /// Check if user A is following user B
    pub fn is_following(&self, follower_id: i64, followed_id: i64) -> StoreResult<bool> {
        Ok(self.find(follower_id, followed_id)?.is_some())
    }

    /// Edges pointing at this user (who follows them)
    pub fn followers(&self, user_id: i64) -> StoreResult<Vec<Follow>> {
        let conn = self.pool.get()?;
        query_list(
            &conn,
            &format!("SELECT {} FROM follows WHERE followed_id = ? ORDER BY id", FOLLOW_COLUMNS),
            [user_id],
            map_follow,
        )
    }

    /// Edges starting at this user (whom they follow)
    pub fn following(&self, user_id: i64) -> StoreResult<Vec<Follow>> {
        let conn = self.pool.get()?;
        query_list(
            &conn,
            &format!("SELECT {} FROM follows WHERE follower_id = ? ORDER BY id", FOLLOW_COLUMNS),
            [user_id],
            map_follow,
        )
    }

    pub fn follower_count(&self, user_id: i64) -> StoreResult<i64> {
        let conn = self.pool.get()?;
        query_count(&conn, "SELECT COUNT(*) FROM follows WHERE followed_id = ?", [user_id])
    }

    pub fn following_count(&self, user_id: i64) -> StoreResult<i64> {
        let conn = self.pool.get()?;
        query_count(&conn, "SELECT COUNT(*) FROM follows WHERE follower_id = ?", [user_id])
    }

    /// Unfollow a user
    pub fn unfollow(&self, follower_id: i64, followed_id: i64) -> StoreResult<()> {
        let conn = self.pool.get()?;
        let affected = conn
            .execute(
                "DELETE FROM follows WHERE follower_id = ? AND followed_id = ?",
                (follower_id, followed_id),
            )
            .map_err(|e| write_error(Follow::NAME, e))?;
        expect_affected(
            affected,
            Follow::NAME,
            format!("{} -> {}", follower_id, followed_id),
        )
    }

    pub fn delete(&self, follow_id: i64) -> StoreResult<()> {
        let conn = self.pool.get()?;
        let affected = conn
            .execute("DELETE FROM follows WHERE id = ?", [follow_id])
            .map_err(|e| write_error(Follow::NAME, e))?;
        expect_affected(affected, Follow::NAME, follow_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::error::{ConstraintKind, StoreError};
    use snapfeed_types::NewUser;

    fn setup_test_db() -> (Database, FollowRepository, i64, i64) {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize schema");
        let alice = db.users().create(&NewUser::new("a@x.com", "alice", "h")).unwrap();
        let bob = db.users().create(&NewUser::new("b@x.com", "bob", "h")).unwrap();
        let repo = db.follows();
        (db, repo, alice.id, bob.id)
    }

    fn edge(follower_id: i64, followed_id: i64) -> NewFollow {
        NewFollow { follower_id, followed_id }
    }

    #[test]
    fn test_follow_is_directed() {
        let (_db, repo, alice, bob) = setup_test_db();
        let follow = repo.create(&edge(alice, bob)).unwrap();

        assert!(repo.is_following(alice, bob).unwrap());
        assert!(!repo.is_following(bob, alice).unwrap());
        assert_eq!(repo.following(alice).unwrap(), vec![follow.clone()]);
        assert_eq!(repo.followers(bob).unwrap(), vec![follow]);
        assert!(repo.followers(alice).unwrap().is_empty());
        assert_eq!(repo.follower_count(bob).unwrap(), 1);
        assert_eq!(repo.following_count(bob).unwrap(), 0);
    }

    #[test]
    fn test_self_follow_rejected() {
        let (_db, repo, alice, _bob) = setup_test_db();
        let err = repo.create(&edge(alice, alice)).unwrap_err();
        assert!(matches!(
            err,
            StoreError::ConstraintViolation { kind: ConstraintKind::Check, ref message }
                if message.contains("follows_no_self_follow")
        ));
    }

    #[test]
    fn test_duplicate_follow_rejected() {
        let (_db, repo, alice, bob) = setup_test_db();
        repo.create(&edge(alice, bob)).unwrap();
        let err = repo.create(&edge(alice, bob)).unwrap_err();
        assert_eq!(err.constraint_kind(), Some(ConstraintKind::Unique));

        // The reverse direction is a different edge
        repo.create(&edge(bob, alice)).unwrap();
    }

    #[test]
    fn test_follow_unknown_user_rejected() {
        let (_db, repo, alice, _bob) = setup_test_db();
        let err = repo.create(&edge(alice, 42)).unwrap_err();
        assert_eq!(err.constraint_kind(), Some(ConstraintKind::ForeignKey));
    }

    #[test]
    fn test_unfollow() {
        let (_db, repo, alice, bob) = setup_test_db();
        repo.create(&edge(alice, bob)).unwrap();
        repo.unfollow(alice, bob).unwrap();
        assert!(!repo.is_following(alice, bob).unwrap());
        assert!(repo.unfollow(alice, bob).unwrap_err().is_not_found());
    }
}
