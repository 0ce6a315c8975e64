use rusqlite::{Connection, Row};

use snapfeed_types::{format_timestamp, Entity, NewUser, ProfileUpdate, User};

use crate::clock::SharedClock;
use crate::db::rows::{expect_affected, query_list, query_optional, timestamp_column, write_error};
use crate::db::DbPool;
use crate::error::{StoreError, StoreResult};

const USER_COLUMNS: &str =
    "id, email, username, password, is_active, full_name, bio, profile_image, created_at";

fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        username: row.get(2)?,
        password: row.get(3)?,
        is_active: row.get(4)?,
        full_name: row.get(5)?,
        bio: row.get(6)?,
        profile_image: row.get(7)?,
        created_at: timestamp_column(row, 8)?,
    })
}

fn fetch_by_id(conn: &Connection, user_id: i64) -> StoreResult<Option<User>> {
    query_optional(
        conn,
        &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS),
        [user_id],
        map_user,
    )
}

pub struct UserRepository {
    pool: DbPool,
    clock: SharedClock,
}

impl UserRepository {
    pub fn new(pool: DbPool, clock: SharedClock) -> Self {
        Self { pool, clock }
    }

    /// Create a new user. Email and username must both be unused.
    pub fn create(&self, new_user: &NewUser) -> StoreResult<User> {
        let conn = self.pool.get()?;
        let created_at = self.clock.now();
        let bio = new_user.bio.clone().unwrap_or_default();

        conn.execute(
            "INSERT INTO users (email, password, is_active, username, full_name, bio, profile_image, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            (
                &new_user.email,
                &new_user.password,
                new_user.is_active,
                &new_user.username,
                &new_user.full_name,
                &bio,
                &new_user.profile_image,
                format_timestamp(&created_at),
            ),
        )
        .map_err(|e| write_error(User::NAME, e))?;

        let id = conn.last_insert_rowid();
        tracing::debug!(user_id = id, username = %new_user.username, "Created user");

        Ok(User {
            id,
            email: new_user.email.clone(),
            username: new_user.username.clone(),
            password: new_user.password.clone(),
            is_active: new_user.is_active,
            full_name: new_user.full_name.clone(),
            bio,
            profile_image: new_user.profile_image.clone(),
            created_at: Some(created_at),
        })
    }

    /// Get user by ID
    pub fn get_by_id(&self, user_id: i64) -> StoreResult<Option<User>> {
        let conn = self.pool.get()?;
        fetch_by_id(&conn, user_id)
    }

    /// Get user by email
    pub fn get_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let conn = self.pool.get()?;
        query_optional(
            &conn,
            &format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS),
            [email],
            map_user,
        )
    }

    /// Get user by username
    pub fn get_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let conn = self.pool.get()?;
        query_optional(
            &conn,
            &format!("SELECT {} FROM users WHERE username = ?", USER_COLUMNS),
            [username],
            map_user,
        )
    }

    /// All users in creation order
    pub fn list_all(&self) -> StoreResult<Vec<User>> {
        let conn = self.pool.get()?;
        query_list(
            &conn,
            &format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS),
            [],
            map_user,
        )
    }

    /// Replace the profile fields of a user and return the updated row
    pub fn update_profile(&self, user_id: i64, update: &ProfileUpdate) -> StoreResult<User> {
        let conn = self.pool.get()?;
        let affected = conn
            .execute(
                "UPDATE users SET full_name = ?, bio = ?, profile_image = ? WHERE id = ?",
                (
                    &update.full_name,
                    update.bio.as_deref().unwrap_or_default(),
                    &update.profile_image,
                    user_id,
                ),
            )
            .map_err(|e| write_error(User::NAME, e))?;
        expect_affected(affected, User::NAME, user_id)?;

        tracing::debug!(user_id, "Updated user profile");
        fetch_by_id(&conn, user_id)?.ok_or_else(|| StoreError::not_found(User::NAME, user_id))
    }

    /// Set the active flag of a user
    pub fn set_active(&self, user_id: i64, is_active: bool) -> StoreResult<()> {
        let conn = self.pool.get()?;
        let affected = conn
            .execute(
                "UPDATE users SET is_active = ? WHERE id = ?",
                (is_active, user_id),
            )
            .map_err(|e| write_error(User::NAME, e))?;
        expect_affected(affected, User::NAME, user_id)
    }

    /// Delete a user. Rejected while any post, comment, like or follow still
    /// references them.
    pub fn delete(&self, user_id: i64) -> StoreResult<()> {
        let conn = self.pool.get()?;
        let affected = conn
            .execute("DELETE FROM users WHERE id = ?", [user_id])
            .map_err(|e| write_error(User::NAME, e))?;
        expect_affected(affected, User::NAME, user_id)?;
        tracing::debug!(user_id, "Deleted user");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::db::Database;
    use crate::error::ConstraintKind;
    use chrono::{TimeZone, Utc};
    use snapfeed_types::NewPost;
    use std::sync::Arc;

    fn setup_test_db() -> (Database, UserRepository) {
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()));
        let db = Database::in_memory_with_clock(clock).expect("Failed to create test database");
        db.initialize().expect("Failed to initialize schema");
        let repo = db.users();
        (db, repo)
    }

    #[test]
    fn test_create_assigns_id_and_timestamp() {
        let (_db, repo) = setup_test_db();

        let user = repo.create(&NewUser::new("a@x.com", "a", "h")).unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.bio, "");
        assert_eq!(
            user.created_at,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap())
        );

        let fetched = repo.get_by_id(user.id).unwrap().expect("user should exist");
        assert_eq!(fetched, user);
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let (_db, repo) = setup_test_db();
        repo.create(&NewUser::new("a@x.com", "a", "h")).unwrap();

        let err = repo.create(&NewUser::new("a@x.com", "other", "h")).unwrap_err();
        assert_eq!(err.constraint_kind(), Some(ConstraintKind::Unique));
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let (_db, repo) = setup_test_db();
        repo.create(&NewUser::new("a@x.com", "a", "h")).unwrap();

        let err = repo.create(&NewUser::new("b@x.com", "a", "h")).unwrap_err();
        assert_eq!(err.constraint_kind(), Some(ConstraintKind::Unique));
        assert_eq!(repo.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_required_field_rejected() {
        let (_db, repo) = setup_test_db();

        let err = repo.create(&NewUser::new("", "a", "h")).unwrap_err();
        assert_eq!(err.constraint_kind(), Some(ConstraintKind::Required));

        let err = repo.create(&NewUser::new("a@x.com", "a", "")).unwrap_err();
        assert_eq!(err.constraint_kind(), Some(ConstraintKind::Required));
    }

    #[test]
    fn test_overlong_username_rejected() {
        let (_db, repo) = setup_test_db();
        let err = repo
            .create(&NewUser::new("a@x.com", "u".repeat(81), "h"))
            .unwrap_err();
        assert_eq!(err.constraint_kind(), Some(ConstraintKind::Check));
    }

    #[test]
    fn test_lookup_by_unique_fields() {
        let (_db, repo) = setup_test_db();
        let user = repo.create(&NewUser::new("a@x.com", "a", "h")).unwrap();

        assert_eq!(repo.get_by_email("a@x.com").unwrap(), Some(user.clone()));
        assert_eq!(repo.get_by_username("a").unwrap(), Some(user));
        assert_eq!(repo.get_by_username("nobody").unwrap(), None);
        assert_eq!(repo.get_by_id(99).unwrap(), None);
    }

    #[test]
    fn test_update_profile_keeps_identity() {
        let (_db, repo) = setup_test_db();
        let user = repo.create(&NewUser::new("a@x.com", "a", "h")).unwrap();

        let updated = repo
            .update_profile(
                user.id,
                &ProfileUpdate {
                    full_name: Some("Alice".to_string()),
                    bio: Some("hello".to_string()),
                    profile_image: None,
                },
            )
            .unwrap();

        assert_eq!(updated.full_name.as_deref(), Some("Alice"));
        assert_eq!(updated.bio, "hello");
        assert_eq!(updated.id, user.id);
        assert_eq!(updated.email, user.email);
        assert_eq!(updated.created_at, user.created_at);
    }

    #[test]
    fn test_update_missing_user_is_not_found() {
        let (_db, repo) = setup_test_db();
        let err = repo.update_profile(5, &ProfileUpdate::default()).unwrap_err();
        assert!(err.is_not_found());
        assert!(repo.set_active(5, false).unwrap_err().is_not_found());
    }

    #[test]
    fn test_set_active() {
        let (_db, repo) = setup_test_db();
        let user = repo.create(&NewUser::new("a@x.com", "a", "h")).unwrap();
        repo.set_active(user.id, false).unwrap();
        assert!(!repo.get_by_id(user.id).unwrap().unwrap().is_active);
    }

    #[test]
    fn test_delete_restricted_while_referenced() {
        let (db, repo) = setup_test_db();
        let user = repo.create(&NewUser::new("a@x.com", "a", "h")).unwrap();
        let post = db.posts().create(&NewPost::new(user.id, "http://i/1.png")).unwrap();

        let err = repo.delete(user.id).unwrap_err();
        assert!(matches!(
            err,
            StoreError::ConstraintViolation { kind: ConstraintKind::ForeignKey, .. }
        ));

        db.posts().delete(post.id).unwrap();
        repo.delete(user.id).unwrap();
        assert_eq!(repo.get_by_id(user.id).unwrap(), None);
        assert!(repo.delete(user.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let (_db, repo) = setup_test_db();
        let first = repo.create(&NewUser::new("a@x.com", "a", "h")).unwrap();
        repo.delete(first.id).unwrap();
        let second = repo.create(&NewUser::new("a@x.com", "a", "h")).unwrap();
        assert!(second.id > first.id);
    }
}
