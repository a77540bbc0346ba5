use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::OptionalExtension;

use yeet_types::{Follow, FollowUsernames};

use crate::db::DbPool;

use super::ToggleOutcome;

pub struct FollowRepository {
    pool: DbPool,
}

impl FollowRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Flip the `follower_id -> following_id` edge.
    ///
    /// Runs as a single transaction so concurrent toggles cannot observe the
    /// same "absent" state and insert twice.
    pub fn toggle(&self, follower_id: i64, following_id: i64) -> Result<ToggleOutcome> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let removed = tx
            .execute(
                "DELETE FROM follows WHERE user_id = ? AND following_user_id = ?",
                (follower_id, following_id),
            )
            .context("Failed to unfollow user")?;

        let outcome = if removed > 0 {
            ToggleOutcome::Off
        } else {
            tx.execute(
                "INSERT INTO follows (user_id, following_user_id, created_at) VALUES (?, ?, ?)",
                (follower_id, following_id, Utc::now()),
            )
            .context("Failed to follow user")?;
            ToggleOutcome::On
        };

        tx.commit()?;
        Ok(outcome)
    }

    /// Check if user A is following user B
    pub fn is_following(&self, follower_id: i64, following_id: i64) -> Result<bool> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM follows WHERE user_id = ? AND following_user_id = ?",
            (follower_id, following_id),
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Usernames this user follows, in the order they were followed
    pub fn followee_usernames(&self, user_id: i64) -> Result<Vec<String>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT u.username
             FROM follows f
             JOIN users u ON u.id = f.following_user_id
             WHERE f.user_id = ?
             ORDER BY f.created_at, u.id",
        )?;
        let usernames = stmt
            .query_map([user_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(usernames)
    }

    /// Usernames of this user's followers, in the order they followed
    pub fn follower_usernames(&self, user_id: i64) -> Result<Vec<String>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT u.username
             FROM follows f
             JOIN users u ON u.id = f.user_id
             WHERE f.following_user_id = ?
             ORDER BY f.created_at, u.id",
        )?;
        let usernames = stmt
            .query_map([user_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(usernames)
    }

    /// Get follower count
    pub fn follower_count(&self, user_id: i64) -> Result<i64> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM follows WHERE following_user_id = ?",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Get following count
    pub fn following_count(&self, user_id: i64) -> Result<i64> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM follows WHERE user_id = ?",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Every follow edge
    pub fn list_all(&self) -> Result<Vec<Follow>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT user_id, following_user_id, created_at
             FROM follows
             ORDER BY created_at, user_id, following_user_id",
        )?;
        let follows = stmt
            .query_map([], |row| {
                Ok(Follow {
                    user_id: row.get(0)?,
                    following_user_id: row.get(1)?,
                    created_at: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(follows)
    }

    /// First edge where `user_id` is the follower, falling back to the first
    /// edge where it is the one being followed
    pub fn first_edge_for(&self, user_id: i64) -> Result<Option<FollowUsernames>> {
        if let Some(edge) = self.first_edge_where("f.user_id = ?", user_id)? {
            return Ok(Some(edge));
        }
        self.first_edge_where("f.following_user_id = ?", user_id)
    }

    fn first_edge_where(&self, filter: &str, user_id: i64) -> Result<Option<FollowUsernames>> {
        let conn = self.pool.get()?;
        let query = format!(
            "SELECT f.user_id, u1.username, f.following_user_id, u2.username
             FROM follows f
             JOIN users u1 ON u1.id = f.user_id
             JOIN users u2 ON u2.id = f.following_user_id
             WHERE {}
             ORDER BY f.created_at, f.user_id, f.following_user_id
             LIMIT 1",
            filter
        );
        let edge = conn
            .query_row(&query, [user_id], |row| {
                Ok(FollowUsernames {
                    user_id: row.get(0)?,
                    username: row.get(1)?,
                    following_user_id: row.get(2)?,
                    following_username: row.get(3)?,
                })
            })
            .optional()?;
        Ok(edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn setup_test_db() -> (Database, FollowRepository) {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize schema");
        db.seed_test_data().expect("Failed to seed test data");
        let repo = FollowRepository::new(db.pool.clone());
        (db, repo)
    }

    #[test]
    fn test_toggle_follows_then_unfollows() {
        let (_db, repo) = setup_test_db();

        assert!(!repo.is_following(3, 4).unwrap());
        assert_eq!(repo.toggle(3, 4).unwrap(), ToggleOutcome::On);
        assert!(repo.is_following(3, 4).unwrap());
        assert_eq!(repo.follower_count(4).unwrap(), 1);

        assert_eq!(repo.toggle(3, 4).unwrap(), ToggleOutcome::Off);
        assert!(!repo.is_following(3, 4).unwrap());
        assert_eq!(repo.follower_count(4).unwrap(), 0);
    }

    #[test]
    fn test_toggle_is_directed() {
        let (_db, repo) = setup_test_db();

        // alice -> bob and bob -> alice are independent edges
        assert_eq!(repo.toggle(1, 2).unwrap(), ToggleOutcome::Off);
        assert!(repo.is_following(2, 1).unwrap());
    }

    #[test]
    fn test_self_follow_is_rejected() {
        let (_db, repo) = setup_test_db();
        assert!(repo.toggle(3, 3).is_err());
        assert!(!repo.is_following(3, 3).unwrap());
    }

    #[test]
    fn test_username_lists_and_counts() {
        let (_db, repo) = setup_test_db();

        assert_eq!(repo.followee_usernames(1).unwrap(), vec!["bob", "charlie"]);
        assert_eq!(repo.follower_usernames(1).unwrap(), vec!["bob", "diana"]);
        assert_eq!(repo.following_count(1).unwrap(), 2);
        assert_eq!(repo.follower_count(1).unwrap(), 2);
        assert!(repo.followee_usernames(3).unwrap().is_empty());
    }

    #[test]
    fn test_list_all_edges() {
        let (_db, repo) = setup_test_db();
        let edges = repo.list_all().unwrap();
        assert_eq!(edges.len(), 4);
        assert_eq!((edges[0].user_id, edges[0].following_user_id), (1, 2));
    }

    #[test]
    fn test_first_edge_prefers_follower_role() {
        let (_db, repo) = setup_test_db();

        let edge = repo.first_edge_for(1).unwrap().unwrap();
        assert_eq!(edge.username, "alice");
        assert_eq!(edge.following_username, "bob");

        // charlie follows nobody but is followed by alice
        let edge = repo.first_edge_for(3).unwrap().unwrap();
        assert_eq!(edge.username, "alice");
        assert_eq!(edge.following_username, "charlie");

        assert!(repo.first_edge_for(999).unwrap().is_none());
    }
}
