use anyhow::{Context, Result};
use chrono::Utc;

use crate::db::DbPool;

use super::ToggleOutcome;

/// A user-to-post edge kept in its own table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngagementKind {
    Like,
    Retweet,
}

impl EngagementKind {
    fn table(&self) -> &'static str {
        match self {
            EngagementKind::Like => "likes",
            EngagementKind::Retweet => "retweets",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EngagementKind::Like => "like",
            EngagementKind::Retweet => "retweet",
        }
    }
}

/// Likes and re-yeets share one shape, so one repository serves both tables
pub struct EngagementRepository {
    pool: DbPool,
    kind: EngagementKind,
}

impl EngagementRepository {
    pub fn new(pool: DbPool, kind: EngagementKind) -> Self {
        Self { pool, kind }
    }

    /// Flip the `(user_id, post_id)` edge inside one transaction
    pub fn toggle(&self, user_id: i64, post_id: i64) -> Result<ToggleOutcome> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let delete = format!(
            "DELETE FROM {} WHERE user_id = ? AND post_id = ?",
            self.kind.table()
        );
        let removed = tx
            .execute(&delete, (user_id, post_id))
            .with_context(|| format!("Failed to remove {}", self.kind.as_str()))?;

        let outcome = if removed > 0 {
            ToggleOutcome::Off
        } else {
            let insert = format!(
                "INSERT INTO {} (user_id, post_id, created_at) VALUES (?, ?, ?)",
                self.kind.table()
            );
            tx.execute(&insert, (user_id, post_id, Utc::now()))
                .with_context(|| format!("Failed to add {}", self.kind.as_str()))?;
            ToggleOutcome::On
        };

        tx.commit()?;
        Ok(outcome)
    }

    /// Number of users engaged with a post
    pub fn count(&self, post_id: i64) -> Result<i64> {
        let conn = self.pool.get()?;
        let query = format!("SELECT COUNT(*) FROM {} WHERE post_id = ?", self.kind.table());
        let count: i64 = conn.query_row(&query, [post_id], |row| row.get(0))?;
        Ok(count)
    }

    /// Whether `user_id` has engaged with `post_id`
    pub fn has_engaged(&self, user_id: i64, post_id: i64) -> Result<bool> {
        let conn = self.pool.get()?;
        let query = format!(
            "SELECT COUNT(*) FROM {} WHERE user_id = ? AND post_id = ?",
            self.kind.table()
        );
        let count: i64 = conn.query_row(&query, (user_id, post_id), |row| row.get(0))?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use proptest::prelude::*;

    fn setup_test_db() -> Database {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize schema");
        db.seed_test_data().expect("Failed to seed test data");
        db
    }

    #[test]
    fn test_like_then_unlike() {
        let db = setup_test_db();
        let likes = EngagementRepository::new(db.pool.clone(), EngagementKind::Like);

        assert_eq!(likes.count(5).unwrap(), 0);
        assert_eq!(likes.toggle(1, 5).unwrap(), ToggleOutcome::On);
        assert_eq!(likes.count(5).unwrap(), 1);
        assert!(likes.has_engaged(1, 5).unwrap());

        assert_eq!(likes.toggle(1, 5).unwrap(), ToggleOutcome::Off);
        assert_eq!(likes.count(5).unwrap(), 0);
        assert!(!likes.has_engaged(1, 5).unwrap());
    }

    #[test]
    fn test_likes_and_retweets_are_separate() {
        let db = setup_test_db();
        let likes = EngagementRepository::new(db.pool.clone(), EngagementKind::Like);
        let retweets = EngagementRepository::new(db.pool.clone(), EngagementKind::Retweet);

        retweets.toggle(3, 1).unwrap();
        assert!(retweets.has_engaged(3, 1).unwrap());
        assert!(!likes.has_engaged(3, 1).unwrap());
        assert_eq!(likes.count(1).unwrap(), 1);
        assert_eq!(retweets.count(1).unwrap(), 1);
    }

    #[test]
    fn test_toggle_unknown_post_fails() {
        let db = setup_test_db();
        let likes = EngagementRepository::new(db.pool.clone(), EngagementKind::Like);
        assert!(likes.toggle(1, 999).is_err());
        assert_eq!(likes.count(999).unwrap(), 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_toggle_parity(toggles in 0usize..12, retweet in any::<bool>()) {
            let db = setup_test_db();
            let kind = if retweet { EngagementKind::Retweet } else { EngagementKind::Like };
            let repo = EngagementRepository::new(db.pool.clone(), kind);

            for _ in 0..toggles {
                repo.toggle(4, 3).unwrap();
            }

            prop_assert_eq!(repo.has_engaged(4, 3).unwrap(), toggles % 2 == 1);
            prop_assert!(repo.count(3).unwrap() <= 1);
        }
    }
}
