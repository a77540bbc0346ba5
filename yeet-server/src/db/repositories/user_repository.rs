use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Row};

use yeet_types::{User, UserSearchResult};

use crate::db::DbPool;

const USER_COLUMNS: &str =
    "id, username, email, first_name, last_name, password_hash, bio, date_joined, last_login, google_id";

/// Full account row, including the fields that are never serialized
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: Option<String>,
    pub bio: Option<String>,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub google_id: Option<String>,
}

impl UserRecord {
    pub fn to_user(&self) -> User {
        User {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            last_login: self.last_login,
        }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            first_name: row.get(3)?,
            last_name: row.get(4)?,
            password_hash: row.get(5)?,
            bio: row.get(6)?,
            date_joined: row.get(7)?,
            last_login: row.get(8)?,
            google_id: row.get(9)?,
        })
    }
}

/// Fields needed to create an account
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
}

pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert a new user and return the stored record
    pub fn create(&self, new_user: &NewUser) -> Result<UserRecord> {
        let conn = self.pool.get()?;
        let now = Utc::now();
        conn.execute(
            "INSERT INTO users (username, email, first_name, last_name, password_hash, date_joined, google_id)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            (
                &new_user.username,
                &new_user.email,
                &new_user.first_name,
                &new_user.last_name,
                &new_user.password_hash,
                now,
                &new_user.google_id,
            ),
        )
        .context("Failed to create user")?;

        Ok(UserRecord {
            id: conn.last_insert_rowid(),
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            first_name: new_user.first_name.clone(),
            last_name: new_user.last_name.clone(),
            password_hash: new_user.password_hash.clone(),
            bio: None,
            date_joined: now,
            last_login: None,
            google_id: new_user.google_id.clone(),
        })
    }

    /// Get user by ID
    pub fn get_by_id(&self, user_id: i64) -> Result<Option<UserRecord>> {
        self.find_one("id = ?", user_id)
    }

    /// Get user by exact username
    pub fn get_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        self.find_one("username = ?", username)
    }

    /// Get user by exact email
    pub fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        self.find_one("email = ?", email)
    }

    fn find_one<P: rusqlite::ToSql>(&self, filter: &str, value: P) -> Result<Option<UserRecord>> {
        let conn = self.pool.get()?;
        let query = format!("SELECT {} FROM users WHERE {}", USER_COLUMNS, filter);
        let user = conn
            .query_row(&query, [value], UserRecord::from_row)
            .optional()?;
        Ok(user)
    }

    /// List every user in id order
    pub fn list_all(&self) -> Result<Vec<UserRecord>> {
        let conn = self.pool.get()?;
        let query = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
        let mut stmt = conn.prepare(&query)?;
        let users = stmt
            .query_map([], UserRecord::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Case-insensitive username substring search.
    /// Exact matches come first, then alphabetical order.
    pub fn search(&self, query: &str, limit: i64) -> Result<Vec<UserSearchResult>> {
        let conn = self.pool.get()?;
        let needle = query.to_lowercase();
        let pattern = format!("%{}%", escape_like(&needle));
        let mut stmt = conn.prepare(
            "SELECT id, username, first_name, last_name
             FROM users
             WHERE LOWER(username) LIKE ? ESCAPE '\\'
             ORDER BY (LOWER(username) = ?) DESC, username ASC
             LIMIT ?",
        )?;

        let results = stmt
            .query_map((pattern, &needle, limit), |row| {
                Ok(UserSearchResult {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    first_name: row.get(2)?,
                    last_name: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(results)
    }

    pub fn username_exists(&self, username: &str) -> Result<bool> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE username = ?",
            [username],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn email_exists(&self, email: &str) -> Result<bool> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE email = ?",
            [email],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Record a successful login
    pub fn touch_last_login(&self, user_id: i64) -> Result<DateTime<Utc>> {
        let conn = self.pool.get()?;
        let now = Utc::now();
        conn.execute(
            "UPDATE users SET last_login = ? WHERE id = ?",
            (now, user_id),
        )
        .context("Failed to update last login")?;
        Ok(now)
    }

    /// Attach a Google account to an existing user
    pub fn link_google_id(&self, user_id: i64, google_id: &str) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "UPDATE users SET google_id = ? WHERE id = ? AND google_id IS NULL",
            (google_id, user_id),
        )
        .context("Failed to link Google account")?;
        Ok(())
    }
}

/// Which UNIQUE column an insert or update collided on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
    GoogleId,
}

/// Classify a UNIQUE constraint failure on the users table; anything else is None
pub fn unique_violation(err: &anyhow::Error) -> Option<UniqueField> {
    match err.downcast_ref::<rusqlite::Error>()? {
        rusqlite::Error::SqliteFailure(e, Some(msg))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            if msg.contains("users.username") {
                Some(UniqueField::Username)
            } else if msg.contains("users.email") {
                Some(UniqueField::Email)
            } else if msg.contains("users.google_id") {
                Some(UniqueField::GoogleId)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Escape LIKE wildcards so user input only matches literally
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn setup_test_db() -> (Database, UserRepository) {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize schema");
        db.seed_test_data().expect("Failed to seed test data");
        let repo = UserRepository::new(db.pool.clone());
        (db, repo)
    }

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_and_lookup() {
        let (_db, repo) = setup_test_db();

        let created = repo.create(&new_user("erin", "erin@example.com")).unwrap();
        assert!(created.id > 4);

        let by_name = repo.get_by_username("erin").unwrap().unwrap();
        assert_eq!(by_name.id, created.id);
        assert_eq!(by_name.email, "erin@example.com");
        assert!(by_name.password_hash.is_none());

        let by_email = repo.get_by_email("erin@example.com").unwrap().unwrap();
        assert_eq!(by_email.username, "erin");

        assert!(repo.get_by_id(created.id).unwrap().is_some());
        assert!(repo.get_by_username("nobody").unwrap().is_none());
    }

    #[test]
    fn test_username_and_email_are_unique() {
        let (_db, repo) = setup_test_db();

        assert!(repo.create(&new_user("alice", "other@example.com")).is_err());
        assert!(repo.create(&new_user("someone", "alice@example.com")).is_err());
        assert!(repo.username_exists("alice").unwrap());
        assert!(repo.email_exists("bob@example.com").unwrap());
        assert!(!repo.email_exists("ghost@example.com").unwrap());
    }

    #[test]
    fn test_unique_violation_names_the_column() {
        let (_db, repo) = setup_test_db();

        let err = repo.create(&new_user("alice", "fresh@example.com")).unwrap_err();
        assert_eq!(unique_violation(&err), Some(UniqueField::Username));

        let err = repo.create(&new_user("fresh", "bob@example.com")).unwrap_err();
        assert_eq!(unique_violation(&err), Some(UniqueField::Email));

        let mut linked = new_user("gina", "gina@example.com");
        linked.google_id = Some("g-1".to_string());
        repo.create(&linked).unwrap();
        let mut again = new_user("gina2", "gina2@example.com");
        again.google_id = Some("g-1".to_string());
        let err = repo.create(&again).unwrap_err();
        assert_eq!(unique_violation(&err), Some(UniqueField::GoogleId));

        assert_eq!(unique_violation(&anyhow::anyhow!("pool exhausted")), None);
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let (_db, repo) = setup_test_db();

        let results = repo.search("LI", 20).unwrap();
        let names: Vec<_> = results.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "charlie"]);
    }

    #[test]
    fn test_search_exact_match_first() {
        let (_db, repo) = setup_test_db();
        repo.create(&new_user("bobby", "bobby@example.com")).unwrap();
        repo.create(&new_user("abob", "abob@example.com")).unwrap();

        let results = repo.search("bob", 20).unwrap();
        let names: Vec<_> = results.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["bob", "abob", "bobby"]);
    }

    #[test]
    fn test_search_treats_wildcards_literally() {
        let (_db, repo) = setup_test_db();
        repo.create(&new_user("under_score", "u@example.com")).unwrap();

        let results = repo.search("_", 20).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].username, "under_score");

        assert!(repo.search("%", 20).unwrap().is_empty());
    }

    #[test]
    fn test_touch_last_login() {
        let (_db, repo) = setup_test_db();
        assert!(repo.get_by_id(1).unwrap().unwrap().last_login.is_none());

        repo.touch_last_login(1).unwrap();
        assert!(repo.get_by_id(1).unwrap().unwrap().last_login.is_some());
    }

    #[test]
    fn test_link_google_id_only_once() {
        let (_db, repo) = setup_test_db();
        repo.link_google_id(2, "g-123").unwrap();
        repo.link_google_id(2, "g-456").unwrap();

        let bob = repo.get_by_id(2).unwrap().unwrap();
        assert_eq!(bob.google_id.as_deref(), Some("g-123"));
    }
}
