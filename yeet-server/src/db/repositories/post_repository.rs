use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{OptionalExtension, Row};

use yeet_types::{FeedPost, Post};

use crate::db::DbPool;

/// Columns for a feed item. The viewer id is bound twice, for the liked and
/// retweeted flags.
const FEED_SELECT: &str =
    "SELECT p.user_id, u.username, p.post_id, p.content, p.created_at,
            p.latitude, p.longitude, p.location_name,
            (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.post_id) AS like_count,
            EXISTS(SELECT 1 FROM likes l WHERE l.post_id = p.post_id AND l.user_id = ?1) AS liked_by_user,
            (SELECT COUNT(*) FROM retweets r WHERE r.post_id = p.post_id) AS retweet_count,
            EXISTS(SELECT 1 FROM retweets r WHERE r.post_id = p.post_id AND r.user_id = ?1) AS retweeted_by_user
     FROM posts p
     JOIN users u ON p.user_id = u.id";

/// Fields needed to publish a yeet
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub user_id: i64,
    pub content: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_name: Option<String>,
}

pub struct PostRepository {
    pool: DbPool,
}

impl PostRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a new post and return it as stored
    pub fn create(&self, new_post: &NewPost) -> Result<Post> {
        let conn = self.pool.get()?;
        let created_at = Utc::now();
        conn.execute(
            "INSERT INTO posts (user_id, content, latitude, longitude, location_name, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                new_post.user_id,
                &new_post.content,
                new_post.latitude,
                new_post.longitude,
                &new_post.location_name,
                created_at,
            ),
        )
        .context("Failed to create post")?;

        Ok(Post {
            post_id: conn.last_insert_rowid(),
            user_id: new_post.user_id,
            content: new_post.content.clone(),
            latitude: new_post.latitude,
            longitude: new_post.longitude,
            location_name: new_post.location_name.clone(),
            created_at,
        })
    }

    /// Get a single post by ID
    pub fn get_by_id(&self, post_id: i64) -> Result<Option<Post>> {
        let conn = self.pool.get()?;
        let post = conn
            .query_row(
                "SELECT post_id, user_id, content, latitude, longitude, location_name, created_at
                 FROM posts
                 WHERE post_id = ?",
                [post_id],
                post_from_row,
            )
            .optional()?;
        Ok(post)
    }

    /// Every post, oldest first
    pub fn list_all(&self) -> Result<Vec<Post>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT post_id, user_id, content, latitude, longitude, location_name, created_at
             FROM posts
             ORDER BY post_id",
        )?;
        let posts = stmt
            .query_map([], post_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(posts)
    }

    /// Contents of a user's posts, oldest first
    pub fn contents_by_user(&self, user_id: i64) -> Result<Vec<String>> {
        let conn = self.pool.get()?;
        let mut stmt =
            conn.prepare("SELECT content FROM posts WHERE user_id = ? ORDER BY post_id")?;
        let contents = stmt
            .query_map([user_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(contents)
    }

    /// Get post count for a user
    pub fn count_by_user(&self, user_id: i64) -> Result<i64> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM posts WHERE user_id = ?",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Posts by everyone `viewer_id` follows, newest first, with engagement
    /// counts and the viewer's own like/re-yeet flags
    pub fn feed_for(&self, viewer_id: i64) -> Result<Vec<FeedPost>> {
        let conn = self.pool.get()?;
        let query = format!(
            "{}
             JOIN follows f ON f.following_user_id = p.user_id
             WHERE f.user_id = ?1
             ORDER BY p.created_at DESC, p.post_id DESC",
            FEED_SELECT
        );
        let mut stmt = conn.prepare(&query)?;
        let posts = stmt
            .query_map([viewer_id], feed_post_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(posts)
    }

    /// One author's posts as feed items seen by `viewer_id`, newest first
    pub fn posts_by_author(&self, author_id: i64, viewer_id: Option<i64>) -> Result<Vec<FeedPost>> {
        let conn = self.pool.get()?;
        let query = format!(
            "{}
             WHERE p.user_id = ?2
             ORDER BY p.created_at DESC, p.post_id DESC",
            FEED_SELECT
        );
        let mut stmt = conn.prepare(&query)?;
        let posts = stmt
            .query_map((viewer_id, author_id), feed_post_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(posts)
    }
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        post_id: row.get(0)?,
        user_id: row.get(1)?,
        content: row.get(2)?,
        latitude: row.get(3)?,
        longitude: row.get(4)?,
        location_name: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn feed_post_from_row(row: &Row<'_>) -> rusqlite::Result<FeedPost> {
    Ok(FeedPost {
        user_id: row.get(0)?,
        username: row.get(1)?,
        post_id: row.get(2)?,
        post_content: row.get(3)?,
        post_timestamp: row.get(4)?,
        latitude: row.get(5)?,
        longitude: row.get(6)?,
        location_name: row.get(7)?,
        like_count: row.get(8)?,
        liked_by_user: row.get(9)?,
        retweet_count: row.get(10)?,
        retweeted_by_user: row.get(11)?,
    })
}
