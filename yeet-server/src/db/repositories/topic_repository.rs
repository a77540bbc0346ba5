use anyhow::{Context, Result};
use chrono::Utc;

use yeet_types::Topic;

use crate::db::DbPool;

pub struct TopicRepository {
    pool: DbPool,
}

impl TopicRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn create(&self, title: &str, description: &str, location: Option<&str>) -> Result<Topic> {
        let conn = self.pool.get()?;
        let created_at = Utc::now();
        conn.execute(
            "INSERT INTO topics (title, description, location, created_at) VALUES (?, ?, ?, ?)",
            (title, description, location, created_at),
        )
        .context("Failed to create topic")?;

        Ok(Topic {
            id: conn.last_insert_rowid(),
            title: title.to_string(),
            description: description.to_string(),
            location: location.map(str::to_string),
            created_at,
        })
    }

    pub fn list_all(&self) -> Result<Vec<Topic>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, title, description, location, created_at FROM topics ORDER BY id",
        )?;
        let topics = stmt
            .query_map([], |row| {
                Ok(Topic {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    description: row.get(2)?,
                    location: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(topics)
    }
}
