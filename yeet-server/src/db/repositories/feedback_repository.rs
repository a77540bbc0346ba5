use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::OptionalExtension;

use yeet_types::{FeedbackOption, FeedbackOptionCount, FeedbackStats};

use crate::db::DbPool;

/// Result of mapping reason texts onto predefined options
#[derive(Debug, PartialEq, Eq)]
pub enum OptionLookup {
    /// Distinct option ids, in first-seen order
    Found(Vec<i64>),
    /// The first text that matched no option
    Unknown(String),
}

pub struct FeedbackRepository {
    pool: DbPool,
}

impl FeedbackRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Predefined reasons, optionally only the positive or negative ones
    pub fn list_options(&self, positive: Option<bool>) -> Result<Vec<FeedbackOption>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, text, is_positive
             FROM feedback_options
             WHERE ?1 IS NULL OR is_positive = ?1
             ORDER BY id",
        )?;
        let options = stmt
            .query_map([positive], |row| {
                Ok(FeedbackOption {
                    id: row.get(0)?,
                    text: row.get(1)?,
                    is_positive: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(options)
    }

    /// Map reason texts to option ids, dropping repeats
    pub fn resolve_options(&self, texts: &[String]) -> Result<OptionLookup> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare("SELECT id FROM feedback_options WHERE text = ?")?;

        let mut ids = Vec::with_capacity(texts.len());
        for text in texts {
            let id: Option<i64> = stmt.query_row([text], |row| row.get(0)).optional()?;
            match id {
                Some(id) if !ids.contains(&id) => ids.push(id),
                Some(_) => {}
                None => return Ok(OptionLookup::Unknown(text.clone())),
            }
        }
        Ok(OptionLookup::Found(ids))
    }

    /// Store one survey and its selected reasons, returning the survey id
    pub fn record_survey(&self, user_id: Option<i64>, likes_app: bool, option_ids: &[i64]) -> Result<i64> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO feedback_surveys (user_id, likes_app, created_at) VALUES (?, ?, ?)",
            (user_id, likes_app, Utc::now()),
        )
        .context("Failed to record feedback survey")?;
        let survey_id = tx.last_insert_rowid();

        for option_id in option_ids {
            tx.execute(
                "INSERT OR IGNORE INTO feedback_survey_options (survey_id, option_id) VALUES (?, ?)",
                (survey_id, option_id),
            )
            .with_context(|| format!("Failed to attach option {} to survey", option_id))?;
        }

        tx.commit()?;
        Ok(survey_id)
    }

    /// Totals across every survey plus per-reason selection counts
    pub fn stats(&self) -> Result<FeedbackStats> {
        let conn = self.pool.get()?;
        let (total, like_count): (i64, i64) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(likes_app), 0) FROM feedback_surveys",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let mut stmt = conn.prepare(
            "SELECT o.id, o.text, o.is_positive, COUNT(so.survey_id)
             FROM feedback_options o
             LEFT JOIN feedback_survey_options so ON so.option_id = o.id
             GROUP BY o.id
             ORDER BY o.id",
        )?;
        let options_count = stmt
            .query_map([], |row| {
                Ok(FeedbackOptionCount {
                    id: row.get(0)?,
                    text: row.get(1)?,
                    is_positive: row.get(2)?,
                    count: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FeedbackStats {
            total,
            like_count,
            dislike_count: total - like_count,
            options_count,
        })
    }
}
