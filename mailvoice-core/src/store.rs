//! Sent-email store access.

use crate::clean::MIN_BODY_CHARS;
use crate::error::PrepError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Hard cap on fetched emails per run.
pub const FETCH_LIMIT: usize = 500;

/// A sent email as stored. Read-only once fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEmail {
    pub id: String,
    pub subject: String,
    pub text_plain: String,
    pub text_html: Option<String>,
    pub snippet: Option<String>,
    pub sent_at: String,
    pub from_email: String,
    pub to_email: String,
}

/// Emails tied to the user's automated-send activity: executed rules
/// joined back to the account and the emails on the same thread.
const SENT_EMAIL_QUERY: &str = "
    SELECT
        e.id,
        e.subject,
        e.text_plain,
        e.text_html,
        e.snippet,
        e.sent_at,
        e.from_email,
        e.to_email
    FROM executed_rules er
    JOIN rules r ON er.rule_id = r.id
    JOIN email_accounts ea ON r.user_id = ea.user_id
    LEFT JOIN emails e ON er.thread_id = e.thread_id
    WHERE ea.user_id = ?1
        AND er.actions LIKE '%SEND_EMAIL%'
        AND e.text_plain IS NOT NULL
        AND LENGTH(e.text_plain) > ";

/// Read-only handle over the mail database.
///
/// Owns one connection for the duration of a run; dropping the store
/// releases it on every exit path.
pub struct EmailStore {
    conn: rusqlite::Connection,
}

impl EmailStore {
    /// Open the store read-only. `db_url` is a filesystem path,
    /// optionally prefixed with `sqlite://`.
    pub fn open(db_url: &str) -> Result<Self, PrepError> {
        let path = db_url.strip_prefix("sqlite://").unwrap_or(db_url);
        let conn = rusqlite::Connection::open_with_flags(
            Path::new(path),
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        )
        .map_err(|e| PrepError::store(format!("cannot open {path}: {e}")))?;
        info!(db = %path, "connected to mail store");
        Ok(Self { conn })
    }

    /// Fetch the user's most recent automated-send emails, newest first,
    /// capped at [`FETCH_LIMIT`] and restricted to plain-text bodies
    /// longer than [`MIN_BODY_CHARS`] characters.
    ///
    /// A failing query is logged and collapsed to an empty vector;
    /// callers decide whether the run can proceed by checking a minimum
    /// count, so an empty result is a valid (if unusable) outcome.
    pub fn fetch_sent_emails(&self, user_id: &str) -> Vec<RawEmail> {
        match self.try_fetch(user_id) {
            Ok(emails) => {
                info!(count = emails.len(), "fetched sent emails");
                emails
            }
            Err(e) => {
                warn!(error = %e, "email fetch failed, treating as empty");
                Vec::new()
            }
        }
    }

    fn try_fetch(&self, user_id: &str) -> Result<Vec<RawEmail>, PrepError> {
        let query = format!(
            "{SENT_EMAIL_QUERY}{MIN_BODY_CHARS}
    ORDER BY e.sent_at DESC
    LIMIT {FETCH_LIMIT}"
        );
        let mut stmt = self.conn.prepare(&query)?;
        let mut rows = stmt.query([user_id])?;

        let mut emails = Vec::new();
        while let Some(row) = rows.next()? {
            emails.push(RawEmail {
                id: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                subject: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                text_plain: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                text_html: row.get(3)?,
                snippet: row.get(4)?,
                sent_at: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
                from_email: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
                to_email: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
            });
        }
        Ok(emails)
    }
}
