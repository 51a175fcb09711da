mod cache;
mod error;
mod models;

pub use cache::RemarkCache;
pub use error::{DbError, Result};
pub use models::{NICKNAME_MAX_CHARS, Remark, UpsertOutcome};

use std::path::Path;
use tokio_rusqlite::Connection;
use tokio_rusqlite::rusqlite::{OptionalExtension, params};
use tracing::{debug, info};

/// Durable remark table: account id -> group nickname.
///
/// All statements run on the connection's worker thread, so concurrent
/// callers are serialized through it.
#[derive(Clone)]
pub struct Database {
  conn: Connection,
}

impl Database {
  /// Open or create a database at the given path.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = Connection::open(path).await?;
    let db = Self { conn };
    db.initialize().await?;
    Ok(db)
  }

  /// Create an in-memory database (useful for testing).
  pub async fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory().await?;
    let db = Self { conn };
    db.initialize().await?;
    Ok(db)
  }

  /// Initialize the database schema.
  async fn initialize(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        // Enable WAL mode for better concurrent read/write performance
        conn.pragma_update(None, "journal_mode", "WAL")?;

        // LIKE is case-insensitive for ASCII by default; prefix matching
        // on nicknames must be case-sensitive (must be set per-connection)
        conn.pragma_update(None, "case_sensitive_like", "ON")?;

        conn.execute_batch(
          r#"
          CREATE TABLE IF NOT EXISTS remarks (
              account_id INTEGER PRIMARY KEY,
              nickname CHAR(48)
          );
          "#,
        )?;
        Ok(())
      })
      .await?;

    info!("database initialized");
    Ok(())
  }

  /// Close the underlying connection and shut down its worker thread.
  /// Calls through remaining clones fail with a connection error afterwards.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  /// Look up the recorded nickname for an account id.
  /// Returns None if no row exists.
  pub async fn get_remark(&self, account_id: u64) -> Result<Option<Remark>> {
    let remark = self
      .conn
      .call(move |conn| {
        conn
          .prepare_cached("SELECT account_id, nickname FROM remarks WHERE account_id = ?1")?
          .query_row(params![account_id], |row| {
            Ok(Remark {
              account_id: row.get(0)?,
              nickname: row.get(1)?,
            })
          })
          .optional()
          .map_err(Into::into)
      })
      .await?;

    Ok(remark)
  }

  /// Write a nickname, updating the existing row or inserting a new one.
  ///
  /// Runs an UPDATE first and falls back to INSERT when no row was touched,
  /// which saves a separate existence check. Any row count other than
  /// exactly one on the path that ran is an integrity failure.
  pub async fn upsert_remark(
    &self,
    account_id: u64,
    nickname: Option<String>,
  ) -> Result<UpsertOutcome> {
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let updated = tx
          .prepare_cached("UPDATE remarks SET nickname = ?1 WHERE account_id = ?2")?
          .execute(params![&nickname, account_id])?;

        let outcome = match updated {
          1 => UpsertOutcome::Updated,
          0 => {
            let inserted = tx
              .prepare_cached("INSERT INTO remarks (account_id, nickname) VALUES (?1, ?2)")?
              .execute(params![account_id, &nickname])?;
            if inserted != 1 {
              return Ok(Err(DbError::InsertRowCount { rows: inserted }));
            }
            UpsertOutcome::Inserted
          }
          rows => {
            return Ok(Err(DbError::UpdateRowCount { account_id, rows }));
          }
        };

        tx.commit()?;
        Ok(Ok(outcome))
      })
      .await??;

    debug!(account_id, ?outcome, "wrote remark");
    Ok(outcome)
  }

  /// All remarks whose nickname starts with `prefix`, case-sensitive.
  /// Rows with a NULL nickname never match.
  pub async fn query_remarks_by_prefix(&self, prefix: String) -> Result<Vec<Remark>> {
    let pattern = format!("{}%", escape_like(&prefix));

    let remarks = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached(
          r"SELECT account_id, nickname FROM remarks
            WHERE nickname IS NOT NULL AND nickname LIKE ?1 ESCAPE '\'",
        )?;

        let remarks = stmt
          .query_map(params![&pattern], |row| {
            Ok(Remark {
              account_id: row.get(0)?,
              nickname: row.get(1)?,
            })
          })?
          .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(remarks)
      })
      .await?;

    Ok(remarks)
  }
}

/// Escape LIKE metacharacters so the prefix is matched literally.
fn escape_like(prefix: &str) -> String {
  let mut out = String::with_capacity(prefix.len());
  for c in prefix.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_get_remark_absent() {
    let db = Database::open_in_memory().await.unwrap();

    assert!(db.get_remark(10001).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn test_calls_after_close_fail() {
    let db = Database::open_in_memory().await.unwrap();
    let clone = db.clone();

    db.close().await.unwrap();

    assert!(clone.get_remark(1).await.is_err());
    assert!(
      clone
        .upsert_remark(1, Some("Alice".to_string()))
        .await
        .is_err()
    );
  }

  #[tokio::test]
  async fn test_upsert_inserts_then_updates() {
    let db = Database::open_in_memory().await.unwrap();

    // First write for an id inserts
    let outcome = db
      .upsert_remark(10001, Some("Alice_main".to_string()))
      .await
      .unwrap();
    assert_eq!(outcome, UpsertOutcome::Inserted);
    assert!(outcome.inserted());

    // Every subsequent write updates, even with the same value
    let outcome = db
      .upsert_remark(10001, Some("Alice_main".to_string()))
      .await
      .unwrap();
    assert_eq!(outcome, UpsertOutcome::Updated);

    let outcome = db
      .upsert_remark(10001, Some("Alice_alt".to_string()))
      .await
      .unwrap();
    assert_eq!(outcome, UpsertOutcome::Updated);

    let remark = db.get_remark(10001).await.unwrap().unwrap();
    assert_eq!(remark.nickname.as_deref(), Some("Alice_alt"));
  }

  #[tokio::test]
  async fn test_upsert_null_nickname() {
    let db = Database::open_in_memory().await.unwrap();

    let outcome = db.upsert_remark(10002, None).await.unwrap();
    assert_eq!(outcome, UpsertOutcome::Inserted);

    // The row exists but carries no nickname
    let remark = db.get_remark(10002).await.unwrap().unwrap();
    assert!(remark.nickname.is_none());

    let outcome = db
      .upsert_remark(10002, Some("Bob".to_string()))
      .await
      .unwrap();
    assert_eq!(outcome, UpsertOutcome::Updated);
  }

  #[tokio::test]
  async fn test_prefix_query_matches_anchored() {
    let db = Database::open_in_memory().await.unwrap();

    db.upsert_remark(1, Some("Alice_main".to_string()))
      .await
      .unwrap();
    db.upsert_remark(2, Some("Alice".to_string())).await.unwrap();
    db.upsert_remark(3, Some("Bob_Alice".to_string()))
      .await
      .unwrap();
    db.upsert_remark(4, None).await.unwrap();

    let mut ids: Vec<u64> = db
      .query_remarks_by_prefix("Alice".to_string())
      .await
      .unwrap()
      .into_iter()
      .map(|r| r.account_id)
      .collect();
    ids.sort_unstable();

    // Anchored at position 0: "Bob_Alice" does not match
    assert_eq!(ids, vec![1, 2]);
  }

  #[tokio::test]
  async fn test_prefix_query_is_case_sensitive() {
    let db = Database::open_in_memory().await.unwrap();

    db.upsert_remark(1, Some("Alice".to_string())).await.unwrap();

    assert!(
      db.query_remarks_by_prefix("alice".to_string())
        .await
        .unwrap()
        .is_empty()
    );
    assert_eq!(
      db.query_remarks_by_prefix("Ali".to_string())
        .await
        .unwrap()
        .len(),
      1
    );
  }

  #[tokio::test]
  async fn test_prefix_query_escapes_like_wildcards() {
    let db = Database::open_in_memory().await.unwrap();

    db.upsert_remark(1, Some("a_b".to_string())).await.unwrap();
    db.upsert_remark(2, Some("axb".to_string())).await.unwrap();
    db.upsert_remark(3, Some("100%".to_string())).await.unwrap();

    // "_" and "%" in the prefix are literal, not wildcards
    let remarks = db.query_remarks_by_prefix("a_".to_string()).await.unwrap();
    assert_eq!(remarks.len(), 1);
    assert_eq!(remarks[0].account_id, 1);

    let remarks = db
      .query_remarks_by_prefix("100%".to_string())
      .await
      .unwrap();
    assert_eq!(remarks.len(), 1);
    assert_eq!(remarks[0].account_id, 3);
  }

  #[tokio::test]
  async fn test_empty_prefix_matches_all_named_rows() {
    let db = Database::open_in_memory().await.unwrap();

    db.upsert_remark(1, Some("Alice".to_string())).await.unwrap();
    db.upsert_remark(2, None).await.unwrap();

    // NULL nicknames are excluded even by the empty prefix
    let remarks = db.query_remarks_by_prefix(String::new()).await.unwrap();
    assert_eq!(remarks.len(), 1);
    assert_eq!(remarks[0].account_id, 1);
  }
}
