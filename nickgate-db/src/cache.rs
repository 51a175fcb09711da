//! In-memory layer in front of the remark table.
//!
//! Read-through on miss, write-through on update, never evicts. The map is
//! written before the store on updates, so concurrent readers see a new
//! nickname immediately; a failed persist leaves the map ahead of the table,
//! and retrying the write with the same value converges.

use crate::error::Result;
use crate::models::UpsertOutcome;
use crate::Database;

use tracing::{info, warn};

/// Cache of account id -> nickname, backed by [`Database`].
///
/// Uses scc::HashMap for lock-free concurrent access; the store itself is
/// serialized on the connection's worker thread, so no lock ordering between
/// the two layers exists.
pub struct RemarkCache {
  db: Database,
  // Entry present = last value this process read or wrote.
  // Value None = row exists with a NULL nickname.
  entries: scc::HashMap<u64, Option<String>>,
}

impl RemarkCache {
  pub fn new(db: Database) -> Self {
    Self {
      db,
      entries: scc::HashMap::new(),
    }
  }

  /// Current nickname for an account id.
  ///
  /// A hit returns without touching the store. A miss reads through and
  /// populates the map when a row exists; an absent row is not cached, so a
  /// later write by another actor is observed on the next read.
  pub async fn get(&self, account_id: u64) -> Result<Option<String>> {
    if let Some(nickname) = self.entries.read_async(&account_id, |_, v| v.clone()).await {
      return Ok(nickname);
    }

    let Some(remark) = self.db.get_remark(account_id).await? else {
      return Ok(None);
    };

    // A concurrent put may have landed first; keep its (newer) value.
    let _ = self
      .entries
      .insert_async(account_id, remark.nickname.clone())
      .await;

    Ok(remark.nickname)
  }

  /// Write a nickname through to the store.
  ///
  /// The map advances even when the store write fails; callers that receive
  /// the error must not assume persistence and may simply retry.
  pub async fn put(&self, account_id: u64, nickname: Option<String>) -> Result<UpsertOutcome> {
    self
      .entries
      .entry_async(account_id)
      .await
      .and_modify(|v| *v = nickname.clone())
      .or_insert(nickname.clone());

    self.db.upsert_remark(account_id, nickname).await.inspect_err(|err| {
      warn!(account_id, %err, "remark persisted to cache only");
    })
  }

  /// Handle a nickname observed out of band (e.g. a group chat message).
  ///
  /// A no-op when the value equals the one currently cached; otherwise a
  /// write-through. Returns whether anything changed.
  pub async fn observe_nickname(&self, account_id: u64, nickname: String) -> Result<bool> {
    let cached = self.entries.read_async(&account_id, |_, v| v.clone()).await;
    if let Some(Some(old)) = &cached {
      if *old == nickname {
        return Ok(false);
      }
    }

    info!(
      account_id,
      new = %nickname,
      old = ?cached.flatten(),
      "group nickname changed"
    );

    let outcome = self.put(account_id, Some(nickname)).await?;
    if outcome.inserted() {
      info!(account_id, "recorded first nickname for account");
    }

    Ok(true)
  }
}
