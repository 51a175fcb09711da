/// Maximum nickname length in characters (the column is CHAR(48)).
pub const NICKNAME_MAX_CHARS: usize = 48;

/// A recorded group nickname for one messaging-platform account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remark {
  /// Numeric account id on the messaging platform (primary key)
  pub account_id: u64,
  /// Group display nickname; NULL in the table maps to None
  pub nickname: Option<String>,
}

/// Which of the two upsert paths ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
  /// No row existed for the account id; a new one was inserted.
  Inserted,
  /// An existing row was updated in place.
  Updated,
}

impl UpsertOutcome {
  pub fn inserted(self) -> bool {
    matches!(self, UpsertOutcome::Inserted)
  }
}
