//! Connection gating: a player may connect only when their claimed in-game
//! name is a prefix of their recorded group nickname.

use crate::bot::GroupBot;
use crate::helpers::now_ms;
use crate::session::SessionTracker;

use nickgate_db::RemarkCache;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Terminal verdict of one connection attempt. A later attempt re-runs the
/// whole evaluation from scratch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Allowed,
    /// The nickname lookup itself failed; fail closed.
    RejectedError { message: String },
    /// Nickname mismatch and the remote rename did not go through.
    RejectedMismatch { message: String },
}

impl GateOutcome {
    pub fn allowed(&self) -> bool {
        matches!(self, GateOutcome::Allowed)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            GateOutcome::Allowed => None,
            GateOutcome::RejectedError { message } | GateOutcome::RejectedMismatch { message } => {
                Some(message)
            }
        }
    }
}

pub struct ConnectionGate {
    cache: Arc<RemarkCache>,
    sessions: SessionTracker,
}

impl ConnectionGate {
    pub fn new(cache: Arc<RemarkCache>, sessions: SessionTracker) -> Self {
        Self { cache, sessions }
    }

    /// Evaluate one connection attempt.
    ///
    /// Remote capability failures never escape this function; they fold into
    /// the rejection outcome so the host process cannot crash on them.
    pub async fn evaluate(
        &self,
        session_key: &str,
        claimed_name: &str,
        account_id: u64,
        bot: Option<&dyn GroupBot>,
    ) -> GateOutcome {
        // Graceful degradation: without the bot the group cannot be reached,
        // so the check is skipped entirely.
        let Some(bot) = bot else {
            info!(account_id, "group bot unavailable, skipping nickname check");
            return GateOutcome::Allowed;
        };

        let nickname = match self.cache.get(account_id).await {
            Ok(nickname) => nickname,
            Err(err) => {
                error!(account_id, %err, "nickname lookup failed");
                return GateOutcome::RejectedError {
                    message: format!("nickname lookup failed: {err}"),
                };
            }
        };

        if let Some(nickname) = &nickname {
            if nickname.starts_with(claimed_name) {
                info!(account_id, %nickname, "group nickname verified");
                return GateOutcome::Allowed;
            }
        }

        // Nickname missing or not matching: try to rename the member remotely.
        match bot.set_group_nickname(account_id, claimed_name).await {
            Ok(()) => {
                let confirmation = format!(
                    "Your group nickname has been set to your game name: {claimed_name}"
                );
                if let Err(err) = bot.send_at_message(account_id, &confirmation).await {
                    warn!(account_id, %err, "could not confirm nickname change");
                }

                if let Err(err) = self
                    .cache
                    .put(account_id, Some(claimed_name.to_string()))
                    .await
                {
                    // The remote rename already landed; the next login will
                    // read the table again.
                    error!(account_id, %err, "failed to persist renamed nickname");
                }

                info!(player = claimed_name, "set group nickname for player");
                GateOutcome::Allowed
            }
            Err(err) => {
                warn!(player = claimed_name, %err, "could not set group nickname");

                if self.sessions.should_notify(session_key, now_ms()).await {
                    self.notify_self_correct(bot, account_id, claimed_name).await;
                }

                GateOutcome::RejectedMismatch {
                    message: rejection_message(claimed_name, nickname.as_deref(), account_id),
                }
            }
        }
    }

    /// Two-part group notice: instructions, then the exact name to copy.
    async fn notify_self_correct(&self, bot: &dyn GroupBot, account_id: u64, claimed_name: &str) {
        let notice = "Please change your group nickname so it starts with your game name, \
                      then send any message in the group to refresh it. Your game name \
                      follows; copy it directly to avoid mistakes:";
        if let Err(err) = bot.send_at_message(account_id, notice).await {
            warn!(account_id, %err, "could not send nickname notice");
            return;
        }
        if let Err(err) = bot.send_group_message(claimed_name).await {
            warn!(account_id, %err, "could not send nickname notice");
        }
    }
}

fn rejection_message(claimed_name: &str, nickname: Option<&str>, account_id: u64) -> String {
    format!(
        "[group nickname mismatch]\n\
         Your group nickname must start with your game name [{claimed_name}].\n\
         After changing it, send any message in the group to refresh it.\n\
         Current group nickname: {} [{account_id}]",
        nickname.unwrap_or("unavailable"),
    )
}
