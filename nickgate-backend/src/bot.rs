//! Remote capability for the messaging-platform group.
//!
//! The concrete client (transport, authentication, delivery) lives outside
//! this crate; the gate only needs these three operations and must tolerate
//! the capability being absent entirely.

use async_trait::async_trait;

pub type BotError = Box<dyn std::error::Error + Send + Sync>;

/// Group-bot operations the connection gate depends on.
#[async_trait]
pub trait GroupBot: Send + Sync {
    /// Send a message directed at one member (an @-mention in the group).
    async fn send_at_message(&self, account_id: u64, text: &str) -> Result<(), BotError>;

    /// Send a plain message to the whole group.
    async fn send_group_message(&self, text: &str) -> Result<(), BotError>;

    /// Ask the platform to change a member's group nickname.
    async fn set_group_nickname(&self, account_id: u64, nickname: &str) -> Result<(), BotError>;
}
