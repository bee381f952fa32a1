use crate::database::models::ConfessionStatus;
use poise::serenity_prelude as serenity;
use thiserror::Error;

pub const GENERIC_ERROR_MESSAGE: &str =
    "❌ Something went wrong. Please try again later, or use `/help` or `!ping` to check on the bot.";

/// Failures of the confession workflow.
///
/// Functional variants describe something the user or admin can fix and are
/// shown to them verbatim. Runtime variants are logged and replaced by
/// [`GENERIC_ERROR_MESSAGE`].
#[derive(Error, Debug)]
pub enum ConfessionError {
    #[error("Confession is too short! Please provide at least {min} characters.")]
    TooShort { min: usize },

    #[error("Confession is too long! Please keep it under {max} characters.")]
    TooLong { max: usize },

    #[error("Confessions can only be used inside a server.")]
    GuildOnly,

    #[error("Confessions are not configured in this server. Ask an administrator to run `/confession-setup`.")]
    NotConfigured,

    #[error("Confessions are not enabled in this server. Contact an administrator.")]
    Disabled,

    #[error("Confession channel not configured. Contact an administrator.")]
    ConfessionChannelMissing,

    #[error("Admin review channel not configured. Contact an administrator.")]
    AdminChannelMissing,

    #[error("Admin channel is required when approval is enabled. Please provide `admin_channel`.")]
    AdminChannelRequired,

    #[error("Auto-approve only works when approval is required. Set `approval_required: true` first.")]
    AutoApproveWithoutApproval,

    #[error("You need administrator permissions to manage confessions.")]
    NotAdmin,

    #[error("Confession #{0} was not found.")]
    NotFound(i64),

    #[error("Confession #{id} is {status}, it can't be published.")]
    NotPublishable { id: i64, status: ConfessionStatus },

    #[error("Confession #{0} is already being posted.")]
    PublishInProgress(i64),

    #[error(transparent)]
    Store(#[from] anyhow::Error),

    #[error(transparent)]
    Discord(#[from] serenity::Error),
}

impl ConfessionError {
    pub fn is_functional(&self) -> bool {
        !matches!(self, ConfessionError::Store(_) | ConfessionError::Discord(_))
    }

    /// What the person who triggered the failure gets to read.
    pub fn user_message(&self) -> String {
        if self.is_functional() {
            format!("❌ {self}")
        } else {
            GENERIC_ERROR_MESSAGE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_functional_errors_are_shown_verbatim() {
        let err = ConfessionError::TooShort { min: 10 };
        assert!(err.is_functional());
        assert_eq!(
            err.user_message(),
            "❌ Confession is too short! Please provide at least 10 characters."
        );
    }

    #[test]
    fn test_runtime_errors_are_generic() {
        let err = ConfessionError::from(anyhow::anyhow!("database is locked"));
        assert!(!err.is_functional());
        assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
        assert!(!err.user_message().contains("locked"));
    }
}
