use crate::database::models::{ConfessionStatus, GuildConfessionConfig, Sentiment};
use crate::error::ConfessionError;

/// Where a freshly submitted confession goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Straight to the confession channel.
    Publish { channel_id: i64 },
    /// To the admin channel with Approve/Reject buttons.
    Review { admin_channel_id: i64 },
}

impl Route {
    pub fn initial_status(&self) -> ConfessionStatus {
        match self {
            Route::Publish { .. } => ConfessionStatus::Approved,
            Route::Review { .. } => ConfessionStatus::Pending,
        }
    }
}

/// Needs approval at all, and if so, does this sentiment skip the queue?
pub fn requires_review(config: &GuildConfessionConfig, sentiment: Sentiment) -> bool {
    if !config.approval_required {
        return false;
    }
    !(config.auto_approve_positive && sentiment == Sentiment::Positive)
}

/// Decide the route for a confession before it is stored. Fails when the guild
/// has not set up the channel that route needs.
pub fn route(
    config: Option<&GuildConfessionConfig>,
    sentiment: Sentiment,
) -> Result<Route, ConfessionError> {
    let config = config.ok_or(ConfessionError::NotConfigured)?;
    if !config.enabled {
        return Err(ConfessionError::Disabled);
    }

    if requires_review(config, sentiment) {
        let admin_channel_id = config
            .admin_channel_id
            .ok_or(ConfessionError::AdminChannelMissing)?;
        Ok(Route::Review { admin_channel_id })
    } else {
        let channel_id = config
            .confession_channel_id
            .ok_or(ConfessionError::ConfessionChannelMissing)?;
        Ok(Route::Publish { channel_id })
    }
}
