use crate::database::models::GuildConfessionConfig;
use crate::error::ConfessionError;

/// Options given to `/confession-setup enable`. `None` keeps the stored value.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnableOptions {
    pub confession_channel_id: Option<i64>,
    pub admin_channel_id: Option<i64>,
    pub approval_required: Option<bool>,
    pub auto_approve_positive: Option<bool>,
}

/// Config after an enable action. A first-time setup starts with approval and
/// auto-approve off.
pub fn apply_enable(
    guild_id: i64,
    existing: Option<GuildConfessionConfig>,
    options: EnableOptions,
) -> Result<GuildConfessionConfig, ConfessionError> {
    let mut config = existing.unwrap_or_else(|| GuildConfessionConfig::new(guild_id));
    config.enabled = true;

    if let Some(channel_id) = options.confession_channel_id {
        config.confession_channel_id = Some(channel_id);
    }
    if let Some(channel_id) = options.admin_channel_id {
        config.admin_channel_id = Some(channel_id);
    }
    if let Some(required) = options.approval_required {
        config.approval_required = required;
    }
    if let Some(auto) = options.auto_approve_positive {
        config.auto_approve_positive = auto;
    }

    if config.approval_required && config.admin_channel_id.is_none() {
        return Err(ConfessionError::AdminChannelRequired);
    }
    if options.auto_approve_positive == Some(true) && !config.approval_required {
        return Err(ConfessionError::AutoApproveWithoutApproval);
    }

    Ok(config)
}

/// Disabling keeps every other setting so a later enable picks up where it left off.
pub fn apply_disable(guild_id: i64, existing: Option<GuildConfessionConfig>) -> GuildConfessionConfig {
    let mut config = existing.unwrap_or_else(|| GuildConfessionConfig::new(guild_id));
    config.enabled = false;
    config
}
