use crate::bot::{Context, Error, is_confession_admin};
use crate::confession::setup::{EnableOptions, apply_disable, apply_enable};
use crate::database::queries;
use crate::error::ConfessionError;
use crate::utils::format::create_settings_embed;
use poise::serenity_prelude as serenity;

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum SetupAction {
    Enable,
    Disable,
    #[name = "View Settings"]
    View,
}

/// Configure confessions for this server
#[poise::command(
    slash_command,
    guild_only,
    rename = "confession-setup",
    check = "is_confession_admin"
)]
pub async fn confession_setup(
    ctx: Context<'_>,
    #[description = "What to do"] action: SetupAction,
    #[description = "Channel where confessions are posted"]
    #[channel_types("Text")]
    confession_channel: Option<serenity::GuildChannel>,
    #[description = "Channel where confessions are reviewed"]
    #[channel_types("Text")]
    admin_channel: Option<serenity::GuildChannel>,
    #[description = "Hold confessions for review before posting"] approval_required: Option<bool>,
    #[description = "Post positive confessions without review"] auto_approve: Option<bool>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(ConfessionError::GuildOnly)?.get() as i64;
    let pool = &ctx.data().pool;

    let existing = queries::get_guild_config(pool, guild_id).await?;

    let (config, headline) = match action {
        SetupAction::Enable => {
            let options = EnableOptions {
                confession_channel_id: confession_channel.map(|c| c.id.get() as i64),
                admin_channel_id: admin_channel.map(|c| c.id.get() as i64),
                approval_required,
                auto_approve_positive: auto_approve,
            };
            let config = apply_enable(guild_id, existing, options)?;
            let config = queries::upsert_guild_config(pool, &config).await?;
            tracing::info!(guild_id, "Confessions enabled");
            (Some(config), Some("✅ Confessions enabled."))
        }
        SetupAction::Disable => {
            let config = apply_disable(guild_id, existing);
            let config = queries::upsert_guild_config(pool, &config).await?;
            tracing::info!(guild_id, "Confessions disabled");
            (Some(config), Some("✅ Confessions disabled."))
        }
        SetupAction::View => (existing, None),
    };

    let total = queries::count_confessions(pool, guild_id).await?;

    let mut reply = poise::CreateReply::default()
        .embed(create_settings_embed(config.as_ref(), total))
        .ephemeral(true);
    if let Some(headline) = headline {
        reply = reply.content(headline);
    }
    ctx.send(reply).await?;

    Ok(())
}
