use crate::bot::interactions::history_buttons::load_history_page;
use crate::bot::interactions::review_buttons::review_components;
use crate::bot::{Context, Error, is_confession_admin};
use crate::database::queries;
use crate::error::ConfessionError;
use crate::utils::format::create_record_embed;

/// Show the full record of a confession
#[poise::command(
    slash_command,
    guild_only,
    rename = "confession-view",
    check = "is_confession_admin"
)]
pub async fn confession_view(
    ctx: Context<'_>,
    #[description = "Confession number"]
    #[min = 1]
    id: i64,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(ConfessionError::GuildOnly)?.get() as i64;

    let confession = queries::get_confession(&ctx.data().pool, guild_id, id)
        .await?
        .ok_or(ConfessionError::NotFound(id))?;

    ctx.send(
        poise::CreateReply::default()
            .embed(create_record_embed(&confession))
            .components(review_components(&confession))
            .ephemeral(true),
    )
    .await?;

    Ok(())
}

/// Browse every confession submitted in this server
#[poise::command(
    slash_command,
    guild_only,
    rename = "confession-history",
    check = "is_confession_admin"
)]
pub async fn confession_history(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(ConfessionError::GuildOnly)?.get() as i64;
    let data = ctx.data();

    let page = load_history_page(&data.pool, guild_id, data.config.history_page_size, None).await?;

    ctx.send(
        poise::CreateReply::default()
            .embed(page.embed)
            .components(page.components)
            .ephemeral(true),
    )
    .await?;

    Ok(())
}
