use crate::bot::{Data, Error, member_is_admin};
use crate::database::models::Confession;
use crate::database::queries;
use crate::error::ConfessionError;
use crate::utils::format::create_history_embed;
use crate::utils::pagination::{Pager, parse_history_button_id};
use poise::serenity_prelude as serenity;
use sqlx::SqlitePool;

/// One rendered page of the history table, with its navigation row.
pub struct HistoryPage {
    pub embed: serenity::CreateEmbed,
    pub components: Vec<serenity::CreateActionRow>,
}

/// The rows behind one history page, with the page index they ended up on.
struct HistoryRows {
    pager: Pager,
    page: usize,
    confessions: Vec<Confession>,
}

async fn fetch_history_rows(
    pool: &SqlitePool,
    guild_id: i64,
    page_size: usize,
    page: Option<usize>,
) -> anyhow::Result<HistoryRows> {
    let total = queries::count_confessions(pool, guild_id).await?;
    let pager = Pager::new(total.max(0) as usize, page_size);
    let page = page.map_or(pager.last_page(), |page| pager.clamp(page));

    let confessions = queries::list_confessions(
        pool,
        guild_id,
        pager.page_size() as i64,
        pager.offset(page) as i64,
    )
    .await?;

    Ok(HistoryRows {
        pager,
        page,
        confessions,
    })
}

/// Loads `page` (clamped to what exists right now) for a guild. `None` opens the
/// last page, where the most recent confessions are.
pub async fn load_history_page(
    pool: &SqlitePool,
    guild_id: i64,
    page_size: usize,
    page: Option<usize>,
) -> anyhow::Result<HistoryPage> {
    let rows = fetch_history_rows(pool, guild_id, page_size, page).await?;

    Ok(HistoryPage {
        embed: create_history_embed(&rows.confessions, &rows.pager, rows.page),
        components: vec![rows.pager.create_nav_buttons(rows.page)],
    })
}

pub async fn handle_history_interaction(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<(), Error> {
    let Some((action, current_page)) = parse_history_button_id(&interaction.data.custom_id) else {
        return Err(format!("Malformed history button: {}", interaction.data.custom_id).into());
    };
    let Some(guild_id) = interaction.guild_id else {
        return Err(ConfessionError::GuildOnly.into());
    };

    if !member_is_admin(interaction.member.as_ref(), data.config.admin_role_id) {
        interaction
            .create_response(
                &ctx.http,
                serenity::CreateInteractionResponse::Message(
                    serenity::CreateInteractionResponseMessage::new()
                        .content(ConfessionError::NotAdmin.user_message())
                        .ephemeral(true),
                ),
            )
            .await?;
        return Ok(());
    }

    let guild_id = guild_id.get() as i64;
    let page_size = data.config.history_page_size;

    // The listing may have grown or shrunk since the buttons were rendered.
    let total = queries::count_confessions(&data.pool, guild_id).await?;
    let target = Pager::new(total.max(0) as usize, page_size).navigate(current_page, action);

    let page = load_history_page(&data.pool, guild_id, page_size, Some(target)).await?;

    interaction
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::UpdateMessage(
                serenity::CreateInteractionResponseMessage::new()
                    .embed(page.embed)
                    .components(page.components),
            ),
        )
        .await?;

    Ok(())
}
