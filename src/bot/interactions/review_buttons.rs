use crate::bot::delivery::DiscordDelivery;
use crate::bot::{Data, Error, member_is_admin};
use crate::confession::workflow::{self, Decision, DecisionOutcome};
use crate::database::models::{Confession, ConfessionStatus};
use crate::error::ConfessionError;
use crate::utils::format::{
    create_decided_review_embed, format_error_message, format_success_message,
};
use poise::serenity_prelude as serenity;

pub const APPROVE_PREFIX: &str = "confession_approve";
pub const REJECT_PREFIX: &str = "confession_reject";
pub const PUBLISH_PREFIX: &str = "confession_publish";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Decide(Decision),
    /// Retry posting a confession stuck in `approved`.
    Publish,
}

pub fn is_review_button(custom_id: &str) -> bool {
    parse_review_button_id(custom_id).is_some()
}

/// Parses `confession_approve:<id>`, `confession_reject:<id>` and `confession_publish:<id>`.
pub fn parse_review_button_id(custom_id: &str) -> Option<(ReviewAction, i64)> {
    let (prefix, id) = custom_id.split_once(':')?;
    let action = match prefix {
        APPROVE_PREFIX => ReviewAction::Decide(Decision::Approve),
        REJECT_PREFIX => ReviewAction::Decide(Decision::Reject),
        PUBLISH_PREFIX => ReviewAction::Publish,
        _ => return None,
    };
    let id = id.parse::<i64>().ok().filter(|id| *id > 0)?;
    Some((action, id))
}

/// Controls matching the confession's status: Approve/Reject while pending,
/// a retry button while approved but unposted, nothing once decided.
pub fn review_components(confession: &Confession) -> Vec<serenity::CreateActionRow> {
    let id = confession.confession_id;
    match confession.status {
        ConfessionStatus::Pending => vec![serenity::CreateActionRow::Buttons(vec![
            serenity::CreateButton::new(format!("{}:{}", APPROVE_PREFIX, id))
                .label("✅ Approve")
                .style(serenity::ButtonStyle::Success),
            serenity::CreateButton::new(format!("{}:{}", REJECT_PREFIX, id))
                .label("❌ Reject")
                .style(serenity::ButtonStyle::Danger),
        ])],
        ConfessionStatus::Approved => vec![serenity::CreateActionRow::Buttons(vec![
            serenity::CreateButton::new(format!("{}:{}", PUBLISH_PREFIX, id))
                .label("🔁 Retry posting")
                .style(serenity::ButtonStyle::Primary),
        ])],
        ConfessionStatus::Rejected | ConfessionStatus::Posted => Vec::new(),
    }
}

pub async fn handle_review_interaction(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<(), Error> {
    let Some((action, confession_id)) = parse_review_button_id(&interaction.data.custom_id) else {
        return reply_ephemeral(ctx, interaction, &format_error_message("Unknown action.")).await;
    };
    let Some(guild_id) = interaction.guild_id else {
        return reply_ephemeral(ctx, interaction, &ConfessionError::GuildOnly.user_message()).await;
    };
    if !member_is_admin(interaction.member.as_ref(), data.config.admin_role_id) {
        return reply_ephemeral(ctx, interaction, &ConfessionError::NotAdmin.user_message()).await;
    }

    // Posting and threading can outlast the initial response window.
    interaction.defer(&ctx.http).await?;

    let guild_id = guild_id.get() as i64;
    let admin_id = interaction.user.id.get() as i64;
    let admin_name = interaction
        .member
        .as_ref()
        .map(|member| member.display_name().to_string())
        .unwrap_or_else(|| interaction.user.name.clone());
    let delivery = DiscordDelivery::new(&ctx.http);

    match action {
        ReviewAction::Decide(decision) => {
            let outcome = workflow::decide(
                &data.pool,
                &delivery,
                guild_id,
                confession_id,
                decision,
                admin_id,
            )
            .await?;

            match outcome {
                DecisionOutcome::Published(confession) => {
                    update_card(ctx, interaction, &confession, &admin_name).await?;
                    followup(
                        ctx,
                        interaction,
                        &format_success_message(&format!(
                            "Confession #{} approved and posted.",
                            confession.confession_id
                        )),
                    )
                    .await?;
                }
                DecisionOutcome::Rejected(confession) => {
                    update_card(ctx, interaction, &confession, &admin_name).await?;
                    followup(
                        ctx,
                        interaction,
                        &format_success_message(&format!(
                            "Confession #{} rejected. The author has been notified.",
                            confession.confession_id
                        )),
                    )
                    .await?;
                }
                DecisionOutcome::ApprovedUnpublished { confession, error } => {
                    update_card(ctx, interaction, &confession, &admin_name).await?;
                    followup(
                        ctx,
                        interaction,
                        &format!(
                            "⚠️ Confession #{} was approved but could not be posted: {}\nUse **Retry posting** once the problem is fixed.",
                            confession.confession_id,
                            error.user_message()
                        ),
                    )
                    .await?;
                }
                DecisionOutcome::AlreadyDecided(status) => {
                    followup(
                        ctx,
                        interaction,
                        &format_error_message(&format!(
                            "This confession has already been {}.",
                            status.as_str()
                        )),
                    )
                    .await?;
                }
            }
        }
        ReviewAction::Publish => {
            match workflow::retry_publish(&data.pool, &delivery, guild_id, confession_id).await {
                Ok(confession) => {
                    update_card(ctx, interaction, &confession, &admin_name).await?;
                    followup(
                        ctx,
                        interaction,
                        &format_success_message(&format!(
                            "Confession #{} posted.",
                            confession.confession_id
                        )),
                    )
                    .await?;
                }
                Err(e) if e.is_functional() => {
                    followup(ctx, interaction, &e.user_message()).await?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}

async fn update_card(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    confession: &Confession,
    admin_name: &str,
) -> Result<(), Error> {
    interaction
        .edit_response(
            &ctx.http,
            serenity::EditInteractionResponse::new()
                .embed(create_decided_review_embed(confession, admin_name))
                .components(review_components(confession)),
        )
        .await?;
    Ok(())
}

async fn followup(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    content: &str,
) -> Result<(), Error> {
    interaction
        .create_followup(
            &ctx.http,
            serenity::CreateInteractionResponseFollowup::new()
                .content(content)
                .ephemeral(true),
        )
        .await?;
    Ok(())
}

async fn reply_ephemeral(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    content: &str,
) -> Result<(), Error> {
    interaction
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::Message(
                serenity::CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_review_button_id() {
        assert_eq!(
            parse_review_button_id("confession_approve:12"),
            Some((ReviewAction::Decide(Decision::Approve), 12))
        );
        assert_eq!(
            parse_review_button_id("confession_reject:3"),
            Some((ReviewAction::Decide(Decision::Reject), 3))
        );
        assert_eq!(
            parse_review_button_id("confession_publish:3"),
            Some((ReviewAction::Publish, 3))
        );
        assert_eq!(parse_review_button_id("confession_approve:abc"), None);
        assert_eq!(parse_review_button_id("confession_approve:0"), None);
        assert_eq!(parse_review_button_id("confession_history:next:1"), None);
        assert!(!is_review_button("confession_history:next:0"));
    }
}
