use crate::bot::interactions::{history_buttons, review_buttons};
use crate::bot::{Data, Error};
use crate::error::{ConfessionError, GENERIC_ERROR_MESSAGE};
use crate::utils::pagination::HISTORY_BUTTON_PREFIX;
use poise::serenity_prelude as serenity;

pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            tracing::info!("Bot logged in as {}", data_about_bot.user.name);
        }
        serenity::FullEvent::InteractionCreate {
            interaction: serenity::Interaction::Component(component_interaction),
        } => {
            let custom_id = component_interaction.data.custom_id.as_str();
            let result = if review_buttons::is_review_button(custom_id) {
                review_buttons::handle_review_interaction(ctx, component_interaction, data).await
            } else if custom_id.starts_with(HISTORY_BUTTON_PREFIX) {
                history_buttons::handle_history_interaction(ctx, component_interaction, data).await
            } else {
                tracing::debug!("Ignoring component interaction {}", custom_id);
                Ok(())
            };

            if let Err(e) = result {
                report_interaction_error(ctx, component_interaction, e).await;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Handler boundary for button presses: log with context, then tell the user
/// something went wrong without leaking details.
async fn report_interaction_error(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    error: Error,
) {
    let message = match error.downcast_ref::<ConfessionError>() {
        Some(e) if e.is_functional() => e.user_message(),
        _ => GENERIC_ERROR_MESSAGE.to_string(),
    };

    tracing::error!(
        custom_id = %interaction.data.custom_id,
        user_id = interaction.user.id.get(),
        guild_id = ?interaction.guild_id.map(|id| id.get()),
        "Error handling component interaction: {:?}",
        error
    );

    // The handler may already have acknowledged the interaction, in which case
    // only a followup is accepted.
    let response = interaction
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::Message(
                serenity::CreateInteractionResponseMessage::new()
                    .content(&message)
                    .ephemeral(true),
            ),
        )
        .await;

    if response.is_err() {
        if let Err(e) = interaction
            .create_followup(
                &ctx.http,
                serenity::CreateInteractionResponseFollowup::new()
                    .content(&message)
                    .ephemeral(true),
            )
            .await
        {
            tracing::error!("Failed to send error message: {:?}", e);
        }
    }
}
