use crate::bot::delivery::DiscordDelivery;
use crate::bot::{Context, Error};
use crate::confession::workflow::{self, Submission, SubmitOutcome};
use crate::database::models::ConfessionStatus;
use crate::error::ConfessionError;
use crate::utils::format::format_success_message;

/// Submit an anonymous confession
#[poise::command(slash_command, guild_only)]
pub async fn confession(
    ctx: Context<'_>,
    #[description = "Your confession"]
    #[max_length = 2000]
    message: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(ConfessionError::GuildOnly)?;

    // Sentiment scoring and posting can take longer than the initial response window.
    ctx.defer_ephemeral().await?;

    let author_name = ctx
        .author_member()
        .await
        .map(|member| member.display_name().to_string())
        .unwrap_or_else(|| ctx.author().name.clone());

    let data = ctx.data();
    let delivery = DiscordDelivery::new(ctx.http());

    let outcome = workflow::submit(
        &data.pool,
        data.sentiment.as_ref(),
        &data.config.sentiment_thresholds,
        &delivery,
        Submission {
            guild_id: guild_id.get() as i64,
            author_id: ctx.author().id.get() as i64,
            author_name,
            text: message,
        },
    )
    .await?;

    ctx.send(
        poise::CreateReply::default()
            .content(outcome_message(&outcome))
            .ephemeral(true),
    )
    .await?;

    Ok(())
}

fn outcome_message(outcome: &SubmitOutcome) -> String {
    match outcome {
        SubmitOutcome::Posted(confession) => format_success_message(&format!(
            "Your confession #{} has been posted!",
            confession.confession_id
        )),
        SubmitOutcome::Queued(confession) => format_success_message(&format!(
            "Your confession #{} has been submitted and is pending review.",
            confession.confession_id
        )),
        SubmitOutcome::Undelivered { confession, .. } => match confession.status {
            ConfessionStatus::Pending => format!(
                "⚠️ Your confession #{} was saved, but the moderators could not be notified. \
                 It will stay pending until an admin reviews it.",
                confession.confession_id
            ),
            _ => format!(
                "⚠️ Your confession #{} was approved, but it could not be posted yet. \
                 An admin can retry posting it.",
                confession.confession_id
            ),
        },
    }
}
