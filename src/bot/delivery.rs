use crate::bot::interactions::review_buttons::review_components;
use crate::confession::workflow::{AuthorNotice, Delivery, PostReceipt};
use crate::database::models::Confession;
use crate::error::ConfessionError;
use crate::utils::format::{create_public_confession_embed, create_review_embed, thread_name};
use poise::serenity_prelude as serenity;

/// [`Delivery`] over the Discord REST API.
pub struct DiscordDelivery<'a> {
    http: &'a serenity::Http,
}

impl<'a> DiscordDelivery<'a> {
    pub fn new(http: &'a serenity::Http) -> Self {
        Self { http }
    }
}

fn channel(id: i64) -> serenity::ChannelId {
    serenity::ChannelId::new(id as u64)
}

impl Delivery for DiscordDelivery<'_> {
    async fn post_confession(
        &self,
        channel_id: i64,
        confession: &Confession,
    ) -> Result<PostReceipt, ConfessionError> {
        let channel_id = channel(channel_id);

        let message = channel_id
            .send_message(
                self.http,
                serenity::CreateMessage::new().embed(create_public_confession_embed(confession)),
            )
            .await?;

        let thread = channel_id
            .create_thread_from_message(
                self.http,
                message.id,
                serenity::CreateThread::new(thread_name(confession))
                    .auto_archive_duration(serenity::AutoArchiveDuration::ThreeDays),
            )
            .await?;

        Ok(PostReceipt {
            message_id: message.id.get() as i64,
            thread_id: thread.id.get() as i64,
        })
    }

    async fn send_for_review(
        &self,
        admin_channel_id: i64,
        confession: &Confession,
    ) -> Result<(), ConfessionError> {
        channel(admin_channel_id)
            .send_message(
                self.http,
                serenity::CreateMessage::new()
                    .embed(create_review_embed(confession))
                    .components(review_components(confession)),
            )
            .await?;

        Ok(())
    }

    async fn notify_author(
        &self,
        confession: &Confession,
        notice: AuthorNotice,
    ) -> Result<(), ConfessionError> {
        let content = match notice {
            AuthorNotice::Approved => format!(
                "✅ Your confession #{} has been approved and posted.",
                confession.confession_id
            ),
            AuthorNotice::Rejected => format!(
                "❌ Your confession #{} has been rejected.\n\nIf you have questions, please contact a server administrator.",
                confession.confession_id
            ),
        };

        let dm = serenity::UserId::new(confession.author_id as u64)
            .create_dm_channel(self.http)
            .await?;
        dm.send_message(self.http, serenity::CreateMessage::new().content(content))
            .await?;

        Ok(())
    }
}
