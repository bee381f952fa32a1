pub mod commands;
pub mod delivery;
pub mod handlers;
pub mod interactions;

use crate::config::Config;
use crate::database;
use crate::error::{ConfessionError, GENERIC_ERROR_MESSAGE};
use crate::sentiment::{SentimentAnalyzer, VaderAnalyzer};
use anyhow::Result;
use poise::serenity_prelude as serenity;
use sqlx::SqlitePool;
use std::sync::Arc;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Built once at startup and handed to every command and interaction handler.
#[derive(Clone)]
pub struct Data {
    pub pool: SqlitePool,
    pub config: Config,
    pub sentiment: Arc<dyn SentimentAnalyzer>,
}

pub async fn create_bot(config: Config) -> Result<serenity::Client> {
    let pool = database::create_connection(&config.database_url).await?;

    let data = Data {
        pool,
        config: config.clone(),
        sentiment: Arc::new(VaderAnalyzer::new()),
    };

    let intents =
        serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::MESSAGE_CONTENT;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::confession::confession(),
                commands::setup::confession_setup(),
                commands::admin::confession_view(),
                commands::admin::confession_history(),
                commands::general::ping(),
                commands::general::help(),
            ],
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(config.prefix.clone()),
                ..Default::default()
            },
            on_error: |error| Box::pin(on_error(error)),
            event_handler: |ctx, event, framework, data| {
                Box::pin(handlers::event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await?;

    Ok(client)
}

/// Administrators, and members holding the configured admin role, may moderate.
pub fn member_is_admin(member: Option<&serenity::Member>, admin_role_id: Option<u64>) -> bool {
    member.is_some_and(|member| {
        grants_admin(member.permissions, &member.roles, admin_role_id)
    })
}

/// `permissions` is only present on members that arrived with an interaction.
fn grants_admin(
    permissions: Option<serenity::Permissions>,
    roles: &[serenity::RoleId],
    admin_role_id: Option<u64>,
) -> bool {
    if permissions.is_some_and(|p| p.administrator()) {
        return true;
    }

    admin_role_id.is_some_and(|role_id| roles.iter().any(|role| role.get() == role_id))
}

/// Command check for the admin-only confession commands.
pub async fn is_confession_admin(ctx: Context<'_>) -> Result<bool, Error> {
    let member = ctx.author_member().await;
    Ok(member_is_admin(
        member.as_deref(),
        ctx.data().config.admin_role_id,
    ))
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            tracing::error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            let command = ctx.command().qualified_name.clone();
            let user_id = ctx.author().id.get();
            let guild_id = ctx.guild_id().map(|id| id.get());

            let message = match error.downcast_ref::<ConfessionError>() {
                Some(e) if e.is_functional() => {
                    tracing::info!(%command, user_id, ?guild_id, "Command rejected: {}", e);
                    e.user_message()
                }
                _ => {
                    tracing::error!(%command, user_id, ?guild_id, "Error in command: {:?}", error);
                    GENERIC_ERROR_MESSAGE.to_string()
                }
            };

            let reply = poise::CreateReply::default().content(message).ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                tracing::error!("Failed to send error message: {:?}", e);
            }
        }
        poise::FrameworkError::CommandCheckFailed { ctx, error, .. } => {
            if let Some(error) = error {
                tracing::error!("Error while checking permissions: {:?}", error);
            }
            let reply = poise::CreateReply::default()
                .content(ConfessionError::NotAdmin.user_message())
                .ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                tracing::error!("Failed to send error message: {:?}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                tracing::error!("Error while handling error: {:?}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(ids: &[u64]) -> Vec<serenity::RoleId> {
        ids.iter().map(|id| serenity::RoleId::new(*id)).collect()
    }

    #[test]
    fn test_administrator_permission_is_admin() {
        assert!(grants_admin(
            Some(serenity::Permissions::ADMINISTRATOR),
            &[],
            None
        ));
    }

    #[test]
    fn test_admin_role_is_admin() {
        let moderator = roles(&[5, 9]);
        let no_permissions = Some(serenity::Permissions::empty());
        assert!(grants_admin(no_permissions, &moderator, Some(9)));
        assert!(!grants_admin(no_permissions, &moderator, Some(10)));
        assert!(!grants_admin(no_permissions, &moderator, None));
    }

    #[test]
    fn test_missing_permissions_fall_back_to_role() {
        assert!(grants_admin(None, &roles(&[9]), Some(9)));
        assert!(!grants_admin(None, &roles(&[9]), None));
    }

    #[test]
    fn test_no_member_is_not_admin() {
        assert!(!member_is_admin(None, Some(9)));
    }
}
