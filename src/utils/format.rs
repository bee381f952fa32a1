use crate::database::models::{Confession, ConfessionStatus, GuildConfessionConfig, Sentiment};
use crate::utils::pagination::Pager;
use crate::utils::time::{format_date_utc, format_full, format_relative};
use poise::serenity_prelude as serenity;

const COLOR_GREEN: u32 = 0x2ecc71;
const COLOR_RED: u32 = 0xe74c3c;
const COLOR_ORANGE: u32 = 0xe67e22;
const COLOR_YELLOW: u32 = 0xf1c40f;
const COLOR_BLUE: u32 = 0x3498db;

const PREVIEW_CHARS: usize = 28;
const NAME_CHARS: usize = 14;

pub fn format_error_message(error: &str) -> String {
    format!("❌ {}", error)
}

pub fn format_success_message(message: &str) -> String {
    format!("✅ {}", message)
}

/// Cuts `text` to at most `max` characters, marking the cut with an ellipsis.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

fn yes_no(value: bool) -> &'static str {
    if value { "✅ Yes" } else { "❌ No" }
}

fn channel_mention(channel_id: Option<i64>) -> String {
    match channel_id {
        Some(id) => format!("<#{}>", id),
        None => "Not set".to_string(),
    }
}

fn status_color(status: ConfessionStatus) -> u32 {
    match status {
        ConfessionStatus::Pending => COLOR_YELLOW,
        ConfessionStatus::Approved | ConfessionStatus::Posted => COLOR_GREEN,
        ConfessionStatus::Rejected => COLOR_RED,
    }
}

/// The public post. Carries nothing that identifies the author.
pub fn create_public_confession_embed(confession: &Confession) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .description(format!(
            "**Confession #{}**\n\n{}\n\n─────────────────────\n💬 Please use the thread to reply",
            confession.confession_id, confession.content
        ))
        .color(COLOR_BLUE)
}

pub fn thread_name(confession: &Confession) -> String {
    format!("Confession #{} Discussion", confession.confession_id)
}

/// Card posted to the admin channel while a confession waits for review.
pub fn create_review_embed(confession: &Confession) -> serenity::CreateEmbed {
    let id = confession.confession_id;
    let (title, color) = match confession.sentiment {
        Sentiment::Concerning => (
            format!("🚨 URGENT: Confession #{} - CONCERNING", id),
            COLOR_RED,
        ),
        Sentiment::Negative => (
            format!("🔒 Confession #{} - NEGATIVE - Pending Review", id),
            COLOR_ORANGE,
        ),
        other => (
            format!(
                "🔒 Confession #{} - {} - Pending Review",
                id,
                other.as_str().to_uppercase()
            ),
            COLOR_YELLOW,
        ),
    };

    let footer = if confession.sentiment == Sentiment::Concerning {
        format!("⚠️ High priority review required | Confession ID: #{}", id)
    } else {
        format!("Confession ID: #{}", id)
    };

    serenity::CreateEmbed::new()
        .title(title)
        .description(&confession.content)
        .color(color)
        .field(
            "Sentiment",
            format!(
                "{} (Score: {:.2})",
                confession.sentiment, confession.sentiment_score
            ),
            true,
        )
        .field(
            "Submitted by",
            format!("{} ({})", confession.author_name, confession.author_id),
            false,
        )
        .field("Submitted", format_relative(confession.submitted_at), true)
        .footer(serenity::CreateEmbedFooter::new(footer))
}

/// The review card after an admin acted on it.
pub fn create_decided_review_embed(
    confession: &Confession,
    admin_name: &str,
) -> serenity::CreateEmbed {
    let verdict = match confession.status {
        ConfessionStatus::Rejected => "❌ Rejected",
        ConfessionStatus::Approved => "⚠️ Approved (not yet posted)",
        ConfessionStatus::Posted => "✅ Approved",
        ConfessionStatus::Pending => "🔒 Pending",
    };

    create_review_embed(confession)
        .color(status_color(confession.status))
        .footer(serenity::CreateEmbedFooter::new(format!(
            "{} by {} | Confession ID: #{}",
            verdict, admin_name, confession.confession_id
        )))
}

/// Full record for `/confession-view`.
pub fn create_record_embed(confession: &Confession) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .title(format!("Confession #{}", confession.confession_id))
        .description(&confession.content)
        .color(status_color(confession.status))
        .field("Status", confession.status.label(), true)
        .field(
            "Sentiment",
            format!(
                "{} ({:.2})",
                confession.sentiment, confession.sentiment_score
            ),
            true,
        )
        .field(
            "Submitted by",
            format!("{} (<@{}>)", confession.author_name, confession.author_id),
            false,
        )
        .field("Submitted", format_full(confession.submitted_at), true);

    if let Some(decided_at) = confession.decided_at {
        embed = embed.field("Decided", format_full(decided_at), true);
    }
    if let Some(admin_id) = confession.decided_by {
        embed = embed.field("Decided by", format!("<@{}>", admin_id), true);
    }
    if let Some(thread_id) = confession.thread_id {
        embed = embed.field("Thread", format!("<#{}>", thread_id), true);
    }

    embed
}

pub fn create_settings_embed(
    config: Option<&GuildConfessionConfig>,
    total_confessions: i64,
) -> serenity::CreateEmbed {
    let enabled = config.is_some_and(|c| c.enabled);
    let approval_required = config.is_some_and(|c| c.approval_required);
    let auto_approve = if approval_required {
        yes_no(config.is_some_and(|c| c.auto_approve_positive)).to_string()
    } else {
        "N/A (approval disabled)".to_string()
    };

    serenity::CreateEmbed::new()
        .title("Confession Settings")
        .color(COLOR_BLUE)
        .field("Enabled", yes_no(enabled), true)
        .field(
            "Confession Channel",
            channel_mention(config.and_then(|c| c.confession_channel_id)),
            true,
        )
        .field(
            "Admin Channel",
            channel_mention(config.and_then(|c| c.admin_channel_id)),
            true,
        )
        .field("Approval Required", yes_no(approval_required), true)
        .field("Auto-Approve Positive", auto_approve, true)
        .field("Total Confessions", total_confessions.to_string(), true)
}

/// Fixed-width table rows, in the order given (newest first within a page).
pub fn format_history_table(confessions: &[Confession]) -> String {
    if confessions.is_empty() {
        return "No confessions have been submitted yet.".to_string();
    }

    let mut table = format!(
        "{:<5} {:<9} {:<14} {:<11} {:<28} {}\n",
        "ID", "Status", "Submitted by", "Sentiment", "Preview", "Submitted"
    );

    for confession in confessions {
        // Backticks would close the code block
        let preview = confession.content.replace('`', "'").replace('\n', " ");
        table.push_str(&format!(
            "{:<5} {:<9} {:<14} {:<11} {:<28} {}\n",
            format!("#{}", confession.confession_id),
            confession.status.label(),
            truncate_chars(&confession.author_name.replace('`', "'"), NAME_CHARS),
            confession.sentiment.label(),
            truncate_chars(&preview, PREVIEW_CHARS),
            format_date_utc(confession.submitted_at),
        ));
    }

    format!("```\n{}```", table)
}

pub fn create_history_embed(
    confessions: &[Confession],
    pager: &Pager,
    page: usize,
) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("📜 Confession History")
        .description(format_history_table(confessions))
        .color(COLOR_BLUE)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Page {}/{} | {} confessions",
            pager.clamp(page) + 1,
            pager.page_count(),
            pager.total()
        )))
}
