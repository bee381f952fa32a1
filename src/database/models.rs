use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct Confession {
    pub guild_id: i64,
    pub confession_id: i64,
    pub author_id: i64,
    pub author_name: String,
    pub content: String,
    pub sentiment: Sentiment,
    pub sentiment_score: f64,
    pub status: ConfessionStatus,
    pub submitted_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decided_by: Option<i64>,
    pub message_id: Option<i64>,
    pub thread_id: Option<i64>,
}

/// Row to insert; the store assigns `confession_id` and the decision columns.
#[derive(Debug, Clone)]
pub struct NewConfession {
    pub guild_id: i64,
    pub author_id: i64,
    pub author_name: String,
    pub content: String,
    pub sentiment: Sentiment,
    pub sentiment_score: f64,
    pub status: ConfessionStatus,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GuildConfessionConfig {
    pub guild_id: i64,
    pub enabled: bool,
    pub confession_channel_id: Option<i64>,
    pub admin_channel_id: Option<i64>,
    pub approval_required: bool,
    /// Only consulted when `approval_required` is set.
    pub auto_approve_positive: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GuildConfessionConfig {
    pub fn new(guild_id: i64) -> Self {
        let now = Utc::now();
        Self {
            guild_id,
            enabled: false,
            confession_channel_id: None,
            admin_channel_id: None,
            approval_required: false,
            auto_approve_positive: false,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
    Concerning,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
            Sentiment::Concerning => "concerning",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
            Sentiment::Concerning => "Concerning",
        }
    }
}

impl FromStr for Sentiment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            "concerning" => Ok(Sentiment::Concerning),
            _ => Err(anyhow::anyhow!("Invalid sentiment: {}", s)),
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfessionStatus {
    Pending,
    Approved,
    Rejected,
    Posted,
}

impl ConfessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfessionStatus::Pending => "pending",
            ConfessionStatus::Approved => "approved",
            ConfessionStatus::Rejected => "rejected",
            ConfessionStatus::Posted => "posted",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConfessionStatus::Pending => "Pending",
            ConfessionStatus::Approved => "Approved",
            ConfessionStatus::Rejected => "Rejected",
            ConfessionStatus::Posted => "Posted",
        }
    }

    /// Statuses only move forward: pending → approved/rejected, approved → posted.
    pub fn can_transition_to(&self, next: ConfessionStatus) -> bool {
        matches!(
            (self, next),
            (ConfessionStatus::Pending, ConfessionStatus::Approved)
                | (ConfessionStatus::Pending, ConfessionStatus::Rejected)
                | (ConfessionStatus::Approved, ConfessionStatus::Posted)
        )
    }
}

impl FromStr for ConfessionStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ConfessionStatus::Pending),
            "approved" => Ok(ConfessionStatus::Approved),
            "rejected" => Ok(ConfessionStatus::Rejected),
            "posted" => Ok(ConfessionStatus::Posted),
            _ => Err(anyhow::anyhow!("Invalid confession status: {}", s)),
        }
    }
}

impl fmt::Display for ConfessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_only_moves_forward() {
        use ConfessionStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Approved.can_transition_to(Posted));

        assert!(!Pending.can_transition_to(Posted));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(Approved));
        for next in [Pending, Approved, Rejected, Posted] {
            assert!(!Posted.can_transition_to(next));
        }
    }

    #[test]
    fn test_status_and_sentiment_parse_their_own_names() {
        for status in [
            ConfessionStatus::Pending,
            ConfessionStatus::Approved,
            ConfessionStatus::Rejected,
            ConfessionStatus::Posted,
        ] {
            assert_eq!(status.as_str().parse::<ConfessionStatus>().unwrap(), status);
        }
        assert_eq!("concerning".parse::<Sentiment>().unwrap(), Sentiment::Concerning);
        assert!("auto-approved".parse::<ConfessionStatus>().is_err());
    }
}
