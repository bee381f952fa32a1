use crate::confession::gate::{self, Route};
use crate::database::models::{Confession, ConfessionStatus, NewConfession};
use crate::database::queries;
use crate::error::ConfessionError;
use crate::sentiment::{self, SentimentAnalyzer, SentimentThresholds};
use crate::utils::validation::validate_confession_text;
use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use std::future::Future;
use tracing::{info, warn};

/// A publish claim older than this is treated as abandoned (the process died
/// mid-post) and may be taken over.
const PUBLISH_CLAIM_TIMEOUT_MINUTES: i64 = 5;

/// Where a published confession ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostReceipt {
    pub message_id: i64,
    pub thread_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorNotice {
    Approved,
    Rejected,
}

/// Outbound side of the workflow: everything that talks to the chat platform.
pub trait Delivery: Sync {
    /// Post the anonymised confession to `channel_id` and open its discussion thread.
    fn post_confession(
        &self,
        channel_id: i64,
        confession: &Confession,
    ) -> impl Future<Output = Result<PostReceipt, ConfessionError>> + Send;

    /// Post the review card with Approve/Reject controls to `admin_channel_id`.
    fn send_for_review(
        &self,
        admin_channel_id: i64,
        confession: &Confession,
    ) -> impl Future<Output = Result<(), ConfessionError>> + Send;

    /// Tell the author how their confession was decided.
    fn notify_author(
        &self,
        confession: &Confession,
        notice: AuthorNotice,
    ) -> impl Future<Output = Result<(), ConfessionError>> + Send;
}

#[derive(Debug, Clone)]
pub struct Submission {
    pub guild_id: i64,
    pub author_id: i64,
    pub author_name: String,
    pub text: String,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Posted(Confession),
    Queued(Confession),
    /// Stored, but posting it (or its review card) failed. The status is left as
    /// it was so an admin can retry.
    Undelivered {
        confession: Confession,
        error: ConfessionError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn target_status(&self) -> ConfessionStatus {
        match self {
            Decision::Approve => ConfessionStatus::Approved,
            Decision::Reject => ConfessionStatus::Rejected,
        }
    }
}

#[derive(Debug)]
pub enum DecisionOutcome {
    Published(Confession),
    Rejected(Confession),
    /// Approved, but the post failed and the confession stays `approved`.
    ApprovedUnpublished {
        confession: Confession,
        error: ConfessionError,
    },
    /// Someone already decided this confession; nothing was changed.
    AlreadyDecided(ConfessionStatus),
}

pub async fn submit<D: Delivery>(
    pool: &SqlitePool,
    analyzer: &dyn SentimentAnalyzer,
    thresholds: &SentimentThresholds,
    delivery: &D,
    submission: Submission,
) -> Result<SubmitOutcome, ConfessionError> {
    validate_confession_text(&submission.text)?;

    let config = queries::get_guild_config(pool, submission.guild_id).await?;

    let content = submission.text.trim().to_string();
    let reading = sentiment::analyze(analyzer, thresholds, &content);
    let route = gate::route(config.as_ref(), reading.sentiment)?;

    let confession = queries::create_confession(
        pool,
        NewConfession {
            guild_id: submission.guild_id,
            author_id: submission.author_id,
            author_name: submission.author_name,
            content,
            sentiment: reading.sentiment,
            sentiment_score: reading.score,
            status: route.initial_status(),
            submitted_at: Utc::now(),
        },
    )
    .await?;

    info!(
        guild_id = confession.guild_id,
        confession_id = confession.confession_id,
        sentiment = confession.sentiment.as_str(),
        score = confession.sentiment_score,
        status = confession.status.as_str(),
        "Confession submitted"
    );

    let outcome = match route {
        Route::Publish { channel_id } => {
            match publish_to(pool, delivery, channel_id, &confession).await {
                Ok(posted) => SubmitOutcome::Posted(posted),
                Err(error) => SubmitOutcome::Undelivered { confession, error },
            }
        }
        Route::Review { admin_channel_id } => {
            match delivery.send_for_review(admin_channel_id, &confession).await {
                Ok(()) => SubmitOutcome::Queued(confession),
                Err(error) => SubmitOutcome::Undelivered { confession, error },
            }
        }
    };

    if let SubmitOutcome::Undelivered { confession, error } = &outcome {
        warn!(
            guild_id = confession.guild_id,
            confession_id = confession.confession_id,
            error = %error,
            "Confession stored but not delivered"
        );
    }

    Ok(outcome)
}

/// Approve or reject a pending confession. Only the first decision wins; later
/// clicks see [`DecisionOutcome::AlreadyDecided`].
pub async fn decide<D: Delivery>(
    pool: &SqlitePool,
    delivery: &D,
    guild_id: i64,
    confession_id: i64,
    decision: Decision,
    admin_id: i64,
) -> Result<DecisionOutcome, ConfessionError> {
    let won = queries::transition_status(
        pool,
        guild_id,
        confession_id,
        ConfessionStatus::Pending,
        decision.target_status(),
        Some(admin_id),
    )
    .await?;

    let confession = queries::get_confession(pool, guild_id, confession_id)
        .await?
        .ok_or(ConfessionError::NotFound(confession_id))?;

    if !won {
        return Ok(DecisionOutcome::AlreadyDecided(confession.status));
    }

    info!(
        guild_id,
        confession_id,
        admin_id,
        decision = decision.target_status().as_str(),
        "Confession decided"
    );

    match decision {
        Decision::Reject => {
            notify(delivery, &confession, AuthorNotice::Rejected).await;
            Ok(DecisionOutcome::Rejected(confession))
        }
        Decision::Approve => match publish(pool, delivery, &confession).await {
            Ok(posted) => {
                notify(delivery, &posted, AuthorNotice::Approved).await;
                Ok(DecisionOutcome::Published(posted))
            }
            Err(error) => {
                warn!(guild_id, confession_id, error = %error, "Approved confession could not be posted");
                Ok(DecisionOutcome::ApprovedUnpublished { confession, error })
            }
        },
    }
}

/// Post an `approved` confession to the guild's confession channel.
pub async fn publish<D: Delivery>(
    pool: &SqlitePool,
    delivery: &D,
    confession: &Confession,
) -> Result<Confession, ConfessionError> {
    if confession.status != ConfessionStatus::Approved {
        return Err(ConfessionError::NotPublishable {
            id: confession.confession_id,
            status: confession.status,
        });
    }

    let channel_id = queries::get_guild_config(pool, confession.guild_id)
        .await?
        .and_then(|config| config.confession_channel_id)
        .ok_or(ConfessionError::ConfessionChannelMissing)?;

    publish_to(pool, delivery, channel_id, confession).await
}

/// Manual retry for a confession left in `approved` by a failed post.
pub async fn retry_publish<D: Delivery>(
    pool: &SqlitePool,
    delivery: &D,
    guild_id: i64,
    confession_id: i64,
) -> Result<Confession, ConfessionError> {
    let confession = queries::get_confession(pool, guild_id, confession_id)
        .await?
        .ok_or(ConfessionError::NotFound(confession_id))?;

    let posted = publish(pool, delivery, &confession).await?;
    if posted.decided_by.is_some() {
        notify(delivery, &posted, AuthorNotice::Approved).await;
    }
    Ok(posted)
}

async fn publish_to<D: Delivery>(
    pool: &SqlitePool,
    delivery: &D,
    channel_id: i64,
    confession: &Confession,
) -> Result<Confession, ConfessionError> {
    let stale_before = Utc::now() - Duration::minutes(PUBLISH_CLAIM_TIMEOUT_MINUTES);
    if !queries::claim_publish(pool, confession.guild_id, confession.confession_id, stale_before)
        .await?
    {
        let current = queries::get_confession(pool, confession.guild_id, confession.confession_id)
            .await?
            .ok_or(ConfessionError::NotFound(confession.confession_id))?;
        return Err(match current.status {
            ConfessionStatus::Approved => ConfessionError::PublishInProgress(current.confession_id),
            status => ConfessionError::NotPublishable {
                id: current.confession_id,
                status,
            },
        });
    }

    let receipt = match delivery.post_confession(channel_id, confession).await {
        Ok(receipt) => receipt,
        Err(error) => {
            queries::release_publish_claim(pool, confession.guild_id, confession.confession_id)
                .await?;
            return Err(error);
        }
    };

    let moved = queries::mark_posted(
        pool,
        confession.guild_id,
        confession.confession_id,
        receipt.message_id,
        receipt.thread_id,
    )
    .await?;
    if !moved {
        warn!(
            guild_id = confession.guild_id,
            confession_id = confession.confession_id,
            "Confession was no longer approved when its post was recorded"
        );
    }

    queries::get_confession(pool, confession.guild_id, confession.confession_id)
        .await?
        .ok_or(ConfessionError::NotFound(confession.confession_id))
}

async fn notify<D: Delivery>(delivery: &D, confession: &Confession, notice: AuthorNotice) {
    if let Err(e) = delivery.notify_author(confession, notice).await {
        warn!(
            guild_id = confession.guild_id,
            confession_id = confession.confession_id,
            error = %e,
            "Could not notify confession author"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_test_pool;
    use crate::database::models::{GuildConfessionConfig, Sentiment};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const GUILD: i64 = 1;
    const AUTHOR: i64 = 42;
    const ADMIN: i64 = 7;

    struct FixedScore {
        score: f64,
        calls: AtomicUsize,
    }

    impl FixedScore {
        fn new(score: f64) -> Self {
            Self {
                score,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl SentimentAnalyzer for FixedScore {
        fn compound_score(&self, _text: &str) -> f64 {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.score
        }
    }

    #[derive(Default)]
    struct RecordingDelivery {
        posts: Mutex<Vec<(i64, i64)>>,
        reviews: Mutex<Vec<(i64, i64)>>,
        notices: Mutex<Vec<(i64, i64, AuthorNotice)>>,
        fail_posts: bool,
    }

    impl Delivery for RecordingDelivery {
        async fn post_confession(
            &self,
            channel_id: i64,
            confession: &Confession,
        ) -> Result<PostReceipt, ConfessionError> {
            // Let a concurrent caller run while this post is "in flight".
            tokio::task::yield_now().await;
            if self.fail_posts {
                return Err(ConfessionError::Store(anyhow::anyhow!("Missing Access")));
            }
            let mut posts = self.posts.lock().unwrap();
            posts.push((channel_id, confession.confession_id));
            let n = posts.len() as i64;
            Ok(PostReceipt {
                message_id: 1000 + n,
                thread_id: 2000 + n,
            })
        }

        async fn send_for_review(
            &self,
            admin_channel_id: i64,
            confession: &Confession,
        ) -> Result<(), ConfessionError> {
            self.reviews
                .lock()
                .unwrap()
                .push((admin_channel_id, confession.confession_id));
            Ok(())
        }

        async fn notify_author(
            &self,
            confession: &Confession,
            notice: AuthorNotice,
        ) -> Result<(), ConfessionError> {
            self.notices
                .lock()
                .unwrap()
                .push((confession.author_id, confession.confession_id, notice));
            Ok(())
        }
    }

    async fn setup_guild(pool: &SqlitePool, approval_required: bool, auto_approve_positive: bool) {
        let config = GuildConfessionConfig {
            enabled: true,
            confession_channel_id: Some(100),
            admin_channel_id: Some(200),
            approval_required,
            auto_approve_positive,
            ..GuildConfessionConfig::new(GUILD)
        };
        queries::upsert_guild_config(pool, &config).await.unwrap();
    }

    fn submission(text: &str) -> Submission {
        Submission {
            guild_id: GUILD,
            author_id: AUTHOR,
            author_name: "author".to_string(),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_invalid_length_is_rejected_before_storing() {
        let pool = create_test_pool().await;
        setup_guild(&pool, false, false).await;
        let analyzer = FixedScore::new(0.0);
        let delivery = RecordingDelivery::default();

        for text in ["too short".to_string(), "x".repeat(2001)] {
            let result = submit(
                &pool,
                &analyzer,
                &SentimentThresholds::default(),
                &delivery,
                submission(&text),
            )
            .await;
            assert!(result.is_err());
        }

        assert_eq!(queries::count_confessions(&pool, GUILD).await.unwrap(), 0);
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unconfigured_guild() {
        let pool = create_test_pool().await;
        let result = submit(
            &pool,
            &FixedScore::new(0.0),
            &SentimentThresholds::default(),
            &RecordingDelivery::default(),
            submission("This is a perfectly fine confession."),
        )
        .await;

        assert!(matches!(result, Err(ConfessionError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_disabled_guild_stores_nothing() {
        let pool = create_test_pool().await;
        let config = GuildConfessionConfig {
            confession_channel_id: Some(100),
            ..GuildConfessionConfig::new(GUILD)
        };
        queries::upsert_guild_config(&pool, &config).await.unwrap();
        let delivery = RecordingDelivery::default();

        let result = submit(
            &pool,
            &FixedScore::new(0.9),
            &SentimentThresholds::default(),
            &delivery,
            submission("Nobody should ever see this one."),
        )
        .await;

        assert!(matches!(result, Err(ConfessionError::Disabled)));
        assert_eq!(queries::count_confessions(&pool, GUILD).await.unwrap(), 0);
        assert!(delivery.posts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_approval_posts_without_pending() {
        let pool = create_test_pool().await;
        setup_guild(&pool, false, false).await;
        let delivery = RecordingDelivery::default();

        let outcome = submit(
            &pool,
            &FixedScore::new(-0.9),
            &SentimentThresholds::default(),
            &delivery,
            submission("Something dark that nobody reviews first."),
        )
        .await
        .unwrap();

        let SubmitOutcome::Posted(posted) = outcome else {
            panic!("expected the confession to be posted");
        };
        assert_eq!(posted.status, ConfessionStatus::Posted);
        assert_eq!(posted.sentiment, Sentiment::Concerning);
        assert!(posted.decided_by.is_none());
        assert_eq!(posted.thread_id, Some(2001));
        assert_eq!(*delivery.posts.lock().unwrap(), vec![(100, 1)]);
        assert!(delivery.reviews.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_positive_skips_review_when_auto_approve_is_on() {
        let pool = create_test_pool().await;
        setup_guild(&pool, true, true).await;
        let delivery = RecordingDelivery::default();

        let outcome = submit(
            &pool,
            &FixedScore::new(0.8),
            &SentimentThresholds::default(),
            &delivery,
            submission("I love everyone on this server so much!"),
        )
        .await
        .unwrap();

        assert!(matches!(outcome, SubmitOutcome::Posted(ref c) if c.status == ConfessionStatus::Posted));
        assert!(delivery.reviews.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_positive_is_queued_when_auto_approve_is_on() {
        let pool = create_test_pool().await;
        setup_guild(&pool, true, true).await;

        for score in [-0.3, 0.0, -0.8] {
            let delivery = RecordingDelivery::default();
            let outcome = submit(
                &pool,
                &FixedScore::new(score),
                &SentimentThresholds::default(),
                &delivery,
                submission("Not exactly a happy confession here."),
            )
            .await
            .unwrap();

            assert!(matches!(outcome, SubmitOutcome::Queued(ref c) if c.status == ConfessionStatus::Pending));
            assert_eq!(delivery.reviews.lock().unwrap().len(), 1);
            assert!(delivery.posts.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_sentiment_is_computed_once_and_kept() {
        let pool = create_test_pool().await;
        setup_guild(&pool, true, false).await;
        let analyzer = FixedScore::new(0.9);
        let delivery = RecordingDelivery::default();

        let outcome = submit(
            &pool,
            &analyzer,
            &SentimentThresholds::default(),
            &delivery,
            submission("What a lovely wonderful day it was."),
        )
        .await
        .unwrap();
        let SubmitOutcome::Queued(queued) = outcome else {
            panic!("expected the confession to be queued");
        };

        decide(&pool, &delivery, GUILD, queued.confession_id, Decision::Approve, ADMIN)
            .await
            .unwrap();

        let stored = queries::get_confession(&pool, GUILD, queued.confession_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(stored.sentiment, Sentiment::Positive);
        assert_eq!(stored.sentiment_score, queued.sentiment_score);
        assert_eq!(stored.status, ConfessionStatus::Posted);
    }

    #[tokio::test]
    async fn test_reject_end_to_end() {
        let pool = create_test_pool().await;
        setup_guild(&pool, true, true).await;
        let delivery = RecordingDelivery::default();

        let outcome = submit(
            &pool,
            &FixedScore::new(-0.45),
            &SentimentThresholds::default(),
            &delivery,
            submission("I broke my friend's trust and feel terrible"),
        )
        .await
        .unwrap();
        let SubmitOutcome::Queued(queued) = outcome else {
            panic!("expected the confession to be queued");
        };
        assert_eq!(queued.sentiment, Sentiment::Negative);
        assert_eq!(queued.status, ConfessionStatus::Pending);

        let decided = decide(&pool, &delivery, GUILD, queued.confession_id, Decision::Reject, ADMIN)
            .await
            .unwrap();

        let DecisionOutcome::Rejected(rejected) = decided else {
            panic!("expected a rejection");
        };
        assert_eq!(rejected.status, ConfessionStatus::Rejected);
        assert_eq!(rejected.decided_by, Some(ADMIN));
        assert!(rejected.decided_at.is_some());
        assert!(rejected.thread_id.is_none());
        assert!(delivery.posts.lock().unwrap().is_empty());
        assert_eq!(
            *delivery.notices.lock().unwrap(),
            vec![(AUTHOR, queued.confession_id, AuthorNotice::Rejected)]
        );
    }

    #[tokio::test]
    async fn test_second_click_is_a_no_op() {
        let pool = create_test_pool().await;
        setup_guild(&pool, true, false).await;
        let delivery = RecordingDelivery::default();

        let SubmitOutcome::Queued(queued) = submit(
            &pool,
            &FixedScore::new(0.0),
            &SentimentThresholds::default(),
            &delivery,
            submission("I still have my roommate's charger."),
        )
        .await
        .unwrap() else {
            panic!("expected the confession to be queued");
        };

        let first = decide(&pool, &delivery, GUILD, queued.confession_id, Decision::Approve, ADMIN)
            .await
            .unwrap();
        assert!(matches!(first, DecisionOutcome::Published(_)));

        for decision in [Decision::Approve, Decision::Reject] {
            let again = decide(&pool, &delivery, GUILD, queued.confession_id, decision, ADMIN + 1)
                .await
                .unwrap();
            assert!(matches!(again, DecisionOutcome::AlreadyDecided(ConfessionStatus::Posted)));
        }

        assert_eq!(delivery.posts.lock().unwrap().len(), 1);
        assert_eq!(delivery.notices.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_approve_and_reject_decide_once() {
        let pool = create_test_pool().await;
        setup_guild(&pool, true, false).await;
        let delivery = RecordingDelivery::default();

        let SubmitOutcome::Queued(queued) = submit(
            &pool,
            &FixedScore::new(0.0),
            &SentimentThresholds::default(),
            &delivery,
            submission("Two moderators will click at once."),
        )
        .await
        .unwrap() else {
            panic!("expected the confession to be queued");
        };

        let (approve, reject) = tokio::join!(
            decide(&pool, &delivery, GUILD, queued.confession_id, Decision::Approve, ADMIN),
            decide(&pool, &delivery, GUILD, queued.confession_id, Decision::Reject, ADMIN + 1),
        );
        let outcomes = [approve.unwrap(), reject.unwrap()];

        let winners = outcomes
            .iter()
            .filter(|o| !matches!(o, DecisionOutcome::AlreadyDecided(_)))
            .count();
        assert_eq!(winners, 1);

        let stored = queries::get_confession(&pool, GUILD, queued.confession_id)
            .await
            .unwrap()
            .unwrap();
        let posts = delivery.posts.lock().unwrap().len();
        let notices = delivery.notices.lock().unwrap().clone();
        assert_eq!(notices.len(), 1);
        match stored.status {
            ConfessionStatus::Posted => {
                assert_eq!(posts, 1);
                assert_eq!(notices[0].2, AuthorNotice::Approved);
            }
            ConfessionStatus::Rejected => {
                assert_eq!(posts, 0);
                assert_eq!(notices[0].2, AuthorNotice::Rejected);
            }
            other => panic!("unexpected status {other}"),
        }
    }

    #[tokio::test]
    async fn test_concurrent_retries_post_once() {
        let pool = create_test_pool().await;
        setup_guild(&pool, false, false).await;
        let failing = RecordingDelivery {
            fail_posts: true,
            ..Default::default()
        };

        let SubmitOutcome::Undelivered { confession, .. } = submit(
            &pool,
            &FixedScore::new(0.0),
            &SentimentThresholds::default(),
            &failing,
            submission("Posting failed the first time around."),
        )
        .await
        .unwrap() else {
            panic!("expected the post to fail");
        };

        let working = RecordingDelivery::default();
        let (a, b) = tokio::join!(
            retry_publish(&pool, &working, GUILD, confession.confession_id),
            retry_publish(&pool, &working, GUILD, confession.confession_id),
        );

        let results = [a, b];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        for result in &results {
            if let Err(e) = result {
                assert!(matches!(
                    e,
                    ConfessionError::PublishInProgress(_) | ConfessionError::NotPublishable { .. }
                ));
                assert!(e.is_functional());
            }
        }
        assert_eq!(working.posts.lock().unwrap().len(), 1);

        let stored = queries::get_confession(&pool, GUILD, confession.confession_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, ConfessionStatus::Posted);
    }

    #[tokio::test]
    async fn test_decide_unknown_confession() {
        let pool = create_test_pool().await;
        let result = decide(&pool, &RecordingDelivery::default(), GUILD, 99, Decision::Reject, ADMIN).await;
        assert!(matches!(result, Err(ConfessionError::NotFound(99))));
    }

    #[tokio::test]
    async fn test_failed_post_leaves_confession_approved_for_retry() {
        let pool = create_test_pool().await;
        setup_guild(&pool, false, false).await;
        let failing = RecordingDelivery {
            fail_posts: true,
            ..Default::default()
        };

        let outcome = submit(
            &pool,
            &FixedScore::new(0.0),
            &SentimentThresholds::default(),
            &failing,
            submission("The bot can't see the channel yet."),
        )
        .await
        .unwrap();
        let SubmitOutcome::Undelivered { confession, .. } = outcome else {
            panic!("expected the post to fail");
        };
        assert_eq!(confession.status, ConfessionStatus::Approved);

        let working = RecordingDelivery::default();
        let posted = retry_publish(&pool, &working, GUILD, confession.confession_id)
            .await
            .unwrap();
        assert_eq!(posted.status, ConfessionStatus::Posted);
        assert!(working.notices.lock().unwrap().is_empty());

        let again = retry_publish(&pool, &working, GUILD, confession.confession_id).await;
        assert!(matches!(again, Err(ConfessionError::NotPublishable { .. })));
        assert_eq!(working.posts.lock().unwrap().len(), 1);
    }
}
