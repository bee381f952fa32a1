use crate::database::models::Sentiment;

/// Compound scores below this (and above the concerning threshold) are negative.
const NEGATIVE_CEILING: f64 = -0.1;

/// Scores free text into a compound polarity in `[-1.0, 1.0]`.
pub trait SentimentAnalyzer: Send + Sync {
    fn compound_score(&self, text: &str) -> f64;
}

/// VADER lexicon scorer, tuned for short informal text. Built once at startup
/// and shared by every submission.
pub struct VaderAnalyzer {
    inner: vader_sentiment::SentimentIntensityAnalyzer<'static>,
}

impl VaderAnalyzer {
    pub fn new() -> Self {
        Self {
            inner: vader_sentiment::SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentAnalyzer for VaderAnalyzer {
    fn compound_score(&self, text: &str) -> f64 {
        let scores = self.inner.polarity_scores(text);
        scores.get("compound").copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentThresholds {
    pub auto_approve: f64,
    pub concerning: f64,
}

impl Default for SentimentThresholds {
    fn default() -> Self {
        Self {
            auto_approve: 0.5,
            concerning: -0.6,
        }
    }
}

impl SentimentThresholds {
    /// Falls back to the defaults unless `-1 <= concerning < auto_approve <= 1`.
    pub fn new(auto_approve: f64, concerning: f64) -> Self {
        if -1.0 <= concerning && concerning < auto_approve && auto_approve <= 1.0 {
            Self {
                auto_approve,
                concerning,
            }
        } else {
            tracing::warn!(
                auto_approve,
                concerning,
                "Invalid sentiment thresholds, using defaults"
            );
            Self::default()
        }
    }

    pub fn classify(&self, compound: f64) -> Sentiment {
        if compound >= self.auto_approve {
            Sentiment::Positive
        } else if compound <= self.concerning {
            Sentiment::Concerning
        } else if compound < NEGATIVE_CEILING {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}

/// The outcome of scoring one confession. Computed once per submission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentReading {
    pub sentiment: Sentiment,
    pub score: f64,
}

pub fn analyze(
    analyzer: &dyn SentimentAnalyzer,
    thresholds: &SentimentThresholds,
    text: &str,
) -> SentimentReading {
    let score = analyzer.compound_score(text).clamp(-1.0, 1.0);
    SentimentReading {
        sentiment: thresholds.classify(score),
        score,
    }
}
