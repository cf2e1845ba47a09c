//! Keyword-based sales pattern analysis.
//!
//! Every exchange is tagged with a topic, the sales techniques visible in the
//! reply, the objections raised in the message and a rough understanding
//! score. Matching is case-insensitive substring search, so the analysis is
//! total and deterministic: any input, including empty text, yields a record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::interaction::Interaction;

/// Broad subject of a user message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicCategory {
    Pricing,
    Product,
    Objection,
    Closing,
    #[default]
    General,
}

/// Sales technique detected in an assistant reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalesTechnique {
    Questioning,
    ValueSelling,
    ActiveListening,
    Storytelling,
}

/// Objection raised in a user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objection {
    Pricing,
    Timing,
    Competition,
}

/// Checked in order; the first bucket with a matching keyword wins.
const TOPIC_KEYWORDS: [(TopicCategory, &[&str]); 4] = [
    (
        TopicCategory::Pricing,
        &["price", "cost", "budget", "expensive", "cheap"],
    ),
    (
        TopicCategory::Product,
        &["product", "feature", "specification", "works"],
    ),
    (
        TopicCategory::Objection,
        &["worried", "concern", "problem", "issue"],
    ),
    (
        TopicCategory::Closing,
        &["buy", "purchase", "deal", "contract"],
    ),
];

const TECHNIQUE_KEYWORDS: [(SalesTechnique, &[&str]); 4] = [
    (SalesTechnique::Questioning, &["?"]),
    (SalesTechnique::ValueSelling, &["benefit", "value"]),
    (SalesTechnique::ActiveListening, &["understand", "tell me more"]),
    (SalesTechnique::Storytelling, &["example", "instance"]),
];

const OBJECTION_KEYWORDS: [(Objection, &[&str]); 3] = [
    (Objection::Pricing, &["expensive", "cost", "price"]),
    (Objection::Timing, &["time", "waiting", "long"]),
    (Objection::Competition, &["competition", "competitor"]),
];

/// Messages longer than this count toward understanding.
const DETAILED_MESSAGE_CHARS: usize = 50;

/// Shape of the exchange.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionType {
    pub question_asked: bool,
    pub response_length: usize,
    pub topic_category: TopicCategory,
}

/// Sales signals found in the exchange.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesPatterns {
    pub techniques_used: Vec<SalesTechnique>,
    pub objections_raised: Vec<Objection>,
    pub closing_attempts: Vec<String>,
}

/// Learning progress estimates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningMetrics {
    pub understanding_level: f64,
    pub engagement_score: f64,
    pub progress_indicators: Vec<String>,
}

/// Full analysis of one exchange.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternsIdentified {
    pub interaction_type: InteractionType,
    pub sales_patterns: SalesPatterns,
    pub learning_metrics: LearningMetrics,
}

/// An analysis as stored in the learnings collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRecord {
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    pub patterns_identified: PatternsIdentified,
}

impl PatternRecord {
    /// Analyse an interaction and stamp the result with its user and time.
    pub fn from_interaction(interaction: &Interaction) -> Self {
        Self {
            timestamp: interaction.timestamp,
            user_id: interaction.user_id.clone(),
            patterns_identified: analyze(interaction),
        }
    }
}

/// Analyse a single exchange.
pub fn analyze(interaction: &Interaction) -> PatternsIdentified {
    analyze_exchange(&interaction.message, interaction.response.as_deref())
}

/// Analyse a message and its optional reply.
pub fn analyze_exchange(message: &str, response: Option<&str>) -> PatternsIdentified {
    PatternsIdentified {
        interaction_type: InteractionType {
            question_asked: contains_question(message),
            response_length: response.map_or(0, |r| r.chars().count()),
            topic_category: categorize_topic(message),
        },
        sales_patterns: SalesPatterns {
            techniques_used: identify_sales_techniques(response),
            objections_raised: identify_objections(message),
            closing_attempts: Vec::new(),
        },
        learning_metrics: LearningMetrics {
            understanding_level: assess_understanding(message, response),
            engagement_score: 0.0,
            progress_indicators: Vec::new(),
        },
    }
}

/// Whether the text contains a question mark.
pub fn contains_question(text: &str) -> bool {
    text.contains('?')
}

/// First topic bucket with a keyword in the message, else `General`.
pub fn categorize_topic(message: &str) -> TopicCategory {
    let lower = message.to_lowercase();
    TOPIC_KEYWORDS
        .iter()
        .find(|(_, keywords)| contains_any(&lower, keywords))
        .map(|(topic, _)| *topic)
        .unwrap_or_default()
}

/// Techniques visible in the reply, in a fixed order.
pub fn identify_sales_techniques(response: Option<&str>) -> Vec<SalesTechnique> {
    let Some(response) = response else {
        return Vec::new();
    };
    let lower = response.to_lowercase();
    matching(&lower, &TECHNIQUE_KEYWORDS)
}

/// Objections raised in the message, in a fixed order.
pub fn identify_objections(message: &str) -> Vec<Objection> {
    matching(&message.to_lowercase(), &OBJECTION_KEYWORDS)
}

/// Score in `[0.0, 1.0]`; zero unless there is a non-empty reply.
pub fn assess_understanding(message: &str, response: Option<&str>) -> f64 {
    let Some(response) = response.filter(|r| !r.is_empty()) else {
        return 0.0;
    };

    let mut score: f64 = 0.0;
    if message.chars().count() > DETAILED_MESSAGE_CHARS {
        score += 0.3;
    }
    if contains_question(message) {
        score += 0.2;
    }
    if !identify_sales_techniques(Some(response)).is_empty() {
        score += 0.5;
    }
    score.min(1.0)
}

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack.contains(k))
}

fn matching<T: Copy>(lower: &str, table: &[(T, &[&str])]) -> Vec<T> {
    table
        .iter()
        .filter(|(_, keywords)| contains_any(lower, keywords))
        .map(|(tag, _)| *tag)
        .collect()
}
