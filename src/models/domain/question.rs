use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::exam_session::AnswerValue;

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("WHITESPACE is a valid regex pattern"));

/// Case- and whitespace-insensitive form used for deduplication and
/// duplicate detection on create.
pub fn normalize_text(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").to_lowercase()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum QuestionType {
    Mcq, // single correct option
    Msq, // one or more correct options
    Nat, // numerical answer, no options
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct QuestionOption {
    pub id: String,
    pub text: String,
    pub is_correct: bool,
}

impl QuestionOption {
    pub fn new(text: &str, is_correct: bool) -> Self {
        QuestionOption {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            is_correct,
        }
    }
}

/// Read-only visibility grant: a recipient list plus a time-bounded
/// opaque token. Never grants mutation rights.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ShareGrant {
    pub emails: Vec<String>,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl ShareGrant {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Question {
    pub id: String,
    pub question_text: String,
    pub question_type: QuestionType,
    pub subject: String,
    pub topic: String,
    pub difficulty: String,
    pub marks: f64,
    pub negative_marks: f64,
    #[serde(default)]
    pub options: Vec<QuestionOption>, // MCQ/MSQ only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<AnswerValue>, // NAT only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_with: Option<ShareGrant>,
}

impl Question {
    pub fn normalized_text(&self) -> String {
        normalize_text(&self.question_text)
    }

    /// Ids of the options flagged correct, in option order.
    pub fn correct_option_ids(&self) -> Vec<&str> {
        self.options
            .iter()
            .filter(|opt| opt.is_correct)
            .map(|opt| opt.id.as_str())
            .collect()
    }
}
