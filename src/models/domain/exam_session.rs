use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    NotVisited,
    NotAnswered,
    Answered,
    Marked,
    MarkedAnswered,
}

/// A submitted answer. The variant is not validated against the question
/// type on write; the scoring engine interprets it once, at submit time.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Choices(Vec<String>),
    Number(f64),
    Text(String),
}

impl AnswerValue {
    /// Numeric reading used for NAT grading: JSON numbers pass through,
    /// strings are parsed, option lists never parse.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AnswerValue::Number(n) => Some(*n),
            AnswerValue::Text(s) => s.trim().parse::<f64>().ok(),
            AnswerValue::Choices(_) => None,
        }
    }

    /// The set of selected option ids. A bare scalar is coerced to a
    /// single-element selection; clients send both shapes.
    pub fn as_choice_set(&self) -> Vec<&str> {
        match self {
            AnswerValue::Choices(ids) => ids.iter().map(String::as_str).collect(),
            AnswerValue::Text(id) => vec![id.as_str()],
            AnswerValue::Number(_) => vec![],
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Choices(ids) => ids.is_empty(),
            AnswerValue::Text(s) => s.trim().is_empty(),
            AnswerValue::Number(_) => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ExamSession {
    pub id: String,
    pub user_id: String,
    pub exam_config_id: String,
    /// Fixed at creation; answer and status maps are keyed by this id domain.
    pub questions: Vec<String>,
    #[serde(default)]
    pub answers: HashMap<String, AnswerValue>,
    #[serde(default)]
    pub question_status: HashMap<String, QuestionStatus>,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub submitted: bool,
    pub current_question: usize,
}

impl ExamSession {
    /// New unsubmitted session: everything not_visited except the first
    /// question, which the client lands on immediately.
    pub fn new(user_id: &str, exam_config_id: &str, question_ids: Vec<String>) -> Self {
        let mut question_status: HashMap<String, QuestionStatus> = question_ids
            .iter()
            .map(|id| (id.clone(), QuestionStatus::NotVisited))
            .collect();

        if let Some(first) = question_ids.first() {
            question_status.insert(first.clone(), QuestionStatus::NotAnswered);
        }

        ExamSession {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            exam_config_id: exam_config_id.to_string(),
            questions: question_ids,
            answers: HashMap::new(),
            question_status,
            start_time: Utc::now(),
            end_time: None,
            submitted: false,
            current_question: 0,
        }
    }

    pub fn contains_question(&self, question_id: &str) -> bool {
        self.questions.iter().any(|id| id == question_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_marks_only_first_question_visited() {
        let session = ExamSession::new(
            "user-1",
            "config-1",
            vec!["q1".into(), "q2".into(), "q3".into()],
        );

        assert_eq!(
            session.question_status.get("q1"),
            Some(&QuestionStatus::NotAnswered)
        );
        assert_eq!(
            session.question_status.get("q2"),
            Some(&QuestionStatus::NotVisited)
        );
        assert_eq!(
            session.question_status.get("q3"),
            Some(&QuestionStatus::NotVisited)
        );
        assert!(!session.submitted);
        assert_eq!(session.current_question, 0);
        assert!(session.end_time.is_none());
    }

    #[test]
    fn answer_value_untagged_deserialization() {
        let single: AnswerValue = serde_json::from_str("\"opt-1\"").unwrap();
        assert_eq!(single, AnswerValue::Text("opt-1".into()));

        let multi: AnswerValue = serde_json::from_str("[\"a\",\"b\"]").unwrap();
        assert_eq!(multi, AnswerValue::Choices(vec!["a".into(), "b".into()]));

        let numeric: AnswerValue = serde_json::from_str("42.5").unwrap();
        assert_eq!(numeric, AnswerValue::Number(42.5));
    }

    #[test]
    fn answer_value_numeric_parsing() {
        assert_eq!(AnswerValue::Text("40".into()).as_f64(), Some(40.0));
        assert_eq!(AnswerValue::Text(" 40.0 ".into()).as_f64(), Some(40.0));
        assert_eq!(AnswerValue::Text("abc".into()).as_f64(), None);
        assert_eq!(AnswerValue::Number(40.0).as_f64(), Some(40.0));
        assert_eq!(AnswerValue::Choices(vec!["a".into()]).as_f64(), None);
    }

    #[test]
    fn answer_value_emptiness() {
        assert!(AnswerValue::Text("  ".into()).is_empty());
        assert!(AnswerValue::Choices(vec![]).is_empty());
        assert!(!AnswerValue::Text("a".into()).is_empty());
        assert!(!AnswerValue::Number(0.0).is_empty());
    }

    #[test]
    fn question_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&QuestionStatus::MarkedAnswered).unwrap(),
            "\"marked_answered\""
        );
        let parsed: QuestionStatus = serde_json::from_str("\"not_visited\"").unwrap();
        assert_eq!(parsed, QuestionStatus::NotVisited);
    }
}
