use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::question::QuestionType;

/// Marking override for one question type. When present, the scoring
/// engine uses these values instead of the marks stored on the question.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TypeMarking {
    pub question_type: QuestionType,
    pub marks: f64,
    pub negative_marks: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ExamConfig {
    pub id: String,
    pub name: String,
    pub description: String,
    pub duration_minutes: i64,
    pub total_questions: usize,
    pub subjects: Vec<String>,
    /// Empty means every question type is eligible.
    #[serde(default)]
    pub question_types: Vec<QuestionType>,
    #[serde(default)]
    pub type_marking: Vec<TypeMarking>,
    pub randomize_questions: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl ExamConfig {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: &str,
        description: &str,
        duration_minutes: i64,
        total_questions: usize,
        subjects: Vec<String>,
        question_types: Vec<QuestionType>,
        type_marking: Vec<TypeMarking>,
        randomize_questions: bool,
        created_by: &str,
    ) -> Self {
        ExamConfig {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description.to_string(),
            duration_minutes,
            total_questions,
            subjects,
            question_types,
            type_marking,
            randomize_questions,
            created_by: created_by.to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn allows_type(&self, question_type: QuestionType) -> bool {
        self.question_types.is_empty() || self.question_types.contains(&question_type)
    }

    pub fn marking_for(&self, question_type: QuestionType) -> Option<&TypeMarking> {
        self.type_marking
            .iter()
            .find(|m| m.question_type == question_type)
    }
}
