use serde::Deserialize;
use validator::Validate;

use crate::models::domain::exam_session::{AnswerValue, QuestionStatus};
use crate::models::domain::question::QuestionType;
use crate::models::domain::user::UserRole;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 100))]
    pub full_name: String,

    pub role: Option<UserRole>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OptionInput {
    #[validate(length(min = 1, max = 2000))]
    pub text: String,

    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 10000))]
    pub question_text: String,

    pub question_type: QuestionType,

    #[validate(length(min = 1, max = 200))]
    pub subject: String,

    #[validate(length(min = 1, max = 200))]
    pub topic: String,

    pub difficulty: Option<String>,

    #[validate(range(min = 0.0))]
    pub marks: Option<f64>,

    #[validate(range(min = 0.0))]
    pub negative_marks: Option<f64>,

    #[serde(default)]
    #[validate(nested)]
    pub options: Vec<OptionInput>,

    pub correct_answer: Option<AnswerValue>,

    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateQuestionRequest {
    #[validate(length(min = 1, max = 10000))]
    pub question_text: Option<String>,

    #[validate(length(min = 1, max = 200))]
    pub subject: Option<String>,

    #[validate(length(min = 1, max = 200))]
    pub topic: Option<String>,

    pub difficulty: Option<String>,

    #[validate(range(min = 0.0))]
    pub marks: Option<f64>,

    #[validate(range(min = 0.0))]
    pub negative_marks: Option<f64>,

    #[validate(nested)]
    pub options: Option<Vec<OptionInput>>,

    pub correct_answer: Option<AnswerValue>,

    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TypeMarkingInput {
    pub question_type: QuestionType,

    #[validate(range(min = 0.0))]
    pub marks: f64,

    #[validate(range(min = 0.0))]
    pub negative_marks: f64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateExamConfigRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(length(max = 2000))]
    #[serde(default)]
    pub description: String,

    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: Option<i64>,

    #[validate(range(min = 1))]
    pub total_questions: usize,

    #[validate(length(min = 1, message = "At least one subject is required"))]
    pub subjects: Vec<String>,

    #[serde(default)]
    pub question_types: Vec<QuestionType>,

    #[serde(default)]
    #[validate(nested)]
    pub type_marking: Vec<TypeMarkingInput>,

    pub randomize_questions: Option<bool>,
}

/// One answer upsert. `status` defaults to answered; review flags and the
/// explicit clear-response action come through the same payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AnswerUpload {
    #[validate(length(min = 1))]
    pub question_id: String,

    pub answer: AnswerValue,

    pub status: Option<QuestionStatus>,
}

impl AnswerUpload {
    pub fn status(&self) -> QuestionStatus {
        self.status.unwrap_or(QuestionStatus::Answered)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ShareQuestionRequest {
    #[serde(default)]
    pub emails: Vec<String>,

    #[validate(range(min = 1, max = 720))]
    pub expires_in_hours: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaginationParams {
    #[validate(range(min = 0))]
    pub offset: Option<i64>,

    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            offset: Some(0),
            limit: Some(20),
        }
    }
}

impl PaginationParams {
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).min(100)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct QuestionListParams {
    pub subject: Option<String>,

    #[validate(range(min = 0))]
    pub offset: Option<i64>,

    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExplainRequest {
    #[validate(length(min = 1))]
    pub question_id: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CategorizeRequest {
    #[validate(length(min = 1, max = 10000))]
    pub question_text: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AskRequest {
    #[validate(length(min = 1, max = 10000))]
    pub prompt: String,

    #[validate(length(max = 20000))]
    pub context: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateRequest {
    #[validate(length(min = 1, max = 200))]
    pub subject: String,

    #[validate(length(min = 1, max = 200))]
    pub topic: String,

    pub question_type: QuestionType,

    #[validate(range(min = 1, max = 10))]
    pub count: usize,
}
