use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::domain::exam_session::AnswerValue;
use crate::models::domain::question::{Question, QuestionType};
use crate::models::domain::user::UserRole;
use crate::models::domain::User;

#[derive(Debug, Clone, Serialize)]
pub struct UserDto {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        UserDto {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            created_at: user.created_at,
            is_active: user.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        TokenResponse {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse {
            message: message.into(),
        }
    }
}

/// Option as delivered to an exam taker: the is_correct flag is gone.
#[derive(Debug, Clone, Serialize)]
pub struct OptionView {
    pub id: String,
    pub text: String,
}

/// Question as delivered to an exam taker: correct option flags and the
/// NAT correct_answer are stripped.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: String,
    pub question_text: String,
    pub question_type: QuestionType,
    pub subject: String,
    pub topic: String,
    pub difficulty: String,
    pub marks: f64,
    pub negative_marks: f64,
    pub options: Vec<OptionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        QuestionView {
            id: question.id.clone(),
            question_text: question.question_text.clone(),
            question_type: question.question_type,
            subject: question.subject.clone(),
            topic: question.topic.clone(),
            difficulty: question.difficulty.clone(),
            marks: question.marks,
            negative_marks: question.negative_marks,
            options: question
                .options
                .iter()
                .map(|opt| OptionView {
                    id: opt.id.clone(),
                    text: opt.text.clone(),
                })
                .collect(),
            explanation: question.explanation.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExamQuestionResponse {
    pub question: QuestionView,
    pub question_number: usize,
    pub total_questions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_answer: Option<AnswerValue>,
}

#[derive(Debug, Serialize)]
pub struct ShareResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct CsvImportReport {
    pub message: String,
    pub questions_added: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CsvPreviewRow {
    pub row: usize,
    pub question_text: String,
    pub question_type: QuestionType,
    pub subject: String,
    pub topic: String,
}

#[derive(Debug, Serialize)]
pub struct CsvPreviewReport {
    pub rows: Vec<CsvPreviewRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ExplainResponse {
    pub question_id: String,
    pub explanation: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
}

/// Subject/topic suggestion returned by the advisory categorizer.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CategorySuggestion {
    pub subject: String,
    pub topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

/// One option of an AI-generated question draft.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GeneratedOption {
    pub text: String,
    pub is_correct: bool,
}

/// AI-generated question draft. Drafts are returned to the caller for
/// review; nothing is inserted into the question bank automatically.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GeneratedQuestion {
    pub question_text: String,
    pub question_type: QuestionType,
    pub subject: String,
    pub topic: String,
    #[serde(default)]
    pub options: Vec<GeneratedOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GeneratedQuestionSet {
    pub questions: Vec<GeneratedQuestion>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::question::QuestionOption;
    use crate::models::domain::user::UserRole;

    #[test]
    fn test_user_dto_from_user() {
        let user = User::new("jane@example.com", "hash", "Jane Doe", UserRole::Student);
        let dto: UserDto = user.clone().into();

        assert_eq!(dto.id, user.id);
        assert_eq!(dto.email, "jane@example.com");

        let json = serde_json::to_string(&dto).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("hash\""));
    }

    #[test]
    fn test_question_view_strips_answer_fields() {
        let question = Question {
            id: "q-1".to_string(),
            question_text: "What is 2+2?".to_string(),
            question_type: QuestionType::Mcq,
            subject: "Math".to_string(),
            topic: "Arithmetic".to_string(),
            difficulty: "easy".to_string(),
            marks: 1.0,
            negative_marks: 0.33,
            options: vec![
                QuestionOption::new("3", false),
                QuestionOption::new("4", true),
            ],
            correct_answer: None,
            explanation: Some("Basic addition".to_string()),
            created_by: "admin".to_string(),
            created_at: Utc::now(),
            shared_with: None,
        };

        let view = QuestionView::from(&question);
        let json = serde_json::to_string(&view).unwrap();

        assert!(!json.contains("is_correct"));
        assert!(!json.contains("correct_answer"));
        assert_eq!(view.options.len(), 2);
    }

    #[test]
    fn test_token_response_bearer() {
        let token = TokenResponse::bearer("abc".to_string());
        assert_eq!(token.token_type, "bearer");
    }
}
