use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
    auth::{require_owner_or_admin, Claims},
    errors::{AppError, AppResult},
    models::domain::question::{normalize_text, QuestionOption, QuestionType, ShareGrant},
    models::domain::Question,
    models::dto::request::{
        CreateQuestionRequest, QuestionListParams, ShareQuestionRequest, UpdateQuestionRequest,
    },
    models::dto::response::{CsvImportReport, CsvPreviewReport, CsvPreviewRow, ShareResponse},
    repositories::QuestionRepository,
    services::csv_import,
};

const DEFAULT_DIFFICULTY: &str = "medium";
const DEFAULT_MARKS: f64 = 1.0;
const DEFAULT_NEGATIVE_MARKS: f64 = 0.33;

pub struct QuestionService {
    repository: Arc<dyn QuestionRepository>,
    share_token_ttl_hours: i64,
}

impl QuestionService {
    pub fn new(repository: Arc<dyn QuestionRepository>, share_token_ttl_hours: i64) -> Self {
        Self {
            repository,
            share_token_ttl_hours,
        }
    }

    pub async fn create(
        &self,
        created_by: &str,
        request: CreateQuestionRequest,
    ) -> AppResult<Question> {
        let question = Self::build_question(created_by, request)?;

        self.reject_duplicate(&question, None).await?;

        self.repository.create(question).await
    }

    pub async fn get(&self, id: &str) -> AppResult<Question> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Question with id '{}' not found", id)))
    }

    pub async fn list(
        &self,
        params: &QuestionListParams,
        created_by: Option<String>,
    ) -> AppResult<(Vec<Question>, i64)> {
        self.repository
            .list(
                params.subject.clone(),
                created_by,
                params.offset.unwrap_or(0),
                params.limit.unwrap_or(100).min(100),
            )
            .await
    }

    pub async fn update(
        &self,
        claims: &Claims,
        id: &str,
        request: UpdateQuestionRequest,
    ) -> AppResult<Question> {
        let mut question = self.get(id).await?;
        require_owner_or_admin(claims, &question.created_by)?;

        if let Some(question_text) = request.question_text {
            question.question_text = question_text;
        }
        if let Some(subject) = request.subject {
            question.subject = subject;
        }
        if let Some(topic) = request.topic {
            question.topic = topic;
        }
        if let Some(difficulty) = request.difficulty {
            question.difficulty = difficulty;
        }
        if let Some(marks) = request.marks {
            question.marks = marks;
        }
        if let Some(negative_marks) = request.negative_marks {
            question.negative_marks = negative_marks;
        }
        if let Some(options) = request.options {
            question.options = options
                .into_iter()
                .map(|opt| QuestionOption::new(&opt.text, opt.is_correct))
                .collect();
        }
        if let Some(correct_answer) = request.correct_answer {
            question.correct_answer = Some(correct_answer);
        }
        if let Some(explanation) = request.explanation {
            question.explanation = Some(explanation);
        }

        Self::check_invariants(&question)?;
        self.reject_duplicate(&question, Some(&question.id)).await?;

        self.repository.update(question).await
    }

    /// Delete with no cascade; historical sessions may keep dangling ids.
    pub async fn delete(&self, claims: &Claims, id: &str) -> AppResult<()> {
        let question = self.get(id).await?;
        require_owner_or_admin(claims, &question.created_by)?;

        if !self.repository.delete(id).await? {
            return Err(AppError::NotFound(format!(
                "Question with id '{}' not found",
                id
            )));
        }
        Ok(())
    }

    /// Grant read-only visibility through a recipient list and a
    /// time-bounded token.
    pub async fn share(
        &self,
        claims: &Claims,
        id: &str,
        request: ShareQuestionRequest,
    ) -> AppResult<ShareResponse> {
        let mut question = self.get(id).await?;
        require_owner_or_admin(claims, &question.created_by)?;

        let ttl = request
            .expires_in_hours
            .unwrap_or(self.share_token_ttl_hours);
        let expires_at = Utc::now() + Duration::hours(ttl);

        let mut hasher = Sha256::new();
        hasher.update(Uuid::new_v4().to_string().as_bytes());
        let token = format!("{:x}", hasher.finalize());

        question.shared_with = Some(ShareGrant {
            emails: request.emails,
            token: token.clone(),
            expires_at,
        });
        self.repository.update(question).await?;

        Ok(ShareResponse { token, expires_at })
    }

    pub async fn get_shared(&self, token: &str) -> AppResult<Question> {
        let question = self
            .repository
            .find_by_share_token(token)
            .await?
            .filter(|q| {
                q.shared_with
                    .as_ref()
                    .is_some_and(|grant| !grant.is_expired(Utc::now()))
            })
            .ok_or_else(|| AppError::NotFound("Share link not found or expired".to_string()))?;

        Ok(question)
    }

    /// Bulk import: one insert per well-formed row, per-row error strings
    /// for everything else. A bad row never aborts the file.
    pub async fn import_csv(&self, created_by: &str, data: &[u8]) -> AppResult<CsvImportReport> {
        let rows = csv_import::parse_rows(data)?;

        let mut questions_added = 0usize;
        let mut errors = Vec::new();
        let mut seen_in_file = HashSet::new();

        for (row_num, parsed) in rows {
            let request = match parsed {
                Ok(request) => request,
                Err(message) => {
                    errors.push(format!("Row {}: {}", row_num, message));
                    continue;
                }
            };

            let triple = (
                normalize_text(&request.question_text),
                request.subject.clone(),
                request.topic.clone(),
            );
            if !seen_in_file.insert(triple) {
                errors.push(format!("Row {}: duplicate of an earlier row", row_num));
                continue;
            }

            let outcome = match Self::build_question(created_by, request) {
                Ok(question) => match self.reject_duplicate(&question, None).await {
                    Ok(()) => self.repository.create(question).await.map(|_| ()),
                    Err(e) => Err(e),
                },
                Err(e) => Err(e),
            };

            match outcome {
                Ok(()) => questions_added += 1,
                Err(e) => errors.push(format!("Row {}: {}", row_num, e)),
            }
        }

        Ok(CsvImportReport {
            message: format!("Successfully added {} questions", questions_added),
            questions_added,
            errors,
        })
    }

    /// Same parse as import_csv, nothing inserted.
    pub async fn preview_csv(&self, data: &[u8]) -> AppResult<CsvPreviewReport> {
        let rows = csv_import::parse_rows(data)?;

        let mut preview = Vec::new();
        let mut errors = Vec::new();

        for (row_num, parsed) in rows {
            match parsed.and_then(|request| {
                Self::build_question("preview", request).map_err(|e| e.to_string())
            }) {
                Ok(question) => preview.push(CsvPreviewRow {
                    row: row_num,
                    question_text: question.question_text,
                    question_type: question.question_type,
                    subject: question.subject,
                    topic: question.topic,
                }),
                Err(message) => errors.push(format!("Row {}: {}", row_num, message)),
            }
        }

        Ok(CsvPreviewReport {
            rows: preview,
            errors,
        })
    }

    fn build_question(created_by: &str, request: CreateQuestionRequest) -> AppResult<Question> {
        let question = Question {
            id: Uuid::new_v4().to_string(),
            question_text: request.question_text,
            question_type: request.question_type,
            subject: request.subject,
            topic: request.topic,
            difficulty: request
                .difficulty
                .unwrap_or_else(|| DEFAULT_DIFFICULTY.to_string()),
            marks: request.marks.unwrap_or(DEFAULT_MARKS),
            negative_marks: request.negative_marks.unwrap_or(DEFAULT_NEGATIVE_MARKS),
            options: request
                .options
                .into_iter()
                .map(|opt| QuestionOption::new(&opt.text, opt.is_correct))
                .collect(),
            correct_answer: request.correct_answer,
            explanation: request.explanation,
            created_by: created_by.to_string(),
            created_at: Utc::now(),
            shared_with: None,
        };

        Self::check_invariants(&question)?;
        Ok(question)
    }

    fn check_invariants(question: &Question) -> AppResult<()> {
        if question.marks <= 0.0 {
            return Err(AppError::ValidationError(
                "marks must be positive".to_string(),
            ));
        }
        if question.negative_marks < 0.0 {
            return Err(AppError::ValidationError(
                "negative_marks must not be negative".to_string(),
            ));
        }

        let correct_count = question.options.iter().filter(|o| o.is_correct).count();
        match question.question_type {
            QuestionType::Mcq => {
                if question.options.len() < 2 {
                    return Err(AppError::ValidationError(
                        "MCQ needs at least 2 options".to_string(),
                    ));
                }
                if correct_count != 1 {
                    return Err(AppError::ValidationError(
                        "MCQ needs exactly one correct option".to_string(),
                    ));
                }
            }
            QuestionType::Msq => {
                if question.options.len() < 2 {
                    return Err(AppError::ValidationError(
                        "MSQ needs at least 2 options".to_string(),
                    ));
                }
                if correct_count == 0 {
                    return Err(AppError::ValidationError(
                        "MSQ needs at least one correct option".to_string(),
                    ));
                }
            }
            QuestionType::Nat => {
                if !question.options.is_empty() {
                    return Err(AppError::ValidationError(
                        "NAT questions must not have options".to_string(),
                    ));
                }
                let defined = question
                    .correct_answer
                    .as_ref()
                    .is_some_and(|a| !a.is_empty());
                if !defined {
                    return Err(AppError::ValidationError(
                        "NAT questions need a correct_answer".to_string(),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Duplicate means the same normalized (question_text, subject, topic)
    /// triple already exists.
    async fn reject_duplicate(
        &self,
        question: &Question,
        exclude_id: Option<&str>,
    ) -> AppResult<()> {
        let candidates = self
            .repository
            .find_by_subject_topic(&question.subject, &question.topic)
            .await?;

        let normalized = question.normalized_text();
        let duplicate = candidates.iter().any(|existing| {
            Some(existing.id.as_str()) != exclude_id && existing.normalized_text() == normalized
        });

        if duplicate {
            return Err(AppError::AlreadyExists(format!(
                "A question with the same text already exists in {} / {}",
                question.subject, question.topic
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::exam_session::AnswerValue;
    use crate::models::domain::user::UserRole;
    use crate::models::dto::request::OptionInput;
    use crate::repositories::question_repository::MockQuestionRepository;

    fn claims(sub: &str, role: UserRole) -> Claims {
        Claims {
            sub: sub.to_string(),
            email: format!("{}@example.com", sub),
            role,
            iat: 0,
            exp: 9999999999,
        }
    }

    fn mcq_request(text: &str) -> CreateQuestionRequest {
        CreateQuestionRequest {
            question_text: text.to_string(),
            question_type: QuestionType::Mcq,
            subject: "Math".to_string(),
            topic: "Arithmetic".to_string(),
            difficulty: None,
            marks: None,
            negative_marks: None,
            options: vec![
                OptionInput {
                    text: "3".to_string(),
                    is_correct: false,
                },
                OptionInput {
                    text: "4".to_string(),
                    is_correct: true,
                },
            ],
            correct_answer: None,
            explanation: None,
        }
    }

    fn service(repo: MockQuestionRepository) -> QuestionService {
        QuestionService::new(Arc::new(repo), 24)
    }

    #[tokio::test]
    async fn create_applies_defaults_and_persists() {
        let mut repo = MockQuestionRepository::new();
        repo.expect_find_by_subject_topic()
            .returning(|_, _| Ok(vec![]));
        repo.expect_create().times(1).returning(|q| Ok(q));

        let question = service(repo)
            .create("user-1", mcq_request("What is 2+2?"))
            .await
            .unwrap();

        assert_eq!(question.difficulty, "medium");
        assert_eq!(question.marks, 1.0);
        assert_eq!(question.negative_marks, 0.33);
        assert_eq!(question.created_by, "user-1");
    }

    #[tokio::test]
    async fn create_rejects_duplicate_by_normalized_triple() {
        let mut repo = MockQuestionRepository::new();
        repo.expect_find_by_subject_topic().returning(|_, _| {
            let existing = QuestionService::build_question(
                "someone-else",
                mcq_request("  WHAT is    2+2? "),
            )
            .unwrap();
            Ok(vec![existing])
        });
        repo.expect_create().times(0);

        let err = service(repo)
            .create("user-1", mcq_request("What is 2+2?"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn create_enforces_type_invariants() {
        let repo = MockQuestionRepository::new();
        let svc = service(repo);

        // MCQ with two correct options
        let mut bad_mcq = mcq_request("Q?");
        bad_mcq.options[0].is_correct = true;
        assert!(matches!(
            svc.create("u", bad_mcq).await.unwrap_err(),
            AppError::ValidationError(_)
        ));

        // NAT with options
        let mut bad_nat = mcq_request("Q2?");
        bad_nat.question_type = QuestionType::Nat;
        bad_nat.correct_answer = Some(AnswerValue::Text("4".into()));
        assert!(matches!(
            svc.create("u", bad_nat).await.unwrap_err(),
            AppError::ValidationError(_)
        ));

        // NAT without correct_answer
        let mut bad_nat = mcq_request("Q3?");
        bad_nat.question_type = QuestionType::Nat;
        bad_nat.options.clear();
        bad_nat.correct_answer = None;
        assert!(matches!(
            svc.create("u", bad_nat).await.unwrap_err(),
            AppError::ValidationError(_)
        ));
    }

    #[tokio::test]
    async fn delete_requires_owner_or_admin() {
        let owned = QuestionService::build_question("owner-1", mcq_request("Q?")).unwrap();
        let id = owned.id.clone();

        let mut repo = MockQuestionRepository::new();
        let owned_clone = owned.clone();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(owned_clone.clone())));
        repo.expect_delete().times(1).returning(|_| Ok(true));

        let svc = service(repo);

        let err = svc
            .delete(&claims("intruder", UserRole::Student), &id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        svc.delete(&claims("admin-1", UserRole::Admin), &id)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn share_sets_grant_and_get_shared_honors_expiry() {
        let owned = QuestionService::build_question("owner-1", mcq_request("Q?")).unwrap();
        let id = owned.id.clone();

        let mut repo = MockQuestionRepository::new();
        let owned_clone = owned.clone();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(owned_clone.clone())));
        repo.expect_update()
            .withf(|q| q.shared_with.is_some())
            .times(1)
            .returning(|q| Ok(q));

        let svc = service(repo);
        let share = svc
            .share(
                &claims("owner-1", UserRole::Student),
                &id,
                ShareQuestionRequest {
                    emails: vec!["peer@example.com".into()],
                    expires_in_hours: Some(2),
                },
            )
            .await
            .unwrap();

        assert_eq!(share.token.len(), 64); // sha-256 hex
        assert!(share.expires_at > Utc::now());
    }

    #[tokio::test]
    async fn get_shared_rejects_expired_grant() {
        let mut expired = QuestionService::build_question("owner-1", mcq_request("Q?")).unwrap();
        expired.shared_with = Some(ShareGrant {
            emails: vec![],
            token: "tok".to_string(),
            expires_at: Utc::now() - Duration::hours(1),
        });

        let mut repo = MockQuestionRepository::new();
        let expired_clone = expired.clone();
        repo.expect_find_by_share_token()
            .returning(move |_| Ok(Some(expired_clone.clone())));

        let err = service(repo).get_shared("tok").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn import_csv_counts_good_rows_and_reports_bad_ones() {
        let mut repo = MockQuestionRepository::new();
        repo.expect_find_by_subject_topic()
            .returning(|_, _| Ok(vec![]));
        repo.expect_create().times(4).returning(|q| Ok(q));

        let csv = "question_text,question_type,subject,topic,option_1,option_1_correct,option_2,option_2_correct,marks,negative_marks,explanation,correct_answer\n\
            Q one?,MCQ,Math,T,a,true,b,false,1,0.33,,\n\
            Q two?,MCQ,Math,T,a,true,b,false,1,0.33,,\n\
            Q bad?,ESSAY,Math,T,a,true,b,false,1,0.33,,\n\
            Q three?,MSQ,Math,T,a,true,b,true,1,0.33,,\n\
            Q four?,NAT,Math,T,,,,,1,0.33,,42";

        let report = service(repo)
            .import_csv("admin-1", csv.as_bytes())
            .await
            .unwrap();

        assert_eq!(report.questions_added, 4);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("Row 4:"));
    }

    #[tokio::test]
    async fn import_csv_flags_in_file_duplicates() {
        let mut repo = MockQuestionRepository::new();
        repo.expect_find_by_subject_topic()
            .returning(|_, _| Ok(vec![]));
        repo.expect_create().times(1).returning(|q| Ok(q));

        let csv = "question_text,question_type,subject,topic,option_1,option_1_correct,option_2,option_2_correct\n\
            Q one?,MCQ,Math,T,a,true,b,false\n\
            q ONE?,MCQ,Math,T,a,true,b,false";

        let report = service(repo)
            .import_csv("admin-1", csv.as_bytes())
            .await
            .unwrap();

        assert_eq!(report.questions_added, 1);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("Row 3"));
    }

    #[tokio::test]
    async fn preview_csv_never_touches_the_repository() {
        let mut repo = MockQuestionRepository::new();
        repo.expect_create().times(0);
        repo.expect_find_by_subject_topic().times(0);

        let csv = "question_text,question_type,subject,topic,option_1,option_1_correct,option_2,option_2_correct\n\
            Q one?,MCQ,Math,T,a,true,b,false\n\
            Q bad?,ESSAY,Math,T,a,true,b,false";

        let report = service(repo).preview_csv(csv.as_bytes()).await.unwrap();

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.errors.len(), 1);
    }
}
