use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use rand::seq::IndexedRandom;

use crate::{
    errors::{AppError, AppResult},
    models::domain::exam_session::QuestionStatus,
    models::domain::{ExamResult, ExamSession, Question},
    models::dto::request::AnswerUpload,
    models::dto::response::{ExamQuestionResponse, QuestionView},
    repositories::{
        ExamConfigRepository, ExamResultRepository, ExamSessionRepository, QuestionRepository,
    },
    services::scoring::ScoringEngine,
};

/// Session manager: owns the exam-session state machine
/// `not_visited -> not_answered -> {answered, marked, marked_answered}
/// -> submitted` and hands frozen sessions to the scoring engine.
pub struct ExamService {
    config_repository: Arc<dyn ExamConfigRepository>,
    question_repository: Arc<dyn QuestionRepository>,
    session_repository: Arc<dyn ExamSessionRepository>,
    result_repository: Arc<dyn ExamResultRepository>,
}

impl ExamService {
    pub fn new(
        config_repository: Arc<dyn ExamConfigRepository>,
        question_repository: Arc<dyn QuestionRepository>,
        session_repository: Arc<dyn ExamSessionRepository>,
        result_repository: Arc<dyn ExamResultRepository>,
    ) -> Self {
        Self {
            config_repository,
            question_repository,
            session_repository,
            result_repository,
        }
    }

    /// Start an exam, or resume the caller's unsubmitted session for the
    /// same configuration if one exists.
    pub async fn start(&self, user_id: &str, exam_config_id: &str) -> AppResult<ExamSession> {
        if let Some(existing) = self
            .session_repository
            .find_active(user_id, exam_config_id)
            .await?
        {
            log::info!(
                "Resuming unsubmitted session {} for user {}",
                existing.id,
                user_id
            );
            return Ok(existing);
        }

        let config = self
            .config_repository
            .find_by_id(exam_config_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Exam configuration with id '{}' not found",
                    exam_config_id
                ))
            })?;

        let all_questions = self
            .question_repository
            .find_by_subjects(&config.subjects)
            .await?;

        // Deduplicate by normalized text, first occurrence wins
        let mut seen = HashSet::new();
        let pool: Vec<Question> = all_questions
            .into_iter()
            .filter(|q| config.allows_type(q.question_type))
            .filter(|q| seen.insert(q.normalized_text()))
            .collect();

        if pool.len() < config.total_questions {
            return Err(AppError::InsufficientQuestions(format!(
                "exam '{}' needs {} questions, eligible pool has {}",
                config.name,
                config.total_questions,
                pool.len()
            )));
        }

        let question_ids: Vec<String> = if config.randomize_questions {
            let mut rng = rand::rng();
            pool.choose_multiple(&mut rng, config.total_questions)
                .map(|q| q.id.clone())
                .collect()
        } else {
            pool.iter()
                .take(config.total_questions)
                .map(|q| q.id.clone())
                .collect()
        };

        let session = ExamSession::new(user_id, exam_config_id, question_ids);
        let session = self.session_repository.create(session).await?;

        log::info!(
            "Started session {} for user {} on config {}",
            session.id,
            user_id,
            exam_config_id
        );
        Ok(session)
    }

    pub async fn get_session(&self, user_id: &str, session_id: &str) -> AppResult<ExamSession> {
        self.session_repository
            .find_owned(session_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Exam session not found".to_string()))
    }

    /// Fetch one question of an open session with answer fields stripped.
    /// This is the only path that changes visited state.
    pub async fn get_question(
        &self,
        user_id: &str,
        session_id: &str,
        index: usize,
    ) -> AppResult<ExamQuestionResponse> {
        let session = self
            .session_repository
            .find_owned(session_id, user_id)
            .await?
            .filter(|s| !s.submitted)
            .ok_or_else(|| {
                AppError::NotFound("Exam session not found or already submitted".to_string())
            })?;

        if index >= session.questions.len() {
            return Err(AppError::NotFound("Invalid question index".to_string()));
        }

        let question_id = session.questions[index].clone();
        let question = self
            .question_repository
            .find_by_id(&question_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

        let mark_visited = matches!(
            session.question_status.get(&question_id),
            None | Some(QuestionStatus::NotVisited)
        );
        self.session_repository
            .set_current_question(session_id, index, question_id.clone(), mark_visited)
            .await?;

        Ok(ExamQuestionResponse {
            question: QuestionView::from(&question),
            question_number: index + 1,
            total_questions: session.questions.len(),
            current_answer: session.answers.get(&question_id).cloned(),
        })
    }

    /// Upsert one answer/status pair. Answer shape is not validated here;
    /// the scoring engine interprets it at submit time.
    pub async fn record_answer(
        &self,
        user_id: &str,
        session_id: &str,
        upload: AnswerUpload,
    ) -> AppResult<()> {
        let session = self
            .session_repository
            .find_owned(session_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Exam session not found".to_string()))?;

        if session.submitted {
            return Err(AppError::Conflict(
                "Exam session already submitted".to_string(),
            ));
        }

        // lookups are validated against the fixed question sequence
        if !session.contains_question(&upload.question_id) {
            return Err(AppError::ValidationError(format!(
                "Question '{}' does not belong to this session",
                upload.question_id
            )));
        }

        let status = upload.status();
        if status == QuestionStatus::NotAnswered && upload.answer.is_empty() {
            // explicit clear-response action
            self.session_repository
                .clear_answer(session_id, upload.question_id, status)
                .await
        } else {
            self.session_repository
                .set_answer(session_id, upload.question_id, upload.answer, status)
                .await
        }
    }

    /// Freeze and score. Idempotent: a second submit returns the stored
    /// result untouched.
    pub async fn submit(&self, user_id: &str, session_id: &str) -> AppResult<ExamResult> {
        let session = self
            .session_repository
            .find_owned(session_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Exam session not found".to_string()))?;

        if session.submitted {
            return self
                .result_repository
                .find_by_session(session_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Result not found".to_string()));
        }

        let config = self
            .config_repository
            .find_by_id(&session.exam_config_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Exam configuration with id '{}' not found",
                    session.exam_config_id
                ))
            })?;

        let questions: HashMap<String, Question> = self
            .question_repository
            .find_many(&session.questions)
            .await?
            .into_iter()
            .map(|q| (q.id.clone(), q))
            .collect();

        let submitted_at = Utc::now();
        let result = ScoringEngine::score(&session, &config, &questions, submitted_at);

        self.session_repository
            .mark_submitted(session_id, submitted_at)
            .await?;
        let result = self.result_repository.create(result).await?;

        log::info!(
            "Session {} submitted by user {}: score {:.2} ({} / {} correct)",
            session_id,
            user_id,
            result.score,
            result.correct,
            result.total_questions
        );
        Ok(result)
    }

    pub async fn get_result(&self, user_id: &str, session_id: &str) -> AppResult<ExamResult> {
        self.result_repository
            .find_for_user(session_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Result not found".to_string()))
    }
}
