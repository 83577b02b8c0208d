use std::sync::Arc;

use crate::{
    errors::{AppError, AppResult},
    models::domain::exam_config::TypeMarking,
    models::domain::ExamConfig,
    models::dto::request::CreateExamConfigRequest,
    repositories::{ExamConfigRepository, ExamSessionRepository},
};

const DEFAULT_DURATION_MINUTES: i64 = 180;

pub struct ExamConfigService {
    repository: Arc<dyn ExamConfigRepository>,
    session_repository: Arc<dyn ExamSessionRepository>,
}

impl ExamConfigService {
    pub fn new(
        repository: Arc<dyn ExamConfigRepository>,
        session_repository: Arc<dyn ExamSessionRepository>,
    ) -> Self {
        Self {
            repository,
            session_repository,
        }
    }

    pub async fn create(
        &self,
        created_by: &str,
        request: CreateExamConfigRequest,
    ) -> AppResult<ExamConfig> {
        let config = ExamConfig::new(
            &request.name,
            &request.description,
            request.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES),
            request.total_questions,
            request.subjects,
            request.question_types,
            request
                .type_marking
                .into_iter()
                .map(|m| TypeMarking {
                    question_type: m.question_type,
                    marks: m.marks,
                    negative_marks: m.negative_marks,
                })
                .collect(),
            request.randomize_questions.unwrap_or(true),
            created_by,
        );

        self.repository.create(config).await
    }

    pub async fn get(&self, id: &str) -> AppResult<ExamConfig> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Exam configuration with id '{}' not found", id))
            })
    }

    pub async fn list(&self) -> AppResult<Vec<ExamConfig>> {
        self.repository.list_all().await
    }

    /// Deletion is blocked while any unsubmitted session still references
    /// the configuration.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let active = self.session_repository.count_active_for_config(id).await?;
        if active > 0 {
            return Err(AppError::Conflict(format!(
                "{} unsubmitted session(s) still reference this exam configuration",
                active
            )));
        }

        if !self.repository.delete(id).await? {
            return Err(AppError::NotFound(format!(
                "Exam configuration with id '{}' not found",
                id
            )));
        }
        Ok(())
    }
}
