use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::{
    bson::{doc, to_bson},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::AppResult,
    models::domain::exam_session::{AnswerValue, QuestionStatus},
    models::domain::ExamSession,
};

/// Answer and status writes are single-document dotted-path updates; the
/// store's per-document atomicity is the only concurrency control.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExamSessionRepository: Send + Sync {
    async fn create(&self, session: ExamSession) -> AppResult<ExamSession>;
    async fn find_owned(&self, id: &str, user_id: &str) -> AppResult<Option<ExamSession>>;
    /// The unsubmitted session for (user, config), if one exists.
    async fn find_active(
        &self,
        user_id: &str,
        exam_config_id: &str,
    ) -> AppResult<Option<ExamSession>>;
    async fn count_active_for_config(&self, exam_config_id: &str) -> AppResult<u64>;
    async fn set_current_question(
        &self,
        id: &str,
        index: usize,
        question_id: String,
        mark_visited: bool,
    ) -> AppResult<()>;
    async fn set_answer(
        &self,
        id: &str,
        question_id: String,
        answer: AnswerValue,
        status: QuestionStatus,
    ) -> AppResult<()>;
    /// Explicit clear-response: removes the answer entry so the question
    /// no longer counts as attempted.
    async fn clear_answer(
        &self,
        id: &str,
        question_id: String,
        status: QuestionStatus,
    ) -> AppResult<()>;
    async fn mark_submitted(&self, id: &str, end_time: DateTime<Utc>) -> AppResult<()>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoExamSessionRepository {
    collection: Collection<ExamSession>,
}

impl MongoExamSessionRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("exam_sessions");
        Self { collection }
    }
}

#[async_trait]
impl ExamSessionRepository for MongoExamSessionRepository {
    async fn create(&self, session: ExamSession) -> AppResult<ExamSession> {
        self.collection.insert_one(&session).await?;
        Ok(session)
    }

    async fn find_owned(&self, id: &str, user_id: &str) -> AppResult<Option<ExamSession>> {
        let session = self
            .collection
            .find_one(doc! { "id": id, "user_id": user_id })
            .await?;
        Ok(session)
    }

    async fn find_active(
        &self,
        user_id: &str,
        exam_config_id: &str,
    ) -> AppResult<Option<ExamSession>> {
        let session = self
            .collection
            .find_one(doc! {
                "user_id": user_id,
                "exam_config_id": exam_config_id,
                "submitted": false
            })
            .await?;
        Ok(session)
    }

    async fn count_active_for_config(&self, exam_config_id: &str) -> AppResult<u64> {
        let count = self
            .collection
            .count_documents(doc! {
                "exam_config_id": exam_config_id,
                "submitted": false
            })
            .await?;
        Ok(count)
    }

    async fn set_current_question(
        &self,
        id: &str,
        index: usize,
        question_id: String,
        mark_visited: bool,
    ) -> AppResult<()> {
        let mut set = doc! { "current_question": index as i64 };
        if mark_visited {
            set.insert(
                format!("question_status.{}", question_id),
                to_bson(&QuestionStatus::NotAnswered)?,
            );
        }

        self.collection
            .update_one(doc! { "id": id }, doc! { "$set": set })
            .await?;
        Ok(())
    }

    async fn set_answer(
        &self,
        id: &str,
        question_id: String,
        answer: AnswerValue,
        status: QuestionStatus,
    ) -> AppResult<()> {
        self.collection
            .update_one(
                doc! { "id": id },
                doc! {
                    "$set": {
                        format!("answers.{}", question_id): to_bson(&answer)?,
                        format!("question_status.{}", question_id): to_bson(&status)?,
                    }
                },
            )
            .await?;
        Ok(())
    }

    async fn clear_answer(
        &self,
        id: &str,
        question_id: String,
        status: QuestionStatus,
    ) -> AppResult<()> {
        self.collection
            .update_one(
                doc! { "id": id },
                doc! {
                    "$unset": { format!("answers.{}", question_id): "" },
                    "$set": { format!("question_status.{}", question_id): to_bson(&status)? },
                },
            )
            .await?;
        Ok(())
    }

    async fn mark_submitted(&self, id: &str, end_time: DateTime<Utc>) -> AppResult<()> {
        self.collection
            .update_one(
                doc! { "id": id },
                doc! {
                    "$set": {
                        "submitted": true,
                        "end_time": to_bson(&end_time)?,
                    }
                },
            )
            .await?;
        Ok(())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for exam_sessions collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let active_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "exam_config_id": 1, "submitted": 1 })
            .options(
                IndexOptions::builder()
                    .name("user_config_submitted".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(active_index).await?;

        Ok(())
    }
}
