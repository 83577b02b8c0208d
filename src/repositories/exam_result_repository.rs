use async_trait::async_trait;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{db::Database, errors::AppResult, models::domain::ExamResult};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExamResultRepository: Send + Sync {
    async fn create(&self, result: ExamResult) -> AppResult<ExamResult>;
    async fn find_by_session(&self, exam_session_id: &str) -> AppResult<Option<ExamResult>>;
    async fn find_for_user(
        &self,
        exam_session_id: &str,
        user_id: &str,
    ) -> AppResult<Option<ExamResult>>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoExamResultRepository {
    collection: Collection<ExamResult>,
}

impl MongoExamResultRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("exam_results");
        Self { collection }
    }
}

#[async_trait]
impl ExamResultRepository for MongoExamResultRepository {
    async fn create(&self, result: ExamResult) -> AppResult<ExamResult> {
        self.collection.insert_one(&result).await?;
        Ok(result)
    }

    async fn find_by_session(&self, exam_session_id: &str) -> AppResult<Option<ExamResult>> {
        let result = self
            .collection
            .find_one(doc! { "exam_session_id": exam_session_id })
            .await?;
        Ok(result)
    }

    async fn find_for_user(
        &self,
        exam_session_id: &str,
        user_id: &str,
    ) -> AppResult<Option<ExamResult>> {
        let result = self
            .collection
            .find_one(doc! {
                "exam_session_id": exam_session_id,
                "user_id": user_id
            })
            .await?;
        Ok(result)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for exam_results collection");

        let session_index = IndexModel::builder()
            .keys(doc! { "exam_session_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("session_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(session_index).await?;

        Ok(())
    }
}
