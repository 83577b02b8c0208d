use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{db::Database, errors::AppResult, models::domain::ExamConfig};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExamConfigRepository: Send + Sync {
    async fn create(&self, config: ExamConfig) -> AppResult<ExamConfig>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<ExamConfig>>;
    async fn list_all(&self) -> AppResult<Vec<ExamConfig>>;
    async fn delete(&self, id: &str) -> AppResult<bool>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoExamConfigRepository {
    collection: Collection<ExamConfig>,
}

impl MongoExamConfigRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("exam_configs");
        Self { collection }
    }
}

#[async_trait]
impl ExamConfigRepository for MongoExamConfigRepository {
    async fn create(&self, config: ExamConfig) -> AppResult<ExamConfig> {
        self.collection.insert_one(&config).await?;
        Ok(config)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<ExamConfig>> {
        let config = self.collection.find_one(doc! { "id": id }).await?;
        Ok(config)
    }

    async fn list_all(&self) -> AppResult<Vec<ExamConfig>> {
        let configs = self
            .collection
            .find(doc! {})
            .await?
            .try_collect()
            .await?;
        Ok(configs)
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for exam_configs collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;

        Ok(())
    }
}
