use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{FindOptions, IndexOptions},
    Collection, IndexModel,
};

use crate::{db::Database, errors::AppResult, models::domain::Question};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    async fn create(&self, question: Question) -> AppResult<Question>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Question>>;
    async fn find_many(&self, ids: &[String]) -> AppResult<Vec<Question>>;
    /// Every question whose subject is in the given list, in store order.
    async fn find_by_subjects(&self, subjects: &[String]) -> AppResult<Vec<Question>>;
    /// Duplicate-detection candidates: same subject and topic.
    async fn find_by_subject_topic(&self, subject: &str, topic: &str)
        -> AppResult<Vec<Question>>;
    async fn find_by_share_token(&self, token: &str) -> AppResult<Option<Question>>;
    async fn list(
        &self,
        subject: Option<String>,
        created_by: Option<String>,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Question>, i64)>;
    async fn update(&self, question: Question) -> AppResult<Question>;
    async fn delete(&self, id: &str) -> AppResult<bool>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoQuestionRepository {
    collection: Collection<Question>,
}

impl MongoQuestionRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("questions");
        Self { collection }
    }
}

#[async_trait]
impl QuestionRepository for MongoQuestionRepository {
    async fn create(&self, question: Question) -> AppResult<Question> {
        self.collection.insert_one(&question).await?;
        Ok(question)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Question>> {
        let question = self.collection.find_one(doc! { "id": id }).await?;
        Ok(question)
    }

    async fn find_many(&self, ids: &[String]) -> AppResult<Vec<Question>> {
        let questions = self
            .collection
            .find(doc! { "id": { "$in": ids.to_vec() } })
            .await?
            .try_collect()
            .await?;
        Ok(questions)
    }

    async fn find_by_subjects(&self, subjects: &[String]) -> AppResult<Vec<Question>> {
        let questions = self
            .collection
            .find(doc! { "subject": { "$in": subjects.to_vec() } })
            .await?
            .try_collect()
            .await?;
        Ok(questions)
    }

    async fn find_by_subject_topic(
        &self,
        subject: &str,
        topic: &str,
    ) -> AppResult<Vec<Question>> {
        let questions = self
            .collection
            .find(doc! { "subject": subject, "topic": topic })
            .await?
            .try_collect()
            .await?;
        Ok(questions)
    }

    async fn find_by_share_token(&self, token: &str) -> AppResult<Option<Question>> {
        let question = self
            .collection
            .find_one(doc! { "shared_with.token": token })
            .await?;
        Ok(question)
    }

    async fn list(
        &self,
        subject: Option<String>,
        created_by: Option<String>,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Question>, i64)> {
        let mut filter = doc! {};
        if let Some(subject) = subject {
            filter.insert("subject", subject);
        }
        if let Some(created_by) = created_by {
            filter.insert("created_by", created_by);
        }

        let total = self.collection.count_documents(filter.clone()).await? as i64;

        let find_options = FindOptions::builder()
            .skip(Some(offset as u64))
            .limit(Some(limit))
            .build();

        let cursor = self
            .collection
            .find(filter)
            .with_options(find_options)
            .await?;
        let items: Vec<Question> = cursor.try_collect().await?;

        Ok((items, total))
    }

    async fn update(&self, question: Question) -> AppResult<Question> {
        self.collection
            .replace_one(doc! { "id": &question.id }, &question)
            .await?;
        Ok(question)
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for questions collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let subject_index = IndexModel::builder()
            .keys(doc! { "subject": 1, "topic": 1 })
            .options(
                IndexOptions::builder()
                    .name("subject_topic".to_string())
                    .build(),
            )
            .build();

        let share_token_index = IndexModel::builder()
            .keys(doc! { "shared_with.token": 1 })
            .options(
                IndexOptions::builder()
                    .sparse(true)
                    .name("share_token".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(subject_index).await?;
        self.collection.create_index(share_token_index).await?;

        Ok(())
    }
}
