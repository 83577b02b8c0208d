use std::sync::Arc;

use crate::{
    auth::JwtService,
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        ExamConfigRepository, ExamResultRepository, ExamSessionRepository, MongoExamConfigRepository,
        MongoExamResultRepository, MongoExamSessionRepository, MongoQuestionRepository,
        MongoUserRepository, QuestionRepository, UserRepository,
    },
    services::{
        Advisory, ExamConfigService, ExamService, NoopAdvisory, OpenAiAdvisory, QuestionService,
        UserService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub question_service: Arc<QuestionService>,
    pub exam_config_service: Arc<ExamConfigService>,
    pub exam_service: Arc<ExamService>,
    pub advisory: Arc<dyn Advisory>,
    pub jwt_service: Arc<JwtService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let user_repository = Arc::new(MongoUserRepository::new(&db));
        user_repository.ensure_indexes().await?;

        let question_repository = Arc::new(MongoQuestionRepository::new(&db));
        question_repository.ensure_indexes().await?;

        let exam_config_repository = Arc::new(MongoExamConfigRepository::new(&db));
        exam_config_repository.ensure_indexes().await?;

        let exam_session_repository = Arc::new(MongoExamSessionRepository::new(&db));
        exam_session_repository.ensure_indexes().await?;

        let exam_result_repository = Arc::new(MongoExamResultRepository::new(&db));
        exam_result_repository.ensure_indexes().await?;

        let jwt_service = Arc::new(JwtService::new(
            &config.jwt_secret,
            config.jwt_expiration_hours,
        ));

        let user_service = Arc::new(UserService::new(
            user_repository,
            Arc::clone(&jwt_service),
        ));
        let question_service = Arc::new(QuestionService::new(
            Arc::clone(&question_repository) as _,
            config.share_token_ttl_hours,
        ));
        let exam_config_service = Arc::new(ExamConfigService::new(
            Arc::clone(&exam_config_repository) as _,
            Arc::clone(&exam_session_repository) as _,
        ));
        let exam_service = Arc::new(ExamService::new(
            exam_config_repository,
            question_repository,
            exam_session_repository,
            exam_result_repository,
        ));

        // Injected capability: real client when a key is configured,
        // otherwise the stub that reports the advisory as unavailable.
        let advisory: Arc<dyn Advisory> = match OpenAiAdvisory::from_config(&config) {
            Some(advisory) => Arc::new(advisory),
            None => {
                log::warn!("OPENAI_API_KEY not set, AI advisory endpoints will return errors");
                Arc::new(NoopAdvisory)
            }
        };

        Ok(Self {
            user_service,
            question_service,
            exam_config_service,
            exam_service,
            advisory,
            jwt_service,
            config: Arc::new(config),
        })
    }
}
