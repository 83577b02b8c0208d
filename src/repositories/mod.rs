pub mod exam_config_repository;
pub mod exam_result_repository;
pub mod exam_session_repository;
pub mod question_repository;
pub mod user_repository;

pub use exam_config_repository::{ExamConfigRepository, MongoExamConfigRepository};
pub use exam_result_repository::{ExamResultRepository, MongoExamResultRepository};
pub use exam_session_repository::{ExamSessionRepository, MongoExamSessionRepository};
pub use question_repository::{MongoQuestionRepository, QuestionRepository};
pub use user_repository::{MongoUserRepository, UserRepository};
