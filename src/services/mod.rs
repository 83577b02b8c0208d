pub mod advisory_service;
pub mod csv_import;
pub mod exam_config_service;
pub mod exam_service;
pub mod question_service;
pub mod scoring;
pub mod user_service;

pub use advisory_service::{Advisory, NoopAdvisory, OpenAiAdvisory};
pub use exam_config_service::ExamConfigService;
pub use exam_service::ExamService;
pub use question_service::QuestionService;
pub use scoring::ScoringEngine;
pub use user_service::UserService;
