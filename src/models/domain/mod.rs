pub mod exam_config;
pub mod exam_result;
pub mod exam_session;
pub mod question;
pub mod user;

pub use exam_config::ExamConfig;
pub use exam_result::ExamResult;
pub use exam_session::ExamSession;
pub use question::Question;
pub use user::User;
