use crate::auth::Claims;
use crate::models::domain::question::{Question, QuestionOption, QuestionType};
use crate::models::domain::user::{User, UserRole};
