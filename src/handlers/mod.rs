use actix_web::{get, HttpResponse};

pub mod ai_handler;
pub mod auth_handler;
pub mod exam_config_handler;
pub mod exam_handler;
pub mod question_handler;
pub mod upload_handler;

#[get("/api/health")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}
