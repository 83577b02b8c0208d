use actix_web::{delete, get, post, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::{require_admin, AuthenticatedUser},
    errors::AppError,
    models::dto::request::CreateExamConfigRequest,
    models::dto::response::MessageResponse,
};

/// Configurations visible to every authenticated user.
#[get("/exams")]
pub async fn list_exams(
    state: web::Data<AppState>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let configs = state.exam_config_service.list().await?;
    Ok(HttpResponse::Ok().json(configs))
}

#[post("/admin/exams")]
pub async fn create_exam_config(
    state: web::Data<AppState>,
    request: web::Json<CreateExamConfigRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let request = request.into_inner();
    request.validate()?;

    let config = state
        .exam_config_service
        .create(&auth.0.sub, request)
        .await?;
    Ok(HttpResponse::Created().json(config))
}

#[get("/admin/exams")]
pub async fn admin_list_exam_configs(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let configs = state.exam_config_service.list().await?;
    Ok(HttpResponse::Ok().json(configs))
}

#[delete("/admin/exams/{id}")]
pub async fn delete_exam_config(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    state.exam_config_service.delete(&id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new(
        "Exam configuration deleted successfully",
    )))
}
