use actix_web::{delete, get, post, put, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::{require_admin, require_owner_or_admin, AuthenticatedUser},
    errors::AppError,
    models::domain::user::UserRole,
    models::dto::request::{
        CreateQuestionRequest, QuestionListParams, ShareQuestionRequest, UpdateQuestionRequest,
    },
    models::dto::response::MessageResponse,
};

#[post("/questions")]
pub async fn create_question(
    state: web::Data<AppState>,
    request: web::Json<CreateQuestionRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let question = state.question_service.create(&auth.0.sub, request).await?;
    Ok(HttpResponse::Created().json(question))
}

/// Students see their own bank; admins see everything.
#[get("/questions")]
pub async fn list_questions(
    state: web::Data<AppState>,
    params: web::Query<QuestionListParams>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let params = params.into_inner();
    params.validate()?;

    let created_by = match auth.0.role {
        UserRole::Admin => None,
        UserRole::Student => Some(auth.0.sub.clone()),
    };
    let (questions, total) = state.question_service.list(&params, created_by).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "items": questions,
        "total": total,
    })))
}

#[get("/questions/{id}")]
pub async fn get_question(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let question = state.question_service.get(&id).await?;
    require_owner_or_admin(&auth.0, &question.created_by)?;
    Ok(HttpResponse::Ok().json(question))
}

#[put("/questions/{id}")]
pub async fn update_question(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<UpdateQuestionRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let question = state
        .question_service
        .update(&auth.0, &id, request)
        .await?;
    Ok(HttpResponse::Ok().json(question))
}

#[delete("/questions/{id}")]
pub async fn delete_question(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    state.question_service.delete(&auth.0, &id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Question deleted successfully")))
}

#[post("/questions/{id}/share")]
pub async fn share_question(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<ShareQuestionRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let share = state.question_service.share(&auth.0, &id, request).await?;
    Ok(HttpResponse::Ok().json(share))
}

/// Signed-link access; the only unauthenticated read in the question bank.
#[get("/api/questions/shared/{token}")]
pub async fn get_shared_question(
    state: web::Data<AppState>,
    token: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let question = state.question_service.get_shared(&token).await?;
    Ok(HttpResponse::Ok().json(question))
}

#[post("/admin/questions")]
pub async fn admin_create_question(
    state: web::Data<AppState>,
    request: web::Json<CreateQuestionRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let request = request.into_inner();
    request.validate()?;

    let question = state.question_service.create(&auth.0.sub, request).await?;
    Ok(HttpResponse::Created().json(question))
}

#[get("/admin/questions")]
pub async fn admin_list_questions(
    state: web::Data<AppState>,
    params: web::Query<QuestionListParams>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let params = params.into_inner();
    params.validate()?;

    let (questions, total) = state.question_service.list(&params, None).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "items": questions,
        "total": total,
    })))
}

#[delete("/admin/questions/{id}")]
pub async fn admin_delete_question(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    state.question_service.delete(&auth.0, &id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Question deleted successfully")))
}
