use actix_web::{post, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::request::{AskRequest, CategorizeRequest, ExplainRequest, GenerateRequest},
    models::dto::response::{AskResponse, ExplainResponse},
};

#[post("/ai/explain")]
pub async fn explain_question(
    state: web::Data<AppState>,
    request: web::Json<ExplainRequest>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let question = state.question_service.get(&request.question_id).await?;
    let explanation = state.advisory.explain(&question).await?;

    Ok(HttpResponse::Ok().json(ExplainResponse {
        question_id: question.id,
        explanation,
    }))
}

#[post("/ai/categorize")]
pub async fn categorize_question(
    state: web::Data<AppState>,
    request: web::Json<CategorizeRequest>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let suggestion = state.advisory.categorize(&request.question_text).await?;
    Ok(HttpResponse::Ok().json(suggestion))
}

#[post("/ai/ask")]
pub async fn ask_tutor(
    state: web::Data<AppState>,
    request: web::Json<AskRequest>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let answer = state
        .advisory
        .ask(&request.prompt, request.context.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(AskResponse { answer }))
}

#[post("/ai/generate")]
pub async fn generate_questions(
    state: web::Data<AppState>,
    request: web::Json<GenerateRequest>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let drafts = state
        .advisory
        .generate(
            &request.subject,
            &request.topic,
            request.question_type,
            request.count,
        )
        .await?;
    Ok(HttpResponse::Ok().json(drafts))
}
