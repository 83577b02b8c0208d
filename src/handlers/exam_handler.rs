use actix_web::{get, post, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::request::AnswerUpload,
    models::dto::response::MessageResponse,
};

#[post("/exam/start/{config_id}")]
pub async fn start_exam(
    state: web::Data<AppState>,
    config_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let session = state.exam_service.start(&auth.0.sub, &config_id).await?;
    Ok(HttpResponse::Ok().json(session))
}

#[get("/exam/session/{session_id}")]
pub async fn get_exam_session(
    state: web::Data<AppState>,
    session_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let session = state
        .exam_service
        .get_session(&auth.0.sub, &session_id)
        .await?;
    Ok(HttpResponse::Ok().json(session))
}

#[get("/exam/question/{session_id}/{index}")]
pub async fn get_exam_question(
    state: web::Data<AppState>,
    path: web::Path<(String, usize)>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let (session_id, index) = path.into_inner();
    let response = state
        .exam_service
        .get_question(&auth.0.sub, &session_id, index)
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/exam/answer/{session_id}")]
pub async fn submit_answer(
    state: web::Data<AppState>,
    session_id: web::Path<String>,
    upload: web::Json<AnswerUpload>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let upload = upload.into_inner();
    upload.validate()?;

    state
        .exam_service
        .record_answer(&auth.0.sub, &session_id, upload)
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Answer saved successfully")))
}

#[post("/exam/submit/{session_id}")]
pub async fn submit_exam(
    state: web::Data<AppState>,
    session_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let result = state.exam_service.submit(&auth.0.sub, &session_id).await?;
    Ok(HttpResponse::Ok().json(result))
}

#[get("/results/{session_id}")]
pub async fn get_exam_result(
    state: web::Data<AppState>,
    session_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let result = state
        .exam_service
        .get_result(&auth.0.sub, &session_id)
        .await?;
    Ok(HttpResponse::Ok().json(result))
}
