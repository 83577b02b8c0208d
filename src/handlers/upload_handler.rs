use actix_web::{post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{require_admin, AuthenticatedUser},
    errors::AppError,
};

/// Bulk question import. The body is the raw CSV payload; a malformed row
/// is reported per row number, the rest of the file still imports.
#[post("/admin/upload/csv")]
pub async fn upload_csv(
    state: web::Data<AppState>,
    body: web::Bytes,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let report = state
        .question_service
        .import_csv(&auth.0.sub, &body)
        .await?;
    Ok(HttpResponse::Ok().json(report))
}

/// Same parse as the import, nothing written.
#[post("/admin/upload/preview-csv")]
pub async fn preview_csv(
    state: web::Data<AppState>,
    body: web::Bytes,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let report = state.question_service.preview_csv(&body).await?;
    Ok(HttpResponse::Ok().json(report))
}
