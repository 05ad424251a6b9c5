use crate::app::AppState;
use actix_middleware::AuthenticatedPrincipal;
use actix_web::{web, HttpResponse};
use error_types::ServiceError;
use record_store::RecordId;
use serde_json::json;

/// PUT /users/bookmarks/{quote_id}
pub async fn add_bookmark(
    state: web::Data<AppState>,
    auth: AuthenticatedPrincipal,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let quote_id = RecordId::parse(&path, "quote_id")?;
    let caller = state.caller(auth.principal).await?;
    let bookmarked = state
        .bookmarks
        .add(&caller, quote_id, &auth.authorization)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "bookmarkedQuotes": bookmarked })))
}

/// DELETE /users/bookmarks/{quote_id}
pub async fn remove_bookmark(
    state: web::Data<AppState>,
    auth: AuthenticatedPrincipal,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let quote_id = RecordId::parse(&path, "quote_id")?;
    let caller = state.caller(auth.principal).await?;
    let bookmarked = state
        .bookmarks
        .remove(&caller, quote_id, &auth.authorization)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "bookmarkedQuotes": bookmarked })))
}
