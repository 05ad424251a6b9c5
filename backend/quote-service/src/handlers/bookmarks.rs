use crate::app::AppState;
use actix_middleware::AuthenticatedPrincipal;
use actix_web::{web, HttpResponse};
use error_types::ServiceError;
use record_store::RecordId;
use tracing::debug;

/// PUT /quotes/bookmark/increment/{id}
pub async fn increment(
    state: web::Data<AppState>,
    auth: AuthenticatedPrincipal,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let id = RecordId::parse(&path, "id")?;
    debug!(quote_id = %id, by = %auth.principal.subject_id, "Bookmark increment");
    state.bookmarks.increment(id).await?;
    Ok(HttpResponse::Ok().json(state.quotes.get(id).await?))
}

/// DELETE /quotes/bookmark/decrement/{id}
pub async fn decrement(
    state: web::Data<AppState>,
    auth: AuthenticatedPrincipal,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let id = RecordId::parse(&path, "id")?;
    debug!(quote_id = %id, by = %auth.principal.subject_id, "Bookmark decrement");
    state.bookmarks.decrement(id).await?;
    Ok(HttpResponse::Ok().json(state.quotes.get(id).await?))
}
