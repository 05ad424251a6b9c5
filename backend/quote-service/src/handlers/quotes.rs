use crate::app::AppState;
use crate::models::NewQuote;
use actix_middleware::AuthenticatedPrincipal;
use actix_web::{web, HttpResponse};
use error_types::ServiceError;
use record_store::RecordId;
use serde_json::json;

/// POST /quotes/create
pub async fn create(
    state: web::Data<AppState>,
    auth: AuthenticatedPrincipal,
    body: web::Json<NewQuote>,
) -> Result<HttpResponse, ServiceError> {
    let creator = auth.principal.account_id()?;
    let quote = state
        .quotes
        .create(creator, body.into_inner(), &auth.authorization)
        .await?;
    Ok(HttpResponse::Ok().json(quote))
}

/// GET /quotes/search/id/{id}
pub async fn search(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let id = RecordId::parse(&path, "id")?;
    Ok(HttpResponse::Ok().json(state.quotes.get(id).await?))
}

/// DELETE /quotes/delete/{id}
pub async fn delete(
    state: web::Data<AppState>,
    auth: AuthenticatedPrincipal,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let id = RecordId::parse(&path, "id")?;
    let caller = auth.principal.account_id()?;
    state.quotes.delete(caller, id, &auth.authorization).await?;
    Ok(HttpResponse::Ok().json(json!({ "deleted": id })))
}
