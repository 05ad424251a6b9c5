use crate::app::AppState;
use actix_middleware::AuthenticatedPrincipal;
use actix_web::{web, HttpResponse};
use error_types::ServiceError;
use record_store::RecordId;

/// POST /users/useQuote/use/{quote_id}
pub async fn use_quote(
    state: web::Data<AppState>,
    auth: AuthenticatedPrincipal,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let quote_id = RecordId::parse(&path, "quote_id")?;
    let caller = state.caller(auth.principal).await?;
    let record = state.usage.record_use(caller.account_id, quote_id).await?;
    Ok(HttpResponse::Ok().json(record))
}
