use crate::app::AppState;
use crate::models::NewAccount;
use actix_middleware::AuthenticatedPrincipal;
use actix_web::{http::header::AUTHORIZATION, web, HttpRequest, HttpResponse};
use error_types::ServiceError;
use record_store::RecordId;
use serde_json::{json, Map, Value};

const SESSION_COOKIE: &str = "jwt";

/// POST /users/accounts/create
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<NewAccount>,
) -> Result<HttpResponse, ServiceError> {
    let account = state.accounts.create(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(account.public_view()))
}

/// GET /users/accounts/search/{id}
pub async fn search(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let id = RecordId::parse(&path, "id")?;
    let account = state.accounts.get(id).await?;
    Ok(HttpResponse::Ok().json(account.public_view()))
}

/// GET /users/accounts/search/email/{email}
pub async fn search_by_email(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let account = state.accounts.get_by_email(&path).await?;
    Ok(HttpResponse::Ok().json(account.public_view()))
}

/// PUT /users/accounts/update/{id}
pub async fn update(
    state: web::Data<AppState>,
    auth: AuthenticatedPrincipal,
    path: web::Path<String>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, ServiceError> {
    let target = RecordId::parse(&path, "id")?;
    let caller = state.caller(auth.principal).await?;
    let account = state
        .accounts
        .update(&caller, target, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(account.public_view()))
}

/// DELETE /users/accounts/delete/{id}
pub async fn delete(
    state: web::Data<AppState>,
    auth: AuthenticatedPrincipal,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let target = RecordId::parse(&path, "id")?;
    let caller = state.caller(auth.principal).await?;
    state.accounts.delete(&caller, target).await?;
    Ok(HttpResponse::Ok().json(json!({ "deleted": target })))
}

/// PUT /users/accounts/insert/MyQuotes/{user_id}/{quote_id}
pub async fn insert_my_quote(
    state: web::Data<AppState>,
    auth: AuthenticatedPrincipal,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ServiceError> {
    let (user_id, quote_id) = path.into_inner();
    let user_id = RecordId::parse(&user_id, "user_id")?;
    let quote_id = RecordId::parse(&quote_id, "quote_id")?;

    let caller = state.caller(auth.principal).await?;
    let account = state
        .accounts
        .insert_my_quote(&caller, user_id, quote_id, &auth.authorization)
        .await?;
    Ok(HttpResponse::Ok().json(account.public_view()))
}

/// DELETE /users/accounts/delete/MyQuotes/{user_id}/{quote_id}
pub async fn remove_my_quote(
    state: web::Data<AppState>,
    auth: AuthenticatedPrincipal,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ServiceError> {
    let (user_id, quote_id) = path.into_inner();
    let user_id = RecordId::parse(&user_id, "user_id")?;
    let quote_id = RecordId::parse(&quote_id, "quote_id")?;

    let caller = state.caller(auth.principal).await?;
    let account = state
        .accounts
        .remove_my_quote(&caller, user_id, quote_id)
        .await?;
    Ok(HttpResponse::Ok().json(account.public_view()))
}

/// GET /users/accounts/whoami
///
/// Accepts the bearer header or, for browser sessions, the `jwt` cookie.
/// Returns the caller's own record including session fields.
pub async fn whoami(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ServiceError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .map(|h| {
            h.to_str()
                .map_err(|_| ServiceError::unauthorized("Authorization header is not valid ASCII"))
        })
        .transpose()?;

    let principal = match (header, req.cookie(SESSION_COOKIE)) {
        (Some(header), _) => state.resolver.resolve(Some(header))?,
        (None, Some(cookie)) => state.resolver.resolve_session_token(cookie.value())?,
        (None, None) => return Err(ServiceError::unauthorized("No session")),
    };

    let caller = state.caller(principal).await?;
    Ok(HttpResponse::Ok().json(caller.account.private_view()))
}
