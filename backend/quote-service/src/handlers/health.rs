use crate::app::AppState;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "store": state.store_kind,
    }))
}
