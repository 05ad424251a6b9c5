use access_control::PrincipalResolver;
use actix_middleware::{AuthenticatedPrincipal, CorrelationIdMiddleware, JwtAuthMiddleware};
use actix_web::{test, web, App, HttpResponse};
use chrono::Duration;
use crypto_core::test_keys::{TEST_PRIVATE_KEY, TEST_PUBLIC_KEY};
use crypto_core::{TokenIssuer, TokenVerifier};
use std::sync::Arc;

/// Echoes the resolved subject
async fn whoami(auth: AuthenticatedPrincipal) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "subject": auth.principal.subject_id,
        "group": auth.principal.group,
        "forwarded": auth.authorization,
    }))
}

async fn public() -> HttpResponse {
    HttpResponse::Ok().body("public")
}

fn resolver() -> Arc<PrincipalResolver> {
    Arc::new(PrincipalResolver::new(
        TokenVerifier::from_rsa_pem(TEST_PUBLIC_KEY).unwrap(),
    ))
}

fn token(subject: &str) -> String {
    TokenIssuer::from_rsa_pem(TEST_PRIVATE_KEY)
        .unwrap()
        .issue(subject, "user", Duration::minutes(5))
        .unwrap()
}

macro_rules! app {
    () => {
        test::init_service(
            App::new()
                .wrap(JwtAuthMiddleware::new(resolver()))
                .wrap(CorrelationIdMiddleware)
                .route("/me", web::get().to(whoami))
                .route("/public", web::get().to(public)),
        )
        .await
    };
}

#[actix_web::test]
async fn test_valid_token_reaches_handler() {
    let app = app!();
    let header = format!("Bearer {}", token("acc1"));
    let req = test::TestRequest::get()
        .uri("/me")
        .insert_header(("Authorization", header.clone()))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["subject"], "acc1");
    assert_eq!(body["group"], "user");
    assert_eq!(body["forwarded"], header);
}

#[actix_web::test]
async fn test_missing_header_is_401_with_kind() {
    let app = app!();
    let req = test::TestRequest::get().uri("/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[actix_web::test]
async fn test_bad_token_is_401() {
    let app = app!();
    for header in ["Bearer garbage", "Token abc", "Bearer"] {
        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header(("Authorization", header))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401, "{header}");
    }
}

#[actix_web::test]
async fn test_public_route_ignores_bad_token() {
    let app = app!();
    let req = test::TestRequest::get()
        .uri("/public")
        .insert_header(("Authorization", "Bearer garbage"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn test_correlation_id_echoed_or_generated() {
    let app = app!();

    let req = test::TestRequest::get()
        .uri("/public")
        .insert_header(("x-correlation-id", "req-123"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.headers().get("x-correlation-id").unwrap(), "req-123");

    let req = test::TestRequest::get().uri("/public").to_request();
    let resp = test::call_service(&app, req).await;
    let generated = resp.headers().get("x-correlation-id").unwrap().to_str().unwrap();
    assert_eq!(generated.len(), 36);
}
