use access_control::LookupError;
use quote_service::clients::{AccountClient, AccountReferences};
use record_store::RecordId;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_insert_reference_forwards_header() {
    let server = MockServer::start().await;
    let account = RecordId::new().to_string();
    let quote = RecordId::new();
    let busy = RecordId::new();
    Mock::given(method("PUT"))
        .and(path(format!("/users/accounts/insert/MyQuotes/{account}/{quote}")))
        .and(header("Authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("/users/accounts/delete/MyQuotes/{account}/{busy}")))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let client = AccountClient::new(&server.uri(), Duration::from_secs(2)).unwrap();
    client
        .insert_reference(&account, &quote, "Bearer abc")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_remove_reference_error_mapping() {
    let server = MockServer::start().await;
    let account = RecordId::new().to_string();
    let gone = RecordId::new();
    let failing = RecordId::new();
    let busy = RecordId::new();
    Mock::given(method("DELETE"))
        .and(path(format!("/users/accounts/delete/MyQuotes/{account}/{gone}")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("/users/accounts/delete/MyQuotes/{account}/{failing}")))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("/users/accounts/delete/MyQuotes/{account}/{busy}")))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let client = AccountClient::new(&format!("{}/", server.uri()), Duration::from_secs(2)).unwrap();
    assert!(matches!(
        client.remove_reference(&account, &gone, "Bearer abc").await,
        Err(LookupError::NotFound(_))
    ));
    assert!(matches!(
        client.remove_reference(&account, &failing, "Bearer abc").await,
        Err(LookupError::Unreachable(_))
    ));
    assert!(matches!(
        client.remove_reference(&account, &busy, "Bearer abc").await,
        Err(LookupError::Conflict(_))
    ));
}
