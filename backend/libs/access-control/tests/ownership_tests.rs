/// Integration tests for the cross-service ownership verifier
use access_control::{Decision, LookupError, OwnershipLookup, OwnershipVerifier, UpstreamAuthMode};
use async_trait::async_trait;
use error_types::ServiceError;
use record_store::RecordId;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Records the authorization values the verifier forwarded
#[derive(Default)]
struct Recorder(Mutex<Vec<Option<String>>>);

impl Recorder {
    fn push(&self, value: Option<&str>) {
        self.0.lock().unwrap().push(value.map(str::to_string));
    }

    fn seen(&self) -> Vec<Option<String>> {
        self.0.lock().unwrap().clone()
    }
}

struct StubLookup {
    result: Result<String, LookupError>,
    delay: Option<Duration>,
    recorder: Recorder,
}

impl StubLookup {
    fn returning(result: Result<String, LookupError>) -> Self {
        Self {
            result,
            delay: None,
            recorder: Recorder::default(),
        }
    }
}

#[async_trait]
impl OwnershipLookup for StubLookup {
    async fn fetch_creator(
        &self,
        _resource_id: &RecordId,
        authorization: Option<&str>,
    ) -> Result<String, LookupError> {
        self.recorder.push(authorization);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.result.clone()
    }
}

fn verifier(lookup: Arc<StubLookup>, mode: UpstreamAuthMode) -> OwnershipVerifier {
    OwnershipVerifier::new(lookup, mode, Duration::from_millis(200))
}

#[tokio::test]
async fn test_creator_match_allows() {
    let lookup = Arc::new(StubLookup::returning(Ok("acc1".into())));
    let decision = verifier(lookup, UpstreamAuthMode::Anonymous)
        .verify_ownership(&RecordId::new(), "acc1", Some("Bearer t"))
        .await
        .unwrap();
    assert_eq!(decision, Decision::Allow);
}

#[tokio::test]
async fn test_creator_mismatch_denies() {
    let lookup = Arc::new(StubLookup::returning(Ok("acc2".into())));
    let verifier = verifier(lookup, UpstreamAuthMode::Anonymous);

    let decision = verifier
        .verify_ownership(&RecordId::new(), "acc1", None)
        .await
        .unwrap();
    assert_eq!(decision, Decision::Deny);

    let err = verifier
        .require_ownership(&RecordId::new(), "acc1", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));
}

#[tokio::test]
async fn test_every_lookup_failure_is_upstream_unavailable() {
    for failure in [
        LookupError::NotFound("gone".into()),
        LookupError::Unreachable("connection refused".into()),
        LookupError::Malformed("no creator".into()),
        LookupError::Conflict("locked".into()),
    ] {
        let lookup = Arc::new(StubLookup::returning(Err(failure)));
        let err = verifier(lookup, UpstreamAuthMode::Anonymous)
            .verify_ownership(&RecordId::new(), "acc1", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::UpstreamUnavailable(_)));
    }
}

#[tokio::test]
async fn test_slow_upstream_times_out_closed() {
    let lookup = Arc::new(StubLookup {
        result: Ok("acc1".into()),
        delay: Some(Duration::from_secs(2)),
        recorder: Recorder::default(),
    });
    let err = verifier(lookup, UpstreamAuthMode::Anonymous)
        .verify_ownership(&RecordId::new(), "acc1", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::UpstreamUnavailable(_)));
}

#[tokio::test]
async fn test_auth_mode_controls_forwarding() {
    let anonymous = Arc::new(StubLookup::returning(Ok("acc1".into())));
    verifier(Arc::clone(&anonymous), UpstreamAuthMode::Anonymous)
        .verify_ownership(&RecordId::new(), "acc1", Some("Bearer t"))
        .await
        .unwrap();
    assert_eq!(anonymous.recorder.seen(), vec![None]);

    let forwarding = Arc::new(StubLookup::returning(Ok("acc1".into())));
    verifier(Arc::clone(&forwarding), UpstreamAuthMode::ForwardCaller)
        .verify_ownership(&RecordId::new(), "acc1", Some("Bearer t"))
        .await
        .unwrap();
    assert_eq!(forwarding.recorder.seen(), vec![Some("Bearer t".to_string())]);
}

#[test]
fn test_auth_mode_parsing() {
    assert_eq!("anonymous".parse::<UpstreamAuthMode>(), Ok(UpstreamAuthMode::Anonymous));
    assert_eq!("FORWARD_CALLER".parse::<UpstreamAuthMode>(), Ok(UpstreamAuthMode::ForwardCaller));
    assert!("sometimes".parse::<UpstreamAuthMode>().is_err());
}
