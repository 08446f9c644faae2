//! HTTP API integration tests
//!
//! The router runs against the in-memory workflow harness; requests carry
//! real signed tokens.

use axum::http::{header, HeaderValue, StatusCode};
use axum_test::{TestRequest, TestServer};
use base64::{engine::general_purpose, Engine as _};
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use core_kernel::{BrokerId, ListingId, ReviewerId};
use domain_listing::{ListingPort, ListingStatus};
use interface_api::auth::{create_token, roles};
use interface_api::config::ApiConfig;
use interface_api::{create_router, AppState};
use test_utils::{
    assert_status, assert_total_acreage, ConsentBuilder, ListingFormBuilder, TemporalFixtures,
    WorkflowHarness, TEST_JWT_SECRET,
};

// ============================================================================
// Harness
// ============================================================================

struct Api {
    server: TestServer,
    harness: WorkflowHarness,
    broker: BrokerId,
}

impl Api {
    fn new() -> Self {
        let harness = WorkflowHarness::new();
        let config = ApiConfig {
            jwt_secret: TEST_JWT_SECRET.to_string(),
            ..ApiConfig::default()
        };
        let state = AppState::new(harness.service.clone(), config)
            .with_health_check(harness.listings.clone())
            .with_health_check(harness.consents.clone());
        let server = TestServer::new(create_router(state)).unwrap();

        Self {
            server,
            harness,
            broker: BrokerId::new(),
        }
    }

    fn broker_token(&self) -> String {
        token_for(&self.broker.to_string(), roles::BROKER)
    }

    fn as_broker(&self, request: TestRequest) -> TestRequest {
        with_token(request, &self.broker_token())
    }

    fn as_admin(&self, request: TestRequest) -> TestRequest {
        with_token(request, &token_for(&ReviewerId::new().to_string(), roles::ADMIN))
    }
}

fn token_for(subject: &str, role: &str) -> String {
    create_token(subject, vec![role.to_string()], TEST_JWT_SECRET, 3600).unwrap()
}

fn with_token(request: TestRequest, token: &str) -> TestRequest {
    request.add_header(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    )
}

fn listing_id(body: &Value) -> ListingId {
    body["id"].as_str().unwrap().parse().unwrap()
}

fn document_json() -> Value {
    json!({
        "file_name": "signed consent.pdf",
        "content_type": "application/pdf",
        "content_base64": general_purpose::STANDARD.encode(b"%PDF-1.7 consent"),
    })
}

// ============================================================================
// Health and authentication
// ============================================================================

mod health_and_auth {
    use super::*;

    #[tokio::test]
    async fn test_health_is_public() {
        let api = Api::new();
        let response = api.server.get("/health").await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["status"], "healthy");
    }

    #[tokio::test]
    async fn test_readiness_reports_each_adapter() {
        let api = Api::new();
        let response = api.server.get("/health/ready").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "ready");
        assert_eq!(body["adapters"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_api_requires_token() {
        let api = Api::new();
        let response = api.server.get("/api/v1/listings").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_token_signed_with_other_secret_is_rejected() {
        let api = Api::new();
        let forged = create_token(&api.broker.to_string(), vec![roles::BROKER.into()], "other", 3600).unwrap();
        let response = with_token(api.server.get("/api/v1/listings"), &forged).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }
}

// ============================================================================
// Submission
// ============================================================================

mod submission {
    use super::*;

    #[tokio::test]
    async fn test_land_listing_with_verified_consent() {
        let api = Api::new();
        let consent_id = api.harness.verified_consent(api.broker).await;

        let response = api
            .as_broker(api.server.post("/api/v1/listings/submit"))
            .json(&json!({
                "form": ListingFormBuilder::land().build(),
                "consent_id": consent_id,
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["status"], "pending_review");
        assert_eq!(body["consent_id"], json!(consent_id));

        let stored = api.harness.listings.get_listing(listing_id(&body), None).await.unwrap();
        assert_status(&stored, ListingStatus::PendingReview);
        assert_total_acreage(&stored, dec!(250));
    }

    #[tokio::test]
    async fn test_condo_without_hoa_names_the_field() {
        let api = Api::new();
        let consent_id = api.harness.verified_consent(api.broker).await;
        let form = ListingFormBuilder::condo().edit(|f| f.hoa_fees.clear()).build();

        let response = api
            .as_broker(api.server.post("/api/v1/listings/submit"))
            .json(&json!({ "form": form, "consent_id": consent_id }))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["error"], "schema_violation");
        assert_eq!(body["field"], "hoa_fees");
        assert_eq!(api.harness.listings.count().await, 0);
    }

    #[tokio::test]
    async fn test_submission_without_consent() {
        let api = Api::new();
        let response = api
            .as_broker(api.server.post("/api/v1/listings/submit"))
            .json(&json!({ "form": ListingFormBuilder::house().build() }))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.json::<Value>()["error"], "missing_consent");
        assert_eq!(api.harness.listings.count().await, 0);
    }

    #[tokio::test]
    async fn test_expired_consent_is_missing_consent() {
        let api = Api::new();
        let expired = ConsentBuilder::new(api.broker)
            .issued_at(TemporalFixtures::days_ago(400))
            .verified()
            .build();
        let consent_id = api.harness.store_consent(expired).await;

        let response = api
            .as_broker(api.server.post("/api/v1/listings/submit"))
            .json(&json!({ "form": ListingFormBuilder::land().build(), "consent_id": consent_id }))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.json::<Value>()["error"], "missing_consent");
    }

    #[tokio::test]
    async fn test_unknown_property_type_is_bad_request() {
        let api = Api::new();
        let consent_id = api.harness.verified_consent(api.broker).await;
        let form = ListingFormBuilder::house().with_property_type("castle").build();

        let response = api
            .as_broker(api.server.post("/api/v1/listings/submit"))
            .json(&json!({ "form": form, "consent_id": consent_id }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_new_client_with_document() {
        let api = Api::new();
        let response = api
            .as_broker(api.server.post("/api/v1/listings/submit"))
            .json(&json!({
                "form": ListingFormBuilder::ranch_two_tracts().build(),
                "new_client": {
                    "client_name": "Rosa Delgado",
                    "email": "rosa@example.com",
                    "document": document_json(),
                },
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert!(body["consent_id"].is_string());
        assert_eq!(api.harness.documents.count().await, 1);

        let stored = api.harness.listings.get_listing(listing_id(&body), None).await.unwrap();
        assert_total_acreage(&stored, dec!(1760.62));
    }

    #[tokio::test]
    async fn test_both_consent_choices_are_rejected() {
        let api = Api::new();
        let consent_id = api.harness.verified_consent(api.broker).await;
        let response = api
            .as_broker(api.server.post("/api/v1/listings/submit"))
            .json(&json!({
                "form": ListingFormBuilder::land().build(),
                "consent_id": consent_id,
                "new_client": { "client_name": "Rosa Delgado", "document": document_json() },
            }))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.json::<Value>()["error"], "invalid_request");
    }

    #[tokio::test]
    async fn test_malformed_document_encoding() {
        let api = Api::new();
        let response = api
            .as_broker(api.server.post("/api/v1/listings/submit"))
            .json(&json!({
                "form": ListingFormBuilder::land().build(),
                "new_client": {
                    "client_name": "Rosa Delgado",
                    "document": { "file_name": "consent.pdf", "content_base64": "not base64!" },
                },
            }))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.json::<Value>()["error"], "invalid_document");
        assert_eq!(api.harness.documents.count().await, 0);
    }

    #[tokio::test]
    async fn test_storage_outage_is_retryable() {
        let api = Api::new();
        let consent_id = api.harness.verified_consent(api.broker).await;
        api.harness.listings.fail_writes(true);

        let response = api
            .as_broker(api.server.post("/api/v1/listings/submit"))
            .json(&json!({ "form": ListingFormBuilder::land().build(), "consent_id": consent_id }))
            .await;

        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.json::<Value>()["error"], "storage_unavailable");
    }

    #[tokio::test]
    async fn test_invalid_json_is_bad_request() {
        let api = Api::new();
        let response = api
            .as_broker(api.server.post("/api/v1/listings/submit"))
            .content_type("application/json")
            .bytes("{\"form\":".into())
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}

// ============================================================================
// Drafts
// ============================================================================

mod drafts {
    use super::*;

    #[tokio::test]
    async fn test_draft_save_then_submit() {
        let api = Api::new();
        let consent_id = api.harness.verified_consent(api.broker).await;

        let created = api
            .as_broker(api.server.post("/api/v1/listings"))
            .json(&json!({ "property_type": "land", "title": "Hill Lot" }))
            .await;
        created.assert_status(StatusCode::CREATED);
        let id = listing_id(&created.json());

        let saved = api
            .as_broker(api.server.put(&format!("/api/v1/listings/{id}")))
            .json(&ListingFormBuilder::land().build())
            .await;
        saved.assert_status_ok();
        assert_eq!(saved.json::<Value>()["status"], "draft");

        let submitted = api
            .as_broker(api.server.post(&format!("/api/v1/listings/{id}/submit")))
            .json(&json!({ "form": ListingFormBuilder::land().build(), "consent_id": consent_id }))
            .await;
        submitted.assert_status_ok();
        assert_eq!(submitted.json::<Value>()["status"], "pending_review");

        let listed = api.as_broker(api.server.get("/api/v1/listings")).await;
        listed.assert_status_ok();
        assert_eq!(listed.json::<Value>().as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_other_broker_cannot_read_listing() {
        let api = Api::new();
        let created = api
            .as_broker(api.server.post("/api/v1/listings"))
            .json(&json!({ "property_type": "house" }))
            .await;
        let id = listing_id(&created.json());

        let intruder = token_for(&BrokerId::new().to_string(), roles::BROKER);
        let response = with_token(api.server.get(&format!("/api/v1/listings/{id}")), &intruder).await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_malformed_listing_id() {
        let api = Api::new();
        let response = api.as_broker(api.server.get("/api/v1/listings/not-an-id")).await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}

// ============================================================================
// Consents
// ============================================================================

mod consents {
    use super::*;

    #[tokio::test]
    async fn test_usable_consents_exclude_unverified() {
        let api = Api::new();
        let usable = api.harness.verified_consent(api.broker).await;
        api.harness
            .store_consent(ConsentBuilder::new(api.broker).with_client_name("Pending Client").build())
            .await;

        let response = api.as_broker(api.server.get("/api/v1/consents/usable")).await;
        response.assert_status_ok();
        let body: Value = response.json();
        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["consent_id"], json!(usable));
        assert_eq!(entries[0]["expires_soon"], false);
    }

    #[tokio::test]
    async fn test_register_then_verify() {
        let api = Api::new();
        let registered = api
            .as_broker(api.server.post("/api/v1/consents"))
            .json(&json!({ "client_name": "Hal Jenkins", "document": document_json() }))
            .await;
        registered.assert_status(StatusCode::CREATED);
        let body: Value = registered.json();
        assert_eq!(body["status"], "not_verified");
        let consent_id = body["consent_id"].as_str().unwrap().to_string();

        let pending = api.as_admin(api.server.get("/api/v1/review/consents")).await;
        pending.assert_status_ok();
        assert_eq!(pending.json::<Value>().as_array().unwrap().len(), 1);

        let verified = api
            .as_admin(api.server.post(&format!("/api/v1/review/consents/{consent_id}/verify")))
            .await;
        verified.assert_status_ok();
        assert_eq!(verified.json::<Value>()["status"], "verified");
    }

    #[tokio::test]
    async fn test_register_without_document() {
        let api = Api::new();
        let response = api
            .as_broker(api.server.post("/api/v1/consents"))
            .json(&json!({ "client_name": "Hal Jenkins" }))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["error"], "missing_field");
        assert_eq!(api.harness.consents.count().await, 0);
    }

    fn document_of_size(bytes: usize) -> Value {
        json!({
            "file_name": "scanned consent.pdf",
            "content_type": "application/pdf",
            "content_base64": general_purpose::STANDARD.encode(vec![0x25u8; bytes]),
        })
    }

    #[tokio::test]
    async fn test_register_with_multi_megabyte_scan() {
        let api = Api::new();
        let response = api
            .as_broker(api.server.post("/api/v1/consents"))
            .json(&json!({ "client_name": "Hal Jenkins", "document": document_of_size(3 * 1024 * 1024) }))
            .await;

        response.assert_status(StatusCode::CREATED);
        assert_eq!(api.harness.documents.count().await, 1);
    }

    #[tokio::test]
    async fn test_register_with_oversized_body_is_rejected() {
        let api = Api::new();
        let response = api
            .as_broker(api.server.post("/api/v1/consents"))
            .json(&json!({ "client_name": "Hal Jenkins", "document": document_of_size(12 * 1024 * 1024) }))
            .await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(response.json::<Value>()["error"], "payload_too_large");
        assert_eq!(api.harness.consents.count().await, 0);
        assert_eq!(api.harness.documents.count().await, 0);
    }
}

// ============================================================================
// Review
// ============================================================================

mod review {
    use super::*;

    async fn pending_listing(api: &Api) -> ListingId {
        let consent_id = api.harness.verified_consent(api.broker).await;
        let response = api
            .as_broker(api.server.post("/api/v1/listings/submit"))
            .json(&json!({ "form": ListingFormBuilder::house().build(), "consent_id": consent_id }))
            .await;
        listing_id(&response.json())
    }

    #[tokio::test]
    async fn test_brokers_cannot_review() {
        let api = Api::new();
        let response = api.as_broker(api.server.get("/api/v1/review/listings")).await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_approve_pending_listing() {
        let api = Api::new();
        let id = pending_listing(&api).await;

        let queue = api.as_admin(api.server.get("/api/v1/review/listings")).await;
        assert_eq!(queue.json::<Value>().as_array().unwrap().len(), 1);

        let response = api
            .as_admin(api.server.post(&format!("/api/v1/review/listings/{id}")))
            .json(&json!({ "decision": "approve" }))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["status"], "approved");
    }

    #[tokio::test]
    async fn test_reject_requires_reason() {
        let api = Api::new();
        let id = pending_listing(&api).await;

        let response = api
            .as_admin(api.server.post(&format!("/api/v1/review/listings/{id}")))
            .json(&json!({ "decision": "reject" }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.json::<Value>()["error"], "missing_reason");
    }

    #[tokio::test]
    async fn test_reviewing_a_draft_conflicts() {
        let api = Api::new();
        let created = api
            .as_broker(api.server.post("/api/v1/listings"))
            .json(&json!({ "property_type": "house" }))
            .await;
        let id = listing_id(&created.json());

        let response = api
            .as_admin(api.server.post(&format!("/api/v1/review/listings/{id}")))
            .json(&json!({ "decision": "approve" }))
            .await;
        response.assert_status(StatusCode::CONFLICT);
    }
}
