use std::sync::Arc;

use serde_json::json;
use sourcer_engine::{
    ApiError, ApiSettings, CandidateStatus, CreateOutcome, ProfileUrl, StaticTokenProvider,
    SubmitOutcome, TalentApi,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api(server: &MockServer, token: Option<&str>) -> TalentApi {
    let settings = ApiSettings {
        base_url: server.uri(),
        ..ApiSettings::default()
    };
    TalentApi::new(
        settings,
        Arc::new(StaticTokenProvider::new(token.map(str::to_string))),
    )
}

fn profile(handle: &str) -> ProfileUrl {
    ProfileUrl::from_handle(handle).expect("valid handle")
}

#[tokio::test]
async fn bulk_submit_posts_canonical_urls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/jobs/job-1/candidates/bulk"))
        .and(header("authorization", "Bearer token-1"))
        .and(body_json(json!({
            "profile_urls": [
                "https://www.linkedin.com/in/alice",
                "https://www.linkedin.com/in/bob",
            ],
            "search_mode": true,
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = api(&server, Some("token-1"))
        .submit_candidates_bulk("job-1", &[profile("alice"), profile("bob")], true)
        .await
        .expect("submit");

    assert_eq!(outcome, SubmitOutcome::Accepted);
}

#[tokio::test]
async fn missing_token_short_circuits_without_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = api(&server, None);

    let submit = client
        .submit_candidates_bulk("job-1", &[profile("alice")], false)
        .await
        .expect("submit");
    assert_eq!(submit, SubmitOutcome::Unauthenticated);

    let create = client
        .create_candidate("job-1", &profile("alice"), false)
        .await
        .expect("create");
    assert_eq!(create, CreateOutcome::Unauthenticated);

    let lookup = client.get_candidate("job-1", "cand-9").await;
    assert_eq!(lookup, Err(ApiError::Unauthenticated));

    let jobs = client.list_jobs().await;
    assert_eq!(jobs, Err(ApiError::Unauthenticated));
}

#[tokio::test]
async fn expired_session_maps_to_unauthenticated_outcome() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/jobs/job-1/candidates/bulk"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let outcome = api(&server, Some("stale"))
        .submit_candidates_bulk("job-1", &[profile("alice")], false)
        .await
        .expect("submit");

    assert_eq!(outcome, SubmitOutcome::Unauthenticated);
}

#[tokio::test]
async fn exhausted_credits_surface_the_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/jobs/job-1/candidates/bulk"))
        .respond_with(
            ResponseTemplate::new(402)
                .set_body_json(json!({ "message": "Monthly candidate credits exhausted" })),
        )
        .mount(&server)
        .await;

    let err = api(&server, Some("token-1"))
        .submit_candidates_bulk("job-1", &[profile("alice")], false)
        .await
        .expect_err("payment required");

    assert_eq!(
        err,
        ApiError::CreditsExhausted("Monthly candidate credits exhausted".to_string())
    );
}

#[tokio::test]
async fn exhausted_credits_without_a_body_get_a_stock_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(402))
        .mount(&server)
        .await;

    let err = api(&server, Some("token-1"))
        .create_candidate("job-1", &profile("alice"), false)
        .await
        .expect_err("payment required");

    match err {
        ApiError::CreditsExhausted(message) => assert!(message.contains("credits")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn server_errors_map_to_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = api(&server, Some("token-1"))
        .submit_candidates_bulk("job-1", &[profile("alice")], false)
        .await
        .expect_err("server error");

    assert_eq!(
        err,
        ApiError::Status {
            status: 500,
            message: "boom".to_string(),
        }
    );
}

#[tokio::test]
async fn create_candidate_returns_the_new_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/jobs/job-1/candidates"))
        .and(body_json(json!({
            "profile_url": "https://www.linkedin.com/in/alice",
            "search_mode": false,
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "cand-9" })))
        .mount(&server)
        .await;

    let outcome = api(&server, Some("token-1"))
        .create_candidate("job-1", &profile("alice"), false)
        .await
        .expect("create");

    assert_eq!(
        outcome,
        CreateOutcome::Created {
            candidate_id: "cand-9".to_string(),
        }
    );
}

#[tokio::test]
async fn get_candidate_distinguishes_missing_from_present() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/job-1/candidates/cand-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cand-1",
            "status": "processing",
            "profile_url": "https://www.linkedin.com/in/alice",
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jobs/job-1/candidates/cand-2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = api(&server, Some("token-1"));

    let present = client
        .get_candidate("job-1", "cand-1")
        .await
        .expect("lookup")
        .expect("record");
    assert_eq!(present.status, CandidateStatus::Processing);
    assert_eq!(
        present.profile_url.as_deref(),
        Some("https://www.linkedin.com/in/alice")
    );

    let missing = client.get_candidate("job-1", "cand-2").await.expect("lookup");
    assert!(missing.is_none());
}

#[tokio::test]
async fn candidate_listing_deserializes_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/job-1/candidates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "cand-1", "status": "complete", "name": "Alice Adams" },
            { "id": "cand-2", "status": "not_found" },
        ])))
        .mount(&server)
        .await;

    let candidates = api(&server, Some("token-1"))
        .get_candidates("job-1")
        .await
        .expect("candidates");

    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].status, CandidateStatus::Complete);
    assert_eq!(candidates[0].name.as_deref(), Some("Alice Adams"));
    assert_eq!(candidates[1].status, CandidateStatus::NotFound);
}

#[tokio::test]
async fn job_listing_deserializes_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "job-1",
                "job_title": "Staff Engineer",
                "company_name": "Acme",
                "key_traits": ["rust", "distributed systems"],
            },
            { "id": "job-2", "job_title": "Designer", "company_name": "Initech" },
        ])))
        .mount(&server)
        .await;

    let jobs = api(&server, Some("token-1")).list_jobs().await.expect("jobs");

    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].id, "job-1");
    assert_eq!(
        jobs[0].key_traits,
        Some(vec!["rust".to_string(), "distributed systems".to_string()])
    );
    assert_eq!(jobs[1].job_description, None);
}

#[tokio::test]
async fn delete_candidate_hits_its_resource() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/jobs/job-1/candidates/cand-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    api(&server, Some("token-1"))
        .delete_candidate("job-1", "cand-1")
        .await
        .expect("delete");
}

#[tokio::test]
async fn read_calls_map_expired_sessions_to_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = api(&server, Some("stale"))
        .list_jobs()
        .await
        .expect_err("session gone");
    assert_eq!(err, ApiError::Unauthenticated);
}
