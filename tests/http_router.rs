//! Endpoint fallback over real HTTP, using wiremock servers.
//!
//! Dead endpoints point at closed local ports so connection refusal is
//! immediate.

use chatlink::infrastructure::ReqwestTransport;
use chatlink::types::OFFLINE_TOKEN;
use chatlink::{
    ChatApi, DiagnosticProbe, EndpointTable, LoginRequest, NetError, Platform, PlatformProfile,
    RequestOptions, RequestOutcome, RequestRouter, TimeoutFetch,
};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DEAD: &str = "http://127.0.0.1:1";
const ALSO_DEAD: &str = "http://127.0.0.1:9";

fn router_for(urls: &[&str], platform: Platform) -> RequestRouter {
    let table = EndpointTable::new(urls.iter().copied()).expect("valid endpoint table");
    let fetch = TimeoutFetch::new(
        Arc::new(ReqwestTransport::new()),
        PlatformProfile::new(platform, false),
    );
    RequestRouter::new(fetch, Arc::new(table))
}

#[tokio::test]
async fn falls_back_past_dead_endpoint_and_caches_it() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/agents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "a1" }])))
        .expect(2)
        .mount(&server)
        .await;

    let uri = server.uri();
    let router = router_for(&[DEAD, uri.as_str()], Platform::Web);

    let first = router.request("/api/agents", RequestOptions::get()).await.unwrap();
    assert!(first.is_success());
    assert_eq!(first.attempts, 2);
    assert_eq!(first.data.unwrap()[0]["id"], "a1");
    assert_eq!(router.working_url().await.unwrap().to_string(), uri);

    let second = router.request("/api/agents", RequestOptions::get()).await.unwrap();
    assert_eq!(second.attempts, 1);
}

#[tokio::test]
async fn http_error_stops_the_search() {
    let failing = MockServer::start().await;
    let healthy = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/agents/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "detail": "Agent not found" })),
        )
        .expect(1)
        .mount(&failing)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&healthy)
        .await;

    let router = router_for(
        &[failing.uri().as_str(), healthy.uri().as_str()],
        Platform::Web,
    );
    let api = ChatApi::new(router.clone());
    let response = api.get_agent("missing").await.unwrap();

    assert_eq!(response.status, 404);
    assert_eq!(response.error.as_deref(), Some("Agent not found"));
    assert!(router.working_url().await.is_none());
    assert!(matches!(
        response.into_result(),
        Err(NetError::Http { status: 404, .. })
    ));
}

#[tokio::test]
async fn login_goes_offline_when_nothing_answers() {
    let api = ChatApi::new(router_for(&[DEAD, ALSO_DEAD], Platform::Android));
    let response = api
        .login(&LoginRequest {
            username: "ada".to_string(),
            password: "pw".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert!(response.offline);
    let data = response.data.unwrap();
    assert_eq!(data["access_token"], OFFLINE_TOKEN);
    assert_eq!(data["user"]["username"], "ada");
}

#[tokio::test]
async fn other_paths_report_exhaustion() {
    let api = ChatApi::new(router_for(&[DEAD, ALSO_DEAD], Platform::Ios));
    let response = api.list_agents().await.unwrap();

    assert_eq!(response.status, 0);
    assert!(!response.offline);
    assert!(matches!(
        response.into_result(),
        Err(NetError::Exhausted { attempts: 2, .. })
    ));
}

#[tokio::test]
async fn requests_carry_json_platform_and_auth_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat/messages"))
        .and(header("content-type", "application/json"))
        .and(header("cache-control", "no-cache"))
        .and(header("authorization", "Bearer secret-token"))
        .and(body_json(json!({ "agent_id": "a1", "content": "hello" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "m1" })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let api = ChatApi::new(router_for(&[uri.as_str()], Platform::Android))
        .with_token("secret-token");
    let response = api
        .send_message(&chatlink::http::SendMessageRequest {
            agent_id: "a1".to_string(),
            content: "hello".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(response.status, 201);
    assert_eq!(response.data.unwrap()["id"], "m1");
}

#[tokio::test]
async fn message_history_filters_by_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/chat/messages"))
        .and(query_param("agent_id", "agent 7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let api = ChatApi::new(router_for(&[server.uri().as_str()], Platform::Desktop));
    let response = api.list_messages(Some("agent 7")).await.unwrap();
    assert_eq!(response.data, Some(json!([])));
}

#[tokio::test]
async fn unparseable_body_becomes_empty_object() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&server)
        .await;

    let router = router_for(&[server.uri().as_str()], Platform::Web);
    let table = EndpointTable::new([server.uri()]).unwrap();
    let outcome = router
        .fetch()
        .execute(
            table.primary(),
            "/health",
            &RequestOptions::get(),
            router.fetch().default_timeout(),
        )
        .await
        .unwrap();

    assert_eq!(
        outcome,
        RequestOutcome::Success {
            status: 200,
            body: json!({})
        }
    );
}

#[tokio::test]
async fn diagnostics_probe_every_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let router = router_for(&[DEAD, uri.as_str(), ALSO_DEAD], Platform::Android);
    let report = DiagnosticProbe::from_router(&router).diagnose().await;

    assert!(report.is_connected);
    assert_eq!(report.working_url.as_deref(), Some(uri.as_str()));
    assert_eq!(report.results.len(), 3);
    assert_eq!(report.errors.len(), 2);
    assert!(report.recommendations.is_empty());
    assert!(router.working_url().await.is_none());
}

#[tokio::test]
async fn diagnostics_recommend_fixes_when_unreachable() {
    let router = router_for(&[DEAD, ALSO_DEAD], Platform::Android);
    let report = DiagnosticProbe::from_router(&router).diagnose().await;

    assert!(!report.is_connected);
    assert_eq!(report.errors.len(), 2);
    assert!(!report.recommendations.is_empty());
}
