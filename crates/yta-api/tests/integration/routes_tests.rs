//! Route-level behavior through the full middleware stack.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use yta_api::ApiConfig;

use super::support::*;

// =============================================================================
// Service routes
// =============================================================================

#[tokio::test]
async fn test_root_and_health() {
    let app = TestApp::new();

    let (status, body) = app.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "YouTube Analyzer API");

    let response = app
        .router
        .clone()
        .oneshot(
            Request::get("/health")
                .header("x-request-id", "req-health-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-request-id"], "req-health-1");

    let (status, body) = app.get("/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["store"]["backend"], "memory");
}

#[tokio::test]
async fn test_perspectives() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/perspectives").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 4);
    assert_eq!(body["data"][0]["id"], "auto_trading");
}

// =============================================================================
// Analysis flow
// =============================================================================

#[tokio::test]
async fn test_full_analysis_flow() {
    let app = TestApp::new();

    let (status, body) = app.post("/api/analyze", json!({ "url": VIDEO_URL })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["cached"], false);
    assert_eq!(body["data"]["video_id"], VIDEO_ID);
    assert_eq!(body["data"]["summary"], "버핏의 역발상 투자");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = app.post("/api/analyze", json!({ "url": VIDEO_URL })).await;
    assert_eq!(body["cached"], true);
    assert_eq!(body["data"]["id"], id.as_str());

    let (status, body) = app.get(&format!("/api/result/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["video_title"], "버핏의 투자 원칙");

    let (status, body) = app
        .post("/api/analyze/critical", json!({ "analysis_id": id }))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["perspective"], "auto_trading");
    assert_eq!(
        body["data"]["critical_analysis"]["perspective_name"],
        "자동매매 관점"
    );

    let (status, body) = app
        .post("/api/analyze/additional", json!({ "analysis_id": id }))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(
        body["data"]["additional_analysis"]["title_suggestions"][0]["pattern"],
        "권위 뒤집기"
    );

    let (status, body) = app.get("/api/history").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["id"], id.as_str());

    let (status, _) = app.delete(&format!("/api/history/{}", id)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get(&format!("/api/result/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn test_additional_before_critical_conflicts() {
    let app = TestApp::new();
    let id = app.analyze().await;

    let (status, body) = app
        .post("/api/analyze/additional", json!({ "analysis_id": id }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "precondition");
}

#[tokio::test]
async fn test_unsuitable_video_is_unprocessable() {
    let app = TestApp::new();
    app.model.respond("video_analysis", UNSUITABLE_STAGE_ONE);
    let id = app.analyze().await;

    let (status, body) = app
        .post(
            "/api/analyze/critical",
            json!({ "analysis_id": id, "perspective": "psychology" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "unsuitable");
    assert!(body["error"].as_str().unwrap().contains("광고 영상"));
}

#[tokio::test]
async fn test_model_failure_is_bad_gateway() {
    let app = TestApp::new();
    app.model.forget("video_analysis");

    let (status, body) = app.post("/api/analyze", json!({ "url": VIDEO_URL })).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "upstream");
}

#[tokio::test]
async fn test_analyze_only_and_transcript() {
    let app = TestApp::new();

    let (status, body) = app.post("/api/analyze-only", json!({ "url": VIDEO_URL })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["video_id"], VIDEO_ID);
    assert_eq!(body["data"]["transcript_length"], TRANSCRIPT.chars().count());
    assert_eq!(
        body["data"]["analysis"]["video_analysis"]["key_message"],
        "공포에 사라"
    );

    let (status, body) = app.get(&format!("/api/transcript/{}", VIDEO_ID)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["transcript"], TRANSCRIPT);
    assert_eq!(body["data"]["length"], TRANSCRIPT.chars().count());

    let (_, body) = app.get("/api/history").await;
    assert_eq!(body["total"], 0);
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_input_validation() {
    let app = TestApp::new();

    let (status, body) = app
        .post("/api/analyze", json!({ "url": "https://vimeo.com/123456" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation");

    let (status, body) = app
        .post("/api/analyze", json!({ "url": "https://www.youtube.com/feed/trending" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_url");

    let (status, _) = app.get("/api/result/not.an.id").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.get("/api/result/00000000-0000-0000-0000-000000000000").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    let (status, _) = app.get("/api/transcript/short").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for query in ["limit=0", "limit=101"] {
        let (status, _) = app.get(&format!("/api/history?{}", query)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", query);
    }
    let (status, _) = app.get("/api/history?limit=100&offset=5").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_input_keeps_error_envelope() {
    let app = TestApp::new();

    for query in ["limit=abc", "offset=-1"] {
        let (status, body) = app.get(&format!("/api/history?{}", query)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", query);
        assert_eq!(body["success"], false, "{}", query);
        assert_eq!(body["code"], "validation", "{}", query);
        assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
    }

    let (status, body) = app.post("/api/analyze", json!({ "link": VIDEO_URL })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "validation");

    let (status, body) = app
        .send(
            Request::post("/api/analyze/critical")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation");
}

// =============================================================================
// Cache and rate limiting
// =============================================================================

#[tokio::test]
async fn test_cache_stats_and_clear() {
    let app = TestApp::new();
    app.analyze().await;

    let (_, body) = app.get("/api/cache/stats").await;
    assert_eq!(body["data"]["total_entries"], 1);
    assert_eq!(body["data"]["video_ids"][0], VIDEO_ID);

    let (status, _) = app.delete("/api/cache?video_id=bad").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.delete(&format!("/api/cache?video_id={}", VIDEO_ID)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, body) = app.get("/api/cache/stats").await;
    assert_eq!(body["data"]["total_entries"], 0);
}

#[tokio::test]
async fn test_analyze_routes_rate_limited_per_ip() {
    let app = TestApp::with_config(ApiConfig {
        analyze_rate_limit_rps: 1,
        ..ApiConfig::default()
    });
    let body = json!({ "url": VIDEO_URL });

    let (status, _) = app
        .send(json_request("/api/analyze", body.clone(), Some("203.0.113.9")))
        .await;
    assert_eq!(status, StatusCode::OK);

    let response = app
        .router
        .clone()
        .oneshot(json_request("/api/analyze", body.clone(), Some("203.0.113.9")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()["retry-after"], "1");

    let (status, _) = app
        .send(json_request("/api/analyze", body, Some("203.0.113.10")))
        .await;
    assert_eq!(status, StatusCode::OK);

    // Read routes use the general limiter
    let (status, _) = app
        .send(
            Request::get("/api/perspectives")
                .header("x-forwarded-for", "203.0.113.9")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}
