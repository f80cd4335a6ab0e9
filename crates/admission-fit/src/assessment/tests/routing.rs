use std::collections::BTreeMap;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::Json;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::assessment::router::{assess_handler, assessment_router, AssessmentRequest};

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

fn request_body(include_narrative: bool) -> Value {
    json!({
        "student_name": "Asha Menon",
        "ratings": bcom_ratings(2),
        "answers": [{ "question": "Career?", "answer": "Banking" }],
        "include_narrative": include_narrative,
    })
}

#[tokio::test]
async fn assess_route_returns_the_report() {
    let (service, _) = build_service(StubNarrator::replying("is thoughtful."));
    let router = assessment_router(service);

    let response = router
        .oneshot(post_json("/api/v1/assessments", &request_body(true)))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["result"]["percentage"], json!(60.0));
    assert_eq!(payload["result"]["classification"], json!("moderate_fit"));
    assert_eq!(payload["result"]["suggestion"]["program"], json!("B.Com (General)"));
    assert_eq!(payload["narrative"]["status"], json!("generated"));
    assert_eq!(payload["chart"].as_array().map(Vec::len), Some(6));
}

#[tokio::test]
async fn assess_handler_rejects_invalid_ratings() {
    let (service, narrator) = build_service(StubNarrator::replying("unused"));
    let mut ratings = bcom_ratings(6);
    ratings.insert("Tech Comfort".to_string(), json!("ten"));

    let response = assess_handler(
        State(service),
        Json(AssessmentRequest {
            submission: submission(ratings),
            include_narrative: true,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    let message = payload["error"].as_str().expect("error message");
    assert!(message.contains("Tech Comfort"));
    assert_eq!(narrator.calls(), 0);
}

#[tokio::test]
async fn empty_ratings_are_unprocessable() {
    let (service, _) = build_service(StubNarrator::replying("unused"));
    let router = assessment_router(service);
    let body = json!({ "student_name": "Asha", "ratings": BTreeMap::<String, Value>::new() });

    let response = router
        .oneshot(post_json("/api/v1/assessments", &body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], json!("no responses provided"));
}

#[tokio::test]
async fn report_route_serves_a_text_attachment() {
    let (service, _) = build_service(StubNarrator::failing(503, "upstream down"));
    let router = assessment_router(service);

    let response = router
        .oneshot(post_json("/api/v1/assessments/report", &request_body(true)))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .expect("disposition header")
        .to_string();
    assert_eq!(
        disposition,
        "attachment; filename=\"Asha_Menon_Evaluation_Report.txt\""
    );
    let text = read_body(response).await;
    assert!(text.starts_with("Student Evaluation Report: Asha Menon"));
    assert!(text.contains("Fit score: 60.00% (moderate fit)"));
    assert!(text.contains(
        "Verdict: moderate fit for B.Com (CA); review weaker areas before admission"
    ));
    assert!(text.contains("Narrative evaluation unavailable"));
}

#[tokio::test]
async fn chart_route_serves_csv_without_calling_the_narrator() {
    let (service, narrator) = build_service(StubNarrator::replying("unused"));
    let router = assessment_router(service);

    let response = router
        .oneshot(post_json("/api/v1/assessments/chart", &request_body(true)))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/csv"));
    let csv = read_body(response).await;
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("trait,rating,max,percent"));
    assert!(csv.contains("Tech Comfort,2,10,20.00"));
    assert_eq!(narrator.calls(), 0);
}

#[tokio::test]
async fn profile_route_exposes_the_active_profile() {
    let (service, _) = build_service(StubNarrator::replying("unused"));
    let router = assessment_router(service);

    let response = router
        .oneshot(
            Request::get("/api/v1/profile")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["program"], json!("B.Com (CA)"));
    assert_eq!(payload["thresholds"]["strong"], json!(70.0));
}
