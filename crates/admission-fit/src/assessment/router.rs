use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::StudentSubmission;
use super::narrative::NarrativeGenerator;
use super::report::AssessmentReport;
use super::service::{AssessmentService, AssessmentServiceError};

/// Submission body accepted by every assessment endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentRequest {
    #[serde(flatten)]
    pub submission: StudentSubmission,
    #[serde(default)]
    pub include_narrative: bool,
}

/// Router builder exposing the scoring, report, and chart endpoints.
pub fn assessment_router<N>(service: Arc<AssessmentService<N>>) -> Router
where
    N: NarrativeGenerator + ?Sized + 'static,
{
    Router::new()
        .route("/api/v1/assessments", post(assess_handler::<N>))
        .route("/api/v1/assessments/report", post(report_handler::<N>))
        .route("/api/v1/assessments/chart", post(chart_handler::<N>))
        .route("/api/v1/profile", get(profile_handler::<N>))
        .with_state(service)
}

pub(crate) async fn assess_handler<N>(
    State(service): State<Arc<AssessmentService<N>>>,
    Json(request): Json<AssessmentRequest>,
) -> Response
where
    N: NarrativeGenerator + ?Sized + 'static,
{
    match run_assessment(&service, &request).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn report_handler<N>(
    State(service): State<Arc<AssessmentService<N>>>,
    Json(request): Json<AssessmentRequest>,
) -> Response
where
    N: NarrativeGenerator + ?Sized + 'static,
{
    let report = match run_assessment(&service, &request).await {
        Ok(report) => report,
        Err(response) => return response,
    };

    let disposition = format!("attachment; filename=\"{}\"", report.download_file_name());
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime::TEXT_PLAIN_UTF_8.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        report.render_text(),
    )
        .into_response()
}

pub(crate) async fn chart_handler<N>(
    State(service): State<Arc<AssessmentService<N>>>,
    Json(mut request): Json<AssessmentRequest>,
) -> Response
where
    N: NarrativeGenerator + ?Sized + 'static,
{
    request.include_narrative = false;

    let report = match run_assessment(&service, &request).await {
        Ok(report) => report,
        Err(response) => return response,
    };

    match report.chart_csv() {
        Ok(csv) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, mime::TEXT_CSV_UTF_8.to_string())],
            csv,
        )
            .into_response(),
        Err(err) => error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

pub(crate) async fn profile_handler<N>(
    State(service): State<Arc<AssessmentService<N>>>,
) -> Response
where
    N: NarrativeGenerator + ?Sized + 'static,
{
    (StatusCode::OK, Json(service.profile().clone())).into_response()
}

async fn run_assessment<N>(
    service: &AssessmentService<N>,
    request: &AssessmentRequest,
) -> Result<AssessmentReport, Response>
where
    N: NarrativeGenerator + ?Sized + 'static,
{
    service
        .assess(&request.submission, request.include_narrative)
        .await
        .map_err(|err| {
            let status = status_for(&err);
            error_response(status, err.to_string())
        })
}

fn status_for(err: &AssessmentServiceError) -> StatusCode {
    if err.is_invalid_input() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
