use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use lh_appraisal::error::AppError;
use lh_appraisal::pipeline::report::ReportKind;
use lh_appraisal::pipeline::{AnalysisContext, AnalysisPipeline, AnalyzeRequest};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct ReportRequest {
    #[serde(flatten)]
    pub(crate) analyze: AnalyzeRequest,
    pub(crate) report_type: ReportKind,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReportResponse {
    pub(crate) context_id: String,
    pub(crate) report_type: ReportKind,
    pub(crate) html: String,
    pub(crate) missing_kpi_warnings: Vec<String>,
}

pub(crate) fn router(pipeline: Arc<AnalysisPipeline>) -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/analysis", axum::routing::post(analysis_endpoint))
        .route(
            "/api/v1/analysis/report",
            axum::routing::post(report_endpoint),
        )
        .layer(Extension(pipeline))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn analysis_endpoint(
    Extension(pipeline): Extension<Arc<AnalysisPipeline>>,
    Json(payload): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisContext>, AppError> {
    let context = pipeline.analyze(&payload)?;
    Ok(Json(context))
}

pub(crate) async fn report_endpoint(
    Extension(pipeline): Extension<Arc<AnalysisPipeline>>,
    Json(payload): Json<ReportRequest>,
) -> Result<Json<ReportResponse>, axum::response::Response> {
    let context = pipeline
        .analyze(&payload.analyze)
        .map_err(|err| AppError::from(err).into_response())?;

    match context.report(payload.report_type) {
        Ok(report) => Ok(Json(ReportResponse {
            context_id: context.context_id,
            report_type: report.kind,
            html: report.html,
            missing_kpi_warnings: report.missing_kpi_warnings,
        })),
        // Critical gap: the structured error document replaces the report.
        Err(err) => Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": err.to_string(),
                "error_document": err.error_document(),
            })),
        )
            .into_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{sample_provider, SAMPLE_ADDRESS};
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_router() -> axum::Router {
        router(Arc::new(AnalysisPipeline::new(Arc::new(sample_provider()))))
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds")
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body collects");
        serde_json::from_slice(&bytes).expect("body is json")
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn analysis_returns_a_finalized_context() {
        let response = test_router()
            .oneshot(post_json(
                "/api/v1/analysis",
                json!({ "address": SAMPLE_ADDRESS, "land_area_sqm": 660.0 }),
            ))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["context_id"]
            .as_str()
            .expect("context id is a string")
            .starts_with("ctx-"));
        assert_eq!(body["address"], SAMPLE_ADDRESS);
        assert!(body["kpi_by_module"]["decision"]["complete"]
            .as_bool()
            .expect("decision record present"));
    }

    #[tokio::test]
    async fn invalid_land_area_is_a_bad_request() {
        let response = test_router()
            .oneshot(post_json(
                "/api/v1/analysis",
                json!({ "address": SAMPLE_ADDRESS, "land_area_sqm": -10.0 }),
            ))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn report_endpoint_assembles_the_requested_type() {
        let response = test_router()
            .oneshot(post_json(
                "/api/v1/analysis/report",
                json!({
                    "address": SAMPLE_ADDRESS,
                    "land_area_sqm": 660.0,
                    "report_type": "quick_check"
                }),
            ))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["report_type"], "quick_check");
        assert!(body["html"]
            .as_str()
            .expect("html body present")
            .contains("간편 검토 보고서"));
    }
}
