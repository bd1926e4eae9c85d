use crate::infra::{AnalysisCache, AppState};
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use firesafe_review::error::AppError;
use firesafe_review::workflows::review::{
    review_router, DrawingAnalysis, Notification, NotificationCenter, NotificationSink, ProjectId,
    ProjectRepository, ReviewService, UserId,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub(crate) struct InboxResponse {
    pub(crate) user_id: UserId,
    pub(crate) unread: usize,
    pub(crate) notifications: Vec<Notification>,
}

pub(crate) fn with_review_routes<R, N>(service: Arc<ReviewService<R, N>>) -> axum::Router
where
    R: ProjectRepository + 'static,
    N: NotificationSink + 'static,
{
    review_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/users/:user_id/notifications",
            axum::routing::get(inbox_endpoint),
        )
        .route(
            "/api/v1/users/:user_id/notifications/read",
            axum::routing::post(mark_all_read_endpoint),
        )
        .route(
            "/api/v1/projects/:project_id/analysis",
            axum::routing::put(ingest_analysis_endpoint).delete(evict_analysis_endpoint),
        )
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

pub(crate) async fn inbox_endpoint(
    Extension(center): Extension<Arc<NotificationCenter>>,
    Path(user_id): Path<String>,
) -> Json<InboxResponse> {
    let user_id = UserId(user_id);
    Json(InboxResponse {
        unread: center.unread_count(&user_id),
        notifications: center.by_user(&user_id),
        user_id,
    })
}

pub(crate) async fn mark_all_read_endpoint(
    Extension(center): Extension<Arc<NotificationCenter>>,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user_id = UserId(user_id);
    let marked = center.mark_all_read(&user_id)?;
    Ok(Json(json!({ "user_id": user_id, "marked_read": marked })))
}

/// Accept an analysis produced by an external reviewer for the next evaluation.
pub(crate) async fn ingest_analysis_endpoint(
    Extension(analyses): Extension<Arc<AnalysisCache>>,
    Path(project_id): Path<String>,
    Json(analysis): Json<DrawingAnalysis>,
) -> StatusCode {
    tracing::info!(%project_id, critical = analysis.critical, "external analysis ingested");
    analyses.ingest(ProjectId(project_id), analysis);
    StatusCode::NO_CONTENT
}

pub(crate) async fn evict_analysis_endpoint(
    Extension(analyses): Extension<Arc<AnalysisCache>>,
    Path(project_id): Path<String>,
) -> StatusCode {
    match analyses.evict(&ProjectId(project_id)) {
        Some(_) => StatusCode::NO_CONTENT,
        None => StatusCode::NOT_FOUND,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use firesafe_review::workflows::review::{NotificationDraft, NotificationKind};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn state(ready: bool) -> AppState {
        let recorder = PrometheusBuilder::new().build_recorder();
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(recorder.handle()),
        }
    }

    fn draft(user: &str, title: &str) -> NotificationDraft {
        NotificationDraft {
            user_id: UserId(user.to_string()),
            kind: NotificationKind::Info,
            title: title.to_string(),
            body: "تم استلام المشروع".to_string(),
            project_id: Some(ProjectId("prj-000001".to_string())),
        }
    }

    #[tokio::test]
    async fn readiness_reflects_startup_flag() {
        let state = state(false);
        let response = readiness_endpoint(Extension(state.clone()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        state.readiness.store(true, Ordering::Release);
        let response = readiness_endpoint(Extension(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn inbox_lists_and_marks_user_notifications() {
        let center = Arc::new(NotificationCenter::in_memory());
        center
            .notify(draft("applicant-7", "استلام المشروع"))
            .expect("notify");
        center
            .notify(draft("applicant-7", "نتيجة مراجعة المشروع"))
            .expect("notify");
        center
            .notify(draft("applicant-8", "استلام المشروع"))
            .expect("notify");

        let Json(inbox) = inbox_endpoint(
            Extension(center.clone()),
            Path("applicant-7".to_string()),
        )
        .await;
        assert_eq!(inbox.unread, 2);
        assert_eq!(inbox.notifications.len(), 2);
        assert_eq!(inbox.notifications[0].title, "نتيجة مراجعة المشروع");

        let Json(body) = mark_all_read_endpoint(
            Extension(center.clone()),
            Path("applicant-7".to_string()),
        )
        .await
        .expect("mark read");
        assert_eq!(body["marked_read"], json!(2));
        assert_eq!(center.unread_count(&UserId("applicant-7".to_string())), 0);
        assert_eq!(center.unread_count(&UserId("applicant-8".to_string())), 1);
    }

    #[tokio::test]
    async fn assembled_router_serves_health_and_inbox() {
        use crate::infra::build_review_stack;
        use axum::body::Body;
        use axum::http::Request;
        use firesafe_review::config::ReviewConfig;
        use firesafe_review::workflows::review::{BuildingProfile, ProjectSubmission};
        use tower::ServiceExt;

        let stack = build_review_stack(&ReviewConfig::default()).expect("stack builds");
        stack
            .service
            .submit(ProjectSubmission {
                applicant_id: UserId("applicant-9".to_string()),
                project_name: "مدرسة الشروق".to_string(),
                building: BuildingProfile {
                    building_type: "تعليمي".to_string(),
                    area: 2400.0,
                    floors: 3,
                    height: None,
                    basement_floors: None,
                    parking_spaces: None,
                    total_occupancy: Some(600),
                    occupancy_type: None,
                    construction_type: None,
                },
                location: Default::default(),
                drawings: Vec::new(),
            })
            .expect("submission accepted");

        let app = with_review_routes(stack.service)
            .layer(Extension(stack.notifications))
            .layer(Extension(stack.analyses))
            .layer(Extension(state(true)));

        let health = app
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("health response");
        assert_eq!(health.status(), StatusCode::OK);

        let inbox = app
            .oneshot(
                Request::get("/api/v1/users/applicant-9/notifications")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("inbox response");
        assert_eq!(inbox.status(), StatusCode::OK);
        let body = axum::body::to_bytes(inbox.into_body(), 64 * 1024)
            .await
            .expect("body");
        let payload: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(payload["unread"], json!(1));
    }

    #[tokio::test]
    async fn external_analyses_can_be_ingested_and_evicted() {
        use crate::infra::build_analyzer;
        use firesafe_review::config::AnalyzerKind;
        use firesafe_review::workflows::review::ExternalAnalysisCache;

        let analyses: Arc<AnalysisCache> = Arc::new(ExternalAnalysisCache::new(build_analyzer(
            AnalyzerKind::None,
            None,
        )));
        let analysis = DrawingAnalysis {
            major: 2,
            ..DrawingAnalysis::default()
        };

        let status = ingest_analysis_endpoint(
            Extension(analyses.clone()),
            Path("prj-000004".to_string()),
            Json(analysis.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(
            analyses.cached(&ProjectId("prj-000004".to_string())),
            Some(analysis)
        );

        let status =
            evict_analysis_endpoint(Extension(analyses.clone()), Path("prj-000004".to_string()))
                .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let status =
            evict_analysis_endpoint(Extension(analyses), Path("prj-000004".to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
