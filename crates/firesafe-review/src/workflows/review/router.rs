use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{DrawingUpload, ProjectId, ProjectSubmission};
use super::notifications::NotificationSink;
use super::repository::{ProjectRepository, RepositoryError};
use super::service::{ReviewService, ReviewServiceError};

/// Router builder exposing submission, evaluation and rule lookup endpoints.
pub fn review_router<R, N>(service: Arc<ReviewService<R, N>>) -> Router
where
    R: ProjectRepository + 'static,
    N: NotificationSink + 'static,
{
    Router::new()
        .route("/api/v1/projects", post(submit_handler::<R, N>))
        .route("/api/v1/projects/:project_id", get(status_handler::<R, N>))
        .route(
            "/api/v1/projects/:project_id/drawings",
            post(drawing_handler::<R, N>),
        )
        .route(
            "/api/v1/projects/:project_id/evaluate",
            post(evaluate_handler::<R, N>),
        )
        .route(
            "/api/v1/projects/:project_id/report/refresh",
            post(refresh_handler::<R, N>),
        )
        .route("/api/v1/rules", get(rules_handler::<R, N>))
        .with_state(service)
}

fn error_response(error: ReviewServiceError) -> Response {
    let status = match &error {
        ReviewServiceError::Invalid(_) => StatusCode::BAD_REQUEST,
        ReviewServiceError::DrawingNotFound(_)
        | ReviewServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ReviewServiceError::Repository(RepositoryError::Conflict)
        | ReviewServiceError::Repository(RepositoryError::Stale { .. })
        | ReviewServiceError::License(_) => StatusCode::CONFLICT,
        ReviewServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    if status.is_server_error() {
        tracing::warn!(error = %error, "review request failed");
    }
    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}

pub(crate) async fn submit_handler<R, N>(
    State(service): State<Arc<ReviewService<R, N>>>,
    Json(submission): Json<ProjectSubmission>,
) -> Response
where
    R: ProjectRepository + 'static,
    N: NotificationSink + 'static,
{
    match service.submit(submission) {
        Ok(project) => (StatusCode::CREATED, Json(project.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<R, N>(
    State(service): State<Arc<ReviewService<R, N>>>,
    Path(project_id): Path<String>,
) -> Response
where
    R: ProjectRepository + 'static,
    N: NotificationSink + 'static,
{
    match service.get(&ProjectId(project_id)) {
        Ok(project) => (StatusCode::OK, Json(project.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn drawing_handler<R, N>(
    State(service): State<Arc<ReviewService<R, N>>>,
    Path(project_id): Path<String>,
    Json(upload): Json<DrawingUpload>,
) -> Response
where
    R: ProjectRepository + 'static,
    N: NotificationSink + 'static,
{
    match service.add_drawing(&ProjectId(project_id), upload) {
        Ok(drawing) => (StatusCode::CREATED, Json(drawing)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn evaluate_handler<R, N>(
    State(service): State<Arc<ReviewService<R, N>>>,
    Path(project_id): Path<String>,
) -> Response
where
    R: ProjectRepository + 'static,
    N: NotificationSink + 'static,
{
    match service.evaluate(&ProjectId(project_id)).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn refresh_handler<R, N>(
    State(service): State<Arc<ReviewService<R, N>>>,
    Path(project_id): Path<String>,
) -> Response
where
    R: ProjectRepository + 'static,
    N: NotificationSink + 'static,
{
    let id = ProjectId(project_id);
    match service.refresh_report_recommendations(&id) {
        Ok(Some(report)) => (StatusCode::OK, Json(report)).into_response(),
        Ok(None) => {
            let payload = json!({
                "error": format!("project {id} has no review report"),
            });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RuleFilter {
    category: Option<String>,
    building_type: Option<String>,
}

pub(crate) async fn rules_handler<R, N>(
    State(service): State<Arc<ReviewService<R, N>>>,
    Query(filter): Query<RuleFilter>,
) -> Response
where
    R: ProjectRepository + 'static,
    N: NotificationSink + 'static,
{
    let catalog = service.catalog();
    let rules: Vec<_> = catalog
        .all()
        .iter()
        .filter(|rule| {
            filter
                .category
                .as_deref()
                .map_or(true, |category| rule.category == category)
        })
        .filter(|rule| {
            filter
                .building_type
                .as_deref()
                .map_or(true, |building_type| rule.applies_to(building_type))
        })
        .collect();

    let payload = json!({
        "code": catalog.code(),
        "version": catalog.version(),
        "count": rules.len(),
        "rules": rules,
    });
    (StatusCode::OK, Json(payload)).into_response()
}
