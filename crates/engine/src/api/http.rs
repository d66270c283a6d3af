//! HTTP routes.

use axum::{
    extract::{FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use gat_domain::{DataCollection, DataCollectionId, DataSetType};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::app::App;
use crate::infrastructure::ports::DownloadableFile;
use crate::use_cases::data_collection::{
    CreateDataCollection, DataCollectionError, DetailKind, ProgressIndicator,
};

/// Header carrying the acting username.
pub const USER_HEADER: &str = "x-user-id";

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route(
            "/api/data-collections",
            get(list_data_collections).post(create_data_collection),
        )
        .route("/api/data-collections/end", post(end_data_collection))
        .route("/api/data-collections/has-data-sets", get(has_data_sets))
        .route("/api/data-collections/course-tile", post(ensure_course_tile))
        .route(
            "/api/data-collections/{id}",
            get(get_data_collection)
                .put(update_data_collection)
                .delete(delete_data_collection),
        )
        .route("/api/data-collections/{id}/export", post(export_data))
        .route("/api/data-collections/{id}/export/size", get(export_data_size))
        .route("/api/data-collections/{id}/export-course", post(export_course))
        .route("/api/data-collections/{id}/course-size", get(course_size))
        .route("/api/data-collections/{id}/report", post(generate_report))
}

async fn health() -> &'static str {
    "OK"
}

// =============================================================================
// Acting user
// =============================================================================

/// Username from the `x-user-id` header.
#[derive(Debug, Clone)]
pub struct ActingUser(pub String);

impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| ActingUser(v.to_string()))
            .ok_or(ApiError::Unauthorized)
    }
}

// =============================================================================
// Data collections
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateDataCollectionRequest {
    name: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CourseFolderRequest {
    course_folder: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CourseTileRequest {
    course_folder: String,
    course_name: String,
    source_course_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HasDataSetsQuery {
    course_folder: String,
    /// Comma separated data set types to ignore
    #[serde(default)]
    ignore: Option<String>,
    /// Only count data sets this user holds a role on
    #[serde(default)]
    username: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EndResponse {
    ended: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HasDataSetsResponse {
    has_data_sets: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SizeResponse {
    size_mb: f64,
}

async fn list_data_collections(
    State(app): State<Arc<App>>,
    ActingUser(user): ActingUser,
) -> Result<Json<Vec<DataCollection>>, ApiError> {
    let items = app.use_cases.data_collection.list(&user).await?;
    Ok(Json(items))
}

async fn create_data_collection(
    State(app): State<Arc<App>>,
    ActingUser(user): ActingUser,
    Json(request): Json<CreateDataCollection>,
) -> Result<(StatusCode, Json<DataCollection>), ApiError> {
    let item = app.use_cases.data_collection.create(&user, request).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn ensure_course_tile(
    State(app): State<Arc<App>>,
    ActingUser(user): ActingUser,
    Json(request): Json<CourseTileRequest>,
) -> Result<Json<DataCollection>, ApiError> {
    let item = app
        .use_cases
        .data_collection
        .ensure_course_tile(
            &user,
            &request.course_folder,
            &request.course_name,
            &request.source_course_id,
        )
        .await?;
    Ok(Json(item))
}

async fn get_data_collection(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DataCollection>, ApiError> {
    let item = app
        .use_cases
        .data_collection
        .get(DataCollectionId::from_uuid(id))
        .await?;
    Ok(Json(item))
}

async fn update_data_collection(
    State(app): State<Arc<App>>,
    ActingUser(user): ActingUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateDataCollectionRequest>,
) -> Result<Json<DataCollection>, ApiError> {
    let item = app
        .use_cases
        .data_collection
        .update(
            &user,
            DataCollectionId::from_uuid(id),
            &request.name,
            request.description,
        )
        .await?;
    Ok(Json(item))
}

async fn delete_data_collection(
    State(app): State<Arc<App>>,
    ActingUser(user): ActingUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let progress = ProgressIndicator::new();
    app.use_cases
        .data_collection
        .delete(&user, DataCollectionId::from_uuid(id), &progress)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn end_data_collection(
    State(app): State<Arc<App>>,
    ActingUser(user): ActingUser,
    Json(request): Json<CourseFolderRequest>,
) -> Result<Json<EndResponse>, ApiError> {
    let ended = app
        .use_cases
        .data_collection
        .end(&user, &request.course_folder)
        .await?;
    Ok(Json(EndResponse { ended }))
}

async fn has_data_sets(
    State(app): State<Arc<App>>,
    Query(query): Query<HasDataSetsQuery>,
) -> Result<Json<HasDataSetsResponse>, ApiError> {
    let ignore_types = query
        .ignore
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::parse::<DataSetType>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let has_data_sets = app
        .use_cases
        .data_collection
        .has_data_sets(query.username.as_deref(), &query.course_folder, &ignore_types)
        .await?;
    Ok(Json(HasDataSetsResponse { has_data_sets }))
}

// =============================================================================
// Exports and reports
// =============================================================================

async fn export_data(
    State(app): State<Arc<App>>,
    ActingUser(user): ActingUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DownloadableFile>, ApiError> {
    let progress = ProgressIndicator::new();
    let file = app
        .use_cases
        .data_collection
        .export_data(&user, DataCollectionId::from_uuid(id), &progress)
        .await?;
    Ok(Json(file))
}

async fn export_data_size(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SizeResponse>, ApiError> {
    let progress = ProgressIndicator::new();
    let size_mb = app
        .use_cases
        .data_collection
        .export_data_size(DataCollectionId::from_uuid(id), &progress)
        .await?;
    Ok(Json(SizeResponse { size_mb }))
}

async fn export_course(
    State(app): State<Arc<App>>,
    ActingUser(user): ActingUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DownloadableFile>, ApiError> {
    let progress = ProgressIndicator::new();
    let file = app
        .use_cases
        .data_collection
        .export_course(&user, DataCollectionId::from_uuid(id), &progress)
        .await?;
    Ok(Json(file))
}

async fn course_size(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SizeResponse>, ApiError> {
    let size_mb = app
        .use_cases
        .data_collection
        .course_size(DataCollectionId::from_uuid(id))
        .await?;
    Ok(Json(SizeResponse { size_mb }))
}

async fn generate_report(
    State(app): State<Arc<App>>,
    ActingUser(user): ActingUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DownloadableFile>, ApiError> {
    let progress = ProgressIndicator::new();
    let file = app
        .use_cases
        .data_collection
        .generate_report(&user, DataCollectionId::from_uuid(id), &progress)
        .await?;
    Ok(Json(file))
}

// =============================================================================
// Errors
// =============================================================================

/// JSON body of every error response except internal ones.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug)]
pub enum ApiError {
    NotFound(ErrorBody),
    BadRequest(ErrorBody),
    Unauthorized,
    Forbidden(ErrorBody),
    Conflict(ErrorBody),
    /// A failure with a reason meant for the user
    Failed(ErrorBody),
    Internal(String),
}

impl ApiError {
    fn bad_request(reason: impl Into<String>) -> Self {
        ApiError::BadRequest(ErrorBody {
            reason: reason.into(),
            details: None,
        })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(body) => (StatusCode::NOT_FOUND, Json(body)).into_response(),
            ApiError::BadRequest(body) => (StatusCode::BAD_REQUEST, Json(body)).into_response(),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorBody {
                    reason: format!("Missing {USER_HEADER} header"),
                    details: None,
                }),
            )
                .into_response(),
            ApiError::Forbidden(body) => (StatusCode::FORBIDDEN, Json(body)).into_response(),
            ApiError::Conflict(body) => (StatusCode::CONFLICT, Json(body)).into_response(),
            ApiError::Failed(body) => {
                tracing::error!(reason = %body.reason, details = ?body.details, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
            }
        }
    }
}

impl From<DataCollectionError> for ApiError {
    fn from(e: DataCollectionError) -> Self {
        match e {
            DataCollectionError::Detailed {
                kind,
                reason,
                details,
            } => {
                let body = ErrorBody {
                    reason,
                    details: Some(details),
                };
                match kind {
                    DetailKind::NotFound => ApiError::NotFound(body),
                    DetailKind::PermissionDenied => ApiError::Forbidden(body),
                    DetailKind::Rejected => ApiError::Conflict(body),
                    DetailKind::Failed => ApiError::Failed(body),
                }
            }
            DataCollectionError::InvalidArgument(reason) => ApiError::bad_request(reason),
            DataCollectionError::Domain(e) => ApiError::bad_request(e.to_string()),
            DataCollectionError::Cancelled => ApiError::Conflict(ErrorBody {
                reason: "Operation cancelled".into(),
                details: None,
            }),
            DataCollectionError::Repo(e) => ApiError::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::{TimeZone, Utc};
    use gat_domain::EntityName;
    use tower::ServiceExt;

    use crate::app::Repositories;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::ports::{
        MockArchiveWriter, MockCourseFolderStore, MockDataCollectionRepo, MockReportWriter,
        MockSessionLogStore,
    };
    use crate::use_cases::data_collection::DataCollectionSettings;

    fn router(repo: MockDataCollectionRepo, courses: MockCourseFolderStore) -> Router {
        let now = Utc
            .with_ymd_and_hms(2024, 5, 1, 9, 30, 0)
            .single()
            .expect("valid timestamp");
        let repositories = Repositories {
            data_collection: Arc::new(repo),
            session_logs: Arc::new(MockSessionLogStore::new()),
            course_folders: Arc::new(courses),
            experiment_folders: Arc::new(MockCourseFolderStore::new()),
        };
        let app = App::new(
            repositories,
            Arc::new(MockArchiveWriter::new()),
            Arc::new(MockReportWriter::new()),
            Arc::new(FixedClock(now)),
            DataCollectionSettings::default(),
        );
        routes().with_state(Arc::new(app))
    }

    fn stored_item() -> DataCollection {
        DataCollection::new(
            EntityName::new("Pilot Study").expect("valid name"),
            "alice",
            "alice/Pilot Course",
            DataSetType::Experiment,
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
                .single()
                .expect("valid timestamp"),
        )
        .expect("valid data set")
        .with_source_course_id("course-1")
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let response = router(MockDataCollectionRepo::new(), MockCourseFolderStore::new())
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn list_requires_user_header() {
        let response = router(MockDataCollectionRepo::new(), MockCourseFolderStore::new())
            .oneshot(
                Request::builder()
                    .uri("/api/data-collections")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn list_returns_users_data_sets() {
        let mut repo = MockDataCollectionRepo::new();
        repo.expect_list_for_user()
            .withf(|user| user == "alice")
            .returning(|_| Ok(vec![stored_item()]));

        let response = router(repo, MockCourseFolderStore::new())
            .oneshot(
                Request::builder()
                    .uri("/api/data-collections")
                    .header(USER_HEADER, "alice")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body[0]["name"], "Pilot Study");
        assert_eq!(body[0]["dataSetType"], "EXPERIMENT");
    }

    #[tokio::test]
    async fn missing_data_set_is_404_with_reason() {
        let mut repo = MockDataCollectionRepo::new();
        repo.expect_get().returning(|_| Ok(None));

        let response = router(repo, MockCourseFolderStore::new())
            .oneshot(
                Request::builder()
                    .uri(format!("/api/data-collections/{}", Uuid::new_v4()))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["reason"], "Failed to find the published course.");
    }

    #[tokio::test]
    async fn create_returns_created() {
        let mut repo = MockDataCollectionRepo::new();
        repo.expect_save().times(1).returning(|_| Ok(()));
        let mut courses = MockCourseFolderStore::new();
        courses.expect_exists().returning(|_| Ok(true));

        let payload = serde_json::json!({
            "name": "Pilot Study",
            "courseFolder": "alice/Pilot Course",
            "sourceCourseId": "course-1",
            "dataSetType": "LTI"
        });
        let response = router(repo, courses)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/data-collections")
                    .header(USER_HEADER, "alice")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["author"], "alice");
        assert_eq!(body["dataSetType"], "LTI");
    }

    #[tokio::test]
    async fn delete_by_non_owner_is_forbidden() {
        let item = stored_item();
        let id = item.id();
        let mut repo = MockDataCollectionRepo::new();
        repo.expect_get().returning(move |_| Ok(Some(item.clone())));
        repo.expect_delete().never();

        let response = router(repo, MockCourseFolderStore::new())
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/data-collections/{id}"))
                    .header(USER_HEADER, "mallory")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = json_body(response).await;
        assert_eq!(body["reason"], "Failed to delete data set");
    }

    #[tokio::test]
    async fn has_data_sets_parses_ignored_types() {
        let mut repo = MockDataCollectionRepo::new();
        repo.expect_list_for_course_folder()
            .returning(|_| Ok(vec![stored_item()]));

        let response = router(repo, MockCourseFolderStore::new())
            .oneshot(
                Request::builder()
                    .uri("/api/data-collections/has-data-sets?courseFolder=alice%2FPilot%20Course&ignore=EXPERIMENT,LTI")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["hasDataSets"], false);
    }

    #[tokio::test]
    async fn unknown_ignored_type_is_bad_request() {
        let response = router(MockDataCollectionRepo::new(), MockCourseFolderStore::new())
            .oneshot(
                Request::builder()
                    .uri("/api/data-collections/has-data-sets?courseFolder=a&ignore=TILE")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
