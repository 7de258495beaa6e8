use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Serialize;
use tracing::info;

use crate::engine::mutation::MutationCoordinator;
use crate::engine::pipeline::{category_counts, view, Viewable};
use crate::error::RequestError;
use crate::models::announcement::Announcement;
use crate::models::bookmark::SavedResource;
use crate::models::course::Course;
use crate::models::listing::{ViewCriteria, ViewQuery};
use crate::models::resource::{Resource, ResourceId, ResourceInput, ResourceType};
use crate::models::user::ActingUser;
use crate::server::state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/courses", get(list_courses))
        .route(
            "/courses/:course/resources",
            get(list_resources).post(create_resource),
        )
        .route(
            "/courses/:course/resources/:id",
            put(update_resource).delete(delete_resource),
        )
        .route(
            "/courses/:course/resources/:id/bookmark",
            get(bookmark_status).put(save_bookmark).delete(unsave_bookmark),
        )
        .route(
            "/courses/:course/resources/:id/bookmark/toggle",
            post(toggle_bookmark),
        )
        .route(
            "/courses/:course/announcements",
            get(list_course_announcements),
        )
        .route("/announcements", get(list_announcements))
        .route("/bookmarks", get(list_bookmarks).delete(clear_bookmarks))
        .route("/catalog/reload", post(reload_catalog))
        .with_state(state)
}

pub async fn serve(state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = state.config.server.address.clone();
    let app = app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("starting server on: {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

/// One page of a filtered collection. `total` and `counts` describe the
/// unfiltered collection so tabs can show their sizes.
#[derive(Clone, Debug, Serialize)]
pub struct ViewResponse<T, K> {
    pub items: Vec<T>,
    pub matched: usize,
    pub total: usize,
    pub counts: BTreeMap<K, usize>,
}

impl<T> ViewResponse<T, T::Tag>
where
    T: Viewable + Clone,
    T::Tag: Ord + Clone,
{
    pub fn build(collection: &[T], criteria: &ViewCriteria<T::Tag>) -> Self {
        let items: Vec<T> = view(collection, criteria).into_iter().cloned().collect();
        Self {
            matched: items.len(),
            total: collection.len(),
            counts: category_counts(collection),
            items,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct BookmarkStatus {
    pub saved: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct ReloadResponse {
    pub applied: bool,
    pub courses: usize,
}

pub async fn list_courses(State(state): State<Arc<AppState>>) -> Json<Vec<Course>> {
    Json(state.sorted_courses())
}

pub async fn list_resources(
    State(state): State<Arc<AppState>>,
    Path(course): Path<String>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<ViewResponse<Resource, ResourceType>>, RequestError> {
    let criteria = ViewCriteria::from_query(query)?;
    let entry = state
        .courses
        .get(&course)
        .ok_or_else(|| RequestError::CourseNotFound(course.clone()))?;
    Ok(Json(ViewResponse::build(entry.resources.resources(), &criteria)))
}

pub async fn create_resource(
    State(state): State<Arc<AppState>>,
    Path(course): Path<String>,
    user: ActingUser,
    Json(input): Json<ResourceInput>,
) -> Result<(StatusCode, Json<Resource>), RequestError> {
    let mut entry = state.course_mut(&course)?;
    let resource =
        MutationCoordinator::new(&mut entry.resources, &state.policy, &user).create(input)?;
    Ok((StatusCode::CREATED, Json(resource)))
}

pub async fn update_resource(
    State(state): State<Arc<AppState>>,
    Path((course, id)): Path<(String, ResourceId)>,
    user: ActingUser,
    Json(input): Json<ResourceInput>,
) -> Result<Json<Resource>, RequestError> {
    let mut entry = state.course_mut(&course)?;
    let resource =
        MutationCoordinator::new(&mut entry.resources, &state.policy, &user).update(id, input)?;
    Ok(Json(resource))
}

pub async fn delete_resource(
    State(state): State<Arc<AppState>>,
    Path((course, id)): Path<(String, ResourceId)>,
    user: ActingUser,
) -> Result<StatusCode, RequestError> {
    let mut entry = state.course_mut(&course)?;
    MutationCoordinator::new(&mut entry.resources, &state.policy, &user).remove(id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_course_announcements(
    State(state): State<Arc<AppState>>,
    Path(course): Path<String>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<ViewResponse<Announcement, String>>, RequestError> {
    let criteria = ViewCriteria::from_query(query)?;
    let announcements = state.course_announcements(&course)?;
    Ok(Json(ViewResponse::build(announcements.as_slice(), &criteria)))
}

pub async fn list_announcements(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<ViewResponse<Announcement, String>>, RequestError> {
    let criteria = ViewCriteria::from_query(query)?;
    let announcements = state.all_announcements();
    Ok(Json(ViewResponse::build(announcements.as_slice(), &criteria)))
}

pub async fn list_bookmarks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<ViewResponse<SavedResource, ResourceType>>, RequestError> {
    let criteria = ViewCriteria::from_query(query)?;
    let mut bookmarks = state.bookmarks.lock().await;
    bookmarks.reload();
    Ok(Json(ViewResponse::build(bookmarks.list(), &criteria)))
}

pub async fn clear_bookmarks(State(state): State<Arc<AppState>>) -> Result<StatusCode, RequestError> {
    state.bookmarks.lock().await.clear()?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn bookmark_status(
    State(state): State<Arc<AppState>>,
    Path((course, id)): Path<(String, ResourceId)>,
) -> Json<BookmarkStatus> {
    let mut bookmarks = state.bookmarks.lock().await;
    bookmarks.reload();
    Json(BookmarkStatus {
        saved: bookmarks.is_saved(&course, id),
    })
}

pub async fn save_bookmark(
    State(state): State<Arc<AppState>>,
    Path((course, id)): Path<(String, ResourceId)>,
) -> Result<Json<SavedResource>, RequestError> {
    let (course, resource) = state.resource(&course, id)?;
    let saved = state.bookmarks.lock().await.save(&resource, &course)?;
    Ok(Json(saved))
}

/// Works for bookmarks whose resource has since been deleted.
pub async fn unsave_bookmark(
    State(state): State<Arc<AppState>>,
    Path((course, id)): Path<(String, ResourceId)>,
) -> Result<StatusCode, RequestError> {
    state.bookmarks.lock().await.unsave(&course, id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_bookmark(
    State(state): State<Arc<AppState>>,
    Path((course, id)): Path<(String, ResourceId)>,
) -> Result<Json<BookmarkStatus>, RequestError> {
    let (course, resource) = state.resource(&course, id)?;
    let saved = state.bookmarks.lock().await.toggle(&resource, &course)?;
    Ok(Json(BookmarkStatus { saved }))
}

pub async fn reload_catalog(
    State(state): State<Arc<AppState>>,
    user: ActingUser,
) -> Result<Json<ReloadResponse>, RequestError> {
    if !state.policy.is_privileged(&user) {
        return Err(RequestError::InsufficientPermissions { current: user.role });
    }
    let applied = state.reload_catalog().await?;
    Ok(Json(ReloadResponse {
        applied,
        courses: state.courses.len(),
    }))
}
