//! Photo list views: interesting, top viewed, favorites, popular, group
//! pools, plus the group list and favorite-owner counts.

use axum::extract::{Path, State};
use axum::response::Html;
use flickrview_types::{Group, Photo};
use flickrview_util::{DEFAULT_SIZE_SUFFIX, photo_page_url, photo_url};
use indexmap::IndexMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use crate::{AppError, AppState, templates};

/// Largest page Flickr serves for list methods.
const MAX_PER_PAGE: &str = "500";

/// A photo prepared for display.
#[derive(Debug, Clone, Serialize)]
pub struct PhotoView {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub page_url: String,
    pub views: Option<u64>,
}

impl PhotoView {
    /// `owner` is used when the list entry does not name one.
    pub fn new(photo: &Photo, owner: &str) -> Self {
        let owner = photo.owner.as_deref().unwrap_or(owner);
        Self {
            id: photo.id.clone(),
            title: photo.title.clone().unwrap_or_default(),
            image_url: photo_url(photo, DEFAULT_SIZE_SUFFIX),
            page_url: photo_page_url(owner, &photo.id),
            views: photo.views,
        }
    }
}

/// Number of favorites owned by one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerCount {
    pub owner: String,
    pub count: usize,
}

/// Deserialize the list found at `pointer` (e.g. `/photos/photo`).
pub fn list_at<T: DeserializeOwned>(payload: &Value, pointer: &str) -> Result<Vec<T>, AppError> {
    let list = payload
        .pointer(pointer)
        .ok_or_else(|| AppError::Payload(format!("missing {pointer}")))?;
    serde_json::from_value(list.clone()).map_err(|e| AppError::Payload(format!("{pointer}: {e}")))
}

/// Order photos by view count, most viewed first. Photos without a count
/// go last; ties keep their original order.
pub fn sort_by_views(photos: &mut [Photo]) {
    photos.sort_by(|a, b| b.views.cmp(&a.views));
}

/// Count photos per owner, most frequent first, then by owner id.
pub fn count_owners(photos: &[Photo]) -> Vec<OwnerCount> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for owner in photos.iter().filter_map(|photo| photo.owner.as_deref()) {
        *counts.entry(owner).or_default() += 1;
    }
    let mut owners: Vec<OwnerCount> = counts
        .into_iter()
        .map(|(owner, count)| OwnerCount {
            owner: owner.to_string(),
            count,
        })
        .collect();
    owners.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.owner.cmp(&b.owner)));
    owners
}

fn render_photos(heading: &str, user_id: Option<&str>, photos: &[Photo]) -> Result<Html<String>, AppError> {
    let views: Vec<PhotoView> = photos
        .iter()
        .map(|photo| PhotoView::new(photo, user_id.unwrap_or_default()))
        .collect();
    let page = templates::render(
        "photos.html",
        &json!({"heading": heading, "user_id": user_id, "photos": views}),
    )?;
    Ok(Html(page))
}

pub async fn interesting(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let payload = state.call("interestingness.getList", &[], "interesting photos").await?;
    let photos: Vec<Photo> = list_at(&payload, "/photos/photo")?;
    render_photos("Interesting", None, &photos)
}

pub async fn top(State(state): State<AppState>, Path(user_id): Path<String>) -> Result<Html<String>, AppError> {
    let payload = state
        .call(
            "people.getPublicPhotos",
            &[("user_id", user_id.as_str()), ("extras", "views"), ("per_page", MAX_PER_PAGE)],
            "person",
        )
        .await?;
    let mut photos: Vec<Photo> = list_at(&payload, "/photos/photo")?;
    sort_by_views(&mut photos);
    render_photos(&format!("Top viewed photos of {user_id}"), Some(user_id.as_str()), &photos)
}

pub async fn favs(State(state): State<AppState>, Path(user_id): Path<String>) -> Result<Html<String>, AppError> {
    let payload = state
        .call("favorites.getPublicList", &[("user_id", user_id.as_str())], "person")
        .await?;
    let photos: Vec<Photo> = list_at(&payload, "/photos/photo")?;
    render_photos(&format!("Favorites of {user_id}"), Some(user_id.as_str()), &photos)
}

pub async fn popular(State(state): State<AppState>, Path(user_id): Path<String>) -> Result<Html<String>, AppError> {
    let payload = state
        .call(
            "photos.search",
            &[("user_id", user_id.as_str()), ("sort", "interestingness-desc")],
            "person",
        )
        .await?;
    let photos: Vec<Photo> = list_at(&payload, "/photos/photo")?;
    render_photos(&format!("Popular photos of {user_id}"), Some(user_id.as_str()), &photos)
}

pub async fn groups(State(state): State<AppState>, Path(user_id): Path<String>) -> Result<Html<String>, AppError> {
    let payload = state
        .call("people.getPublicGroups", &[("user_id", user_id.as_str())], "person")
        .await?;
    let groups: Vec<Group> = list_at(&payload, "/groups/group")?;
    debug!(%user_id, count = groups.len(), "loaded groups");
    let page = templates::render("groups.html", &json!({"user_id": user_id, "groups": groups}))?;
    Ok(Html(page))
}

pub async fn group_pool(
    State(state): State<AppState>,
    Path((user_id, group_id)): Path<(String, String)>,
) -> Result<Html<String>, AppError> {
    let payload = state
        .call(
            "groups.pools.getPhotos",
            &[("group_id", group_id.as_str()), ("user_id", user_id.as_str())],
            "group",
        )
        .await?;
    let photos: Vec<Photo> = list_at(&payload, "/photos/photo")?;
    render_photos(&format!("Photos of {user_id} in {group_id}"), Some(user_id.as_str()), &photos)
}

fn signed_in(state: &AppState) -> Result<String, AppError> {
    state.authenticated_user.clone().ok_or_else(|| {
        AppError::BadRequest("this view needs an authenticated account; run `flickrview auth` first".into())
    })
}

/// Favorites of the authenticated account.
pub async fn own_favs(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let user_id = signed_in(&state)?;
    favs(State(state), Path(user_id)).await
}

/// Popular photos of the authenticated account.
pub async fn own_popular(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let user_id = signed_in(&state)?;
    popular(State(state), Path(user_id)).await
}

/// Owners of the authenticated account's favorites.
pub async fn favusers(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let user_id = signed_in(&state)?;
    let payload = state
        .call(
            "favorites.getList",
            &[("user_id", user_id.as_str()), ("per_page", MAX_PER_PAGE)],
            "favorites",
        )
        .await?;
    let photos: Vec<Photo> = list_at(&payload, "/photos/photo")?;
    let owners = count_owners(&photos);
    let page = templates::render("favusers.html", &json!({"user_id": user_id, "owners": owners}))?;
    Ok(Html(page))
}
