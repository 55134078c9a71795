use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;

use crate::auth::{OptionalUser, RequireUser};
use crate::server::AppState;
use crate::server::dto::{
    FavoriteToggleResponse, FollowToggleResponse, ProfileResponse, TabSummary, UserSummary,
};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::store::Store;

const LOGIN_PATH: &str = "/login";

/// Whether the caller is a programmatic client (AJAX or API) rather than a
/// browser form submission. Programmatic callers get JSON bodies and real
/// status codes; browsers get redirects.
fn wants_json(headers: &HeaderMap) -> bool {
    let xhr = headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("xmlhttprequest"));
    let accepts_json = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));
    xhr || accepts_json
}

/// Browser form posts go back where they came from.
fn redirect_back(headers: &HeaderMap, fallback: &str) -> Response {
    let location = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(fallback);
    Redirect::to(location).into_response()
}

fn login_required(headers: &HeaderMap) -> Response {
    if wants_json(headers) {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "data": null, "error": "login_required" })),
        )
            .into_response()
    } else {
        Redirect::to(LOGIN_PATH).into_response()
    }
}

pub async fn toggle_follow(
    auth: OptionalUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Some(auth) = auth.0 else {
        return login_required(&headers);
    };

    let store = state.store.as_ref();
    let fallback = format!("/users/{id}");

    let result = store
        .get_user(&id)
        .api_err("Failed to get user")
        .and_then(|user| user.or_not_found("User not found"))
        .and_then(|target| {
            store
                .toggle_follow(&auth.user.id, &target.id)
                .map_err(ApiError::from)
        });

    match result {
        Ok(following) => {
            if wants_json(&headers) {
                Json(ApiResponse::success(FollowToggleResponse {
                    following,
                    user_id: id,
                }))
                .into_response()
            } else {
                redirect_back(&headers, &fallback)
            }
        }
        Err(err) => {
            if wants_json(&headers) {
                err.into_response()
            } else {
                redirect_back(&headers, &fallback)
            }
        }
    }
}

pub async fn toggle_favorite(
    auth: OptionalUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Some(auth) = auth.0 else {
        return login_required(&headers);
    };

    let store = state.store.as_ref();
    let fallback = format!("/tabs/{id}");

    let result = store
        .get_tab(&id)
        .api_err("Failed to get tab")
        .and_then(|tab| tab.or_not_found("Tab not found"))
        .and_then(|tab| {
            store
                .toggle_favorite(&auth.user.id, &tab.id)
                .map_err(ApiError::from)
        });

    match result {
        Ok(favorited) => {
            if wants_json(&headers) {
                Json(ApiResponse::success(FavoriteToggleResponse {
                    favorited,
                    tab_id: id,
                }))
                .into_response()
            } else {
                redirect_back(&headers, &fallback)
            }
        }
        Err(err) => {
            if wants_json(&headers) {
                err.into_response()
            } else {
                redirect_back(&headers, &fallback)
            }
        }
    }
}

pub async fn user_profile(
    auth: OptionalUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let user = store
        .get_user(&id)
        .api_err("Failed to get user")?
        .or_not_found("User not found")?;

    let tabs = store
        .list_user_tabs(&user.id)
        .api_err("Failed to list tabs")?;

    let followers_count = store
        .count_followers(&user.id)
        .api_err("Failed to count followers")?;
    let following_count = store
        .count_following(&user.id)
        .api_err("Failed to count following")?;
    let favorites_count = store
        .count_favorites(&user.id)
        .api_err("Failed to count favorites")?;

    let is_following = match &auth.0 {
        Some(auth) if auth.user.id != user.id => store
            .is_following(&auth.user.id, &user.id)
            .api_err("Failed to check following")?,
        _ => false,
    };

    Ok::<_, ApiError>(Json(ApiResponse::success(ProfileResponse {
        user: UserSummary::from(user),
        tabs: tabs.into_iter().map(TabSummary::from).collect(),
        followers_count,
        following_count,
        favorites_count,
        is_following,
    })))
}

pub async fn list_followers(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    store
        .get_user(&id)
        .api_err("Failed to get user")?
        .or_not_found("User not found")?;

    let followers = store
        .list_followers(&id)
        .api_err("Failed to list followers")?;

    let followers: Vec<UserSummary> = followers.into_iter().map(UserSummary::from).collect();

    Ok::<_, ApiError>(Json(ApiResponse::success(followers)))
}

pub async fn list_following(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    store
        .get_user(&id)
        .api_err("Failed to get user")?
        .or_not_found("User not found")?;

    let following = store
        .list_following(&id)
        .api_err("Failed to list following")?;

    let following: Vec<UserSummary> = following.into_iter().map(UserSummary::from).collect();

    Ok::<_, ApiError>(Json(ApiResponse::success(following)))
}

pub async fn list_favorites(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let favorites = state
        .store
        .list_favorites(&auth.user.id)
        .api_err("Failed to list favorites")?;

    let favorites: Vec<TabSummary> = favorites.into_iter().map(TabSummary::from).collect();

    Ok::<_, ApiError>(Json(ApiResponse::success(favorites)))
}
