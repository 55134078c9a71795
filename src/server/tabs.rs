use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::OptionalUser;
use crate::server::AppState;
use crate::server::dto::{
    CreateTabRequest, LegacyTabResponse, ListTabsParams, TabDetailResponse, TabSummary,
    UpdateTabRequest, UserSummary,
};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::{validate_difficulty, validate_tab_fields};
use crate::store::Store;
use crate::tabtext::{classify_length, highlight_tab};
use crate::types::{Tab, User};

const DEFAULT_TEMPO_BPM: i32 = 120;

/// Ownership policy: a tab with an owner can only be touched by that owner.
/// A tab with no owner (posted anonymously) is editable and deletable by
/// anyone who knows its id. Intentional, see DESIGN.md.
fn require_tab_access(tab: &Tab, user: Option<&User>) -> Result<(), ApiError> {
    match &tab.user_id {
        None => Ok(()),
        Some(owner_id) => match user {
            None => Err(ApiError::unauthorized("Authentication required")),
            Some(user) if &user.id == owner_id => Ok(()),
            Some(_) => Err(ApiError::forbidden("You do not own this tab")),
        },
    }
}

pub async fn list_tabs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListTabsParams>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let tabs = match params.q.as_deref().map(str::trim) {
        Some(query) if !query.is_empty() => {
            store.search_tabs(query).api_err("Failed to search tabs")?
        }
        _ => store.list_tabs().api_err("Failed to list tabs")?,
    };

    let tabs: Vec<TabSummary> = tabs.into_iter().map(TabSummary::from).collect();

    Ok::<_, ApiError>(Json(ApiResponse::success(tabs)))
}

pub async fn create_tab(
    auth: OptionalUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTabRequest>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    validate_tab_fields(&req.title, &req.artist)?;

    let difficulty = req.difficulty.unwrap_or(3);
    validate_difficulty(difficulty)?;

    let now = Utc::now();
    let tab = Tab {
        id: Uuid::new_v4().to_string(),
        title: req.title.trim().to_string(),
        artist: req.artist.trim().to_string(),
        content: req.strings.assemble(),
        difficulty,
        tempo_bpm: Some(req.tempo_bpm.unwrap_or(DEFAULT_TEMPO_BPM)),
        user_id: auth.0.map(|a| a.user.id),
        created_at: now,
        updated_at: now,
    };

    store.create_tab(&tab).api_err("Failed to create tab")?;

    tracing::info!("Created tab '{}' ({})", tab.title, tab.id);

    Ok::<_, ApiError>(Json(ApiResponse::success(tab)))
}

pub async fn get_tab(
    auth: OptionalUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let tab = store
        .get_tab(&id)
        .api_err("Failed to get tab")?
        .or_not_found("Tab not found")?;

    let owner = match &tab.user_id {
        Some(owner_id) => store
            .get_user(owner_id)
            .api_err("Failed to get owner")?
            .map(UserSummary::from),
        None => None,
    };

    let favorited = match &auth.0 {
        Some(auth) => store
            .is_favorited(&auth.user.id, &tab.id)
            .api_err("Failed to check favorite")?,
        None => false,
    };

    let length = classify_length(&tab.content);
    let content_html = highlight_tab(&tab.content);

    Ok::<_, ApiError>(Json(ApiResponse::success(TabDetailResponse {
        tab,
        content_html,
        length: length.label(),
        length_class: length.css_class(),
        owner,
        favorited,
    })))
}

pub async fn update_tab(
    auth: OptionalUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTabRequest>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let mut tab = store
        .get_tab(&id)
        .api_err("Failed to get tab")?
        .or_not_found("Tab not found")?;

    require_tab_access(&tab, auth.0.as_ref().map(|a| &a.user))?;

    if let Some(title) = req.title {
        tab.title = title.trim().to_string();
    }
    if let Some(artist) = req.artist {
        tab.artist = artist.trim().to_string();
    }
    validate_tab_fields(&tab.title, &tab.artist)?;

    if let Some(difficulty) = req.difficulty {
        validate_difficulty(difficulty)?;
        tab.difficulty = difficulty;
    }
    if let Some(tempo_bpm) = req.tempo_bpm {
        tab.tempo_bpm = Some(tempo_bpm);
    }

    tab.content = req.strings.assemble();
    tab.updated_at = Utc::now();

    store.update_tab(&tab).api_err("Failed to update tab")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(tab)))
}

pub async fn delete_tab(
    auth: OptionalUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let tab = store
        .get_tab(&id)
        .api_err("Failed to get tab")?
        .or_not_found("Tab not found")?;

    require_tab_access(&tab, auth.0.as_ref().map(|a| &a.user))?;

    store.delete_tab(&tab.id).api_err("Failed to delete tab")?;

    tracing::info!("Deleted tab '{}' ({})", tab.title, tab.id);

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

/// Legacy mobile API: all tabs as a bare JSON array.
pub async fn legacy_list_tabs(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let tabs = state.store.list_tabs().api_err("Failed to list tabs")?;

    let tabs: Vec<LegacyTabResponse> = tabs.into_iter().map(LegacyTabResponse::from).collect();

    Ok::<_, ApiError>(Json(tabs))
}
