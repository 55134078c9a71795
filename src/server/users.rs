use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::{CredentialHasher, RequireUser, TokenGenerator};
use crate::server::AppState;
use crate::server::dto::{
    AccountResponse, DeleteAccountRequest, LoginRequest, RegisterRequest, SessionResponse,
    TabSummary, UpdateAccountRequest, UserSummary,
};
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};
use crate::server::validation::{validate_email, validate_password, validate_username};
use crate::store::Store;
use crate::types::{Token, User};

const SESSION_TTL_DAYS: i64 = 30;

fn issue_session(store: &dyn Store, user_id: &str) -> Result<String, ApiError> {
    let generator = TokenGenerator::new();
    let (raw_token, lookup, hash) = generator
        .generate()
        .api_err("Failed to generate session token")?;

    let now = Utc::now();
    let token = Token {
        id: Uuid::new_v4().to_string(),
        token_hash: hash,
        token_lookup: lookup,
        user_id: user_id.to_string(),
        created_at: now,
        expires_at: Some(now + chrono::Duration::days(SESSION_TTL_DAYS)),
        last_used_at: None,
    };
    store
        .create_token(&token)
        .api_err("Failed to create session")?;

    Ok(raw_token)
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    validate_username(&req.username)?;
    validate_email(&req.email)?;
    validate_password(&req.password)?;

    let password_hash = CredentialHasher::new()
        .hash(&req.password)
        .api_err("Failed to hash password")?;

    let user = User {
        id: Uuid::new_v4().to_string(),
        username: req.username.trim().to_string(),
        email: req.email.trim().to_string(),
        password_hash,
        avatar: None,
        created_at: Utc::now(),
    };

    if let Err(e) = store.create_user(&user) {
        return Err(match e {
            crate::error::Error::AlreadyExists => {
                ApiError::conflict("Username or email already taken")
            }
            _ => ApiError::internal("Failed to create user"),
        });
    }

    tracing::info!("Registered user {} ({})", user.username, user.id);

    let token = issue_session(store, &user.id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(SessionResponse { token, user })))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let user = store
        .find_user_by_identifier(req.identifier.trim())
        .api_err("Failed to look up user")?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    let valid = CredentialHasher::new()
        .verify(&req.password, &user.password_hash)
        .api_err("Failed to verify password")?;
    if !valid {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = issue_session(store, &user.id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(SessionResponse { token, user })))
}

pub async fn logout(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    state
        .store
        .delete_token(&auth.token.id)
        .api_err("Failed to revoke session")?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn get_account(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let user = auth.user;

    let tabs = store
        .list_user_tabs(&user.id)
        .api_err("Failed to list tabs")?;
    let followers = store
        .list_followers(&user.id)
        .api_err("Failed to list followers")?;
    let following = store
        .list_following(&user.id)
        .api_err("Failed to list following")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(AccountResponse {
        user,
        tabs: tabs.into_iter().map(TabSummary::from).collect(),
        followers: followers.into_iter().map(UserSummary::from).collect(),
        following: following.into_iter().map(UserSummary::from).collect(),
    })))
}

pub async fn update_account(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateAccountRequest>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let mut user = auth.user;

    if let Some(username) = req.username {
        validate_username(&username)?;
        user.username = username.trim().to_string();
    }
    if let Some(email) = req.email {
        validate_email(&email)?;
        user.email = email.trim().to_string();
    }
    if let Some(password) = req.password {
        validate_password(&password)?;
        user.password_hash = CredentialHasher::new()
            .hash(&password)
            .api_err("Failed to hash password")?;
    }
    if let Some(avatar) = req.avatar {
        user.avatar = if avatar.is_empty() { None } else { Some(avatar) };
    }

    if let Err(e) = store.update_user(&user) {
        return Err(match e {
            crate::error::Error::AlreadyExists => {
                ApiError::conflict("Username or email already taken")
            }
            crate::error::Error::NotFound => ApiError::not_found("User not found"),
            _ => ApiError::internal("Failed to update user"),
        });
    }

    Ok::<_, ApiError>(Json(ApiResponse::success(user)))
}

pub async fn delete_account(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeleteAccountRequest>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let user = auth.user;

    // Tabs, follow edges, and favorites all go with the account. The
    // password must be re-confirmed even on an authenticated session.
    let valid = CredentialHasher::new()
        .verify(&req.password, &user.password_hash)
        .api_err("Failed to verify password")?;
    if !valid {
        return Err(ApiError::unauthorized(
            "Incorrect password, account deletion cancelled",
        ));
    }

    let deleted = store
        .delete_user(&user.id)
        .api_err("Failed to delete account")?;
    if !deleted {
        return Err(ApiError::not_found("User not found"));
    }

    tracing::info!("Deleted account {} ({})", user.username, user.id);

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
