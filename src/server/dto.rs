use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tabtext::classify_length;
use crate::types::{Tab, User};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email.
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateAccountRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteAccountRequest {
    #[serde(default)]
    pub password: String,
}

/// The six string lines of a tab, one per guitar string, high e first.
#[derive(Debug, Default, Deserialize)]
pub struct TabStrings {
    #[serde(default)]
    pub string_e: String,
    #[serde(default)]
    pub string_b: String,
    #[serde(default)]
    pub string_g: String,
    #[serde(default)]
    pub string_d: String,
    #[serde(default)]
    pub string_a: String,
    #[serde(default)]
    pub string_e_low: String,
}

impl TabStrings {
    /// Assembles the stored content from the six per-string fields.
    #[must_use]
    pub fn assemble(&self) -> String {
        format!(
            "e {}\nB {}\nG {}\nD {}\nA {}\nE {}",
            self.string_e.trim(),
            self.string_b.trim(),
            self.string_g.trim(),
            self.string_d.trim(),
            self.string_a.trim(),
            self.string_e_low.trim(),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTabRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(flatten)]
    pub strings: TabStrings,
    #[serde(default)]
    pub difficulty: Option<i32>,
    #[serde(default)]
    pub tempo_bpm: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTabRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(flatten)]
    pub strings: TabStrings,
    #[serde(default)]
    pub difficulty: Option<i32>,
    #[serde(default)]
    pub tempo_bpm: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListTabsParams {
    #[serde(default)]
    pub q: Option<String>,
}

/// Public view of a user (no email).
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            avatar: user.avatar,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TabSummary {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub difficulty: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tempo_bpm: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub length: &'static str,
    pub length_class: &'static str,
}

impl From<Tab> for TabSummary {
    fn from(tab: Tab) -> Self {
        let length = classify_length(&tab.content);
        Self {
            id: tab.id,
            title: tab.title,
            artist: tab.artist,
            difficulty: tab.difficulty,
            tempo_bpm: tab.tempo_bpm,
            user_id: tab.user_id,
            created_at: tab.created_at,
            length: length.label(),
            length_class: length.css_class(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TabDetailResponse {
    #[serde(flatten)]
    pub tab: Tab,
    pub content_html: String,
    pub length: &'static str,
    pub length_class: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<UserSummary>,
    pub favorited: bool,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub user: User,
    pub tabs: Vec<TabSummary>,
    pub followers: Vec<UserSummary>,
    pub following: Vec<UserSummary>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: UserSummary,
    pub tabs: Vec<TabSummary>,
    pub followers_count: i64,
    pub following_count: i64,
    pub favorites_count: i64,
    pub is_following: bool,
}

#[derive(Debug, Serialize)]
pub struct FollowToggleResponse {
    pub following: bool,
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct FavoriteToggleResponse {
    pub favorited: bool,
    pub tab_id: String,
}

/// Item shape of the legacy mobile API (`GET /api/tabs`): a bare array,
/// not wrapped in the standard response envelope.
#[derive(Debug, Serialize)]
pub struct LegacyTabResponse {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub difficulty: i32,
    pub length: &'static str,
    pub created_at: Option<String>,
}

impl From<Tab> for LegacyTabResponse {
    fn from(tab: Tab) -> Self {
        Self {
            id: tab.id,
            title: tab.title,
            artist: tab.artist,
            difficulty: tab.difficulty,
            length: classify_length(&tab.content).label(),
            created_at: Some(tab.created_at.to_rfc3339()),
        }
    }
}
