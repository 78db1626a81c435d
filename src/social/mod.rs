pub mod callback;
pub mod error;
pub mod facebook;
pub mod mock;

pub use error::SocialError;
pub use facebook::{CallbackSdk, FacebookClient, SdkCallback};

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Profile id meaning "post on the user's own timeline" rather than a page
pub const PAGE_ME_ID: &str = "ME";

/// Credentials returned by the SDK login status / login dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(rename = "accessToken")]
    pub access_token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PictureData {
    #[serde(default)]
    pub url: Option<String>,
}

/// Graph API wraps pictures as `{ "data": { "url": ... } }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Picture {
    #[serde(default)]
    pub data: Option<PictureData>,
}

impl Picture {
    pub fn url(&self) -> Option<&str> {
        self.data.as_ref().and_then(|d| d.url.as_deref())
    }
}

/// A page the user manages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<Picture>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginInfo {
    pub user_id: String,
    pub access_token: String,
    pub accounts: Vec<Account>,
}

impl LoginInfo {
    /// Token to act as `profile_id`: the page token, or the user token for
    /// the personal timeline.
    pub fn access_token_for(&self, profile_id: &str) -> Option<&str> {
        if profile_id == PAGE_ME_ID {
            return Some(self.access_token.as_str()).filter(|t| !t.is_empty());
        }

        self.accounts
            .iter()
            .find(|account| account.id == profile_id)
            .map(|account| account.access_token.as_str())
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentAuthor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<Picture>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub from: Option<CommentAuthor>,
    /// Profile picture of the author, filled by [`Comment::with_picture`]
    #[serde(default)]
    pub picture: String,
    pub created_time: String,
}

impl Comment {
    /// Lift the author's nested picture URL to `picture` ("" when absent)
    pub fn with_picture(mut self) -> Self {
        self.picture = self
            .from
            .as_ref()
            .and_then(|author| author.picture.as_ref())
            .and_then(Picture::url)
            .unwrap_or_default()
            .to_string();
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub total_count: Option<u64>,
}

/// Response of a live comments query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentPage {
    #[serde(default)]
    pub data: Vec<Comment>,
    #[serde(default)]
    pub summary: Option<Summary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl CommentPage {
    pub fn failed(error: Value) -> Self {
        Self {
            data: Vec::new(),
            summary: None,
            error: Some(error),
        }
    }

    pub fn total_count(&self) -> u64 {
        self.summary.and_then(|s| s.total_count).unwrap_or(0)
    }
}

/// Response of a live reactions query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReactionPage {
    #[serde(default)]
    pub summary: Option<Summary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl ReactionPage {
    pub fn failed(error: Value) -> Self {
        Self {
            summary: None,
            error: Some(error),
        }
    }

    pub fn total_count(&self) -> u64 {
        self.summary.and_then(|s| s.total_count).unwrap_or(0)
    }
}

/// Social platform operations the publication dashboard relies on
#[async_trait]
pub trait SocialPlatform: Send + Sync {
    /// Reuse a connected session or open the login dialog
    async fn login(&self) -> Result<LoginInfo>;

    async fn logout(&self) -> Result<bool>;

    async fn is_logged_in(&self) -> Result<bool>;

    /// Comments on a live video, newer than `since` (unix seconds) when given.
    /// Upstream errors come back as a page with `error` set, not as `Err`.
    async fn live_comments(
        &self,
        video_id: &str,
        access_token: &str,
        since: Option<i64>,
    ) -> Result<CommentPage>;

    async fn live_reactions(&self, video_id: &str, access_token: &str) -> Result<ReactionPage>;
}
