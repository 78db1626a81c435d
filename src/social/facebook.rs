use super::callback::{self, Completion};
use super::{
    Account, AuthResponse, CommentPage, LoginInfo, ReactionPage, SocialError, SocialPlatform,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Permissions requested by the login dialog
pub const LOGIN_SCOPE: &str =
    "public_profile,pages_manage_posts,publish_video,pages_read_user_content";

const ACCOUNT_FIELDS: &str = "picture,access_token,name,id";
const COMMENT_FIELDS: &str = "created_time, from{picture,name,id}, message, id";

pub type SdkCallback = Box<dyn FnOnce(Value) + Send + 'static>;

/// The platform SDK as exposed to the panel: fire-and-callback calls
pub trait CallbackSdk: Send + Sync {
    /// `force` bypasses the SDK's cached status
    fn get_login_status(&self, force: bool, callback: SdkCallback);

    fn login(&self, scope: &str, callback: SdkCallback);

    fn logout(&self, callback: SdkCallback);

    fn api(&self, path: &str, method: &str, params: Value, callback: SdkCallback);
}

#[derive(Debug, Default, Deserialize)]
struct AccountsPage {
    #[serde(default)]
    data: Vec<Account>,
}

/// Awaitable facade over a [`CallbackSdk`]
pub struct FacebookClient<S: CallbackSdk> {
    sdk: Arc<S>,
}

impl<S: CallbackSdk> Clone for FacebookClient<S> {
    fn clone(&self) -> Self {
        Self {
            sdk: Arc::clone(&self.sdk),
        }
    }
}

impl<S: CallbackSdk> FacebookClient<S> {
    pub fn new(sdk: Arc<S>) -> Self {
        Self { sdk }
    }

    pub fn sdk(&self) -> &Arc<S> {
        &self.sdk
    }

    /// Current credentials if the user is connected
    pub async fn login_status(&self) -> Result<Option<AuthResponse>> {
        let response = self.status_response().await?;
        Ok(connected_auth(&response))
    }

    /// Pages managed by the logged in user
    pub async fn account_info(&self) -> Result<Vec<Account>> {
        let response = self
            .call_api("/me/accounts", json!({ "fields": ACCOUNT_FIELDS }))
            .await?;

        if let Some(error) = upstream_error(&response) {
            log::warn!("Failed to list Facebook accounts: {}", error);
            return Ok(Vec::new());
        }

        let page: AccountsPage = parse(response).context("Failed to parse Facebook accounts")?;
        Ok(page.data)
    }

    async fn status_response(&self) -> Result<Value> {
        let completion = self.invoke(|sdk, cb| sdk.get_login_status(true, cb));
        Ok(completion.await?)
    }

    async fn call_api(&self, path: &str, params: Value) -> Result<Value> {
        let completion = self.invoke(|sdk, cb| sdk.api(path, "GET", params, cb));
        completion
            .await
            .with_context(|| format!("Facebook API call {} did not complete", path))
    }

    fn invoke<F>(&self, call: F) -> Completion<Value>
    where
        F: FnOnce(&S, SdkCallback),
    {
        let (resolver, completion) = callback::pending();
        call(
            self.sdk.as_ref(),
            Box::new(move |response: Value| {
                resolver.resolve(response);
            }),
        );
        completion
    }

    async fn login_info(&self, auth: AuthResponse) -> Result<LoginInfo> {
        let accounts = self.account_info().await?;

        Ok(LoginInfo {
            user_id: auth.user_id,
            access_token: auth.access_token,
            accounts,
        })
    }
}

#[async_trait]
impl<S: CallbackSdk + 'static> SocialPlatform for FacebookClient<S> {
    async fn login(&self) -> Result<LoginInfo> {
        if let Some(auth) = self.login_status().await? {
            log::debug!("Reusing connected Facebook session for user {}", auth.user_id);
            return self.login_info(auth).await;
        }

        let (resolver, completion) = callback::pending();
        self.sdk.login(
            LOGIN_SCOPE,
            Box::new(move |response: Value| match auth_from(&response["authResponse"]) {
                Some(auth) => {
                    resolver.resolve(auth);
                }
                None => {
                    resolver.reject(SocialError::LoginCancelled);
                }
            }),
        );

        let auth = completion.await?;
        log::info!("Logged in to Facebook as user {}", auth.user_id);
        self.login_info(auth).await
    }

    async fn logout(&self) -> Result<bool> {
        if self.is_logged_in().await? {
            let completion = self.invoke(|sdk, cb| sdk.logout(cb));
            completion.await.context("Facebook logout did not complete")?;
        }

        Ok(true)
    }

    async fn is_logged_in(&self) -> Result<bool> {
        let response = self.status_response().await?;
        Ok(response["status"] == "connected")
    }

    async fn live_comments(
        &self,
        video_id: &str,
        access_token: &str,
        since: Option<i64>,
    ) -> Result<CommentPage> {
        let mut query = json!({
            "access_token": access_token,
            "fields": COMMENT_FIELDS,
        });
        if let Some(since) = since.filter(|s| *s != 0) {
            query["since"] = json!(since);
        }

        let response = self
            .call_api(&format!("/{}/comments", video_id), query)
            .await?;

        if let Some(error) = upstream_error(&response) {
            return Ok(CommentPage::failed(error));
        }

        parse(response).context("Failed to parse live comments")
    }

    async fn live_reactions(&self, video_id: &str, access_token: &str) -> Result<ReactionPage> {
        let query = json!({
            "access_token": access_token,
            "summary": "total_count",
        });

        let response = self
            .call_api(&format!("/{}/reactions", video_id), query)
            .await?;

        if let Some(error) = upstream_error(&response) {
            return Ok(ReactionPage::failed(error));
        }

        parse(response).context("Failed to parse live reactions")
    }
}

fn parse<T: DeserializeOwned>(response: Value) -> Result<T, SocialError> {
    Ok(serde_json::from_value(response)?)
}

/// `Some(error)` for an empty response or one carrying an `error` member
fn upstream_error(response: &Value) -> Option<Value> {
    match response {
        Value::Null => Some(Value::String("empty response".to_string())),
        other => other.get("error").filter(|e| !e.is_null()).cloned(),
    }
}

fn auth_from(auth: &Value) -> Option<AuthResponse> {
    let parsed: AuthResponse = serde_json::from_value(auth.clone()).ok()?;
    if parsed.access_token.is_empty() {
        return None;
    }
    Some(parsed)
}

fn connected_auth(response: &Value) -> Option<AuthResponse> {
    if response["status"] != "connected" {
        return None;
    }
    auth_from(&response["authResponse"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_error_detection() {
        assert!(upstream_error(&Value::Null).is_some());
        assert!(upstream_error(&json!({"data": []})).is_none());
        assert!(upstream_error(&json!({"data": [], "error": null})).is_none());
        assert_eq!(
            upstream_error(&json!({"error": {"code": 190}})),
            Some(json!({"code": 190}))
        );
    }

    #[test]
    fn test_connected_auth_requires_token() {
        let connected = json!({
            "status": "connected",
            "authResponse": {"userID": "42", "accessToken": "abc"}
        });
        assert_eq!(
            connected_auth(&connected),
            Some(AuthResponse {
                user_id: "42".to_string(),
                access_token: "abc".to_string()
            })
        );

        let unknown = json!({"status": "unknown", "authResponse": null});
        assert_eq!(connected_auth(&unknown), None);

        let empty_token = json!({"authResponse": {"userID": "42", "accessToken": ""}});
        assert_eq!(auth_from(&empty_token["authResponse"]), None);
    }
}
