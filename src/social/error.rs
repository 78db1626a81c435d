use thiserror::Error;

#[derive(Debug, Error)]
pub enum SocialError {
    /// The login dialog closed without granting an access token
    #[error("User cancelled login")]
    LoginCancelled,

    /// The SDK dropped its callback without ever invoking it
    #[error("platform callback was dropped without a response")]
    Abandoned,

    #[error("no access token available for profile {0}")]
    MissingAccessToken(String),

    #[error("malformed platform response: {0}")]
    Malformed(#[from] serde_json::Error),
}
