//! Session management: obtain a bearer token and hold it for the run.
//!
//! The token is written once at login and read-only thereafter. It is never
//! refreshed or rotated within a run; if it expires mid-run, downstream calls
//! observe unauthorized responses, which are reported as ordinary failures.

use crate::result::{TrazarError, TrazarResult};
use crate::transport::Transport;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Login credentials for the authentication endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// A run-scoped authenticated session holding exactly one bearer token.
#[derive(Debug, Clone)]
pub struct Session {
    token: String,
}

/// Extract the bearer token from a login response body, if present.
pub(crate) fn extract_token(data: &Value) -> Option<String> {
    data.get("accessToken")
        .and_then(Value::as_str)
        .map(String::from)
}

impl Session {
    /// Log in against `POST {base_url}/api/auth/login`.
    ///
    /// Fails with [`TrazarError::Auth`] when the response status is not a
    /// success or no token field is present, carrying the server's message
    /// verbatim where one exists.
    pub async fn login(
        transport: &Transport,
        base_url: &str,
        credentials: &Credentials,
    ) -> TrazarResult<Self> {
        let url = format!("{base_url}/api/auth/login");
        let body = serde_json::to_value(credentials)?;
        let reply = transport
            .send_json(&url, reqwest::Method::POST, Some(&body), None)
            .await?;

        if !reply.is_success() {
            let message = reply
                .server_message()
                .map_or_else(|| format!("login returned status {}", reply.status), String::from);
            return Err(TrazarError::auth(message));
        }

        extract_token(&reply.data).map_or_else(
            || Err(TrazarError::auth("no accessToken field in login response")),
            |token| Ok(Self { token }),
        )
    }

    /// The bearer token for authorized requests.
    pub fn token(&self) -> &str {
        &self.token
    }
}
