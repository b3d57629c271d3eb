// `user.login` session flow.
//
// Installs that authenticate with username/password exchange them for a
// session token up front; the token then rides along on every call per
// the client's carriage mode. API-token installs skip this entirely.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::{AuthCarrier, RpcClient};
use crate::error::Error;

impl RpcClient {
    /// Authenticate with username/password and store the session token.
    ///
    /// On success subsequent calls carry the token per `carrier`. Login
    /// rejections (an application error from `user.login`) surface as
    /// [`Error::Authentication`] with the server's detail text; transport
    /// and protocol failures pass through unchanged.
    pub async fn login(
        &mut self,
        username: &str,
        password: &SecretString,
        carrier: AuthCarrier,
    ) -> Result<(), Error> {
        let params = json!({
            "username": username,
            "password": password.expose_secret(),
        });

        debug!(username, "logging in");

        let result = self.call("user.login", params).await.map_err(|e| match e {
            Error::Api { message, data, .. } => Error::Authentication {
                message: match data {
                    Some(detail) if !detail.is_empty() => detail,
                    _ => message,
                },
            },
            other => other,
        })?;

        let token = result.as_str().ok_or_else(|| Error::Deserialization {
            message: "user.login result is not a token string".into(),
            body: result.to_string(),
        })?;

        self.set_token(SecretString::from(token.to_owned()), carrier);
        debug!("login successful");
        Ok(())
    }
}
