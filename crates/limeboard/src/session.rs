//! Session key lifecycle.
//!
//! A session key is acquired with `get_session_key`, used for the duration of
//! one closure, and released with `release_session_key` exactly once, on every
//! exit path including unwinding.

use std::fmt;

use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::rpc::{Method, RpcRequest, Transport};

/// Login credentials for the RemoteControl API
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    password: String,
    /// Delegated authentication plugin (e.g. `AuthLDAP`); `None` means the internal database
    pub auth_source: Option<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            auth_source: None,
        }
    }

    /// Set the auth source. Blank values select default authentication.
    pub fn with_auth_source(mut self, auth_source: impl Into<String>) -> Self {
        let auth_source = auth_source.into();
        self.auth_source = Some(auth_source).filter(|s| !s.trim().is_empty());
        self
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Parameter list for `get_session_key`
    pub fn auth_params(&self) -> Vec<Value> {
        let mut params = vec![json!(self.username), json!(self.password)];
        if let Some(source) = &self.auth_source {
            params.push(json!(source));
        }
        params
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("auth_source", &self.auth_source)
            .finish()
    }
}

/// An acquired session key. Not `Clone`: releasing consumes it.
pub struct Session {
    key: String,
}

impl Session {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Session(<redacted>)")
    }
}

pub struct SessionManager<'a, T> {
    transport: &'a T,
    credentials: &'a Credentials,
}

impl<'a, T: Transport> SessionManager<'a, T> {
    pub fn new(transport: &'a T, credentials: &'a Credentials) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    /// Request a new session key.
    ///
    /// A missing, blank or non-string result is an [`Error::Authentication`].
    pub fn acquire(&self) -> Result<Session> {
        let request = RpcRequest::new(Method::GetSessionKey, self.credentials.auth_params());
        let response = self.transport.call(&request)?;

        if let Some(status) = response.status_message() {
            return Err(Error::Authentication(format!(
                "unable to obtain session key: {}",
                status
            )));
        }

        match response.result {
            Some(Value::String(key)) if !key.trim().is_empty() => {
                debug!(
                    "Acquired session key for {} (auth source: {})",
                    self.credentials.username,
                    self.credentials.auth_source.as_deref().unwrap_or("default")
                );
                Ok(Session { key })
            }
            Some(other) if !other.is_string() => Err(Error::Authentication(format!(
                "unable to obtain session key: unexpected result type ({})",
                json_type_name(&other)
            ))),
            _ => Err(Error::Authentication(
                "unable to obtain session key".to_string(),
            )),
        }
    }

    /// Release a session key. Consuming the session makes a second release impossible.
    pub fn release(&self, session: Session) -> Result<()> {
        self.release_key(&session.key)
    }

    fn release_key(&self, key: &str) -> Result<()> {
        let request = RpcRequest::new(Method::ReleaseSessionKey, vec![json!(key)]);
        self.transport.call(&request)?;
        debug!("Released session key");
        Ok(())
    }

    /// Run `body` with a fresh session and release the session afterwards.
    ///
    /// No release is attempted when acquisition fails. An error from `body`
    /// takes precedence over a release failure; a release failure after a
    /// successful `body` is logged and the value is still returned.
    pub fn with_session<R, F>(&self, body: F) -> Result<R>
    where
        F: FnOnce(&Session) -> Result<R>,
    {
        let mut guard = ReleaseGuard {
            manager: self,
            session: self.acquire()?,
            released: false,
        };

        let outcome = body(&guard.session);
        let released = guard.release();

        match (outcome, released) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(value), Err(e)) => {
                warn!("Failed to release session key: {}", e);
                Ok(value)
            }
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(release_err)) => {
                warn!(
                    "Failed to release session key after error ({}): {}",
                    e, release_err
                );
                Err(e)
            }
        }
    }
}

/// Releases the session on drop if `body` unwinds
struct ReleaseGuard<'m, 'a, T: Transport> {
    manager: &'m SessionManager<'a, T>,
    session: Session,
    released: bool,
}

impl<T: Transport> ReleaseGuard<'_, '_, T> {
    fn release(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        self.manager.release_key(&self.session.key)
    }
}

impl<T: Transport> Drop for ReleaseGuard<'_, '_, T> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!("Failed to release session key during unwind: {}", e);
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;
    use crate::rpc::RpcResponse;
    use crate::rpc::mock::MockTransport;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    fn credentials() -> Credentials {
        Credentials::new("admin", "secret")
    }

    fn ok_transport() -> MockTransport {
        MockTransport::new()
            .on_result(Method::GetSessionKey, json!("key-1"))
            .on_result(Method::ReleaseSessionKey, json!("OK"))
    }

    #[test]
    fn test_auth_params_without_source() {
        assert_eq!(credentials().auth_params(), vec![json!("admin"), json!("secret")]);
    }

    #[test]
    fn test_auth_params_with_source() {
        let creds = credentials().with_auth_source("AuthLDAP");
        assert_eq!(
            creds.auth_params(),
            vec![json!("admin"), json!("secret"), json!("AuthLDAP")]
        );
    }

    #[test]
    fn test_blank_auth_source_is_default() {
        let creds = credentials().with_auth_source("  ");
        assert_eq!(creds.auth_source, None);
        assert_eq!(creds.auth_params().len(), 2);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = format!("{:?}", credentials());
        assert!(!creds.contains("secret"));
        let session = Session {
            key: "key-1".to_string(),
        };
        assert!(!format!("{:?}", session).contains("key-1"));
    }

    #[test]
    fn test_with_session_success_releases_once() {
        let transport = ok_transport();
        let creds = credentials();
        let manager = SessionManager::new(&transport, &creds);

        let value = manager
            .with_session(|session| Ok(session.key().to_string()))
            .unwrap();

        assert_eq!(value, "key-1");
        assert_eq!(transport.call_count(Method::GetSessionKey), 1);
        assert_eq!(transport.call_count(Method::ReleaseSessionKey), 1);
        let calls = transport.calls();
        assert_eq!(calls[1].params, vec![json!("key-1")]);
    }

    #[test]
    fn test_with_session_body_error_still_releases() {
        let transport = ok_transport();
        let creds = credentials();
        let manager = SessionManager::new(&transport, &creds);

        let result: Result<()> =
            manager.with_session(|_| Err(DecodeError::UnrecognisedFormat.into()));

        assert!(matches!(
            result,
            Err(Error::Decode(DecodeError::UnrecognisedFormat))
        ));
        assert_eq!(transport.call_count(Method::ReleaseSessionKey), 1);
    }

    #[test]
    fn test_release_failure_does_not_mask_success() {
        let transport = MockTransport::new()
            .on_result(Method::GetSessionKey, json!("key-1"))
            .on(Method::ReleaseSessionKey, |_| {
                Err(Error::Transport("connection reset".to_string()))
            });
        let creds = credentials();
        let manager = SessionManager::new(&transport, &creds);

        let value = manager.with_session(|_| Ok(42)).unwrap();
        assert_eq!(value, 42);
        assert_eq!(transport.call_count(Method::ReleaseSessionKey), 1);
    }

    #[test]
    fn test_release_failure_does_not_mask_body_error() {
        let transport = MockTransport::new()
            .on_result(Method::GetSessionKey, json!("key-1"))
            .on(Method::ReleaseSessionKey, |_| {
                Err(Error::Transport("connection reset".to_string()))
            });
        let creds = credentials();
        let manager = SessionManager::new(&transport, &creds);

        let result: Result<()> = manager.with_session(|_| {
            Err(Error::Api {
                code: None,
                message: "Invalid survey ID".to_string(),
            })
        });
        assert!(matches!(result, Err(Error::Api { .. })));
    }

    #[test]
    fn test_null_session_key_skips_body_and_release() {
        let transport = MockTransport::new()
            .on(Method::GetSessionKey, |_| Ok(RpcResponse::with_result(Value::Null)))
            .on_result(Method::ReleaseSessionKey, json!("OK"));
        let creds = credentials();
        let manager = SessionManager::new(&transport, &creds);

        let mut body_ran = false;
        let result = manager.with_session(|_| {
            body_ran = true;
            Ok(())
        });

        assert!(matches!(result, Err(Error::Authentication(_))));
        assert!(!body_ran);
        assert_eq!(transport.call_count(Method::ReleaseSessionKey), 0);
    }

    #[test]
    fn test_empty_session_key_is_authentication_error() {
        let creds = credentials();
        for key in ["", "   "] {
            let transport = MockTransport::new().on_result(Method::GetSessionKey, json!(key));
            let err = SessionManager::new(&transport, &creds).acquire().unwrap_err();
            assert!(matches!(err, Error::Authentication(_)), "accepted {key:?}");
        }
    }

    #[test]
    fn test_status_result_is_authentication_error() {
        let transport = MockTransport::new().on_result(
            Method::GetSessionKey,
            json!({"status": "Invalid user name or password"}),
        );
        let creds = credentials();
        let err = SessionManager::new(&transport, &creds).acquire().unwrap_err();
        match err {
            Error::Authentication(message) => {
                assert!(message.contains("Invalid user name or password"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_acquire_transport_error_propagates() {
        let transport = MockTransport::new().on(Method::GetSessionKey, |_| {
            Err(Error::Transport("timed out".to_string()))
        });
        let creds = credentials();
        let err = SessionManager::new(&transport, &creds).acquire().unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(transport.call_count(Method::ReleaseSessionKey), 0);
    }

    #[test]
    fn test_panicking_body_still_releases() {
        let transport = ok_transport();
        let creds = credentials();

        let result = catch_unwind(AssertUnwindSafe(|| {
            let manager = SessionManager::new(&transport, &creds);
            let _: Result<()> = manager.with_session(|_| panic!("render failed"));
        }));

        assert!(result.is_err());
        assert_eq!(transport.call_count(Method::ReleaseSessionKey), 1);
    }
}
