use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

const DEFAULT_DEV_CLIENT: &str = "dev";

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Username of the authenticated client, stored as a request extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal(pub String);

#[derive(Clone)]
struct ApiKey {
    client: String,
    digest: [u8; 32],
}

/// API key auth settings used by middleware.
#[derive(Clone)]
pub struct AuthState {
    keys: Arc<Vec<ApiKey>>,
    salt: Option<Arc<str>>,
    dev_client: Arc<str>,
    pub enabled: bool,
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("keys", &self.keys.len())
            .field("dev_client", &self.dev_client)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl AuthState {
    /// Builds auth config from `SERPBOT_API_KEYS` (comma-separated
    /// `client:token` pairs).
    ///
    /// In development, empty/missing keys disable auth for local iteration and
    /// every request acts as `SERPBOT_DEV_CLIENT`.
    /// In non-development envs, empty/missing keys fail startup.
    pub fn from_env(is_development: bool, salt: Option<&str>) -> anyhow::Result<Self> {
        let raw = std::env::var("SERPBOT_API_KEYS").unwrap_or_default();
        let dev_client = std::env::var("SERPBOT_DEV_CLIENT")
            .ok()
            .filter(|client| !client.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DEV_CLIENT.to_string());
        Self::from_entries(&raw, is_development, salt, &dev_client)
    }

    pub(crate) fn from_entries(
        raw: &str,
        is_development: bool,
        salt: Option<&str>,
        dev_client: &str,
    ) -> anyhow::Result<Self> {
        let mut keys = Vec::new();
        for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let Some((client, token)) = entry.split_once(':') else {
                anyhow::bail!("SERPBOT_API_KEYS entries must look like client:token");
            };
            let (client, token) = (client.trim(), token.trim());
            if client.is_empty() || token.is_empty() {
                anyhow::bail!("SERPBOT_API_KEYS entries need both a client and a token");
            }
            keys.push(ApiKey {
                client: client.to_string(),
                digest: hash_token(salt, token),
            });
        }

        let enabled = !keys.is_empty();
        if !enabled {
            if is_development {
                tracing::warn!(
                    dev_client,
                    "SERPBOT_API_KEYS not set; bearer auth disabled in development environment"
                );
            } else {
                anyhow::bail!(
                    "SERPBOT_API_KEYS is required outside development; provide client:token pairs"
                );
            }
        }

        Ok(Self {
            keys: Arc::new(keys),
            salt: salt.map(Arc::from),
            dev_client: Arc::from(dev_client),
            enabled,
        })
    }

    /// Returns the client owning `token`, if any.
    ///
    /// Every configured key is compared so the timing does not depend on
    /// which entry matched.
    fn authenticate(&self, token: &str) -> Option<&str> {
        let digest = hash_token(self.salt.as_deref(), token);
        let mut matched = None;
        for key in self.keys.iter() {
            if bool::from(key.digest[..].ct_eq(&digest[..])) {
                matched = Some(key.client.as_str());
            }
        }
        matched
    }
}

fn hash_token(salt: Option<&str>, token: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    if let Some(salt) = salt {
        hasher.update(salt.as_bytes());
    }
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

#[derive(Debug, Clone)]
struct RateLimitWindow {
    started_at: Instant,
    count: usize,
}

/// Fixed-window limiter shared by every protected route.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    state: Arc<Mutex<RateLimitWindow>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            state: Arc::new(Mutex::new(RateLimitWindow {
                started_at: Instant::now(),
                count: 0,
            })),
        }
    }

    #[must_use]
    pub fn per_minute(max_requests: usize) -> Self {
        Self::new(max_requests, Duration::from_secs(60))
    }
}

fn request_id_of(req: &Request) -> String {
    req.extensions()
        .get::<RequestId>()
        .map_or_else(|| "unknown".to_string(), |id| id.0.clone())
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware resolving the bearer token to a [`Principal`].
///
/// With auth disabled every request runs as the development client.
pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    if !auth.enabled {
        req.extensions_mut()
            .insert(Principal(auth.dev_client.to_string()));
        return next.run(req).await;
    }

    let client = extract_bearer_token(req.headers().get(AUTHORIZATION))
        .and_then(|token| auth.authenticate(token))
        .map(ToOwned::to_owned);

    if let Some(client) = client {
        req.extensions_mut().insert(Principal(client));
        next.run(req).await
    } else {
        ApiError::new(
            request_id_of(&req),
            "unauthorized",
            "missing or invalid bearer token",
        )
        .into_response()
    }
}

/// Middleware enforcing a fixed request-per-window limit.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let mut window = rate_limit.state.lock().await;
    let elapsed = window.started_at.elapsed();

    if elapsed >= rate_limit.window {
        window.started_at = Instant::now();
        window.count = 0;
    }

    if window.count >= rate_limit.max_requests {
        drop(window);
        tracing::warn!("rate limit exceeded");
        return ApiError::new(request_id_of(&req), "rate_limited", "rate limit exceeded")
            .into_response();
    }

    window.count += 1;
    drop(window);

    next.run(req).await
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_bearer_token_accepts_valid_header() {
        let header = HeaderValue::from_static("Bearer test-token");
        assert_eq!(extract_bearer_token(Some(&header)), Some("test-token"));
    }

    #[test]
    fn extract_bearer_token_rejects_non_bearer_header() {
        let header = HeaderValue::from_static("Basic abc123");
        assert_eq!(extract_bearer_token(Some(&header)), None);
    }

    #[test]
    fn auth_state_disables_when_no_keys_in_dev() {
        let state = AuthState::from_entries("", true, None, "dev").expect("dev allows no keys");
        assert!(!state.enabled);
        assert_eq!(&*state.dev_client, "dev");
    }

    #[test]
    fn auth_state_requires_keys_outside_dev() {
        assert!(AuthState::from_entries(" , ", false, None, "dev").is_err());
    }

    #[test]
    fn auth_state_rejects_malformed_entries() {
        assert!(AuthState::from_entries("token-without-client", false, None, "dev").is_err());
        assert!(AuthState::from_entries("nicolas:", false, None, "dev").is_err());
    }

    #[test]
    fn authenticate_maps_token_to_client() {
        let state =
            AuthState::from_entries("nicolas:s3cret, ana:other", false, Some("pepper"), "dev")
                .expect("auth");
        assert!(state.enabled);
        assert_eq!(state.authenticate("s3cret"), Some("nicolas"));
        assert_eq!(state.authenticate("other"), Some("ana"));
        assert_eq!(state.authenticate("nope"), None);
    }

    #[test]
    fn salt_changes_the_stored_digest() {
        assert_ne!(hash_token(Some("a"), "token"), hash_token(Some("b"), "token"));
        assert_eq!(hash_token(None, "token"), hash_token(None, "token"));
    }
}
