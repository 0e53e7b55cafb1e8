//! Per-request metadata handed to the recorder.

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;
use std::convert::Infallible;
use std::net::SocketAddr;

use crate::sanitize::{UNKNOWN, resolve_client_ip};

/// HTTP request details attached to every stored event.
///
/// Built by the caller and passed explicitly; the recorder never reaches
/// into ambient request state. The user agent is kept raw here and
/// sanitized when the event is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub ip: String,
    pub method: String,
    pub path: String,
    pub user_agent: Option<String>,
}

impl RequestContext {
    pub fn new(ip: impl Into<String>, method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            method: method.into(),
            path: path.into(),
            user_agent: None,
        }
    }

    /// Builder: set the raw user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Context for events raised outside any HTTP request.
    pub fn detached() -> Self {
        Self::new(UNKNOWN, "-", "-")
    }

    /// Extract method, path, user agent and client address from request parts.
    pub fn from_parts(parts: &Parts, peer_addr: Option<SocketAddr>) -> Self {
        Self {
            ip: resolve_client_ip(&parts.headers, peer_addr.map(|addr| addr.ip())),
            method: parts.method.as_str().to_string(),
            path: parts.uri.path().to_string(),
            user_agent: parts
                .headers
                .get(USER_AGENT)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string),
        }
    }
}

/// Lets handlers take `RequestContext` as an argument.
///
/// The peer address is only known when the server was started with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer_addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(Self::from_parts(parts, peer_addr))
    }
}
