//! Client address extractor.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, Extensions, HeaderMap},
};

/// Best-effort client address used as a rate limiting key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

/// Resolves the client address from proxy headers, then the socket.
///
/// Takes the first `X-Forwarded-For` hop, then `X-Real-IP`, then the peer
/// address. Falls back to `"unknown"`.
pub fn client_ip_from_parts(headers: &HeaderMap, extensions: &Extensions) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .map(String::from)
        .or_else(|| {
            extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientIp(client_ip_from_parts(&parts.headers, &parts.extensions)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_forwarded_for_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.1"));
        assert_eq!(
            client_ip_from_parts(&headers, &Extensions::new()),
            "203.0.113.7"
        );
    }

    #[test]
    fn test_real_ip_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.1"));
        assert_eq!(
            client_ip_from_parts(&headers, &Extensions::new()),
            "198.51.100.1"
        );
    }

    #[test]
    fn test_connect_info_fallback() {
        let mut extensions = Extensions::new();
        let addr: SocketAddr = "192.0.2.10:5555".parse().unwrap();
        extensions.insert(ConnectInfo(addr));
        assert_eq!(
            client_ip_from_parts(&HeaderMap::new(), &extensions),
            "192.0.2.10"
        );
    }

    #[test]
    fn test_unknown() {
        assert_eq!(
            client_ip_from_parts(&HeaderMap::new(), &Extensions::new()),
            "unknown"
        );
    }
}
