//! Rate limiting for the public credential endpoints.
//!
//! Limits are kept per client address with a keyed `governor` limiter.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{clock::Clock, DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;

use crate::app::AppState;
use crate::error::ApiError;

/// Header set by the reverse proxy; the first entry is the client.
const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Per-address limiter shared across requests.
pub struct RateLimiterState {
    limiter: DefaultKeyedRateLimiter<IpAddr>,
    rate_limit_per_minute: u32,
}

impl RateLimiterState {
    /// Returns `None` when `rate_limit_per_minute` is 0 (disabled).
    pub fn new(rate_limit_per_minute: u32) -> Option<Self> {
        let per_minute = NonZeroU32::new(rate_limit_per_minute)?;
        Some(Self {
            limiter: RateLimiter::keyed(Quota::per_minute(per_minute)),
            rate_limit_per_minute,
        })
    }

    /// Returns the retry-after in seconds when `client` is over its quota.
    pub fn check(&self, client: IpAddr) -> Result<(), u64> {
        self.limiter.check_key(&client).map_err(|not_until| {
            let clock = governor::clock::DefaultClock::default();
            not_until.wait_time_from(clock.now()).as_secs().max(1)
        })
    }

    /// Drops state for addresses whose quota has fully replenished.
    pub fn prune(&self) {
        self.limiter.retain_recent();
    }
}

impl std::fmt::Debug for RateLimiterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiterState")
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("tracked_clients", &self.limiter.len())
            .finish()
    }
}

/// Resolves the client address from `x-forwarded-for`, then the socket peer.
fn client_addr(req: &Request<Body>) -> IpAddr {
    req.headers()
        .get(FORWARDED_FOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse().ok())
        .or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|info| info.0.ip())
        })
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Rejects requests over the per-address quota with 429.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let Some(limiter) = state.auth_rate_limiter.as_ref() else {
        return next.run(req).await;
    };

    let client = client_addr(&req);
    if let Err(retry_after) = limiter.check(client) {
        tracing::warn!(client = %client, path = %req.uri().path(), "Rate limit exceeded");
        metrics::counter!("auth_rate_limited_total").increment(1);

        let mut response = ApiError::RateLimited.into_response();
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
        return response;
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
    }

    #[test]
    fn test_zero_disables_limiter() {
        assert!(RateLimiterState::new(0).is_none());
    }

    #[test]
    fn test_rate_limiter_exhaustion() {
        let state = RateLimiterState::new(1).unwrap();
        assert!(state.check(ip(1)).is_ok());

        let result = state.check(ip(1));
        assert!(result.is_err());
        assert!(result.unwrap_err() >= 1);
    }

    #[test]
    fn test_clients_are_independent() {
        let state = RateLimiterState::new(1).unwrap();
        assert!(state.check(ip(1)).is_ok());
        assert!(state.check(ip(2)).is_ok());
        assert!(state.check(ip(1)).is_err());
        assert!(state.check(ip(2)).is_err());
    }

    #[test]
    fn test_allows_up_to_quota() {
        let state = RateLimiterState::new(5).unwrap();
        for i in 0..5 {
            assert!(state.check(ip(9)).is_ok(), "request {} should be allowed", i);
        }
        assert!(state.check(ip(9)).is_err());
    }

    #[test]
    fn test_client_addr_prefers_forwarded_for() {
        let req = Request::builder()
            .header(FORWARDED_FOR_HEADER, "203.0.113.7, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_addr(&req), "203.0.113.7".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_client_addr_falls_back_to_peer() {
        let mut req = Request::builder().body(Body::empty()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 4], 5000))));
        assert_eq!(client_addr(&req), "192.0.2.4".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_debug_output() {
        let state = RateLimiterState::new(20).unwrap();
        let debug = format!("{:?}", state);
        assert!(debug.contains("rate_limit_per_minute"));
        assert!(debug.contains("20"));
    }
}
