//! Client IP resolution for access log lines
//!
//! The service runs behind Cloudflare or a reverse proxy, so the socket peer is
//! usually the proxy. Headers are tried in order and only valid addresses are
//! accepted:
//!
//! 1. `CF-Connecting-IP`
//! 2. first entry of `X-Forwarded-For`
//! 3. `X-Real-IP`
//! 4. the socket peer address, if known
//!
//! The result is for logging only and must never be used for access control.

use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

const UNKNOWN: &str = "unknown";

/// Resolve the originating client address, or `"unknown"`.
pub fn extract_client_ip(headers: &HeaderMap, socket_addr: Option<&SocketAddr>) -> String {
    if let Some(ip) = header_ip(headers, "cf-connecting-ip") {
        return ip;
    }

    if let Some(ip) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(first_forwarded_for)
    {
        return ip;
    }

    if let Some(ip) = header_ip(headers, "x-real-ip") {
        return ip;
    }

    socket_addr
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn header_ip(headers: &HeaderMap, name: &str) -> Option<String> {
    let value = headers.get(name)?.to_str().ok()?.trim();
    is_valid_ip(value).then(|| value.to_string())
}

/// `client, proxy1, proxy2` → `client`
fn first_forwarded_for(header_value: &str) -> Option<String> {
    let first = header_value.split(',').next()?.trim();
    is_valid_ip(first).then(|| first.to_string())
}

fn is_valid_ip(ip_str: &str) -> bool {
    ip_str.parse::<IpAddr>().is_ok()
}
