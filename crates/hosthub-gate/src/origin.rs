//! Origin validation for state-changing requests.
//!
//! The deployment issues no CSRF tokens; the entire defense against
//! cross-site form submission is a same-host comparison of the `Origin`
//! (falling back to `Referer`) header against `Host`. Anything the
//! comparison cannot positively establish as same-host fails closed.

use axum::http::{HeaderMap, Method, Uri};

/// Methods with no side effects; never origin-checked.
#[must_use]
pub fn is_safe_method(method: &Method) -> bool {
    matches!(method.as_str(), "GET" | "HEAD" | "OPTIONS")
}

/// Whether the request's `Origin`/`Referer` matches its `Host`.
///
/// `Origin` is authoritative when parsable: a parsable mismatch is
/// untrusted with no `Referer` fallback. The fallback applies only when
/// `Origin` is absent or unparsable. Neither header present or parsable
/// means untrusted.
#[must_use]
pub fn is_trusted_origin(headers: &HeaderMap) -> bool {
    let Some(host) = header_str(headers, "host") else {
        return false;
    };
    let host = host.trim().to_ascii_lowercase();
    if host.is_empty() {
        return false;
    }

    if let Some(origin) = header_str(headers, "origin") {
        if let Some(origin_host) = url_host(origin) {
            return origin_host == host;
        }
    }

    if let Some(referer) = header_str(headers, "referer") {
        if let Some(referer_host) = url_host(referer) {
            return referer_host == host;
        }
    }

    false
}

/// [`is_trusted_origin`] with the safe-method carve-out.
#[must_use]
pub fn verify_csrf_origin(method: &Method, headers: &HeaderMap) -> bool {
    if is_safe_method(method) {
        return true;
    }
    is_trusted_origin(headers)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Extract `host[:port]` from a URL header value, normalized the way a
/// browser's `Host` comparison sees it: lowercase, default ports elided.
///
/// A scheme is required: bare hosts and the literal `null` parse as
/// authority-form URIs, and trusting them would let a scheme-less header
/// pass. Those, userinfo, and unparsable values all yield `None` so
/// callers fail closed.
fn url_host(value: &str) -> Option<String> {
    let uri: Uri = value.trim().parse().ok()?;
    let scheme = uri.scheme_str()?;
    let authority = uri.authority()?;
    if authority.as_str().contains('@') {
        return None;
    }

    let host = authority.host().to_ascii_lowercase();
    match (scheme, authority.port_u16()) {
        (_, None) => Some(host),
        ("http", Some(80)) | ("https", Some(443)) => Some(host),
        (_, Some(port)) => Some(format!("{host}:{port}")),
    }
}
