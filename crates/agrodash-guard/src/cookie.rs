//! `Cookie` / `Set-Cookie` header helpers.

use axum::http::{HeaderMap, HeaderValue, header};

/// Reads cookie `name` from the request headers, percent-decoded.
///
/// Looks at every `Cookie` header (HTTP/2 clients may send several). The
/// first match wins. A value that isn't valid percent-encoding is returned
/// as sent.
pub fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|line| line.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| match urlencoding::decode(value) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => value.to_owned(),
        })
}

/// A `Set-Cookie` value storing `value` (percent-encoded) for
/// `max_age_secs`.
pub fn setting(name: &str, value: &str, max_age_secs: u64) -> HeaderValue {
    let rendered = format!(
        "{name}={}; Path=/; Max-Age={max_age_secs}; SameSite=Lax",
        urlencoding::encode(value)
    );
    HeaderValue::from_str(&rendered)
        .unwrap_or_else(|_| HeaderValue::from_static("invalid=; Max-Age=0"))
}

/// A `Set-Cookie` value that deletes cookie `name` on the client.
pub fn removal(name: &str) -> HeaderValue {
    let rendered = format!("{name}=; Path=/; Max-Age=0; SameSite=Lax");
    // Names with control characters can't be rendered; emit a no-op.
    HeaderValue::from_str(&rendered)
        .unwrap_or_else(|_| HeaderValue::from_static("invalid=; Max-Age=0"))
}
