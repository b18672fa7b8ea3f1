//! Session cookie middleware.
//!
//! Each visitor is identified by an opaque UUID carried in a cookie. The
//! middleware parses it (or mints a new one), exposes it to handlers through
//! request extensions, and sets the cookie on responses for new visitors.

use axum::extract::Request;
use axum::http::header::{HeaderMap, HeaderValue, COOKIE, SET_COOKIE};
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;
use uuid::Uuid;

/// Cookie name carrying the session id.
pub const SESSION_COOKIE: &str = "ubuzima_session";

/// Session id for the current request, available via `Extension`.
#[derive(Debug, Clone)]
pub struct SessionId(pub String);

/// Extract a valid session id from the request cookies.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else { continue };
        for pair in value.split(';') {
            let Some((name, id)) = pair.trim().split_once('=') else {
                continue;
            };
            // Only accept well-formed ids so a tampered cookie cannot
            // address arbitrary store keys
            if name == SESSION_COOKIE && Uuid::parse_str(id).is_ok() {
                return Some(id.to_string());
            }
        }
    }
    None
}

fn issue_cookie(session_id: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Lax"
    ))
    .ok()
}

/// Ensure every request carries a session id, minting one when absent.
pub async fn session_cookie(mut request: Request, next: Next) -> Response {
    let (session_id, is_new) = match session_id_from_headers(request.headers()) {
        Some(id) => (id, false),
        None => {
            let id = Uuid::new_v4().to_string();
            debug!("issuing new session {id}");
            (id, true)
        }
    };

    request.extensions_mut().insert(SessionId(session_id.clone()));
    let mut response = next.run(request).await;

    if is_new {
        if let Some(cookie) = issue_cookie(&session_id) {
            response.headers_mut().append(SET_COOKIE, cookie);
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_parses_session_cookie() {
        let id = Uuid::new_v4().to_string();
        let headers = headers_with_cookie(&format!("{SESSION_COOKIE}={id}"));
        assert_eq!(session_id_from_headers(&headers), Some(id));
    }

    #[test]
    fn test_parses_among_other_cookies() {
        let id = Uuid::new_v4().to_string();
        let headers =
            headers_with_cookie(&format!("theme=dark; {SESSION_COOKIE}={id}; lang=rw"));
        assert_eq!(session_id_from_headers(&headers), Some(id));
    }

    #[test]
    fn test_rejects_malformed_id() {
        let headers = headers_with_cookie(&format!("{SESSION_COOKIE}=../../etc"));
        assert!(session_id_from_headers(&headers).is_none());
    }

    #[test]
    fn test_ignores_other_cookies() {
        let headers = headers_with_cookie("theme=dark; lang=rw");
        assert!(session_id_from_headers(&headers).is_none());
    }

    #[test]
    fn test_no_cookie_header() {
        assert!(session_id_from_headers(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_issued_cookie_attributes() {
        let cookie = issue_cookie("abc").unwrap();
        let value = cookie.to_str().unwrap();
        assert!(value.starts_with("ubuzima_session=abc"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("SameSite=Lax"));
        assert!(value.contains("Path=/"));
    }
}
