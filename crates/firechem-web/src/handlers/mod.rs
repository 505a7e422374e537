//! HTTP handlers for all API routes.

pub mod chemicals;
pub mod predict;
pub mod search;
pub mod system;

use axum::http::{header, HeaderMap};
use firechem_common::Locale;

/// Body `locale` wins; otherwise the first Accept-Language tag.
pub fn request_locale(body: Option<&str>, headers: &HeaderMap) -> Locale {
    if body.is_some() {
        return Locale::parse(body);
    }
    let accept = headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split([',', ';']).next());
    Locale::parse(accept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_request_locale() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_locale(None, &headers), Locale::He);

        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        assert_eq!(request_locale(None, &headers), Locale::En);
        assert_eq!(request_locale(Some("he"), &headers), Locale::He);
    }
}
