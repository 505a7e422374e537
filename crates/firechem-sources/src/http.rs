//! Shared HTTP client construction.

use std::time::Duration;

use reqwest::{Client, ClientBuilder};

const USER_AGENT: &str = concat!("firechem/", env!("CARGO_PKG_VERSION"));

/// Bodies longer than this are cut before they end up in error messages or logs.
pub const MAX_ERROR_BODY: usize = 300;

pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    ClientBuilder::new()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .user_agent(USER_AGENT)
        .build()
}

/// Truncate on a char boundary.
pub fn snippet(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_truncates_on_char_boundary() {
        let long = "א".repeat(MAX_ERROR_BODY + 5);
        let cut = snippet(&long);
        assert_eq!(cut.chars().count(), MAX_ERROR_BODY + 1);
        assert_eq!(snippet("short"), "short");
    }

    #[test]
    fn test_client_builds() {
        assert!(build_client(Duration::from_secs(5)).is_ok());
    }
}
