//! API handlers for the modpack host.

pub mod file;
pub mod modpack;

pub use file::*;
pub use modpack::*;

use axum::http::HeaderMap;

use crate::modpack::{ModpackStore, UploadStaging};

use super::error::ApiError;

/// Name of the request header carrying the owner token.
pub const TOKEN_HEADER: &str = "token";

/// Application state shared by all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Modpack directories.
    pub store: ModpackStore,
    /// Staging area for uploads.
    pub staging: UploadStaging,
    /// Require the owner token on every mutating route, not only file uploads.
    pub require_token_for_all_mutations: bool,
}

impl AppState {
    /// Create a new application state.
    pub fn new(store: ModpackStore, staging: UploadStaging) -> Self {
        Self {
            store,
            staging,
            require_token_for_all_mutations: false,
        }
    }

    /// Require the owner token on file removal, modpack removal and archive
    /// upload as well.
    pub fn with_token_required_for_all_mutations(mut self, required: bool) -> Self {
        self.require_token_for_all_mutations = required;
        self
    }

    /// Check the `token` header when the stricter mode is on.
    pub(crate) fn check_optional_owner(&self, id: &str, headers: &HeaderMap) -> Result<(), ApiError> {
        if self.require_token_for_all_mutations {
            self.store.authorize(id, header_token(headers))?;
        }
        Ok(())
    }
}

/// Owner token from the request headers. Missing or non-UTF-8 values read as
/// an empty token, which never matches.
pub(crate) fn header_token(headers: &HeaderMap) -> &str {
    headers
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_header_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(header_token(&headers), "");

        headers.insert(TOKEN_HEADER, HeaderValue::from_static("s3cret"));
        assert_eq!(header_token(&headers), "s3cret");
    }

    #[test]
    fn test_header_token_non_utf8() {
        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap());
        assert_eq!(header_token(&headers), "");
    }
}
