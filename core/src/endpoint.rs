//! Resource endpoints of the trip backend.
//!
//! Item endpoints embed a caller-supplied id, which is percent-encoded as a
//! single path segment before it is appended to the base URL.

use ureq::http::Uri;

use crate::error::ApiError;

/// One resource/operation URL template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    Trips,
    Trip(&'a str),
    Users,
    User(&'a str),
}

impl Endpoint<'_> {
    /// Path relative to the API base, with the id already encoded.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Endpoint::Trips => "/trips".to_string(),
            Endpoint::Trip(id) => format!("/trips/{}", urlencoding::encode(id)),
            Endpoint::Users => "/users".to_string(),
            Endpoint::User(id) => format!("/users/{}", urlencoding::encode(id)),
        }
    }

    /// Compose the absolute URL for this endpoint under `base_url`.
    pub fn url(&self, base_url: &str) -> Result<String, ApiError> {
        if let Endpoint::Trip(id) | Endpoint::User(id) = self {
            if id.is_empty() {
                return Err(ApiError::InvalidUrl("empty resource id".to_string()));
            }
        }
        let url = format!("{}{}", base_url.trim_end_matches('/'), self.path());
        validate(&url)?;
        Ok(url)
    }
}

fn validate(url: &str) -> Result<(), ApiError> {
    let uri: Uri = url
        .parse()
        .map_err(|e| ApiError::InvalidUrl(format!("{url}: {e}")))?;
    match uri.scheme_str() {
        Some("http") | Some("https") => {}
        _ => return Err(ApiError::InvalidUrl(format!("{url}: expected an http(s) URL"))),
    }
    if uri.host().map_or(true, str::is_empty) {
        return Err(ApiError::InvalidUrl(format!("{url}: missing host")));
    }
    Ok(())
}
