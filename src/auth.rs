use std::{convert::Infallible, str::Utf8Error};

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use percent_encoding::percent_decode_str;
use thiserror::Error;

use crate::models::UserProfile;

/// Cookie holding the opaque session credential.
pub const AUTH_COOKIE: &str = "auth_token";

/// Cookie holding the URL-encoded JSON profile written by the web client.
pub const PROFILE_COOKIE: &str = "user_data";

/// ProfileError
///
/// Why a `user_data` cookie could not be turned into a profile. Never surfaced to the
/// caller; the session simply has no profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("user_data is not valid percent-encoded UTF-8: {0}")]
    Encoding(#[from] Utf8Error),
    #[error("user_data is not a valid profile object: {0}")]
    Json(#[from] serde_json::Error),
}

/// Session
///
/// What the request carries about its caller: an opaque credential and, best effort,
/// the profile cookie. Nothing here is verified; the gate only cares whether a
/// credential is present and which dashboard the profile points at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub credential: Option<String>,
    pub profile: Option<UserProfile>,
}

impl Session {
    /// from_headers
    ///
    /// Reads the credential (cookie first, then `Authorization: Bearer`) and the
    /// profile cookie. A malformed profile is logged and dropped.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let credential = credential(headers);

        let profile = cookie(headers, PROFILE_COOKIE).and_then(|raw| match decode_profile(raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding malformed {} cookie", PROFILE_COOKIE);
                None
            }
        });

        Self {
            credential,
            profile,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }
}

/// Session Extractor Implementation
///
/// Lets middleware and handlers take a `Session` argument directly. Extraction never
/// fails: a request without cookies is simply an anonymous session.
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Session::from_headers(&parts.headers))
    }
}

/// credential
///
/// The `auth_token` cookie, or the bearer token when the cookie is missing or empty.
pub fn credential(headers: &HeaderMap) -> Option<String> {
    cookie(headers, AUTH_COOKIE)
        .filter(|value| !value.is_empty())
        .or_else(|| bearer_token(headers))
        .map(str::to_string)
}

/// decode_profile
///
/// Percent-decodes and parses a raw `user_data` cookie value.
pub fn decode_profile(raw: &str) -> Result<UserProfile, ProfileError> {
    let json = percent_decode_str(raw).decode_utf8()?;
    Ok(serde_json::from_str(&json)?)
}

/// Value of the first cookie called `name` across all `Cookie` headers.
pub fn cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key.trim() == name).then(|| value.trim())
        })
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
