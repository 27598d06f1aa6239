use std::sync::Arc;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use url::form_urlencoded;

use crate::{
    config::GateConfig,
    models::{Role, UserProfile},
};

/// Where unauthenticated visitors are sent, with their destination in `redirect`.
pub const LOGIN_PATH: &str = "/auth/login";

/// Fallback landing page for a signed-in visitor whose profile is unknown.
pub const HOME_PATH: &str = "/";

/// Name of the query parameter carrying a pending post-login destination.
pub const REDIRECT_PARAM: &str = "redirect";

/// Bytes re-encoded in a pending destination so it stays a valid `Location` header.
const LOCATION_UNSAFE: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'<').add(b'>').add(b'`');

/// RouteClass
///
/// The policy bucket a request path falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Requires a credential.
    Protected,
    /// Login and registration; only meaningful while signed out.
    AuthOnly,
    /// No policy applied.
    Open,
}

/// GateRequest
///
/// Everything the gate needs to know about one inbound request. Built by the
/// middleware from headers already parsed by the HTTP layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GateRequest {
    pub path: String,
    pub credential: Option<String>,
    pub profile: Option<UserProfile>,
    /// Value of the incoming `redirect` query parameter, if any.
    pub redirect: Option<String>,
}

impl GateRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_credential(mut self, token: impl Into<String>) -> Self {
        self.credential = Some(token.into());
        self
    }

    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn with_redirect(mut self, target: impl Into<String>) -> Self {
        self.redirect = Some(target.into());
        self
    }

    /// Reads the `redirect` parameter out of a raw query string.
    pub fn with_query(mut self, query: Option<&str>) -> Self {
        self.redirect = query.and_then(redirect_param);
        self
    }
}

/// RedirectReason
///
/// Why the gate chose a redirect. Only used for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectReason {
    LoginRequired,
    PendingDestination,
    RoleDashboard(Role),
    Home,
}

/// Decision
///
/// The gate's verdict for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Continue,
    Redirect {
        location: String,
        reason: RedirectReason,
    },
}

impl Decision {
    pub fn location(&self) -> Option<&str> {
        match self {
            Decision::Continue => None,
            Decision::Redirect { location, .. } => Some(location.as_str()),
        }
    }

    fn redirect(location: impl Into<String>, reason: RedirectReason) -> Self {
        Decision::Redirect {
            location: location.into(),
            reason,
        }
    }
}

/// Shared handle to the immutable gate, stored in the application state.
pub type GateState = Arc<RouteGate>;

/// RouteGate
///
/// Stateless request classifier. Holds only the route tables, so one instance can be
/// shared across every concurrent request.
#[derive(Debug, Clone)]
pub struct RouteGate {
    protected_prefixes: Vec<String>,
    auth_prefixes: Vec<String>,
    excluded_prefixes: Vec<String>,
    excluded_extensions: Vec<String>,
}

impl Default for RouteGate {
    fn default() -> Self {
        Self::new(&GateConfig::default())
    }
}

impl RouteGate {
    pub fn new(config: &GateConfig) -> Self {
        Self {
            protected_prefixes: config.protected_prefixes.clone(),
            auth_prefixes: config.auth_prefixes.clone(),
            excluded_prefixes: config.excluded_prefixes.clone(),
            excluded_extensions: config
                .excluded_extensions
                .iter()
                .map(|ext| format!(".{}", ext.trim_start_matches('.')))
                .collect(),
        }
    }

    /// is_excluded
    ///
    /// True for API routes, build assets, the favicon and image files. These bypass
    /// the gate and are never classified.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
            || self
                .excluded_extensions
                .iter()
                .any(|ext| path.ends_with(ext.as_str()))
    }

    /// classify
    ///
    /// Literal prefix match. Protected wins if a misconfigured table lists a path in
    /// both sets.
    pub fn classify(&self, path: &str) -> RouteClass {
        if matches_any(&self.protected_prefixes, path) {
            RouteClass::Protected
        } else if matches_any(&self.auth_prefixes, path) {
            RouteClass::AuthOnly
        } else {
            RouteClass::Open
        }
    }

    /// decide
    ///
    /// Produces exactly one decision for the request. Rules are evaluated in order and
    /// the first match wins:
    /// 1. no credential on a protected path: send to login, remembering the path;
    /// 2. credential on an auth-only path: honor a pending `redirect`, else the role
    ///    dashboard, else home;
    /// 3. anything else passes through.
    pub fn decide(&self, request: &GateRequest) -> Decision {
        let class = self.classify(&request.path);
        let authenticated = request.credential.is_some();

        match (class, authenticated) {
            (RouteClass::Protected, false) => Decision::redirect(
                login_location(&request.path),
                RedirectReason::LoginRequired,
            ),
            (RouteClass::AuthOnly, true) => {
                if let Some(target) = request.redirect.as_deref().filter(|t| !t.is_empty()) {
                    let location = utf8_percent_encode(target, LOCATION_UNSAFE).to_string();
                    return Decision::redirect(location, RedirectReason::PendingDestination);
                }

                match &request.profile {
                    Some(profile) => {
                        let role = profile.role.clone().unwrap_or(Role::User);
                        let location = role.dashboard_path();
                        Decision::redirect(location, RedirectReason::RoleDashboard(role))
                    }
                    None => Decision::redirect(HOME_PATH, RedirectReason::Home),
                }
            }
            _ => Decision::Continue,
        }
    }
}

/// `/auth/login?redirect=<path>`, with the path form-encoded.
pub fn login_location(path: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(path.as_bytes()).collect();
    format!("{LOGIN_PATH}?{REDIRECT_PARAM}={encoded}")
}

/// First `redirect` value in a query string, decoded.
fn redirect_param(query: &str) -> Option<String> {
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == REDIRECT_PARAM)
        .map(|(_, value)| value.into_owned())
}

fn matches_any(prefixes: &[String], path: &str) -> bool {
    prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
}
