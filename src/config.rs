use std::env;
use thiserror::Error;

/// Paths that require a credential. Order is preserved as configured.
pub const DEFAULT_PROTECTED_PREFIXES: &[&str] = &[
    "/dashboard",
    "/dashboard/admin",
    "/dashboard/vendor",
    "/dashboard/user",
    "/profile",
    "/bookings",
    "/my-events",
];

/// Login and registration pages, only meaningful while signed out.
pub const DEFAULT_AUTH_PREFIXES: &[&str] = &["/auth/login", "/auth/register"];

/// API routes, build assets and the favicon never reach the gate.
pub const DEFAULT_EXCLUDED_PREFIXES: &[&str] =
    &["/api", "/_next/static", "/_next/image", "/favicon.ico"];

/// Image requests never reach the gate either.
pub const DEFAULT_EXCLUDED_EXTENSIONS: &[&str] = &["svg", "png", "jpg", "jpeg", "gif", "webp"];

/// ConfigError
///
/// Reasons a set of gate route tables is rejected at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("route prefix `{0}` must start with '/'")]
    RelativePrefix(String),
    #[error("the {0} route table is empty")]
    EmptyTable(&'static str),
    #[error("protected prefix `{protected}` overlaps auth-only prefix `{auth}`")]
    OverlappingPrefix { protected: String, auth: String },
}

/// GateConfig
///
/// The static route tables the request gate classifies against.
#[derive(Clone, Debug, PartialEq)]
pub struct GateConfig {
    pub protected_prefixes: Vec<String>,
    pub auth_prefixes: Vec<String>,
    pub excluded_prefixes: Vec<String>,
    pub excluded_extensions: Vec<String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            protected_prefixes: to_owned(DEFAULT_PROTECTED_PREFIXES),
            auth_prefixes: to_owned(DEFAULT_AUTH_PREFIXES),
            excluded_prefixes: to_owned(DEFAULT_EXCLUDED_PREFIXES),
            excluded_extensions: to_owned(DEFAULT_EXCLUDED_EXTENSIONS),
        }
    }
}

impl GateConfig {
    /// validate
    ///
    /// Checks the tables are usable: every prefix is absolute, neither classification
    /// table is empty, and no path can match both a protected and an auth-only prefix.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.protected_prefixes.is_empty() {
            return Err(ConfigError::EmptyTable("protected"));
        }
        if self.auth_prefixes.is_empty() {
            return Err(ConfigError::EmptyTable("auth-only"));
        }

        for prefix in self
            .protected_prefixes
            .iter()
            .chain(&self.auth_prefixes)
            .chain(&self.excluded_prefixes)
        {
            if !prefix.starts_with('/') {
                return Err(ConfigError::RelativePrefix(prefix.clone()));
            }
        }

        // Two prefixes share a path exactly when one starts with the other.
        for protected in &self.protected_prefixes {
            if let Some(auth) = self.auth_prefixes.iter().find(|auth| {
                protected.starts_with(auth.as_str()) || auth.starts_with(protected.as_str())
            }) {
                return Err(ConfigError::OverlappingPrefix {
                    protected: protected.clone(),
                    auth: auth.clone(),
                });
            }
        }

        Ok(())
    }
}

/// AppConfig
///
/// Holds the service's entire configuration state, immutable once loaded and pulled
/// into handlers and middleware via FromRef.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Selects the log format.
    pub env: Env,
    // Socket address the HTTP listener binds to.
    pub bind_addr: String,
    // Route tables for the request gate.
    pub gate: GateConfig,
}

/// Env
///
/// The runtime context: pretty logs for local work, JSON logs in production.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Built-in route tables in local mode, for test setup without env vars.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: "0.0.0.0:3000".to_string(),
            gate: GateConfig::default(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables at startup.
    ///
    /// # Panics
    /// Panics if the route tables are invalid, so the service never starts with a gate
    /// that could classify a path two ways.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let mut gate = GateConfig::default();
        if let Some(prefixes) = prefix_list("GATE_PROTECTED_PREFIXES") {
            gate.protected_prefixes = prefixes;
        }
        if let Some(prefixes) = prefix_list("GATE_AUTH_PREFIXES") {
            gate.auth_prefixes = prefixes;
        }

        if let Err(e) = gate.validate() {
            panic!("FATAL: invalid gate configuration: {e}");
        }

        Self {
            env,
            bind_addr,
            gate,
        }
    }
}

/// Reads a comma-separated prefix list, skipping blank entries.
fn prefix_list(var: &str) -> Option<Vec<String>> {
    let raw = env::var(var).ok()?;
    Some(
        raw.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

fn to_owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
