//! Flag-aware layer over `adminly_config`: the active profile plus
//! `--api-url` / `--token` / `--insecure` / `--timeout` overrides become a
//! `BackendConfig` and a bearer token.

use std::time::Duration;

use secrecy::SecretString;

use adminly_config::{Config, Profile};
use adminly_core::{BackendConfig, CollectionConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use adminly_config::{config_path, load_config_or_default};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Everything needed to open a `Backend`.
pub struct Resolved {
    pub backend: BackendConfig,
    pub token: SecretString,
}

/// Build the backend config from the config file, profile, and CLI flags.
pub fn resolve(global: &GlobalOpts, cfg: &Config) -> Result<Resolved, CliError> {
    let profile_name = active_profile_name(global, cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return resolve_profile(profile, &profile_name, global, cfg);
    }

    // An explicitly named profile must exist.
    if global.profile.is_some() {
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: available_profiles(cfg),
        });
    }

    // No profile: build from flags / env vars alone
    let url_str = global.api_url.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;
    let api_url = adminly_config::parse_api_url(url_str)?;

    let token = global
        .token
        .clone()
        .map(SecretString::from)
        .ok_or(CliError::NoCredentials {
            profile: profile_name,
        })?;

    let tls = if global.insecure || cfg.defaults.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(Resolved {
        backend: BackendConfig {
            api_url,
            tls,
            timeout: Duration::from_secs(global.timeout.unwrap_or(cfg.defaults.timeout)),
            collection: CollectionConfig {
                default_limit: cfg.defaults.page_size.max(1),
                search_debounce: Duration::from_millis(cfg.defaults.search_debounce_ms),
            },
        },
        token,
    })
}

fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<Resolved, CliError> {
    let mut backend = adminly_config::profile_to_backend_config(profile, &cfg.defaults)?;

    // flag > env > profile
    if let Some(ref raw) = global.api_url {
        backend.api_url = adminly_config::parse_api_url(raw)?;
    }
    if global.insecure {
        backend.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        backend.timeout = Duration::from_secs(secs);
    }

    let token = match global.token {
        Some(ref token) => SecretString::from(token.clone()),
        None => adminly_config::resolve_token(profile, profile_name)?,
    };

    Ok(Resolved { backend, token })
}

pub fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}
