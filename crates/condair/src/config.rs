//! CLI configuration: thin wrapper around `condair_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--base-url, --username, --timeout).

use condair_core::HubConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use condair_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config, store_password,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Comma-separated profile names, or `(none)`.
pub fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        "(none)".into()
    } else {
        config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Build a `HubConfig` from the config file, profile, and CLI overrides.
///
/// Flags win over the profile. Without a matching profile the hub can
/// still be built from `--username` plus an environment password.
pub fn resolve_hub_config(global: &GlobalOpts) -> Result<HubConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.username.is_some() => Profile::default(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&cfg),
            });
        }
        None => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    resolve_profile(&profile, &profile_name, global, cfg.defaults.timeout)
}

/// Translate a `Profile` + global flags into a `HubConfig`.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
    default_timeout: u64,
) -> Result<HubConfig, CliError> {
    let mut profile = profile.clone();

    // 1. Base URL (flag > env > profile)
    if let Some(ref url) = global.base_url {
        profile.base_url = Some(url.clone());
    }

    // 2. Timeout (flag > env > profile > defaults)
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    // 3. Credentials
    let username = match global.username {
        Some(ref u) => u.clone(),
        None => condair_config::resolve_username(&profile, profile_name)?,
    };
    let password = condair_config::resolve_password(&profile, profile_name)?;

    Ok(condair_config::build_hub_config(
        &profile,
        username,
        password,
        default_timeout,
    )?)
}
